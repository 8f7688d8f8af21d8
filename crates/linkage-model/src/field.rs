//! Normalized contact attributes that can be blocked on or compared.

use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// A normalized attribute of a contact record.
///
/// Text fields hold the cleaned or phonetic values produced by the enrichment
/// step. Flag fields hold validity booleans and compare as `"true"`/`"false"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum FieldName {
    FirstNameClean,
    LastNameClean,
    CompanyNameClean,
    FirstNameMp,
    LastNameMp,
    CompanyNameMp,
    FirstInitial,
    EmailAddress,
    PhoneNumberClean,
    Title,
    IsEmailValid,
    IsPhoneValid,
    IsCompanyDomainValid,
    IsIpAddrValid,
}

impl FieldName {
    /// All fields in column order.
    pub const ALL: [FieldName; 14] = [
        Self::FirstNameClean,
        Self::LastNameClean,
        Self::CompanyNameClean,
        Self::FirstNameMp,
        Self::LastNameMp,
        Self::CompanyNameMp,
        Self::FirstInitial,
        Self::EmailAddress,
        Self::PhoneNumberClean,
        Self::Title,
        Self::IsEmailValid,
        Self::IsPhoneValid,
        Self::IsCompanyDomainValid,
        Self::IsIpAddrValid,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstNameClean => "first_name_clean",
            Self::LastNameClean => "last_name_clean",
            Self::CompanyNameClean => "company_name_clean",
            Self::FirstNameMp => "first_name_mp",
            Self::LastNameMp => "last_name_mp",
            Self::CompanyNameMp => "company_name_mp",
            Self::FirstInitial => "first_initial",
            Self::EmailAddress => "email_address",
            Self::PhoneNumberClean => "phone_number_clean",
            Self::Title => "title",
            Self::IsEmailValid => "is_email_valid",
            Self::IsPhoneValid => "is_phone_valid",
            Self::IsCompanyDomainValid => "is_company_domain_valid",
            Self::IsIpAddrValid => "is_ip_addr_valid",
        }
    }

    /// True for boolean validity flags.
    pub fn is_flag(self) -> bool {
        matches!(
            self,
            Self::IsEmailValid | Self::IsPhoneValid | Self::IsCompanyDomainValid | Self::IsIpAddrValid
        )
    }
}

impl FromStr for FieldName {
    type Err = ModelError;

    /// Parses a field name case-insensitively. The enrichment output spells a
    /// few columns differently (`is_phone_us_valid`), which are accepted too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        if lowered == "is_phone_us_valid" {
            return Ok(Self::IsPhoneValid);
        }
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == lowered)
            .ok_or_else(|| ModelError::UnknownField {
                name: s.to_string(),
            })
    }
}

impl TryFrom<String> for FieldName {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldName> for String {
    fn from(field: FieldName) -> Self {
        field.as_str().to_string()
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
