//! Enriched contact records and the immutable record set the matcher runs on.

use crate::{FieldName, ModelError, RecordKey};

/// One enriched contact, as produced by the validation and normalization step.
///
/// All attributes are optional. Blank text is stored as `None` so that a
/// missing value can never compare equal to another missing value.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContactRecord {
    pub key: RecordKey,
    pub first_name_clean: Option<String>,
    pub last_name_clean: Option<String>,
    pub company_name_clean: Option<String>,
    pub first_name_mp: Option<String>,
    pub last_name_mp: Option<String>,
    pub company_name_mp: Option<String>,
    pub first_initial: Option<String>,
    pub email_address: Option<String>,
    pub phone_number_clean: Option<String>,
    pub title: Option<String>,
    pub is_email_valid: Option<bool>,
    pub is_phone_valid: Option<bool>,
    pub is_company_domain_valid: Option<bool>,
    pub is_ip_addr_valid: Option<bool>,
}

impl ContactRecord {
    /// Creates a record with every attribute null.
    pub fn new(key: RecordKey) -> Self {
        Self {
            key,
            first_name_clean: None,
            last_name_clean: None,
            company_name_clean: None,
            first_name_mp: None,
            last_name_mp: None,
            company_name_mp: None,
            first_initial: None,
            email_address: None,
            phone_number_clean: None,
            title: None,
            is_email_valid: None,
            is_phone_valid: None,
            is_company_domain_valid: None,
            is_ip_addr_valid: None,
        }
    }

    /// Returns the comparable value of a field, or `None` when it is null or blank.
    ///
    /// Flags render as `"true"` / `"false"`.
    pub fn value(&self, field: FieldName) -> Option<&str> {
        let text = match field {
            FieldName::FirstNameClean => self.first_name_clean.as_deref(),
            FieldName::LastNameClean => self.last_name_clean.as_deref(),
            FieldName::CompanyNameClean => self.company_name_clean.as_deref(),
            FieldName::FirstNameMp => self.first_name_mp.as_deref(),
            FieldName::LastNameMp => self.last_name_mp.as_deref(),
            FieldName::CompanyNameMp => self.company_name_mp.as_deref(),
            FieldName::FirstInitial => self.first_initial.as_deref(),
            FieldName::EmailAddress => self.email_address.as_deref(),
            FieldName::PhoneNumberClean => self.phone_number_clean.as_deref(),
            FieldName::Title => self.title.as_deref(),
            FieldName::IsEmailValid => return self.is_email_valid.map(flag_str),
            FieldName::IsPhoneValid => return self.is_phone_valid.map(flag_str),
            FieldName::IsCompanyDomainValid => return self.is_company_domain_valid.map(flag_str),
            FieldName::IsIpAddrValid => return self.is_ip_addr_valid.map(flag_str),
        };
        text.filter(|value| !value.trim().is_empty())
    }

    /// Assigns a raw cell value to a field.
    ///
    /// Text is trimmed and blank text becomes null. Flags accept the usual
    /// boolean spellings; returns `false` when a non-blank flag value could not
    /// be parsed, in which case the field is left null.
    pub fn set(&mut self, field: FieldName, raw: &str) -> bool {
        let trimmed = raw.trim();
        if let Some(slot) = self.flag_slot(field) {
            let parsed = parse_flag(trimmed);
            *slot = parsed;
            return parsed.is_some() || trimmed.is_empty();
        }
        if let Some(slot) = self.text_slot(field) {
            *slot = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
        true
    }

    /// Builder form of [`ContactRecord::set`], handy for fixtures.
    #[must_use]
    pub fn with(mut self, field: FieldName, raw: &str) -> Self {
        self.set(field, raw);
        self
    }

    fn text_slot(&mut self, field: FieldName) -> Option<&mut Option<String>> {
        match field {
            FieldName::FirstNameClean => Some(&mut self.first_name_clean),
            FieldName::LastNameClean => Some(&mut self.last_name_clean),
            FieldName::CompanyNameClean => Some(&mut self.company_name_clean),
            FieldName::FirstNameMp => Some(&mut self.first_name_mp),
            FieldName::LastNameMp => Some(&mut self.last_name_mp),
            FieldName::CompanyNameMp => Some(&mut self.company_name_mp),
            FieldName::FirstInitial => Some(&mut self.first_initial),
            FieldName::EmailAddress => Some(&mut self.email_address),
            FieldName::PhoneNumberClean => Some(&mut self.phone_number_clean),
            FieldName::Title => Some(&mut self.title),
            _ => None,
        }
    }

    fn flag_slot(&mut self, field: FieldName) -> Option<&mut Option<bool>> {
        match field {
            FieldName::IsEmailValid => Some(&mut self.is_email_valid),
            FieldName::IsPhoneValid => Some(&mut self.is_phone_valid),
            FieldName::IsCompanyDomainValid => Some(&mut self.is_company_domain_valid),
            FieldName::IsIpAddrValid => Some(&mut self.is_ip_addr_valid),
            _ => None,
        }
    }
}

fn flag_str(flag: bool) -> &'static str {
    if flag { "true" } else { "false" }
}

/// Parses a validity flag. Unrecognized spellings yield `None`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// An immutable, key-ordered set of contact records.
///
/// Records are sorted by key on construction, so record positions follow the
/// canonical key order: position `i < j` implies `key(i) < key(j)`. Everything
/// downstream addresses records by position.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<ContactRecord>,
}

impl RecordSet {
    /// Builds a record set, rejecting duplicate keys.
    pub fn new(mut records: Vec<ContactRecord>) -> Result<Self, ModelError> {
        records.sort_by(|a, b| a.key.cmp(&b.key));
        if let Some(window) = records.windows(2).find(|w| w[0].key == w[1].key) {
            return Err(ModelError::DuplicateRecordKey {
                key: window[0].key.to_string(),
            });
        }
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ContactRecord> {
        self.records.get(index)
    }

    /// Position of a key in canonical order.
    pub fn position(&self, key: &RecordKey) -> Option<usize> {
        self.records.binary_search_by(|r| r.key.cmp(key)).ok()
    }

    pub fn records(&self) -> &[ContactRecord] {
        &self.records
    }

    pub fn keys(&self) -> impl Iterator<Item = &RecordKey> {
        self.records.iter().map(|r| &r.key)
    }
}
