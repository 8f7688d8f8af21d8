//! Tests for linkage-model types.

use linkage_model::{
    BlockingSpec, ContactRecord, FieldName, Group, MatchingConfig, ModelError, RecordKey,
    RecordSet, SingletonPolicy,
};

fn key(value: &str) -> RecordKey {
    RecordKey::new(value).expect("valid key")
}

#[test]
fn config_accepts_json_as_well_as_toml() {
    let json = r#"{
        "comparisons": [
            { "field": "phone_number_clean", "kind": "exact" },
            { "field": "title", "kind": "exact", "ignore_case": true }
        ],
        "strategies": [
            { "name": "phone", "blocking": { "kind": "field", "field": "phone_number_clean" }, "threshold": 1 }
        ]
    }"#;
    let config: MatchingConfig = serde_json::from_str(json).expect("parse config");
    config.validate().expect("valid config");
    assert_eq!(config.settings.singletons, SingletonPolicy::Include);
    assert_eq!(
        config.strategies[0].blocking,
        BlockingSpec::Field {
            field: FieldName::PhoneNumberClean
        }
    );
}

#[test]
fn exact_comparison_rejects_cutoff() {
    let json = r#"{
        "comparisons": [ { "field": "title", "kind": "exact", "cutoff": 0.5 } ],
        "strategies": [ { "name": "full", "blocking": { "kind": "full" }, "threshold": 1 } ]
    }"#;
    let err = serde_json::from_str::<MatchingConfig>(json).unwrap_err();
    assert!(
        err.to_string()
            .contains("'cutoff' does not apply to exact comparisons"),
        "{err}"
    );
}

#[test]
fn unknown_settings_key_is_rejected() {
    let json = r#"{
        "settings": { "max_pairs": 10 },
        "comparisons": [ { "field": "title", "kind": "exact" } ],
        "strategies": [ { "name": "full", "blocking": { "kind": "full" }, "threshold": 1 } ]
    }"#;
    assert!(serde_json::from_str::<MatchingConfig>(json).is_err());
}

#[test]
fn empty_configuration_fails_validation() {
    let mut config = MatchingConfig::contacts_default();
    config.strategies.clear();
    assert_eq!(config.validate(), Err(ModelError::NoStrategies));
    config.comparisons.clear();
    assert_eq!(config.validate(), Err(ModelError::NoComparisons));

    let config = MatchingConfig::contacts_default().with_max_candidate_pairs(0);
    assert_eq!(config.validate(), Err(ModelError::ZeroCandidateCeiling));
}

#[test]
fn record_set_orders_records_for_positions() {
    let set = RecordSet::new(vec![
        ContactRecord::new(key("sf-2")).with(FieldName::Title, "CTO"),
        ContactRecord::new(key("hs-9")),
        ContactRecord::new(key("sf-1")),
    ])
    .expect("record set");
    assert_eq!(set.len(), 3);
    assert_eq!(set.get(0).map(|r| r.key.as_str()), Some("hs-9"));
    assert_eq!(
        set.get(2).and_then(|r| r.value(FieldName::Title)),
        Some("CTO")
    );
    assert!(set.get(3).is_none());
}

#[test]
fn group_serializes_member_keys() {
    let group = Group::new(vec![key("b"), key("a")]);
    let json = serde_json::to_string(&group).expect("serialize group");
    assert_eq!(json, r#"{"members":["a","b"]}"#);
}

fn blocking_config(blocking: &str) -> String {
    format!(
        r#"{{
        "comparisons": [ {{ "field": "title", "kind": "exact" }} ],
        "strategies": [ {{ "name": "s", "blocking": {blocking}, "threshold": 1 }} ]
    }}"#
    )
}

#[test]
fn blocking_rejects_unknown_and_misplaced_keys() {
    let typo = blocking_config(r#"{ "kind": "field", "field": "title", "feild": "x" }"#);
    assert!(serde_json::from_str::<MatchingConfig>(&typo).is_err());

    let full_with_field = blocking_config(r#"{ "kind": "full", "field": "last_name_mp" }"#);
    let err = serde_json::from_str::<MatchingConfig>(&full_with_field).unwrap_err();
    assert!(
        err.to_string().contains("'field' does not apply to full blocking"),
        "{err}"
    );

    let missing = blocking_config(r#"{ "kind": "field" }"#);
    let err = serde_json::from_str::<MatchingConfig>(&missing).unwrap_err();
    assert!(err.to_string().contains("field blocking requires 'field'"), "{err}");

    let full = blocking_config(r#"{ "kind": "full" }"#);
    let config: MatchingConfig = serde_json::from_str(&full).expect("full blocking");
    assert_eq!(config.strategies[0].blocking, BlockingSpec::Full);
}
