//! End-to-end runs over small contact sets.

use linkage_core::{ErrorCategory, run};
use linkage_model::{
    BlockingSpec, ComparisonSpec, ContactRecord, FieldName, Group, MatchingConfig, RecordKey,
    RecordSet, SingletonPolicy, StrategySpec,
};

fn contact(key: &str, fields: &[(FieldName, &str)]) -> ContactRecord {
    fields.iter().fold(
        ContactRecord::new(RecordKey::new(key).expect("key")),
        |record, (field, value)| record.with(*field, value),
    )
}

fn keys(group: &Group) -> Vec<&str> {
    group.members().iter().map(RecordKey::as_str).collect()
}

/// The default contact setup, comparing email addresses case-insensitively.
fn config_with_folded_email() -> MatchingConfig {
    let mut config = MatchingConfig::contacts_default();
    config.comparisons[3] = ComparisonSpec::exact(FieldName::EmailAddress).ignoring_case();
    config
}

#[test]
fn same_name_code_and_phone_with_email_case_difference_match() {
    let records = RecordSet::new(vec![
        contact(
            "sf-1",
            &[
                (FieldName::LastNameMp, "SM0"),
                (FieldName::FirstNameMp, "JN"),
                (FieldName::PhoneNumberClean, "+15551234567"),
                (FieldName::EmailAddress, "John.Smith@Acme.com"),
            ],
        ),
        contact(
            "hs-4",
            &[
                (FieldName::LastNameMp, "SM0"),
                (FieldName::FirstNameMp, "JN"),
                (FieldName::PhoneNumberClean, "+15551234567"),
                (FieldName::EmailAddress, "john.smith@acme.com"),
            ],
        ),
    ])
    .expect("records");
    let outcome = run(&records, &config_with_folded_email()).expect("run");
    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(keys(&outcome.groups[0]), vec!["hs-4", "sf-1"]);
}

#[test]
fn transitive_links_across_strategies_form_one_group() {
    // a-b agree through phone blocking, b-c only through full comparison.
    let phone = "+15550001111";
    let records = RecordSet::new(vec![
        contact(
            "a",
            &[
                (FieldName::PhoneNumberClean, phone),
                (FieldName::FirstNameMp, "MR"),
                (FieldName::FirstInitial, "M"),
                (FieldName::Title, "CFO"),
            ],
        ),
        contact(
            "b",
            &[
                (FieldName::PhoneNumberClean, phone),
                (FieldName::LastNameMp, "KL"),
                (FieldName::FirstNameMp, "MR"),
                (FieldName::FirstInitial, "M"),
                (FieldName::Title, "CFO"),
                (FieldName::EmailAddress, "m@globex.com"),
                (FieldName::CompanyNameClean, "globex"),
            ],
        ),
        contact(
            "c",
            &[
                (FieldName::LastNameMp, "KLN"),
                (FieldName::FirstNameMp, "MR"),
                (FieldName::FirstInitial, "M"),
                (FieldName::Title, "CFO"),
                (FieldName::EmailAddress, "m@globex.com"),
                (FieldName::CompanyNameClean, "globex corp"),
            ],
        ),
    ])
    .expect("records");
    let outcome = run(&records, &MatchingConfig::contacts_default()).expect("run");

    let matches: Vec<_> = outcome.report.strategies.iter().map(|s| s.matches).collect();
    // last_name_phonetic: no shared codes; phone_number: a-b (4 fields);
    // full: b-c (5 fields) while a-b reaches only 4 and a-c only 3.
    assert_eq!(matches, vec![0, 1, 1]);
    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(keys(&outcome.groups[0]), vec!["a", "b", "c"]);
}

#[test]
fn record_with_too_few_populated_fields_stays_alone() {
    let shared = [
        (FieldName::LastNameMp, "JNS"),
        (FieldName::Title, "VP Sales"),
        (FieldName::CompanyNameClean, "initech"),
    ];
    let records = RecordSet::new(vec![
        contact("x", &shared),
        contact("y", &shared),
    ])
    .expect("records");
    let outcome = run(&records, &MatchingConfig::contacts_default()).expect("run");
    assert_eq!(outcome.report.matched_pairs, 0);
    assert_eq!(outcome.groups.len(), 2);
    assert!(outcome.groups.iter().all(Group::is_singleton));
    let histogram = &outcome.report.strategies[0].histogram;
    assert_eq!(histogram.count(3), 1);
}

#[test]
fn distinct_records_are_all_singletons() {
    let records = RecordSet::new(
        (0..10_000)
            .map(|i| {
                let last = format!("L{i}");
                let phone = format!("+1{i:010}");
                contact(
                    &format!("r{i:05}"),
                    &[
                        (FieldName::LastNameMp, last.as_str()),
                        (FieldName::PhoneNumberClean, phone.as_str()),
                    ],
                )
            })
            .collect(),
    )
    .expect("records");
    // Default setup, exhaustive strategy included: ~50M candidates, none stored.
    let config = MatchingConfig::contacts_default();
    let outcome = run(&records, &config).expect("run");
    assert_eq!(outcome.groups.len(), 10_000);
    assert_eq!(outcome.report.singletons, 10_000);
    assert_eq!(outcome.report.unique_edges, 0);
    let full = outcome
        .report
        .strategies
        .iter()
        .find(|s| s.name == "full")
        .expect("full strategy");
    assert_eq!(full.candidate_pairs, 49_995_000);
    assert_eq!(full.matches, 0);

    let mut blocked = config.with_singletons(SingletonPolicy::Exclude);
    blocked.strategies.retain(|s| s.blocking != BlockingSpec::Full);
    let excluded = run(&records, &blocked).expect("run");
    assert!(excluded.groups.is_empty());
}

#[test]
fn pair_found_by_two_strategies_unions_once() {
    let fields = [
        (FieldName::LastNameMp, "BRN"),
        (FieldName::FirstNameMp, "AL"),
        (FieldName::FirstInitial, "A"),
        (FieldName::Title, "Engineer"),
        (FieldName::CompanyNameClean, "hooli"),
    ];
    let records = RecordSet::new(vec![contact("p", &fields), contact("q", &fields)])
        .expect("records");
    let outcome = run(&records, &MatchingConfig::contacts_default()).expect("run");
    assert_eq!(outcome.report.matched_pairs, 2);
    assert_eq!(outcome.report.unique_edges, 1);
    assert_eq!(outcome.report.cluster.edges, 1);
    assert_eq!(outcome.report.cluster.unions, 1);
    assert_eq!(outcome.report.cluster.redundant, 0);
    assert_eq!(keys(&outcome.groups[0]), vec!["p", "q"]);
}

#[test]
fn custom_strategies_run_in_configuration_order() {
    let config = MatchingConfig {
        settings: Default::default(),
        comparisons: vec![
            ComparisonSpec::exact(FieldName::EmailAddress).ignoring_case(),
            ComparisonSpec::exact(FieldName::PhoneNumberClean),
        ],
        strategies: vec![StrategySpec::new(
            "email",
            BlockingSpec::Field {
                field: FieldName::EmailAddress,
            },
            1,
        )],
    };
    let records = RecordSet::new(vec![
        contact("1", &[(FieldName::EmailAddress, "a@x.io")]),
        contact("2", &[(FieldName::EmailAddress, "a@x.io")]),
        contact("3", &[(FieldName::EmailAddress, "A@X.IO")]),
    ])
    .expect("records");
    let outcome = run(&records, &config).expect("run");
    // Blocking uses exact values, so "3" is never a candidate.
    assert_eq!(outcome.report.strategies[0].candidate_pairs, 1);
    let groups: Vec<_> = outcome.groups.iter().map(keys).collect();
    assert_eq!(groups, vec![vec!["1", "2"], vec!["3"]]);
}

#[test]
fn scale_errors_name_the_strategy() {
    let records = RecordSet::new(
        (0..20)
            .map(|i| contact(&format!("k{i}"), &[]))
            .collect(),
    )
    .expect("records");
    let config = MatchingConfig::contacts_default().with_max_candidate_pairs(100);
    let err = run(&records, &config).expect_err("over ceiling");
    assert_eq!(err.category(), ErrorCategory::Scale);
    let message = err.to_string();
    assert!(message.contains("'full'") && message.contains("190") && message.contains("100"));
}
