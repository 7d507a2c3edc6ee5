//! Property-based tests for validation completeness, mapping purity and the
//! instrument type switch
//!
//! Forms are generated across every instrument type with random detail
//! selections and random (often nonsensical) field values. The engine and the
//! mapper must cope with all of them without panicking.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use proptest::prelude::*;
use stamp_duty::{
    form::{AttachedDetailItem, FormState},
    mapper,
    registry::{self, DetailClass, DetailSubtype},
    schema,
    validation::{self, ValidationError},
};

const TYPE_CODES: [&str; 6] = ["1", "3", "4", "7", "17", "28"];

const TOP_LEVEL_KEYS: [&str; 6] = [
    "effectiveDate",
    "expireDate",
    "relationshipRole",
    "instrumentAmount",
    "relatedTaxId",
    "relatedName",
];

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

fn error_keys(errors: &[ValidationError]) -> HashSet<String> {
    errors.iter().map(|e| e.key.clone()).collect()
}

fn valid_pairs() -> Vec<(DetailClass, DetailSubtype)> {
    DetailClass::ALL
        .iter()
        .flat_map(|class| schema::schemas_for(*class).map(|s| (s.class, s.subtype)))
        .collect()
}

fn all_field_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = DetailClass::ALL
        .iter()
        .flat_map(|class| schema::schemas_for(*class))
        .flat_map(|s| s.fields.iter().map(|f| f.key))
        .collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}

/// Every key validation may legitimately report for `code`, whatever the
/// category selection.
fn keys_allowed_for(code: &str) -> HashSet<String> {
    let descriptor = registry::describe(code);
    let mut allowed: HashSet<String> = TOP_LEVEL_KEYS.iter().map(|k| k.to_string()).collect();

    let mut classes = descriptor.detail_classes.to_vec();
    classes.extend(descriptor.category_classes());
    if let Some(selector) = &descriptor.category {
        allowed.insert(selector.key.to_string());
    }
    for class in classes {
        allowed.insert(class.selection_key().to_string());
        for subtype_schema in schema::schemas_for(class) {
            allowed.extend(subtype_schema.fields.iter().map(|f| f.key.to_string()));
        }
    }
    allowed
}

// PROPERTY TEST STRATEGIES

fn value_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        "[a-z]{1,8}",
        "[0-9]{1,6}",
    ]
}

/// Strategy to generate an arbitrary form of any instrument type
fn form_strategy() -> impl Strategy<Value = FormState> {
    (
        prop::sample::select(TYPE_CODES.to_vec()),
        prop::sample::select(vec!["", "0", "1", "2", "3", "9"]),
        prop::sample::select(vec!["", "1", "2", "9"]),
        prop_oneof![Just(0.0f64), 1.0f64..50_000.0],
        prop::option::of((1u32..=12, 1u32..=28)),
        prop::option::of((1u32..=12, 1u32..=28)),
        prop::sample::subsequence(valid_pairs(), 0..=6),
        prop::collection::btree_map(
            prop::sample::select(all_field_keys()),
            value_strategy(),
            0..24,
        ),
        ("[a-z]{0,4}", "[a-z]{0,4}"),
    )
        .prop_map(
            |(code, action, role, amount, effective, expire, pairs, fields, related)| {
                let mut form = FormState::new(code, date(1, 1))
                    .set_action_type(action)
                    .set_relationship_role(role)
                    .set_instrument_amount(amount)
                    .set_related_party(&related.0, &related.1)
                    .set_attached_details(
                        pairs
                            .into_iter()
                            .map(|(class, subtype)| AttachedDetailItem::new(class, subtype))
                            .collect(),
                    );
                form.effective_date = effective.map(|(m, d)| date(m, d));
                form.expire_date = expire.map(|(m, d)| date(m, d));
                form.fields = fields
                    .into_iter()
                    .map(|(k, v): (&str, String)| (k.to_string(), v))
                    .collect::<BTreeMap<_, _>>();
                form
            },
        )
}

/// A lease where every check passes: land, building and monthly rent selected.
fn complete_lease() -> (FormState, Vec<AttachedDetailItem>) {
    let form = FormState::new("1", date(1, 1))
        .set_effective_date(date(2, 1))
        .set_expire_date(date(12, 31))
        .set_relationship_role("2")
        .set_instrument_amount(120_000.0)
        .set_field("landParcelNumber", "12")
        .set_field("landProvince", "Nonthaburi")
        .set_field("landDistrict", "Pak Kret")
        .set_field("landSubDistrict", "Bang Talat")
        .set_field("buildingNumber", "45/6")
        .set_field("buildingProvince", "Nonthaburi")
        .set_field("buildingDistrict", "Pak Kret")
        .set_field("buildingSubDistrict", "Bang Talat")
        .set_field("rentMonthlyAmount", "10000")
        .set_field("rentMonthlyPeriods", "12");
    let details = vec![
        AttachedDetailItem::new(DetailClass::LeasedAsset, DetailSubtype::Land),
        AttachedDetailItem::new(DetailClass::LeasedAsset, DetailSubtype::Building),
        AttachedDetailItem::new(DetailClass::RentComputation, DetailSubtype::MonthlyRent),
    ];
    (form, details)
}

const LEASE_REQUIRED: [&str; 14] = [
    "effectiveDate",
    "expireDate",
    "relationshipRole",
    "instrumentAmount",
    "landParcelNumber",
    "landProvince",
    "landDistrict",
    "landSubDistrict",
    "buildingNumber",
    "buildingProvince",
    "buildingDistrict",
    "buildingSubDistrict",
    "rentMonthlyAmount",
    "rentMonthlyPeriods",
];

fn blank(form: &mut FormState, key: &str) {
    match key {
        "effectiveDate" => form.effective_date = None,
        "expireDate" => form.expire_date = None,
        "relationshipRole" => form.relationship_role.clear(),
        "instrumentAmount" => form.instrument_amount = 0.0,
        other => {
            form.fields.remove(other);
        }
    }
}

// PROPERTY TESTS
proptest! {
    /// Property: every missing required field is reported, not just the first
    #[test]
    fn every_missing_field_is_reported(
        missing in prop::sample::subsequence(LEASE_REQUIRED.to_vec(), 1..=LEASE_REQUIRED.len())
    ) {
        let (mut form, details) = complete_lease();
        prop_assert!(validation::validate(&form, &details).is_empty());

        for key in &missing {
            blank(&mut form, key);
        }
        let reported = error_keys(&validation::validate(&form, &details));

        let expected: HashSet<String> = missing.iter().map(|k| k.to_string()).collect();
        prop_assert_eq!(reported, expected);
    }

    /// Property: validation and mapping never panic and are deterministic
    #[test]
    fn mapping_is_pure(form in form_strategy()) {
        let details = form.attached_details.clone();

        let first = mapper::map(&form, &form.instrument_type_code, &details);
        let second = mapper::map(&form, &form.instrument_type_code, &details);
        prop_assert_eq!(&first, &second);

        let (digest_a, _) = mapper::finalise(&first).unwrap();
        let (digest_b, _) = mapper::finalise(&second).unwrap();
        prop_assert_eq!(digest_a, digest_b);

        prop_assert_eq!(
            validation::validate(&form, &details),
            validation::validate(&form, &details)
        );
    }

    /// Property: after a type switch no error refers to the previous type
    #[test]
    fn type_switch_never_reports_stale_keys(
        form in form_strategy(),
        next in prop::sample::select(TYPE_CODES.to_vec()),
    ) {
        let switched = form.switch_type(next);
        let allowed = keys_allowed_for(next);

        // the detail set of the old type is handed over on purpose
        let errors = validation::validate(&switched, &form.attached_details);
        for key in error_keys(&errors) {
            prop_assert!(allowed.contains(&key), "stale key {} after switch to {}", key, next);
        }
    }

    /// Property: whatever the form holds, errors only name keys of its type
    #[test]
    fn errors_stay_within_the_active_type(form in form_strategy()) {
        let allowed = keys_allowed_for(&form.instrument_type_code);
        for key in error_keys(&validation::validate(&form, &form.attached_details)) {
            prop_assert!(allowed.contains(&key), "unexpected key {}", key);
        }
    }

    /// Property: the payload only carries records of applicable classes, once each
    #[test]
    fn payload_records_are_applicable_and_unique(form in form_strategy()) {
        let descriptor = form.descriptor();
        let applicable: HashSet<&str> = descriptor
            .applicable_classes(&form.action_type)
            .iter()
            .map(|c| c.as_str())
            .collect();

        let payload = mapper::map_form(&form);
        let info = payload.instrument().unwrap();
        let mut seen = HashSet::new();
        for record in &info.attach_detail.array_detail {
            prop_assert!(applicable.contains(record.detail_class.as_str()));
            prop_assert!(seen.insert((record.detail_class.clone(), record.subtype.clone())));
        }
        prop_assert_eq!(info.relate_contract.is_empty(), form.instrument_type_code != "17");
    }
}
