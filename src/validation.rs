//! Type-conditional validation of a declaration form
//!
//! The engine walks the ordered checks of the active instrument type and
//! collects every failure in one pass so the UI can highlight all invalid
//! fields at once. It never errors and never panics; an empty list means the
//! form may be submitted.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ValidationFailure;
use crate::form::{AttachedDetailItem, FormState};
use crate::registry::{self, AmountBound, Check, InstrumentTypeDescriptor, TopField};
use crate::schema::{self, FieldKind, FieldSpec};
use crate::utils::{is_blank, parse_number};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub key: String,
    pub message: String,
}

impl From<ValidationFailure> for ValidationError {
    fn from(failure: ValidationFailure) -> Self {
        Self {
            key: failure.key().to_owned(),
            message: failure.to_string(),
        }
    }
}

/// Errors of one validation pass, tagged with the type code they were computed
/// for so a caller can tell when a report went stale after a type switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub type_code: String,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.errors.iter().any(|e| e.key == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationEngine {
    check_date_order: bool,
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self {
            check_date_order: true,
        }
    }
}

impl ValidationEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            check_date_order: config.check_date_order,
        }
    }

    pub fn validate(
        &self,
        form: &FormState,
        details: &[AttachedDetailItem],
    ) -> Vec<ValidationError> {
        self.failures(form, details)
            .into_iter()
            .map(ValidationError::from)
            .collect()
    }

    pub fn report(&self, form: &FormState, details: &[AttachedDetailItem]) -> ValidationReport {
        ValidationReport {
            type_code: form.descriptor().code.as_str().to_owned(),
            errors: self.validate(form, details),
        }
    }

    /// Typed failures in check order.
    pub fn failures(
        &self,
        form: &FormState,
        details: &[AttachedDetailItem],
    ) -> Vec<ValidationFailure> {
        let descriptor = form.descriptor();
        let mut failures = vec![];

        for check in descriptor.checks {
            match *check {
                Check::Present(field) => check_present(form, field, &mut failures),
                Check::DateOrder => {
                    if self.check_date_order {
                        check_date_order(form, &mut failures)
                    }
                }
                Check::AmountWithinBound => check_amount_bound(form, descriptor, &mut failures),
                Check::Category => check_category(form, descriptor, &mut failures),
                Check::SubtypeSelected => {
                    check_subtype_selected(form, descriptor, details, &mut failures)
                }
                Check::SubtypeFields => {
                    check_subtype_fields(form, descriptor, details, &mut failures)
                }
            }
        }

        failures
    }
}

/// Validates with the default engine.
pub fn validate(form: &FormState, details: &[AttachedDetailItem]) -> Vec<ValidationError> {
    ValidationEngine::default().validate(form, details)
}

fn missing(key: &str, label: &str) -> ValidationFailure {
    ValidationFailure::FieldMissing {
        key: key.to_owned(),
        label: label.to_owned(),
    }
}

/// Zero, blank and unparsable amounts are missing; anything else was entered.
fn amount_present(amount: f64) -> bool {
    amount.is_finite() && amount != 0.0
}

/// Bound reported for entered amounts below zero.
const POSITIVE: AmountBound = AmountBound::Above(0);

fn out_of_range(key: &str, label: &str, bound: AmountBound) -> ValidationFailure {
    ValidationFailure::RangeViolation {
        key: key.to_owned(),
        label: label.to_owned(),
        bound,
    }
}

fn check_present(form: &FormState, field: TopField, failures: &mut Vec<ValidationFailure>) {
    let present = match field {
        TopField::EffectiveDate => form.effective_date.is_some(),
        TopField::ExpireDate => form.expire_date.is_some(),
        TopField::InstrumentAmount => amount_present(form.instrument_amount),
        TopField::RelatedTaxId => !is_blank(&form.related_party.tax_id),
        TopField::RelatedName => !is_blank(&form.related_party.name),
        TopField::RelationshipRole => {
            let role = form.relationship_role.trim();
            if role.is_empty() {
                false
            } else {
                // a type without role options tolerates any non-empty role
                let options = registry::role_options_for(&form.instrument_type_code);
                if !options.is_empty() && !options.iter().any(|o| o.key == role) {
                    failures.push(ValidationFailure::InvalidChoice {
                        key: field.key().to_owned(),
                        label: field.label().to_owned(),
                        value: role.to_owned(),
                    });
                }
                true
            }
        }
    };
    if !present {
        failures.push(missing(field.key(), field.label()));
    } else if field == TopField::InstrumentAmount
        && form.instrument_amount < 0.0
        && selected_bound(form, form.descriptor()).is_none()
    {
        // a selected condition reports its own bound
        failures.push(out_of_range(field.key(), field.label(), POSITIVE));
    }
}

fn selected_bound(
    form: &FormState,
    descriptor: &InstrumentTypeDescriptor,
) -> Option<AmountBound> {
    if !descriptor.checks.contains(&Check::AmountWithinBound) {
        return None;
    }
    descriptor
        .selected_option(&form.action_type)
        .and_then(|option| option.amount_bound)
}

fn check_date_order(form: &FormState, failures: &mut Vec<ValidationFailure>) {
    if let (Some(effective), Some(expire)) = (form.effective_date, form.expire_date) {
        if expire < effective {
            failures.push(ValidationFailure::DateOrder {
                key: TopField::ExpireDate.key().to_owned(),
            });
        }
    }
}

// zero amounts are already reported as missing, and without a selected
// condition there is no bound to check against
fn check_amount_bound(
    form: &FormState,
    descriptor: &InstrumentTypeDescriptor,
    failures: &mut Vec<ValidationFailure>,
) {
    let amount = form.instrument_amount;
    if !amount_present(amount) {
        return;
    }
    let Some(bound) = selected_bound(form, descriptor) else {
        return;
    };
    let field = TopField::InstrumentAmount;
    if !bound.contains(amount) {
        failures.push(out_of_range(field.key(), field.label(), bound));
    } else if amount < 0.0 {
        failures.push(out_of_range(field.key(), field.label(), POSITIVE));
    }
}

fn check_category(
    form: &FormState,
    descriptor: &InstrumentTypeDescriptor,
    failures: &mut Vec<ValidationFailure>,
) {
    let Some(selector) = &descriptor.category else {
        return;
    };
    if is_blank(&form.action_type) {
        failures.push(missing(selector.key, selector.label));
    } else if descriptor.selected_option(&form.action_type).is_none() {
        failures.push(ValidationFailure::InvalidChoice {
            key: selector.key.to_owned(),
            label: selector.label.to_owned(),
            value: form.action_type.trim().to_owned(),
        });
    }
}

fn check_subtype_selected(
    form: &FormState,
    descriptor: &InstrumentTypeDescriptor,
    details: &[AttachedDetailItem],
    failures: &mut Vec<ValidationFailure>,
) {
    for class in descriptor.applicable_classes(&form.action_type) {
        if !details.iter().any(|item| item.detail_class == class) {
            failures.push(ValidationFailure::SelectionMissing {
                key: class.selection_key().to_owned(),
                label: class.label().to_owned(),
            });
        }
    }
}

fn check_subtype_fields(
    form: &FormState,
    descriptor: &InstrumentTypeDescriptor,
    details: &[AttachedDetailItem],
    failures: &mut Vec<ValidationFailure>,
) {
    for class in descriptor.applicable_classes(&form.action_type) {
        for subtype_schema in schema::schemas_for(class) {
            let selected = details.iter().any(|item| {
                item.detail_class == class && item.detail_subtype == subtype_schema.subtype
            });
            if !selected {
                continue;
            }
            for field in subtype_schema.fields {
                check_subtype_field(form, field, failures);
            }
        }
    }
}

fn check_subtype_field(
    form: &FormState,
    field: &FieldSpec,
    failures: &mut Vec<ValidationFailure>,
) {
    let value = form.field(field.key);
    match field.kind {
        FieldKind::Text => {
            if field.required && is_blank(value) {
                failures.push(missing(field.key, field.label));
            }
        }
        FieldKind::Number => match parse_number(value).filter(|n| amount_present(*n)) {
            Some(number) if number < 0.0 => {
                failures.push(out_of_range(field.key, field.label, POSITIVE))
            }
            Some(_) => {}
            None if field.required => failures.push(missing(field.key, field.label)),
            None => {}
        },
    }
}
