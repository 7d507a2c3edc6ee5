//! Maps form state to the filing service payload
//!
//! A pure transformation: the same inputs always produce the same payload. The
//! mapper never consults validation; missing values are coerced to `""` or `0`
//! so it can run on any state, and callers gate submission on an empty error
//! list instead.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::form::{AttachedDetailItem, FormState};
use crate::reconciler;
use crate::registry::{self, InstrumentTypeCode, InstrumentTypeDescriptor};
use crate::schema::{self, FieldKind};
use crate::utils::{format_date, parse_number};

/// Branch type sent for every tax payer.
pub const BRANCH_TYPE: &str = "O";

// NOTE: the minicbor indices define the encoding the submission digest is
// computed over. Append new fields with new indices, never renumber.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, minicbor::Encode, minicbor::Decode,
)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    #[n(0)]
    pub document_detail: DocumentDetail,
    #[n(1)]
    pub inst_info: Vec<InstInfo>,
}

#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, minicbor::Encode, minicbor::Decode,
)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetail {
    #[n(0)]
    pub type_code: String,
}

#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, minicbor::Encode, minicbor::Decode,
)]
#[serde(rename_all = "camelCase")]
pub struct InstInfo {
    #[n(0)]
    pub effective_date: String,
    #[n(1)]
    pub expire_date: String,
    #[n(2)]
    pub inst_amount: f64,
    #[n(3)]
    pub tax_payer: TaxPayer,
    #[n(4)]
    pub attach_detail: AttachDetail,
    #[n(5)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relate_contract: Vec<RelatedContract>,
}

#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, minicbor::Encode, minicbor::Decode,
)]
#[serde(rename_all = "camelCase")]
pub struct TaxPayer {
    #[n(0)]
    pub branch_no: String,
    #[n(1)]
    pub branch_type: String,
    #[n(2)]
    pub relationship: String,
}

#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, minicbor::Encode, minicbor::Decode,
)]
#[serde(rename_all = "camelCase")]
pub struct AttachDetail {
    /// Category selector, `"0"` when not applicable.
    #[n(0)]
    pub action_type: String,
    #[n(1)]
    pub array_detail: Vec<DetailRecord>,
}

/// One attached-detail item with its subtype fields under payload names.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, minicbor::Encode, minicbor::Decode,
)]
#[serde(rename_all = "camelCase")]
pub struct DetailRecord {
    #[n(0)]
    pub detail_class: String,
    #[n(1)]
    pub subtype: String,
    #[n(2)]
    #[serde(flatten)]
    pub fields: BTreeMap<String, DetailValue>,
}

impl DetailRecord {
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name)? {
            DetailValue::Text(value) => Some(value),
            DetailValue::Number(_) => None,
        }
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.fields.get(name)? {
            DetailValue::Number(value) => Some(*value),
            DetailValue::Text(_) => None,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, minicbor::Encode, minicbor::Decode,
)]
#[serde(untagged)]
pub enum DetailValue {
    #[n(0)]
    Text(#[n(0)] String),
    #[n(1)]
    Number(#[n(0)] f64),
}

#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, minicbor::Encode, minicbor::Decode,
)]
#[serde(rename_all = "camelCase")]
pub struct RelatedContract {
    #[n(0)]
    pub tax_id: String,
    #[n(1)]
    pub name: String,
}

impl SubmissionPayload {
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// The single instrument record; every payload carries exactly one.
    pub fn instrument(&self) -> Option<&InstInfo> {
        self.inst_info.first()
    }
}

type MapFn = fn(&FormState, &InstrumentTypeDescriptor, &[AttachedDetailItem]) -> InstInfo;

const MAPPERS: &[(InstrumentTypeCode, MapFn)] = &[
    (InstrumentTypeCode::Lease, map_attached),
    (InstrumentTypeCode::HirePurchase, map_categorised),
    (InstrumentTypeCode::ServiceContract, map_attached),
    (InstrumentTypeCode::PowerOfAttorney, map_categorised),
    (InstrumentTypeCode::Guarantee, map_guarantee),
    (InstrumentTypeCode::VehicleTransferReceipt, map_attached),
];

/// Builds the payload for `type_code`. Unknown codes map as a lease.
pub fn map(
    form: &FormState,
    type_code: &str,
    details: &[AttachedDetailItem],
) -> SubmissionPayload {
    let descriptor = registry::describe(type_code);
    let map_fn = MAPPERS
        .iter()
        .find(|(code, _)| *code == descriptor.code)
        .map(|(_, f)| *f)
        .unwrap_or(map_attached as MapFn);

    SubmissionPayload {
        document_detail: DocumentDetail {
            type_code: descriptor.code.as_str().to_owned(),
        },
        inst_info: vec![map_fn(form, descriptor, details)],
    }
}

/// Builds the payload from the form's own type code and detail set.
pub fn map_form(form: &FormState) -> SubmissionPayload {
    map(form, &form.instrument_type_code, &form.attached_details)
}

/// Encodes the payload to CBOR and returns its sha256 digest with the bytes.
pub fn finalise(payload: &SubmissionPayload) -> anyhow::Result<(String, Vec<u8>)> {
    let cbor = minicbor::to_vec(payload)?;
    let hash = sha256::digest(&cbor);

    Ok((hash, cbor))
}

// types without a category selector: lease, service contract, vehicle receipt
fn map_attached(
    form: &FormState,
    descriptor: &InstrumentTypeDescriptor,
    details: &[AttachedDetailItem],
) -> InstInfo {
    inst_info(form, "0", array_detail(form, descriptor, details))
}

// hire-purchase and power of attorney send their selector as the action type
fn map_categorised(
    form: &FormState,
    descriptor: &InstrumentTypeDescriptor,
    details: &[AttachedDetailItem],
) -> InstInfo {
    inst_info(
        form,
        action_type(form, descriptor),
        array_detail(form, descriptor, details),
    )
}

fn map_guarantee(
    form: &FormState,
    descriptor: &InstrumentTypeDescriptor,
    details: &[AttachedDetailItem],
) -> InstInfo {
    let mut info = map_categorised(form, descriptor, details);
    info.relate_contract = vec![RelatedContract {
        tax_id: form.related_party.tax_id.trim().to_owned(),
        name: form.related_party.name.trim().to_owned(),
    }];
    info
}

fn action_type<'a>(form: &FormState, descriptor: &'a InstrumentTypeDescriptor) -> &'a str {
    descriptor
        .selected_option(&form.action_type)
        .map(|option| option.code)
        .unwrap_or("0")
}

fn inst_info(form: &FormState, action_type: &str, array_detail: Vec<DetailRecord>) -> InstInfo {
    let amount = if form.instrument_amount.is_finite() {
        form.instrument_amount
    } else {
        0.0
    };

    InstInfo {
        effective_date: format_date(form.effective_date),
        expire_date: format_date(form.expire_date),
        inst_amount: amount,
        tax_payer: TaxPayer {
            branch_no: form.party.branch_no.trim().to_owned(),
            branch_type: BRANCH_TYPE.to_owned(),
            relationship: form.relationship_role.trim().to_owned(),
        },
        attach_detail: AttachDetail {
            action_type: action_type.to_owned(),
            array_detail,
        },
        relate_contract: vec![],
    }
}

fn array_detail(
    form: &FormState,
    descriptor: &InstrumentTypeDescriptor,
    details: &[AttachedDetailItem],
) -> Vec<DetailRecord> {
    let applicable = descriptor.applicable_classes(&form.action_type);

    reconciler::dedup(details)
        .into_iter()
        .filter_map(|item| {
            if !applicable.contains(&item.detail_class) {
                debug!(
                    class = %item.detail_class,
                    subtype = %item.detail_subtype,
                    code = %descriptor.code,
                    "skipping detail item not applicable to instrument"
                );
                return None;
            }
            schema::schema_for(item.detail_class, item.detail_subtype)
        })
        .map(|subtype_schema| {
            let fields = subtype_schema
                .fields
                .iter()
                .map(|field| {
                    let raw = form.field(field.key);
                    let value = match field.kind {
                        FieldKind::Text => DetailValue::Text(raw.trim().to_owned()),
                        FieldKind::Number => DetailValue::Number(parse_number(raw).unwrap_or(0.0)),
                    };
                    (field.payload.to_owned(), value)
                })
                .collect();

            DetailRecord {
                detail_class: subtype_schema.class.as_str().to_owned(),
                subtype: subtype_schema.code.to_owned(),
                fields,
            }
        })
        .collect()
}
