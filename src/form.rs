//! Editable form state for one declaration
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::registry::{self, DetailClass, DetailSubtype, InstrumentTypeDescriptor};

/// A selected facet of the instrument. Only a tag: the values behind it are
/// looked up in [`FormState::fields`] through the subtype's field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDetailItem {
    pub detail_class: DetailClass,
    pub detail_subtype: DetailSubtype,
}

impl AttachedDetailItem {
    pub fn new(detail_class: DetailClass, detail_subtype: DetailSubtype) -> Self {
        Self {
            detail_class,
            detail_subtype,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub house_no: String,
    pub street: String,
    pub province: String,
    pub district: String,
    pub sub_district: String,
    pub postal_code: String,
}

/// Identity of the filing party. Survives an instrument type switch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyInfo {
    pub tax_id: String,
    pub branch_no: String,
    pub name: String,
    pub address: Address,
}

/// Counterparty of a guarantee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedParty {
    pub tax_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub instrument_type_code: String,
    pub relationship_role: String,
    pub effective_date: Option<NaiveDate>,
    pub expire_date: Option<NaiveDate>,
    pub creation_date: NaiveDate,
    pub instrument_amount: f64,
    /// Category selector value, `"0"` for types without one.
    pub action_type: String,
    pub party: PartyInfo,
    pub related_party: RelatedParty,
    pub attached_details: Vec<AttachedDetailItem>,
    /// Subtype-specific inputs keyed by form key, e.g. `landProvince`.
    pub fields: BTreeMap<String, String>,
}

/// Partial update written back to the state container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormPatch {
    pub relationship_role: Option<String>,
    pub effective_date: Option<Option<NaiveDate>>,
    pub expire_date: Option<Option<NaiveDate>>,
    pub instrument_amount: Option<f64>,
    pub action_type: Option<String>,
    pub party: Option<PartyInfo>,
    pub related_party: Option<RelatedParty>,
    pub attached_details: Option<Vec<AttachedDetailItem>>,
    /// Merged into the field bag; an empty value removes the key.
    pub fields: BTreeMap<String, String>,
}

impl FormPatch {
    pub fn attached_details(items: Vec<AttachedDetailItem>) -> Self {
        Self {
            attached_details: Some(items),
            ..Self::default()
        }
    }

    pub fn field(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl FormState {
    /// A fresh form with the defaults of `code`. Unknown codes start a lease.
    pub fn new(code: &str, creation_date: NaiveDate) -> Self {
        let descriptor = registry::describe(code);

        Self {
            instrument_type_code: descriptor.code.as_str().to_owned(),
            relationship_role: String::new(),
            effective_date: None,
            expire_date: None,
            creation_date,
            instrument_amount: 0.0,
            action_type: descriptor.default_action_type().to_owned(),
            party: PartyInfo::default(),
            related_party: RelatedParty::default(),
            attached_details: vec![],
            fields: BTreeMap::new(),
        }
    }

    pub fn with_config(code: &str, creation_date: NaiveDate, config: &Config) -> Self {
        let mut state = Self::new(code, creation_date);
        state.party.branch_no = config.default_branch_no.clone();
        state
    }

    /// Fresh state for another instrument type. Only the party identity and
    /// address carry over; everything type-specific is reset.
    pub fn switch_type(&self, code: &str) -> Self {
        let mut next = Self::new(code, self.creation_date);
        next.party = self.party.clone();
        next
    }

    pub fn descriptor(&self) -> &'static InstrumentTypeDescriptor {
        registry::describe(&self.instrument_type_code)
    }

    /// Value of a bag field, empty when unset.
    pub fn field(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or_default()
    }

    pub fn apply(&mut self, patch: FormPatch) {
        if let Some(role) = patch.relationship_role {
            self.relationship_role = role;
        }
        if let Some(date) = patch.effective_date {
            self.effective_date = date;
        }
        if let Some(date) = patch.expire_date {
            self.expire_date = date;
        }
        if let Some(amount) = patch.instrument_amount {
            self.instrument_amount = amount;
        }
        if let Some(action_type) = patch.action_type {
            self.action_type = action_type;
        }
        if let Some(party) = patch.party {
            self.party = party;
        }
        if let Some(related) = patch.related_party {
            self.related_party = related;
        }
        if let Some(items) = patch.attached_details {
            self.attached_details = items;
        }
        for (key, value) in patch.fields {
            if value.is_empty() {
                self.fields.remove(&key);
            } else {
                self.fields.insert(key, value);
            }
        }
    }

    pub fn set_relationship_role(mut self, role: &str) -> Self {
        self.relationship_role = role.to_owned();
        self
    }
    pub fn set_effective_date(mut self, date: NaiveDate) -> Self {
        self.effective_date = Some(date);
        self
    }
    pub fn set_expire_date(mut self, date: NaiveDate) -> Self {
        self.expire_date = Some(date);
        self
    }
    pub fn set_instrument_amount(mut self, amount: f64) -> Self {
        self.instrument_amount = amount;
        self
    }
    pub fn set_action_type(mut self, action_type: &str) -> Self {
        self.action_type = action_type.to_owned();
        self
    }
    pub fn set_party(mut self, party: PartyInfo) -> Self {
        self.party = party;
        self
    }
    pub fn set_related_party(mut self, tax_id: &str, name: &str) -> Self {
        self.related_party = RelatedParty {
            tax_id: tax_id.to_owned(),
            name: name.to_owned(),
        };
        self
    }
    pub fn set_attached_details(mut self, items: Vec<AttachedDetailItem>) -> Self {
        self.attached_details = items;
        self
    }
    pub fn set_field(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.to_owned(), value.to_owned());
        self
    }
}
