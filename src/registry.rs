//! Instrument type registry
//!
//! Static descriptors for every supported instrument type code: the label, the
//! category selector (if any), the detail classes a declaration must attach and
//! the ordered checks the validation engine runs. Nothing here is mutated after
//! start-up.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::group_thousands;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InstrumentTypeCode {
    #[serde(rename = "1")]
    Lease,
    #[serde(rename = "3")]
    HirePurchase,
    #[serde(rename = "4")]
    ServiceContract,
    #[serde(rename = "7")]
    PowerOfAttorney,
    #[serde(rename = "17")]
    Guarantee,
    #[serde(rename = "28")]
    VehicleTransferReceipt,
}

impl InstrumentTypeCode {
    pub const ALL: [InstrumentTypeCode; 6] = [
        Self::Lease,
        Self::HirePurchase,
        Self::ServiceContract,
        Self::PowerOfAttorney,
        Self::Guarantee,
        Self::VehicleTransferReceipt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lease => "1",
            Self::HirePurchase => "3",
            Self::ServiceContract => "4",
            Self::PowerOfAttorney => "7",
            Self::Guarantee => "17",
            Self::VehicleTransferReceipt => "28",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code.trim())
    }
}

impl fmt::Display for InstrumentTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A grouping of related subtypes, e.g. every kind of leased asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetailClass {
    LeasedAsset,
    RentComputation,
    RealProperty,
    MovableProperty,
    ServiceWork,
    TransferredVehicle,
}

impl DetailClass {
    pub const ALL: [DetailClass; 6] = [
        Self::LeasedAsset,
        Self::RentComputation,
        Self::RealProperty,
        Self::MovableProperty,
        Self::ServiceWork,
        Self::TransferredVehicle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeasedAsset => "leased-asset",
            Self::RentComputation => "rent-computation",
            Self::RealProperty => "real-property",
            Self::MovableProperty => "movable-property",
            Self::ServiceWork => "service-work",
            Self::TransferredVehicle => "transferred-vehicle",
        }
    }

    /// Key of the summary error raised when no subtype of this class is chosen.
    pub fn selection_key(&self) -> &'static str {
        match self {
            Self::LeasedAsset => "arrayDetail1",
            Self::RentComputation => "arrayDetail2",
            Self::RealProperty => "arrayDetail3",
            Self::MovableProperty => "arrayDetail4",
            Self::ServiceWork => "arrayDetail5",
            Self::TransferredVehicle => "arrayDetail6",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::LeasedAsset => "leased asset",
            Self::RentComputation => "rent computation",
            Self::RealProperty => "real property",
            Self::MovableProperty => "movable property",
            Self::ServiceWork => "service work",
            Self::TransferredVehicle => "transferred vehicle",
        }
    }
}

impl fmt::Display for DetailClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetailSubtype {
    Land,
    Building,
    OtherStructure,
    Vessel,
    MonthlyRent,
    AnnualRent,
    LumpSumRent,
    OtherRent,
    Condominium,
    NewCar,
    UsedCar,
    Motorcycle,
    OtherMovable,
    Construction,
    Repair,
    Advertising,
    OtherWork,
}

impl DetailSubtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Land => "land",
            Self::Building => "building",
            Self::OtherStructure => "other-structure",
            Self::Vessel => "vessel",
            Self::MonthlyRent => "monthly-rent",
            Self::AnnualRent => "annual-rent",
            Self::LumpSumRent => "lump-sum-rent",
            Self::OtherRent => "other-rent",
            Self::Condominium => "condominium",
            Self::NewCar => "new-car",
            Self::UsedCar => "used-car",
            Self::Motorcycle => "motorcycle",
            Self::OtherMovable => "other-movable",
            Self::Construction => "construction",
            Self::Repair => "repair",
            Self::Advertising => "advertising",
            Self::OtherWork => "other-work",
        }
    }
}

impl fmt::Display for DetailSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Range an instrument amount must fall in for a category option.
///
/// The guarantee bounds overlap at 1,000: an amount of exactly 1,000 satisfies
/// both condition A and condition B. The business rule is reproduced as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountBound {
    AtMost(u64),
    Between(u64, u64),
    Above(u64),
}

impl AmountBound {
    pub fn contains(&self, amount: f64) -> bool {
        match *self {
            Self::AtMost(max) => amount <= max as f64,
            Self::Between(min, max) => amount >= min as f64 && amount <= max as f64,
            Self::Above(min) => amount > min as f64,
        }
    }
}

impl fmt::Display for AmountBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::AtMost(max) => write!(f, "not exceed {}", group_thousands(max)),
            Self::Between(min, max) => write!(
                f,
                "be between {} and {}",
                group_thousands(min),
                group_thousands(max)
            ),
            Self::Above(min) => write!(f, "exceed {}", group_thousands(min)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryOption {
    pub code: &'static str,
    pub label: &'static str,
    /// Detail class that becomes mandatory once this option is chosen.
    pub detail_class: Option<DetailClass>,
    pub amount_bound: Option<AmountBound>,
}

/// Top-level choice that must be made before subtype checks apply,
/// e.g. real vs movable property for hire-purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySelector {
    pub key: &'static str,
    pub label: &'static str,
    pub options: &'static [CategoryOption],
}

/// Top-level form fields a check can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopField {
    EffectiveDate,
    ExpireDate,
    RelationshipRole,
    InstrumentAmount,
    RelatedTaxId,
    RelatedName,
}

impl TopField {
    pub fn key(&self) -> &'static str {
        match self {
            Self::EffectiveDate => "effectiveDate",
            Self::ExpireDate => "expireDate",
            Self::RelationshipRole => "relationshipRole",
            Self::InstrumentAmount => "instrumentAmount",
            Self::RelatedTaxId => "relatedTaxId",
            Self::RelatedName => "relatedName",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::EffectiveDate => "Effective date",
            Self::ExpireDate => "Expire date",
            Self::RelationshipRole => "Relationship",
            Self::InstrumentAmount => "Instrument amount",
            Self::RelatedTaxId => "Related party tax ID",
            Self::RelatedName => "Related party name",
        }
    }
}

/// One entry of a type's ordered rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Present(TopField),
    DateOrder,
    AmountWithinBound,
    Category,
    SubtypeSelected,
    SubtypeFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleOption {
    pub key: &'static str,
    pub label: &'static str,
}

#[derive(Debug)]
pub struct InstrumentTypeDescriptor {
    pub code: InstrumentTypeCode,
    pub label: &'static str,
    pub category: Option<CategorySelector>,
    /// Classes that must always carry at least one subtype, in declared order.
    pub detail_classes: &'static [DetailClass],
    pub checks: &'static [Check],
}

impl InstrumentTypeDescriptor {
    pub fn role_options(&self) -> Vec<RoleOption> {
        role_options_for(self.code.as_str())
    }

    pub fn selected_option(&self, action_type: &str) -> Option<&'static CategoryOption> {
        let selector = self.category.as_ref()?;
        selector
            .options
            .iter()
            .find(|option| option.code == action_type.trim())
    }

    /// The `actionType` a fresh form starts with: `"0"` when the type has no
    /// category selector, otherwise unselected.
    pub fn default_action_type(&self) -> &'static str {
        if self.category.is_some() { "" } else { "0" }
    }

    /// Always-required classes followed by the class bound to the selected
    /// category option.
    pub fn applicable_classes(&self, action_type: &str) -> Vec<DetailClass> {
        let mut classes = self.detail_classes.to_vec();
        if let Some(class) = self
            .selected_option(action_type)
            .and_then(|option| option.detail_class)
        {
            if !classes.contains(&class) {
                classes.push(class);
            }
        }
        classes
    }

    /// Classes tied to category options. Switching the category clears them.
    pub fn category_classes(&self) -> Vec<DetailClass> {
        let mut classes = Vec::new();
        if let Some(selector) = &self.category {
            for class in selector.options.iter().filter_map(|o| o.detail_class) {
                if !classes.contains(&class) {
                    classes.push(class);
                }
            }
        }
        classes
    }

    pub fn is_applicable(&self, class: DetailClass, action_type: &str) -> bool {
        self.applicable_classes(action_type).contains(&class)
    }
}

// (type code, role key, label)
const ROLE_TABLE: &[(&str, &str, &str)] = &[
    ("1", "1", "Lessor"),
    ("1", "2", "Lessee"),
    ("3", "1", "Owner"),
    ("3", "2", "Hirer"),
    ("4", "1", "Contractor"),
    ("4", "2", "Client"),
    ("7", "1", "Principal"),
    ("7", "2", "Agent"),
    ("17", "1", "Guarantor"),
    ("17", "2", "Debtor"),
    ("28", "1", "Transferor"),
    ("28", "2", "Transferee"),
];

const HIRE_PURCHASE_CATEGORIES: &[CategoryOption] = &[
    CategoryOption {
        code: "1",
        label: "Real property",
        detail_class: Some(DetailClass::RealProperty),
        amount_bound: None,
    },
    CategoryOption {
        code: "2",
        label: "Movable property",
        detail_class: Some(DetailClass::MovableProperty),
        amount_bound: None,
    },
];

const ATTORNEY_SCOPES: &[CategoryOption] = &[
    CategoryOption {
        code: "1",
        label: "Single act",
        detail_class: None,
        amount_bound: None,
    },
    CategoryOption {
        code: "2",
        label: "More than one act",
        detail_class: None,
        amount_bound: None,
    },
];

const GUARANTEE_CONDITIONS: &[CategoryOption] = &[
    CategoryOption {
        code: "1",
        label: "A",
        detail_class: None,
        amount_bound: Some(AmountBound::AtMost(1_000)),
    },
    CategoryOption {
        code: "2",
        label: "B",
        detail_class: None,
        amount_bound: Some(AmountBound::Between(1_000, 10_000)),
    },
    CategoryOption {
        code: "3",
        label: "C",
        detail_class: None,
        amount_bound: Some(AmountBound::Above(10_000)),
    },
];

use Check::*;
use TopField::*;

static DESCRIPTORS: [InstrumentTypeDescriptor; 6] = [
    InstrumentTypeDescriptor {
        code: InstrumentTypeCode::Lease,
        label: "Lease of land, buildings, other structures or vessels",
        category: None,
        detail_classes: &[DetailClass::LeasedAsset, DetailClass::RentComputation],
        checks: &[
            Present(EffectiveDate),
            Present(ExpireDate),
            DateOrder,
            Present(RelationshipRole),
            Present(InstrumentAmount),
            SubtypeSelected,
            SubtypeFields,
        ],
    },
    InstrumentTypeDescriptor {
        code: InstrumentTypeCode::HirePurchase,
        label: "Hire-purchase",
        category: Some(CategorySelector {
            key: "actionType",
            label: "Asset category",
            options: HIRE_PURCHASE_CATEGORIES,
        }),
        detail_classes: &[],
        checks: &[
            Present(EffectiveDate),
            Present(ExpireDate),
            DateOrder,
            Present(RelationshipRole),
            Present(InstrumentAmount),
            Category,
            SubtypeSelected,
            SubtypeFields,
        ],
    },
    InstrumentTypeDescriptor {
        code: InstrumentTypeCode::ServiceContract,
        label: "Service contract (hire of work)",
        category: None,
        detail_classes: &[DetailClass::ServiceWork],
        checks: &[
            Present(EffectiveDate),
            Present(ExpireDate),
            DateOrder,
            Present(RelationshipRole),
            Present(InstrumentAmount),
            SubtypeSelected,
            SubtypeFields,
        ],
    },
    InstrumentTypeDescriptor {
        code: InstrumentTypeCode::PowerOfAttorney,
        label: "Power of attorney",
        category: Some(CategorySelector {
            key: "attorneyScope",
            label: "Scope of authority",
            options: ATTORNEY_SCOPES,
        }),
        detail_classes: &[],
        checks: &[
            Present(EffectiveDate),
            Present(ExpireDate),
            DateOrder,
            Present(RelationshipRole),
            Category,
        ],
    },
    InstrumentTypeDescriptor {
        code: InstrumentTypeCode::Guarantee,
        label: "Guarantee",
        category: Some(CategorySelector {
            key: "guaranteeCondition",
            label: "Guarantee condition",
            options: GUARANTEE_CONDITIONS,
        }),
        detail_classes: &[],
        checks: &[
            Present(EffectiveDate),
            Present(ExpireDate),
            DateOrder,
            Present(RelationshipRole),
            Present(InstrumentAmount),
            AmountWithinBound,
            Present(RelatedTaxId),
            Present(RelatedName),
            Category,
        ],
    },
    InstrumentTypeDescriptor {
        code: InstrumentTypeCode::VehicleTransferReceipt,
        label: "Receipt for a vehicle transfer",
        category: None,
        detail_classes: &[DetailClass::TransferredVehicle],
        checks: &[
            Present(EffectiveDate),
            Present(ExpireDate),
            DateOrder,
            Present(RelationshipRole),
            Present(InstrumentAmount),
            SubtypeSelected,
            SubtypeFields,
        ],
    },
];

pub fn descriptors() -> &'static [InstrumentTypeDescriptor] {
    &DESCRIPTORS
}

pub fn lookup(code: &str) -> Option<&'static InstrumentTypeDescriptor> {
    let code = InstrumentTypeCode::parse(code)?;
    DESCRIPTORS.iter().find(|d| d.code == code)
}

pub fn descriptor_of(code: InstrumentTypeCode) -> &'static InstrumentTypeDescriptor {
    DESCRIPTORS
        .iter()
        .find(|d| d.code == code)
        .unwrap_or(&DESCRIPTORS[0])
}

/// Descriptor for `code`, degrading to the lease (type `1`) descriptor when the
/// code is unknown. Callers that care about the degradation use [`lookup`].
pub fn describe(code: &str) -> &'static InstrumentTypeDescriptor {
    lookup(code).unwrap_or(&DESCRIPTORS[0])
}

/// Role options for a type code. Unknown codes have none.
pub fn role_options_for(code: &str) -> Vec<RoleOption> {
    let code = code.trim();
    ROLE_TABLE
        .iter()
        .filter(|(type_code, _, _)| *type_code == code)
        .map(|&(_, key, label)| RoleOption { key, label })
        .collect()
}
