//! Field tables for attached-detail subtypes
//!
//! An attached-detail item is only a `(class, subtype)` tag. The values it
//! stands for live in the form's field bag under the form keys listed here, and
//! both the validation engine and the submission mapper read them through this
//! table. Adding a subtype means adding a row.

use crate::registry::{DetailClass, DetailSubtype};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Key in the form field bag, also the validation error key.
    pub key: &'static str,
    /// Field name in the submission payload record.
    pub payload: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

#[derive(Debug)]
pub struct SubtypeSchema {
    pub class: DetailClass,
    pub subtype: DetailSubtype,
    /// Subtype code sent to the filing service.
    pub code: &'static str,
    pub label: &'static str,
    pub fields: &'static [FieldSpec],
}

impl SubtypeSchema {
    pub fn required_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }
}

const fn text(key: &'static str, payload: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        key,
        payload,
        label,
        kind: FieldKind::Text,
        required: true,
    }
}

const fn number(key: &'static str, payload: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        key,
        payload,
        label,
        kind: FieldKind::Number,
        required: true,
    }
}

const fn optional(spec: FieldSpec) -> FieldSpec {
    FieldSpec {
        required: false,
        ..spec
    }
}

const LAND: &[FieldSpec] = &[
    optional(text("landPropertyType", "category", "Title deed type")),
    optional(text("landBuildingNumber", "number", "Title deed number")),
    text("landParcelNumber", "parcelNo", "Land parcel number"),
    text("landProvince", "province", "Land province"),
    text("landDistrict", "district", "Land district"),
    text("landSubDistrict", "subDistrict", "Land sub-district"),
    optional(number("landArea", "area", "Land area")),
];

const BUILDING: &[FieldSpec] = &[
    optional(text("buildingName", "name", "Building name")),
    text("buildingNumber", "number", "Building number"),
    optional(text("buildingFloor", "floor", "Floor")),
    optional(number("buildingArea", "area", "Usable area")),
    text("buildingProvince", "province", "Building province"),
    text("buildingDistrict", "district", "Building district"),
    text("buildingSubDistrict", "subDistrict", "Building sub-district"),
];

const OTHER_STRUCTURE: &[FieldSpec] = &[
    text("structureDescription", "description", "Structure description"),
    text("structureProvince", "province", "Structure province"),
    text("structureDistrict", "district", "Structure district"),
    text("structureSubDistrict", "subDistrict", "Structure sub-district"),
];

const VESSEL: &[FieldSpec] = &[
    text("vesselName", "name", "Vessel name"),
    text("vesselRegistrationNumber", "registrationNo", "Vessel registration number"),
    optional(number("vesselTonnage", "tonnage", "Gross tonnage")),
    optional(text("vesselPort", "port", "Port of registry")),
];

const MONTHLY_RENT: &[FieldSpec] = &[
    number("rentMonthlyAmount", "amount", "Monthly rent"),
    number("rentMonthlyPeriods", "periods", "Number of months"),
];

const ANNUAL_RENT: &[FieldSpec] = &[
    number("rentAnnualAmount", "amount", "Annual rent"),
    number("rentAnnualPeriods", "periods", "Number of years"),
];

const LUMP_SUM_RENT: &[FieldSpec] = &[number("rentLumpSumAmount", "amount", "Lump-sum rent")];

const OTHER_RENT: &[FieldSpec] = &[
    text("rentOtherDescription", "description", "Rent description"),
    number("rentOtherAmount", "amount", "Rent amount"),
];

const CONDOMINIUM: &[FieldSpec] = &[
    text("condoName", "name", "Condominium name"),
    text("condoUnitNumber", "unitNo", "Unit number"),
    optional(text("condoFloor", "floor", "Floor")),
    text("condoProvince", "province", "Condominium province"),
    text("condoDistrict", "district", "Condominium district"),
    text("condoSubDistrict", "subDistrict", "Condominium sub-district"),
];

const NEW_CAR: &[FieldSpec] = &[
    text("newCarBrand", "brand", "Car brand"),
    text("newCarModel", "model", "Car model"),
    text("newCarEngineNumber", "engineNo", "Engine number"),
    text("newCarFrameNumber", "chassisNo", "Chassis number"),
    text("newCarColor", "color", "Car color"),
    optional(text("newCarRegistrationNumber", "licenseNo", "Registration number")),
];

const USED_CAR: &[FieldSpec] = &[
    text("usedCarBrand", "brand", "Car brand"),
    text("usedCarModel", "model", "Car model"),
    text("usedCarEngineNumber", "engineNo", "Engine number"),
    text("usedCarFrameNumber", "chassisNo", "Chassis number"),
    text("usedCarColor", "color", "Car color"),
    text("usedCarRegistrationNumber", "licenseNo", "Registration number"),
    text("usedCarRegistrationProvince", "licenseProvince", "Registration province"),
];

const MOTORCYCLE: &[FieldSpec] = &[
    text("motorcycleBrand", "brand", "Motorcycle brand"),
    text("motorcycleModel", "model", "Motorcycle model"),
    text("motorcycleEngineNumber", "engineNo", "Engine number"),
    text("motorcycleFrameNumber", "chassisNo", "Chassis number"),
    text("motorcycleColor", "color", "Motorcycle color"),
    optional(text("motorcycleRegistrationNumber", "licenseNo", "Registration number")),
];

// a transferred motorcycle is always registered
const TRANSFERRED_MOTORCYCLE: &[FieldSpec] = &[
    text("motorcycleBrand", "brand", "Motorcycle brand"),
    text("motorcycleModel", "model", "Motorcycle model"),
    text("motorcycleEngineNumber", "engineNo", "Engine number"),
    text("motorcycleFrameNumber", "chassisNo", "Chassis number"),
    text("motorcycleColor", "color", "Motorcycle color"),
    text("motorcycleRegistrationNumber", "licenseNo", "Registration number"),
    text("motorcycleRegistrationProvince", "licenseProvince", "Registration province"),
];

const OTHER_MOVABLE: &[FieldSpec] = &[
    text("movableDescription", "description", "Property description"),
    optional(number("movableQuantity", "quantity", "Quantity")),
];

const CONSTRUCTION: &[FieldSpec] = &[
    text("constructionDescription", "description", "Construction work"),
    text("constructionProvince", "province", "Site province"),
    text("constructionDistrict", "district", "Site district"),
    text("constructionSubDistrict", "subDistrict", "Site sub-district"),
];

const REPAIR: &[FieldSpec] = &[text("repairDescription", "description", "Repair work")];

const ADVERTISING: &[FieldSpec] = &[
    text("advertisingDescription", "description", "Advertising work"),
    optional(text("advertisingMedium", "medium", "Medium")),
];

const OTHER_WORK: &[FieldSpec] = &[text("workDescription", "description", "Work description")];

macro_rules! row {
    ($class:ident, $subtype:ident, $code:literal, $label:literal, $fields:expr) => {
        SubtypeSchema {
            class: DetailClass::$class,
            subtype: DetailSubtype::$subtype,
            code: $code,
            label: $label,
            fields: $fields,
        }
    };
}

// rows of a class are in the order the instrument form declares them
static SCHEMAS: &[SubtypeSchema] = &[
    row!(LeasedAsset, Land, "1", "Land", LAND),
    row!(LeasedAsset, Building, "2", "Building", BUILDING),
    row!(LeasedAsset, OtherStructure, "3", "Other structure", OTHER_STRUCTURE),
    row!(LeasedAsset, Vessel, "4", "Vessel", VESSEL),
    row!(RentComputation, MonthlyRent, "1", "Monthly rent", MONTHLY_RENT),
    row!(RentComputation, AnnualRent, "2", "Annual rent", ANNUAL_RENT),
    row!(RentComputation, LumpSumRent, "3", "Lump-sum rent", LUMP_SUM_RENT),
    row!(RentComputation, OtherRent, "4", "Other rent", OTHER_RENT),
    row!(RealProperty, Land, "1", "Land", LAND),
    row!(RealProperty, Building, "2", "Building", BUILDING),
    row!(RealProperty, Condominium, "3", "Condominium unit", CONDOMINIUM),
    row!(MovableProperty, NewCar, "1", "New car", NEW_CAR),
    row!(MovableProperty, UsedCar, "2", "Used car", USED_CAR),
    row!(MovableProperty, Motorcycle, "3", "Motorcycle", MOTORCYCLE),
    row!(MovableProperty, OtherMovable, "4", "Other movable property", OTHER_MOVABLE),
    row!(ServiceWork, Construction, "1", "Construction", CONSTRUCTION),
    row!(ServiceWork, Repair, "2", "Repair", REPAIR),
    row!(ServiceWork, Advertising, "3", "Advertising", ADVERTISING),
    row!(ServiceWork, OtherWork, "4", "Other work", OTHER_WORK),
    row!(TransferredVehicle, UsedCar, "1", "Car", USED_CAR),
    row!(TransferredVehicle, Motorcycle, "2", "Motorcycle", TRANSFERRED_MOTORCYCLE),
];

pub fn schemas_for(class: DetailClass) -> impl Iterator<Item = &'static SubtypeSchema> {
    SCHEMAS.iter().filter(move |s| s.class == class)
}

pub fn schema_for(class: DetailClass, subtype: DetailSubtype) -> Option<&'static SubtypeSchema> {
    SCHEMAS
        .iter()
        .find(|s| s.class == class && s.subtype == subtype)
}

pub fn belongs_to(class: DetailClass, subtype: DetailSubtype) -> bool {
    schema_for(class, subtype).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique_per_row() {
        for schema in SCHEMAS {
            let keys: HashSet<_> = schema.fields.iter().map(|f| f.key).collect();
            let payload: HashSet<_> = schema.fields.iter().map(|f| f.payload).collect();
            assert_eq!(keys.len(), schema.fields.len(), "{:?}", schema.subtype);
            assert_eq!(payload.len(), schema.fields.len(), "{:?}", schema.subtype);
        }
    }

    #[test]
    fn codes_are_unique_within_a_class() {
        let mut seen = HashSet::new();
        for schema in SCHEMAS {
            assert!(seen.insert((schema.class, schema.code)));
        }
    }

    #[test]
    fn land_requires_address_and_parcel() {
        let land = schema_for(DetailClass::LeasedAsset, DetailSubtype::Land).unwrap();
        let required: Vec<_> = land.required_fields().map(|f| f.key).collect();
        assert_eq!(
            required,
            vec!["landParcelNumber", "landProvince", "landDistrict", "landSubDistrict"]
        );
    }

    #[test]
    fn new_car_registration_is_optional() {
        let car = schema_for(DetailClass::MovableProperty, DetailSubtype::NewCar).unwrap();
        assert_eq!(car.fields.len(), 6);
        assert_eq!(car.required_fields().count(), 5);
        assert!(!belongs_to(DetailClass::LeasedAsset, DetailSubtype::NewCar));
    }
}
