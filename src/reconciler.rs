//! Keeps the attached-detail set consistent as subtype checkboxes are toggled
//!
//! Every function here is pure: it reads the current items and returns the new
//! set for the state container to write back. The set never holds two items
//! with the same `(class, subtype)` key.

use tracing::{debug, warn};

use crate::form::AttachedDetailItem;
use crate::registry::{DetailClass, DetailSubtype, InstrumentTypeDescriptor};
use crate::schema;

/// Checks or unchecks `subtype` within `class`.
///
/// Only the slice of `class` is recomputed; items of other classes are carried
/// over untouched and the result is deduplicated keeping first-seen order.
pub fn toggle_subtype(
    items: &[AttachedDetailItem],
    class: DetailClass,
    subtype: DetailSubtype,
    selected: bool,
) -> Vec<AttachedDetailItem> {
    if !schema::belongs_to(class, subtype) {
        warn!(%class, %subtype, "ignoring toggle of a subtype outside its class");
        return items.to_vec();
    }

    let mut slice: Vec<AttachedDetailItem> = items
        .iter()
        .filter(|item| item.detail_class == class)
        .copied()
        .collect();

    let item = AttachedDetailItem::new(class, subtype);
    if selected {
        if !slice.contains(&item) {
            slice.push(item);
        }
    } else {
        slice.retain(|existing| *existing != item);
    }

    // other classes keep their place ahead of the recomputed slice
    let mut merged: Vec<AttachedDetailItem> = items
        .iter()
        .filter(|item| item.detail_class != class)
        .copied()
        .collect();
    merged.extend(slice);

    let merged = dedup(&merged);
    debug!(%class, %subtype, selected, items = merged.len(), "toggled detail subtype");
    merged
}

/// Drops every item of `class`.
pub fn reset_class(items: &[AttachedDetailItem], class: DetailClass) -> Vec<AttachedDetailItem> {
    let kept: Vec<AttachedDetailItem> = items
        .iter()
        .filter(|item| item.detail_class != class)
        .copied()
        .collect();
    dedup(&kept)
}

/// Applies a change of the top-level category selector. When the choice
/// actually changes, the items of every category-bound class are cleared,
/// since those classes are mutually exclusive alternatives.
pub fn select_category(
    items: &[AttachedDetailItem],
    descriptor: &InstrumentTypeDescriptor,
    previous: &str,
    next: &str,
) -> Vec<AttachedDetailItem> {
    if previous.trim() == next.trim() {
        return dedup(items);
    }
    let mut remaining = items.to_vec();
    for class in descriptor.category_classes() {
        remaining = reset_class(&remaining, class);
    }
    debug!(
        code = %descriptor.code,
        previous,
        next,
        cleared = items.len() - remaining.len(),
        "category changed"
    );
    remaining
}

/// Removes repeated keys, keeping the first occurrence.
pub fn dedup(items: &[AttachedDetailItem]) -> Vec<AttachedDetailItem> {
    let mut out: Vec<AttachedDetailItem> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(item) {
            out.push(*item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{InstrumentTypeCode, descriptor_of};

    use DetailClass::*;
    use DetailSubtype::*;

    fn item(class: DetailClass, subtype: DetailSubtype) -> AttachedDetailItem {
        AttachedDetailItem::new(class, subtype)
    }

    #[test]
    fn toggling_on_twice_is_a_no_op() {
        let once = toggle_subtype(&[], LeasedAsset, Land, true);
        let twice = toggle_subtype(&once, LeasedAsset, Land, true);
        assert_eq!(once, vec![item(LeasedAsset, Land)]);
        assert_eq!(once, twice);
    }

    #[test]
    fn reset_collapses_duplicates_of_other_classes() {
        let items = vec![
            item(LeasedAsset, Land),
            item(RentComputation, AnnualRent),
            item(LeasedAsset, Land),
        ];
        assert_eq!(
            reset_class(&items, RentComputation),
            vec![item(LeasedAsset, Land)]
        );
        assert_eq!(reset_class(&items, LeasedAsset), vec![item(RentComputation, AnnualRent)]);
    }

    #[test]
    fn land_on_building_on_land_off_leaves_building() {
        let items = toggle_subtype(&[], LeasedAsset, Land, true);
        let items = toggle_subtype(&items, LeasedAsset, Building, true);
        let items = toggle_subtype(&items, LeasedAsset, Land, false);
        assert_eq!(items, vec![item(LeasedAsset, Building)]);
    }

    #[test]
    fn other_classes_survive_a_toggle() {
        let items = vec![item(RentComputation, MonthlyRent), item(LeasedAsset, Vessel)];
        let items = toggle_subtype(&items, LeasedAsset, Vessel, false);
        assert_eq!(items, vec![item(RentComputation, MonthlyRent)]);

        let items = toggle_subtype(&items, LeasedAsset, Land, true);
        assert_eq!(
            items,
            vec![item(RentComputation, MonthlyRent), item(LeasedAsset, Land)]
        );
    }

    #[test]
    fn subtype_outside_class_is_ignored() {
        let items = vec![item(LeasedAsset, Land)];
        assert_eq!(toggle_subtype(&items, LeasedAsset, NewCar, true), items);
    }

    #[test]
    fn duplicated_input_is_collapsed() {
        let items = vec![
            item(LeasedAsset, Land),
            item(LeasedAsset, Land),
            item(RentComputation, AnnualRent),
        ];
        let out = toggle_subtype(&items, RentComputation, LumpSumRent, true);
        assert_eq!(
            out,
            vec![
                item(LeasedAsset, Land),
                item(RentComputation, AnnualRent),
                item(RentComputation, LumpSumRent),
            ]
        );
    }

    #[test]
    fn changing_category_clears_bound_classes() {
        let hp = descriptor_of(InstrumentTypeCode::HirePurchase);
        let items = vec![item(MovableProperty, NewCar), item(MovableProperty, UsedCar)];

        assert_eq!(select_category(&items, hp, "2", "2"), items);
        assert!(select_category(&items, hp, "2", "1").is_empty());
    }

    #[test]
    fn reset_class_only_touches_that_class() {
        let items = vec![item(LeasedAsset, Land), item(RentComputation, OtherRent)];
        assert_eq!(
            reset_class(&items, LeasedAsset),
            vec![item(RentComputation, OtherRent)]
        );
    }
}
