//! Element-driven wear multipliers

use crate::core::types::ElementId;
use crate::data::index::AttributeIndex;
use crate::equipment::instance::EquipmentInstance;

/// Wear multiplier of `instance` against the attacker's last elements.
///
/// 1.0 for definitions without element tags. Deltas of -1 cancel wear
/// entirely and anything lower turns wear into repair.
pub fn element_multiplier(
    index: &AttributeIndex,
    instance: &EquipmentInstance,
    elements: &[ElementId],
) -> f64 {
    index
        .equip(instance.kind, instance.definition_id)
        .map(|attrs| attrs.element_multiplier(elements))
        .unwrap_or(1.0)
}
