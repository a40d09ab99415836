//! Wear-scaled equipment stats
//!
//! Equipment only contributes its full base parameters while durability stays
//! above the adjust threshold. Once wear crosses it, the contribution scales
//! with the remaining durability fraction. Reverse edge mirrors the fraction
//! around 1.0 before the threshold test.
//!
//! Everything here is pure: UI previews and live combat get the same numbers.

use crate::core::config::DurabilityConfig;
use crate::core::types::{InstanceId, StatId, UNBREAKABLE};
use crate::data::index::AttributeIndex;
use crate::equipment::instance::EquipmentInstance;
use crate::equipment::ledger::DurabilityLedger;

/// Inputs to one stat derivation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WearInput {
    pub current: i32,
    pub max: i32,
    /// 0-100
    pub adjust_threshold: u8,
    pub reverse_edge: bool,
    pub base: f64,
}

/// Durability fraction used for the threshold comparison (0 when broken or max is 0)
pub fn durability_fraction(current: i32, max: i32) -> f64 {
    if current <= 0 || max <= 0 {
        0.0
    } else {
        f64::from(current) / f64::from(max)
    }
}

/// Per-item reverse edge forces the flag on; it can never switch the global off
pub fn effective_reverse_edge(global: bool, per_item: bool) -> bool {
    global || per_item
}

/// Effective contribution of one base stat given the instance's wear
pub fn derive_stat(input: WearInput) -> f64 {
    if input.max == UNBREAKABLE || input.current == UNBREAKABLE {
        return input.base;
    }

    let mut fraction = durability_fraction(input.current, input.max);
    if input.reverse_edge {
        fraction = 2.0 - fraction;
    }

    let threshold = f64::from(input.adjust_threshold.min(100)) / 100.0;
    if threshold >= fraction {
        input.base * fraction
    } else {
        input.base
    }
}

/// Wear-adjusted value of one parameter of an instance
pub fn instance_stat(
    config: &DurabilityConfig,
    index: &AttributeIndex,
    instance: &EquipmentInstance,
    stat: StatId,
) -> f64 {
    let per_item = index
        .equip(instance.kind, instance.definition_id)
        .map(|attrs| attrs.reverse_edge)
        .unwrap_or(false);

    derive_stat(WearInput {
        current: instance.durability,
        max: instance.resolved_max(),
        adjust_threshold: config.adjust_threshold,
        reverse_edge: effective_reverse_edge(config.reverse_edge, per_item),
        base: f64::from(instance.param(stat)),
    })
}

/// Sum of the wear-adjusted parameter over every equipped slot
pub fn equipment_param_bonus(
    config: &DurabilityConfig,
    index: &AttributeIndex,
    ledger: &DurabilityLedger,
    equips: &[Option<InstanceId>],
    stat: StatId,
) -> f64 {
    equips
        .iter()
        .flatten()
        .filter_map(|id| ledger.instance(*id))
        .map(|instance| instance_stat(config, index, instance, stat))
        .sum()
}
