//! Salvage rolls on breakage

use rand::Rng;
use serde::Serialize;

use crate::core::config::{format_template, DurabilityConfig};
use crate::core::types::ItemRef;
use crate::data::database::Database;
use crate::data::index::SalvageRule;

/// One successful salvage grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalvageGrant {
    pub output: ItemRef,
    pub quantity: u32,
    pub message: String,
}

/// Roll every rule independently, in definition order.
///
/// Each rule draws one integer in `[0, 100)` and fires when it is below the
/// rule's chance, so 100 always fires and 0 never does.
pub fn roll_salvage<R: Rng>(rules: &[SalvageRule], rng: &mut R) -> Vec<SalvageRule> {
    rules
        .iter()
        .filter(|rule| rng.gen_range(0..100u32) < u32::from(rule.chance_percent))
        .copied()
        .collect()
}

/// Display text for a salvage grant
pub fn salvage_message(config: &DurabilityConfig, db: &Database, rule: &SalvageRule) -> String {
    let (name, icon) = db.label(rule.output).unwrap_or(("???", 0));
    let icon = config.icon(icon);
    let amount = rule.quantity.to_string();
    let template = if rule.quantity == 1 {
        &config.salvage_text
    } else {
        &config.salvage_text_multi
    };
    format_template(template, &[("icon", icon.as_str()), ("item", name), ("amount", amount.as_str())])
}
