//! Durability configuration with documented parameters
//!
//! The configuration is read once at startup (usually from TOML), validated,
//! and then handed by reference to every component that needs it. Nothing in
//! the crate mutates it afterwards.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{ConfigError, Result};
use crate::core::types::SoundDescriptor;

/// What happens to an instance whose durability reaches zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BreakPolicy {
    /// Remove the instance from its owner and the inventory permanently
    Destroy,
    /// Keep the instance where it is, at zero durability
    Retain,
    /// Take the instance off and refuse to equip it again until repaired
    Unequip,
}

/// Validated, immutable durability configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DurabilityConfig {
    /// Break policy applied by the breakage coordinator
    pub break_policy: BreakPolicy,

    /// Disables random-slot and targeted battle wear (destroy mode 3).
    ///
    /// Wear against all equips is NOT affected by this flag.
    pub slot_damage_disabled: bool,

    /// Durability percentage (0-100) at or below which stats start to scale
    ///
    /// 100 makes any wear immediately affect stats, 0 leaves stats untouched
    /// until the item breaks.
    pub adjust_threshold: u8,

    /// Global reverse edge: mirror the durability fraction (`2 - fraction`)
    /// before the adjust threshold test
    pub reverse_edge: bool,

    /// Played on breakage unless the instance carries its own sound
    pub break_sound: SoundDescriptor,

    /// Break notification. Placeholders: `{actor}`, `{item}`, `{icon}`
    pub broken_text: String,

    /// Salvage message for a single unit. Placeholders: `{item}`, `{icon}`
    pub salvage_text: String,

    /// Salvage message for several units. Adds `{amount}`
    pub salvage_text_multi: String,

    /// Icon escape inserted for `{icon}`. `{index}` is the icon index
    pub icon_format: String,

    /// Releasing the main hand also releases the off-hand slot
    pub release_offhand_with_main: bool,
}

impl Default for DurabilityConfig {
    fn default() -> Self {
        Self {
            break_policy: BreakPolicy::Retain,
            slot_damage_disabled: false,
            adjust_threshold: 50,
            reverse_edge: false,
            break_sound: SoundDescriptor::default(),
            broken_text: "{actor}'s {icon}{item} broke!".into(),
            salvage_text: "{icon}{item} salvaged!".into(),
            salvage_text_multi: "{icon}{item} x {amount} salvaged!".into(),
            icon_format: "\\i[{index}]".into(),
            release_offhand_with_main: true,
        }
    }
}

impl DurabilityConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: BreakPolicy) -> Self {
        self.break_policy = policy;
        self
    }

    pub fn with_adjust_threshold(mut self, threshold: u8) -> Self {
        self.adjust_threshold = threshold.min(100);
        self
    }

    pub fn with_reverse_edge(mut self, reverse_edge: bool) -> Self {
        self.reverse_edge = reverse_edge;
        self
    }

    /// Adjust threshold scaled to a 0.0-1.0 fraction
    pub fn adjust_fraction(&self) -> f64 {
        f64::from(self.adjust_threshold) / 100.0
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse and validate config from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let raw: RawDurabilityConfig = toml::from_str(content)?;
        Ok(raw.validate()?)
    }

    /// Render the `{icon}` placeholder for a given icon index
    pub fn icon(&self, index: u32) -> String {
        self.icon_format.replace("{index}", &index.to_string())
    }
}

/// Fill `{key}` placeholders in a message template
pub fn format_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut text = template.to_string();
    for (key, value) in values {
        text = text.replace(&format!("{{{}}}", key), value);
    }
    text
}

/// TOML representation of the config file
///
/// Mirrors the plugin-style parameters: `destroy_mode` is the numeric mode
/// (0 destroy, 1 retain, 2 unequip, 3 retain with slot wear disabled).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDurabilityConfig {
    #[serde(default = "default_destroy_mode")]
    pub destroy_mode: i64,
    #[serde(default = "default_adjust")]
    pub durability_adjust: i64,
    #[serde(default)]
    pub reverse_edge: bool,
    #[serde(default)]
    pub break_sound: Option<SoundDescriptor>,
    #[serde(default)]
    pub broken_text: Option<String>,
    #[serde(default)]
    pub salvage_text: Option<String>,
    #[serde(default)]
    pub salvage_text_multi: Option<String>,
    #[serde(default)]
    pub icon_format: Option<String>,
    #[serde(default = "default_true")]
    pub release_offhand_with_main: bool,
}

fn default_destroy_mode() -> i64 {
    1
}

fn default_adjust() -> i64 {
    50
}

fn default_true() -> bool {
    true
}

impl RawDurabilityConfig {
    /// Check ranges and produce the runtime config
    pub fn validate(self) -> std::result::Result<DurabilityConfig, ConfigError> {
        let (break_policy, slot_damage_disabled) = match self.destroy_mode {
            0 => (BreakPolicy::Destroy, false),
            1 => (BreakPolicy::Retain, false),
            2 => (BreakPolicy::Unequip, false),
            3 => (BreakPolicy::Retain, true),
            other => {
                return Err(ConfigError::OutOfRange {
                    field: "destroy_mode",
                    value: other,
                    min: 0,
                    max: 3,
                })
            }
        };

        if !(0..=100).contains(&self.durability_adjust) {
            return Err(ConfigError::OutOfRange {
                field: "durability_adjust",
                value: self.durability_adjust,
                min: 0,
                max: 100,
            });
        }

        let defaults = DurabilityConfig::default();
        Ok(DurabilityConfig {
            break_policy,
            slot_damage_disabled,
            adjust_threshold: self.durability_adjust as u8,
            reverse_edge: self.reverse_edge,
            break_sound: self.break_sound.unwrap_or(defaults.break_sound),
            broken_text: self.broken_text.unwrap_or(defaults.broken_text),
            salvage_text: self.salvage_text.unwrap_or(defaults.salvage_text),
            salvage_text_multi: self
                .salvage_text_multi
                .unwrap_or(defaults.salvage_text_multi),
            icon_format: self.icon_format.unwrap_or(defaults.icon_format),
            release_offhand_with_main: self.release_offhand_with_main,
        })
    }
}
