//! Precomputed durability attributes per definition
//!
//! Built once from the [`Database`] at load time. Nothing here is re-parsed or
//! mutated afterwards; runtime code only reads from it.

use ahash::{AHashMap, AHashSet};

use crate::core::error::ConfigError;
use crate::core::types::{ElementId, EquipKind, ItemKind, ItemRef, SoundDescriptor, UsableRef};
use crate::data::database::{Database, EquipDefinition};
use crate::data::tags::{self, NO_BATTLE_DAMAGE_TAG, REVERSE_EDGE_TAG};

/// One salvage roll triggered by breakage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalvageRule {
    pub output: ItemRef,
    pub quantity: u32,
    /// Percent chance, 0-100
    pub chance_percent: u8,
}

/// Additive wear multiplier applied when the last incoming element matches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementMultiplier {
    pub element_id: ElementId,
    pub delta: f64,
}

/// Durability change a skill/item applies to its user's equips of one type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetedEffect {
    pub kind: EquipKind,
    pub sub_type_id: u32,
    pub delta: i32,
}

/// Durability attributes of one weapon or armor definition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquipAttributes {
    pub salvage: Vec<SalvageRule>,
    pub elements: Vec<ElementMultiplier>,
    pub no_battle_damage: bool,
    pub reverse_edge: bool,
    pub break_sound: Option<SoundDescriptor>,
}

impl EquipAttributes {
    /// Wear multiplier for the given incoming elements.
    ///
    /// Starts at 1.0 and adds every tag delta whose element matches any of
    /// `elements`. Tags for the same element stack.
    pub fn element_multiplier(&self, elements: &[ElementId]) -> f64 {
        self.elements
            .iter()
            .filter(|tag| elements.contains(&tag.element_id))
            .fold(1.0, |total, tag| total + tag.delta)
    }
}

/// Read-only attribute tables for every definition in the database
#[derive(Debug, Clone, Default)]
pub struct AttributeIndex {
    equips: AHashMap<(EquipKind, u32), EquipAttributes>,
    usables: AHashMap<UsableRef, Vec<TargetedEffect>>,
    protected_actors: AHashSet<u32>,
    protected_classes: AHashSet<u32>,
    protected_states: AHashSet<u32>,
}

impl AttributeIndex {
    /// Parse every durability tag in the database.
    ///
    /// Fails on the first malformed tag, out-of-range field, or salvage rule
    /// that points at a missing definition.
    pub fn build(db: &Database) -> Result<Self, ConfigError> {
        let mut index = Self::default();

        for (kind, table) in [(EquipKind::Weapon, &db.weapons), (EquipKind::Armor, &db.armors)] {
            for def in table.values() {
                let attrs = equip_attributes(db, kind, def)?;
                index.equips.insert((kind, def.id), attrs);
            }
        }

        for skill in db.skills.values() {
            let owner = format!("Skill {}", skill.id);
            let effects = targeted_effects(&skill.note, &owner)?;
            if !effects.is_empty() {
                index.usables.insert(UsableRef::Skill(skill.id), effects);
            }
        }
        for item in db.items.values() {
            let owner = format!("Item {}", item.id);
            let effects = targeted_effects(&item.note, &owner)?;
            if !effects.is_empty() {
                index.usables.insert(UsableRef::Item(item.id), effects);
            }
        }

        for actor in db.actors.values() {
            if tags::has_flag(&actor.note, NO_BATTLE_DAMAGE_TAG) {
                index.protected_actors.insert(actor.id);
            }
        }
        for class in db.classes.values() {
            if tags::has_flag(&class.note, NO_BATTLE_DAMAGE_TAG) {
                index.protected_classes.insert(class.id);
            }
        }
        for state in db.states.values() {
            if tags::has_flag(&state.note, NO_BATTLE_DAMAGE_TAG) {
                index.protected_states.insert(state.id);
            }
        }

        tracing::debug!(
            equips = index.equips.len(),
            usables = index.usables.len(),
            "Built durability attribute index"
        );
        Ok(index)
    }

    /// Insert attributes directly, bypassing tag parsing
    pub fn with_equip(mut self, kind: EquipKind, id: u32, attrs: EquipAttributes) -> Self {
        self.equips.insert((kind, id), attrs);
        self
    }

    pub fn equip(&self, kind: EquipKind, id: u32) -> Option<&EquipAttributes> {
        self.equips.get(&(kind, id))
    }

    /// Targeted effects of a skill or item (empty if it has none)
    pub fn targeted_effects(&self, usable: UsableRef) -> &[TargetedEffect] {
        self.usables.get(&usable).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn actor_protected(&self, actor_id: u32) -> bool {
        self.protected_actors.contains(&actor_id)
    }

    pub fn class_protected(&self, class_id: u32) -> bool {
        self.protected_classes.contains(&class_id)
    }

    pub fn state_protected(&self, state_id: u32) -> bool {
        self.protected_states.contains(&state_id)
    }
}

fn equip_attributes(
    db: &Database,
    kind: EquipKind,
    def: &EquipDefinition,
) -> Result<EquipAttributes, ConfigError> {
    let owner = match kind {
        EquipKind::Weapon => format!("Weapon {}", def.id),
        EquipKind::Armor => format!("Armor {}", def.id),
    };

    let mut salvage = Vec::new();
    for scrap in tags::scrap_tags(&def.note, &owner)? {
        let output_kind = ItemKind::from_code(scrap.kind).ok_or(ConfigError::OutOfRange {
            field: "salvage kind",
            value: i64::from(scrap.kind),
            min: 1,
            max: 3,
        })?;
        if scrap.chance > 100 {
            return Err(ConfigError::OutOfRange {
                field: "salvage chance",
                value: i64::from(scrap.chance),
                min: 0,
                max: 100,
            });
        }
        let output = ItemRef::new(output_kind, scrap.id);
        if !db.contains(output) {
            return Err(ConfigError::UnknownReference {
                owner,
                target: output,
            });
        }
        salvage.push(SalvageRule {
            output,
            quantity: scrap.quantity,
            chance_percent: scrap.chance as u8,
        });
    }

    let elements = tags::element_tags(&def.note, &owner)?
        .into_iter()
        .map(|tag| ElementMultiplier {
            element_id: tag.element_id,
            delta: tag.delta,
        })
        .collect();

    Ok(EquipAttributes {
        salvage,
        elements,
        no_battle_damage: tags::has_flag(&def.note, NO_BATTLE_DAMAGE_TAG),
        reverse_edge: tags::has_flag(&def.note, REVERSE_EDGE_TAG),
        break_sound: tags::break_sound_tag_of(&def.note, &owner)?,
    })
}

fn targeted_effects(note: &str, owner: &str) -> Result<Vec<TargetedEffect>, ConfigError> {
    tags::user_equip_tags(note, owner)?
        .into_iter()
        .map(|tag| {
            let kind = EquipKind::from_code(tag.kind).ok_or(ConfigError::OutOfRange {
                field: "user equip kind",
                value: i64::from(tag.kind),
                min: 1,
                max: 2,
            })?;
            Ok(TargetedEffect {
                kind,
                sub_type_id: tag.sub_type,
                delta: tag.delta,
            })
        })
        .collect()
}
