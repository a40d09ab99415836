//! Item database loaded from TOML
//!
//! Each table mirrors one section of the game database. Definitions keep their
//! raw `note` text; durability tags inside it are parsed separately by
//! [`crate::data::index::AttributeIndex::build`].

use ahash::AHashMap;
use serde::Deserialize;
use std::path::Path;

use crate::core::error::{ConfigError, Result};
use crate::core::types::{ElementId, EquipKind, ItemKind, ItemRef, UsableRef};

fn default_unbreakable() -> i32 {
    crate::core::types::UNBREAKABLE
}

/// A consumable item (salvage output or usable in battle)
#[derive(Debug, Clone, Deserialize)]
pub struct ItemDefinition {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub icon: u32,
    /// Damage element of the item when used in battle
    #[serde(default)]
    pub element_id: ElementId,
    #[serde(default)]
    pub note: String,
}

/// A weapon or armor definition
#[derive(Debug, Clone, Deserialize)]
pub struct EquipDefinition {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub icon: u32,
    /// Weapon type for weapons, armor type for armors
    pub sub_type: u32,
    /// Equip slot type this definition fits into
    pub equip_type: u32,
    /// Base parameters: mhp, mmp, atk, def, mat, mdf, agi, luk
    #[serde(default)]
    pub params: [i32; 8],
    /// Definition-level max durability, -1 for unbreakable
    #[serde(default = "default_unbreakable")]
    pub max_durability: i32,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillDefinition {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub element_id: ElementId,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActorDefinition {
    pub id: u32,
    pub name: String,
    pub class_id: u32,
    /// Equip type of each slot, in slot order
    pub equip_slots: Vec<u32>,
    /// Starting equipment per slot: weapon id for slot 0, armor ids after. 0 = empty
    #[serde(default)]
    pub equips: Vec<u32>,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassDefinition {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub weapon_types: Vec<u32>,
    #[serde(default)]
    pub armor_types: Vec<u32>,
    #[serde(default)]
    pub sealed_equip_types: Vec<u32>,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateDefinition {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub note: String,
}

/// TOML representation of the database file
#[derive(Debug, Default, Deserialize)]
struct TomlDatabase {
    #[serde(default)]
    items: Vec<ItemDefinition>,
    #[serde(default)]
    weapons: Vec<EquipDefinition>,
    #[serde(default)]
    armors: Vec<EquipDefinition>,
    #[serde(default)]
    skills: Vec<SkillDefinition>,
    #[serde(default)]
    actors: Vec<ActorDefinition>,
    #[serde(default)]
    classes: Vec<ClassDefinition>,
    #[serde(default)]
    states: Vec<StateDefinition>,
}

/// All definitions, keyed by id
#[derive(Debug, Clone, Default)]
pub struct Database {
    pub items: AHashMap<u32, ItemDefinition>,
    pub weapons: AHashMap<u32, EquipDefinition>,
    pub armors: AHashMap<u32, EquipDefinition>,
    pub skills: AHashMap<u32, SkillDefinition>,
    pub actors: AHashMap<u32, ActorDefinition>,
    pub classes: AHashMap<u32, ClassDefinition>,
    pub states: AHashMap<u32, StateDefinition>,
}

fn keyed<T>(
    table: &'static str,
    rows: Vec<T>,
    id_of: impl Fn(&T) -> u32,
) -> std::result::Result<AHashMap<u32, T>, ConfigError> {
    let mut map = AHashMap::with_capacity(rows.len());
    for row in rows {
        let id = id_of(&row);
        if map.insert(id, row).is_some() {
            return Err(ConfigError::DuplicateId { table, id });
        }
    }
    Ok(map)
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a database from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse a database from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let raw: TomlDatabase = toml::from_str(content)?;
        Ok(Self {
            items: keyed("items", raw.items, |d| d.id)?,
            weapons: keyed("weapons", raw.weapons, |d| d.id)?,
            armors: keyed("armors", raw.armors, |d| d.id)?,
            skills: keyed("skills", raw.skills, |d| d.id)?,
            actors: keyed("actors", raw.actors, |d| d.id)?,
            classes: keyed("classes", raw.classes, |d| d.id)?,
            states: keyed("states", raw.states, |d| d.id)?,
        })
    }

    pub fn equip(&self, kind: EquipKind, id: u32) -> Option<&EquipDefinition> {
        match kind {
            EquipKind::Weapon => self.weapons.get(&id),
            EquipKind::Armor => self.armors.get(&id),
        }
    }

    /// True if the referenced definition exists
    pub fn contains(&self, item: ItemRef) -> bool {
        match item.kind {
            ItemKind::Item => self.items.contains_key(&item.id),
            ItemKind::Weapon => self.weapons.contains_key(&item.id),
            ItemKind::Armor => self.armors.contains_key(&item.id),
        }
    }

    /// Display name and icon of any definition
    pub fn label(&self, item: ItemRef) -> Option<(&str, u32)> {
        match item.kind {
            ItemKind::Item => self.items.get(&item.id).map(|d| (d.name.as_str(), d.icon)),
            ItemKind::Weapon => self.weapons.get(&item.id).map(|d| (d.name.as_str(), d.icon)),
            ItemKind::Armor => self.armors.get(&item.id).map(|d| (d.name.as_str(), d.icon)),
        }
    }

    /// Damage element of a skill or item
    pub fn usable_element(&self, usable: UsableRef) -> Option<ElementId> {
        match usable {
            UsableRef::Skill(id) => self.skills.get(&id).map(|s| s.element_id),
            UsableRef::Item(id) => self.items.get(&id).map(|i| i.element_id),
        }
    }
}
