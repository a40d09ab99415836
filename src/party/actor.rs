//! Party member state

use serde::Serialize;

use crate::core::types::{ActorId, ElementId, EquipKind, InstanceId};
use crate::data::database::{ActorDefinition, ClassDefinition};
use crate::equipment::host::ActorProfile;
use crate::equipment::instance::EquipmentInstance;

/// A party member with their equip slots
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub class_id: u32,
    pub state_ids: Vec<u32>,
    /// Equip type of each slot
    pub equip_slots: Vec<u32>,
    /// Equipped instance per slot
    pub equips: Vec<Option<InstanceId>>,
    pub last_elements: Vec<ElementId>,
    /// Weapon types the class may wield. Empty allows every type.
    pub weapon_types: Vec<u32>,
    /// Armor types the class may wear. Empty allows every type.
    pub armor_types: Vec<u32>,
    /// Equip slot types that are sealed
    pub sealed_equip_types: Vec<u32>,
}

impl Actor {
    /// Build an actor with empty slots. `class` may be missing from the database.
    pub fn from_definition(def: &ActorDefinition, class: Option<&ClassDefinition>) -> Self {
        Self {
            id: ActorId(def.id),
            name: def.name.clone(),
            class_id: def.class_id,
            state_ids: Vec::new(),
            equip_slots: def.equip_slots.clone(),
            equips: vec![None; def.equip_slots.len()],
            last_elements: Vec::new(),
            weapon_types: class.map(|c| c.weapon_types.clone()).unwrap_or_default(),
            armor_types: class.map(|c| c.armor_types.clone()).unwrap_or_default(),
            sealed_equip_types: class.map(|c| c.sealed_equip_types.clone()).unwrap_or_default(),
        }
    }

    pub fn profile(&self) -> ActorProfile {
        ActorProfile {
            id: self.id,
            name: self.name.clone(),
            class_id: self.class_id,
            state_ids: self.state_ids.clone(),
            last_elements: self.last_elements.clone(),
        }
    }

    pub fn add_state(&mut self, state_id: u32) {
        if !self.state_ids.contains(&state_id) {
            self.state_ids.push(state_id);
        }
    }

    pub fn remove_state(&mut self, state_id: u32) {
        self.state_ids.retain(|s| *s != state_id);
    }

    /// Class and seal constraints for wearing `instance` at all
    pub fn allows(&self, instance: &EquipmentInstance) -> bool {
        if self.sealed_equip_types.contains(&instance.equip_type_id) {
            return false;
        }
        let allowed = match instance.kind {
            EquipKind::Weapon => &self.weapon_types,
            EquipKind::Armor => &self.armor_types,
        };
        allowed.is_empty() || allowed.contains(&instance.sub_type_id)
    }
}
