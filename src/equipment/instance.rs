//! Runtime equipment instances
//!
//! An instance is one concrete copy of a weapon or armor definition. Independent
//! copies carry their own durability and max durability; shared copies report
//! the unbreakable sentinel and never wear.

use serde::{Deserialize, Serialize};

use crate::core::types::{EquipKind, InstanceId, ItemRef, StatId, UNBREAKABLE};
use crate::data::database::EquipDefinition;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentInstance {
    pub id: InstanceId,
    pub kind: EquipKind,
    /// Definition this instance was copied from
    pub definition_id: u32,
    pub name: String,
    pub icon: u32,
    /// Weapon type or armor type
    pub sub_type_id: u32,
    /// Equip slot type
    pub equip_type_id: u32,
    pub params: [i32; 8],
    /// Whether this copy owns its own durability
    pub independent: bool,
    /// Current durability, or [`UNBREAKABLE`]
    pub durability: i32,
    /// Instance-level max durability
    pub max_durability: i32,
    /// Max durability of the definition at the time the copy was made
    pub base_max_durability: i32,
}

impl EquipmentInstance {
    /// Create an independent copy at full durability
    pub fn from_definition(id: InstanceId, kind: EquipKind, def: &EquipDefinition) -> Self {
        let mut instance = Self::shared(id, kind, def);
        instance.independent = true;
        instance.durability = instance.resolved_max();
        instance
    }

    /// Create a shared, non-independent copy (never wears)
    pub fn shared(id: InstanceId, kind: EquipKind, def: &EquipDefinition) -> Self {
        Self {
            id,
            kind,
            definition_id: def.id,
            name: def.name.clone(),
            icon: def.icon,
            sub_type_id: def.sub_type,
            equip_type_id: def.equip_type,
            params: def.params,
            independent: false,
            durability: UNBREAKABLE,
            max_durability: def.max_durability,
            base_max_durability: def.max_durability,
        }
    }

    /// Effective max durability.
    ///
    /// - shared copies are unbreakable
    /// - an unbreakable definition stays unbreakable unless this copy raised
    ///   its own max above zero
    /// - a breakable definition never resolves below 1
    /// - the instance value wins only when it differs from the definition's
    pub fn resolved_max(&self) -> i32 {
        if !self.independent {
            return UNBREAKABLE;
        }
        let base = self.base_max_durability;
        let own = self.max_durability;
        if base == UNBREAKABLE {
            return if own > 0 { own } else { UNBREAKABLE };
        }
        if own != base {
            return own.max(1);
        }
        base.max(1)
    }

    pub fn is_unbreakable(&self) -> bool {
        self.resolved_max() == UNBREAKABLE || self.durability == UNBREAKABLE
    }

    pub fn is_broken(&self) -> bool {
        self.durability == 0
    }

    pub fn item_ref(&self) -> ItemRef {
        ItemRef::new(self.kind.as_item_kind(), self.definition_id)
    }

    /// Base value of one parameter, before wear
    pub fn param(&self, stat: StatId) -> i32 {
        self.params[stat.index()]
    }
}
