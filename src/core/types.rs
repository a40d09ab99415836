//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Durability value reported for instances that can never break
/// (unbreakable definitions, shared non-independent copies, unknown ids).
pub const UNBREAKABLE: i32 = -1;

/// Unique identifier for an equipment instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

/// Identifier of a party member (matches the actor definition id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// Database element id. Negative ids are legal (-1 is "normal attack").
pub type ElementId = i32;

/// The two kinds of equippable definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipKind {
    Weapon,
    Armor,
}

impl EquipKind {
    /// Decode the numeric kind used by targeted-effect tags (1 = weapon, 2 = armor)
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(EquipKind::Weapon),
            2 => Some(EquipKind::Armor),
            _ => None,
        }
    }

    pub fn as_item_kind(self) -> ItemKind {
        match self {
            EquipKind::Weapon => ItemKind::Weapon,
            EquipKind::Armor => ItemKind::Armor,
        }
    }
}

/// Every kind of database entry a salvage roll can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Item,
    Weapon,
    Armor,
}

impl ItemKind {
    /// Decode the numeric kind used by salvage tags (1 = item, 2 = weapon, 3 = armor)
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(ItemKind::Item),
            2 => Some(ItemKind::Weapon),
            3 => Some(ItemKind::Armor),
            _ => None,
        }
    }

    pub fn as_equip_kind(self) -> Option<EquipKind> {
        match self {
            ItemKind::Item => None,
            ItemKind::Weapon => Some(EquipKind::Weapon),
            ItemKind::Armor => Some(EquipKind::Armor),
        }
    }
}

/// Reference to a database definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    pub kind: ItemKind,
    pub id: u32,
}

impl ItemRef {
    pub fn new(kind: ItemKind, id: u32) -> Self {
        Self { kind, id }
    }

    pub fn weapon(id: u32) -> Self {
        Self::new(ItemKind::Weapon, id)
    }

    pub fn armor(id: u32) -> Self {
        Self::new(ItemKind::Armor, id)
    }

    pub fn item(id: u32) -> Self {
        Self::new(ItemKind::Item, id)
    }
}

/// Something an actor can use in battle: a skill or a consumable item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsableRef {
    Skill(u32),
    Item(u32),
}

/// The eight base parameters carried by every equip definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatId {
    MaxHp,
    MaxMp,
    Attack,
    Defense,
    MagicAttack,
    MagicDefense,
    Agility,
    Luck,
}

impl StatId {
    pub const ALL: [StatId; 8] = [
        StatId::MaxHp,
        StatId::MaxMp,
        StatId::Attack,
        StatId::Defense,
        StatId::MagicAttack,
        StatId::MagicDefense,
        StatId::Agility,
        StatId::Luck,
    ];

    /// Position of this parameter in a definition's `params` array
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A sound effect request (file name plus mixing parameters)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundDescriptor {
    pub name: String,
    pub volume: u32,
    pub pitch: u32,
    pub pan: i32,
}

impl SoundDescriptor {
    pub fn new(name: impl Into<String>, volume: u32, pitch: u32, pan: i32) -> Self {
        Self {
            name: name.into(),
            volume,
            pitch,
            pan,
        }
    }
}

impl Default for SoundDescriptor {
    fn default() -> Self {
        Self::new("Crash", 100, 150, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes() {
        assert_eq!(ItemKind::from_code(1), Some(ItemKind::Item));
        assert_eq!(ItemKind::from_code(3), Some(ItemKind::Armor));
        assert_eq!(ItemKind::from_code(4), None);
        assert_eq!(EquipKind::from_code(2), Some(EquipKind::Armor));
        assert_eq!(EquipKind::from_code(0), None);
    }

    #[test]
    fn test_stat_indices_follow_param_layout() {
        for (i, stat) in StatId::ALL.iter().enumerate() {
            assert_eq!(stat.index(), i);
        }
    }
}
