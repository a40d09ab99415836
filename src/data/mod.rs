//! Database loading and the durability attribute index

pub mod database;
pub mod index;
pub mod tags;

pub use database::{
    ActorDefinition, ClassDefinition, Database, EquipDefinition, ItemDefinition, SkillDefinition,
    StateDefinition,
};
pub use index::{AttributeIndex, ElementMultiplier, EquipAttributes, SalvageRule, TargetedEffect};
