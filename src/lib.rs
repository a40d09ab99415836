//! Equip Durability - equipment wear, breakage and salvage rules for RPG parties

pub mod breakage;
pub mod core;
pub mod damage;
pub mod data;
pub mod engine;
pub mod equipment;
pub mod party;
pub mod stats;
