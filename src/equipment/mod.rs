//! Equipment instances, their durability ledger, and the container contract

pub mod host;
pub mod instance;
pub mod ledger;

pub use host::{ActorProfile, EquipHost};
pub use instance::EquipmentInstance;
pub use ledger::{Applied, DurabilityLedger};
