pub mod config;
pub mod error;
pub mod types;

pub use config::{BreakPolicy, DurabilityConfig};
pub use error::{ConfigError, DurabilityError, GrantError, Result};
pub use types::{ActorId, ElementId, EquipKind, InstanceId, ItemKind, ItemRef, StatId, UsableRef};
