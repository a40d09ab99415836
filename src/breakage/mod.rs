//! What happens when equipment breaks

pub mod coordinator;
pub mod release;
pub mod salvage;
pub mod surfaces;

pub use coordinator::{BreakReport, BreakageCoordinator};
pub use release::{can_equip, release_unequippable};
pub use salvage::{roll_salvage, SalvageGrant};
pub use surfaces::{AudioSurface, BreakHook, MessageSurface, Surfaces, TracingSurface};
