//! Party container and party-wide durability operations

pub mod actor;
pub mod aggregate;
pub mod roster;

pub use actor::Actor;
pub use aggregate::{
    change_by_type_and_id, fix_all, is_armor_broken, is_weapon_broken, reachable, total_durability,
};
pub use roster::{Party, PartySnapshot};
