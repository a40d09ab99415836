pub mod derivation;

pub use derivation::{derive_stat, equipment_param_bonus, instance_stat, WearInput};
