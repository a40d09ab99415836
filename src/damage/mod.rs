//! Battle wear: element multipliers, protection, and routing strategies

pub mod element;
pub mod protection;
pub mod router;

pub use element::element_multiplier;
pub use protection::ProtectionContext;
pub use router::{DamageRouter, Strike};
