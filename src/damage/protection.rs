//! Actor-level battle wear protection

use crate::data::index::AttributeIndex;
use crate::equipment::host::ActorProfile;

/// Whether an actor's equipment is shielded from battle wear right now.
///
/// Recomputed for every damage event: the actor, their current class, or any
/// active state carrying `<NoBattleDD>` protects every equip they wear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProtectionContext {
    pub protected: bool,
}

impl ProtectionContext {
    pub fn unprotected() -> Self {
        Self { protected: false }
    }

    pub fn resolve(index: &AttributeIndex, actor_id: u32, class_id: u32, state_ids: &[u32]) -> Self {
        let protected = index.actor_protected(actor_id)
            || index.class_protected(class_id)
            || state_ids.iter().any(|state| index.state_protected(*state));
        Self { protected }
    }

    pub fn for_profile(index: &AttributeIndex, profile: &ActorProfile) -> Self {
        Self::resolve(index, profile.id.0, profile.class_id, &profile.state_ids)
    }
}
