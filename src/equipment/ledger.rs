//! Durability ledger
//!
//! Owns every equipment instance and is the only place durability values are
//! written. All arithmetic clamps into `[0, max]`; unknown, shared and
//! unbreakable instances are silent no-ops.

use ahash::AHashMap;

use crate::core::types::{EquipKind, InstanceId, UNBREAKABLE};
use crate::data::database::EquipDefinition;
use crate::equipment::instance::EquipmentInstance;

/// Before/after values of one durability write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub before: i32,
    pub after: i32,
}

impl Applied {
    /// The write took the instance from a positive value to zero
    pub fn broke(&self) -> bool {
        self.before != 0 && self.after == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct DurabilityLedger {
    instances: AHashMap<InstanceId, EquipmentInstance>,
    next_id: u64,
}

impl DurabilityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> InstanceId {
        self.next_id += 1;
        InstanceId(self.next_id)
    }

    /// Create an independent instance of a definition at full durability
    pub fn create(&mut self, kind: EquipKind, def: &EquipDefinition) -> InstanceId {
        let id = self.allocate_id();
        let instance = EquipmentInstance::from_definition(id, kind, def);
        tracing::trace!(?id, name = %instance.name, durability = instance.durability, "Created instance");
        self.instances.insert(id, instance);
        id
    }

    /// Create a shared (non-independent) copy
    pub fn create_shared(&mut self, kind: EquipKind, def: &EquipDefinition) -> InstanceId {
        let id = self.allocate_id();
        self.instances
            .insert(id, EquipmentInstance::shared(id, kind, def));
        id
    }

    pub fn instance(&self, id: InstanceId) -> Option<&EquipmentInstance> {
        self.instances.get(&id)
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Option<&mut EquipmentInstance> {
        self.instances.get_mut(&id)
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.instances.contains_key(&id)
    }

    /// Forget an instance (destroy policy)
    pub fn remove(&mut self, id: InstanceId) -> Option<EquipmentInstance> {
        self.instances.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Current durability, [`UNBREAKABLE`] for unknown instances
    pub fn get(&self, id: InstanceId) -> i32 {
        self.instances
            .get(&id)
            .map(|i| i.durability)
            .unwrap_or(UNBREAKABLE)
    }

    /// Resolved max durability, [`UNBREAKABLE`] for unknown instances
    pub fn max(&self, id: InstanceId) -> i32 {
        self.instances
            .get(&id)
            .map(EquipmentInstance::resolved_max)
            .unwrap_or(UNBREAKABLE)
    }

    pub fn is_unbreakable(&self, id: InstanceId) -> bool {
        self.instances
            .get(&id)
            .map(EquipmentInstance::is_unbreakable)
            .unwrap_or(true)
    }

    pub fn is_broken(&self, id: InstanceId) -> bool {
        self.instances
            .get(&id)
            .map(EquipmentInstance::is_broken)
            .unwrap_or(false)
    }

    /// Add `raw_delta` to the current durability and clamp to `[0, max]`.
    ///
    /// Fractional results are floored, so anything below 1 lands at 0.
    /// Returns `None` (and changes nothing) for unbreakable or unknown
    /// instances.
    pub fn apply_delta(&mut self, id: InstanceId, raw_delta: f64) -> Option<Applied> {
        let instance = self.instances.get_mut(&id)?;
        let max = instance.resolved_max();
        if max == UNBREAKABLE || instance.durability == UNBREAKABLE {
            return None;
        }

        let before = instance.durability;
        let delta = if raw_delta.is_nan() { 0.0 } else { raw_delta };
        let after = (f64::from(before) + delta).floor().clamp(0.0, f64::from(max)) as i32;
        instance.durability = after;

        tracing::debug!(?id, before, after, max, "Durability changed");
        Some(Applied { before, after })
    }

    /// Add `max * percent / 100` to the current durability.
    ///
    /// A non-positive percent on an instance that is already at zero is a
    /// no-op, so repeated damaging sweeps never re-break the same item.
    pub fn apply_percent(&mut self, id: InstanceId, percent: f64) -> Option<Applied> {
        let instance = self.instances.get(&id)?;
        let max = instance.resolved_max();
        if max == UNBREAKABLE || instance.durability == UNBREAKABLE {
            return None;
        }
        if instance.durability <= 0 && percent <= 0.0 {
            return None;
        }
        self.apply_delta(id, f64::from(max) * percent / 100.0)
    }

    /// Restore an instance to its max durability
    pub fn reset_to_full(&mut self, id: InstanceId) -> Option<Applied> {
        let instance = self.instances.get_mut(&id)?;
        let max = instance.resolved_max();
        if max == UNBREAKABLE {
            return None;
        }
        let before = instance.durability;
        instance.durability = max;
        Some(Applied { before, after: max })
    }

    /// Change an instance's max durability.
    ///
    /// A breakable instance's max never drops below 1 and the current value is
    /// pulled back into range. Raising an unbreakable copy's max above zero
    /// makes it breakable at full durability.
    pub fn set_max(&mut self, id: InstanceId, new_max: i32) {
        let Some(instance) = self.instances.get_mut(&id) else {
            return;
        };
        if !instance.independent {
            return;
        }

        let was_unbreakable = instance.resolved_max() == UNBREAKABLE;
        let breakable_base = instance.base_max_durability != UNBREAKABLE;
        instance.max_durability = if breakable_base { new_max.max(1) } else { new_max };

        let max = instance.resolved_max();
        if max == UNBREAKABLE {
            instance.durability = UNBREAKABLE;
        } else if was_unbreakable || instance.durability == UNBREAKABLE {
            instance.durability = max;
        } else {
            instance.durability = instance.durability.clamp(0, max);
        }
        tracing::debug!(?id, max, durability = instance.durability, "Max durability changed");
    }

    pub fn iter(&self) -> impl Iterator<Item = &EquipmentInstance> {
        self.instances.values()
    }
}
