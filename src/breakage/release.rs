//! Unequip cascade for the unequip break policy
//!
//! Taking one item off can invalidate others (a two-handed grip, an off-hand
//! that depended on the main hand, a seal granted by the removed item). The
//! cascade re-scans every slot until a full pass releases nothing.

use crate::core::config::{BreakPolicy, DurabilityConfig};
use crate::core::types::{ActorId, InstanceId};
use crate::equipment::host::EquipHost;
use crate::equipment::instance::EquipmentInstance;

/// Container constraints plus the durability rule: under the unequip policy a
/// broken instance cannot be equipped until repaired.
pub fn can_equip<H: EquipHost + ?Sized>(
    config: &DurabilityConfig,
    host: &H,
    actor: ActorId,
    instance: &EquipmentInstance,
) -> bool {
    if config.break_policy == BreakPolicy::Unequip && instance.is_broken() {
        return false;
    }
    host.meets_equip_constraints(actor, instance)
}

fn slot_is_valid<H: EquipHost + ?Sized>(
    config: &DurabilityConfig,
    host: &H,
    actor: ActorId,
    slot_type: Option<u32>,
    id: InstanceId,
) -> bool {
    let Some(instance) = host.ledger().instance(id) else {
        return false;
    };
    slot_type == Some(instance.equip_type_id) && can_equip(config, host, actor, instance)
}

fn equipped_count<H: EquipHost + ?Sized>(host: &H, actor: ActorId) -> usize {
    host.equipped(actor).iter().flatten().count()
}

/// Empty one slot. Emptying the main hand also empties the off-hand when
/// configured.
pub fn release_slot<H: EquipHost + ?Sized>(
    config: &DurabilityConfig,
    host: &mut H,
    actor: ActorId,
    slot: usize,
) -> Vec<InstanceId> {
    let mut released: Vec<InstanceId> = host.unequip(actor, slot).into_iter().collect();
    if slot == 0 && config.release_offhand_with_main {
        released.extend(host.unequip(actor, 1));
    }
    released
}

/// Release every equip that is in the wrong slot or can no longer be worn.
///
/// Each pass that changes anything strictly lowers the number of equipped
/// instances, so the loop ends after at most one pass per slot.
pub fn release_unequippable<H: EquipHost + ?Sized>(
    config: &DurabilityConfig,
    host: &mut H,
    actor: ActorId,
) -> Vec<InstanceId> {
    let mut released = Vec::new();

    loop {
        let before = equipped_count(host, actor);
        let slots = host.equip_slots(actor);
        let equips = host.equipped(actor);
        let mut changed = false;

        for (slot, entry) in equips.iter().enumerate() {
            let Some(id) = *entry else {
                continue;
            };
            // An earlier release in this pass may already have emptied the slot
            if host.equipped(actor).get(slot).copied().flatten() != Some(id) {
                continue;
            }
            if slot_is_valid(config, host, actor, slots.get(slot).copied(), id) {
                continue;
            }

            let removed = release_slot(config, host, actor, slot);
            if !removed.is_empty() {
                tracing::debug!(?actor, slot, ?removed, "Released unequippable item");
                changed = true;
            }
            released.extend(removed);
        }

        if !changed {
            break;
        }
        if equipped_count(host, actor) >= before {
            tracing::warn!(?actor, "Equip container did not release items; stopping cascade");
            break;
        }
    }

    released
}
