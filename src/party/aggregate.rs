//! Party-wide durability operations
//!
//! Reachable instances are the shared inventory first, then every member's
//! equips in member order and slot order. Operations that can zero an
//! instance return the newly broken ones with their owners so the caller can
//! run breakage afterwards.

use crate::core::types::{ActorId, EquipKind, InstanceId};
use crate::equipment::host::EquipHost;
use crate::equipment::ledger::Applied;

/// A newly broken instance and the actor wearing it, if any
pub type Broken = (Option<ActorId>, InstanceId);

/// Weapon slots checked by [`is_weapon_broken`]
const WEAPON_SLOTS: std::ops::Range<usize> = 0..2;
/// Armor slots checked by [`is_armor_broken`]
const ARMOR_SLOTS: std::ops::Range<usize> = 1..5;

/// Every instance in the inventory and the members' slots, in search order
pub fn reachable<H: EquipHost + ?Sized>(host: &H) -> Vec<(Option<ActorId>, InstanceId)> {
    let mut out: Vec<(Option<ActorId>, InstanceId)> =
        host.inventory().into_iter().map(|id| (None, id)).collect();
    for actor in host.members() {
        out.extend(host.equipped(actor).into_iter().flatten().map(|id| (Some(actor), id)));
    }
    out
}

/// Sum of current (or max) durability over reachable breakable instances
pub fn total_durability<H: EquipHost + ?Sized>(host: &H, count_max: bool) -> i64 {
    let ledger = host.ledger();
    reachable(host)
        .into_iter()
        .filter(|(_, id)| ledger.contains(*id) && !ledger.is_unbreakable(*id))
        .map(|(_, id)| {
            let value = if count_max { ledger.max(id) } else { ledger.get(id) };
            i64::from(value)
        })
        .sum()
}

/// Apply a percentage repair (or wear, when negative) to every reachable
/// breakable instance
pub fn fix_all<H: EquipHost + ?Sized>(host: &mut H, percent: f64) -> Vec<Broken> {
    let targets = reachable(host);
    let ledger = host.ledger_mut();
    let mut broken = Vec::new();
    for (owner, id) in targets {
        if let Some(applied) = ledger.apply_percent(id, percent) {
            if applied.broke() {
                broken.push((owner, id));
            }
        }
    }
    tracing::debug!(percent, broken = broken.len(), "Fixed all party equipment");
    broken
}

/// Apply `delta` to the first reachable breakable instance of a definition.
///
/// Duplicates after the first match are left alone. Returns the instance,
/// its owner and the write, or `None` if nothing matched.
pub fn change_by_type_and_id<H: EquipHost + ?Sized>(
    host: &mut H,
    kind: EquipKind,
    definition_id: u32,
    delta: f64,
) -> Option<(Option<ActorId>, InstanceId, Applied)> {
    let (owner, id) = reachable(host).into_iter().find(|(_, id)| {
        host.ledger()
            .instance(*id)
            .map(|i| i.kind == kind && i.definition_id == definition_id && !i.is_unbreakable())
            .unwrap_or(false)
    })?;
    let applied = host.ledger_mut().apply_delta(id, delta)?;
    Some((owner, id, applied))
}

fn slot_broken<H: EquipHost + ?Sized>(
    host: &H,
    actor: ActorId,
    slots: std::ops::Range<usize>,
    kind: EquipKind,
    sub_type_id: u32,
) -> bool {
    let equips = host.equipped(actor);
    slots
        .filter_map(|slot| equips.get(slot).copied().flatten())
        .filter_map(|id| host.ledger().instance(id))
        .any(|i| i.kind == kind && i.sub_type_id == sub_type_id && i.is_broken())
}

/// A broken weapon of this weapon type sits in one of the two weapon slots
pub fn is_weapon_broken<H: EquipHost + ?Sized>(host: &H, actor: ActorId, weapon_type_id: u32) -> bool {
    slot_broken(host, actor, WEAPON_SLOTS, EquipKind::Weapon, weapon_type_id)
}

/// A broken armor of this armor type sits in slots 1 through 4
pub fn is_armor_broken<H: EquipHost + ?Sized>(host: &H, actor: ActorId, armor_type_id: u32) -> bool {
    slot_broken(host, actor, ARMOR_SLOTS, EquipKind::Armor, armor_type_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ItemRef;
    use crate::data::database::Database;
    use crate::party::roster::Party;

    const DB: &str = r#"
[[weapons]]
id = 1
name = "Short Sword"
sub_type = 2
equip_type = 1
max_durability = 50

[[armors]]
id = 1
name = "Buckler"
sub_type = 4
equip_type = 2
max_durability = 30

[[armors]]
id = 2
name = "Cap"
sub_type = 1
equip_type = 3

[[actors]]
id = 1
name = "Harold"
class_id = 1
equip_slots = [1, 2, 3, 4, 5]
equips = [1, 1, 2, 0, 0]

[[actors]]
id = 2
name = "Therese"
class_id = 1
equip_slots = [1, 2, 3, 4, 5]
equips = [1, 0, 0, 0, 0]
"#;

    fn setup() -> (Database, Party) {
        let db = Database::parse_toml(DB).unwrap();
        let mut party = Party::from_database(&db, &[1, 2]).unwrap();
        party.grant(&db, ItemRef::weapon(1), 1).unwrap();
        (db, party)
    }

    #[test]
    fn test_reachable_order() {
        let (_, party) = setup();
        let order = reachable(&party);
        assert_eq!(order.len(), 5);
        assert_eq!(order[0].0, None);
        assert_eq!(order[1].0, Some(ActorId(1)));
        assert_eq!(order[4].0, Some(ActorId(2)));
    }

    #[test]
    fn test_total_skips_unbreakable() {
        let (_, party) = setup();
        // 3 swords + 1 buckler; the cap is unbreakable
        assert_eq!(total_durability(&party, true), 50 * 3 + 30);
        assert_eq!(total_durability(&party, false), 50 * 3 + 30);
    }

    #[test]
    fn test_fix_all_round_trip() {
        let (_, mut party) = setup();

        let broken = fix_all(&mut party, -100.0);
        assert_eq!(broken.len(), 4);
        assert_eq!(total_durability(&party, false), 0);

        // Idempotent at zero
        assert!(fix_all(&mut party, -100.0).is_empty());
        assert_eq!(total_durability(&party, false), 0);

        assert!(fix_all(&mut party, 100.0).is_empty());
        assert_eq!(total_durability(&party, false), total_durability(&party, true));
    }

    #[test]
    fn test_change_by_type_and_id_hits_first_match_only() {
        let (_, mut party) = setup();
        let (owner, id, applied) = change_by_type_and_id(&mut party, EquipKind::Weapon, 1, -20.0).unwrap();

        assert_eq!(owner, None);
        assert_eq!(id, party.inventory()[0]);
        assert_eq!(applied.after, 30);
        assert_eq!(total_durability(&party, false), 50 * 3 + 30 - 20);
    }

    #[test]
    fn test_change_by_type_and_id_skips_unbreakable() {
        let (_, mut party) = setup();
        assert!(change_by_type_and_id(&mut party, EquipKind::Armor, 2, -5.0).is_none());
        assert!(change_by_type_and_id(&mut party, EquipKind::Armor, 77, -5.0).is_none());
    }

    #[test]
    fn test_broken_type_queries() {
        let (_, mut party) = setup();
        assert!(!is_weapon_broken(&party, ActorId(1), 2));

        let sword = party.equipped(ActorId(1))[0].unwrap();
        let shield = party.equipped(ActorId(1))[1].unwrap();
        party.ledger_mut().apply_delta(sword, -50.0);
        party.ledger_mut().apply_delta(shield, -30.0);

        assert!(is_weapon_broken(&party, ActorId(1), 2));
        assert!(!is_weapon_broken(&party, ActorId(1), 3));
        assert!(is_armor_broken(&party, ActorId(1), 4));
        assert!(!is_armor_broken(&party, ActorId(2), 4));
    }
}
