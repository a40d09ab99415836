//! Integration tests for breakage handling
//!
//! These tests drive the engine against the in-memory party and verify:
//! - Each break policy (destroy, retain, unequip) and the unequip cascade
//! - Break sound override, custom hook and message surface ordering
//! - Salvage grants, including rejected grants that must not block others
//! - Protection from actors, classes and states

use std::cell::RefCell;
use std::rc::Rc;

use equip_durability::breakage::{AudioSurface, BreakHook, MessageSurface, Surfaces};
use equip_durability::core::config::{BreakPolicy, DurabilityConfig};
use equip_durability::core::types::{ActorId, EquipKind, InstanceId, ItemRef, SoundDescriptor};
use equip_durability::data::database::Database;
use equip_durability::engine::DurabilityEngine;
use equip_durability::equipment::host::EquipHost;
use equip_durability::equipment::instance::EquipmentInstance;
use equip_durability::party::Party;

const DATABASE: &str = r#"
[[items]]
id = 1
name = "Iron Scrap"
icon = 210

[[items]]
id = 2
name = "Leather Strip"
icon = 211

[[weapons]]
id = 1
name = "Short Sword"
icon = 97
sub_type = 2
equip_type = 1
max_durability = 20
note = """
<DurabilityScrap: 1, 1, 2, 100>
<DurabilityScrap: 1, 2, 1, 100>
"""

[[weapons]]
id = 2
name = "Glass Dagger"
icon = 99
sub_type = 2
equip_type = 1
max_durability = 5
note = "<Durability Break Sound: Shatter, 80, 120, -10>"

[[armors]]
id = 1
name = "Buckler"
icon = 128
sub_type = 4
equip_type = 2
max_durability = 40

[[armors]]
id = 2
name = "Leather Cap"
icon = 130
sub_type = 1
equip_type = 3
max_durability = 10

[[classes]]
id = 1
name = "Swordsman"
weapon_types = [2]
armor_types = [1, 4]

[[classes]]
id = 2
name = "Paladin"
weapon_types = [2]
armor_types = [1, 4]
note = "<NoBattleDD>"

[[states]]
id = 10
name = "Ward"
note = "<NoBattleDD>"

[[actors]]
id = 1
name = "Harold"
class_id = 1
equip_slots = [1, 2, 3, 4, 5]
equips = [1, 1, 2, 0, 0]

[[actors]]
id = 2
name = "Gwen"
class_id = 2
equip_slots = [1, 2, 3, 4, 5]
equips = [1, 1, 0, 0, 0]

[[actors]]
id = 3
name = "Pip"
class_id = 1
equip_slots = [1, 2, 3, 4, 5]
equips = [2, 0, 0, 0, 0]
note = "<NoBattleDD>"
"#;

const HAROLD: ActorId = ActorId(1);
const GWEN: ActorId = ActorId(2);
const PIP: ActorId = ActorId(3);

fn setup(policy: BreakPolicy) -> (DurabilityEngine, Party) {
    let database = Database::parse_toml(DATABASE).unwrap();
    let party = Party::from_database(&database, &[1, 2, 3]).unwrap();
    let config = DurabilityConfig::default().with_policy(policy);
    (DurabilityEngine::new(config, database, 1234).unwrap(), party)
}

fn slot(party: &Party, actor: ActorId, slot: usize) -> InstanceId {
    party.equipped(actor)[slot].unwrap()
}

/// Records every surface call in one shared log
#[derive(Clone, Default)]
struct Recorder {
    log: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    fn entries(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl MessageSurface for Recorder {
    fn post(&mut self, text: &str) {
        self.log.borrow_mut().push(format!("message: {text}"));
    }
}

impl AudioSurface for Recorder {
    fn play(&mut self, sound: &SoundDescriptor) {
        self.log.borrow_mut().push(format!("sound: {}", sound.name));
    }
}

impl BreakHook for Recorder {
    fn on_break(&mut self, owner: Option<ActorId>, instance: &EquipmentInstance) {
        self.log
            .borrow_mut()
            .push(format!("hook: {:?} {}", owner.map(|a| a.0), instance.name));
    }
}

fn recording_surfaces() -> (Surfaces, Recorder) {
    let recorder = Recorder::default();
    let surfaces = Surfaces::new()
        .with_messages(recorder.clone())
        .with_audio(recorder.clone())
        .with_hook(recorder.clone());
    (surfaces, recorder)
}

// ============================================================================
// Break Policies
// ============================================================================

#[test]
fn test_destroy_removes_instance() {
    let (mut engine, mut party) = setup(BreakPolicy::Destroy);
    let sword = slot(&party, HAROLD, 0);

    let reports = engine.damage_targeted(&mut party, HAROLD, sword, -20.0);

    assert_eq!(reports.len(), 1);
    assert!(reports[0].destroyed);
    assert_eq!(party.equipped(HAROLD)[0], None);
    assert!(!party.ledger().contains(sword));
    assert!(!party.inventory().contains(&sword));
}

#[test]
fn test_retain_keeps_broken_instance_equipped() {
    let (mut engine, mut party) = setup(BreakPolicy::Retain);
    let sword = slot(&party, HAROLD, 0);

    let reports = engine.damage_targeted(&mut party, HAROLD, sword, -20.0);

    assert_eq!(reports.len(), 1);
    assert!(!reports[0].destroyed);
    assert_eq!(party.equipped(HAROLD)[0], Some(sword));
    assert_eq!(party.ledger().get(sword), 0);

    // Broken equips are no longer valid wear targets
    assert!(engine.damage_all(&mut party, HAROLD, -5.0).is_empty());
    assert_eq!(party.ledger().get(sword), 0);
}

#[test]
fn test_unequip_releases_main_hand_and_off_hand() {
    let (mut engine, mut party) = setup(BreakPolicy::Unequip);
    let sword = slot(&party, HAROLD, 0);
    let shield = slot(&party, HAROLD, 1);
    let cap = slot(&party, HAROLD, 2);

    let reports = engine.damage_targeted(&mut party, HAROLD, sword, -20.0);

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].released, vec![sword, shield]);
    assert_eq!(party.equipped(HAROLD), vec![None, None, Some(cap), None, None]);
    assert!(party.inventory().contains(&sword));
    assert!(party.inventory().contains(&shield));
}

#[test]
fn test_unequip_without_off_hand_release() {
    let database = Database::parse_toml(DATABASE).unwrap();
    let mut party = Party::from_database(&database, &[1]).unwrap();
    let config = DurabilityConfig {
        release_offhand_with_main: false,
        ..DurabilityConfig::default().with_policy(BreakPolicy::Unequip)
    };
    let mut engine = DurabilityEngine::new(config, database, 1).unwrap();
    let sword = slot(&party, HAROLD, 0);
    let shield = slot(&party, HAROLD, 1);

    let reports = engine.damage_targeted(&mut party, HAROLD, sword, -20.0);

    assert_eq!(reports[0].released, vec![sword]);
    assert_eq!(party.equipped(HAROLD)[1], Some(shield));
}

#[test]
fn test_unequip_cascade_releases_other_broken_equips() {
    let (mut engine, mut party) = setup(BreakPolicy::Unequip);
    let sword = slot(&party, HAROLD, 0);
    let cap = slot(&party, HAROLD, 2);

    // Zero the cap directly so it never went through breakage
    party.ledger_mut().apply_delta(cap, -10.0);
    assert_eq!(party.equipped(HAROLD)[2], Some(cap));

    let reports = engine.damage_targeted(&mut party, HAROLD, sword, -20.0);

    assert!(reports[0].released.contains(&cap));
    assert_eq!(party.equipped(HAROLD).iter().flatten().count(), 0);
}

#[test]
fn test_broken_equip_refused_only_under_unequip() {
    for (policy, allowed) in [
        (BreakPolicy::Unequip, false),
        (BreakPolicy::Retain, true),
        (BreakPolicy::Destroy, true),
    ] {
        let (engine, mut party) = setup(policy);
        let cap = slot(&party, HAROLD, 2);
        party.ledger_mut().apply_delta(cap, -10.0);

        let instance = party.ledger().instance(cap).unwrap().clone();
        assert_eq!(engine.can_equip(&party, HAROLD, &instance), allowed, "{policy:?}");
    }
}

#[test]
fn test_repaired_equip_can_be_worn_again() {
    let (mut engine, mut party) = setup(BreakPolicy::Unequip);
    let sword = slot(&party, HAROLD, 0);
    engine.damage_targeted(&mut party, HAROLD, sword, -20.0);

    let instance = party.ledger().instance(sword).unwrap().clone();
    assert!(!engine.can_equip(&party, HAROLD, &instance));

    engine.repair_all(&mut party);
    let instance = party.ledger().instance(sword).unwrap().clone();
    assert!(engine.can_equip(&party, HAROLD, &instance));
    assert!(engine.equip(&mut party, HAROLD, 0, sword));
    assert_eq!(party.equipped(HAROLD)[0], Some(sword));
}

#[test]
fn test_engine_equip_rejects_broken_under_unequip() {
    let (mut engine, mut party) = setup(BreakPolicy::Unequip);
    let sword = slot(&party, HAROLD, 0);
    engine.damage_targeted(&mut party, HAROLD, sword, -1000.0);

    assert_eq!(party.equipped(HAROLD)[0], None);
    assert_eq!(party.ledger().get(sword), 0);
    assert!(party.inventory().contains(&sword));

    assert!(!engine.equip(&mut party, HAROLD, 0, sword));
    assert_eq!(party.equipped(HAROLD)[0], None);
    assert!(party.inventory().contains(&sword));
}

#[test]
fn test_engine_equip_accepts_broken_under_retain() {
    let (mut engine, mut party) = setup(BreakPolicy::Retain);
    let sword = slot(&party, HAROLD, 0);
    engine.damage_targeted(&mut party, HAROLD, sword, -1000.0);

    // Retain leaves it on; take it off by hand and put it back
    assert_eq!(party.unequip(HAROLD, 0), Some(sword));
    assert!(engine.equip(&mut party, HAROLD, 0, sword));
    assert_eq!(party.equipped(HAROLD)[0], Some(sword));
    assert_eq!(party.ledger().get(sword), 0);
}

// ============================================================================
// Breakage Sequence
// ============================================================================

#[test]
fn test_breakage_sequence_order() {
    let (surfaces, recorder) = recording_surfaces();
    let (engine, mut party) = setup(BreakPolicy::Retain);
    let mut engine = engine.with_surfaces(surfaces);
    let sword = slot(&party, HAROLD, 0);

    engine.damage_targeted(&mut party, HAROLD, sword, -50.0);

    assert_eq!(
        recorder.entries(),
        vec![
            "sound: Crash".to_string(),
            "hook: Some(1) Short Sword".to_string(),
            "message: \\i[210]Iron Scrap x 2 salvaged!".to_string(),
            "message: \\i[211]Leather Strip salvaged!".to_string(),
            "message: Harold's \\i[97]Short Sword broke!".to_string(),
        ]
    );
}

#[test]
fn test_break_sound_override() {
    let database = Database::parse_toml(DATABASE).unwrap();
    let mut party = Party::from_database(&database, &[3]).unwrap();
    let mut engine = DurabilityEngine::new(DurabilityConfig::default(), database, 5).unwrap();
    let dagger = slot(&party, PIP, 0);

    // Pip is protected in battle, so break the dagger through a script call
    assert!(engine.damage_targeted(&mut party, PIP, dagger, -5.0).is_empty());
    let reports = engine.fix_all(&mut party, -100.0);

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].sound, SoundDescriptor::new("Shatter", 80, 120, -10));
}

#[test]
fn test_inventory_break_has_no_notification() {
    let (surfaces, recorder) = recording_surfaces();
    let (engine, mut party) = setup(BreakPolicy::Retain);
    let mut engine = engine.with_surfaces(surfaces);
    let database = Database::parse_toml(DATABASE).unwrap();
    party.grant(&database, ItemRef::armor(2), 1).unwrap();
    let spare = party.inventory()[0];

    // The first cap in search order is the inventory copy
    let reports = engine.change_item_durability(&mut party, EquipKind::Armor, 2, -10.0);

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].instance, spare);
    assert_eq!(reports[0].owner, None);
    assert_eq!(reports[0].notification, None);
    assert!(recorder.entries().iter().all(|e| !e.contains("broke!")));
}

#[test]
fn test_rejected_salvage_does_not_block_later_rules() {
    let database = Database::parse_toml(DATABASE).unwrap();
    let mut party = Party::from_database(&database, &[1]).unwrap().with_max_stack(1);
    let mut engine = DurabilityEngine::new(DurabilityConfig::default(), database, 9).unwrap();
    let sword = slot(&party, HAROLD, 0);

    let reports = engine.damage_targeted(&mut party, HAROLD, sword, -20.0);

    // Two scrap exceed the stack limit; the strip still arrives
    assert_eq!(reports[0].rejected, vec![ItemRef::item(1)]);
    assert_eq!(reports[0].salvaged.len(), 1);
    assert_eq!(party.item_count(1), 0);
    assert_eq!(party.item_count(2), 1);
}

#[test]
fn test_batch_breaks_reported_in_slot_order() {
    let (mut engine, mut party) = setup(BreakPolicy::Retain);
    let sword = slot(&party, HAROLD, 0);
    let shield = slot(&party, HAROLD, 1);
    let cap = slot(&party, HAROLD, 2);

    let reports = engine.damage_all(&mut party, HAROLD, -100.0);
    let order: Vec<_> = reports.iter().map(|r| r.instance).collect();

    assert_eq!(order, vec![sword, shield, cap]);
}

// ============================================================================
// Protection
// ============================================================================

#[test]
fn test_class_protection_blocks_battle_wear() {
    let (mut engine, mut party) = setup(BreakPolicy::Retain);
    let sword = slot(&party, GWEN, 0);

    engine.damage_all(&mut party, GWEN, -5.0);
    engine.damage_random(&mut party, GWEN, -5.0);
    engine.damage_targeted(&mut party, GWEN, sword, -5.0);

    assert_eq!(party.ledger().get(sword), 20);
}

#[test]
fn test_state_protection_is_recomputed_per_event() {
    let (mut engine, mut party) = setup(BreakPolicy::Retain);
    let sword = slot(&party, HAROLD, 0);

    party.member_mut(HAROLD).unwrap().add_state(10);
    engine.damage_targeted(&mut party, HAROLD, sword, -5.0);
    assert_eq!(party.ledger().get(sword), 20);

    party.member_mut(HAROLD).unwrap().remove_state(10);
    engine.damage_targeted(&mut party, HAROLD, sword, -5.0);
    assert_eq!(party.ledger().get(sword), 15);
}

#[test]
fn test_protection_does_not_block_script_changes() {
    let (mut engine, mut party) = setup(BreakPolicy::Retain);
    let sword = slot(&party, GWEN, 0);

    engine.fix_all(&mut party, -50.0);

    assert_eq!(party.ledger().get(sword), 10);
}
