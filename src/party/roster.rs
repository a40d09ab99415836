//! In-memory party: members, equip slots and the shared inventory
//!
//! [`Party`] is the reference [`EquipHost`]. Games with their own containers
//! implement the trait directly instead.

use ahash::AHashMap;
use serde::Serialize;

use crate::core::error::{ConfigError, GrantError};
use crate::core::types::{ActorId, ElementId, EquipKind, InstanceId, ItemKind, ItemRef};
use crate::data::database::Database;
use crate::equipment::host::{ActorProfile, EquipHost};
use crate::equipment::instance::EquipmentInstance;
use crate::equipment::ledger::DurabilityLedger;
use crate::party::actor::Actor;

/// Default per-entry inventory limit
pub const DEFAULT_MAX_STACK: u32 = 99;

#[derive(Debug, Clone)]
pub struct Party {
    ledger: DurabilityLedger,
    members: Vec<Actor>,
    /// Unequipped weapon and armor instances, in acquisition order
    inventory: Vec<InstanceId>,
    /// Consumable item counts by item id
    items: AHashMap<u32, u32>,
    /// Max count per item id, and per equip definition in the inventory
    max_stack: u32,
}

impl Default for Party {
    fn default() -> Self {
        Self {
            ledger: DurabilityLedger::new(),
            members: Vec::new(),
            inventory: Vec::new(),
            items: AHashMap::new(),
            max_stack: DEFAULT_MAX_STACK,
        }
    }
}

impl Party {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_stack(mut self, max_stack: u32) -> Self {
        self.max_stack = max_stack;
        self
    }

    /// Build a party from actor definitions, equipping their starting gear.
    ///
    /// Slot 0 of `equips` names a weapon, later slots name armors, 0 leaves
    /// the slot empty.
    pub fn from_database(db: &Database, member_ids: &[u32]) -> Result<Self, ConfigError> {
        let mut party = Self::new();
        for &actor_id in member_ids {
            let def = db.actors.get(&actor_id).ok_or(ConfigError::UnknownActor(actor_id))?;
            let mut actor = Actor::from_definition(def, db.classes.get(&def.class_id));

            for (slot, &equip_id) in def.equips.iter().enumerate().take(actor.equips.len()) {
                if equip_id == 0 {
                    continue;
                }
                let kind = if slot == 0 { EquipKind::Weapon } else { EquipKind::Armor };
                let equip = db.equip(kind, equip_id).ok_or_else(|| ConfigError::UnknownReference {
                    owner: def.name.clone(),
                    target: ItemRef::new(kind.as_item_kind(), equip_id),
                })?;
                actor.equips[slot] = Some(party.ledger.create(kind, equip));
            }

            tracing::debug!(actor = %actor.name, equipped = actor.equips.iter().flatten().count(), "Joined party");
            party.members.push(actor);
        }
        Ok(party)
    }

    pub fn add_member(&mut self, actor: Actor) {
        self.members.push(actor);
    }

    pub fn member(&self, id: ActorId) -> Option<&Actor> {
        self.members.iter().find(|a| a.id == id)
    }

    pub fn member_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.members.iter_mut().find(|a| a.id == id)
    }

    pub fn actors(&self) -> &[Actor] {
        &self.members
    }

    /// Count of a consumable item
    pub fn item_count(&self, item_id: u32) -> u32 {
        self.items.get(&item_id).copied().unwrap_or(0)
    }

    /// Number of inventory instances of an equip definition
    pub fn equip_count(&self, kind: EquipKind, definition_id: u32) -> u32 {
        self.inventory
            .iter()
            .filter_map(|id| self.ledger.instance(*id))
            .filter(|i| i.kind == kind && i.definition_id == definition_id)
            .count() as u32
    }

    /// Place an existing ledger instance into the inventory
    pub fn stash(&mut self, id: InstanceId) {
        if self.ledger.contains(id) && !self.inventory.contains(&id) {
            self.inventory.push(id);
        }
    }
}

impl EquipHost for Party {
    fn ledger(&self) -> &DurabilityLedger {
        &self.ledger
    }

    fn ledger_mut(&mut self) -> &mut DurabilityLedger {
        &mut self.ledger
    }

    fn members(&self) -> Vec<ActorId> {
        self.members.iter().map(|a| a.id).collect()
    }

    fn profile(&self, actor: ActorId) -> Option<ActorProfile> {
        self.member(actor).map(Actor::profile)
    }

    fn set_last_elements(&mut self, actor: ActorId, elements: Vec<ElementId>) {
        if let Some(member) = self.member_mut(actor) {
            member.last_elements = elements;
        }
    }

    fn equip_slots(&self, actor: ActorId) -> Vec<u32> {
        self.member(actor).map(|a| a.equip_slots.clone()).unwrap_or_default()
    }

    fn equipped(&self, actor: ActorId) -> Vec<Option<InstanceId>> {
        self.member(actor).map(|a| a.equips.clone()).unwrap_or_default()
    }

    fn inventory(&self) -> Vec<InstanceId> {
        self.inventory.clone()
    }

    fn meets_equip_constraints(&self, actor: ActorId, instance: &EquipmentInstance) -> bool {
        self.member(actor).map(|a| a.allows(instance)).unwrap_or(false)
    }

    fn equip(&mut self, actor: ActorId, slot: usize, id: InstanceId) -> bool {
        let Some(position) = self.inventory.iter().position(|i| *i == id) else {
            return false;
        };
        let Some(instance) = self.ledger.instance(id) else {
            return false;
        };
        let Some(member) = self.members.iter().find(|a| a.id == actor) else {
            return false;
        };
        if member.equip_slots.get(slot) != Some(&instance.equip_type_id) || !member.allows(instance) {
            return false;
        }

        self.inventory.remove(position);
        let previous = self
            .members
            .iter_mut()
            .find(|a| a.id == actor)
            .and_then(|m| m.equips[slot].replace(id));
        if let Some(previous) = previous {
            self.inventory.push(previous);
        }
        true
    }

    fn unequip(&mut self, actor: ActorId, slot: usize) -> Option<InstanceId> {
        let removed = self.member_mut(actor)?.equips.get_mut(slot)?.take()?;
        self.inventory.push(removed);
        Some(removed)
    }

    fn destroy(&mut self, owner: Option<ActorId>, instance: InstanceId) {
        if let Some(member) = owner.and_then(|id| self.members.iter_mut().find(|a| a.id == id)) {
            for slot in member.equips.iter_mut() {
                if *slot == Some(instance) {
                    *slot = None;
                }
            }
        }
        self.inventory.retain(|id| *id != instance);
        if let Some(removed) = self.ledger.remove(instance) {
            tracing::debug!(instance = ?instance, name = %removed.name, "Destroyed instance");
        }
    }

    fn grant(&mut self, db: &Database, item: ItemRef, quantity: u32) -> Result<(), GrantError> {
        if !db.contains(item) {
            return Err(GrantError::UnknownDefinition(item));
        }

        let held = match item.kind.as_equip_kind() {
            None => self.item_count(item.id),
            Some(kind) => self.equip_count(kind, item.id),
        };
        if held.saturating_add(quantity) > self.max_stack {
            return Err(GrantError::CapacityExceeded { item, quantity });
        }

        match item.kind {
            ItemKind::Item => {
                *self.items.entry(item.id).or_insert(0) += quantity;
            }
            ItemKind::Weapon | ItemKind::Armor => {
                let Some((kind, def)) = item
                    .kind
                    .as_equip_kind()
                    .and_then(|kind| db.equip(kind, item.id).map(|def| (kind, def)))
                else {
                    return Err(GrantError::UnknownDefinition(item));
                };
                for _ in 0..quantity {
                    let id = self.ledger.create(kind, def);
                    self.inventory.push(id);
                }
            }
        }
        Ok(())
    }
}

/// Serializable view of the party for reports
#[derive(Debug, Clone, Serialize)]
pub struct PartySnapshot {
    pub members: Vec<MemberSnapshot>,
    pub inventory: Vec<EquipmentInstance>,
    pub items: Vec<(u32, u32)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberSnapshot {
    pub id: ActorId,
    pub name: String,
    pub equips: Vec<Option<EquipmentInstance>>,
}

impl Party {
    pub fn snapshot(&self) -> PartySnapshot {
        let mut items: Vec<(u32, u32)> = self.items.iter().map(|(k, v)| (*k, *v)).collect();
        items.sort_unstable();
        PartySnapshot {
            members: self
                .members
                .iter()
                .map(|m| MemberSnapshot {
                    id: m.id,
                    name: m.name.clone(),
                    equips: m
                        .equips
                        .iter()
                        .map(|slot| slot.and_then(|id| self.ledger.instance(id).cloned()))
                        .collect(),
                })
                .collect(),
            inventory: self
                .inventory
                .iter()
                .filter_map(|id| self.ledger.instance(*id).cloned())
                .collect(),
            items,
        }
    }
}
