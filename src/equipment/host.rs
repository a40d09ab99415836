//! Contract with the inventory / equip-slot container
//!
//! The durability core never owns party state. It reads and writes it through
//! [`EquipHost`], which the game (or [`crate::party::Party`]) implements.

use crate::core::error::GrantError;
use crate::core::types::{ActorId, ElementId, InstanceId, ItemRef};
use crate::data::database::Database;
use crate::equipment::instance::EquipmentInstance;
use crate::equipment::ledger::DurabilityLedger;

/// Snapshot of the actor fields durability rules care about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorProfile {
    pub id: ActorId,
    pub name: String,
    pub class_id: u32,
    pub state_ids: Vec<u32>,
    /// Elements of the most recent action that involved this actor
    pub last_elements: Vec<ElementId>,
}

pub trait EquipHost {
    fn ledger(&self) -> &DurabilityLedger;

    fn ledger_mut(&mut self) -> &mut DurabilityLedger;

    /// Party members in party order
    fn members(&self) -> Vec<ActorId>;

    fn profile(&self, actor: ActorId) -> Option<ActorProfile>;

    fn set_last_elements(&mut self, actor: ActorId, elements: Vec<ElementId>);

    /// Equip type of every slot, in slot order
    fn equip_slots(&self, actor: ActorId) -> Vec<u32>;

    /// Equipped instances per slot, in slot order
    fn equipped(&self, actor: ActorId) -> Vec<Option<InstanceId>>;

    /// Weapon and armor instances held in the shared inventory
    fn inventory(&self) -> Vec<InstanceId>;

    /// Type and seal constraints of the container. Durability rules are
    /// layered on top by the engine.
    fn meets_equip_constraints(&self, actor: ActorId, instance: &EquipmentInstance) -> bool;

    /// Move an inventory instance into a slot, returning whatever was there
    /// to the inventory. Only checks slot type and container constraints.
    fn equip(&mut self, actor: ActorId, slot: usize, instance: InstanceId) -> bool;

    /// Empty a slot, moving its instance back to the shared inventory
    fn unequip(&mut self, actor: ActorId, slot: usize) -> Option<InstanceId>;

    /// Remove an instance from its owner's slots or the inventory and forget it
    fn destroy(&mut self, owner: Option<ActorId>, instance: InstanceId);

    /// Add items to the shared inventory
    fn grant(&mut self, db: &Database, item: ItemRef, quantity: u32) -> Result<(), GrantError>;

    /// Slot index holding `instance`, if the actor has it equipped
    fn slot_of(&self, actor: ActorId, instance: InstanceId) -> Option<usize> {
        self.equipped(actor)
            .iter()
            .position(|slot| *slot == Some(instance))
    }
}
