//! Breakage coordinator
//!
//! Runs once per instance that just reached zero durability. The sequence is
//! fixed:
//! 1. break policy (destroy / retain / unequip cascade)
//! 2. break sound
//! 3. custom hook
//! 4. salvage rolls
//! 5. break notification
//!
//! Later steps work from a snapshot taken before step 1, so they still run
//! when the policy removed the instance from the party.

use rand::Rng;
use serde::Serialize;

use crate::breakage::release::{release_slot, release_unequippable};
use crate::breakage::salvage::{roll_salvage, salvage_message, SalvageGrant};
use crate::breakage::surfaces::Surfaces;
use crate::core::config::{format_template, BreakPolicy, DurabilityConfig};
use crate::core::types::{ActorId, InstanceId, ItemRef, SoundDescriptor};
use crate::data::database::Database;
use crate::data::index::AttributeIndex;
use crate::equipment::host::EquipHost;

/// Everything that happened because one instance broke
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakReport {
    pub instance: InstanceId,
    pub owner: Option<ActorId>,
    pub name: String,
    pub policy: BreakPolicy,
    pub destroyed: bool,
    /// Instances taken off by the unequip policy, the broken one first
    pub released: Vec<InstanceId>,
    pub sound: SoundDescriptor,
    pub salvaged: Vec<SalvageGrant>,
    /// Salvage outputs the inventory refused
    pub rejected: Vec<ItemRef>,
    pub notification: Option<String>,
}

pub struct BreakageCoordinator<'a, R: Rng> {
    config: &'a DurabilityConfig,
    database: &'a Database,
    index: &'a AttributeIndex,
    rng: &'a mut R,
    surfaces: &'a mut Surfaces,
}

impl<'a, R: Rng> BreakageCoordinator<'a, R> {
    pub fn new(
        config: &'a DurabilityConfig,
        database: &'a Database,
        index: &'a AttributeIndex,
        rng: &'a mut R,
        surfaces: &'a mut Surfaces,
    ) -> Self {
        Self {
            config,
            database,
            index,
            rng,
            surfaces,
        }
    }

    /// Process one newly broken instance.
    ///
    /// `owner` is the actor wearing it, or `None` for inventory items. Unknown
    /// instances are ignored.
    pub fn handle<H: EquipHost + ?Sized>(
        &mut self,
        host: &mut H,
        owner: Option<ActorId>,
        id: InstanceId,
    ) -> Option<BreakReport> {
        let snapshot = host.ledger().instance(id).cloned()?;
        let attrs = self.index.equip(snapshot.kind, snapshot.definition_id);
        let policy = self.config.break_policy;

        tracing::info!(instance = ?id, name = %snapshot.name, ?owner, ?policy, "Equipment broke");

        // 1. Policy
        let mut destroyed = false;
        let mut released = Vec::new();
        match policy {
            BreakPolicy::Destroy => {
                host.destroy(owner, id);
                destroyed = true;
            }
            BreakPolicy::Retain => {}
            BreakPolicy::Unequip => {
                if let Some(actor) = owner {
                    if let Some(slot) = host.slot_of(actor, id) {
                        released.extend(release_slot(self.config, host, actor, slot));
                    }
                    released.extend(release_unequippable(self.config, host, actor));
                }
            }
        }

        // 2. Sound
        let sound = attrs
            .and_then(|a| a.break_sound.clone())
            .unwrap_or_else(|| self.config.break_sound.clone());
        self.surfaces.play(&sound);

        // 3. Hook
        self.surfaces.run_hook(owner, &snapshot);

        // 4. Salvage
        let mut salvaged = Vec::new();
        let mut rejected = Vec::new();
        let rules = attrs.map(|a| a.salvage.as_slice()).unwrap_or(&[]);
        for rule in roll_salvage(rules, &mut *self.rng) {
            match host.grant(self.database, rule.output, rule.quantity) {
                Ok(()) => {
                    let message = salvage_message(self.config, self.database, &rule);
                    self.surfaces.post(&message);
                    salvaged.push(SalvageGrant {
                        output: rule.output,
                        quantity: rule.quantity,
                        message,
                    });
                }
                Err(err) => {
                    tracing::warn!(instance = ?id, output = ?rule.output, %err, "Salvage grant failed");
                    rejected.push(rule.output);
                }
            }
        }

        // 5. Notification
        let notification = owner.and_then(|actor| host.profile(actor)).map(|profile| {
            let icon = self.config.icon(snapshot.icon);
            format_template(
                &self.config.broken_text,
                &[
                    ("actor", profile.name.as_str()),
                    ("item", snapshot.name.as_str()),
                    ("icon", icon.as_str()),
                ],
            )
        });
        if let Some(text) = &notification {
            self.surfaces.post(text);
        }

        Some(BreakReport {
            instance: id,
            owner,
            name: snapshot.name,
            policy,
            destroyed,
            released,
            sound,
            salvaged,
            rejected,
            notification,
        })
    }
}
