//! Durability engine
//!
//! Owns the immutable configuration, database and attribute index, plus the
//! random source and presentation surfaces. Every entry point borrows the
//! party container mutably, applies its whole batch of durability writes, and
//! only then runs breakage for the instances that reached zero.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::breakage::coordinator::{BreakReport, BreakageCoordinator};
use crate::breakage::release;
use crate::breakage::surfaces::Surfaces;
use crate::core::config::DurabilityConfig;
use crate::core::error::Result;
use crate::core::types::{ActorId, EquipKind, InstanceId, StatId, UsableRef};
use crate::damage::router::{DamageRouter, Strike};
use crate::data::database::Database;
use crate::data::index::AttributeIndex;
use crate::equipment::host::EquipHost;
use crate::equipment::instance::EquipmentInstance;
use crate::party::aggregate::{self, Broken};
use crate::stats::derivation::equipment_param_bonus;

pub struct DurabilityEngine<R: Rng = ChaCha8Rng> {
    config: DurabilityConfig,
    database: Database,
    index: AttributeIndex,
    rng: R,
    surfaces: Surfaces,
}

impl DurabilityEngine<ChaCha8Rng> {
    /// Build an engine with a seeded ChaCha8 random source
    pub fn new(config: DurabilityConfig, database: Database, seed: u64) -> Result<Self> {
        Self::with_rng(config, database, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> DurabilityEngine<R> {
    /// Build an engine, parsing every durability tag in the database
    pub fn with_rng(config: DurabilityConfig, database: Database, rng: R) -> Result<Self> {
        let index = AttributeIndex::build(&database)?;
        Ok(Self::from_parts(config, database, index, rng))
    }

    /// Assemble an engine from an already built index
    pub fn from_parts(config: DurabilityConfig, database: Database, index: AttributeIndex, rng: R) -> Self {
        Self {
            config,
            database,
            index,
            rng,
            surfaces: Surfaces::new(),
        }
    }

    pub fn with_surfaces(mut self, surfaces: Surfaces) -> Self {
        self.surfaces = surfaces;
        self
    }

    pub fn config(&self) -> &DurabilityConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn index(&self) -> &AttributeIndex {
        &self.index
    }

    fn run_breakage<H: EquipHost + ?Sized>(&mut self, host: &mut H, broken: Vec<Broken>) -> Vec<BreakReport> {
        if broken.is_empty() {
            return Vec::new();
        }
        let mut coordinator = BreakageCoordinator::new(
            &self.config,
            &self.database,
            &self.index,
            &mut self.rng,
            &mut self.surfaces,
        );
        broken
            .into_iter()
            .filter_map(|(owner, id)| coordinator.handle(host, owner, id))
            .collect()
    }

    fn strike_against<H: EquipHost + ?Sized>(&self, host: &H, actor: ActorId, magnitude: f64) -> Option<Strike> {
        let profile = host.profile(actor)?;
        Some(Strike::against(&self.index, &profile, magnitude))
    }

    // ========================================================================
    // Combat pipeline
    // ========================================================================

    /// Record the usable's damage element on the subject and the target.
    ///
    /// Called right before the action resolves so element multipliers see
    /// the incoming element.
    pub fn begin_action<H: EquipHost + ?Sized>(
        &self,
        host: &mut H,
        subject: ActorId,
        target: Option<ActorId>,
        usable: UsableRef,
    ) {
        let elements: Vec<_> = self.database.usable_element(usable).into_iter().collect();
        tracing::trace!(?subject, ?target, ?elements, "Captured action elements");
        if let Some(target) = target {
            host.set_last_elements(target, elements.clone());
        }
        host.set_last_elements(subject, elements);
    }

    /// Wear every equip of `actor`
    pub fn damage_all<H: EquipHost + ?Sized>(&mut self, host: &mut H, actor: ActorId, magnitude: f64) -> Vec<BreakReport> {
        let Some(strike) = self.strike_against(host, actor, magnitude) else {
            return Vec::new();
        };
        let equips = host.equipped(actor);
        let broken = DamageRouter::new(&self.config, &self.index).apply_to_all(host.ledger_mut(), &strike, &equips);
        let broken = broken.into_iter().map(|id| (Some(actor), id)).collect();
        self.run_breakage(host, broken)
    }

    /// Wear one randomly picked equip of `actor`
    pub fn damage_random<H: EquipHost + ?Sized>(&mut self, host: &mut H, actor: ActorId, magnitude: f64) -> Vec<BreakReport> {
        let Some(strike) = self.strike_against(host, actor, magnitude) else {
            return Vec::new();
        };
        let equips = host.equipped(actor);
        let broken = DamageRouter::new(&self.config, &self.index).apply_to_random_slot(
            host.ledger_mut(),
            &strike,
            &equips,
            &mut self.rng,
        );
        self.run_breakage(host, broken.map(|id| (Some(actor), id)).into_iter().collect())
    }

    /// Wear one specific equip of `actor`, without element multipliers
    pub fn damage_targeted<H: EquipHost + ?Sized>(
        &mut self,
        host: &mut H,
        actor: ActorId,
        instance: InstanceId,
        magnitude: f64,
    ) -> Vec<BreakReport> {
        let Some(strike) = self.strike_against(host, actor, magnitude) else {
            return Vec::new();
        };
        let broken = DamageRouter::new(&self.config, &self.index).apply_to_targeted_slot(host.ledger_mut(), &strike, instance);
        self.run_breakage(host, broken.map(|id| (Some(actor), id)).into_iter().collect())
    }

    /// Apply the usable's per-equip-type effects to the subject's own equips.
    ///
    /// Every equipped instance is checked against every effect, so one
    /// instance can take several effects. Breakage runs after all of them.
    pub fn apply_user_equip_effects<H: EquipHost + ?Sized>(
        &mut self,
        host: &mut H,
        subject: ActorId,
        usable: UsableRef,
    ) -> Vec<BreakReport> {
        let effects = self.index.targeted_effects(usable);
        if effects.is_empty() {
            return Vec::new();
        }
        let Some(profile) = host.profile(subject) else {
            return Vec::new();
        };

        let router = DamageRouter::new(&self.config, &self.index);
        let mut broken = Vec::new();
        for id in host.equipped(subject).into_iter().flatten() {
            let Some((kind, sub_type)) = host.ledger().instance(id).map(|i| (i.kind, i.sub_type_id)) else {
                continue;
            };
            for effect in effects.iter().filter(|e| e.kind == kind && e.sub_type_id == sub_type) {
                let strike = Strike::against(&self.index, &profile, f64::from(effect.delta));
                if let Some(id) = router.apply_to_targeted_slot(host.ledger_mut(), &strike, id) {
                    broken.push((Some(subject), id));
                }
            }
        }
        self.run_breakage(host, broken)
    }

    // ========================================================================
    // Party operations
    // ========================================================================

    /// Repair (or wear, when negative) every reachable instance by a percent
    /// of its max
    pub fn fix_all<H: EquipHost + ?Sized>(&mut self, host: &mut H, percent: f64) -> Vec<BreakReport> {
        let broken = aggregate::fix_all(host, percent);
        self.run_breakage(host, broken)
    }

    /// Fully repair every reachable instance
    pub fn repair_all<H: EquipHost + ?Sized>(&mut self, host: &mut H) -> Vec<BreakReport> {
        self.fix_all(host, 100.0)
    }

    /// Change the first reachable instance of a definition by `delta`
    pub fn change_item_durability<H: EquipHost + ?Sized>(
        &mut self,
        host: &mut H,
        kind: EquipKind,
        definition_id: u32,
        delta: f64,
    ) -> Vec<BreakReport> {
        match aggregate::change_by_type_and_id(host, kind, definition_id, delta) {
            Some((owner, id, applied)) if applied.broke() => self.run_breakage(host, vec![(owner, id)]),
            _ => Vec::new(),
        }
    }

    pub fn total_durability<H: EquipHost + ?Sized>(&self, host: &H, count_max: bool) -> i64 {
        aggregate::total_durability(host, count_max)
    }

    /// Wear-adjusted equipment contribution to one of `actor`'s parameters
    pub fn param_bonus<H: EquipHost + ?Sized>(&self, host: &H, actor: ActorId, stat: StatId) -> f64 {
        let equips = host.equipped(actor);
        equipment_param_bonus(&self.config, &self.index, host.ledger(), &equips, stat)
    }

    pub fn can_equip<H: EquipHost + ?Sized>(&self, host: &H, actor: ActorId, instance: &EquipmentInstance) -> bool {
        release::can_equip(&self.config, host, actor, instance)
    }

    /// Equip an inventory instance through the container, refusing anything
    /// `can_equip` rejects (broken copies under the Unequip policy)
    pub fn equip<H: EquipHost + ?Sized>(&self, host: &mut H, actor: ActorId, slot: usize, instance: InstanceId) -> bool {
        let allowed = match host.ledger().instance(instance) {
            Some(found) => release::can_equip(&self.config, &*host, actor, found),
            None => false,
        };
        if !allowed {
            tracing::debug!(?actor, ?instance, slot, "Equip refused");
            return false;
        }
        host.equip(actor, slot, instance)
    }

    pub fn is_weapon_broken<H: EquipHost + ?Sized>(&self, host: &H, actor: ActorId, weapon_type_id: u32) -> bool {
        aggregate::is_weapon_broken(host, actor, weapon_type_id)
    }

    pub fn is_armor_broken<H: EquipHost + ?Sized>(&self, host: &H, actor: ActorId, armor_type_id: u32) -> bool {
        aggregate::is_armor_broken(host, actor, armor_type_id)
    }

    /// Set an instance's max durability (never below 1 for breakable copies)
    pub fn set_max_durability<H: EquipHost + ?Sized>(&self, host: &mut H, instance: InstanceId, max: i32) {
        host.ledger_mut().set_max(instance, max);
    }
}
