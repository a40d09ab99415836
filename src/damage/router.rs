//! Battle wear routing
//!
//! Three strategies decide which equipped instances take wear from a combat
//! action:
//! - all: every valid instance, element-multiplied
//! - random slot: one valid instance picked uniformly, element-multiplied
//! - targeted: one specific instance, raw delta
//!
//! The router only writes durability. Instances that broke are returned in
//! slot order so the caller can run breakage after the whole batch is applied.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::config::DurabilityConfig;
use crate::core::types::{ElementId, InstanceId};
use crate::damage::element::element_multiplier;
use crate::damage::protection::ProtectionContext;
use crate::data::index::AttributeIndex;
use crate::equipment::host::ActorProfile;
use crate::equipment::ledger::DurabilityLedger;

/// One incoming wear event against an actor's equipment
#[derive(Debug, Clone, PartialEq)]
pub struct Strike {
    /// Raw durability delta (negative damages, positive repairs)
    pub magnitude: f64,
    pub protection: ProtectionContext,
    pub elements: Vec<ElementId>,
}

impl Strike {
    pub fn new(magnitude: f64) -> Self {
        Self {
            magnitude,
            protection: ProtectionContext::unprotected(),
            elements: Vec::new(),
        }
    }

    pub fn with_elements(mut self, elements: Vec<ElementId>) -> Self {
        self.elements = elements;
        self
    }

    pub fn with_protection(mut self, protection: ProtectionContext) -> Self {
        self.protection = protection;
        self
    }

    /// Strike against `profile`'s equipment, with protection resolved now
    pub fn against(index: &AttributeIndex, profile: &ActorProfile, magnitude: f64) -> Self {
        Self {
            magnitude,
            protection: ProtectionContext::for_profile(index, profile),
            elements: profile.last_elements.clone(),
        }
    }
}

pub struct DamageRouter<'a> {
    config: &'a DurabilityConfig,
    index: &'a AttributeIndex,
}

impl<'a> DamageRouter<'a> {
    pub fn new(config: &'a DurabilityConfig, index: &'a AttributeIndex) -> Self {
        Self { config, index }
    }

    /// Independent, not yet broken, and not individually protected
    pub fn is_valid_target(&self, ledger: &DurabilityLedger, id: InstanceId) -> bool {
        let Some(instance) = ledger.instance(id) else {
            return false;
        };
        if !instance.independent || instance.durability < 1 {
            return false;
        }
        !self
            .index
            .equip(instance.kind, instance.definition_id)
            .map(|attrs| attrs.no_battle_damage)
            .unwrap_or(false)
    }

    fn valid_targets(&self, ledger: &DurabilityLedger, group: &[Option<InstanceId>]) -> Vec<InstanceId> {
        group
            .iter()
            .flatten()
            .copied()
            .filter(|id| self.is_valid_target(ledger, *id))
            .collect()
    }

    fn apply_multiplied(&self, ledger: &mut DurabilityLedger, strike: &Strike, id: InstanceId) -> bool {
        let multiplier = match ledger.instance(id) {
            Some(instance) => element_multiplier(self.index, instance, &strike.elements),
            None => return false,
        };
        ledger
            .apply_delta(id, strike.magnitude * multiplier)
            .map(|applied| applied.broke())
            .unwrap_or(false)
    }

    /// Wear every valid instance in `group`.
    ///
    /// Unaffected by the slot-damage switch. Returns broken instances in slot
    /// order.
    pub fn apply_to_all(
        &self,
        ledger: &mut DurabilityLedger,
        strike: &Strike,
        group: &[Option<InstanceId>],
    ) -> Vec<InstanceId> {
        if strike.magnitude == 0.0 || strike.protection.protected {
            return Vec::new();
        }

        let mut broken = Vec::new();
        for id in self.valid_targets(ledger, group) {
            if self.apply_multiplied(ledger, strike, id) {
                broken.push(id);
            }
        }
        broken
    }

    /// Wear one valid instance picked uniformly at random
    pub fn apply_to_random_slot<R: Rng + ?Sized>(
        &self,
        ledger: &mut DurabilityLedger,
        strike: &Strike,
        group: &[Option<InstanceId>],
        rng: &mut R,
    ) -> Option<InstanceId> {
        if self.config.slot_damage_disabled || strike.magnitude == 0.0 || strike.protection.protected {
            return None;
        }

        let valid = self.valid_targets(ledger, group);
        let Some(&id) = valid.choose(rng) else {
            tracing::trace!("No valid instance for random-slot wear");
            return None;
        };
        self.apply_multiplied(ledger, strike, id).then_some(id)
    }

    /// Apply the raw magnitude to exactly one instance, ignoring element tags
    pub fn apply_to_targeted_slot(
        &self,
        ledger: &mut DurabilityLedger,
        strike: &Strike,
        id: InstanceId,
    ) -> Option<InstanceId> {
        if self.config.slot_damage_disabled || strike.magnitude == 0.0 || strike.protection.protected {
            return None;
        }
        if !self.is_valid_target(ledger, id) {
            return None;
        }

        let applied = ledger.apply_delta(id, strike.magnitude)?;
        applied.broke().then_some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::EquipKind;
    use crate::data::database::EquipDefinition;
    use crate::data::index::{ElementMultiplier, EquipAttributes};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn definition(id: u32, max: i32) -> EquipDefinition {
        EquipDefinition {
            id,
            name: format!("Equip {id}"),
            icon: 0,
            sub_type: 1,
            equip_type: 1,
            params: [0; 8],
            max_durability: max,
            note: String::new(),
        }
    }

    fn setup() -> (AttributeIndex, DurabilityLedger, Vec<Option<InstanceId>>) {
        let index = AttributeIndex::default()
            .with_equip(
                EquipKind::Weapon,
                1,
                EquipAttributes {
                    elements: vec![ElementMultiplier { element_id: 1, delta: 0.5 }],
                    ..Default::default()
                },
            )
            .with_equip(
                EquipKind::Weapon,
                2,
                EquipAttributes {
                    no_battle_damage: true,
                    ..Default::default()
                },
            );
        let mut ledger = DurabilityLedger::new();
        let a = ledger.create(EquipKind::Weapon, &definition(1, 100));
        let b = ledger.create(EquipKind::Weapon, &definition(2, 100));
        let c = ledger.create(EquipKind::Weapon, &definition(3, 60));
        (index, ledger, vec![Some(a), None, Some(b), Some(c)])
    }

    #[test]
    fn test_apply_to_all_uses_element_multiplier() {
        let config = DurabilityConfig::default();
        let (index, mut ledger, group) = setup();
        let router = DamageRouter::new(&config, &index);

        let strike = Strike::new(-50.0).with_elements(vec![1]);
        let broken = router.apply_to_all(&mut ledger, &strike, &group);

        assert!(broken.is_empty());
        assert_eq!(ledger.get(group[0].unwrap()), 25); // 50 * 1.5
        assert_eq!(ledger.get(group[2].unwrap()), 100); // NoBattleDD
        assert_eq!(ledger.get(group[3].unwrap()), 10);
    }

    #[test]
    fn test_apply_to_all_reports_breaks_in_slot_order() {
        let config = DurabilityConfig::default();
        let (index, mut ledger, group) = setup();
        let router = DamageRouter::new(&config, &index);

        let broken = router.apply_to_all(&mut ledger, &Strike::new(-200.0), &group);
        assert_eq!(broken, vec![group[0].unwrap(), group[3].unwrap()]);

        // Broken instances are no longer valid targets
        let again = router.apply_to_all(&mut ledger, &Strike::new(-10.0), &group);
        assert!(again.is_empty());
    }

    #[test]
    fn test_protection_blocks_every_strategy() {
        let config = DurabilityConfig::default();
        let (index, mut ledger, group) = setup();
        let router = DamageRouter::new(&config, &index);
        let strike = Strike::new(-500.0).with_protection(ProtectionContext { protected: true });
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert!(router.apply_to_all(&mut ledger, &strike, &group).is_empty());
        assert_eq!(router.apply_to_random_slot(&mut ledger, &strike, &group, &mut rng), None);
        assert_eq!(router.apply_to_targeted_slot(&mut ledger, &strike, group[0].unwrap()), None);
        assert_eq!(ledger.get(group[0].unwrap()), 100);
    }

    #[test]
    fn test_slot_damage_switch_spares_all_variant() {
        let config = DurabilityConfig {
            slot_damage_disabled: true,
            ..Default::default()
        };
        let (index, mut ledger, group) = setup();
        let router = DamageRouter::new(&config, &index);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let strike = Strike::new(-10.0);

        assert_eq!(router.apply_to_random_slot(&mut ledger, &strike, &group, &mut rng), None);
        assert_eq!(router.apply_to_targeted_slot(&mut ledger, &strike, group[3].unwrap()), None);
        assert_eq!(ledger.get(group[3].unwrap()), 60);

        router.apply_to_all(&mut ledger, &strike, &group);
        assert_eq!(ledger.get(group[3].unwrap()), 50);
    }

    #[test]
    fn test_random_slot_hits_exactly_one_valid_instance() {
        let config = DurabilityConfig::default();
        let (index, mut ledger, group) = setup();
        let router = DamageRouter::new(&config, &index);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        router.apply_to_random_slot(&mut ledger, &Strike::new(-5.0), &group, &mut rng);

        let worn = [group[0].unwrap(), group[3].unwrap()]
            .iter()
            .filter(|id| ledger.get(**id) < ledger.max(**id))
            .count();
        assert_eq!(worn, 1);
        assert_eq!(ledger.get(group[2].unwrap()), 100);
    }

    #[test]
    fn test_random_slot_without_valid_targets_is_noop() {
        let config = DurabilityConfig::default();
        let (index, mut ledger, _) = setup();
        let router = DamageRouter::new(&config, &index);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(router.apply_to_random_slot(&mut ledger, &Strike::new(-5.0), &[None, None], &mut rng), None);
    }

    #[test]
    fn test_targeted_ignores_element_multiplier() {
        let config = DurabilityConfig::default();
        let (index, mut ledger, group) = setup();
        let router = DamageRouter::new(&config, &index);
        let strike = Strike::new(-40.0).with_elements(vec![1]);

        router.apply_to_targeted_slot(&mut ledger, &strike, group[0].unwrap());
        assert_eq!(ledger.get(group[0].unwrap()), 60);

        let broken = router.apply_to_targeted_slot(&mut ledger, &Strike::new(-60.0), group[0].unwrap());
        assert_eq!(broken, group[0]);
    }

    #[test]
    fn test_zero_magnitude_is_noop() {
        let config = DurabilityConfig::default();
        let (index, mut ledger, group) = setup();
        let router = DamageRouter::new(&config, &index);
        assert!(router.apply_to_all(&mut ledger, &Strike::new(0.0), &group).is_empty());
        assert_eq!(ledger.get(group[0].unwrap()), 100);
    }
}
