//! Defense dispatch: the fixed three-tier turret decision.
//!
//! Per turret, independent of the role state machines and with no state
//! persisted between ticks: attack the weakest hostile; else heal the
//! first damaged friendly (if the reserve allows); else repair the most
//! health-depleted facility (if the deeper reserve allows). Exactly one
//! action per turret per tick.
//!
//! The ascending-health-ratio ordering is shared with the attack tier by
//! design — the same selector ranks both.

use tracing::{debug, warn};

use outpost_agents::selector::{Metric, rank};
use outpost_types::{ActionStatus, ActionVerb, Facility, FacilityKind, ZoneId};
use outpost_world::World;

use crate::config::ControlConfig;

/// Per-zone tallies from one [`dispatch`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefenseOutcome {
    /// Attacks fired.
    pub attacks: u32,
    /// Heals applied.
    pub heals: u32,
    /// Repairs applied.
    pub repairs: u32,
}

impl DefenseOutcome {
    /// Accumulate another outcome into this one.
    pub const fn absorb(&mut self, other: Self) {
        self.attacks = self.attacks.saturating_add(other.attacks);
        self.heals = self.heals.saturating_add(other.heals);
        self.repairs = self.repairs.saturating_add(other.repairs);
    }
}

/// Run the three-tier decision for every turret in the zone.
pub fn dispatch(world: &mut dyn World, zone: ZoneId, config: &ControlConfig) -> DefenseOutcome {
    let mut outcome = DefenseOutcome::default();
    let turrets: Vec<Facility> = world
        .facilities(zone)
        .into_iter()
        .filter(|f| f.kind == FacilityKind::Turret)
        .collect();

    for turret in turrets {
        // Tier 1: hostiles present — attack the weakest by health ratio,
        // ties broken by query order.
        let hostiles: Vec<_> = world
            .agents(zone)
            .into_iter()
            .filter(|a| a.hostile)
            .collect();
        if !hostiles.is_empty() {
            let ranked = rank(hostiles, &[], Metric::HealthRatioAscending);
            if let Some(target) = ranked.first() {
                let status = world.perform(turret.id, ActionVerb::Attack, target.id, None);
                if status == ActionStatus::Ok {
                    outcome.attacks = outcome.attacks.saturating_add(1);
                } else {
                    debug!(turret = %turret.id, ?status, "Attack rejected");
                }
            }
            continue;
        }

        let stored = turret.stored_energy();

        // Tier 2: heal the first damaged friendly, reserve permitting.
        if stored >= config.heal_reserve {
            let damaged = world
                .agents(zone)
                .into_iter()
                .find(|a| !a.hostile && a.health.is_damaged());
            if let Some(target) = damaged {
                let status = world.perform(turret.id, ActionVerb::Heal, target.id, None);
                if status == ActionStatus::Ok {
                    outcome.heals = outcome.heals.saturating_add(1);
                } else {
                    warn!(turret = %turret.id, ?status, "Heal rejected");
                }
                continue;
            }
        }

        // Tier 3: repair the most depleted facility, deeper reserve
        // permitting. Near-invulnerable fortifications are excluded, and
        // the installation cannot service itself.
        if stored >= config.repair_reserve {
            let candidates: Vec<Facility> = world
                .facilities(zone)
                .into_iter()
                .filter(|f| {
                    f.id != turret.id
                        && f.health.is_damaged()
                        && !is_excluded_fortification(f, config)
                })
                .collect();
            let ranked = rank(candidates, &[], Metric::HealthRatioAscending);
            if let Some(target) = ranked.first() {
                let status = world.perform(turret.id, ActionVerb::Repair, target.id, None);
                if status == ActionStatus::Ok {
                    outcome.repairs = outcome.repairs.saturating_add(1);
                } else {
                    warn!(turret = %turret.id, ?status, "Repair rejected");
                }
            }
        }
    }

    outcome
}

/// Whether a facility is a fortification too healthy to be worth turret
/// repair.
fn is_excluded_fortification(facility: &Facility, config: &ControlConfig) -> bool {
    matches!(
        facility.kind,
        FacilityKind::Barrier | FacilityKind::Bulwark
    ) && facility.health.current > config.fortification_repair_cutoff
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outpost_types::{AgentMemory, CapabilityModule, Health, Position, ResourceKind, RoleKind};
    use outpost_world::{SimWorld, sim, stock};

    use super::*;

    fn turret_world(energy: u32) -> (SimWorld, ZoneId, outpost_types::EntityId) {
        let mut world = SimWorld::new();
        let zone = world.add_zone("Test");
        let turret = world
            .add_facility(zone, FacilityKind::Turret, Position::new(5, 5))
            .unwrap();
        if energy > 0 {
            if let Some(store) = world.facility_mut(turret).and_then(|f| f.stock.as_mut()) {
                stock::deposit(store, ResourceKind::Energy, energy).unwrap();
            }
        }
        (world, zone, turret)
    }

    #[test]
    fn attack_tier_picks_first_weakest_hostile() {
        let (mut world, zone, _) = turret_world(500);
        // Health ratios 0.9, 0.2, 0.5, 0.2, 0.7 — the first 0.2 is hit.
        let ratios = [(90, 100), (20, 100), (50, 100), (20, 100), (70, 100)];
        let mut ids = Vec::new();
        for (i, (current, max)) in ratios.iter().enumerate() {
            let id = world
                .add_hostile(
                    zone,
                    &format!("raider-{i}"),
                    Health { current: *current, max: *max },
                    Position::new(9, 9),
                )
                .unwrap();
            ids.push(id);
        }

        let outcome = dispatch(&mut world, zone, &ControlConfig::default());
        assert_eq!(outcome.attacks, 1);
        // 150 damage kills the 20-health target outright.
        assert!(world.agent_by_name("raider-1").is_none());
        assert!(world.agent_by_name("raider-3").is_some());
        assert!(world.agent_by_name("raider-0").is_some());
    }

    #[test]
    fn heal_tier_requires_reserve() {
        // Stored energy below the heal reserve: the damaged friendly waits.
        let (mut world, zone, _) = turret_world(1_000);
        let agent = world
            .add_agent(
                zone,
                "h-1",
                AgentMemory::new(RoleKind::Harvester),
                vec![CapabilityModule::Work],
                Position::new(4, 4),
            )
            .unwrap();
        if let Some(a) = world.agent_mut(agent) {
            a.health.current = 10;
        }

        let outcome = dispatch(&mut world, zone, &ControlConfig::default());
        assert_eq!(outcome, DefenseOutcome::default());

        // Topping the reserve up lets the heal through.
        let (mut world, zone, _) = turret_world(1_050);
        let agent = world
            .add_agent(
                zone,
                "h-1",
                AgentMemory::new(RoleKind::Harvester),
                vec![CapabilityModule::Work],
                Position::new(4, 4),
            )
            .unwrap();
        if let Some(a) = world.agent_mut(agent) {
            a.health.current = 10;
        }

        let outcome = dispatch(&mut world, zone, &ControlConfig::default());
        assert_eq!(outcome.heals, 1);
        // One heal (TURRET_HEAL_AMOUNT) brings the 10/100 agent to full.
        assert!(world.agent_by_name("h-1").unwrap().health.is_full());
    }

    #[test]
    fn repair_tier_skips_healthy_fortifications() {
        let (mut world, zone, _) = turret_world(2_000);
        // A barrier above the cutoff and a worn conduit below 75%.
        let barrier = world
            .add_facility(zone, FacilityKind::Barrier, Position::new(6, 6))
            .unwrap();
        if let Some(f) = world.facility_mut(barrier) {
            f.health.current = 200_000;
        }
        let conduit = world
            .add_facility(zone, FacilityKind::Conduit, Position::new(7, 7))
            .unwrap();
        if let Some(f) = world.facility_mut(conduit) {
            f.health.current = 1_000;
        }

        let outcome = dispatch(&mut world, zone, &ControlConfig::default());
        assert_eq!(outcome.repairs, 1);
        let repaired = World::facility(&world, conduit).unwrap();
        assert_eq!(repaired.health.current, 1_000 + sim::TURRET_REPAIR_AMOUNT);
        // The barrier was left alone.
        assert_eq!(World::facility(&world, barrier).unwrap().health.current, 200_000);
    }

    #[test]
    fn low_health_fortification_is_repairable() {
        let (mut world, zone, _) = turret_world(2_000);
        let barrier = world
            .add_facility(zone, FacilityKind::Barrier, Position::new(6, 6))
            .unwrap();
        if let Some(f) = world.facility_mut(barrier) {
            f.health.current = 1;
        }

        let outcome = dispatch(&mut world, zone, &ControlConfig::default());
        assert_eq!(outcome.repairs, 1);
        assert_eq!(
            World::facility(&world, barrier).unwrap().health.current,
            1 + sim::TURRET_REPAIR_AMOUNT
        );
    }

    #[test]
    fn one_action_per_turret_attack_preempts_repair() {
        let (mut world, zone, _) = turret_world(2_000);
        world
            .add_hostile(zone, "raider", Health { current: 300, max: 300 }, Position::new(9, 9))
            .unwrap();
        let conduit = world
            .add_facility(zone, FacilityKind::Conduit, Position::new(7, 7))
            .unwrap();
        if let Some(f) = world.facility_mut(conduit) {
            f.health.current = 1_000;
        }

        let outcome = dispatch(&mut world, zone, &ControlConfig::default());
        assert_eq!(outcome.attacks, 1);
        assert_eq!(outcome.repairs, 0);
        // The conduit stayed worn: the attack consumed this tick's action.
        assert_eq!(World::facility(&world, conduit).unwrap().health.current, 1_000);
    }
}
