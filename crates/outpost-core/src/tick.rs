//! The per-tick entry point.
//!
//! [`run_tick`] is the only surface the outer driver calls: once per
//! discrete time step, against whatever [`World`] the host provides. It
//! reconciles every zone (role state machines, production, decommission),
//! dispatches every turret, then garbage-collects stale agent memory —
//! all synchronously, in a fixed order, and infallibly. A confused agent
//! or rejected action costs one log line and one retry, never the tick.
//!
//! Ordering within a tick: zones in world order; within a zone, roles in
//! roster order and agents in world-query order; defense after
//! population. That ordering is the whole coordination story — earlier
//! actors claim contested targets first.

use tracing::{debug, info};

use outpost_agents::roles::RoleRoster;
use outpost_world::World;

use crate::config::ControlConfig;
use crate::defense::{self, DefenseOutcome};
use crate::population::{self, ReconcileOutcome};

/// Summary of a single tick's execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Zones reconciled.
    pub zones: u32,
    /// Population tallies accumulated across zones.
    pub population: ReconcileOutcome,
    /// Defense tallies accumulated across zones.
    pub defense: DefenseOutcome,
    /// Stale memory records freed by housekeeping.
    pub memory_freed: u32,
}

/// Execute one complete tick of the decision engine.
///
/// Phases, in order:
///
/// 1. **Reconcile** every zone: run each role's members, then production
///    and decommission checks.
/// 2. **Defense** per zone: the three-tier turret dispatch.
/// 3. **Housekeeping**: delete memory records of departed agents.
pub fn run_tick(
    world: &mut dyn World,
    roster: &RoleRoster,
    config: &ControlConfig,
) -> TickSummary {
    let tick = world.tick();
    debug!(tick, "Tick started");

    let mut summary = TickSummary {
        tick,
        ..TickSummary::default()
    };

    for zone in world.zones() {
        let pop = population::reconcile(world, &zone, roster, config);
        summary.population.absorb(pop);

        let def = defense::dispatch(world, zone.id, config);
        summary.defense.absorb(def);

        summary.zones = summary.zones.saturating_add(1);
    }

    summary.memory_freed = population::cleanup_stale_memory(world);

    info!(
        tick,
        zones = summary.zones,
        agents_run = summary.population.agents_run,
        productions = summary.population.productions,
        decommissions = summary.population.decommissions,
        attacks = summary.defense.attacks,
        heals = summary.defense.heals,
        repairs = summary.defense.repairs,
        memory_freed = summary.memory_freed,
        "Tick complete"
    );

    summary
}
