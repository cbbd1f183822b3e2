//! Population control: running agents, sizing production, trimming excess.
//!
//! [`reconcile`] is the per-zone heart of the engine. For every role in
//! roster order it runs each live member's state machine once, compares
//! the live count against the role's desired count, and either asks a free
//! factory to produce a freshly budgeted agent or decommissions exactly
//! one excess member. [`cleanup_stale_memory`] is the zone-independent
//! housekeeping pass that garbage-collects memory records of agents that
//! no longer exist.
//!
//! Nothing here can fail: production shortfalls, busy factories, and name
//! collisions all degrade to a skipped attempt and a log line.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use outpost_agents::allocator::allocate;
use outpost_agents::roles::{Role, RoleRoster};
use outpost_types::{ActionStatus, ActionVerb, Agent, AgentMemory, FacilityKind, Zone};
use outpost_world::World;

use crate::config::ControlConfig;

/// Per-zone tallies from one [`reconcile`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// State machines executed.
    pub agents_run: u32,
    /// Production jobs successfully started.
    pub productions: u32,
    /// Agents decommissioned.
    pub decommissions: u32,
}

impl ReconcileOutcome {
    /// Accumulate another outcome into this one.
    pub const fn absorb(&mut self, other: Self) {
        self.agents_run = self.agents_run.saturating_add(other.agents_run);
        self.productions = self.productions.saturating_add(other.productions);
        self.decommissions = self.decommissions.saturating_add(other.decommissions);
    }
}

/// Reconcile one zone: run every member's state machine, then bring the
/// population of every role toward its desired count.
pub fn reconcile(
    world: &mut dyn World,
    zone: &Zone,
    roster: &RoleRoster,
    config: &ControlConfig,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();

    for role in roster.iter() {
        let members = role_members(world, zone, role);

        // Run each member once, in world-query order.
        for agent in &members {
            let mut memory = world
                .memory(&agent.name)
                .unwrap_or_else(|| AgentMemory::new(role.kind()));
            role.run(agent, &mut memory, world);
            world.set_memory(&agent.name, memory);
            outcome.agents_run = outcome.agents_run.saturating_add(1);
        }

        let desired = role.desired_count(world, zone.id);
        let live = u32::try_from(members.len()).unwrap_or(u32::MAX);

        if live < desired {
            outcome.productions = outcome
                .productions
                .saturating_add(produce_shortfall(world, zone, role, config));
        } else if live > desired {
            // Exactly one decommission per tick: the first member found.
            if let Some(excess) = members.first() {
                info!(
                    zone = %zone.name,
                    role = %role.kind(),
                    agent = %excess.name,
                    live,
                    desired,
                    "Decommissioning excess agent"
                );
                let status =
                    world.perform(excess.id, ActionVerb::Decommission, excess.id, None);
                if status == ActionStatus::Ok {
                    outcome.decommissions = outcome.decommissions.saturating_add(1);
                } else {
                    warn!(agent = %excess.name, ?status, "Decommission rejected");
                }
            }
        }
    }

    outcome
}

/// Live friendly members of a role in a zone, in world-query order.
fn role_members(world: &dyn World, zone: &Zone, role: &dyn Role) -> Vec<Agent> {
    world
        .agents(zone.id)
        .into_iter()
        .filter(|a| {
            !a.hostile
                && world
                    .memory(&a.name)
                    .is_some_and(|m| m.role == role.kind())
        })
        .collect()
}

/// Try to start production of one agent of `role` at each free factory.
///
/// Each factory gets at most one attempt per tick, a factory already
/// producing is skipped entirely, and the zone budget is re-read per
/// attempt so consecutive productions see the drained budget. Returns the
/// number of jobs actually started.
fn produce_shortfall(
    world: &mut dyn World,
    zone: &Zone,
    role: &dyn Role,
    config: &ControlConfig,
) -> u32 {
    let factories: Vec<_> = world
        .facilities(zone.id)
        .into_iter()
        .filter(|f| f.kind == FacilityKind::Factory)
        .map(|f| f.id)
        .collect();

    let mut started = 0_u32;
    for factory in factories {
        if world.is_producing(factory) {
            continue;
        }

        let available = world.zone(zone.id).map_or(0, |z| z.energy_available);
        if available < config.production_floor {
            debug!(
                zone = %zone.name,
                role = %role.kind(),
                available,
                floor = config.production_floor,
                "Budget below production floor; skipping"
            );
            continue;
        }

        let budget = allocation_budget(available, config);
        let loadout = allocate(&role.catalog(), &role.min_loadout(), budget);
        let name = format!("{}-{}", role.kind(), world.tick());
        let memory = AgentMemory::new(role.kind());

        let status = world.produce(factory, &loadout, &name, &memory);
        if status == ActionStatus::Ok {
            info!(
                zone = %zone.name,
                role = %role.kind(),
                name = %name,
                budget,
                modules = loadout.len(),
                "Production started"
            );
            started = started.saturating_add(1);
        } else {
            debug!(zone = %zone.name, role = %role.kind(), ?status, "Production attempt rejected");
        }
    }

    started
}

/// The allocation budget: a fixed share of available energy, floored at
/// the production minimum. The floor may exceed what is actually
/// available; [`World::produce`] fails silently in that case.
fn allocation_budget(available: u32, config: &ControlConfig) -> u32 {
    let share = u64::from(available)
        .saturating_mul(u64::from(config.budget_pct))
        .checked_div(100)
        .unwrap_or(0);
    u32::try_from(share)
        .unwrap_or(u32::MAX)
        .max(config.production_floor)
}

/// Delete every persisted memory record whose agent no longer exists.
///
/// Returns the number of records freed. Idempotent: a second pass with no
/// world change deletes nothing.
pub fn cleanup_stale_memory(world: &mut dyn World) -> u32 {
    let mut living: BTreeSet<String> = BTreeSet::new();
    for zone in world.zones() {
        for agent in world.agents(zone.id) {
            if !agent.hostile {
                living.insert(agent.name);
            }
        }
    }

    let mut freed = 0_u32;
    for name in world.memory_names() {
        if !living.contains(&name) {
            world.delete_memory(&name);
            info!(agent = %name, "Freed memory of departed agent");
            freed = freed.saturating_add(1);
        }
    }

    if living.is_empty() {
        warn!("No agents remain alive");
    }

    freed
}
