//! In-memory reference host implementing [`World`].
//!
//! `SimWorld` exists so the decision core is runnable and testable without
//! an external environment: zones on a small grid, immediate action
//! resolution with adjacency range checks, one-leg-per-call movement, and a
//! production pipeline that materializes agents a few ticks after
//! [`produce`] is accepted.
//!
//! Divergence from a real host is documented where it matters: actions
//! mutate immediately rather than against a tick-start snapshot. The
//! decision core never relies on same-tick read-back, so the difference is
//! unobservable to it.
//!
//! [`produce`]: World::produce

use std::collections::BTreeMap;

use tracing::{debug, info};

use outpost_types::{
    ActionStatus, ActionVerb, Agent, AgentMemory, CapabilityModule, EntityId, Facility,
    FacilityKind, Health, Position, ResourceKind, ResourceNode, Salvage, Site, Stock, Zone, ZoneId,
};

use crate::error::WorldError;
use crate::world::World;
use crate::{resource, stock};

// ---------------------------------------------------------------------------
// Host constants
// ---------------------------------------------------------------------------

/// Units harvested per `Work` module per tick.
pub const HARVEST_PER_WORK: u32 = 2;

/// Site progress (and energy spent) per `Work` module per build tick.
pub const BUILD_PER_WORK: u32 = 5;

/// Health restored per `Work` module per repair tick (costing 1 energy each).
pub const REPAIR_PER_WORK: u32 = 100;

/// Energy channeled into the core per `Work` module per charge tick.
pub const CHARGE_PER_WORK: u32 = 1;

/// Stock capacity granted per `Carry` module.
pub const CARRY_CAPACITY_PER_MODULE: u32 = 50;

/// Agent health granted per loadout module.
pub const HEALTH_PER_MODULE: u32 = 100;

/// Production ticks per loadout module.
pub const PRODUCTION_TICKS_PER_MODULE: u64 = 3;

/// Energy a turret spends on each attack/heal/repair action.
pub const TURRET_ACTION_COST: u32 = 10;

/// Damage dealt by one turret attack.
pub const TURRET_ATTACK_DAMAGE: u32 = 150;

/// Health restored by one turret heal.
pub const TURRET_HEAL_AMOUNT: u32 = 100;

/// Health restored by one turret repair.
pub const TURRET_REPAIR_AMOUNT: u32 = 200;

/// Base production cost of one capability module unit.
pub const fn module_cost(module: CapabilityModule) -> u32 {
    match module {
        CapabilityModule::Carry | CapabilityModule::Move => 50,
        CapabilityModule::Work => 100,
    }
}

/// Total production cost of a loadout.
pub fn loadout_cost(loadout: &[CapabilityModule]) -> u32 {
    loadout
        .iter()
        .fold(0_u32, |acc, m| acc.saturating_add(module_cost(*m)))
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

/// Per-zone entity containers. Vec order is the stable query order.
#[derive(Debug, Default)]
struct ZoneState {
    name: String,
    facilities: Vec<Facility>,
    nodes: Vec<ResourceNode>,
    sites: Vec<Site>,
    salvage: Vec<Salvage>,
    agents: Vec<Agent>,
}

/// A pending factory production job.
#[derive(Debug)]
struct ProductionJob {
    zone: ZoneId,
    factory: EntityId,
    name: String,
    loadout: Vec<CapabilityModule>,
    memory: AgentMemory,
    remaining: u64,
}

/// The in-memory reference host.
#[derive(Debug, Default)]
pub struct SimWorld {
    tick: u64,
    zones: BTreeMap<ZoneId, ZoneState>,
    memory: BTreeMap<String, AgentMemory>,
    jobs: BTreeMap<EntityId, ProductionJob>,
}

impl SimWorld {
    /// Create an empty world at tick zero.
    pub const fn new() -> Self {
        Self {
            tick: 0,
            zones: BTreeMap::new(),
            memory: BTreeMap::new(),
            jobs: BTreeMap::new(),
        }
    }

    // -- construction -------------------------------------------------------

    /// Add a zone and return its ID.
    pub fn add_zone(&mut self, name: &str) -> ZoneId {
        let id = ZoneId::new();
        self.zones.insert(
            id,
            ZoneState {
                name: name.to_owned(),
                ..ZoneState::default()
            },
        );
        id
    }

    /// Add a facility with the host's default health and store for its kind.
    pub fn add_facility(
        &mut self,
        zone: ZoneId,
        kind: FacilityKind,
        pos: Position,
    ) -> Result<EntityId, WorldError> {
        let state = self
            .zones
            .get_mut(&zone)
            .ok_or(WorldError::ZoneNotFound(zone))?;
        let id = EntityId::new();
        let (health, store) = default_facility_state(kind);
        state.facilities.push(Facility {
            id,
            zone,
            kind,
            health,
            stock: store,
            pos,
        });
        Ok(id)
    }

    /// Add a resource node.
    pub fn add_node(
        &mut self,
        zone: ZoneId,
        available: u32,
        capacity: u32,
        regen_per_tick: u32,
        pos: Position,
    ) -> Result<EntityId, WorldError> {
        let state = self
            .zones
            .get_mut(&zone)
            .ok_or(WorldError::ZoneNotFound(zone))?;
        let id = EntityId::new();
        state.nodes.push(ResourceNode {
            id,
            zone,
            resource: ResourceKind::Energy,
            available,
            capacity,
            regen_per_tick,
            pos,
        });
        Ok(id)
    }

    /// Add a construction site.
    pub fn add_site(
        &mut self,
        zone: ZoneId,
        kind: FacilityKind,
        total: u32,
        pos: Position,
    ) -> Result<EntityId, WorldError> {
        let state = self
            .zones
            .get_mut(&zone)
            .ok_or(WorldError::ZoneNotFound(zone))?;
        let id = EntityId::new();
        state.sites.push(Site {
            id,
            zone,
            kind,
            progress: 0,
            total,
            pos,
        });
        Ok(id)
    }

    /// Add a salvage pile.
    pub fn add_salvage(
        &mut self,
        zone: ZoneId,
        resource: ResourceKind,
        amount: u32,
        pos: Position,
    ) -> Result<EntityId, WorldError> {
        let state = self
            .zones
            .get_mut(&zone)
            .ok_or(WorldError::ZoneNotFound(zone))?;
        let id = EntityId::new();
        state.salvage.push(Salvage {
            id,
            zone,
            resource,
            amount,
            pos,
        });
        Ok(id)
    }

    /// Add a friendly agent and seed its memory record with its role.
    pub fn add_agent(
        &mut self,
        zone: ZoneId,
        name: &str,
        memory: AgentMemory,
        loadout: Vec<CapabilityModule>,
        pos: Position,
    ) -> Result<EntityId, WorldError> {
        if self.memory.contains_key(name) || self.agent_exists(name) {
            return Err(WorldError::DuplicateAgentName(name.to_owned()));
        }
        let state = self
            .zones
            .get_mut(&zone)
            .ok_or(WorldError::ZoneNotFound(zone))?;
        let id = EntityId::new();
        state.agents.push(make_agent(id, zone, name, loadout, pos, self.tick, false));
        self.memory.insert(name.to_owned(), memory);
        Ok(id)
    }

    /// Add a hostile agent (no memory record; the decision core never
    /// drives hostiles).
    pub fn add_hostile(
        &mut self,
        zone: ZoneId,
        name: &str,
        health: Health,
        pos: Position,
    ) -> Result<EntityId, WorldError> {
        let state = self
            .zones
            .get_mut(&zone)
            .ok_or(WorldError::ZoneNotFound(zone))?;
        let id = EntityId::new();
        let mut agent = make_agent(id, zone, name, Vec::new(), pos, self.tick, true);
        agent.health = health;
        state.agents.push(agent);
        Ok(id)
    }

    // -- direct state access (scenario setup and assertions) ----------------

    /// Mutable access to a facility, for scenario setup.
    pub fn facility_mut(&mut self, id: EntityId) -> Option<&mut Facility> {
        self.zones
            .values_mut()
            .flat_map(|z| z.facilities.iter_mut())
            .find(|f| f.id == id)
    }

    /// Mutable access to an agent, for scenario setup.
    pub fn agent_mut(&mut self, id: EntityId) -> Option<&mut Agent> {
        self.zones
            .values_mut()
            .flat_map(|z| z.agents.iter_mut())
            .find(|a| a.id == id)
    }

    /// IDs of a zone's facilities of one kind, in query order.
    pub fn facilities_of(&self, zone: ZoneId, kind: FacilityKind) -> Vec<EntityId> {
        self.zones
            .get(&zone)
            .map(|z| {
                z.facilities
                    .iter()
                    .filter(|f| f.kind == kind)
                    .map(|f| f.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Look up a living agent snapshot by name.
    pub fn agent_by_name(&self, name: &str) -> Option<Agent> {
        self.zones
            .values()
            .flat_map(|z| z.agents.iter())
            .find(|a| a.name == name)
            .cloned()
    }

    // -- tick advancement ---------------------------------------------------

    /// Start the next tick: advance the clock, regenerate every resource
    /// node, and progress production jobs, materializing finished agents.
    pub fn advance(&mut self) {
        self.tick = self.tick.saturating_add(1);

        for state in self.zones.values_mut() {
            for node in &mut state.nodes {
                resource::regenerate(node);
            }
        }

        let mut finished: Vec<EntityId> = Vec::new();
        for (factory, job) in &mut self.jobs {
            job.remaining = job.remaining.saturating_sub(1);
            if job.remaining == 0 {
                finished.push(*factory);
            }
        }

        for factory in finished {
            let Some(job) = self.jobs.remove(&factory) else {
                continue;
            };
            let spawn_pos = self
                .zones
                .get(&job.zone)
                .and_then(|z| z.facilities.iter().find(|f| f.id == job.factory))
                .map_or(Position::new(0, 0), |f| {
                    Position::new(f.pos.x.saturating_add(1), f.pos.y)
                });
            let id = EntityId::new();
            let agent = make_agent(
                id,
                job.zone,
                &job.name,
                job.loadout,
                spawn_pos,
                self.tick,
                false,
            );
            info!(tick = self.tick, name = %job.name, agent = %id, "Production finished");
            self.memory.insert(job.name.clone(), job.memory);
            if let Some(state) = self.zones.get_mut(&job.zone) {
                state.agents.push(agent);
            }
        }
    }

    // -- internal helpers ---------------------------------------------------

    fn agent_exists(&self, name: &str) -> bool {
        self.zones
            .values()
            .flat_map(|z| z.agents.iter())
            .any(|a| a.name == name)
            || self.jobs.values().any(|j| j.name == name)
    }

    fn zone_of(&self, id: EntityId) -> Option<ZoneId> {
        for (zone_id, state) in &self.zones {
            let found = state.agents.iter().any(|a| a.id == id)
                || state.facilities.iter().any(|f| f.id == id)
                || state.nodes.iter().any(|n| n.id == id)
                || state.sites.iter().any(|s| s.id == id)
                || state.salvage.iter().any(|s| s.id == id);
            if found {
                return Some(*zone_id);
            }
        }
        None
    }

    fn entity_pos(&self, id: EntityId) -> Option<Position> {
        for state in self.zones.values() {
            if let Some(a) = state.agents.iter().find(|a| a.id == id) {
                return Some(a.pos);
            }
            if let Some(f) = state.facilities.iter().find(|f| f.id == id) {
                return Some(f.pos);
            }
            if let Some(n) = state.nodes.iter().find(|n| n.id == id) {
                return Some(n.pos);
            }
            if let Some(s) = state.sites.iter().find(|s| s.id == id) {
                return Some(s.pos);
            }
            if let Some(s) = state.salvage.iter().find(|s| s.id == id) {
                return Some(s.pos);
            }
        }
        None
    }

    fn is_turret(&self, id: EntityId) -> bool {
        self.zones
            .values()
            .flat_map(|z| z.facilities.iter())
            .any(|f| f.id == id && f.kind == FacilityKind::Turret)
    }

    /// Remove an agent, dropping its stock as salvage at its position.
    fn remove_agent(&mut self, zone: ZoneId, id: EntityId) {
        let Some(state) = self.zones.get_mut(&zone) else {
            return;
        };
        let Some(idx) = state.agents.iter().position(|a| a.id == id) else {
            return;
        };
        let agent = state.agents.remove(idx);
        for (res, qty) in &agent.stock.held {
            if *qty > 0 {
                state.salvage.push(Salvage {
                    id: EntityId::new(),
                    zone,
                    resource: *res,
                    amount: *qty,
                    pos: agent.pos,
                });
            }
        }
        debug!(agent = %agent.name, "Agent removed");
    }

    fn agent_act(
        &mut self,
        zone: ZoneId,
        actor: EntityId,
        verb: ActionVerb,
        target: EntityId,
        res: ResourceKind,
    ) -> ActionStatus {
        let Some(state) = self.zones.get_mut(&zone) else {
            return ActionStatus::InvalidTarget;
        };
        let ZoneState {
            facilities,
            nodes,
            sites,
            salvage,
            agents,
            ..
        } = state;
        let Some(agent) = agents.iter_mut().find(|a| a.id == actor) else {
            return ActionStatus::InvalidTarget;
        };

        match verb {
            ActionVerb::Harvest => {
                let Some(node) = nodes.iter_mut().find(|n| n.id == target) else {
                    return ActionStatus::InvalidTarget;
                };
                if !agent.pos.is_adjacent(node.pos) {
                    return ActionStatus::NotInRange;
                }
                if node.available == 0 {
                    return ActionStatus::NotEnoughResources;
                }
                if agent.stock.is_full() {
                    return ActionStatus::Full;
                }
                let works = agent.module_count(CapabilityModule::Work).max(1);
                let want = HARVEST_PER_WORK
                    .saturating_mul(works)
                    .min(agent.stock.free_capacity());
                let taken = resource::harvest(node, want);
                if stock::deposit(&mut agent.stock, node.resource, taken).is_err() {
                    return ActionStatus::Full;
                }
                ActionStatus::Ok
            }
            ActionVerb::Transfer => {
                let Some(facility) = facilities.iter_mut().find(|f| f.id == target) else {
                    return ActionStatus::InvalidTarget;
                };
                if !agent.pos.is_adjacent(facility.pos) {
                    return ActionStatus::NotInRange;
                }
                if agent.stock.amount_of(res) == 0 {
                    return ActionStatus::NotEnoughResources;
                }
                let Some(store) = facility.stock.as_mut() else {
                    return ActionStatus::InvalidTarget;
                };
                if store.free_capacity() == 0 {
                    return ActionStatus::Full;
                }
                match stock::transfer(&mut agent.stock, store, res, u32::MAX) {
                    Ok(_) => ActionStatus::Ok,
                    Err(_) => ActionStatus::InvalidTarget,
                }
            }
            ActionVerb::Withdraw => {
                let Some(facility) = facilities.iter_mut().find(|f| f.id == target) else {
                    return ActionStatus::InvalidTarget;
                };
                if !agent.pos.is_adjacent(facility.pos) {
                    return ActionStatus::NotInRange;
                }
                let Some(store) = facility.stock.as_mut() else {
                    return ActionStatus::InvalidTarget;
                };
                if store.amount_of(res) == 0 {
                    return ActionStatus::NotEnoughResources;
                }
                if agent.stock.free_capacity() == 0 {
                    return ActionStatus::Full;
                }
                match stock::transfer(store, &mut agent.stock, res, u32::MAX) {
                    Ok(_) => ActionStatus::Ok,
                    Err(_) => ActionStatus::InvalidTarget,
                }
            }
            ActionVerb::Charge => {
                let Some(facility) = facilities
                    .iter_mut()
                    .find(|f| f.id == target && f.kind == FacilityKind::Core)
                else {
                    return ActionStatus::InvalidTarget;
                };
                if !agent.pos.is_adjacent(facility.pos) {
                    return ActionStatus::NotInRange;
                }
                if agent.stock.amount_of(ResourceKind::Energy) == 0 {
                    return ActionStatus::NotEnoughResources;
                }
                let Some(store) = facility.stock.as_mut() else {
                    return ActionStatus::InvalidTarget;
                };
                if store.free_capacity() == 0 {
                    return ActionStatus::Full;
                }
                let works = agent.module_count(CapabilityModule::Work).max(1);
                let amount = CHARGE_PER_WORK.saturating_mul(works);
                match stock::transfer(&mut agent.stock, store, ResourceKind::Energy, amount) {
                    Ok(_) => ActionStatus::Ok,
                    Err(_) => ActionStatus::InvalidTarget,
                }
            }
            ActionVerb::Build => {
                let Some(site_idx) = sites.iter().position(|s| s.id == target) else {
                    return ActionStatus::InvalidTarget;
                };
                let Some(site) = sites.get_mut(site_idx) else {
                    return ActionStatus::InvalidTarget;
                };
                if !agent.pos.is_adjacent(site.pos) {
                    return ActionStatus::NotInRange;
                }
                if agent.stock.amount_of(ResourceKind::Energy) == 0 {
                    return ActionStatus::NotEnoughResources;
                }
                let works = agent.module_count(CapabilityModule::Work).max(1);
                let remaining = site.total.saturating_sub(site.progress);
                let spent = BUILD_PER_WORK
                    .saturating_mul(works)
                    .min(agent.stock.amount_of(ResourceKind::Energy))
                    .min(remaining);
                if stock::withdraw(&mut agent.stock, ResourceKind::Energy, spent).is_err() {
                    return ActionStatus::NotEnoughResources;
                }
                site.progress = site.progress.saturating_add(spent);
                if site.progress >= site.total {
                    let done = sites.remove(site_idx);
                    facilities.push(finished_facility(&done));
                    info!(site = %done.id, kind = ?done.kind, "Construction finished");
                }
                ActionStatus::Ok
            }
            ActionVerb::Repair => {
                let Some(facility) = facilities.iter_mut().find(|f| f.id == target) else {
                    return ActionStatus::InvalidTarget;
                };
                if !agent.pos.is_adjacent(facility.pos) {
                    return ActionStatus::NotInRange;
                }
                if agent.stock.amount_of(ResourceKind::Energy) == 0 {
                    return ActionStatus::NotEnoughResources;
                }
                if facility.health.is_full() {
                    return ActionStatus::Ok;
                }
                let works = agent.module_count(CapabilityModule::Work).max(1);
                let cost = works.min(agent.stock.amount_of(ResourceKind::Energy));
                if stock::withdraw(&mut agent.stock, ResourceKind::Energy, cost).is_err() {
                    return ActionStatus::NotEnoughResources;
                }
                let restored = REPAIR_PER_WORK.saturating_mul(cost);
                facility.health.current = facility
                    .health
                    .current
                    .saturating_add(restored)
                    .min(facility.health.max);
                ActionStatus::Ok
            }
            ActionVerb::Pickup => {
                let Some(pile_idx) = salvage.iter().position(|s| s.id == target) else {
                    return ActionStatus::InvalidTarget;
                };
                let Some(pile) = salvage.get_mut(pile_idx) else {
                    return ActionStatus::InvalidTarget;
                };
                if !agent.pos.is_adjacent(pile.pos) {
                    return ActionStatus::NotInRange;
                }
                if agent.stock.free_capacity() == 0 {
                    return ActionStatus::Full;
                }
                let taken = pile.amount.min(agent.stock.free_capacity());
                if stock::deposit(&mut agent.stock, pile.resource, taken).is_err() {
                    return ActionStatus::Full;
                }
                pile.amount = pile.amount.saturating_sub(taken);
                if pile.amount == 0 {
                    salvage.remove(pile_idx);
                }
                ActionStatus::Ok
            }
            ActionVerb::Attack | ActionVerb::Heal | ActionVerb::Decommission => {
                ActionStatus::InvalidTarget
            }
        }
    }

    fn turret_act(
        &mut self,
        zone: ZoneId,
        actor: EntityId,
        verb: ActionVerb,
        target: EntityId,
    ) -> ActionStatus {
        // Validate the turret can pay for one action.
        let stored = self
            .zones
            .get(&zone)
            .and_then(|z| z.facilities.iter().find(|f| f.id == actor))
            .map_or(0, Facility::stored_energy);
        if stored < TURRET_ACTION_COST {
            return ActionStatus::NotEnoughResources;
        }

        // Validate the target before paying (sequential borrows: the turret
        // and its repair target can live in the same facility list).
        let valid = match verb {
            ActionVerb::Attack => self
                .zones
                .get(&zone)
                .is_some_and(|z| z.agents.iter().any(|a| a.id == target && a.hostile)),
            ActionVerb::Heal => self
                .zones
                .get(&zone)
                .is_some_and(|z| z.agents.iter().any(|a| a.id == target && !a.hostile)),
            ActionVerb::Repair => self
                .zones
                .get(&zone)
                .is_some_and(|z| z.facilities.iter().any(|f| f.id == target && f.id != actor)),
            _ => false,
        };
        if !valid {
            return ActionStatus::InvalidTarget;
        }

        let paid = self
            .zones
            .get_mut(&zone)
            .and_then(|z| z.facilities.iter_mut().find(|f| f.id == actor))
            .and_then(|f| f.stock.as_mut())
            .is_some_and(|s| {
                stock::withdraw(s, ResourceKind::Energy, TURRET_ACTION_COST).is_ok()
            });
        if !paid {
            return ActionStatus::NotEnoughResources;
        }

        match verb {
            ActionVerb::Attack => {
                let mut destroyed = None;
                if let Some(a) = self
                    .zones
                    .get_mut(&zone)
                    .and_then(|z| z.agents.iter_mut().find(|a| a.id == target))
                {
                    a.health.current = a.health.current.saturating_sub(TURRET_ATTACK_DAMAGE);
                    if a.health.current == 0 {
                        destroyed = Some(a.id);
                    }
                }
                if let Some(id) = destroyed {
                    self.remove_agent(zone, id);
                }
                ActionStatus::Ok
            }
            ActionVerb::Heal => {
                if let Some(a) = self
                    .zones
                    .get_mut(&zone)
                    .and_then(|z| z.agents.iter_mut().find(|a| a.id == target))
                {
                    a.health.current = a
                        .health
                        .current
                        .saturating_add(TURRET_HEAL_AMOUNT)
                        .min(a.health.max);
                }
                ActionStatus::Ok
            }
            ActionVerb::Repair => {
                if let Some(f) = self
                    .zones
                    .get_mut(&zone)
                    .and_then(|z| z.facilities.iter_mut().find(|f| f.id == target))
                {
                    f.health.current = f
                        .health
                        .current
                        .saturating_add(TURRET_REPAIR_AMOUNT)
                        .min(f.health.max);
                }
                ActionStatus::Ok
            }
            _ => ActionStatus::InvalidTarget,
        }
    }
}

impl World for SimWorld {
    fn tick(&self) -> u64 {
        self.tick
    }

    fn zones(&self) -> Vec<Zone> {
        self.zones
            .iter()
            .map(|(id, state)| make_zone(*id, state))
            .collect()
    }

    fn zone(&self, id: ZoneId) -> Option<Zone> {
        self.zones.get(&id).map(|state| make_zone(id, state))
    }

    fn facilities(&self, zone: ZoneId) -> Vec<Facility> {
        self.zones
            .get(&zone)
            .map(|z| z.facilities.clone())
            .unwrap_or_default()
    }

    fn nodes(&self, zone: ZoneId) -> Vec<ResourceNode> {
        self.zones
            .get(&zone)
            .map(|z| z.nodes.clone())
            .unwrap_or_default()
    }

    fn sites(&self, zone: ZoneId) -> Vec<Site> {
        self.zones
            .get(&zone)
            .map(|z| z.sites.clone())
            .unwrap_or_default()
    }

    fn agents(&self, zone: ZoneId) -> Vec<Agent> {
        self.zones
            .get(&zone)
            .map(|z| z.agents.clone())
            .unwrap_or_default()
    }

    fn salvage(&self, zone: ZoneId) -> Vec<Salvage> {
        self.zones
            .get(&zone)
            .map(|z| z.salvage.clone())
            .unwrap_or_default()
    }

    fn facility(&self, id: EntityId) -> Option<Facility> {
        self.zones
            .values()
            .flat_map(|z| z.facilities.iter())
            .find(|f| f.id == id)
            .cloned()
    }

    fn node(&self, id: EntityId) -> Option<ResourceNode> {
        self.zones
            .values()
            .flat_map(|z| z.nodes.iter())
            .find(|n| n.id == id)
            .cloned()
    }

    fn site(&self, id: EntityId) -> Option<Site> {
        self.zones
            .values()
            .flat_map(|z| z.sites.iter())
            .find(|s| s.id == id)
            .cloned()
    }

    fn move_toward(&mut self, actor: EntityId, target: EntityId) {
        let Some(dest) = self.entity_pos(target) else {
            return;
        };
        let Some(agent) = self.agent_mut(actor) else {
            return;
        };
        agent.pos.x = agent.pos.x.saturating_add(step_toward(agent.pos.x, dest.x));
        agent.pos.y = agent.pos.y.saturating_add(step_toward(agent.pos.y, dest.y));
    }

    fn perform(
        &mut self,
        actor: EntityId,
        verb: ActionVerb,
        target: EntityId,
        resource: Option<ResourceKind>,
    ) -> ActionStatus {
        let res = resource.unwrap_or(ResourceKind::Energy);
        let Some(zone) = self.zone_of(actor) else {
            return ActionStatus::InvalidTarget;
        };

        if verb == ActionVerb::Decommission {
            if actor != target {
                return ActionStatus::InvalidTarget;
            }
            self.remove_agent(zone, actor);
            return ActionStatus::Ok;
        }

        if self.is_turret(actor) {
            return self.turret_act(zone, actor, verb, target);
        }

        self.agent_act(zone, actor, verb, target, res)
    }

    fn produce(
        &mut self,
        facility: EntityId,
        loadout: &[CapabilityModule],
        name: &str,
        memory: &AgentMemory,
    ) -> ActionStatus {
        let Some(zone) = self.zone_of(facility) else {
            return ActionStatus::InvalidTarget;
        };
        let is_factory = self
            .zones
            .get(&zone)
            .is_some_and(|z| {
                z.facilities
                    .iter()
                    .any(|f| f.id == facility && f.kind == FacilityKind::Factory)
            });
        if !is_factory {
            return ActionStatus::InvalidTarget;
        }
        if self.jobs.contains_key(&facility) {
            return ActionStatus::Busy;
        }
        if loadout.is_empty() || self.agent_exists(name) || self.memory.contains_key(name) {
            return ActionStatus::InvalidTarget;
        }

        let cost = loadout_cost(loadout);
        let available = self
            .zone(zone)
            .map_or(0, |z| z.energy_available);
        if cost > available {
            return ActionStatus::NotEnoughResources;
        }

        // Pay from budget facilities in query order.
        let mut due = cost;
        if let Some(state) = self.zones.get_mut(&zone) {
            for f in &mut state.facilities {
                if due == 0 {
                    break;
                }
                if !matches!(f.kind, FacilityKind::Factory | FacilityKind::Capacitor) {
                    continue;
                }
                if let Some(store) = f.stock.as_mut() {
                    let take = due.min(store.amount_of(ResourceKind::Energy));
                    if stock::withdraw(store, ResourceKind::Energy, take).is_ok() {
                        due = due.saturating_sub(take);
                    }
                }
            }
        }

        let module_count = u64::try_from(loadout.len()).unwrap_or(u64::MAX);
        self.jobs.insert(
            facility,
            ProductionJob {
                zone,
                factory: facility,
                name: name.to_owned(),
                loadout: loadout.to_vec(),
                memory: memory.clone(),
                remaining: PRODUCTION_TICKS_PER_MODULE.saturating_mul(module_count),
            },
        );
        info!(tick = self.tick, name, cost, modules = loadout.len(), "Production started");
        ActionStatus::Ok
    }

    fn is_producing(&self, facility: EntityId) -> bool {
        self.jobs.contains_key(&facility)
    }

    fn memory(&self, name: &str) -> Option<AgentMemory> {
        self.memory.get(name).cloned()
    }

    fn set_memory(&mut self, name: &str, memory: AgentMemory) {
        self.memory.insert(name.to_owned(), memory);
    }

    fn delete_memory(&mut self, name: &str) {
        self.memory.remove(name);
    }

    fn memory_names(&self) -> Vec<String> {
        self.memory.keys().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// One movement leg along a single axis.
const fn step_toward(from: i32, to: i32) -> i32 {
    if from < to {
        1
    } else if from > to {
        -1
    } else {
        0
    }
}

fn make_zone(id: ZoneId, state: &ZoneState) -> Zone {
    let (available, capacity) = state
        .facilities
        .iter()
        .filter(|f| matches!(f.kind, FacilityKind::Factory | FacilityKind::Capacitor))
        .fold((0_u32, 0_u32), |(avail, cap), f| {
            (
                avail.saturating_add(f.stored_energy()),
                cap.saturating_add(f.stock.as_ref().map_or(0, |s| s.capacity)),
            )
        });
    Zone {
        id,
        name: state.name.clone(),
        energy_available: available,
        energy_capacity: capacity,
    }
}

fn make_agent(
    id: EntityId,
    zone: ZoneId,
    name: &str,
    loadout: Vec<CapabilityModule>,
    pos: Position,
    created_tick: u64,
    hostile: bool,
) -> Agent {
    let carries = loadout
        .iter()
        .filter(|m| **m == CapabilityModule::Carry)
        .count();
    let capacity =
        CARRY_CAPACITY_PER_MODULE.saturating_mul(u32::try_from(carries).unwrap_or(u32::MAX));
    let modules = u32::try_from(loadout.len()).unwrap_or(u32::MAX);
    Agent {
        id,
        name: name.to_owned(),
        zone,
        hostile,
        health: Health::full(HEALTH_PER_MODULE.saturating_mul(modules.max(1))),
        stock: Stock::empty(capacity),
        pos,
        loadout,
        created_tick,
    }
}

/// Host defaults for a freshly placed facility of each kind.
fn default_facility_state(kind: FacilityKind) -> (Health, Option<Stock>) {
    match kind {
        FacilityKind::Factory => (Health::full(5_000), Some(Stock::empty(300))),
        FacilityKind::Capacitor => (Health::full(1_000), Some(Stock::empty(50))),
        FacilityKind::Turret => (Health::full(3_000), Some(Stock::empty(1_000))),
        FacilityKind::Storehouse => (Health::full(10_000), Some(Stock::empty(100_000))),
        FacilityKind::Cache => (Health::full(2_500), Some(Stock::empty(2_000))),
        FacilityKind::Conduit => (Health::full(5_000), None),
        FacilityKind::Barrier | FacilityKind::Bulwark => (Health::full(300_000), None),
        FacilityKind::Core => (Health::full(1_000), Some(Stock::empty(1_000_000))),
        FacilityKind::Beacon => (Health::full(1), None),
    }
}

/// Convert a finished site into its facility.
///
/// Fortifications enter the world at 1 health — maintainers bring them up.
fn finished_facility(site: &Site) -> Facility {
    let (mut health, store) = default_facility_state(site.kind);
    if matches!(site.kind, FacilityKind::Barrier | FacilityKind::Bulwark) {
        health.current = 1;
    }
    Facility {
        id: site.id,
        zone: site.zone,
        kind: site.kind,
        health,
        stock: store,
        pos: site.pos,
    }
}
