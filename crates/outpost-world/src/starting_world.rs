//! Canonical starting world for demos and integration tests.
//!
//! One zone with a seeded production budget, a working defense stack, two
//! energy nodes, transit conduits in need of repair, and an open
//! construction site — enough for every role to find work from tick one.

use outpost_types::{EntityId, FacilityKind, Position, ResourceKind, ZoneId};

use crate::error::WorldError;
use crate::sim::SimWorld;
use crate::stock;

/// IDs of the notable starting entities, for tests and logging.
#[derive(Debug, Clone, Copy)]
pub struct StartingIds {
    /// The single starting zone.
    pub zone: ZoneId,
    /// The zone's factory.
    pub factory: EntityId,
    /// The zone's core.
    pub core: EntityId,
    /// The zone's turret.
    pub turret: EntityId,
    /// The main storehouse.
    pub storehouse: EntityId,
    /// Energy node on the east side.
    pub node_east: EntityId,
    /// Energy node on the west side.
    pub node_west: EntityId,
}

/// Build the starting world.
///
/// # Errors
///
/// Returns [`WorldError`] if seeding any facility store fails (only
/// possible if the defaults here disagree with the host capacities).
pub fn create_starting_world() -> Result<(SimWorld, StartingIds), WorldError> {
    let mut world = SimWorld::new();
    let zone = world.add_zone("Bastion");

    let factory = world.add_facility(zone, FacilityKind::Factory, Position::new(10, 10))?;
    let core = world.add_facility(zone, FacilityKind::Core, Position::new(14, 10))?;
    let turret = world.add_facility(zone, FacilityKind::Turret, Position::new(10, 14))?;
    let storehouse = world.add_facility(zone, FacilityKind::Storehouse, Position::new(8, 10))?;
    world.add_facility(zone, FacilityKind::Capacitor, Position::new(9, 11))?;
    world.add_facility(zone, FacilityKind::Capacitor, Position::new(11, 11))?;
    world.add_facility(zone, FacilityKind::Cache, Position::new(12, 12))?;
    world.add_facility(zone, FacilityKind::Conduit, Position::new(10, 12))?;
    world.add_facility(zone, FacilityKind::Conduit, Position::new(10, 13))?;
    world.add_facility(zone, FacilityKind::Beacon, Position::new(2, 2))?;

    let node_east = world.add_node(zone, 3_000, 3_000, 10, Position::new(18, 10))?;
    let node_west = world.add_node(zone, 3_000, 3_000, 10, Position::new(2, 10))?;

    world.add_site(zone, FacilityKind::Capacitor, 100, Position::new(11, 9))?;

    // Seed the production budget and the turret's reserve.
    seed_energy(&mut world, factory, 300)?;
    seed_energy(&mut world, turret, 500)?;
    seed_energy(&mut world, storehouse, 2_000)?;

    // Worn transit surface so maintainers have work from tick one.
    if let Some(conduit) = world
        .facilities_of(zone, FacilityKind::Conduit)
        .first()
        .copied()
    {
        if let Some(f) = world.facility_mut(conduit) {
            f.health.current = 2_000;
        }
    }

    Ok((
        world,
        StartingIds {
            zone,
            factory,
            core,
            turret,
            storehouse,
            node_east,
            node_west,
        },
    ))
}

fn seed_energy(world: &mut SimWorld, facility: EntityId, amount: u32) -> Result<(), WorldError> {
    let store = world
        .facility_mut(facility)
        .and_then(|f| f.stock.as_mut())
        .ok_or(WorldError::EntityNotFound(facility))?;
    stock::deposit(store, ResourceKind::Energy, amount)
}
