//! Test fixtures and helpers.
//!
//! Pre-built towns and a scripted pathfinder for consistent testing.

use std::collections::BTreeMap;

use fixed::types::I32F32;
use skyroute_core::city::{BuildingId, CityId};
use skyroute_core::entry_policy::CanEnterTile;
use skyroute_core::math::GridPos;
use skyroute_core::pathfinding::PathOracle;
use skyroute_core::simulation::{Simulation, SpawnPoint, VehicleSpawnParams};
use skyroute_core::tile::{SceneryKind, TileMap};
use skyroute_core::vehicle::VehicleId;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// A path oracle that returns canned routes keyed by destination.
///
/// Destinations without a route are unreachable. Every query is recorded
/// so tests can check what was asked.
#[derive(Debug, Default)]
pub struct ScriptedPathfinder {
    routes: BTreeMap<GridPos, Vec<GridPos>>,
    queries: std::cell::RefCell<Vec<(GridPos, GridPos, u32)>>,
}

impl ScriptedPathfinder {
    /// Create an oracle that finds nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer queries for `destination` with `path`.
    #[must_use]
    pub fn with_route(mut self, destination: GridPos, path: Vec<GridPos>) -> Self {
        self.routes.insert(destination, path);
        self
    }

    /// Every `(origin, destination, budget)` asked so far.
    #[must_use]
    pub fn queries(&self) -> Vec<(GridPos, GridPos, u32)> {
        self.queries.borrow().clone()
    }
}

impl PathOracle for ScriptedPathfinder {
    fn find_path(
        &self,
        _map: &TileMap,
        origin: GridPos,
        destination: GridPos,
        max_expansions: u32,
        _policy: &dyn CanEnterTile,
    ) -> Vec<GridPos> {
        self.queries
            .borrow_mut()
            .push((origin, destination, max_expansions));
        self.routes.get(&destination).cloned().unwrap_or_default()
    }
}

/// A straight run of `len` tiles along +x ending at `end`.
#[must_use]
pub fn straight_route(len: usize, end: GridPos) -> Vec<GridPos> {
    (0..len)
        .map(|i| end.offset(-i32::try_from(len - 1 - i).unwrap_or(i32::MAX), 0, 0))
        .collect()
}

/// IDs of the standard test town.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Town {
    /// The only city.
    pub city: CityId,
    /// Two-pad building on the west side.
    pub depot: BuildingId,
    /// One-pad building on the east side, on a raised block.
    pub tower: BuildingId,
}

/// Build the standard test town: a 24x12x5 city split by a low wall.
///
/// # Panics
///
/// Panics if the fixed layout is rejected, which indicates a bug in the
/// world registry.
#[must_use]
pub fn town() -> (Simulation, Town) {
    let mut sim = Simulation::new();
    let world = sim.world_mut();
    let city = world.add_city("Metro", GridPos::new(24, 12, 5));
    for y in 0..12 {
        for z in 0..2 {
            world
                .add_scenery(city, GridPos::new(11, y, z), SceneryKind::SOLID)
                .expect("wall inside map");
        }
    }
    world
        .add_scenery(city, GridPos::new(20, 6, 0), SceneryKind::SOLID)
        .expect("block inside map");
    let depot = world
        .add_building(city, "Depot", vec![GridPos::new(2, 3, 0), GridPos::new(2, 8, 0)])
        .expect("depot inside map");
    let tower = world
        .add_building(city, "Tower", vec![GridPos::new(20, 6, 1)])
        .expect("tower inside map");
    (sim, Town { city, depot, tower })
}

/// Spawn a vehicle parked in `building`.
///
/// # Panics
///
/// Panics if the building does not exist.
pub fn spawn_landed(sim: &mut Simulation, name: &str, building: BuildingId) -> VehicleId {
    sim.spawn_vehicle(VehicleSpawnParams::new(name, SpawnPoint::Landed(building)))
        .expect("building exists")
}

/// Spawn a vehicle flying at `tile`.
///
/// # Panics
///
/// Panics if the city does not exist or the tile is off the map or blocked.
pub fn spawn_airborne(sim: &mut Simulation, name: &str, city: CityId, tile: GridPos) -> VehicleId {
    sim.spawn_vehicle(VehicleSpawnParams::new(
        name,
        SpawnPoint::Airborne { city, tile },
    ))
    .expect("open tile inside map")
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyroute_core::entry_policy::FlyingVehicleEntryPolicy;

    #[test]
    fn test_scripted_pathfinder_records_queries() {
        let end = GridPos::new(5, 0, 0);
        let oracle = ScriptedPathfinder::new().with_route(end, straight_route(3, end));
        let map = TileMap::new(GridPos::new(8, 1, 1));

        let path = oracle.find_path(&map, GridPos::ZERO, end, 500, &FlyingVehicleEntryPolicy);
        assert_eq!(
            path,
            vec![GridPos::new(3, 0, 0), GridPos::new(4, 0, 0), end]
        );
        assert!(oracle
            .find_path(&map, GridPos::ZERO, GridPos::new(1, 0, 0), 500, &FlyingVehicleEntryPolicy)
            .is_empty());
        assert_eq!(oracle.queries().len(), 2);
        assert_eq!(oracle.queries()[0], (GridPos::ZERO, end, 500));
    }

    #[test]
    fn test_town_layout() {
        let (sim, town) = town();
        let world = sim.world();
        assert_eq!(world.building(town.depot).unwrap().landing_pads.len(), 2);
        assert_eq!(world.city_of_building(town.tower), Some(town.city));
    }
}
