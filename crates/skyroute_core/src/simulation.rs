//! Core simulation loop.
//!
//! The simulation owns the world and every vehicle, and advances them one
//! tick at a time. Each tick every vehicle runs its mission scheduler and
//! motion step, in ascending vehicle ID order.
//!
//! # Determinism
//!
//! All operations in this module are fully deterministic:
//! - No floating-point math (uses fixed-point via [`Fixed`])
//! - Consistent iteration order (`BTreeMap` registries)
//! - Same inputs always produce same outputs
//!
//! # Example
//!
//! ```
//! use skyroute_core::math::GridPos;
//! use skyroute_core::simulation::{Order, Simulation, SpawnPoint, VehicleSpawnParams};
//!
//! let mut sim = Simulation::new();
//! let city = sim.world_mut().add_city("Metro", GridPos::new(16, 16, 4));
//! let depot = sim
//!     .world_mut()
//!     .add_building(city, "Depot", vec![GridPos::new(2, 2, 0)])
//!     .unwrap();
//! let tower = sim
//!     .world_mut()
//!     .add_building(city, "Tower", vec![GridPos::new(12, 2, 0)])
//!     .unwrap();
//!
//! let hawk = sim
//!     .spawn_vehicle(VehicleSpawnParams::new("Hawk", SpawnPoint::Landed(depot)))
//!     .unwrap();
//! sim.issue_order(hawk, Order::GotoBuilding(tower)).unwrap();
//!
//! for _ in 0..100 {
//!     sim.tick();
//! }
//! assert_eq!(sim.vehicle(hawk).unwrap().landed_in(), Some(tower));
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::city::{Building, BuildingId, CityId};
use crate::entry_policy::{CanEnterTile, FlyingVehicleEntryPolicy};
use crate::error::{GameError, Result};
use crate::math::{Fixed, GridPos};
use crate::mission::VehicleMission;
use crate::pathfinding::{AStarPathfinder, PathOracle};
use crate::scheduler::{tick_vehicle, MissionContext, VehicleEvent};
use crate::vehicle::{Vehicle, VehicleId, VehicleLocation};
use crate::world::World;

/// Where a new vehicle appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnPoint {
    /// Parked inside a building.
    Landed(BuildingId),
    /// Already flying on a city map.
    Airborne {
        /// City to fly in.
        city: CityId,
        /// Starting tile.
        tile: GridPos,
    },
    /// Not placed anywhere yet.
    Pending,
}

/// Parameters for spawning a new vehicle.
#[derive(Debug, Clone)]
pub struct VehicleSpawnParams {
    /// Display name.
    pub name: String,
    /// Where the vehicle starts.
    pub spawn: SpawnPoint,
    /// Flight speed (tiles per tick); the default speed when `None`.
    pub speed: Option<Fixed>,
}

impl VehicleSpawnParams {
    /// Spawn parameters with the default speed.
    #[must_use]
    pub fn new(name: impl Into<String>, spawn: SpawnPoint) -> Self {
        Self {
            name: name.into(),
            spawn,
            speed: None,
        }
    }

    /// Override the flight speed.
    #[must_use]
    pub fn with_speed(mut self, speed: Fixed) -> Self {
        self.speed = Some(speed);
        self
    }
}

/// An order an outside caller can give a vehicle.
///
/// Orders are appended behind whatever the vehicle is already doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    /// Fly to a tile.
    GotoLocation(GridPos),
    /// Fly to a building and land in it.
    GotoBuilding(BuildingId),
    /// Follow another vehicle while it flies.
    FollowVehicle(VehicleId),
    /// Close in on another vehicle while it flies.
    AttackVehicle(VehicleId),
    /// Fly over a building's pads.
    AttackBuilding(BuildingId),
    /// Wait a number of ticks.
    Snooze(u32),
    /// Leave the current building.
    TakeOff,
    /// Land on the pad directly below.
    Land(BuildingId),
}

/// Events generated during a simulation tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Tick number after this tick completed.
    pub tick: u64,
    /// Vehicle events in the order they happened.
    pub events: Vec<VehicleEvent>,
}

impl TickEvents {
    /// Vehicles that landed this tick.
    pub fn landings(&self) -> impl Iterator<Item = (VehicleId, BuildingId)> + '_ {
        self.events.iter().filter_map(|e| match e {
            VehicleEvent::Landed { vehicle, building } => Some((*vehicle, *building)),
            _ => None,
        })
    }

    /// Vehicles that launched this tick.
    pub fn launches(&self) -> impl Iterator<Item = (VehicleId, BuildingId)> + '_ {
        self.events.iter().filter_map(|e| match e {
            VehicleEvent::Launched {
                vehicle, building, ..
            } => Some((*vehicle, *building)),
            _ => None,
        })
    }
}

/// The vehicle mission simulation.
///
/// Owns all state and advances it deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simulation {
    tick: u64,
    world: World,
    vehicles: BTreeMap<VehicleId, Vehicle>,
    next_vehicle_id: u32,
}

impl Simulation {
    /// Create an empty simulation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick: 0,
            world: World::new(),
            vehicles: BTreeMap::new(),
            next_vehicle_id: 1,
        }
    }

    /// Create a simulation around an existing world.
    #[must_use]
    pub fn with_world(world: World) -> Self {
        Self {
            world,
            ..Self::new()
        }
    }

    /// Get the current tick number.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// The world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// The world, mutably (for building cities and buildings).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Get a vehicle by ID.
    #[must_use]
    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    /// Iterate over vehicles in ID order.
    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    /// Find a vehicle by display name.
    #[must_use]
    pub fn vehicle_by_name(&self, name: &str) -> Option<&Vehicle> {
        self.vehicles.values().find(|v| v.name == name)
    }

    /// Spawn a new vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the speed is not positive, if the spawn point
    /// refers to an unknown building or city, or to a tile outside the city
    /// map or one a flying vehicle may not enter.
    pub fn spawn_vehicle(&mut self, params: VehicleSpawnParams) -> Result<VehicleId> {
        let id = VehicleId::new(self.next_vehicle_id);
        let mut vehicle = Vehicle::new(id, params.name);
        if let Some(speed) = params.speed {
            if speed <= Fixed::ZERO {
                return Err(GameError::InvalidState(format!(
                    "{id} ({}) needs a positive speed, got {speed}",
                    vehicle.name
                )));
            }
            vehicle = vehicle.with_speed(speed);
        }

        match params.spawn {
            SpawnPoint::Landed(building) => {
                if self.world.building(building).is_none() {
                    return Err(GameError::BuildingNotFound(building));
                }
                vehicle.location = VehicleLocation::Landed { building };
            }
            SpawnPoint::Airborne { city, tile } => {
                let map = &self
                    .world
                    .city(city)
                    .ok_or(GameError::CityNotFound(city))?
                    .map;
                if !map.in_bounds(tile) {
                    return Err(GameError::OutOfBounds {
                        city,
                        position: tile,
                    });
                }
                if !FlyingVehicleEntryPolicy.can_enter_tile(None, map.tile(tile)) {
                    return Err(GameError::InvalidState(format!(
                        "{id} cannot spawn at {tile} in {city}: tile is blocked"
                    )));
                }
                if !self.world.launch(&mut vehicle, city, tile) {
                    return Err(GameError::InvalidState(format!(
                        "could not place {id} at {tile} in {city}"
                    )));
                }
            }
            SpawnPoint::Pending => {}
        }

        self.next_vehicle_id += 1;
        tracing::info!(vehicle = %id, name = %vehicle.name, location = ?vehicle.location, "Vehicle spawned");
        self.vehicles.insert(id, vehicle);
        Ok(id)
    }

    /// Remove a vehicle from the simulation.
    ///
    /// # Errors
    ///
    /// Returns an error if the vehicle does not exist.
    pub fn remove_vehicle(&mut self, id: VehicleId) -> Result<Vehicle> {
        let vehicle = self
            .vehicles
            .remove(&id)
            .ok_or(GameError::VehicleNotFound(id))?;
        self.world.remove_vehicle(&vehicle);
        Ok(vehicle)
    }

    /// Append a mission to a vehicle's queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the vehicle does not exist.
    pub fn enqueue_mission(&mut self, id: VehicleId, mission: VehicleMission) -> Result<()> {
        let vehicle = self
            .vehicles
            .get_mut(&id)
            .ok_or(GameError::VehicleNotFound(id))?;
        tracing::debug!(vehicle = %id, %mission, "Mission queued");
        vehicle.missions.push(mission);
        Ok(())
    }

    /// Turn an order into a mission and append it to the vehicle's queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the vehicle or any vehicle/building the order
    /// refers to does not exist, or if a take-off is ordered for a vehicle
    /// that is not parked in a building.
    pub fn issue_order(&mut self, id: VehicleId, order: Order) -> Result<()> {
        match order {
            Order::GotoBuilding(b) | Order::AttackBuilding(b) | Order::Land(b) => {
                if self.world.building(b).is_none() {
                    return Err(GameError::BuildingNotFound(b));
                }
            }
            Order::FollowVehicle(v) | Order::AttackVehicle(v) => {
                if !self.vehicles.contains_key(&v) {
                    return Err(GameError::VehicleNotFound(v));
                }
            }
            Order::GotoLocation(_) | Order::Snooze(_) | Order::TakeOff => {}
        }

        let vehicle = self.vehicle(id).ok_or(GameError::VehicleNotFound(id))?;
        let mission = match order {
            Order::GotoLocation(target) => VehicleMission::goto_location(vehicle, target),
            Order::GotoBuilding(b) => VehicleMission::goto_building(vehicle, b),
            Order::FollowVehicle(v) => VehicleMission::follow_vehicle(vehicle, v),
            Order::AttackVehicle(v) => VehicleMission::attack_vehicle(vehicle, v),
            Order::AttackBuilding(b) => VehicleMission::attack_building(vehicle, b),
            Order::Snooze(ticks) => VehicleMission::snooze(vehicle, ticks),
            Order::TakeOff => VehicleMission::take_off(vehicle).ok_or_else(|| {
                GameError::InvalidState(format!("{id} cannot take off: not in a building"))
            })?,
            Order::Land(b) => VehicleMission::land(vehicle, b),
        };
        self.enqueue_mission(id, mission)
    }

    /// Drop every pending mission of a vehicle and stop it where it is.
    ///
    /// # Errors
    ///
    /// Returns an error if the vehicle does not exist.
    pub fn clear_missions(&mut self, id: VehicleId) -> Result<()> {
        let vehicle = self
            .vehicles
            .get_mut(&id)
            .ok_or(GameError::VehicleNotFound(id))?;
        vehicle.missions.clear();
        vehicle.goal = None;
        Ok(())
    }

    /// Destroy a building.
    ///
    /// Missions and vehicles referring to it are left alone; their handles
    /// simply stop resolving.
    ///
    /// # Errors
    ///
    /// Returns an error if the building does not exist.
    pub fn remove_building(&mut self, id: BuildingId) -> Result<Building> {
        self.world.remove_building(id)
    }

    /// Advance the simulation by one tick using the built-in pathfinder.
    pub fn tick(&mut self) -> TickEvents {
        self.tick_with(&AStarPathfinder)
    }

    /// Advance the simulation by one tick using `pathfinder` for routing.
    pub fn tick_with(&mut self, pathfinder: &dyn PathOracle) -> TickEvents {
        let mut ctx = MissionContext::new(&mut self.world, pathfinder);
        for vehicle in self.vehicles.values_mut() {
            tick_vehicle(&mut ctx, vehicle, 1);
        }
        let events = ctx.events;

        self.tick += 1;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.tick, state_hash = hash, "Simulation state hash");
        }

        TickEvents {
            tick: self.tick,
            events,
        }
    }

    /// Compute a hash of the complete simulation state.
    ///
    /// Two simulations that received the same inputs produce the same hash.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);
        self.world.hash(&mut hasher);
        self.vehicles.len().hash(&mut hasher);
        for (id, vehicle) in &self.vehicles {
            id.hash(&mut hasher);
            vehicle.hash(&mut hasher);
        }
        self.next_vehicle_id.hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize the simulation state to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize simulation: {e}")))
    }

    /// Deserialize simulation state from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize simulation: {e}")))
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}
