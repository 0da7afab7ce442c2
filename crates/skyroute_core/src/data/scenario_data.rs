//! Scenario definitions: cities, vehicles and their opening orders.

use serde::{Deserialize, Serialize};

use super::city_data::CityData;
use super::vehicle_data::{StartData, VehicleData};
use crate::error::{GameError, Result};
use crate::math::GridPos;
use crate::simulation::{Order, Simulation, SpawnPoint, VehicleSpawnParams};
use crate::tile::TileMap;

/// An order referring to buildings and vehicles by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKindData {
    /// Fly to a tile.
    GotoLocation(GridPos),
    /// Fly to the named building and land.
    GotoBuilding(String),
    /// Follow the named vehicle.
    FollowVehicle(String),
    /// Close in on the named vehicle.
    AttackVehicle(String),
    /// Fly over the named building's pads.
    AttackBuilding(String),
    /// Wait a number of ticks.
    Snooze(u32),
    /// Leave the current building.
    TakeOff,
    /// Land on the named building's pad below.
    Land(String),
}

/// An initial order for one vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderData {
    /// Name of the vehicle receiving the order.
    pub vehicle: String,
    /// The order.
    pub order: OrderKindData,
}

/// A complete scenario.
///
/// Names must be unique per kind; orders are issued in file order after
/// every vehicle has been spawned.
///
/// # Example RON
///
/// ```ron
/// ScenarioData(
///     name: "Commute",
///     cities: [
///         CityData(
///             name: "Metro",
///             size: (x: 16, y: 16, z: 4),
///             buildings: [
///                 BuildingData(name: "Depot", landing_pads: [(x: 2, y: 2, z: 0)]),
///                 BuildingData(name: "Tower", landing_pads: [(x: 12, y: 2, z: 0)]),
///             ],
///         ),
///     ],
///     vehicles: [VehicleData(name: "Hawk", start: Building("Depot"))],
///     orders: [OrderData(vehicle: "Hawk", order: GotoBuilding("Tower"))],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioData {
    /// Scenario name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Cities with their scenery and buildings.
    pub cities: Vec<CityData>,
    /// Vehicles to spawn, in ID order.
    #[serde(default)]
    pub vehicles: Vec<VehicleData>,
    /// Opening orders.
    #[serde(default)]
    pub orders: Vec<OrderData>,
}

fn unknown(kind: &'static str, name: &str) -> GameError {
    GameError::UnknownReference {
        kind,
        name: name.to_string(),
    }
}

impl ScenarioData {
    /// Build a ready-to-run simulation from this scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if a city size is not positive on every axis, if a
    /// name is referenced but never defined, if any placement lies outside
    /// its city map, if a vehicle cannot be spawned as described, or if an
    /// order is invalid for the vehicle's starting state.
    pub fn build(&self) -> Result<Simulation> {
        let mut sim = Simulation::new();

        for city_data in &self.cities {
            if !TileMap::is_valid_size(city_data.size) {
                return Err(GameError::InvalidSize {
                    city: city_data.name.clone(),
                    size: city_data.size,
                });
            }
            let world = sim.world_mut();
            let city = world.add_city(city_data.name.clone(), city_data.size);
            for scenery in &city_data.scenery {
                for tile in scenery.tiles() {
                    world.add_scenery(city, tile, scenery.kind.into())?;
                }
            }
            for building in &city_data.buildings {
                world.add_building(city, building.name.clone(), building.landing_pads.clone())?;
            }
        }

        for vehicle in &self.vehicles {
            let spawn = Self::spawn_point(&sim, vehicle)?;
            let mut params = VehicleSpawnParams::new(vehicle.name.clone(), spawn);
            params.speed = vehicle.speed;
            sim.spawn_vehicle(params)?;
        }

        for order_data in &self.orders {
            let vehicle = sim
                .vehicle_by_name(&order_data.vehicle)
                .ok_or_else(|| unknown("vehicle", &order_data.vehicle))?
                .id;
            let order = Self::resolve_order(&sim, &order_data.order)?;
            sim.issue_order(vehicle, order)?;
        }

        tracing::info!(
            scenario = %self.name,
            cities = self.cities.len(),
            vehicles = self.vehicles.len(),
            orders = self.orders.len(),
            "Scenario built"
        );
        Ok(sim)
    }

    fn spawn_point(sim: &Simulation, vehicle: &VehicleData) -> Result<SpawnPoint> {
        Ok(match &vehicle.start {
            StartData::Building(name) => SpawnPoint::Landed(
                sim.world()
                    .building_by_name(name)
                    .ok_or_else(|| unknown("building", name))?
                    .id,
            ),
            StartData::Airborne { city, tile } => SpawnPoint::Airborne {
                city: sim
                    .world()
                    .cities()
                    .find(|c| &c.name == city)
                    .ok_or_else(|| unknown("city", city))?
                    .id,
                tile: *tile,
            },
            StartData::Pending => SpawnPoint::Pending,
        })
    }

    fn resolve_order(sim: &Simulation, order: &OrderKindData) -> Result<Order> {
        let building = |name: &str| {
            sim.world()
                .building_by_name(name)
                .map(|b| b.id)
                .ok_or_else(|| unknown("building", name))
        };
        let vehicle = |name: &str| {
            sim.vehicle_by_name(name)
                .map(|v| v.id)
                .ok_or_else(|| unknown("vehicle", name))
        };

        Ok(match order {
            OrderKindData::GotoLocation(tile) => Order::GotoLocation(*tile),
            OrderKindData::GotoBuilding(name) => Order::GotoBuilding(building(name)?),
            OrderKindData::FollowVehicle(name) => Order::FollowVehicle(vehicle(name)?),
            OrderKindData::AttackVehicle(name) => Order::AttackVehicle(vehicle(name)?),
            OrderKindData::AttackBuilding(name) => Order::AttackBuilding(building(name)?),
            OrderKindData::Snooze(ticks) => Order::Snooze(*ticks),
            OrderKindData::TakeOff => Order::TakeOff,
            OrderKindData::Land(name) => Order::Land(building(name)?),
        })
    }
}

impl Simulation {
    /// Build a simulation from scenario data.
    ///
    /// # Errors
    ///
    /// See [`ScenarioData::build`].
    pub fn from_scenario(data: &ScenarioData) -> Result<Self> {
        data.build()
    }
}
