//! The world registry: cities, their buildings, and airborne vehicles.
//!
//! All cross-object references go through IDs resolved here. Lookups of
//! destroyed objects return `None`; callers decide how to degrade.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::city::{Building, BuildingId, City, CityId};
use crate::error::{GameError, Result};
use crate::math::{GridPos, Vec3Fixed};
use crate::tile::{SceneryKind, TileMap, TileObject};
use crate::vehicle::{Vehicle, VehicleId, VehicleLocation};

/// Where an airborne vehicle is, as seen by the tile map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Flight {
    /// City the vehicle flies in.
    pub city: CityId,
    /// Tile the vehicle currently owns.
    pub tile: GridPos,
}

/// All cities plus the index of airborne vehicles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct World {
    cities: BTreeMap<CityId, City>,
    flights: BTreeMap<VehicleId, Flight>,
    next_city_id: u32,
    next_building_id: u32,
}

impl World {
    /// Create an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cities: BTreeMap::new(),
            flights: BTreeMap::new(),
            next_city_id: 1,
            next_building_id: 1,
        }
    }

    /// Add a city with an empty map of the given size.
    ///
    /// # Panics
    ///
    /// Panics if [`TileMap::is_valid_size`] rejects `size`.
    pub fn add_city(&mut self, name: impl Into<String>, size: GridPos) -> CityId {
        let id = CityId::new(self.next_city_id);
        self.next_city_id += 1;
        self.cities.insert(id, City::new(id, name, TileMap::new(size)));
        id
    }

    /// Get a city by ID.
    #[must_use]
    pub fn city(&self, id: CityId) -> Option<&City> {
        self.cities.get(&id)
    }

    /// Get a city by ID mutably.
    pub fn city_mut(&mut self, id: CityId) -> Option<&mut City> {
        self.cities.get_mut(&id)
    }

    /// Iterate over cities in ID order.
    pub fn cities(&self) -> impl Iterator<Item = &City> {
        self.cities.values()
    }

    /// Place a piece of scenery on a city tile.
    pub fn add_scenery(&mut self, city: CityId, position: GridPos, kind: SceneryKind) -> Result<()> {
        let map = &mut self
            .cities
            .get_mut(&city)
            .ok_or(GameError::CityNotFound(city))?
            .map;
        if map.add_occupant(position, TileObject::Scenery(kind)) {
            Ok(())
        } else {
            Err(GameError::OutOfBounds { city, position })
        }
    }

    /// Add a building whose pads become landing-pad scenery on the map.
    pub fn add_building(
        &mut self,
        city: CityId,
        name: impl Into<String>,
        landing_pads: Vec<GridPos>,
    ) -> Result<BuildingId> {
        let target = self
            .cities
            .get_mut(&city)
            .ok_or(GameError::CityNotFound(city))?;
        if let Some(&position) = landing_pads.iter().find(|p| !target.map.in_bounds(**p)) {
            return Err(GameError::OutOfBounds { city, position });
        }

        for pad in &landing_pads {
            target
                .map
                .add_occupant(*pad, TileObject::Scenery(SceneryKind::LANDING_PAD));
        }

        let id = BuildingId::new(self.next_building_id);
        self.next_building_id += 1;
        target.buildings.insert(
            id,
            Building {
                id,
                name: name.into(),
                landing_pads,
            },
        );
        Ok(id)
    }

    /// Destroy a building and its pads.
    ///
    /// Handles to it held elsewhere stop resolving.
    pub fn remove_building(&mut self, id: BuildingId) -> Result<Building> {
        let city = self
            .cities
            .values_mut()
            .find(|c| c.contains_building(id))
            .ok_or(GameError::BuildingNotFound(id))?;
        let building = city
            .buildings
            .remove(&id)
            .ok_or(GameError::BuildingNotFound(id))?;
        for pad in &building.landing_pads {
            city.map
                .remove_occupant(*pad, TileObject::Scenery(SceneryKind::LANDING_PAD));
        }
        tracing::info!(building = %id, name = %building.name, "Building destroyed");
        Ok(building)
    }

    /// Resolve a building handle.
    #[must_use]
    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.cities.values().find_map(|c| c.buildings.get(&id))
    }

    /// Which city contains the building.
    #[must_use]
    pub fn city_of_building(&self, id: BuildingId) -> Option<CityId> {
        self.cities
            .values()
            .find(|c| c.contains_building(id))
            .map(|c| c.id)
    }

    /// Find a building by its display name.
    #[must_use]
    pub fn building_by_name(&self, name: &str) -> Option<&Building> {
        self.cities
            .values()
            .flat_map(|c| c.buildings.values())
            .find(|b| b.name == name)
    }

    /// Where an airborne vehicle is, or `None` if it is not on any map.
    #[must_use]
    pub fn flight(&self, vehicle: VehicleId) -> Option<Flight> {
        self.flights.get(&vehicle).copied()
    }

    /// Iterate over airborne vehicles in ID order.
    pub fn flights(&self) -> impl Iterator<Item = (VehicleId, Flight)> + '_ {
        self.flights.iter().map(|(id, f)| (*id, *f))
    }

    /// Put a vehicle onto a city map at `tile`.
    ///
    /// Returns `false` if the vehicle is already airborne or the tile is not
    /// on the map. Entry rules are the caller's responsibility.
    pub fn launch(&mut self, vehicle: &mut Vehicle, city: CityId, tile: GridPos) -> bool {
        if vehicle.is_flying() {
            tracing::error!(vehicle = %vehicle.id, "Launching a vehicle that is already airborne");
            return false;
        }
        let Some(target) = self.cities.get_mut(&city) else {
            tracing::error!(vehicle = %vehicle.id, %city, "Launching into unknown city");
            return false;
        };
        if !target.map.add_occupant(tile, TileObject::Vehicle(vehicle.id)) {
            tracing::error!(vehicle = %vehicle.id, %tile, "Launch tile outside map");
            return false;
        }

        self.flights.insert(vehicle.id, Flight { city, tile });
        vehicle.location = VehicleLocation::Flying {
            city,
            position: tile.center(),
        };
        vehicle.goal = None;
        true
    }

    /// Take an airborne vehicle off the map and park it in `building`.
    ///
    /// Returns `false` if the vehicle is not airborne.
    pub fn land(&mut self, vehicle: &mut Vehicle, building: BuildingId) -> bool {
        let VehicleLocation::Flying { city, position } = vehicle.location else {
            tracing::error!(vehicle = %vehicle.id, "Landing a vehicle that is not airborne");
            return false;
        };
        if let Some(c) = self.cities.get_mut(&city) {
            c.map
                .remove_occupant(position.tile(), TileObject::Vehicle(vehicle.id));
        }
        self.flights.remove(&vehicle.id);
        vehicle.location = VehicleLocation::Landed { building };
        vehicle.goal = None;
        true
    }

    /// Move an airborne vehicle, keeping tile ownership in sync.
    ///
    /// Positions outside the map are rejected and the vehicle stays put.
    pub fn relocate(&mut self, vehicle: &mut Vehicle, position: Vec3Fixed) -> bool {
        let VehicleLocation::Flying {
            city,
            position: old_position,
        } = vehicle.location
        else {
            return false;
        };
        let Some(c) = self.cities.get_mut(&city) else {
            return false;
        };

        let old_tile = old_position.tile();
        let new_tile = position.tile();
        if old_tile != new_tile {
            if !c.map.in_bounds(new_tile) {
                tracing::error!(vehicle = %vehicle.id, tile = %new_tile, "Vehicle would leave the map");
                return false;
            }
            c.map.remove_occupant(old_tile, TileObject::Vehicle(vehicle.id));
            c.map.add_occupant(new_tile, TileObject::Vehicle(vehicle.id));
            self.flights.insert(
                vehicle.id,
                Flight {
                    city,
                    tile: new_tile,
                },
            );
        }
        vehicle.location = VehicleLocation::Flying { city, position };
        true
    }

    /// Forget a vehicle entirely (removes it from any map).
    pub fn remove_vehicle(&mut self, vehicle: &Vehicle) {
        if let VehicleLocation::Flying { city, position } = vehicle.location {
            if let Some(c) = self.cities.get_mut(&city) {
                c.map
                    .remove_occupant(position.tile(), TileObject::Vehicle(vehicle.id));
            }
        }
        self.flights.remove(&vehicle.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_city() -> (World, CityId) {
        let mut world = World::new();
        let city = world.add_city("Metro", GridPos::new(8, 8, 4));
        (world, city)
    }

    #[test]
    fn test_add_building_places_pad_scenery() {
        let (mut world, city) = world_with_city();
        let pad = GridPos::new(2, 2, 0);
        let id = world.add_building(city, "Tower", vec![pad]).unwrap();

        assert_eq!(world.city_of_building(id), Some(city));
        assert_eq!(world.building(id).unwrap().landing_pads, vec![pad]);
        let tile = world.city(city).unwrap().map.tile(pad).unwrap();
        assert_eq!(
            tile.occupants,
            vec![TileObject::Scenery(SceneryKind::LANDING_PAD)]
        );
    }

    #[test]
    fn test_add_building_rejects_pad_outside_map() {
        let (mut world, city) = world_with_city();
        let result = world.add_building(city, "Tower", vec![GridPos::new(9, 0, 0)]);
        assert!(matches!(result, Err(GameError::OutOfBounds { .. })));
    }

    #[test]
    fn test_removed_building_stops_resolving() {
        let (mut world, city) = world_with_city();
        let pad = GridPos::new(1, 1, 0);
        let id = world.add_building(city, "Tower", vec![pad]).unwrap();

        world.remove_building(id).unwrap();
        assert!(world.building(id).is_none());
        assert!(world.city_of_building(id).is_none());
        assert!(world.city(city).unwrap().map.tile(pad).unwrap().occupants.is_empty());
        assert!(matches!(
            world.remove_building(id),
            Err(GameError::BuildingNotFound(_))
        ));
    }

    #[test]
    fn test_launch_relocate_land() {
        let (mut world, city) = world_with_city();
        let b = world.add_building(city, "Tower", vec![GridPos::new(1, 1, 0)]).unwrap();
        let mut v = Vehicle::new(VehicleId::new(1), "Hawk");
        v.location = VehicleLocation::Landed { building: b };

        assert!(world.launch(&mut v, city, GridPos::new(1, 1, 0)));
        assert_eq!(
            world.flight(v.id),
            Some(Flight {
                city,
                tile: GridPos::new(1, 1, 0)
            })
        );
        assert!(world
            .city(city)
            .unwrap()
            .map
            .tile(GridPos::new(1, 1, 0))
            .unwrap()
            .has_vehicle());

        assert!(world.relocate(&mut v, GridPos::new(1, 1, 1).center()));
        assert_eq!(world.flight(v.id).unwrap().tile, GridPos::new(1, 1, 1));
        let map = &world.city(city).unwrap().map;
        assert!(!map.tile(GridPos::new(1, 1, 0)).unwrap().has_vehicle());
        assert!(map.tile(GridPos::new(1, 1, 1)).unwrap().has_vehicle());

        assert!(world.land(&mut v, b));
        assert_eq!(v.landed_in(), Some(b));
        assert!(world.flight(v.id).is_none());
        assert!(!world
            .city(city)
            .unwrap()
            .map
            .tile(GridPos::new(1, 1, 1))
            .unwrap()
            .has_vehicle());
    }

    #[test]
    fn test_relocate_off_map_is_rejected() {
        let (mut world, city) = world_with_city();
        let mut v = Vehicle::new(VehicleId::new(1), "Hawk");
        assert!(world.launch(&mut v, city, GridPos::new(7, 7, 3)));

        let outside = GridPos::new(8, 7, 3).center();
        assert!(!world.relocate(&mut v, outside));
        assert_eq!(v.airborne_tile(), Some((city, GridPos::new(7, 7, 3))));
    }

    #[test]
    fn test_double_launch_and_ground_landing_fail() {
        let (mut world, city) = world_with_city();
        let mut v = Vehicle::new(VehicleId::new(1), "Hawk");
        assert!(!world.land(&mut v, BuildingId::new(1)));
        assert!(world.launch(&mut v, city, GridPos::new(0, 0, 1)));
        assert!(!world.launch(&mut v, city, GridPos::new(0, 0, 2)));
    }
}
