//! Vehicles and where they currently are.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::city::{BuildingId, CityId};
use crate::math::{fixed_serde, Fixed, GridPos, Vec3Fixed};
use crate::mission::MissionQueue;

/// Default flight speed in tiles per tick (0.5).
pub const DEFAULT_VEHICLE_SPEED: Fixed = Fixed::from_bits(1 << 31);

/// Unique identifier for vehicles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub u32);

impl VehicleId {
    /// Create a new vehicle ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vehicle#{}", self.0)
    }
}

/// Where a vehicle is. Exactly one of these holds at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VehicleLocation {
    /// Parked inside a building, not on the map.
    Landed {
        /// The building it is parked in.
        building: BuildingId,
    },
    /// On a city map.
    Flying {
        /// The city whose map holds the vehicle.
        city: CityId,
        /// Continuous position; the owning tile is `position.tile()`.
        position: Vec3Fixed,
    },
    /// Created but not yet placed anywhere.
    #[default]
    PendingSpawn,
}

/// A vehicle and its pending orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vehicle {
    /// Unique identifier.
    pub id: VehicleId,
    /// Display name.
    pub name: String,
    /// Current location.
    pub location: VehicleLocation,
    /// Flight speed in tiles per tick.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
    /// Waypoint the vehicle is currently flying to.
    pub goal: Option<Vec3Fixed>,
    /// Pending orders; the front one is active.
    pub missions: MissionQueue,
}

impl Vehicle {
    /// Create a vehicle that has not been placed yet.
    #[must_use]
    pub fn new(id: VehicleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            location: VehicleLocation::PendingSpawn,
            speed: DEFAULT_VEHICLE_SPEED,
            goal: None,
            missions: MissionQueue::new(),
        }
    }

    /// Set the flight speed.
    #[must_use]
    pub fn with_speed(mut self, speed: Fixed) -> Self {
        self.speed = speed;
        self
    }

    /// The building this vehicle is parked in, if grounded.
    #[must_use]
    pub fn landed_in(&self) -> Option<BuildingId> {
        match self.location {
            VehicleLocation::Landed { building } => Some(building),
            _ => None,
        }
    }

    /// Whether the vehicle is on a map.
    #[must_use]
    pub fn is_flying(&self) -> bool {
        matches!(self.location, VehicleLocation::Flying { .. })
    }

    /// City and owning tile while airborne.
    #[must_use]
    pub fn airborne_tile(&self) -> Option<(CityId, GridPos)> {
        match self.location {
            VehicleLocation::Flying { city, position } => Some((city, position.tile())),
            _ => None,
        }
    }

    /// Continuous position while airborne.
    #[must_use]
    pub fn position(&self) -> Option<Vec3Fixed> {
        match self.location {
            VehicleLocation::Flying { position, .. } => Some(position),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_vehicle_is_pending() {
        let v = Vehicle::new(VehicleId::new(1), "Hawk");
        assert_eq!(v.location, VehicleLocation::PendingSpawn);
        assert!(!v.is_flying());
        assert_eq!(v.landed_in(), None);
        assert_eq!(v.airborne_tile(), None);
        assert!(v.missions.is_empty());
        assert_eq!(v.speed, Fixed::from_num(0.5));
    }

    #[test]
    fn test_location_queries() {
        let mut v = Vehicle::new(VehicleId::new(2), "Kite");
        v.location = VehicleLocation::Landed {
            building: BuildingId::new(5),
        };
        assert_eq!(v.landed_in(), Some(BuildingId::new(5)));

        v.location = VehicleLocation::Flying {
            city: CityId::new(1),
            position: GridPos::new(3, 4, 2).center(),
        };
        assert!(v.is_flying());
        assert_eq!(
            v.airborne_tile(),
            Some((CityId::new(1), GridPos::new(3, 4, 2)))
        );
    }
}
