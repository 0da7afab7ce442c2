//! Cities and the buildings inside them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::GridPos;
use crate::tile::TileMap;

/// Unique identifier for cities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CityId(pub u32);

impl CityId {
    /// Create a new city ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "city#{}", self.0)
    }
}

/// Unique identifier for buildings, stable for the whole simulation.
///
/// Missions hold these instead of references; a handle whose building was
/// destroyed simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildingId(pub u32);

impl BuildingId {
    /// Create a new building ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "building#{}", self.0)
    }
}

/// A building vehicles can land in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Building {
    /// Unique identifier.
    pub id: BuildingId,
    /// Display name.
    pub name: String,
    /// Landing pad tiles, in the order they are tried for take-off.
    pub landing_pads: Vec<GridPos>,
}

impl Building {
    /// Whether `pos` is the tile directly above one of this building's pads.
    #[must_use]
    pub fn is_above_pad(&self, pos: GridPos) -> bool {
        self.landing_pads.iter().any(|pad| pad.above() == pos)
    }
}

/// A city: one tile map and the buildings standing on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct City {
    /// Unique identifier.
    pub id: CityId,
    /// Display name.
    pub name: String,
    /// The city's tile grid.
    pub map: TileMap,
    /// Buildings indexed by ID.
    pub buildings: BTreeMap<BuildingId, Building>,
}

impl City {
    /// Create an empty city.
    #[must_use]
    pub fn new(id: CityId, name: impl Into<String>, map: TileMap) -> Self {
        Self {
            id,
            name: name.into(),
            map,
            buildings: BTreeMap::new(),
        }
    }

    /// Check whether a building belongs to this city.
    #[must_use]
    pub fn contains_building(&self, id: BuildingId) -> bool {
        self.buildings.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_above_pad() {
        let building = Building {
            id: BuildingId::new(1),
            name: "Tower".into(),
            landing_pads: vec![GridPos::new(2, 2, 1), GridPos::new(3, 2, 1)],
        };
        assert!(building.is_above_pad(GridPos::new(3, 2, 2)));
        assert!(!building.is_above_pad(GridPos::new(3, 2, 1)));
        assert!(!building.is_above_pad(GridPos::new(4, 2, 2)));
    }

    #[test]
    fn test_id_display() {
        assert_eq!(BuildingId::new(3).to_string(), "building#3");
        assert_eq!(CityId::new(1).to_string(), "city#1");
    }
}
