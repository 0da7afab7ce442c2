//! City data structures for data-driven maps.

use serde::{Deserialize, Serialize};

use crate::math::GridPos;
use crate::tile::SceneryKind;

/// Kind of scenery placed on a tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneryKindData {
    /// Impassable to flying vehicles.
    #[default]
    Solid,
    /// A landing pad not owned by any building.
    LandingPad,
}

impl From<SceneryKindData> for SceneryKind {
    fn from(kind: SceneryKindData) -> Self {
        match kind {
            SceneryKindData::Solid => Self::SOLID,
            SceneryKindData::LandingPad => Self::LANDING_PAD,
        }
    }
}

/// A run of scenery tiles.
///
/// Fills the box from `from` to `to` inclusive; `to` defaults to `from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneryData {
    /// One corner of the box.
    pub from: GridPos,
    /// Opposite corner of the box.
    #[serde(default)]
    pub to: Option<GridPos>,
    /// What is placed there.
    #[serde(default)]
    pub kind: SceneryKindData,
}

impl SceneryData {
    /// Every tile covered, in z, y, x order.
    #[must_use]
    pub fn tiles(&self) -> Vec<GridPos> {
        let to = self.to.unwrap_or(self.from);
        let (x0, x1) = (self.from.x.min(to.x), self.from.x.max(to.x));
        let (y0, y1) = (self.from.y.min(to.y), self.from.y.max(to.y));
        let (z0, z1) = (self.from.z.min(to.z), self.from.z.max(to.z));

        let mut out = Vec::new();
        for z in z0..=z1 {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    out.push(GridPos::new(x, y, z));
                }
            }
        }
        out
    }
}

/// A building vehicles can land in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingData {
    /// Unique building name, used by vehicles and orders.
    pub name: String,
    /// Landing pad tiles, tried in this order on take-off.
    pub landing_pads: Vec<GridPos>,
}

/// Data-driven city definition.
///
/// # Example RON
///
/// ```ron
/// CityData(
///     name: "Metro",
///     size: (x: 32, y: 32, z: 6),
///     scenery: [
///         SceneryData(from: (x: 10, y: 0, z: 0), to: Some((x: 10, y: 31, z: 2))),
///     ],
///     buildings: [
///         BuildingData(name: "Depot", landing_pads: [(x: 2, y: 2, z: 0)]),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityData {
    /// Unique city name.
    pub name: String,
    /// Map dimensions in tiles.
    pub size: GridPos,
    /// Scenery placed before buildings.
    #[serde(default)]
    pub scenery: Vec<SceneryData>,
    /// Buildings in this city.
    #[serde(default)]
    pub buildings: Vec<BuildingData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenery_box_tiles() {
        let data = SceneryData {
            from: GridPos::new(3, 1, 0),
            to: Some(GridPos::new(2, 2, 0)),
            kind: SceneryKindData::Solid,
        };
        assert_eq!(
            data.tiles(),
            vec![
                GridPos::new(2, 1, 0),
                GridPos::new(3, 1, 0),
                GridPos::new(2, 2, 0),
                GridPos::new(3, 2, 0),
            ]
        );
    }

    #[test]
    fn test_city_data_parses_with_defaults() {
        let ron_str = r#"
            CityData(
                name: "Metro",
                size: (x: 8, y: 8, z: 4),
                scenery: [SceneryData(from: (x: 1, y: 1, z: 0))],
            )
        "#;
        let city: CityData = ron::from_str(ron_str).unwrap();
        assert_eq!(city.size, GridPos::new(8, 8, 4));
        assert!(city.buildings.is_empty());
        assert_eq!(city.scenery[0].kind, SceneryKindData::Solid);
        assert_eq!(city.scenery[0].tiles(), vec![GridPos::new(1, 1, 0)]);
        assert_eq!(SceneryKind::from(SceneryKindData::LandingPad), SceneryKind::LANDING_PAD);
    }
}
