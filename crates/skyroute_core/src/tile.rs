//! Three-dimensional tile grid and tile occupancy.
//!
//! Every tile keeps the set of objects that currently own it. The entry
//! policy inspects these occupants to decide whether a vehicle may move in.

use serde::{Deserialize, Serialize};

use crate::math::GridPos;
use crate::vehicle::VehicleId;

/// Kind of a piece of scenery (buildings' blocks, roads, pads).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SceneryKind {
    /// Whether vehicles may enter this tile to take off or land.
    pub is_landing_pad: bool,
}

impl SceneryKind {
    /// Solid scenery that blocks flight.
    pub const SOLID: Self = Self {
        is_landing_pad: false,
    };

    /// A landing pad.
    pub const LANDING_PAD: Self = Self {
        is_landing_pad: true,
    };
}

/// An object owning (occupying) a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileObject {
    /// A vehicle.
    Vehicle(VehicleId),
    /// Static scenery.
    Scenery(SceneryKind),
    /// Visual effect with no physical presence.
    Doodad,
    /// Projectile in flight.
    Projectile,
}

/// A single grid tile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// Grid position of this tile.
    pub position: GridPos,
    /// Objects currently owning this tile.
    pub occupants: Vec<TileObject>,
}

impl Tile {
    /// Create an empty tile.
    #[must_use]
    pub fn new(position: GridPos) -> Self {
        Self {
            position,
            occupants: Vec::new(),
        }
    }

    /// Whether a vehicle currently owns this tile.
    #[must_use]
    pub fn has_vehicle(&self) -> bool {
        self.occupants
            .iter()
            .any(|o| matches!(o, TileObject::Vehicle(_)))
    }
}

/// Dense 3D tile grid for one city.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileMap {
    /// Map extent along each axis; valid positions are `0..size`.
    size: GridPos,
    /// Tiles stored x-fastest, then y, then z.
    tiles: Vec<Tile>,
}

impl TileMap {
    /// Whether `size` is positive on every axis with a tile count that fits in `i32`.
    #[must_use]
    pub fn is_valid_size(size: GridPos) -> bool {
        size.x > 0
            && size.y > 0
            && size.z > 0
            && size
                .x
                .checked_mul(size.y)
                .and_then(|xy| xy.checked_mul(size.z))
                .is_some()
    }

    /// Create an empty map of the given size.
    ///
    /// # Panics
    ///
    /// Panics if [`TileMap::is_valid_size`] rejects `size`.
    #[must_use]
    pub fn new(size: GridPos) -> Self {
        assert!(
            Self::is_valid_size(size),
            "TileMap dimensions must be positive and indexable"
        );

        let mut tiles = Vec::with_capacity((size.x * size.y * size.z) as usize);
        for z in 0..size.z {
            for y in 0..size.y {
                for x in 0..size.x {
                    tiles.push(Tile::new(GridPos::new(x, y, z)));
                }
            }
        }
        Self { size, tiles }
    }

    /// Map extent.
    #[must_use]
    pub const fn size(&self) -> GridPos {
        self.size
    }

    /// Check if a position lies within the map.
    #[must_use]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.z >= 0
            && pos.x < self.size.x
            && pos.y < self.size.y
            && pos.z < self.size.z
    }

    #[inline]
    fn index(&self, pos: GridPos) -> usize {
        ((pos.z * self.size.y + pos.y) * self.size.x + pos.x) as usize
    }

    /// Get the tile at a position.
    /// Returns `None` if out of bounds.
    #[must_use]
    pub fn tile(&self, pos: GridPos) -> Option<&Tile> {
        if self.in_bounds(pos) {
            Some(&self.tiles[self.index(pos)])
        } else {
            None
        }
    }

    /// Get the tile at a position mutably.
    pub fn tile_mut(&mut self, pos: GridPos) -> Option<&mut Tile> {
        if self.in_bounds(pos) {
            let index = self.index(pos);
            Some(&mut self.tiles[index])
        } else {
            None
        }
    }

    /// Add an occupant to a tile.
    /// Returns `false` if out of bounds.
    pub fn add_occupant(&mut self, pos: GridPos, object: TileObject) -> bool {
        match self.tile_mut(pos) {
            Some(tile) => {
                tile.occupants.push(object);
                true
            }
            None => false,
        }
    }

    /// Remove one matching occupant from a tile.
    /// Returns `true` if an occupant was removed.
    pub fn remove_occupant(&mut self, pos: GridPos, object: TileObject) -> bool {
        let Some(tile) = self.tile_mut(pos) else {
            return false;
        };
        if let Some(index) = tile.occupants.iter().position(|o| *o == object) {
            tile.occupants.remove(index);
            true
        } else {
            false
        }
    }

    /// Iterate over all tiles.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }
}
