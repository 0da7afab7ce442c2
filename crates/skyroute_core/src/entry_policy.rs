//! Tile admissibility rules consumed by the pathfinder.

use crate::math::GridPos;
use crate::tile::{Tile, TileObject};

/// Decides whether a vehicle may move from one tile into another.
///
/// `from` is `None` when the vehicle is being spawned or launched into the
/// map. Implementations must be pure: the same tiles always give the same
/// answer within a tick.
pub trait CanEnterTile {
    /// Returns `true` if the move `from -> to` is admissible.
    fn can_enter_tile(&self, from: Option<&Tile>, to: Option<&Tile>) -> bool;
}

/// Entry rules for airborne vehicles.
///
/// A tile is enterable unless another vehicle owns it or it holds scenery
/// that is not a landing pad.
///
/// Known gaps:
/// - diagonal moves may clip past scenery on the corner-adjacent tiles;
/// - only the destination tile's own occupants are checked, so vehicles
///   larger than one tile are treated as single-tile.
///
/// Rules covering either gap belong in a separate [`CanEnterTile`]
/// implementation wrapping this one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlyingVehicleEntryPolicy;

impl CanEnterTile for FlyingVehicleEntryPolicy {
    fn can_enter_tile(&self, from: Option<&Tile>, to: Option<&Tile>) -> bool {
        let from_pos = from.map_or(GridPos::ZERO, |t| t.position);
        let Some(to) = to else {
            tracing::error!(op = "can_enter_tile", "No destination tile supplied");
            return false;
        };
        if from_pos == to.position {
            tracing::error!(
                op = "can_enter_tile",
                position = %to.position,
                "Origin and destination are the same tile"
            );
            return false;
        }

        for object in &to.occupants {
            match object {
                TileObject::Vehicle(_) => return false,
                TileObject::Scenery(kind) if !kind.is_landing_pad => return false,
                TileObject::Scenery(_) | TileObject::Doodad | TileObject::Projectile => {}
            }
        }
        true
    }
}
