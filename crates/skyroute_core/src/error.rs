//! Error types for the mission simulation.
//!
//! Only setup-level operations (building the world, issuing orders,
//! snapshots) return these. Mission execution never surfaces an error:
//! failures are logged and the vehicle stalls instead.

use thiserror::Error;

use crate::city::{BuildingId, CityId};
use crate::math::GridPos;
use crate::vehicle::VehicleId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all simulation setup errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Unknown city identifier.
    #[error("City not found: {0}")]
    CityNotFound(CityId),

    /// Unknown building identifier.
    #[error("Building not found: {0}")]
    BuildingNotFound(BuildingId),

    /// Unknown vehicle identifier.
    #[error("Vehicle not found: {0}")]
    VehicleNotFound(VehicleId),

    /// A position lies outside the city map.
    #[error("Position {position} is outside the map of city {city}")]
    OutOfBounds {
        /// City whose map was addressed.
        city: CityId,
        /// Offending position.
        position: GridPos,
    },

    /// A city map that is empty or too large to index.
    #[error("Invalid map size {size} for city '{city}'")]
    InvalidSize {
        /// Name of the city.
        city: String,
        /// Requested size.
        size: GridPos,
    },

    /// A named entity referenced by scenario data does not exist.
    #[error("Unknown {kind} '{name}' referenced in scenario data")]
    UnknownReference {
        /// What kind of entity was referenced (city, building, vehicle).
        kind: &'static str,
        /// The name used in the data.
        name: String,
    },

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
