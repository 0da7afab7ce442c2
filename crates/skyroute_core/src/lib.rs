//! # Skyroute Core
//!
//! Deterministic mission simulation for flying vehicles on a 3D tile grid.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math (uses fixed-point)
//!
//! This separation enables:
//! - Headless scenario runs
//! - Snapshots that resume bit-identically
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`mission`] - Vehicle missions and the mission queue
//! - [`scheduler`] - Per-tick mission activation, update and popping
//! - [`routing`] - Landing-pad route selection
//! - [`pathfinding`] - Budgeted A* over the tile grid
//! - [`entry_policy`] - Which tiles a flying vehicle may enter
//! - [`movement`] - Motion along mission waypoints
//! - [`world`] - Cities, buildings and airborne vehicle index
//! - [`simulation`] - Core simulation loop
//! - [`data`] - RON scenario definitions
//! - [`math`] - Fixed-point math and grid coordinates

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod city;
pub mod data;
pub mod entry_policy;
pub mod error;
pub mod math;
pub mod mission;
pub mod movement;
pub mod pathfinding;
pub mod routing;
pub mod scheduler;
pub mod simulation;
pub mod tile;
pub mod vehicle;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::city::{Building, BuildingId, City, CityId};
    pub use crate::entry_policy::{CanEnterTile, FlyingVehicleEntryPolicy};
    pub use crate::error::{GameError, Result};
    pub use crate::math::{Fixed, GridPos, Vec3Fixed};
    pub use crate::mission::{Activation, MissionKind, MissionQueue, VehicleMission};
    pub use crate::pathfinding::{AStarPathfinder, PathOracle};
    pub use crate::routing::{select_pad_route, RouteChoice};
    pub use crate::scheduler::{MissionContext, VehicleEvent};
    pub use crate::simulation::{Order, Simulation, SpawnPoint, TickEvents, VehicleSpawnParams};
    pub use crate::tile::{SceneryKind, Tile, TileMap, TileObject};
    pub use crate::vehicle::{Vehicle, VehicleId, VehicleLocation};
    pub use crate::world::World;
}
