//! Data structures for scenario configuration.
//!
//! This module contains pure data structures that describe cities,
//! buildings, vehicles and their initial orders. All structs are designed
//! to be deserialized from RON files and refer to each other by name.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by `skyroute_headless`.

mod city_data;
mod scenario_data;
mod vehicle_data;

pub use city_data::{BuildingData, CityData, SceneryData, SceneryKindData};
pub use scenario_data::{OrderData, OrderKindData, ScenarioData};
pub use vehicle_data::{StartData, VehicleData};
