//! JSON-lines output of the headless runner.
//!
//! Every line on stdout is one [`Response`] object; logs go to stderr.
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","scenario":"Downtown","tick":0}
//! <- {"type":"tick","tick":1,"events":[{"Launched":{"vehicle":1,"building":1,"pad":{"x":3,"y":4,"z":0}}}]}
//! <- {"type":"tick","tick":58,"events":[{"Landed":{"vehicle":1,"building":2}}]}
//! <- {"type":"summary","scenario":"Downtown","ticks_run":600,...}
//! ```

use serde::{Deserialize, Serialize};
use skyroute_core::scheduler::VehicleEvent;

/// Where a vehicle ended up, in display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSummary {
    /// Vehicle ID.
    pub id: u32,
    /// Vehicle name.
    pub name: String,
    /// Current location, e.g. `landed in building#2`.
    pub location: String,
    /// Pending missions, front first.
    pub missions: Vec<String>,
}

/// Totals for a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Scenario name.
    pub scenario: String,
    /// Ticks advanced by this run.
    pub ticks_run: u64,
    /// Simulation tick after the run.
    pub final_tick: u64,
    /// State hash after the run.
    pub state_hash: u64,
    /// Launches seen during the run.
    pub launches: u32,
    /// Landings seen during the run.
    pub landings: u32,
    /// Per-vehicle end state, in ID order.
    pub vehicles: Vec<VehicleSummary>,
}

/// Lines written by the headless runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Scenario loaded; ticking starts next.
    Ready {
        version: String,
        scenario: String,
        tick: u64,
    },

    /// Events from one tick. Quiet ticks are not written.
    Tick {
        tick: u64,
        events: Vec<VehicleEvent>,
    },

    /// Scenario validated without running it.
    Valid {
        scenario: String,
        cities: usize,
        vehicles: usize,
        orders: usize,
    },

    /// Run finished.
    Summary(RunSummary),

    /// Something went wrong.
    Error { message: String },
}

impl Response {
    /// Create a ready response.
    pub fn ready(scenario: &str, tick: u64) -> Self {
        Self::Ready {
            version: "1.0".to_string(),
            scenario: scenario.to_string(),
            tick,
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }

    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
