//! Headless scenario runner for CI and scripted testing.
//!
//! Loads a RON scenario, runs the mission simulation for a number of ticks
//! and reports what happened as JSON lines:
//!
//! - **stdout**: one [`protocol::Response`] per line
//! - **stderr**: logs (human-readable)
//!
//! # Example
//!
//! ```bash
//! # Run the bundled scenario
//! cargo run -p skyroute_headless -- run
//!
//! # Run a scenario file until every vehicle is idle
//! cargo run -p skyroute_headless -- run --scenario scenarios/downtown.ron --until-idle
//!
//! # Check a scenario without running it
//! cargo run -p skyroute_headless -- validate --scenario scenarios/downtown.ron
//! ```

pub mod protocol;
pub mod runner;
pub mod scenario;

pub use protocol::{Response, RunSummary, VehicleSummary};
pub use runner::{HeadlessConfig, HeadlessRunner};
pub use scenario::ScenarioError;
