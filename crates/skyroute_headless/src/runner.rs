//! Headless scenario runner implementation.

use std::io::Write;

use skyroute_core::data::ScenarioData;
use skyroute_core::simulation::Simulation;
use skyroute_core::vehicle::{Vehicle, VehicleLocation};

use crate::protocol::{Response, RunSummary, VehicleSummary};
use crate::scenario::{self, ScenarioError};

/// Headless runner configuration.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Maximum number of ticks to run.
    pub max_ticks: u64,
    /// Stop early once no vehicle has missions left.
    pub stop_when_idle: bool,
    /// Write a line for every tick that produced events.
    pub emit_events: bool,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            max_ticks: 600,
            stop_when_idle: false,
            emit_events: true,
        }
    }
}

/// Runs a scenario without any frontend, writing JSON lines.
pub struct HeadlessRunner {
    config: HeadlessConfig,
    name: String,
    sim: Simulation,
}

impl HeadlessRunner {
    /// Build a runner for a parsed scenario.
    pub fn new(data: &ScenarioData, config: HeadlessConfig) -> Result<Self, ScenarioError> {
        Ok(Self::from_simulation(data.name.clone(), scenario::build(data)?, config))
    }

    /// Wrap an already built simulation.
    pub fn from_simulation(name: impl Into<String>, sim: Simulation, config: HeadlessConfig) -> Self {
        Self {
            config,
            name: name.into(),
            sim,
        }
    }

    /// The simulation being run.
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    fn is_idle(&self) -> bool {
        self.sim.vehicles().all(|v| v.missions.is_empty())
    }

    /// Run until the tick limit (or until idle, if configured).
    ///
    /// Writes a ready line, one line per eventful tick and a final summary.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<RunSummary, ScenarioError> {
        write!(out, "{}", Response::ready(&self.name, self.sim.current_tick()).to_json_line())?;

        let start_tick = self.sim.current_tick();
        let mut launches = 0u32;
        let mut landings = 0u32;

        for _ in 0..self.config.max_ticks {
            if self.config.stop_when_idle && self.is_idle() {
                tracing::debug!(tick = self.sim.current_tick(), "All vehicles idle, stopping");
                break;
            }

            let tick_events = self.sim.tick();
            launches = launches.saturating_add(saturating_count(tick_events.launches()));
            landings = landings.saturating_add(saturating_count(tick_events.landings()));

            if self.config.emit_events && !tick_events.events.is_empty() {
                let line = Response::Tick {
                    tick: tick_events.tick,
                    events: tick_events.events,
                };
                write!(out, "{}", line.to_json_line())?;
            }
        }

        let summary = RunSummary {
            scenario: self.name.clone(),
            ticks_run: self.sim.current_tick() - start_tick,
            final_tick: self.sim.current_tick(),
            state_hash: self.sim.state_hash(),
            launches,
            landings,
            vehicles: self.sim.vehicles().map(summarize_vehicle).collect(),
        };
        write!(out, "{}", Response::Summary(summary.clone()).to_json_line())?;
        out.flush()?;

        tracing::info!(
            scenario = %self.name,
            ticks = summary.ticks_run,
            launches,
            landings,
            hash = summary.state_hash,
            "Run finished"
        );
        Ok(summary)
    }
}

/// Count an iterator, saturating at `u32::MAX`.
fn saturating_count<I: Iterator>(iter: I) -> u32 {
    iter.fold(0u32, |n, _| n.saturating_add(1))
}

fn describe_location(vehicle: &Vehicle) -> String {
    match vehicle.location {
        VehicleLocation::Landed { building } => format!("landed in {building}"),
        VehicleLocation::Flying { city, position } => {
            format!("flying in {city} at {}", position.tile())
        }
        VehicleLocation::PendingSpawn => "pending".to_string(),
    }
}

fn summarize_vehicle(vehicle: &Vehicle) -> VehicleSummary {
    VehicleSummary {
        id: vehicle.id.0,
        name: vehicle.name.clone(),
        location: describe_location(vehicle),
        missions: vehicle.missions.iter().map(ToString::to_string).collect(),
    }
}

/// Check a scenario builds and describe it without running it.
pub fn validate(data: &ScenarioData) -> Result<Response, ScenarioError> {
    scenario::build(data)?;
    Ok(Response::Valid {
        scenario: data.name.clone(),
        cities: data.cities.len(),
        vehicles: data.vehicles.len(),
        orders: data.orders.len(),
    })
}
