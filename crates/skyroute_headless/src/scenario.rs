//! Scenario loading.
//!
//! Scenarios are RON files holding a [`ScenarioData`]: cities with their
//! scenery and buildings, the vehicles to spawn and their opening orders.

use std::path::Path;

use skyroute_core::data::ScenarioData;
use skyroute_core::error::GameError;
use skyroute_core::simulation::Simulation;
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read the scenario or write output.
    #[error("I/O error: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The scenario parsed but describes an impossible world.
    #[error("Invalid scenario: {0}")]
    Build(#[from] GameError),
}

/// Load a scenario from a RON file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<ScenarioData, ScenarioError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ScenarioError::FileNotFound(path.display().to_string()));
    }
    let contents = std::fs::read_to_string(path)?;
    from_ron_str(&contents)
}

/// Load from a RON string (useful for embedded scenarios).
pub fn from_ron_str(ron: &str) -> Result<ScenarioData, ScenarioError> {
    let scenario: ScenarioData = ron::from_str(ron)?;
    Ok(scenario)
}

/// Parse a scenario and build its simulation, reporting every failure
/// as a [`ScenarioError`].
pub fn build(data: &ScenarioData) -> Result<Simulation, ScenarioError> {
    Ok(Simulation::from_scenario(data)?)
}

/// The scenario bundled with the runner, used when no file is given.
pub const DOWNTOWN: &str = include_str!("../scenarios/downtown.ron");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_scenario_builds() {
        let data = from_ron_str(DOWNTOWN).unwrap();
        let sim = build(&data).unwrap();
        assert_eq!(sim.vehicles().count(), data.vehicles.len());
        assert!(sim.vehicles().all(|v| !v.missions.is_empty()));
    }

    #[test]
    fn test_missing_file() {
        let err = load("/definitely/not/here.ron").unwrap_err();
        assert!(matches!(err, ScenarioError::FileNotFound(_)));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = from_ron_str("ScenarioData(name: ").unwrap_err();
        assert!(matches!(err, ScenarioError::ParseError(_)));
    }

    #[test]
    fn test_build_error_is_reported() {
        let data = from_ron_str(
            r#"ScenarioData(
                name: "Broken",
                cities: [],
                vehicles: [VehicleData(name: "Hawk", start: Building("Nowhere"))],
            )"#,
        )
        .unwrap();
        assert!(matches!(build(&data), Err(ScenarioError::Build(_))));
    }

    #[test]
    fn test_flat_city_is_an_error_not_a_panic() {
        let data = from_ron_str(
            r#"ScenarioData(
                name: "Flat",
                cities: [CityData(name: "Flat", size: (x: 0, y: 4, z: 4))],
            )"#,
        )
        .unwrap();
        let err = build(&data).unwrap_err();
        assert!(matches!(err, ScenarioError::Build(GameError::InvalidSize { .. })));
        assert!(err.to_string().contains("Flat"));
    }
}
