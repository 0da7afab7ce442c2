//! Vehicle data structures for data-driven scenarios.

use serde::{Deserialize, Serialize};

use crate::math::{Fixed, GridPos};

/// Where a vehicle starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartData {
    /// Parked in the named building.
    Building(String),
    /// Flying over the named city.
    Airborne {
        /// City name.
        city: String,
        /// Starting tile.
        tile: GridPos,
    },
    /// Not placed anywhere.
    Pending,
}

/// Data-driven vehicle definition.
///
/// # Example RON
///
/// ```ron
/// VehicleData(
///     name: "Hawk",
///     start: Building("Depot"),
///     speed: Some(4294967296),  // Fixed-point for 1.0
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleData {
    /// Unique vehicle name, used by orders.
    pub name: String,
    /// Where the vehicle starts.
    pub start: StartData,
    /// Flight speed in tiles per tick; default speed when omitted.
    #[serde(default, with = "option_fixed_serde")]
    pub speed: Option<Fixed>,
}

/// Serde support for optional fixed-point numbers.
mod option_fixed_serde {
    use crate::math::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize an optional fixed-point number as optional raw bits.
    pub fn serialize<S>(value: &Option<Fixed>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.map(Fixed::to_bits).serialize(serializer)
    }

    /// Deserialize an optional fixed-point number from optional raw bits.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<i64>::deserialize(deserializer)?;
        Ok(opt.map(Fixed::from_bits))
    }
}
