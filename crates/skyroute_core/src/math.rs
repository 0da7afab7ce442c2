//! Fixed-point math and grid coordinates for deterministic simulation.
//!
//! Tile coordinates are integers ([`GridPos`]); continuous vehicle
//! positions, route costs and distances use fixed-point arithmetic so
//! that every client computes bit-identical results.

use std::fmt;

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Half a tile, used to address tile centres.
pub const HALF: Fixed = Fixed::from_bits(1 << 31);

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Integer 3D tile coordinate. `z` grows upwards.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct GridPos {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate (altitude).
    pub z: i32,
}

impl GridPos {
    /// Create a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The origin tile.
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// The tile directly above this one.
    #[must_use]
    pub const fn above(self) -> Self {
        Self::new(self.x, self.y, self.z + 1)
    }

    /// The tile directly below this one.
    #[must_use]
    pub const fn below(self) -> Self {
        Self::new(self.x, self.y, self.z - 1)
    }

    /// Offset this position by a delta.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Continuous position of the tile centre.
    #[must_use]
    pub fn center(self) -> Vec3Fixed {
        Vec3Fixed::from_grid(self) + Vec3Fixed::new(HALF, HALF, HALF)
    }

    /// Straight-line distance to another tile.
    #[must_use]
    pub fn distance(self, other: Self) -> Fixed {
        Vec3Fixed::from_grid(self).distance(Vec3Fixed::from_grid(other))
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{},{},{}}}", self.x, self.y, self.z)
    }
}

/// Fixed-point 3D vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec3Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
    /// Z coordinate.
    #[serde(with = "fixed_serde")]
    pub z: Fixed,
}

impl Vec3Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed, z: Fixed) -> Self {
        Self { x, y, z }
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
        z: Fixed::ZERO,
    };

    /// Corner of a tile as a continuous position.
    #[must_use]
    pub fn from_grid(pos: GridPos) -> Self {
        Self::new(
            Fixed::from_num(pos.x),
            Fixed::from_num(pos.y),
            Fixed::from_num(pos.z),
        )
    }

    /// The tile containing this position.
    #[must_use]
    pub fn tile(self) -> GridPos {
        // Integer conversion discards fractional bits, i.e. floors.
        GridPos::new(
            self.x.to_num::<i32>(),
            self.y.to_num::<i32>(),
            self.z.to_num::<i32>(),
        )
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> Fixed {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Calculate squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let d = self - other;
        d.dot(d)
    }

    /// Euclidean distance.
    #[must_use]
    pub fn distance(self, other: Self) -> Fixed {
        fixed_sqrt(self.distance_squared(other))
    }

    /// Scale every component.
    #[must_use]
    pub fn scale(self, factor: Fixed) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

/// Square root of a fixed-point number, rounded down to the last bit.
///
/// Works on the raw bits with integer Newton iteration, so perfect squares
/// come out exact and results are identical on every platform.
#[must_use]
pub fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    // sqrt(bits / 2^32) * 2^32 == sqrt(bits * 2^32)
    let n = u128::from(value.to_bits().unsigned_abs()) << Fixed::FRAC_NBITS;
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }

    Fixed::from_bits(i64::try_from(x).unwrap_or(i64::MAX))
}

impl std::ops::Add for Vec3Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vec3Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl fmt::Display for Vec3Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{},{},{}}}", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(n: f64) -> Fixed {
        Fixed::from_num(n)
    }

    #[test]
    fn test_center_adds_half_tile() {
        let c = GridPos::new(2, 3, 4).center();
        assert_eq!(c, Vec3Fixed::new(fixed(2.5), fixed(3.5), fixed(4.5)));
        assert_eq!(HALF, fixed(0.5));
    }

    #[test]
    fn test_tile_floors_position() {
        let p = Vec3Fixed::new(fixed(2.99), fixed(0.0), fixed(7.5));
        assert_eq!(p.tile(), GridPos::new(2, 0, 7));
        assert_eq!(GridPos::new(5, 6, 1).center().tile(), GridPos::new(5, 6, 1));
    }

    #[test]
    fn test_grid_distance() {
        let a = GridPos::new(0, 0, 0);
        let b = GridPos::new(3, 4, 0);
        let d = a.distance(b);
        assert!((d - fixed(5.0)).abs() < fixed(0.0001));

        let diag = GridPos::new(1, 1, 1).distance(GridPos::ZERO);
        assert!((diag - fixed(1.732_050_8)).abs() < fixed(0.0001));
    }

    #[test]
    fn test_sqrt_of_zero_and_small() {
        assert_eq!(fixed_sqrt(Fixed::ZERO), Fixed::ZERO);
        assert_eq!(fixed_sqrt(fixed(0.25)), fixed(0.5));
        assert_eq!(fixed_sqrt(Fixed::ONE), Fixed::ONE);
        assert_eq!(fixed_sqrt(fixed(9.0)), fixed(3.0));
    }

    #[test]
    fn test_above_below_roundtrip() {
        let p = GridPos::new(4, 4, 2);
        assert_eq!(p.above(), GridPos::new(4, 4, 3));
        assert_eq!(p.above().below(), p);
    }

    #[test]
    fn test_display() {
        assert_eq!(GridPos::new(1, -2, 3).to_string(), "{1,-2,3}");
    }
}
