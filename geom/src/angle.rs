use std::{fmt, ops};

use serde::{Deserialize, Serialize};

use crate::{deserialize_f64, serialize_f64, trim_f64};

/// An angle, stored in degrees. Following math convention, it's measured counter-clockwise from
/// the positive X axis; there's no compass bearing anywhere in the engine.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Angle(
    #[serde(serialize_with = "serialize_f64", deserialize_with = "deserialize_f64")] f64,
);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    /// Creates an angle in radians.
    pub fn new_rads(rads: f64) -> Angle {
        Angle(trim_f64(rads.to_degrees()))
    }

    /// Creates an angle in degrees.
    pub fn degrees(degs: f64) -> Angle {
        Angle(trim_f64(degs))
    }

    /// The angle pointing the opposite direction.
    pub fn opposite(self) -> Angle {
        Angle::degrees(self.0 + 180.0)
    }

    /// Rotates this angle by some degrees.
    pub fn rotate_degs(self, degrees: f64) -> Angle {
        Angle::degrees(self.0 + degrees)
    }

    /// The inverse rotation; rotating by this angle undoes rotating by `self`.
    pub fn negated(self) -> Angle {
        Angle::degrees(-self.0)
    }

    /// Returns the angle in degrees, normalized to [0, 360).
    pub fn normalized_degrees(self) -> f64 {
        let d = self.0 % 360.0;
        if d < 0.0 {
            d + 360.0
        } else {
            d
        }
    }

    /// Returns the angle in radians, normalized to [0, 2pi).
    pub fn normalized_radians(self) -> f64 {
        self.normalized_degrees().to_radians()
    }

    /// True if the two angles are within some degrees of each other, considering wraparound.
    pub fn approx_eq(self, other: Angle, within_degrees: f64) -> bool {
        let diff = (self.normalized_degrees() - other.normalized_degrees()).abs();
        diff < within_degrees || (360.0 - diff) < within_degrees
    }

    /// True if the two angles describe the same line, pointing either direction.
    pub fn approx_parallel(self, other: Angle, within_degrees: f64) -> bool {
        self.approx_eq(other, within_degrees) || self.approx_eq(other.opposite(), within_degrees)
    }

    /// The unit direction vector of this angle.
    pub fn to_vec(self) -> (f64, f64) {
        let (sin, cos) = self.normalized_radians().sin_cos();
        (cos, sin)
    }
}

impl ops::Neg for Angle {
    type Output = Angle;

    fn neg(self) -> Angle {
        self.negated()
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Angle({} degrees)", self.normalized_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization() {
        assert_eq!(Angle::degrees(-90.0).normalized_degrees(), 270.0);
        assert_eq!(Angle::degrees(720.0).normalized_degrees(), 0.0);
        assert_eq!(Angle::degrees(45.0).opposite().normalized_degrees(), 225.0);
    }

    #[test]
    fn wraparound_comparison() {
        assert!(Angle::degrees(359.0).approx_eq(Angle::degrees(1.0), 5.0));
        assert!(!Angle::degrees(90.0).approx_eq(Angle::degrees(180.0), 5.0));
        assert!(Angle::degrees(10.0).approx_parallel(Angle::degrees(190.0), 1.0));
    }
}
