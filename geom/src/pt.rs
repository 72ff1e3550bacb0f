use std::fmt;

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use crate::{deserialize_f64, serialize_f64, trim_f64, Angle, Distance};

/// A point in 2D world space, measured in meters, with trimmed precision.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pt2D {
    #[serde(serialize_with = "serialize_f64", deserialize_with = "deserialize_f64")]
    x: f64,
    #[serde(serialize_with = "serialize_f64", deserialize_with = "deserialize_f64")]
    y: f64,
}

impl Pt2D {
    pub fn new(x: f64, y: f64) -> Pt2D {
        if !x.is_finite() || !y.is_finite() {
            panic!("Bad Pt2D {}, {}", x, y);
        }
        Pt2D {
            x: trim_f64(x),
            y: trim_f64(y),
        }
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    pub fn dist_to(self, to: Pt2D) -> Distance {
        Distance::meters(((self.x - to.x).powi(2) + (self.y - to.y).powi(2)).sqrt())
    }

    pub fn angle_to(self, to: Pt2D) -> Angle {
        Angle::new_rads((to.y - self.y).atan2(to.x - self.x))
    }

    /// The point at some distance along the direction of `theta`. A negative distance projects
    /// backwards.
    pub fn project_away(self, dist: Distance, theta: Angle) -> Pt2D {
        let (sin, cos) = theta.normalized_radians().sin_cos();
        Pt2D::new(
            self.x + dist.inner_meters() * cos,
            self.y + dist.inner_meters() * sin,
        )
    }

    /// Rotate this point around a pivot.
    pub fn rotate_around(self, angle: Angle, pivot: Pt2D) -> Pt2D {
        let (sin, cos) = angle.normalized_radians().sin_cos();
        let origin = Pt2D::new(self.x - pivot.x(), self.y - pivot.y());
        Pt2D::new(
            pivot.x() + origin.x() * cos - origin.y() * sin,
            pivot.y() + origin.y() * cos + origin.x() * sin,
        )
    }

    pub fn offset(self, dx: f64, dy: f64) -> Pt2D {
        Pt2D::new(self.x + dx, self.y + dy)
    }

    /// The average of some points. Panics on an empty slice.
    pub fn center(pts: &[Pt2D]) -> Pt2D {
        assert!(!pts.is_empty());
        let mut x = 0.0;
        let mut y = 0.0;
        for pt in pts {
            x += pt.x;
            y += pt.y;
        }
        let len = pts.len() as f64;
        Pt2D::new(x / len, y / len)
    }

    /// Squish down adjacent points closer than a threshold.
    pub fn approx_dedupe(pts: Vec<Pt2D>, threshold: Distance) -> Vec<Pt2D> {
        let mut result: Vec<Pt2D> = Vec::with_capacity(pts.len());
        for pt in pts {
            if result.is_empty() || result.last().unwrap().dist_to(pt) > threshold {
                result.push(pt);
            }
        }
        result
    }

    pub fn to_hashable(self) -> HashablePt2D {
        HashablePt2D {
            x_nan: NotNan::new(self.x).unwrap(),
            y_nan: NotNan::new(self.y).unwrap(),
        }
    }

    pub fn epsilon_eq(self, other: Pt2D) -> bool {
        self.dist_to(other) <= crate::EPSILON_DIST
    }
}

impl fmt::Display for Pt2D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Pt2D({}, {})", self.x, self.y)
    }
}

impl From<Pt2D> for geo::Coordinate {
    fn from(pt: Pt2D) -> Self {
        geo::Coordinate { x: pt.x, y: pt.y }
    }
}

impl From<Pt2D> for geo::Point {
    fn from(pt: Pt2D) -> Self {
        geo::Point::new(pt.x, pt.y)
    }
}

impl From<geo::Coordinate> for Pt2D {
    fn from(coord: geo::Coordinate) -> Self {
        Pt2D::new(coord.x, coord.y)
    }
}

impl From<geo::Point> for Pt2D {
    fn from(pt: geo::Point) -> Self {
        Pt2D::new(pt.x(), pt.y())
    }
}

/// Hashable, and so usable as a map key, but losing arithmetic.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct HashablePt2D {
    x_nan: NotNan<f64>,
    y_nan: NotNan<f64>,
}

impl HashablePt2D {
    pub fn to_pt2d(self) -> Pt2D {
        Pt2D::new(self.x_nan.into_inner(), self.y_nan.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_away_and_back() {
        let pt = Pt2D::new(10.0, 10.0);
        let there = pt.project_away(Distance::meters(5.0), Angle::degrees(90.0));
        assert_eq!(there, Pt2D::new(10.0, 15.0));
        assert_eq!(pt.angle_to(there).normalized_degrees(), 90.0);
        assert_eq!(pt.dist_to(there), Distance::meters(5.0));
    }

    #[test]
    fn rotation_preserves_distance() {
        let pivot = Pt2D::new(3.0, 4.0);
        let pt = Pt2D::new(10.0, 4.0);
        let rotated = pt.rotate_around(Angle::degrees(37.0), pivot);
        assert_eq!(pivot.dist_to(rotated), Distance::meters(7.0));
    }
}
