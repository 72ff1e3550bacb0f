//! Planar geometry for the site planner. Everything is in a flat world space measured in meters;
//! boolean operations are delegated to the `geo` crate, while the line-centric operations the
//! planner needs (arc-length slicing, buffering to corridors, splitting by a polygon) live here.

use serde::{Deserialize, Deserializer, Serializer};

mod angle;
mod bounds;
mod circle;
mod distance;
mod gps;
mod line;
mod polygon;
mod polyline;
mod pt;
mod ring;

pub use crate::angle::Angle;
pub use crate::bounds::Bounds;
pub use crate::circle::Circle;
pub use crate::distance::Distance;
pub use crate::gps::{GPSBounds, LonLat};
pub use crate::line::{infinite_line_intersection, Line};
pub use crate::polygon::Polygon;
pub use crate::polyline::PolyLine;
pub use crate::pt::{HashablePt2D, Pt2D};
pub use crate::ring::Ring;

/// Reasonable lower bound before exact floating point comparisons become a problem.
pub const EPSILON_DIST: Distance = Distance::const_meters(0.0001);

/// Trim coordinates and distances to 4 decimal places (0.1mm). This makes equality checks and
/// deduplication behave.
pub fn trim_f64(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

pub(crate) fn serialize_f64<S: Serializer>(x: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(*x)
}

pub(crate) fn deserialize_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    f64::deserialize(d)
}
