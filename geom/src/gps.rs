use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Distance, Pt2D};

/// Longitude and latitude in degrees. Only used at the boundary of the engine, to map drawn
/// input into world space and results back out.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub longitude: f64,
    pub latitude: f64,
}

impl LonLat {
    pub fn new(longitude: f64, latitude: f64) -> LonLat {
        LonLat {
            longitude,
            latitude,
        }
    }

    /// The great-circle distance to another point.
    pub fn gps_dist(self, other: LonLat) -> Distance {
        let earth_radius_m = 6_371_000.0;
        let lon1 = self.longitude.to_radians();
        let lon2 = other.longitude.to_radians();
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();

        let delta_lat = lat2 - lat1;
        let delta_lon = lon2 - lon1;

        let a = (delta_lat / 2.0).sin().powi(2)
            + (delta_lon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        Distance::meters(earth_radius_m * c)
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LonLat({}, {})", self.longitude, self.latitude)
    }
}

/// A bounding box of longitude/latitude, anchoring the small-area planar approximation: world
/// space puts the northwest corner at the origin, with y growing southwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GPSBounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GPSBounds {
    pub fn new() -> GPSBounds {
        GPSBounds {
            min_lon: f64::MAX,
            min_lat: f64::MAX,
            max_lon: f64::MIN,
            max_lat: f64::MIN,
        }
    }

    pub fn from(pts: &[LonLat]) -> GPSBounds {
        let mut b = GPSBounds::new();
        for pt in pts {
            b.update(*pt);
        }
        b
    }

    pub fn update(&mut self, pt: LonLat) {
        self.min_lon = self.min_lon.min(pt.longitude);
        self.max_lon = self.max_lon.max(pt.longitude);
        self.min_lat = self.min_lat.min(pt.latitude);
        self.max_lat = self.max_lat.max(pt.latitude);
    }

    pub fn contains(&self, pt: LonLat) -> bool {
        pt.longitude >= self.min_lon
            && pt.longitude <= self.max_lon
            && pt.latitude >= self.min_lat
            && pt.latitude <= self.max_lat
    }

    /// The world-space point of the southeast corner; everything converted by these bounds lands
    /// in the rectangle from the origin to here.
    pub fn get_max_world_pt(&self) -> Pt2D {
        let width = LonLat::new(self.min_lon, self.max_lat)
            .gps_dist(LonLat::new(self.max_lon, self.max_lat));
        let height = LonLat::new(self.min_lon, self.max_lat)
            .gps_dist(LonLat::new(self.min_lon, self.min_lat));
        Pt2D::new(width.inner_meters(), height.inner_meters())
    }

    /// Convert GPS points to world space.
    pub fn convert(&self, pts: &[LonLat]) -> Vec<Pt2D> {
        let base = LonLat::new(self.min_lon, self.max_lat);
        pts.iter()
            .map(|gps| {
                let x = base.gps_dist(LonLat::new(gps.longitude, base.latitude));
                let y = base.gps_dist(LonLat::new(base.longitude, gps.latitude));
                Pt2D::new(x.inner_meters(), y.inner_meters())
            })
            .collect()
    }

    /// Convert world-space points back to GPS, proportionally within the bounds.
    pub fn convert_back(&self, pts: &[Pt2D]) -> Vec<LonLat> {
        let max_world = self.get_max_world_pt();
        pts.iter()
            .map(|pt| {
                let lon = self.min_lon
                    + (pt.x() / max_world.x().max(f64::EPSILON)) * (self.max_lon - self.min_lon);
                let lat = self.max_lat
                    - (pt.y() / max_world.y().max(f64::EPSILON)) * (self.max_lat - self.min_lat);
                LonLat::new(lon, lat)
            })
            .collect()
    }
}

impl Default for GPSBounds {
    fn default() -> Self {
        GPSBounds::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_near_equator() {
        let bounds = GPSBounds::from(&[LonLat::new(0.0, 0.0), LonLat::new(0.001, 0.001)]);
        let input = vec![LonLat::new(0.0005, 0.0005)];
        let world = bounds.convert(&input);
        // ~111m per 0.001 degrees at the equator
        assert!((world[0].x() - 55.6).abs() < 1.0);
        assert!((world[0].y() - 55.6).abs() < 1.0);

        let back = bounds.convert_back(&world);
        assert!((back[0].longitude - 0.0005).abs() < 1e-5);
        assert!((back[0].latitude - 0.0005).abs() < 1e-5);
    }
}
