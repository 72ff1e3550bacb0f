use std::collections::HashSet;
use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::{
    infinite_line_intersection, Distance, GPSBounds, Line, PolyLine, Polygon, Pt2D, EPSILON_DIST,
};

/// A simple closed ring of points. The first and last point are equal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    // first equals last
    pts: Vec<Pt2D>,
}

impl Ring {
    pub fn new(pts: Vec<Pt2D>) -> Result<Ring> {
        if pts.len() < 4 {
            bail!("Can't make a ring with < 4 points (counting the repeated first)");
        }
        if pts[0] != *pts.last().unwrap() {
            bail!("Can't make a ring with mismatching first/last points");
        }

        if pts.windows(2).any(|pair| pair[0].dist_to(pair[1]) <= EPSILON_DIST) {
            bail!("Ring has ~dupe adjacent pts");
        }

        let mut seen_pts = HashSet::new();
        for pt in pts.iter().skip(1) {
            if !seen_pts.insert(pt.to_hashable()) {
                bail!("Ring has repeat non-adjacent points");
            }
        }

        Ok(Ring { pts })
    }

    pub fn must_new(pts: Vec<Pt2D>) -> Ring {
        Ring::new(pts).unwrap()
    }

    pub fn points(&self) -> &Vec<Pt2D> {
        &self.pts
    }

    pub fn into_points(self) -> Vec<Pt2D> {
        self.pts
    }

    pub fn into_polygon(self) -> Polygon {
        Polygon::with_holes(self, Vec::new())
    }

    /// Walk the ring as an open polyline (the closing point repeated at the end).
    pub fn to_polyline(&self) -> PolyLine {
        PolyLine::unchecked_new(self.pts.clone())
    }

    /// The edges of the ring, skipping anything degenerate.
    pub fn edges(&self) -> impl Iterator<Item = Line> + '_ {
        self.pts
            .windows(2)
            .filter_map(|pair| Line::new(pair[0], pair[1]))
    }

    /// All of the points where a polyline crosses this ring, in no meaningful order.
    pub fn all_intersections(&self, other: &PolyLine) -> Vec<Pt2D> {
        let mut hits = Vec::new();
        for l1 in other.lines() {
            for l2 in self.edges() {
                if let Some(pt) = l1.intersection(&l2) {
                    if !hits.contains(&pt) {
                        hits.push(pt);
                    }
                }
            }
        }
        hits
    }

    /// Twice the signed area; positive means the ring is counter-clockwise.
    fn double_signed_area(&self) -> f64 {
        self.pts
            .windows(2)
            .map(|pair| pair[0].x() * pair[1].y() - pair[1].x() * pair[0].y())
            .sum()
    }

    /// Shrink the ring towards its interior by some distance, with mitered corners. Fails when
    /// the ring collapses instead of shrinking.
    pub fn inset(&self, distance: Distance) -> Result<Ring> {
        if distance <= Distance::ZERO {
            bail!("Ring::inset needs a positive distance, not {}", distance);
        }

        let orig_area = self.double_signed_area();
        if orig_area.abs() < 1e-6 {
            bail!("Can't inset a degenerate ring");
        }
        // For a counter-clockwise ring, the interior is to the left of the direction of travel.
        let inward = if orig_area > 0.0 { distance } else { -distance };

        let shifted: Vec<Line> = self
            .edges()
            .map(|l| l.shift_either_direction(inward))
            .collect();
        if shifted.len() < 3 {
            bail!("Too few edges to inset");
        }

        let mut pts = Vec::new();
        for i in 0..shifted.len() {
            let prev = &shifted[(i + shifted.len() - 1) % shifted.len()];
            let cur = &shifted[i];
            pts.push(infinite_line_intersection(prev, cur).unwrap_or_else(|| cur.pt1()));
        }
        let mut pts = Pt2D::approx_dedupe(pts, EPSILON_DIST);
        pts.push(pts[0]);
        let result = Ring::new(pts)?;

        // If the offset passed through the middle, the ring flips orientation or grows.
        let new_area = result.double_signed_area();
        if new_area.signum() != orig_area.signum() || new_area.abs() >= orig_area.abs() {
            bail!("Inset by {} collapsed the ring", distance);
        }
        Ok(result)
    }

    pub fn to_geojson(&self, gps: Option<&GPSBounds>) -> geojson::Geometry {
        let raw_pts = match gps {
            Some(gps) => gps.convert_back(&self.pts),
            None => self
                .pts
                .iter()
                .map(|pt| crate::LonLat::new(pt.x(), pt.y()))
                .collect(),
        };
        let pts = raw_pts
            .into_iter()
            .map(|pt| vec![pt.longitude, pt.latitude])
            .collect();
        geojson::Geometry::new(geojson::Value::Polygon(vec![pts]))
    }
}

impl fmt::Display for Ring {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Ring::new(vec![")?;
        for pt in &self.pts {
            writeln!(f, "  Pt2D::new({}, {}),", pt.x(), pt.y())?;
        }
        write!(f, "])")
    }
}

impl From<Ring> for geo::LineString {
    fn from(ring: Ring) -> Self {
        geo::LineString(ring.pts.into_iter().map(geo::Coordinate::from).collect())
    }
}

impl TryFrom<geo::LineString> for Ring {
    type Error = anyhow::Error;

    fn try_from(line_string: geo::LineString) -> Result<Ring> {
        let pts: Vec<Pt2D> = line_string.0.into_iter().map(Pt2D::from).collect();
        let mut pts = Pt2D::approx_dedupe(pts, EPSILON_DIST);
        // Boolean ops sometimes hand back unclosed rings.
        if pts.first() != pts.last() {
            pts.push(pts[0]);
        }
        Ring::new(pts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f64) -> Ring {
        Ring::must_new(vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(side, 0.0),
            Pt2D::new(side, side),
            Pt2D::new(0.0, side),
            Pt2D::new(0.0, 0.0),
        ])
    }

    #[test]
    fn validation() {
        assert!(Ring::new(vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(1.0, 0.0),
            Pt2D::new(1.0, 1.0),
        ])
        .is_err());
        assert!(Ring::new(vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(1.0, 0.0),
            Pt2D::new(1.0, 1.0),
            Pt2D::new(5.0, 5.0),
        ])
        .is_err());
    }

    #[test]
    fn inset_square() {
        let inner = square(10.0).inset(Distance::meters(2.0)).unwrap();
        let mut xs: Vec<f64> = inner.points().iter().map(|pt| pt.x()).collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(xs[0], 2.0);
        assert_eq!(*xs.last().unwrap(), 8.0);

        // Too aggressive; the 10m square vanishes
        assert!(square(10.0).inset(Distance::meters(6.0)).is_err());
    }

    #[test]
    fn inset_direction_is_orientation_independent() {
        let cw = Ring::must_new(vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(0.0, 10.0),
            Pt2D::new(10.0, 10.0),
            Pt2D::new(10.0, 0.0),
            Pt2D::new(0.0, 0.0),
        ]);
        let inner = cw.inset(Distance::meters(2.0)).unwrap();
        assert!(inner.points().iter().all(|pt| pt.x() >= 2.0 && pt.x() <= 8.0));
    }

    #[test]
    fn crossings() {
        let ring = square(10.0);
        let pl = PolyLine::must_new(vec![Pt2D::new(5.0, -5.0), Pt2D::new(5.0, 15.0)]);
        let mut hits = ring.all_intersections(&pl);
        hits.sort_by(|a, b| a.y().partial_cmp(&b.y()).unwrap());
        assert_eq!(hits, vec![Pt2D::new(5.0, 0.0), Pt2D::new(5.0, 10.0)]);
    }
}
