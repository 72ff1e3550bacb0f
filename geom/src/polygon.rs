use std::fmt;

use anyhow::{bail, Result};
use geo::{Area, BooleanOps, Centroid, Contains, Intersects};
use serde::{Deserialize, Serialize};

use crate::{Angle, Bounds, Distance, GPSBounds, LonLat, PolyLine, Pt2D, Ring};

/// A polygon: one outer ring and zero or more inner rings (holes).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    // The first ring is the outer one.
    rings: Vec<Ring>,
}

impl Polygon {
    pub fn with_holes(outer: Ring, mut inner: Vec<Ring>) -> Polygon {
        inner.insert(0, outer);
        Polygon { rings: inner }
    }

    pub fn from_rings(rings: Vec<Ring>) -> Polygon {
        assert!(!rings.is_empty());
        Polygon { rings }
    }

    /// Build from GeoJSON-style rings of [x, y] coordinate pairs, already in world space.
    pub fn from_geojson(raw: &[Vec<Vec<f64>>]) -> Result<Polygon> {
        let mut rings = Vec::new();
        for pts in raw {
            let transformed: Vec<Pt2D> =
                pts.iter().map(|pair| Pt2D::new(pair[0], pair[1])).collect();
            rings.push(Ring::new(transformed)?);
        }
        if rings.is_empty() {
            bail!("Empty list of rings");
        }
        Ok(Polygon::from_rings(rings))
    }

    /// Extract all polygons from raw bytes representing a GeoJSON file with geometry in
    /// longitude/latitude, mapping everything into world space. Only the first ring of
    /// multipolygons is used.
    pub fn from_geojson_bytes(raw_bytes: &[u8], gps_bounds: &GPSBounds) -> Result<Vec<Polygon>> {
        let raw_string = std::str::from_utf8(raw_bytes)?;
        let geojson = raw_string.parse::<geojson::GeoJson>()?;
        let features = match geojson {
            geojson::GeoJson::Feature(feature) => vec![feature],
            geojson::GeoJson::FeatureCollection(collection) => collection.features,
            _ => bail!("Unexpected geojson: {:?}", geojson),
        };

        let mut results = Vec::new();
        for feature in features {
            if let Some(geom) = &feature.geometry {
                let raw_rings = match &geom.value {
                    geojson::Value::Polygon(rings) => rings,
                    // If there are multiple, just use the first
                    geojson::Value::MultiPolygon(polygons) => &polygons[0],
                    _ => {
                        continue;
                    }
                };
                let gps_pts: Vec<LonLat> = raw_rings[0]
                    .iter()
                    .map(|pt| LonLat::new(pt[0], pt[1]))
                    .collect();
                let pts = gps_bounds.convert(&gps_pts);
                if let Ok(ring) = Ring::new(pts) {
                    results.push(ring.into_polygon());
                }
            }
        }
        Ok(results)
    }

    pub fn outer_ring(&self) -> &Ring {
        &self.rings[0]
    }

    /// The points of the outer ring.
    pub fn points(&self) -> &Vec<Pt2D> {
        self.rings[0].points()
    }

    /// The center of mass of the polygon.
    pub fn centroid(&self) -> Pt2D {
        match self.to_geo().centroid() {
            Some(pt) => Pt2D::from(pt),
            // Degenerate, but fall back to the vertex average rather than panicking.
            None => Pt2D::center(&self.points()[1..]),
        }
    }

    /// Does this polygon contain the point in its interior?
    pub fn contains_pt(&self, pt: Pt2D) -> bool {
        self.to_geo().contains(&geo::Point::from(pt))
    }

    /// Is the other polygon entirely within this one?
    pub fn contains_polygon(&self, other: &Polygon) -> bool {
        self.to_geo().contains(&other.to_geo())
    }

    /// Do the two polygons intersect at all?
    pub fn intersects(&self, other: &Polygon) -> bool {
        self.to_geo().intersects(&other.to_geo())
    }

    /// Does this polygon intersect the polyline?
    pub fn intersects_polyline(&self, pl: &PolyLine) -> bool {
        self.to_geo().intersects(&pl.to_geo())
    }

    /// Area in m^2.
    pub fn area(&self) -> f64 {
        // Don't use signed_area, since we may work with polygons of either orientation
        self.to_geo().unsigned_area()
    }

    pub fn get_bounds(&self) -> Bounds {
        Bounds::from(self.points())
    }

    fn transform<F: Fn(Pt2D) -> Pt2D>(&self, f: F) -> Polygon {
        Polygon {
            rings: self
                .rings
                .iter()
                .map(|ring| Ring::must_new(ring.points().iter().map(|pt| f(*pt)).collect()))
                .collect(),
        }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Polygon {
        self.transform(|pt| pt.offset(dx, dy))
    }

    /// Rotate the whole polygon around a pivot point.
    pub fn rotate_around(&self, angle: Angle, pivot: Pt2D) -> Polygon {
        self.transform(|pt| pt.rotate_around(angle, pivot))
    }

    /// An axis-aligned rectangle of the given dimensions, centered on a point.
    pub fn rectangle_centered(center: Pt2D, width: Distance, height: Distance) -> Polygon {
        let w = width.inner_meters() / 2.0;
        let h = height.inner_meters() / 2.0;
        Ring::must_new(vec![
            Pt2D::new(center.x() - w, center.y() - h),
            Pt2D::new(center.x() + w, center.y() - h),
            Pt2D::new(center.x() + w, center.y() + h),
            Pt2D::new(center.x() - w, center.y() + h),
            Pt2D::new(center.x() - w, center.y() - h),
        ])
        .into_polygon()
    }

    /// Union all of the polygons into one set of disjoint polygons. Fails on an empty input or
    /// when the merged result has no valid rings left.
    pub fn union_all(mut list: Vec<Polygon>) -> Result<Vec<Polygon>> {
        if list.is_empty() {
            bail!("Can't union_all an empty list");
        }
        let mut result = geo::MultiPolygon(vec![list.pop().unwrap().to_geo()]);
        for p in list {
            result = result.union(&geo::MultiPolygon(vec![p.to_geo()]));
        }
        let merged = from_multi(result);
        if merged.is_empty() {
            bail!("union_all dissolved every ring");
        }
        Ok(merged)
    }

    /// The overlapping portion of two polygons; possibly empty, possibly several pieces.
    pub fn intersection(&self, other: &Polygon) -> Vec<Polygon> {
        from_multi(self.to_geo().intersection(&other.to_geo()))
    }

    /// This polygon minus the other; possibly empty, possibly several pieces.
    pub fn difference(&self, other: &Polygon) -> Vec<Polygon> {
        from_multi(self.to_geo().difference(&other.to_geo()))
    }

    /// Shrink the polygon towards its interior by some distance. Holes are dropped; this is only
    /// meant for simple boundaries. Fails when the polygon collapses instead of shrinking.
    pub fn inset(&self, distance: Distance) -> Result<Polygon> {
        Ok(self.outer_ring().inset(distance)?.into_polygon())
    }

    /// Cut a polyline into pieces at every crossing of this polygon's rings. The pieces cover the
    /// whole input, alternating between inside and outside the polygon.
    pub fn split_polyline(&self, pl: &PolyLine) -> Vec<PolyLine> {
        let mut cuts: Vec<Distance> = Vec::new();
        for ring in &self.rings {
            for pt in ring.all_intersections(pl) {
                if let Some((dist, _)) = pl.dist_along_of_point(pt) {
                    cuts.push(dist);
                }
            }
        }
        if cuts.is_empty() {
            return vec![pl.clone()];
        }
        cuts.push(Distance::ZERO);
        cuts.push(pl.length());
        cuts.sort();
        cuts.dedup_by(|a, b| (*a - *b).abs() < Distance::const_meters(0.01));

        let mut pieces = Vec::new();
        for pair in cuts.windows(2) {
            if let Ok(piece) = pl.maybe_exact_slice(pair[0], pair[1]) {
                pieces.push(piece);
            }
        }
        pieces
    }

    pub fn to_geo(&self) -> geo::Polygon {
        let mut interiors: Vec<geo::LineString> =
            self.rings.iter().map(|ring| ring.clone().into()).collect();
        let exterior = interiors.remove(0);
        geo::Polygon::new(exterior, interiors)
    }

    pub fn to_geojson(&self, gps: Option<&GPSBounds>) -> geojson::Geometry {
        self.rings[0].to_geojson(gps)
    }
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Polygon with {} rings, outer ring of {} points",
            self.rings.len(),
            self.rings[0].points().len()
        )
    }
}

impl TryFrom<geo::Polygon> for Polygon {
    type Error = anyhow::Error;

    fn try_from(poly: geo::Polygon) -> Result<Polygon> {
        let (exterior, interiors) = poly.into_inner();
        let outer = Ring::try_from(exterior)?;
        // A hole that dissolves into nothing doesn't invalidate the polygon.
        let inner: Vec<Ring> = interiors
            .into_iter()
            .filter_map(|ls| Ring::try_from(ls).ok())
            .collect();
        Ok(Polygon::with_holes(outer, inner))
    }
}

fn from_multi(multi: geo::MultiPolygon) -> Vec<Polygon> {
    // Boolean ops can leave slivers that don't survive the Ring invariants; drop those pieces.
    multi
        .into_iter()
        .filter_map(|p| Polygon::try_from(p).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x1: f64, y1: f64, x2: f64, y2: f64) -> Polygon {
        Ring::must_new(vec![
            Pt2D::new(x1, y1),
            Pt2D::new(x2, y1),
            Pt2D::new(x2, y2),
            Pt2D::new(x1, y2),
            Pt2D::new(x1, y1),
        ])
        .into_polygon()
    }

    #[test]
    fn boolean_ops() {
        let a = square(0.0, 0.0, 10.0, 10.0);
        let b = square(5.0, 0.0, 15.0, 10.0);

        let merged = Polygon::union_all(vec![a.clone(), b.clone()]).unwrap();
        assert_eq!(merged.len(), 1);
        assert!((merged[0].area() - 150.0).abs() < 0.1);

        let overlap = a.intersection(&b);
        assert_eq!(overlap.len(), 1);
        assert!((overlap[0].area() - 50.0).abs() < 0.1);

        let left = a.difference(&b);
        assert_eq!(left.len(), 1);
        assert!((left[0].area() - 50.0).abs() < 0.1);
        assert!(a.difference(&square(-5.0, -5.0, 15.0, 15.0)).is_empty());
    }

    #[test]
    fn containment() {
        let outer = square(0.0, 0.0, 100.0, 100.0);
        let inner = square(10.0, 10.0, 20.0, 20.0);
        assert!(outer.contains_polygon(&inner));
        assert!(!inner.contains_polygon(&outer));
        assert!(outer.intersects(&inner));
        assert!(outer.contains_pt(Pt2D::new(50.0, 50.0)));
        assert!(!outer.contains_pt(Pt2D::new(150.0, 50.0)));
    }

    #[test]
    fn split_polyline_alternates() {
        let poly = square(0.0, 0.0, 10.0, 10.0);
        let pl = PolyLine::must_new(vec![Pt2D::new(-5.0, 5.0), Pt2D::new(15.0, 5.0)]);
        let pieces = poly.split_polyline(&pl);
        assert_eq!(pieces.len(), 3);
        assert!(!poly.contains_pt(pieces[0].middle()));
        assert!(poly.contains_pt(pieces[1].middle()));
        assert!(!poly.contains_pt(pieces[2].middle()));

        // No crossings at all
        let inside = PolyLine::must_new(vec![Pt2D::new(2.0, 5.0), Pt2D::new(8.0, 5.0)]);
        assert_eq!(poly.split_polyline(&inside).len(), 1);
    }

    #[test]
    fn rotation_about_pivot() {
        let rect = Polygon::rectangle_centered(
            Pt2D::new(0.0, 0.0),
            Distance::meters(10.0),
            Distance::meters(4.0),
        );
        let rotated = rect.rotate_around(Angle::degrees(90.0), Pt2D::new(0.0, 0.0));
        let bounds = rotated.get_bounds();
        assert_eq!(bounds.max_y - bounds.min_y, 10.0);
        assert_eq!(bounds.max_x - bounds.min_x, 4.0);
    }
}
