use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::{
    infinite_line_intersection, Angle, Circle, Distance, Line, Polygon, Pt2D, Ring, EPSILON_DIST,
};

/// Number of points approximating each rounded corridor end cap.
const CAP_RESOLUTION: usize = 16;

/// An open polyline with at least two distinct points, like a road centerline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolyLine {
    pts: Vec<Pt2D>,
    length: Distance,
}

impl PolyLine {
    pub fn new(pts: Vec<Pt2D>) -> Result<PolyLine> {
        if pts.len() < 2 {
            bail!("Need at least two points for a PolyLine");
        }
        let pts = Pt2D::approx_dedupe(pts, EPSILON_DIST);
        if pts.len() < 2 {
            bail!("All PolyLine points collapsed together");
        }
        Ok(PolyLine::unchecked_new(pts))
    }

    pub fn must_new(pts: Vec<Pt2D>) -> PolyLine {
        PolyLine::new(pts).unwrap()
    }

    /// Doesn't check for duplicates. Use at your own risk.
    pub fn unchecked_new(pts: Vec<Pt2D>) -> PolyLine {
        let length = pts
            .windows(2)
            .map(|pair| pair[0].dist_to(pair[1]))
            .sum();
        PolyLine { pts, length }
    }

    pub fn points(&self) -> &Vec<Pt2D> {
        &self.pts
    }

    pub fn into_points(self) -> Vec<Pt2D> {
        self.pts
    }

    /// The individual segments, skipping anything degenerate.
    pub fn lines(&self) -> impl Iterator<Item = Line> + '_ {
        self.pts
            .windows(2)
            .filter_map(|pair| Line::new(pair[0], pair[1]))
    }

    pub fn length(&self) -> Distance {
        self.length
    }

    pub fn first_pt(&self) -> Pt2D {
        self.pts[0]
    }

    pub fn last_pt(&self) -> Pt2D {
        *self.pts.last().unwrap()
    }

    pub fn first_line(&self) -> Line {
        Line::must_new(self.pts[0], self.pts[1])
    }

    pub fn last_line(&self) -> Line {
        Line::must_new(self.pts[self.pts.len() - 2], self.pts[self.pts.len() - 1])
    }

    pub fn reversed(&self) -> PolyLine {
        let mut pts = self.pts.clone();
        pts.reverse();
        PolyLine::unchecked_new(pts)
    }

    pub fn middle(&self) -> Pt2D {
        self.must_dist_along(self.length / 2.0).0
    }

    /// The point and tangent angle at some distance along the polyline.
    pub fn dist_along(&self, dist_along: Distance) -> Result<(Pt2D, Angle)> {
        if dist_along < Distance::ZERO {
            bail!("dist_along {} is negative", dist_along);
        }
        let mut dist_left = dist_along;
        let mut lines = self.lines().peekable();
        while let Some(l) = lines.next() {
            let len = l.length();
            // Allow some floating point slop at the very end.
            let epsilon = if lines.peek().is_none() {
                EPSILON_DIST
            } else {
                Distance::ZERO
            };
            if dist_left <= len + epsilon {
                return Ok((l.percent_along((dist_left / len).min(1.0)), l.angle()));
            }
            dist_left -= len;
        }
        bail!("dist_along {} is longer than {}", dist_along, self.length);
    }

    pub fn must_dist_along(&self, dist_along: Distance) -> (Pt2D, Angle) {
        self.dist_along(dist_along).unwrap()
    }

    /// The sub-polyline between two distances along this one.
    pub fn maybe_exact_slice(&self, start: Distance, end: Distance) -> Result<PolyLine> {
        if start >= end || start < Distance::ZERO {
            bail!("Can't get a slice [{}, {}]", start, end);
        }
        if end > self.length + EPSILON_DIST {
            bail!(
                "Can't get a slice [{}, {}] of a polyline of length {}",
                start,
                end,
                self.length
            );
        }

        let mut result: Vec<Pt2D> = vec![self.dist_along(start)?.0];
        let mut dist_so_far = Distance::ZERO;
        for l in self.lines() {
            let len = l.length();
            if dist_so_far + len >= end {
                result.push(l.dist_along((end - dist_so_far).min(len)));
                break;
            }
            if dist_so_far + len > start {
                result.push(l.pt2());
            }
            dist_so_far += len;
        }
        PolyLine::new(result)
    }

    pub fn exact_slice(&self, start: Distance, end: Distance) -> PolyLine {
        self.maybe_exact_slice(start, end).unwrap()
    }

    /// Lengthen the polyline by continuing past the first point, along the first segment's
    /// direction.
    pub fn extended_at_start(&self, dist: Distance) -> PolyLine {
        let mut pts = self.pts.clone();
        pts[0] = self.first_pt().project_away(dist, self.first_line().angle().opposite());
        PolyLine::unchecked_new(pts)
    }

    /// Lengthen the polyline by continuing past the last point, along the last segment's
    /// direction.
    pub fn extended_at_end(&self, dist: Distance) -> PolyLine {
        let mut pts = self.pts.clone();
        let idx = pts.len() - 1;
        pts[idx] = self.last_pt().project_away(dist, self.last_line().angle());
        PolyLine::unchecked_new(pts)
    }

    /// The closest point on this polyline to some point.
    pub fn project_pt(&self, pt: Pt2D) -> Pt2D {
        let mut best: Option<(Distance, Pt2D)> = None;
        for l in self.lines() {
            let candidate = l.project_pt(pt);
            let dist = candidate.dist_to(pt);
            if best.as_ref().map_or(true, |(d, _)| dist < *d) {
                best = Some((dist, candidate));
            }
        }
        best.map(|(_, pt)| pt).unwrap()
    }

    /// If the point is (approximately) on this polyline, the distance along it and the tangent
    /// angle there.
    pub fn dist_along_of_point(&self, pt: Pt2D) -> Option<(Distance, Angle)> {
        let mut dist_so_far = Distance::ZERO;
        for l in self.lines() {
            if let Some(dist) = l.dist_along_of_point(pt) {
                return Some((dist_so_far + dist, l.angle()));
            }
            dist_so_far += l.length();
        }
        None
    }

    /// Thicken the polyline into a polygon, with sharp (mitered) corners and flat ends.
    pub fn make_polygons(&self, width: Distance) -> Result<Polygon> {
        let half = width / 2.0;
        let side1 = self.shift_with_sharp_angles(half);
        let mut side2 = self.shift_with_sharp_angles(-half);
        side2.reverse();

        let mut points = side1;
        points.extend(side2);
        let mut points = Pt2D::approx_dedupe(points, EPSILON_DIST);
        points.push(points[0]);
        Ok(Ring::new(points)?.into_polygon())
    }

    /// Thicken the polyline into a corridor polygon with rounded end caps, so that two
    /// overlapping corridors blend together without a seam.
    pub fn make_polygons_with_round_ends(&self, width: Distance) -> Result<Polygon> {
        let radius = width / 2.0;
        let pieces = Polygon::union_all(vec![
            self.make_polygons(width)?,
            Circle::new(self.first_pt(), radius).to_polygon(CAP_RESOLUTION),
            Circle::new(self.last_pt(), radius).to_polygon(CAP_RESOLUTION),
        ])?;
        // The caps overlap the body, so this should be a single piece; if the union unexpectedly
        // shatters, keep the biggest.
        pieces
            .into_iter()
            .max_by(|a, b| a.area().partial_cmp(&b.area()).unwrap())
            .ok_or_else(|| anyhow::anyhow!("union of corridor pieces was empty"))
    }

    fn shift_with_sharp_angles(&self, width: Distance) -> Vec<Pt2D> {
        if self.pts.len() == 2 {
            let l = Line::must_new(self.pts[0], self.pts[1]).shift_either_direction(width);
            return vec![l.pt1(), l.pt2()];
        }

        let mut result: Vec<Pt2D> = Vec::new();
        let mut pt3_idx = 2;
        let mut pt1_raw = self.pts[0];
        let mut pt2_raw = self.pts[1];

        loop {
            let pt3_raw = self.pts[pt3_idx];

            let l1 = Line::must_new(pt1_raw, pt2_raw).shift_either_direction(width);
            let l2 = Line::must_new(pt2_raw, pt3_raw).shift_either_direction(width);
            // When the two lines are parallel, the miter intersection doesn't exist; the shifted
            // endpoint works fine.
            let pt2_shift = infinite_line_intersection(&l1, &l2).unwrap_or_else(|| l1.pt2());

            if pt3_idx == 2 {
                result.push(l1.pt1());
            }
            result.push(pt2_shift);
            if pt3_idx == self.pts.len() - 1 {
                result.push(l2.pt2());
                break;
            }

            pt1_raw = pt2_raw;
            pt2_raw = pt3_raw;
            pt3_idx += 1;
        }

        assert!(result.len() == self.pts.len());
        result
    }

    pub fn to_geo(&self) -> geo::LineString {
        geo::LineString(self.pts.iter().map(|pt| geo::Coordinate::from(*pt)).collect())
    }
}

impl fmt::Display for PolyLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "PolyLine::new(vec![")?;
        for pt in &self.pts {
            writeln!(f, "  Pt2D::new({}, {}),", pt.x(), pt.y())?;
        }
        write!(f, "])")
    }
}
