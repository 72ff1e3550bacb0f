use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Angle, Distance, PolyLine, Pt2D, EPSILON_DIST};

/// Projections onto a segment tolerate a bit more floating point error than raw coordinates do.
const PROJECTION_EPSILON: Distance = Distance::const_meters(0.01);

/// A line segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line(Pt2D, Pt2D);

impl Line {
    /// Creates a line segment between two points, as long as they're not too close together.
    pub fn new(pt1: Pt2D, pt2: Pt2D) -> Option<Line> {
        if pt1.dist_to(pt2) <= EPSILON_DIST {
            return None;
        }
        Some(Line(pt1, pt2))
    }

    /// Panics if the points are too close together.
    pub fn must_new(pt1: Pt2D, pt2: Pt2D) -> Line {
        Line::new(pt1, pt2).unwrap()
    }

    pub fn pt1(&self) -> Pt2D {
        self.0
    }

    pub fn pt2(&self) -> Pt2D {
        self.1
    }

    pub fn points(&self) -> Vec<Pt2D> {
        vec![self.0, self.1]
    }

    pub fn to_polyline(&self) -> PolyLine {
        PolyLine::must_new(self.points())
    }

    pub fn reversed(&self) -> Line {
        Line(self.1, self.0)
    }

    pub fn length(&self) -> Distance {
        self.0.dist_to(self.1)
    }

    pub fn angle(&self) -> Angle {
        self.0.angle_to(self.1)
    }

    pub fn middle(&self) -> Pt2D {
        self.percent_along(0.5)
    }

    /// A point along the line, not necessarily between the endpoints.
    pub fn percent_along(&self, percent: f64) -> Pt2D {
        Pt2D::new(
            self.0.x() + percent * (self.1.x() - self.0.x()),
            self.0.y() + percent * (self.1.y() - self.0.y()),
        )
    }

    pub fn unbounded_dist_along(&self, dist: Distance) -> Pt2D {
        self.percent_along(dist / self.length())
    }

    /// A point at some distance from the first endpoint. Panics if the distance is out of range.
    pub fn dist_along(&self, dist: Distance) -> Pt2D {
        let len = self.length();
        if dist < -PROJECTION_EPSILON || dist > len + PROJECTION_EPSILON {
            panic!("Can't go {} along a line of length {}", dist, len);
        }
        self.percent_along(dist / len)
    }

    /// Do the two segments cross, including touching at endpoints?
    pub fn crosses(&self, other: &Line) -> bool {
        fn ccw(a: Pt2D, b: Pt2D, c: Pt2D) -> bool {
            (c.y() - a.y()) * (b.x() - a.x()) > (b.y() - a.y()) * (c.x() - a.x())
        }
        ccw(self.0, other.0, other.1) != ccw(self.1, other.0, other.1)
            && ccw(self.0, self.1, other.0) != ccw(self.0, self.1, other.1)
    }

    /// Where do the two segments intersect, if at all?
    pub fn intersection(&self, other: &Line) -> Option<Pt2D> {
        if !self.crosses(other) {
            return None;
        }
        infinite_line_intersection(self, other)
    }

    /// The closest point on this segment to some point.
    pub fn project_pt(&self, pt: Pt2D) -> Pt2D {
        let dx = self.1.x() - self.0.x();
        let dy = self.1.y() - self.0.y();
        let t = ((pt.x() - self.0.x()) * dx + (pt.y() - self.0.y()) * dy) / (dx * dx + dy * dy);
        self.percent_along(t.clamp(0.0, 1.0))
    }

    /// If the point is (approximately) on this segment, the distance along it.
    pub fn dist_along_of_point(&self, pt: Pt2D) -> Option<Distance> {
        let projected = self.project_pt(pt);
        if projected.dist_to(pt) > PROJECTION_EPSILON {
            return None;
        }
        Some(self.0.dist_to(projected))
    }

    /// Shift the entire segment perpendicularly. A positive width shifts towards the direction of
    /// travel rotated 90 degrees counter-clockwise.
    pub fn shift_either_direction(&self, width: Distance) -> Line {
        let theta = if width >= Distance::ZERO {
            self.angle().rotate_degs(90.0)
        } else {
            self.angle().rotate_degs(-90.0)
        };
        let w = width.abs();
        Line(self.0.project_away(w, theta), self.1.project_away(w, theta))
    }
}

/// Treat the two segments as infinite lines and intersect those. Returns None for parallel lines.
pub fn infinite_line_intersection(a: &Line, b: &Line) -> Option<Pt2D> {
    let (x1, y1, x2, y2) = (a.pt1().x(), a.pt1().y(), a.pt2().x(), a.pt2().y());
    let (x3, y3, x4, y4) = (b.pt1().x(), b.pt1().y(), b.pt2().x(), b.pt2().y());

    let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if denom.abs() < 1e-10 {
        return None;
    }
    let n1 = x1 * y2 - y1 * x2;
    let n2 = x3 * y4 - y3 * x4;
    Some(Pt2D::new(
        (n1 * (x3 - x4) - (x1 - x2) * n2) / denom,
        (n1 * (y3 - y4) - (y1 - y2) * n2) / denom,
    ))
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Line({} to {})", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_segments_rejected() {
        let pt = Pt2D::new(1.0, 1.0);
        assert!(Line::new(pt, pt).is_none());
        assert!(Line::new(pt, Pt2D::new(1.0, 1.00001)).is_none());
    }

    #[test]
    fn intersection_of_crossing_segments() {
        let l1 = Line::must_new(Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 10.0));
        let l2 = Line::must_new(Pt2D::new(0.0, 10.0), Pt2D::new(10.0, 0.0));
        assert_eq!(l1.intersection(&l2), Some(Pt2D::new(5.0, 5.0)));

        let l3 = Line::must_new(Pt2D::new(20.0, 0.0), Pt2D::new(20.0, 10.0));
        assert_eq!(l1.intersection(&l3), None);
    }

    #[test]
    fn projection() {
        let l = Line::must_new(Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 0.0));
        assert_eq!(l.project_pt(Pt2D::new(3.0, 5.0)), Pt2D::new(3.0, 0.0));
        // Past the end, clamps to the endpoint
        assert_eq!(l.project_pt(Pt2D::new(15.0, 5.0)), Pt2D::new(10.0, 0.0));
        assert_eq!(
            l.dist_along_of_point(Pt2D::new(7.0, 0.0)),
            Some(Distance::meters(7.0))
        );
        assert_eq!(l.dist_along_of_point(Pt2D::new(7.0, 1.0)), None);
    }
}
