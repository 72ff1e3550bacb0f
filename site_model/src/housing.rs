use serde::{Deserialize, Serialize};

use geom::{Angle, Distance, PolyLine, Polygon, Pt2D};

use crate::edges;
use crate::BuildableArea;

/// Dimensions and spacing for the homes of one layout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FootprintSpec {
    /// Width of a home, along the street it faces.
    pub width: Distance,
    /// Depth of a home, perpendicular to the street it faces.
    pub depth: Distance,
    /// Gap between the road centerline side and the front of a home.
    pub front_setback: Distance,
    /// Side-to-side gap between adjacent homes in a row.
    pub side_gap: Distance,
    /// Gap between successive rows of homes.
    pub front_gap: Distance,
    /// Extra clearance from the edge of the buildable area.
    pub edge_margin: Distance,
}

impl Default for FootprintSpec {
    fn default() -> Self {
        FootprintSpec {
            width: Distance::meters(8.0),
            depth: Distance::meters(10.0),
            front_setback: Distance::meters(5.0),
            side_gap: Distance::meters(2.0),
            front_gap: Distance::meters(6.0),
            edge_margin: Distance::meters(1.0),
        }
    }
}

/// Which side of the spine a home sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// One home's oriented rectangular outline. Footprints have no identity; every regeneration
/// replaces all of them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub center: Pt2D,
    pub width: Distance,
    pub depth: Distance,
    /// Direction of the street the home faces.
    pub angle: Angle,
    /// Set for spine-relative placement, unset for grid placement.
    pub side: Option<Side>,
}

impl Footprint {
    /// The rectangle itself: `width` runs along `angle`, `depth` across it. Both placement
    /// strategies build their rectangles through here.
    pub fn polygon(&self) -> Polygon {
        Polygon::rectangle_centered(self.center, self.width, self.depth)
            .rotate_around(self.angle, self.center)
    }

    /// Floor area in m^2.
    pub fn area(&self) -> f64 {
        self.width.inner_meters() * self.depth.inner_meters()
    }
}

/// How to orient the housing grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Alignment {
    /// Align to the edge nearest this point, usually the access junction.
    NearestEdgeTo(Pt2D),
    /// Align to the longest boundary edge.
    LongestEdge,
    /// An explicit override.
    Bearing(Angle),
}

/// A footprint is accepted iff it's entirely within the area and touches no no-build polygon.
/// There's no clipping of partial footprints.
fn footprint_fits(footprint: &Footprint, area: &Polygon, no_build: &[Polygon]) -> bool {
    let polygon = footprint.polygon();
    area.contains_polygon(&polygon) && !no_build.iter().any(|p| p.intersects(&polygon))
}

/// Walk a spine centerline and place one row of homes on each side of it, oriented along the
/// local tangent.
pub fn place_housing_along_spine(
    spine: &PolyLine,
    boundary: &Polygon,
    no_build: &[Polygon],
    spec: &FootprintSpec,
) -> Vec<Footprint> {
    let mut result = Vec::new();
    let pitch = spec.width + spec.side_gap;
    let offset = spec.front_setback + spec.depth / 2.0;
    let len = spine.length();
    if len < pitch {
        return result;
    }
    let step = pitch.max(Distance::meters(1.0));
    // Sample the tangent over a window, so one kink in the centerline doesn't skew a whole lot.
    let window = Distance::meters((len.inner_meters() / 50.0).clamp(0.5, 2.0));

    let mut station = pitch * 0.5;
    while station <= len - pitch * 0.5 {
        let s0 = if station > window {
            station - window
        } else {
            Distance::ZERO
        };
        let s1 = (station + window).min(len);
        let tangent = match (spine.dist_along(s0), spine.dist_along(s1)) {
            (Ok((a, _)), Ok((b, _))) if a != b => a.angle_to(b),
            _ => spine.must_dist_along(station).1,
        };
        let (anchor, _) = spine.must_dist_along(station);

        for (side, rotate) in [(Side::Left, 90.0), (Side::Right, -90.0)] {
            let footprint = Footprint {
                center: anchor.project_away(offset, tangent.rotate_degs(rotate)),
                width: spec.width,
                depth: spec.depth,
                angle: tangent,
                side: Some(side),
            };
            if footprint_fits(&footprint, boundary, no_build) {
                result.push(footprint);
            }
        }
        station += step;
    }
    result
}

/// Fill each piece of the buildable area with a rotated regular grid of homes, aligned to a
/// reference boundary edge.
pub fn place_housing_grid(
    buildable: &BuildableArea,
    alignment: Alignment,
    spec: &FootprintSpec,
) -> Vec<Footprint> {
    let mut result = Vec::new();
    for piece in &buildable.polygons {
        grid_in_piece(&mut result, piece, &buildable.no_build, alignment, spec);
    }
    result
}

fn grid_in_piece(
    result: &mut Vec<Footprint>,
    piece: &Polygon,
    no_build: &[Polygon],
    alignment: Alignment,
    spec: &FootprintSpec,
) {
    let (angle, reference_midpoint) = match alignment {
        Alignment::NearestEdgeTo(pt) => {
            match edges::nearest_edge(std::slice::from_ref(piece), pt) {
                Some(e) => (e.angle, Some(e.midpoint)),
                None => {
                    warn!("Buildable piece has no usable edges; skipping it");
                    return;
                }
            }
        }
        Alignment::LongestEdge => match edges::longest_edge(piece) {
            Some(e) => (e.angle, Some(e.midpoint)),
            None => {
                warn!("Buildable piece has no usable edges; skipping it");
                return;
            }
        },
        Alignment::Bearing(angle) => (angle, None),
    };

    // Pull in far enough that no rectangle centered in the inset region can straddle the edge of
    // the piece. The inset only frames the grid; the full-containment check below runs against
    // the piece itself.
    let inset_dist = spec.width.max(spec.depth) / 2.0 + spec.edge_margin;
    let inset = match piece.inset(inset_dist) {
        Ok(p) => p,
        Err(err) => {
            warn!("Buildable piece vanished under a {} inset ({}); no homes fit", inset_dist, err);
            return;
        }
    };

    // Work in a frame where the alignment edge runs along the X axis.
    let pivot = inset.centroid();
    let rotated = piece.rotate_around(angle.negated(), pivot);
    let bounds = inset.rotate_around(angle.negated(), pivot).get_bounds();

    let half_depth = spec.depth.inner_meters() / 2.0;
    let margin = spec.edge_margin.inner_meters();
    let (sign, mut y) = match reference_midpoint {
        Some(midpoint) => {
            let sign = edges::inward_sign(midpoint, piece.centroid(), angle);
            let start = midpoint.rotate_around(angle.negated(), pivot).y()
                + sign * (half_depth + margin);
            (sign, start)
        }
        // With a manual bearing there's no reference edge; start from the near side of the box.
        None => (1.0, bounds.min_y + half_depth + margin),
    };
    let row_pitch = (spec.depth + spec.front_gap).inner_meters();
    let col_pitch = (spec.width + spec.side_gap).inner_meters();
    if row_pitch <= 0.0 || col_pitch <= 0.0 {
        warn!("Homes with a non-positive pitch would never terminate; skipping placement");
        return;
    }
    // The reference edge sits outside the inset piece, so the first rows can land short of the
    // box; skip forward to it.
    while (sign > 0.0 && y < bounds.min_y) || (sign < 0.0 && y > bounds.max_y) {
        y += sign * row_pitch;
    }
    while y >= bounds.min_y && y <= bounds.max_y {
        let mut x = bounds.min_x + spec.width.inner_meters() / 2.0;
        while x <= bounds.max_x {
            let cell = Polygon::rectangle_centered(Pt2D::new(x, y), spec.width, spec.depth);
            if rotated.contains_polygon(&cell) {
                let footprint = Footprint {
                    center: Pt2D::new(x, y).rotate_around(angle, pivot),
                    width: spec.width,
                    depth: spec.depth,
                    angle,
                    side: None,
                };
                if !no_build.iter().any(|p| p.intersects(&footprint.polygon())) {
                    result.push(footprint);
                }
            }
            x += col_pitch;
        }
        y += sign * row_pitch;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::Ring;

    fn boundary_100m() -> Polygon {
        Ring::must_new(vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(100.0, 0.0),
            Pt2D::new(100.0, 100.0),
            Pt2D::new(0.0, 100.0),
            Pt2D::new(0.0, 0.0),
        ])
        .into_polygon()
    }

    #[test]
    fn spine_rows_on_both_sides() {
        let boundary = boundary_100m();
        let spine = PolyLine::must_new(vec![Pt2D::new(10.0, 50.0), Pt2D::new(90.0, 50.0)]);
        let spec = FootprintSpec::default();
        let homes = place_housing_along_spine(&spine, &boundary, &[], &spec);

        assert!(!homes.is_empty());
        assert!(homes.iter().any(|h| h.side == Some(Side::Left)));
        assert!(homes.iter().any(|h| h.side == Some(Side::Right)));
        for home in &homes {
            assert!(boundary.contains_polygon(&home.polygon()));
            // offset = front_setback + depth/2
            assert_eq!((home.center.y() - 50.0).abs(), 10.0);
        }
    }

    #[test]
    fn footprints_never_touch_no_build() {
        let boundary = boundary_100m();
        let spine = PolyLine::must_new(vec![Pt2D::new(10.0, 50.0), Pt2D::new(90.0, 50.0)]);
        let pond = Polygon::rectangle_centered(
            Pt2D::new(30.0, 60.0),
            Distance::meters(20.0),
            Distance::meters(20.0),
        );
        let homes =
            place_housing_along_spine(&spine, &boundary, &[pond.clone()], &FootprintSpec::default());
        assert!(!homes.is_empty());
        for home in &homes {
            assert!(!pond.intersects(&home.polygon()));
        }
        // The pond displaced some homes compared to an open field.
        let open = place_housing_along_spine(&spine, &boundary, &[], &FootprintSpec::default());
        assert!(homes.len() < open.len());
    }

    #[test]
    fn grid_fills_aligned_rows() {
        let buildable = BuildableArea {
            polygons: vec![boundary_100m()],
            no_build: Vec::new(),
        };
        let spec = FootprintSpec::default();
        let homes = place_housing_grid(&buildable, Alignment::LongestEdge, &spec);

        assert!(homes.len() > 20);
        for home in &homes {
            assert_eq!(home.angle, Angle::ZERO);
            assert!(boundary_100m().contains_polygon(&home.polygon()));
        }
        // Homes come in regular rows
        let first_y = homes[0].center.y();
        assert!(homes.iter().filter(|h| h.center.y() == first_y).count() > 1);
    }

    #[test]
    fn empty_buildable_area_yields_no_homes() {
        let buildable = BuildableArea::default();
        assert!(place_housing_grid(&buildable, Alignment::LongestEdge, &FootprintSpec::default())
            .is_empty());

        // A sliver too small for the inset also yields nothing, quietly.
        let sliver = BuildableArea {
            polygons: vec![Polygon::rectangle_centered(
                Pt2D::new(0.0, 0.0),
                Distance::meters(5.0),
                Distance::meters(5.0),
            )],
            no_build: Vec::new(),
        };
        assert!(place_housing_grid(&sliver, Alignment::LongestEdge, &FootprintSpec::default())
            .is_empty());
    }

    #[test]
    fn placement_is_idempotent() {
        let boundary = boundary_100m();
        let spine = PolyLine::must_new(vec![Pt2D::new(10.0, 48.0), Pt2D::new(90.0, 53.0)]);
        let spec = FootprintSpec::default();
        let a = place_housing_along_spine(&spine, &boundary, &[], &spec);
        let b = place_housing_along_spine(&spine, &boundary, &[], &spec);
        assert_eq!(a, b);

        let buildable = BuildableArea {
            polygons: vec![boundary],
            no_build: Vec::new(),
        };
        let c = place_housing_grid(&buildable, Alignment::LongestEdge, &spec);
        let d = place_housing_grid(&buildable, Alignment::LongestEdge, &spec);
        assert_eq!(c, d);
    }
}
