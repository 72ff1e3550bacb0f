use serde::{Deserialize, Serialize};

use geom::{Angle, Distance, Line, Polygon, Pt2D};

/// One edge of a boundary's outer ring.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeInfo {
    /// Position in ring order.
    pub idx: usize,
    pub angle: Angle,
    pub length: Distance,
    pub midpoint: Pt2D,
}

/// The boundary edge closest to a point, scanning the outer ring of every part. Ties go to the
/// first edge in ring order, so repeated runs always pick the same one.
pub fn nearest_edge(parts: &[Polygon], pt: Pt2D) -> Option<EdgeInfo> {
    let mut best: Option<(Distance, EdgeInfo)> = None;
    for part in parts {
        for (idx, line) in numbered_edges(part) {
            let dist = line.project_pt(pt).dist_to(pt);
            if best.as_ref().map_or(true, |(d, _)| dist < *d) {
                best = Some((dist, describe(idx, &line)));
            }
        }
    }
    best.map(|(_, info)| info)
}

/// The longest edge of the boundary's outer ring. Ties go to the first edge in ring order.
pub fn longest_edge(boundary: &Polygon) -> Option<EdgeInfo> {
    let mut best: Option<EdgeInfo> = None;
    for (idx, line) in numbered_edges(boundary) {
        if best.as_ref().map_or(true, |b| line.length() > b.length) {
            best = Some(describe(idx, &line));
        }
    }
    best
}

/// Every edge of the boundary's outer ring, in ring order.
pub(crate) fn all_edges(boundary: &Polygon) -> Vec<EdgeInfo> {
    numbered_edges(boundary)
        .map(|(idx, line)| describe(idx, &line))
        .collect()
}

/// Which perpendicular direction from an alignment edge points into the site: in a frame rotated
/// so the edge runs along the X axis, +1.0 if the interior is towards increasing Y, else -1.0.
pub fn inward_sign(edge_midpoint: Pt2D, centroid: Pt2D, alignment: Angle) -> f64 {
    let rotated = centroid.rotate_around(alignment.negated(), edge_midpoint);
    if rotated.y() >= edge_midpoint.y() {
        1.0
    } else {
        -1.0
    }
}

// Zero-length edges never make a Line, so they can't win any of the scans.
fn numbered_edges(boundary: &Polygon) -> impl Iterator<Item = (usize, Line)> + '_ {
    boundary
        .points()
        .windows(2)
        .enumerate()
        .filter_map(|(idx, pair)| Line::new(pair[0], pair[1]).map(|l| (idx, l)))
}

fn describe(idx: usize, line: &Line) -> EdgeInfo {
    EdgeInfo {
        idx,
        angle: line.angle(),
        length: line.length(),
        midpoint: line.middle(),
    }
}
