use serde::{Deserialize, Serialize};

use geom::{Angle, Distance, PolyLine, Polygon, Pt2D};

use crate::edges::{self, EdgeInfo};

/// How far to project the candidate spine from the junction in each direction. Much longer than
/// any plausible site.
const SPINE_PROBE_LENGTH: Distance = Distance::const_meters(2_000.0);

/// Road widths and spine sizing for one planning pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadParams {
    /// Total width of the access road corridor.
    pub access_width: Distance,
    /// Total width of spine corridors.
    pub spine_width: Distance,
    /// Trimmed off both ends of a spine so its round caps stay off the boundary edge.
    pub spine_clearance: Distance,
    /// Step size when ray-marching a perpendicular spine outward.
    pub ray_step: Distance,
    /// Cap on each ray-marched half of a perpendicular spine.
    pub max_ray: Distance,
    /// How far inward from its boundary edge the second ray-cast spine sits.
    pub edge_inset: Distance,
}

impl Default for RoadParams {
    fn default() -> Self {
        RoadParams {
            access_width: Distance::meters(8.0),
            spine_width: Distance::meters(6.0),
            spine_clearance: Distance::meters(4.0),
            ray_step: Distance::meters(5.0),
            max_ray: Distance::meters(200.0),
            edge_inset: Distance::meters(15.0),
        }
    }
}

/// The two spine heuristics produce materially different networks from the same inputs, so they
/// stay separate, selectable strategies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SpineStrategy {
    /// One spine through the access junction, aligned to the boundary edge nearest it.
    JunctionAligned,
    /// Two independent spines: one perpendicular to the boundary edge nearest the access
    /// terminus, sized by ray-marching, and one along the most opposite boundary edge.
    RayCastPair,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoadKind {
    Access,
    Spine,
}

/// A road corridor: a centerline buffered to half the road width on each side, with rounded
/// caps, clipped to the boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadCorridor {
    pub kind: RoadKind,
    pub centerline: PolyLine,
    pub width: Distance,
    /// Clipping against the boundary can leave several pieces.
    pub polygons: Vec<Polygon>,
}

/// All of the roads from one planning pass. May be empty; downstream code tolerates zero, one,
/// or several corridors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadNetwork {
    pub corridors: Vec<RoadCorridor>,
    /// All corridor polygons unioned together, or the unmerged pieces if the union failed.
    pub merged: Vec<Polygon>,
}

impl RoadNetwork {
    pub fn is_empty(&self) -> bool {
        self.corridors.is_empty()
    }

    pub fn spines(&self) -> impl Iterator<Item = &RoadCorridor> {
        self.corridors.iter().filter(|c| c.kind == RoadKind::Spine)
    }
}

/// Turn an access path and a boundary into an access corridor plus up to two spines. Any
/// degenerate geometry along the way downgrades to "that corridor is absent" instead of failing
/// the pass.
pub fn plan_road_network(
    boundary: &Polygon,
    access: &PolyLine,
    params: &RoadParams,
    strategy: SpineStrategy,
) -> RoadNetwork {
    let centroid = boundary.centroid();
    let access_line = match clip_to_interior(boundary, access) {
        Some(pl) => pl,
        None => {
            warn!("Access path has no segment inside the boundary; using it unclipped");
            access.clone()
        }
    };
    // Of the two ends, the one closer to the centroid is the one that continues into the site;
    // the other is the entrance from outside.
    let junction = if access_line.first_pt().dist_to(centroid)
        <= access_line.last_pt().dist_to(centroid)
    {
        access_line.first_pt()
    } else {
        access_line.last_pt()
    };

    let spines: Vec<PolyLine> = match strategy {
        SpineStrategy::JunctionAligned => junction_aligned_spine(boundary, junction, params)
            .into_iter()
            .collect(),
        SpineStrategy::RayCastPair => ray_cast_spines(boundary, junction, params),
    };

    // Stretch the interior end of the access under the spine corridor, so the two buffered
    // roads join without a visible seam between their caps.
    let access_line = if spines.is_empty() {
        access_line
    } else {
        let overlap = params.access_width.max(params.spine_width) * 0.6;
        if junction == access_line.first_pt() {
            access_line.extended_at_start(overlap)
        } else {
            access_line.extended_at_end(overlap)
        }
    };

    let mut corridors = Vec::new();
    buffer_corridor(
        &mut corridors,
        boundary,
        access_line,
        params.access_width,
        RoadKind::Access,
    );
    for spine in spines {
        buffer_corridor(
            &mut corridors,
            boundary,
            spine,
            params.spine_width,
            RoadKind::Spine,
        );
    }

    let pieces: Vec<Polygon> = corridors
        .iter()
        .flat_map(|c| c.polygons.clone())
        .collect();
    let merged = if pieces.is_empty() {
        Vec::new()
    } else {
        match Polygon::union_all(pieces.clone()) {
            Ok(merged) => merged,
            Err(err) => {
                warn!(
                    "Couldn't merge road corridors ({}); keeping {} unmerged pieces",
                    err,
                    pieces.len()
                );
                pieces
            }
        }
    };

    RoadNetwork { corridors, merged }
}

/// The longest piece of the polyline whose midpoint is inside the polygon.
fn clip_to_interior(boundary: &Polygon, pl: &PolyLine) -> Option<PolyLine> {
    let mut best: Option<PolyLine> = None;
    for piece in boundary.split_polyline(pl) {
        if !boundary.contains_pt(piece.middle()) {
            continue;
        }
        // Strictly longer, so ties go to the first piece found.
        if best.as_ref().map_or(true, |b| piece.length() > b.length()) {
            best = Some(piece);
        }
    }
    best
}

fn junction_aligned_spine(
    boundary: &Polygon,
    junction: Pt2D,
    params: &RoadParams,
) -> Option<PolyLine> {
    if !boundary.contains_pt(junction) {
        warn!("Junction {} isn't inside the boundary; skipping the spine", junction);
        return None;
    }
    let edge = edges::nearest_edge(std::slice::from_ref(boundary), junction)?;

    let probe = PolyLine::new(vec![
        junction.project_away(SPINE_PROBE_LENGTH, edge.angle.opposite()),
        junction.project_away(SPINE_PROBE_LENGTH, edge.angle),
    ])
    .ok()?;
    let clipped = match clip_to_interior(boundary, &probe) {
        Some(pl) => pl,
        None => {
            warn!("Candidate spine through {} misses the boundary interior", junction);
            return None;
        }
    };

    if clipped.length() <= params.spine_clearance * 2.0 {
        warn!(
            "Spine of {} is too short to trim {} off both ends",
            clipped.length(),
            params.spine_clearance
        );
        return None;
    }
    clipped
        .maybe_exact_slice(
            params.spine_clearance,
            clipped.length() - params.spine_clearance,
        )
        .ok()
}

fn ray_cast_spines(boundary: &Polygon, terminus: Pt2D, params: &RoadParams) -> Vec<PolyLine> {
    let mut spines = Vec::new();
    let edge = match edges::nearest_edge(std::slice::from_ref(boundary), terminus) {
        Some(e) => e,
        None => {
            return spines;
        }
    };

    // March outward both ways, perpendicular to the nearest edge, until the ray exits the
    // boundary or hits the cap.
    let perpendicular = edge.angle.rotate_degs(90.0);
    let end1 = ray_march(boundary, terminus, perpendicular, params);
    let end2 = ray_march(boundary, terminus, perpendicular.opposite(), params);
    let first = match PolyLine::new(vec![end1, end2]) {
        Ok(pl) => pl,
        Err(_) => {
            warn!("Perpendicular spine from {} collapsed to a point", terminus);
            return spines;
        }
    };
    let first_angle = first.first_line().angle();
    spines.push(first);

    // The second spine follows the boundary edge whose direction is most opposite the first
    // spine's.
    let (dx1, dy1) = first_angle.to_vec();
    let mut most_opposite: Option<(f64, EdgeInfo)> = None;
    for candidate in edges::all_edges(boundary) {
        let (dx2, dy2) = candidate.angle.to_vec();
        let dot = dx1 * dx2 + dy1 * dy2;
        if most_opposite.as_ref().map_or(true, |(d, _)| dot < *d) {
            most_opposite = Some((dot, candidate));
        }
    }
    let opposite = match most_opposite {
        Some((_, e)) => e,
        None => {
            return spines;
        }
    };

    let sign = edges::inward_sign(opposite.midpoint, boundary.centroid(), opposite.angle);
    let inward = opposite.angle.rotate_degs(sign * 90.0);
    let center = opposite.midpoint.project_away(params.edge_inset, inward);
    let len = (opposite.length * 0.8).min(Distance::meters(100.0));
    let mut pt1 = center.project_away(len / 2.0, opposite.angle.opposite());
    let mut pt2 = center.project_away(len / 2.0, opposite.angle);
    // An endpoint that lands outside falls back to the spine's center.
    if !boundary.contains_pt(pt1) {
        pt1 = center;
    }
    if !boundary.contains_pt(pt2) {
        pt2 = center;
    }
    match PolyLine::new(vec![pt1, pt2]) {
        Ok(pl) => spines.push(pl),
        Err(_) => {
            warn!("Edge-aligned spine along edge {} collapsed", opposite.idx);
        }
    }
    spines
}

fn ray_march(boundary: &Polygon, from: Pt2D, angle: Angle, params: &RoadParams) -> Pt2D {
    let mut current = from;
    let mut traveled = Distance::ZERO;
    loop {
        let next = current.project_away(params.ray_step, angle);
        if traveled + params.ray_step > params.max_ray || !boundary.contains_pt(next) {
            return current;
        }
        current = next;
        traveled += params.ray_step;
    }
}

fn buffer_corridor(
    corridors: &mut Vec<RoadCorridor>,
    boundary: &Polygon,
    centerline: PolyLine,
    width: Distance,
    kind: RoadKind,
) {
    match centerline.make_polygons_with_round_ends(width) {
        Ok(buffered) => {
            let polygons = boundary.intersection(&buffered);
            if polygons.is_empty() {
                warn!("{:?} corridor lies entirely outside the boundary", kind);
                return;
            }
            corridors.push(RoadCorridor {
                kind,
                centerline,
                width,
                polygons,
            });
        }
        Err(err) => {
            warn!("Couldn't buffer the {:?} corridor: {}", kind, err);
        }
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
    fn access_entering_from_outside() {
        let boundary = boundary_100m();
        let access = PolyLine::must_new(vec![Pt2D::new(50.0, -20.0), Pt2D::new(50.0, 10.0)]);
        let network = plan_road_network(
            &boundary,
            &access,
            &RoadParams::default(),
            SpineStrategy::JunctionAligned,
        );

        assert_eq!(network.corridors.len(), 2);
        assert_eq!(network.corridors[0].kind, RoadKind::Access);
        assert!(!network.merged.is_empty());

        // The spine runs through the junction (50, 10), parallel to the nearest (southern)
        // boundary edge.
        let spine = network.spines().next().unwrap();
        assert!(spine.centerline.first_line().angle().approx_parallel(Angle::ZERO, 1.0));
        assert_eq!(spine.centerline.first_pt().y(), 10.0);
        // Clearance trimmed off both ends
        assert_eq!(spine.centerline.length(), Distance::meters(92.0));

        // Every corridor polygon stays inside the boundary.
        for corridor in &network.corridors {
            for polygon in &corridor.polygons {
                assert!(boundary.area() >= polygon.area());
                assert!(boundary.intersects(polygon));
            }
        }
    }

    #[test]
    fn no_corridors_when_access_is_outside() {
        let boundary = boundary_100m();
        let access = PolyLine::must_new(vec![Pt2D::new(50.0, -200.0), Pt2D::new(50.0, -100.0)]);
        for strategy in [SpineStrategy::JunctionAligned, SpineStrategy::RayCastPair] {
            let network = plan_road_network(&boundary, &access, &RoadParams::default(), strategy);
            assert!(network.is_empty());
            assert!(network.merged.is_empty());
        }
    }

    #[test]
    fn ray_cast_pair_produces_two_spines() {
        let boundary = boundary_100m();
        let access = PolyLine::must_new(vec![Pt2D::new(50.0, -20.0), Pt2D::new(50.0, 10.0)]);
        let network = plan_road_network(
            &boundary,
            &access,
            &RoadParams::default(),
            SpineStrategy::RayCastPair,
        );

        let spines: Vec<&RoadCorridor> = network.spines().collect();
        assert_eq!(spines.len(), 2);
        // The first spine marches perpendicular to the southern edge, so it runs north-south.
        assert!(spines[0]
            .centerline
            .first_line()
            .angle()
            .approx_parallel(Angle::degrees(90.0), 1.0));
        // The second follows the boundary edge running most opposite the first spine (the
        // eastern edge), inset inward from it.
        assert!(spines[1]
            .centerline
            .first_line()
            .angle()
            .approx_parallel(Angle::degrees(90.0), 1.0));
        for pt in spines[1].centerline.points() {
            assert!(boundary.contains_pt(*pt));
            assert_eq!(pt.x(), 85.0);
        }
    }

    #[test]
    fn determinism() {
        let boundary = boundary_100m();
        let access = PolyLine::must_new(vec![Pt2D::new(50.0, -20.0), Pt2D::new(50.0, 10.0)]);
        let n1 = plan_road_network(
            &boundary,
            &access,
            &RoadParams::default(),
            SpineStrategy::JunctionAligned,
        );
        let n2 = plan_road_network(
            &boundary,
            &access,
            &RoadParams::default(),
            SpineStrategy::JunctionAligned,
        );
        assert_eq!(n1, n2);
    }
}
