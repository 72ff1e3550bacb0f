use serde::{Deserialize, Serialize};

use geom::Polygon;

use crate::{Footprint, RoadNetwork};

/// Land that homes can go on, plus what was carved out of the boundary to get it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildableArea {
    /// Possibly empty, a single polygon, or several disjoint pieces.
    pub polygons: Vec<Polygon>,
    /// Roads and exclusions, merged where possible. Footprints may not touch these.
    pub no_build: Vec<Polygon>,
}

/// Subtract the road network and any exclusion areas (parks, ponds) from the boundary. If the
/// merging itself fails on degenerate geometry, the unmerged pieces are kept for display and the
/// whole boundary is used for placement; the overlap checks against `no_build` still apply.
pub fn compute_buildable_area(
    boundary: &Polygon,
    roads: &RoadNetwork,
    exclusions: &[Polygon],
) -> BuildableArea {
    let mut pieces = roads.merged.clone();
    pieces.extend(exclusions.to_vec());
    if pieces.is_empty() {
        return BuildableArea {
            polygons: vec![boundary.clone()],
            no_build: Vec::new(),
        };
    }

    let no_build = match Polygon::union_all(pieces.clone()) {
        Ok(merged) => merged,
        Err(err) => {
            warn!(
                "Couldn't merge the no-build area ({}); placement will use the whole boundary",
                err
            );
            return BuildableArea {
                polygons: vec![boundary.clone()],
                no_build: pieces,
            };
        }
    };

    let mut buildable = vec![boundary.clone()];
    for chunk in &no_build {
        buildable = buildable.iter().flat_map(|b| b.difference(chunk)).collect();
        if buildable.is_empty() {
            break;
        }
    }
    BuildableArea {
        polygons: buildable,
        no_build,
    }
}

/// Headline numbers for one layout, shown to the user after every regeneration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SiteStats {
    pub site_m2: f64,
    pub site_hectares: f64,
    pub buildable_m2: f64,
    pub homes: usize,
    pub homes_per_hectare: f64,
}

impl SiteStats {
    pub fn new(boundary: &Polygon, buildable: &BuildableArea, footprints: &[Footprint]) -> SiteStats {
        let site_m2 = boundary.area();
        let site_hectares = site_m2 / 10_000.0;
        let buildable_m2 = buildable.polygons.iter().map(|p| p.area()).sum();
        let homes = footprints.len();
        SiteStats {
            site_m2,
            site_hectares,
            buildable_m2,
            homes,
            // A degenerate boundary has ~no area; don't divide by it.
            homes_per_hectare: (homes as f64) / site_hectares.max(1e-9),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::{Distance, PolyLine, Pt2D, Ring};
    use crate::{plan_road_network, RoadParams, SpineStrategy};

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
    fn no_roads_means_everything_is_buildable() {
        let boundary = boundary_100m();
        let buildable = compute_buildable_area(&boundary, &RoadNetwork::default(), &[]);
        assert_eq!(buildable.polygons, vec![boundary]);
        assert!(buildable.no_build.is_empty());
    }

    #[test]
    fn roads_and_exclusions_are_subtracted() {
        let boundary = boundary_100m();
        let access = PolyLine::must_new(vec![Pt2D::new(50.0, -20.0), Pt2D::new(50.0, 10.0)]);
        let roads = plan_road_network(
            &boundary,
            &access,
            &RoadParams::default(),
            SpineStrategy::JunctionAligned,
        );
        let park = Polygon::rectangle_centered(
            Pt2D::new(20.0, 70.0),
            Distance::meters(30.0),
            Distance::meters(30.0),
        );
        let buildable = compute_buildable_area(&boundary, &roads, &[park.clone()]);

        let buildable_m2: f64 = buildable.polygons.iter().map(|p| p.area()).sum();
        let carved_m2: f64 = buildable.no_build.iter().map(|p| p.area()).sum();
        assert!(buildable_m2 > 0.0);
        assert!((buildable_m2 + carved_m2 - boundary.area()).abs() < 1.0);
        for piece in &buildable.polygons {
            assert!(!piece.intersects_polyline(&roads.corridors[0].centerline));
        }
    }

    #[test]
    fn fully_covered_boundary_is_valid_and_empty() {
        let boundary = boundary_100m();
        let everything = Polygon::rectangle_centered(
            Pt2D::new(50.0, 50.0),
            Distance::meters(300.0),
            Distance::meters(300.0),
        );
        let buildable =
            compute_buildable_area(&boundary, &RoadNetwork::default(), &[everything]);
        assert!(buildable.polygons.is_empty());

        let stats = SiteStats::new(&boundary, &buildable, &[]);
        assert_eq!(stats.homes, 0);
        assert_eq!(stats.homes_per_hectare, 0.0);
        assert_eq!(stats.buildable_m2, 0.0);
        assert_eq!(stats.site_hectares, 1.0);
    }
}
