use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use geom::{PolyLine, Polygon};

use crate::{
    compute_buildable_area, place_housing_along_spine, place_housing_grid, plan_road_network,
    Alignment, BuildableArea, Footprint, FootprintSpec, RoadNetwork, RoadParams, SiteStats,
    SpineStrategy,
};

/// The caller-owned inputs: whatever the user has drawn so far.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Site {
    pub boundary: Option<Polygon>,
    pub access: Option<PolyLine>,
    /// Parks and other areas excluded from housing.
    pub exclusions: Vec<Polygon>,
}

/// Which housing strategy fills the site.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PlacementMode {
    /// Rows of homes along each spine centerline.
    AlongSpines,
    /// A rotated grid filling the buildable area.
    Grid(Alignment),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanParams {
    pub roads: RoadParams,
    pub homes: FootprintSpec,
    pub strategy: SpineStrategy,
    pub placement: PlacementMode,
}

impl Default for PlanParams {
    fn default() -> Self {
        PlanParams {
            roads: RoadParams::default(),
            homes: FootprintSpec::default(),
            strategy: SpineStrategy::JunctionAligned,
            placement: PlacementMode::AlongSpines,
        }
    }
}

/// Everything one planning pass produces. Regeneration replaces the whole thing; nothing is
/// patched incrementally.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayoutResult {
    pub roads: RoadNetwork,
    pub buildable: BuildableArea,
    pub footprints: Vec<Footprint>,
    pub stats: SiteStats,
}

/// Run the full planning pass: road network, buildable area, housing, statistics. A pure
/// function of its inputs; fails only when something hasn't been drawn yet.
pub fn generate(site: &Site, params: &PlanParams) -> Result<LayoutResult> {
    let boundary = match &site.boundary {
        Some(b) => b,
        None => bail!("No boundary drawn yet"),
    };
    let access = match &site.access {
        Some(a) => a,
        None => bail!("No access road drawn yet"),
    };

    let roads = plan_road_network(boundary, access, &params.roads, params.strategy);
    let buildable = compute_buildable_area(boundary, &roads, &site.exclusions);
    let footprints = match params.placement {
        PlacementMode::AlongSpines => {
            let mut list = Vec::new();
            for spine in roads.spines() {
                list.extend(place_housing_along_spine(
                    &spine.centerline,
                    boundary,
                    &buildable.no_build,
                    &params.homes,
                ));
            }
            list
        }
        PlacementMode::Grid(alignment) => place_housing_grid(&buildable, alignment, &params.homes),
    };
    let stats = SiteStats::new(boundary, &buildable, &footprints);
    info!(
        "Planned {} road corridors and {} homes ({:.1}/ha)",
        roads.corridors.len(),
        stats.homes,
        stats.homes_per_hectare
    );

    Ok(LayoutResult {
        roads,
        buildable,
        footprints,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::{Pt2D, Ring};

    #[test]
    fn missing_input_is_an_error_before_any_geometry_runs() {
        let mut site = Site::default();
        assert!(generate(&site, &PlanParams::default()).is_err());

        site.boundary = Some(
            Ring::must_new(vec![
                Pt2D::new(0.0, 0.0),
                Pt2D::new(100.0, 0.0),
                Pt2D::new(100.0, 100.0),
                Pt2D::new(0.0, 100.0),
                Pt2D::new(0.0, 0.0),
            ])
            .into_polygon(),
        );
        assert!(generate(&site, &PlanParams::default()).is_err());

        site.access = Some(PolyLine::must_new(vec![
            Pt2D::new(50.0, -20.0),
            Pt2D::new(50.0, 10.0),
        ]));
        assert!(generate(&site, &PlanParams::default()).is_ok());
    }
}
