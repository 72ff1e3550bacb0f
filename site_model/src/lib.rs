//! A procedural site-layout engine. Given a hand-drawn site boundary and an access path, derive
//! an internal road network (access spur plus spines), subtract it from the boundary along with
//! any exclusion areas, and fill the remaining land with building footprints.
//!
//! The data flows one way: boundary + access -> edge & alignment analysis -> road network ->
//! buildable area -> housing placement -> statistics. Every pass is a pure function of its
//! inputs; regenerating replaces all prior output. Degenerate geometry along the way downgrades
//! to "that piece is absent" (with a warning logged), never to a failed pass.

#[macro_use]
extern crate log;

mod buildable;
mod edges;
mod housing;
mod roads;
mod site;
mod sketch;

pub use crate::buildable::{compute_buildable_area, BuildableArea, SiteStats};
pub use crate::edges::{inward_sign, longest_edge, nearest_edge, EdgeInfo};
pub use crate::housing::{
    place_housing_along_spine, place_housing_grid, Alignment, Footprint, FootprintSpec, Side,
};
pub use crate::roads::{
    plan_road_network, RoadCorridor, RoadKind, RoadNetwork, RoadParams, SpineStrategy,
};
pub use crate::site::{generate, LayoutResult, PlacementMode, PlanParams, Site};
pub use crate::sketch::{handle_sketch_event, SketchEvent, SketchMode};
