use serde::{Deserialize, Serialize};

use geom::{PolyLine, Pt2D};

/// Collecting the clicks that define an access road, as an explicit state machine instead of
/// ambient module state. The UI feeds events in; the finished polyline pops out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SketchMode {
    Idle,
    CollectingPoints(Vec<Pt2D>),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SketchEvent {
    Start,
    Click(Pt2D),
    Cancel,
}

/// Feed one input event through the state machine. Once two points are captured, the access
/// polyline is emitted and the mode returns to Idle.
pub fn handle_sketch_event(mode: SketchMode, event: SketchEvent) -> (SketchMode, Option<PolyLine>) {
    match (mode, event) {
        (_, SketchEvent::Cancel) => (SketchMode::Idle, None),
        (SketchMode::Idle, SketchEvent::Start) => (SketchMode::CollectingPoints(Vec::new()), None),
        // Clicks while idle don't mean anything.
        (SketchMode::Idle, SketchEvent::Click(_)) => (SketchMode::Idle, None),
        (SketchMode::CollectingPoints(pts), SketchEvent::Start) => {
            (SketchMode::CollectingPoints(pts), None)
        }
        (SketchMode::CollectingPoints(mut pts), SketchEvent::Click(pt)) => {
            // A double-click on the same spot doesn't make a road.
            if pts.last().map_or(false, |last| last.epsilon_eq(pt)) {
                return (SketchMode::CollectingPoints(pts), None);
            }
            pts.push(pt);
            if pts.len() == 2 {
                // The points are distinct, so this can't fail.
                (SketchMode::Idle, Some(PolyLine::must_new(pts)))
            } else {
                (SketchMode::CollectingPoints(pts), None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_clicks_make_a_road() {
        let (mode, out) = handle_sketch_event(SketchMode::Idle, SketchEvent::Start);
        assert!(out.is_none());
        let (mode, out) = handle_sketch_event(mode, SketchEvent::Click(Pt2D::new(0.0, 0.0)));
        assert!(out.is_none());
        let (mode, out) = handle_sketch_event(mode, SketchEvent::Click(Pt2D::new(10.0, 0.0)));
        assert_eq!(mode, SketchMode::Idle);
        let road = out.unwrap();
        assert_eq!(
            road.points(),
            &vec![Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 0.0)]
        );
    }

    #[test]
    fn cancel_discards_from_any_state() {
        let (mode, _) = handle_sketch_event(SketchMode::Idle, SketchEvent::Start);
        let (mode, _) = handle_sketch_event(mode, SketchEvent::Click(Pt2D::new(0.0, 0.0)));
        let (mode, out) = handle_sketch_event(mode, SketchEvent::Cancel);
        assert_eq!(mode, SketchMode::Idle);
        assert!(out.is_none());
    }

    #[test]
    fn repeated_click_is_ignored() {
        let (mode, _) = handle_sketch_event(SketchMode::Idle, SketchEvent::Start);
        let (mode, _) = handle_sketch_event(mode, SketchEvent::Click(Pt2D::new(5.0, 5.0)));
        let (mode, out) = handle_sketch_event(mode, SketchEvent::Click(Pt2D::new(5.0, 5.0)));
        assert!(out.is_none());
        assert_eq!(mode, SketchMode::CollectingPoints(vec![Pt2D::new(5.0, 5.0)]));
    }
}
