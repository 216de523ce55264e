//! A synthetic foothills region: nine trails exercising every event the
//! pipeline handles — an X crossing, two T junctions, a fused trailhead
//! cluster, a chain of maintenance-split fragments, and one closed loop.
//!
//! Coordinates sit near Boulder, Colorado (−105.29, 40.00); offsets are in
//! meters east/north of that anchor.

use tn_core::{Coord3, Polyline, RawGeometry, RawTrail, TrailAttrs, meters_to_degrees};

const ANCHOR_LON: f64 = -105.29;
const ANCHOR_LAT: f64 = 40.00;

/// Meter offsets from the anchor, with elevation.
fn c(x: f64, y: f64, ele: f64) -> Coord3 {
    Coord3::new(
        ANCHOR_LON + meters_to_degrees(x),
        ANCHOR_LAT + meters_to_degrees(y),
        ele,
    )
}

fn trail(
    source_id: &str,
    name: &str,
    surface: &str,
    difficulty: &str,
    pts: &[(f64, f64, f64)],
) -> RawTrail {
    RawTrail {
        source_id: source_id.to_string(),
        source:    "demo".to_string(),
        attrs: TrailAttrs {
            name:       name.to_string(),
            surface:    surface.to_string(),
            difficulty: difficulty.to_string(),
            trail_type: "hiking".to_string(),
        },
        geometry: RawGeometry::LineString(Polyline::new(
            pts.iter().map(|&(x, y, e)| c(x, y, e)).collect(),
        )),
    }
}

/// The demo trail set.
pub fn trails() -> Vec<RawTrail> {
    vec![
        // North-south ridge line, crossed and joined by everything else.
        trail(
            "demo-100",
            "Ridge Trail",
            "dirt",
            "moderate",
            &[
                (0.0, 0.0, 1740.0),
                (5.0, 220.0, 1768.0),
                (-10.0, 450.0, 1801.0),
                (0.0, 700.0, 1835.0),
            ],
        ),
        // East-west connector crossing the ridge mid-slope (X event).
        trail(
            "demo-101",
            "Mesa Crossing",
            "dirt",
            "easy",
            &[(-260.0, 350.0, 1780.0), (250.0, 330.0, 1772.0)],
        ),
        // Spur whose end stops about 2 m short of the ridge (T event).
        trail(
            "demo-102",
            "Quarry Spur",
            "rock",
            "hard",
            &[(-180.0, 120.0, 1749.0), (0.5, 108.0, 1752.0)],
        ),
        // Access path whose trailhead sits 2 m from the ridge start
        // (endpoint fuse).
        trail(
            "demo-103",
            "Canyon Access",
            "gravel",
            "easy",
            &[(1.0, -1.8, 1739.0), (150.0, -160.0, 1712.0)],
        ),
        // The same long traverse, delivered as three maintenance fragments
        // (degree-2 chain for the merger).
        trail(
            "demo-104",
            "Sunrise Traverse",
            "dirt",
            "moderate",
            &[(250.0, 330.0, 1772.0), (420.0, 360.0, 1788.0)],
        ),
        trail(
            "demo-105",
            "Sunrise Traverse",
            "dirt",
            "moderate",
            &[(420.0, 360.0, 1788.0), (600.0, 420.0, 1803.0)],
        ),
        trail(
            "demo-106",
            "Sunrise Traverse",
            "dirt",
            "moderate",
            &[(600.0, 420.0, 1803.0), (780.0, 510.0, 1826.0)],
        ),
        // A lollipop loop hanging off the traverse (anchored cycle).
        trail(
            "demo-107",
            "Overlook Loop",
            "dirt",
            "easy",
            &[
                (600.0, 420.0, 1803.0),
                (660.0, 500.0, 1815.0),
                (600.0, 560.0, 1822.0),
                (540.0, 500.0, 1812.0),
                (600.0, 420.0, 1803.0),
            ],
        ),
        // A free-floating closed loop (isolated cycle, promoted).
        trail(
            "demo-108",
            "Pond Loop",
            "boardwalk",
            "easy",
            &[
                (-500.0, 600.0, 1765.0),
                (-420.0, 620.0, 1766.0),
                (-430.0, 700.0, 1768.0),
                (-520.0, 680.0, 1767.0),
                (-500.0, 600.0, 1765.0),
            ],
        ),
    ]
}
