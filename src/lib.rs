//! Multi-floor indoor routing.
//!
//! Every floor owns a 2D walkable area that can answer "how do I walk from
//! here to there on this floor". Named waypoints (stairs, elevators,
//! doorways) are placed on one or more floors and tied together through a
//! waypoint graph. [`FloorRouter`] answers cross-floor queries by searching
//! that graph and stitching the per-floor walks back together.
//!
//! ```
//! use floor_router::{FloorRouter, PathSegment, Placement, Point};
//!
//! let square = vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(10.0, 0.0),
//!     Point::new(10.0, 10.0),
//!     Point::new(0.0, 10.0),
//! ];
//!
//! let mut router = FloorRouter::new();
//! router.add_floor("1", square.clone(), vec![]);
//! router.add_floor("2", square, vec![]);
//! router.add_waypoint(
//!     "elevator",
//!     &[Placement::new("1", 1.0, 1.0), Placement::new("2", 1.0, 1.0)],
//! );
//!
//! let route = router
//!     .find_path("1", Point::new(0.0, 0.0), "2", Point::new(2.0, 2.0))
//!     .unwrap();
//! assert!(route
//!     .segments()
//!     .iter()
//!     .any(|segment| matches!(segment, PathSegment::Waypoint { name, .. } if name == "elevator")));
//! ```

mod config;
mod error;
mod floors;
pub mod geometry;
mod graph;
mod route;
mod router;
mod search;
mod walkable;
mod waypoints;

pub use config::{RouterConfig, SearchConfig, WalkableConfig};
pub use error::{ConfigError, RouteError};
pub use floors::{Floor, FloorRegistry, PlacedWaypoint};
pub use graph::Graph;
pub use route::{PathSegment, Route};
pub use router::{FloorRouter, GraphStats};
pub use search::{AStar, GraphSearch, Located};
pub use walkable::{VisibilityWalkable, Walkable};
pub use waypoints::{Placement, TemporaryNodes, WaypointGraph, WaypointNode};

use serde::{Deserialize, Serialize};

pub type NodeIdx = u32;

/// Planar position on a floor. Latitude is treated as the first axis and
/// longitude as the second; no spherical correction is applied.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.lat - other.lat).powi(2) + (self.lng - other.lng).powi(2)).sqrt()
    }
}

impl From<[f64; 2]> for Point {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        [point.lat, point.lng]
    }
}

impl From<(f64, f64)> for Point {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}
