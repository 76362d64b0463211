use crate::{Point, WalkableConfig};

pub use visibility::VisibilityWalkable;

mod visibility;

/// Walkable area of a single floor.
///
/// Implementations answer one question: how to walk between two points on
/// this floor without crossing any obstacle. An empty path is the normal
/// "no route" answer and not an error.
pub trait Walkable {
    fn new(boundary: Vec<Point>, config: &WalkableConfig) -> Self
    where
        Self: Sized;

    /// Adds an impassable polyline.
    fn add_polyline(&mut self, polyline: Vec<Point>);

    /// Ordered points from `from` to `to`, both included, or empty when the
    /// two are not connected on this floor.
    fn find_path(&self, from: Point, to: Point) -> Vec<Point>;
}
