use serde::{Deserialize, Serialize};

use crate::Point;

/// One step of a route.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PathSegment {
    Walk {
        #[serde(rename = "floorId")]
        floor_id: String,
        #[serde(rename = "latlng")]
        position: Point,
    },
    Waypoint {
        #[serde(rename = "floorId")]
        floor_id: String,
        name: String,
        /// For a floor change, the floor on the other side of it.
        #[serde(
            rename = "connectedFloorId",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        connected_floor_id: Option<String>,
    },
}

impl PathSegment {
    pub fn walk(floor_id: impl Into<String>, position: Point) -> Self {
        Self::Walk {
            floor_id: floor_id.into(),
            position,
        }
    }

    pub fn waypoint(floor_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Waypoint {
            floor_id: floor_id.into(),
            name: name.into(),
            connected_floor_id: None,
        }
    }

    pub fn floor_id(&self) -> &str {
        match self {
            Self::Walk { floor_id, .. } | Self::Waypoint { floor_id, .. } => floor_id,
        }
    }

    pub fn position(&self) -> Option<Point> {
        match self {
            Self::Walk { position, .. } => Some(*position),
            Self::Waypoint { .. } => None,
        }
    }

    pub fn connected_floor_id(&self) -> Option<&str> {
        match self {
            Self::Walk { .. } => None,
            Self::Waypoint {
                connected_floor_id, ..
            } => connected_floor_id.as_deref(),
        }
    }
}

/// Ordered segments from a start point to a destination.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route {
    segments: Vec<PathSegment>,
}

impl Route {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub(crate) fn push_walk(&mut self, floor_id: &str, points: impl IntoIterator<Item = Point>) {
        self.segments.extend(
            points
                .into_iter()
                .map(|position| PathSegment::walk(floor_id, position)),
        );
    }

    pub(crate) fn prepend(&mut self, segment: PathSegment) {
        self.segments.insert(0, segment);
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut PathSegment> {
        self.segments.last_mut()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<PathSegment> {
        self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn first_position(&self) -> Option<Point> {
        self.segments.iter().find_map(PathSegment::position)
    }

    pub fn last_walk_position(&self) -> Option<Point> {
        self.segments.iter().rev().find_map(PathSegment::position)
    }

    /// Floors in the order the route enters them, without repeats of
    /// consecutive segments.
    pub fn floors_visited(&self) -> Vec<&str> {
        let mut floors: Vec<&str> = vec![];
        for segment in &self.segments {
            if floors.last() != Some(&segment.floor_id()) {
                floors.push(segment.floor_id());
            }
        }
        floors
    }

    /// Waypoint segments that mark a change of floor.
    pub fn transitions(&self) -> impl Iterator<Item = &PathSegment> + '_ {
        self.segments
            .iter()
            .filter(|segment| segment.connected_floor_id().is_some())
    }
}

impl IntoIterator for Route {
    type Item = PathSegment;
    type IntoIter = std::vec::IntoIter<PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.into_iter()
    }
}

impl<'a> IntoIterator for &'a Route {
    type Item = &'a PathSegment;
    type IntoIter = std::slice::Iter<'a, PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
