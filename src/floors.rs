use rustc_hash::FxHashMap;

use crate::{NodeIdx, Point, Walkable, WalkableConfig};

type HashMap<K, V> = FxHashMap<K, V>;

/// A named waypoint as placed on one floor.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedWaypoint {
    pub node: NodeIdx,
    pub name: String,
    pub position: Point,
}

pub struct Floor<W> {
    id: String,
    boundary: Vec<Point>,
    obstacles: Vec<Vec<Point>>,
    walkable: W,
    waypoints: Vec<PlacedWaypoint>,
}

impl<W: Walkable> Floor<W> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn boundary(&self) -> &[Point] {
        &self.boundary
    }

    pub fn obstacles(&self) -> &[Vec<Point>] {
        &self.obstacles
    }

    pub fn walkable(&self) -> &W {
        &self.walkable
    }

    /// Waypoints in placement order.
    pub fn waypoints(&self) -> &[PlacedWaypoint] {
        &self.waypoints
    }

    pub fn local_path(&self, from: Point, to: Point) -> Vec<Point> {
        self.walkable.find_path(from, to)
    }
}

/// Floors by id, each with its walkable area and the waypoints placed on it.
///
/// Knows nothing about how waypoints are connected to each other; it only
/// remembers which graph node stands for each placement.
pub struct FloorRegistry<W> {
    config: WalkableConfig,
    floors: Vec<Floor<W>>,
    index: HashMap<String, usize>,
}

impl<W: Walkable> FloorRegistry<W> {
    pub fn new(config: WalkableConfig) -> Self {
        Self {
            config,
            floors: vec![],
            index: HashMap::default(),
        }
    }

    /// Registers a floor. Registering an id again replaces the floor and
    /// empties its waypoint list; the replaced floor is handed back so the
    /// caller can retire its waypoints.
    pub fn add_floor(
        &mut self,
        id: impl Into<String>,
        boundary: Vec<Point>,
        obstacles: Vec<Vec<Point>>,
    ) -> Option<Floor<W>> {
        let id = id.into();

        let mut walkable = W::new(boundary.clone(), &self.config);
        for obstacle in &obstacles {
            walkable.add_polyline(obstacle.clone());
        }

        let floor = Floor {
            id: id.clone(),
            boundary,
            obstacles,
            walkable,
            waypoints: vec![],
        };

        match self.index.get(&id) {
            Some(&i) => Some(std::mem::replace(&mut self.floors[i], floor)),
            None => {
                self.index.insert(id, self.floors.len());
                self.floors.push(floor);
                None
            }
        }
    }

    /// Adds an obstacle to a registered floor. Returns `false` and changes
    /// nothing when the floor is unknown.
    pub fn add_obstacle(&mut self, floor_id: &str, polyline: Vec<Point>) -> bool {
        let Some(floor) = self.get_mut(floor_id) else {
            return false;
        };

        floor.walkable.add_polyline(polyline.clone());
        floor.obstacles.push(polyline);
        true
    }

    /// Walk between two points on one floor. Empty when there is no such
    /// walk, including when the floor is unknown.
    pub fn local_path(&self, floor_id: &str, from: Point, to: Point) -> Vec<Point> {
        self.get(floor_id)
            .map(|floor| floor.local_path(from, to))
            .unwrap_or_default()
    }

    pub fn get(&self, floor_id: &str) -> Option<&Floor<W>> {
        self.index.get(floor_id).map(|&i| &self.floors[i])
    }

    fn get_mut(&mut self, floor_id: &str) -> Option<&mut Floor<W>> {
        self.index.get(floor_id).map(|&i| &mut self.floors[i])
    }

    pub fn contains(&self, floor_id: &str) -> bool {
        self.index.contains_key(floor_id)
    }

    /// Waypoints placed on a floor, empty when the floor is unknown.
    pub fn waypoints(&self, floor_id: &str) -> &[PlacedWaypoint] {
        self.get(floor_id).map(Floor::waypoints).unwrap_or(&[])
    }

    pub fn push_waypoint(&mut self, floor_id: &str, waypoint: PlacedWaypoint) -> bool {
        let Some(floor) = self.get_mut(floor_id) else {
            return false;
        };

        floor.waypoints.push(waypoint);
        true
    }

    /// Floor ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.floors.iter().map(|floor| floor.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.floors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }
}
