use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{FloorRegistry, Graph, Located, NodeIdx, PlacedWaypoint, Point, Walkable};

type HashMap<K, V> = FxHashMap<K, V>;

#[derive(Clone, Debug, PartialEq)]
pub enum WaypointNode {
    /// Floor-agnostic router for one waypoint name. Never has a position.
    Hub { name: String },
    /// A waypoint as placed on one floor.
    Placed {
        name: String,
        floor_id: String,
        position: Point,
    },
    /// Start or end of a single query.
    Temporary { floor_id: String, position: Point },
}

impl WaypointNode {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Hub { name } | Self::Placed { name, .. } => Some(name.as_str()),
            Self::Temporary { .. } => None,
        }
    }

    pub fn floor_id(&self) -> Option<&str> {
        match self {
            Self::Hub { .. } => None,
            Self::Placed { floor_id, .. } | Self::Temporary { floor_id, .. } => {
                Some(floor_id.as_str())
            }
        }
    }

    pub fn position(&self) -> Option<Point> {
        match self {
            Self::Hub { .. } => None,
            Self::Placed { position, .. } | Self::Temporary { position, .. } => Some(*position),
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::Temporary { .. })
    }
}

impl Located for WaypointNode {
    fn location(&self) -> Option<(&str, Point)> {
        match self {
            Self::Hub { .. } => None,
            Self::Placed {
                floor_id, position, ..
            }
            | Self::Temporary { floor_id, position } => Some((floor_id.as_str(), *position)),
        }
    }
}

/// Where a named waypoint sits on one floor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub floor_id: String,
    pub lat: f64,
    pub lng: f64,
}

impl Placement {
    pub fn new(floor_id: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            floor_id: floor_id.into(),
            lat,
            lng,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.lat, self.lng)
    }
}

/// Cross-floor connectivity between named waypoints.
///
/// Each name gets one hub node; each placement of the name gets a node on
/// its floor, tied to the hub. Placements on the same floor are tied to each
/// other directly when a local path between them existed at the time the
/// later one was placed.
#[derive(Default)]
pub struct WaypointGraph {
    graph: Graph<WaypointNode>,
    hubs: HashMap<String, NodeIdx>,
    names: Vec<String>,
}

impl WaypointGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &Graph<WaypointNode> {
        &self.graph
    }

    pub fn hub(&self, name: &str) -> Option<NodeIdx> {
        self.hubs.get(name).copied()
    }

    /// Waypoint names in the order they were first added.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    /// Places `name` on every listed floor that is registered and returns
    /// how many placements were made. Placements on unknown floors are
    /// skipped.
    pub fn add_waypoint<W: Walkable>(
        &mut self,
        floors: &mut FloorRegistry<W>,
        name: &str,
        placements: &[Placement],
    ) -> usize {
        let hub = self.ensure_hub(name);
        let mut placed = 0;

        for placement in placements {
            let floor_id = placement.floor_id.as_str();
            if !floors.contains(floor_id) {
                log::warn!("Dropping placement of `{name}` on unknown floor `{floor_id}`");
                continue;
            }

            let position = placement.position();
            let node = self.graph.add_node(WaypointNode::Placed {
                name: name.to_owned(),
                floor_id: floor_id.to_owned(),
                position,
            });
            self.graph.add_mutual_arc(hub, node);

            let mut shortcuts = 0;
            for existing in floors.waypoints(floor_id) {
                if !floors
                    .local_path(floor_id, existing.position, position)
                    .is_empty()
                    && self.graph.add_mutual_arc(existing.node, node)
                {
                    shortcuts += 1;
                }
            }

            floors.push_waypoint(
                floor_id,
                PlacedWaypoint {
                    node,
                    name: name.to_owned(),
                    position,
                },
            );
            placed += 1;

            log::debug!(
                "Placed `{name}` on floor `{floor_id}` at ({}, {}) with {shortcuts} shortcuts",
                position.lat,
                position.lng
            );
        }

        placed
    }

    fn ensure_hub(&mut self, name: &str) -> NodeIdx {
        if let Some(&hub) = self.hubs.get(name) {
            return hub;
        }

        let hub = self.graph.add_node(WaypointNode::Hub {
            name: name.to_owned(),
        });
        self.hubs.insert(name.to_owned(), hub);
        self.names.push(name.to_owned());
        hub
    }

    /// Drops the nodes of placements whose floor was replaced. Their hubs
    /// stay, possibly with no placements left.
    pub fn retire_placements(&mut self, placements: &[PlacedWaypoint]) {
        for placement in placements {
            if matches!(self.graph.get(placement.node), Some(WaypointNode::Placed { .. })) {
                self.graph.remove_node(placement.node);
            }
        }
    }

    /// True if `point` has a local path to at least one waypoint on its
    /// floor.
    pub fn is_reachable<W: Walkable>(
        &self,
        floors: &FloorRegistry<W>,
        floor_id: &str,
        point: Point,
    ) -> bool {
        floors
            .waypoints(floor_id)
            .iter()
            .any(|waypoint| !floors.local_path(floor_id, point, waypoint.position).is_empty())
    }

    /// Adds a query node at `point`, tied to every waypoint on its floor that
    /// it can walk to. Pair with [`remove_temporary`](Self::remove_temporary),
    /// or use [`TemporaryNodes`] which does so on drop.
    pub fn inject_temporary<W: Walkable>(
        &mut self,
        floors: &FloorRegistry<W>,
        floor_id: &str,
        point: Point,
    ) -> NodeIdx {
        let node = self.graph.add_node(WaypointNode::Temporary {
            floor_id: floor_id.to_owned(),
            position: point,
        });

        for waypoint in floors.waypoints(floor_id) {
            if !floors.local_path(floor_id, point, waypoint.position).is_empty() {
                self.graph.add_mutual_arc(node, waypoint.node);
            }
        }

        log::trace!(
            "Injected temporary node {node} on floor `{floor_id}` with {} arcs",
            self.graph.neighbors(node).len()
        );
        node
    }

    /// Removes a query node and its arcs. Persistent nodes are left alone.
    pub fn remove_temporary(&mut self, node: NodeIdx) -> bool {
        match self.graph.get(node) {
            Some(WaypointNode::Temporary { .. }) => self.graph.remove_node(node).is_some(),
            _ => false,
        }
    }

    pub fn temporaries(&mut self) -> TemporaryNodes<'_> {
        TemporaryNodes {
            graph: self,
            nodes: vec![],
        }
    }
}

/// Query nodes that are removed from the graph when this guard is dropped,
/// whichever way the query ends.
pub struct TemporaryNodes<'g> {
    graph: &'g mut WaypointGraph,
    nodes: Vec<NodeIdx>,
}

impl TemporaryNodes<'_> {
    pub fn inject<W: Walkable>(
        &mut self,
        floors: &FloorRegistry<W>,
        floor_id: &str,
        point: Point,
    ) -> NodeIdx {
        let node = self.graph.inject_temporary(floors, floor_id, point);
        self.nodes.push(node);
        node
    }

    pub fn graph(&self) -> &WaypointGraph {
        &*self.graph
    }
}

impl Drop for TemporaryNodes<'_> {
    fn drop(&mut self) {
        // Reverse order so the freed slots come back in the same order next time
        while let Some(node) = self.nodes.pop() {
            self.graph.remove_temporary(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{VisibilityWalkable, WalkableConfig};

    fn square(size: f64) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
        ]
    }

    fn wall() -> Vec<Point> {
        vec![Point::new(5.0, 0.0), Point::new(5.0, 10.0)]
    }

    fn building() -> FloorRegistry<VisibilityWalkable> {
        let mut floors = FloorRegistry::new(WalkableConfig::default());
        floors.add_floor("1", square(10.0), vec![]);
        floors.add_floor("2", square(10.0), vec![wall()]);
        floors
    }

    fn placed_node(
        floors: &FloorRegistry<VisibilityWalkable>,
        floor_id: &str,
        name: &str,
    ) -> NodeIdx {
        floors
            .waypoints(floor_id)
            .iter()
            .find(|waypoint| waypoint.name == name)
            .map(|waypoint| waypoint.node)
            .unwrap()
    }

    #[test]
    fn test_add_waypoint_links_hub() {
        let mut floors = building();
        let mut waypoints = WaypointGraph::new();

        let placed = waypoints.add_waypoint(
            &mut floors,
            "elevator",
            &[Placement::new("1", 1.0, 1.0), Placement::new("2", 1.0, 1.0)],
        );
        assert_eq!(placed, 2);

        let hub = waypoints.hub("elevator").unwrap();
        let on_1 = placed_node(&floors, "1", "elevator");
        let on_2 = placed_node(&floors, "2", "elevator");

        let graph = waypoints.graph();
        assert_eq!(graph.neighbors(hub), &[on_1, on_2]);
        assert_eq!(graph.get(hub).unwrap().position(), None);
        assert_eq!(graph.get(on_2).unwrap().floor_id(), Some("2"));
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.arc_count(), 2);
    }

    #[test]
    fn test_hub_reused_for_same_name() {
        let mut floors = building();
        let mut waypoints = WaypointGraph::new();

        waypoints.add_waypoint(&mut floors, "stairs", &[Placement::new("1", 1.0, 1.0)]);
        let hub = waypoints.hub("stairs");
        waypoints.add_waypoint(&mut floors, "stairs", &[Placement::new("2", 1.0, 1.0)]);

        assert_eq!(waypoints.hub("stairs"), hub);
        assert_eq!(waypoints.names().collect::<Vec<_>>(), vec!["stairs"]);
        assert_eq!(waypoints.graph().neighbors(hub.unwrap()).len(), 2);
    }

    #[test]
    fn test_unknown_floor_placement_dropped() {
        let mut floors = building();
        let mut waypoints = WaypointGraph::new();

        let placed = waypoints.add_waypoint(
            &mut floors,
            "elevator",
            &[Placement::new("9", 1.0, 1.0), Placement::new("1", 1.0, 1.0)],
        );

        assert_eq!(placed, 1);
        assert_eq!(floors.waypoints("1").len(), 1);
        assert_eq!(waypoints.graph().node_count(), 2);
    }

    #[test]
    fn test_shortcuts_follow_local_reachability() {
        let mut floors = building();
        let mut waypoints = WaypointGraph::new();

        for (name, lat, lng) in [("west", 1.0, 1.0), ("east", 9.0, 9.0)] {
            waypoints.add_waypoint(
                &mut floors,
                name,
                &[Placement::new("1", lat, lng), Placement::new("2", lat, lng)],
            );
        }
        waypoints.add_waypoint(&mut floors, "north", &[Placement::new("2", 2.0, 9.0)]);

        let graph = waypoints.graph();
        let linked = |floor_id: &str, a: &str, b: &str| {
            graph.has_arc(
                placed_node(&floors, floor_id, a),
                placed_node(&floors, floor_id, b),
            )
        };

        // open floor
        assert!(linked("1", "west", "east"));
        // split by the wall
        assert!(!linked("2", "west", "east"));
        assert!(linked("2", "west", "north"));
        assert!(!linked("2", "east", "north"));
    }

    #[test]
    fn test_is_reachable() {
        let mut floors = building();
        let mut waypoints = WaypointGraph::new();
        waypoints.add_waypoint(&mut floors, "west", &[Placement::new("2", 1.0, 1.0)]);

        assert!(waypoints.is_reachable(&floors, "2", Point::new(3.0, 3.0)));
        assert!(!waypoints.is_reachable(&floors, "2", Point::new(8.0, 3.0)));
        // no waypoints at all
        assert!(!waypoints.is_reachable(&floors, "1", Point::new(3.0, 3.0)));
        assert!(!waypoints.is_reachable(&floors, "9", Point::new(3.0, 3.0)));
    }

    #[test]
    fn test_inject_connects_only_reachable_waypoints() {
        let mut floors = building();
        let mut waypoints = WaypointGraph::new();
        waypoints.add_waypoint(&mut floors, "west", &[Placement::new("2", 1.0, 1.0)]);
        waypoints.add_waypoint(&mut floors, "east", &[Placement::new("2", 9.0, 9.0)]);

        let west = placed_node(&floors, "2", "west");
        let node = waypoints.inject_temporary(&floors, "2", Point::new(2.0, 2.0));

        assert_eq!(waypoints.graph().neighbors(node), &[west]);
        assert!(waypoints.graph().get(node).unwrap().is_temporary());

        assert!(waypoints.remove_temporary(node));
        assert!(!waypoints.remove_temporary(node));
        assert_eq!(waypoints.graph().neighbors(west).len(), 1);
    }

    #[test]
    fn test_remove_temporary_ignores_persistent_nodes() {
        let mut floors = building();
        let mut waypoints = WaypointGraph::new();
        waypoints.add_waypoint(&mut floors, "west", &[Placement::new("1", 1.0, 1.0)]);

        let hub = waypoints.hub("west").unwrap();
        assert!(!waypoints.remove_temporary(hub));
        assert!(waypoints.graph().contains(hub));
    }

    #[test]
    fn test_guard_removes_on_drop() {
        let mut floors = building();
        let mut waypoints = WaypointGraph::new();
        waypoints.add_waypoint(
            &mut floors,
            "lift",
            &[Placement::new("1", 1.0, 1.0), Placement::new("2", 1.0, 1.0)],
        );

        let nodes_before = waypoints.graph().node_count();
        let arcs_before = waypoints.graph().arc_count();

        let (from, to) = {
            let mut temporaries = waypoints.temporaries();
            let from = temporaries.inject(&floors, "1", Point::new(3.0, 3.0));
            let to = temporaries.inject(&floors, "2", Point::new(3.0, 3.0));
            assert_eq!(temporaries.graph().graph().node_count(), nodes_before + 2);
            assert_eq!(temporaries.graph().graph().arc_count(), arcs_before + 2);
            (from, to)
        };

        assert_eq!(waypoints.graph().node_count(), nodes_before);
        assert_eq!(waypoints.graph().arc_count(), arcs_before);

        let mut temporaries = waypoints.temporaries();
        assert_eq!(temporaries.inject(&floors, "1", Point::new(3.0, 3.0)), from);
        assert_eq!(temporaries.inject(&floors, "2", Point::new(3.0, 3.0)), to);
    }

    #[test]
    fn test_retire_placements() {
        let mut floors = building();
        let mut waypoints = WaypointGraph::new();
        waypoints.add_waypoint(
            &mut floors,
            "lift",
            &[Placement::new("1", 1.0, 1.0), Placement::new("2", 1.0, 1.0)],
        );

        let replaced = floors.add_floor("2", square(10.0), vec![]).unwrap();
        waypoints.retire_placements(replaced.waypoints());

        let hub = waypoints.hub("lift").unwrap();
        assert_eq!(waypoints.graph().neighbors(hub).len(), 1);
        assert_eq!(waypoints.graph().node_count(), 2);
    }
}
