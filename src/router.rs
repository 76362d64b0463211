use crate::{
    AStar, ConfigError, FloorRegistry, GraphSearch, Located, PathSegment, PlacedWaypoint,
    Placement, Point, Route, RouteError, RouterConfig, VisibilityWalkable, Walkable,
    WaypointGraph, WaypointNode,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GraphStats {
    pub nodes: usize,
    pub arcs: usize,
}

/// Routes between arbitrary points of a multi-floor building.
///
/// Queries take `&mut self` because they briefly add their endpoints to the
/// waypoint graph; share a router between threads behind a `Mutex`.
pub struct FloorRouter<W = VisibilityWalkable, S = AStar> {
    floors: FloorRegistry<W>,
    waypoints: WaypointGraph,
    search: S,
}

impl FloorRouter {
    pub fn new() -> Self {
        let config = RouterConfig::default();
        Self::assemble(&config, AStar::new(config.search.clone()))
    }

    /// Fails with [`ConfigError::Invalid`] for values
    /// [`RouterConfig::validate`] rejects.
    pub fn with_config(config: RouterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(&config, AStar::new(config.search.clone())))
    }
}

impl Default for FloorRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Walkable, S: GraphSearch> FloorRouter<W, S> {
    /// Router with a custom graph search. `config` is validated like in
    /// [`FloorRouter::with_config`].
    pub fn with_search(config: &RouterConfig, search: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(config, search))
    }

    fn assemble(config: &RouterConfig, search: S) -> Self {
        Self {
            floors: FloorRegistry::new(config.walkable.clone()),
            waypoints: WaypointGraph::new(),
            search,
        }
    }

    /// Registers a floor, replacing any floor with the same id along with
    /// every waypoint placed on it.
    pub fn add_floor(
        &mut self,
        id: impl Into<String>,
        boundary: Vec<Point>,
        obstacles: Vec<Vec<Point>>,
    ) {
        let id = id.into();
        log::debug!(
            "Adding floor `{id}` with {} boundary points and {} obstacles",
            boundary.len(),
            obstacles.len()
        );

        if let Some(replaced) = self.floors.add_floor(id, boundary, obstacles) {
            log::debug!(
                "Floor `{}` replaced, retiring {} waypoints",
                replaced.id(),
                replaced.waypoints().len()
            );
            self.waypoints.retire_placements(replaced.waypoints());
        }
    }

    /// Adds an obstacle to a floor. Unknown floors are ignored.
    ///
    /// Shortcuts between waypoints already on the floor are not re-checked.
    pub fn add_obstacle(&mut self, floor_id: &str, polyline: Vec<Point>) {
        if !self.floors.add_obstacle(floor_id, polyline) {
            log::warn!("Ignoring obstacle for unknown floor `{floor_id}`");
        }
    }

    /// Places a named waypoint on one or more floors and returns how many
    /// placements were kept. Placements on unknown floors are dropped.
    pub fn add_waypoint(&mut self, name: &str, placements: &[Placement]) -> usize {
        self.waypoints.add_waypoint(&mut self.floors, name, placements)
    }

    pub fn find_path(
        &mut self,
        from_floor: &str,
        from: Point,
        to_floor: &str,
        to: Point,
    ) -> Result<Route, RouteError> {
        if from_floor == to_floor {
            let direct = self.floors.local_path(to_floor, from, to);
            if !direct.is_empty() {
                let mut route = Route::new();
                route.push_walk(to_floor, direct);
                log::debug!("Direct route on floor `{to_floor}` with {} points", route.len());
                return Ok(route);
            }
        }

        for floor_id in [from_floor, to_floor] {
            if !self.floors.contains(floor_id) {
                return Err(RouteError::UnknownFloor(floor_id.to_owned()));
            }
        }

        for (floor_id, point) in [(from_floor, from), (to_floor, to)] {
            if !self.waypoints.is_reachable(&self.floors, floor_id, point) {
                log::debug!(
                    "({}, {}) on floor `{floor_id}` cannot reach any waypoint",
                    point.lat,
                    point.lng
                );
                return Err(RouteError::UnreachableEndpoint {
                    floor_id: floor_id.to_owned(),
                    point,
                });
            }
        }

        let nodes = {
            let mut temporaries = self.waypoints.temporaries();
            let start = temporaries.inject(&self.floors, from_floor, from);
            let goal = temporaries.inject(&self.floors, to_floor, to);

            let graph = temporaries.graph().graph();
            self.search.find(graph, start, goal).map(move |path| {
                path.into_iter()
                    .filter_map(|node| graph.get(node).cloned())
                    .collect::<Vec<_>>()
            })
        };

        let Some(nodes) = nodes else {
            log::debug!("No route from floor `{from_floor}` to floor `{to_floor}`");
            return Err(RouteError::NoPathFound {
                from_floor: from_floor.to_owned(),
                to_floor: to_floor.to_owned(),
            });
        };

        let mut route = self.reconstruct(&nodes);
        route.prepend(PathSegment::walk(from_floor, from));

        log::debug!(
            "Route from floor `{from_floor}` to floor `{to_floor}` through {} nodes, {} segments",
            nodes.len(),
            route.len()
        );
        Ok(route)
    }

    fn reconstruct(&self, nodes: &[WaypointNode]) -> Route {
        let mut route = Route::new();

        for pair in nodes.windows(2) {
            let (prev, node) = (&pair[0], &pair[1]);

            let (floor_id, position) = match node {
                WaypointNode::Hub { .. } => continue,
                WaypointNode::Placed {
                    floor_id, position, ..
                }
                | WaypointNode::Temporary { floor_id, position } => (floor_id.as_str(), *position),
            };

            match prev.location() {
                Some((prev_floor, prev_position)) if prev_floor == floor_id => {
                    route.push_walk(
                        floor_id,
                        self.floors.local_path(floor_id, prev_position, position),
                    );
                    if let WaypointNode::Placed { name, .. } = node {
                        route.push(PathSegment::waypoint(floor_id, name.as_str()));
                    }
                }
                _ => self.push_transition(&mut route, prev, node, floor_id, position),
            }
        }

        route
    }

    /// Entering `node` from a hub, or from another floor.
    fn push_transition(
        &self,
        route: &mut Route,
        prev: &WaypointNode,
        node: &WaypointNode,
        floor_id: &str,
        position: Point,
    ) {
        let left_floor = route.segments().last().map(|segment| segment.floor_id().to_owned());

        if !prev.is_temporary() && left_floor.as_deref() != Some(floor_id) {
            if let Some(PathSegment::Waypoint {
                connected_floor_id, ..
            }) = route.last_mut()
            {
                *connected_floor_id = Some(floor_id.to_owned());
            }
        }

        match node {
            WaypointNode::Placed { name, .. } => route.push(PathSegment::Waypoint {
                floor_id: floor_id.to_owned(),
                name: name.clone(),
                connected_floor_id: left_floor.filter(|left| left != floor_id),
            }),
            _ => route.push(PathSegment::walk(floor_id, position)),
        }
    }

    /// Walk between two points on one floor, empty when there is none.
    pub fn local_path(&self, floor_id: &str, from: Point, to: Point) -> Vec<Point> {
        self.floors.local_path(floor_id, from, to)
    }

    pub fn has_floor(&self, floor_id: &str) -> bool {
        self.floors.contains(floor_id)
    }

    /// Floor ids in registration order.
    pub fn floor_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.floors.ids()
    }

    /// Waypoint names in the order they were first added.
    pub fn waypoint_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.waypoints.names()
    }

    pub fn floor_waypoints(&self, floor_id: &str) -> &[PlacedWaypoint] {
        self.floors.waypoints(floor_id)
    }

    pub fn graph_stats(&self) -> GraphStats {
        let graph = self.waypoints.graph();
        GraphStats {
            nodes: graph.node_count(),
            arcs: graph.arc_count(),
        }
    }

    pub fn floors(&self) -> &FloorRegistry<W> {
        &self.floors
    }

    pub fn waypoints(&self) -> &WaypointGraph {
        &self.waypoints
    }

    pub fn search(&self) -> &S {
        &self.search
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
        ]
    }

    fn two_floors() -> FloorRouter {
        let mut router = FloorRouter::new();
        router.add_floor("1", square(10.0), vec![]);
        router.add_floor("2", square(10.0), vec![]);
        router.add_waypoint(
            "elevator",
            &[Placement::new("1", 1.0, 1.0), Placement::new("2", 1.0, 1.0)],
        );
        router
    }

    #[test]
    fn test_elevator_route_shape() {
        let mut router = two_floors();

        let route = router
            .find_path("1", Point::new(0.0, 0.0), "2", Point::new(2.0, 2.0))
            .unwrap();

        let expected = vec![
            PathSegment::walk("1", Point::new(0.0, 0.0)),
            PathSegment::walk("1", Point::new(0.0, 0.0)),
            PathSegment::walk("1", Point::new(1.0, 1.0)),
            PathSegment::Waypoint {
                floor_id: "1".into(),
                name: "elevator".into(),
                connected_floor_id: Some("2".into()),
            },
            PathSegment::Waypoint {
                floor_id: "2".into(),
                name: "elevator".into(),
                connected_floor_id: Some("1".into()),
            },
            PathSegment::walk("2", Point::new(1.0, 1.0)),
            PathSegment::walk("2", Point::new(2.0, 2.0)),
        ];
        assert_eq!(route.into_segments(), expected);
    }

    #[test]
    fn test_direct_route_on_same_floor() {
        let mut router = two_floors();

        let route = router
            .find_path("1", Point::new(3.0, 3.0), "1", Point::new(8.0, 2.0))
            .unwrap();

        assert_eq!(
            route.into_segments(),
            vec![
                PathSegment::walk("1", Point::new(3.0, 3.0)),
                PathSegment::walk("1", Point::new(8.0, 2.0)),
            ]
        );
    }

    #[test]
    fn test_unknown_floor() {
        let mut router = two_floors();

        let err = router
            .find_path("1", Point::new(0.0, 0.0), "7", Point::new(2.0, 2.0))
            .unwrap_err();
        assert_eq!(err, RouteError::UnknownFloor("7".into()));

        let err = router
            .find_path("7", Point::new(0.0, 0.0), "7", Point::new(2.0, 2.0))
            .unwrap_err();
        assert_eq!(err, RouteError::UnknownFloor("7".into()));
    }

    #[test]
    fn test_unreachable_endpoint() {
        let mut router = two_floors();
        router.add_floor("3", square(10.0), vec![]);

        let err = router
            .find_path("1", Point::new(0.0, 0.0), "3", Point::new(2.0, 2.0))
            .unwrap_err();
        assert_eq!(
            err,
            RouteError::UnreachableEndpoint {
                floor_id: "3".into(),
                point: Point::new(2.0, 2.0),
            }
        );
    }

    #[test]
    fn test_no_path_between_unlinked_floors() {
        let mut router = two_floors();
        router.add_floor("3", square(10.0), vec![]);
        router.add_waypoint("stairs", &[Placement::new("3", 5.0, 5.0)]);

        let err = router
            .find_path("1", Point::new(0.0, 0.0), "3", Point::new(2.0, 2.0))
            .unwrap_err();
        assert_eq!(
            err,
            RouteError::NoPathFound {
                from_floor: "1".into(),
                to_floor: "3".into(),
            }
        );
    }

    #[test]
    fn test_queries_leave_graph_unchanged() {
        let mut router = two_floors();
        let before = router.graph_stats();

        router
            .find_path("1", Point::new(0.0, 0.0), "2", Point::new(2.0, 2.0))
            .unwrap();
        assert_eq!(router.graph_stats(), before);

        router.add_floor("3", square(10.0), vec![]);
        router.add_waypoint("stairs", &[Placement::new("3", 5.0, 5.0)]);
        let before = router.graph_stats();

        router
            .find_path("1", Point::new(0.0, 0.0), "3", Point::new(2.0, 2.0))
            .unwrap_err();
        assert_eq!(router.graph_stats(), before);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = RouterConfig::default();
        config.walkable.corner_offset = 0.0;
        assert!(matches!(
            FloorRouter::with_config(config.clone()),
            Err(ConfigError::Invalid(_))
        ));

        config.walkable.corner_offset = 1e-3;
        config.search.max_expansions = 0;
        let router: Result<FloorRouter, _> =
            FloorRouter::with_search(&config, AStar::default());
        assert!(matches!(router, Err(ConfigError::Invalid(_))));

        config.search.max_expansions = 10;
        assert!(FloorRouter::with_config(config).is_ok());
    }

    #[test]
    fn test_add_obstacle_unknown_floor_is_ignored() {
        let mut router = two_floors();
        router.add_obstacle("9", vec![Point::new(0.0, 5.0), Point::new(10.0, 5.0)]);

        assert!(!router.has_floor("9"));
        assert_eq!(router.floor_ids().collect::<Vec<_>>(), vec!["1", "2"]);
    }

    #[test]
    fn test_reregistering_floor_retires_waypoints() {
        let mut router = two_floors();
        assert_eq!(router.graph_stats(), GraphStats { nodes: 3, arcs: 2 });

        router.add_floor("2", square(10.0), vec![]);

        assert!(router.floor_waypoints("2").is_empty());
        assert_eq!(router.graph_stats(), GraphStats { nodes: 2, arcs: 1 });

        let err = router
            .find_path("1", Point::new(0.0, 0.0), "2", Point::new(2.0, 2.0))
            .unwrap_err();
        assert!(matches!(err, RouteError::UnreachableEndpoint { .. }));
    }
}
