use rustc_hash::FxHashMap;
use std::{cmp::Ordering, collections::BinaryHeap};

use crate::{Graph, NodeIdx, Point, SearchConfig};

type HashMap<K, V> = FxHashMap<K, V>;

/// Payloads the built-in search can price. `None` marks a node without a
/// position, which only ever costs `hub_hop_cost` to enter or leave.
pub trait Located {
    fn location(&self) -> Option<(&str, Point)>;
}

/// Shortest-path search over a [`Graph`].
pub trait GraphSearch {
    /// Node sequence from `start` to `goal`, both inclusive, or `None` when
    /// the two are not connected.
    fn find<P: Located>(
        &mut self,
        graph: &Graph<P>,
        start: NodeIdx,
        goal: NodeIdx,
    ) -> Option<Vec<NodeIdx>>;
}

struct SearchState {
    node: NodeIdx,
    cost: f64,
    estimate: f64,
    seq: u64,
}

impl Eq for SearchState {}
impl PartialEq for SearchState {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for SearchState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Inverted for min-heap, earlier pushes win ties
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for SearchState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* with planar distance as both edge cost and heuristic.
///
/// Arcs between two positioned nodes on the same floor cost their planar
/// distance; any other arc costs `hub_hop_cost`. The heuristic for a node on
/// the goal's floor is the straight-line distance to the goal, capped by
/// the closest point where a route could come back onto that floor; that
/// cap is also the estimate for every other node.
pub struct AStar {
    config: SearchConfig,
    queue: BinaryHeap<SearchState>,
    distances: HashMap<NodeIdx, f64>,
    predecessors: HashMap<NodeIdx, NodeIdx>,
    next_seq: u64,
}

impl Default for AStar {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl AStar {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            queue: BinaryHeap::new(),
            distances: HashMap::default(),
            predecessors: HashMap::default(),
            next_seq: 0,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn arc_cost<P: Located>(&self, from: &P, to: &P) -> f64 {
        match (from.location(), to.location()) {
            (Some((from_floor, from)), Some((to_floor, to))) if from_floor == to_floor => {
                from.distance(&to)
            }
            _ => self.config.hub_hop_cost,
        }
    }

    fn push(&mut self, node: NodeIdx, cost: f64, estimate: f64) {
        self.queue.push(SearchState {
            node,
            cost,
            estimate,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    fn search<P: Located>(&mut self, graph: &Graph<P>, start: NodeIdx, goal: NodeIdx) -> bool {
        let target = graph
            .get(goal)
            .and_then(Located::location)
            .map(|(goal_floor, goal_point)| {
                (goal_floor, goal_point, reentry_bound(graph, goal_floor, goal_point))
            });
        let heuristic = |payload: &P| match (payload.location(), target) {
            (_, None) => 0.0,
            (Some((floor, point)), Some((goal_floor, goal_point, reentry)))
                if floor == goal_floor =>
            {
                point.distance(&goal_point).min(reentry)
            }
            (_, Some((.., reentry))) => reentry,
        };

        let Some(start_payload) = graph.get(start) else {
            return false;
        };
        if !graph.contains(goal) {
            return false;
        }

        self.distances.insert(start, 0.0);
        self.push(start, 0.0, heuristic(start_payload));

        let mut expanded = 0;

        while let Some(SearchState { node, cost, .. }) = self.queue.pop() {
            if cost > self.distances[&node] {
                continue;
            }

            if node == goal {
                log::trace!("[AStar] reached goal {goal} after {expanded} expansions");
                return true;
            }

            expanded += 1;
            if expanded > self.config.max_expansions {
                log::debug!("[AStar] gave up after {expanded} expansions");
                return false;
            }

            let Some(payload) = graph.get(node) else {
                continue;
            };

            for &neighbor in graph.neighbors(node) {
                let Some(neighbor_payload) = graph.get(neighbor) else {
                    continue;
                };

                let next_cost = cost + self.arc_cost(payload, neighbor_payload);
                let current = self.distances.entry(neighbor).or_insert(f64::INFINITY);

                if next_cost < *current {
                    *current = next_cost;
                    self.predecessors.insert(neighbor, node);
                    self.push(neighbor, next_cost, next_cost + heuristic(neighbor_payload));
                }
            }
        }

        log::trace!("[AStar] open set exhausted after {expanded} expansions");
        false
    }

    fn unfold(&self, start: NodeIdx, goal: NodeIdx) -> Vec<NodeIdx> {
        let mut path = vec![goal];

        let mut node = goal;
        while node != start {
            node = self.predecessors[&node];
            path.push(node);
        }

        path.reverse();
        path
    }

    fn clear(&mut self) {
        self.queue.clear();
        self.distances.clear();
        self.predecessors.clear();
        self.next_seq = 0;
    }
}

/// Lower bound on what any route that leaves the goal floor still has to
/// walk once it comes back.
///
/// Hub hops are priced without regard to where the placements on either
/// side sit, so a route can re-enter the goal floor anywhere a node has an
/// arc off the floor. The last stretch from such a node to the goal stays on
/// the floor and is at least the straight-line distance.
fn reentry_bound<P: Located>(graph: &Graph<P>, goal_floor: &str, goal_point: Point) -> f64 {
    let on_goal_floor =
        |payload: &P| matches!(payload.location(), Some((floor, _)) if floor == goal_floor);

    graph
        .iter()
        .filter_map(|(node, payload)| {
            let (floor, point) = payload.location()?;
            let leaves_floor = graph
                .neighbors(node)
                .iter()
                .filter_map(|&neighbor| graph.get(neighbor))
                .any(|neighbor| !on_goal_floor(neighbor));

            (floor == goal_floor && leaves_floor).then(|| point.distance(&goal_point))
        })
        .fold(f64::INFINITY, f64::min)
}

impl GraphSearch for AStar {
    fn find<P: Located>(
        &mut self,
        graph: &Graph<P>,
        start: NodeIdx,
        goal: NodeIdx,
    ) -> Option<Vec<NodeIdx>> {
        let found = self.search(graph, start, goal);
        let path = found.then(|| self.unfold(start, goal));

        self.clear();

        path
    }
}
