use std::{cmp::Ordering, collections::BinaryHeap, f64::consts::FRAC_PI_4};

use crate::{
    geometry::{
        distance_to_segment, point_in_polygon, point_on_segment, polyline_edges,
        segment_inside_polygon, segments_intersect, Bounds,
    },
    Point, WalkableConfig,
};

use super::Walkable;

const CORNER_DIRECTIONS: usize = 8;

/// Walkable area backed by a visibility graph.
///
/// Paths bend only at corner points placed a small distance away from every
/// wall and obstacle vertex, so a route can slip around the free end of an
/// obstacle but never squeeze through the point where it meets a wall.
#[derive(Clone, Debug)]
pub struct VisibilityWalkable {
    boundary: Vec<Point>,
    obstacles: Vec<Vec<Point>>,
    corners: Vec<Point>,
    offset: f64,
    max_expansions: usize,
}

struct Candidate {
    idx: usize,
    cost: f64,
    estimate: f64,
}

impl Eq for Candidate {}
impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.estimate == other.estimate
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Inverted for min-heap
        other.estimate.total_cmp(&self.estimate)
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl VisibilityWalkable {
    pub fn boundary(&self) -> &[Point] {
        &self.boundary
    }

    pub fn obstacles(&self) -> &[Vec<Point>] {
        &self.obstacles
    }

    pub fn corners(&self) -> &[Point] {
        &self.corners
    }

    fn rebuild_corners(&mut self) {
        let vertices = self
            .boundary
            .iter()
            .chain(self.obstacles.iter().flatten())
            .copied();

        let mut corners = vec![];
        for vertex in vertices {
            for k in 0..CORNER_DIRECTIONS {
                let angle = k as f64 * FRAC_PI_4;
                let corner = Point::new(
                    vertex.lat + self.offset * angle.cos(),
                    vertex.lng + self.offset * angle.sin(),
                );

                if point_in_polygon(corner, &self.boundary)
                    && self.obstacle_clearance(corner) > self.offset / 2.0
                {
                    corners.push(corner);
                }
            }
        }

        self.corners = corners;
    }

    fn obstacle_clearance(&self, point: Point) -> f64 {
        self.obstacles
            .iter()
            .flat_map(|obstacle| match obstacle.as_slice() {
                [single] => vec![point.distance(single)],
                _ => polyline_edges(obstacle)
                    .map(|(a, b)| distance_to_segment(point, a, b))
                    .collect(),
            })
            .fold(f64::INFINITY, f64::min)
    }

    fn on_obstacle(&self, point: Point) -> bool {
        self.obstacles.iter().any(|obstacle| match obstacle.as_slice() {
            [single] => *single == point,
            _ => polyline_edges(obstacle).any(|(a, b)| point_on_segment(point, a, b)),
        })
    }

    fn is_clear(&self, from: Point, to: Point) -> bool {
        let blocked = self.obstacles.iter().any(|obstacle| match obstacle.as_slice() {
            [single] => point_on_segment(*single, from, to),
            _ => polyline_edges(obstacle).any(|(a, b)| segments_intersect(from, to, a, b)),
        });

        !blocked && segment_inside_polygon(from, to, &self.boundary)
    }

    fn node(&self, idx: usize, from: Point, to: Point) -> Point {
        match idx {
            0 => from,
            1 => to,
            i => self.corners[i - 2],
        }
    }

    fn search(&self, from: Point, to: Point) -> Vec<Point> {
        let node_count = self.corners.len() + 2;

        let mut costs = vec![f64::INFINITY; node_count];
        let mut predecessors = vec![usize::MAX; node_count];
        let mut closed = vec![false; node_count];
        let mut queue = BinaryHeap::new();

        costs[0] = 0.0;
        queue.push(Candidate {
            idx: 0,
            cost: 0.0,
            estimate: from.distance(&to),
        });

        let mut expanded = 0;

        while let Some(Candidate { idx, cost, .. }) = queue.pop() {
            if closed[idx] || cost > costs[idx] {
                continue;
            }

            if idx == 1 {
                let mut path = vec![to];
                let mut node = 1;
                while node != 0 {
                    node = predecessors[node];
                    path.push(self.node(node, from, to));
                }
                path.reverse();

                log::trace!(
                    "[VisibilityWalkable] path with {} points after {} expansions",
                    path.len(),
                    expanded
                );
                return path;
            }

            closed[idx] = true;
            expanded += 1;
            if expanded > self.max_expansions {
                log::debug!("[VisibilityWalkable] gave up after {expanded} expansions");
                return vec![];
            }

            let point = self.node(idx, from, to);

            for next in 1..node_count {
                if closed[next] {
                    continue;
                }

                let next_point = self.node(next, from, to);
                let next_cost = cost + point.distance(&next_point);

                if next_cost < costs[next] && self.is_clear(point, next_point) {
                    costs[next] = next_cost;
                    predecessors[next] = idx;
                    queue.push(Candidate {
                        idx: next,
                        cost: next_cost,
                        estimate: next_cost + next_point.distance(&to),
                    });
                }
            }
        }

        vec![]
    }
}

impl Walkable for VisibilityWalkable {
    fn new(boundary: Vec<Point>, config: &WalkableConfig) -> Self {
        let diagonal = Bounds::from_points(&boundary)
            .map(|bounds| bounds.diagonal())
            .unwrap_or(0.0);

        let mut this = Self {
            boundary,
            obstacles: vec![],
            corners: vec![],
            offset: diagonal * config.corner_offset,
            max_expansions: config.max_expansions,
        };
        this.rebuild_corners();

        this
    }

    fn add_polyline(&mut self, polyline: Vec<Point>) {
        if polyline.is_empty() {
            return;
        }

        self.obstacles.push(polyline);
        self.rebuild_corners();
    }

    fn find_path(&self, from: Point, to: Point) -> Vec<Point> {
        if !point_in_polygon(from, &self.boundary) || !point_in_polygon(to, &self.boundary) {
            log::trace!("[VisibilityWalkable] endpoint outside boundary");
            return vec![];
        }

        if self.on_obstacle(from) || self.on_obstacle(to) {
            log::trace!("[VisibilityWalkable] endpoint on an obstacle");
            return vec![];
        }

        if from == to {
            return vec![from];
        }

        if self.is_clear(from, to) {
            return vec![from, to];
        }

        self.search(from, to)
    }
}
