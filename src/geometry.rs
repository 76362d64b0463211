//! Planar geometry helpers shared by the walkable-area implementation.
//!
//! All predicates treat touching as intersecting and are tolerant to
//! floating-point noise relative to the size of the inputs, which matters
//! when coordinates are raw latitude/longitude values.

use crate::Point;

const RELATIVE_TOLERANCE: f64 = 1e-12;

/// Axis-aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;

        let mut bounds = Self {
            min: *first,
            max: *first,
        };
        for point in rest {
            bounds.min.lat = bounds.min.lat.min(point.lat);
            bounds.min.lng = bounds.min.lng.min(point.lng);
            bounds.max.lat = bounds.max.lat.max(point.lat);
            bounds.max.lng = bounds.max.lng.max(point.lng);
        }

        Some(bounds)
    }

    pub fn diagonal(&self) -> f64 {
        self.min.distance(&self.max)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Orientation {
    Clockwise,
    CounterClockwise,
    Collinear,
}

fn orientation(a: Point, b: Point, c: Point) -> Orientation {
    let cross = (b.lat - a.lat) * (c.lng - a.lng) - (b.lng - a.lng) * (c.lat - a.lat);
    let tolerance = RELATIVE_TOLERANCE * a.distance(&b) * a.distance(&c);

    if cross > tolerance {
        Orientation::CounterClockwise
    } else if cross < -tolerance {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// True if `p` lies within the bounding box of `a`-`b`. Only meaningful for
/// collinear inputs.
fn within_span(p: Point, a: Point, b: Point) -> bool {
    let slack = RELATIVE_TOLERANCE * (1.0 + a.distance(&b));
    p.lat >= a.lat.min(b.lat) - slack
        && p.lat <= a.lat.max(b.lat) + slack
        && p.lng >= a.lng.min(b.lng) - slack
        && p.lng <= a.lng.max(b.lng) + slack
}

pub fn point_on_segment(p: Point, a: Point, b: Point) -> bool {
    orientation(a, b, p) == Orientation::Collinear && within_span(p, a, b)
}

/// Closed segment intersection: shared endpoints and collinear overlap
/// both count.
pub fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let o1 = orientation(a1, a2, b1);
    let o2 = orientation(a1, a2, b2);
    let o3 = orientation(b1, b2, a1);
    let o4 = orientation(b1, b2, a2);

    if o1 != o2
        && o3 != o4
        && o1 != Orientation::Collinear
        && o2 != Orientation::Collinear
        && o3 != Orientation::Collinear
        && o4 != Orientation::Collinear
    {
        return true;
    }

    (o1 == Orientation::Collinear && within_span(b1, a1, a2))
        || (o2 == Orientation::Collinear && within_span(b2, a1, a2))
        || (o3 == Orientation::Collinear && within_span(a1, b1, b2))
        || (o4 == Orientation::Collinear && within_span(a2, b1, b2))
}

pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let d_lat = b.lat - a.lat;
    let d_lng = b.lng - a.lng;
    let length_sq = d_lat * d_lat + d_lng * d_lng;

    if length_sq == 0.0 {
        return p.distance(&a);
    }

    let t = (((p.lat - a.lat) * d_lat + (p.lng - a.lng) * d_lng) / length_sq).clamp(0.0, 1.0);
    p.distance(&Point::new(a.lat + t * d_lat, a.lng + t * d_lng))
}

/// Iterates the closed edges of a polygon given as its vertex ring.
pub fn polygon_edges(polygon: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let n = polygon.len();
    (0..n).map(move |i| (polygon[i], polygon[(i + 1) % n]))
}

/// Iterates the open edges of a polyline.
pub fn polyline_edges(polyline: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    polyline.windows(2).map(|pair| (pair[0], pair[1]))
}

/// Point-in-polygon by ray casting. Points on the boundary are inside.
pub fn point_in_polygon(p: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    if polygon_edges(polygon).any(|(a, b)| point_on_segment(p, a, b)) {
        return true;
    }

    let mut inside = false;
    for (a, b) in polygon_edges(polygon) {
        if (a.lng > p.lng) != (b.lng > p.lng) {
            let lat_at = a.lat + (p.lng - a.lng) / (b.lng - a.lng) * (b.lat - a.lat);
            if p.lat < lat_at {
                inside = !inside;
            }
        }
    }

    inside
}

/// Parameter along `a`-`b` of every contact with `c`-`d`.
fn contact_params(a: Point, b: Point, c: Point, d: Point, out: &mut Vec<f64>) {
    if !segments_intersect(a, b, c, d) {
        return;
    }

    let r_lat = b.lat - a.lat;
    let r_lng = b.lng - a.lng;
    let s_lat = d.lat - c.lat;
    let s_lng = d.lng - c.lng;
    let denominator = r_lat * s_lng - r_lng * s_lat;
    let length_sq = r_lat * r_lat + r_lng * r_lng;

    let project = |p: Point| ((p.lat - a.lat) * r_lat + (p.lng - a.lng) * r_lng) / length_sq;

    if denominator.abs() > RELATIVE_TOLERANCE * length_sq.sqrt() * (s_lat.hypot(s_lng)) {
        let t = ((c.lat - a.lat) * s_lng - (c.lng - a.lng) * s_lat) / denominator;
        out.push(t.clamp(0.0, 1.0));
    } else {
        for p in [c, d] {
            if point_on_segment(p, a, b) {
                out.push(project(p).clamp(0.0, 1.0));
            }
        }
        for (p, t) in [(a, 0.0), (b, 1.0)] {
            if point_on_segment(p, c, d) {
                out.push(t);
            }
        }
    }
}

/// True if every point of the closed segment `a`-`b` lies inside or on the
/// boundary of `polygon`.
///
/// The segment is cut at each contact with the boundary and the midpoint of
/// each piece is tested, so grazing a reflex vertex from outside is caught
/// as well as a proper crossing.
pub fn segment_inside_polygon(a: Point, b: Point, polygon: &[Point]) -> bool {
    if !point_in_polygon(a, polygon) || !point_in_polygon(b, polygon) {
        return false;
    }

    if a == b {
        return true;
    }

    let mut params = vec![0.0, 1.0];
    for (c, d) in polygon_edges(polygon) {
        contact_params(a, b, c, d, &mut params);
    }

    params.sort_by(f64::total_cmp);
    params.dedup_by(|x, y| (*x - *y).abs() <= RELATIVE_TOLERANCE);

    params.windows(2).all(|pair| {
        let t = (pair[0] + pair[1]) / 2.0;
        let mid = Point::new(a.lat + t * (b.lat - a.lat), a.lng + t * (b.lng - a.lng));
        point_in_polygon(mid, polygon)
    })
}
