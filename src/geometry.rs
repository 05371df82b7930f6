//! Points and the tolerance predicates every other module builds on.
//!
//! All epsilon comparisons in the crate go through this module so the tolerance is a single
//! constant.

use std::ops::{Add, Mul, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Absolute tolerance used for point equality, border snapping, on-segment tests and
/// collinearity. Tuned for coordinates of order 1 to 1e6.
pub const EPSILON: f64 = 1e-9;

/// A point (or vector) in the plane.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Tolerant equality, per coordinate.
    pub fn approx_eq(&self, other: &Point) -> bool {
        approx_eq(self.x, other.x) && approx_eq(self.y, other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn dot(&self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z component of the 3D cross product.
    pub fn cross(&self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(&self) -> f64 {
        self.dot(*self).sqrt()
    }

    pub fn distance(&self, other: Point) -> f64 {
        (other - *self).length()
    }

    pub fn distance_sq(&self, other: Point) -> f64 {
        let d = other - *self;
        d.dot(d)
    }

    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    /// Unit vector in the same direction, or `None` when the vector is (nearly) zero.
    pub fn normalized(&self) -> Option<Point> {
        let len = self.length();
        if len <= EPSILON || !len.is_finite() {
            return None;
        }
        Some(Point::new(self.x / len, self.y / len))
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl From<[f64; 2]> for Point {
    fn from(p: [f64; 2]) -> Self {
        Point::new(p[0], p[1])
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

/// Twice the signed area of the triangle `a, b, c`. Positive when counter-clockwise.
pub fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(c - b)
}

/// Center of the circle through three points, `None` when they are collinear.
///
/// Collinearity is judged on the angle at `b`, so the answer does not depend on the scale of
/// the coordinates. Everything is computed relative to `b` to keep nearby points exact.
pub fn circumcenter(a: Point, b: Point, c: Point) -> Option<Point> {
    let ba = a - b;
    let bc = c - b;
    let d = 2.0 * ba.cross(bc);
    if d.abs() <= EPSILON * ba.length() * bc.length() {
        return None;
    }
    let la = ba.dot(ba);
    let lc = bc.dot(bc);
    let offset = Point::new((bc.y * la - ba.y * lc) / d, (ba.x * lc - bc.x * la) / d);
    let center = b + offset;
    center.is_finite().then_some(center)
}

/// Distance from `p` to the closed segment `a`-`b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq <= EPSILON * EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Whether `p` lies on the closed segment `a`-`b` within tolerance.
pub fn on_segment(p: Point, a: Point, b: Point) -> bool {
    distance_to_segment(p, a, b) <= EPSILON
}

/// Signed area of a closed polygon, positive when counter-clockwise (shoelace formula).
pub fn signed_area(polygon: &[Point]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += polygon[i].cross(polygon[j]);
    }
    area * 0.5
}

/// Area centroid of a closed polygon. Degenerate polygons yield `None`.
pub fn centroid(polygon: &[Point]) -> Option<Point> {
    let n = polygon.len();
    if n < 3 {
        return None;
    }

    let mut cx = 0.0;
    let mut cy = 0.0;
    let mut area = 0.0;

    for i in 0..n {
        let j = (i + 1) % n;
        let cross = polygon[i].cross(polygon[j]);
        area += cross;
        cx += (polygon[i].x + polygon[j].x) * cross;
        cy += (polygon[i].y + polygon[j].y) * cross;
    }

    if area == 0.0 || !area.is_finite() {
        return None;
    }

    let factor = 1.0 / (3.0 * area);
    Some(Point::new(cx * factor, cy * factor))
}

/// Merges points closer than [`EPSILON`] to each other, transitively: a chain of points
/// each within tolerance of the next ends up as one point.
///
/// Returns the merged points and, for every input point, the index of its representative.
/// A group is represented by its lowest input index, and representatives are numbered in
/// the order they appear in the input.
pub fn weld(points: &[Point]) -> (Vec<Point>, Vec<usize>) {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        points[a]
            .x
            .total_cmp(&points[b].x)
            .then(points[a].y.total_cmp(&points[b].y))
            .then(a.cmp(&b))
    });

    let mut parent: Vec<usize> = (0..points.len()).collect();
    for (k, &i) in order.iter().enumerate() {
        for &j in &order[k + 1..] {
            if points[j].x - points[i].x > EPSILON {
                break;
            }
            if approx_eq(points[i].y, points[j].y) {
                join(&mut parent, i, j);
            }
        }
    }

    let mut remap = vec![usize::MAX; points.len()];
    let mut merged = Vec::new();
    let mut index = Vec::with_capacity(points.len());
    for i in 0..points.len() {
        let root = find(&mut parent, i);
        if remap[root] == usize::MAX {
            remap[root] = merged.len();
            merged.push(points[root]);
        }
        index.push(remap[root]);
    }
    (merged, index)
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Joins the groups of `a` and `b`; the lower root wins.
fn join(parent: &mut [usize], a: usize, b: usize) {
    let (ra, rb) = (find(parent, a), find(parent, b));
    if ra != rb {
        parent[ra.max(rb)] = ra.min(rb);
    }
}
