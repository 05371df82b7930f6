//! Clips the unbounded diagram to the bounding rectangle and closes every cell.
//!
//! 1. Every edge (a segment, ray or full line) is clipped against the rectangle with
//!    Liang-Barsky. New endpoints are snapped onto the side they hit.
//! 2. Coincident vertices are welded, so edges meeting at a corner, at a border point or at a
//!    cocircular Voronoi vertex share one vertex. Zero-length edges and edges running along a
//!    side disappear.
//! 3. The perimeter is walked counter-clockwise through the corners and every border vertex;
//!    each stretch between two of them becomes a border edge owned by the nearest site.
//! 4. Each cell polygon is assembled by walking its edge cycle.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use log::{debug, trace};

use crate::bounds::{BoundingBox, Side};
use crate::diagram::{Edge, EdgeId, EdgeKind, SiteId, UnboundedDiagram, VertexId};
use crate::error::{Result, TessellationError};
use crate::geometry::{self, EPSILON, Point};

/// Finished boundary of one site's cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Cell {
    pub vertex_ids: Vec<VertexId>,
    pub edge_ids: Vec<EdgeId>,
}

/// The bounded diagram before site classification.
#[derive(Clone, Debug)]
pub(crate) struct ClosedDiagram {
    pub vertices: Vec<Point>,
    pub edges: Vec<Edge>,
    /// One entry per input site; sites outside the sweep get an empty cell.
    pub cells: Vec<Cell>,
}

/// A clipped Voronoi edge referring to indices in the pre-weld point list.
struct Clipped {
    left: SiteId,
    right: SiteId,
    start: usize,
    end: usize,
}

/// Clips the parameter range `[t0, t1]` of the line `origin + t * dir` to the rectangle.
fn clip_line(origin: Point, dir: Point, t0: f64, t1: f64, bounds: &BoundingBox) -> Option<(f64, f64)> {
    let mut lo = t0;
    let mut hi = t1;
    let checks = [
        (-dir.x, origin.x - bounds.min[0]),
        (dir.x, bounds.max[0] - origin.x),
        (-dir.y, origin.y - bounds.min[1]),
        (dir.y, bounds.max[1] - origin.y),
    ];
    for (p, q) in checks {
        if p.abs() < EPSILON {
            // Parallel to this side.
            if q < -EPSILON {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > hi {
                return None;
            }
            lo = lo.max(r);
        } else {
            if r < lo {
                return None;
            }
            hi = hi.min(r);
        }
    }
    (lo <= hi).then_some((lo, hi))
}

/// Clips `graph` to `bounds` and closes every cell with border edges.
///
/// Rays and lines are kept whenever any part of them crosses the rectangle, even when their
/// starting vertex lies outside; sites outside the rectangle still own the pieces of their
/// cells that reach inside.
pub(crate) fn close(
    graph: &UnboundedDiagram,
    sites: &[Point],
    active: &[SiteId],
    bounds: &BoundingBox,
) -> Result<ClosedDiagram> {
    // Corners first, so after welding they are vertices 0..4 with exact coordinates.
    let mut points: Vec<Point> = bounds.corners().to_vec();
    let offset = points.len();
    points.extend(graph.vertices.iter().map(|&v| bounds.snap(v)));

    let mut clipped = Vec::with_capacity(graph.edges.len());
    for edge in &graph.edges {
        let dir = edge.direction.normalized().ok_or(TessellationError::ZeroLengthDirection {
            left: edge.left,
            right: edge.right,
        })?;
        let param = |v: usize| (points[offset + v] - edge.origin).dot(dir);
        let t0 = edge.start.map_or(f64::NEG_INFINITY, param);
        let t1 = edge.end.map_or(f64::INFINITY, param).max(t0);

        let Some((lo, hi)) = clip_line(edge.origin, dir, t0, t1, bounds) else {
            trace!("edge {}|{} misses the rectangle", edge.left, edge.right);
            continue;
        };

        let mut endpoint = |t: f64, vertex: Option<usize>, clipped_at: bool| match vertex {
            Some(v) if !clipped_at => offset + v,
            _ => {
                points.push(bounds.snap(edge.origin + dir * t));
                points.len() - 1
            }
        };
        let start = endpoint(lo, edge.start, lo > t0);
        let end = endpoint(hi, edge.end, hi < t1);
        clipped.push(Clipped { left: edge.left, right: edge.right, start, end });
    }

    // Welding is global: every edge and, through them, every cell sees the merged vertex.
    let (vertices, index) = geometry::weld(&points);

    let mut kept: Vec<Option<Clipped>> = Vec::with_capacity(clipped.len());
    let mut by_pair: HashMap<(VertexId, VertexId), usize> = HashMap::new();
    for c in clipped {
        let (start, end) = (index[c.start], index[c.end]);
        if start == end {
            trace!("dropping zero-length edge {}|{}", c.left, c.right);
            continue;
        }
        let along_side = Side::ALL
            .iter()
            .any(|&side| bounds.on_side(vertices[start], side) && bounds.on_side(vertices[end], side));
        if along_side {
            trace!("dropping edge {}|{} lying on the border", c.left, c.right);
            continue;
        }
        let c = Clipped { start, end, ..c };
        match by_pair.entry((start.min(end), start.max(end))) {
            Entry::Vacant(slot) => {
                slot.insert(kept.len());
                kept.push(Some(c));
            }
            Entry::Occupied(slot) => {
                let k = *slot.get();
                kept[k] = match kept[k].take() {
                    Some(first) => merge_parallel(first, c),
                    None => Some(c),
                };
            }
        }
    }

    let mut edges: Vec<Edge> = kept
        .into_iter()
        .flatten()
        .map(|c| Edge {
            start: c.start,
            end: c.end,
            kind: EdgeKind::Voronoi { left: c.left, right: c.right },
        })
        .collect();

    let mut incident: Vec<Vec<EdgeId>> = vec![Vec::new(); vertices.len()];
    for (id, edge) in edges.iter().enumerate() {
        incident[edge.start].push(id);
        incident[edge.end].push(id);
    }

    let border = border_vertices(&vertices, &edges, bounds);
    let owners = stretch_owners(&border, &vertices, &edges, &incident, sites, active, bounds);
    for (k, &(position, start)) in border.iter().enumerate() {
        let (_, end) = border[(k + 1) % border.len()];
        edges.push(Edge {
            start,
            end,
            kind: EdgeKind::Border { side: bounds.side_at(position), site: owners[k] },
        });
    }

    let mut by_site: Vec<Vec<EdgeId>> = vec![Vec::new(); sites.len()];
    for (id, edge) in edges.iter().enumerate() {
        let (a, b) = edge.sites();
        for site in [a, b].into_iter().flatten() {
            by_site[site].push(id);
        }
    }
    let cells = by_site
        .iter()
        .enumerate()
        .map(|(site, ids)| assemble_cell(site, ids, &edges, &vertices))
        .collect::<Result<Vec<_>>>()?;

    let closed = compact(ClosedDiagram { vertices, edges, cells });
    debug!(
        "closed diagram: {} vertices, {} edges ({} on the border)",
        closed.vertices.len(),
        closed.edges.len(),
        closed.edges.iter().filter(|e| e.is_border()).count()
    );
    Ok(closed)
}

/// Corners plus every border point used by a Voronoi edge, in perimeter order.
fn border_vertices(vertices: &[Point], edges: &[Edge], bounds: &BoundingBox) -> Vec<(f64, VertexId)> {
    let mut candidates: Vec<VertexId> = (0..4).collect();
    candidates.extend(edges.iter().flat_map(|e| [e.start, e.end]));

    let mut border: Vec<(f64, VertexId)> = candidates
        .into_iter()
        .filter_map(|v| bounds.perimeter_position(vertices[v]).map(|pos| (pos, v)))
        .collect();
    border.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    border.dedup_by_key(|&mut (_, v)| v);
    border
}

/// Picks the owner of every perimeter stretch `border[k] -> border[k + 1]`.
///
/// The owner of a stretch always has an edge at one of its two ends, unless the stretch is a
/// whole side between two untouched corners, in which case it continues the previous stretch.
fn stretch_owners(
    border: &[(f64, VertexId)],
    vertices: &[Point],
    edges: &[Edge],
    incident: &[Vec<EdgeId>],
    sites: &[Point],
    active: &[SiteId],
    bounds: &BoundingBox,
) -> Vec<Option<SiteId>> {
    let n = border.len();
    let mut owners: Vec<Option<SiteId>> = (0..n)
        .map(|k| {
            let (position, a) = border[k];
            let (_, b) = border[(k + 1) % n];
            let side = bounds.side_at(position);
            let mid = vertices[a].midpoint(vertices[b]);
            let candidates = incident[a]
                .iter()
                .chain(&incident[b])
                .flat_map(|&e| {
                    let (l, r) = edges[e].sites();
                    [l, r]
                })
                .flatten();
            nearest(candidates, mid, Some(side), sites, bounds)
        })
        .collect();

    let Some(first) = owners.iter().position(Option::is_some) else {
        // No edge reaches the border: a single cell covers the whole rectangle.
        let owner = nearest(active.iter().copied(), bounds.center(), None, sites, bounds);
        return vec![owner; n];
    };
    for step in 1..n {
        let k = (first + step) % n;
        if owners[k].is_none() {
            owners[k] = owners[(k + n - 1) % n];
        }
    }
    owners
}

/// Site closest to `target`. Ties go to the site lying deeper inside from `side`, then to
/// the lower index.
fn nearest(
    candidates: impl Iterator<Item = SiteId>,
    target: Point,
    side: Option<Side>,
    sites: &[Point],
    bounds: &BoundingBox,
) -> Option<SiteId> {
    let depth = |s: SiteId| side.map_or(0.0, |side| bounds.depth_from(sites[s], side));
    let mut best: Option<SiteId> = None;
    for site in candidates {
        best = match best {
            None => Some(site),
            Some(b) if b == site => Some(b),
            Some(b) => {
                let order = compare_distance(sites[site], sites[b], target)
                    .then_with(|| depth(b).total_cmp(&depth(site)))
                    .then(site.cmp(&b));
                if order == Ordering::Less { Some(site) } else { Some(b) }
            }
        };
    }
    best
}

/// Which of `a` and `b` is closer to `target`, decided by the side of their bisector the
/// target falls on. Equal within [`EPSILON`] of the bisector.
fn compare_distance(a: Point, b: Point, target: Point) -> Ordering {
    let ab = b - a;
    let len = ab.length();
    if len == 0.0 {
        return Ordering::Equal;
    }
    // Signed distance from the bisector, positive on the side of `b`.
    let offset = (target - a.midpoint(b)).dot(ab) / len;
    if offset.abs() <= EPSILON {
        Ordering::Equal
    } else if offset > 0.0 {
        Ordering::Greater
    } else {
        Ordering::Less
    }
}

/// Combines two Voronoi edges that welding left between the same pair of vertices.
///
/// Whatever lay between them collapsed: a site found on the inner side of both edges loses
/// them, and the two outer sites become neighbours. Returns `None` when nothing separates
/// the outer sides either.
fn merge_parallel(first: Clipped, second: Clipped) -> Option<Clipped> {
    // Orient the second edge like the first.
    let (left, right) = if second.start == first.start {
        (second.left, second.right)
    } else {
        (second.right, second.left)
    };
    let merged = if (left, right) == (first.left, first.right) {
        return Some(first);
    } else if left == first.right {
        // `second` runs on the right of `first`, with `left` squeezed between them.
        (first.left, right)
    } else if right == first.left {
        (left, first.right)
    } else {
        trace!(
            "keeping edge {}|{} over coincident edge {}|{}",
            first.left,
            first.right,
            second.left,
            second.right
        );
        return Some(first);
    };
    trace!(
        "collapsed edges {}|{} and {}|{} into {}|{}",
        first.left,
        first.right,
        second.left,
        second.right,
        merged.0,
        merged.1
    );
    (merged.0 != merged.1).then_some(Clipped { left: merged.0, right: merged.1, ..first })
}

/// Orders the edges of one cell into a closed counter-clockwise cycle starting at its lowest,
/// then leftmost, vertex.
fn assemble_cell(site: SiteId, ids: &[EdgeId], edges: &[Edge], vertices: &[Point]) -> Result<Cell> {
    if ids.is_empty() {
        return Ok(Cell::default());
    }
    let not_closed = |reason: String| TessellationError::CellNotClosed { site, reason };
    if ids.len() < 3 {
        return Err(not_closed(format!("only {} boundary edges", ids.len())));
    }

    let mut at: HashMap<VertexId, Vec<EdgeId>> = HashMap::new();
    for &e in ids {
        at.entry(edges[e].start).or_default().push(e);
        at.entry(edges[e].end).or_default().push(e);
    }
    if let Some((v, list)) = at.iter().find(|(_, list)| list.len() != 2) {
        return Err(not_closed(format!("vertex {} joins {} of its edges", v, list.len())));
    }

    let first = ids[0];
    let origin = edges[first].start;
    let mut vertex_ids = vec![origin];
    let mut edge_ids = vec![first];
    let mut previous = first;
    let mut current = edges[first].end;
    while current != origin {
        if edge_ids.len() >= ids.len() {
            return Err(not_closed("edge walk does not return to its start".to_string()));
        }
        let next = at[&current].iter().copied().find(|&e| e != previous).unwrap_or(previous);
        vertex_ids.push(current);
        edge_ids.push(next);
        current = if edges[next].start == current { edges[next].end } else { edges[next].start };
        previous = next;
    }
    if edge_ids.len() != ids.len() {
        return Err(not_closed(format!(
            "boundary splits into several cycles ({} of {} edges reached)",
            edge_ids.len(),
            ids.len()
        )));
    }

    let polygon: Vec<Point> = vertex_ids.iter().map(|&v| vertices[v]).collect();
    if geometry::signed_area(&polygon) < 0.0 {
        vertex_ids[1..].reverse();
        edge_ids.reverse();
    }

    let lowest = (0..vertex_ids.len())
        .min_by(|&a, &b| {
            let (pa, pb) = (vertices[vertex_ids[a]], vertices[vertex_ids[b]]);
            pa.y.total_cmp(&pb.y).then(pa.x.total_cmp(&pb.x))
        })
        .unwrap_or(0);
    vertex_ids.rotate_left(lowest);
    edge_ids.rotate_left(lowest);

    Ok(Cell { vertex_ids, edge_ids })
}

/// Drops vertices no edge uses, keeping the relative order (corners stay 0..4).
fn compact(diagram: ClosedDiagram) -> ClosedDiagram {
    let ClosedDiagram { vertices, mut edges, mut cells } = diagram;
    let mut used = vec![false; vertices.len()];
    for edge in &edges {
        used[edge.start] = true;
        used[edge.end] = true;
    }
    let mut remap = vec![usize::MAX; vertices.len()];
    let mut kept = Vec::new();
    for (v, p) in vertices.into_iter().enumerate() {
        if used[v] {
            remap[v] = kept.len();
            kept.push(p);
        }
    }
    for edge in &mut edges {
        edge.start = remap[edge.start];
        edge.end = remap[edge.end];
    }
    for cell in &mut cells {
        for v in &mut cell.vertex_ids {
            *v = remap[*v];
        }
    }
    ClosedDiagram { vertices: kept, edges, cells }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::RawEdge;
    use crate::sweep;

    fn unit_box() -> BoundingBox {
        BoundingBox::new([0.0, 0.0], [10.0, 10.0])
    }

    fn close_all(sites: &[Point], bounds: &BoundingBox) -> ClosedDiagram {
        let active: Vec<SiteId> = (0..sites.len()).collect();
        let graph = sweep::run(sites, &active);
        close(&graph, sites, &active, bounds).expect("closes")
    }

    #[test]
    fn test_clip_line_through_box() {
        let b = unit_box();
        let (lo, hi) = clip_line(Point::new(5.0, 5.0), Point::new(1.0, 0.0), f64::NEG_INFINITY, f64::INFINITY, &b)
            .expect("crosses");
        assert_eq!((lo, hi), (-5.0, 5.0));
        assert!(clip_line(Point::new(5.0, 20.0), Point::new(1.0, 0.0), f64::NEG_INFINITY, f64::INFINITY, &b).is_none());
        let (lo, hi) = clip_line(Point::new(5.0, 5.0), Point::new(0.0, 1.0), 0.0, 2.0, &b).expect("inside");
        assert_eq!((lo, hi), (0.0, 2.0));
    }

    #[test]
    fn test_ray_starting_outside_is_clipped_not_dropped() {
        let b = unit_box();
        let (lo, hi) = clip_line(Point::new(5.0, -5.0), Point::new(0.0, 1.0), 0.0, f64::INFINITY, &b).expect("enters");
        assert_eq!((lo, hi), (5.0, 15.0));
    }

    #[test]
    fn test_no_sites_leaves_the_rectangle() {
        let closed = close_all(&[], &unit_box());
        assert_eq!(closed.vertices.len(), 4);
        assert_eq!(closed.edges.len(), 4);
        assert!(closed.edges.iter().all(|e| e.kind == EdgeKind::Border { side: e_side(e), site: None }));
    }

    fn e_side(edge: &Edge) -> Side {
        match edge.kind {
            EdgeKind::Border { side, .. } => side,
            EdgeKind::Voronoi { .. } => panic!("not a border edge"),
        }
    }

    #[test]
    fn test_two_sites_split_the_box() {
        let sites = [Point::new(5.0, 7.0), Point::new(5.0, 3.0)];
        let closed = close_all(&sites, &unit_box());
        assert_eq!(closed.edges.len(), 7);
        for cell in &closed.cells {
            assert_eq!(cell.vertex_ids.len(), 4);
        }
        let upper: Vec<Point> = closed.cells[0].vertex_ids.iter().map(|&v| closed.vertices[v]).collect();
        assert_eq!(
            upper,
            vec![Point::new(0.0, 5.0), Point::new(10.0, 5.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)]
        );
    }

    #[test]
    fn test_edge_through_corner_is_welded() {
        // The bisector of these two sites is the diagonal y = x.
        let sites = [Point::new(2.0, 8.0), Point::new(8.0, 2.0)];
        let closed = close_all(&sites, &unit_box());
        let voronoi: Vec<&Edge> = closed.edges.iter().filter(|e| !e.is_border()).collect();
        assert_eq!(voronoi.len(), 1);
        let ends = [voronoi[0].start, voronoi[0].end];
        assert!(ends.contains(&0) && ends.contains(&2), "diagonal must join corners, got {:?}", ends);
        assert_eq!(closed.edges.len(), 5);
        for cell in &closed.cells {
            assert_eq!(cell.vertex_ids.len(), 3);
        }
    }

    #[test]
    fn test_site_mirrored_outside_drops_the_border_bisector() {
        // Bisector of the two sites is the bottom side itself.
        let sites = [Point::new(5.0, 2.0), Point::new(5.0, -2.0)];
        let closed = close_all(&sites, &unit_box());
        assert!(closed.edges.iter().all(Edge::is_border));
        assert_eq!(closed.cells[0].vertex_ids, vec![0, 1, 2, 3]);
        assert!(closed.cells[1].vertex_ids.is_empty());
    }

    #[test]
    fn test_zero_direction_is_an_internal_error() {
        let sites = [Point::new(5.0, 6.0), Point::new(5.0, 4.0)];
        let graph = UnboundedDiagram {
            vertices: Vec::new(),
            edges: vec![RawEdge {
                left: 0,
                right: 1,
                origin: Point::new(5.0, 5.0),
                direction: Point::new(0.0, 0.0),
                start: None,
                end: None,
            }],
        };
        let err = close(&graph, &sites, &[0, 1], &unit_box()).expect_err("no direction");
        assert_eq!(err, TessellationError::ZeroLengthDirection { left: 0, right: 1 });
        assert!(err.is_internal());
    }

    #[test]
    fn test_open_boundary_is_an_internal_error() {
        // A lone segment in the middle of the box never reaches the border.
        let sites = [Point::new(5.0, 6.0), Point::new(5.0, 4.0)];
        let graph = UnboundedDiagram {
            vertices: vec![Point::new(4.0, 5.0), Point::new(6.0, 5.0)],
            edges: vec![RawEdge {
                left: 0,
                right: 1,
                origin: Point::new(5.0, 5.0),
                direction: Point::new(1.0, 0.0),
                start: Some(0),
                end: Some(1),
            }],
        };
        let err = close(&graph, &sites, &[0, 1], &unit_box()).expect_err("cell cannot close");
        assert!(
            matches!(err, TessellationError::CellNotClosed { site: 0, .. }),
            "unexpected error {:?}",
            err
        );
        assert!(err.is_internal());
    }

    #[test]
    fn test_near_coincident_sites_keep_their_own_stretches() {
        // Sites 1 and 2 are just too far apart to be duplicates.
        for sites in [
            [Point::new(2.0, 6.0), Point::new(6.0, 4.0), Point::new(6.0, 4.0 - 1.5e-9)],
            [Point::new(2.0, 6.0), Point::new(6.0, 4.0), Point::new(6.0 - 1.5e-9, 4.0)],
        ] {
            let closed = close_all(&sites, &unit_box());
            let polygon = |site: usize| -> Vec<Point> {
                closed.cells[site].vertex_ids.iter().map(|&v| closed.vertices[v]).collect()
            };
            let area: f64 = (0..3).map(|s| geometry::signed_area(&polygon(s))).sum();
            assert!((area - 100.0).abs() < 1e-6, "cells cover {}", area);
            for site in 0..3 {
                assert!(polygon(site).len() >= 3, "site {} has no cell", site);
                assert!(geometry::signed_area(&polygon(site)) > 1.0);
            }
        }
    }

    #[test]
    fn test_bisector_side_decides_the_nearest_site() {
        let a = Point::new(6.0, 4.0);
        let b = Point::new(6.0, 4.0 - 1.5e-9);
        assert_eq!(compare_distance(a, b, Point::new(10.0, 2.0)), Ordering::Greater);
        assert_eq!(compare_distance(a, b, Point::new(10.0, 7.0)), Ordering::Less);
        assert_eq!(compare_distance(Point::new(5.0, 2.0), Point::new(5.0, -2.0), Point::new(3.0, 0.0)), Ordering::Equal);
    }

    #[test]
    fn test_collapsed_sliver_joins_its_neighbours() {
        let first = Clipped { left: 0, right: 1, start: 4, end: 7 };
        // Same vertices walked the other way, with site 1 squeezed in between.
        let second = Clipped { left: 2, right: 1, start: 7, end: 4 };
        let merged = merge_parallel(first, second).expect("outer sites differ");
        assert_eq!((merged.left, merged.right, merged.start, merged.end), (0, 2, 4, 7));

        let lens = merge_parallel(
            Clipped { left: 0, right: 1, start: 4, end: 7 },
            Clipped { left: 1, right: 0, start: 4, end: 7 },
        );
        assert!(lens.is_none());
    }
}
