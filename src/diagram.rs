//! Arena backed half-edge graph linking sites, edges and vertices.
//!
//! Everything is referenced by integer handle into a growable array, so the cyclic
//! site/edge/vertex relations need no shared ownership.

use crate::bounds::{BoundingBox, Side};
use crate::geometry::{self, Point};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index of a site in the input sequence.
pub type SiteId = usize;
/// Index into [`Diagram::edges`].
pub type EdgeId = usize;
/// Index into [`Diagram::vertices`].
pub type VertexId = usize;

/// Which end of an unbounded edge a breakpoint is tracing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EdgeEnd {
    Start,
    End,
}

/// An edge of the unbounded diagram: the part of the line `origin + t * direction` between
/// its optional start and end vertices. A missing vertex means the edge runs to infinity.
///
/// `left` lies on the left when walking from start to end.
#[derive(Clone, Debug)]
pub(crate) struct RawEdge {
    pub left: SiteId,
    pub right: SiteId,
    pub origin: Point,
    pub direction: Point,
    pub start: Option<usize>,
    pub end: Option<usize>,
}

/// Output of the sweep: true Voronoi vertices and possibly open edges.
#[derive(Clone, Debug, Default)]
pub(crate) struct UnboundedDiagram {
    pub vertices: Vec<Point>,
    pub edges: Vec<RawEdge>,
}

impl UnboundedDiagram {
    pub fn add_vertex(&mut self, p: Point) -> usize {
        self.vertices.push(p);
        self.vertices.len() - 1
    }

    /// Adds the bisector of `left` and `right`. Its direction keeps `left` on the left.
    pub fn add_edge(&mut self, left: SiteId, right: SiteId, sites: &[Point], origin: Point, start: Option<usize>) -> usize {
        let l = sites[left];
        let r = sites[right];
        self.edges.push(RawEdge {
            left,
            right,
            origin,
            direction: Point::new(l.y - r.y, r.x - l.x),
            start,
            end: None,
        });
        self.edges.len() - 1
    }

    /// Fixes one end of an edge at a vertex.
    pub fn close(&mut self, edge: usize, end: EdgeEnd, vertex: usize) {
        let edge = &mut self.edges[edge];
        match end {
            EdgeEnd::Start => edge.start = Some(vertex),
            EdgeEnd::End => edge.end = Some(vertex),
        }
    }
}

/// What an edge separates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EdgeKind {
    /// Part of the bisector of two sites. `left` lies on the left of start -> end.
    Voronoi { left: SiteId, right: SiteId },
    /// A stretch of the bounding rectangle, owned by the site whose cell it closes.
    /// There is no owner only when the diagram has no sites.
    Border { side: Side, site: Option<SiteId> },
}

/// A finished boundary segment.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edge {
    pub(crate) start: VertexId,
    pub(crate) end: VertexId,
    pub(crate) kind: EdgeKind,
}

impl Edge {
    pub fn start(&self) -> VertexId {
        self.start
    }

    pub fn end(&self) -> VertexId {
        self.end
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn is_border(&self) -> bool {
        matches!(self.kind, EdgeKind::Border { .. })
    }

    /// The one or two sites this edge bounds.
    pub fn sites(&self) -> (Option<SiteId>, Option<SiteId>) {
        match self.kind {
            EdgeKind::Voronoi { left, right } => (Some(left), Some(right)),
            EdgeKind::Border { site, .. } => (site, None),
        }
    }

    pub fn touches(&self, site: SiteId) -> bool {
        let (a, b) = self.sites();
        a == Some(site) || b == Some(site)
    }

    /// Whether this is the Voronoi edge between `a` and `b`, in either order.
    pub fn separates(&self, a: SiteId, b: SiteId) -> bool {
        match self.kind {
            EdgeKind::Voronoi { left, right } => (left == a && right == b) || (left == b && right == a),
            EdgeKind::Border { .. } => false,
        }
    }

    /// The site on the other side of a Voronoi edge.
    pub fn other_site(&self, site: SiteId) -> Option<SiteId> {
        match self.kind {
            EdgeKind::Voronoi { left, right } if left == site => Some(right),
            EdgeKind::Voronoi { left, right } if right == site => Some(left),
            _ => None,
        }
    }

    pub fn length(&self, diagram: &Diagram) -> f64 {
        diagram.vertices[self.start].distance(diagram.vertices[self.end])
    }
}

/// Where a site lies relative to its own cell boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SitePlacement {
    /// Strictly inside its cell, or the site has no cell.
    #[default]
    Interior,
    /// On exactly one boundary edge.
    OnEdge(EdgeId),
    /// On the vertex shared by two boundary edges.
    OnCorner(VertexId),
}

/// An input site together with its finished cell.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Site {
    pub(crate) position: Point,
    pub(crate) polygon: Vec<Point>,
    pub(crate) vertex_ids: Vec<VertexId>,
    pub(crate) edge_ids: Vec<EdgeId>,
    pub(crate) placement: SitePlacement,
    pub(crate) duplicate_of: Option<SiteId>,
}

impl Site {
    pub(crate) fn new(position: Point) -> Self {
        Self {
            position,
            polygon: Vec::new(),
            vertex_ids: Vec::new(),
            edge_ids: Vec::new(),
            placement: SitePlacement::Interior,
            duplicate_of: None,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Cell corners, counter-clockwise, starting at the lowest (then leftmost) one.
    /// Empty when the cell misses the rectangle or the site duplicates an earlier one.
    pub fn polygon(&self) -> &[Point] {
        &self.polygon
    }

    pub fn vertex_ids(&self) -> &[VertexId] {
        &self.vertex_ids
    }

    /// `edge_ids()[i]` runs from `vertex_ids()[i]` to `vertex_ids()[i + 1]` (cyclic).
    pub fn edge_ids(&self) -> &[EdgeId] {
        &self.edge_ids
    }

    pub fn placement(&self) -> SitePlacement {
        self.placement
    }

    pub fn lies_on_edge(&self) -> Option<EdgeId> {
        match self.placement {
            SitePlacement::OnEdge(edge) => Some(edge),
            _ => None,
        }
    }

    pub fn lies_on_corner(&self) -> Option<VertexId> {
        match self.placement {
            SitePlacement::OnCorner(vertex) => Some(vertex),
            _ => None,
        }
    }

    /// The earlier site with the same coordinates, if any.
    pub fn duplicate_of(&self) -> Option<SiteId> {
        self.duplicate_of
    }

    pub fn has_cell(&self) -> bool {
        !self.polygon.is_empty()
    }

    pub fn area(&self) -> f64 {
        geometry::signed_area(&self.polygon).abs()
    }

    pub fn centroid(&self) -> Option<Point> {
        geometry::centroid(&self.polygon)
    }
}

/// A bounded Voronoi tessellation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagram {
    pub(crate) bounds: BoundingBox,
    pub(crate) vertices: Vec<Point>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) sites: Vec<Site>,
}

impl Diagram {
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn vertex(&self, id: VertexId) -> Option<Point> {
        self.vertices.get(id).copied()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Start and end coordinates of an edge.
    pub fn edge_points(&self, id: EdgeId) -> Option<(Point, Point)> {
        let edge = self.edges.get(id)?;
        Some((self.vertices[edge.start], self.vertices[edge.end]))
    }

    /// Sites in input order.
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn site(&self, id: SiteId) -> Option<&Site> {
        self.sites.get(id)
    }

    pub fn voronoi_edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter().enumerate().filter(|(_, e)| !e.is_border())
    }

    pub fn border_edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter().enumerate().filter(|(_, e)| e.is_border())
    }

    /// Sites sharing a Voronoi edge with `site`, ascending and without repeats.
    pub fn neighbors(&self, site: SiteId) -> Vec<SiteId> {
        let Some(s) = self.sites.get(site) else {
            return Vec::new();
        };
        let mut neighbors: Vec<SiteId> = s
            .edge_ids
            .iter()
            .filter_map(|&e| self.edges[e].other_site(site))
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// Sum of all cell areas; equals the rectangle area for a valid tessellation.
    pub fn total_area(&self) -> f64 {
        self.sites.iter().map(Site::area).sum()
    }
}
