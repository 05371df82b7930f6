//! The beach line: parabolic arcs ordered left to right along the sweep line.
//!
//! Arc keys are never stored. The x extent of an arc is a function of the current sweep
//! coordinate, so every lookup takes `sweep_y` explicitly and evaluates breakpoints on demand.

use crate::diagram::{EdgeEnd, SiteId, UnboundedDiagram};
use crate::events::EventId;
use crate::geometry::{Point, approx_eq};

/// Handle of an arc in the beach line arena. Stays valid after the arc is removed.
pub type ArcId = usize;

/// A breakpoint between two neighbouring arcs and the edge end it is tracing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Breakpoint {
    pub edge: usize,
    pub end: EdgeEnd,
}

#[derive(Clone, Debug)]
pub(crate) struct Arc {
    pub site: SiteId,
    pub left: Option<Breakpoint>,
    pub right: Option<Breakpoint>,
    /// Circle event currently scheduled for this arc.
    pub circle_event: Option<EventId>,
    pub alive: bool,
}

impl Arc {
    fn new(site: SiteId) -> Self {
        Self {
            site,
            left: None,
            right: None,
            circle_event: None,
            alive: true,
        }
    }
}

/// Result of inserting a site.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Insertion {
    pub arc: ArcId,
    /// Breakpoint on the left of the new arc, if any.
    pub left_edge: Option<Breakpoint>,
    /// Breakpoint on the right of the new arc, if any.
    pub right_edge: Option<Breakpoint>,
    /// The arc that was cut in two. Its pending circle event is stale.
    pub split: Option<ArcId>,
}

/// Result of removing a vanishing arc.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Removal {
    pub vertex: usize,
    pub edge: usize,
    pub left: ArcId,
    pub right: ArcId,
}

/// x coordinate where the arc of `left` meets the arc of `right` for a sweep line at `sweep_y`.
///
/// Sites lying on the sweep line have degenerate (vertical) parabolas, and sites at the same
/// height meet on their vertical bisector; both need their own branch.
pub(crate) fn breakpoint_x(left: Point, right: Point, sweep_y: f64) -> f64 {
    if approx_eq(left.y, right.y) {
        return (left.x + right.x) * 0.5;
    }
    if approx_eq(left.y, sweep_y) {
        return left.x;
    }
    if approx_eq(right.y, sweep_y) {
        return right.x;
    }

    let dl = 2.0 * (left.y - sweep_y);
    let dr = 2.0 * (right.y - sweep_y);
    let a = 1.0 / dl - 1.0 / dr;
    let b = -2.0 * (left.x / dl - right.x / dr);
    let c = (left.x * left.x + left.y * left.y - sweep_y * sweep_y) / dl
        - (right.x * right.x + right.y * right.y - sweep_y * sweep_y) / dr;

    // Roots without cancellation: the one moving away from zero with -b first, the other
    // from the product of the roots. Sites at almost the same height make `a` tiny.
    let root = (b * b - 4.0 * a * c).max(0.0).sqrt();
    let q = -0.5 * (b + root.copysign(b));
    if q == 0.0 {
        return -b / (2.0 * a);
    }
    let x1 = q / a;
    let x2 = c / q;
    // The lower (older) site has the wider parabola; the crossing where `left` hands over to
    // `right` is the smaller root when `left` is the lower site.
    if left.y < right.y { x1.min(x2) } else { x1.max(x2) }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct BeachLine {
    arcs: Vec<Arc>,
    order: Vec<ArcId>,
}

impl BeachLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc(&self, id: ArcId) -> &Arc {
        &self.arcs[id]
    }

    pub fn arc_mut(&mut self, id: ArcId) -> &mut Arc {
        &mut self.arcs[id]
    }

    pub fn is_alive(&self, id: ArcId) -> bool {
        self.arcs.get(id).is_some_and(|arc| arc.alive)
    }

    /// Live arcs, left to right.
    pub fn arcs(&self) -> impl Iterator<Item = &Arc> {
        self.order.iter().map(|&id| &self.arcs[id])
    }

    fn position(&self, id: ArcId) -> Option<usize> {
        self.order.iter().position(|&a| a == id)
    }

    /// Left and right neighbours of an arc.
    pub fn neighbors(&self, id: ArcId) -> (Option<ArcId>, Option<ArcId>) {
        let Some(i) = self.position(id) else {
            return (None, None);
        };
        let left = i.checked_sub(1).map(|j| self.order[j]);
        let right = self.order.get(i + 1).copied();
        (left, right)
    }

    /// Index (in left to right order) of the arc above `x`. Requires a non-empty beach line.
    ///
    /// A point exactly on a breakpoint resolves to the arc on the right.
    pub fn locate_arc_above(&self, x: f64, sweep_y: f64, sites: &[Point]) -> usize {
        let (mut lo, mut hi) = (0, self.order.len().saturating_sub(1));
        while lo < hi {
            let mid = (lo + hi) / 2;
            let left = sites[self.arcs[self.order[mid]].site];
            let right = sites[self.arcs[self.order[mid + 1]].site];
            if x < breakpoint_x(left, right, sweep_y) {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        lo
    }

    fn push_arc(&mut self, site: SiteId) -> ArcId {
        self.arcs.push(Arc::new(site));
        self.arcs.len() - 1
    }

    /// Adds the arc for `site`, creating the edges its breakpoints start tracing.
    ///
    /// Normally the arc above the site is split into two copies around the new arc. When the
    /// arc above belongs to a site at the same height and there is nothing beyond it on that
    /// side (the bottom row of sites), the new arc is placed beside it instead, separated by a
    /// single vertical-ish breakpoint whose edge starts at infinity.
    pub fn insert_site(&mut self, site: SiteId, sites: &[Point], graph: &mut UnboundedDiagram) -> Insertion {
        let s = sites[site];
        if self.order.is_empty() {
            let arc = self.push_arc(site);
            self.order.push(arc);
            return Insertion { arc, left_edge: None, right_edge: None, split: None };
        }

        let index = self.locate_arc_above(s.x, s.y, sites);
        let above = self.order[index];
        let p_site = self.arcs[above].site;
        let p = sites[p_site];
        let to_right = s.x > p.x;
        let open_side = if to_right {
            index + 1 == self.order.len()
        } else {
            index == 0
        };

        if approx_eq(p.y, s.y) && open_side {
            let (left, right) = if to_right { (p_site, site) } else { (site, p_site) };
            let edge = graph.add_edge(left, right, sites, p.midpoint(s), None);
            let bp = Breakpoint { edge, end: EdgeEnd::End };
            let arc = self.push_arc(site);
            if to_right {
                self.arcs[above].right = Some(bp);
                self.arcs[arc].left = Some(bp);
                self.order.insert(index + 1, arc);
                return Insertion { arc, left_edge: Some(bp), right_edge: None, split: None };
            }
            self.arcs[above].left = Some(bp);
            self.arcs[arc].right = Some(bp);
            self.order.insert(index, arc);
            return Insertion { arc, left_edge: None, right_edge: Some(bp), split: None };
        }

        // The new edge is traced in both directions from the point above the site. Its
        // direction keeps `site` on the left, which is the right breakpoint's direction of travel.
        let edge = graph.add_edge(site, p_site, sites, p.midpoint(s), None);
        let left_bp = Breakpoint { edge, end: EdgeEnd::Start };
        let right_bp = Breakpoint { edge, end: EdgeEnd::End };

        let arc = self.push_arc(site);
        let copy = self.push_arc(p_site);
        self.arcs[copy].right = self.arcs[above].right;
        self.arcs[copy].left = Some(right_bp);
        self.arcs[above].right = Some(left_bp);
        self.arcs[arc].left = Some(left_bp);
        self.arcs[arc].right = Some(right_bp);
        self.order.splice(index + 1..index + 1, [arc, copy]);

        Insertion {
            arc,
            left_edge: Some(left_bp),
            right_edge: Some(right_bp),
            split: Some(above),
        }
    }

    /// Removes an arc that shrank to zero width at `center`.
    ///
    /// Both edges bounding the arc end at a new vertex there, and a new edge between the former
    /// neighbours starts from it. Returns `None` for an arc that is gone or sits at either end.
    pub fn remove_arc(&mut self, id: ArcId, center: Point, sites: &[Point], graph: &mut UnboundedDiagram) -> Option<Removal> {
        let index = self.position(id)?;
        if index == 0 || index + 1 >= self.order.len() {
            return None;
        }
        let left = self.order[index - 1];
        let right = self.order[index + 1];

        let vertex = graph.add_vertex(center);
        for bp in [self.arcs[id].left, self.arcs[id].right].into_iter().flatten() {
            graph.close(bp.edge, bp.end, vertex);
        }

        let edge = graph.add_edge(self.arcs[left].site, self.arcs[right].site, sites, center, Some(vertex));
        let bp = Breakpoint { edge, end: EdgeEnd::End };
        self.arcs[left].right = Some(bp);
        self.arcs[right].left = Some(bp);

        self.order.remove(index);
        let arc = &mut self.arcs[id];
        arc.alive = false;
        arc.circle_event = None;

        Some(Removal { vertex, edge, left, right })
    }
}
