//! Fortune's sweep over the event queue, producing the unbounded diagram.

use log::trace;

use crate::beach_line::{ArcId, BeachLine};
use crate::diagram::{SiteId, UnboundedDiagram};
use crate::events::{Event, EventId, EventQueue};
use crate::geometry::{self, Point};

/// Per-call sweep state. The current sweep coordinate is carried here and passed to every
/// beach line query.
struct Sweep<'a> {
    sites: &'a [Point],
    queue: EventQueue,
    beach: BeachLine,
    graph: UnboundedDiagram,
    sweep_y: f64,
}

/// Runs the sweep over the given sites (indices into `sites`, already free of duplicates).
pub(crate) fn run(sites: &[Point], active: &[SiteId]) -> UnboundedDiagram {
    let mut sweep = Sweep {
        sites,
        queue: EventQueue::with_capacity(active.len() * 3),
        beach: BeachLine::new(),
        graph: UnboundedDiagram::default(),
        sweep_y: f64::NEG_INFINITY,
    };
    for &site in active {
        sweep.queue.push(Event::Site { site, position: sites[site] });
    }

    while let Some((id, event)) = sweep.queue.pop() {
        sweep.sweep_y = event.sweep_y();
        match event {
            Event::Site { site, .. } => sweep.handle_site(site),
            Event::Circle { arc, center, .. } => sweep.handle_circle(id, arc, center),
        }
    }

    debug_assert!(sweep.queue.is_empty());
    trace!(
        "sweep finished: {} vertices, {} edges, final beach line {:?}",
        sweep.graph.vertices.len(),
        sweep.graph.edges.len(),
        sweep.beach.arcs().map(|arc| arc.site).collect::<Vec<_>>()
    );
    sweep.graph
}

impl Sweep<'_> {
    fn handle_site(&mut self, site: SiteId) {
        let insertion = self.beach.insert_site(site, self.sites, &mut self.graph);
        trace!(
            "site event {} at {:?} became arc {} (breakpoints {:?} / {:?})",
            site,
            self.sites[site],
            insertion.arc,
            insertion.left_edge,
            insertion.right_edge
        );

        if let Some(split) = insertion.split {
            self.invalidate(split);
        }

        let (left, right) = self.beach.neighbors(insertion.arc);
        for arc in [left, right].into_iter().flatten() {
            // A beside insertion changes the neighbourhood of the arc next to it.
            self.invalidate(arc);
            self.check_circle(arc);
        }
    }

    fn handle_circle(&mut self, id: EventId, arc: ArcId, center: Point) {
        // Lazy deletion: the arc may be gone or have been rescheduled since this was queued.
        if !self.beach.is_alive(arc) || self.beach.arc(arc).circle_event != Some(id) {
            trace!("skipping stale circle event {}", id);
            return;
        }
        trace!("circle event {} removes arc {} at {:?}", id, arc, center);

        let Some(removal) = self.beach.remove_arc(arc, center, self.sites, &mut self.graph) else {
            return;
        };
        trace!("vertex {} starts edge {}", removal.vertex, removal.edge);

        self.invalidate(removal.left);
        self.invalidate(removal.right);
        self.check_circle(removal.left);
        self.check_circle(removal.right);
    }

    fn invalidate(&mut self, arc: ArcId) {
        if let Some(event) = self.beach.arc_mut(arc).circle_event.take() {
            trace!("invalidating circle event {} of arc {}", event, arc);
            self.queue.invalidate(event);
        }
    }

    /// Schedules the circle event of `arc` if its two breakpoints converge.
    fn check_circle(&mut self, arc: ArcId) {
        let (Some(left), Some(right)) = self.beach.neighbors(arc) else {
            return;
        };
        let a_site = self.beach.arc(left).site;
        let c_site = self.beach.arc(right).site;
        if a_site == c_site {
            return;
        }
        let a = self.sites[a_site];
        let b = self.sites[self.beach.arc(arc).site];
        let c = self.sites[c_site];

        // Breakpoints only converge for a counter-clockwise triple; collinear sites share a
        // single bisector and never meet.
        if geometry::orientation(a, b, c) <= 0.0 {
            return;
        }
        let Some(center) = geometry::circumcenter(a, b, c) else {
            return;
        };
        let radius = center.distance(b);
        if center.y + radius < self.sweep_y - geometry::EPSILON {
            return;
        }

        let event = self.queue.push(Event::Circle { arc, center, radius });
        self.beach.arc_mut(arc).circle_event = Some(event);
    }
}
