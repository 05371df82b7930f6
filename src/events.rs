//! Priority queue of sweep events with lazy deletion of circle events.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::beach_line::ArcId;
use crate::diagram::SiteId;
use crate::geometry::Point;

/// Handle of a queued event, stable for the lifetime of the queue.
pub type EventId = usize;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// The sweep line reaches a site.
    Site { site: SiteId, position: Point },
    /// The arc `arc` shrinks to zero width; its bounding breakpoints meet at `center`.
    Circle { arc: ArcId, center: Point, radius: f64 },
}

impl Event {
    /// Sweep coordinate at which the event fires.
    pub fn sweep_y(&self) -> f64 {
        match self {
            Event::Site { position, .. } => position.y,
            Event::Circle { center, radius, .. } => center.y + radius,
        }
    }

    /// Secondary key for events firing at the same sweep coordinate.
    pub fn x(&self) -> f64 {
        match self {
            Event::Site { position, .. } => position.x,
            Event::Circle { center, .. } => center.x,
        }
    }
}

#[derive(Debug)]
struct Entry {
    y: f64,
    x: f64,
    id: EventId,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so the max-heap yields the smallest (y, x, id) first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .y
            .total_cmp(&self.y)
            .then_with(|| other.x.total_cmp(&self.x))
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Events ordered by sweep coordinate, then x, then insertion order.
///
/// Invalidated events stay in the heap as tombstones and are skipped on pop.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Entry>,
    events: Vec<Event>,
    dead: Vec<bool>,
}

impl EventQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            events: Vec::with_capacity(capacity),
            dead: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, event: Event) -> EventId {
        let id = self.events.len();
        self.heap.push(Entry {
            y: event.sweep_y(),
            x: event.x(),
            id,
        });
        self.events.push(event);
        self.dead.push(false);
        id
    }

    /// Removes and returns the next live event.
    pub fn pop(&mut self) -> Option<(EventId, Event)> {
        while let Some(entry) = self.heap.pop() {
            if self.dead[entry.id] {
                continue;
            }
            self.dead[entry.id] = true;
            return Some((entry.id, self.events[entry.id]));
        }
        None
    }

    /// Marks a queued event dead. Unknown or already consumed ids are ignored.
    pub fn invalidate(&mut self, id: EventId) {
        if let Some(dead) = self.dead.get_mut(id) {
            *dead = true;
        }
    }

    #[cfg(test)]
    fn is_live(&self, id: EventId) -> bool {
        self.dead.get(id).is_some_and(|dead| !dead)
    }

    /// Whether the heap is drained, tombstones included.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
