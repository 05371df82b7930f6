use crate::error::{Result, TessellationError};
use crate::geometry::{EPSILON, Point};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the four sides of the bounding rectangle.
///
/// Sides are listed in counter-clockwise perimeter order starting at the minimum corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    /// y = min_y, walked from min_x to max_x.
    Bottom,
    /// x = max_x, walked from min_y to max_y.
    Right,
    /// y = max_y, walked from max_x to min_x.
    Top,
    /// x = min_x, walked from max_y to min_y.
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Bottom, Side::Right, Side::Top, Side::Left];

    /// Calculates the ID for a bounding box side, negative to prevent conflicts with site IDs.
    ///
    /// - Bottom: -1
    /// - Right: -2
    /// - Top: -3
    /// - Left: -4
    pub fn id(self) -> i32 {
        match self {
            Side::Bottom => -1,
            Side::Right => -2,
            Side::Top => -3,
            Side::Left => -4,
        }
    }
}

/// Axis aligned clipping rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl BoundingBox {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Self { min, max }
    }

    /// Checks that the box has a positive extent on both axes.
    pub fn validate(&self) -> Result<()> {
        let finite = self.min.iter().chain(self.max.iter()).all(|v| v.is_finite());
        // Corners closer than the tolerance would weld into one vertex.
        if !finite || self.max[0] - self.min[0] <= EPSILON || self.max[1] - self.min[1] <= EPSILON {
            return Err(TessellationError::InvalidBounds {
                min_x: self.min[0],
                min_y: self.min[1],
                max_x: self.max[0],
                max_y: self.max[1],
            });
        }
        Ok(())
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
        )
    }

    /// Corners in counter-clockwise order: bottom-left, bottom-right, top-right, top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min[0], self.min[1]),
            Point::new(self.max[0], self.min[1]),
            Point::new(self.max[0], self.max[1]),
            Point::new(self.min[0], self.max[1]),
        ]
    }

    /// Whether `p` lies inside or on the rectangle, within tolerance.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min[0] - EPSILON
            && p.x <= self.max[0] + EPSILON
            && p.y >= self.min[1] - EPSILON
            && p.y <= self.max[1] + EPSILON
    }

    /// Whether `p` lies on the given side line (inside its extent), within tolerance.
    pub fn on_side(&self, p: Point, side: Side) -> bool {
        if !self.contains(p) {
            return false;
        }
        match side {
            Side::Bottom => (p.y - self.min[1]).abs() <= EPSILON,
            Side::Right => (p.x - self.max[0]).abs() <= EPSILON,
            Side::Top => (p.y - self.max[1]).abs() <= EPSILON,
            Side::Left => (p.x - self.min[0]).abs() <= EPSILON,
        }
    }

    pub fn on_border(&self, p: Point) -> bool {
        Side::ALL.iter().any(|&side| self.on_side(p, side))
    }

    /// Pulls coordinates lying within tolerance of a side exactly onto it.
    pub fn snap(&self, p: Point) -> Point {
        let snap = |v: f64, lo: f64, hi: f64| {
            if (v - lo).abs() <= EPSILON {
                lo
            } else if (v - hi).abs() <= EPSILON {
                hi
            } else {
                v
            }
        };
        Point::new(
            snap(p.x, self.min[0], self.max[0]),
            snap(p.y, self.min[1], self.max[1]),
        )
    }

    /// Arc length position of a border point when walking the perimeter counter-clockwise from
    /// the minimum corner. Points not on the border yield `None`.
    pub fn perimeter_position(&self, p: Point) -> Option<f64> {
        let w = self.width();
        let h = self.height();
        // Corners belong to the side that starts there so each gets a single position.
        if self.on_side(p, Side::Bottom) && (p.x - self.max[0]).abs() > EPSILON {
            Some(p.x - self.min[0])
        } else if self.on_side(p, Side::Right) && (p.y - self.max[1]).abs() > EPSILON {
            Some(w + (p.y - self.min[1]))
        } else if self.on_side(p, Side::Top) && (p.x - self.min[0]).abs() > EPSILON {
            Some(w + h + (self.max[0] - p.x))
        } else if self.on_side(p, Side::Left) && (p.y - self.min[1]).abs() > EPSILON {
            Some(2.0 * w + h + (self.max[1] - p.y))
        } else {
            None
        }
    }

    /// The side containing the perimeter stretch that starts at `position`.
    pub fn side_at(&self, position: f64) -> Side {
        let w = self.width();
        let h = self.height();
        if position < w {
            Side::Bottom
        } else if position < w + h {
            Side::Right
        } else if position < 2.0 * w + h {
            Side::Top
        } else {
            Side::Left
        }
    }

    /// How far `p` lies inside the rectangle measured from `side` (negative when outside).
    pub fn depth_from(&self, p: Point, side: Side) -> f64 {
        match side {
            Side::Bottom => p.y - self.min[1],
            Side::Right => self.max[0] - p.x,
            Side::Top => self.max[1] - p.y,
            Side::Left => p.x - self.min[0],
        }
    }
}
