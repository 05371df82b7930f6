//! # fortune-voronoi
//!
//! `fortune-voronoi` is a Rust library for bounded 2D Voronoi tessellations, designed to be used
//! in Rust as well as compiled to WebAssembly (WASM). Cells are computed with Fortune's sweep
//! line algorithm and then closed against an axis aligned bounding rectangle, so every site
//! inside the rectangle ends up with a finite convex polygon.
//!
//! ## Features
//!
//! - **Sweep line**: Heap ordered events with lazy circle event invalidation. Arcs are found by
//!   binary search; splicing them in and out of the ordered beach line is linear in its length.
//! - **Closed cells**: Unbounded edges are clipped and the rectangle sides become border edges
//!   owned by the cells they close.
//! - **Site placement**: Every site reports whether it lies on one of its own edges or corners.
//! - **WASM-first**: Built with `wasm-bindgen` for use from JavaScript and TypeScript.
//!
//! ## Example
//!
//! ```
//! use fortune_voronoi::{tessellate, BoundingBox, Point};
//!
//! let bounds = BoundingBox::new([0.0, 0.0], [1000.0, 1000.0]);
//! let sites = [Point::new(500.0, 700.0), Point::new(500.0, 300.0)];
//! let diagram = tessellate(&sites, bounds).unwrap();
//!
//! assert_eq!(diagram.edges().len(), 7);
//! assert_eq!(diagram.sites()[0].polygon().len(), 4);
//! ```
//!
//! See the `demos/` directory for SVG plotting.
//!
//! ## Main Interface
//!
//! The primary entry point is [`tessellate`]. The [`Tessellation`] struct keeps a set of
//! generators around between calculations and supports Lloyd relaxation.

mod beach_line;
mod border;
pub mod bounds;
mod classify;
pub mod diagram;
pub mod error;
mod events;
pub mod geometry;
mod sweep;
mod tessellation;
pub mod wasm;

pub use bounds::{BoundingBox, Side};
pub use diagram::{Diagram, Edge, EdgeId, EdgeKind, Site, SiteId, SitePlacement, VertexId};
pub use error::{Result, TessellationError};
pub use geometry::{EPSILON, Point};
pub use tessellation::{Tessellation, tessellate, tessellate_many};
