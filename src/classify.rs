//! Decides where each site lies relative to its own cell boundary.

use crate::diagram::{EdgeId, SiteId, SitePlacement, VertexId};
use crate::error::{Result, TessellationError};
use crate::geometry::{self, Point};

/// Classifies `site` against its cell, given as parallel vertex/edge id lists where edge `i`
/// runs from vertex `i` to vertex `i + 1`.
pub(crate) fn classify(
    site: SiteId,
    position: Point,
    vertices: &[Point],
    vertex_ids: &[VertexId],
    edge_ids: &[EdgeId],
) -> Result<SitePlacement> {
    let n = vertex_ids.len();
    if n == 0 {
        return Ok(SitePlacement::Interior);
    }

    let hits: Vec<usize> = (0..n)
        .filter(|&i| {
            let a = vertices[vertex_ids[i]];
            let b = vertices[vertex_ids[(i + 1) % n]];
            geometry::on_segment(position, a, b)
        })
        .collect();

    match hits.as_slice() {
        [] => Ok(SitePlacement::Interior),
        [i] => Ok(SitePlacement::OnEdge(edge_ids[*i])),
        [i, j] => {
            // Two adjacent edges share the vertex between them; the cycle wraps at 0.
            let shared = if *j == i + 1 {
                Some((i + 1) % n)
            } else if *i == 0 && *j == n - 1 {
                Some(0)
            } else {
                None
            };
            match shared.map(|k| vertex_ids[k]) {
                Some(vertex) if position.approx_eq(&vertices[vertex]) => Ok(SitePlacement::OnCorner(vertex)),
                _ => Err(TessellationError::AmbiguousSitePlacement { site, count: hits.len() }),
            }
        }
        _ => Err(TessellationError::AmbiguousSitePlacement { site, count: hits.len() }),
    }
}
