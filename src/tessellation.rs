use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::border;
use crate::bounds::BoundingBox;
use crate::classify;
use crate::diagram::{Diagram, Site, SiteId};
use crate::error::{Result, TessellationError};
use crate::geometry::{self, Point};
use crate::sweep;

/// Computes the Voronoi tessellation of `sites` clipped to `bounds`.
///
/// The result holds one [`Site`] per input point, in input order. Sites within
/// [`EPSILON`](crate::geometry::EPSILON) of each other, directly or through a chain of such
/// sites, form a group; all but its first member are reported as duplicates of it and get no
/// cell of their own.
///
/// # Errors
///
/// Fails with [`TessellationError::InvalidBounds`] or [`TessellationError::NonFiniteSite`] on
/// malformed input, and with one of the internal variants if the cell boundaries come out
/// inconsistent.
pub fn tessellate(sites: &[Point], bounds: BoundingBox) -> Result<Diagram> {
    bounds.validate()?;
    if let Some(index) = sites.iter().position(|s| !s.is_finite()) {
        return Err(TessellationError::NonFiniteSite { index });
    }

    // Welded groups are numbered by first appearance, so the first input index seen for each
    // group is its representative.
    let (unique, group) = geometry::weld(sites);
    let mut representative: Vec<Option<SiteId>> = vec![None; unique.len()];
    let mut active = Vec::with_capacity(unique.len());
    for (i, &g) in group.iter().enumerate() {
        if representative[g].is_none() {
            representative[g] = Some(i);
            active.push(i);
        }
    }

    let graph = sweep::run(sites, &active);
    let closed = border::close(&graph, sites, &active, &bounds)?;

    let mut result = Vec::with_capacity(sites.len());
    for (i, (&position, cell)) in sites.iter().zip(&closed.cells).enumerate() {
        let mut site = Site::new(position);
        match representative[group[i]] {
            Some(first) if first != i => site.duplicate_of = Some(first),
            _ => {
                site.placement =
                    classify::classify(i, position, &closed.vertices, &cell.vertex_ids, &cell.edge_ids)?;
                site.polygon = cell.vertex_ids.iter().map(|&v| closed.vertices[v]).collect();
                site.vertex_ids = cell.vertex_ids.clone();
                site.edge_ids = cell.edge_ids.clone();
            }
        }
        result.push(site);
    }

    debug!(
        "tessellated {} sites ({} unique) into {} edges and {} vertices",
        sites.len(),
        active.len(),
        closed.edges.len(),
        closed.vertices.len()
    );

    Ok(Diagram {
        bounds,
        vertices: closed.vertices,
        edges: closed.edges,
        sites: result,
    })
}

/// Tessellates several independent site sets on the rayon pool. Results keep input order.
pub fn tessellate_many(inputs: &[Vec<Point>], bounds: BoundingBox) -> Vec<Result<Diagram>> {
    inputs.par_iter().map(|sites| tessellate(sites, bounds)).collect()
}

/// A set of generators inside a rectangle together with their most recent tessellation.
///
/// Generators are stored as a flat `[x0, y0, x1, y1, ...]` array so they can be shared with
/// JavaScript without copying into point structs.
#[derive(Clone, Debug)]
pub struct Tessellation {
    bounds: BoundingBox,
    generators: Vec<f64>,
    diagram: Option<Diagram>,
}

impl Tessellation {
    pub fn new(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            generators: Vec::new(),
            diagram: None,
        }
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Replaces all generators. Invalidates the current diagram.
    pub fn set_generators(&mut self, generators: &[f64]) -> Result<()> {
        if generators.len() % 2 != 0 {
            return Err(TessellationError::OddGeneratorArray { len: generators.len() });
        }
        self.generators = generators.to_vec();
        self.diagram = None;
        Ok(())
    }

    /// Moves a single generator. Out of range indices are ignored.
    pub fn set_generator(&mut self, index: usize, x: f64, y: f64) {
        let Some(range) = pair_range(index) else {
            return;
        };
        if let Some(slot) = self.generators.get_mut(range) {
            slot[0] = x;
            slot[1] = y;
            self.diagram = None;
        }
    }

    /// Replaces the generators with `count` points drawn uniformly from the bounds.
    pub fn random_generators(&mut self, count: usize, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let w = self.bounds.width();
        let h = self.bounds.height();
        let mut points = Vec::with_capacity(count * 2);
        for _ in 0..count {
            points.push(self.bounds.min[0] + rng.r#gen::<f64>() * w);
            points.push(self.bounds.min[1] + rng.r#gen::<f64>() * h);
        }
        self.generators = points;
        self.diagram = None;
    }

    pub fn calculate(&mut self) -> Result<()> {
        let sites: Vec<Point> = self
            .generators
            .chunks_exact(2)
            .map(|c| Point::new(c[0], c[1]))
            .collect();
        self.diagram = Some(tessellate(&sites, self.bounds)?);
        Ok(())
    }

    /// One step of Lloyd relaxation: moves every generator to the centroid of its cell and
    /// recalculates. Generators without a cell stay where they are.
    pub fn relax(&mut self) -> Result<()> {
        if self.diagram.is_none() {
            self.calculate()?;
        }
        let Some(diagram) = &self.diagram else {
            return Ok(());
        };
        let new_generators: Vec<f64> = diagram
            .sites()
            .par_iter()
            .flat_map_iter(|site| {
                let p = site.centroid().unwrap_or(site.position());
                [p.x, p.y]
            })
            .collect();

        self.generators = new_generators;
        self.calculate()
    }

    pub fn diagram(&self) -> Option<&Diagram> {
        self.diagram.as_ref()
    }

    pub fn count_generators(&self) -> usize {
        self.generators.len() / 2
    }

    /// Number of generators owning a non-empty cell in the current diagram.
    pub fn count_cells(&self) -> usize {
        self.diagram
            .as_ref()
            .map_or(0, |d| d.sites().iter().filter(|s| s.has_cell()).count())
    }

    pub fn get_generator(&self, index: usize) -> Option<Point> {
        let c = self.generators.get(pair_range(index)?)?;
        Some(Point::new(c[0], c[1]))
    }

    pub fn get_cell(&self, index: usize) -> Option<&Site> {
        self.diagram.as_ref()?.site(index)
    }

    pub fn generators(&self) -> &[f64] {
        &self.generators
    }
}

/// Slice range of generator `index` in the flat array, `None` when it cannot exist.
fn pair_range(index: usize) -> Option<std::ops::Range<usize>> {
    let start = index.checked_mul(2)?;
    Some(start..start.checked_add(2)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_point_to_first_occurrence() {
        let bounds = BoundingBox::new([0.0, 0.0], [10.0, 10.0]);
        let sites = [
            Point::new(2.0, 2.0),
            Point::new(8.0, 8.0),
            Point::new(2.0, 2.0),
            Point::new(8.0, 8.0 + 1e-12),
        ];
        let diagram = tessellate(&sites, bounds).expect("tessellates");
        assert_eq!(diagram.site(2).and_then(Site::duplicate_of), Some(0));
        assert_eq!(diagram.site(3).and_then(Site::duplicate_of), Some(1));
        assert!(!diagram.sites()[2].has_cell());
        assert!((diagram.total_area() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_site_is_rejected() {
        let bounds = BoundingBox::new([0.0, 0.0], [10.0, 10.0]);
        let sites = [Point::new(1.0, 1.0), Point::new(f64::NAN, 2.0)];
        assert_eq!(tessellate(&sites, bounds), Err(TessellationError::NonFiniteSite { index: 1 }));
    }

    #[test]
    fn test_set_generators_requires_pairs() {
        let mut tess = Tessellation::new(BoundingBox::new([0.0, 0.0], [1.0, 1.0]));
        assert_eq!(
            tess.set_generators(&[0.1, 0.2, 0.3]),
            Err(TessellationError::OddGeneratorArray { len: 3 })
        );
        assert!(tess.set_generators(&[0.1, 0.2, 0.7, 0.8]).is_ok());
        assert_eq!(tess.count_generators(), 2);
        tess.set_generator(1, 0.6, 0.6);
        assert_eq!(tess.get_generator(1), Some(Point::new(0.6, 0.6)));
        tess.set_generator(5, 0.0, 0.0);
        assert_eq!(tess.count_generators(), 2);
    }

    #[test]
    fn test_huge_generator_index_is_ignored() {
        let mut tess = Tessellation::new(BoundingBox::new([0.0, 0.0], [1.0, 1.0]));
        tess.set_generators(&[0.1, 0.2, 0.7, 0.8]).expect("pairs");
        for index in [usize::MAX, usize::MAX / 2, usize::MAX / 2 - 1] {
            tess.set_generator(index, 0.5, 0.5);
            assert_eq!(tess.get_generator(index), None);
        }
        assert_eq!(tess.generators(), &[0.1, 0.2, 0.7, 0.8]);
    }

    #[test]
    fn test_random_generators_are_seeded_and_inside() {
        let bounds = BoundingBox::new([-5.0, 10.0], [5.0, 30.0]);
        let mut a = Tessellation::new(bounds);
        let mut b = Tessellation::new(bounds);
        a.random_generators(50, 7);
        b.random_generators(50, 7);
        assert_eq!(a.generators(), b.generators());
        for c in a.generators().chunks(2) {
            assert!(bounds.contains(Point::new(c[0], c[1])));
        }
    }
}
