//! JavaScript bindings. Geometry crosses the boundary as flat `f64` arrays.

use crate::bounds::BoundingBox;
use crate::diagram::{Diagram, EdgeKind, SitePlacement};
use crate::tessellation::Tessellation;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_rayon::init_thread_pool;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_threads(n: usize) -> js_sys::Promise {
    init_thread_pool(n)
}

#[wasm_bindgen(typescript_custom_section)]
const TS_CONSTANTS_BOUNDS: &'static str = r#"
export const BOX_ID_BOTTOM = -1;
export const BOX_ID_RIGHT = -2;
export const BOX_ID_TOP = -3;
export const BOX_ID_LEFT = -4;
"#;

fn get_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        (js_sys::Math::random() * 4294967296.0) as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        123456789
    }
}

// --- Bounding Box ---

#[wasm_bindgen]
#[derive(Clone, Copy, Debug)]
pub struct BoundingBox2D {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

#[wasm_bindgen]
impl BoundingBox2D {
    #[wasm_bindgen(constructor)]
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> BoundingBox2D {
        BoundingBox2D { min_x, min_y, max_x, max_y }
    }
}

impl From<BoundingBox2D> for BoundingBox {
    fn from(b: BoundingBox2D) -> Self {
        Self { min: [b.min_x, b.min_y], max: [b.max_x, b.max_y] }
    }
}

// --- Cell Wrapper ---

#[wasm_bindgen(js_name = Cell2D)]
pub struct Cell2DWASM {
    id: usize,
    vertices: Vec<f64>,
    edge_neighbors: Vec<i32>,
    area: f64,
    centroid: Vec<f64>,
    placement: SitePlacement,
}

impl Cell2DWASM {
    fn from_diagram(diagram: &Diagram, id: usize) -> Option<Self> {
        let site = diagram.site(id)?;
        let vertices = site.polygon().iter().flat_map(|p| [p.x, p.y]).collect();
        let edge_neighbors = site
            .edge_ids()
            .iter()
            .map(|&e| match diagram.edges()[e].kind() {
                EdgeKind::Voronoi { left, right } => (if left == id { right } else { left }) as i32,
                EdgeKind::Border { side, .. } => side.id(),
            })
            .collect();
        Some(Self {
            id,
            vertices,
            edge_neighbors,
            area: site.area(),
            centroid: site.centroid().map(|c| vec![c.x, c.y]).unwrap_or_default(),
            placement: site.placement(),
        })
    }
}

#[wasm_bindgen(js_class = Cell2D)]
impl Cell2DWASM {
    #[wasm_bindgen(getter)]
    pub fn id(&self) -> usize { self.id }
    #[wasm_bindgen(getter)]
    pub fn vertices(&self) -> Vec<f64> { self.vertices.clone() }
    /// Neighbouring site for each edge, or the negative side id for border edges.
    #[wasm_bindgen(getter)]
    pub fn edge_neighbors(&self) -> Vec<i32> { self.edge_neighbors.clone() }
    pub fn area(&self) -> f64 { self.area }
    pub fn centroid(&self) -> Vec<f64> { self.centroid.clone() }
    #[wasm_bindgen(getter)]
    pub fn lies_on_edge(&self) -> Option<u32> {
        match self.placement {
            SitePlacement::OnEdge(edge) => Some(edge as u32),
            _ => None,
        }
    }
    #[wasm_bindgen(getter)]
    pub fn lies_on_corner(&self) -> Option<u32> {
        match self.placement {
            SitePlacement::OnCorner(vertex) => Some(vertex as u32),
            _ => None,
        }
    }
}

// --- Tessellation ---

#[wasm_bindgen(js_name = Tessellation2D)]
pub struct Tessellation2D {
    inner: Tessellation,
}

#[wasm_bindgen(js_class = Tessellation2D)]
impl Tessellation2D {
    #[wasm_bindgen(constructor)]
    pub fn new(bounds: BoundingBox2D) -> Tessellation2D {
        Tessellation2D { inner: Tessellation::new(bounds.into()) }
    }
    pub fn set_generators(&mut self, generators: &[f64]) -> Result<(), JsError> {
        Ok(self.inner.set_generators(generators)?)
    }
    pub fn set_generator(&mut self, index: usize, x: f64, y: f64) { self.inner.set_generator(index, x, y); }
    pub fn random_generators(&mut self, count: usize) { self.inner.random_generators(count, get_seed()); }
    pub fn calculate(&mut self) -> Result<(), JsError> { Ok(self.inner.calculate()?) }
    pub fn relax(&mut self) -> Result<(), JsError> { Ok(self.inner.relax()?) }
    #[wasm_bindgen(getter)]
    pub fn count_generators(&self) -> usize { self.inner.count_generators() }
    #[wasm_bindgen(getter)]
    pub fn count_cells(&self) -> usize { self.inner.count_cells() }
    pub fn get_generator(&self, index: usize) -> Vec<f64> {
        self.inner.get_generator(index).map(|p| vec![p.x, p.y]).unwrap_or_default()
    }
    pub fn get_cell(&self, index: usize) -> Option<Cell2DWASM> {
        Cell2DWASM::from_diagram(self.inner.diagram()?, index)
    }
    #[wasm_bindgen(getter)]
    pub fn generators(&self) -> Vec<f64> { self.inner.generators().to_vec() }
    #[wasm_bindgen(getter)]
    pub fn cells(&self) -> Vec<Cell2DWASM> {
        let Some(diagram) = self.inner.diagram() else {
            return Vec::new();
        };
        (0..diagram.sites().len()).filter_map(|i| Cell2DWASM::from_diagram(diagram, i)).collect()
    }
    /// Every edge as `[x0, y0, x1, y1]`, concatenated.
    #[wasm_bindgen(getter)]
    pub fn edges(&self) -> Vec<f64> {
        let Some(diagram) = self.inner.diagram() else {
            return Vec::new();
        };
        (0..diagram.edges().len())
            .filter_map(|e| diagram.edge_points(e))
            .flat_map(|(a, b)| [a.x, a.y, b.x, b.y])
            .collect()
    }
    /// Side id of every border edge (`-1..=-4`), or 0 for Voronoi edges, parallel to `edges`.
    #[wasm_bindgen(getter)]
    pub fn edge_sides(&self) -> Vec<i32> {
        let Some(diagram) = self.inner.diagram() else {
            return Vec::new();
        };
        diagram
            .edges()
            .iter()
            .map(|e| match e.kind() {
                EdgeKind::Border { side, .. } => side.id(),
                EdgeKind::Voronoi { .. } => 0,
            })
            .collect()
    }
}
