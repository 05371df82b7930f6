use fortune_voronoi::{BoundingBox, EdgeKind, Tessellation};
use plotters::prelude::*;
use rand::Rng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = rand::thread_rng();
    let seed: u64 = rng.r#gen();

    run_example("2d_tessellation_random.svg", seed, 0)?;
    run_example("2d_tessellation_relaxed.svg", seed, 20)?;

    Ok(())
}

fn run_example(filename: &str, seed: u64, relax_steps: usize) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(filename, (1024, 1024)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .build_cartesian_2d(0.0..100.0, 0.0..100.0)?;

    let bounds = BoundingBox::new([0.0, 0.0], [100.0, 100.0]);
    let mut tess = Tessellation::new(bounds);
    tess.random_generators(500, seed);
    tess.calculate()?;
    for _ in 0..relax_steps {
        tess.relax()?;
    }

    let Some(diagram) = tess.diagram() else {
        return Ok(());
    };

    // Draw cells
    for site in diagram.sites() {
        if !site.has_cell() {
            continue;
        }
        let poly: Vec<(f64, f64)> = site.polygon().iter().map(|p| (p.x, p.y)).collect();
        let color = if site.lies_on_edge().is_some() || site.lies_on_corner().is_some() {
            GREEN.mix(0.3)
        } else {
            BLUE.mix(0.1)
        };
        chart.draw_series(std::iter::once(Polygon::new(poly, color.filled())))?;
    }

    // Draw edges, border edges heavier
    for (id, edge) in diagram.edges().iter().enumerate() {
        let Some((a, b)) = diagram.edge_points(id) else {
            continue;
        };
        let style = match edge.kind() {
            EdgeKind::Border { .. } => BLACK.stroke_width(2),
            EdgeKind::Voronoi { .. } => BLACK.mix(0.5).stroke_width(1),
        };
        chart.draw_series(std::iter::once(PathElement::new(vec![(a.x, a.y), (b.x, b.y)], style)))?;
    }

    // Draw generators
    let points: Vec<(f64, f64)> = tess.generators().chunks(2).map(|c| (c[0], c[1])).collect();
    chart.draw_series(points.iter().map(|&p| Circle::new(p, 2, RED.filled())))?;

    root.present()?;
    println!("Output saved to {}", filename);
    Ok(())
}
