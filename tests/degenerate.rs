use fortune_voronoi::{BoundingBox, Diagram, Point, SitePlacement, tessellate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn assert_partition(diagram: &Diagram) {
    let expected = diagram.bounds().area();
    let total = diagram.total_area();
    assert!(
        (total - expected).abs() < 1e-6 * expected,
        "Cells cover {} but the rectangle is {}",
        total,
        expected
    );
}

fn sorted_areas(diagram: &Diagram) -> Vec<f64> {
    let mut areas: Vec<f64> = diagram.sites().iter().map(|s| s.area()).collect();
    areas.sort_by(f64::total_cmp);
    areas
}

#[test]
fn test_collinear_horizontal_sites_give_strips() {
    let bounds = BoundingBox::new([0.0, 0.0], [1000.0, 1000.0]);
    let sites: Vec<Point> = (0..5).map(|i| Point::new(100.0 + 200.0 * i as f64, 500.0)).collect();
    let diagram = tessellate(&sites, bounds).expect("tessellates");

    assert_partition(&diagram);
    assert!(diagram.vertices().len() == 4 + 8, "Only border vertices expected, got {:?}", diagram.vertices());
    for (i, site) in diagram.sites().iter().enumerate() {
        assert_eq!(site.polygon().len(), 4, "Site {} should own a strip", i);
        assert!((site.area() - 200_000.0).abs() < 1e-6, "Strip {} has area {}", i, site.area());
    }
    assert_eq!(diagram.neighbors(2), vec![1, 3]);
}

#[test]
fn test_collinear_diagonal_sites() {
    let bounds = BoundingBox::new([0.0, 0.0], [1000.0, 1000.0]);
    let sites: Vec<Point> = (0..5).map(|i| Point::new(100.0 + 200.0 * i as f64, 100.0 + 200.0 * i as f64)).collect();
    let diagram = tessellate(&sites, bounds).expect("tessellates");

    assert_partition(&diagram);
    let first = &diagram.sites()[0];
    assert_eq!(first.polygon().len(), 3, "Corner cell is a triangle");
    assert!((first.area() - 80_000.0).abs() < 1e-6, "Got {}", first.area());
    assert!((diagram.sites()[4].area() - 80_000.0).abs() < 1e-6);
}

#[test]
fn test_cocircular_sites_share_one_vertex() {
    // The four bisectors are the diagonals, meeting in the centre and ending in the corners.
    let bounds = BoundingBox::new([0.0, 0.0], [1000.0, 1000.0]);
    let sites = [
        Point::new(250.0, 500.0),
        Point::new(750.0, 500.0),
        Point::new(500.0, 250.0),
        Point::new(500.0, 750.0),
    ];
    let diagram = tessellate(&sites, bounds).expect("tessellates");

    assert_partition(&diagram);
    assert_eq!(diagram.vertices().len(), 5, "Corners plus the centre, got {:?}", diagram.vertices());
    assert_eq!(diagram.voronoi_edges().count(), 4);
    assert_eq!(diagram.edges().len(), 8);
    for site in diagram.sites() {
        assert_eq!(site.polygon().len(), 3);
        assert!((site.area() - 250_000.0).abs() < 1e-6);
        assert!(site.polygon().iter().any(|p| p.approx_eq(&Point::new(500.0, 500.0))));
    }
}

#[test]
fn test_regular_grid() {
    let bounds = BoundingBox::new([0.0, 0.0], [600.0, 600.0]);
    let mut sites = Vec::new();
    for j in 0..3 {
        for i in 0..3 {
            sites.push(Point::new(100.0 + 200.0 * i as f64, 100.0 + 200.0 * j as f64));
        }
    }
    let diagram = tessellate(&sites, bounds).expect("tessellates");

    assert_partition(&diagram);
    assert_eq!(diagram.vertices().len(), 16);
    assert_eq!(diagram.voronoi_edges().count(), 12);
    assert_eq!(diagram.border_edges().count(), 12);
    for (i, site) in diagram.sites().iter().enumerate() {
        assert_eq!(site.polygon().len(), 4, "Site {} should be a square, got {:?}", i, site.polygon());
        assert!((site.area() - 40_000.0).abs() < 1e-6);
    }
    assert_eq!(diagram.neighbors(4), vec![1, 3, 5, 7]);
}

#[test]
fn test_duplicate_sites() {
    let bounds = BoundingBox::new([0.0, 0.0], [10.0, 10.0]);
    let sites = [Point::new(3.0, 3.0), Point::new(3.0, 3.0), Point::new(7.0, 7.0)];
    let diagram = tessellate(&sites, bounds).expect("tessellates");

    assert_partition(&diagram);
    let dup = &diagram.sites()[1];
    assert_eq!(dup.duplicate_of(), Some(0));
    assert!(dup.polygon().is_empty());
    assert_eq!(dup.placement(), SitePlacement::Interior);
    assert_eq!(diagram.sites()[0].duplicate_of(), None);
    assert_eq!(diagram.voronoi_edges().count(), 1);
}

#[test]
fn test_sites_on_opposite_borders() {
    let bounds = BoundingBox::new([0.0, 0.0], [1000.0, 1000.0]);
    let sites = [Point::new(0.0, 500.0), Point::new(1000.0, 500.0)];
    let diagram = tessellate(&sites, bounds).expect("tessellates");

    assert_partition(&diagram);
    for site in diagram.sites() {
        let edge = site.lies_on_edge().expect("site lies on a side");
        assert!(diagram.edges()[edge].is_border());
        assert_eq!(site.lies_on_corner(), None);
    }
}

#[test]
fn test_site_in_corner_with_neighbour() {
    let bounds = BoundingBox::new([0.0, 0.0], [1000.0, 1000.0]);
    let sites = [Point::new(0.0, 0.0), Point::new(500.0, 500.0)];
    let diagram = tessellate(&sites, bounds).expect("tessellates");

    assert_partition(&diagram);
    let corner = &diagram.sites()[0];
    assert_eq!(
        corner.polygon(),
        &[Point::new(0.0, 0.0), Point::new(500.0, 0.0), Point::new(0.0, 500.0)]
    );
    assert_eq!(corner.lies_on_corner(), Some(0));
    assert_eq!(diagram.sites()[1].placement(), SitePlacement::Interior);
}

#[test]
fn test_bisector_through_corners() {
    let bounds = BoundingBox::new([0.0, 0.0], [1000.0, 1000.0]);
    let sites = [Point::new(200.0, 800.0), Point::new(800.0, 200.0)];
    let diagram = tessellate(&sites, bounds).expect("tessellates");

    assert_partition(&diagram);
    assert_eq!(diagram.vertices().len(), 4, "The diagonal must end in the corners");
    assert_eq!(diagram.edges().len(), 5);
}

#[test]
fn test_site_outside_the_rectangle() {
    let bounds = BoundingBox::new([0.0, 0.0], [1000.0, 1000.0]);
    let sites = [Point::new(500.0, 500.0), Point::new(500.0, -100.0), Point::new(5000.0, 5000.0)];
    let diagram = tessellate(&sites, bounds).expect("tessellates");

    assert_partition(&diagram);
    assert!((diagram.sites()[1].area() - 200_000.0).abs() < 1e-6, "Got {}", diagram.sites()[1].area());
    assert!(!diagram.sites()[2].has_cell(), "A far away site has no cell inside");
    assert_eq!(sorted_areas(&diagram), vec![0.0, 200_000.0, 800_000.0]);
}

#[test]
fn test_site_mirrored_across_a_side() {
    // The bisector is the bottom side itself and must not duplicate the border edge.
    let bounds = BoundingBox::new([0.0, 0.0], [1000.0, 1000.0]);
    let sites = [Point::new(500.0, 300.0), Point::new(500.0, -300.0)];
    let diagram = tessellate(&sites, bounds).expect("tessellates");

    assert_partition(&diagram);
    assert_eq!(diagram.edges().len(), 4);
    assert_eq!(diagram.sites()[0].polygon(), &bounds.corners());
    assert!(!diagram.sites()[1].has_cell());
}

#[test]
fn test_three_cells_meeting_on_the_border() {
    // The Voronoi vertex of these sites lies exactly on the bottom side.
    let bounds = BoundingBox::new([0.0, 0.0], [1000.0, 1000.0]);
    let sites = [Point::new(200.0, 400.0), Point::new(800.0, 400.0), Point::new(500.0, -500.0)];
    let diagram = tessellate(&sites, bounds).expect("tessellates");

    assert_partition(&diagram);
    assert!(diagram.vertices().iter().any(|v| v.approx_eq(&Point::new(500.0, 0.0))));
    assert!(!diagram.sites()[2].has_cell(), "Bottom site only touches the border at a point");
    assert_eq!(diagram.sites()[0].polygon().len(), 4);
}

#[test]
fn test_nearly_coincident_sites_get_separate_cells() {
    let bounds = BoundingBox::new([0.0, 0.0], [10.0, 10.0]);
    for gap in [1.5e-9, 2e-9, 5e-9] {
        for (dx, dy) in [(0.0, gap), (gap, 0.0)] {
            let sites = [Point::new(2.0, 6.0), Point::new(6.0, 4.0), Point::new(6.0 - dx, 4.0 - dy)];
            let diagram = tessellate(&sites, bounds)
                .unwrap_or_else(|e| panic!("gap ({}, {}) failed: {}", dx, dy, e));

            assert_partition(&diagram);
            for (i, site) in diagram.sites().iter().enumerate() {
                assert_eq!(site.duplicate_of(), None);
                assert!(site.area() > 1.0, "Site {} got area {} for gap ({}, {})", i, site.area(), dx, dy);
            }
            assert!(diagram.neighbors(1).contains(&2));
            assert_eq!(diagram.voronoi_edges().count(), 3);
        }
    }
}

#[test]
fn test_tiny_coordinates_match_unit_scale() {
    let sites = [
        Point::new(12.0, 7.0),
        Point::new(3.0, 15.0),
        Point::new(25.0, 21.0),
        Point::new(8.0, 30.0),
        Point::new(18.0, 12.0),
        Point::new(30.0, 3.0),
    ];
    let scale = 1e-6;
    let small: Vec<Point> = sites.iter().map(|p| Point::new(p.x * scale, p.y * scale)).collect();

    let unit = tessellate(&sites, BoundingBox::new([0.0, 0.0], [35.0, 35.0])).expect("tessellates");
    let tiny = tessellate(&small, BoundingBox::new([0.0, 0.0], [35.0 * scale, 35.0 * scale])).expect("tessellates");

    assert_partition(&tiny);
    assert_eq!(unit.edges().len(), tiny.edges().len());
    for i in 0..sites.len() {
        assert_eq!(unit.neighbors(i), tiny.neighbors(i), "Neighbours of site {} differ", i);
        let expected = unit.sites()[i].area() * scale * scale;
        let got = tiny.sites()[i].area();
        assert!((got - expected).abs() < 1e-9 * expected, "Site {}: {} instead of {}", i, got, expected);
    }
}

#[test]
fn test_random_sites_in_a_tiny_box() {
    let bounds = BoundingBox::new([0.0, 0.0], [1e-3, 1e-3]);
    for seed in [1, 2, 3] {
        let mut rng = StdRng::seed_from_u64(seed);
        let sites: Vec<Point> = (0..50)
            .map(|_| Point::new(rng.gen_range(1e-6..1e-3 - 1e-6), rng.gen_range(1e-6..1e-3 - 1e-6)))
            .collect();
        let diagram = tessellate(&sites, bounds).unwrap_or_else(|e| panic!("seed {} failed: {}", seed, e));

        assert_partition(&diagram);
        for (i, site) in diagram.sites().iter().enumerate() {
            assert!(site.has_cell(), "Site {} lost its cell with seed {}", i, seed);
        }
    }
}
