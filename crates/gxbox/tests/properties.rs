//! Geometric properties that hold for any valid box.

use gxbox::bounds::{padded_bounds, tight_bounds, PadConfig};
use gxbox::geometry::{classify_edges, compute_corners, compute_edges};
use gxbox::{BoxDimensions, SimBox};
use projection::{Frame, SkyCoord};
use solar_common::units::mm_to_m;
use test_utils::{assert_approx_eq, fixtures::solar};

const DIMENSIONS_MM: [[f64; 3]; 5] = [
    [100.0, 100.0, 100.0],
    [150.0, 150.0, 100.0],
    [0.5, 2.0, 3.0],
    [300.0, 40.0, 12.5],
    [1.0e-3, 1.0e3, 7.0],
];

fn build(origin_arcsec: (f64, f64), dims_mm: [f64; 3], res_mm: f64) -> SimBox {
    let frame = Frame::earth_view(solar::flare_time());
    let origin = SkyCoord::helioprojective(frame, origin_arcsec.0, origin_arcsec.1).unwrap();
    let dims = BoxDimensions::from_mm(dims_mm[0], dims_mm[1], dims_mm[2]).unwrap();
    SimBox::new(frame, &origin, dims, mm_to_m(res_mm)).unwrap()
}

#[test]
fn test_corner_and_edge_counts() {
    for [x, y, z] in DIMENSIONS_MM {
        let dims = BoxDimensions::from_mm(x, y, z).unwrap();
        let corners = compute_corners(&dims);
        let edges = compute_edges(&corners);
        let (bottom, other) = classify_edges(&corners, &edges);
        assert_eq!(edges.len(), 12, "dims {:?}", [x, y, z]);
        assert_eq!(bottom.len(), 4, "dims {:?}", [x, y, z]);
        assert_eq!(other.len(), 8);
        for e in &edges {
            assert_eq!(e.start.differing_axes(&e.end), 1);
        }
    }
}

#[test]
fn test_padded_bounds_contain_tight_bounds() {
    let frame = Frame::earth_view(solar::flare_time());
    let origins = [
        (0.0, 0.0),
        solar::FLARE_ORIGIN_ARCSEC,
        solar::DOTS_ORIGIN_ARCSEC,
        (700.0, 500.0),
    ];
    for origin in origins {
        let simbox = build(origin, [100.0, 80.0, 60.0], 1.4);
        let edges = simbox.all_edges();
        let tight = tight_bounds(&edges, &frame).unwrap();
        for pad in [PadConfig::default(), PadConfig { fraction: 0.0, floor_arcsec: 0.0 }] {
            let padded = padded_bounds(&edges, &frame, &pad).unwrap();
            assert!(padded.contains(&tight), "origin {:?}", origin);
        }
    }
}

#[test]
fn test_small_box_gets_floor_padding() {
    let frame = Frame::earth_view(solar::flare_time());
    let simbox = build((0.0, 0.0), [2.0, 2.0, 2.0], 0.1);
    let edges = simbox.all_edges();
    let tight = tight_bounds(&edges, &frame).unwrap();
    assert!(tight.width() < 20.0);
    let padded = padded_bounds(&edges, &frame, &PadConfig::default()).unwrap();
    assert_approx_eq!(padded.width(), tight.width() + 12.0, 1e-9);
}

#[test]
fn test_edges_translate_back_to_offsets() {
    let simbox = build(solar::FLARE_ORIGIN_ARCSEC, [150.0, 120.0, 100.0], 1.4);
    let center = simbox.center().cartesian().unwrap();
    let (bottom, other) = classify_edges(simbox.corners(), simbox.edges());
    let offsets = bottom.iter().chain(other.iter());
    let placed = simbox.bottom_edges().iter().chain(simbox.other_edges().iter());
    for (edge, [a, b]) in offsets.zip(placed) {
        let da = a.cartesian().unwrap() - center;
        let db = b.cartesian().unwrap() - center;
        assert_approx_eq!(da.x, edge.start.x, 1e-6);
        assert_approx_eq!(da.y, edge.start.y, 1e-6);
        assert_approx_eq!(da.z, edge.start.z, 1e-6);
        assert_approx_eq!(db.x, edge.end.x, 1e-6);
        assert_approx_eq!(db.y, edge.end.y, 1e-6);
        assert_approx_eq!(db.z, edge.end.z, 1e-6);
    }
}

#[test]
fn test_halving_resolution_quadruples_pixels() {
    for (dims, res) in [([100.0, 100.0, 100.0], 1.4), ([150.0, 120.0, 50.0], 1.0)] {
        let coarse = build((0.0, 0.0), dims, res);
        let fine = build((0.0, 0.0), dims, res / 2.0);
        let ratio = fine.bottom_cea_header().pixel_count().unwrap() as f64
            / coarse.bottom_cea_header().pixel_count().unwrap() as f64;
        assert!(ratio > 3.8 && ratio < 4.2, "ratio {}", ratio);
        assert!(fine.bottom_cea_header().scale < coarse.bottom_cea_header().scale);
    }
}

#[test]
fn test_sub_metre_resolution_is_rejected() {
    let frame = Frame::earth_view(solar::flare_time());
    let origin = SkyCoord::helioprojective(frame, 0.0, 0.0).unwrap();
    let dims = BoxDimensions::from_mm(100.0, 100.0, 100.0).unwrap();
    let err = SimBox::new(frame, &origin, dims, 1.0e-6).unwrap_err();
    assert_eq!(err.error_code(), "DegenerateGrid");
}

#[test]
fn test_resolution_does_not_move_geometry() {
    let a = build(solar::DOTS_ORIGIN_ARCSEC, [100.0, 100.0, 100.0], 1.4);
    let b = build(solar::DOTS_ORIGIN_ARCSEC, [100.0, 100.0, 100.0], 0.35);
    assert_eq!(a.corners(), b.corners());
    assert_eq!(a.edges(), b.edges());
    assert_eq!(a.bottom_edges(), b.bottom_edges());
    assert_eq!(a.other_edges(), b.other_edges());
    assert_ne!(a.bottom_cea_header().shape, b.bottom_cea_header().shape);
}

#[test]
fn test_zero_dimension_is_rejected() {
    for dims in [[0.0, 100.0, 100.0], [100.0, 0.0, 100.0], [100.0, 100.0, 0.0]] {
        let err = BoxDimensions::from_mm(dims[0], dims[1], dims[2]).unwrap_err();
        assert_eq!(err.error_code(), "InvalidDimensions");
    }
}

#[test]
fn test_empty_edges_are_rejected() {
    let frame = Frame::earth_view(solar::flare_time());
    let err = tight_bounds(&[], &frame).unwrap_err();
    assert_eq!(err.error_code(), "EmptyEdges");
    let err = padded_bounds(&[], &frame, &PadConfig::default()).unwrap_err();
    assert_eq!(err.error_code(), "EmptyEdges");
}
