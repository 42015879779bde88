//! Box field of view to reprojected bottom map, end to end.

use gxbox::{BoxDimensions, SimBox};
use imagery::{MapCache, SyntheticLoader};
use projection::{Frame, SkyCoord};
use solar_common::units::mm_to_m;
use test_utils::fixtures::{maps, solar};

fn flare_session() -> (SimBox, MapCache<SyntheticLoader>) {
    let frame = Frame::earth_view(solar::flare_time());
    let (tx, ty) = solar::FLARE_ORIGIN_ARCSEC;
    let origin = SkyCoord::helioprojective(frame, tx, ty).unwrap();
    let dims = BoxDimensions::from_mm(100.0, 100.0, 100.0).unwrap();
    let simbox = SimBox::new(frame, &origin, dims, mm_to_m(2.0)).unwrap();

    let fov = simbox.bl_tr_pad_coords().unwrap().to_bbox().unwrap();
    let loader = SyntheticLoader::new(frame).with_active_region(tx, ty);
    (simbox, MapCache::new(loader, fov))
}

#[test]
fn test_context_map_covers_field_of_view() {
    let (simbox, mut cache) = flare_session();
    let context = cache.get(maps::AIA_171).unwrap();
    let extent = context.sky_extent().unwrap();
    let tight = simbox.bounds_coords().unwrap().to_bbox();
    assert!(extent.contains(&tight));
}

#[test]
fn test_br_reprojects_onto_bottom_face() {
    let (simbox, mut cache) = flare_session();
    let header = simbox.bottom_cea_header();
    let br = cache.get("br").unwrap().reproject_to(header).unwrap();

    assert_eq!(br.shape(), header.shape);
    let summary = br.summary();
    assert!(summary.coverage > 0.95, "coverage {}", summary.coverage);

    // The synthetic region is bipolar, so the radial field takes both signs.
    assert!(summary.min.unwrap() < 0.0);
    assert!(summary.max.unwrap() > 0.0);
}

#[test]
fn test_rsun_ref_follows_context_map() {
    let (simbox, mut cache) = flare_session();
    let rsun_ref = cache.get(maps::AIA_171).unwrap().meta.rsun_ref;
    let header = simbox.bottom_cea_header().clone().with_rsun_ref(rsun_ref).unwrap();
    let out = cache.get(maps::AIA_1600).unwrap().reproject_to(&header).unwrap();
    assert_eq!(out.meta.rsun_ref, rsun_ref);
    assert_eq!(out.width, 50);
}
