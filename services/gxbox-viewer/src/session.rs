//! A viewing session: one box, its map cache and the two displayed maps.
//!
//! The context map is shown as-is behind the projected box; the bottom map
//! is resampled onto the box's surface header. The header's reference
//! radius is taken from the context map the session starts with.

use gxbox::{SimBox, SurfaceHeader};
use imagery::{make_dummy_map, CacheStats, MapCache, MapLoader, SolarImage};
use solar_common::GxResult;
use tracing::info;

use crate::config::SessionConfig;
use crate::scene::OverlayScene;

pub struct ViewerSession<L: MapLoader> {
    simbox: SimBox,
    cache: MapCache<L>,
    header: SurfaceHeader,
    instrument_map: SolarImage,
    context: SolarImage,
    bottom: SolarImage,
}

impl<L: MapLoader> ViewerSession<L> {
    /// Build the box, load the initial maps and reproject the bottom one.
    pub fn new(config: &SessionConfig, loader: L) -> GxResult<Self> {
        let simbox = SimBox::new(
            config.observer_frame,
            &config.origin,
            config.dimensions,
            config.resolution,
        )?
        .with_pad(config.pad);

        let origin_on_sky = simbox.origin().transform_to(simbox.observer_frame())?;
        let instrument_map = make_dummy_map(&origin_on_sky)?;

        let fov = simbox.bl_tr_pad_coords()?.to_bbox()?;
        let mut cache = MapCache::new(loader, fov);

        let context = cache.get(&config.context_map)?.clone();
        let header = simbox
            .bottom_cea_header()
            .clone()
            .with_rsun_ref(context.meta.rsun_ref)?;
        let bottom = cache.get(&config.bottom_map)?.reproject_to(&header)?;

        info!(
            context = %config.context_map,
            bottom = %config.bottom_map,
            rows = header.rows(),
            cols = header.cols(),
            fov_width = fov.width(),
            fov_height = fov.height(),
            "Viewer session ready"
        );

        Ok(Self {
            simbox,
            cache,
            header,
            instrument_map,
            context,
            bottom,
        })
    }

    pub fn simbox(&self) -> &SimBox {
        &self.simbox
    }

    /// Surface header the bottom map is resampled onto.
    pub fn header(&self) -> &SurfaceHeader {
        &self.header
    }

    /// Placeholder map centred on the box origin.
    pub fn instrument_map(&self) -> &SolarImage {
        &self.instrument_map
    }

    pub fn context_map(&self) -> &SolarImage {
        &self.context
    }

    pub fn bottom_map(&self) -> &SolarImage {
        &self.bottom
    }

    pub fn available_maps(&self) -> Vec<String> {
        self.cache.available_maps()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Replace the bottom map with `name` resampled onto the surface header.
    ///
    /// On error the current bottom map is kept.
    pub fn update_bottom_map(&mut self, name: &str) -> GxResult<()> {
        let bottom = self.cache.get(name)?.reproject_to(&self.header)?;
        info!(name = name, "Bottom map updated");
        self.bottom = bottom;
        Ok(())
    }

    /// Replace the context map with `name`. The surface header keeps the
    /// reference radius it was created with.
    pub fn update_context_map(&mut self, name: &str) -> GxResult<()> {
        let context = self.cache.get(name)?.clone();
        info!(name = name, "Context map updated");
        self.context = context;
        Ok(())
    }

    /// Everything needed to draw the current view.
    pub fn scene(&self) -> GxResult<OverlayScene> {
        OverlayScene::build(&self.simbox, &self.header, &self.context, &self.bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_config, SessionConfig};
    use imagery::SyntheticLoader;

    const YAML: &str = r#"
observation:
  time: "2014-11-01T16:40:00Z"
box:
  origin: { x: -632.0, y: -135.0 }
  resolution_mm: 2.0
"#;

    fn session_config() -> SessionConfig {
        parse_config(YAML).unwrap().to_session_config().unwrap()
    }

    fn session() -> ViewerSession<SyntheticLoader> {
        let config = session_config();
        let loader = config.synthetic_loader().unwrap();
        ViewerSession::new(&config, loader).unwrap()
    }

    #[test]
    fn test_initial_maps() {
        let session = session();
        assert_eq!(session.context_map().name(), "171");
        assert_eq!(session.bottom_map().name(), "br");
        assert_eq!(session.bottom_map().shape(), session.header().shape);
        assert_eq!(session.header().rsun_ref, session.context_map().meta.rsun_ref);
    }

    #[test]
    fn test_instrument_map_is_centred_on_origin() {
        let session = session();
        let (cx, cy) = session.instrument_map().sky_extent().unwrap().center();
        assert!((cx + 632.0).abs() < 1e-6);
        assert!((cy + 135.0).abs() < 1e-6);
    }

    #[test]
    fn test_update_bottom_map() {
        let mut session = session();
        session.update_bottom_map("magnetogram").unwrap();
        assert_eq!(session.bottom_map().name(), "magnetogram");
        assert_eq!(session.bottom_map().shape(), session.header().shape);
    }

    #[test]
    fn test_failed_update_keeps_current_map() {
        let mut session = session();
        let err = session.update_bottom_map("304").unwrap_err();
        assert_eq!(err.error_code(), "MapNotAvailable");
        assert_eq!(session.bottom_map().name(), "br");
    }

    #[test]
    fn test_update_context_map_keeps_header() {
        let mut session = session();
        let header = session.header().clone();
        session.update_context_map("1600").unwrap();
        assert_eq!(session.context_map().name(), "1600");
        assert_eq!(session.header(), &header);
    }

    #[test]
    fn test_missing_context_map_fails() {
        let config = session_config();
        let loader = config.synthetic_loader().unwrap().with_names(&["magnetogram"]);
        let err = ViewerSession::new(&config, loader).err().unwrap();
        assert_eq!(err.error_code(), "MapNotAvailable");
    }
}
