//! Populate-once cache of maps for a viewing session.
//!
//! Maps are loaded on first request, cropped to the session's field of
//! view and kept until the cache is dropped. HMI field products are
//! derived from the four vector segments and inserted together.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use solar_common::{BoundingBox, GxError, GxResult};
use tracing::{debug, info};

use crate::hmi::{b2ptr, disambiguate, DEFAULT_DISAMBIG_METHOD};
use crate::image::SolarImage;

/// Raw HMI vector segments.
pub const HMI_B_SEGMENTS: [&str; 4] = ["field", "inclination", "azimuth", "disambig"];

/// Spherical field components derived from [`HMI_B_SEGMENTS`].
pub const HMI_B_PRODUCTS: [&str; 3] = ["bp", "bt", "br"];

/// Source of full-size maps by product name.
pub trait MapLoader {
    /// Product names this loader can provide.
    fn names(&self) -> Vec<String>;

    /// Load the full, uncropped map.
    fn load(&self, name: &str) -> GxResult<SolarImage>;
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Maps keyed by product name, loaded at most once.
pub struct MapCache<L: MapLoader> {
    loader: L,
    fov: BoundingBox,
    maps: HashMap<String, SolarImage>,
    hits: u64,
    misses: u64,
}

impl<L: MapLoader> MapCache<L> {
    /// A cache cropping every loaded map to `fov` (arcseconds).
    pub fn new(loader: L, fov: BoundingBox) -> Self {
        Self {
            loader,
            fov,
            maps: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn fov(&self) -> &BoundingBox {
        &self.fov
    }

    /// Loader names, plus the field products when every segment exists.
    pub fn available_maps(&self) -> Vec<String> {
        let mut names = self.loader.names();
        if HMI_B_SEGMENTS.iter().all(|s| names.iter().any(|n| n == s)) {
            for product in HMI_B_PRODUCTS {
                if !names.iter().any(|n| n == product) {
                    names.push(product.to_string());
                }
            }
        }
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.maps.contains_key(name)
    }

    /// The map called `name`, loading and cropping it on first use.
    pub fn get(&mut self, name: &str) -> GxResult<&SolarImage> {
        let available = self.available_maps();
        if !available.iter().any(|n| n == name) {
            return Err(GxError::map_not_available(name, &available[..]));
        }

        if self.maps.contains_key(name) {
            self.hits += 1;
        } else {
            self.misses += 1;
            self.populate(name)?;
        }

        self.maps
            .get(name)
            .ok_or_else(|| GxError::map_not_available(name, &available[..]))
    }

    fn populate(&mut self, name: &str) -> GxResult<()> {
        if HMI_B_PRODUCTS.contains(&name) {
            self.populate_products()
        } else if HMI_B_SEGMENTS.contains(&name) {
            self.populate_segment(name)
        } else {
            let map = self.load_cropped(name)?;
            self.maps.insert(name.to_string(), map);
            Ok(())
        }
    }

    fn load_cropped(&self, name: &str) -> GxResult<SolarImage> {
        let full = self.loader.load(name)?;
        let cropped = full.submap(&self.fov)?;
        info!(
            name = name,
            width = cropped.width,
            height = cropped.height,
            "Loaded map"
        );
        Ok(cropped)
    }

    fn populate_segment(&mut self, name: &str) -> GxResult<()> {
        if self.maps.contains_key(name) {
            return Ok(());
        }
        let mut map = self.load_cropped(name)?;
        if name == "azimuth" {
            self.populate_segment("disambig")?;
            if let Some(flags) = self.maps.get("disambig") {
                map = disambiguate(&map, flags, DEFAULT_DISAMBIG_METHOD)?;
                debug!("Resolved azimuth ambiguity");
            }
        }
        self.maps.insert(name.to_string(), map);
        Ok(())
    }

    fn populate_products(&mut self) -> GxResult<()> {
        for segment in HMI_B_SEGMENTS {
            self.populate_segment(segment)?;
        }
        let segment = |name: &str| {
            self.maps
                .get(name)
                .ok_or_else(|| GxError::InvalidMapData(format!("segment {} missing", name)))
        };
        let (bp, bt, br) = b2ptr(segment("field")?, segment("inclination")?, segment("azimuth")?)?;
        for product in [bp, bt, br] {
            self.maps.insert(product.name().to_string(), product);
        }
        info!("Derived HMI field products");
        Ok(())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.maps.len(),
        }
    }
}
