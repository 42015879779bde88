//! Viewer configuration.
//!
//! Loads a YAML file describing the observation, the box and the maps to
//! show, with `${VAR}` and `${VAR:-default}` environment substitution, then
//! resolves it into the typed values a [`crate::session::ViewerSession`]
//! needs.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::ValueEnum;
use gxbox::{BoxDimensions, PadConfig};
use imagery::SyntheticLoader;
use projection::{Frame, Observer, SkyCoord};
use serde::{Deserialize, Serialize};
use solar_common::units::{mm_to_m, AU_METERS, RSUN_PHOTOSPHERIC};
use solar_common::{GxError, GxResult, ObservationTime};

// ============================================================================
// YAML Structures
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub observation: ObservationSection,
    #[serde(rename = "box")]
    pub simbox: BoxSection,
    pub bounds: BoundsSection,
    pub viewer: ViewerSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationSection {
    /// ISO 8601 observation time
    pub time: String,
    pub observer: ObserverSpec,
}

/// Either a named observer or an explicit Stonyhurst position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObserverSpec {
    Named(String),
    Position {
        lon_deg: f64,
        lat_deg: f64,
        distance_au: f64,
    },
}

impl Default for ObserverSpec {
    fn default() -> Self {
        ObserverSpec::Named("earth".to_string())
    }
}

/// `earth` (or another name) or `LON,LAT,AU` in Stonyhurst degrees.
impl FromStr for ObserverSpec {
    type Err = GxError;

    fn from_str(s: &str) -> GxResult<Self> {
        if !s.contains(',') {
            return Ok(ObserverSpec::Named(s.trim().to_string()));
        }
        let parts = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| GxError::ConfigError(format!("observer '{}': {}", s, e)))?;
        match parts[..] {
            [lon_deg, lat_deg, distance_au] => Ok(ObserverSpec::Position {
                lon_deg,
                lat_deg,
                distance_au,
            }),
            _ => Err(GxError::ConfigError(format!(
                "observer '{}' must be a name or LON,LAT,AU",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum OriginFrame {
    /// `x`, `y` are Tx, Ty in arcseconds
    #[default]
    Helioprojective,
    /// `x`, `y` are longitude and latitude in degrees
    HeliographicStonyhurst,
    HeliographicCarrington,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginSpec {
    pub frame: OriginFrame,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxSection {
    pub origin: OriginSpec,
    pub dimensions_mm: [f64; 3],
    pub resolution_mm: f64,
}

impl Default for BoxSection {
    fn default() -> Self {
        Self {
            origin: OriginSpec::default(),
            dimensions_mm: [100.0, 100.0, 100.0],
            resolution_mm: 1.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundsSection {
    pub pad_fraction: f64,
    pub pad_floor_arcsec: f64,
}

impl Default for BoundsSection {
    fn default() -> Self {
        let pad = PadConfig::default();
        Self {
            pad_fraction: pad.fraction,
            pad_floor_arcsec: pad.floor_arcsec,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSection {
    pub context_map: String,
    pub bottom_map: String,
    /// Products the map source serves; all synthetic products when absent
    pub maps: Option<Vec<String>>,
}

impl Default for ViewerSection {
    fn default() -> Self {
        Self {
            context_map: "171".to_string(),
            bottom_map: "br".to_string(),
            maps: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

// ============================================================================
// Command-line Overrides
// ============================================================================

/// Values given on the command line; each one that is set replaces the
/// file's.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub time: Option<String>,
    pub observer: Option<ObserverSpec>,
    pub origin_frame: Option<OriginFrame>,
    pub origin: Option<[f64; 2]>,
    pub dimensions_mm: Option<[f64; 3]>,
    pub resolution_mm: Option<f64>,
    pub pad_fraction: Option<f64>,
    pub pad_floor_arcsec: Option<f64>,
    pub context_map: Option<String>,
    pub bottom_map: Option<String>,
    pub maps: Option<Vec<String>>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut ViewerConfig) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        set(&mut config.observation.time, self.time);
        set(&mut config.observation.observer, self.observer);
        set(&mut config.simbox.origin.frame, self.origin_frame);
        if let Some([x, y]) = self.origin {
            config.simbox.origin.x = x;
            config.simbox.origin.y = y;
        }
        set(&mut config.simbox.dimensions_mm, self.dimensions_mm);
        set(&mut config.simbox.resolution_mm, self.resolution_mm);
        set(&mut config.bounds.pad_fraction, self.pad_fraction);
        set(&mut config.bounds.pad_floor_arcsec, self.pad_floor_arcsec);
        set(&mut config.viewer.context_map, self.context_map);
        set(&mut config.viewer.bottom_map, self.bottom_map);
        if self.maps.is_some() {
            config.viewer.maps = self.maps;
        }
        set(&mut config.logging.level, self.log_level);
        set(&mut config.logging.format, self.log_format);
    }
}

// ============================================================================
// Resolved Configuration
// ============================================================================

/// Everything a viewer session is built from, in typed form.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub observer_frame: Frame,
    pub origin: SkyCoord,
    pub dimensions: BoxDimensions,
    /// Metres per surface pixel
    pub resolution: f64,
    pub pad: PadConfig,
    pub context_map: String,
    pub bottom_map: String,
    pub maps: Option<Vec<String>>,
}

impl SessionConfig {
    /// Synthetic map source seen from this session's observer, with its
    /// active region under the box origin.
    pub fn synthetic_loader(&self) -> GxResult<SyntheticLoader> {
        let (tx, ty) = self
            .origin
            .transform_to(&self.observer_frame)?
            .tx_ty_arcsec()
            .ok_or_else(|| GxError::ConfigError("box origin has no sky position".to_string()))?;

        let mut loader = SyntheticLoader::new(self.observer_frame).with_active_region(tx, ty);
        if let Some(maps) = &self.maps {
            let names: Vec<&str> = maps.iter().map(String::as_str).collect();
            loader = loader.with_names(&names);
        }
        Ok(loader)
    }
}

impl ViewerConfig {
    /// Resolve into a [`SessionConfig`].
    pub fn to_session_config(&self) -> GxResult<SessionConfig> {
        let time = ObservationTime::from_iso8601(&self.observation.time)?;
        let observer = resolve_observer(&self.observation.observer, &time)?;
        let observer_frame = Frame::helioprojective(observer, time);

        let OriginSpec { frame, x, y } = self.simbox.origin;
        let origin = match frame {
            OriginFrame::Helioprojective => SkyCoord::helioprojective(observer_frame, x, y)?,
            OriginFrame::HeliographicStonyhurst => {
                SkyCoord::heliographic(Frame::stonyhurst(Some(time)), x, y, RSUN_PHOTOSPHERIC)?
            }
            OriginFrame::HeliographicCarrington => {
                SkyCoord::heliographic(Frame::carrington(Some(time)), x, y, RSUN_PHOTOSPHERIC)?
            }
        };

        let [dx, dy, dz] = self.simbox.dimensions_mm;
        let dimensions = BoxDimensions::from_mm(dx, dy, dz)?;

        let BoundsSection {
            pad_fraction,
            pad_floor_arcsec,
        } = self.bounds;
        if !(pad_fraction.is_finite() && pad_fraction >= 0.0) {
            return Err(GxError::ConfigError(format!(
                "pad_fraction must be a non-negative number, got {}",
                pad_fraction
            )));
        }
        if !(pad_floor_arcsec.is_finite() && pad_floor_arcsec >= 0.0) {
            return Err(GxError::ConfigError(format!(
                "pad_floor_arcsec must be a non-negative number, got {}",
                pad_floor_arcsec
            )));
        }

        if self.viewer.context_map.trim().is_empty() || self.viewer.bottom_map.trim().is_empty() {
            return Err(GxError::ConfigError(
                "context_map and bottom_map must be named".to_string(),
            ));
        }

        Ok(SessionConfig {
            observer_frame,
            origin,
            dimensions,
            resolution: mm_to_m(self.simbox.resolution_mm),
            pad: PadConfig {
                fraction: pad_fraction,
                floor_arcsec: pad_floor_arcsec,
            },
            context_map: self.viewer.context_map.clone(),
            bottom_map: self.viewer.bottom_map.clone(),
            maps: self.viewer.maps.clone(),
        })
    }
}

fn resolve_observer(choice: &ObserverSpec, time: &ObservationTime) -> GxResult<Observer> {
    match choice {
        ObserverSpec::Named(name) if name.eq_ignore_ascii_case("earth") => Ok(Observer::earth(time)),
        ObserverSpec::Named(name) => Err(GxError::ConfigError(format!(
            "unknown observer '{}', expected 'earth' or an explicit position",
            name
        ))),
        ObserverSpec::Position {
            lon_deg,
            lat_deg,
            distance_au,
        } => {
            if !(distance_au.is_finite() && *distance_au > 0.0) {
                return Err(GxError::ConfigError(format!(
                    "observer distance must be positive, got {} au",
                    distance_au
                )));
            }
            Ok(Observer::from_degrees(*lon_deg, *lat_deg, distance_au * AU_METERS))
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load and parse a viewer config file.
pub fn load_config(path: &Path) -> Result<ViewerConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read viewer config: {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid viewer config: {}", path.display()))
}

/// Parse viewer config text after environment substitution.
pub fn parse_config(content: &str) -> Result<ViewerConfig> {
    let expanded = expand_env_vars(content)?;
    let config: ViewerConfig = serde_yaml::from_str(&expanded).context("Failed to parse YAML")?;
    Ok(config)
}

/// Expand `${VAR}` and `${VAR:-default}` references. An empty variable
/// takes the default.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut expanded = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(start) = rest.find("${") {
        expanded.push_str(&rest[..start]);
        let reference = &rest[start + 2..];
        let end = reference.find('}').context("Unclosed ${ in config")?;
        let value = match reference[..end].split_once(":-") {
            Some((name, default)) => std::env::var(name.trim())
                .ok()
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string()),
            None => {
                let name = reference[..end].trim();
                std::env::var(name).with_context(|| format!("Environment variable {} not set", name))?
            }
        };
        expanded.push_str(&value);
        rest = &reference[end + 1..];
    }
    expanded.push_str(rest);
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use test_utils::{assert_angle_approx_eq, assert_approx_eq};

    const FLARE_YAML: &str = r#"
observation:
  time: "2014-11-01T16:40:00Z"
  observer: earth
box:
  origin:
    frame: helioprojective
    x: -632.0
    y: -135.0
  dimensions_mm: [150.0, 150.0, 100.0]
  resolution_mm: 0.6
viewer:
  context_map: "171"
  bottom_map: br
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(FLARE_YAML).unwrap();
        assert_eq!(config.simbox.dimensions_mm, [150.0, 150.0, 100.0]);
        assert_eq!(config.simbox.origin.frame, OriginFrame::Helioprojective);
        assert_eq!(config.viewer.bottom_map, "br");
        assert_eq!(config.bounds, BoundsSection::default());
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_missing_sections_take_defaults() {
        let config = parse_config("observation:\n  time: \"2014-11-01\"\n").unwrap();
        assert_eq!(config.simbox.dimensions_mm, [100.0, 100.0, 100.0]);
        assert_eq!(config.simbox.resolution_mm, 1.4);
        assert_eq!(config.viewer.context_map, "171");
        assert_eq!(config.observation.observer, ObserverSpec::Named("earth".to_string()));
    }

    #[test]
    fn test_resolves_session_config() {
        let session = parse_config(FLARE_YAML).unwrap().to_session_config().unwrap();
        assert_approx_eq!(session.resolution, 0.6e6, 1e-3);
        assert_eq!(session.dimensions.as_array(), [150.0e6, 150.0e6, 100.0e6]);
        let (tx, ty) = session.origin.tx_ty_arcsec().unwrap();
        assert_approx_eq!(tx, -632.0, 1e-9);
        assert_approx_eq!(ty, -135.0, 1e-9);
        assert!(session.observer_frame.is_projective());
    }

    #[test]
    fn test_explicit_observer_and_heliographic_origin() {
        let yaml = r#"
observation:
  time: "2014-11-01T16:40:00Z"
  observer: { lon_deg: 60.0, lat_deg: 1.5, distance_au: 0.97 }
box:
  origin: { frame: heliographic_stonyhurst, x: 45.0, y: -10.0 }
"#;
        let session = parse_config(yaml).unwrap().to_session_config().unwrap();
        let observer = session.observer_frame.observer().unwrap();
        assert_angle_approx_eq!(observer.lon_deg(), 60.0, 1e-9);
        assert_approx_eq!(observer.radius, 0.97 * AU_METERS, 1.0);
        let (lon, lat) = session.origin.lon_lat_deg().unwrap();
        assert_approx_eq!(lon, 45.0, 1e-9);
        assert_approx_eq!(lat, -10.0, 1e-9);
    }

    #[test]
    fn test_bad_time_is_rejected() {
        let config = parse_config("observation:\n  time: yesterday\n").unwrap();
        let err = config.to_session_config().unwrap_err();
        assert_eq!(err.error_code(), "InvalidTime");
    }

    #[test]
    fn test_unknown_observer_is_rejected() {
        let yaml = "observation:\n  time: \"2014-11-01\"\n  observer: mars\n";
        let err = parse_config(yaml).unwrap().to_session_config().unwrap_err();
        assert_eq!(err.error_code(), "ConfigError");
        assert!(err.to_string().contains("mars"));
    }

    #[test]
    fn test_negative_pad_is_rejected() {
        let yaml = "observation:\n  time: \"2014-11-01\"\nbounds:\n  pad_fraction: -0.1\n";
        let err = parse_config(yaml).unwrap().to_session_config().unwrap_err();
        assert_eq!(err.error_code(), "ConfigError");
    }

    #[test]
    fn test_zero_dimension_is_rejected() {
        let yaml = "observation:\n  time: \"2014-11-01\"\nbox:\n  dimensions_mm: [100.0, 0.0, 100.0]\n";
        let err = parse_config(yaml).unwrap().to_session_config().unwrap_err();
        assert_eq!(err.error_code(), "InvalidDimensions");
    }

    #[test]
    fn test_env_default_substitution() {
        let expanded = expand_env_vars("level: ${GXBOX_TEST_UNSET_LEVEL:-debug}").unwrap();
        assert_eq!(expanded, "level: debug");
    }

    #[test]
    fn test_env_substitution_keeps_surrounding_text() {
        let expanded = expand_env_vars("x: ${GXBOX_TEST_UNSET_X:-1.5}, y: ${GXBOX_TEST_UNSET_Y:-}$").unwrap();
        assert_eq!(expanded, "x: 1.5, y: $");
        assert_eq!(expand_env_vars("plain: text").unwrap(), "plain: text");
    }

    #[test]
    fn test_observer_from_cli_text() {
        assert_eq!("earth".parse::<ObserverSpec>().unwrap(), ObserverSpec::default());
        assert_eq!(
            "60, 1.5, 0.97".parse::<ObserverSpec>().unwrap(),
            ObserverSpec::Position {
                lon_deg: 60.0,
                lat_deg: 1.5,
                distance_au: 0.97
            }
        );
        assert!("60,1.5".parse::<ObserverSpec>().is_err());
        assert!("60,north,1".parse::<ObserverSpec>().is_err());
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut config = parse_config(FLARE_YAML).unwrap();
        ConfigOverrides {
            observer: Some("60,1.5,0.97".parse().unwrap()),
            origin_frame: Some(OriginFrame::HeliographicStonyhurst),
            origin: Some([45.0, -10.0]),
            pad_floor_arcsec: Some(5.0),
            maps: Some(vec!["171".to_string(), "br".to_string()]),
            log_format: Some(LogFormat::Json),
            ..Default::default()
        }
        .apply(&mut config);

        assert_eq!(config.bounds.pad_floor_arcsec, 5.0);
        assert_eq!(config.bounds.pad_fraction, 0.3);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.viewer.bottom_map, "br");

        let session = config.to_session_config().unwrap();
        assert_eq!(session.pad.floor_arcsec, 5.0);
        assert_eq!(session.maps.as_deref(), Some(&["171".to_string(), "br".to_string()][..]));
        let observer = session.observer_frame.observer().unwrap();
        assert_angle_approx_eq!(observer.lon_deg(), 60.0, 1e-9);
        let (lon, lat) = session.origin.lon_lat_deg().unwrap();
        assert_approx_eq!(lon, 45.0, 1e-9);
        assert_approx_eq!(lat, -10.0, 1e-9);
    }

    #[test]
    fn test_log_format_override_can_return_to_pretty() {
        let mut config = parse_config("logging:\n  format: json\n").unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        ConfigOverrides {
            log_format: Some(LogFormat::Pretty),
            ..Default::default()
        }
        .apply(&mut config);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_env_substitution_unset_var_fails() {
        assert!(expand_env_vars("level: ${GXBOX_TEST_NEVER_SET}").is_err());
        assert!(expand_env_vars("level: ${UNCLOSED").is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FLARE_YAML.as_bytes()).unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.observation.time, "2014-11-01T16:40:00Z");
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("absent.yaml"));
    }
}
