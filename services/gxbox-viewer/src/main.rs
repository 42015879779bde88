//! gxbox viewer.
//!
//! Builds a box session from a YAML config and writes the overlay scene
//! as JSON, to stdout or a file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gxbox_viewer::config::{load_config, ConfigOverrides, LogFormat, ObserverSpec, OriginFrame};
use gxbox_viewer::ViewerSession;

#[derive(Parser, Debug)]
#[command(name = "gxbox-viewer")]
#[command(about = "Project a solar simulation box onto an observer's sky")]
struct Args {
    /// Viewer configuration file
    #[arg(short, long, env = "GXBOX_CONFIG", default_value = "config/flare-2014-11-01.yaml")]
    config: PathBuf,

    /// Override the observation time (ISO 8601)
    #[arg(long, env = "GXBOX_TIME")]
    time: Option<String>,

    /// Override the observer: "earth" or LON,LAT,AU in Stonyhurst degrees
    #[arg(long, env = "GXBOX_OBSERVER")]
    observer: Option<ObserverSpec>,

    /// Override the frame the box origin is given in
    #[arg(long, value_enum)]
    origin_frame: Option<OriginFrame>,

    /// Override the box origin as X,Y in the origin frame
    #[arg(long, value_delimiter = ',', num_args = 2)]
    origin: Option<Vec<f64>>,

    /// Override the box dimensions in Mm as X,Y,Z
    #[arg(long, value_delimiter = ',', num_args = 3)]
    dimensions_mm: Option<Vec<f64>>,

    /// Override the surface resolution in Mm
    #[arg(long)]
    resolution_mm: Option<f64>,

    /// Override the field-of-view pad fraction
    #[arg(long)]
    pad_fraction: Option<f64>,

    /// Override the smallest extent the pad is computed from, in arcseconds
    #[arg(long)]
    pad_floor_arcsec: Option<f64>,

    /// Override the context map
    #[arg(long)]
    context_map: Option<String>,

    /// Override the bottom map
    #[arg(long)]
    bottom_map: Option<String>,

    /// Override the products the map source serves, comma separated
    #[arg(long, value_delimiter = ',')]
    maps: Option<Vec<String>>,

    /// Write the scene here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// List the maps the source can provide and exit
    #[arg(long)]
    list_maps: bool,

    /// Log level (overrides the config file)
    #[arg(long, env = "GXBOX_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (overrides the config file)
    #[arg(long, value_enum, env = "GXBOX_LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            time: self.time.clone(),
            observer: self.observer.clone(),
            origin_frame: self.origin_frame,
            origin: self.origin.as_deref().and_then(|v| <[f64; 2]>::try_from(v).ok()),
            dimensions_mm: self.dimensions_mm.as_deref().and_then(|v| <[f64; 3]>::try_from(v).ok()),
            resolution_mm: self.resolution_mm,
            pad_fraction: self.pad_fraction,
            pad_floor_arcsec: self.pad_floor_arcsec,
            context_map: self.context_map.clone(),
            bottom_map: self.bottom_map.clone(),
            maps: self.maps.clone(),
            log_level: self.log_level.clone(),
            log_format: self.log_format,
        }
    }
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    args.overrides().apply(&mut config);
    init_tracing(&config.logging.level, config.logging.format);

    let session_config = config
        .to_session_config()
        .with_context(|| format!("Invalid viewer config: {}", args.config.display()))?;
    let loader = session_config.synthetic_loader()?;

    info!(config = %args.config.display(), "Starting gxbox viewer");
    let session = ViewerSession::new(&session_config, loader)?;

    if args.list_maps {
        let mut names = session.available_maps();
        names.sort();
        println!("{}", names.join("\n"));
        return Ok(());
    }

    let scene = session.scene()?;
    let json = serde_json::to_string_pretty(&scene)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write scene: {}", path.display()))?;
            info!(path = %path.display(), "Scene written");
        }
        None => println!("{}", json),
    }

    let stats = session.cache_stats();
    info!(
        maps_loaded = stats.entries,
        cache_hits = stats.hits,
        cache_misses = stats.misses,
        "Done"
    );
    Ok(())
}
