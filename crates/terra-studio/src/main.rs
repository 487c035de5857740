mod app;
mod canvas;
mod config;
mod fonts;

use anyhow::Context;
use terra_engine::device::GpuInit;
use terra_engine::logging::{init_logging, LoggingConfig};
use terra_engine::window::{Runtime, RuntimeConfig};

use crate::app::PlanetApp;
use crate::config::StudioConfig;

fn main() -> anyhow::Result<()> {
    let config = StudioConfig::from_env();

    let mut logging = LoggingConfig::default();
    if let Some(filter) = &config.log_filter {
        logging = logging.with_filter(filter.clone());
    }
    init_logging(logging);
    for warning in &config.warnings {
        log::warn!("{warning}");
    }

    let runtime = RuntimeConfig::default()
        .with_title(config.title.clone())
        .with_size(config.width, config.height);

    Runtime::run(runtime, GpuInit::default(), PlanetApp::new(config)).context("terra exited with an error")
}
