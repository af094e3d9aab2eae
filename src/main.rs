//! Lumen - headless sandbox for the injection runtime
//!
//! Builds the configured worlds, injects every system once and runs a fixed
//! number of ticks.

mod sandbox;
mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use lumen_di::Injects;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use sandbox::{TickLog, TracingTickLog};
use settings::{SandboxSettings, SettingsOrigin};

fn main() -> Result<()> {
    let path = std::env::args().nth(1).map(PathBuf::from);
    let (settings, origin) = SandboxSettings::load(path.as_deref());

    let subscriber = FmtSubscriber::builder()
        .with_max_level(settings.level())
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    if origin.is_fallback() {
        warn!("Settings {}", origin);
    } else {
        info!("Settings {}", origin);
    }

    // First run: leave a template next to where the settings are looked up.
    if let SettingsOrigin::Missing(path) = &origin {
        match settings.save(path) {
            Ok(()) => info!("Wrote default settings to {:?}", path),
            Err(e) => warn!("Failed to write default settings: {}", e),
        }
    }

    let context = sandbox::context(&settings).context("Failed to build ECS context")?;
    let mut systems = sandbox::systems(context);

    let tick_log: Arc<dyn TickLog> = Arc::new(TracingTickLog);
    systems
        .inject_with(&Injects::new().with(tick_log))
        .context("Failed to inject systems")?;

    systems.init();
    info!(
        "Lumen sandbox started - {} systems, {} ticks",
        systems.len(),
        settings.ticks
    );

    for _ in 0..settings.ticks {
        systems.run();
    }

    systems.destroy();
    let world = systems.context().default_world();
    info!(
        "Lumen sandbox finished - {} entities in '{}'",
        world.entity_count(),
        world.name()
    );
    Ok(())
}
