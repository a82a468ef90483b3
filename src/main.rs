use anyhow::{anyhow, Context};
use chill_pulse::background::BackgroundCatalog;
use chill_pulse::config::{AppConfig, CONFIG_FILE};
use chill_pulse::dashboard::widgets::OpenWeatherMap;
use chill_pulse::dashboard::{Dashboard, Services, WidgetRegistry};
use chill_pulse::gui::DashboardApp;
use chill_pulse::host::{DesktopNotifier, HostService, SystemClipboard};
use chill_pulse::logging;
use chill_pulse::store::JsonFileStore;
use chill_pulse::sync::SettingsSync;
use eframe::egui;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(CONFIG_FILE).with_context(|| format!("loading {CONFIG_FILE}"))?;
    logging::init(config.debug_logging, config.log_file.clone());
    tracing::info!(store = %config.store_path().display(), "starting chill pulse");

    let host = HostService::new(
        Box::new(JsonFileStore::new(config.store_path())),
        Box::new(SystemClipboard::default()),
        Box::new(DesktopNotifier),
    )
    .spawn()?;
    let bridge = host.connect()?;
    let services = Services {
        platform: Arc::new(bridge.platform()),
        weather: Arc::new(OpenWeatherMap::new(&config.weather_api_base)?),
    };
    let dashboard = Dashboard::new(
        WidgetRegistry::with_defaults(),
        SettingsSync::new(Box::new(bridge)),
        services,
        BackgroundCatalog::builtin().clone(),
    );

    let (w, h) = config.window_size;
    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size([w, h])
        .with_min_inner_size([480.0, 360.0])
        .with_decorations(false)
        .with_transparent(true);
    if config.always_on_top {
        viewport = viewport.with_always_on_top();
    }
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    let always_on_top = config.always_on_top;
    eframe::run_native(
        "Chill Pulse",
        native_options,
        Box::new(move |_cc| Box::new(DashboardApp::new(dashboard, always_on_top))),
    )
    .map_err(|e| anyhow!("window closed with an error: {e}"))?;

    host.shutdown();
    tracing::info!("chill pulse stopped");
    Ok(())
}
