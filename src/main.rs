use avito_feed::config::{load_config, AppConfig};
use avito_feed::pipeline::run_from_file;
use avito_feed::reference::load_reference;
use avito_feed::store::HttpPropertyStore;
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{error, info};

const STORE_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let config: AppConfig = match load_config("config.json") {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    let reference = match load_reference(&config.reference_path) {
        Ok(r) => Arc::new(r),
        Err(e) => {
            error!("Reference data load error: {}", e);
            return;
        }
    };

    let store = match HttpPropertyStore::new(STORE_TIMEOUT) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to initialize property store: {}", e);
            return;
        }
    };

    info!("Starting feed task for {}...", config.positions_path.display());
    match run_from_file(&config, reference, &store).await {
        Ok(report) => info!(
            "✅ Feed written to {} ({} records, {} skipped)",
            report.path.display(),
            report.written,
            report.summary.skipped_total()
        ),
        Err(e) => error!("Feed task failed: {}", e),
    }
}
