use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use club_attendance::api::router;
use club_attendance::clock::{Clock, SystemClock};
use club_attendance::config::{AppConfig, StoreBackend};
use club_attendance::error::AppError;
use club_attendance::schedule::SessionSchedule;
use club_attendance::sheets::{MemorySheetStore, SheetStore, SheetsHttpClient};
use club_attendance::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "club_attendance=debug,tower_http=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.window.utc_offset));

    let store: Arc<dyn SheetStore> = match config.store_backend {
        StoreBackend::Google => {
            let sheets = config
                .sheets
                .clone()
                .ok_or_else(|| AppError::Config("Google Sheets settings missing".to_string()))?;
            info!("using spreadsheet {}", sheets.spreadsheet_id);
            Arc::new(SheetsHttpClient::new(sheets, clock.clone())?)
        }
        StoreBackend::Memory => {
            warn!("using in-memory store; data is lost on restart");
            Arc::new(MemorySheetStore::new(clock.clone()))
        }
    };

    if let Err(e) = store.ping().await {
        warn!("spreadsheet not reachable at startup: {}", e);
    }

    let schedule = SessionSchedule::club_calendar()?;
    info!(
        "{} sessions scheduled, window opens Fridays at {:02}:00",
        schedule.len(),
        config.window.start_hour
    );

    let state = AppState::new(store, schedule, config.window, clock);
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST/PORT: {}", e)))?;
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
