use once_cell::sync::OnceCell;
use std::sync::{Once, RwLock as StdRwLock};
use tokio::sync::broadcast;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;

// Keep the non-blocking worker guard alive for the entire process lifetime
pub(super) static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();
pub(super) static INIT_ONCE: Once = Once::new();
pub(super) static INIT_ERROR: OnceCell<String> = OnceCell::new();
pub(super) static LOG_BROADCAST_TX: OnceCell<broadcast::Sender<String>> = OnceCell::new();
static WEB_LOG_LEVEL: OnceCell<StdRwLock<Level>> = OnceCell::new();

/// Initialize or update the runtime level of the web log stream
pub fn set_web_log_level(new_level: Level) {
    let lock = WEB_LOG_LEVEL.get_or_init(|| StdRwLock::new(new_level));
    if let Ok(mut guard) = lock.write() {
        *guard = new_level;
    }
}

/// Current runtime level of the web log stream. Defaults to INFO if unset.
pub fn get_web_log_level() -> Level {
    WEB_LOG_LEVEL
        .get()
        .and_then(|lock| lock.read().ok().map(|guard| *guard))
        .unwrap_or(Level::INFO)
}
