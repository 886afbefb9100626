//! Process-wide logging init, generalizing the reference workspace's
//! `TracingFactory::init_log` into a safe, idempotent call with no
//! `unsafe` static guard: `OnceCell` already gives us "install exactly
//! once" without needing a raw flag.

use once_cell::sync::OnceCell;
use tracing::Level;

static INIT: OnceCell<()> = OnceCell::new();

/// Installs a process-wide `tracing` subscriber. `debug` selects
/// `DEBUG` vs `INFO` as the max level. Safe to call more than once (or
/// concurrently, or from tests and from an embedding application at the
/// same time) — only the first call takes effect.
pub fn init(debug: bool) {
    INIT.get_or_init(|| {
        let level = if debug { Level::DEBUG } else { Level::INFO };
        let subscriber = tracing_subscriber::fmt().with_max_level(level).finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Convenience for integration tests: always enables `TRACE` so a
/// failing test's logs are fully visible.
pub fn init_test() {
    INIT.get_or_init(|| {
        let subscriber = tracing_subscriber::fmt().with_max_level(Level::TRACE).finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
