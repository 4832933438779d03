//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! Behavior:
//! - LOG_LEVEL controls the filter (e.g. "debug" or detailed directives like
//!   "info,mission=debug,leaderboard=debug,tower_http=info,axum=info").
//! - LOG_FORMAT selects "pretty" (default) or "json" structured logs.
//! - NO_COLOR (any value) disables ANSI colors in pretty output.
//!
//! Notes:
//! - Targets are `mission_possible` (service), `mission` (progress, catalog,
//!   feedback) and `leaderboard`; they are printed to disambiguate sources.
//! - Tower HTTP TraceLayer still adds per-request spans; WebSocket traffic only
//!   shows up through the targets above.

use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
        EnvFilter::new("info,mission=debug,mission_possible=debug,tower_http=info,axum=info")
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(std::env::var_os("NO_COLOR").is_none());

    // Builders for the two formats have different types, so init in each arm.
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => {
            builder.json().init();
        }
        _ => {
            builder.init();
        }
    }
}
