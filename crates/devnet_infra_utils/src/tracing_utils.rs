use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tokio::sync::OnceCell;
use tracing::metadata::LevelFilter;
use tracing::{error, info, warn};
use tracing_subscriber::fmt::format::{Compact, DefaultFields, Format};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::Layered;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

#[cfg(test)]
#[path = "tracing_utils_test.rs"]
mod tracing_utils_test;

const DEFAULT_LEVEL: LevelFilter = LevelFilter::INFO;
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

type FmtLayer = fmt::Layer<
    Registry,
    DefaultFields,
    Format<Compact, UtcTime<&'static [BorrowedFormatItem<'static>]>>,
>;
type FilterHandle = reload::Handle<EnvFilter, Layered<FmtLayer, Registry>>;

// Set by the first `configure_tracing` call; holds the handle for swapping the level filter.
static FILTER_HANDLE: OnceCell<FilterHandle> = OnceCell::const_new();

/// Installs the global tracing subscriber: compact lines with a UTC timestamp, file name and line
/// number, filtered by `RUST_LOG` on top of the `INFO` default. Later calls are no-ops.
pub async fn configure_tracing() {
    FILTER_HANDLE
        .get_or_init(|| async {
            let fmt_layer: FmtLayer = fmt::layer()
                .compact()
                .with_timer(UtcTime::new(TIMESTAMP_FORMAT))
                .with_target(false)
                .with_file(true)
                .with_line_number(true);
            let (filter_layer, handle) = reload::Layer::new(env_filter(DEFAULT_LEVEL, true));

            match tracing_subscriber::registry().with(fmt_layer).with(filter_layer).try_init() {
                Ok(()) => info!("Tracing initialized at level {DEFAULT_LEVEL}."),
                Err(error) => warn!("A tracing subscriber is already installed: {error}"),
            }
            handle
        })
        .await;
}

fn env_filter(level: LevelFilter, honour_rust_log: bool) -> EnvFilter {
    let builder = EnvFilter::builder().with_default_directive(level.into());
    if honour_rust_log { builder.from_env_lossy() } else { builder.parse_lossy("") }
}

/// Replaces the active level filter, ignoring `RUST_LOG`. Has no effect before
/// [`configure_tracing`] was called.
pub fn change_tracing_level(level: LevelFilter) {
    let Some(handle) = FILTER_HANDLE.get() else {
        warn!("Cannot change the tracing level to {level}: tracing is not configured.");
        return;
    };
    match handle.reload(env_filter(level, false)) {
        Ok(()) => info!("Tracing level changed to {level}."),
        Err(reload_error) => {
            error!("Failed to change the tracing level to {level}: {reload_error}")
        }
    }
}

/// Parses a log level name (`error`, `warn`, `info`, `debug`, `trace`, `off`), case-insensitive.
pub fn parse_level_filter(level: &str) -> Option<LevelFilter> {
    level.trim().parse().ok()
}
