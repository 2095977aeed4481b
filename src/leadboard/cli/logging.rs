//! Logging setup for the binary.
//!
//! The library only emits `tracing` events; this installs the subscriber that
//! prints them. Output goes to stderr so stdout stays clean for tables and JSON.
//!
//! - no flag: warnings and errors
//! - `-v`: debug (cache hits, misses, coalescing, state restore)
//! - `-vv`: trace
//!
//! `RUST_LOG` replaces the verbosity-derived filter entirely.

use tracing::Level;
use tracing_subscriber::EnvFilter;

pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn filter_for(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "leadboard={}",
            level_for(verbosity).as_str().to_ascii_lowercase()
        ))
    })
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(verbosity: u8) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for(0), Level::WARN);
        assert_eq!(level_for(1), Level::DEBUG);
        assert_eq!(level_for(2), Level::TRACE);
        assert_eq!(level_for(9), Level::TRACE);
    }
}
