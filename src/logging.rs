use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Level used when neither `RUST_LOG` nor `-v` asks for more.
const DEFAULT_LEVEL: &str = "warn";

/// Filter directive for a `-v` count.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => DEFAULT_LEVEL,
        1 => "info",
        _ => "debug",
    }
}

/// Install the global subscriber: compact events on stderr, filtered by
/// `RUST_LOG` when set, otherwise by `verbosity`.
///
/// Only the binary calls this; the library never installs a subscriber.
pub fn init(verbosity: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let filter_layer = match verbosity {
        0 => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LEVEL))?,
        v => EnvFilter::try_new(level_for(v))?,
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{info, warn};

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(1), "info");
        assert_eq!(level_for(2), "debug");
        assert_eq!(level_for(9), "debug");
    }

    #[test]
    fn init_then_log() {
        // The global subscriber can only be installed once per process.
        let _ = init(2);
        info!("info event");
        warn!("warn event");
    }
}
