use std::io::IsTerminal;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the diagnostic log subscriber.
///
/// Events go to stderr so stdout stays clean for `tivor resolve` output.
/// `RUST_LOG` wins over `level` when set.
pub fn init(level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .with_level(true)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_safe_to_call_twice() {
        // Only the first call in a process can install a subscriber.
        let _ = init("debug");
        assert!(init("debug").is_err());

        tracing::debug!(component = "logging", "subscriber installed");
    }
}
