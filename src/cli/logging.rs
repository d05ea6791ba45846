//! Tracing subscriber setup for the binary.
//!
//! The notification level picks the default filter; `RUST_LOG`, when set,
//! replaces it.

use tracing_subscriber::EnvFilter;

/// Filter directive for a notification level.
pub fn level_directive(level: u32) -> &'static str {
    match level {
        0 => "off",
        1 => "error",
        2 => "warn",
        3 => "info",
        _ => "debug",
    }
}

/// Install a stderr `fmt` subscriber. Fails if one is already installed.
pub fn init_logging(level: u32) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_directive(level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("cannot install log subscriber: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_map_to_directives() {
        assert_eq!(level_directive(0), "off");
        assert_eq!(level_directive(1), "error");
        assert_eq!(level_directive(2), "warn");
        assert_eq!(level_directive(3), "info");
        assert_eq!(level_directive(9), "debug");
    }
}
