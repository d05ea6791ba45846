// cli/constants.rs — Program identity, size multipliers and the display level.
//
// User-facing result lines go through `displaylevel!`; diagnostics go
// through `tracing`, whose filter is derived from the same level.

use std::sync::atomic::{AtomicU32, Ordering};

// ── Identity ─────────────────────────────────────────────────────────────────
pub const COMPRESSOR_NAME: &str = "piccompress";
pub const AUTHOR: &str = "piccompress contributors";

// ── Size multipliers ─────────────────────────────────────────────────────────
pub const KB: u64 = 1 << 10;
pub const MB: u64 = 1 << 20;
pub const GB: u64 = 1 << 30;

// ── Display level ────────────────────────────────────────────────────────────
//
// 0 = silent; 1 = errors only; 2 = warnings and per-file results (default);
// 3 = progress and info; 4+ = debug
pub static DISPLAY_LEVEL: AtomicU32 = AtomicU32::new(2);

#[inline]
pub fn display_level() -> u32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

#[inline]
pub fn set_display_level(level: u32) {
    DISPLAY_LEVEL.store(level, Ordering::Relaxed);
}

/// Print to stdout.
#[macro_export]
macro_rules! displayout {
    ($($arg:tt)*) => { print!($($arg)*) };
}

/// Print to stderr when the display level is at least `level`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::cli::constants::display_level() >= $level {
            eprint!($($arg)*);
        }
    };
}
