// config.rs — Defaults for the compression façade and the CLI driver.
//
// The path-based one-shot entrypoint has no request object, so its defaults
// live in `OneShotDefaults` and can be replaced per `Compressor`. Older
// builds capped the width at 1680 pixels; the current default is 2520.

use crate::engine::SupportedFileType;
use crate::params::TargetFormat;

// Default quality forwarded to the JPEG and PNG quality fields.
// Can be overridden by the PICCOMPRESS_QUALITY environment variable or `-q`.
pub const DEFAULT_QUALITY: u32 = 80;

// Target used when a request does not name one (JPEG conversion).
pub const DEFAULT_TARGET: TargetFormat = TargetFormat::ConvertA;

// Width cap applied by `Compressor::compress` (path-based one-shot).
// Can be overridden by the PICCOMPRESS_WIDTH environment variable.
pub const DEFAULT_WIDTH_CAP: u32 = 2520;

// Width cap used by earlier releases of the one-shot entrypoint.
pub const LEGACY_WIDTH_CAP: u32 = 1680;

// Upper bound (exclusive) of a byte count the engine may report as a real size.
// Anything at or above it, or zero, is classified as resource exhaustion.
pub const SENTINEL: u64 = 2_147_483_600;

// Default capacity of an output view (64 MiB).
pub const MAP_FILE_SIZE: u64 = 0x0400_0000;

// Default number of batch workers. `0` means one per logical CPU.
// Can be overridden by the PICCOMPRESS_WORKERS environment variable or `-T`.
pub const WORKERS_DEFAULT: usize = 0;

/// Parameters of the path-based `Compressor::compress` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OneShotDefaults {
    pub file_type: SupportedFileType,
    pub quality: u32,
    pub width_cap: u32,
    pub reduce_by_power_of_2: bool,
}

impl Default for OneShotDefaults {
    fn default() -> Self {
        OneShotDefaults {
            file_type: SupportedFileType::Jpeg,
            quality: DEFAULT_QUALITY,
            width_cap: DEFAULT_WIDTH_CAP,
            reduce_by_power_of_2: true,
        }
    }
}

impl OneShotDefaults {
    /// Defaults of the 1680-pixel generation.
    pub fn legacy() -> Self {
        OneShotDefaults {
            width_cap: LEGACY_WIDTH_CAP,
            ..Self::default()
        }
    }

    /// Defaults with `PICCOMPRESS_QUALITY` and `PICCOMPRESS_WIDTH` applied.
    pub fn from_env() -> Self {
        Self::from_env_values(
            std::env::var("PICCOMPRESS_QUALITY").ok().as_deref(),
            std::env::var("PICCOMPRESS_WIDTH").ok().as_deref(),
        )
    }

    pub fn from_env_values(quality: Option<&str>, width: Option<&str>) -> Self {
        OneShotDefaults {
            quality: init_quality_from(quality),
            width_cap: init_width_cap_from(width),
            ..Self::default()
        }
    }
}

// ── Environment overrides ─────────────────────────────────────────────────────

/// Read the default quality from `PICCOMPRESS_QUALITY`.
pub fn init_quality() -> u32 {
    init_quality_from(std::env::var("PICCOMPRESS_QUALITY").ok().as_deref())
}

/// Testable core of [`init_quality`]. Malformed values fall back to the default.
pub fn init_quality_from(env_val: Option<&str>) -> u32 {
    parse_leading_u32(env_val).unwrap_or(DEFAULT_QUALITY)
}

/// Read the one-shot width cap from `PICCOMPRESS_WIDTH`.
pub fn init_width_cap() -> u32 {
    init_width_cap_from(std::env::var("PICCOMPRESS_WIDTH").ok().as_deref())
}

pub fn init_width_cap_from(env_val: Option<&str>) -> u32 {
    parse_leading_u32(env_val).unwrap_or(DEFAULT_WIDTH_CAP)
}

/// Read the worker count from `PICCOMPRESS_WORKERS`.
pub fn init_workers() -> usize {
    init_workers_from(std::env::var("PICCOMPRESS_WORKERS").ok().as_deref())
}

pub fn init_workers_from(env_val: Option<&str>) -> usize {
    parse_leading_u32(env_val)
        .map(|n| n as usize)
        .unwrap_or(WORKERS_DEFAULT)
}

/// Resolve `0` ("auto") to the number of logical CPUs.
pub fn resolve_workers(requested: usize) -> usize {
    if requested == 0 {
        num_cpus::get().max(1)
    } else {
        requested
    }
}

fn parse_leading_u32(env_val: Option<&str>) -> Option<u32> {
    let s = env_val?.trim();
    if !s.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
