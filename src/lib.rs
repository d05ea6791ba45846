// piccompress — image compression façade over a pluggable codec engine

#[cfg(not(unix))]
compile_error!("piccompress maps files with mmap and needs a Unix target");

pub mod config;
pub mod error;
pub mod engine;
pub mod params;
pub mod dispatch;
pub mod translate;
pub mod view;
pub mod facade;
pub mod batch;
pub mod cli;

// ── Version constants ────────────────────────────────────────────────────────
pub const PICCOMPRESS_VERSION_MAJOR: u32 = 0;
pub const PICCOMPRESS_VERSION_MINOR: u32 = 3;
pub const PICCOMPRESS_VERSION_RELEASE: u32 = 0;
pub const PICCOMPRESS_VERSION_NUMBER: u32 =
    PICCOMPRESS_VERSION_MAJOR * 100 * 100 + PICCOMPRESS_VERSION_MINOR * 100 + PICCOMPRESS_VERSION_RELEASE;
pub const PICCOMPRESS_VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

pub fn version_number() -> u32 {
    PICCOMPRESS_VERSION_NUMBER
}

pub fn version_string() -> &'static str {
    PICCOMPRESS_VERSION_STRING
}

// ── Top-level re-exports ──────────────────────────────────────────────────────
pub use config::{OneShotDefaults, SENTINEL};
pub use dispatch::{dispatch, dispatch_raw};
pub use engine::{CodecEngine, EngineParameters, OperationResult, SupportedFileType};
pub use error::{CompressError, ErrorKind, Result};
pub use facade::{compress_buffer, Compressor};
pub use params::{build_parameters, CompressionRequest, ResizeRequest, TargetFormat};
pub use translate::translate;
pub use view::{MemoryView, ViewMode};

#[cfg(feature = "image-engine")]
pub use engine::ImageEngine;
