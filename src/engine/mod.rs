//! Codec engine boundary.
//!
//! The façade never encodes pixels itself. It talks to a [`CodecEngine`]
//! through three fixed entrypoints that take raw byte spans plus an
//! [`EngineParameters`] block and answer with an [`OperationResult`]:
//!
//! | Entrypoint            | Input                          | Target                 |
//! |-----------------------|--------------------------------|------------------------|
//! | `compress_into`       | encoded image bytes            | same format family     |
//! | `convert_into`        | encoded image bytes            | `SupportedFileType`    |
//! | `convert_file_into`   | UTF-8 path, double-NUL ended   | `SupportedFileType`    |
//!
//! Engines are `Send + Sync`: independent callers may use one engine
//! concurrently on disjoint buffer pairs. Two concurrent calls writing the
//! same output buffer are not supported.
//!
//! [`ImageEngine`] (feature `image-engine`, on by default) implements the
//! boundary on top of the `image` crate.

#[cfg(feature = "image-engine")]
mod image_engine;
pub mod resize;

#[cfg(feature = "image-engine")]
pub use image_engine::ImageEngine;

// ── Configuration block ──────────────────────────────────────────────────────

/// Configuration fields recognised by every engine entrypoint.
///
/// `Default` is the "nothing requested" state: all resize fields zero,
/// magnification disallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineParameters {
    pub keep_metadata: bool,
    pub jpeg_progressive: bool,
    pub jpeg_quality: u32,
    pub png_quality: u32,
    pub width: u32,
    pub height: u32,
    pub short_side_pixels: u32,
    pub long_side_pixels: u32,
    pub reduce_by_power_of_2: bool,
    pub allow_magnify: bool,
}

impl EngineParameters {
    /// `true` when any resize dimension is set.
    pub fn requests_resize(&self) -> bool {
        self.width != 0 || self.height != 0 || self.short_side_pixels != 0 || self.long_side_pixels != 0
    }
}

// ── Target file type tag ─────────────────────────────────────────────────────

/// File type tag understood by `convert_into` / `convert_file_into`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SupportedFileType {
    Jpeg = 0,
    Png = 1,
    Gif = 2,
    WebP = 3,
    Tiff = 4,
    Unknown = 5,
}

impl SupportedFileType {
    /// Conventional file extension, without the dot.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            SupportedFileType::Jpeg => Some("jpg"),
            SupportedFileType::Png => Some("png"),
            SupportedFileType::Gif => Some("gif"),
            SupportedFileType::WebP => Some("webp"),
            SupportedFileType::Tiff => Some("tif"),
            SupportedFileType::Unknown => None,
        }
    }
}

// ── Raw result ───────────────────────────────────────────────────────────────

/// What an engine entrypoint returns, before classification.
///
/// `code` is the number of bytes written when `success` is `true`.
/// `message` is only meaningful on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    pub success: bool,
    pub code: u64,
    pub message: Option<String>,
}

impl OperationResult {
    pub fn ok(code: u64) -> Self {
        OperationResult {
            success: true,
            code,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        OperationResult {
            success: false,
            code: 0,
            message: Some(message.into()),
        }
    }
}

// ── Engine trait ─────────────────────────────────────────────────────────────

/// The fixed call interface of an external codec.
pub trait CodecEngine: Send + Sync {
    /// Reduce size without changing the input's format family.
    fn compress_into(
        &self,
        input: &[u8],
        output: &mut [u8],
        params: &EngineParameters,
    ) -> OperationResult;

    /// Re-encode `input` as `file_type`.
    fn convert_into(
        &self,
        input: &[u8],
        output: &mut [u8],
        file_type: SupportedFileType,
        params: &EngineParameters,
    ) -> OperationResult;

    /// Read the file named by `path` and re-encode it as `file_type`.
    ///
    /// `path` is UTF-8 terminated by two NUL bytes.
    fn convert_file_into(
        &self,
        path: &[u8],
        output: &mut [u8],
        file_type: SupportedFileType,
        params: &EngineParameters,
    ) -> OperationResult;
}

impl<E: CodecEngine + ?Sized> CodecEngine for &E {
    fn compress_into(&self, input: &[u8], output: &mut [u8], params: &EngineParameters) -> OperationResult {
        (**self).compress_into(input, output, params)
    }

    fn convert_into(
        &self,
        input: &[u8],
        output: &mut [u8],
        file_type: SupportedFileType,
        params: &EngineParameters,
    ) -> OperationResult {
        (**self).convert_into(input, output, file_type, params)
    }

    fn convert_file_into(
        &self,
        path: &[u8],
        output: &mut [u8],
        file_type: SupportedFileType,
        params: &EngineParameters,
    ) -> OperationResult {
        (**self).convert_file_into(path, output, file_type, params)
    }
}

/// Encode `path` for `convert_file_into`: UTF-8 bytes followed by two NULs.
pub fn encode_path(path: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(path.len() + 2);
    bytes.extend_from_slice(path.as_bytes());
    bytes.extend_from_slice(&[0, 0]);
    bytes
}

/// Inverse of [`encode_path`]. Returns `None` when the terminator is missing,
/// the path contains an interior NUL or is not UTF-8.
pub fn decode_path(bytes: &[u8]) -> Option<&str> {
    let body = bytes.strip_suffix(b"\0\0")?;
    if body.contains(&0) {
        return None;
    }
    std::str::from_utf8(body).ok()
}
