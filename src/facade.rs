//! Caller-facing compressor.
//!
//! A [`Compressor`] maps its output handle once, at construction, and keeps
//! the view until it is closed or dropped. Every call writes its result to
//! the start of that view; [`Compressor::output`] reads it back.
//!
//! ```text
//!   with_engine ──► compress / compress_from (any number of times) ──► close / drop
//! ```
//!
//! `compress_from` maps its input for the duration of the call only and
//! releases it on every path out of the call. A `Compressor` is `Send` but
//! its calls take `&mut self`, so one instance is never driven from two
//! threads at once; use one instance per worker instead.

use std::os::fd::BorrowedFd;
use std::path::Path;

use crate::config::OneShotDefaults;
use crate::dispatch::dispatch;
use crate::engine::{encode_path, CodecEngine};
use crate::error::{CompressError, Result};
use crate::params::{build_parameters, CompressionRequest, ResizeRequest, TargetFormat};
use crate::translate::translate;
use crate::view::{note_release_failure, MemoryView, ViewMode};

#[cfg(feature = "image-engine")]
use crate::engine::ImageEngine;

/// Compression façade bound to one output view.
#[derive(Debug)]
pub struct Compressor<E: CodecEngine> {
    engine: E,
    output: MemoryView,
    defaults: OneShotDefaults,
}

#[cfg(feature = "image-engine")]
impl Compressor<ImageEngine> {
    /// Compressor backed by the default [`ImageEngine`].
    pub fn new(output: Option<BorrowedFd<'_>>, max_len: u64) -> Result<Self> {
        Self::with_engine(ImageEngine::new(), output, max_len)
    }
}

impl<E: CodecEngine> Compressor<E> {
    /// Map the first `max_len` bytes of `output` for writing.
    ///
    /// `None` stands for a null handle. A null handle, `max_len == 0` and a
    /// `max_len` past the end of the file behind `output` are all rejected
    /// with `InvalidArgument` before anything is mapped.
    pub fn with_engine(engine: E, output: Option<BorrowedFd<'_>>, max_len: u64) -> Result<Self> {
        let fd = output.ok_or_else(|| CompressError::invalid("Invalid Output Mapping File."))?;
        let len = checked_len(max_len, "Invalid Output Mapping File.")?;
        let output = MemoryView::acquire(fd, len, ViewMode::Write)?;
        Ok(Compressor {
            engine,
            output,
            defaults: OneShotDefaults::default(),
        })
    }

    /// Replace the settings used by [`Compressor::compress`].
    pub fn with_defaults(mut self, defaults: OneShotDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn defaults(&self) -> &OneShotDefaults {
        &self.defaults
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Size of the held output view in bytes.
    pub fn capacity(&self) -> usize {
        self.output.len()
    }

    /// The first `len` bytes of the output view, clamped to its capacity.
    pub fn output(&self, len: u32) -> &[u8] {
        let bytes = self.output.as_slice();
        &bytes[..bytes.len().min(len as usize)]
    }

    /// Compress the file at `path` with the one-shot defaults.
    ///
    /// The engine reads the file itself; nothing is mapped on the input side.
    pub fn compress(&mut self, path: impl AsRef<Path>) -> Result<u32> {
        let path = path.as_ref();
        let path = path
            .to_str()
            .ok_or_else(|| CompressError::invalid(format!("path is not valid UTF-8: {}", path.display())))?;
        let file_type = self.defaults.file_type;
        let params = build_parameters(&one_shot_request(&self.defaults));
        tracing::debug!(path, ?file_type, "one-shot compress");

        let output = self.output.as_mut_slice()?;
        translate(self.engine.convert_file_into(&encode_path(path), output, file_type, &params))
    }

    /// Compress `input_len` bytes read from `input` as described by `request`.
    ///
    /// `None` stands for a null handle; `input_len` must not exceed the size
    /// of the file. The input is mapped read-only for this call only. If both
    /// the engine and the input unmap fail, the engine's error is returned and
    /// the unmap failure is counted in [`crate::view::release_failures`].
    pub fn compress_from(
        &mut self,
        input: Option<BorrowedFd<'_>>,
        input_len: u64,
        request: &CompressionRequest,
    ) -> Result<u32> {
        let fd = input.ok_or_else(|| CompressError::invalid("Invalid Input Mapping File."))?;
        let len = checked_len(input_len, "Invalid Input Mapping File.")?;
        let input_view = MemoryView::acquire(fd, len, ViewMode::Read)?;

        let outcome = match self.output.as_mut_slice() {
            Ok(output) => compress_buffer(&self.engine, input_view.as_slice(), output, request),
            Err(e) => Err(e),
        };
        settle(outcome, input_view.close())
    }

    /// Write the output view back to its file.
    pub fn flush(&self) -> Result<()> {
        self.output.flush()
    }

    /// Release the output view, reporting an unmap failure.
    pub fn close(self) -> Result<()> {
        let Compressor { output, .. } = self;
        output.close()
    }
}

/// Buffer-to-buffer compression with the same validation, dispatch and
/// classification as [`Compressor::compress_from`].
pub fn compress_buffer<E: CodecEngine + ?Sized>(
    engine: &E,
    input: &[u8],
    output: &mut [u8],
    request: &CompressionRequest,
) -> Result<u32> {
    if input.is_empty() {
        return Err(CompressError::invalid("input is empty"));
    }
    if output.is_empty() {
        return Err(CompressError::invalid("output is empty"));
    }
    let params = build_parameters(request);
    translate(dispatch(engine, input, output, &params, request.target))
}

fn checked_len(len: u64, msg: &'static str) -> Result<usize> {
    match usize::try_from(len) {
        Ok(0) | Err(_) => Err(CompressError::invalid(msg)),
        Ok(len) => Ok(len),
    }
}

/// Combine a call's outcome with the release of its input view.
fn settle(outcome: Result<u32>, released: Result<()>) -> Result<u32> {
    match (outcome, released) {
        (Ok(n), Ok(())) => Ok(n),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(release)) => {
            note_release_failure(&release);
            Err(e)
        }
    }
}

fn one_shot_request(defaults: &OneShotDefaults) -> CompressionRequest {
    let target = TargetFormat::for_file_type(defaults.file_type).unwrap_or(TargetFormat::ConvertA);
    let request = CompressionRequest::new(target).with_quality(defaults.quality);
    if defaults.width_cap == 0 {
        return request;
    }
    request.with_resize(ResizeRequest::width(defaults.width_cap).with_power_of_two(defaults.reduce_by_power_of_2))
}
