//! Default codec engine, built on the `image` crate.
//!
//! Decoding drops all metadata, so `keep_metadata = false` holds by
//! construction. The `image` JPEG encoder only writes baseline streams;
//! `jpeg_progressive` is accepted and has no effect here.
//!
//! When the encoded image does not fit the output span nothing is copied and
//! the call reports `success` with a zero byte count, which the façade
//! classifies as resource exhaustion.

use std::fs;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageResult};

use crate::engine::resize::target_dimensions;
use crate::engine::{decode_path, CodecEngine, EngineParameters, OperationResult, SupportedFileType};

/// Stateless engine; cheap to copy and safe to share between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageEngine;

impl ImageEngine {
    pub fn new() -> Self {
        ImageEngine
    }

    fn encode(
        &self,
        input: &[u8],
        output: &mut [u8],
        file_type: SupportedFileType,
        params: &EngineParameters,
    ) -> OperationResult {
        let img = match image::load_from_memory(input) {
            Ok(img) => img,
            Err(e) => return OperationResult::failed(e.to_string()),
        };
        let img = apply_resize(img, params);

        let mut encoded = Vec::new();
        let res = match file_type {
            SupportedFileType::Jpeg => encode_jpeg(&img, params.jpeg_quality, &mut encoded),
            SupportedFileType::Png => encode_png(&img, params.png_quality, &mut encoded),
            other => return OperationResult::failed(format!("Unsupported target type: {:?}", other)),
        };
        if let Err(e) = res {
            return OperationResult::failed(e.to_string());
        }
        copy_out(&encoded, output)
    }
}

impl CodecEngine for ImageEngine {
    fn compress_into(&self, input: &[u8], output: &mut [u8], params: &EngineParameters) -> OperationResult {
        let file_type = match image::guess_format(input) {
            Ok(ImageFormat::Jpeg) => SupportedFileType::Jpeg,
            Ok(ImageFormat::Png) => SupportedFileType::Png,
            Ok(other) => {
                return OperationResult::failed(format!("Unsupported file type for optimization: {:?}", other))
            }
            Err(e) => return OperationResult::failed(e.to_string()),
        };
        self.encode(input, output, file_type, params)
    }

    fn convert_into(
        &self,
        input: &[u8],
        output: &mut [u8],
        file_type: SupportedFileType,
        params: &EngineParameters,
    ) -> OperationResult {
        self.encode(input, output, file_type, params)
    }

    fn convert_file_into(
        &self,
        path: &[u8],
        output: &mut [u8],
        file_type: SupportedFileType,
        params: &EngineParameters,
    ) -> OperationResult {
        let Some(path) = decode_path(path) else {
            return OperationResult::failed("Invalid path encoding");
        };
        match fs::read(path) {
            Ok(input) => self.encode(&input, output, file_type, params),
            Err(e) => OperationResult::failed(format!("{}: {}", path, e)),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn apply_resize(img: DynamicImage, params: &EngineParameters) -> DynamicImage {
    match target_dimensions(img.width(), img.height(), params) {
        Some((w, h)) => {
            tracing::debug!(from_w = img.width(), from_h = img.height(), w, h, "resizing");
            img.resize_exact(w, h, FilterType::Lanczos3)
        }
        None => img,
    }
}

fn encode_jpeg(img: &DynamicImage, quality: u32, out: &mut Vec<u8>) -> ImageResult<()> {
    // JPEG carries no alpha channel.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let encoder = JpegEncoder::new_with_quality(out, quality.clamp(1, 100) as u8);
    rgb.write_with_encoder(encoder)
}

fn encode_png(img: &DynamicImage, quality: u32, out: &mut Vec<u8>) -> ImageResult<()> {
    let encoder = PngEncoder::new_with_quality(out, png_compression(quality), PngFilter::Adaptive);
    match img {
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            DynamicImage::ImageRgba8(img.to_rgba8()).write_with_encoder(encoder)
        }
        _ => img.write_with_encoder(encoder),
    }
}

/// PNG is lossless here: higher quality trades size for speed.
fn png_compression(quality: u32) -> CompressionType {
    match 10u32.saturating_sub(quality.min(100) / 10) {
        0..=3 => CompressionType::Fast,
        4..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

fn copy_out(encoded: &[u8], output: &mut [u8]) -> OperationResult {
    if encoded.len() > output.len() {
        tracing::debug!(needed = encoded.len(), capacity = output.len(), "output span too small");
        return OperationResult::ok(0);
    }
    output[..encoded.len()].copy_from_slice(encoded);
    OperationResult::ok(encoded.len() as u64)
}
