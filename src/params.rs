//! Compression requests and their translation into engine parameters.
//!
//! [`build_parameters`] is a pure function. Metadata is always stripped,
//! JPEG output is always progressive, quality is mirrored to both the JPEG
//! and PNG fields, and resize fields are only copied when a resize was
//! requested, in which case magnification is always disabled. Quality is
//! forwarded unchecked; range handling belongs to the engine.

use crate::config::{DEFAULT_QUALITY, DEFAULT_TARGET};
use crate::engine::{EngineParameters, SupportedFileType};
use crate::error::CompressError;

/// What the caller wants the output to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum TargetFormat {
    /// Shrink without changing the format family.
    Optimize = 0,
    /// Convert to JPEG.
    ConvertA = 1,
    /// Convert to PNG.
    ConvertB = 2,
}

impl TargetFormat {
    /// Engine file-type tag for conversions; `None` for `Optimize`.
    pub fn file_type(self) -> Option<SupportedFileType> {
        match self {
            TargetFormat::Optimize => None,
            TargetFormat::ConvertA => Some(SupportedFileType::Jpeg),
            TargetFormat::ConvertB => Some(SupportedFileType::Png),
        }
    }

    /// Conversion target that produces `file_type`, if there is one.
    pub fn for_file_type(file_type: SupportedFileType) -> Option<Self> {
        match file_type {
            SupportedFileType::Jpeg => Some(TargetFormat::ConvertA),
            SupportedFileType::Png => Some(TargetFormat::ConvertB),
            _ => None,
        }
    }
}

impl TryFrom<i32> for TargetFormat {
    type Error = CompressError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(TargetFormat::Optimize),
            1 => Ok(TargetFormat::ConvertA),
            2 => Ok(TargetFormat::ConvertB),
            other => Err(CompressError::invalid(format!("Unknown target type: {}", other))),
        }
    }
}

/// Resize fields of a request. Zero means "unset".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResizeRequest {
    pub width: u32,
    pub height: u32,
    pub short_side_pixels: u32,
    pub long_side_pixels: u32,
    pub reduce_by_power_of_2: bool,
}

impl ResizeRequest {
    pub fn width(width: u32) -> Self {
        ResizeRequest {
            width,
            ..Self::default()
        }
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    pub fn with_sides(mut self, short_side_pixels: u32, long_side_pixels: u32) -> Self {
        self.short_side_pixels = short_side_pixels;
        self.long_side_pixels = long_side_pixels;
        self
    }

    pub fn with_power_of_two(mut self, enabled: bool) -> Self {
        self.reduce_by_power_of_2 = enabled;
        self
    }
}

/// One compression call's worth of settings. `resize: None` means resize
/// is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionRequest {
    pub target: TargetFormat,
    pub quality: u32,
    pub resize: Option<ResizeRequest>,
}

impl CompressionRequest {
    pub fn new(target: TargetFormat) -> Self {
        CompressionRequest {
            target,
            quality: DEFAULT_QUALITY,
            resize: None,
        }
    }

    pub fn with_quality(mut self, quality: u32) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_resize(mut self, resize: ResizeRequest) -> Self {
        self.resize = Some(resize);
        self
    }

    pub fn resize_enabled(&self) -> bool {
        self.resize.is_some()
    }
}

impl Default for CompressionRequest {
    fn default() -> Self {
        CompressionRequest::new(DEFAULT_TARGET)
    }
}

/// Translate `request` into the engine's configuration block.
pub fn build_parameters(request: &CompressionRequest) -> EngineParameters {
    let mut params = EngineParameters {
        keep_metadata: false,
        jpeg_progressive: true,
        jpeg_quality: request.quality,
        png_quality: request.quality,
        ..EngineParameters::default()
    };
    if let Some(resize) = request.resize {
        params.width = resize.width;
        params.height = resize.height;
        params.short_side_pixels = resize.short_side_pixels;
        params.long_side_pixels = resize.long_side_pixels;
        params.reduce_by_power_of_2 = resize.reduce_by_power_of_2;
        params.allow_magnify = false;
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_selector_mapping() {
        assert_eq!(TargetFormat::try_from(0).unwrap(), TargetFormat::Optimize);
        assert_eq!(TargetFormat::try_from(1).unwrap(), TargetFormat::ConvertA);
        assert_eq!(TargetFormat::try_from(2).unwrap(), TargetFormat::ConvertB);
        for raw in [-1, 3, 42, i32::MIN, i32::MAX] {
            let err = TargetFormat::try_from(raw).unwrap_err();
            assert_eq!(err, CompressError::InvalidArgument(format!("Unknown target type: {}", raw)));
        }
    }

    #[test]
    fn file_type_tags() {
        assert_eq!(TargetFormat::Optimize.file_type(), None);
        assert_eq!(TargetFormat::ConvertA.file_type(), Some(SupportedFileType::Jpeg));
        assert_eq!(TargetFormat::ConvertB.file_type(), Some(SupportedFileType::Png));
        assert_eq!(TargetFormat::for_file_type(SupportedFileType::Png), Some(TargetFormat::ConvertB));
        assert_eq!(TargetFormat::for_file_type(SupportedFileType::Gif), None);
    }

    #[test]
    fn fixed_fields_without_resize() {
        let p = build_parameters(&CompressionRequest::new(TargetFormat::ConvertA).with_quality(80));
        assert!(!p.keep_metadata);
        assert!(p.jpeg_progressive);
        assert_eq!(p.jpeg_quality, 80);
        assert_eq!(p.png_quality, 80);
        assert_eq!((p.width, p.height, p.short_side_pixels, p.long_side_pixels), (0, 0, 0, 0));
        assert!(!p.reduce_by_power_of_2);
        assert!(!p.allow_magnify);
    }

    #[test]
    fn quality_is_passed_through_unchecked() {
        for q in [0, 101, 5000] {
            let p = build_parameters(&CompressionRequest::new(TargetFormat::ConvertB).with_quality(q));
            assert_eq!(p.jpeg_quality, q);
            assert_eq!(p.png_quality, q);
        }
    }

    #[test]
    fn resize_fields_are_copied_verbatim() {
        let resize = ResizeRequest::width(1200)
            .with_height(900)
            .with_sides(700, 1400)
            .with_power_of_two(true);
        let p = build_parameters(&CompressionRequest::new(TargetFormat::Optimize).with_resize(resize));
        assert_eq!(p.width, 1200);
        assert_eq!(p.height, 900);
        assert_eq!(p.short_side_pixels, 700);
        assert_eq!(p.long_side_pixels, 1400);
        assert!(p.reduce_by_power_of_2);
        assert!(!p.allow_magnify);
    }

    #[test]
    fn enabling_resize_only_adds_resize_fields() {
        let base = CompressionRequest::new(TargetFormat::ConvertA).with_quality(70);
        let without = build_parameters(&base);
        let with = build_parameters(&base.with_resize(ResizeRequest::width(640)));
        assert_eq!(without.keep_metadata, with.keep_metadata);
        assert_eq!(without.jpeg_progressive, with.jpeg_progressive);
        assert_eq!(without.jpeg_quality, with.jpeg_quality);
        assert_eq!(without.png_quality, with.png_quality);
        assert_eq!(EngineParameters { width: 640, ..without }, with);
    }

    #[test]
    fn build_is_deterministic() {
        let req = CompressionRequest::new(TargetFormat::ConvertB)
            .with_quality(33)
            .with_resize(ResizeRequest::default().with_sides(100, 200));
        assert_eq!(build_parameters(&req), build_parameters(&req));
    }
}
