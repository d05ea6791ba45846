//! End-to-end runs of `Compressor` on the default engine.

#[path = "common.rs"]
mod common;

use std::os::fd::AsFd;

use common::{anon_file, jpeg_bytes, png_bytes, sized_file, write_file};
use image::ImageFormat;
use piccompress::{
    CompressError, CompressionRequest, Compressor, ErrorKind, OneShotDefaults, ResizeRequest, TargetFormat,
    SENTINEL,
};

const OUT_LEN: u64 = 4 << 20;

// ═══════════════════════════════════════════════════════════════════════════
// Construction
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn null_output_handle_is_invalid() {
    let err = Compressor::new(None, OUT_LEN).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn zero_max_len_is_invalid() {
    let out = sized_file(OUT_LEN);
    let err = Compressor::new(Some(out.as_fd()), 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

// ═══════════════════════════════════════════════════════════════════════════
// compress_from
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn convert_png_to_jpeg_at_quality_80() {
    let out = sized_file(OUT_LEN);
    let mut c = Compressor::new(Some(out.as_fd()), OUT_LEN).unwrap();
    let png = png_bytes(120, 80);
    let input = anon_file(&png);

    let req = CompressionRequest::new(TargetFormat::ConvertA).with_quality(80);
    let n = c.compress_from(Some(input.as_fd()), png.len() as u64, &req).unwrap();
    assert!(n >= 1 && (n as u64) < SENTINEL);
    assert_eq!(image::guess_format(c.output(n)).unwrap(), ImageFormat::Jpeg);
    c.close().unwrap();
}

#[test]
fn convert_jpeg_to_png_with_resize() {
    let out = sized_file(OUT_LEN);
    let mut c = Compressor::new(Some(out.as_fd()), OUT_LEN).unwrap();
    let jpeg = jpeg_bytes(200, 100);
    let input = anon_file(&jpeg);

    let req = CompressionRequest::new(TargetFormat::ConvertB).with_resize(ResizeRequest::width(50));
    let n = c.compress_from(Some(input.as_fd()), jpeg.len() as u64, &req).unwrap();
    let decoded = image::load_from_memory(c.output(n)).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (50, 25));
}

#[test]
fn optimize_keeps_jpeg() {
    let out = sized_file(OUT_LEN);
    let mut c = Compressor::new(Some(out.as_fd()), OUT_LEN).unwrap();
    let jpeg = jpeg_bytes(64, 64);
    let input = anon_file(&jpeg);

    let req = CompressionRequest::new(TargetFormat::Optimize).with_quality(40);
    let n = c.compress_from(Some(input.as_fd()), jpeg.len() as u64, &req).unwrap();
    assert_eq!(image::guess_format(c.output(n)).unwrap(), ImageFormat::Jpeg);
}

#[test]
fn never_upsamples() {
    let out = sized_file(OUT_LEN);
    let mut c = Compressor::new(Some(out.as_fd()), OUT_LEN).unwrap();
    let png = png_bytes(40, 30);
    let input = anon_file(&png);

    let req = CompressionRequest::new(TargetFormat::ConvertB).with_resize(ResizeRequest::width(400));
    let n = c.compress_from(Some(input.as_fd()), png.len() as u64, &req).unwrap();
    let decoded = image::load_from_memory(c.output(n)).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (40, 30));
}

#[test]
fn undersized_output_is_resource_exhaustion() {
    let out = sized_file(64);
    let mut c = Compressor::new(Some(out.as_fd()), 64).unwrap();
    let png = png_bytes(256, 256);
    let input = anon_file(&png);

    let err = c
        .compress_from(Some(input.as_fd()), png.len() as u64, &CompressionRequest::default())
        .unwrap_err();
    assert_eq!(err, CompressError::ResourceExhaustion { code: 0 });
}

#[test]
fn garbage_input_is_operation_failure() {
    let out = sized_file(OUT_LEN);
    let mut c = Compressor::new(Some(out.as_fd()), OUT_LEN).unwrap();
    let input = anon_file(b"definitely not an image");
    let err = c
        .compress_from(Some(input.as_fd()), 23, &CompressionRequest::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationFailure);
}

#[test]
fn compressor_is_reusable() {
    let out = sized_file(OUT_LEN);
    let mut c = Compressor::new(Some(out.as_fd()), OUT_LEN).unwrap();
    let png = png_bytes(32, 32);
    let input = anon_file(&png);
    let req = CompressionRequest::default();
    let first = c.compress_from(Some(input.as_fd()), png.len() as u64, &req).unwrap();
    let bad = anon_file(b"junk");
    assert!(c.compress_from(Some(bad.as_fd()), 4, &req).is_err());
    let again = c.compress_from(Some(input.as_fd()), png.len() as u64, &req).unwrap();
    assert_eq!(first, again);
}

// ═══════════════════════════════════════════════════════════════════════════
// compress (path-based)
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn one_shot_caps_width_by_halving() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wide.png");
    write_file(&path, &png_bytes(3000, 20));

    let out = sized_file(OUT_LEN);
    let mut c = Compressor::new(Some(out.as_fd()), OUT_LEN).unwrap();
    let n = c.compress(&path).unwrap();
    let decoded = image::load_from_memory(c.output(n)).unwrap();
    assert_eq!(image::guess_format(c.output(n)).unwrap(), ImageFormat::Jpeg);
    assert_eq!((decoded.width(), decoded.height()), (1500, 10));
}

#[test]
fn one_shot_with_legacy_cap() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wide.png");
    write_file(&path, &png_bytes(2000, 20));

    let out = sized_file(OUT_LEN);
    let defaults = OneShotDefaults {
        reduce_by_power_of_2: false,
        ..OneShotDefaults::legacy()
    };
    let mut c = Compressor::new(Some(out.as_fd()), OUT_LEN).unwrap().with_defaults(defaults);
    let n = c.compress(&path).unwrap();
    let decoded = image::load_from_memory(c.output(n)).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1680, 17));
}

#[test]
fn one_shot_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = sized_file(OUT_LEN);
    let mut c = Compressor::new(Some(out.as_fd()), OUT_LEN).unwrap();
    let err = c.compress(dir.path().join("missing.png")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationFailure);
}
