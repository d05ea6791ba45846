#[path = "support/fake_engine.rs"]
mod fake_engine;

use fake_engine::{Behaviour, FakeEngine};
use piccompress::{
    build_parameters, compress_buffer, dispatch, dispatch_raw, CompressError, CompressionRequest, ErrorKind,
    ResizeRequest, TargetFormat, SENTINEL,
};

// ═══════════════════════════════════════════════════════════════════════════
// Dispatch routing
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn every_target_invokes_exactly_one_operation() {
    let expected = [
        (TargetFormat::Optimize, (1, 0, 0, 0)),
        (TargetFormat::ConvertA, (0, 1, 0, 0)),
        (TargetFormat::ConvertB, (0, 0, 1, 0)),
    ];
    for (target, counts) in expected {
        let engine = FakeEngine::new(Behaviour::Write(4));
        let mut out = vec![0u8; 16];
        let params = build_parameters(&CompressionRequest::new(target));
        let res = dispatch(&engine, b"input", &mut out, &params, target);
        assert!(res.success);
        assert_eq!(engine.counts(), counts, "target {target:?}");
    }
}

#[test]
fn raw_selectors_outside_range_are_rejected_before_the_engine() {
    let engine = FakeEngine::new(Behaviour::Write(4));
    let params = build_parameters(&CompressionRequest::default());
    for raw in [-100, -1, 3, 4, 1000, i32::MIN, i32::MAX] {
        let mut out = vec![0u8; 16];
        let err = dispatch_raw(&engine, b"input", &mut out, &params, raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(out.iter().all(|&b| b == 0), "selector {raw} wrote output");
    }
    assert_eq!(engine.total_calls(), 0);
}

#[test]
fn raw_selectors_in_range_dispatch() {
    for (raw, counts) in [(0, (1, 0, 0, 0)), (1, (0, 1, 0, 0)), (2, (0, 0, 1, 0))] {
        let engine = FakeEngine::new(Behaviour::Write(1));
        let mut out = vec![0u8; 4];
        let params = build_parameters(&CompressionRequest::default());
        let res = dispatch_raw(&engine, b"x", &mut out, &params, raw).unwrap();
        assert!(res.success);
        assert_eq!(engine.counts(), counts);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Classification through the buffer variant
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn undersized_output_is_exhaustion_never_success() {
    let engine = FakeEngine::new(Behaviour::Write(64));
    let mut out = vec![0u8; 16];
    for target in [TargetFormat::Optimize, TargetFormat::ConvertA, TargetFormat::ConvertB] {
        let err = compress_buffer(&engine, b"input", &mut out, &CompressionRequest::new(target)).unwrap_err();
        assert_eq!(err, CompressError::ResourceExhaustion { code: 0 });
    }
}

#[test]
fn sentinel_and_above_are_exhaustion() {
    for code in [SENTINEL, SENTINEL + 7, u64::MAX] {
        let engine = FakeEngine::new(Behaviour::Code(code));
        let mut out = vec![0u8; 8];
        let err = compress_buffer(&engine, b"in", &mut out, &CompressionRequest::default()).unwrap_err();
        assert_eq!(err, CompressError::ResourceExhaustion { code });
    }
}

#[test]
fn engine_failure_message_is_verbatim() {
    let engine = FakeEngine::new(Behaviour::Fail("Not a JPEG file: starts with 0x89 0x50"));
    let mut out = vec![0u8; 8];
    let err = compress_buffer(&engine, b"in", &mut out, &CompressionRequest::default()).unwrap_err();
    assert_eq!(err.to_string(), "Not a JPEG file: starts with 0x89 0x50");
    assert_eq!(err.kind(), ErrorKind::OperationFailure);
}

#[test]
fn success_reports_bytes_written() {
    let engine = FakeEngine::new(Behaviour::Write(5));
    let mut out = vec![0u8; 8];
    let req = CompressionRequest::new(TargetFormat::ConvertB)
        .with_quality(90)
        .with_resize(ResizeRequest::width(10));
    assert_eq!(compress_buffer(&engine, b"in", &mut out, &req).unwrap(), 5);
    assert_eq!(&out[..5], &[0x5A; 5]);
    assert_eq!(&out[5..], &[0; 3]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Parameter building
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn magnify_is_off_for_every_resize_shape() {
    let shapes = [
        ResizeRequest::default(),
        ResizeRequest::width(1),
        ResizeRequest::width(u32::MAX).with_height(u32::MAX),
        ResizeRequest::default().with_sides(10, 20).with_power_of_two(true),
    ];
    for shape in shapes {
        for target in [TargetFormat::Optimize, TargetFormat::ConvertA, TargetFormat::ConvertB] {
            let p = build_parameters(&CompressionRequest::new(target).with_resize(shape));
            assert!(!p.allow_magnify);
            assert!(!p.keep_metadata);
            assert!(p.jpeg_progressive);
        }
    }
}
