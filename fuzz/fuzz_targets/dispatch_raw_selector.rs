#![no_main]
use libfuzzer_sys::fuzz_target;
use piccompress::{build_parameters, dispatch_raw, CompressionRequest, ErrorKind, ImageEngine};

fuzz_target!(|data: &[u8]| {
    // Any selector outside 0..=2 must be rejected without touching the output.
    if data.len() < 4 {
        return;
    }
    let raw = i32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let params = build_parameters(&CompressionRequest::default());
    let mut out = vec![0u8; 256];
    match dispatch_raw(&ImageEngine, &data[4..], &mut out, &params, raw) {
        Ok(_) => assert!((0..=2).contains(&raw)),
        Err(e) => {
            assert_eq!(e.kind(), ErrorKind::InvalidArgument);
            assert!(out.iter().all(|&b| b == 0));
        }
    }
});
