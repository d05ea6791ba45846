#![no_main]
use libfuzzer_sys::fuzz_target;
use piccompress::{compress_buffer, CompressionRequest, ImageEngine, ResizeRequest, TargetFormat};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as an "image". Errors are expected; panics are not.
    if data.len() < 2 {
        return;
    }
    let target = TargetFormat::try_from((data[0] % 3) as i32).unwrap();
    let mut request = CompressionRequest::new(target).with_quality(data[1] as u32);
    if data[0] & 0x80 != 0 {
        request = request.with_resize(ResizeRequest::width(16).with_power_of_two(data[0] & 0x40 != 0));
    }

    // Undersized and generous output spans.
    for cap in [1usize, 64 << 10] {
        let mut out = vec![0u8; cap];
        let _ = compress_buffer(&ImageEngine, &data[2..], &mut out, &request);
    }
});
