//! Target-dimension policy applied by engines before re-encoding.
//!
//! Rules, in order:
//! 1. No dimension set → no resize.
//! 2. Width and height both unset but short/long side set → the short value
//!    applies to the image's shorter side, the long value to its longer side.
//! 3. `reduce_by_power_of_2` with a usable (> 3) dimension smaller than the
//!    original → halve until every usable dimension fits, rounding up.
//! 4. Otherwise both set → exact; one set → the other follows aspect ratio.
//! 5. Without `allow_magnify`, a result larger than the source in either
//!    direction is dropped.

use crate::engine::EngineParameters;

/// Dimensions below or equal to this are ignored by power-of-two reduction.
const MIN_POW2_DIMENSION: u32 = 3;

/// Compute the output dimensions for an `orig_w` × `orig_h` image.
///
/// Returns `None` when the image should be left at its original size.
pub fn target_dimensions(orig_w: u32, orig_h: u32, params: &EngineParameters) -> Option<(u32, u32)> {
    if orig_w == 0 || orig_h == 0 || !params.requests_resize() {
        return None;
    }

    let (mut want_w, mut want_h) = (params.width, params.height);
    if want_w == 0 && want_h == 0 {
        if orig_w < orig_h {
            want_w = params.short_side_pixels;
            want_h = params.long_side_pixels;
        } else {
            want_h = params.short_side_pixels;
            want_w = params.long_side_pixels;
        }
        if want_w == 0 && want_h == 0 {
            return None;
        }
    }

    let usable_w = want_w > MIN_POW2_DIMENSION;
    let usable_h = want_h > MIN_POW2_DIMENSION;
    let ratio = orig_w as f64 / orig_h as f64;

    let (w, h) = if params.reduce_by_power_of_2
        && ((usable_w && want_w < orig_w) || (usable_h && want_h < orig_h))
    {
        let (mut w, mut h) = (orig_w as f64, orig_h as f64);
        while (usable_w && w > want_w as f64) || (usable_h && h > want_h as f64) {
            w /= 2.0;
            h /= 2.0;
        }
        (w.ceil() as u32, h.ceil() as u32)
    } else if want_w > 0 && want_h > 0 {
        (want_w, want_h)
    } else if want_h == 0 {
        (want_w, (want_w as f64 / ratio).round() as u32)
    } else {
        ((want_h as f64 * ratio).round() as u32, want_h)
    };

    let (w, h) = (w.max(1), h.max(1));
    if !params.allow_magnify && (w > orig_w || h > orig_h) {
        return None;
    }
    if (w, h) == (orig_w, orig_h) {
        return None;
    }
    Some((w, h))
}
