//! Internal utility functions.
//!
//! Pixel-plane copying and timestamp conversions shared by the FFmpeg
//! backend.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Copy the first plane of an FFmpeg frame into a tightly packed buffer,
/// dropping per-row stride padding.
///
/// Rows that are shorter than expected are left out, so a truncated frame
/// yields a short buffer instead of a panic.
pub(crate) fn packed_plane(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0).max(1);
    let row_length = width as usize * bytes_per_pixel;
    video_frame
        .data(0)
        .chunks(stride)
        .take(height as usize)
        .filter_map(|row| row.get(..row_length))
        .flatten()
        .copied()
        .collect()
}

/// Rescale a timestamp from stream time base to seconds.
pub(crate) fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

/// Convert seconds to a container seek timestamp in `AV_TIME_BASE`
/// (microseconds), the unit `avformat_seek_file` expects when no stream
/// index is given.
pub(crate) fn seconds_to_seek_timestamp(seconds: f64) -> i64 {
    (seconds * 1_000_000.0).round() as i64
}

/// Nearest frame number for a decoded frame presented at `seconds`.
///
/// Rounds rather than truncates so PTS jitter from container time bases
/// cannot shift a frame onto its predecessor's number.
pub(crate) fn seconds_to_nearest_frame(seconds: f64, frame_rate: f64) -> u64 {
    (seconds * frame_rate).round().max(0.0) as u64
}

/// Frame number displayed at `seconds`: the last frame starting at or before
/// it.
pub(crate) fn seconds_to_frame_at(seconds: f64, frame_rate: f64) -> u64 {
    (seconds * frame_rate + 1e-6).floor().max(0.0) as u64
}

/// Frames per second from an FFmpeg rational, `0.0` when undefined.
pub(crate) fn rational_to_rate(rate: Rational) -> f64 {
    if rate.numerator() > 0 && rate.denominator() > 0 {
        rate.numerator() as f64 / rate.denominator() as f64
    } else {
        0.0
    }
}
