//! The decoder adapter boundary.
//!
//! [`DecoderBackend`] is the only thing the cursor knows about a codec
//! engine: one probe result and two primitives, "decode the next frame" and
//! "seek to a time". Backends are swappable:
//!
//! - [`FfmpegDecoder`](crate::FfmpegDecoder): software (or, with the
//!   `hardware` feature, GPU-accelerated) decoding through FFmpeg.
//! - [`MemoryDecoder`](crate::MemoryDecoder): frames already held in memory.
//! - `Box<dyn DecoderBackend>`: any of the above chosen at runtime.

use crate::{error::FrameSeekError, frame::Frame};

/// What a backend learned about its source when it was opened.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    /// Duration in seconds.
    pub duration: f64,
    /// Frames per second.
    pub frame_rate: f64,
    /// Exact frame count, when the backend knows it.
    pub frame_count: Option<u64>,
    /// Native frame width in pixels.
    pub width: u32,
    /// Native frame height in pixels.
    pub height: u32,
    /// Codec name.
    pub codec: String,
}

/// A codec/demux engine driven by the cursor.
///
/// Implementations return frames at native resolution; resizing and index
/// assignment happen above this boundary.
pub trait DecoderBackend {
    /// Probe result for the opened source.
    fn source_info(&self) -> &SourceInfo;

    /// Decode the frame that follows the current internal position and
    /// advance by one frame.
    ///
    /// Returns `Ok(None)` at the physical end of the stream.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSeekError::Decode`] (or an FFmpeg error) on corrupt
    /// data. Callers do not retry.
    fn decode_next(&mut self) -> Result<Option<Frame>, FrameSeekError>;

    /// Reposition so that the next [`decode_next`](DecoderBackend::decode_next)
    /// returns the frame with the greatest presentation time `<= seconds`.
    ///
    /// Any keyframe alignment and decode-and-discard work happens inside the
    /// backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying seek or the discarding decode fails.
    fn seek_to(&mut self, seconds: f64) -> Result<(), FrameSeekError>;
}

impl<D: DecoderBackend + ?Sized> DecoderBackend for Box<D> {
    fn source_info(&self) -> &SourceInfo {
        (**self).source_info()
    }

    fn decode_next(&mut self) -> Result<Option<Frame>, FrameSeekError> {
        (**self).decode_next()
    }

    fn seek_to(&mut self, seconds: f64) -> Result<(), FrameSeekError> {
        (**self).seek_to(seconds)
    }
}
