//! Stream metadata.
//!
//! [`StreamMetadata`] is derived exactly once when a stream is opened and is
//! never modified afterwards. Reading it never triggers a decode.

use crate::{decoder::SourceInfo, error::FrameSeekError, options::StreamOptions};

/// Immutable description of an opened video stream.
///
/// # Example
///
/// ```no_run
/// use frameseek::VideoStream;
///
/// let stream = VideoStream::open("input.mp4")?;
/// let metadata = stream.metadata();
/// println!(
///     "{}x{} @ {} fps, {} frames, {:.2}s",
///     metadata.width, metadata.height, metadata.frame_rate, metadata.frame_count, metadata.duration,
/// );
/// # Ok::<(), frameseek::FrameSeekError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct StreamMetadata {
    /// Duration in seconds.
    pub duration: f64,
    /// Frames per second.
    pub frame_rate: f64,
    /// Total number of frames.
    pub frame_count: u64,
    /// Native decode width in pixels.
    pub width: u32,
    /// Native decode height in pixels.
    pub height: u32,
    /// Width of the frames returned to the caller.
    pub out_width: u32,
    /// Height of the frames returned to the caller.
    pub out_height: u32,
    /// Codec name (e.g. `"h264"`, `"mpeg4"`).
    pub codec: String,
}

impl StreamMetadata {
    /// Combine a probed source with the caller's options.
    ///
    /// The frame count is the backend's exact count when it reports one,
    /// otherwise `round(duration * frame_rate)`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSeekError::InvalidConfiguration`] if the output size
    /// resolves to zero, or [`FrameSeekError::Probe`] if the probed frame
    /// rate or dimensions are unusable or the stream has no frames.
    pub fn from_source(info: &SourceInfo, options: &StreamOptions) -> Result<Self, FrameSeekError> {
        if !(info.frame_rate.is_finite() && info.frame_rate > 0.0) {
            return Err(FrameSeekError::Probe(format!(
                "source reports an unusable frame rate of {}",
                info.frame_rate
            )));
        }
        if info.width == 0 || info.height == 0 {
            return Err(FrameSeekError::Probe(format!(
                "source reports invalid dimensions {}x{}",
                info.width, info.height
            )));
        }

        let duration = if info.duration.is_finite() {
            info.duration.max(0.0)
        } else {
            0.0
        };
        let frame_count = info
            .frame_count
            .unwrap_or_else(|| (duration * info.frame_rate).round() as u64);
        if frame_count == 0 {
            return Err(FrameSeekError::Probe(
                "source reports no frames and no duration".to_string(),
            ));
        }
        let (out_width, out_height) = options.resolve_output_size(info.width, info.height)?;

        Ok(Self {
            duration,
            frame_rate: info.frame_rate,
            frame_count,
            width: info.width,
            height: info.height,
            out_width,
            out_height,
            codec: info.codec.clone(),
        })
    }

    /// Returns `true` if frames are resampled before being returned.
    pub fn is_resized(&self) -> bool {
        self.out_width != self.width || self.out_height != self.height
    }

    /// Index of the frame displayed at `seconds`: the greatest index whose
    /// presentation time is not after it, clamped to `0..=frame_count`.
    ///
    /// `frame_count` itself is the exhausted position. Times up to a
    /// millionth of a frame interval early still map to the later frame.
    pub fn frame_index_at(&self, seconds: f64) -> u64 {
        if seconds <= 0.0 {
            return 0;
        }
        // Absorb float error so that `index / frame_rate` maps back to `index`.
        let position = (seconds * self.frame_rate + 1e-6).floor();
        if position >= self.frame_count as f64 {
            self.frame_count
        } else {
            position as u64
        }
    }

    /// Presentation time in seconds of frame `index`.
    pub fn frame_time(&self, index: u64) -> f64 {
        index as f64 / self.frame_rate
    }
}
