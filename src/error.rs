//! Error types for the `frameseek` crate.
//!
//! This module defines [`FrameSeekError`], the single error type returned by
//! every fallible operation. [`FrameSeekError::EndOfStream`] is the expected
//! "no more frames" signal and is kept distinct from
//! [`FrameSeekError::Decode`] so callers can stop iterating cleanly instead of
//! treating the stream as damaged.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `frameseek` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FrameSeekError {
    /// The video source could not be opened or probed.
    #[error("Failed to open video source at {path}: {reason}")]
    Open {
        /// Path that was passed to [`crate::VideoStream::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// A decoder backend reported stream properties that cannot be decoded
    /// from: no frames, a non-positive frame rate, or zero dimensions.
    ///
    /// Raised when a stream is opened, like [`Open`](Self::Open), but for
    /// sources without a path such as a [`crate::MemoryDecoder`].
    #[error("Failed to probe video source: {0}")]
    Probe(String),

    /// The source does not contain a video stream.
    #[error("No video stream found in source")]
    NoVideoStream,

    /// An output size, seek time, or selection request is malformed.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Frame data could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    Decode(String),

    /// No more frames are available from the current cursor position.
    #[error("End of stream")]
    EndOfStream,

    /// A selected frame index is past the end of the stream.
    #[error("Frame {index} is out of range (stream has {frame_count} frames)")]
    IndexOutOfRange {
        /// The frame index that was requested.
        index: u64,
        /// The total number of frames in the stream.
        frame_count: u64,
    },

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate during frame conversion.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),
}

impl FrameSeekError {
    /// Returns `true` for the recoverable [`EndOfStream`](Self::EndOfStream)
    /// signal.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, FrameSeekError::EndOfStream)
    }
}

impl FrameSeekError {
    /// Returns `true` for errors raised while opening a stream
    /// ([`Open`](Self::Open), [`Probe`](Self::Probe) or
    /// [`NoVideoStream`](Self::NoVideoStream)).
    pub fn is_open_error(&self) -> bool {
        matches!(
            self,
            FrameSeekError::Open { .. } | FrameSeekError::Probe(_) | FrameSeekError::NoVideoStream
        )
    }
}

impl From<FfmpegError> for FrameSeekError {
    fn from(error: FfmpegError) -> Self {
        FrameSeekError::Ffmpeg(error.to_string())
    }
}
