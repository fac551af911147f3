//! Metadata-only probing.
//!
//! [`probe`] opens a file, computes its [`StreamMetadata`] and closes the
//! demuxer straight away, for inspecting many files without keeping an FFmpeg
//! context alive per file.

use std::path::Path;

use crate::{error::FrameSeekError, metadata::StreamMetadata, stream::VideoStream};

/// Probe a video file and return its metadata at native resolution.
///
/// # Errors
///
/// Same as [`VideoStream::open`].
///
/// # Example
///
/// ```no_run
/// let metadata = frameseek::probe("input.mp4")?;
/// println!("{}x{}, {} frames", metadata.width, metadata.height, metadata.frame_count);
/// # Ok::<(), frameseek::FrameSeekError>(())
/// ```
pub fn probe<P: AsRef<Path>>(path: P) -> Result<StreamMetadata, FrameSeekError> {
    let stream = VideoStream::open(path)?;
    Ok(stream.metadata().clone())
}

/// Probe several files; failures are reported per file instead of aborting
/// the batch.
pub fn probe_many<P: AsRef<Path>>(paths: &[P]) -> Vec<Result<StreamMetadata, FrameSeekError>> {
    paths.iter().map(probe).collect()
}
