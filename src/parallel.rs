//! Parallel frame selection.
//!
//! [`select_frames_parallel`] spreads a batch of frame indices across rayon
//! workers. Every worker opens its own [`VideoStream`], so no decoder or
//! cursor is shared between threads.

use std::path::Path;

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    error::FrameSeekError, frame::Frame, options::StreamOptions, stream::VideoStream,
};

/// Indices closer together than this are decoded by the same worker.
const RUN_GAP: u64 = 30;

/// Fetch the frames at `indices` from `path` in parallel.
///
/// `indices` must be non-decreasing. Frames are returned in request order;
/// the first error from any worker is returned instead.
///
/// # Errors
///
/// Returns [`FrameSeekError::InvalidConfiguration`] for decreasing indices,
/// and any error from opening the file or decoding a frame.
///
/// # Example
///
/// ```no_run
/// use frameseek::StreamOptions;
///
/// let frames = frameseek::select_frames_parallel(
///     "input.mp4",
///     &[0, 10, 500, 510, 1000],
///     &StreamOptions::new(),
/// )?;
/// assert_eq!(frames.len(), 5);
/// # Ok::<(), frameseek::FrameSeekError>(())
/// ```
pub fn select_frames_parallel<P: AsRef<Path>>(
    path: P,
    indices: &[u64],
    options: &StreamOptions,
) -> Result<Vec<Frame>, FrameSeekError> {
    if let Some(pair) = indices.windows(2).find(|pair| pair[1] < pair[0]) {
        return Err(FrameSeekError::InvalidConfiguration(format!(
            "selected frame indices must be non-decreasing, got {} after {}",
            pair[1], pair[0]
        )));
    }

    let path = path.as_ref();
    let runs = split_into_runs(indices, RUN_GAP);
    log::debug!("Selecting {} frames in {} parallel runs", indices.len(), runs.len());

    let decoded: Result<Vec<Vec<Frame>>, FrameSeekError> = runs
        .into_par_iter()
        .map(|run| -> Result<Vec<Frame>, FrameSeekError> {
            let mut stream = VideoStream::open_with_options(path, options)?;
            stream.select_frames(run.iter().copied()).collect()
        })
        .collect();

    Ok(decoded?.into_iter().flatten().collect())
}

/// Split sorted indices into runs whose neighbours are at most `gap` apart.
fn split_into_runs(indices: &[u64], gap: u64) -> Vec<&[u64]> {
    let mut runs = Vec::new();
    let mut start = 0;
    for position in 1..indices.len() {
        if indices[position] - indices[position - 1] > gap {
            runs.push(&indices[start..position]);
            start = position;
        }
    }
    if start < indices.len() {
        runs.push(&indices[start..]);
    }
    runs
}
