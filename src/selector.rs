//! Lazy batch frame selection.
//!
//! [`FrameSelection`] is the iterator returned by
//! [`VideoStream::select_frames`](crate::VideoStream::select_frames). It
//! drives the cursor one requested index at a time, so only the frame being
//! yielded is held in memory.
//!
//! For each requested index:
//!
//! - equal to the cursor's next index: a plain sequential read;
//! - a small forward gap (at most the configured seek threshold): the gap is
//!   decoded and discarded, then read;
//! - anything else: seek, then read.
//!
//! Duplicated indices repeat the previous frame without decoding. An index
//! smaller than the one before it is a caller error and ends the selection.

use std::iter::Peekable;

use crate::{
    cursor::FrameCursor, decoder::DecoderBackend, error::FrameSeekError, frame::Frame,
};

/// A lazy, non-restartable sequence of selected frames.
///
/// Yields one `Result` per requested index, in request order. Out-of-range
/// indices yield [`FrameSeekError::IndexOutOfRange`] and selection continues;
/// a decreasing index yields [`FrameSeekError::InvalidConfiguration`], and an
/// end-of-stream or decode failure is yielded once, after which the
/// iterator is finished.
pub struct FrameSelection<'a, D, I: Iterator<Item = u64>> {
    cursor: &'a mut FrameCursor<D>,
    indices: Peekable<I>,
    seek_threshold: u64,
    previous_index: Option<u64>,
    /// Kept only while the next requested index repeats it.
    last_frame: Option<Frame>,
    done: bool,
}

impl<'a, D, I> FrameSelection<'a, D, I>
where
    D: DecoderBackend,
    I: Iterator<Item = u64>,
{
    pub(crate) fn new(cursor: &'a mut FrameCursor<D>, indices: I, seek_threshold: u64) -> Self {
        Self {
            cursor,
            indices: indices.peekable(),
            seek_threshold,
            previous_index: None,
            last_frame: None,
            done: false,
        }
    }

    fn fetch(&mut self, index: u64) -> Result<Frame, FrameSeekError> {
        let frame_count = self.cursor.metadata().frame_count;
        if index >= frame_count {
            return Err(FrameSeekError::IndexOutOfRange { index, frame_count });
        }

        if let Some(previous) = self.previous_index {
            if index < previous {
                self.done = true;
                return Err(FrameSeekError::InvalidConfiguration(format!(
                    "selected frame indices must be non-decreasing, got {index} after {previous}"
                )));
            }
        }
        if let Some(last) = self.last_frame.as_ref().filter(|frame| frame.index() == index) {
            return Ok(last.clone());
        }

        match self.cursor.next_index() {
            Some(next) if next == index => {}
            Some(next) if next < index && index - next <= self.seek_threshold => {
                log::debug!("Decoding through {} frames to reach frame {index}", index - next);
                for _ in next..index {
                    self.cursor.skip_frame()?;
                }
            }
            _ => self.cursor.seek_index(index)?,
        }

        self.cursor.read_frame()
    }
}

impl<D, I> Iterator for FrameSelection<'_, D, I>
where
    D: DecoderBackend,
    I: Iterator<Item = u64>,
{
    type Item = Result<Frame, FrameSeekError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let index = self.indices.next()?;

        let result = self.fetch(index);
        match &result {
            Ok(frame) => {
                self.previous_index = Some(index);
                self.last_frame = (self.indices.peek() == Some(&index)).then(|| frame.clone());
            }
            Err(FrameSeekError::IndexOutOfRange { .. }) => {}
            Err(_) => self.done = true,
        }
        Some(result)
    }
}
