//! The decode cursor.
//!
//! [`FrameCursor`] keeps the mapping between frame indices and the decoder's
//! physical position. It has two states:
//!
//! - [`CursorState::Ready`]`(i)`: the next [`read_frame`](FrameCursor::read_frame)
//!   returns frame `i` (or fails with `EndOfStream` if `i >= frame_count`).
//! - [`CursorState::Exhausted`]: every further read fails with `EndOfStream`
//!   without touching the decoder, until the next seek.
//!
//! The next index only moves forward, one frame per successful decode, except
//! when a seek sets it explicitly. Seeks are requested in time but tracked as
//! an index, so everything above the cursor reasons in index space.

use crate::{
    decoder::DecoderBackend,
    error::FrameSeekError,
    frame::Frame,
    metadata::StreamMetadata,
    resize::{ResizeFilter, resize},
};

/// Where the cursor stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// The next read returns the frame with this index.
    Ready(u64),
    /// No more frames until the next seek.
    Exhausted,
}

/// Decoder plus the per-stream cursor state.
pub(crate) struct FrameCursor<D> {
    decoder: D,
    metadata: StreamMetadata,
    state: CursorState,
    filter: ResizeFilter,
}

impl<D: DecoderBackend> FrameCursor<D> {
    pub(crate) fn new(decoder: D, metadata: StreamMetadata, filter: ResizeFilter) -> Self {
        Self {
            decoder,
            metadata,
            state: CursorState::Ready(0),
            filter,
        }
    }

    pub(crate) fn metadata(&self) -> &StreamMetadata {
        &self.metadata
    }

    pub(crate) fn decoder(&self) -> &D {
        &self.decoder
    }

    pub(crate) fn state(&self) -> CursorState {
        self.state
    }

    /// Index the next read would return, or `None` once exhausted.
    pub(crate) fn next_index(&self) -> Option<u64> {
        match self.state {
            CursorState::Ready(index) => Some(index),
            CursorState::Exhausted => None,
        }
    }

    /// Decode the frame at the cursor, resize it and advance by one.
    pub(crate) fn read_frame(&mut self) -> Result<Frame, FrameSeekError> {
        let (index, frame) = self.decode_at_cursor()?;

        let frame = if self.metadata.is_resized() {
            resize(
                frame,
                self.metadata.out_width,
                self.metadata.out_height,
                self.filter,
            )
        } else {
            frame
        };

        log::trace!(
            "Read frame {index} at {:.3}s",
            frame.presentation_time()
        );
        Ok(frame.with_index(index))
    }

    /// Decode and drop the frame at the cursor, advancing by one.
    ///
    /// Same transitions as [`read_frame`](FrameCursor::read_frame) without the
    /// resize.
    pub(crate) fn skip_frame(&mut self) -> Result<(), FrameSeekError> {
        let (index, _) = self.decode_at_cursor()?;
        log::trace!("Skipped frame {index}");
        Ok(())
    }

    /// Move the cursor to the frame displayed at `seconds`.
    ///
    /// Times before the start clamp to frame 0; times at or past the end
    /// clamp to the exhausted position, so the next read reports
    /// `EndOfStream`.
    pub(crate) fn seek(&mut self, seconds: f64) -> Result<(), FrameSeekError> {
        if seconds.is_nan() {
            return Err(FrameSeekError::InvalidConfiguration(
                "seek time must be a number".to_string(),
            ));
        }
        let index = self.metadata.frame_index_at(seconds);
        self.reposition(index, seconds.max(0.0))
    }

    /// Move the cursor to frame `index` (clamped to `frame_count`).
    pub(crate) fn seek_index(&mut self, index: u64) -> Result<(), FrameSeekError> {
        let index = index.min(self.metadata.frame_count);
        self.reposition(index, self.metadata.frame_time(index))
    }

    fn reposition(&mut self, index: u64, seconds: f64) -> Result<(), FrameSeekError> {
        // Past the last frame there is nothing to position the decoder on;
        // the next read fails before reaching it.
        if index < self.metadata.frame_count {
            log::debug!("Seeking to frame {index} ({seconds:.3}s)");
            if let Err(error) = self.decoder.seek_to(seconds) {
                self.state = CursorState::Exhausted;
                return Err(error);
            }
        } else {
            log::debug!("Seek to {seconds:.3}s lands past the last frame");
        }
        self.state = CursorState::Ready(index);
        Ok(())
    }

    fn decode_at_cursor(&mut self) -> Result<(u64, Frame), FrameSeekError> {
        let index = match self.state {
            CursorState::Ready(index) if index < self.metadata.frame_count => index,
            CursorState::Ready(_) | CursorState::Exhausted => {
                self.state = CursorState::Exhausted;
                return Err(FrameSeekError::EndOfStream);
            }
        };

        match self.decoder.decode_next() {
            Ok(Some(frame)) => {
                self.state = CursorState::Ready(index + 1);
                Ok((index, frame))
            }
            Ok(None) => {
                log::debug!(
                    "Decoder ended at frame {index} of {}",
                    self.metadata.frame_count
                );
                self.state = CursorState::Exhausted;
                Err(FrameSeekError::EndOfStream)
            }
            Err(error) => {
                log::warn!("Decoding frame {index} failed: {error}");
                self.state = CursorState::Exhausted;
                Err(error)
            }
        }
    }
}
