//! The [`VideoStream`] handle.
//!
//! `VideoStream` is the main entry point of the crate. Opening one probes the
//! source, fixes its [`StreamMetadata`] and places the cursor on frame 0.
//! Frames are then pulled with [`read_frame`](VideoStream::read_frame),
//! repositioned with [`seek`](VideoStream::seek), or fetched in batches with
//! [`select_frames`](VideoStream::select_frames).
//!
//! A handle owns its decoder and cursor exclusively. Every operation that
//! moves the cursor takes `&mut self`, so one handle is never used from two
//! places at once; open one handle per thread to decode in parallel.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    iter,
    path::Path,
};

use crate::{
    cursor::{CursorState, FrameCursor},
    decoder::DecoderBackend,
    error::FrameSeekError,
    ffmpeg_decoder::FfmpegDecoder,
    frame::Frame,
    metadata::StreamMetadata,
    options::StreamOptions,
    selector::FrameSelection,
};

/// A random-access video stream.
///
/// # Example
///
/// ```no_run
/// use frameseek::{FrameSeekError, StreamOptions, VideoStream};
///
/// let options = StreamOptions::new().with_output_size(160, 90);
/// let mut stream = VideoStream::open_with_options("input.mp4", &options)?;
///
/// let first = stream.read_frame()?;
/// assert_eq!(first.index(), 0);
///
/// stream.seek(1.0)?;
/// let at_one_second = stream.read_frame()?;
///
/// for frame in stream.select_frames([0, 25, 26]) {
///     let frame = frame?;
///     println!("frame {} at {:.2}s", frame.index(), frame.presentation_time());
/// }
///
/// loop {
///     match stream.read_frame() {
///         Ok(_) => {}
///         Err(FrameSeekError::EndOfStream) => break,
///         Err(error) => return Err(error),
///     }
/// }
/// # Ok::<(), FrameSeekError>(())
/// ```
pub struct VideoStream<D = FfmpegDecoder> {
    cursor: FrameCursor<D>,
    seek_threshold: u64,
}

impl<D> Debug for VideoStream<D>
where
    D: DecoderBackend,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoStream")
            .field("metadata", self.cursor.metadata())
            .field("position", &self.cursor.state())
            .field("seek_threshold", &self.seek_threshold)
            .finish_non_exhaustive()
    }
}

impl VideoStream<FfmpegDecoder> {
    /// Open a video file at native resolution.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSeekError::Open`] or [`FrameSeekError::NoVideoStream`]
    /// if the file cannot be opened, and [`FrameSeekError::Probe`] if it has
    /// no usable frame rate, size or frame count.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use frameseek::VideoStream;
    ///
    /// let stream = VideoStream::open("input.mp4")?;
    /// println!("{} frames at {} fps", stream.frame_count(), stream.frame_rate());
    /// # Ok::<(), frameseek::FrameSeekError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FrameSeekError> {
        Self::open_with_options(path, &StreamOptions::new())
    }

    /// Open a video file with the given options.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSeekError::Open`] or [`FrameSeekError::NoVideoStream`]
    /// if the file cannot be opened, [`FrameSeekError::Probe`] if it has no
    /// usable frame rate, size or frame count, and
    /// [`FrameSeekError::InvalidConfiguration`] if the requested output size
    /// is zero.
    pub fn open_with_options<P: AsRef<Path>>(
        path: P,
        options: &StreamOptions,
    ) -> Result<Self, FrameSeekError> {
        let decoder = FfmpegDecoder::open_with_options(path, options)?;
        Self::from_decoder(decoder, options)
    }
}

impl<D: DecoderBackend> VideoStream<D> {
    /// Wrap an already opened decoder backend.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSeekError::InvalidConfiguration`] if the output size
    /// resolves to zero, or [`FrameSeekError::Probe`] if the backend reports
    /// an unusable frame rate or size, or no frames at all.
    pub fn from_decoder(decoder: D, options: &StreamOptions) -> Result<Self, FrameSeekError> {
        let metadata = StreamMetadata::from_source(decoder.source_info(), options)?;
        log::debug!(
            "Stream ready: {} frames, {}x{} -> {}x{}",
            metadata.frame_count,
            metadata.width,
            metadata.height,
            metadata.out_width,
            metadata.out_height,
        );

        Ok(Self {
            cursor: FrameCursor::new(decoder, metadata, options.resize_filter),
            seek_threshold: options.seek_threshold,
        })
    }

    /// Metadata fixed at open time.
    pub fn metadata(&self) -> &StreamMetadata {
        self.cursor.metadata()
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.metadata().duration
    }

    /// Frames per second.
    pub fn frame_rate(&self) -> f64 {
        self.metadata().frame_rate
    }

    /// Total number of frames.
    pub fn frame_count(&self) -> u64 {
        self.metadata().frame_count
    }

    /// Native frame width.
    pub fn width(&self) -> u32 {
        self.metadata().width
    }

    /// Native frame height.
    pub fn height(&self) -> u32 {
        self.metadata().height
    }

    /// Width of returned frames.
    pub fn out_width(&self) -> u32 {
        self.metadata().out_width
    }

    /// Height of returned frames.
    pub fn out_height(&self) -> u32 {
        self.metadata().out_height
    }

    /// Current cursor state.
    pub fn position(&self) -> CursorState {
        self.cursor.state()
    }

    /// The decoder backend.
    pub fn decoder(&self) -> &D {
        self.cursor.decoder()
    }

    /// Return the frame at the cursor and advance by one.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSeekError::EndOfStream`] once the stream is exhausted;
    /// repeated calls keep returning it without decoding. Decode failures are
    /// returned as-is and exhaust the cursor.
    pub fn read_frame(&mut self) -> Result<Frame, FrameSeekError> {
        self.cursor.read_frame()
    }

    /// Position the cursor on the frame displayed at `seconds`: the frame
    /// with the greatest presentation time not after it.
    ///
    /// Times are clamped to the stream: negative values seek to frame 0 and
    /// values at or past the end leave the cursor where the next read
    /// reports [`FrameSeekError::EndOfStream`].
    ///
    /// A time less than a millionth of a frame interval before a frame's
    /// presentation time lands on that frame, so that `index / frame_rate`
    /// computed in floating point always seeks to `index`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSeekError::InvalidConfiguration`] for NaN, or the
    /// backend's error if the physical seek fails.
    pub fn seek(&mut self, seconds: f64) -> Result<(), FrameSeekError> {
        self.cursor.seek(seconds)
    }

    /// Lazily fetch the frames at `indices`, which must be non-decreasing.
    ///
    /// Frames come back in request order. Sequential indices are decoded
    /// without seeking; see [`FrameSelection`] for the per-item error rules.
    pub fn select_frames<I>(&mut self, indices: I) -> FrameSelection<'_, D, I::IntoIter>
    where
        I: IntoIterator<Item = u64>,
    {
        FrameSelection::new(&mut self.cursor, indices.into_iter(), self.seek_threshold)
    }

    /// Iterate over the remaining frames from the cursor until the end of
    /// the stream.
    ///
    /// `EndOfStream` ends the iteration silently; any other error is yielded
    /// once and ends it.
    pub fn frames(&mut self) -> impl Iterator<Item = Result<Frame, FrameSeekError>> + '_ {
        let mut finished = false;
        iter::from_fn(move || {
            if finished {
                return None;
            }
            match self.read_frame() {
                Ok(frame) => Some(Ok(frame)),
                Err(FrameSeekError::EndOfStream) => {
                    finished = true;
                    None
                }
                Err(error) => {
                    finished = true;
                    Some(Err(error))
                }
            }
        })
    }
}
