//! In-memory decoder backend.
//!
//! [`MemoryDecoder`] serves frames that are already decoded, such as an image
//! sequence loaded from disk. It honours the same contract as the FFmpeg
//! backend, which makes it the reference for exercising the cursor and the
//! selector without media fixtures. It also counts how often each primitive
//! is called and can simulate corrupt data at a given position.

use image::RgbImage;

use crate::{
    decoder::{DecoderBackend, SourceInfo},
    error::FrameSeekError,
    frame::Frame,
};

/// A [`DecoderBackend`] over a fixed list of frames.
///
/// # Example
///
/// ```
/// use frameseek::{MemoryDecoder, StreamOptions, VideoStream};
/// use image::RgbImage;
///
/// let images = (0..10).map(|_| RgbImage::new(4, 2)).collect();
/// let decoder = MemoryDecoder::from_images(images, 5.0)?;
/// let mut stream = VideoStream::from_decoder(decoder, &StreamOptions::new())?;
/// assert_eq!(stream.frame_count(), 10);
/// assert_eq!(stream.duration(), 2.0);
/// stream.seek(1.0)?;
/// assert_eq!(stream.read_frame()?.index(), 5);
/// # Ok::<(), frameseek::FrameSeekError>(())
/// ```
#[derive(Debug, Clone)]
pub struct MemoryDecoder {
    frames: Vec<Frame>,
    info: SourceInfo,
    position: usize,
    fail_at: Option<usize>,
    decode_calls: u64,
    seek_calls: u64,
}

impl MemoryDecoder {
    /// Serve `frames` in order at `frame_rate`.
    ///
    /// Frames must share one size and be ordered by presentation time.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSeekError::InvalidConfiguration`] if `frames` is empty,
    /// the sizes differ, or the timestamps decrease.
    pub fn new(frames: Vec<Frame>, frame_rate: f64) -> Result<Self, FrameSeekError> {
        let Some(first) = frames.first() else {
            return Err(FrameSeekError::InvalidConfiguration(
                "a memory decoder needs at least one frame".to_string(),
            ));
        };
        let (width, height) = (first.width(), first.height());

        if let Some(odd) = frames
            .iter()
            .find(|frame| frame.width() != width || frame.height() != height)
        {
            return Err(FrameSeekError::InvalidConfiguration(format!(
                "frame sizes differ: {width}x{height} and {}x{}",
                odd.width(),
                odd.height()
            )));
        }
        if frames
            .windows(2)
            .any(|pair| pair[1].presentation_time() < pair[0].presentation_time())
        {
            return Err(FrameSeekError::InvalidConfiguration(
                "frame presentation times must not decrease".to_string(),
            ));
        }

        let info = SourceInfo {
            duration: frames.len() as f64 / frame_rate,
            frame_rate,
            frame_count: Some(frames.len() as u64),
            width,
            height,
            codec: "rawvideo".to_string(),
        };

        Ok(Self {
            frames,
            info,
            position: 0,
            fail_at: None,
            decode_calls: 0,
            seek_calls: 0,
        })
    }

    /// Serve `images` as consecutive frames, frame `i` presented at
    /// `i / frame_rate` seconds.
    ///
    /// # Errors
    ///
    /// See [`MemoryDecoder::new`].
    pub fn from_images(images: Vec<RgbImage>, frame_rate: f64) -> Result<Self, FrameSeekError> {
        let frames = images
            .iter()
            .enumerate()
            .map(|(index, image)| {
                Frame::from_rgb_image(image, index as f64 / frame_rate, index as u64)
            })
            .collect();
        Self::new(frames, frame_rate)
    }

    /// Make decoding the frame at `position` fail with
    /// [`FrameSeekError::Decode`], as corrupt data would.
    #[must_use]
    pub fn with_decode_failure_at(mut self, position: usize) -> Self {
        self.fail_at = Some(position);
        self
    }

    /// Number of [`decode_next`](DecoderBackend::decode_next) calls so far.
    pub fn decode_calls(&self) -> u64 {
        self.decode_calls
    }

    /// Number of [`seek_to`](DecoderBackend::seek_to) calls so far.
    pub fn seek_calls(&self) -> u64 {
        self.seek_calls
    }
}

impl DecoderBackend for MemoryDecoder {
    fn source_info(&self) -> &SourceInfo {
        &self.info
    }

    fn decode_next(&mut self) -> Result<Option<Frame>, FrameSeekError> {
        self.decode_calls += 1;

        if self.fail_at == Some(self.position) {
            return Err(FrameSeekError::Decode(format!(
                "corrupt data at frame {}",
                self.position
            )));
        }

        let Some(frame) = self.frames.get(self.position) else {
            return Ok(None);
        };
        self.position += 1;
        Ok(Some(frame.clone()))
    }

    fn seek_to(&mut self, seconds: f64) -> Result<(), FrameSeekError> {
        self.seek_calls += 1;

        // Number of frames presented at or before `seconds`, with the same
        // sub-frame tolerance the cursor uses when mapping time to an index.
        let rate = self.info.frame_rate;
        let at_or_before = self
            .frames
            .partition_point(|frame| frame.presentation_time() * rate <= seconds * rate + 1e-6);
        self.position = at_or_before.saturating_sub(1);

        log::trace!("Memory decoder positioned at frame {}", self.position);
        Ok(())
    }
}
