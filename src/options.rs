//! Stream configuration.
//!
//! [`StreamOptions`] is a builder carrying the settings that are fixed for
//! the lifetime of a [`VideoStream`](crate::VideoStream): output resolution,
//! resampling filter, the selector's seek threshold and (with the `hardware`
//! feature) the hardware decoding mode.
//!
//! # Example
//!
//! ```no_run
//! use frameseek::{ResizeFilter, StreamOptions, VideoStream};
//!
//! let options = StreamOptions::new()
//!     .with_output_size(160, 90)
//!     .with_resize_filter(ResizeFilter::Bilinear)
//!     .with_seek_threshold(8);
//! let stream = VideoStream::open_with_options("input.mp4", &options)?;
//! assert_eq!((stream.out_width(), stream.out_height()), (160, 90));
//! # Ok::<(), frameseek::FrameSeekError>(())
//! ```

#[cfg(feature = "hardware")]
use crate::hardware_acceleration::HardwareAccelerationMode;
use crate::{error::FrameSeekError, resize::ResizeFilter};

/// Settings applied to a stream when it is opened.
///
/// A default-constructed value decodes at native resolution with
/// nearest-neighbour resampling and seeks on every non-sequential selection.
#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// Target width. `None` keeps the native width.
    pub(crate) width: Option<u32>,
    /// Target height. `None` keeps the native height.
    pub(crate) height: Option<u32>,
    /// Derive a missing dimension from the native aspect ratio.
    pub(crate) maintain_aspect_ratio: bool,
    pub(crate) resize_filter: ResizeFilter,
    /// Largest forward gap the selector closes by decoding instead of seeking.
    pub(crate) seek_threshold: u64,
    #[cfg(feature = "hardware")]
    pub(crate) hardware_acceleration: HardwareAccelerationMode,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            width: None,
            height: None,
            maintain_aspect_ratio: true,
            resize_filter: ResizeFilter::default(),
            seek_threshold: 0,
            #[cfg(feature = "hardware")]
            hardware_acceleration: HardwareAccelerationMode::default(),
        }
    }

    /// Resize every frame to exactly `width` x `height`.
    #[must_use]
    pub fn with_output_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the output resolution, keeping the native value for `None`.
    ///
    /// When [`maintain_aspect_ratio`](StreamOptions::with_maintain_aspect_ratio)
    /// is `true` (the default) and only one dimension is given, the other is
    /// computed from the native aspect ratio.
    #[must_use]
    pub fn with_resolution(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Control whether a missing output dimension follows the native aspect
    /// ratio. Defaults to `true`.
    #[must_use]
    pub fn with_maintain_aspect_ratio(mut self, maintain: bool) -> Self {
        self.maintain_aspect_ratio = maintain;
        self
    }

    /// Set the resampling filter. Defaults to [`ResizeFilter::Nearest`].
    #[must_use]
    pub fn with_resize_filter(mut self, filter: ResizeFilter) -> Self {
        self.resize_filter = filter;
        self
    }

    /// Let [`select_frames`](crate::VideoStream::select_frames) decode and
    /// discard up to `frames` intermediate frames instead of seeking.
    ///
    /// Only affects performance, never which frames are returned. `0` (the
    /// default) seeks for every forward jump.
    #[must_use]
    pub fn with_seek_threshold(mut self, frames: u64) -> Self {
        self.seek_threshold = frames;
        self
    }

    /// Set the hardware acceleration mode.
    ///
    /// Defaults to [`HardwareAccelerationMode::Auto`].
    #[cfg(feature = "hardware")]
    #[must_use]
    pub fn with_hardware_acceleration(mut self, mode: HardwareAccelerationMode) -> Self {
        self.hardware_acceleration = mode;
        self
    }

    /// Resolve the output dimensions for a source of the given native size.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSeekError::InvalidConfiguration`] if either resolved
    /// dimension is zero.
    pub(crate) fn resolve_output_size(
        &self,
        native_width: u32,
        native_height: u32,
    ) -> Result<(u32, u32), FrameSeekError> {
        let (width, height) = match (self.width, self.height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) if self.maintain_aspect_ratio && native_width > 0 => {
                let ratio = w as f64 / native_width as f64;
                let h = (native_height as f64 * ratio).round() as u32;
                (w, h.max(1))
            }
            (Some(w), None) => (w, native_height),
            (None, Some(h)) if self.maintain_aspect_ratio && native_height > 0 => {
                let ratio = h as f64 / native_height as f64;
                let w = (native_width as f64 * ratio).round() as u32;
                (w.max(1), h)
            }
            (None, Some(h)) => (native_width, h),
            (None, None) => (native_width, native_height),
        };

        if width == 0 || height == 0 {
            return Err(FrameSeekError::InvalidConfiguration(format!(
                "output size must be non-zero, got {width}x{height}"
            )));
        }

        Ok((width, height))
    }
}
