//! Decoded frame buffer.
//!
//! A [`Frame`] owns one decoded image in **channel-first** RGB layout
//! (`[C, H, W]`, three 8-bit planes one after another) together with its
//! presentation timestamp and its 0-based index in the stream. This is the
//! layout numeric/tensor consumers expect, so a frame can be handed to them
//! without re-ordering.
//!
//! Frames are plain owned values: every frame returned by a
//! [`VideoStream`](crate::VideoStream) is an independent copy with no
//! reference back to the stream or to the decoder's internal buffers.

use image::RgbImage;

use crate::error::FrameSeekError;

/// Number of colour channels in a [`Frame`].
pub const CHANNELS: usize = 3;

/// A single decoded RGB frame in channel-first layout.
///
/// # Example
///
/// ```no_run
/// use frameseek::VideoStream;
///
/// let mut stream = VideoStream::open("input.mp4")?;
/// let frame = stream.read_frame()?;
/// assert_eq!(frame.shape(), [3, stream.out_height() as usize, stream.out_width() as usize]);
/// frame.to_rgb_image().save("first.png")?;
/// # Ok::<(), frameseek::FrameSeekError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    presentation_time: f64,
    index: u64,
}

impl Frame {
    /// Build a frame from channel-first planar RGB data.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSeekError::InvalidConfiguration`] if `data.len()` is not
    /// `3 * width * height`.
    pub fn from_planar(
        data: Vec<u8>,
        width: u32,
        height: u32,
        presentation_time: f64,
        index: u64,
    ) -> Result<Self, FrameSeekError> {
        let expected = CHANNELS * width as usize * height as usize;
        if data.len() != expected {
            return Err(FrameSeekError::InvalidConfiguration(format!(
                "planar frame data has {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            presentation_time,
            index,
        })
    }

    /// Build a frame from tightly packed interleaved RGB24 data (`[H, W, C]`),
    /// as produced by FFmpeg's RGB24 conversion.
    ///
    /// The index is set to 0; the cursor assigns the real index when the
    /// frame is returned to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSeekError::Decode`] if `packed` is shorter than
    /// `3 * width * height`.
    pub fn from_packed_rgb(
        packed: &[u8],
        width: u32,
        height: u32,
        presentation_time: f64,
    ) -> Result<Self, FrameSeekError> {
        let plane_len = width as usize * height as usize;
        if packed.len() < plane_len * CHANNELS {
            return Err(FrameSeekError::Decode(format!(
                "packed RGB buffer has {} bytes, expected {} for {width}x{height}",
                packed.len(),
                plane_len * CHANNELS
            )));
        }

        let data = deinterleave(packed, plane_len);

        Ok(Self {
            data,
            width,
            height,
            presentation_time,
            index: 0,
        })
    }

    /// Build a frame from an [`RgbImage`].
    pub fn from_rgb_image(image: &RgbImage, presentation_time: f64, index: u64) -> Self {
        let plane_len = image.width() as usize * image.height() as usize;
        Self {
            data: deinterleave(image.as_raw(), plane_len),
            width: image.width(),
            height: image.height(),
            presentation_time,
            index,
        }
    }

    /// Convert to an interleaved [`RgbImage`] (e.g. for saving to disk).
    pub fn to_rgb_image(&self) -> RgbImage {
        let plane_len = self.width as usize * self.height as usize;
        let (red, rest) = self.data.split_at(plane_len);
        let (green, blue) = rest.split_at(plane_len);
        let packed: Vec<u8> = red
            .iter()
            .zip(green)
            .zip(blue)
            .flat_map(|((&r, &g), &b)| [r, g, b])
            .collect();
        // Frames always hold exactly three planes, so the buffer fits.
        RgbImage::from_raw(self.width, self.height, packed)
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }

    /// Channel-first pixel data, `3 * height * width` bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the frame and return its channel-first pixel data.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// One colour plane (0 = red, 1 = green, 2 = blue), row-major.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= 3`.
    pub fn plane(&self, channel: usize) -> &[u8] {
        assert!(channel < CHANNELS, "channel {channel} out of range");
        let plane_len = self.width as usize * self.height as usize;
        &self.data[channel * plane_len..(channel + 1) * plane_len]
    }

    /// Value of `channel` at row `y`, column `x`.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate is out of bounds.
    pub fn pixel(&self, channel: usize, y: u32, x: u32) -> u8 {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        self.plane(channel)[y as usize * self.width as usize + x as usize]
    }

    /// `[channels, height, width]`.
    pub fn shape(&self) -> [usize; 3] {
        [CHANNELS, self.height as usize, self.width as usize]
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Presentation time in seconds from the start of the stream.
    pub fn presentation_time(&self) -> f64 {
        self.presentation_time
    }

    /// 0-based frame index within the stream.
    pub fn index(&self) -> u64 {
        self.index
    }

    pub(crate) fn with_index(mut self, index: u64) -> Self {
        self.index = index;
        self
    }
}

/// Split interleaved `RGBRGB...` bytes into three consecutive planes.
fn deinterleave(packed: &[u8], plane_len: usize) -> Vec<u8> {
    let mut data = vec![0u8; plane_len * CHANNELS];
    let (red, rest) = data.split_at_mut(plane_len);
    let (green, blue) = rest.split_at_mut(plane_len);
    for (pixel, rgb) in packed.chunks_exact(CHANNELS).take(plane_len).enumerate() {
        red[pixel] = rgb[0];
        green[pixel] = rgb[1];
        blue[pixel] = rgb[2];
    }
    data
}
