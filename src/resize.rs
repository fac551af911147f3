//! Frame resampling.
//!
//! [`resize`] maps a [`Frame`] to a new frame of a different resolution. The
//! filter is chosen once per stream through
//! [`StreamOptions::with_resize_filter`](crate::StreamOptions::with_resize_filter),
//! so repeated reads of the same source frame at the same output size are
//! bit-for-bit identical.

use image::imageops::{self, FilterType};

use crate::frame::Frame;

/// Resampling policy used when the output size differs from the native size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeFilter {
    /// Nearest-neighbour sampling. Fastest; this is the default.
    #[default]
    Nearest,
    /// Bilinear interpolation.
    Bilinear,
}

impl ResizeFilter {
    fn to_filter_type(self) -> FilterType {
        match self {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Bilinear => FilterType::Triangle,
        }
    }
}

/// Resample `frame` to `out_width` x `out_height`.
///
/// The presentation time and index are carried over unchanged. A frame that
/// already has the requested size is returned as-is.
///
/// Zero output dimensions are rejected when the stream is opened, so this
/// function has no error path.
pub fn resize(frame: Frame, out_width: u32, out_height: u32, filter: ResizeFilter) -> Frame {
    if frame.width() == out_width && frame.height() == out_height {
        return frame;
    }

    let source = frame.to_rgb_image();
    let resized = imageops::resize(&source, out_width, out_height, filter.to_filter_type());
    Frame::from_rgb_image(&resized, frame.presentation_time(), frame.index())
}
