//! # frameseek
//!
//! Random-access video frame reading: decode frames sequentially, seek to a
//! time, or fetch an arbitrary sorted batch of frame indices, optionally
//! resized on the fly. Decoding is powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! Frames are returned as [`Frame`] values: three 8-bit RGB planes stored
//! channel-first (`[channel][row][column]`), tagged with their frame index
//! and presentation time.
//!
//! ## Quick Start
//!
//! ### Read Frames Sequentially
//!
//! ```no_run
//! use frameseek::VideoStream;
//!
//! let mut stream = VideoStream::open("input.mp4")?;
//! for frame in stream.frames() {
//!     let frame = frame?;
//!     println!("frame {} at {:.3}s", frame.index(), frame.presentation_time());
//! }
//! # Ok::<(), frameseek::FrameSeekError>(())
//! ```
//!
//! ### Seek and Select
//!
//! ```no_run
//! use frameseek::{ResizeFilter, StreamOptions, VideoStream};
//!
//! let options = StreamOptions::new()
//!     .with_output_size(224, 224)
//!     .with_resize_filter(ResizeFilter::Bilinear);
//! let mut stream = VideoStream::open_with_options("input.mp4", &options)?;
//!
//! stream.seek(12.5)?;
//! let frame = stream.read_frame()?;
//! assert_eq!(frame.shape(), [3, 224, 224]);
//!
//! let frames: Vec<_> = stream
//!     .select_frames([0, 30, 31, 32, 900])
//!     .collect::<Result<_, _>>()?;
//! # Ok::<(), frameseek::FrameSeekError>(())
//! ```
//!
//! ## Cursor Semantics
//!
//! Every [`VideoStream`] owns a cursor that is either `Ready(i)` (the next
//! read returns frame `i`) or `Exhausted`. Reads advance it by one; seeks set
//! it to the frame displayed at the requested time, clamped to the stream.
//! Once exhausted, reads keep failing with [`FrameSeekError::EndOfStream`]
//! without decoding until the next seek.
//!
//! ## Custom Backends
//!
//! The cursor logic is independent of FFmpeg: anything implementing
//! [`DecoderBackend`] can be wrapped with [`VideoStream::from_decoder`].
//! [`MemoryDecoder`] serves pre-decoded frames from memory.
//!
//! ## Features
//!
//! - `hardware`: hardware-accelerated decoding through FFmpeg device
//!   contexts ([`HardwareAccelerationMode`]).
//! - `rayon`: [`select_frames_parallel`], spreading a frame selection over
//!   several decoder instances.
//! - `full`: all of the above.
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`](https://crates.io/crates/log) facade:
//! `debug` for opens and seeks, `trace` per frame, `warn` for recoverable
//! decoder trouble. FFmpeg's own stderr output is controlled separately with
//! [`set_ffmpeg_log_level`].

pub mod cursor;
pub mod decoder;
pub mod error;
pub mod ffmpeg;
pub mod ffmpeg_decoder;
pub mod frame;
#[cfg(feature = "hardware")]
pub mod hardware_acceleration;
pub mod memory_decoder;
pub mod metadata;
pub mod options;
#[cfg(feature = "rayon")]
mod parallel;
pub mod probe;
pub mod resize;
pub mod selector;
pub mod stream;
mod utilities;

pub use cursor::CursorState;
pub use decoder::{DecoderBackend, SourceInfo};
pub use error::FrameSeekError;
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use ffmpeg_decoder::FfmpegDecoder;
pub use frame::{CHANNELS, Frame};
#[cfg(feature = "hardware")]
pub use hardware_acceleration::{
    HardwareAccelerationMode, HardwareDeviceType, available_hardware_devices,
};
pub use memory_decoder::MemoryDecoder;
pub use metadata::StreamMetadata;
pub use options::StreamOptions;
#[cfg(feature = "rayon")]
pub use parallel::select_frames_parallel;
pub use probe::{probe, probe_many};
pub use resize::{ResizeFilter, resize};
pub use selector::FrameSelection;
pub use stream::VideoStream;
