//! FFmpeg console verbosity.
//!
//! FFmpeg logs to stderr on its own, independently of the [`log`] facade this
//! crate uses for its diagnostics. Decoding damaged or unusual files can make
//! it chatty; [`set_ffmpeg_log_level`] turns it down without depending on
//! `ffmpeg-next` directly.
//!
//! ```no_run
//! use frameseek::{FfmpegLogLevel, VideoStream};
//!
//! frameseek::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! let stream = VideoStream::open("input.mp4")?;
//! # Ok::<(), frameseek::FrameSeekError>(())
//! ```

use ffmpeg_next::util::log::Level;

/// FFmpeg log levels, from silent to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Print nothing.
    Quiet,
    /// Only conditions after which the process is about to abort.
    Panic,
    /// Unrecoverable errors.
    Fatal,
    /// Recoverable errors, such as a damaged packet.
    Error,
    /// Warnings and errors. FFmpeg's default.
    Warning,
    /// Informational messages.
    Info,
    /// Detailed informational messages.
    Verbose,
    /// Debugging output for FFmpeg developers.
    Debug,
    /// Extremely verbose per-call tracing.
    Trace,
}

impl From<FfmpegLogLevel> for Level {
    fn from(level: FfmpegLogLevel) -> Self {
        match level {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

impl From<Level> for FfmpegLogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Quiet => FfmpegLogLevel::Quiet,
            Level::Panic => FfmpegLogLevel::Panic,
            Level::Fatal => FfmpegLogLevel::Fatal,
            Level::Error => FfmpegLogLevel::Error,
            Level::Warning => FfmpegLogLevel::Warning,
            Level::Info => FfmpegLogLevel::Info,
            Level::Verbose => FfmpegLogLevel::Verbose,
            Level::Debug => FfmpegLogLevel::Debug,
            Level::Trace => FfmpegLogLevel::Trace,
        }
    }
}

/// Set how much FFmpeg prints to stderr. Process-wide.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.into());
}

/// Current FFmpeg verbosity, or `None` if FFmpeg reports a level outside the
/// named ones.
pub fn get_ffmpeg_log_level() -> Option<FfmpegLogLevel> {
    ffmpeg_next::util::log::get_level().ok().map(FfmpegLogLevel::from)
}
