//! FFmpeg decoder backend.
//!
//! [`FfmpegDecoder`] demuxes and decodes the best video stream of a file
//! through `ffmpeg-next` and converts every frame to RGB24 at native
//! resolution. Seeking goes to the nearest keyframe at or before the target
//! and then decodes forward, discarding frames until the one displayed at the
//! requested time is reached; that frame is held back and handed out by the
//! next [`decode_next`](DecoderBackend::decode_next).

use std::path::{Path, PathBuf};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
    util::error::EAGAIN,
};

#[cfg(feature = "hardware")]
use crate::hardware_acceleration;
use crate::{
    decoder::{DecoderBackend, SourceInfo},
    error::FrameSeekError,
    frame::{CHANNELS, Frame},
    options::StreamOptions,
    utilities,
};

/// A [`DecoderBackend`] reading a media file through FFmpeg.
///
/// Usually created indirectly by [`VideoStream::open`](crate::VideoStream::open).
pub struct FfmpegDecoder {
    input_context: Input,
    decoder: VideoDecoder,
    /// Built on the first frame, once the decoded pixel format is known.
    scaler: Option<ScalingContext>,
    video_stream_index: usize,
    time_base: Rational,
    /// Stream start time in stream time base; presentation times are
    /// relative to it.
    start_pts: i64,
    info: SourceInfo,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
    /// Frame located by the last seek, returned by the next decode.
    pending: Option<Frame>,
    last_time: Option<f64>,
    eof_sent: bool,
    hardware_active: bool,
    path: PathBuf,
}

// Safety: the FFmpeg contexts are owned exclusively by this value and are
// only touched through `&mut self`, so moving it to another thread is sound.
unsafe impl Send for FfmpegDecoder {}

impl FfmpegDecoder {
    /// Open `path` with default options.
    ///
    /// # Errors
    ///
    /// See [`FfmpegDecoder::open_with_options`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FrameSeekError> {
        Self::open_with_options(path, &StreamOptions::new())
    }

    /// Open `path` and probe its best video stream.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSeekError::Open`] if the file cannot be opened or its
    /// codec is unsupported, and [`FrameSeekError::NoVideoStream`] if it has
    /// no video.
    pub fn open_with_options<P: AsRef<Path>>(
        path: P,
        #[cfg_attr(not(feature = "hardware"), allow(unused_variables))] options: &StreamOptions,
    ) -> Result<Self, FrameSeekError> {
        let path = path.as_ref();
        log::debug!("Opening video source: {}", path.display());

        let open_error = |reason: String| FrameSeekError::Open {
            path: path.to_path_buf(),
            reason,
        };

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;
        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(FrameSeekError::NoVideoStream)?;
        let video_stream_index = stream.index();
        let time_base = stream.time_base();
        let start_pts = match stream.start_time() {
            ffmpeg_next::ffi::AV_NOPTS_VALUE => 0,
            start => start,
        };

        let frame_rate = match utilities::rational_to_rate(stream.avg_frame_rate()) {
            rate if rate > 0.0 => rate,
            _ => utilities::rational_to_rate(stream.rate()),
        };
        let duration = if input_context.duration() > 0 {
            input_context.duration() as f64 / 1_000_000.0
        } else if stream.duration() > 0 {
            utilities::pts_to_seconds(stream.duration(), time_base)
        } else {
            0.0
        };
        let frame_count = u64::try_from(stream.frames()).ok().filter(|&count| count > 0);

        let codec_context = CodecContext::from_parameters(stream.parameters()).map_err(|error| {
            open_error(format!("failed to read codec parameters: {error}"))
        })?;

        #[cfg(feature = "hardware")]
        let (decoder, hardware_active) = hardware_acceleration::open_video_decoder(
            codec_context,
            options.hardware_acceleration,
        )
        .map_err(|error| open_error(format!("failed to create video decoder: {error}")))?;
        #[cfg(not(feature = "hardware"))]
        let (decoder, hardware_active) = (
            codec_context
                .decoder()
                .video()
                .map_err(|error| open_error(format!("failed to create video decoder: {error}")))?,
            false,
        );

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let info = SourceInfo {
            duration,
            frame_rate,
            frame_count,
            width: decoder.width(),
            height: decoder.height(),
            codec,
        };
        log::debug!(
            "Probed {}: {}x{} {} @ {:.3} fps, {:.3}s, {:?} frames",
            path.display(),
            info.width,
            info.height,
            info.codec,
            info.frame_rate,
            info.duration,
            info.frame_count,
        );

        Ok(Self {
            input_context,
            decoder,
            scaler: None,
            video_stream_index,
            time_base,
            start_pts,
            info,
            decoded_frame: VideoFrame::empty(),
            rgb_frame: VideoFrame::empty(),
            pending: None,
            last_time: None,
            eof_sent: false,
            hardware_active,
            path: path.to_path_buf(),
        })
    }

    /// Path the decoder was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if frames are decoded on a hardware device.
    pub fn is_hardware_accelerated(&self) -> bool {
        self.hardware_active
    }

    /// Pull the next decoded frame into `decoded_frame`, feeding packets as
    /// needed. Returns `false` once the decoder is drained.
    fn receive_next(&mut self) -> Result<bool, FrameSeekError> {
        loop {
            match self.decoder.receive_frame(&mut self.decoded_frame) {
                Ok(()) => return Ok(true),
                Err(FfmpegError::Eof) => return Ok(false),
                Err(FfmpegError::Other { errno }) if errno == EAGAIN => {}
                Err(error) => return Err(FrameSeekError::Decode(error.to_string())),
            }
            if self.eof_sent {
                return Ok(false);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    if packet.stream() == self.video_stream_index {
                        self.decoder
                            .send_packet(&packet)
                            .map_err(|error| FrameSeekError::Decode(error.to_string()))?;
                    }
                }
                Err(FfmpegError::Eof) => {
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
                Err(error) => return Err(FrameSeekError::Decode(error.to_string())),
            }
        }
    }

    /// Presentation time of `decoded_frame` in seconds from stream start.
    fn current_time(&mut self) -> f64 {
        let timestamp = self.decoded_frame.timestamp().or(self.decoded_frame.pts());
        let seconds = match timestamp {
            Some(pts) => utilities::pts_to_seconds(pts - self.start_pts, self.time_base),
            None => {
                let estimated = self
                    .last_time
                    .map_or(0.0, |last| last + 1.0 / self.info.frame_rate);
                log::warn!("Frame without timestamp, assuming {estimated:.3}s");
                estimated
            }
        };
        self.last_time = Some(seconds);
        seconds
    }

    /// Convert `decoded_frame` to an RGB [`Frame`] at native size.
    fn convert_current(&mut self, presentation_time: f64) -> Result<Frame, FrameSeekError> {
        #[cfg(feature = "hardware")]
        if self.hardware_active {
            if let Some(downloaded) = hardware_acceleration::download_frame(&self.decoded_frame) {
                self.decoded_frame = downloaded;
            }
        }

        let (width, height) = (self.info.width, self.info.height);
        if self.scaler.is_none() {
            self.scaler = Some(ScalingContext::get(
                self.decoded_frame.format(),
                self.decoded_frame.width(),
                self.decoded_frame.height(),
                Pixel::RGB24,
                width,
                height,
                ScalingFlags::BILINEAR,
            )?);
        }
        if let Some(scaler) = self.scaler.as_mut() {
            scaler.run(&self.decoded_frame, &mut self.rgb_frame)?;
        }

        let buffer = utilities::packed_plane(&self.rgb_frame, width, height, CHANNELS);
        Frame::from_packed_rgb(&buffer, width, height, presentation_time)
    }

    /// Decode forward from the current demuxer position and keep the first
    /// frame numbered `target` or later in `pending`.
    ///
    /// Returns `false` if the first decoded frame is already past `target`
    /// and `allow_overshoot` is not set.
    fn discard_until(&mut self, target: u64, allow_overshoot: bool) -> Result<bool, FrameSeekError> {
        let mut first = true;
        while self.receive_next()? {
            let seconds = self.current_time();
            let number = utilities::seconds_to_nearest_frame(seconds, self.info.frame_rate);
            if number < target {
                first = false;
                continue;
            }
            if first && number > target && !allow_overshoot {
                return Ok(false);
            }
            self.pending = Some(self.convert_current(seconds)?);
            return Ok(true);
        }
        Ok(true)
    }

    fn seek_container(&mut self, seconds: f64) -> Result<(), FrameSeekError> {
        let start = utilities::pts_to_seconds(self.start_pts, self.time_base);
        let timestamp = utilities::seconds_to_seek_timestamp(seconds + start);
        self.input_context.seek(timestamp, ..timestamp)?;
        self.decoder.flush();
        self.eof_sent = false;
        self.pending = None;
        self.last_time = None;
        Ok(())
    }
}

impl DecoderBackend for FfmpegDecoder {
    fn source_info(&self) -> &SourceInfo {
        &self.info
    }

    fn decode_next(&mut self) -> Result<Option<Frame>, FrameSeekError> {
        if let Some(frame) = self.pending.take() {
            return Ok(Some(frame));
        }
        if !self.receive_next()? {
            return Ok(None);
        }
        let seconds = self.current_time();
        self.convert_current(seconds).map(Some)
    }

    fn seek_to(&mut self, seconds: f64) -> Result<(), FrameSeekError> {
        let seconds = seconds.max(0.0);
        let target = utilities::seconds_to_frame_at(seconds, self.info.frame_rate);

        self.seek_container(seconds)?;
        if self.discard_until(target, false)? {
            return Ok(());
        }

        // The keyframe seek landed after the target; decode from the start.
        log::debug!("Seek to {seconds:.3}s overshot, rewinding to stream start");
        self.seek_container(0.0)?;
        self.discard_until(target, true)?;
        Ok(())
    }
}
