//! Shared test fixtures.
//!
//! Media fixtures are synthesised at test time instead of being checked in:
//! [`create_test_video`] encodes a short MPEG-4 clip in which frame `i` is a
//! uniform grey of value `i * GREY_STEP`, so every decoded frame can be
//! identified from its pixel values alone.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ffmpeg_next::{
    Dictionary, Packet, Rational,
    codec::{self, context::Context as CodecContext},
    format::{self, Pixel},
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use frameseek::{Frame, MemoryDecoder};
use image::{Rgb, RgbImage};
use tempfile::TempDir;

pub const FRAME_COUNT: u64 = 50;
pub const FRAME_RATE: f64 = 25.0;
pub const VIDEO_WIDTH: u32 = 64;
pub const VIDEO_HEIGHT: u32 = 48;
pub const GREY_STEP: u64 = 5;
pub const KEYFRAME_INTERVAL: u32 = 10;

/// A temporary directory holding a freshly encoded clip.
pub struct TestVideo {
    _directory: TempDir,
    pub path: PathBuf,
}

pub fn test_video() -> TestVideo {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = directory.path().join("clip.mp4");
    create_test_video(&path, FRAME_COUNT as usize, VIDEO_WIDTH, VIDEO_HEIGHT, FRAME_RATE as i32);
    TestVideo {
        _directory: directory,
        path,
    }
}

/// Encode `frame_count` uniform grey frames at `fps` into `path`.
pub fn create_test_video(path: &Path, frame_count: usize, width: u32, height: u32, fps: i32) {
    ffmpeg_next::init().expect("Failed to initialise FFmpeg");

    let mut output = format::output(&path).expect("Failed to create output context");
    let global_header = output.format().flags().contains(format::Flags::GLOBAL_HEADER);

    let codec = ffmpeg_next::encoder::find(codec::Id::MPEG4).expect("MPEG-4 encoder not available");
    let mut stream = output.add_stream(Some(codec)).expect("Failed to add stream");

    let mut encoder = CodecContext::new_with_codec(codec)
        .encoder()
        .video()
        .expect("Failed to create encoder");
    encoder.set_width(width);
    encoder.set_height(height);
    encoder.set_format(Pixel::YUV420P);
    encoder.set_time_base(Rational(1, fps));
    encoder.set_frame_rate(Some(Rational(fps, 1)));
    encoder.set_bit_rate(4_000_000);
    encoder.set_gop(KEYFRAME_INTERVAL);
    encoder.set_max_b_frames(0);
    if global_header {
        encoder.set_flags(codec::Flags::GLOBAL_HEADER);
    }

    let mut encoder = encoder
        .open_with(Dictionary::new())
        .expect("Failed to open encoder");
    stream.set_parameters(&encoder);
    output.write_header().expect("Failed to write header");

    let stream_time_base = output.stream(0).expect("Missing output stream").time_base();
    let mut scaler = ScalingContext::get(
        Pixel::RGB24,
        width,
        height,
        Pixel::YUV420P,
        width,
        height,
        ScalingFlags::BILINEAR,
    )
    .expect("Failed to create scaler");

    for index in 0..frame_count {
        let mut rgb_frame = VideoFrame::new(Pixel::RGB24, width, height);
        let stride = rgb_frame.stride(0);
        let value = grey_value(index as u64);
        let data = rgb_frame.data_mut(0);
        for row in 0..height as usize {
            data[row * stride..row * stride + width as usize * 3].fill(value);
        }

        let mut yuv_frame = VideoFrame::empty();
        scaler.run(&rgb_frame, &mut yuv_frame).expect("Failed to convert frame");
        yuv_frame.set_pts(Some(index as i64));

        encoder.send_frame(&yuv_frame).expect("Failed to send frame");
        let mut packet = Packet::empty();
        while encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(0);
            packet.rescale_ts(Rational(1, fps), stream_time_base);
            packet.write_interleaved(&mut output).expect("Failed to write packet");
        }
    }

    encoder.send_eof().expect("Failed to flush encoder");
    let mut packet = Packet::empty();
    while encoder.receive_packet(&mut packet).is_ok() {
        packet.set_stream(0);
        packet.rescale_ts(Rational(1, fps), stream_time_base);
        packet.write_interleaved(&mut output).expect("Failed to write packet");
    }
    output.write_trailer().expect("Failed to write trailer");
}

pub fn grey_value(index: u64) -> u8 {
    (index * GREY_STEP) as u8
}

/// Recover the source frame number of a frame decoded from [`test_video`].
pub fn decoded_frame_number(frame: &Frame) -> u64 {
    let red = frame.plane(0);
    let mean = red.iter().map(|&value| value as f64).sum::<f64>() / red.len() as f64;
    (mean / GREY_STEP as f64).round() as u64
}

/// `count` tiny frames where every pixel of frame `i` is `(i, 255 - i, i / 2)`.
pub fn numbered_images(count: u8, width: u32, height: u32) -> Vec<RgbImage> {
    (0..count)
        .map(|index| RgbImage::from_pixel(width, height, Rgb([index, 255 - index, index / 2])))
        .collect()
}

/// A 50-frame, 25 fps in-memory source of numbered 4x2 frames.
pub fn memory_decoder() -> MemoryDecoder {
    MemoryDecoder::from_images(numbered_images(FRAME_COUNT as u8, 4, 2), FRAME_RATE)
        .expect("Failed to build memory decoder")
}

/// Frame number encoded by [`numbered_images`].
pub fn frame_number(frame: &Frame) -> u64 {
    frame.pixel(0, 0, 0) as u64
}
