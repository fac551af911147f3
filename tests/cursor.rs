//! Cursor state machine tests.
//!
//! These run against the in-memory backend, so every property can be
//! checked exactly and without media fixtures.

mod common;

use frameseek::{
    CursorState, DecoderBackend, Frame, FrameSeekError, MemoryDecoder, SourceInfo, StreamOptions,
    VideoStream,
};

use common::{FRAME_COUNT, FRAME_RATE, frame_number, memory_decoder, numbered_images};

fn open_memory_stream() -> VideoStream<MemoryDecoder> {
    VideoStream::from_decoder(memory_decoder(), &StreamOptions::new())
        .expect("Failed to open memory stream")
}

// ── metadata ───────────────────────────────────────────────────────

#[test]
fn open_reports_stream_metadata() {
    let stream = open_memory_stream();

    assert_eq!(stream.frame_count(), FRAME_COUNT);
    assert_eq!(stream.frame_rate(), FRAME_RATE);
    assert!((stream.duration() - 2.0).abs() < 1e-9);
    assert_eq!((stream.width(), stream.height()), (4, 2));
    assert_eq!((stream.out_width(), stream.out_height()), (4, 2));
    assert_eq!(stream.metadata().codec, "rawvideo");
    assert_eq!(stream.position(), CursorState::Ready(0));
}

#[test]
fn unusable_frame_rate_is_rejected() {
    let decoder = MemoryDecoder::from_images(numbered_images(3, 4, 2), 0.0)
        .expect("Failed to build memory decoder");
    let error = VideoStream::from_decoder(decoder, &StreamOptions::new()).unwrap_err();
    assert!(matches!(error, FrameSeekError::Probe(_)), "{error:?}");
    assert!(error.is_open_error());
}

/// A backend that only reports fixed source information.
struct FixedInfoDecoder(SourceInfo);

impl FixedInfoDecoder {
    fn new(duration: f64, frame_count: Option<u64>, width: u32, height: u32) -> Self {
        Self(SourceInfo {
            duration,
            frame_rate: FRAME_RATE,
            frame_count,
            width,
            height,
            codec: "rawvideo".to_string(),
        })
    }
}

impl DecoderBackend for FixedInfoDecoder {
    fn source_info(&self) -> &SourceInfo {
        &self.0
    }

    fn decode_next(&mut self) -> Result<Option<Frame>, FrameSeekError> {
        Ok(None)
    }

    fn seek_to(&mut self, _seconds: f64) -> Result<(), FrameSeekError> {
        Ok(())
    }
}

#[test]
fn unknown_length_is_rejected() {
    for decoder in [
        FixedInfoDecoder::new(0.0, None, 4, 2),
        FixedInfoDecoder::new(f64::NAN, None, 4, 2),
        FixedInfoDecoder::new(0.0, Some(0), 4, 2),
    ] {
        let error = VideoStream::from_decoder(decoder, &StreamOptions::new()).unwrap_err();
        assert!(matches!(error, FrameSeekError::Probe(_)), "{error:?}");
        assert!(error.is_open_error());
    }
}

#[test]
fn duration_alone_gives_the_frame_count() {
    let stream = VideoStream::from_decoder(
        FixedInfoDecoder::new(2.0, None, 4, 2),
        &StreamOptions::new(),
    )
    .expect("Failed to open stream");
    assert_eq!(stream.frame_count(), FRAME_COUNT);
}

#[test]
fn zero_dimensions_are_rejected() {
    for (width, height) in [(0, 2), (4, 0)] {
        let decoder = FixedInfoDecoder::new(2.0, Some(FRAME_COUNT), width, height);
        let result = VideoStream::from_decoder(decoder, &StreamOptions::new());
        assert!(matches!(result, Err(FrameSeekError::Probe(_))));
    }
}

#[test]
fn memory_decoder_rejects_bad_input() {
    assert!(matches!(
        MemoryDecoder::new(Vec::new(), FRAME_RATE),
        Err(FrameSeekError::InvalidConfiguration(_))
    ));

    let small = Frame::from_planar(vec![0; 3 * 4 * 2], 4, 2, 0.0, 0).unwrap();
    let large = Frame::from_planar(vec![0; 3 * 8 * 2], 8, 2, 0.04, 1).unwrap();
    assert!(matches!(
        MemoryDecoder::new(vec![small.clone(), large], FRAME_RATE),
        Err(FrameSeekError::InvalidConfiguration(_))
    ));

    let earlier = Frame::from_planar(vec![0; 3 * 4 * 2], 4, 2, -1.0, 1).unwrap();
    assert!(matches!(
        MemoryDecoder::new(vec![small, earlier], FRAME_RATE),
        Err(FrameSeekError::InvalidConfiguration(_))
    ));
}

// ── sequential reads ───────────────────────────────────────────────

#[test]
fn sequential_reads_return_every_frame_in_order() {
    let mut stream = open_memory_stream();

    for expected in 0..FRAME_COUNT {
        let frame = stream.read_frame().expect("Failed to read frame");
        assert_eq!(frame.index(), expected);
        assert_eq!(frame_number(&frame), expected);
        assert!((frame.presentation_time() - expected as f64 / FRAME_RATE).abs() < 1e-9);
        assert_eq!(stream.position(), CursorState::Ready(expected + 1));
    }

    assert!(matches!(stream.read_frame(), Err(FrameSeekError::EndOfStream)));
    assert_eq!(stream.position(), CursorState::Exhausted);
}

#[test]
fn presentation_times_increase() {
    let mut stream = open_memory_stream();
    let times: Vec<f64> = stream
        .frames()
        .map(|frame| frame.expect("Decode error").presentation_time())
        .collect();

    assert_eq!(times.len(), FRAME_COUNT as usize);
    assert!(times.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn end_of_stream_is_repeated_without_decoding() {
    let mut stream = open_memory_stream();
    while stream.read_frame().is_ok() {}

    let calls = stream.decoder().decode_calls();
    for _ in 0..3 {
        let error = stream.read_frame().unwrap_err();
        assert!(error.is_end_of_stream());
    }
    assert_eq!(stream.decoder().decode_calls(), calls);
}

#[test]
fn frames_iterator_stops_at_end_of_stream() {
    let mut stream = open_memory_stream();
    stream.seek(1.0).expect("Seek failed");

    let indices: Vec<u64> = stream
        .frames()
        .map(|frame| frame.expect("Decode error").index())
        .collect();
    assert_eq!(indices, (25..FRAME_COUNT).collect::<Vec<_>>());
    assert!(stream.frames().next().is_none());
}

// ── seeking ────────────────────────────────────────────────────────

#[test]
fn seek_lands_on_frame_displayed_at_time() {
    let mut stream = open_memory_stream();

    for (seconds, expected) in [(1.0, 25), (1.02, 25), (1.039, 25), (1.04, 26), (0.0, 0), (1.99, 49)] {
        stream.seek(seconds).expect("Seek failed");
        let frame = stream.read_frame().expect("Failed to read frame");
        assert_eq!(frame.index(), expected, "seek({seconds})");
        assert_eq!(frame_number(&frame), expected, "seek({seconds})");
        assert!(frame.presentation_time() <= seconds + 1e-9);
    }
}

#[test]
fn seek_to_every_frame_time_returns_that_frame() {
    let mut stream = open_memory_stream();

    for index in (0..FRAME_COUNT).rev() {
        stream.seek(index as f64 / FRAME_RATE).expect("Seek failed");
        assert_eq!(stream.read_frame().expect("Read failed").index(), index);
    }
}

#[test]
fn seek_just_before_a_frame_time() {
    let mut stream = open_memory_stream();

    // Within a millionth of a frame interval the later frame wins.
    stream.seek(1.0 - 1e-9).expect("Seek failed");
    assert_eq!(stream.position(), CursorState::Ready(25));

    stream.seek(1.0 - 1e-3).expect("Seek failed");
    assert_eq!(stream.position(), CursorState::Ready(24));
    assert_eq!(stream.read_frame().expect("Read failed").index(), 24);
}

#[test]
fn seek_then_read_continues_sequentially() {
    let mut stream = open_memory_stream();
    stream.seek(0.4).expect("Seek failed");

    let indices: Vec<u64> = (0..5)
        .map(|_| stream.read_frame().expect("Read failed").index())
        .collect();
    assert_eq!(indices, vec![10, 11, 12, 13, 14]);
}

#[test]
fn negative_seek_clamps_to_first_frame() {
    let mut stream = open_memory_stream();
    stream.seek(1.0).expect("Seek failed");
    stream.seek(-3.5).expect("Seek failed");

    assert_eq!(stream.position(), CursorState::Ready(0));
    assert_eq!(stream.read_frame().expect("Read failed").index(), 0);
}

#[test]
fn seek_to_duration_or_beyond_reaches_end_of_stream() {
    let mut stream = open_memory_stream();

    for seconds in [stream.duration(), 2.5, f64::INFINITY] {
        stream.seek(seconds).expect("Seek failed");
        assert_eq!(stream.position(), CursorState::Ready(FRAME_COUNT));
        assert!(matches!(stream.read_frame(), Err(FrameSeekError::EndOfStream)));
    }
    assert_eq!(stream.decoder().seek_calls(), 0);
}

#[test]
fn seek_recovers_from_exhaustion() {
    let mut stream = open_memory_stream();
    while stream.read_frame().is_ok() {}
    assert_eq!(stream.position(), CursorState::Exhausted);

    stream.seek(0.0).expect("Seek failed");
    assert_eq!(stream.position(), CursorState::Ready(0));
    assert_eq!(stream.read_frame().expect("Read failed").index(), 0);
}

#[test]
fn nan_seek_is_rejected_without_moving_the_cursor() {
    let mut stream = open_memory_stream();
    stream.read_frame().expect("Read failed");

    let result = stream.seek(f64::NAN);
    assert!(matches!(result, Err(FrameSeekError::InvalidConfiguration(_))));
    assert_eq!(stream.position(), CursorState::Ready(1));
    assert_eq!(stream.decoder().seek_calls(), 0);
}

// ── decode failures ────────────────────────────────────────────────

#[test]
fn decode_failure_exhausts_the_cursor() {
    let decoder = memory_decoder().with_decode_failure_at(3);
    let mut stream = VideoStream::from_decoder(decoder, &StreamOptions::new())
        .expect("Failed to open memory stream");

    for expected in 0..3 {
        assert_eq!(stream.read_frame().expect("Read failed").index(), expected);
    }
    assert!(matches!(stream.read_frame(), Err(FrameSeekError::Decode(_))));
    assert_eq!(stream.position(), CursorState::Exhausted);
    assert!(matches!(stream.read_frame(), Err(FrameSeekError::EndOfStream)));

    stream.seek(0.8).expect("Seek failed");
    assert_eq!(stream.read_frame().expect("Read failed").index(), 20);
}

// ── backends ───────────────────────────────────────────────────────

#[test]
fn boxed_backend_behaves_like_the_concrete_one() {
    let decoder: Box<dyn DecoderBackend> = Box::new(memory_decoder());
    let mut stream =
        VideoStream::from_decoder(decoder, &StreamOptions::new()).expect("Failed to open stream");

    assert_eq!(stream.frame_count(), FRAME_COUNT);
    stream.seek(1.2).expect("Seek failed");
    let frame = stream.read_frame().expect("Read failed");
    assert_eq!(frame.index(), 30);
    assert_eq!(frame_number(&frame), 30);
}
