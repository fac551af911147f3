//! Hardware-accelerated decoding for the FFmpeg backend.
//!
//! With the `hardware` feature enabled, [`HardwareAccelerationMode`] selects
//! whether [`FfmpegDecoder`](crate::FfmpegDecoder) attaches an FFmpeg hardware
//! device context to its decoder. Decoded surfaces are downloaded to system
//! memory before RGB conversion, so the rest of the pipeline never sees a
//! GPU frame.
//!
//! Availability depends on the FFmpeg build and the host's drivers. Whenever
//! no usable device is found the decoder falls back to software decoding.

use std::ptr;

use ffmpeg_next::{
    codec::context::Context as CodecContext, decoder::Video as VideoDecoder,
    frame::Video as VideoFrame,
};
use ffmpeg_sys_next::{
    AV_CODEC_HW_CONFIG_METHOD_HW_DEVICE_CTX, AVBufferRef, AVCodecContext, AVHWDeviceType,
};

use crate::error::FrameSeekError;

/// Hardware decoding policy.
///
/// # Example
///
/// ```no_run
/// use frameseek::{HardwareAccelerationMode, HardwareDeviceType, StreamOptions, VideoStream};
///
/// let options = StreamOptions::new()
///     .with_hardware_acceleration(HardwareAccelerationMode::Specific(HardwareDeviceType::Vaapi));
/// let mut stream = VideoStream::open_with_options("input.mp4", &options)?;
/// let frame = stream.read_frame()?;
/// # Ok::<(), frameseek::FrameSeekError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HardwareAccelerationMode {
    /// Use the first device the codec supports, else software.
    #[default]
    Auto,
    /// Always decode in software.
    Software,
    /// Use this device if the codec supports it, else software.
    Specific(HardwareDeviceType),
}

/// Hardware device families FFmpeg can decode on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareDeviceType {
    /// NVIDIA CUDA (Linux, Windows).
    Cuda,
    /// Video Acceleration API (Linux).
    Vaapi,
    /// DirectX Video Acceleration 2 (Windows).
    Dxva2,
    /// Direct3D 11 Video Acceleration (Windows).
    D3d11va,
    /// Apple VideoToolbox (macOS, iOS).
    VideoToolbox,
    /// Intel Quick Sync Video.
    Qsv,
}

impl HardwareDeviceType {
    fn to_av(self) -> AVHWDeviceType {
        match self {
            HardwareDeviceType::Cuda => AVHWDeviceType::AV_HWDEVICE_TYPE_CUDA,
            HardwareDeviceType::Vaapi => AVHWDeviceType::AV_HWDEVICE_TYPE_VAAPI,
            HardwareDeviceType::Dxva2 => AVHWDeviceType::AV_HWDEVICE_TYPE_DXVA2,
            HardwareDeviceType::D3d11va => AVHWDeviceType::AV_HWDEVICE_TYPE_D3D11VA,
            HardwareDeviceType::VideoToolbox => AVHWDeviceType::AV_HWDEVICE_TYPE_VIDEOTOOLBOX,
            HardwareDeviceType::Qsv => AVHWDeviceType::AV_HWDEVICE_TYPE_QSV,
        }
    }

    fn from_av(device_type: AVHWDeviceType) -> Option<Self> {
        match device_type {
            AVHWDeviceType::AV_HWDEVICE_TYPE_CUDA => Some(HardwareDeviceType::Cuda),
            AVHWDeviceType::AV_HWDEVICE_TYPE_VAAPI => Some(HardwareDeviceType::Vaapi),
            AVHWDeviceType::AV_HWDEVICE_TYPE_DXVA2 => Some(HardwareDeviceType::Dxva2),
            AVHWDeviceType::AV_HWDEVICE_TYPE_D3D11VA => Some(HardwareDeviceType::D3d11va),
            AVHWDeviceType::AV_HWDEVICE_TYPE_VIDEOTOOLBOX => Some(HardwareDeviceType::VideoToolbox),
            AVHWDeviceType::AV_HWDEVICE_TYPE_QSV => Some(HardwareDeviceType::Qsv),
            _ => None,
        }
    }
}

/// Device types compiled into the linked FFmpeg build.
pub fn available_hardware_devices() -> Vec<HardwareDeviceType> {
    let mut devices = Vec::new();
    let mut device_type = AVHWDeviceType::AV_HWDEVICE_TYPE_NONE;

    loop {
        device_type = unsafe { ffmpeg_sys_next::av_hwdevice_iterate_types(device_type) };
        if device_type == AVHWDeviceType::AV_HWDEVICE_TYPE_NONE {
            break;
        }
        devices.extend(HardwareDeviceType::from_av(device_type));
    }

    devices
}

/// Build a video decoder for `codec_context` according to `mode`.
///
/// Returns the decoder and whether a hardware device is attached.
pub(crate) fn open_video_decoder(
    codec_context: CodecContext,
    mode: HardwareAccelerationMode,
) -> Result<(VideoDecoder, bool), FrameSeekError> {
    let supported = supported_device_types(&codec_context);
    let chosen = match mode {
        HardwareAccelerationMode::Software => None,
        HardwareAccelerationMode::Auto => supported.first().copied(),
        HardwareAccelerationMode::Specific(device) => {
            let wanted = device.to_av();
            supported.iter().copied().find(|&candidate| candidate == wanted)
        }
    };

    let Some(device_type) = chosen else {
        if mode != HardwareAccelerationMode::Software {
            log::debug!("No hardware decoder available for {mode:?}, decoding in software");
        }
        return Ok((codec_context.decoder().video()?, false));
    };

    let device_context = match create_device_context(device_type) {
        Ok(device_context) => device_context,
        Err(error) => {
            log::warn!("{error}; falling back to software decoding");
            return Ok((codec_context.decoder().video()?, false));
        }
    };

    // The codec context takes its own reference; ours is released below.
    unsafe {
        let context = codec_context.as_ptr() as *mut AVCodecContext;
        (*context).hw_device_ctx = ffmpeg_sys_next::av_buffer_ref(device_context);
    }
    let decoder = codec_context.decoder().video();
    unsafe {
        let mut reference = device_context;
        ffmpeg_sys_next::av_buffer_unref(&mut reference);
    }

    log::debug!("Decoding on hardware device {device_type:?}");
    Ok((decoder?, true))
}

/// Copy a GPU surface into a system-memory frame.
///
/// Returns `None` when `frame` is already in system memory (or the transfer
/// is not possible), in which case the caller keeps using `frame`.
pub(crate) fn download_frame(frame: &VideoFrame) -> Option<VideoFrame> {
    let mut software_frame = VideoFrame::empty();
    let result = unsafe {
        ffmpeg_sys_next::av_hwframe_transfer_data(software_frame.as_mut_ptr(), frame.as_ptr(), 0)
    };
    if result < 0 {
        return None;
    }

    unsafe {
        (*software_frame.as_mut_ptr()).pts = (*frame.as_ptr()).pts;
        (*software_frame.as_mut_ptr()).best_effort_timestamp =
            (*frame.as_ptr()).best_effort_timestamp;
    }
    Some(software_frame)
}

/// Device types the codec can decode on through a device context.
fn supported_device_types(codec_context: &CodecContext) -> Vec<AVHWDeviceType> {
    let codec = unsafe { (*codec_context.as_ptr()).codec };
    if codec.is_null() {
        return Vec::new();
    }

    let mut device_types = Vec::new();
    for index in 0.. {
        let config = unsafe { ffmpeg_sys_next::avcodec_get_hw_config(codec, index) };
        if config.is_null() {
            break;
        }
        let (methods, device_type) = unsafe { ((*config).methods, (*config).device_type) };
        if methods & (AV_CODEC_HW_CONFIG_METHOD_HW_DEVICE_CTX as i32) != 0
            && device_type != AVHWDeviceType::AV_HWDEVICE_TYPE_NONE
        {
            device_types.push(device_type);
        }
    }
    device_types
}

/// Create a device context; the returned buffer must be released with
/// `av_buffer_unref`.
fn create_device_context(device_type: AVHWDeviceType) -> Result<*mut AVBufferRef, FrameSeekError> {
    let mut device_context: *mut AVBufferRef = ptr::null_mut();
    let result = unsafe {
        ffmpeg_sys_next::av_hwdevice_ctx_create(
            &mut device_context,
            device_type,
            ptr::null(),
            ptr::null_mut(),
            0,
        )
    };

    if result < 0 {
        Err(FrameSeekError::Decode(format!(
            "failed to create {device_type:?} device context (result={result})"
        )))
    } else {
        Ok(device_context)
    }
}
