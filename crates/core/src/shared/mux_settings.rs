use thiserror::Error;

use crate::shared::constants::{
    AUDIO_BIT_RATE, AUDIO_CHANNELS, AUDIO_SAMPLE_RATE, FRAME_RATE_DEN, FRAME_RATE_NUM,
    STREAM_DURATION_SECS, TONE_BASE_HZ, VIDEO_BIT_RATE, VIDEO_GOP_SIZE, VIDEO_HEIGHT, VIDEO_WIDTH,
};

#[derive(Error, Debug, PartialEq)]
pub enum SettingsError {
    #[error("duration must be positive, got {0}")]
    Duration(f64),
    #[error("frame size must be positive and even, got {width}x{height}")]
    FrameSize { width: u32, height: u32 },
    #[error("frame rate must be positive, got {num}/{den}")]
    FrameRate { num: i32, den: i32 },
    #[error("sample rate must be positive")]
    SampleRate,
    #[error("audio must be mono or stereo, got {0} channels")]
    Channels(u16),
}

/// Everything the writer needs to know about the file it synthesizes.
///
/// `Default` is the fixed demo configuration; other values exist so tests
/// can write short, small files.
#[derive(Clone, Debug, PartialEq)]
pub struct MuxSettings {
    pub duration_secs: f64,
    pub width: u32,
    pub height: u32,
    pub frame_rate_num: i32,
    pub frame_rate_den: i32,
    pub video_bit_rate: usize,
    pub gop_size: u32,
    pub sample_rate: u32,
    pub channels: u16,
    pub audio_bit_rate: usize,
    pub tone_base_hz: f64,
}

impl Default for MuxSettings {
    fn default() -> Self {
        Self {
            duration_secs: STREAM_DURATION_SECS,
            width: VIDEO_WIDTH,
            height: VIDEO_HEIGHT,
            frame_rate_num: FRAME_RATE_NUM,
            frame_rate_den: FRAME_RATE_DEN,
            video_bit_rate: VIDEO_BIT_RATE,
            gop_size: VIDEO_GOP_SIZE,
            sample_rate: AUDIO_SAMPLE_RATE,
            channels: AUDIO_CHANNELS,
            audio_bit_rate: AUDIO_BIT_RATE,
            tone_base_hz: TONE_BASE_HZ,
        }
    }
}

impl MuxSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.duration_secs > 0.0) {
            return Err(SettingsError::Duration(self.duration_secs));
        }
        // YUV420P chroma subsampling needs even dimensions.
        if self.width == 0 || self.height == 0 || self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(SettingsError::FrameSize {
                width: self.width,
                height: self.height,
            });
        }
        if self.frame_rate_num <= 0 || self.frame_rate_den <= 0 {
            return Err(SettingsError::FrameRate {
                num: self.frame_rate_num,
                den: self.frame_rate_den,
            });
        }
        if self.sample_rate == 0 {
            return Err(SettingsError::SampleRate);
        }
        if self.channels == 0 || self.channels > 2 {
            return Err(SettingsError::Channels(self.channels));
        }
        Ok(())
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate_num as f64 / self.frame_rate_den as f64
    }

    /// Frames the video stream generates before flushing.
    pub fn expected_video_frames(&self) -> u64 {
        (self.duration_secs * self.frame_rate()).ceil() as u64
    }

    /// Samples per channel the audio stream generates before flushing,
    /// rounded up to whole encoder frames of `frame_size` samples.
    pub fn expected_audio_samples(&self, frame_size: usize) -> u64 {
        let total = (self.duration_secs * self.sample_rate as f64).ceil() as u64;
        let frame_size = frame_size.max(1) as u64;
        total.div_ceil(frame_size) * frame_size
    }
}
