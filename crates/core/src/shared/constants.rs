/// Output file written when no path is given.
pub const DEFAULT_OUTPUT_FILE: &str = "test.avi";

/// Container used when the output extension does not identify one.
pub const FALLBACK_CONTAINER: &str = "avi";

pub const STREAM_DURATION_SECS: f64 = 5.0;

/// 29.97 fps, kept as an exact rational.
pub const FRAME_RATE_NUM: i32 = 2997;
pub const FRAME_RATE_DEN: i32 = 100;

pub const VIDEO_WIDTH: u32 = 1280;
pub const VIDEO_HEIGHT: u32 = 720;
pub const VIDEO_BIT_RATE: usize = 8_000_000;

/// Emit one intra frame every twelve frames at most.
pub const VIDEO_GOP_SIZE: u32 = 12;

/// B-frames used when the container picks MPEG-2 video.
pub const MPEG2_MAX_B_FRAMES: usize = 2;

pub const AUDIO_SAMPLE_RATE: u32 = 48_000;
pub const AUDIO_CHANNELS: u16 = 2;
pub const AUDIO_BIT_RATE: usize = 160_000;

/// Samples per channel per frame for codecs that accept any frame size.
pub const FALLBACK_AUDIO_FRAME_SIZE: usize = 1024;

/// Starting pitch of the tone, also its rise in Hz per second.
pub const TONE_BASE_HZ: f64 = 110.0;
pub const TONE_AMPLITUDE: f64 = 10_000.0;
