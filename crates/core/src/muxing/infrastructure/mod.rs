pub mod ffmpeg_audio_stream;
pub mod ffmpeg_container;
pub mod ffmpeg_probe;
pub mod ffmpeg_video_stream;
pub mod mux_error;
