pub mod audio_block;
pub mod constants;
pub mod frame;
pub mod mux_settings;
pub mod presentation_clock;
pub mod stream_kind;
