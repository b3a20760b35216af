pub mod muxing;
pub mod pipeline;
pub mod shared;
pub mod synthesis;
