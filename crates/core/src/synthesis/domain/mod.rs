pub mod pattern_generator;
pub mod tone_generator;
