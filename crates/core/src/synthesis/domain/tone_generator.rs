use std::f64::consts::PI;

use crate::shared::audio_block::AudioBlock;
use crate::shared::constants::TONE_AMPLITUDE;

/// Sine sweep whose pitch starts at `base_hz` and rises by `base_hz`
/// every second.
///
/// The same value is written to every channel of a sample. State carries
/// over between calls, so consecutive blocks join without a phase jump.
pub struct ToneGenerator {
    phase: f64,
    step: f64,
    step_increment: f64,
}

impl ToneGenerator {
    pub fn new(sample_rate: u32, base_hz: f64) -> Self {
        let rate = sample_rate as f64;
        Self {
            phase: 0.0,
            step: 2.0 * PI * base_hz / rate,
            step_increment: 2.0 * PI * base_hz / rate / rate,
        }
    }

    /// Overwrites the whole block with the next samples of the sweep.
    pub fn fill(&mut self, block: &mut AudioBlock) {
        let channels = block.channels() as usize;
        for frame in block.samples_mut().chunks_exact_mut(channels) {
            let value = (self.phase.sin() * TONE_AMPLITUDE) as i16;
            frame.fill(value);
            self.phase += self.step;
            self.step += self.step_increment;
        }
    }
}
