/// A block of raw audio: interleaved signed 16-bit PCM.
///
/// This is the tone generator's native layout and the audio stream's
/// scratch buffer; it is refilled in place for every encoder frame.
#[derive(Clone, Debug)]
pub struct AudioBlock {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl AudioBlock {
    /// Allocates a silent block holding `frames` samples per channel.
    pub fn silent(frames: usize, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples: vec![0; frames * channels as usize],
            sample_rate,
            channels,
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [i16] {
        &mut self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Samples per channel.
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Native-endian byte view, as FFmpeg expects for packed S16.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_block_layout() {
        let block = AudioBlock::silent(1152, 48000, 2);
        assert_eq!(block.samples().len(), 2304);
        assert_eq!(block.frames(), 1152);
        assert_eq!(block.channels(), 2);
        assert_eq!(block.sample_rate(), 48000);
        assert!(block.samples().iter().all(|&s| s == 0));
    }

    #[test]
    fn test_as_bytes_is_two_bytes_per_sample() {
        let mut block = AudioBlock::silent(4, 48000, 1);
        block.samples_mut()[1] = 0x0102;
        let bytes = block.as_bytes();
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[2..4], &0x0102i16.to_ne_bytes());
    }
}
