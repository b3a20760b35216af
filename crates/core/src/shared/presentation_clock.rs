/// Elapsed presentation time of one stream, counted in whole units.
///
/// Audio counts samples per channel, video counts frames. The unit rate is
/// kept as a rational (`rate_num / rate_den` units per second) so 29.97 fps
/// does not accumulate float drift.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PresentationClock {
    units: u64,
    rate_num: u64,
    rate_den: u64,
}

impl PresentationClock {
    pub fn new(rate_num: u64, rate_den: u64) -> Self {
        debug_assert!(rate_num > 0 && rate_den > 0, "clock rate must be positive");
        Self {
            units: 0,
            rate_num,
            rate_den,
        }
    }

    pub fn advance(&mut self, units: u64) {
        self.units += units;
    }

    pub fn units(&self) -> u64 {
        self.units
    }

    pub fn seconds(&self) -> f64 {
        (self.units * self.rate_den) as f64 / self.rate_num as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_starts_at_zero() {
        let clock = PresentationClock::new(48000, 1);
        assert_eq!(clock.units(), 0);
        assert_eq!(clock.seconds(), 0.0);
    }

    #[test]
    fn test_audio_clock_counts_samples() {
        let mut clock = PresentationClock::new(48000, 1);
        clock.advance(24000);
        clock.advance(24000);
        assert_relative_eq!(clock.seconds(), 1.0);
    }

    #[test]
    fn test_ntsc_video_clock() {
        let mut clock = PresentationClock::new(2997, 100);
        clock.advance(2997);
        assert_relative_eq!(clock.seconds(), 100.0);
    }

    #[test]
    fn test_never_decreases() {
        let mut clock = PresentationClock::new(30, 1);
        let mut last = clock.seconds();
        for step in [0, 1, 0, 5, 2] {
            clock.advance(step);
            assert!(clock.seconds() >= last);
            last = clock.seconds();
        }
    }
}
