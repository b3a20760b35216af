use crate::shared::stream_kind::StreamKind;

/// The decision for one loop iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    pub kind: StreamKind,
    pub flushing: bool,
}

/// Greedy earliest-time-first choice between the audio and video streams.
///
/// Callers pass each stream's presentation time, or `None` when the stream
/// is absent or finished; `None` behaves as +infinity. Once every remaining
/// stream has reached the target duration the scheduler switches to
/// flushing and stays there.
#[derive(Debug)]
pub struct InterleaveScheduler {
    target_secs: f64,
    flushing: bool,
}

impl InterleaveScheduler {
    pub fn new(target_secs: f64) -> Self {
        Self {
            target_secs,
            flushing: false,
        }
    }

    /// Returns the stream to step next, or `None` when both are done.
    pub fn next(&mut self, audio: Option<f64>, video: Option<f64>) -> Option<Step> {
        if audio.is_none() && video.is_none() {
            return None;
        }

        let target = self.target_secs;
        let reached = |time: Option<f64>| time.map_or(true, |t| t >= target);
        if !self.flushing && reached(audio) && reached(video) {
            self.flushing = true;
        }

        let audio_time = audio.unwrap_or(f64::INFINITY);
        let video_time = video.unwrap_or(f64::INFINITY);
        // Ties go to audio.
        let kind = if audio.is_some() && audio_time <= video_time {
            StreamKind::Audio
        } else {
            StreamKind::Video
        };

        Some(Step {
            kind,
            flushing: self.flushing,
        })
    }
}
