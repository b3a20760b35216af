use crate::muxing::domain::interleave_scheduler::InterleaveScheduler;
use crate::muxing::domain::media_stream::{MediaStream, WriteOutcome};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::stream_kind::StreamKind;

/// Totals for one run of the interleaving loop.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteSummary {
    pub steps: usize,
    pub audio_packets: usize,
    pub video_packets: usize,
    /// Samples per channel generated for the audio stream.
    pub audio_units: u64,
    /// Frames generated for the video stream.
    pub video_units: u64,
    pub audio_secs: f64,
    pub video_secs: f64,
}

/// A stream plus whether its encoder has been fully drained.
struct Slot<'a, S> {
    stream: &'a mut dyn MediaStream<S>,
    finished: bool,
}

impl<'a, S> Slot<'a, S> {
    fn new(stream: Option<&'a mut dyn MediaStream<S>>) -> Option<Self> {
        stream.map(|stream| Self {
            stream,
            finished: false,
        })
    }

    /// Presentation time while the stream is still active.
    fn active_time(&self) -> Option<f64> {
        (!self.finished).then(|| self.stream.presentation_time())
    }
}

/// Drives up to two media streams into one sink in presentation order.
///
/// Each iteration steps exactly one stream: whichever is behind, audio on
/// ties. When both have reached the target duration no more input is
/// generated and each encoder is drained until it reports empty; a drained
/// stream is never stepped again.
pub struct InterleavedWriter<'a> {
    target_secs: f64,
    logger: &'a mut dyn PipelineLogger,
}

impl<'a> InterleavedWriter<'a> {
    pub fn new(target_secs: f64, logger: &'a mut dyn PipelineLogger) -> Self {
        Self {
            target_secs,
            logger,
        }
    }

    pub fn run<S>(
        &mut self,
        sink: &mut S,
        audio: Option<&mut dyn MediaStream<S>>,
        video: Option<&mut dyn MediaStream<S>>,
    ) -> Result<WriteSummary, Box<dyn std::error::Error>> {
        let mut audio = Slot::new(audio);
        let mut video = Slot::new(video);
        let mut scheduler = InterleaveScheduler::new(self.target_secs);
        let mut summary = WriteSummary::default();
        let mut announced_flush = false;

        loop {
            let audio_time = audio.as_ref().and_then(Slot::active_time);
            let video_time = video.as_ref().and_then(Slot::active_time);
            let Some(step) = scheduler.next(audio_time, video_time) else {
                break;
            };

            if step.flushing && !announced_flush {
                self.logger.flushing();
                announced_flush = true;
            }

            let slot = match step.kind {
                StreamKind::Audio => audio.as_mut(),
                StreamKind::Video => video.as_mut(),
            };
            let Some(slot) = slot else {
                break;
            };

            summary.steps += 1;
            match slot.stream.write_next(sink, step.flushing)? {
                WriteOutcome::Submitted { packets } => {
                    match step.kind {
                        StreamKind::Audio => summary.audio_packets += packets,
                        StreamKind::Video => summary.video_packets += packets,
                    }
                    self.logger
                        .packets(step.kind, packets, slot.stream.presentation_time());
                }
                WriteOutcome::Drained => {
                    log::debug!("{} stream drained", step.kind);
                    slot.finished = true;
                }
            }
        }

        if let Some(slot) = &audio {
            summary.audio_units = slot.stream.units_submitted();
            summary.audio_secs = slot.stream.presentation_time();
        }
        if let Some(slot) = &video {
            summary.video_units = slot.stream.units_submitted();
            summary.video_secs = slot.stream.presentation_time();
        }
        Ok(summary)
    }
}
