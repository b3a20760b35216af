use std::path::Path;
use std::time::Instant;

use crate::muxing::domain::media_stream::MediaStream;
use crate::muxing::infrastructure::ffmpeg_audio_stream::FfmpegAudioStream;
use crate::muxing::infrastructure::ffmpeg_container::FfmpegContainer;
use crate::muxing::infrastructure::ffmpeg_video_stream::FfmpegVideoStream;
use crate::muxing::infrastructure::mux_error::MuxError;
use crate::pipeline::interleaved_writer::{InterleavedWriter, WriteSummary};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::mux_settings::MuxSettings;
use crate::shared::stream_kind::StreamKind;

/// What a finished run produced.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthesisOutcome {
    pub format_name: String,
    pub write: WriteSummary,
    /// Samples per audio frame the encoder asked for, if there is audio.
    pub audio_frame_size: Option<usize>,
}

/// Writes a synthetic test pattern and tone into one container file.
pub struct SynthesizeUseCase {
    settings: MuxSettings,
    logger: Box<dyn PipelineLogger>,
}

impl SynthesizeUseCase {
    pub fn new(settings: MuxSettings, logger: Box<dyn PipelineLogger>) -> Self {
        Self { settings, logger }
    }

    pub fn execute(
        &mut self,
        output: &Path,
    ) -> Result<SynthesisOutcome, Box<dyn std::error::Error>> {
        self.settings.validate()?;

        // 1. Setup: container, streams, codecs
        let setup_start = Instant::now();
        ffmpeg_next::init().map_err(MuxError::Init)?;
        ffmpeg_next::log::set_level(ffmpeg_next::log::Level::Warning);

        let mut container = FfmpegContainer::create(output)?;
        let format_name = container.format_name();

        let video_codec = container.default_codec(StreamKind::Video);
        let audio_codec = container.default_codec(StreamKind::Audio);

        let mut video = if video_codec != ffmpeg_next::codec::Id::None {
            Some(FfmpegVideoStream::open(
                &mut container,
                video_codec,
                &self.settings,
            )?)
        } else {
            log::warn!("{format_name} has no default video codec, skipping video");
            None
        };
        let mut audio = if audio_codec != ffmpeg_next::codec::Id::None {
            Some(FfmpegAudioStream::open(
                &mut container,
                audio_codec,
                &self.settings,
            )?)
        } else {
            log::warn!("{format_name} has no default audio codec, skipping audio");
            None
        };
        let audio_frame_size = audio.as_ref().map(FfmpegAudioStream::frame_size);

        container.dump();
        container.write_header()?;
        self.logger.timing("setup", elapsed_ms(setup_start));
        self.logger.info(&format!(
            "Writing {:.1}s to {} ({format_name})",
            self.settings.duration_secs,
            output.display()
        ));

        // 2. Interleave until both streams reach the duration, then drain
        let encode_start = Instant::now();
        let write = {
            let mut writer =
                InterleavedWriter::new(self.settings.duration_secs, self.logger.as_mut());
            writer.run(
                &mut container,
                audio
                    .as_mut()
                    .map(|s| s as &mut dyn MediaStream<FfmpegContainer>),
                video
                    .as_mut()
                    .map(|s| s as &mut dyn MediaStream<FfmpegContainer>),
            )?
        };
        self.logger.timing("encode", elapsed_ms(encode_start));

        // 3. Teardown: the trailer needs the encoders still alive
        let teardown_start = Instant::now();
        container.write_trailer()?;
        drop(audio);
        drop(video);
        drop(container);
        self.logger.timing("teardown", elapsed_ms(teardown_start));
        self.logger.summary();

        Ok(SynthesisOutcome {
            format_name,
            write,
            audio_frame_size,
        })
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::muxing::infrastructure::ffmpeg_probe::probe;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::mux_settings::SettingsError;
    use approx::assert_abs_diff_eq;

    /// Default timing and audio, small picture to keep encoding quick.
    fn small_settings() -> MuxSettings {
        MuxSettings {
            width: 160,
            height: 120,
            ..MuxSettings::default()
        }
    }

    #[test]
    fn test_writes_expected_frame_and_sample_counts() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.avi");
        let settings = small_settings();
        let mut use_case =
            SynthesizeUseCase::new(settings.clone(), Box::new(NullPipelineLogger));

        let outcome = use_case.execute(&output).unwrap();

        assert_eq!(outcome.format_name, "avi");
        assert_eq!(outcome.write.video_units, 150);
        assert_eq!(outcome.write.video_units, settings.expected_video_frames());
        let frame_size = outcome.audio_frame_size.unwrap();
        assert_eq!(
            outcome.write.audio_units,
            settings.expected_audio_samples(frame_size)
        );
    }

    /// Records every packet event so the real schedule can be checked.
    struct RecordingLogger {
        events: Rc<RefCell<Vec<(StreamKind, f64)>>>,
    }

    impl PipelineLogger for RecordingLogger {
        fn packets(&mut self, kind: StreamKind, _packets: usize, presentation_secs: f64) {
            self.events.borrow_mut().push((kind, presentation_secs));
        }
        fn timing(&mut self, _phase: &str, _duration_ms: f64) {}
        fn info(&mut self, _message: &str) {}
    }

    #[test]
    fn test_written_file_is_well_formed() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.avi");
        let settings = small_settings();
        let mut use_case =
            SynthesizeUseCase::new(settings.clone(), Box::new(NullPipelineLogger));
        let outcome = use_case.execute(&output).unwrap();
        let frame_size = outcome.audio_frame_size.unwrap();

        let report = probe(&output).unwrap();
        let video = report.stream(StreamKind::Video).unwrap();
        let audio = report.stream(StreamKind::Audio).unwrap();

        assert_eq!(video.packets, 150);
        assert_eq!(video.packets, outcome.write.video_packets);
        assert_eq!(audio.packets, outcome.write.audio_packets);
        assert!(video.monotonic_dts);
        assert!(audio.monotonic_dts);

        // Encoders with priming or padding (LAME adds one frame) may emit
        // more packets than frames submitted, never fewer.
        let expected_audio_frames = 240_000usize.div_ceil(frame_size);
        assert_eq!(
            outcome.write.audio_units,
            (expected_audio_frames * frame_size) as u64
        );
        assert!(audio.packets >= expected_audio_frames);
        assert!(audio.packets <= expected_audio_frames + 1);

        let video_frame_secs = 1.0 / settings.frame_rate();
        let audio_frame_secs = frame_size as f64 / f64::from(settings.sample_rate);
        assert_abs_diff_eq!(
            video.end_secs,
            settings.duration_secs,
            epsilon = video_frame_secs
        );
        assert_abs_diff_eq!(
            audio.end_secs,
            settings.duration_secs,
            epsilon = 2.0 * audio_frame_secs
        );
        let duration = report.duration_secs.unwrap();
        assert_abs_diff_eq!(
            duration,
            settings.duration_secs,
            epsilon = video_frame_secs.max(2.0 * audio_frame_secs)
        );
    }

    #[test]
    fn test_real_streams_stay_interleaved() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.avi");
        let settings = small_settings();
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut use_case = SynthesizeUseCase::new(
            settings.clone(),
            Box::new(RecordingLogger {
                events: Rc::clone(&events),
            }),
        );
        let outcome = use_case.execute(&output).unwrap();
        let frame_size = outcome.audio_frame_size.unwrap();

        let video_frame_secs = 1.0 / settings.frame_rate();
        let audio_frame_secs = frame_size as f64 / f64::from(settings.sample_rate);
        let slow_frame = video_frame_secs.max(audio_frame_secs);

        let events = events.borrow();
        assert!(events.iter().any(|(kind, _)| *kind == StreamKind::Audio));
        assert!(events.iter().any(|(kind, _)| *kind == StreamKind::Video));

        let mut audio_secs = 0.0;
        let mut video_secs = 0.0;
        for (kind, secs) in events.iter() {
            match kind {
                StreamKind::Audio => audio_secs = *secs,
                StreamKind::Video => video_secs = *secs,
            }
            let gap: f64 = audio_secs - video_secs;
            assert!(
                gap.abs() <= slow_frame + 1e-9,
                "streams drifted apart by {gap}s"
            );
        }
    }

    #[test]
    fn test_unknown_extension_falls_back_to_avi() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.notaformat");
        let mut use_case = SynthesizeUseCase::new(
            MuxSettings {
                duration_secs: 0.2,
                ..small_settings()
            },
            Box::new(NullPipelineLogger),
        );

        let outcome = use_case.execute(&output).unwrap();
        assert_eq!(outcome.format_name, "avi");
        assert!(output.exists());
    }

    #[test]
    fn test_invalid_settings_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.avi");
        let mut use_case = SynthesizeUseCase::new(
            MuxSettings {
                width: 161,
                ..small_settings()
            },
            Box::new(NullPipelineLogger),
        );

        let err = use_case.execute(&output).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SettingsError>(),
            Some(&SettingsError::FrameSize {
                width: 161,
                height: 120
            })
        );
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_directory_is_a_container_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("out.avi");
        let mut use_case =
            SynthesizeUseCase::new(small_settings(), Box::new(NullPipelineLogger));

        let err = use_case.execute(&output).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MuxError>(),
            Some(MuxError::Container { .. })
        ));
    }
}
