use ffmpeg_next::Rescale;
use ffmpeg_next::format::Sample;
use ffmpeg_next::format::sample::Type as SampleType;
use ffmpeg_next::util::frame::audio::Audio as AudioFrame;

use crate::muxing::domain::media_stream::{MediaStream, WriteOutcome};
use crate::muxing::infrastructure::ffmpeg_container::{FfmpegContainer, StreamTarget};
use crate::muxing::infrastructure::mux_error::MuxError;
use crate::shared::audio_block::AudioBlock;
use crate::shared::constants::FALLBACK_AUDIO_FRAME_SIZE;
use crate::shared::mux_settings::MuxSettings;
use crate::shared::presentation_clock::PresentationClock;
use crate::shared::stream_kind::StreamKind;
use crate::synthesis::domain::tone_generator::ToneGenerator;

/// Tone generator's native sample layout.
const NATIVE_FORMAT: Sample = Sample::I16(SampleType::Packed);

/// Encodes the synthetic tone into the container's audio stream.
///
/// Samples are generated as packed S16; when the codec wants another
/// format a resampler is built up front and every block goes through it.
pub struct FfmpegAudioStream {
    encoder: ffmpeg_next::codec::encoder::audio::Encoder,
    resampler: Option<ffmpeg_next::software::resampling::Context>,
    target: StreamTarget,
    generator: ToneGenerator,
    block: AudioBlock,
    channel_layout: ffmpeg_next::ChannelLayout,
    clock: PresentationClock,
}

impl FfmpegAudioStream {
    /// Adds an audio stream for `codec_id`, opens its encoder and primes
    /// the scratch buffer and resampler.
    pub fn open(
        container: &mut FfmpegContainer,
        codec_id: ffmpeg_next::codec::Id,
        settings: &MuxSettings,
    ) -> Result<Self, MuxError> {
        let kind = StreamKind::Audio;
        let codec =
            ffmpeg_next::encoder::find(codec_id).ok_or_else(|| MuxError::EncoderNotFound {
                kind,
                codec: codec_id.name().to_string(),
            })?;

        let index = container.add_stream(kind, codec)?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .audio()
            .map_err(|source| MuxError::Stream { kind, source })?;

        let channel_layout = channel_layout(settings.channels);
        let time_base = ffmpeg_next::Rational(1, settings.sample_rate as i32);

        encoder_ctx.set_format(preferred_format(codec));
        encoder_ctx.set_bit_rate(settings.audio_bit_rate);
        encoder_ctx.set_rate(settings.sample_rate as i32);
        encoder_ctx.set_channel_layout(channel_layout);
        encoder_ctx.set_time_base(time_base);
        if container.needs_global_header() {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx
            .open_as(codec)
            .map_err(|source| MuxError::CodecOpen { kind, source })?;
        container.configure_stream(index, &encoder, time_base);

        let frame_size = match encoder.frame_size() as usize {
            0 => FALLBACK_AUDIO_FRAME_SIZE,
            n => n,
        };

        let resampler = if encoder.format() != NATIVE_FORMAT {
            let resampler = ffmpeg_next::software::resampling::Context::get(
                NATIVE_FORMAT,
                channel_layout,
                settings.sample_rate,
                encoder.format(),
                channel_layout,
                settings.sample_rate,
            )
            .map_err(|source| MuxError::Converter { kind, source })?;
            Some(resampler)
        } else {
            None
        };

        log::debug!(
            "Audio stream {index}: {} {:?}, {frame_size} samples/frame, resampling: {}",
            codec.name(),
            encoder.format(),
            resampler.is_some()
        );

        Ok(Self {
            encoder,
            resampler,
            target: StreamTarget::new(kind, index, time_base),
            generator: ToneGenerator::new(settings.sample_rate, settings.tone_base_hz),
            block: AudioBlock::silent(frame_size, settings.sample_rate, settings.channels),
            channel_layout,
            clock: PresentationClock::new(settings.sample_rate as u64, 1),
        })
    }

    /// Samples per channel handed to the encoder each step.
    pub fn frame_size(&self) -> usize {
        self.block.frames()
    }

    pub fn stream_index(&self) -> usize {
        self.target.index()
    }

    /// Builds the next encoder input: a tone block in the codec's format
    /// with its pts set.
    fn next_frame(&mut self) -> Result<AudioFrame, MuxError> {
        self.generator.fill(&mut self.block);

        let samples = self.block.frames();
        let mut native = AudioFrame::new(NATIVE_FORMAT, samples, self.channel_layout);
        native.set_rate(self.block.sample_rate());
        let bytes = self.block.as_bytes();
        native.data_mut(0)[..bytes.len()].copy_from_slice(bytes);

        let mut frame = match self.resampler.as_mut() {
            Some(resampler) => {
                let mut converted = AudioFrame::empty();
                resampler
                    .run(&native, &mut converted)
                    .map_err(|source| MuxError::Convert {
                        kind: StreamKind::Audio,
                        source,
                    })?;
                converted
            }
            None => native,
        };

        let pts = (self.clock.units() as i64).rescale(
            ffmpeg_next::Rational(1, self.block.sample_rate() as i32),
            self.target.codec_time_base(),
        );
        frame.set_pts(Some(pts));
        Ok(frame)
    }
}

impl MediaStream<FfmpegContainer> for FfmpegAudioStream {
    fn kind(&self) -> StreamKind {
        StreamKind::Audio
    }

    fn presentation_time(&self) -> f64 {
        self.clock.seconds()
    }

    fn units_submitted(&self) -> u64 {
        self.clock.units()
    }

    fn write_next(
        &mut self,
        sink: &mut FfmpegContainer,
        flushing: bool,
    ) -> Result<WriteOutcome, Box<dyn std::error::Error>> {
        if flushing {
            return Ok(self.target.drain_one(&mut self.encoder, sink)?);
        }

        let frame = self.next_frame()?;
        let samples = frame.samples() as u64;
        let outcome = self.target.encode(&mut self.encoder, &frame, sink)?;
        self.clock.advance(samples);
        Ok(outcome)
    }
}

fn channel_layout(channels: u16) -> ffmpeg_next::ChannelLayout {
    if channels == 1 {
        ffmpeg_next::ChannelLayout::MONO
    } else {
        ffmpeg_next::ChannelLayout::STEREO
    }
}

/// The codec's first supported sample format, or planar float when the
/// codec does not list any.
fn preferred_format(codec: ffmpeg_next::Codec) -> Sample {
    codec
        .audio()
        .ok()
        .and_then(|audio| audio.formats())
        .and_then(|mut formats| formats.next())
        .unwrap_or(Sample::F32(SampleType::Planar))
}
