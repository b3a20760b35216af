use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video as VideoFrame;

use crate::muxing::domain::media_stream::{MediaStream, WriteOutcome};
use crate::muxing::infrastructure::ffmpeg_container::{FfmpegContainer, StreamTarget};
use crate::muxing::infrastructure::mux_error::MuxError;
use crate::shared::constants::MPEG2_MAX_B_FRAMES;
use crate::shared::frame::Frame;
use crate::shared::mux_settings::MuxSettings;
use crate::shared::presentation_clock::PresentationClock;
use crate::shared::stream_kind::StreamKind;
use crate::synthesis::domain::pattern_generator::PatternGenerator;

/// Pattern generator's native pixel layout.
const NATIVE_FORMAT: Pixel = Pixel::RGB24;

/// Encodes the synthetic test pattern into the container's video stream.
///
/// Frames are painted as RGB24 and scaled to the codec's pixel format.
/// The scaler is only built when the first frame needs it.
pub struct FfmpegVideoStream {
    encoder: ffmpeg_next::codec::encoder::video::Encoder,
    scaler: Option<scaling::Context>,
    target: StreamTarget,
    picture: Frame,
    pixel_format: Pixel,
    clock: PresentationClock,
}

impl FfmpegVideoStream {
    /// Adds a video stream for `codec_id` and opens its encoder.
    pub fn open(
        container: &mut FfmpegContainer,
        codec_id: ffmpeg_next::codec::Id,
        settings: &MuxSettings,
    ) -> Result<Self, MuxError> {
        let kind = StreamKind::Video;
        let codec =
            ffmpeg_next::encoder::find(codec_id).ok_or_else(|| MuxError::EncoderNotFound {
                kind,
                codec: codec_id.name().to_string(),
            })?;

        let index = container.add_stream(kind, codec)?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .map_err(|source| MuxError::Stream { kind, source })?;

        // Timebase is one tick per frame: 100/2997 for 29.97 fps.
        let time_base = ffmpeg_next::Rational(settings.frame_rate_den, settings.frame_rate_num);
        let pixel_format = Pixel::YUV420P;

        encoder_ctx.set_bit_rate(settings.video_bit_rate);
        encoder_ctx.set_width(settings.width);
        encoder_ctx.set_height(settings.height);
        encoder_ctx.set_time_base(time_base);
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(
            settings.frame_rate_num,
            settings.frame_rate_den,
        )));
        encoder_ctx.set_gop(settings.gop_size);
        encoder_ctx.set_format(pixel_format);
        match codec_id {
            ffmpeg_next::codec::Id::MPEG2VIDEO => {
                encoder_ctx.set_max_b_frames(MPEG2_MAX_B_FRAMES);
            }
            ffmpeg_next::codec::Id::MPEG1VIDEO => {
                // Avoids macroblocks whose coefficients overflow when the
                // chroma motion does not follow the luma.
                encoder_ctx.set_mb_decision(ffmpeg_next::codec::encoder::Decision::RateDistortion);
            }
            _ => {}
        }
        if container.needs_global_header() {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx
            .open_with(ffmpeg_next::Dictionary::new())
            .map_err(|source| MuxError::CodecOpen { kind, source })?;
        container.configure_stream(index, &encoder, time_base);

        log::debug!(
            "Video stream {index}: {} {}x{} {:?}, gop {}",
            codec.name(),
            settings.width,
            settings.height,
            pixel_format,
            settings.gop_size
        );

        Ok(Self {
            encoder,
            scaler: None,
            target: StreamTarget::new(kind, index, time_base),
            picture: Frame::black(settings.width, settings.height),
            pixel_format,
            clock: PresentationClock::new(
                settings.frame_rate_num as u64,
                settings.frame_rate_den as u64,
            ),
        })
    }

    pub fn stream_index(&self) -> usize {
        self.target.index()
    }

    /// Paints the next pattern frame and converts it to the codec format.
    fn next_frame(&mut self) -> Result<VideoFrame, MuxError> {
        let frame_index = self.clock.units() as usize;
        PatternGenerator::fill(&mut self.picture, frame_index);

        let width = self.picture.width();
        let height = self.picture.height();

        let mut rgb_frame = VideoFrame::new(NATIVE_FORMAT, width, height);
        let stride = rgb_frame.stride(0);
        let row_bytes = self.picture.row_bytes();
        let data = rgb_frame.data_mut(0);

        // Copy pixel data, respecting stride
        for row in 0..height as usize {
            let dst_start = row * stride;
            data[dst_start..dst_start + row_bytes].copy_from_slice(self.picture.row(row));
        }

        let mut frame = if self.pixel_format == NATIVE_FORMAT {
            rgb_frame
        } else {
            let scaler = match self.scaler.take() {
                Some(scaler) => scaler,
                None => scaling::Context::get(
                    NATIVE_FORMAT,
                    width,
                    height,
                    self.pixel_format,
                    width,
                    height,
                    scaling::Flags::BICUBIC,
                )
                .map_err(|source| MuxError::Converter {
                    kind: StreamKind::Video,
                    source,
                })?,
            };
            let scaler = self.scaler.insert(scaler);
            let mut converted = VideoFrame::empty();
            scaler
                .run(&rgb_frame, &mut converted)
                .map_err(|source| MuxError::Convert {
                    kind: StreamKind::Video,
                    source,
                })?;
            converted
        };

        frame.set_pts(Some(frame_index as i64));
        Ok(frame)
    }
}

impl MediaStream<FfmpegContainer> for FfmpegVideoStream {
    fn kind(&self) -> StreamKind {
        StreamKind::Video
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
        let outcome = self.target.encode(&mut self.encoder, &frame, sink)?;
        self.clock.advance(1);
        Ok(outcome)
    }
}
