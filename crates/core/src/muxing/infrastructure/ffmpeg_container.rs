use std::ffi::CString;
use std::path::{Path, PathBuf};

use crate::muxing::domain::media_stream::WriteOutcome;
use crate::muxing::infrastructure::mux_error::MuxError;
use crate::shared::constants::FALLBACK_CONTAINER;
use crate::shared::stream_kind::StreamKind;

/// Output file plus the libavformat muxer writing it.
///
/// Lifecycle is strictly: [`create`](Self::create), add streams,
/// [`write_header`](Self::write_header), write packets,
/// [`write_trailer`](Self::write_trailer). Stream timebases are only final
/// after the header is written, so they are captured there.
pub struct FfmpegContainer {
    path: PathBuf,
    octx: ffmpeg_next::format::context::Output,
    time_bases: Vec<ffmpeg_next::Rational>,
    packets: Vec<usize>,
}

impl FfmpegContainer {
    /// Allocates the muxer for `path`, guessing the container from the
    /// extension and falling back to AVI when nothing matches.
    pub fn create(path: &Path) -> Result<Self, MuxError> {
        let container_err = |source| MuxError::Container {
            path: path.to_path_buf(),
            source,
        };

        let octx = if guesses_format(path) {
            ffmpeg_next::format::output(path).map_err(container_err)?
        } else {
            log::warn!(
                "Could not deduce output format from {}: using {FALLBACK_CONTAINER}",
                path.display()
            );
            ffmpeg_next::format::output_as(path, FALLBACK_CONTAINER).map_err(container_err)?
        };

        Ok(Self {
            path: path.to_path_buf(),
            octx,
            time_bases: Vec::new(),
            packets: Vec::new(),
        })
    }

    pub fn format_name(&self) -> String {
        self.octx.format().name().to_string()
    }

    /// The codec this container kind uses by default for `kind`.
    pub fn default_codec(&self, kind: StreamKind) -> ffmpeg_next::codec::Id {
        let medium = match kind {
            StreamKind::Audio => ffmpeg_next::media::Type::Audio,
            StreamKind::Video => ffmpeg_next::media::Type::Video,
        };
        self.octx.format().codec(&self.path, medium)
    }

    /// Some formats want stream headers to be separate.
    pub fn needs_global_header(&self) -> bool {
        self.octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER)
    }

    /// Adds a stream for `codec` and returns its index.
    pub fn add_stream(
        &mut self,
        kind: StreamKind,
        codec: ffmpeg_next::Codec,
    ) -> Result<usize, MuxError> {
        let ost = self
            .octx
            .add_stream(Some(codec))
            .map_err(|source| MuxError::Stream { kind, source })?;
        Ok(ost.index())
    }

    /// Copies an opened encoder's parameters onto stream `index`.
    pub fn configure_stream<P: Into<ffmpeg_next::codec::Parameters>>(
        &mut self,
        index: usize,
        parameters: P,
        time_base: ffmpeg_next::Rational,
    ) {
        if let Some(mut ost) = self.octx.stream_mut(index) {
            ost.set_parameters(parameters);
            ost.set_time_base(time_base);
        }
    }

    /// Logs the container layout the way `av_dump_format` does.
    pub fn dump(&self) {
        ffmpeg_next::format::context::output::dump(&self.octx, 0, self.path.to_str());
    }

    pub fn write_header(&mut self) -> Result<(), MuxError> {
        self.octx.write_header().map_err(MuxError::Header)?;
        self.time_bases = self.octx.streams().map(|s| s.time_base()).collect();
        self.packets = vec![0; self.time_bases.len()];
        Ok(())
    }

    /// Timebase the muxer settled on for stream `index`.
    pub fn stream_time_base(&self, index: usize) -> Option<ffmpeg_next::Rational> {
        self.time_bases.get(index).copied()
    }

    /// Packets written so far to stream `index`.
    pub fn packets_written(&self, index: usize) -> usize {
        self.packets.get(index).copied().unwrap_or(0)
    }

    /// Flushes the muxer's interleaving queue and finalizes the file.
    ///
    /// Must run before the encoders feeding this container are dropped.
    pub fn write_trailer(&mut self) -> Result<(), MuxError> {
        self.octx.write_trailer().map_err(MuxError::Trailer)
    }

    /// Rescales `packet` from the codec timebase to the stream timebase and
    /// hands it to the interleaving writer.
    fn write_packet(
        &mut self,
        packet: &mut ffmpeg_next::Packet,
        target: &StreamTarget,
    ) -> Result<(), MuxError> {
        let stream_tb = self
            .stream_time_base(target.index)
            .unwrap_or(target.codec_time_base);
        packet.set_stream(target.index);
        packet.rescale_ts(target.codec_time_base, stream_tb);
        packet
            .write_interleaved(&mut self.octx)
            .map_err(|source| MuxError::Write {
                kind: target.kind,
                source,
            })?;
        if let Some(count) = self.packets.get_mut(target.index) {
            *count += 1;
        }
        Ok(())
    }
}

/// Where one encoder's packets go: stream index, codec timebase, and
/// whether end-of-stream has already been signalled.
#[derive(Debug)]
pub struct StreamTarget {
    kind: StreamKind,
    index: usize,
    codec_time_base: ffmpeg_next::Rational,
    eof_sent: bool,
}

impl StreamTarget {
    pub fn new(kind: StreamKind, index: usize, codec_time_base: ffmpeg_next::Rational) -> Self {
        Self {
            kind,
            index,
            codec_time_base,
            eof_sent: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn codec_time_base(&self) -> ffmpeg_next::Rational {
        self.codec_time_base
    }

    /// Submits `frame` and writes every packet the encoder has ready.
    pub fn encode(
        &mut self,
        encoder: &mut ffmpeg_next::encoder::Encoder,
        frame: &ffmpeg_next::Frame,
        container: &mut FfmpegContainer,
    ) -> Result<WriteOutcome, MuxError> {
        encoder.send_frame(frame).map_err(|source| MuxError::Encode {
            kind: self.kind,
            source,
        })?;

        let mut packets = 0;
        let mut encoded = ffmpeg_next::Packet::empty();
        loop {
            let ready = packet_ready(encoder.receive_packet(&mut encoded)).map_err(|source| {
                MuxError::Encode {
                    kind: self.kind,
                    source,
                }
            })?;
            if !ready {
                break;
            }
            container.write_packet(&mut encoded, self)?;
            packets += 1;
        }
        Ok(WriteOutcome::Submitted { packets })
    }

    /// Signals end-of-stream on first use, then writes one buffered packet.
    /// Reports [`WriteOutcome::Drained`] once the encoder is empty.
    pub fn drain_one(
        &mut self,
        encoder: &mut ffmpeg_next::encoder::Encoder,
        container: &mut FfmpegContainer,
    ) -> Result<WriteOutcome, MuxError> {
        if !self.eof_sent {
            encoder.send_eof().map_err(|source| MuxError::Encode {
                kind: self.kind,
                source,
            })?;
            self.eof_sent = true;
        }

        let mut encoded = ffmpeg_next::Packet::empty();
        match encoder.receive_packet(&mut encoded) {
            Ok(()) => {
                container.write_packet(&mut encoded, self)?;
                Ok(WriteOutcome::Submitted { packets: 1 })
            }
            Err(ffmpeg_next::Error::Eof) => Ok(WriteOutcome::Drained),
            Err(source) => Err(MuxError::Encode {
                kind: self.kind,
                source,
            }),
        }
    }
}

/// Whether libavformat recognizes the file extension of `path`.
fn guesses_format(path: &Path) -> bool {
    let Some(name) = path.to_str().and_then(|p| CString::new(p).ok()) else {
        return false;
    };
    unsafe {
        !ffmpeg_next::ffi::av_guess_format(std::ptr::null(), name.as_ptr(), std::ptr::null())
            .is_null()
    }
}

/// Interprets one `receive_packet` result while input is still flowing:
/// `Ok(true)` when a packet was produced, `Ok(false)` when the encoder
/// needs more input (or has nothing left), the error otherwise.
fn packet_ready(result: Result<(), ffmpeg_next::Error>) -> Result<bool, ffmpeg_next::Error> {
    match result {
        Ok(()) => Ok(true),
        Err(ffmpeg_next::Error::Other { errno }) if errno == ffmpeg_next::error::EAGAIN => {
            Ok(false)
        }
        Err(ffmpeg_next::Error::Eof) => Ok(false),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_guesses_format_from_extension() {
        ffmpeg_next::init().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let container = FfmpegContainer::create(&dir.path().join("out.avi")).unwrap();
        assert_eq!(container.format_name(), "avi");
        assert_eq!(
            container.default_codec(StreamKind::Video),
            ffmpeg_next::codec::Id::MPEG4
        );
    }

    #[test]
    fn test_create_falls_back_for_unknown_extension() {
        ffmpeg_next::init().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let container = FfmpegContainer::create(&dir.path().join("out.notaformat")).unwrap();
        assert_eq!(container.format_name(), FALLBACK_CONTAINER);
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        ffmpeg_next::init().unwrap();
        let path = if cfg!(windows) {
            Path::new("Z:\\nonexistent\\out.avi")
        } else {
            Path::new("/nonexistent/out.avi")
        };
        let result = FfmpegContainer::create(path);
        assert!(matches!(result, Err(MuxError::Container { .. })));
    }

    #[test]
    fn test_no_packets_before_header() {
        ffmpeg_next::init().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let container = FfmpegContainer::create(&dir.path().join("out.avi")).unwrap();
        assert_eq!(container.packets_written(0), 0);
        assert!(container.stream_time_base(0).is_none());
    }

    #[test]
    fn test_guesses_format_from_extension() {
        ffmpeg_next::init().unwrap();
        assert!(guesses_format(Path::new("clip.avi")));
        assert!(guesses_format(Path::new("clip.mkv")));
        assert!(!guesses_format(Path::new("clip.notaformat")));
        assert!(!guesses_format(Path::new("no_extension")));
    }

    #[test]
    fn test_unwritable_known_format_reports_container_error() {
        ffmpeg_next::init().unwrap();
        let path = if cfg!(windows) {
            Path::new("Z:\\nonexistent\\out.mkv")
        } else {
            Path::new("/nonexistent/out.mkv")
        };
        match FfmpegContainer::create(path) {
            Err(MuxError::Container { path: failed, .. }) => assert_eq!(failed, path),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("created a container in a missing directory"),
        }
    }

    #[test]
    fn test_packet_ready_on_success() {
        assert_eq!(packet_ready(Ok(())), Ok(true));
    }

    #[test]
    fn test_packet_ready_stops_when_encoder_wants_input() {
        let again = ffmpeg_next::Error::Other {
            errno: ffmpeg_next::error::EAGAIN,
        };
        assert_eq!(packet_ready(Err(again)), Ok(false));
        assert_eq!(packet_ready(Err(ffmpeg_next::Error::Eof)), Ok(false));
    }

    #[test]
    fn test_packet_ready_propagates_encoder_failure() {
        let invalid = ffmpeg_next::Error::Other {
            errno: ffmpeg_next::error::EINVAL,
        };
        assert_eq!(packet_ready(Err(invalid)), Err(invalid));
        assert_eq!(
            packet_ready(Err(ffmpeg_next::Error::InvalidData)),
            Err(ffmpeg_next::Error::InvalidData)
        );
    }
}
