use std::path::PathBuf;

use thiserror::Error;

use crate::shared::stream_kind::StreamKind;

/// Failures from FFmpeg while setting up or writing the output file.
///
/// None of these are recoverable; the caller aborts the run.
#[derive(Error, Debug)]
pub enum MuxError {
    #[error("failed to initialize ffmpeg: {0}")]
    Init(#[source] ffmpeg_next::Error),
    #[error("could not allocate output context for {path}: {source}")]
    Container {
        path: PathBuf,
        #[source]
        source: ffmpeg_next::Error,
    },
    #[error("could not find {kind} encoder for '{codec}'")]
    EncoderNotFound { kind: StreamKind, codec: String },
    #[error("could not allocate {kind} stream: {source}")]
    Stream {
        kind: StreamKind,
        #[source]
        source: ffmpeg_next::Error,
    },
    #[error("could not open {kind} codec: {source}")]
    CodecOpen {
        kind: StreamKind,
        #[source]
        source: ffmpeg_next::Error,
    },
    #[error("could not initialize the {kind} conversion context: {source}")]
    Converter {
        kind: StreamKind,
        #[source]
        source: ffmpeg_next::Error,
    },
    #[error("error occurred when opening output file: {0}")]
    Header(#[source] ffmpeg_next::Error),
    #[error("error while converting {kind} frame: {source}")]
    Convert {
        kind: StreamKind,
        #[source]
        source: ffmpeg_next::Error,
    },
    #[error("error encoding {kind} frame: {source}")]
    Encode {
        kind: StreamKind,
        #[source]
        source: ffmpeg_next::Error,
    },
    #[error("error while writing {kind} packet: {source}")]
    Write {
        kind: StreamKind,
        #[source]
        source: ffmpeg_next::Error,
    },
    #[error("failed to write container trailer: {0}")]
    Trailer(#[source] ffmpeg_next::Error),
    #[error("failed to probe {path}: {source}")]
    Probe {
        path: PathBuf,
        #[source]
        source: ffmpeg_next::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_stream() {
        let err = MuxError::Encode {
            kind: StreamKind::Video,
            source: ffmpeg_next::Error::Eof,
        };
        assert!(err.to_string().starts_with("error encoding video frame"));

        let err = MuxError::EncoderNotFound {
            kind: StreamKind::Audio,
            codec: "mp3".to_string(),
        };
        assert_eq!(err.to_string(), "could not find audio encoder for 'mp3'");
    }

    #[test]
    fn test_source_is_exposed() {
        use std::error::Error;
        let err = MuxError::Header(ffmpeg_next::Error::Eof);
        assert!(err.source().is_some());
    }
}
