use std::fmt;

/// The two media kinds the writer produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Audio,
    Video,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Audio => f.pad("audio"),
            StreamKind::Video => f.pad("video"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(StreamKind::Audio.to_string(), "audio");
        assert_eq!(StreamKind::Video.to_string(), "video");
    }

    #[test]
    fn test_display_honours_width() {
        assert_eq!(format!("[{:7}]", StreamKind::Audio), "[audio  ]");
    }
}
