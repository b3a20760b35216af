use crate::shared::stream_kind::StreamKind;

/// What a written file looks like when read back.
#[derive(Clone, Debug, PartialEq)]
pub struct ContainerReport {
    pub format_name: String,
    /// Container-level duration, when the demuxer reports one.
    pub duration_secs: Option<f64>,
    pub streams: Vec<StreamReport>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StreamReport {
    pub index: usize,
    /// `None` for streams that are neither audio nor video.
    pub kind: Option<StreamKind>,
    pub codec: String,
    pub packets: usize,
    /// Latest `pts + duration` seen, in seconds.
    pub end_secs: f64,
    /// Whether decoding timestamps never went backwards.
    pub monotonic_dts: bool,
}

impl ContainerReport {
    pub fn stream(&self, kind: StreamKind) -> Option<&StreamReport> {
        self.streams.iter().find(|s| s.kind == Some(kind))
    }
}
