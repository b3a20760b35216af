use std::path::Path;

use crate::muxing::domain::container_report::{ContainerReport, StreamReport};
use crate::muxing::infrastructure::mux_error::MuxError;
use crate::shared::stream_kind::StreamKind;

/// Reopens a written file and summarizes its streams and packet timing.
pub fn probe(path: &Path) -> Result<ContainerReport, MuxError> {
    let probe_err = |source| MuxError::Probe {
        path: path.to_path_buf(),
        source,
    };

    ffmpeg_next::init().map_err(MuxError::Init)?;
    let mut ictx = ffmpeg_next::format::input(path).map_err(probe_err)?;

    let format_name = ictx.format().name().to_string();
    let duration_secs = match ictx.duration() {
        d if d > 0 => Some(d as f64 / f64::from(ffmpeg_next::ffi::AV_TIME_BASE)),
        _ => None,
    };

    let mut streams: Vec<StreamReport> = Vec::new();
    let mut time_bases = Vec::new();
    for stream in ictx.streams() {
        let parameters = stream.parameters();
        let kind = match parameters.medium() {
            ffmpeg_next::media::Type::Audio => Some(StreamKind::Audio),
            ffmpeg_next::media::Type::Video => Some(StreamKind::Video),
            _ => None,
        };
        streams.push(StreamReport {
            index: stream.index(),
            kind,
            codec: parameters.id().name().to_string(),
            packets: 0,
            end_secs: 0.0,
            monotonic_dts: true,
        });
        time_bases.push(stream.time_base());
    }

    let mut last_dts: Vec<Option<i64>> = vec![None; streams.len()];
    for (stream, packet) in ictx.packets() {
        let index = stream.index();
        let Some(report) = streams.get_mut(index) else {
            continue;
        };
        report.packets += 1;

        if let Some(dts) = packet.dts() {
            if last_dts[index].is_some_and(|last| dts < last) {
                report.monotonic_dts = false;
            }
            last_dts[index] = Some(dts);
        }

        if let Some(pts) = packet.pts().or(packet.dts()) {
            let end = (pts + packet.duration()) as f64 * f64::from(time_bases[index]);
            report.end_secs = report.end_secs.max(end);
        }
    }

    Ok(ContainerReport {
        format_name,
        duration_secs,
        streams,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_nonexistent_file() {
        let path = if cfg!(windows) {
            Path::new("Z:\\nonexistent\\file.avi")
        } else {
            Path::new("/nonexistent/file.avi")
        };
        assert!(matches!(probe(path), Err(MuxError::Probe { .. })));
    }
}
