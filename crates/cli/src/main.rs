use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use synthmux_core::muxing::domain::container_report::ContainerReport;
use synthmux_core::muxing::infrastructure::ffmpeg_probe;
use synthmux_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use synthmux_core::pipeline::synthesize_use_case::SynthesizeUseCase;
use synthmux_core::shared::constants::DEFAULT_OUTPUT_FILE;
use synthmux_core::shared::mux_settings::MuxSettings;

/// Writes five seconds of a synthetic test pattern and tone to a media file.
///
/// The container is picked from the file extension, falling back to AVI.
#[derive(Parser)]
#[command(name = "synthmux", version)]
struct Cli {
    /// Output media file.
    #[arg(default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut use_case = SynthesizeUseCase::new(
        MuxSettings::default(),
        Box::new(StdoutPipelineLogger::default()),
    );
    let outcome = use_case.execute(&cli.output)?;
    log::info!(
        "Wrote {} video frames and {} audio samples to {}",
        outcome.write.video_units,
        outcome.write.audio_units,
        cli.output.display()
    );

    report(&cli.output)
}

fn report(output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let report = ffmpeg_probe::probe(output)?;
    for line in describe(&report) {
        log::info!("{line}");
    }
    Ok(())
}

fn describe(report: &ContainerReport) -> Vec<String> {
    let duration = report
        .duration_secs
        .map(|d| format!("{d:.3}s"))
        .unwrap_or_else(|| "unknown duration".to_string());
    let mut lines = vec![format!("Container: {} ({duration})", report.format_name)];
    for stream in &report.streams {
        let kind = stream
            .kind
            .map(|k| k.to_string())
            .unwrap_or_else(|| "other".to_string());
        let dts = if stream.monotonic_dts {
            "monotonic dts"
        } else {
            "dts out of order"
        };
        lines.push(format!(
            "  #{} {kind:5} {:10} {:5} packets, ends at {:.3}s, {dts}",
            stream.index, stream.codec, stream.packets, stream.end_secs
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthmux_core::muxing::domain::container_report::StreamReport;
    use synthmux_core::shared::stream_kind::StreamKind;

    #[test]
    fn test_output_defaults_to_test_avi() {
        let cli = Cli::try_parse_from(["synthmux"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("test.avi"));
    }

    #[test]
    fn test_output_positional() {
        let cli = Cli::try_parse_from(["synthmux", "clip.mp4"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("clip.mp4"));
    }

    #[test]
    fn test_tuning_flags_are_rejected() {
        assert!(Cli::try_parse_from(["synthmux", "--bitrate", "1000"]).is_err());
    }

    #[test]
    fn test_describe_lists_each_stream() {
        let report = ContainerReport {
            format_name: "avi".to_string(),
            duration_secs: Some(5.005),
            streams: vec![
                StreamReport {
                    index: 0,
                    kind: Some(StreamKind::Video),
                    codec: "mpeg4".to_string(),
                    packets: 150,
                    end_secs: 5.005,
                    monotonic_dts: true,
                },
                StreamReport {
                    index: 1,
                    kind: None,
                    codec: "none".to_string(),
                    packets: 0,
                    end_secs: 0.0,
                    monotonic_dts: false,
                },
            ],
        };

        let lines = describe(&report);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Container: avi (5.005s)");
        assert!(lines[1].contains("video") && lines[1].contains("150 packets"));
        assert!(lines[2].contains("other") && lines[2].contains("out of order"));
    }
}
