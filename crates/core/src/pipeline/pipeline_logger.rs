use std::collections::HashMap;
use std::time::Instant;

use crate::shared::stream_kind::StreamKind;

/// Cross-cutting logger for muxing events.
///
/// Keeps the interleaved writer free of any particular output mechanism;
/// the CLI logs through `log`, tests discard everything.
pub trait PipelineLogger {
    /// A stream step finished; `packets` were written and the stream's
    /// presentation time is now `presentation_secs`.
    fn packets(&mut self, kind: StreamKind, packets: usize, presentation_secs: f64);

    /// The writer stopped generating input and started draining encoders.
    fn flushing(&mut self) {}

    /// Record how long a named phase (setup, encode, teardown) took.
    fn timing(&mut self, phase: &str, duration_ms: f64);

    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn packets(&mut self, _kind: StreamKind, _packets: usize, _presentation_secs: f64) {}
    fn timing(&mut self, _phase: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger: per-stream packet counts, phase timings and a
/// summary at the end.
///
/// Progress is logged whenever the slowest stream crosses another
/// `throttle_secs` of presentation time.
pub struct StdoutPipelineLogger {
    throttle_secs: f64,
    next_report_secs: f64,
    packets: HashMap<StreamKind, usize>,
    times: HashMap<StreamKind, f64>,
    timings: Vec<(String, f64)>,
    start_time: Instant,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_secs: f64) -> Self {
        let throttle_secs = if throttle_secs > 0.0 {
            throttle_secs
        } else {
            1.0
        };
        Self {
            throttle_secs,
            next_report_secs: throttle_secs,
            packets: HashMap::new(),
            times: HashMap::new(),
            timings: Vec::new(),
            start_time: Instant::now(),
        }
    }

    pub fn packets_for(&self, kind: StreamKind) -> usize {
        self.packets.get(&kind).copied().unwrap_or(0)
    }

    pub fn timing_for(&self, phase: &str) -> Option<f64> {
        self.timings
            .iter()
            .find(|(name, _)| name == phase)
            .map(|(_, ms)| *ms)
    }

    /// Returns the formatted summary string, or `None` if nothing was
    /// recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.packets.is_empty() && self.timings.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Mux summary ({:.1}s wall clock):",
            elapsed_ms / 1000.0
        )];

        for kind in [StreamKind::Audio, StreamKind::Video] {
            if let Some(count) = self.packets.get(&kind) {
                let secs = self.times.get(&kind).copied().unwrap_or(0.0);
                lines.push(format!("  {kind:5}: {count:6} packets  {secs:7.3}s"));
            }
        }

        for (phase, ms) in &self.timings {
            let pct = if elapsed_ms > 0.0 {
                ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!("  {phase:9}: {ms:8.1}ms  ({pct:4.1}%)"));
        }

        Some(lines.join("\n"))
    }

    fn slowest_time(&self) -> f64 {
        self.times.values().copied().fold(f64::INFINITY, f64::min)
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn packets(&mut self, kind: StreamKind, packets: usize, presentation_secs: f64) {
        *self.packets.entry(kind).or_default() += packets;
        self.times.insert(kind, presentation_secs);

        let slowest = self.slowest_time();
        if slowest.is_finite() && slowest >= self.next_report_secs {
            log::info!("Encoded {slowest:.1}s of media");
            while self.next_report_secs <= slowest {
                self.next_report_secs += self.throttle_secs;
            }
        }
    }

    fn flushing(&mut self) {
        log::info!("Flushing encoders");
    }

    fn timing(&mut self, phase: &str, duration_ms: f64) {
        self.timings.push((phase.to_string(), duration_ms));
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
