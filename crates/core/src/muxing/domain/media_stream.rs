use crate::shared::stream_kind::StreamKind;

/// What one step of a stream produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Input was accepted (or a buffered packet drained); `packets` were
    /// written to the sink. Zero means the encoder is still buffering.
    Submitted { packets: usize },
    /// Flushing, and the encoder has nothing left. The stream is done.
    Drained,
}

/// One synthetic elementary stream feeding a shared sink `S`.
///
/// The interleaved writer owns the schedule; implementations only know how
/// to take one step: generate, encode and write a unit, or, once
/// `flushing` is set, drain one buffered packet.
pub trait MediaStream<S> {
    fn kind(&self) -> StreamKind;

    /// Presentation time, in seconds, of everything submitted so far.
    fn presentation_time(&self) -> f64;

    /// Raw units (samples per channel or frames) submitted so far.
    fn units_submitted(&self) -> u64;

    fn write_next(
        &mut self,
        sink: &mut S,
        flushing: bool,
    ) -> Result<WriteOutcome, Box<dyn std::error::Error>>;
}
