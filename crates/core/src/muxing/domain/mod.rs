pub mod container_report;
pub mod interleave_scheduler;
pub mod media_stream;
