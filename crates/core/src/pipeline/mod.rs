pub mod interleaved_writer;
pub mod pipeline_logger;
pub mod synthesize_use_case;
