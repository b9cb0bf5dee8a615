//! fieldrules pipeline
//!
//! Batch host for the rule engine: reads client rows, applies the `name`
//! and `age` rules to each one and writes CSV in fixed-size chunks.

pub mod config;
pub mod job;
pub mod processor;
pub mod record;
pub mod sink;
pub mod source;

pub use config::{LogFormat, PipelineConfig};
pub use job::{BatchJob, JobReport, DEFAULT_CHUNK_SIZE};
pub use processor::ClientRuleProcessor;
pub use record::Client;
pub use sink::{CsvSink, RecordSink, CSV_HEADER};
pub use source::{JsonLinesSource, RecordSource};
