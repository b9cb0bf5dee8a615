//! Chunked batch job

use fieldrules_core::{Error, Result};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{info, warn};

use crate::processor::ClientRuleProcessor;
use crate::record::Client;
use crate::sink::RecordSink;
use crate::source::RecordSource;

/// Default number of records per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// Outcome of a job run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobReport {
    /// Records read from the source
    pub read: usize,
    /// Records written to the sink
    pub written: usize,
    /// Chunks flushed
    pub chunks: usize,
    /// Whether the job stopped before the source was exhausted
    pub interrupted: bool,
}

/// Read, process and write records in fixed-size chunks.
///
/// Each chunk is flushed by the sink before the next one is read, so an
/// interrupted run leaves only whole chunks behind.
#[derive(Debug)]
pub struct BatchJob {
    processor: ClientRuleProcessor,
    chunk_size: usize,
}

impl BatchJob {
    pub fn new(processor: ClientRuleProcessor, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::config("chunk size must be at least 1"));
        }
        Ok(Self {
            processor,
            chunk_size,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Run until the source is exhausted or `stop` is set
    pub fn run(
        &self,
        source: &mut dyn RecordSource,
        sink: &mut dyn RecordSink,
        stop: &AtomicBool,
    ) -> Result<JobReport> {
        let started = Instant::now();
        let mut report = JobReport::default();
        let mut chunk: Vec<Client> = Vec::with_capacity(self.chunk_size);

        loop {
            if stop.load(Ordering::Relaxed) {
                warn!(chunks = report.chunks, "Stop requested, ending job between chunks");
                report.interrupted = true;
                break;
            }

            chunk.clear();
            while chunk.len() < self.chunk_size {
                match source.next_record()? {
                    Some(client) => {
                        report.read += 1;
                        chunk.push(self.processor.process(&client));
                    }
                    None => break,
                }
            }

            if chunk.is_empty() {
                break;
            }

            sink.write_chunk(&chunk)?;
            report.written += chunk.len();
            report.chunks += 1;
            info!(chunk = report.chunks, records = chunk.len(), total = report.written, "Chunk written");

            if chunk.len() < self.chunk_size {
                break;
            }
        }

        sink.finish()?;
        info!(
            read = report.read,
            written = report.written,
            chunks = report.chunks,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Job finished"
        );
        Ok(report)
    }
}
