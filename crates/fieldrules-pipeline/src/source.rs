//! Record sources

use fieldrules_core::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::record::Client;

/// Upstream row producer
pub trait RecordSource {
    /// Next record, `None` once the source is exhausted
    fn next_record(&mut self) -> Result<Option<Client>>;
}

/// Newline-delimited JSON, one client object per line.
///
/// Blank lines are skipped. A line that is not a client object is an
/// error naming the line number.
pub struct JsonLinesSource<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl JsonLinesSource<BufReader<File>> {
    /// Open a file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            Error::pipeline(format!("cannot open {}: {}", path.as_ref().display(), e))
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> RecordSource for JsonLinesSource<R> {
    fn next_record(&mut self) -> Result<Option<Client>> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }

            return serde_json::from_str(line)
                .map(Some)
                .map_err(|e| Error::pipeline(format!("line {}: {}", self.line, e)));
        }
    }
}

impl RecordSource for std::vec::IntoIter<Client> {
    fn next_record(&mut self) -> Result<Option<Client>> {
        Ok(self.next())
    }
}
