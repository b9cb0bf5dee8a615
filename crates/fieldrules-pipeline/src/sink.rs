//! Record sinks

use fieldrules_core::{Error, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::record::Client;

/// Downstream row consumer, written one chunk at a time
pub trait RecordSink {
    /// Write and flush one chunk; a chunk is durable once this returns
    fn write_chunk(&mut self, records: &[Client]) -> Result<()>;

    /// Finish the output; the header is written even when no rows were
    fn finish(&mut self) -> Result<()>;
}

/// Output columns, in order
pub const CSV_HEADER: [&str; 4] = ["id", "name", "age", "ageCategory"];

/// One output line; `None` cells are written empty
#[derive(Serialize)]
struct CsvRow<'a> {
    id: i64,
    name: Option<&'a str>,
    age: Option<i64>,
    #[serde(rename = "ageCategory")]
    age_category: Option<&'a str>,
}

impl<'a> From<&'a Client> for CsvRow<'a> {
    fn from(client: &'a Client) -> Self {
        Self {
            id: client.id,
            name: client.name.as_deref(),
            age: client.age,
            age_category: client.age_category.as_deref(),
        }
    }
}

/// Comma-delimited output with a header row
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    rows_written: bool,
}

impl CsvSink<File> {
    /// Create (or truncate) an output file, creating parent directories
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)
            .map_err(|e| Error::pipeline(format!("cannot create {}: {}", path.display(), e)))?;
        Ok(Self::new(file))
    }
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new().has_headers(true).from_writer(writer),
            rows_written: false,
        }
    }

    /// Flush and recover the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| Error::pipeline(format!("CSV flush failed: {}", e.error())))
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn write_chunk(&mut self, records: &[Client]) -> Result<()> {
        for client in records {
            self.writer
                .serialize(CsvRow::from(client))
                .map_err(|e| Error::pipeline(format!("CSV write failed for id {}: {}", client.id, e)))?;
            self.rows_written = true;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        // the header only goes out with the first serialized row
        if !self.rows_written {
            self.writer
                .write_record(CSV_HEADER)
                .map_err(|e| Error::pipeline(format!("CSV write failed: {}", e)))?;
            self.rows_written = true;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(chunks: &[Vec<Client>]) -> String {
        let mut sink = CsvSink::new(Vec::new());
        for chunk in chunks {
            sink.write_chunk(chunk).unwrap();
        }
        sink.finish().unwrap();
        String::from_utf8(sink.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_header_and_rows() {
        let mut client = Client::new(1, "JOHN DOE", 30);
        client.age_category = Some("Adult".to_string());

        assert_eq!(render(&[vec![client]]), "id,name,age,ageCategory\n1,JOHN DOE,30,Adult\n");
    }

    #[test]
    fn test_header_only_when_empty() {
        assert_eq!(render(&[]), "id,name,age,ageCategory\n");
    }

    #[test]
    fn test_quoting_and_nulls() {
        let client = Client {
            id: 7,
            name: Some("Doe, \"JD\"".to_string()),
            age: None,
            age_category: None,
        };

        assert_eq!(
            render(&[vec![client]]),
            "id,name,age,ageCategory\n7,\"Doe, \"\"JD\"\"\",,\n"
        );
    }

    #[test]
    fn test_header_written_once_across_chunks() {
        let output = render(&[vec![Client::new(1, "A", 1)], vec![Client::new(2, "B", 2)]]);
        assert_eq!(output.matches("ageCategory").count(), 1);
        assert_eq!(output.lines().count(), 3);
    }
}
