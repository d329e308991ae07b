//! Accumulating CSV buffer
//!
//! Sole owner of the bytes that become the uploaded artifact. Every
//! mutation happens under one lock held for the full batch, including the
//! encoder flush, so rows from concurrent writers never interleave and the
//! buffer is always a whole number of encoded rows.

use crate::{Error, Result};
use parking_lot::Mutex;

/// One row that failed to encode within a batch.
#[derive(Debug)]
pub struct RowFailure {
    /// Index of the row within the submitted batch
    pub index: usize,
    pub error: Error,
}

/// Result of writing one batch of rows.
#[derive(Debug)]
pub struct WriteOutcome {
    /// Rows appended to the buffer
    pub rows_written: usize,
    /// Rows recorded and skipped; writing continued past each
    pub failures: Vec<RowFailure>,
}

#[derive(Debug, Default)]
struct Inner {
    buf: Vec<u8>,
    /// Cell count fixed by the header; rows of any other width are rejected
    width: Option<usize>,
}

/// Append-only CSV byte buffer, safe for concurrent batch writers.
#[derive(Debug, Default)]
pub struct CsvBuffer {
    inner: Mutex<Inner>,
}

impl CsvBuffer {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Write the header row.
    ///
    /// Must be called exactly once, before any `write_rows` call. Not
    /// idempotent: a second call appends a duplicate header row.
    pub fn write_header(&self, header: &[String]) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.width = Some(header.len());

        let mut writer = csv::Writer::from_writer(&mut inner.buf);
        writer.write_record(header)?;
        writer.flush()?;
        Ok(())
    }

    /// Append a batch of rows in order.
    ///
    /// A row that fails to encode, including one whose cell count does not
    /// match the header, is recorded in the outcome and skipped; subsequent
    /// rows still write. `Err` is reserved for a buffer-level flush
    /// failure, which loses the whole batch.
    pub fn write_rows(&self, rows: &[Vec<String>]) -> Result<WriteOutcome> {
        let mut inner = self.inner.lock();
        let width = inner.width;
        let mut writer = csv::Writer::from_writer(&mut inner.buf);

        let mut rows_written = 0;
        let mut failures = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            if let Some(expected) = width {
                if row.len() != expected {
                    failures.push(RowFailure {
                        index,
                        error: Error::MalformedRow {
                            expected,
                            actual: row.len(),
                        },
                    });
                    continue;
                }
            }

            match writer.write_record(row) {
                Ok(()) => rows_written += 1,
                Err(e) => failures.push(RowFailure {
                    index,
                    error: e.into(),
                }),
            }
        }

        writer.flush()?;

        Ok(WriteOutcome {
            rows_written,
            failures,
        })
    }

    /// Copy of the buffer's current content.
    ///
    /// Intended for finalization, after all writers have quiesced; it is
    /// consistent under concurrency but may land between batches.
    pub fn snapshot(&self) -> Vec<u8> {
        self.inner.lock().buf.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().buf.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_header_then_rows() {
        let buffer = CsvBuffer::new();
        buffer
            .write_header(&cells(&["timestamp", "metric_name", "metric_value"]))
            .unwrap();

        let outcome = buffer
            .write_rows(&[
                cells(&["t0", "http_reqs", "1.000000"]),
                cells(&["t1", "http_reqs", "2.000000"]),
            ])
            .unwrap();

        assert_eq!(outcome.rows_written, 2);
        assert!(outcome.failures.is_empty());
        assert_eq!(
            String::from_utf8(buffer.snapshot()).unwrap(),
            "timestamp,metric_name,metric_value\nt0,http_reqs,1.000000\nt1,http_reqs,2.000000\n"
        );
    }

    #[test]
    fn test_fields_are_quoted_per_csv_rules() {
        let buffer = CsvBuffer::new();
        buffer.write_header(&cells(&["metric_name", "note"])).unwrap();
        buffer
            .write_rows(&[cells(&["m", "has,comma and \"quote\""])])
            .unwrap();

        let text = String::from_utf8(buffer.snapshot()).unwrap();
        assert!(text.contains("\"has,comma and \"\"quote\"\"\""));
    }

    #[test]
    fn test_malformed_row_is_skipped_and_batch_continues() {
        let buffer = CsvBuffer::new();
        buffer
            .write_header(&cells(&["timestamp", "metric_name", "metric_value"]))
            .unwrap();

        let outcome = buffer
            .write_rows(&[
                cells(&["t0", "a", "1.000000"]),
                cells(&["t1", "b"]), // wrong cell count
                cells(&["t2", "c", "3.000000"]),
            ])
            .unwrap();

        assert_eq!(outcome.rows_written, 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].index, 1);

        let text = String::from_utf8(buffer.snapshot()).unwrap();
        assert!(text.contains("t0,a,1.000000\n"));
        assert!(!text.contains("t1,b"));
        assert!(text.contains("t2,c,3.000000\n"));
    }

    #[test]
    fn test_malformed_first_row_does_not_poison_batch() {
        let buffer = CsvBuffer::new();
        buffer
            .write_header(&cells(&["timestamp", "metric_name", "metric_value"]))
            .unwrap();

        let outcome = buffer
            .write_rows(&[
                cells(&["t0", "short"]),
                cells(&["t1", "ok", "1.000000"]),
            ])
            .unwrap();

        assert_eq!(outcome.rows_written, 1);
        assert_eq!(outcome.failures[0].index, 0);
    }

    #[test]
    fn test_concurrent_writers_never_interleave_rows() {
        let buffer = Arc::new(CsvBuffer::new());
        buffer.write_header(&cells(&["writer", "seq"])).unwrap();

        let mut handles = vec![];
        for writer_id in 0..8 {
            let buffer = Arc::clone(&buffer);
            handles.push(std::thread::spawn(move || {
                let rows: Vec<Vec<String>> = (0..50)
                    .map(|seq| cells(&[&format!("w{writer_id}"), &format!("{seq}")]))
                    .collect();
                let outcome = buffer.write_rows(&rows).unwrap();
                assert_eq!(outcome.rows_written, 50);
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let text = String::from_utf8(buffer.snapshot()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "writer,seq");
        assert_eq!(lines.len(), 1 + 8 * 50);

        // Every row is fully intact: two cells, known writer, seq in range.
        for line in &lines[1..] {
            let mut parts = line.split(',');
            let writer = parts.next().unwrap();
            let seq: usize = parts.next().unwrap().parse().unwrap();
            assert!(parts.next().is_none());
            assert!(writer.starts_with('w'));
            assert!(seq < 50);
        }

        // Each writer's batch landed as one contiguous, ordered run.
        for writer_id in 0..8 {
            let tag = format!("w{writer_id}");
            let seqs: Vec<usize> = lines[1..]
                .iter()
                .filter(|l| l.starts_with(&format!("{tag},")))
                .map(|l| l.split(',').nth(1).unwrap().parse().unwrap())
                .collect();
            assert_eq!(seqs, (0..50).collect::<Vec<_>>());
        }
    }
}
