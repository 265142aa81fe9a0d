//! Event record writer.
//!
//! [`RecordWriter`] appends encoded records to any `Write` sink. Each record
//! is handed to the sink as one complete block, so an interrupted run never
//! leaves a partial record behind the last complete one.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use hic_core::EventRecord;

use crate::codec::write_record;
use crate::error::CodecError;

/// Writes event records to a byte stream.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production code
/// can use an [`OutputSink`] on the results file.
///
/// # Examples
///
/// ```
/// use hic_core::{EventRecord, RECORD_SIZE};
/// use hic_io::{RecordReader, RecordWriter};
///
/// let mut buf = Vec::new();
/// let mut writer = RecordWriter::new(&mut buf);
/// writer.append(&EventRecord::zeroed()).unwrap();
/// writer.append(&EventRecord { nsamples: 10, ..EventRecord::zeroed() }).unwrap();
/// assert_eq!(writer.records_written(), 2);
/// drop(writer);
/// assert_eq!(buf.len(), 2 * RECORD_SIZE);
///
/// let records: Vec<_> = RecordReader::new(buf.as_slice())
///     .records()
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(records[1].nsamples, 10);
/// ```
pub struct RecordWriter<W: Write> {
    writer: W,
    records_written: u64,
}

impl<W: Write> RecordWriter<W> {
    /// Wrap a sink. Nothing is written until the first [`append`](Self::append).
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            records_written: 0,
        }
    }

    /// Append one record.
    pub fn append(&mut self, record: &EventRecord) -> Result<(), CodecError> {
        write_record(&mut self.writer, record)?;
        self.records_written += 1;
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), CodecError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of records appended so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Consume the writer and return the underlying sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl RecordWriter<OutputSink> {
    /// Open `path` for appending, creating it and its parent directories.
    ///
    /// `buffering` is the write buffer size in bytes; `0` writes every record
    /// straight to the file.
    pub fn open_append(path: &Path, buffering: usize) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let sink = if buffering == 0 {
            OutputSink::Direct(file)
        } else {
            OutputSink::Buffered(BufWriter::with_capacity(buffering, file))
        };
        Ok(Self::new(sink))
    }
}

/// The results file, buffered or not.
pub enum OutputSink {
    /// Every write goes straight to the file.
    Direct(File),
    /// Writes are collected in a buffer of the configured size.
    Buffered(BufWriter<File>),
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Direct(f) => f.write(buf),
            Self::Buffered(b) => b.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Self::Direct(f) => f.write_all(buf),
            Self::Buffered(b) => b.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Direct(f) => f.flush(),
            Self::Buffered(b) => b.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hic_core::RECORD_SIZE;

    #[test]
    fn counts_records() {
        let mut w = RecordWriter::new(Vec::new());
        for _ in 0..3 {
            w.append(&EventRecord::zeroed()).unwrap();
        }
        assert_eq!(w.records_written(), 3);
        assert_eq!(w.into_inner().len(), 3 * RECORD_SIZE);
    }

    #[test]
    fn open_append_extends_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.dat");
        for buffering in [0, 4096] {
            let mut w = RecordWriter::open_append(&path, buffering).unwrap();
            w.append(&EventRecord::zeroed()).unwrap();
            w.flush().unwrap();
        }
        assert_eq!(fs::metadata(&path).unwrap().len(), 2 * RECORD_SIZE as u64);
    }

    #[test]
    fn buffered_sink_holds_until_flush() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.dat");
        let mut w = RecordWriter::open_append(&path, 1 << 16).unwrap();
        w.append(&EventRecord::zeroed()).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
        w.flush().unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), RECORD_SIZE as u64);
    }
}
