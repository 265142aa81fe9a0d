//! Event record reader.
//!
//! [`RecordReader`] reads records sequentially from any `Read` source, or
//! by index when the source is also `Seek`.

use std::io::{Read, Seek, SeekFrom};

use hic_core::{EventRecord, RECORD_SIZE};

use crate::codec::{decode_record, read_record};
use crate::error::CodecError;

/// Reads event records from a byte stream.
pub struct RecordReader<R: Read> {
    reader: R,
    records_read: u64,
}

impl<R: Read> RecordReader<R> {
    /// Wrap a source positioned at a record boundary.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            records_read: 0,
        }
    }

    /// Read the next record, or `None` if the stream is exhausted.
    pub fn next_record(&mut self) -> Result<Option<EventRecord>, CodecError> {
        let record = read_record(&mut self.reader)?;
        if record.is_some() {
            self.records_read += 1;
        }
        Ok(record)
    }

    /// Number of records read so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Convert into a record iterator.
    pub fn records(self) -> RecordIter<R> {
        RecordIter {
            reader: self.reader,
            done: false,
        }
    }
}

impl<R: Read + Seek> RecordReader<R> {
    /// Number of complete records in the source.
    pub fn len(&mut self) -> Result<u64, CodecError> {
        let here = self.reader.stream_position()?;
        let end = self.reader.seek(SeekFrom::End(0))?;
        self.reader.seek(SeekFrom::Start(here))?;
        Ok(end / RECORD_SIZE as u64)
    }

    /// `true` if the source holds no complete record.
    pub fn is_empty(&mut self) -> Result<bool, CodecError> {
        Ok(self.len()? == 0)
    }

    /// Read record `index` by seeking to `index × RECORD_SIZE`.
    ///
    /// Leaves the stream positioned after that record.
    pub fn read_at(&mut self, index: u64) -> Result<Option<EventRecord>, CodecError> {
        self.reader
            .seek(SeekFrom::Start(index * RECORD_SIZE as u64))?;
        let mut block = [0u8; RECORD_SIZE];
        match self.reader.read_exact(&mut block) {
            Ok(()) => Ok(Some(decode_record(&block))),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Iterator adapter over event records.
pub struct RecordIter<R: Read> {
    reader: R,
    done: bool,
}

impl<R: Read> Iterator for RecordIter<R> {
    type Item = Result<EventRecord, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match read_record(&mut self.reader) {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
