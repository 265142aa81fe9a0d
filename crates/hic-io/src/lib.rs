//! File formats for the event pipeline.
//!
//! Two unrelated codecs live here:
//!
//! - [`tabular`]: whitespace-delimited text tables with `#` comment lines,
//!   the format of every hand-off file exchanged with the external stages.
//! - [`codec`], [`RecordWriter`], [`RecordReader`]: the fixed-layout binary
//!   [`EventRecord`](hic_core::EventRecord) stream that is the run's output.
//!
//! # Output format
//!
//! ```text
//! [Record 1][Record 2] ... [Record N]
//! ```
//!
//! No header, no footer, no delimiters. Every record is
//! [`RECORD_SIZE`](hic_core::RECORD_SIZE) little-endian bytes, so the file
//! length is always `RECORD_SIZE × N` and record `i` starts at
//! `i × RECORD_SIZE`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod reader;
pub mod tabular;
pub mod writer;

pub use codec::{decode_record, encode_record};
pub use error::{CodecError, TableError};
pub use reader::{RecordIter, RecordReader};
pub use writer::{OutputSink, RecordWriter};
