//! Error types for table parsing and the record codec.

use std::fmt;
use std::io;

use hic_core::EventError;

/// Errors reading a whitespace-delimited table.
#[derive(Debug)]
pub enum TableError {
    /// The file could not be read.
    Io(io::Error),
    /// A token could not be parsed as the column's type.
    Parse {
        /// 1-based line number in the file.
        line: usize,
        /// 0-based column index.
        column: usize,
        /// The offending token.
        token: String,
    },
    /// A row had the wrong number of columns.
    ColumnCount {
        /// 1-based line number in the file.
        line: usize,
        /// Columns the caller expected.
        expected: usize,
        /// Columns actually present.
        found: usize,
    },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Parse {
                line,
                column,
                token,
            } => write!(f, "line {line}, column {column}: cannot parse '{token}'"),
            Self::ColumnCount {
                line,
                expected,
                found,
            } => write!(f, "line {line}: expected {expected} columns, found {found}"),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TableError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<TableError> for EventError {
    fn from(e: TableError) -> Self {
        match e {
            TableError::Io(e) => EventError::Io(e),
            other => EventError::malformed(other.to_string()),
        }
    }
}

/// Errors reading the binary record stream.
#[derive(Debug)]
pub enum CodecError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The stream ended partway through a record.
    Truncated {
        /// Bytes a full record needs.
        expected: usize,
        /// Bytes actually available.
        found: usize,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Truncated { expected, found } => {
                write!(f, "truncated record: expected {expected} bytes, found {found}")
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
