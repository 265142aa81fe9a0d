//! Whitespace-delimited text tables.
//!
//! Lines whose first non-blank character is [`COMMENT_MARKER`] are comments;
//! blank lines are ignored. Every other line is one row of whitespace-
//! separated tokens. Callers decode rows into typed values with
//! [`parse_rows`] / [`read_rows`] and [`parse_token`].
//!
//! Floats are written in shortest round-trip scientific notation
//! (`{:e}`), so a write → read cycle reproduces every `f64` bit for bit.
//! An empty or fully commented file parses to zero rows, not an error.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use hic_core::Grid2;
use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::error::TableError;

/// Marks a comment line.
pub const COMMENT_MARKER: char = '#';

/// Tokens of one row. Hand-off tables are at most 16 columns wide.
pub type Tokens<'a> = SmallVec<[&'a str; 16]>;

// ── Reading ─────────────────────────────────────────────────────

/// Decode every data row of `text` with `decode(tokens, line_number)`.
pub fn parse_rows<T>(
    text: &str,
    mut decode: impl FnMut(&[&str], usize) -> Result<T, TableError>,
) -> Result<Vec<T>, TableError> {
    let mut rows = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER) {
            continue;
        }
        let tokens: Tokens<'_> = trimmed.split_whitespace().collect();
        rows.push(decode(&tokens, idx + 1)?);
    }
    Ok(rows)
}

/// Parse `tokens[column]` as `T`, reporting its position on failure.
pub fn parse_token<T: FromStr>(tokens: &[&str], line: usize, column: usize) -> Result<T, TableError> {
    let token = tokens.get(column).ok_or(TableError::ColumnCount {
        line,
        expected: column + 1,
        found: tokens.len(),
    })?;
    token.parse().map_err(|_| TableError::Parse {
        line,
        column,
        token: (*token).to_string(),
    })
}

/// Fail unless `tokens` has exactly `expected` columns.
pub fn expect_columns(tokens: &[&str], line: usize, expected: usize) -> Result<(), TableError> {
    if tokens.len() == expected {
        Ok(())
    } else {
        Err(TableError::ColumnCount {
            line,
            expected,
            found: tokens.len(),
        })
    }
}

/// Parse a rectangular table of floats.
///
/// The first data row fixes the width; later rows must match it.
pub fn parse_matrix(text: &str) -> Result<Vec<Vec<f64>>, TableError> {
    let mut width = None;
    parse_rows(text, |tokens, line| {
        let expected = *width.get_or_insert(tokens.len());
        expect_columns(tokens, line, expected)?;
        (0..expected).map(|c| parse_token(tokens, line, c)).collect()
    })
}

/// Collect `# key = value` comment lines with a numeric value, in file order.
///
/// Comments that do not have that shape are skipped.
pub fn parse_header(text: &str) -> IndexMap<String, f64> {
    text.lines()
        .filter_map(|line| line.trim_start().strip_prefix(COMMENT_MARKER))
        .filter_map(|body| {
            let (key, value) = body.split_once('=')?;
            let value = value.trim().parse().ok()?;
            Some((key.trim().to_string(), value))
        })
        .collect()
}

/// Read a whole file as text.
pub fn read_text(path: &Path) -> Result<String, TableError> {
    Ok(fs::read_to_string(path)?)
}

/// Read and decode every data row of the file at `path`.
pub fn read_rows<T>(
    path: &Path,
    decode: impl FnMut(&[&str], usize) -> Result<T, TableError>,
) -> Result<Vec<T>, TableError> {
    parse_rows(&read_text(path)?, decode)
}

/// Read a rectangular float table from `path`.
pub fn read_matrix(path: &Path) -> Result<Vec<Vec<f64>>, TableError> {
    parse_matrix(&read_text(path)?)
}

// ── Writing ─────────────────────────────────────────────────────

/// Write one row of floats, space separated, newline terminated.
pub fn write_row<W: Write + ?Sized>(w: &mut W, row: &[f64]) -> io::Result<()> {
    let mut first = true;
    for v in row {
        if !first {
            w.write_all(b" ")?;
        }
        write!(w, "{v:e}")?;
        first = false;
    }
    w.write_all(b"\n")
}

/// Write a `# text` comment line.
pub fn write_comment<W: Write + ?Sized>(w: &mut W, text: &str) -> io::Result<()> {
    writeln!(w, "{COMMENT_MARKER} {text}")
}

/// Write `# key = value` header lines.
pub fn write_header<W: Write + ?Sized>(w: &mut W, header: &IndexMap<String, f64>) -> io::Result<()> {
    for (key, value) in header {
        write_comment(w, &format!("{key} = {value:e}"))?;
    }
    Ok(())
}

/// Write every row of `grid`.
pub fn write_grid_rows<W: Write + ?Sized>(w: &mut W, grid: &Grid2) -> io::Result<()> {
    for row in grid.row_slices() {
        write_row(w, row)?;
    }
    Ok(())
}

/// Write `grid` to a new file at `path`, replacing any existing file.
pub fn write_grid(path: &Path, grid: &Grid2) -> io::Result<()> {
    let mut w = BufWriter::new(fs::File::create(path)?);
    write_grid_rows(&mut w, grid)?;
    w.flush()
}
