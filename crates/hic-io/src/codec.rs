//! Binary encode/decode for [`EventRecord`].
//!
//! Field order and widths are fixed; all values are little-endian:
//!
//! ```text
//! offset  size  field
//!      0     8  initial_entropy   f64
//!      8     8  mult_factor       f64
//!     16     8  nsamples          i64
//!     24     8  dNch_deta         f64
//!     32    24  dN_dy[3]          f64 × 3
//!     56    24  mean_pT[3]        f64 × 3
//!     80     8  M                 i64
//!     88    96  Qn[6]             (re f64, im f64) × 6
//! ```

use std::io::{ErrorKind, Read, Write};

use hic_core::{EventRecord, NUM_HARMONICS, NUM_SPECIES, RECORD_SIZE};
use num_complex::Complex64;

use crate::error::CodecError;

/// Encode `record` into one complete block.
pub fn encode_record(record: &EventRecord) -> [u8; RECORD_SIZE] {
    let mut buf = [0u8; RECORD_SIZE];
    let mut at = 0;
    let mut put = |bytes: [u8; 8]| {
        buf[at..at + 8].copy_from_slice(&bytes);
        at += 8;
    };
    put(record.initial_entropy.to_le_bytes());
    put(record.mult_factor.to_le_bytes());
    put(record.nsamples.to_le_bytes());
    put(record.dnch_deta.to_le_bytes());
    for v in record.dn_dy {
        put(v.to_le_bytes());
    }
    for v in record.mean_pt {
        put(v.to_le_bytes());
    }
    put(record.m.to_le_bytes());
    for q in record.qn {
        put(q.re.to_le_bytes());
        put(q.im.to_le_bytes());
    }
    buf
}

/// Decode one complete block.
pub fn decode_record(block: &[u8; RECORD_SIZE]) -> EventRecord {
    let mut chunks = block.chunks_exact(8).map(|c| {
        let mut b = [0u8; 8];
        b.copy_from_slice(c);
        b
    });
    // RECORD_SIZE is a multiple of 8, so every take below is in range.
    let mut next = || chunks.next().unwrap_or_default();
    let f = |b: [u8; 8]| f64::from_le_bytes(b);
    let i = |b: [u8; 8]| i64::from_le_bytes(b);

    let initial_entropy = f(next());
    let mult_factor = f(next());
    let nsamples = i(next());
    let dnch_deta = f(next());
    let mut dn_dy = [0.0; NUM_SPECIES];
    for v in &mut dn_dy {
        *v = f(next());
    }
    let mut mean_pt = [0.0; NUM_SPECIES];
    for v in &mut mean_pt {
        *v = f(next());
    }
    let m = i(next());
    let mut qn = [Complex64::default(); NUM_HARMONICS];
    for q in &mut qn {
        let re = f(next());
        let im = f(next());
        *q = Complex64::new(re, im);
    }
    EventRecord {
        initial_entropy,
        mult_factor,
        nsamples,
        dnch_deta,
        dn_dy,
        mean_pt,
        m,
        qn,
    }
}

/// Write `record` as a single `write_all` of one full block.
pub fn write_record<W: Write + ?Sized>(w: &mut W, record: &EventRecord) -> Result<(), CodecError> {
    w.write_all(&encode_record(record))?;
    Ok(())
}

/// Read the next record, or `None` at a clean end of stream.
///
/// A stream that ends partway through a block is [`CodecError::Truncated`].
pub fn read_record<R: Read + ?Sized>(r: &mut R) -> Result<Option<EventRecord>, CodecError> {
    let mut block = [0u8; RECORD_SIZE];
    let mut filled = 0;
    while filled < RECORD_SIZE {
        match r.read(&mut block[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    match filled {
        0 => Ok(None),
        RECORD_SIZE => Ok(Some(decode_record(&block))),
        found => Err(CodecError::Truncated {
            expected: RECORD_SIZE,
            found,
        }),
    }
}
