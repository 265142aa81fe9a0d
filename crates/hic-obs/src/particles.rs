//! The afterburner's final particle list: `ID charge pT phi y eta`.

use std::io::{self, Write};
use std::path::Path;

use hic_core::FinalParticle;
use hic_io::tabular::{expect_columns, parse_rows, parse_token, read_text};
use hic_io::TableError;

/// Columns per particle line.
pub const FINAL_COLUMNS: usize = 6;

/// Parse a final particle list: two integer columns, then four floats.
pub fn parse_final_particles(text: &str) -> Result<Vec<FinalParticle>, TableError> {
    parse_rows(text, |tokens, line| {
        expect_columns(tokens, line, FINAL_COLUMNS)?;
        Ok(FinalParticle {
            id: parse_token(tokens, line, 0)?,
            charge: parse_token(tokens, line, 1)?,
            pt: parse_token(tokens, line, 2)?,
            phi: parse_token(tokens, line, 3)?,
            y: parse_token(tokens, line, 4)?,
            eta: parse_token(tokens, line, 5)?,
        })
    })
}

/// Read the final particle list at `path`.
pub fn read_final_particles(path: &Path) -> Result<Vec<FinalParticle>, TableError> {
    parse_final_particles(&read_text(path)?)
}

/// Write particles in the afterburner's output format.
pub fn write_final_particles<W: Write + ?Sized>(
    w: &mut W,
    particles: &[FinalParticle],
) -> io::Result<()> {
    for p in particles {
        writeln!(
            w,
            "{} {} {:e} {:e} {:e} {:e}",
            p.id, p.charge, p.pt, p.phi, p.y, p.eta
        )?;
    }
    Ok(())
}
