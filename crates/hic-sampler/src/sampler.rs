//! Adaptive sampling loop.
//!
//! Each round draws one batch from the thermal model. Non-empty batches
//! are appended to the particle list as a `# <count>` line followed by one
//! `ID x y z px py pz` line per particle. The round index advances on every
//! draw, empty or not.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use hic_core::{EventError, FreezeOutSurface, SampledParticle, ThermalModel};
use hic_io::tabular::{parse_token, read_text, COMMENT_MARKER};
use hic_io::TableError;
use tracing::debug;

/// When to stop drawing rounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplingPolicy {
    /// Particles needed (together with `min_rounds`) to stop early.
    pub min_particles: u64,
    /// Rounds needed (together with `min_particles`) to stop early.
    pub min_rounds: u64,
    /// Hard cap on rounds.
    pub max_rounds: u64,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            min_particles: 100_000,
            min_rounds: 10,
            max_rounds: 1000,
        }
    }
}

impl SamplingPolicy {
    /// `true` once `rounds` rounds have produced `particles` particles in total
    /// and no further round should be drawn.
    pub fn is_done(&self, rounds: u64, particles: u64) -> bool {
        (particles >= self.min_particles && rounds >= self.min_rounds)
            || rounds >= self.max_rounds
    }

    /// Check that the cap is at least one round and not below `min_rounds`.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_rounds == 0 {
            return Err("max_rounds must be at least 1".into());
        }
        if self.min_rounds > self.max_rounds {
            return Err(format!(
                "min_rounds ({}) exceeds max_rounds ({})",
                self.min_rounds, self.max_rounds
            ));
        }
        Ok(())
    }
}

/// Result of one sampling loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplingOutcome {
    /// Rounds drawn, including empty ones.
    pub rounds: u64,
    /// Particles written across all rounds.
    pub particles: u64,
}

/// Stream id for round `round` of event `event`.
///
/// Distinct `(event, round)` pairs map to distinct ids for rounds below 2³².
pub fn stream_id(event: u64, round: u64) -> u64 {
    (event << 32) | (round & 0xffff_ffff)
}

/// Write one `# <count>` block.
pub fn write_block<W: Write + ?Sized>(w: &mut W, batch: &[SampledParticle]) -> io::Result<()> {
    writeln!(w, "{COMMENT_MARKER} {}", batch.len())?;
    for p in batch {
        writeln!(
            w,
            "{} {:e} {:e} {:e} {:e} {:e} {:e}",
            p.id, p.x[0], p.x[1], p.x[2], p.p[0], p.p[1], p.p[2]
        )?;
    }
    Ok(())
}

/// Parse a block-delimited particle list back into its batches.
///
/// Every particle line must belong to a block and every block must hold
/// the number of lines its header announces.
pub fn parse_blocks(text: &str) -> Result<Vec<Vec<SampledParticle>>, TableError> {
    let mut blocks: Vec<Vec<SampledParticle>> = Vec::new();
    let mut expected = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = trimmed
            .trim_start_matches(COMMENT_MARKER)
            .split_whitespace()
            .collect();
        if trimmed.starts_with(COMMENT_MARKER) {
            expected.push((line_no, parse_token::<usize>(&tokens, line_no, 0)?));
            blocks.push(Vec::new());
            continue;
        }
        let block = blocks.last_mut().ok_or(TableError::ColumnCount {
            line: line_no,
            expected: 1,
            found: tokens.len(),
        })?;
        hic_io::tabular::expect_columns(&tokens, line_no, 7)?;
        let f = |c| parse_token::<f64>(&tokens, line_no, c);
        block.push(SampledParticle {
            id: parse_token(&tokens, line_no, 0)?,
            x: [f(1)?, f(2)?, f(3)?],
            p: [f(4)?, f(5)?, f(6)?],
        });
    }
    // A short block is reported against its header line.
    for (block, &(line, want)) in blocks.iter().zip(&expected) {
        if block.len() != want {
            return Err(TableError::ColumnCount {
                line,
                expected: want,
                found: block.len(),
            });
        }
    }
    Ok(blocks)
}

/// Read the particle list at `path` block by block.
pub fn read_blocks(path: &Path) -> Result<Vec<Vec<SampledParticle>>, TableError> {
    parse_blocks(&read_text(path)?)
}

/// Sample `surface` until `policy` is satisfied, writing batches to `path`.
///
/// Round `r` of event `event` draws stream [`stream_id`]`(event, r)`.
pub fn sample_surface<M: ThermalModel + ?Sized>(
    model: &M,
    surface: &FreezeOutSurface,
    policy: &SamplingPolicy,
    event: u64,
    path: &Path,
) -> Result<SamplingOutcome, EventError> {
    let mut out = BufWriter::new(File::create(path)?);
    let mut rounds = 0;
    let mut particles = 0;
    loop {
        rounds += 1;
        let batch = model.sample(surface, stream_id(event, rounds));
        if !batch.is_empty() {
            write_block(&mut out, &batch)?;
            particles += batch.len() as u64;
        }
        if policy.is_done(rounds, particles) {
            break;
        }
    }
    out.flush()?;
    debug!("sampled {particles} particles in {rounds} rounds");
    Ok(SamplingOutcome { rounds, particles })
}
