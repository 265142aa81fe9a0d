//! Per-instance path namespacing.
//!
//! Concurrent instances of the pipeline are told apart by a rank read from
//! an environment variable (for example an MPI rank). Files are namespaced
//! as `/dir/name.ext` → `/dir/name/<rank>.ext` and directories as
//! `dir` → `dir/<rank>`.
//!
//! The rank can be formatted with a small subset of Python format syntax:
//! one placeholder `{}`, `{:d}`, `{:Nd}` or `{:0Nd}`, optionally surrounded
//! by literal text.

use std::path::{Path, PathBuf};

use crate::config::ConfigError;

/// Read the rank from `var` and format it.
///
/// # Errors
///
/// [`ConfigError::RankVarUnset`] if `var` is unset (or not Unicode), and the
/// errors of [`format_rank`].
pub fn rank_from_env(var: &str, format: Option<&str>) -> Result<String, ConfigError> {
    let value = std::env::var(var).map_err(|_| ConfigError::RankVarUnset {
        var: var.to_string(),
    })?;
    format_rank(var, &value, format)
}

/// Format `value` (read from `var`) with `format`, or return it unchanged.
pub fn format_rank(var: &str, value: &str, format: Option<&str>) -> Result<String, ConfigError> {
    let Some(format) = format else {
        return Ok(value.to_string());
    };
    let bad_format = || ConfigError::InvalidRankFormat {
        format: format.to_string(),
    };

    let open = format.find('{').ok_or_else(bad_format)?;
    let close = open + format[open..].find('}').ok_or_else(bad_format)?;
    let (prefix, suffix) = (&format[..open], &format[close + 1..]);
    if prefix.contains(['{', '}']) || suffix.contains(['{', '}']) {
        return Err(bad_format());
    }

    let rank: i64 = value.trim().parse().map_err(|_| ConfigError::InvalidRank {
        var: var.to_string(),
        value: value.to_string(),
    })?;

    let spec = &format[open + 1..close];
    let body = match spec {
        "" | ":d" => rank.to_string(),
        _ => {
            let width = spec
                .strip_prefix(':')
                .and_then(|s| s.strip_suffix('d'))
                .ok_or_else(bad_format)?;
            let zero_pad = width.len() > 1 && width.starts_with('0');
            let n: usize = width.parse().map_err(|_| bad_format())?;
            if zero_pad {
                format!("{rank:0n$}")
            } else {
                format!("{rank:n$}")
            }
        }
    };
    Ok(format!("{prefix}{body}{suffix}"))
}

/// `/dir/name.ext` → `/dir/name/<rank>.ext`.
pub fn rank_file(path: &Path, rank: &str) -> PathBuf {
    let stem = path.file_stem().unwrap_or(path.as_os_str());
    let parent = path.parent().unwrap_or(Path::new(""));
    let mut name = std::ffi::OsString::from(rank);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    parent.join(stem).join(name)
}

/// `dir` → `dir/<rank>`.
pub fn rank_dir(path: &Path, rank: &str) -> PathBuf {
    path.join(rank)
}
