//! run-events: generate heavy-ion collision events and append their
//! observable records to a binary results file.
//!
//! With `--rankvar`, the rank read from that environment variable namespaces
//! the results, log and checkpoint files and the scratch directory, so several
//! instances can share an output directory. The rank is resolved before the
//! log file or any other file is created.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{Parser, ValueEnum};
use hic::engine::rank::{rank_dir, rank_file, rank_from_env};
use hic::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "run-events")]
#[command(about = "Run heavy-ion collision events and write binary observable records")]
struct Cli {
    /// File to append event records to
    results: PathBuf,

    /// Number of events to run (default: run until interrupted)
    #[arg(long)]
    nevents: Option<u64>,

    /// Environment variable holding this instance's rank
    #[arg(long)]
    rankvar: Option<String>,

    /// Integer format applied to the rank, e.g. "{:03d}"
    #[arg(long, requires = "rankvar")]
    rankfmt: Option<String>,

    /// Directory for the scratch workspace (default: system temp dir)
    #[arg(long)]
    tmpdir: Option<PathBuf>,

    /// Save the in-flight initial condition here; resume from it on restart
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Log file (default: stderr)
    #[arg(long)]
    logfile: Option<PathBuf>,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    loglevel: LogLevel,

    /// Collision system and initial-condition generator options
    #[arg(long, allow_hyphen_values = true)]
    trento_args: String,

    /// Free-streaming time in fm/c (default: no free streaming)
    #[arg(long)]
    tau_fs: Option<f64>,

    /// Extra hydro solver arguments
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    hydro_args: String,

    /// Particlization temperature in GeV
    #[arg(long = "Tswitch", default_value_t = 0.150)]
    t_switch: f64,

    /// Results write buffer in bytes (0: unbuffered)
    #[arg(long, default_value_t = 0)]
    buffering: usize,

    /// Sampler seed (default: random, logged)
    #[arg(long)]
    seed: Option<u64>,

    /// Grid cell width in fm
    #[arg(long, default_value_t = 0.15)]
    grid_step: f64,

    /// Grid half-extent in fm (widened to an odd cell count)
    #[arg(long, default_value_t = 15.0)]
    grid_max: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error | Self::Critical => "error",
        }
    }
}

/// Paths after rank namespacing.
#[derive(Debug, PartialEq)]
struct Paths {
    results: PathBuf,
    logfile: Option<PathBuf>,
    checkpoint: Option<PathBuf>,
    tmpdir: Option<PathBuf>,
}

fn resolve_paths(cli: &Cli, rank: Option<&str>) -> Paths {
    let Some(rank) = rank else {
        return Paths {
            results: cli.results.clone(),
            logfile: cli.logfile.clone(),
            checkpoint: cli.checkpoint.clone(),
            tmpdir: cli.tmpdir.clone(),
        };
    };
    Paths {
        results: rank_file(&cli.results, rank),
        logfile: cli.logfile.as_deref().map(|p| rank_file(p, rank)),
        checkpoint: cli.checkpoint.as_deref().map(|p| rank_file(p, rank)),
        tmpdir: cli.tmpdir.as_deref().map(|p| rank_dir(p, rank)),
    }
}

fn build_config(cli: &Cli, paths: Paths, seed: u64) -> RunConfig {
    let mut config = RunConfig::new(paths.results, &cli.trento_args);
    config.nevents = cli.nevents;
    config.tmpdir = paths.tmpdir;
    config.checkpoint = paths.checkpoint;
    config.tau_fs = cli.tau_fs;
    config.hydro_args = cli.hydro_args.clone();
    config.t_switch = cli.t_switch;
    config.buffering = cli.buffering;
    config.seed = seed;
    config.grid = GridSpec::new(cli.grid_step, cli.grid_max);
    config
}

fn init_logging(level: LogLevel, logfile: Option<&Path>) -> io::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match logfile {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let rank = match cli.rankvar.as_deref() {
        Some(var) => match rank_from_env(var, cli.rankfmt.as_deref()) {
            Ok(rank) => Some(rank),
            Err(e) => {
                eprintln!("run-events: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };
    let paths = resolve_paths(&cli, rank.as_deref());

    if let Err(e) = init_logging(cli.loglevel, paths.logfile.as_deref()) {
        eprintln!("run-events: cannot open log file: {e}");
        return ExitCode::FAILURE;
    }
    if let Some(rank) = &rank {
        info!("rank {rank}");
    }

    let seed = cli.seed.unwrap_or_else(rand::random);
    info!("sampler seed {seed}");
    let config = build_config(&cli, paths, seed);

    let cancel = CancelToken::new();
    if let Err(e) = cancel.install_signal_handler() {
        warn!("cannot install signal handler: {e}");
    }

    match hic::engine::run(&config, cancel) {
        Ok(summary) if summary.stop == StopReason::Aborted => {
            error!("run aborted: {summary}");
            ExitCode::SUCCESS
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("run-events").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let cli = parse(&["out.dat", "--trento-args", "Pb Pb"]);
        assert_eq!(cli.nevents, None);
        assert_eq!(cli.t_switch, 0.150);
        assert_eq!(cli.loglevel, LogLevel::Info);
        let config = build_config(&cli, resolve_paths(&cli, None), 5);
        assert_eq!(config.results, PathBuf::from("out.dat"));
        assert_eq!(config.grid, GridSpec::default());
        assert_eq!(config.seed, 5);
        config.validate().unwrap();
    }

    #[test]
    fn trento_args_are_required() {
        assert!(Cli::try_parse_from(["run-events", "out.dat"]).is_err());
    }

    #[test]
    fn hyphenated_pass_through_args() {
        let cli = parse(&[
            "out.dat",
            "--trento-args",
            "-p 0.0 Pb Pb",
            "--hydro-args",
            "-etas 0.08",
            "--Tswitch",
            "0.148",
            "--loglevel",
            "warning",
        ]);
        assert_eq!(cli.trento_args, "-p 0.0 Pb Pb");
        assert_eq!(cli.hydro_args, "-etas 0.08");
        assert_eq!(cli.t_switch, 0.148);
        assert_eq!(cli.loglevel.directive(), "warn");
    }

    #[test]
    fn rank_namespaces_every_path() {
        let cli = parse(&[
            "/data/results.dat",
            "--trento-args",
            "Pb Pb",
            "--logfile",
            "/data/log.txt",
            "--checkpoint",
            "/data/cp.dat",
            "--tmpdir",
            "/scratch",
        ]);
        let paths = resolve_paths(&cli, Some("007"));
        assert_eq!(paths.results, PathBuf::from("/data/results/007.dat"));
        assert_eq!(paths.logfile, Some(PathBuf::from("/data/log/007.txt")));
        assert_eq!(paths.checkpoint, Some(PathBuf::from("/data/cp/007.dat")));
        assert_eq!(paths.tmpdir, Some(PathBuf::from("/scratch/007")));
    }

    #[test]
    fn grid_options_make_an_odd_grid() {
        let cli = parse(&[
            "out.dat",
            "--trento-args",
            "Pb Pb",
            "--grid-step",
            "1",
            "--grid-max",
            "2",
        ]);
        let config = build_config(&cli, resolve_paths(&cli, None), 0);
        assert_eq!(config.grid.cells(), 5);
        config.validate().unwrap();
    }

    #[test]
    fn critical_maps_to_error() {
        assert_eq!(LogLevel::Critical.directive(), "error");
    }
}
