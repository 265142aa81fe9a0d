//! Wire a [`RunConfig`] to the real stages and run it.

use std::fs;

use hic_core::{EventError, InitialConditionGrid, ThermalModel};
use hic_io::RecordWriter;
use hic_sampler::HadronGas;
use hic_stages::{OsuHydro, PreEquilibrium, TrentoSource, UrqmdAfterburner};
use tracing::{info, warn};

use crate::cancel::CancelToken;
use crate::checkpoint::Checkpoint;
use crate::config::RunConfig;
use crate::driver::{EventLoop, RunError, RunSummary};
use crate::event::Pipeline;

/// Scratch subdirectory for IC batches inside the run workspace.
const IC_SCRATCH: &str = "ic";

/// Run the configured events.
///
/// Builds the hadron gas once, creates a scratch workspace that is removed
/// on return, replays a leftover checkpoint first, then streams initial
/// conditions until `nevents` is reached, the failure threshold trips, or
/// `cancel` is requested.
pub fn run(config: &RunConfig, cancel: CancelToken) -> Result<RunSummary, RunError> {
    config.validate()?;

    let gas = HadronGas::new(config.t_switch, config.seed);
    let e_switch = gas.energy_density();
    info!(
        "T_switch = {} GeV, e_switch = {e_switch:.6} GeV/fm^3, seed = {}",
        config.t_switch, config.seed
    );

    let workspace = match &config.tmpdir {
        Some(dir) => {
            fs::create_dir_all(dir).map_err(RunError::Workspace)?;
            tempfile::Builder::new().prefix("hic-").tempdir_in(dir)
        }
        None => tempfile::Builder::new().prefix("hic-").tempdir(),
    }
    .map_err(RunError::Workspace)?;
    info!("scratch workspace {}", workspace.path().display());

    let checkpoint = config.checkpoint.as_ref().map(Checkpoint::new);
    let resumed = match &checkpoint {
        Some(cp) => match cp.load(&config.grid) {
            Ok(Some(ic)) => {
                info!("resuming from checkpoint {}", cp.path().display());
                Some(ic)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("ignoring unreadable checkpoint {}: {e}", cp.path().display());
                None
            }
        },
        None => None,
    };

    let remaining = config
        .nevents
        .map(|n| n.saturating_sub(u64::from(resumed.is_some())));
    let source = TrentoSource::new(
        &config.programs.trento,
        &config.trento_args,
        config.grid,
        workspace.path().join(IC_SCRATCH),
    );
    let take_resumed = config.nevents != Some(0);
    let first = resumed
        .filter(|_| take_resumed)
        .map(Ok::<InitialConditionGrid, EventError>);
    let fresh: Box<dyn Iterator<Item = Result<InitialConditionGrid, EventError>>> =
        if remaining == Some(0) {
            Box::new(std::iter::empty())
        } else {
            Box::new(source.events(remaining))
        };

    let hydro = OsuHydro::new(
        &config.programs.hydro,
        &config.hydro_args,
        config.grid,
        e_switch,
    );
    let afterburner = UrqmdAfterburner::new(&config.programs.afterburner);
    let pipeline = Pipeline::new(
        PreEquilibrium::new(config.grid, config.tau_fs),
        &hydro,
        &gas,
        &afterburner,
    )
    .with_sampling(config.sampling)
    .with_acceptance(config.acceptance);

    let writer =
        RecordWriter::open_append(&config.results, config.buffering).map_err(RunError::Output)?;
    let mut event_loop = EventLoop::new(pipeline, writer, workspace.path())
        .with_abort_policy(config.abort)
        .with_cancel(cancel);
    if let Some(cp) = checkpoint {
        event_loop = event_loop.with_checkpoint(cp);
    }

    event_loop.run(first.into_iter().chain(fresh))
}
