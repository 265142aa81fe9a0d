//! Integration tests: the event loop against in-process stage fakes.
//!
//! Every test runs the real pre-equilibrium stage, sampler, particle-file
//! codecs and reducer; only hydro, the thermal model and the afterburner
//! are substituted.

use std::io::Cursor;
use std::path::Path;

use hic_core::{
    EventError, EventRecord, FreezeOutSurface, GridSpec, Handoff, HydroStage, InitialConditionGrid,
    RECORD_SIZE,
};
use hic_engine::{AbortPolicy, CancelToken, Checkpoint, EventLoop, Pipeline, StopReason};
use hic_io::{RecordReader, RecordWriter};
use hic_sampler::SamplingPolicy;
use hic_stages::initial::read_initial_condition;
use hic_stages::PreEquilibrium;
use hic_test_utils::{
    single_cell_surface, uniform_ic, FailingAfterburner, FixedCountModel, MockHydro,
    PassThroughAfterburner,
};

fn grid() -> GridSpec {
    GridSpec::new(1.0, 1.5)
}

fn policy() -> SamplingPolicy {
    SamplingPolicy {
        min_particles: 10,
        min_rounds: 2,
        max_rounds: 5,
    }
}

/// Events whose entropy is 9, 18, 27, ... on the 3×3 grid.
fn ics(n: usize) -> Vec<Result<InitialConditionGrid, EventError>> {
    (1..=n).map(|k| Ok(uniform_ic(&grid(), k as f64))).collect()
}

fn decode(bytes: Vec<u8>) -> Vec<EventRecord> {
    assert_eq!(bytes.len() % RECORD_SIZE, 0);
    RecordReader::new(Cursor::new(bytes))
        .records()
        .collect::<Result<_, _>>()
        .unwrap()
}

fn pipeline<'a>(
    hydro: &'a dyn HydroStage,
    model: &'a FixedCountModel,
    afterburner: &'a dyn hic_core::Afterburner,
) -> Pipeline<'a> {
    Pipeline::new(PreEquilibrium::new(grid(), None), hydro, model, afterburner)
        .with_sampling(policy())
}

#[test]
fn writes_one_record_per_event_in_order() {
    let ws = tempfile::tempdir().unwrap();
    let hydro = MockHydro::new(single_cell_surface(1.0));
    let model = FixedCountModel::new(5);
    let p = pipeline(&hydro, &model, &PassThroughAfterburner);

    let mut lp = EventLoop::new(p, RecordWriter::new(Vec::new()), ws.path());
    let summary = lp.run(ics(3)).unwrap();
    assert_eq!(summary.stop, StopReason::Exhausted);
    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.written, 3);
    assert_eq!(summary.failures, 0);

    let bytes = lp.into_writer().into_inner();
    assert_eq!(bytes.len(), 3 * RECORD_SIZE);
    let records = decode(bytes);
    let entropies: Vec<f64> = records.iter().map(|r| r.initial_entropy).collect();
    assert_eq!(entropies, vec![9.0, 18.0, 27.0]);

    let r = &records[0];
    assert_eq!(r.mult_factor, 1.0);
    assert_eq!(r.nsamples, 2);
    assert_eq!(r.dnch_deta, 5.0);
    assert_eq!(r.dn_dy, [5.0, 0.0, 0.0]);
    assert!((r.mean_pt[0] - 0.5).abs() < 1e-12);
    assert_eq!(r.mean_pt[1], 0.0);
    assert_eq!(r.m, 10);
    assert!((r.qn[0].re - 10.0).abs() < 1e-9);
    assert!(r.qn[0].im.abs() < 1e-9);
}

#[test]
fn event_dirs_are_removed() {
    let ws = tempfile::tempdir().unwrap();
    let hydro = MockHydro::new(single_cell_surface(1.0));
    let model = FixedCountModel::new(5);
    let p = pipeline(&hydro, &model, &FailingAfterburner);

    let mut lp = EventLoop::new(p, RecordWriter::new(Vec::new()), ws.path());
    lp.run(ics(2)).unwrap();
    assert_eq!(std::fs::read_dir(ws.path()).unwrap().count(), 0);
}

#[test]
fn empty_surface_emits_zero_record() {
    let ws = tempfile::tempdir().unwrap();
    let hydro = MockHydro::empty();
    let model = FixedCountModel::new(5);
    let p = pipeline(&hydro, &model, &FailingAfterburner);

    let mut lp = EventLoop::new(p, RecordWriter::new(Vec::new()), ws.path());
    let summary = lp.run(ics(2)).unwrap();
    assert_eq!(summary.written, 2);
    assert_eq!(summary.early_ends, 2);
    assert_eq!(summary.failures, 0);
    assert!(decode(lp.into_writer().into_inner())
        .iter()
        .all(EventRecord::is_zero));
}

#[test]
fn zero_particles_emits_zero_record() {
    let ws = tempfile::tempdir().unwrap();
    let hydro = MockHydro::new(single_cell_surface(1.0));
    let model = FixedCountModel::new(0);
    // The afterburner must never run.
    let p = pipeline(&hydro, &model, &FailingAfterburner);

    let mut lp = EventLoop::new(p, RecordWriter::new(Vec::new()), ws.path());
    let summary = lp.run(ics(1)).unwrap();
    assert_eq!(summary.early_ends, 1);
    assert_eq!(summary.failures, 0);
    let records = decode(lp.into_writer().into_inner());
    assert_eq!(records, vec![EventRecord::zeroed()]);
}

#[test]
fn failures_are_skipped_and_order_kept() {
    let ws = tempfile::tempdir().unwrap();
    // Second hydro call fails.
    let hydro = MockHydro::new(single_cell_surface(1.0)).failing_on([1]);
    let model = FixedCountModel::new(5);
    let p = pipeline(&hydro, &model, &PassThroughAfterburner);

    let mut source = ics(3);
    source.insert(1, Err(EventError::malformed("truncated grid")));

    let mut lp = EventLoop::new(p, RecordWriter::new(Vec::new()), ws.path());
    let summary = lp.run(source).unwrap();
    assert_eq!(summary.stop, StopReason::Exhausted);
    assert_eq!(summary.attempted, 4);
    assert_eq!(summary.failures, 2);
    assert_eq!(summary.written, 2);
    assert_eq!(hydro.calls(), 3);

    let entropies: Vec<f64> = decode(lp.into_writer().into_inner())
        .iter()
        .map(|r| r.initial_entropy)
        .collect();
    assert_eq!(entropies, vec![9.0, 27.0]);
}

#[test]
fn aborts_after_threshold_without_further_attempts() {
    let ws = tempfile::tempdir().unwrap();
    let hydro = MockHydro::new(single_cell_surface(1.0)).failing_on(0..100);
    let model = FixedCountModel::new(5);
    let p = pipeline(&hydro, &model, &PassThroughAfterburner);

    let mut lp = EventLoop::new(p, RecordWriter::new(Vec::new()), ws.path())
        .with_abort_policy(AbortPolicy::default());
    let summary = lp.run(ics(10)).unwrap();
    assert_eq!(summary.stop, StopReason::Aborted);
    assert_eq!(summary.attempted, 4);
    assert_eq!(summary.failures, 4);
    assert_eq!(hydro.calls(), 4);
    assert!(lp.into_writer().into_inner().is_empty());
}

#[test]
fn half_failures_do_not_abort() {
    let ws = tempfile::tempdir().unwrap();
    // Every other call fails: the rate never exceeds one half.
    let hydro = MockHydro::new(single_cell_surface(1.0)).failing_on((1..20).step_by(2));
    let model = FixedCountModel::new(5);
    let p = pipeline(&hydro, &model, &PassThroughAfterburner);

    let mut lp = EventLoop::new(p, RecordWriter::new(Vec::new()), ws.path());
    let summary = lp.run(ics(10)).unwrap();
    assert_eq!(summary.stop, StopReason::Exhausted);
    assert_eq!(summary.failures, 5);
    assert_eq!(summary.written, 5);
}

/// Requests cancellation from inside the given hydro call.
struct CancellingHydro {
    inner: MockHydro,
    cancel_on: usize,
    token: CancelToken,
}

impl HydroStage for CancellingHydro {
    fn evolve(&self, handoff: &Handoff, workdir: &Path) -> Result<FreezeOutSurface, EventError> {
        if self.inner.calls() == self.cancel_on {
            self.token.request();
        }
        self.inner.evolve(handoff, workdir)
    }
}

#[test]
fn interrupt_discards_event_and_keeps_checkpoint() {
    let ws = tempfile::tempdir().unwrap();
    let token = CancelToken::new();
    let hydro = CancellingHydro {
        inner: MockHydro::new(single_cell_surface(1.0)),
        cancel_on: 2,
        token: token.clone(),
    };
    let model = FixedCountModel::new(5);
    let p = pipeline(&hydro, &model, &PassThroughAfterburner);
    let cp_path = ws.path().join("state").join("checkpoint.dat");

    let mut lp = EventLoop::new(p, RecordWriter::new(Vec::new()), ws.path())
        .with_cancel(token)
        .with_checkpoint(Checkpoint::new(&cp_path));
    let summary = lp.run(ics(5)).unwrap();
    assert_eq!(summary.stop, StopReason::Interrupted);
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.written, 2);
    assert_eq!(hydro.inner.calls(), 3);
    assert_eq!(lp.into_writer().into_inner().len(), 2 * RECORD_SIZE);

    let saved = read_initial_condition(&cp_path, Some(&grid())).unwrap();
    assert_eq!(saved.multiplicity(), 27.0);
}

#[test]
fn checkpoint_cleared_after_each_event() {
    let ws = tempfile::tempdir().unwrap();
    let hydro = MockHydro::new(single_cell_surface(1.0)).failing_on([0]);
    let model = FixedCountModel::new(5);
    let p = pipeline(&hydro, &model, &PassThroughAfterburner);
    let cp_path = ws.path().join("checkpoint.dat");

    let mut lp = EventLoop::new(p, RecordWriter::new(Vec::new()), ws.path())
        .with_checkpoint(Checkpoint::new(&cp_path));
    lp.run(ics(2)).unwrap();
    assert!(!cp_path.exists());
}

#[test]
fn cancel_before_start_runs_nothing() {
    let ws = tempfile::tempdir().unwrap();
    let hydro = MockHydro::new(single_cell_surface(1.0));
    let model = FixedCountModel::new(5);
    let p = pipeline(&hydro, &model, &PassThroughAfterburner);
    let token = CancelToken::new();
    token.request();

    let mut lp = EventLoop::new(p, RecordWriter::new(Vec::new()), ws.path()).with_cancel(token);
    let summary = lp.run(ics(3)).unwrap();
    assert_eq!(summary.stop, StopReason::Interrupted);
    assert_eq!(summary.attempted, 0);
    assert_eq!(hydro.calls(), 0);
}
