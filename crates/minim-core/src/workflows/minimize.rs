use crate::core::io::{constraints::write_constraints, sdf::write_sdf};
use crate::core::models::selection::SelectionSet;
use crate::core::scene::{SceneLink, StreamCreationError};
use crate::core::spatial::NeighborIndex;
use crate::engine::config::MinimizationConfig;
use crate::engine::error::MinimizationError;
use crate::engine::mapper::FrameMapper;
use crate::engine::progress::{PipelineState, Progress, ProgressReporter};
use crate::engine::selection::select_atoms;
use crate::engine::stream::PacketWindow;
use crate::engine::supervisor::{EngineCommand, EngineEvent, EngineSupervisor};
use crate::engine::trajectory::TrajectoryParser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

/// How one run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MinimizationOutcome {
    /// Engine exited and the frame backlog drained.
    Completed {
        /// Packets published to the live channel.
        frames: u64,
        /// Engine exit code, if it exited on its own with one.
        exit_code: Option<i32>,
    },
    /// Empty workspace or no selected atoms. Nothing was written or launched;
    /// this is a reported no-op, not an error.
    NothingToMinimize,
    /// Explicit cancellation. Pending acknowledgments were abandoned.
    Cancelled,
}

/// Creates the cancellation pair for [`run`]. Sending `true` stops the
/// pipeline from any state; further sends are harmless.
pub fn cancel_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Runs one complete minimization: select → export → supervise → parse → map →
/// publish, until the engine exits and the backlog drains, or `cancel` fires.
///
/// `N` is the proximity index the selector uses; hosts with an accelerated
/// spatial structure plug it in here, otherwise
/// [`LinearIndex`](crate::core::spatial::LinearIndex) does the job.
///
/// All pipeline state lives on this task. The supervisor's I/O tasks only post
/// events onto a channel drained here, and stream acknowledgments arrive the
/// same way, so nothing mutates the run concurrently. At most one frame is
/// mapped and published per tick, and only when the acknowledgment window has
/// room; engine output is drained regardless, so backpressure never stalls the
/// child process's pipes.
#[instrument(skip_all, name = "minimization_pipeline")]
pub async fn run<S, N>(
    scene: &mut S,
    config: &MinimizationConfig,
    reporter: &ProgressReporter<'_>,
    mut cancel: watch::Receiver<bool>,
) -> Result<MinimizationOutcome, MinimizationError>
where
    S: SceneLink,
    N: NeighborIndex + Default,
{
    if *cancel.borrow() {
        return Ok(MinimizationOutcome::Cancelled);
    }

    // === Starting: select, export, open the live channel ===
    let mut snapshot = scene.request_workspace().await?;
    let mut retried = false;

    let (selection, _scratch, input, constraints_path, output, stream) = loop {
        let selection = select_atoms(&snapshot, N::default());
        if selection.is_empty() {
            info!("no visible selected atoms, nothing to minimize");
            return Ok(MinimizationOutcome::NothingToMinimize);
        }
        reporter.report(Progress::StateChange(PipelineState::Starting));

        let scratch = tempfile::tempdir().map_err(MinimizationError::Scratch)?;
        let input = scratch.path().join("input.sdf");
        let constraints_path = scratch.path().join("constraints.txt");
        let output = scratch.path().join("output.pdb");
        export_files(&selection, &input, &constraints_path)?;
        debug!(input = %input.display(), constraints = %constraints_path.display(), "engine input written");

        match scene.create_stream(&selection.original_indices).await {
            Ok(stream) => break (selection, scratch, input, constraints_path, output, stream),
            Err(StreamCreationError::AtomNotFound) if !retried => {
                // The user edited the scene between selection and channel
                // creation. Re-fetch and redo the whole setup once.
                warn!("selected atom vanished during stream creation, retrying with a fresh snapshot");
                retried = true;
                snapshot = scene.request_workspace().await?;
            }
            Err(err) => return Err(err.into()),
        }
    };

    let mut window = PacketWindow::new(stream, config.window);
    let mut supervisor = EngineSupervisor::new();
    let command = EngineCommand::minimize(config, &input, &constraints_path, &output);
    let mut events = match supervisor.start(&command) {
        Ok(events) => events,
        Err(err) => {
            window.shutdown();
            return Err(err);
        }
    };

    info!(
        atoms = selection.len(),
        forcefield = %config.forcefield,
        steps = config.steps,
        "engine launched"
    );
    reporter.report(Progress::StateChange(PipelineState::Running));

    // === Running / Draining: the polling tick ===
    let mut parser = TrajectoryParser::new();
    let mut mapper = FrameMapper::new(&selection);
    let mut exit_code = None;
    let mut events_closed = false;
    let mut cancel_closed = false;
    let mut draining_reported = false;

    let mut tick = tokio::time::interval(Duration::from_millis(10));
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            changed = cancel.changed(), if !cancel_closed => {
                match changed {
                    Ok(()) if *cancel.borrow() => {
                        info!("minimization cancelled");
                        supervisor.stop();
                        window.shutdown();
                        reporter.report(Progress::StateChange(PipelineState::Stopped));
                        return Ok(MinimizationOutcome::Cancelled);
                    }
                    Ok(()) => {}
                    Err(_) => cancel_closed = true,
                }
            }
            event = events.recv(), if !events_closed => {
                match event {
                    Some(EngineEvent::Stdout(line)) => parser.feed_line(&line),
                    // Non-fatal diagnostics; the engine may grumble and still
                    // produce valid frames.
                    Some(EngineEvent::Stderr(line)) => warn!("engine: {line}"),
                    Some(EngineEvent::Exited(code)) => exit_code = code,
                    None => events_closed = true,
                }
            }
            _ = tick.tick() => {}
        }

        if events_closed && !draining_reported && !parser.is_drained() {
            draining_reported = true;
            reporter.report(Progress::StateChange(PipelineState::Draining));
        }

        // At most one frame per tick, and only when the window has room.
        if window.can_publish() {
            if let Some(frame) = parser.pop_frame() {
                let positions = mapper.apply(&frame);
                let packet_id = window.published();
                window.publish(positions);
                reporter.report(Progress::FramePublished { packet_id });
            }
        }

        if events_closed && parser.is_drained() {
            break;
        }
    }

    let frames = window.published();
    window.shutdown();
    supervisor.stop();
    reporter.report(Progress::StateChange(PipelineState::Stopped));
    info!(frames, ?exit_code, "minimization complete");
    Ok(MinimizationOutcome::Completed { frames, exit_code })
}

fn export_files(
    selection: &SelectionSet,
    input: &Path,
    constraints_path: &Path,
) -> Result<(), MinimizationError> {
    write_file(input, |w| write_sdf(w, selection))?;
    write_file(constraints_path, |w| write_constraints(w, selection))?;
    Ok(())
}

fn write_file(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
) -> Result<(), MinimizationError> {
    let export_err = |source| MinimizationError::Export {
        path: PathBuf::from(path),
        source,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(export_err)?);
    write(&mut writer).map_err(export_err)?;
    writer.flush().map_err(export_err)?;
    Ok(())
}
