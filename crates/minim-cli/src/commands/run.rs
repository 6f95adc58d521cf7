use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use crate::scene::FileScene;
use crate::snapshot;
use minim::core::spatial::LinearIndex;
use minim::engine::config::{ForceField, MinimizationConfigBuilder};
use minim::engine::progress::{PipelineState, Progress, ProgressReporter};
use minim::workflows::minimize::{self, MinimizationOutcome};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

const MAX_STEPS: u32 = 5000;

pub async fn execute(args: RunArgs) -> Result<()> {
    let forcefield: ForceField = args
        .forcefield
        .parse()
        .map_err(|_| CliError::Argument(format!("unknown force field '{}'", args.forcefield)))?;
    if args.steps > MAX_STEPS {
        return Err(CliError::Argument(format!(
            "steps must be at most {MAX_STEPS}, got {}",
            args.steps
        )));
    }

    let workspace = snapshot::load(&args.snapshot)?;
    info!(
        complexes = workspace.complexes.len(),
        snapshot = %args.snapshot.display(),
        "workspace snapshot loaded"
    );

    let config = MinimizationConfigBuilder::new()
        .engine_dir(args.engine_dir.clone())
        .forcefield(forcefield)
        .steps(args.steps)
        .steepest_descent(args.steepest)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let mut scene = FileScene::new(workspace);
    let result = scene.result();

    let reporter = ProgressReporter::with_callback(Box::new(|event| match event {
        Progress::StateChange(state) => {
            debug!(?state, "pipeline state");
            if state == PipelineState::Draining {
                info!("engine finished, draining remaining frames");
            }
        }
        Progress::FramePublished { packet_id } => debug!(packet_id, "frame published"),
        Progress::Message(message) => info!("{message}"),
    }));

    let (_cancel_tx, cancel_rx) = minimize::cancel_channel();
    let outcome =
        minimize::run::<_, LinearIndex>(&mut scene, &config, &reporter, cancel_rx).await?;

    match outcome {
        MinimizationOutcome::Completed { frames, exit_code } => {
            if let Some(code) = exit_code.filter(|&c| c != 0) {
                warn!(code, "engine exited with a non-zero status");
            }
            info!(frames, "minimization finished");
            write_positions(&args, &result)?;
            Ok(())
        }
        MinimizationOutcome::NothingToMinimize => {
            info!("nothing to minimize: no visible selected atoms in the snapshot");
            Ok(())
        }
        MinimizationOutcome::Cancelled => {
            // The batch driver never cancels; reaching this is a bug upstream.
            Err(CliError::Config("run was cancelled unexpectedly".to_string()))
        }
    }
}

/// Writes the last published buffer as one `index x y z` line per tracked
/// atom, in complex-local coordinates.
fn write_positions(
    args: &RunArgs,
    result: &Arc<Mutex<crate::scene::FinalPositions>>,
) -> Result<()> {
    let result = result.lock().unwrap();
    if result.positions.len() != result.atom_indices.len() * 3 {
        warn!("engine produced no frames, leaving output unwritten");
        return Ok(());
    }
    let mut file = std::io::BufWriter::new(std::fs::File::create(&args.output)?);
    for (i, index) in result.atom_indices.iter().enumerate() {
        let lanes = &result.positions[i * 3..i * 3 + 3];
        writeln!(file, "{index} {:.4} {:.4} {:.4}", lanes[0], lanes[1], lanes[2])?;
    }
    file.flush()?;
    info!(
        atoms = result.atom_indices.len(),
        output = %args.output.display(),
        "minimized positions written"
    );
    Ok(())
}
