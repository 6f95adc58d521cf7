use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "minim - Batch driver for the interactive-minimization pipeline: loads a workspace snapshot, runs the external force-field engine over the selected atoms, and writes the minimized positions back out.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one minimization over the selected atoms of a workspace snapshot.
    Run(RunArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the workspace snapshot file (TOML).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub snapshot: PathBuf,

    /// Install directory of the minimization engine (contains the `nanobabel` executable).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub engine_dir: PathBuf,

    /// Path for the minimized positions output file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Force field to minimize with: uff, gaff, ghemical, mmff94, mmff94s.
    #[arg(short, long, default_value = "uff", value_name = "NAME")]
    pub forcefield: String,

    /// Number of minimization steps (0 to 5000).
    #[arg(short = 'n', long, default_value_t = 2500, value_name = "NUM")]
    pub steps: u32,

    /// Use steepest descent instead of the engine's default method.
    #[arg(long)]
    pub steepest: bool,
}
