use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

/// Force fields understood by the external engine, by their CLI tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForceField {
    /// Universal force field.
    #[default]
    Uff,
    /// General Amber force field.
    Gaff,
    Ghemical,
    Mmff94,
    Mmff94s,
}

impl ForceField {
    /// The token the engine's `-ff` argument expects.
    pub fn token(&self) -> &'static str {
        match self {
            ForceField::Uff => "Uff",
            ForceField::Gaff => "Gaff",
            ForceField::Ghemical => "Ghemical",
            ForceField::Mmff94 => "MMFF94",
            ForceField::Mmff94s => "MMFF94s",
        }
    }
}

impl fmt::Display for ForceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ForceField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uff" | "universal" => Ok(ForceField::Uff),
            "gaff" | "amber" | "general-amber" => Ok(ForceField::Gaff),
            "ghemical" => Ok(ForceField::Ghemical),
            "mmff94" => Ok(ForceField::Mmff94),
            "mmff94s" => Ok(ForceField::Mmff94s),
            _ => Err(()),
        }
    }
}

/// Parameters of one minimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizationConfig {
    /// The engine's install directory; also its working directory at launch.
    pub engine_dir: PathBuf,
    pub forcefield: ForceField,
    /// Minimization step count.
    pub steps: u32,
    /// Use steepest descent instead of the engine's default method.
    pub steepest_descent: bool,
    /// Engine log flush interval (`-l`), in steps.
    pub log_interval: u32,
    /// Maximum packets in flight on the live channel.
    pub window: usize,
}

/// Default step count, matching the interactive host's default.
pub const DEFAULT_STEPS: u32 = 2500;
/// Default engine log flush interval.
pub const DEFAULT_LOG_INTERVAL: u32 = 20;
/// Default acknowledgment window.
pub const DEFAULT_WINDOW: usize = 20;

#[derive(Default)]
pub struct MinimizationConfigBuilder {
    engine_dir: Option<PathBuf>,
    forcefield: Option<ForceField>,
    steps: Option<u32>,
    steepest_descent: Option<bool>,
    log_interval: Option<u32>,
    window: Option<usize>,
}

impl MinimizationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engine_dir(mut self, dir: PathBuf) -> Self {
        self.engine_dir = Some(dir);
        self
    }
    pub fn forcefield(mut self, ff: ForceField) -> Self {
        self.forcefield = Some(ff);
        self
    }
    pub fn steps(mut self, steps: u32) -> Self {
        self.steps = Some(steps);
        self
    }
    pub fn steepest_descent(mut self, enabled: bool) -> Self {
        self.steepest_descent = Some(enabled);
        self
    }
    pub fn log_interval(mut self, interval: u32) -> Self {
        self.log_interval = Some(interval);
        self
    }
    pub fn window(mut self, window: usize) -> Self {
        self.window = Some(window);
        self
    }

    pub fn build(self) -> Result<MinimizationConfig, ConfigError> {
        Ok(MinimizationConfig {
            engine_dir: self
                .engine_dir
                .ok_or(ConfigError::MissingParameter("engine_dir"))?,
            forcefield: self.forcefield.unwrap_or_default(),
            steps: self.steps.unwrap_or(DEFAULT_STEPS),
            steepest_descent: self.steepest_descent.unwrap_or(false),
            log_interval: self.log_interval.unwrap_or(DEFAULT_LOG_INTERVAL),
            window: self.window.unwrap_or(DEFAULT_WINDOW),
        })
    }
}
