//! Run configuration: command-line flags layered over an optional TOML file.
//!
//! Precedence is flag, then `[defaults]` in the file, then built-in default.
//! Every value is validated here so that a bad configuration fails before any
//! phase runs.

use std::num::NonZeroU32;
use std::path::Path;

use clap::Args;
use serde::Deserialize;

use crate::circuit::CircuitKind;
use crate::core::{BackendKind, Curve, Phase};
use crate::engine::ProfileMode;
use crate::{BenchError, BenchResult};

pub const DEFAULT_ALGO: Phase = Phase::Prove;
pub const DEFAULT_COUNT: u32 = 2;
pub const DEFAULT_SIZE: usize = 10_000;
pub const DEFAULT_CIRCUIT: CircuitKind = CircuitKind::Expo;

/// Flags shared by every backend subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Phase to benchmark: compile, setup, prove or verify [default: prove]
    #[arg(long)]
    pub algo: Option<String>,
    /// Number of timed iterations to average [default: 2]
    #[arg(long)]
    pub count: Option<u32>,
    /// Circuit size parameter [default: 10000]
    #[arg(long)]
    pub size: Option<usize>,
    /// Curve to run over (bn254, bls12_381 or pasta) [default: per backend]
    #[arg(long)]
    pub curve: Option<String>,
    /// Circuit under test [default: expo]
    #[arg(long)]
    pub circuit: Option<String>,
    /// Profile the timed region (cpu)
    #[arg(long)]
    pub profile: Option<String>,
    /// Request ADX/BMI2 accelerated arithmetic when the host supports it
    #[arg(long)]
    pub adx: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileDefaults {
    pub algo: Option<String>,
    pub count: Option<u32>,
    pub size: Option<usize>,
    pub curve: Option<String>,
    pub circuit: Option<String>,
    pub profile: Option<String>,
    pub adx: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub defaults: FileDefaults,
}

pub fn load_file_config(path: &Path) -> BenchResult<FileConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| BenchError::Config(format!("failed to read {}: {e}", path.display())))?;
    toml::from_str(&s)
        .map_err(|e| BenchError::Config(format!("invalid config {}: {e}", path.display())))
}

/// Fully validated settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub backend: BackendKind,
    pub phase: Phase,
    pub count: NonZeroU32,
    pub size: usize,
    pub curve: Curve,
    pub circuit: CircuitKind,
    pub profile: Option<ProfileMode>,
    pub adx: bool,
}

impl RunSettings {
    pub fn resolve(backend: BackendKind, args: &RunArgs, file: &FileConfig) -> BenchResult<Self> {
        let defaults = &file.defaults;

        let phase = match args.algo.as_ref().or(defaults.algo.as_ref()) {
            Some(s) => s.parse::<Phase>()?,
            None => DEFAULT_ALGO,
        };

        let count = args.count.or(defaults.count).unwrap_or(DEFAULT_COUNT);
        let count = NonZeroU32::new(count)
            .ok_or_else(|| BenchError::Config("count must be at least 1".into()))?;

        let size = args.size.or(defaults.size).unwrap_or(DEFAULT_SIZE);
        if size == 0 {
            return Err(BenchError::Config("size must be at least 1".into()));
        }

        let curve = match args.curve.as_ref().or(defaults.curve.as_ref()) {
            Some(s) => s.parse::<Curve>()?,
            None => backend.default_curve(),
        };
        if !backend.supports(curve) {
            return Err(BenchError::Config(format!(
                "curve {curve} is not supported by backend {backend}"
            )));
        }

        let circuit = match args.circuit.as_ref().or(defaults.circuit.as_ref()) {
            Some(s) => s.parse::<CircuitKind>()?,
            None => DEFAULT_CIRCUIT,
        };

        let profile = match args.profile.as_ref().or(defaults.profile.as_ref()) {
            Some(s) if !s.trim().is_empty() => Some(s.parse::<ProfileMode>()?),
            _ => None,
        };

        let adx = args.adx || defaults.adx.unwrap_or(false);

        Ok(RunSettings { backend, phase, count, size, curve, circuit, profile, adx })
    }
}
