//! Optional CPU profiler wrapped around the timed region.
//!
//! With `--profile cpu` a pprof sampler runs at 1 kHz while the phase executes.
//! Afterwards the samples are folded into `cpu.folded` and rendered as
//! `cpu_flamegraph.svg` in the output directory. Profiling problems never fail
//! the benchmark; they are logged and the run continues.

use std::fmt;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use color_eyre::eyre;
use inferno::flamegraph::{Options, TextTruncateDirection, from_lines};
use tracing::{info, warn};

use crate::BenchError;

pub const FOLDED_FILE: &str = "cpu.folded";
pub const FLAMEGRAPH_FILE: &str = "cpu_flamegraph.svg";

#[cfg(unix)]
const SAMPLE_FREQUENCY_HZ: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileMode {
    Cpu,
}

impl ProfileMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileMode::Cpu => "cpu",
        }
    }
}

impl fmt::Display for ProfileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileMode {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cpu" => Ok(ProfileMode::Cpu),
            other => Err(BenchError::Config(format!(
                "unknown profile mode '{other}' (expected cpu)"
            ))),
        }
    }
}

pub struct ProfilerAttachment {
    mode: Option<ProfileMode>,
    output_dir: PathBuf,
}

impl ProfilerAttachment {
    pub fn new(mode: Option<ProfileMode>, output_dir: impl Into<PathBuf>) -> Self {
        ProfilerAttachment { mode, output_dir: output_dir.into() }
    }

    /// Attachment that only runs the wrapped closure.
    pub fn disabled() -> Self {
        Self::new(None, ".")
    }

    pub fn mode(&self) -> Option<ProfileMode> {
        self.mode
    }

    /// Run `f`, profiling it if a mode is set. Returns whatever `f` returns.
    pub fn around<T>(&self, f: impl FnOnce() -> T) -> T {
        match self.mode {
            None => f(),
            Some(ProfileMode::Cpu) => self.around_cpu(f),
        }
    }

    #[cfg(unix)]
    fn around_cpu<T>(&self, f: impl FnOnce() -> T) -> T {
        let guard = pprof::ProfilerGuardBuilder::default()
            .frequency(SAMPLE_FREQUENCY_HZ)
            .blocklist(&["libc", "libgcc", "pthread", "vdso"])
            .build();
        let guard = match guard {
            Ok(guard) => Some(guard),
            Err(e) => {
                warn!(error = %e, "failed to start cpu profiler; continuing without it");
                None
            }
        };

        let out = f();

        if let Some(guard) = guard {
            if let Err(e) = self.finish_cpu(guard) {
                warn!(error = %e, "failed to write cpu profile");
            }
        }
        out
    }

    #[cfg(not(unix))]
    fn around_cpu<T>(&self, f: impl FnOnce() -> T) -> T {
        warn!("cpu profiling is only supported on unix; continuing without it");
        f()
    }

    #[cfg(unix)]
    fn finish_cpu(&self, guard: pprof::ProfilerGuard<'_>) -> eyre::Result<()> {
        let report = guard.report().build()?;
        drop(guard);

        let mut lines: Vec<String> = report
            .data
            .iter()
            .map(|(frames, count)| {
                let mut stack = vec![frames.thread_name.clone()];
                // pprof stores the leaf frame first
                for frame in frames.frames.iter().rev() {
                    for symbol in frame.iter().rev() {
                        stack.push(symbol.name());
                    }
                }
                format!("{} {}", stack.join(";"), count)
            })
            .collect();
        lines.sort();

        let folded_path = self.output_dir.join(FOLDED_FILE);
        write_folded(&lines, &folded_path)?;
        let svg_path = self.output_dir.join(FLAMEGRAPH_FILE);
        generate_flamegraph(&lines, "cpu profile", &svg_path)?;
        info!(folded = %folded_path.display(), flamegraph = %svg_path.display(), "wrote cpu profile");
        Ok(())
    }
}

pub fn write_folded(lines: &[String], path: &Path) -> eyre::Result<()> {
    let mut body = lines.join("\n");
    body.push('\n');
    std::fs::write(path, body)?;
    Ok(())
}

/// Render folded stack lines into a flamegraph SVG.
pub fn generate_flamegraph(lines: &[String], title: &str, output_path: &Path) -> eyre::Result<()> {
    let flamegraph_file = std::fs::File::create(output_path)?;
    let flamegraph_writer = BufWriter::new(flamegraph_file);

    let mut options = Options::default();
    options.hash = true;
    options.deterministic = true;
    options.title = title.to_string();
    options.frame_height = 24;
    options.color_diffusion = true;
    options.min_width = 0.0;
    options.count_name = "samples".to_string();
    options.text_truncate_direction = TextTruncateDirection::Right;

    from_lines(&mut options, lines.iter().map(|s| s.as_str()), flamegraph_writer)?;
    Ok(())
}
