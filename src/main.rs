#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use zk_bench::config::{RunArgs, load_file_config};
use zk_bench::core::{BackendKind, HostInfo};
use zk_bench::engine::workflow;

const EXIT_FAILURE: i32 = -1;

#[derive(Parser, Debug)]
#[command(name = "zk-bench", version)]
#[command(about = "Benchmark compile, setup, prove and verify for zk proof systems", long_about = None)]
struct Cli {
    /// Enable verbose logging (or set ZK_BENCH_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    /// TOML file with a [defaults] table; flags take precedence
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Benchmark Groth16 (arkworks) over bn254 or bls12_381
    Groth16(RunArgs),
    /// Benchmark PlonK (halo2, IPA) over the Pasta curves
    Plonk(RunArgs),
}

impl Commands {
    fn backend(&self) -> BackendKind {
        match self {
            Commands::Groth16(_) => BackendKind::Groth16,
            Commands::Plonk(_) => BackendKind::Plonk,
        }
    }

    fn args(&self) -> &RunArgs {
        match self {
            Commands::Groth16(args) | Commands::Plonk(args) => args,
        }
    }
}

fn init_tracing(verbose: bool) {
    let env = std::env::var("ZK_BENCH_LOG").unwrap_or_else(|_| {
        if verbose { "zk_bench=debug".to_string() } else { "zk_bench=info".to_string() }
    });
    let _ = tracing_subscriber::fmt()
        .with_span_events(FmtSpan::ACTIVE)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn print_usage(subcommand: &str) {
    let mut cmd = Cli::command();
    if let Some(sub) = cmd.find_subcommand_mut(subcommand) {
        eprintln!("{}", sub.render_help());
    }
}

fn main() {
    color_eyre::install().ok();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(EXIT_FAILURE);
        }
    };
    init_tracing(cli.verbose);

    let backend = cli.command.backend();
    let file_config = match cli.config.as_deref().map(load_file_config).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("error: {e:#}");
            print_usage(backend.as_str());
            std::process::exit(EXIT_FAILURE);
        }
    };

    let host = HostInfo::detect();
    let stdout = std::io::stdout();
    let result = workflow::run(backend, cli.command.args(), &file_config, &host, stdout.lock());

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        if e.is_config() {
            print_usage(backend.as_str());
        }
        std::process::exit(EXIT_FAILURE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommand_flags() {
        let cli = Cli::try_parse_from([
            "zk-bench", "--verbose", "plonk", "--algo", "verify", "--count", "3", "--size", "64",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.command.backend(), BackendKind::Plonk);
        let args = cli.command.args();
        assert_eq!(args.algo.as_deref(), Some("verify"));
        assert_eq!(args.count, Some(3));
        assert_eq!(args.size, Some(64));
        assert!(!args.adx);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["zk-bench", "groth16", "--adx", "--config", "bench.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("bench.toml")));
        assert!(cli.command.args().adx);
        assert_eq!(cli.command.backend(), BackendKind::Groth16);
    }
}
