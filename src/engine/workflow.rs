//! Workflow: pick a concrete proof system, run the driver, assemble the record.

use std::io::Write;

use ark_bls12_381::Bls12_381;
use ark_bn254::Bn254;
use tracing::info;

use super::driver::Driver;
use super::profiler::ProfilerAttachment;
use crate::backend::{Groth16System, PlonkSystem, ProofSystem};
use crate::circuit::{CircuitKind, ExpoCircuit};
use crate::config::{FileConfig, RunArgs, RunSettings};
use crate::core::{BackendKind, Curve, HostInfo, ResultRecord, sample_memory_mib};
use crate::storage::CsvReportWriter;
use crate::{BenchError, BenchResult};

/// Resolve settings, benchmark, and write the CSV report to `out`.
///
/// Configuration is validated before anything runs, so a bad configuration
/// leaves `out` untouched.
pub fn run<W: Write>(
    backend: BackendKind,
    args: &RunArgs,
    file: &FileConfig,
    host: &HostInfo,
    out: W,
) -> BenchResult<ResultRecord> {
    let settings = RunSettings::resolve(backend, args, file)?;
    let record = execute(&settings, host)?;
    CsvReportWriter::new().write(&record, out)?;
    Ok(record)
}

/// Benchmark the configuration described by `settings`.
pub fn execute(settings: &RunSettings, host: &HostInfo) -> BenchResult<ResultRecord> {
    // profiles land in the working directory
    let profiler = ProfilerAttachment::new(settings.profile, ".");

    match (settings.backend, settings.curve, settings.circuit) {
        (BackendKind::Groth16, Curve::Bn254, CircuitKind::Expo) => measure(
            Groth16System::<Bn254, _>::new(ExpoCircuit, Curve::Bn254),
            settings,
            host,
            &profiler,
        ),
        (BackendKind::Groth16, Curve::Bls12_381, CircuitKind::Expo) => measure(
            Groth16System::<Bls12_381, _>::new(ExpoCircuit, Curve::Bls12_381),
            settings,
            host,
            &profiler,
        ),
        (BackendKind::Plonk, Curve::Pasta, CircuitKind::Expo) => {
            measure(PlonkSystem::new(ExpoCircuit), settings, host, &profiler)
        }
        (backend, curve, _) => Err(BenchError::Config(format!(
            "curve {curve} is not supported by backend {backend}"
        ))),
    }
}

/// Drive `system` through one timed sweep and build the record.
pub fn measure<S: ProofSystem>(
    system: S,
    settings: &RunSettings,
    host: &HostInfo,
    profiler: &ProfilerAttachment,
) -> BenchResult<ResultRecord> {
    let mut driver = Driver::new(system, settings.size);
    let measurement = driver.run(settings.phase, settings.count, profiler)?;
    let ram_mib = sample_memory_mib();

    let record = ResultRecord::new(
        driver.system().name(),
        driver.system().curve(),
        measurement.phase,
        measurement.stats,
        measurement.elapsed,
        measurement.count,
        measurement.proof_size_bytes,
        ram_mib,
        host.clone(),
        settings.adx && host.adx,
    );
    info!(
        backend = %record.backend,
        algorithm = %record.algorithm,
        time_ms = record.elapsed_ms() as u64,
        throughput = record.throughput,
        "benchmark complete"
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockConfig, MockSystem};
    use crate::core::Phase;
    use std::num::NonZeroU32;

    fn settings(phase: Phase) -> RunSettings {
        RunSettings {
            backend: BackendKind::Groth16,
            phase,
            count: NonZeroU32::new(1).unwrap(),
            size: 8,
            curve: Curve::Bn254,
            circuit: CircuitKind::Expo,
            profile: None,
            adx: true,
        }
    }

    #[test]
    fn test_adx_requires_host_support() {
        let system = MockSystem::default_mock();
        let host = HostInfo { adx: false, ..HostInfo::default() };
        let record =
            measure(system, &settings(Phase::Compile), &host, &ProfilerAttachment::disabled())
                .unwrap();
        assert!(!record.amd64_adx);

        let system = MockSystem::default_mock();
        let host = HostInfo { adx: true, ..HostInfo::default() };
        let record =
            measure(system, &settings(Phase::Compile), &host, &ProfilerAttachment::disabled())
                .unwrap();
        assert!(record.amd64_adx);
    }

    #[test]
    fn test_record_carries_mock_identity() {
        let system = MockSystem::new(MockConfig::new("fake-plonk").with_curve(Curve::Pasta));
        let record = measure(
            system,
            &settings(Phase::Prove),
            &HostInfo::default(),
            &ProfilerAttachment::disabled(),
        )
        .unwrap();
        assert_eq!(record.backend, "fake-plonk");
        assert_eq!(record.curve, Curve::Pasta);
        assert_eq!(record.algorithm, Phase::Prove);
        assert_eq!(record.proof_size_bytes, 128);
    }

    #[test]
    fn test_execute_real_groth16_compile() {
        let record = execute(&settings(Phase::Compile), &HostInfo::default()).unwrap();
        assert_eq!(record.backend, "groth16");
        assert_eq!(record.constraints, 9);
        assert_eq!(record.proof_size_bytes, -1);
    }

    #[test]
    fn test_execute_rejects_unsupported_pair() {
        let mut s = settings(Phase::Compile);
        s.backend = BackendKind::Plonk;
        assert!(execute(&s, &HostInfo::default()).unwrap_err().is_config());
    }
}
