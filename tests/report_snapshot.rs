//! Snapshot tests for the CSV report.
//!
//! The expected output is written inline so any change to column order or
//! formatting shows up as a diff here.

use std::time::Duration;

use zk_bench::backend::ConstraintSystemStats;
use zk_bench::core::{Curve, HostInfo, NO_PROOF, Phase, ResultRecord};
use zk_bench::storage::CsvReportWriter;

const HEADER: &str = "backend,curve,algorithm,nbConstraints,nbInternal,nbSecret,nbPublic,\
nbCoefficients,ram(MiB),time(ms),throughput(constraints/s),throughputPerCore(constraints/s),\
nbPhysicalCores,nbThreadsPerCore,nbLogicalCores,cacheLine,l1d,l1i,l2,l3,freq,adx,cpu,\
amd64_adx,count,proofSize(bytes)";

fn fixed_host() -> HostInfo {
    HostInfo {
        physical_cores: 8,
        threads_per_core: 2,
        logical_cores: 16,
        cache_line: 64,
        l1d: 49_152,
        l1i: 32_768,
        l2: 2_097_152,
        l3: 33_554_432,
        freq_mhz: 3600,
        brand: "AMD Ryzen 9 7950X".to_string(),
        adx: true,
    }
}

fn stats() -> ConstraintSystemStats {
    ConstraintSystemStats {
        constraints: 10_001,
        internal_variables: 10_000,
        secret_variables: 1,
        public_variables: 2,
        coefficients: 30_003,
    }
}

fn render(record: &ResultRecord) -> String {
    let mut buf = Vec::new();
    CsvReportWriter::new().write(record, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn test_prove_record_snapshot() {
    let record = ResultRecord::new(
        "groth16",
        Curve::Bn254,
        Phase::Prove,
        stats(),
        Duration::from_millis(250),
        2,
        128,
        512,
        fixed_host(),
        true,
    );

    let expected = format!(
        "{HEADER}\n\
         groth16,bn254,prove,10001,10000,1,2,30003,512,250,40004,2500,8,2,16,64,49152,32768,\
         2097152,33554432,3600,true,AMD Ryzen 9 7950X,true,2,128\n"
    );
    assert_eq!(render(&record), expected);
}

#[test]
fn test_sub_millisecond_compile_snapshot() {
    let record = ResultRecord::new(
        "plonk",
        Curve::Pasta,
        Phase::Compile,
        stats(),
        Duration::from_micros(800),
        3,
        NO_PROOF,
        40,
        fixed_host(),
        false,
    );

    let expected = format!(
        "{HEADER}\n\
         plonk,pasta,compile,10001,10000,1,2,30003,40,0,0,0,8,2,16,64,49152,32768,\
         2097152,33554432,3600,true,AMD Ryzen 9 7950X,false,3,-1\n"
    );
    assert_eq!(render(&record), expected);
}

#[test]
fn test_unknown_host_core_count() {
    let host = HostInfo { logical_cores: 0, ..fixed_host() };
    let record = ResultRecord::new(
        "groth16",
        Curve::Bls12_381,
        Phase::Verify,
        stats(),
        Duration::from_millis(250),
        1,
        192,
        0,
        host,
        false,
    );
    assert_eq!(record.throughput, 40_004);
    assert_eq!(record.throughput_per_core, 0);
    assert!(render(&record).lines().nth(1).unwrap().starts_with("groth16,bls12_381,verify,"));
}
