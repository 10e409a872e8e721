//! Integration tests for the backend driver.
//!
//! These tests drive `Driver` with `MockSystem`, so no proving library work
//! happens. Delays are injected to check the timer's averaging.

use std::num::NonZeroU32;
use std::time::Duration;

use zk_bench::BenchError;
use zk_bench::backend::{ConstraintSystemStats, MockCalls, MockConfig, MockSystem};
use zk_bench::core::{Curve, NO_PROOF, Phase};
use zk_bench::engine::{Driver, DriverState, ProfilerAttachment};

fn count(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap()
}

/// Groth16-like mock: offers a dummy setup.
fn groth16_style() -> MockConfig {
    MockConfig::new("groth16").with_dummy_setup().with_proof_size(128)
}

/// PlonK-like mock: no dummy setup.
fn plonk_style() -> MockConfig {
    MockConfig::new("plonk").with_curve(Curve::Pasta).with_proof_size(1376)
}

#[test]
fn test_compile_scenario_recompiles_each_iteration() {
    let mut driver = Driver::new(MockSystem::new(groth16_style()), 100);
    let m = driver.run(Phase::Compile, count(3), &ProfilerAttachment::disabled()).unwrap();

    assert_eq!(m.phase, Phase::Compile);
    assert_eq!(m.count, 3);
    assert_eq!(m.proof_size_bytes, NO_PROOF);
    assert_eq!(
        driver.system().calls(),
        MockCalls { compile: 3, ..MockCalls::default() }
    );
    assert_eq!(driver.state(), DriverState::Compiled);
}

#[test]
fn test_prove_scenario_sets_up_once() {
    let mut driver = Driver::new(MockSystem::new(plonk_style()), 10);
    let m = driver.run(Phase::Prove, count(5), &ProfilerAttachment::disabled()).unwrap();

    assert_eq!(
        driver.system().calls(),
        MockCalls {
            compile: 1,
            derive_artifacts: 1,
            setup: 1,
            dummy_setup: 0,
            witness: 1,
            prove: 5,
            verify: 0,
        }
    );
    assert!(m.proof_size_bytes >= 0);
    assert_eq!(m.proof_size_bytes, 1376);
    assert_eq!(driver.state(), DriverState::Proved);
}

#[test]
fn test_prove_uses_dummy_setup_when_available() {
    let mut driver = Driver::new(MockSystem::new(groth16_style()), 10);
    driver.run(Phase::Prove, count(2), &ProfilerAttachment::disabled()).unwrap();

    let calls = driver.system().calls();
    assert_eq!(calls.dummy_setup, 1);
    assert_eq!(calls.setup, 0);
    assert!(!driver.has_verifying_key());
}

#[test]
fn test_verify_scenario_reuses_one_proof() {
    let mut driver = Driver::new(MockSystem::new(groth16_style()), 10);
    let m = driver.run(Phase::Verify, count(4), &ProfilerAttachment::disabled()).unwrap();

    let calls = driver.system().calls();
    assert_eq!(calls.setup, 1, "verify must use a real setup");
    assert_eq!(calls.dummy_setup, 0);
    assert_eq!(calls.prove, 1);
    assert_eq!(calls.verify, 4);
    assert_eq!(m.proof_size_bytes, 128);
}

#[test]
fn test_average_matches_injected_delay() {
    let delay = Duration::from_millis(15);
    let config = plonk_style().with_prove_delay(delay);
    let mut driver = Driver::new(MockSystem::new(config), 10);
    let m = driver.run(Phase::Prove, count(4), &ProfilerAttachment::disabled()).unwrap();

    assert!(m.elapsed >= delay, "average {:?} below per-call delay", m.elapsed);
    assert!(m.elapsed < delay * 4, "average {:?} looks like a total, not a mean", m.elapsed);
}

#[test]
fn test_untimed_phases_excluded_from_average() {
    // setup is slow, prove is fast: the prove average must not include setup
    let config = plonk_style()
        .with_setup_delay(Duration::from_millis(200))
        .with_prove_delay(Duration::from_millis(1));
    let mut driver = Driver::new(MockSystem::new(config), 10);
    let m = driver.run(Phase::Prove, count(2), &ProfilerAttachment::disabled()).unwrap();
    assert!(m.elapsed < Duration::from_millis(100), "got {:?}", m.elapsed);
}

#[test]
fn test_verify_in_compiled_state_fails() {
    let mut driver = Driver::new(MockSystem::new(plonk_style()), 10);
    driver.compile().unwrap();
    assert_eq!(driver.state(), DriverState::Compiled);

    let err = driver.verify().unwrap_err();
    assert!(matches!(err, BenchError::InvalidState(_)));
    assert_eq!(driver.system().calls().verify, 0);
}

#[test]
fn test_verify_after_dummy_setup_fails() {
    let mut driver = Driver::new(MockSystem::new(groth16_style()), 10);
    driver.compile().unwrap();
    driver.dummy_setup().unwrap();
    driver.prove().unwrap();
    assert_eq!(driver.state(), DriverState::Proved);

    let err = driver.verify().unwrap_err();
    assert!(matches!(err, BenchError::InvalidState(_)));
    assert!(err.to_string().contains("verifying key"));
}

#[test]
fn test_backend_failure_aborts_sweep() {
    let config = plonk_style().verify_fails();
    let mut driver = Driver::new(MockSystem::new(config), 10);
    let err = driver
        .run(Phase::Verify, count(5), &ProfilerAttachment::disabled())
        .unwrap_err();

    assert!(matches!(err, BenchError::Backend { phase: Phase::Verify, .. }));
    assert_eq!(driver.system().calls().verify, 1, "no retry after a failed iteration");
}

#[test]
fn test_stats_pass_through() {
    let stats = ConstraintSystemStats {
        constraints: 42,
        internal_variables: 7,
        secret_variables: 3,
        public_variables: 2,
        coefficients: 99,
    };
    let mut driver = Driver::new(MockSystem::new(plonk_style().with_stats(stats)), 10);
    let m = driver.run(Phase::Setup, count(1), &ProfilerAttachment::disabled()).unwrap();
    assert_eq!(m.stats, stats);
    assert_eq!(m.proof_size_bytes, NO_PROOF);
}
