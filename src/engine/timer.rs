//! Phase Timer: average wall-clock latency of a repeated operation.

use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use crate::BenchResult;

/// Run `op` `count` times back to back and return the mean iteration time.
///
/// A single `Instant` brackets the whole loop. No warm-up, no outlier
/// rejection. The first error aborts the loop and is returned as-is.
pub fn average<F>(count: NonZeroU32, mut op: F) -> BenchResult<Duration>
where
    F: FnMut() -> BenchResult<()>,
{
    let start = Instant::now();
    for _ in 0..count.get() {
        op()?;
    }
    Ok(start.elapsed() / count.get())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BenchError;
    use crate::core::Phase;
    use std::thread;

    fn n(count: u32) -> NonZeroU32 {
        NonZeroU32::new(count).unwrap()
    }

    #[test]
    fn test_runs_op_count_times() {
        let mut calls = 0;
        average(n(7), || {
            calls += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(calls, 7);
    }

    #[test]
    fn test_average_of_fixed_delay() {
        let delay = Duration::from_millis(20);
        let avg = average(n(3), || {
            thread::sleep(delay);
            Ok(())
        })
        .unwrap();
        assert!(avg >= delay, "average {avg:?} below injected delay");
        assert!(avg < delay * 5, "average {avg:?} far above injected delay");
    }

    #[test]
    fn test_first_error_stops_loop() {
        let mut calls = 0;
        let err = average(n(5), || {
            calls += 1;
            if calls == 2 {
                return Err(BenchError::backend(Phase::Prove, "boom"));
            }
            Ok(())
        })
        .unwrap_err();
        assert_eq!(calls, 2);
        assert_eq!(err.to_string(), "prove failed: boom");
    }
}
