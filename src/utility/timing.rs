// ============================================
// TIMING UTILITY - Performance Measurement
// ============================================
// Usage:
//   1. Manual tracking: let timer = Timer::start("name"); ... timer.stop();
//   2. Slow-path only:  let timer = Timer::start_with_threshold("name", 500);
//   3. Async wrapper:   let result = timed_async("name", || async { .. }).await;
// A timer dropped without stop() (early return via `?`) still logs once.
// ============================================

use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Timer for measuring execution time
pub struct Timer {
    name: String,
    start: Instant,
    threshold_ms: Option<u128>,
    logged: bool,
}

impl Timer {
    /// Create a new timer that logs every measurement at info
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
            threshold_ms: None,
            logged: false,
        }
    }

    /// Create a timer that only logs (at warn) if execution exceeds threshold
    pub fn start_with_threshold(name: impl Into<String>, threshold_ms: u128) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
            threshold_ms: Some(threshold_ms),
            logged: false,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }

    /// Stop the timer and log the result
    pub fn stop(mut self) -> Duration {
        let duration = self.start.elapsed();
        self.log_duration(duration);
        duration
    }

    fn log_duration(&mut self, duration: Duration) {
        if self.logged {
            return;
        }
        self.logged = true;

        let ms = duration.as_millis();
        match self.threshold_ms {
            Some(threshold) if ms < threshold => {}
            Some(threshold) => {
                warn!(operation = %self.name, elapsed_ms = ms as u64, threshold_ms = threshold as u64, "Slow operation");
            }
            None => {
                info!(operation = %self.name, elapsed_ms = ms as u64, "Timed operation");
            }
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.log_duration(duration);
    }
}

/// Time an async function (shorthand)
pub async fn timed_async<F, Fut, R>(name: impl Into<String>, f: F) -> R
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = R>,
{
    let timer = Timer::start(name);
    let result = f().await;
    timer.stop();
    result
}
