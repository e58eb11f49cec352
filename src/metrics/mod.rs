//! Contention Metrics
//!
//! Counters shared by every atomkit container. They answer the questions that
//! matter for CAS-based structures: how often a CAS had to be retried, how often
//! a thread finished another thread's work, and how long operations took.
//!
//! Collection is compiled in with the `metrics` feature (on by default). Without
//! it, [`AtomicMetrics`] is a zero-sized no-op and snapshots are all zeros.

use std::time::Duration;

/// Point-in-time view of a container's counters
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ContentionMetrics {
    /// Operations that ran to completion (including those that found nothing)
    pub operations: u64,
    /// Operations that completed without a value: empty pops, absent keys
    pub empty_results: u64,
    /// Failed CAS attempts that were retried
    pub cas_retries: u64,
    /// Steps taken on behalf of another thread (tail advances, waits on a grow)
    pub helping_steps: u64,
    /// Completed map grows
    pub resizes: u64,
    /// Average latency of completed operations in nanoseconds
    pub avg_operation_time_ns: u64,
    /// Slowest completed operation in nanoseconds
    pub max_operation_time_ns: u64,
}

impl ContentionMetrics {
    /// Retries per completed operation, as a percentage
    pub fn retry_rate(&self) -> f64 {
        if self.operations == 0 {
            0.0
        } else {
            (self.cas_retries as f64 / self.operations as f64) * 100.0
        }
    }

    /// Share of operations that found nothing, as a percentage
    pub fn empty_rate(&self) -> f64 {
        if self.operations == 0 {
            0.0
        } else {
            (self.empty_results as f64 / self.operations as f64) * 100.0
        }
    }

    /// Average operation latency
    pub fn avg_operation_time(&self) -> Duration {
        Duration::from_nanos(self.avg_operation_time_ns)
    }

    /// Maximum operation latency
    pub fn max_operation_time(&self) -> Duration {
        Duration::from_nanos(self.max_operation_time_ns)
    }
}

/// Containers that expose [`ContentionMetrics`]
pub trait MetricsCollector {
    /// Snapshot the current counters
    fn metrics(&self) -> ContentionMetrics;

    /// Zero every counter
    fn reset_metrics(&self);

    /// Turn collection on or off at runtime
    fn set_metrics_enabled(&self, enabled: bool);

    /// Whether collection is currently on
    fn is_metrics_enabled(&self) -> bool;
}

#[cfg(feature = "metrics")]
pub use self::recorder::{AtomicMetrics, OpTimer};

#[cfg(not(feature = "metrics"))]
pub use self::noop::{AtomicMetrics, OpTimer};

#[cfg(feature = "metrics")]
mod recorder {
    use super::ContentionMetrics;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::time::Instant;

    /// Start time of an in-flight operation
    #[derive(Debug, Clone, Copy)]
    pub struct OpTimer(Option<Instant>);

    /// Lock-free counter block embedded in each container
    #[derive(Debug)]
    pub struct AtomicMetrics {
        enabled: AtomicBool,
        operations: AtomicU64,
        empty_results: AtomicU64,
        cas_retries: AtomicU64,
        helping_steps: AtomicU64,
        resizes: AtomicU64,
        total_time_ns: AtomicU64,
        max_time_ns: AtomicU64,
    }

    impl Default for AtomicMetrics {
        fn default() -> Self {
            Self {
                enabled: AtomicBool::new(true),
                operations: AtomicU64::new(0),
                empty_results: AtomicU64::new(0),
                cas_retries: AtomicU64::new(0),
                helping_steps: AtomicU64::new(0),
                resizes: AtomicU64::new(0),
                total_time_ns: AtomicU64::new(0),
                max_time_ns: AtomicU64::new(0),
            }
        }
    }

    impl AtomicMetrics {
        #[inline]
        fn on(&self) -> bool {
            self.enabled.load(Ordering::Relaxed)
        }

        /// Begin timing an operation
        #[inline]
        pub fn start(&self) -> OpTimer {
            OpTimer(self.on().then(Instant::now))
        }

        /// Record a completed operation that produced or stored a value
        pub fn record_success(&self, timer: OpTimer) {
            self.complete(timer);
        }

        /// Record a completed operation that found nothing
        pub fn record_empty(&self, timer: OpTimer) {
            if timer.0.is_some() && self.on() {
                self.empty_results.fetch_add(1, Ordering::Relaxed);
            }
            self.complete(timer);
        }

        /// Record one failed CAS
        #[inline]
        pub fn record_retry(&self) {
            if self.on() {
                self.cas_retries.fetch_add(1, Ordering::Relaxed);
            }
        }

        /// Record one step performed for another thread
        #[inline]
        pub fn record_help(&self) {
            if self.on() {
                self.helping_steps.fetch_add(1, Ordering::Relaxed);
            }
        }

        /// Record a completed grow
        pub fn record_resize(&self) {
            if self.on() {
                self.resizes.fetch_add(1, Ordering::Relaxed);
            }
        }

        fn complete(&self, timer: OpTimer) {
            // Operations that started while collection was off stay uncounted.
            let Some(started) = timer.0 else { return };
            if !self.on() {
                return;
            }
            let elapsed = started.elapsed().as_nanos() as u64;

            self.operations.fetch_add(1, Ordering::Relaxed);
            self.total_time_ns.fetch_add(elapsed, Ordering::Relaxed);

            let mut current_max = self.max_time_ns.load(Ordering::Relaxed);
            while elapsed > current_max {
                match self.max_time_ns.compare_exchange_weak(
                    current_max,
                    elapsed,
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => break,
                    Err(x) => current_max = x,
                }
            }
        }

        /// Current counters
        pub fn snapshot(&self) -> ContentionMetrics {
            let operations = self.operations.load(Ordering::Relaxed);
            let total_time = self.total_time_ns.load(Ordering::Relaxed);

            ContentionMetrics {
                operations,
                empty_results: self.empty_results.load(Ordering::Relaxed),
                cas_retries: self.cas_retries.load(Ordering::Relaxed),
                helping_steps: self.helping_steps.load(Ordering::Relaxed),
                resizes: self.resizes.load(Ordering::Relaxed),
                avg_operation_time_ns: if operations > 0 {
                    total_time / operations
                } else {
                    0
                },
                max_operation_time_ns: self.max_time_ns.load(Ordering::Relaxed),
            }
        }

        /// Zero every counter
        pub fn reset(&self) {
            self.operations.store(0, Ordering::Relaxed);
            self.empty_results.store(0, Ordering::Relaxed);
            self.cas_retries.store(0, Ordering::Relaxed);
            self.helping_steps.store(0, Ordering::Relaxed);
            self.resizes.store(0, Ordering::Relaxed);
            self.total_time_ns.store(0, Ordering::Relaxed);
            self.max_time_ns.store(0, Ordering::Relaxed);
        }

        /// Toggle collection
        pub fn set_enabled(&self, enabled: bool) {
            self.enabled.store(enabled, Ordering::Relaxed);
        }

        /// Whether collection is on
        pub fn is_enabled(&self) -> bool {
            self.on()
        }
    }
}

#[cfg(not(feature = "metrics"))]
mod noop {
    use super::ContentionMetrics;

    /// Placeholder timer when collection is compiled out
    #[derive(Debug, Clone, Copy)]
    pub struct OpTimer;

    /// No-op counter block
    #[derive(Debug, Default)]
    pub struct AtomicMetrics;

    #[allow(missing_docs)]
    impl AtomicMetrics {
        #[inline]
        pub fn start(&self) -> OpTimer {
            OpTimer
        }
        #[inline]
        pub fn record_success(&self, _timer: OpTimer) {}
        #[inline]
        pub fn record_empty(&self, _timer: OpTimer) {}
        #[inline]
        pub fn record_retry(&self) {}
        #[inline]
        pub fn record_help(&self) {}
        #[inline]
        pub fn record_resize(&self) {}
        pub fn snapshot(&self) -> ContentionMetrics {
            ContentionMetrics::default()
        }
        pub fn reset(&self) {}
        pub fn set_enabled(&self, _enabled: bool) {}
        pub fn is_enabled(&self) -> bool {
            false
        }
    }
}
