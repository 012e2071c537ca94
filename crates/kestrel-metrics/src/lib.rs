//! Latency tracking and monotonic time.
//!
//! Nanosecond-precision latency measurement with HdrHistogram, plus an
//! injectable clock abstraction so the pipeline stays testable with
//! deterministic time.

use std::cell::Cell;

use hdrhistogram::Histogram;

/// High-precision latency histogram.
pub struct LatencyHistogram {
    histogram: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create a new histogram with 3 significant digits.
    pub fn new() -> Self {
        Self {
            histogram: Histogram::new(3).expect("3 sigfigs is a valid configuration"),
        }
    }

    /// Record a latency value in nanoseconds.
    #[inline(always)]
    pub fn record(&mut self, nanos: u64) {
        let _ = self.histogram.record(nanos);
    }

    /// Get value at percentile (0.0 - 100.0).
    pub fn value_at_percentile(&self, percentile: f64) -> u64 {
        self.histogram.value_at_quantile(percentile / 100.0)
    }

    /// Get P50 (median) latency.
    pub fn p50(&self) -> u64 {
        self.value_at_percentile(50.0)
    }

    /// Get P90 latency.
    pub fn p90(&self) -> u64 {
        self.value_at_percentile(90.0)
    }

    /// Get P99 latency.
    pub fn p99(&self) -> u64 {
        self.value_at_percentile(99.0)
    }

    /// Get P99.9 latency.
    pub fn p999(&self) -> u64 {
        self.value_at_percentile(99.9)
    }

    /// Get maximum latency.
    pub fn max(&self) -> u64 {
        self.histogram.max()
    }

    /// Get minimum latency.
    pub fn min(&self) -> u64 {
        self.histogram.min()
    }

    /// Get mean latency.
    pub fn mean(&self) -> f64 {
        self.histogram.mean()
    }

    /// Get total count of recorded values.
    pub fn count(&self) -> u64 {
        self.histogram.len()
    }

    /// Reset the histogram.
    pub fn reset(&mut self) {
        self.histogram.reset();
    }

    /// Print a summary of latencies.
    pub fn print_summary(&self, prefix: &str) {
        println!("{} Distribution:", prefix);
        println!("{}   P50:   {:>8} ns", prefix, self.p50());
        println!("{}   P90:   {:>8} ns", prefix, self.p90());
        println!("{}   P99:   {:>8} ns", prefix, self.p99());
        println!("{}   P99.9: {:>8} ns", prefix, self.p999());
        println!("{}   Max:   {:>8} ns", prefix, self.max());
    }

    /// Format latency with appropriate units.
    pub fn format_latency(nanos: u64) -> String {
        if nanos < 1_000 {
            format!("{} ns", nanos)
        } else if nanos < 1_000_000 {
            format!("{:.2} μs", nanos as f64 / 1_000.0)
        } else if nanos < 1_000_000_000 {
            format!("{:.2} ms", nanos as f64 / 1_000_000.0)
        } else {
            format!("{:.2} s", nanos as f64 / 1_000_000_000.0)
        }
    }
}

impl Default for LatencyHistogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Running average and peak latency, alongside the full histogram.
#[derive(Default)]
pub struct LatencyStats {
    histogram: LatencyHistogram,
    total_ns: u128,
    count: u64,
    peak_ns: u64,
}

impl LatencyStats {
    /// Create empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one latency sample in nanoseconds.
    #[inline]
    pub fn record(&mut self, nanos: u64) {
        self.histogram.record(nanos);
        self.total_ns += nanos as u128;
        self.count += 1;
        if nanos > self.peak_ns {
            self.peak_ns = nanos;
        }
    }

    /// Running average in nanoseconds, zero before any sample.
    pub fn average_ns(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            (self.total_ns / self.count as u128) as u64
        }
    }

    /// Peak latency observed.
    pub fn peak_ns(&self) -> u64 {
        self.peak_ns
    }

    /// Number of samples recorded.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Full distribution.
    pub fn histogram(&self) -> &LatencyHistogram {
        &self.histogram
    }
}

/// Monotonic time source. Injectable so the pipeline can run with
/// deterministic time in tests; a clock read never aborts the process.
pub trait Clock {
    /// Nanoseconds since the clock's origin.
    fn now_ns(&self) -> u64;
}

/// quanta-backed monotonic clock (RDTSC where available).
pub struct MonotonicClock {
    clock: quanta::Clock,
    origin: u64,
}

impl MonotonicClock {
    /// Create a new clock with its origin at construction time.
    pub fn new() -> Self {
        let clock = quanta::Clock::new();
        let origin = clock.raw();
        Self { clock, origin }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline(always)]
    fn now_ns(&self) -> u64 {
        self.clock.delta_as_nanos(self.origin, self.clock.raw())
    }
}

/// Manually advanced clock for deterministic tests.
#[derive(Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    /// Create a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by `nanos`.
    pub fn advance(&self, nanos: u64) {
        self.now.set(self.now.get() + nanos);
    }

    /// Set the absolute time.
    pub fn set(&self, nanos: u64) {
        self.now.set(nanos);
    }
}

impl Clock for ManualClock {
    #[inline(always)]
    fn now_ns(&self) -> u64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_basic() {
        let mut h = LatencyHistogram::new();

        for i in 1..=100 {
            h.record(i * 100);
        }

        assert_eq!(h.count(), 100);
        assert!(h.p50() >= 4900 && h.p50() <= 5100);
        assert_eq!(h.min(), 100);
        // HdrHistogram may round max value slightly
        assert!(h.max() >= 10000 && h.max() <= 10100);
    }

    #[test]
    fn test_format_latency() {
        assert_eq!(LatencyHistogram::format_latency(500), "500 ns");
        assert_eq!(LatencyHistogram::format_latency(5000), "5.00 μs");
        assert_eq!(LatencyHistogram::format_latency(5_000_000), "5.00 ms");
    }

    #[test]
    fn test_latency_stats() {
        let mut stats = LatencyStats::new();
        assert_eq!(stats.average_ns(), 0);

        stats.record(100);
        stats.record(300);
        stats.record(200);

        assert_eq!(stats.count(), 3);
        assert_eq!(stats.average_ns(), 200);
        assert_eq!(stats.peak_ns(), 300);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new();
        assert_eq!(clock.now_ns(), 0);
        clock.advance(50);
        clock.advance(25);
        assert_eq!(clock.now_ns(), 75);
        clock.set(1_000);
        assert_eq!(clock.now_ns(), 1_000);
    }

    #[test]
    fn test_monotonic_clock_advances() {
        let clock = MonotonicClock::new();
        let a = clock.now_ns();
        let b = clock.now_ns();
        assert!(b >= a);
    }
}
