//! Microsecond timing for individual syscalls
//!
//! Every measured phase wraps exactly one operation in a [`Stopwatch`]. The
//! stopwatch calls `clock_gettime` directly to keep per-sample overhead low;
//! with hundreds of thousands of samples per iteration the measurement cost
//! has to stay well below the latency of the cheapest syscall being timed.

/// Nanoseconds from the monotonic clock.
///
/// Also used to seed per-worker RNGs from each thread's own start time.
#[inline(always)]
pub fn monotonic_nanos() -> u64 {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };

    // SAFETY: ts is a valid timespec for clock_gettime to fill in.
    unsafe {
        libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts);
    }

    (ts.tv_sec as u64) * 1_000_000_000 + (ts.tv_nsec as u64)
}

/// Wall-clock seconds since the epoch.
///
/// Naming policies derive the sequential name prefix and the time-hash
/// rotation decision from this value.
#[inline(always)]
pub fn wall_clock_secs() -> u64 {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };

    // SAFETY: ts is a valid timespec for clock_gettime to fill in.
    unsafe {
        libc::clock_gettime(libc::CLOCK_REALTIME, &mut ts);
    }

    ts.tv_sec as u64
}

/// Microsecond stopwatch around a single operation.
#[derive(Debug, Copy, Clone)]
pub struct Stopwatch {
    start_nanos: u64,
}

impl Stopwatch {
    /// Start timing now.
    #[inline(always)]
    pub fn start() -> Self {
        Self {
            start_nanos: monotonic_nanos(),
        }
    }

    /// Microseconds elapsed since [`Stopwatch::start`].
    #[inline(always)]
    pub fn elapsed_usec(&self) -> u64 {
        monotonic_nanos().saturating_sub(self.start_nanos) / 1_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_stopwatch_measures_sleep() {
        let sw = Stopwatch::start();
        thread::sleep(Duration::from_millis(10));
        let elapsed = sw.elapsed_usec();

        // Should be at least 10ms, and nowhere near a second
        assert!(elapsed >= 10_000);
        assert!(elapsed < 1_000_000);
    }

    #[test]
    fn test_stopwatch_monotonic() {
        let sw = Stopwatch::start();
        let first = sw.elapsed_usec();
        let second = sw.elapsed_usec();
        assert!(second >= first);
    }

    #[test]
    fn test_wall_clock_secs_is_recent() {
        // Any plausible run date is well past 2020-01-01
        assert!(wall_clock_secs() > 1_577_836_800);
    }
}
