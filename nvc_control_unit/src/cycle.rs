//! Deterministic cycle runner.
//!
//! Paces `AxisSetController::update_tick` at the configured cycle time
//! until the shutdown flag drops. With the `rt` feature the thread is
//! prepared for PREEMPT_RT (mlockall, stack prefault, CPU pinning,
//! SCHED_FIFO) and paced with absolute-deadline `clock_nanosleep`; the
//! first overrun is fatal. Without it, pacing uses `std::thread::sleep`
//! and overruns are only counted.

use crate::controller::AxisSetController;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors during RT setup or cycle execution.
#[derive(Debug, Error)]
pub enum CycleError {
    /// An RT system call failed.
    #[error("RT setup error: {0}")]
    RtSetup(String),

    /// A cycle exceeded its budget (fatal under the `rt` feature).
    #[error("cycle overrun: {actual_ns}ns > {budget_ns}ns budget")]
    Overrun {
        /// Actual cycle duration [ns].
        actual_ns: i64,
        /// Configured cycle budget [ns].
        budget_ns: i64,
    },
}

// ─── Cycle statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing statistics, updated without allocation.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: i64,
    /// Minimum cycle duration [ns].
    pub min_cycle_ns: i64,
    /// Maximum cycle duration [ns].
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
    /// Number of budget overruns observed.
    pub overruns: u64,
}

impl CycleStats {
    /// Create a zeroed stats instance.
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
        }
    }

    /// Record one cycle duration.
    #[inline]
    pub fn record(&mut self, duration_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        if duration_ns < self.min_cycle_ns {
            self.min_cycle_ns = duration_ns;
        }
        if duration_ns > self.max_cycle_ns {
            self.max_cycle_ns = duration_ns;
        }
        self.sum_cycle_ns += duration_ns;
    }

    /// Average cycle time [ns] (0 before the first cycle).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── RT setup ───────────────────────────────────────────────────────

/// Lock current and future memory pages.
#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{mlockall, MlockallFlags};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))?;
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(())
}

/// Touch a stack region so its pages are resident before the loop starts.
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

/// Pin the current thread to one CPU core.
#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{sched_setaffinity, CpuSet};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))?;
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(())
}

/// Switch to SCHED_FIFO at the given priority.
#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

/// Full RT setup sequence; call before entering the loop.
///
/// Without the `rt` feature every RT system call is a no-op.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

// ─── Runner ─────────────────────────────────────────────────────────

/// Owns the controller and paces its update tick.
pub struct CycleRunner {
    controller: AxisSetController,
    running: Arc<AtomicBool>,
    cycle_time_ns: i64,
    stats: CycleStats,
}

impl CycleRunner {
    /// Create a runner. The loop exits when `running` goes false.
    pub fn new(controller: AxisSetController, cycle_time_us: u32, running: Arc<AtomicBool>) -> Self {
        Self {
            controller,
            running,
            cycle_time_ns: cycle_time_us as i64 * 1000,
            stats: CycleStats::new(),
        }
    }

    /// Timing statistics collected so far.
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Access the controller between runs (command surface plumbing).
    pub fn controller_mut(&mut self) -> &mut AxisSetController {
        &mut self.controller
    }

    /// Take the controller back out of the runner.
    pub fn into_controller(self) -> AxisSetController {
        self.controller
    }

    /// Enter the cycle loop until the shutdown flag drops.
    ///
    /// The controller ticks with the configured cycle time as its fixed
    /// step; deadline enforcement belongs to the scheduler around us.
    pub fn run(&mut self) -> Result<(), CycleError> {
        #[cfg(feature = "rt")]
        {
            self.run_rt_loop()
        }

        #[cfg(not(feature = "rt"))]
        {
            self.run_sleep_loop()
        }
    }

    /// Absolute-deadline pacing on CLOCK_MONOTONIC: drift-free.
    #[cfg(feature = "rt")]
    fn run_rt_loop(&mut self) -> Result<(), CycleError> {
        use nix::time::{clock_gettime, clock_nanosleep, ClockId, ClockNanosleepFlags};

        let clock = ClockId::CLOCK_MONOTONIC;
        let dt = Duration::from_nanos(self.cycle_time_ns as u64);
        let mut next_wake = clock_gettime(clock)
            .map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;

        while self.running.load(Ordering::Relaxed) {
            next_wake = timespec_add_ns(next_wake, self.cycle_time_ns);

            let cycle_start = clock_gettime(clock)
                .map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;

            self.controller.update_tick(dt);

            let cycle_end = clock_gettime(clock)
                .map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;
            let duration_ns = timespec_diff_ns(&cycle_end, &cycle_start);
            self.stats.record(duration_ns);

            if duration_ns > self.cycle_time_ns {
                self.stats.overruns += 1;
                return Err(CycleError::Overrun {
                    actual_ns: duration_ns,
                    budget_ns: self.cycle_time_ns,
                });
            }

            let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &next_wake);
        }
        Ok(())
    }

    /// Relative-sleep pacing; overruns are counted, not fatal.
    #[cfg(not(feature = "rt"))]
    fn run_sleep_loop(&mut self) -> Result<(), CycleError> {
        use std::time::Instant;

        let dt = Duration::from_nanos(self.cycle_time_ns as u64);

        while self.running.load(Ordering::Relaxed) {
            let cycle_start = Instant::now();

            self.controller.update_tick(dt);

            let elapsed = cycle_start.elapsed();
            self.stats.record(elapsed.as_nanos() as i64);
            if elapsed.as_nanos() as i64 > self.cycle_time_ns {
                self.stats.overruns += 1;
            }

            if let Some(remaining) = dt.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }
        Ok(())
    }
}

// ─── Time helpers ───────────────────────────────────────────────────

#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    use nix::sys::time::TimeSpec;
    let mut secs = ts.tv_sec();
    let mut nanos = ts.tv_nsec() + ns;
    while nanos >= 1_000_000_000 {
        secs += 1;
        nanos -= 1_000_000_000;
    }
    TimeSpec::new(secs, nanos)
}

#[cfg(feature = "rt")]
fn timespec_diff_ns(a: &nix::sys::time::TimeSpec, b: &nix::sys::time::TimeSpec) -> i64 {
    (a.tv_sec() - b.tv_sec()) * 1_000_000_000 + (a.tv_nsec() - b.tv_nsec())
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::build_axes;
    use crate::notify::TracingSink;
    use crate::ports::axis_ports;
    use nvc_common::config::ControllerConfig;

    fn controller() -> AxisSetController {
        let config = ControllerConfig::default();
        let (axes, permissive) = build_axes(&config, None).unwrap();
        let (ports, _peer) = axis_ports();
        AxisSetController::new(config, axes, permissive, ports, Box::new(TracingSink))
    }

    #[test]
    fn cycle_stats_accumulate() {
        let mut stats = CycleStats::new();
        assert_eq!(stats.avg_cycle_ns(), 0);

        stats.record(400_000);
        stats.record(600_000);
        assert_eq!(stats.cycle_count, 2);
        assert_eq!(stats.last_cycle_ns, 600_000);
        assert_eq!(stats.min_cycle_ns, 400_000);
        assert_eq!(stats.max_cycle_ns, 600_000);
        assert_eq!(stats.avg_cycle_ns(), 500_000);
        assert_eq!(stats.overruns, 0);
    }

    #[test]
    fn rt_setup_without_rt_feature_is_noop() {
        #[cfg(not(feature = "rt"))]
        {
            assert!(rt_setup(0, 80).is_ok());
        }
    }

    #[test]
    fn runner_stops_when_flag_drops() {
        let running = Arc::new(AtomicBool::new(true));
        let mut runner = CycleRunner::new(controller(), 1000, running.clone());

        let stopper = {
            let running = running.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(30));
                running.store(false, Ordering::SeqCst);
            })
        };

        runner.run().unwrap();
        stopper.join().unwrap();
        assert!(runner.stats().cycle_count > 0);
    }

    #[test]
    fn overrun_error_display() {
        let err = CycleError::Overrun {
            actual_ns: 1_500_000,
            budget_ns: 1_000_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("1500000"));
        assert!(msg.contains("1000000"));
    }
}
