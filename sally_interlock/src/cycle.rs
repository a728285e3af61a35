//! Fixed-period tick runner: read → process → write → publish.
//!
//! ## RT Setup Sequence
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)`: lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity`: pin to one CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO, prio)`.
//!
//! All four are no-ops without the `rt` feature.
//!
//! ## Tick Loop
//! With `rt`, absolute-time sleep on `CLOCK_MONOTONIC` for drift-free pacing.
//! Without it, `std::thread::sleep` for the remainder of the period. An
//! overrun is counted and logged; the loop keeps going.
//!
//! ## Tick Body
//! Driver exchange (DO out, DI in) → decode → `InterlockController::tick` →
//! encode into the DO bank for the next exchange → publish status.

use std::sync::atomic::{AtomicBool, Ordering};

use sally_common::hal::driver::{DriverDiagnostics, HalError, IoDriver};
use sally_common::interlock::status::Indicators;
use sally_common::io::registry::{DiBank, DoBank, IoRegistry};
use sally_hal::DriverRegistry;
use static_assertions::assert_impl_all;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::LoadedConfig;
use crate::controller::InterlockController;
use crate::io::{decode_inputs, encode_outputs};
use crate::status::StatusPublisher;

// ─── Tick Statistics ────────────────────────────────────────────────

/// O(1) per-tick timing statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickStats {
    /// Total ticks executed.
    pub tick_count: u64,
    /// Last tick body duration [ns].
    pub last_tick_ns: i64,
    pub min_tick_ns: i64,
    pub max_tick_ns: i64,
    /// Running sum for average computation.
    pub sum_tick_ns: i64,
    /// Ticks whose body exceeded the period.
    pub overruns: u64,
    /// Maximum wake-up latency [ns] (time between expected and actual wake).
    pub max_latency_ns: i64,
}

impl TickStats {
    pub const fn new() -> Self {
        Self {
            tick_count: 0,
            last_tick_ns: 0,
            min_tick_ns: i64::MAX,
            max_tick_ns: 0,
            sum_tick_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
        }
    }

    /// Record a tick duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64) {
        self.tick_count += 1;
        self.last_tick_ns = duration_ns;
        self.min_tick_ns = self.min_tick_ns.min(duration_ns);
        self.max_tick_ns = self.max_tick_ns.max(duration_ns);
        self.sum_tick_ns = self.sum_tick_ns.saturating_add(duration_ns);
        self.max_latency_ns = self.max_latency_ns.max(latency_ns);
    }

    /// Average tick body time [ns] (0 if no ticks).
    #[inline]
    pub fn avg_tick_ns(&self) -> i64 {
        if self.tick_count == 0 {
            0
        } else {
            self.sum_tick_ns / self.tick_count as i64
        }
    }
}

impl Default for TickStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

/// Errors that stop the tick runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// RT system call failed.
    #[error("RT setup error: {0}")]
    RtSetup(String),

    /// The I/O driver failed.
    #[error("driver error: {0}")]
    Driver(#[from] HalError),
}

// ─── RT setup ───────────────────────────────────────────────────────

/// Lock all current and future memory pages.
#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), RunnerError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| RunnerError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), RunnerError> {
    Ok(())
}

/// Touch 1 MB of stack so the tick loop never faults a stack page in.
#[cfg(feature = "rt")]
fn prefault_stack() {
    let mut buf = [0u8; 1024 * 1024];
    for byte in buf.iter_mut() {
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

#[cfg(not(feature = "rt"))]
fn prefault_stack() {}

/// Pin the current thread to one CPU core.
#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), RunnerError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| RunnerError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| RunnerError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), RunnerError> {
    Ok(())
}

/// Switch to SCHED_FIFO at `priority`.
#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), RunnerError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(RunnerError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), RunnerError> {
    Ok(())
}

/// Full RT setup. Call once, from the thread that will run the loop.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), RunnerError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

// ─── Tick Runner ────────────────────────────────────────────────────

/// Owns the controller, the I/O path and the timing state.
pub struct TickRunner {
    controller: InterlockController,
    registry: IoRegistry,
    driver: Box<dyn IoDriver>,
    di_bank: DiBank,
    do_bank: DoBank,
    publisher: StatusPublisher,
    stats: TickStats,
    /// Configured tick period [ns].
    tick_period_ns: i64,
    max_ticks: Option<u64>,
}

assert_impl_all!(TickRunner: Send);

impl TickRunner {
    /// Build a runner around an already created driver and initialize it.
    pub fn new(
        loaded: LoadedConfig,
        mut driver: Box<dyn IoDriver>,
        publisher: StatusPublisher,
    ) -> Result<Self, RunnerError> {
        let LoadedConfig { config, registry } = loaded;
        driver.init(&registry)?;

        let do_bank = registry.initial_do_bank();
        let di_bank = registry.initial_di_bank();
        info!(
            "Tick runner ready: driver={}, period={} ms, open timeout={} ticks, close timeout={} ticks",
            driver.name(),
            config.timing.tick_period_ms,
            config.timing.open_timeout_ticks,
            config.timing.close_timeout_ticks
        );

        Ok(Self {
            controller: InterlockController::new(config.timing.timeouts()),
            registry,
            driver,
            di_bank,
            do_bank,
            publisher,
            stats: TickStats::new(),
            tick_period_ns: config.timing.tick_period_ns(),
            max_ticks: None,
        })
    }

    /// Create the configured driver from `drivers` and build the runner.
    pub fn from_config(
        loaded: LoadedConfig,
        drivers: &DriverRegistry,
        publisher: StatusPublisher,
    ) -> Result<Self, RunnerError> {
        let settings = loaded.config.driver_settings();
        let driver = drivers.create_driver(&loaded.config.io.driver, &settings)?;
        Self::new(loaded, driver, publisher)
    }

    /// Stop [`run`](Self::run) after `max_ticks` ticks.
    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    #[inline]
    pub fn controller(&self) -> &InterlockController {
        &self.controller
    }

    #[inline]
    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    #[inline]
    pub fn registry(&self) -> &IoRegistry {
        &self.registry
    }

    /// DO bank sent on the next exchange.
    #[inline]
    pub fn do_bank(&self) -> &DoBank {
        &self.do_bank
    }

    /// DI bank read on the last exchange.
    #[inline]
    pub fn di_bank(&self) -> &DiBank {
        &self.di_bank
    }

    pub fn driver_diagnostics(&self) -> Option<DriverDiagnostics> {
        self.driver.diagnostics()
    }

    /// One tick body.
    pub fn tick_once(&mut self) -> Result<Indicators, RunnerError> {
        // ═══ READ ═══
        self.di_bank = self.driver.exchange(&self.do_bank)?;
        let inputs = decode_inputs(&self.registry, &self.di_bank);

        // ═══ PROCESS ═══
        let indicators = self.controller.tick(&inputs);

        // ═══ WRITE ═══
        encode_outputs(&self.registry, indicators, &mut self.do_bank);
        self.publisher.publish(&self.controller.snapshot());

        Ok(indicators)
    }

    fn max_ticks_reached(&self) -> bool {
        self.max_ticks
            .is_some_and(|max| self.stats.tick_count >= max)
    }

    fn note_overrun(&mut self, duration_ns: i64) {
        if duration_ns > self.tick_period_ns {
            self.stats.overruns += 1;
            warn!(
                "tick overrun: {duration_ns} ns > {} ns budget ({} total)",
                self.tick_period_ns, self.stats.overruns
            );
        }
    }

    /// Run ticks until `running` is cleared, `max_ticks` is reached or the
    /// driver fails.
    pub fn run(&mut self, running: &AtomicBool) -> Result<TickStats, RunnerError> {
        #[cfg(feature = "rt")]
        let result = self.run_rt_loop(running);
        #[cfg(not(feature = "rt"))]
        let result = self.run_sim_loop(running);

        info!(
            "Tick loop stopped after {} ticks: avg={} ns, max={} ns, overruns={}",
            self.stats.tick_count,
            self.stats.avg_tick_ns(),
            self.stats.max_tick_ns,
            self.stats.overruns
        );
        result.map(|()| self.stats)
    }

    #[cfg(feature = "rt")]
    fn run_rt_loop(&mut self, running: &AtomicBool) -> Result<(), RunnerError> {
        use nix::time::{ClockId, ClockNanosleepFlags, clock_gettime, clock_nanosleep};

        let clock = ClockId::CLOCK_MONOTONIC;
        let now = || {
            clock_gettime(clock).map_err(|e| RunnerError::RtSetup(format!("clock_gettime: {e}")))
        };
        let mut next_wake = now()?;

        while running.load(Ordering::SeqCst) && !self.max_ticks_reached() {
            next_wake = timespec_add_ns(next_wake, self.tick_period_ns);

            let tick_start = now()?;
            self.tick_once()?;
            let tick_end = now()?;

            let duration_ns = timespec_diff_ns(&tick_end, &tick_start);
            let latency_ns = timespec_diff_ns(&tick_start, &next_wake).abs();
            self.stats.record(duration_ns, latency_ns);
            self.note_overrun(duration_ns);

            let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &next_wake);
        }
        Ok(())
    }

    #[cfg(not(feature = "rt"))]
    fn run_sim_loop(&mut self, running: &AtomicBool) -> Result<(), RunnerError> {
        use std::time::{Duration, Instant};

        let period = Duration::from_nanos(self.tick_period_ns as u64);

        while running.load(Ordering::SeqCst) && !self.max_ticks_reached() {
            let tick_start = Instant::now();
            self.tick_once()?;
            let elapsed = tick_start.elapsed();

            let duration_ns = elapsed.as_nanos() as i64;
            self.stats.record(duration_ns, 0);
            self.note_overrun(duration_ns);

            if let Some(remaining) = period.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }
        Ok(())
    }

    /// Drive every output to its `init` level and release the driver.
    pub fn shutdown(&mut self) -> Result<(), RunnerError> {
        self.do_bank = self.registry.initial_do_bank();
        if let Err(e) = self.driver.exchange(&self.do_bank) {
            warn!("final output exchange failed: {e}");
        }
        debug!("releasing driver {}", self.driver.name());
        self.driver.shutdown()?;
        Ok(())
    }
}

// ─── Time Helpers ───────────────────────────────────────────────────

/// Add nanoseconds to a TimeSpec.
#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    use nix::sys::time::TimeSpec;
    let mut secs = ts.tv_sec();
    let mut nanos = ts.tv_nsec() + ns;
    while nanos >= 1_000_000_000 {
        secs += 1;
        nanos -= 1_000_000_000;
    }
    while nanos < 0 {
        secs -= 1;
        nanos += 1_000_000_000;
    }
    TimeSpec::new(secs, nanos)
}

/// Compute the difference (a - b) in nanoseconds.
#[cfg(feature = "rt")]
fn timespec_diff_ns(a: &nix::sys::time::TimeSpec, b: &nix::sys::time::TimeSpec) -> i64 {
    (a.tv_sec() - b.tv_sec()) * 1_000_000_000 + (a.tv_nsec() - b.tv_nsec())
}

// ─── Tests ──────────────────────────────────────────────────────────
