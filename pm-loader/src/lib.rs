//! Host runner for the power management core.
//!
//! A run builds a set of simulated tasks and devices, puts the "system" to
//! sleep once and wakes it up again. Everything is read from one command
//! line, shared with [`SleepConfig`]:
//!
//! - `TASKS=<n>`: well behaved tasks, default 4.
//! - `STUCK=<n>`: tasks that never check for a freeze, default 0.
//! - `DEVICES=<a,b,..>`: devices in registration order, default `bus,disk,uart`.
//! - `VETO=<name>`: a device that refuses to suspend.

#[macro_use]
extern crate log;

pub mod host;

use self::host::*;
use kernel_hal::{sleep_until, timer::timer_now};
use log::LevelFilter;
use power_object::config::{parse_cmdline, SleepConfig};
use power_object::dev::DeviceRegistry;
use power_object::suspend::{SleepError, SuspendSequencer, SuspendStats, SystemSleep};
use power_object::task::{FreezeState, Freezer, Task, TaskFlags, TaskList};
use power_object::{PmError, PmResult};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Scenario {
    pub tasks: usize,
    pub stuck: usize,
    pub devices: Vec<String>,
    pub veto: Option<String>,
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario {
            tasks: 4,
            stuck: 0,
            devices: ["bus", "disk", "uart"].iter().map(|s| s.to_string()).collect(),
            veto: None,
        }
    }
}

impl Scenario {
    pub fn from_cmdline(cmdline: &str) -> PmResult<Self> {
        let options = parse_cmdline(cmdline);
        let mut scenario = Scenario::default();
        if let Some(n) = options.get("TASKS") {
            scenario.tasks = n.parse().map_err(|_| PmError::INVALID_ARGS)?;
        }
        if let Some(n) = options.get("STUCK") {
            scenario.stuck = n.parse().map_err(|_| PmError::INVALID_ARGS)?;
        }
        if let Some(list) = options.get("DEVICES") {
            scenario.devices = list
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(name) = options.get("VETO") {
            if !scenario.devices.iter().any(|d| d.as_str() == *name) {
                warn!("VETO names unknown device {:?}", name);
                return Err(PmError::INVALID_ARGS);
            }
            scenario.veto = Some(name.to_string());
        }
        Ok(scenario)
    }
}

/// What one run observed.
#[derive(Debug)]
pub struct Report {
    pub result: Result<(), SleepError>,
    pub stats: SuspendStats,
    pub platform_entries: usize,
    pub legacy_suspends: usize,
    pub legacy_resumes: usize,
    pub devices_powered: usize,
    pub devices: usize,
    /// No task is left with a freeze mark after the run.
    pub all_thawed: bool,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(()) => writeln!(f, "sleep cycle: ok")?,
            Err(err) => writeln!(f, "sleep cycle: {}", err)?,
        }
        writeln!(
            f,
            "platform entries: {}, legacy suspend/resume: {}/{}",
            self.platform_entries, self.legacy_suspends, self.legacy_resumes
        )?;
        write!(
            f,
            "devices powered: {}/{}, all tasks thawed: {}",
            self.devices_powered, self.devices, self.all_thawed
        )
    }
}

/// Reset max log level. Unknown levels fall back to `warn`.
pub fn set_max_level(level: &str) {
    log::set_max_level(level.parse().unwrap_or(LevelFilter::Warn));
}

/// Run one sleep cycle as described by `cmdline`.
pub async fn run(cmdline: &str) -> PmResult<Report> {
    let config = SleepConfig::from_cmdline(cmdline)?;
    let scenario = Scenario::from_cmdline(cmdline)?;
    info!("scenario: {:?}, {:?}", scenario, config);

    let stop = Arc::new(AtomicBool::new(false));
    let list = TaskList::new();
    let me = Task::create(&list, "pm-loader", TaskFlags::KERNEL);
    spawn_io_worker(Task::create(&list, "io-worker", TaskFlags::IO_WORKER), &stop);
    for i in 0..scenario.tasks {
        let task = Task::create(&list, &format!("worker{}", i), TaskFlags::empty());
        spawn_worker(task, &stop);
    }
    for i in 0..scenario.stuck {
        let task = Task::create(&list, &format!("stuck{}", i), TaskFlags::empty());
        spawn_stuck(task, &stop);
    }

    let registry = DeviceRegistry::new();
    let mut devices = Vec::new();
    for name in scenario.devices.iter() {
        let veto = scenario.veto.as_ref() == Some(name);
        let device = HostDevice::new(name, veto);
        registry.register(device.clone())?;
        devices.push(device);
    }

    let legacy = HostLegacyPm::new();
    let platform = HostPlatform::new();
    let sequencer = SuspendSequencer::new(registry, legacy.clone(), config.suspend)
        .with_platform(platform.clone())
        .with_indicator(Arc::new(HostIndicator))
        .with_clock(Arc::new(HostClock));
    let sleep = SystemSleep::new(Freezer::new(list.clone(), config.freezer), sequencer);

    let result = sleep.enter(Some(me.id())).await;
    match &result {
        Ok(()) => info!("sleep cycle done"),
        Err(err) => warn!("sleep cycle failed: {}", err),
    }

    let report = Report {
        result,
        stats: sleep.sequencer().stats(),
        platform_entries: platform.entries(),
        legacy_suspends: legacy.suspends(),
        legacy_resumes: legacy.resumes(),
        devices_powered: devices.iter().filter(|d| d.is_powered()).count(),
        devices: devices.len(),
        all_thawed: list
            .tasks()
            .iter()
            .all(|t| t.freeze_state() == FreezeState::Running),
    };
    stop.store(true, Ordering::SeqCst);
    Ok(report)
}

/// Sleeps in short interruptible waits and freezes when asked.
fn spawn_worker(task: Arc<Task>, stop: &Arc<AtomicBool>) {
    let stop = stop.clone();
    kernel_hal::thread::spawn(Box::pin(async move {
        while !stop.load(Ordering::SeqCst) {
            task.try_to_freeze().await;
            if let Err(err) = task.wait_interruptible(sleep_until(timer_now() + TICK)).await {
                trace!("{}: wait interrupted: {:?}", task.name(), err);
            }
        }
        task.exit();
    }));
}

/// Never looks at its freeze mark.
fn spawn_stuck(task: Arc<Task>, stop: &Arc<AtomicBool>) {
    let stop = stop.clone();
    kernel_hal::thread::spawn(Box::pin(async move {
        while !stop.load(Ordering::SeqCst) {
            sleep_until(timer_now() + TICK).await;
        }
        task.exit();
    }));
}

/// Keeps running through the whole cycle, it is never asked to freeze.
fn spawn_io_worker(task: Arc<Task>, stop: &Arc<AtomicBool>) {
    let stop = stop.clone();
    kernel_hal::thread::spawn(Box::pin(async move {
        while !stop.load(Ordering::SeqCst) {
            if task.freezing() {
                error!("{}: asked to freeze", task.name());
            }
            sleep_until(timer_now() + TICK).await;
        }
        task.exit();
    }));
}
