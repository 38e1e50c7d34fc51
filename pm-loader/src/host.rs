//! Suspend collaborators for a host run. Nothing is powered down for real;
//! every step is logged and the visible state is tracked in atomics.

use kernel_hal::interrupt;
use power_object::dev::*;
use power_object::{PmError, PmResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub struct HostDevice {
    name: String,
    veto: bool,
    powered: AtomicBool,
}

impl HostDevice {
    pub fn new(name: &str, veto: bool) -> Arc<Self> {
        Arc::new(HostDevice {
            name: name.into(),
            veto,
            powered: AtomicBool::new(true),
        })
    }

    pub fn is_powered(&self) -> bool {
        self.powered.load(Ordering::SeqCst)
    }
}

impl DevicePm for HostDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify(&self, level: usize) -> PmResult {
        if self.veto {
            warn!("{}: busy, refusing sleep level {}", self.name, level);
            return Err(PmError::SHOULD_WAIT);
        }
        debug!("{}: prepare for sleep level {}", self.name, level);
        Ok(())
    }

    fn save_state(&self, _level: usize) {
        trace!("{}: save state", self.name);
    }

    fn power_down(&self, _level: usize) {
        debug!("{}: power down", self.name);
        self.powered.store(false, Ordering::SeqCst);
    }

    fn power_on(&self) {
        debug!("{}: power on", self.name);
        self.powered.store(true, Ordering::SeqCst);
    }

    fn restore_state(&self) {
        trace!("{}: restore state", self.name);
    }
}

/// Counts the broadcasts to legacy devices.
#[derive(Default)]
pub struct HostLegacyPm {
    suspends: AtomicUsize,
    resumes: AtomicUsize,
}

impl HostLegacyPm {
    pub fn new() -> Arc<Self> {
        Arc::new(HostLegacyPm::default())
    }

    pub fn suspends(&self) -> usize {
        self.suspends.load(Ordering::SeqCst)
    }

    pub fn resumes(&self) -> usize {
        self.resumes.load(Ordering::SeqCst)
    }
}

impl LegacyPm for HostLegacyPm {
    fn send_all(&self, request: PmRequest, data: usize) -> PmResult {
        debug!("legacy broadcast: {:?} {}", request, data);
        let counter = match request {
            PmRequest::Suspend => &self.suspends,
            PmRequest::Resume => &self.resumes,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct HostPlatform {
    entries: AtomicUsize,
}

impl HostPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(HostPlatform::default())
    }

    /// How many times the low power state was entered.
    pub fn entries(&self) -> usize {
        self.entries.load(Ordering::SeqCst)
    }
}

impl PlatformSuspend for HostPlatform {
    fn enter(&self, level: usize) {
        if interrupt::intr_get() {
            error!("entering sleep level {} with interrupts on", level);
        }
        info!("cpu {}: sleeping at level {}", kernel_hal::cpu::cpu_id(), level);
        self.entries.fetch_add(1, Ordering::SeqCst);
        // one wakeup is as good as a real sleep here
        interrupt::wait_for_interrupt();
    }
}

pub struct HostIndicator;

impl Indicator for HostIndicator {
    fn event(&self, event: IndicatorEvent) {
        info!("indicator: {:?}", event);
    }
}

pub struct HostClock;

impl ClockRestore for HostClock {
    fn restore(&self) {
        debug!("clock restored at {:?}", kernel_hal::timer::timer_now());
    }
}
