//! Collaborators that record every call into a shared [`CallLog`], together
//! with the interrupt flag of the calling CPU at that moment.

use super::*;
use crate::PmError;
use alloc::{
    string::{String, ToString},
    sync::Arc,
    vec::Vec,
};
use spin::Mutex;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Call {
    Legacy(PmRequest, usize),
    Notify(String),
    Disable(String),
    SaveState(String),
    PowerDown(String),
    Indicator(IndicatorEvent),
    PlatformEnter(usize),
    PowerOn(String),
    ClockRestore,
    RestoreState(String),
    Enable(String),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Record {
    pub call: Call,
    pub intr_enabled: bool,
}

#[derive(Default)]
pub struct CallLog {
    records: Mutex<Vec<Record>>,
}

impl CallLog {
    pub fn new() -> Arc<Self> {
        Arc::new(CallLog::default())
    }

    fn push(&self, call: Call) {
        trace!("mock call: {:?}", call);
        self.records.lock().push(Record {
            call,
            intr_enabled: kernel_hal::interrupt::intr_get(),
        });
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.records.lock().iter().map(|r| r.call.clone()).collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.records.lock().iter().filter(|r| pred(&r.call)).count()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

pub struct MockDevice {
    name: String,
    log: Arc<CallLog>,
    veto: Mutex<Option<PmError>>,
}

impl MockDevice {
    pub fn new(name: &str, log: &Arc<CallLog>) -> Arc<Self> {
        Arc::new(MockDevice {
            name: name.to_string(),
            log: log.clone(),
            veto: Mutex::new(None),
        })
    }

    /// Refuse the next suspends with `error`, or accept them again with `None`.
    pub fn set_veto(&self, error: Option<PmError>) {
        *self.veto.lock() = error;
    }
}

impl DevicePm for MockDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify(&self, _level: usize) -> PmResult {
        self.log.push(Call::Notify(self.name.clone()));
        match *self.veto.lock() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn disable(&self, _level: usize) {
        self.log.push(Call::Disable(self.name.clone()));
    }

    fn save_state(&self, _level: usize) {
        self.log.push(Call::SaveState(self.name.clone()));
    }

    fn power_down(&self, _level: usize) {
        self.log.push(Call::PowerDown(self.name.clone()));
    }

    fn power_on(&self) {
        self.log.push(Call::PowerOn(self.name.clone()));
    }

    fn restore_state(&self) {
        self.log.push(Call::RestoreState(self.name.clone()));
    }

    fn enable(&self) {
        self.log.push(Call::Enable(self.name.clone()));
    }
}

pub struct MockLegacyPm {
    log: Arc<CallLog>,
    fail_suspend: Mutex<Option<PmError>>,
    fail_resume: Mutex<Option<PmError>>,
}

impl MockLegacyPm {
    pub fn new(log: &Arc<CallLog>) -> Arc<Self> {
        Arc::new(MockLegacyPm {
            log: log.clone(),
            fail_suspend: Mutex::new(None),
            fail_resume: Mutex::new(None),
        })
    }

    /// Fail the next `Suspend` broadcasts with `error`.
    pub fn set_fail_suspend(&self, error: Option<PmError>) {
        *self.fail_suspend.lock() = error;
    }

    /// Fail the next `Resume` broadcasts with `error`.
    pub fn set_fail_resume(&self, error: Option<PmError>) {
        *self.fail_resume.lock() = error;
    }
}

impl LegacyPm for MockLegacyPm {
    fn send_all(&self, request: PmRequest, data: usize) -> PmResult {
        self.log.push(Call::Legacy(request, data));
        let fail = match request {
            PmRequest::Suspend => *self.fail_suspend.lock(),
            PmRequest::Resume => *self.fail_resume.lock(),
        };
        match fail {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

pub struct MockPlatform {
    log: Arc<CallLog>,
}

impl MockPlatform {
    pub fn new(log: &Arc<CallLog>) -> Arc<Self> {
        Arc::new(MockPlatform { log: log.clone() })
    }
}

impl PlatformSuspend for MockPlatform {
    fn enter(&self, level: usize) {
        self.log.push(Call::PlatformEnter(level));
    }
}

pub struct MockIndicator {
    log: Arc<CallLog>,
}

impl MockIndicator {
    pub fn new(log: &Arc<CallLog>) -> Arc<Self> {
        Arc::new(MockIndicator { log: log.clone() })
    }
}

impl Indicator for MockIndicator {
    fn event(&self, event: IndicatorEvent) {
        self.log.push(Call::Indicator(event));
    }
}

pub struct MockClock {
    log: Arc<CallLog>,
}

impl MockClock {
    pub fn new(log: &Arc<CallLog>) -> Arc<Self> {
        Arc::new(MockClock { log: log.clone() })
    }
}

impl ClockRestore for MockClock {
    fn restore(&self) {
        self.log.push(Call::ClockRestore);
    }
}
