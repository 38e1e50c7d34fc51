use super::*;
use crate::config::SuspendConfig;
use crate::dev::*;
use crate::PmError;
use alloc::sync::Arc;
use kernel_hal::interrupt;
use spin::Mutex;

/// Counters over all cycles run by one sequencer.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct SuspendStats {
    pub success: u64,
    pub fail: u64,
    pub last_failed_phase: Option<SuspendPhase>,
    pub last_error: Option<PmError>,
}

/// Drives legacy devices, device-model devices and the platform through the
/// phases of one suspend cycle.
///
/// ## Failure handling
///
/// Only the first three phases can abort:
///
/// - no platform suspend hook: nothing has been touched, fail as
///   `NOT_SUPPORTED`;
/// - the legacy broadcast fails: nothing else has been touched, fail;
/// - a device vetoes `notify`: the legacy devices are told to resume, fail.
///
/// Every later device callback is best effort. Once the legacy suspend
/// broadcast went out, a matching resume broadcast always follows.
///
/// The sequencer assumes tasks were frozen beforehand. It does not check,
/// see [`SystemSleep`](super::SystemSleep) for a caller that does both.
pub struct SuspendSequencer {
    devices: Arc<DeviceRegistry>,
    legacy: Arc<dyn LegacyPm>,
    platform: Option<Arc<dyn PlatformSuspend>>,
    indicator: Option<Arc<dyn Indicator>>,
    clock: Option<Arc<dyn ClockRestore>>,
    config: SuspendConfig,
    stats: Mutex<SuspendStats>,
}

impl SuspendSequencer {
    pub fn new(
        devices: Arc<DeviceRegistry>,
        legacy: Arc<dyn LegacyPm>,
        config: SuspendConfig,
    ) -> Self {
        SuspendSequencer {
            devices,
            legacy,
            platform: None,
            indicator: None,
            clock: None,
            config,
            stats: Mutex::new(SuspendStats::default()),
        }
    }

    pub fn with_platform(mut self, platform: Arc<dyn PlatformSuspend>) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_indicator(mut self, indicator: Arc<dyn Indicator>) -> Self {
        self.indicator = Some(indicator);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn ClockRestore>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Is a platform suspend hook registered?
    pub fn is_supported(&self) -> bool {
        self.platform.is_some()
    }

    pub fn devices(&self) -> &Arc<DeviceRegistry> {
        &self.devices
    }

    pub fn stats(&self) -> SuspendStats {
        *self.stats.lock()
    }

    /// Run one suspend cycle. Returns after the system has resumed, or as
    /// soon as one of the checked phases fails.
    pub fn suspend(&self) -> SuspendResult {
        let ret = self.run();
        let mut stats = self.stats.lock();
        match ret {
            Ok(()) => stats.success += 1,
            Err(err) => {
                stats.fail += 1;
                stats.last_failed_phase = Some(err.phase());
                stats.last_error = Some(err.cause());
            }
        }
        ret
    }

    fn run(&self) -> SuspendResult {
        let level = self.config.level;

        let platform = match &self.platform {
            Some(platform) => platform,
            None => {
                warn!("suspend: no platform suspend hook");
                return Err(SuspendError::new(
                    SuspendPhase::CapabilityCheck,
                    PmError::NOT_SUPPORTED,
                ));
            }
        };

        phase_start(SuspendPhase::LegacyNotify);
        if let Err(err) = self.legacy.send_all(PmRequest::Suspend, level) {
            warn!("suspend: legacy devices refused: {:?}", err);
            return Err(SuspendError::new(SuspendPhase::LegacyNotify, err));
        }

        let ret = self.devices_and_enter(platform.as_ref(), level);

        phase_start(SuspendPhase::LegacyResume);
        if let Err(err) = self.legacy.send_all(PmRequest::Resume, 0) {
            debug!("suspend: legacy resume broadcast: {:?}", err);
        }
        ret
    }

    fn devices_and_enter(&self, platform: &dyn PlatformSuspend, level: usize) -> SuspendResult {
        let devices = self.devices.snapshot();

        phase_start(SuspendPhase::DeviceNotify);
        for dev in devices.suspend_order() {
            if let Err(err) = dev.notify(level) {
                warn!("suspend: device {:?} refused: {:?}", dev.name(), err);
                return Err(SuspendError::new(SuspendPhase::DeviceNotify, err));
            }
        }

        phase_start(SuspendPhase::DeviceDisable);
        devices.suspend_order().for_each(|dev| dev.disable(level));
        phase_start(SuspendPhase::DeviceSaveState);
        devices.suspend_order().for_each(|dev| dev.save_state(level));
        phase_start(SuspendPhase::DevicePowerDown);
        devices.suspend_order().for_each(|dev| dev.power_down(level));

        phase_start(SuspendPhase::HardwareSuspend);
        interrupt::intr_off();
        self.indicate(IndicatorEvent::Enter);
        platform.enter(level);
        self.indicate(IndicatorEvent::Leave);
        interrupt::intr_on();
        info!("suspend: back from sleep level {}", level);

        phase_start(SuspendPhase::DevicePowerOn);
        devices.resume_order().for_each(|dev| dev.power_on());
        phase_start(SuspendPhase::ClockRestore);
        if let Some(clock) = &self.clock {
            clock.restore();
        }
        phase_start(SuspendPhase::DeviceRestoreState);
        devices.resume_order().for_each(|dev| dev.restore_state());
        phase_start(SuspendPhase::DeviceEnable);
        devices.resume_order().for_each(|dev| dev.enable());

        if self.devices.version() != devices.version() {
            warn!(
                "suspend: device registry changed during the cycle ({} -> {})",
                devices.version(),
                self.devices.version()
            );
        }
        Ok(())
    }

    fn indicate(&self, event: IndicatorEvent) {
        if let Some(indicator) = &self.indicator {
            indicator.event(event);
        }
    }
}

fn phase_start(phase: SuspendPhase) {
    trace!("suspend: phase {} ({})", phase as u8, phase);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dev::mock::*;
    use alloc::{vec, vec::Vec};

    struct Bench {
        log: Arc<CallLog>,
        legacy: Arc<MockLegacyPm>,
        devices: Arc<DeviceRegistry>,
        bus: Arc<MockDevice>,
        disk: Arc<MockDevice>,
    }

    fn bench() -> Bench {
        let log = CallLog::new();
        let devices = DeviceRegistry::new();
        let bus = MockDevice::new("bus", &log);
        let disk = MockDevice::new("disk", &log);
        devices.register(bus.clone()).unwrap();
        devices.register(disk.clone()).unwrap();
        Bench {
            legacy: MockLegacyPm::new(&log),
            log,
            devices,
            bus,
            disk,
        }
    }

    fn full_sequencer(b: &Bench) -> SuspendSequencer {
        SuspendSequencer::new(b.devices.clone(), b.legacy.clone(), SuspendConfig::default())
            .with_platform(MockPlatform::new(&b.log))
            .with_indicator(MockIndicator::new(&b.log))
            .with_clock(MockClock::new(&b.log))
    }

    fn n(name: &str) -> alloc::string::String {
        name.into()
    }

    fn legacy_resumes(log: &CallLog) -> usize {
        log.count(|c| *c == Call::Legacy(PmRequest::Resume, 0))
    }

    fn legacy_suspends(log: &CallLog) -> usize {
        log.count(|c| matches!(c, Call::Legacy(PmRequest::Suspend, _)))
    }

    #[test]
    fn full_cycle() {
        let b = bench();
        let seq = full_sequencer(&b);
        assert_eq!(seq.suspend(), Ok(()));

        let expected = vec![
            Call::Legacy(PmRequest::Suspend, 3),
            Call::Notify(n("disk")),
            Call::Notify(n("bus")),
            Call::Disable(n("disk")),
            Call::Disable(n("bus")),
            Call::SaveState(n("disk")),
            Call::SaveState(n("bus")),
            Call::PowerDown(n("disk")),
            Call::PowerDown(n("bus")),
            Call::Indicator(IndicatorEvent::Enter),
            Call::PlatformEnter(3),
            Call::Indicator(IndicatorEvent::Leave),
            Call::PowerOn(n("bus")),
            Call::PowerOn(n("disk")),
            Call::ClockRestore,
            Call::RestoreState(n("bus")),
            Call::RestoreState(n("disk")),
            Call::Enable(n("bus")),
            Call::Enable(n("disk")),
            Call::Legacy(PmRequest::Resume, 0),
        ];
        assert_eq!(b.log.calls(), expected);

        // interrupts are off exactly across the indicator bracket
        let records = b.log.records();
        let off: Vec<&Call> = records
            .iter()
            .filter(|r| !r.intr_enabled)
            .map(|r| &r.call)
            .collect();
        assert_eq!(
            off,
            [
                &Call::Indicator(IndicatorEvent::Enter),
                &Call::PlatformEnter(3),
                &Call::Indicator(IndicatorEvent::Leave),
            ]
        );
        assert!(kernel_hal::interrupt::intr_get());

        let stats = seq.stats();
        assert_eq!((stats.success, stats.fail), (1, 0));
        assert_eq!(legacy_suspends(&b.log), legacy_resumes(&b.log));
    }

    #[test]
    fn unsupported_has_no_side_effects() {
        let b = bench();
        let seq = SuspendSequencer::new(
            b.devices.clone(),
            b.legacy.clone(),
            SuspendConfig::default(),
        )
        .with_indicator(MockIndicator::new(&b.log))
        .with_clock(MockClock::new(&b.log));
        assert!(!seq.is_supported());

        let err = seq.suspend().unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(err.phase(), SuspendPhase::CapabilityCheck);
        assert_eq!(err.cause(), PmError::NOT_SUPPORTED);
        assert!(b.log.calls().is_empty());
        assert!(kernel_hal::interrupt::intr_get());
    }

    #[test]
    fn legacy_refusal_aborts_immediately() {
        let b = bench();
        b.legacy.set_fail_suspend(Some(PmError::IO));
        let seq = full_sequencer(&b);

        let err = seq.suspend().unwrap_err();
        assert_eq!(err, SuspendError::new(SuspendPhase::LegacyNotify, PmError::IO));
        assert_eq!(b.log.calls(), [Call::Legacy(PmRequest::Suspend, 3)]);
        assert_eq!(legacy_resumes(&b.log), 0);
    }

    #[test]
    fn device_veto_rolls_back_legacy_only() {
        let b = bench();
        b.disk.set_veto(Some(PmError::SHOULD_WAIT));
        let seq = full_sequencer(&b);

        let err = seq.suspend().unwrap_err();
        assert_eq!(err.phase(), SuspendPhase::DeviceNotify);
        assert_eq!(err.cause(), PmError::SHOULD_WAIT);
        assert_eq!(
            b.log.calls(),
            [
                Call::Legacy(PmRequest::Suspend, 3),
                Call::Notify(n("disk")),
                Call::Legacy(PmRequest::Resume, 0),
            ]
        );
        assert_eq!(legacy_resumes(&b.log), 1);
        assert_eq!(
            b.log.count(|c| matches!(
                c,
                Call::Disable(_) | Call::SaveState(_) | Call::PowerDown(_) | Call::PowerOn(_)
            )),
            0
        );

        let stats = seq.stats();
        assert_eq!(stats.fail, 1);
        assert_eq!(stats.last_failed_phase, Some(SuspendPhase::DeviceNotify));
        assert_eq!(stats.last_error, Some(PmError::SHOULD_WAIT));
    }

    #[test]
    fn later_veto_leaves_notified_devices_alone() {
        let b = bench();
        b.bus.set_veto(Some(PmError::SHOULD_WAIT));
        let seq = full_sequencer(&b);

        let err = seq.suspend().unwrap_err();
        assert_eq!(err, SuspendError::new(SuspendPhase::DeviceNotify, PmError::SHOULD_WAIT));
        // disk was notified first, it gets no undo of its own
        assert_eq!(
            b.log.calls(),
            [
                Call::Legacy(PmRequest::Suspend, 3),
                Call::Notify(n("disk")),
                Call::Notify(n("bus")),
                Call::Legacy(PmRequest::Resume, 0),
            ]
        );
        assert!(b.log.records().iter().all(|r| r.intr_enabled));
    }

    #[test]
    fn legacy_resume_failure_is_ignored() {
        let b = bench();
        b.legacy.set_fail_resume(Some(PmError::IO));
        let seq = full_sequencer(&b);

        assert_eq!(seq.suspend(), Ok(()));
        assert_eq!(b.log.calls().last(), Some(&Call::Legacy(PmRequest::Resume, 0)));
        let stats = seq.stats();
        assert_eq!((stats.success, stats.fail), (1, 0));
        assert_eq!(stats.last_error, None);

        // a veto is still reported as the veto
        b.disk.set_veto(Some(PmError::SHOULD_WAIT));
        let err = seq.suspend().unwrap_err();
        assert_eq!(err, SuspendError::new(SuspendPhase::DeviceNotify, PmError::SHOULD_WAIT));
        assert_eq!(seq.stats().last_error, Some(PmError::SHOULD_WAIT));
        assert_eq!(legacy_suspends(&b.log), legacy_resumes(&b.log));
    }

    #[test]
    fn retry_after_veto_is_clean() {
        let b = bench();
        let seq = full_sequencer(&b);
        b.disk.set_veto(Some(PmError::SHOULD_WAIT));
        assert!(seq.suspend().is_err());
        b.disk.set_veto(None);
        b.log.clear();
        assert_eq!(seq.suspend(), Ok(()));
        assert_eq!(legacy_suspends(&b.log), 1);
        assert_eq!(legacy_resumes(&b.log), 1);
        assert_eq!(b.log.count(|c| *c == Call::PlatformEnter(3)), 1);
        let stats = seq.stats();
        assert_eq!((stats.success, stats.fail), (1, 1));
    }

    #[test]
    fn optional_hooks_and_no_devices() {
        let log = CallLog::new();
        let seq = SuspendSequencer::new(
            DeviceRegistry::new(),
            Arc::new(NullLegacyPm),
            SuspendConfig { level: 1 },
        )
        .with_platform(MockPlatform::new(&log));
        assert_eq!(seq.suspend(), Ok(()));
        assert_eq!(log.calls(), [Call::PlatformEnter(1)]);
        assert!(!log.records()[0].intr_enabled);
    }
}
