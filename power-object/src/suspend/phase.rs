use core::fmt;
use numeric_enum_macro::numeric_enum;

numeric_enum! {
    #[repr(u8)]
    #[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
    /// The steps of one suspend cycle, in the order they run.
    pub enum SuspendPhase {
        CapabilityCheck = 0,
        LegacyNotify = 1,
        DeviceNotify = 2,
        DeviceDisable = 3,
        DeviceSaveState = 4,
        DevicePowerDown = 5,
        HardwareSuspend = 6,
        DevicePowerOn = 7,
        ClockRestore = 8,
        DeviceRestoreState = 9,
        DeviceEnable = 10,
        LegacyResume = 11,
    }
}

impl SuspendPhase {
    pub const ALL: [SuspendPhase; 12] = [
        SuspendPhase::CapabilityCheck,
        SuspendPhase::LegacyNotify,
        SuspendPhase::DeviceNotify,
        SuspendPhase::DeviceDisable,
        SuspendPhase::DeviceSaveState,
        SuspendPhase::DevicePowerDown,
        SuspendPhase::HardwareSuspend,
        SuspendPhase::DevicePowerOn,
        SuspendPhase::ClockRestore,
        SuspendPhase::DeviceRestoreState,
        SuspendPhase::DeviceEnable,
        SuspendPhase::LegacyResume,
    ];

    /// Can a failure in this phase abort the cycle?
    pub fn is_checked(self) -> bool {
        matches!(
            self,
            SuspendPhase::CapabilityCheck | SuspendPhase::LegacyNotify | SuspendPhase::DeviceNotify
        )
    }

    /// Does this phase run on the way back up?
    pub fn is_resume(self) -> bool {
        self > SuspendPhase::HardwareSuspend
    }
}

impl fmt::Display for SuspendPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SuspendPhase::CapabilityCheck => "capability check",
            SuspendPhase::LegacyNotify => "legacy notify",
            SuspendPhase::DeviceNotify => "device notify",
            SuspendPhase::DeviceDisable => "device disable",
            SuspendPhase::DeviceSaveState => "device save state",
            SuspendPhase::DevicePowerDown => "device power down",
            SuspendPhase::HardwareSuspend => "hardware suspend",
            SuspendPhase::DevicePowerOn => "device power on",
            SuspendPhase::ClockRestore => "clock restore",
            SuspendPhase::DeviceRestoreState => "device restore state",
            SuspendPhase::DeviceEnable => "device enable",
            SuspendPhase::LegacyResume => "legacy resume",
        };
        f.write_str(name)
    }
}
