//! Collaborators of the suspend sequencer.
//!
//! Everything the sequencer touches outside itself goes through one of the
//! traits here, so a platform plugs in its own drivers and a test plugs in
//! recording fakes.

use crate::PmResult;
use numeric_enum_macro::numeric_enum;

mod registry;

#[cfg(test)]
pub(crate) mod mock;

pub use self::registry::*;

/// Power management surface of a device-model device.
///
/// Every callback is invoked once per phase. Only [`DevicePm::notify`] can
/// refuse; the other callbacks have no failure contract and are expected to
/// log their own trouble.
pub trait DevicePm: Send + Sync {
    fn name(&self) -> &str;

    /// Prepare to suspend to `level`. An error vetoes the whole suspend.
    fn notify(&self, _level: usize) -> PmResult {
        Ok(())
    }

    /// Stop issuing new work.
    fn disable(&self, _level: usize) {}

    /// Save the device context that is lost at `level`.
    fn save_state(&self, _level: usize) {}

    /// Put the device into its low power state.
    fn power_down(&self, _level: usize) {}

    fn power_on(&self) {}

    fn restore_state(&self) {}

    fn enable(&self) {}
}

numeric_enum! {
    #[repr(u32)]
    #[derive(Debug, Clone, Copy, Eq, PartialEq)]
    /// Request broadcast to legacy (pre device-model) devices.
    pub enum PmRequest {
        Suspend = 0,
        Resume = 1,
    }
}

/// Broadcast channel to legacy devices.
pub trait LegacyPm: Send + Sync {
    /// Send `request` to every legacy device. `data` is the sleep level
    /// for `Suspend` and ignored for `Resume`.
    fn send_all(&self, request: PmRequest, data: usize) -> PmResult;
}

/// A platform without legacy devices.
pub struct NullLegacyPm;

impl LegacyPm for NullLegacyPm {
    fn send_all(&self, _request: PmRequest, _data: usize) -> PmResult {
        Ok(())
    }
}

/// The low level, architecture specific suspend.
pub trait PlatformSuspend: Send + Sync {
    /// Enter the low power state at `level`. Returns once the system has
    /// woken up again. Called with interrupts disabled.
    fn enter(&self, level: usize);
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IndicatorEvent {
    /// About to enter the low power state.
    Enter,
    /// Back from the low power state.
    Leave,
}

/// Something user visible that tracks the hardware suspend, e.g. a LED.
pub trait Indicator: Send + Sync {
    fn event(&self, event: IndicatorEvent);
}

/// Restores clock settings lost across the hardware suspend.
pub trait ClockRestore: Send + Sync {
    fn restore(&self);
}
