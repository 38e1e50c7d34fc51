//! Power management kernel objects
//!
//! Two independent pieces bring the system to sleep and back:
//!
//! - [`task::Freezer`] quiesces every freezable task and later thaws them.
//! - [`suspend::SuspendSequencer`] walks the registered devices through the
//!   ordered suspend phases around the hardware suspend instant.
//!
//! [`suspend::SystemSleep`] composes both into one sleep cycle.
//!
//! # Feature flags
//!
//! - `libos`: Run on a host OS through the libos HAL.

#![no_std]

extern crate alloc;

#[macro_use]
extern crate log;

#[cfg(test)]
extern crate std;

pub mod config;
pub mod dev;
mod error;
pub mod suspend;
pub mod task;

pub use self::error::*;
