//! Hardware Abstraction Layer
//!
//! Only the pieces the power management core needs are exposed: the per-CPU
//! interrupt flag, a wall clock with one-shot timers, and async helpers to
//! yield or sleep inside a task.
//!
//! # Feature flags
//!
//! - `libos`: Run on a host OS. Each host thread acts as one CPU.

#![cfg_attr(not(feature = "libos"), no_std)]

extern crate alloc;

#[macro_use]
extern crate log;

#[macro_use]
mod macros;

mod common;
mod hal_fn;

cfg_if::cfg_if! {
    if #[cfg(feature = "libos")] {
        #[path = "libos/mod.rs"]
        mod imp;
    } else {
        #[path = "unimp/mod.rs"]
        mod imp;
    }
}

pub use common::future::{sleep_until, yield_now, SleepFuture, YieldFuture};
pub use hal_fn::{cpu, interrupt, thread, timer};
pub use imp::init;
