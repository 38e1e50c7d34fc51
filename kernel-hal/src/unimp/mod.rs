//! Fallback when no backend is selected: every HAL function without a
//! default body panics.

use crate::hal_fn::{cpu, interrupt, thread, timer};

pub(crate) struct HalImpl;

impl cpu::HalOps for HalImpl {}
impl interrupt::HalOps for HalImpl {}
impl thread::HalOps for HalImpl {}
impl timer::HalOps for HalImpl {}

/// Initialize the HAL.
pub fn init() {
    unimplemented!();
}
