mod cpu;
mod interrupt;
mod thread;
mod timer;

/// Host implementation of every HAL module.
pub(crate) struct HalImpl;

/// Initialize the HAL.
///
/// This function must be called at the beginning.
pub fn init() {
    info!(
        "libos HAL ready on cpu {}, interrupts {}",
        crate::cpu::cpu_id(),
        if crate::interrupt::intr_get() { "on" } else { "off" }
    );
}
