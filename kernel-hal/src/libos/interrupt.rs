//! Each host thread plays one CPU, so the interrupt flag is thread local.

use super::HalImpl;
use std::cell::Cell;

std::thread_local! {
    static INTR_ENABLED: Cell<bool> = Cell::new(true);
}

impl crate::hal_fn::interrupt::HalOps for HalImpl {
    fn intr_on() {
        INTR_ENABLED.with(|f| f.set(true));
    }

    fn intr_off() {
        INTR_ENABLED.with(|f| f.set(false));
    }

    fn intr_get() -> bool {
        INTR_ENABLED.with(|f| f.get())
    }

    fn wait_for_interrupt() {
        std::thread::yield_now();
    }
}
