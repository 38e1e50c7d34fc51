use alloc::boxed::Box;
use core::{future::Future, pin::Pin, time::Duration};

hal_fn_def! {
    backend = crate::imp::HalImpl;

    pub mod cpu {
        /// Current CPU ID.
        pub fn cpu_id() -> u8 { 0 }
    }

    pub mod interrupt {
        /// Enable interrupts on the current CPU.
        pub fn intr_on();

        /// Disable interrupts on the current CPU.
        pub fn intr_off();

        /// Are interrupts enabled on the current CPU?
        pub fn intr_get() -> bool;

        /// Suspend the CPU (also enable interrupts) and wait for an interrupt
        /// to occurs, then disable interrupts.
        pub fn wait_for_interrupt();
    }

    pub mod thread {
        /// Spawn a new task.
        pub fn spawn(future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>);
    }

    pub mod timer {
        /// Get current time.
        pub fn timer_now() -> Duration;

        /// Set a new timer. After `deadline`, the `callback` will be called.
        pub fn timer_set(
            deadline: Duration,
            callback: Box<dyn FnOnce(Duration) + Send + Sync>
        );
    }
}
