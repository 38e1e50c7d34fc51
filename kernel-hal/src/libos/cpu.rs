//! CPU information.

use super::HalImpl;
use core::sync::atomic::{AtomicU8, Ordering};

static NEXT_CPU_ID: AtomicU8 = AtomicU8::new(0);

std::thread_local! {
    static CPU_ID: u8 = NEXT_CPU_ID.fetch_add(1, Ordering::Relaxed);
}

impl crate::hal_fn::cpu::HalOps for HalImpl {
    fn cpu_id() -> u8 {
        CPU_ID.with(|id| *id)
    }
}
