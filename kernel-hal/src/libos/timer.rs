use super::HalImpl;
use crate::timer::timer_now;
use alloc::boxed::Box;
use async_std::task;
use std::time::{Duration, SystemTime};

impl crate::hal_fn::timer::HalOps for HalImpl {
    fn timer_now() -> Duration {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
    }

    fn timer_set(deadline: Duration, callback: Box<dyn FnOnce(Duration) + Send + Sync>) {
        let dur = deadline.saturating_sub(timer_now());
        trace!("timer_set: fire in {:?}", dur);
        task::spawn(async move {
            task::sleep(dur).await;
            callback(timer_now());
        });
    }
}
