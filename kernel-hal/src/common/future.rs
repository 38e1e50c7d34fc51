use alloc::{boxed::Box, sync::Arc};
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};
use core::time::Duration;
use spin::Mutex;

use crate::timer;

/// Yields execution back to the async runtime.
pub fn yield_now() -> YieldFuture {
    YieldFuture::default()
}

/// Sleeps until the specified point of time.
pub fn sleep_until(deadline: Duration) -> SleepFuture {
    SleepFuture::new(deadline)
}

#[must_use = "`yield_now()` does nothing unless polled/`await`-ed"]
#[derive(Default)]
pub struct YieldFuture {
    flag: bool,
}

impl Future for YieldFuture {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
        if self.flag {
            Poll::Ready(())
        } else {
            self.flag = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

#[must_use = "`sleep_until()` does nothing unless polled/`await`-ed"]
pub struct SleepFuture {
    deadline: Duration,
    /// Waker of the latest poll, woken by the timer. `None` until armed.
    waker: Option<Arc<Mutex<Waker>>>,
}

impl SleepFuture {
    pub fn new(deadline: Duration) -> Self {
        Self {
            deadline,
            waker: None,
        }
    }
}

impl Future for SleepFuture {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
        let this = self.get_mut();
        if timer::timer_now() >= this.deadline {
            return Poll::Ready(());
        }
        match &this.waker {
            Some(slot) => {
                let mut waker = slot.lock();
                if !waker.will_wake(cx.waker()) {
                    *waker = cx.waker().clone();
                }
            }
            // one timer per future, later polls only swap the waker
            None if this.deadline.as_nanos() < i64::MAX as u128 => {
                let slot = Arc::new(Mutex::new(cx.waker().clone()));
                let fired = slot.clone();
                timer::timer_set(this.deadline, Box::new(move |_| fired.lock().wake_by_ref()));
                this.waker = Some(slot);
            }
            None => {}
        }
        // the timer may have fired before the swap
        if timer::timer_now() >= this.deadline {
            return Poll::Ready(());
        }
        Poll::Pending
    }
}

#[cfg(all(test, feature = "libos"))]
mod tests {
    use super::*;

    #[async_std::test]
    async fn sleep_reaches_deadline() {
        let deadline = timer::timer_now() + Duration::from_millis(20);
        sleep_until(deadline).await;
        assert!(timer::timer_now() >= deadline);
    }

    #[test]
    fn sleep_wakes_the_latest_waker() {
        use core::sync::atomic::{AtomicBool, Ordering};
        use std::task::Wake;

        #[derive(Default)]
        struct Flag(AtomicBool);

        impl Wake for Flag {
            fn wake(self: Arc<Self>) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let (first, second) = (Arc::new(Flag::default()), Arc::new(Flag::default()));
        let (first_waker, second_waker) = (Waker::from(first.clone()), Waker::from(second.clone()));
        let mut sleep = sleep_until(timer::timer_now() + Duration::from_millis(20));

        let mut cx = Context::from_waker(&first_waker);
        assert!(Pin::new(&mut sleep).poll(&mut cx).is_pending());
        let mut cx = Context::from_waker(&second_waker);
        assert!(Pin::new(&mut sleep).poll(&mut cx).is_pending());

        std::thread::sleep(Duration::from_millis(200));
        assert!(second.0.load(Ordering::SeqCst));
        assert!(!first.0.load(Ordering::SeqCst));
        assert!(Pin::new(&mut sleep).poll(&mut cx).is_ready());
    }

    #[async_std::test]
    async fn sleep_in_the_past_is_ready() {
        sleep_until(Duration::from_secs(0)).await;
        yield_now().await;
    }
}
