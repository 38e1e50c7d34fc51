use super::HalImpl;
use alloc::boxed::Box;
use core::{future::Future, pin::Pin};

impl crate::hal_fn::thread::HalOps for HalImpl {
    fn spawn(future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>) {
        async_std::task::spawn(future);
    }
}
