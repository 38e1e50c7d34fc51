use {
    super::*,
    crate::config::FreezerConfig,
    core::cmp::min,
    kernel_hal::{sleep_until, timer::timer_now},
};

/// Wakes whoever waits for tasks to reach the refrigerator.
#[derive(Default)]
pub(crate) struct FreezeEvent {
    waiters: Mutex<Vec<Waker>>,
}

impl FreezeEvent {
    fn register(&self, waker: &Waker) {
        let mut waiters = self.waiters.lock();
        if !waiters.iter().any(|w| w.will_wake(waker)) {
            waiters.push(waker.clone());
        }
    }

    pub(super) fn notify(&self) {
        let waiters = core::mem::take(&mut *self.waiters.lock());
        for waker in waiters {
            waker.wake();
        }
    }
}

/// Brings all freezable tasks to a stop before a system sleep, and restarts
/// them afterwards.
///
/// A task is freezable unless it is the caller, an I/O worker, or has already
/// exited. Freezing is cooperative: the freezer only raises a request and
/// kicks the task out of interruptible waits, the task itself enters the
/// refrigerator.
pub struct Freezer {
    tasks: Arc<TaskList>,
    config: FreezerConfig,
}

impl Freezer {
    pub fn new(tasks: Arc<TaskList>, config: FreezerConfig) -> Self {
        Freezer { tasks, config }
    }

    pub fn tasks(&self) -> &Arc<TaskList> {
        &self.tasks
    }

    pub fn config(&self) -> &FreezerConfig {
        &self.config
    }

    /// Freeze every freezable task, on behalf of `caller`.
    ///
    /// Waits until all of them are frozen or the timeout elapses. On timeout,
    /// returns the number of tasks still not frozen. Tasks that did freeze
    /// stay frozen; the caller decides whether to thaw and give up.
    pub async fn freeze_processes(&self, caller: Option<TaskId>) -> Result<(), usize> {
        let start = timer_now();
        let deadline = start + self.config.timeout;
        info!("Freezing tasks...");
        loop {
            let mut all_frozen = AllFrozen {
                freezer: self,
                caller,
            }
            .fuse();
            let next_scan = min(timer_now() + self.config.rescan_interval, deadline);
            let mut tick = sleep_until(next_scan).fuse();
            select_biased! {
                _ = all_frozen => {
                    info!("Freezing tasks done in {:?}", timer_now().saturating_sub(start));
                    return Ok(());
                }
                _ = tick => {}
            }
            if timer_now() >= deadline {
                break;
            }
        }

        let unfrozen = self.scan(caller);
        if unfrozen == 0 {
            return Ok(());
        }
        warn!(
            "Freezing of tasks failed after {:?} ({} tasks refusing to freeze)",
            timer_now().saturating_sub(start),
            unfrozen
        );
        self.tasks.for_each(|task| {
            if task.is_freezable(caller) && !task.is_frozen() {
                warn!("  task {} ({}) not frozen", task.id(), task.name());
            }
        });
        Err(unfrozen)
    }

    /// Thaw every frozen task. Returns the number of tasks woken.
    ///
    /// Tasks asked to freeze that never got there lose the request; they are
    /// not counted.
    pub fn thaw_processes(&self) -> usize {
        info!("Restarting tasks...");
        let mut woken = 0;
        self.tasks.for_each(|task| {
            if task.thaw() {
                woken += 1;
            }
        });
        info!("Restarting tasks done, {} woken", woken);
        woken
    }

    /// Number of tasks currently frozen.
    pub fn frozen_count(&self) -> usize {
        let mut count = 0;
        self.tasks.for_each(|task| {
            if task.is_frozen() {
                count += 1;
            }
        });
        count
    }

    pub fn is_frozen(&self, id: TaskId) -> bool {
        self.tasks.get(id).map_or(false, |task| task.is_frozen())
    }

    /// Request a freeze of every freezable task not frozen yet, and count them.
    fn scan(&self, caller: Option<TaskId>) -> usize {
        let mut unfrozen = 0;
        self.tasks.for_each(|task| {
            if !task.is_freezable(caller) || task.is_frozen() {
                return;
            }
            match task.request_freeze() {
                Ok(true) => trace!("freeze requested: task {} ({})", task.id(), task.name()),
                Ok(false) => {}
                Err(err) => warn!("cannot freeze task {}: {:?}", task.id(), err),
            }
            unfrozen += 1;
        });
        unfrozen
    }
}

#[must_use = "`freeze_processes()` does nothing unless polled/`await`-ed"]
struct AllFrozen<'a> {
    freezer: &'a Freezer,
    caller: Option<TaskId>,
}

impl Future for AllFrozen<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
        // register before scanning, so that a task freezing in between
        // still wakes us
        self.freezer.tasks.events().register(cx.waker());
        if self.freezer.scan(self.caller) == 0 {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}
