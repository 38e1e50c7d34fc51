//! Objects for Task Management.

use {
    crate::{PmError, PmResult},
    alloc::{
        collections::BTreeMap,
        string::{String, ToString},
        sync::Arc,
        vec::Vec,
    },
    bitflags::bitflags,
    core::{
        future::Future,
        pin::Pin,
        sync::atomic::{AtomicU64, Ordering},
        task::{Context, Poll, Waker},
    },
    futures::{future::FutureExt, select_biased},
    spin::{Mutex, RwLock},
};

mod freeze_state;
mod freezer;

pub use self::freeze_state::FreezeState;
pub use self::freezer::*;

use self::freeze_state::AtomicFreezeState;

pub type TaskId = u64;

bitflags! {
    /// Static attributes fixed when the task is created.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct TaskFlags: u32 {
        /// Services I/O the suspend path itself depends on. Never frozen.
        const IO_WORKER = 1 << 0;
        /// Runs kernel code only.
        const KERNEL = 1 << 1;
    }
}

/// Scheduling state, owned by the general process subsystem.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SchedState {
    /// Runnable or running.
    Running,
    /// Sleeping in an interruptible wait.
    Blocked,
    /// Parked in the refrigerator.
    Stopped,
    /// Exited, not yet reaped.
    Zombie,
    /// Reaped.
    Dead,
}

/// A schedulable entity as seen by the freezer.
///
/// Tasks are plain futures driven by the executor. A task cooperates with the
/// freezer by calling [`Task::try_to_freeze`] at points where it holds no
/// device state, and by blocking through [`Task::wait_interruptible`] so that
/// a freeze request can reach it while it sleeps.
pub struct Task {
    id: TaskId,
    name: String,
    flags: TaskFlags,
    freeze: AtomicFreezeState,
    inner: Mutex<TaskInner>,
    events: Arc<FreezeEvent>,
}

struct TaskInner {
    sched: SchedState,
    /// State to go back to when thawed.
    saved: Option<SchedState>,
    /// Waker of the task while it sits in the refrigerator.
    frozen_waker: Option<Waker>,
    /// Waker of the task while it sits in an interruptible wait.
    kick: Option<Waker>,
}

impl Task {
    /// Create a new running task and add it to `list`.
    pub fn create(list: &Arc<TaskList>, name: &str, flags: TaskFlags) -> Arc<Self> {
        let task = Arc::new(Task {
            id: Self::new_id(),
            name: name.to_string(),
            flags,
            freeze: AtomicFreezeState::new(),
            inner: Mutex::new(TaskInner {
                sched: SchedState::Running,
                saved: None,
                frozen_waker: None,
                kick: None,
            }),
            events: list.events.clone(),
        });
        list.add(task.clone());
        task
    }

    fn new_id() -> TaskId {
        static ID: AtomicU64 = AtomicU64::new(1);
        ID.fetch_add(1, Ordering::SeqCst)
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> TaskFlags {
        self.flags
    }

    pub fn sched_state(&self) -> SchedState {
        self.inner.lock().sched
    }

    pub fn freeze_state(&self) -> FreezeState {
        self.freeze.load()
    }

    /// Has the freezer asked this task to freeze?
    pub fn freezing(&self) -> bool {
        self.freeze.load() == FreezeState::FreezeRequested
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze.load() == FreezeState::Frozen
    }

    /// Whether the freezer running on behalf of `caller` must freeze this task.
    pub fn is_freezable(&self, caller: Option<TaskId>) -> bool {
        if caller == Some(self.id) || self.flags.contains(TaskFlags::IO_WORKER) {
            return false;
        }
        !matches!(self.sched_state(), SchedState::Zombie | SchedState::Dead)
    }

    /// Terminate the task. It stays in the list as a zombie until reaped.
    pub fn exit(&self) {
        let mut inner = self.inner.lock();
        inner.sched = SchedState::Zombie;
        inner.saved = None;
    }

    /// Ask the task to freeze and kick it out of an interruptible wait.
    ///
    /// Returns `Ok(true)` if this call made the request, `Ok(false)` if the
    /// task was already asked or already frozen.
    pub(crate) fn request_freeze(&self) -> PmResult<bool> {
        let mut inner = self.inner.lock();
        match self.freeze.load() {
            FreezeState::FreezeRequested | FreezeState::Frozen => return Ok(false),
            FreezeState::Running => {}
        }
        self.freeze
            .transition(FreezeState::Running, FreezeState::FreezeRequested)?;
        if let Some(waker) = inner.kick.take() {
            waker.wake();
        }
        Ok(true)
    }

    /// Undo a freeze. A frozen task is woken and gets its previous scheduling
    /// state back; a task that was asked but never froze only loses the
    /// request.
    ///
    /// Returns whether a frozen task was woken.
    pub(crate) fn thaw(&self) -> bool {
        let mut inner = self.inner.lock();
        match self.freeze.load() {
            FreezeState::Running => false,
            FreezeState::FreezeRequested => {
                // The lock serializes us with the task's own transition.
                let _ = self
                    .freeze
                    .transition(FreezeState::FreezeRequested, FreezeState::Running);
                debug!("task {} ({}) was not frozen", self.id, self.name);
                false
            }
            FreezeState::Frozen => {
                let _ = self.freeze.transition(FreezeState::Frozen, FreezeState::Running);
                if let Some(state) = inner.saved.take() {
                    inner.sched = state;
                }
                if let Some(waker) = inner.frozen_waker.take() {
                    waker.wake();
                }
                true
            }
        }
    }

    /// Freeze now if the freezer asked for it.
    ///
    /// Returns whether the task went through the refrigerator.
    pub async fn try_to_freeze(&self) -> bool {
        if !self.freezing() {
            return false;
        }
        self.refrigerator().await.is_ok()
    }

    /// Park the calling task until it is thawed.
    ///
    /// Must be called by the task on itself. The task stops, marks itself
    /// frozen, and does not return until `thaw_processes` clears the mark.
    /// Fails with `BAD_STATE` if no freeze was requested.
    pub async fn refrigerator(&self) -> PmResult {
        {
            let mut inner = self.inner.lock();
            self.freeze
                .transition(FreezeState::FreezeRequested, FreezeState::Frozen)?;
            let prev = core::mem::replace(&mut inner.sched, SchedState::Stopped);
            inner.saved = Some(prev);
        }
        debug!("task {} ({}) entered refrigerator", self.id, self.name);
        self.events.notify();

        FrozenChecker { task: self }.await;
        debug!("task {} ({}) left refrigerator", self.id, self.name);
        Ok(())
    }

    /// Run `future` as an interruptible wait.
    ///
    /// The task is `Blocked` while waiting. If the freezer asks this task to
    /// freeze, the wait is abandoned with `INTERNAL_INTR_RETRY` so the caller
    /// can call [`Task::try_to_freeze`] and retry.
    pub async fn wait_interruptible<F>(&self, future: F) -> PmResult<F::Output>
    where
        F: Future + Unpin,
    {
        {
            let mut inner = self.inner.lock();
            if self.freezing() {
                return Err(PmError::INTERNAL_INTR_RETRY);
            }
            inner.sched = SchedState::Blocked;
        }
        let mut future = future.fuse();
        let mut kick = FreezeKick { task: self }.fuse();
        let ret = select_biased! {
            output = future => Ok(output),
            _ = kick => Err(PmError::INTERNAL_INTR_RETRY),
        };
        let mut inner = self.inner.lock();
        inner.kick = None;
        if inner.sched == SchedState::Blocked {
            inner.sched = SchedState::Running;
        }
        ret
    }
}

#[must_use = "the refrigerator does nothing unless polled/`await`-ed"]
struct FrozenChecker<'a> {
    task: &'a Task,
}

impl Future for FrozenChecker<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
        let mut inner = self.task.inner.lock();
        if self.task.freeze.load() != FreezeState::Frozen {
            return Poll::Ready(());
        }
        inner.frozen_waker = Some(cx.waker().clone());
        Poll::Pending
    }
}

#[must_use = "the kick does nothing unless polled/`await`-ed"]
struct FreezeKick<'a> {
    task: &'a Task,
}

impl Future for FreezeKick<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
        let mut inner = self.task.inner.lock();
        if self.task.freeze.load() == FreezeState::FreezeRequested {
            return Poll::Ready(());
        }
        inner.kick = Some(cx.waker().clone());
        Poll::Pending
    }
}

/// The set of all tasks the freezer walks.
///
/// Readers traverse under the read lock; tasks are added and reaped under the
/// write lock.
pub struct TaskList {
    tasks: RwLock<BTreeMap<TaskId, Arc<Task>>>,
    events: Arc<FreezeEvent>,
}

impl TaskList {
    pub fn new() -> Arc<Self> {
        Arc::new(TaskList {
            tasks: RwLock::new(BTreeMap::new()),
            events: Arc::new(FreezeEvent::default()),
        })
    }

    fn add(&self, task: Arc<Task>) {
        self.tasks.write().insert(task.id, task);
    }

    /// Remove an exited task from the list for good.
    pub fn reap(&self, id: TaskId) -> PmResult<Arc<Task>> {
        let task = self.tasks.write().remove(&id).ok_or(PmError::NOT_FOUND)?;
        task.inner.lock().sched = SchedState::Dead;
        Ok(task)
    }

    pub fn get(&self, id: TaskId) -> Option<Arc<Task>> {
        self.tasks.read().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }

    /// Snapshot of all tasks in id order.
    pub fn tasks(&self) -> Vec<Arc<Task>> {
        self.tasks.read().values().cloned().collect()
    }

    /// Call `f` on every task under the read lock.
    pub fn for_each(&self, mut f: impl FnMut(&Arc<Task>)) {
        for task in self.tasks.read().values() {
            f(task);
        }
    }

    pub(crate) fn events(&self) -> &Arc<FreezeEvent> {
        &self.events
    }
}
