use super::*;
use crate::task::{Freezer, TaskId};
use core::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SleepError {
    /// Some tasks did not freeze in time. All tasks were thawed again.
    Freeze { unfrozen: usize },
    Suspend(SuspendError),
}

impl fmt::Display for SleepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SleepError::Freeze { unfrozen } => {
                write!(f, "freezing tasks failed: {} not frozen", unfrozen)
            }
            SleepError::Suspend(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl From<SuspendError> for SleepError {
    fn from(err: SuspendError) -> Self {
        SleepError::Suspend(err)
    }
}

/// Freeze, suspend, thaw.
pub struct SystemSleep {
    freezer: Freezer,
    sequencer: SuspendSequencer,
}

impl SystemSleep {
    pub fn new(freezer: Freezer, sequencer: SuspendSequencer) -> Self {
        SystemSleep { freezer, sequencer }
    }

    pub fn freezer(&self) -> &Freezer {
        &self.freezer
    }

    pub fn sequencer(&self) -> &SuspendSequencer {
        &self.sequencer
    }

    /// Put the system to sleep on behalf of `caller`, and wake it up again.
    ///
    /// Tasks are never left frozen: whatever happens after the freeze, they
    /// are thawed before returning.
    pub async fn enter(&self, caller: Option<TaskId>) -> Result<(), SleepError> {
        if !self.sequencer.is_supported() {
            // fails at the capability check, before any side effect
            self.sequencer.suspend()?;
        }

        info!("sleep: freezing tasks");
        if let Err(unfrozen) = self.freezer.freeze_processes(caller).await {
            let thawed = self.freezer.thaw_processes();
            warn!("sleep: {} tasks not frozen, thawed {}", unfrozen, thawed);
            return Err(SleepError::Freeze { unfrozen });
        }

        let ret = self.sequencer.suspend();
        let thawed = self.freezer.thaw_processes();
        info!("sleep: thawed {} tasks", thawed);
        ret.map_err(SleepError::from)
    }
}
