//! System suspend: the phase sequencer and the freeze + suspend composition.

use crate::PmError;
use core::fmt;

mod phase;
mod sequencer;
mod sleep;

pub use self::{phase::*, sequencer::*, sleep::*};

/// A suspend cycle that stopped early.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SuspendError {
    phase: SuspendPhase,
    cause: PmError,
}

impl SuspendError {
    pub fn new(phase: SuspendPhase, cause: PmError) -> Self {
        SuspendError { phase, cause }
    }

    /// The phase that failed.
    pub fn phase(&self) -> SuspendPhase {
        self.phase
    }

    pub fn cause(&self) -> PmError {
        self.cause
    }

    /// The platform cannot suspend at all. Nothing was touched.
    pub fn is_unsupported(&self) -> bool {
        self.phase == SuspendPhase::CapabilityCheck
    }
}

impl fmt::Display for SuspendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "suspend failed at {}: {}", self.phase, self.cause)
    }
}

pub type SuspendResult = Result<(), SuspendError>;
