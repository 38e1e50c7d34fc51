use crate::{PmError, PmResult};
use core::convert::TryFrom;
use core::sync::atomic::{AtomicU8, Ordering};
use numeric_enum_macro::numeric_enum;

numeric_enum! {
    #[repr(u8)]
    #[derive(Debug, Clone, Copy, Eq, PartialEq)]
    /// Freezer view of a task.
    ///
    /// The only legal transitions are:
    ///
    /// ```text
    /// Running --(freezer request)--> FreezeRequested --(task itself)--> Frozen
    ///    ^                                  |                              |
    ///    +------------(thaw)----------------+-------------(thaw)-----------+
    /// ```
    pub enum FreezeState {
        Running = 0,
        FreezeRequested = 1,
        Frozen = 2,
    }
}

/// A [`FreezeState`] that changes only by compare-and-swap.
pub(super) struct AtomicFreezeState(AtomicU8);

impl AtomicFreezeState {
    pub const fn new() -> Self {
        AtomicFreezeState(AtomicU8::new(FreezeState::Running as u8))
    }

    pub fn load(&self) -> FreezeState {
        let raw = self.0.load(Ordering::Acquire);
        FreezeState::try_from(raw)
            .unwrap_or_else(|_| unreachable!("corrupt freeze state {}", raw))
    }

    /// Move from `from` to `to`, failing with `BAD_STATE` if the current
    /// state is not `from` or the edge is not part of the state machine.
    pub fn transition(&self, from: FreezeState, to: FreezeState) -> PmResult {
        use FreezeState::*;
        match (from, to) {
            (Running, FreezeRequested) | (FreezeRequested, Frozen) => {}
            (FreezeRequested, Running) | (Frozen, Running) => {}
            _ => return Err(PmError::BAD_STATE),
        }
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| PmError::BAD_STATE)
    }
}
