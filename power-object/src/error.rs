use core::fmt;

/// The type returned by power management methods.
pub type PmResult<T = ()> = Result<T, PmError>;

/// Power management statuses, following the kernel status convention:
/// negative values are defined by the system, in this file. Success is
/// `Ok(())`, never a variant.
#[allow(non_camel_case_types)]
#[allow(clippy::upper_case_acronyms)]
#[repr(i32)]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PmError {
    /// The platform or backend cannot do this at all.
    NOT_SUPPORTED = -2,

    /// The wait was interrupted because the task was asked to freeze,
    /// and should be retried after thawing.
    INTERNAL_INTR_RETRY = -6,

    /// An argument is invalid.
    INVALID_ARGS = -10,

    /// A numeric option is outside its allowed range.
    OUT_OF_RANGE = -14,

    /// The current state of the object does not allow the operation,
    /// e.g. thawing a task that is not frozen.
    BAD_STATE = -20,

    /// The operation cannot be performed currently but
    /// potentially could succeed later, e.g. a device refusing to sleep
    /// while a transfer is in flight.
    SHOULD_WAIT = -22,

    NOT_FOUND = -25,

    /// A device with the same name is already registered.
    ALREADY_EXISTS = -26,

    /// A device or legacy driver failed to talk to its hardware.
    IO = -40,
}

impl PmError {
    /// The raw status code.
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for PmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn status_codes() {
        assert_eq!(PmError::NOT_SUPPORTED.code(), -2);
        assert_eq!(PmError::INTERNAL_INTR_RETRY.code(), -6);
        assert_eq!(PmError::IO.code(), -40);
        assert_eq!(PmError::SHOULD_WAIT.to_string(), "SHOULD_WAIT(-22)");
    }
}
