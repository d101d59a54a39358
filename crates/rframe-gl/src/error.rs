//! Context error types

use std::thread::ThreadId;

use thiserror::Error;

/// What went wrong inside a failing operation.
///
/// Every failure names the native call (or lookup) it is attributed to, so a
/// driver error is never reported against the wrong call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallFailure {
    /// The driver reported an error code right after the call.
    #[error("`{call}` raised driver error {code:#06x}")]
    DriverError { call: &'static str, code: u32 },

    /// The call signalled failure through its return value only.
    #[error("`{call}` returned an invalid value")]
    InvalidReturn { call: &'static str },

    /// The context is bound to another thread.
    #[error("context is already active on thread {owner:?}")]
    OwnedByOtherThread { owner: ThreadId },

    /// A mode has no entry in its native value table.
    #[error("no native value mapped for {what}")]
    Unmapped { what: &'static str },

    /// The pixel format query returned zero candidates.
    #[error("no pixel format matches the request")]
    NoMatchingFormat,

    /// A pixel format was already chosen for this surface.
    #[error("a pixel format was already assigned to this surface")]
    AlreadyAssigned,
}

/// Errors raised by a graphics context.
///
/// The tuple variants double as the error constructors handed to the
/// checked call wrappers (`checked::call(driver, ContextError::ModeEdit, ..)`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// Context negotiation or creation failed
    #[error("context initialization failed: {0}")]
    Init(CallFailure),

    /// No usable pixel format
    #[error("bad pixel format: {0}")]
    BadPixelFormat(CallFailure),

    /// Binding the context to the calling thread failed
    #[error("context activation failed: {0}")]
    Activate(CallFailure),

    /// A render mode could not be applied
    #[error("render mode edit failed: {0}")]
    ModeEdit(CallFailure),

    /// Clearing the frame buffers failed
    #[error("frame clear failed: {0}")]
    ClearFrame(CallFailure),

    /// An extension entry point could not be resolved
    #[error("driver function not found: {0}")]
    FunctionNotFound(CallFailure),

    /// Swapping the surface buffers failed
    #[error("frame present failed: {0}")]
    Present(CallFailure),
}

/// Discriminant of a [`ContextError`], handy for matching in callers and tests.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Init,
    BadPixelFormat,
    Activate,
    ModeEdit,
    ClearFrame,
    FunctionNotFound,
    Present,
}

impl ContextError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Init(_) => ErrorKind::Init,
            Self::BadPixelFormat(_) => ErrorKind::BadPixelFormat,
            Self::Activate(_) => ErrorKind::Activate,
            Self::ModeEdit(_) => ErrorKind::ModeEdit,
            Self::ClearFrame(_) => ErrorKind::ClearFrame,
            Self::FunctionNotFound(_) => ErrorKind::FunctionNotFound,
            Self::Present(_) => ErrorKind::Present,
        }
    }

    /// The underlying failure.
    pub fn failure(&self) -> &CallFailure {
        match self {
            Self::Init(f)
            | Self::BadPixelFormat(f)
            | Self::Activate(f)
            | Self::ModeEdit(f)
            | Self::ClearFrame(f)
            | Self::FunctionNotFound(f)
            | Self::Present(f) => f,
        }
    }
}

/// Result type for context operations
pub type Result<T, E = ContextError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_call_and_code() {
        let err = ContextError::ClearFrame(CallFailure::DriverError { call: "glClear", code: 0x0502 });
        assert_eq!(
            err.to_string(),
            "frame clear failed: `glClear` raised driver error 0x0502"
        );
    }

    #[test]
    fn kind_and_failure_follow_the_variant() {
        let err = ContextError::ModeEdit(CallFailure::Unmapped { what: "polygon mode" });
        assert_eq!(err.kind(), ErrorKind::ModeEdit);
        assert_eq!(err.failure(), &CallFailure::Unmapped { what: "polygon mode" });
    }
}
