//! Driver debug output and error-protocol assertions.
//!
//! Active only with `debug_assertions`. Release builds drop the message
//! callback entirely; `install` and `assert_no_pending_errors` compile down
//! to empty inline functions.

use crate::context::GlContext;
#[cfg(debug_assertions)]
use crate::driver::{DebugMessage, DebugSeverity};
use crate::driver::Driver;
use crate::error::Result;

/// Whether a message of this severity should stop in the debugger.
#[cfg(debug_assertions)]
pub fn should_break(severity: DebugSeverity) -> bool {
    matches!(severity, DebugSeverity::High | DebugSeverity::Medium)
}

/// Debug output callback installed on every context.
#[cfg(debug_assertions)]
pub fn on_debug_message(message: &DebugMessage<'_>) {
    match message.severity {
        DebugSeverity::High | DebugSeverity::Medium => {
            log::error!("driver [{:?}] {}: {}", message.severity, message.id, message.text)
        }
        DebugSeverity::Low => log::warn!("driver [{}]: {}", message.id, message.text),
        DebugSeverity::Notification => log::debug!("driver [{}]: {}", message.id, message.text),
    }

    if should_break(message.severity) {
        breakpoint();
    }
}

/// Stops in an attached debugger. No-op when none is attached.
#[cfg(all(debug_assertions, windows))]
fn breakpoint() {
    use windows::Win32::System::Diagnostics::Debug::{DebugBreak, IsDebuggerPresent};

    // SAFETY: both calls only inspect or signal the current process.
    unsafe {
        if IsDebuggerPresent().as_bool() {
            DebugBreak();
        }
    }
}

#[cfg(all(debug_assertions, not(windows)))]
fn breakpoint() {}

/// Fails fast if an error code is pending on the calling thread.
///
/// A pending code means an earlier call went unchecked; any later check
/// would report it against the wrong call.
#[cfg(debug_assertions)]
pub fn assert_no_pending_errors<D: Driver>(driver: &D) {
    let code = driver.get_error();
    if code != crate::driver::consts::NO_ERROR {
        log::error!("driver error {code:#06x} is pending before a checked call");
        breakpoint();
        panic!("driver error {code:#06x} was left unchecked by a previous call");
    }
}

#[cfg(not(debug_assertions))]
#[inline(always)]
pub fn assert_no_pending_errors<D: Driver>(_driver: &D) {}

/// Enables driver debug output on `context` and routes it to
/// [`on_debug_message`].
#[cfg(debug_assertions)]
pub(crate) fn install<D: Driver>(context: &GlContext<D>) -> Result<()> {
    use crate::activation::MakeCurrent;
    use crate::checked;
    use crate::driver::consts;
    use crate::error::ContextError;

    let _active = MakeCurrent::new(context)?;
    let driver = context.driver();

    assert_no_pending_errors(driver);

    checked::call(driver, ContextError::Init, "glEnable", |d| d.enable(consts::DEBUG_OUTPUT))?;
    checked::call_fail_value(driver, ContextError::Init, "glDebugMessageCallback", false, |d| {
        d.debug_message_callback(on_debug_message)
    })?;

    log::debug!("debug output installed");
    Ok(())
}

#[cfg(not(debug_assertions))]
#[inline(always)]
pub(crate) fn install<D: Driver>(_context: &GlContext<D>) -> Result<()> {
    Ok(())
}
