//! Checked driver calls.
//!
//! Every native call issued by a context goes through one of these wrappers.
//! Each wrapper asserts that no error is pending before the call (debug
//! builds) and queries the error code right after it, so a failure is always
//! attributed to the call that produced it.
//!
//! The `error` argument is the [`ContextError`] variant to raise, e.g.
//! `ContextError::ClearFrame`.

use crate::debug;
use crate::driver::{Driver, consts};
use crate::error::{CallFailure, ContextError, Result};

/// Runs `f` and fails with `error` if the driver reports an error code.
pub fn call<D, R, E>(driver: &D, error: E, name: &'static str, f: impl FnOnce(&D) -> R) -> Result<R>
where
    D: Driver,
    E: FnOnce(CallFailure) -> ContextError,
{
    debug::assert_no_pending_errors(driver);

    let result = f(driver);

    let code = driver.get_error();
    if code != consts::NO_ERROR {
        // A single call never leaves more than one error behind.
        debug::assert_no_pending_errors(driver);
        log::trace!("{name} failed with driver error {code:#06x}");
        return Err(error(CallFailure::DriverError { call: name, code }));
    }

    log::trace!("{name} ok");
    Ok(result)
}

/// Runs `f` on a cleanup path. Never fails.
///
/// A detected error code is logged and discarded. The pending-error
/// assertions are skipped while the thread is unwinding.
pub fn call_skip_errors<D, R>(driver: &D, name: &'static str, f: impl FnOnce(&D) -> R) -> R
where
    D: Driver,
{
    // Cleanup also runs during unwinding; a second panic would abort.
    let unwinding = std::thread::panicking();
    if !unwinding {
        debug::assert_no_pending_errors(driver);
    }

    let result = f(driver);

    let code = driver.get_error();
    if code != consts::NO_ERROR {
        if !unwinding {
            debug::assert_no_pending_errors(driver);
        }
        log::warn!("{name} raised driver error {code:#06x} on a cleanup path; ignored");
    }
    result
}

/// As [`call`], and also fails when the call returns `sentinel`.
///
/// Covers entry points that signal failure only through their return value.
pub fn call_fail_value<D, R, E>(
    driver: &D,
    error: E,
    name: &'static str,
    sentinel: R,
    f: impl FnOnce(&D) -> R,
) -> Result<R>
where
    D: Driver,
    R: PartialEq,
    E: Fn(CallFailure) -> ContextError,
{
    let result = call(driver, &error, name, f)?;
    if result == sentinel {
        log::trace!("{name} returned its failure value");
        return Err(error(CallFailure::InvalidReturn { call: name }));
    }
    Ok(result)
}

/// As [`call`], and also fails when the call returns anything but `expected`.
pub fn call_pass_value<D, R, E>(
    driver: &D,
    error: E,
    name: &'static str,
    expected: R,
    f: impl FnOnce(&D) -> R,
) -> Result<R>
where
    D: Driver,
    R: PartialEq,
    E: Fn(CallFailure) -> ContextError,
{
    let result = call(driver, &error, name, f)?;
    if result != expected {
        log::trace!("{name} did not return its success value");
        return Err(error(CallFailure::InvalidReturn { call: name }));
    }
    Ok(result)
}

/// As [`call`] for entry points returning `Option`; `None` is a failure.
pub fn call_some<D, T, E>(
    driver: &D,
    error: E,
    name: &'static str,
    f: impl FnOnce(&D) -> Option<T>,
) -> Result<T>
where
    D: Driver,
    E: Fn(CallFailure) -> ContextError,
{
    call(driver, &error, name, f)?.ok_or_else(|| error(CallFailure::InvalidReturn { call: name }))
}
