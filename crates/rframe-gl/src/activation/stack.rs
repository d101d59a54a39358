use std::any::{Any, TypeId, type_name};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ptr;
use std::sync::{Arc, Weak};

use super::{Activate, Bindable, StackToken};

thread_local! {
    /// One `Vec<Weak<T>>` per activated type. Top = active.
    static STACKS: RefCell<HashMap<TypeId, Box<dyn Any>>> = RefCell::new(HashMap::new());
}

/// Runs `f` on this thread's stack for `T`.
///
/// `f` must not drop an upgraded `Arc<T>`: releasing the last strong
/// reference runs `T`'s destructor while the stacks are borrowed.
fn with_stack<T: 'static, R>(f: impl FnOnce(&mut Vec<Weak<T>>) -> R) -> R {
    STACKS.with(|stacks| {
        let mut stacks = stacks.borrow_mut();
        let stack = stacks
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Vec::<Weak<T>>::new()));
        match stack.downcast_mut::<Vec<Weak<T>>>() {
            Some(stack) => f(stack),
            None => unreachable!("activation stack for {} stored under another type", type_name::<T>()),
        }
    })
}

/// As [`with_stack`], for destructor paths: `None` once thread-local
/// storage is gone or nothing of type `T` was ever pushed.
fn try_with_stack<T: 'static, R>(f: impl FnOnce(&mut Vec<Weak<T>>) -> R) -> Option<R> {
    STACKS
        .try_with(|stacks| {
            let mut stacks = stacks.borrow_mut();
            stacks
                .get_mut(&TypeId::of::<T>())
                .and_then(|stack| stack.downcast_mut::<Vec<Weak<T>>>())
                .map(f)
        })
        .ok()
        .flatten()
}

fn points_to<T>(entry: &Weak<T>, object: &T) -> bool {
    ptr::eq(entry.as_ptr(), object)
}

/// Discards dead entries off the top and returns the live top.
fn live_top<T: Activate>() -> Option<Arc<T>> {
    with_stack::<T, _>(|stack| {
        while let Some(top) = stack.last() {
            if let Some(top) = top.upgrade() {
                return Some(top);
            }
            stack.pop();
            log::warn!("discarded a stale {} entry", type_name::<T>());
        }
        None
    })
}

fn restore<T: Activate>(object: &T) {
    if let Err(err) = object.activate(StackToken(())) {
        log::error!("failed to restore active {}: {err}", type_name::<T>());
    }
}

/// Makes `object` the active one.
///
/// Returns `Ok(true)` when it was activated and pushed, `Ok(false)` when it
/// already was on top. On failure the stack is unchanged and the previous
/// top is re-activated.
pub(super) fn push<T: Activate>(object: &Arc<T>) -> Result<bool, T::Error> {
    let previous = live_top::<T>();

    if previous.as_ref().is_some_and(|top| Arc::ptr_eq(top, object)) {
        log::trace!("{} already active", type_name::<T>());
        return Ok(false);
    }

    if let Err(err) = object.activate(StackToken(())) {
        if let Some(previous) = &previous {
            restore(&**previous);
        }
        return Err(err);
    }

    let depth = with_stack::<T, _>(|stack| {
        stack.push(Arc::downgrade(object));
        stack.len()
    });
    log::trace!("pushed {} (depth {depth})", type_name::<T>());
    Ok(true)
}

/// Deactivates `object` and re-activates the entry below it.
///
/// Panics if `object` is not on top: the nesting order is corrupted.
pub(super) fn pop<T: Activate>(object: &Arc<T>) {
    let top = live_top::<T>();

    assert!(
        top.is_some(),
        "activation stack for {} is empty; nothing to release",
        type_name::<T>()
    );
    assert!(
        top.is_some_and(|top| Arc::ptr_eq(&top, object)),
        "activation stack for {} corrupted: the object being released is not the active object",
        type_name::<T>()
    );

    object.deactivate(StackToken(()));

    with_stack::<T, _>(|stack| {
        stack.pop();
    });
    log::trace!("popped {}", type_name::<T>());

    if let Some(next) = live_top::<T>() {
        restore(&*next);
    }
}

/// Number of live entries on this thread's stack for `B`.
pub fn depth<B: Bindable>() -> usize {
    with_stack::<B::Binding, _>(|stack| stack.iter().filter(|entry| entry.strong_count() > 0).count())
}

/// Whether `object` is the active one of its type on this thread.
pub fn is_current<B: Bindable>(object: &B) -> bool {
    let binding: &B::Binding = object.binding();
    with_stack::<B::Binding, _>(|stack| stack.last().is_some_and(|top| points_to(top, binding)))
}

/// Number of entries for `object` on this thread's stack.
pub fn occurrences<T: Activate>(object: &T) -> usize {
    try_with_stack::<T, _>(|stack| stack.iter().filter(|entry| points_to(entry, object)).count())
        .unwrap_or(0)
}

/// Removes every entry for `object` from this thread's stack.
///
/// Meant for `Drop` impls of [`Activate`] types. Returns the number of
/// entries removed.
pub fn evict<T: Activate>(object: &T) -> usize {
    try_with_stack::<T, _>(|stack| {
        let before = stack.len();
        stack.retain(|entry| !points_to(entry, object));
        before - stack.len()
    })
    .unwrap_or(0)
}
