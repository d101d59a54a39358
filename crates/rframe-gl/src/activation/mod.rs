//! Scoped, per-thread activation of graphics contexts.
//!
//! Each thread keeps one LIFO stack per activatable type. Creating a
//! [`MakeCurrent`] guard pushes an object (activating it unless it is already
//! on top); dropping the guard pops it and re-activates whatever was below.
//!
//! ```ignore
//! let _active = MakeCurrent::new(&context)?;
//! // driver calls here run against `context`
//! // previous context restored here, also when unwinding
//! ```
//!
//! Stacks hold weak references. An entry whose object is gone (its guard was
//! leaked and the object dropped) is skipped and discarded, never activated.

mod guard;
mod stack;

use std::fmt;
use std::sync::Arc;

pub use guard::MakeCurrent;
pub use stack::{depth, evict, is_current, occurrences};

/// Proof that a call originates from the activation stack.
///
/// Only this module can create one, which keeps [`Activate`] methods
/// unreachable from outside the stack.
pub struct StackToken(());

/// Shared state that can be bound to the calling thread.
pub trait Activate: 'static {
    type Error: fmt::Display;

    /// Binds `self` to the calling thread.
    fn activate(&self, token: StackToken) -> Result<(), Self::Error>;

    /// Unbinds `self`. Must not fail.
    fn deactivate(&self, token: StackToken);
}

/// An object activated through [`Activate`] state it shares with the stacks.
pub trait Bindable {
    type Binding: Activate;

    fn binding(&self) -> &Arc<Self::Binding>;
}

impl<T: Activate> Bindable for Arc<T> {
    type Binding = T;

    fn binding(&self) -> &Arc<T> {
        self
    }
}
