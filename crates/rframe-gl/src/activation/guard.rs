use std::marker::PhantomData;
use std::sync::Arc;

use super::{Activate, Bindable, stack};

/// Keeps an object active for the lifetime of the guard.
///
/// Dropping the guard restores the previously active object. A guard built
/// while its object was already on top did not push anything and releases
/// nothing; it is an empty handle.
#[must_use = "the object is deactivated as soon as the guard is dropped"]
pub struct MakeCurrent<'a, T: Bindable> {
    binding: Option<&'a Arc<T::Binding>>,
    // Stacks are per thread; the guard must be dropped where it was made.
    _thread_bound: PhantomData<*const ()>,
}

impl<'a, T: Bindable> MakeCurrent<'a, T> {
    /// Activates `object` on the calling thread.
    pub fn new(object: &'a T) -> Result<Self, <T::Binding as Activate>::Error> {
        let binding = object.binding();
        let pushed = stack::push(binding)?;
        Ok(Self {
            binding: pushed.then_some(binding),
            _thread_bound: PhantomData,
        })
    }

    /// `true` when this guard pushed its object and will pop it.
    pub fn is_responsible(&self) -> bool {
        self.binding.is_some()
    }
}

impl<T: Bindable> Default for MakeCurrent<'_, T> {
    fn default() -> Self {
        Self {
            binding: None,
            _thread_bound: PhantomData,
        }
    }
}

impl<T: Bindable> Drop for MakeCurrent<'_, T> {
    fn drop(&mut self) {
        if let Some(binding) = self.binding.take() {
            stack::pop(binding);
        }
    }
}
