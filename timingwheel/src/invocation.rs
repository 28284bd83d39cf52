//! The deferred callback carried by a [`Timer`](crate::Timer).

use std::fmt::{self, Debug};

/// A single-shot deferred callback bound to its captured arguments.
///
/// A `DelayedInvocation` is opaque to the scheduler: the only operations it
/// relies on are [`invoke`](DelayedInvocation::invoke) and
/// [`describe`](DelayedInvocation::describe). Construction binds the
/// closure and whatever it has captured; nothing is validated.
pub struct DelayedInvocation {
    label: &'static str,
    fun: Box<dyn FnOnce() + Send + 'static>,
}

impl DelayedInvocation {
    /// Binds a closure and a diagnostic label into a `DelayedInvocation`.
    ///
    /// `label` is used only for [`describe`](DelayedInvocation::describe);
    /// it does not need to be unique.
    pub fn new<F>(label: &'static str, fun: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            label,
            fun: Box::new(fun),
        }
    }

    /// Applies the bound closure, consuming this invocation.
    ///
    /// The return value, if any, is discarded. A panic inside the closure
    /// propagates to the caller; the scheduler's dispatcher catches it at
    /// the worker-thread boundary so it cannot take down other timers.
    pub fn invoke(self) {
        (self.fun)()
    }

    /// A human-readable tag for logging, e.g. `"DelayedInvocation(flush)"`.
    pub fn describe(&self) -> String {
        format!("DelayedInvocation({})", self.label)
    }
}

impl Debug for DelayedInvocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DelayedInvocation")
            .field("label", &self.label)
            .finish()
    }
}
