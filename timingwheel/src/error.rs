use failure::{Backtrace, Context, Fail};

use std::fmt::{self, Display};

/// An error produced by this crate.
///
/// An `Error` wraps an [`ErrorKind`] giving context on the failure. Unlike
/// the rest of the public API, `Error` is only ever returned from
/// construction-time entry points; the background threads that drive the
/// wheels and the sampler never propagate an `Error` out, they log instead
/// (see the crate-level docs).
///
/// # Usage example
/// ```
/// use timingwheel::{ErrorKind, SchedulerConfig};
///
/// match SchedulerConfig::default().channel_capacity(0).validate() {
///     Err(err) => assert!(matches!(err.kind(), ErrorKind::InvalidConfig { .. })),
///     Ok(()) => panic!("expected a validation error"),
/// }
/// ```
///
/// [`ErrorKind`]: enum.ErrorKind.html
#[derive(Debug)]
pub struct Error {
    inner: Context<ErrorKind>,
}

impl Error {
    /// Create a new error from the given `ErrorKind`.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            inner: Context::new(kind),
        }
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> ErrorKind {
        self.inner.get_context().clone()
    }
}

impl Fail for Error {
    fn cause(&self) -> Option<&dyn Fail> {
        self.inner.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.inner.backtrace()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

/// Used to give context to an `Error`.
///
/// # Note
/// This error type is non-exhaustive and could have additional variants
/// added in future. Therefore, when matching against variants of
/// non-exhaustive enums, an extra wildcard arm must be added to account
/// for any future variants.
#[derive(Debug, Clone, PartialEq, Eq, Fail)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A [`SchedulerConfig`] failed validation, e.g. a wheel level with zero
    /// `scales` or `interval_ms`, an empty level list, or a zero channel
    /// capacity.
    ///
    /// [`SchedulerConfig`]: struct.SchedulerConfig.html
    #[fail(display = "invalid config: {}", msg)]
    InvalidConfig {
        /// Additional information on the specific contract breach.
        msg: &'static str,
    },
    /// A timer could not be placed into a wheel slot.
    #[fail(display = "failed to insert timer {}: {}", id, msg)]
    Insertion {
        /// The id of the timer that failed to insert.
        id: u32,
        /// Additional information on the failure.
        msg: &'static str,
    },
}
