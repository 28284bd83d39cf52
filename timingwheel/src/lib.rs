#![doc(html_root_url = "https://docs.rs/timingwheel/0.1.0")]

//! *timingwheel* - a hierarchical timing-wheel scheduler for deferred
//! callback dispatch.
//!
//! A client registers a `(callback, due_time)` pair with a [`Scheduler`]
//! and gets back an opaque `u32` id; once the due time elapses, the
//! scheduler invokes the callback on a background worker thread.
//!
//! ```
//! use std::sync::mpsc;
//! use std::time::Duration;
//! use timingwheel::{DelayedInvocation, Scheduler};
//!
//! let scheduler = Scheduler::new();
//! let (tx, rx) = mpsc::channel();
//!
//! let inv = DelayedInvocation::new("greet", move || {
//!     tx.send("hello").unwrap();
//! });
//! scheduler.schedule_after(inv, Duration::from_millis(10));
//!
//! assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), "hello");
//! ```

mod clock;
mod error;
mod invocation;
mod scheduler;
mod timer;
mod wheel;

pub use clock::{Now, SystemClock};
pub use error::{Error, ErrorKind};
pub use invocation::DelayedInvocation;
pub use scheduler::{Scheduler, SchedulerConfig, WheelLevelConfig};
pub use timer::Timer;
pub use wheel::TimingWheel;

/// A "prelude" for users of the *timingwheel* crate.
///
/// ```
/// use timingwheel::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{DelayedInvocation, Now, Scheduler, SchedulerConfig, Timer};
}

#[cfg(test)]
mod test {
    #[test]
    fn test_readme_deps() {
        version_sync::assert_markdown_deps_updated!("../README.md");
    }

    #[test]
    fn test_html_root_url() {
        version_sync::assert_html_root_url_updated!("src/lib.rs");
    }
}
