//! # Clock
//!
//! The scheduler never reads the system time directly, it asks a
//! [`Clock`] instead.

use chrono::{DateTime, Local};

pub trait Clock: Send + Sync {
    /// Return the current local wall-clock time.
    fn now(&self) -> DateTime<Local>;
}

/// The clock backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
