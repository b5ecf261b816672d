//! Time source abstraction so predictions carry injectable timestamps.

use chrono::Utc;

pub trait Clock: std::fmt::Debug + Send + Sync {
    /// Current instant as an RFC 3339 string.
    fn now(&self) -> String;
}

/// Wall-clock time in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        Utc::now().to_rfc3339()
    }
}

/// Always reports the same instant. For deterministic tests.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.0.clone()
    }
}
