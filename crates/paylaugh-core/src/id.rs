//! Identity types for PAYLAUGH sessions
//!
//! Identifiers are plain 64-bit counters. They only need to be unique within
//! one process; nothing is persisted or sent over a network.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Session identity - one camera/model acquisition and its billing
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct SessionId(pub u64);

impl SessionId {
    pub const ZERO: SessionId = SessionId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        SessionId(id)
    }

    /// Allocate the next process-unique session id
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        SessionId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session({:08x})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Laugh identity - sequence number of an accepted laugh within a session
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct LaughId(pub u64);

impl LaughId {
    pub const FIRST: LaughId = LaughId(1);

    #[inline]
    pub fn new(id: u64) -> Self {
        LaughId(id)
    }

    #[inline]
    pub fn next(self) -> Self {
        LaughId(self.0.saturating_add(1))
    }
}

impl fmt::Debug for LaughId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Laugh(#{})", self.0)
    }
}

impl fmt::Display for LaughId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
