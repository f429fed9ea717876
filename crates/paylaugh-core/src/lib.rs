//! PAYLAUGH Core - Fundamental types and primitives
//!
//! This crate defines the core types shared by the billing reducer and the
//! session runtime:
//! - Identifiers (SessionId, LaughId)
//! - Time primitives (SessionTime, Clock)
//! - Fixed-point money
//! - Detections and per-face samples
//! - Session statistics and laugh events
//! - Configuration constants and errors

pub mod config;
pub mod detection;
pub mod error;
pub mod id;
pub mod money;
pub mod stats;
pub mod time;

pub use config::*;
pub use detection::*;
pub use error::*;
pub use id::*;
pub use money::*;
pub use stats::*;
pub use time::*;
