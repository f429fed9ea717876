//! PAYLAUGH Billing - Laugh event billing reducer
//!
//! Decides, for each incoming detection sample, whether it is a new billable
//! laugh and updates the session statistics accordingly.
//!
//! # State machine
//!
//! ```text
//!            accept (p > threshold)
//!   ARMED ─────────────────────────▶ COOLING_DOWN
//!     ▲                                   │
//!     └─── now - last_accepted >= cooldown┘
//! ```
//!
//! The reducer starts ARMED and has no terminal state; it is discarded with
//! the session.

pub mod cooldown;
pub mod frame;
pub mod meter;

pub use cooldown::*;
pub use frame::*;
pub use meter::*;
