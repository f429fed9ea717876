//! PAYLAUGH Test Harness - Scripted doubles and session validation
//!
//! This crate provides:
//! - Scripted expression source, camera and renderer doubles
//! - A seeded audience simulator
//! - Reference billing and lifecycle scenarios

pub mod audience;
pub mod scenarios;
pub mod scripted;

pub use audience::*;
pub use scenarios::*;
pub use scripted::*;
