//! PAYLAUGH Runtime - Session lifecycle and detection polling
//!
//! A session goes through three phases:
//! 1. Acquire: load the expression model, then open the camera
//! 2. Poll: every tick, detect faces and feed them to the billing reducer
//! 3. Tear down: stop polling, drop in-flight results, release the camera
//!
//! The face detector, the camera and the renderer are capabilities
//! ([`ExpressionSource`], [`Camera`], [`RenderSink`]) so the controller runs
//! unchanged against real devices, scripted doubles or the terminal demo.

pub mod camera;
pub mod clock;
pub mod config;
pub mod overlay;
pub mod poller;
pub mod render;
pub mod session;
pub mod source;
pub mod telemetry;

pub use camera::*;
pub use clock::*;
pub use config::*;
pub use overlay::*;
pub use poller::{PollStats, PollerHandle, StatsView};
pub use render::*;
pub use session::*;
pub use source::*;
pub use telemetry::{init_tracing, LogFormat};
