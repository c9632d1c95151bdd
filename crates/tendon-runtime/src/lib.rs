//! Tendon Runtime - Frame loop infrastructure
//!
//! Provides the building blocks a frame-driven demo needs:
//! - `GameClock`: per-frame delta time, wall-clock or manually stepped
//! - `InputState`: keyboard tracking with action bindings
//! - `EventBus`: typed event queue drained by the frame loop
//! - `RuntimeSystem`: trait for systems ticked once per frame

mod clock;
mod event_bus;
mod input;
mod system;

pub use clock::GameClock;
pub use event_bus::EventBus;
pub use input::{actions, InputConfig, InputState};
pub use system::RuntimeSystem;
