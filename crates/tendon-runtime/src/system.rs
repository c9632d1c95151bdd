//! Runtime system trait

use crate::input::InputState;
use tendon_core::Result;

/// A system that can be ticked by the frame loop
///
/// Systems are updated in registration order, once per frame, after input
/// for that frame has been collected.
pub trait RuntimeSystem {
    /// Called once before the first frame
    fn initialize(&mut self) -> Result<()>;

    /// Called once per frame with this frame's input and elapsed seconds
    fn update(&mut self, input: &InputState, dt: f64) -> Result<()>;

    /// Called when the system is being shut down
    fn shutdown(&mut self) -> Result<()>;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
