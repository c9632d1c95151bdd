//! Skeletal animation for Tendon
//!
//! Keyframe sampling, two-clip crossfades, and the idle/dance/moonwalk
//! state machine that drives them:
//! - `track` / `bone` / `clip`: immutable keyframe data
//! - `skeleton`: node hierarchy and skin table shared by a model's clips
//! - `animator`: per-character cursors, blend weight, and final matrices
//! - `state_machine`: crossfade transitions driven by per-frame requests
//! - `loader`: TOML skeleton and clip documents

pub mod animator;
pub mod blend;
pub mod bone;
pub mod clip;
pub mod library;
pub mod loader;
pub mod skeleton;
pub mod state_machine;
pub mod track;

use tendon_core::{Result, TendonError};
use tendon_runtime::{actions, EventBus, InputState, RuntimeSystem};

use animator::Animator;
use library::ClipLibrary;
use state_machine::{
    AnimationRequests, AnimationStateMachine, ForcedPose, StateChange, StateClips,
    StateMachineConfig,
};

/// Top-level animation system for one character.
///
/// Owns the clip library, the animator, and the state machine. Each frame it
/// turns input into [`AnimationRequests`], steps the state machine, then
/// advances the animator. Transitions are queued on `events`.
pub struct AnimationSystem {
    pub library: ClipLibrary,
    pub animator: Animator,
    pub state_machine: AnimationStateMachine,
    pub events: EventBus<StateChange>,
}

impl AnimationSystem {
    pub fn new(library: ClipLibrary, clips: StateClips, config: StateMachineConfig) -> Result<Self> {
        for id in [clips.idle, clips.dance, clips.moonwalk] {
            if library.get(id).is_none() {
                return Err(TendonError::UnknownClip(id.to_string()));
            }
        }

        Ok(Self {
            library,
            animator: Animator::new(Some(clips.idle)),
            state_machine: AnimationStateMachine::new(clips, config)?,
            events: EventBus::new(),
        })
    }

    /// Map held and just-pressed actions to this frame's requests.
    ///
    /// Force triggers are checked idle, dance, moonwalk; the first one wins.
    pub fn requests_from_input(input: &InputState) -> AnimationRequests {
        let force = if input.is_action_just_pressed(actions::FORCE_IDLE) {
            Some(ForcedPose::Idle)
        } else if input.is_action_just_pressed(actions::FORCE_DANCE) {
            Some(ForcedPose::Dance)
        } else if input.is_action_just_pressed(actions::FORCE_MOONWALK) {
            Some(ForcedPose::Moonwalk)
        } else {
            None
        };

        AnimationRequests {
            dance: input.is_action_pressed(actions::DANCE),
            moonwalk: input.is_action_pressed(actions::MOONWALK),
            force,
        }
    }

    /// One frame with explicit requests, bypassing input mapping
    pub fn step(&mut self, requests: &AnimationRequests, dt: f32) {
        if let Some(change) = self.state_machine.step(&mut self.animator, requests, dt) {
            self.events.push(change);
        }
        self.animator.update(&self.library, dt);
    }
}

impl RuntimeSystem for AnimationSystem {
    fn initialize(&mut self) -> Result<()> {
        // Fill the matrix array before the first frame is rendered
        self.animator.update(&self.library, 0.0);
        log::info!(
            "Animation system initialized ({} clips, state {})",
            self.library.len(),
            self.state_machine.state()
        );
        Ok(())
    }

    fn update(&mut self, input: &InputState, dt: f64) -> Result<()> {
        let requests = Self::requests_from_input(input);
        self.step(&requests, dt as f32);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        log::info!("Animation system shut down");
        Ok(())
    }

    fn name(&self) -> &str {
        "animation"
    }
}
