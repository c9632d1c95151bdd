//! Idle / dance / moonwalk crossfade state machine
//!
//! Owns only the transition state. Each frame the caller passes an
//! [`AnimationRequests`] context, and the machine drives the [`Animator`]
//! through explicit `play` calls.

use crate::animator::Animator;
use crate::library::ClipId;
use serde::Deserialize;
use std::fmt;
use tendon_core::{Result, TendonError};

/// A non-idle action the character can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Dance,
    Moonwalk,
}

/// Observable state of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimState {
    Idle,
    IdleToDance,
    Dance,
    DanceToIdle,
    IdleToMoonwalk,
    Moonwalk,
    MoonwalkToIdle,
}

impl AnimState {
    /// True for the crossfading states
    pub fn is_transition(self) -> bool {
        matches!(
            self,
            AnimState::IdleToDance
                | AnimState::DanceToIdle
                | AnimState::IdleToMoonwalk
                | AnimState::MoonwalkToIdle
        )
    }
}

impl fmt::Display for AnimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AnimState::Idle => "IDLE",
            AnimState::IdleToDance => "IDLE_DANCE (blending in)",
            AnimState::Dance => "DANCE (playing full animation)",
            AnimState::DanceToIdle => "DANCE_IDLE (blending out)",
            AnimState::IdleToMoonwalk => "IDLE_MOONWALK (blending in)",
            AnimState::Moonwalk => "MOONWALK (playing full animation)",
            AnimState::MoonwalkToIdle => "MOONWALK_IDLE (blending out)",
        };
        f.write_str(label)
    }
}

/// Internal shape of a state: which action it concerns and which way it blends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// primary = idle, secondary = action clip
    BlendingIn(Action),
    Steady(Action),
    /// primary = action clip, secondary = idle
    BlendingOut(Action),
}

impl From<Phase> for AnimState {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Idle => AnimState::Idle,
            Phase::BlendingIn(Action::Dance) => AnimState::IdleToDance,
            Phase::Steady(Action::Dance) => AnimState::Dance,
            Phase::BlendingOut(Action::Dance) => AnimState::DanceToIdle,
            Phase::BlendingIn(Action::Moonwalk) => AnimState::IdleToMoonwalk,
            Phase::Steady(Action::Moonwalk) => AnimState::Moonwalk,
            Phase::BlendingOut(Action::Moonwalk) => AnimState::MoonwalkToIdle,
        }
    }
}

/// Immediate, non-blended jump to a steady state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForcedPose {
    Idle,
    Dance,
    Moonwalk,
}

/// Per-frame inputs to [`AnimationStateMachine::step`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationRequests {
    pub dance: bool,
    pub moonwalk: bool,
    pub force: Option<ForcedPose>,
}

impl AnimationRequests {
    /// The requested action; dance wins if both are held.
    pub fn requested(&self) -> Option<Action> {
        if self.dance {
            Some(Action::Dance)
        } else if self.moonwalk {
            Some(Action::Moonwalk)
        } else {
            None
        }
    }
}

/// Clips the machine switches between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateClips {
    pub idle: ClipId,
    pub dance: ClipId,
    pub moonwalk: ClipId,
}

impl StateClips {
    fn for_action(&self, action: Action) -> ClipId {
        match action {
            Action::Dance => self.dance,
            Action::Moonwalk => self.moonwalk,
        }
    }
}

/// Tunables loaded from the `[state_machine]` config table
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StateMachineConfig {
    /// Blend weight gained per second while crossfading
    #[serde(default = "default_blend_rate")]
    pub blend_rate: f32,
}

fn default_blend_rate() -> f32 {
    2.0
}

impl Default for StateMachineConfig {
    fn default() -> Self {
        Self {
            blend_rate: default_blend_rate(),
        }
    }
}

impl StateMachineConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.blend_rate.is_finite() && self.blend_rate > 0.0) {
            return Err(TendonError::ConfigError(format!(
                "blend_rate must be positive, got {}",
                self.blend_rate
            )));
        }
        Ok(())
    }
}

/// A transition taken during one `step`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub from: AnimState,
    pub to: AnimState,
}

#[derive(Debug, Clone)]
pub struct AnimationStateMachine {
    phase: Phase,
    /// Weight of the animator's secondary clip during a crossfade
    blend: f32,
    blend_rate: f32,
    clips: StateClips,
}

impl AnimationStateMachine {
    pub fn new(clips: StateClips, config: StateMachineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            phase: Phase::Idle,
            blend: 0.0,
            blend_rate: config.blend_rate,
            clips,
        })
    }

    pub fn state(&self) -> AnimState {
        self.phase.into()
    }

    pub fn blend(&self) -> f32 {
        self.blend
    }

    pub fn blend_rate(&self) -> f32 {
        self.blend_rate
    }

    pub fn clips(&self) -> &StateClips {
        &self.clips
    }

    /// Advance the machine by one frame of `dt` seconds.
    ///
    /// Only mutates `animator` through `play`; the caller still runs
    /// `animator.update` afterwards.
    pub fn step(
        &mut self,
        animator: &mut Animator,
        requests: &AnimationRequests,
        dt: f32,
    ) -> Option<StateChange> {
        let from = self.state();

        match requests.force {
            Some(pose) => self.force(animator, pose),
            None => self.transition(animator, requests.requested(), dt),
        }

        let to = self.state();
        if from == to {
            return None;
        }
        log::info!("{} -> {}", from, to);
        Some(StateChange { from, to })
    }

    fn force(&mut self, animator: &mut Animator, pose: ForcedPose) {
        let (clip, phase) = match pose {
            ForcedPose::Idle => (self.clips.idle, Phase::Idle),
            ForcedPose::Dance => (self.clips.dance, Phase::Steady(Action::Dance)),
            ForcedPose::Moonwalk => (self.clips.moonwalk, Phase::Steady(Action::Moonwalk)),
        };
        animator.play(clip, None, 0.0, 0.0, 0.0);
        self.blend = 0.0;
        self.phase = phase;
    }

    fn transition(&mut self, animator: &mut Animator, requested: Option<Action>, dt: f32) {
        let idle = self.clips.idle;

        match self.phase {
            Phase::Idle => {
                self.ensure_single(animator, idle);
                if let Some(action) = requested {
                    let idle_time = animator.primary_time();
                    self.begin_blend_in(animator, action, idle_time);
                }
            }

            Phase::Steady(action) => {
                let clip = self.clips.for_action(action);
                self.ensure_single(animator, clip);
                match requested {
                    Some(next) if next == action => {}
                    Some(next) => {
                        // Direct switch between actions, no idle pass-through
                        animator.play(self.clips.for_action(next), None, 0.0, 0.0, 0.0);
                        self.blend = 0.0;
                        self.phase = Phase::Steady(next);
                    }
                    None => {
                        self.blend = 0.0;
                        animator.play(clip, Some(idle), animator.primary_time(), 0.0, 0.0);
                        self.phase = Phase::BlendingOut(action);
                    }
                }
            }

            Phase::BlendingIn(action) => {
                let clip = self.clips.for_action(action);
                match requested {
                    Some(next) if next == action => {
                        self.advance_blend(dt);
                        if self.blend >= 1.0 {
                            animator.play(clip, None, animator.secondary_time(), 0.0, 0.0);
                            self.blend = 0.0;
                            self.phase = Phase::Steady(action);
                        } else {
                            animator.play(
                                idle,
                                Some(clip),
                                animator.primary_time(),
                                animator.secondary_time(),
                                self.blend,
                            );
                        }
                    }
                    Some(next) => {
                        let idle_time = animator.primary_time();
                        self.begin_blend_in(animator, next, idle_time);
                    }
                    None => {
                        // Reverse: the action clip becomes primary, same visual pose
                        self.blend = 1.0 - self.blend;
                        animator.play(
                            clip,
                            Some(idle),
                            animator.secondary_time(),
                            animator.primary_time(),
                            self.blend,
                        );
                        self.phase = Phase::BlendingOut(action);
                    }
                }
            }

            Phase::BlendingOut(action) => {
                let clip = self.clips.for_action(action);
                match requested {
                    Some(next) if next == action => {
                        self.blend = 1.0 - self.blend;
                        animator.play(
                            idle,
                            Some(clip),
                            animator.secondary_time(),
                            animator.primary_time(),
                            self.blend,
                        );
                        self.phase = Phase::BlendingIn(action);
                    }
                    Some(next) => {
                        let idle_time = animator.secondary_time();
                        self.begin_blend_in(animator, next, idle_time);
                    }
                    None => {
                        self.advance_blend(dt);
                        if self.blend >= 1.0 {
                            animator.play(idle, None, animator.secondary_time(), 0.0, 0.0);
                            self.blend = 0.0;
                            self.phase = Phase::Idle;
                        } else {
                            animator.play(
                                clip,
                                Some(idle),
                                animator.primary_time(),
                                animator.secondary_time(),
                                self.blend,
                            );
                        }
                    }
                }
            }
        }
    }

    /// Start a fresh crossfade from idle (resumed at `idle_time`) to `action`.
    fn begin_blend_in(&mut self, animator: &mut Animator, action: Action, idle_time: f32) {
        self.blend = 0.0;
        animator.play(
            self.clips.idle,
            Some(self.clips.for_action(action)),
            idle_time,
            0.0,
            0.0,
        );
        self.phase = Phase::BlendingIn(action);
    }

    /// Make `clip` the only active clip, keeping its cursor if it already plays.
    fn ensure_single(&self, animator: &mut Animator, clip: ClipId) {
        if animator.primary() == Some(clip) && animator.secondary().is_none() {
            return;
        }
        let time = if animator.primary() == Some(clip) {
            animator.primary_time()
        } else {
            0.0
        };
        animator.play(clip, None, time, 0.0, 0.0);
    }

    fn advance_blend(&mut self, dt: f32) {
        self.blend = (self.blend + self.blend_rate * dt).clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::AnimationClip;
    use crate::library::ClipLibrary;
    use crate::skeleton::{Skeleton, SkeletonNode};
    use glam::Mat4;
    use std::collections::HashMap;

    struct Rig {
        library: ClipLibrary,
        animator: Animator,
        machine: AnimationStateMachine,
    }

    impl Rig {
        fn new() -> Self {
            let skeleton =
                Skeleton::new("rig", SkeletonNode::new("root", Mat4::IDENTITY), HashMap::new())
                    .unwrap();
            let mut library = ClipLibrary::new();
            let mut add = |name: &str| {
                library.add(AnimationClip::for_skeleton(name, 10.0, 1.0, &skeleton, vec![]).unwrap())
            };
            let clips = StateClips {
                idle: add("idle"),
                dance: add("dance"),
                moonwalk: add("moonwalk"),
            };
            let machine = AnimationStateMachine::new(clips, StateMachineConfig::default()).unwrap();
            Self {
                library,
                animator: Animator::default(),
                machine,
            }
        }

        fn frame(&mut self, requests: AnimationRequests, dt: f32) -> Option<StateChange> {
            let change = self.machine.step(&mut self.animator, &requests, dt);
            self.animator.update(&self.library, dt);
            change
        }

        fn clips(&self) -> StateClips {
            *self.machine.clips()
        }
    }

    fn dance() -> AnimationRequests {
        AnimationRequests {
            dance: true,
            ..Default::default()
        }
    }

    fn moonwalk() -> AnimationRequests {
        AnimationRequests {
            moonwalk: true,
            ..Default::default()
        }
    }

    fn forced(pose: ForcedPose) -> AnimationRequests {
        AnimationRequests {
            force: Some(pose),
            ..Default::default()
        }
    }

    #[test]
    fn starts_idle_and_plays_idle_clip() {
        let mut rig = Rig::new();
        assert_eq!(rig.machine.state(), AnimState::Idle);
        assert!(rig.frame(AnimationRequests::default(), 0.1).is_none());
        assert_eq!(rig.animator.primary(), Some(rig.clips().idle));
        assert_eq!(rig.animator.secondary(), None);
    }

    #[test]
    fn idle_cursor_keeps_running_while_idle() {
        let mut rig = Rig::new();
        for _ in 0..3 {
            rig.frame(AnimationRequests::default(), 0.5);
        }
        assert!((rig.animator.primary_time() - 1.5).abs() < 1e-5);
    }

    #[test]
    fn dance_request_blends_in_then_settles() {
        let mut rig = Rig::new();
        let change = rig.frame(dance(), 0.1).unwrap();
        assert_eq!(change.from, AnimState::Idle);
        assert_eq!(change.to, AnimState::IdleToDance);
        assert_eq!(rig.animator.secondary(), Some(rig.clips().dance));

        let mut settled = false;
        for _ in 0..10 {
            if rig.frame(dance(), 0.1).map(|c| c.to) == Some(AnimState::Dance) {
                settled = true;
                break;
            }
        }
        assert!(settled);
        assert_eq!(rig.animator.primary(), Some(rig.clips().dance));
        assert_eq!(rig.animator.secondary(), None);
        assert_eq!(rig.machine.blend(), 0.0);
    }

    #[test]
    fn settling_carries_secondary_cursor_forward() {
        let mut rig = Rig::new();
        rig.frame(dance(), 0.1);
        while rig.machine.state() == AnimState::IdleToDance {
            let dance_time = rig.animator.secondary_time();
            rig.machine.step(&mut rig.animator, &dance(), 0.1);
            if rig.machine.state() == AnimState::Dance {
                assert!((rig.animator.primary_time() - dance_time).abs() < 1e-6);
            }
            rig.animator.update(&rig.library, 0.1);
        }
        assert_eq!(rig.machine.state(), AnimState::Dance);
    }

    #[test]
    fn withdrawn_request_reverses_blend() {
        let mut rig = Rig::new();
        rig.frame(dance(), 0.05);
        for _ in 0..3 {
            rig.frame(dance(), 0.05);
        }
        assert!((rig.machine.blend() - 0.3).abs() < 1e-5);

        let dance_time = rig.animator.secondary_time();
        let idle_time = rig.animator.primary_time();
        let change = rig.machine.step(&mut rig.animator, &AnimationRequests::default(), 0.05);

        assert_eq!(change.map(|c| c.to), Some(AnimState::DanceToIdle));
        assert!((rig.machine.blend() - 0.7).abs() < 1e-5);
        assert!((rig.animator.blend() - 0.7).abs() < 1e-5);
        assert_eq!(rig.animator.primary(), Some(rig.clips().dance));
        assert_eq!(rig.animator.secondary(), Some(rig.clips().idle));
        // No cursor pop at the reversal instant
        assert_eq!(rig.animator.primary_time(), dance_time);
        assert_eq!(rig.animator.secondary_time(), idle_time);

        let mut frames = 0;
        while rig.machine.state() != AnimState::Idle && frames < 20 {
            rig.frame(AnimationRequests::default(), 0.05);
            frames += 1;
        }
        assert_eq!(rig.machine.state(), AnimState::Idle);
        assert_eq!(rig.animator.primary(), Some(rig.clips().idle));
        assert_eq!(rig.animator.secondary(), None);
    }

    #[test]
    fn blend_out_reverses_back_in() {
        let mut rig = Rig::new();
        rig.frame(dance(), 0.1);
        for _ in 0..4 {
            rig.frame(dance(), 0.1);
        }
        rig.frame(AnimationRequests::default(), 0.1);
        assert_eq!(rig.machine.state(), AnimState::DanceToIdle);
        let weight = rig.machine.blend();

        rig.frame(dance(), 0.1);
        assert_eq!(rig.machine.state(), AnimState::IdleToDance);
        assert!((rig.machine.blend() - (1.0 - weight)).abs() < 1e-5);
        assert_eq!(rig.animator.primary(), Some(rig.clips().idle));
    }

    #[test]
    fn dance_wins_over_moonwalk() {
        let mut rig = Rig::new();
        let both = AnimationRequests {
            dance: true,
            moonwalk: true,
            force: None,
        };
        rig.frame(both, 0.1);
        assert_eq!(rig.machine.state(), AnimState::IdleToDance);
    }

    #[test]
    fn steady_actions_switch_directly() {
        let mut rig = Rig::new();
        rig.frame(forced(ForcedPose::Dance), 0.1);
        rig.frame(dance(), 0.5);

        let change = rig.machine.step(&mut rig.animator, &moonwalk(), 0.1).unwrap();
        assert_eq!(change.from, AnimState::Dance);
        assert_eq!(change.to, AnimState::Moonwalk);
        assert_eq!(rig.animator.primary(), Some(rig.clips().moonwalk));
        assert_eq!(rig.animator.primary_time(), 0.0);
        assert_eq!(rig.animator.secondary(), None);
    }

    #[test]
    fn other_action_redirects_blend_in() {
        let mut rig = Rig::new();
        rig.frame(dance(), 0.1);
        rig.frame(dance(), 0.1);
        let idle_time = rig.animator.primary_time();

        rig.machine.step(&mut rig.animator, &moonwalk(), 0.1);
        assert_eq!(rig.machine.state(), AnimState::IdleToMoonwalk);
        assert_eq!(rig.machine.blend(), 0.0);
        assert_eq!(rig.animator.primary(), Some(rig.clips().idle));
        assert_eq!(rig.animator.primary_time(), idle_time);
        assert_eq!(rig.animator.secondary(), Some(rig.clips().moonwalk));
    }

    #[test]
    fn other_action_redirects_blend_out() {
        let mut rig = Rig::new();
        rig.frame(forced(ForcedPose::Dance), 0.1);
        rig.frame(AnimationRequests::default(), 0.1);
        assert_eq!(rig.machine.state(), AnimState::DanceToIdle);

        rig.frame(moonwalk(), 0.1);
        assert_eq!(rig.machine.state(), AnimState::IdleToMoonwalk);
        assert_eq!(rig.animator.secondary(), Some(rig.clips().moonwalk));
    }

    #[test]
    fn forced_pose_skips_crossfade() {
        let mut rig = Rig::new();
        rig.frame(dance(), 0.1);
        rig.frame(dance(), 0.1);

        let change = rig
            .machine
            .step(&mut rig.animator, &forced(ForcedPose::Moonwalk), 0.1)
            .unwrap();
        assert_eq!(change.to, AnimState::Moonwalk);
        assert_eq!(rig.animator.primary(), Some(rig.clips().moonwalk));
        assert_eq!(rig.animator.secondary(), None);
        assert_eq!(rig.animator.primary_time(), 0.0);
        assert_eq!(rig.machine.blend(), 0.0);
    }

    #[test]
    fn forcing_current_state_restarts_clip_silently() {
        let mut rig = Rig::new();
        rig.frame(AnimationRequests::default(), 1.0);
        assert!(rig.animator.primary_time() > 0.0);

        let change = rig.machine.step(&mut rig.animator, &forced(ForcedPose::Idle), 0.1);
        assert!(change.is_none());
        assert_eq!(rig.animator.primary_time(), 0.0);
    }

    #[test]
    fn config_defaults_and_validation() {
        let config: StateMachineConfig = toml::from_str("").unwrap();
        assert_eq!(config.blend_rate, 2.0);

        let config: StateMachineConfig = toml::from_str("blend_rate = 4.0").unwrap();
        assert_eq!(config.blend_rate, 4.0);
        assert!(config.validate().is_ok());

        assert!(StateMachineConfig { blend_rate: 0.0 }.validate().is_err());
        assert!(StateMachineConfig {
            blend_rate: f32::NAN
        }
        .validate()
        .is_err());
    }

    #[test]
    fn state_labels() {
        assert_eq!(AnimState::Idle.to_string(), "IDLE");
        assert_eq!(AnimState::IdleToDance.to_string(), "IDLE_DANCE (blending in)");
        assert_eq!(
            AnimState::MoonwalkToIdle.to_string(),
            "MOONWALK_IDLE (blending out)"
        );
        assert!(AnimState::DanceToIdle.is_transition());
        assert!(!AnimState::Moonwalk.is_transition());
    }
}
