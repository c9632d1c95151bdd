//! Input state management

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use winit::keyboard::KeyCode;

/// Action names understood by the default bindings
pub mod actions {
    /// Held: blend toward the dance clip
    pub const DANCE: &str = "dance";
    /// Held: blend toward the moonwalk clip
    pub const MOONWALK: &str = "moonwalk";
    /// Pressed: jump straight to idle
    pub const FORCE_IDLE: &str = "force_idle";
    /// Pressed: jump straight to dance
    pub const FORCE_DANCE: &str = "force_dance";
    /// Pressed: jump straight to moonwalk
    pub const FORCE_MOONWALK: &str = "force_moonwalk";
}

/// Key binding overrides loaded from TOML.
///
/// ```toml
/// [bindings]
/// dance = ["ArrowLeft", "KeyQ"]
/// force_idle = ["Digit1"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub bindings: HashMap<String, Vec<KeyCode>>,
}

impl InputConfig {
    /// Parse an input config from a TOML string
    pub fn from_toml_str(content: &str) -> tendon_core::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Tracks keyboard state per frame
pub struct InputState {
    /// Keys currently held down
    keys_down: HashSet<KeyCode>,
    /// Keys pressed this frame
    keys_just_pressed: HashSet<KeyCode>,
    /// Keys released this frame
    keys_just_released: HashSet<KeyCode>,

    /// Action map: action name -> list of key bindings
    action_map: HashMap<String, Vec<KeyCode>>,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_just_pressed: HashSet::new(),
            keys_just_released: HashSet::new(),
            action_map: Self::default_action_map(),
        }
    }

    fn default_action_map() -> HashMap<String, Vec<KeyCode>> {
        let mut map = HashMap::new();
        map.insert(actions::DANCE.into(), vec![KeyCode::ArrowLeft]);
        map.insert(actions::MOONWALK.into(), vec![KeyCode::ArrowRight]);
        map.insert(actions::FORCE_IDLE.into(), vec![KeyCode::Digit1]);
        map.insert(actions::FORCE_DANCE.into(), vec![KeyCode::Digit2]);
        map.insert(actions::FORCE_MOONWALK.into(), vec![KeyCode::Digit3]);
        map
    }

    /// Bind an action to one or more keys
    pub fn bind_action(&mut self, action: impl Into<String>, keys: Vec<KeyCode>) {
        self.action_map.insert(action.into(), keys);
    }

    /// Replace the bindings named in `config`, leaving the rest at their defaults
    pub fn apply_config(&mut self, config: &InputConfig) {
        for (action, keys) in &config.bindings {
            self.bind_action(action.clone(), keys.clone());
        }
    }

    /// Process a key press event
    pub fn process_key_down(&mut self, key: KeyCode) {
        if !self.keys_down.contains(&key) {
            self.keys_just_pressed.insert(key);
        }
        self.keys_down.insert(key);
    }

    /// Process a key release event
    pub fn process_key_up(&mut self, key: KeyCode) {
        if self.keys_down.remove(&key) {
            self.keys_just_released.insert(key);
        }
    }

    /// Call at end of frame to clear per-frame state
    pub fn end_frame(&mut self) {
        self.keys_just_pressed.clear();
        self.keys_just_released.clear();
    }

    // --- Query methods ---

    /// Is a key currently held down?
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Was a key pressed this frame?
    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.keys_just_pressed.contains(&key)
    }

    /// Was a key released this frame?
    pub fn is_key_just_released(&self, key: KeyCode) -> bool {
        self.keys_just_released.contains(&key)
    }

    /// Is an action currently held? (any bound key is down)
    pub fn is_action_pressed(&self, action: &str) -> bool {
        self.action_map
            .get(action)
            .map(|keys| keys.iter().any(|k| self.keys_down.contains(k)))
            .unwrap_or(false)
    }

    /// Was an action just pressed this frame?
    pub fn is_action_just_pressed(&self, action: &str) -> bool {
        self.action_map
            .get(action)
            .map(|keys| keys.iter().any(|k| self.keys_just_pressed.contains(k)))
            .unwrap_or(false)
    }

    /// Get all registered action names
    pub fn action_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.action_map.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_transitions() {
        let mut input = InputState::new();

        input.process_key_down(KeyCode::ArrowLeft);
        assert!(input.is_key_down(KeyCode::ArrowLeft));
        assert!(input.is_key_just_pressed(KeyCode::ArrowLeft));

        // End frame clears just_pressed
        input.end_frame();
        assert!(input.is_key_down(KeyCode::ArrowLeft));
        assert!(!input.is_key_just_pressed(KeyCode::ArrowLeft));

        input.process_key_up(KeyCode::ArrowLeft);
        assert!(!input.is_key_down(KeyCode::ArrowLeft));
        assert!(input.is_key_just_released(KeyCode::ArrowLeft));
    }

    #[test]
    fn test_default_action_map() {
        let mut input = InputState::new();
        assert!(!input.is_action_pressed(actions::DANCE));

        input.process_key_down(KeyCode::ArrowLeft);
        assert!(input.is_action_pressed(actions::DANCE));
        assert!(!input.is_action_pressed(actions::MOONWALK));

        input.process_key_down(KeyCode::Digit3);
        assert!(input.is_action_just_pressed(actions::FORCE_MOONWALK));

        input.end_frame();
        assert!(input.is_action_pressed(actions::FORCE_MOONWALK));
        assert!(!input.is_action_just_pressed(actions::FORCE_MOONWALK));
    }

    #[test]
    fn test_custom_binding() {
        let mut input = InputState::new();
        input.bind_action(actions::DANCE, vec![KeyCode::KeyQ, KeyCode::ControlLeft]);

        input.process_key_down(KeyCode::ArrowLeft);
        assert!(!input.is_action_pressed(actions::DANCE));

        input.process_key_down(KeyCode::KeyQ);
        assert!(input.is_action_pressed(actions::DANCE));

        input.process_key_up(KeyCode::KeyQ);
        input.process_key_down(KeyCode::ControlLeft);
        assert!(input.is_action_pressed(actions::DANCE));
    }

    #[test]
    fn test_config_overrides_only_named_actions() {
        let config = InputConfig::from_toml_str(
            r#"
[bindings]
moonwalk = ["KeyM"]
"#,
        )
        .unwrap();

        let mut input = InputState::new();
        input.apply_config(&config);

        input.process_key_down(KeyCode::KeyM);
        input.process_key_down(KeyCode::ArrowLeft);
        assert!(input.is_action_pressed(actions::MOONWALK));
        assert!(input.is_action_pressed(actions::DANCE));
    }

    #[test]
    fn test_config_rejects_unknown_key() {
        let result = InputConfig::from_toml_str(
            r#"
[bindings]
dance = ["NotAKey"]
"#,
        );
        assert!(result.is_err());
    }
}
