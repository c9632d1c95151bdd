//! Timed key event scripts for headless simulation
//!
//! ```toml
//! [[events]]
//! time = 0.5
//! key = "ArrowLeft"
//! pressed = true
//!
//! [[events]]
//! time = 2.0
//! key = "ArrowLeft"
//! pressed = false
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use tendon_runtime::InputState;
use winit::keyboard::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct KeyEvent {
    /// Seconds from the start of the run
    pub time: f64,
    pub key: KeyCode,
    pub pressed: bool,
}

#[derive(Debug, Deserialize)]
struct ScriptDocument {
    #[serde(default)]
    events: Vec<KeyEvent>,
}

/// Key events in time order, consumed as the simulation advances
#[derive(Debug)]
pub struct InputScript {
    events: Vec<KeyEvent>,
    next: usize,
}

impl InputScript {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid script {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let doc: ScriptDocument = toml::from_str(content)?;
        let mut events = doc.events;

        if let Some(bad) = events.iter().find(|e| !(e.time.is_finite() && e.time >= 0.0)) {
            bail!("event for {:?} has invalid time {}", bad.key, bad.time);
        }
        // Stable, so same-time events keep file order
        events.sort_by(|a, b| a.time.total_cmp(&b.time));

        Ok(Self { events, next: 0 })
    }

    /// Time of the last event, or 0 for an empty script
    pub fn end_time(&self) -> f64 {
        self.events.last().map_or(0.0, |e| e.time)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Feed every not-yet-applied event with `time <= now` into `input`.
    ///
    /// Returns how many events were applied.
    pub fn apply_until(&mut self, now: f64, input: &mut InputState) -> usize {
        let start = self.next;
        while let Some(event) = self.events.get(self.next) {
            if event.time > now {
                break;
            }
            if event.pressed {
                input.process_key_down(event.key);
            } else {
                input.process_key_up(event.key);
            }
            self.next += 1;
        }
        self.next - start
    }
}
