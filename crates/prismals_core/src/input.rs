//! # Keyboard Input
//!
//! Keys are not handled directly by gameplay code. Each tick every held key
//! becomes one event instance appended to the active world; downstream
//! systems (UAV movement, tesseract) react to those instances and the
//! audicle pass retires them at the end of the tick.
//!
//! | Key         | Event          | Note                  |
//! |-------------|----------------|-----------------------|
//! | W/A/S/D     | `UAV_W`..`UAV_D` | gated               |
//! | Space       | `UAV_SPACE`    | gated                 |
//! | Left Shift  | `UAV_LSHIFT`   | gated                 |
//! | Up/Down     | `TESS_FORWARD` / `TESS_BACKWARD` | `TESS_UP` / `TESS_DOWN` while Grave is held |
//! | Left/Right  | `TESS_LEFT` / `TESS_RIGHT` |           |
//! | Tab         | -              | next world, rising edge only |

use std::collections::HashSet;

use crate::entity::{InstanceFactory, PrototypeId, DEBUG_COLOR};
use crate::error::CoreResult;
use crate::math::Vec3;
use crate::registry::PrototypeRegistry;
use crate::world::Level;

/// Physical keys the game reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Forward.
    W,
    /// Strafe left.
    A,
    /// Backward.
    S,
    /// Strafe right.
    D,
    /// Rise.
    Space,
    /// Sink.
    LeftShift,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Backtick; modifies the arrow keys.
    Grave,
    /// Cycles the active world.
    Tab,
    /// Requests quit; read by the host loop.
    Escape,
}

/// Snapshot of the input devices for one tick.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    held: HashSet<Key>,
    /// Cursor movement since the last tick; y grows upward.
    pub mouse_delta: (f32, f32),
}

impl InputState {
    /// Creates a state with nothing held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a key as held.
    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    /// Marks a key as released.
    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Builder form of [`Self::press`].
    #[must_use]
    pub fn with_key(mut self, key: Key) -> Self {
        self.press(key);
        self
    }

    /// Builder form for the mouse delta.
    #[must_use]
    pub const fn with_mouse_delta(mut self, dx: f32, dy: f32) -> Self {
        self.mouse_delta = (dx, dy);
        self
    }

    /// Returns true if `key` is held.
    #[inline]
    #[must_use]
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }
}

// ============================================================================
// BINDINGS
// ============================================================================

const UAV_BINDINGS: [(Key, &str); 6] = [
    (Key::W, "UAV_W"),
    (Key::A, "UAV_A"),
    (Key::S, "UAV_S"),
    (Key::D, "UAV_D"),
    (Key::Space, "UAV_SPACE"),
    (Key::LeftShift, "UAV_LSHIFT"),
];

const TESSERACT_BINDINGS: [(Key, &str); 4] = [
    (Key::Up, "TESS_FORWARD"),
    (Key::Down, "TESS_BACKWARD"),
    (Key::Left, "TESS_LEFT"),
    (Key::Right, "TESS_RIGHT"),
];

const TESSERACT_GRAVE_BINDINGS: [(Key, &str); 2] = [(Key::Up, "TESS_UP"), (Key::Down, "TESS_DOWN")];

fn resolve(registry: &PrototypeRegistry, table: &[(Key, &str)]) -> Vec<(Key, PrototypeId)> {
    table
        .iter()
        .filter_map(|&(key, name)| match registry.find(name) {
            Some(id) => Some((key, id)),
            None => {
                tracing::warn!(?key, event = name, "input binding skipped: prototype not declared");
                None
            }
        })
        .collect()
}

/// Turns held keys into event instances in the active world.
#[derive(Debug)]
pub struct KeyboardInput {
    uav: Vec<(Key, PrototypeId)>,
    tesseract: Vec<(Key, PrototypeId)>,
    tesseract_grave: Vec<(Key, PrototypeId)>,
    tab_was_held: bool,
}

impl KeyboardInput {
    /// Resolves event prototypes once.
    ///
    /// Bindings whose event prototype is missing from the scene are dropped
    /// with a warning; the key then does nothing.
    #[must_use]
    pub fn new(registry: &PrototypeRegistry) -> Self {
        Self {
            uav: resolve(registry, &UAV_BINDINGS),
            tesseract: resolve(registry, &TESSERACT_BINDINGS),
            tesseract_grave: resolve(registry, &TESSERACT_GRAVE_BINDINGS),
            tab_was_held: false,
        }
    }

    /// Number of keys that produce events.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.uav.len() + self.tesseract.len() + self.tesseract_grave.len()
    }

    /// Appends one event per held key, then handles world switching.
    ///
    /// Returns the number of events emitted.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::NoActiveWorld`] if the level is empty.
    pub fn process(
        &mut self,
        input: &InputState,
        level: &mut Level,
        factory: &mut InstanceFactory,
    ) -> CoreResult<usize> {
        let world = level.active_world_mut()?;
        let before = world.len();

        let arrows = if input.is_held(Key::Grave) {
            &self.tesseract_grave
        } else {
            &self.tesseract
        };
        for &(key, event) in arrows.iter().chain(self.uav.iter()) {
            if input.is_held(key) {
                world.push(factory.create(event, Vec3::ZERO, DEBUG_COLOR));
            }
        }
        let emitted = world.len() - before;

        let tab = input.is_held(Key::Tab);
        if tab && !self.tab_was_held {
            level.cycle_active();
        }
        self.tab_was_held = tab;

        Ok(emitted)
    }
}
