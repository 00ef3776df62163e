//! Pointer and keyboard events, and per-instance input tracking.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Pointer event in device coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PointerEvent {
    Down {
        position: Point,
        #[serde(default)]
        button: MouseButton,
    },
    Up {
        position: Point,
        #[serde(default)]
        button: MouseButton,
    },
    Move {
        position: Point,
    },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Move { position } => *position,
        }
    }

    /// Primary-button press at `position`.
    pub fn down(position: Point) -> Self {
        PointerEvent::Down {
            position,
            button: MouseButton::Left,
        }
    }

    /// Primary-button release at `position`.
    pub fn up(position: Point) -> Self {
        PointerEvent::Up {
            position,
            button: MouseButton::Left,
        }
    }

    pub fn moved(position: Point) -> Self {
        PointerEvent::Move { position }
    }
}

/// Keys the engine reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Enter,
    /// Printable text, usually one character.
    Character(String),
}

impl Key {
    /// Parse a key name as hosts usually report it ("Delete", "Escape", "a").
    pub fn from_name(name: &str) -> Self {
        match name {
            "Delete" | "Del" => Key::Delete,
            "Backspace" => Key::Backspace,
            "Escape" | "Esc" => Key::Escape,
            "Enter" | "Return" => Key::Enter,
            other => Key::Character(other.to_string()),
        }
    }

    /// Whether this key matches a binding such as `"b"` (case-insensitive).
    pub fn matches_binding(&self, binding: &str) -> bool {
        match self {
            Key::Character(text) => text.eq_ignore_ascii_case(binding),
            other => *other == Key::from_name(binding),
        }
    }
}

/// Keyboard event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(Key),
    Released(Key),
}

/// Detects double presses of the primary button.
#[derive(Debug, Clone)]
pub struct DoubleClickDetector {
    max_interval: Duration,
    max_distance: f64,
    last_click: Option<(Instant, Point)>,
}

impl DoubleClickDetector {
    pub fn new(max_interval: Duration, max_distance: f64) -> Self {
        Self {
            max_interval,
            max_distance,
            last_click: None,
        }
    }

    /// Register a press now. Returns true if it completes a double-click.
    pub fn register(&mut self, position: Point) -> bool {
        self.register_at(position, Instant::now())
    }

    /// Register a press at an explicit time.
    pub fn register_at(&mut self, position: Point, now: Instant) -> bool {
        if let Some((last_time, last_pos)) = self.last_click {
            let elapsed = now.saturating_duration_since(last_time);
            if elapsed <= self.max_interval && position.distance(last_pos) < self.max_distance {
                // Reset so a triple press is not a second double-click.
                self.last_click = None;
                return true;
            }
        }
        self.last_click = Some((now, position));
        false
    }

    pub fn reset(&mut self) {
        self.last_click = None;
    }
}

/// Pointer state tracked across events for one engine instance.
#[derive(Debug, Clone)]
pub struct InputState {
    /// Last known pointer position in device coordinates.
    pub pointer_position: Point,
    /// Whether the primary button is held.
    pub primary_pressed: bool,
    /// Whether a host text field currently has keyboard focus.
    pub text_input_focused: bool,
    double_click: DoubleClickDetector,
}

impl InputState {
    pub fn new(double_click_interval: Duration, double_click_distance: f64) -> Self {
        Self {
            pointer_position: Point::ZERO,
            primary_pressed: false,
            text_input_focused: false,
            double_click: DoubleClickDetector::new(double_click_interval, double_click_distance),
        }
    }

    /// Record a pointer event. Returns true if it is a primary double-click.
    pub fn handle_pointer_event(&mut self, event: &PointerEvent) -> bool {
        self.pointer_position = event.position();
        match event {
            PointerEvent::Down { position, button } if *button == MouseButton::Left => {
                self.primary_pressed = true;
                self.double_click.register(*position)
            }
            PointerEvent::Up { button, .. } if *button == MouseButton::Left => {
                self.primary_pressed = false;
                false
            }
            _ => false,
        }
    }

    pub fn reset_double_click(&mut self) {
        self.double_click.reset();
    }
}
