//! Keyboard and mouse state sampling
//!
//! Keys are sampled once per frame into a current/previous snapshot
//! pair, from which the four discrete button states are derived. The
//! mouse contributes a continuous per-frame delta that is only tracked
//! while the cursor is captured.

use crate::window::Window;
use nalgebra::Vector2;

/// Discrete state of a key for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    /// Up this frame and the previous frame
    Neutral,
    /// Down this frame, up the previous frame
    Pressed,
    /// Down this frame and the previous frame
    Held,
    /// Up this frame, down the previous frame
    Released,
}

/// Keys sampled every frame. Queries for keys outside this set always
/// report [`ButtonState::Neutral`].
pub const TRACKED_KEYS: &[glfw::Key] = &[
    glfw::Key::W,
    glfw::Key::A,
    glfw::Key::S,
    glfw::Key::D,
    glfw::Key::Space,
    glfw::Key::LeftShift,
    glfw::Key::Escape,
    glfw::Key::GraveAccent,
];

/// Per-frame keyboard and mouse snapshot.
pub struct InputHandler {
    current: Vec<bool>,
    previous: Vec<bool>,
    mouse_position: Vector2<f32>,
    mouse_delta: Vector2<f32>,
    last_frame_uncaptured: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Create an input handler with all keys neutral.
    pub fn new() -> Self {
        Self {
            current: vec![false; TRACKED_KEYS.len()],
            previous: vec![false; TRACKED_KEYS.len()],
            mouse_position: Vector2::zeros(),
            mouse_delta: Vector2::zeros(),
            last_frame_uncaptured: true,
        }
    }

    /// Sample the keyboard and mouse for this frame.
    ///
    /// The previous frame's key snapshot is retained so edge states
    /// (pressed/released) can be derived. The mouse delta is zeroed on
    /// the first captured frame after the cursor was released, so the
    /// jump back into capture does not register as a camera swing.
    pub fn update(&mut self, window: &Window) {
        std::mem::swap(&mut self.previous, &mut self.current);
        for (index, &key) in TRACKED_KEYS.iter().enumerate() {
            self.current[index] = window.is_key_down(key);
        }

        let (x, y) = window.cursor_position();
        let position = Vector2::new(x as f32, y as f32);

        if window.cursor_captured() {
            if self.last_frame_uncaptured {
                self.mouse_delta = Vector2::zeros();
                self.last_frame_uncaptured = false;
            } else {
                // Screen-space y grows downward; flip so up is positive.
                self.mouse_delta =
                    Vector2::new(position.x - self.mouse_position.x, -(position.y - self.mouse_position.y));
            }
        } else {
            self.mouse_delta = Vector2::zeros();
            self.last_frame_uncaptured = true;
        }

        self.mouse_position = position;
    }

    /// The discrete state of `key` for this frame.
    pub fn key_state(&self, key: glfw::Key) -> ButtonState {
        match TRACKED_KEYS.iter().position(|&tracked| tracked == key) {
            Some(index) => classify(self.previous[index], self.current[index]),
            None => ButtonState::Neutral,
        }
    }

    /// Mouse movement since the previous frame (captured mode only).
    pub fn mouse_delta(&self) -> Vector2<f32> {
        self.mouse_delta
    }

    /// Discard any accumulated mouse movement.
    pub fn clear_mouse_delta(&mut self) {
        self.mouse_delta = Vector2::zeros();
    }
}

/// Derive the discrete button state from two key snapshots.
fn classify(previous: bool, current: bool) -> ButtonState {
    match (previous, current) {
        (false, false) => ButtonState::Neutral,
        (false, true) => ButtonState::Pressed,
        (true, true) => ButtonState::Held,
        (true, false) => ButtonState::Released,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_transitions() {
        assert_eq!(classify(false, false), ButtonState::Neutral);
        assert_eq!(classify(false, true), ButtonState::Pressed);
        assert_eq!(classify(true, true), ButtonState::Held);
        assert_eq!(classify(true, false), ButtonState::Released);
    }

    #[test]
    fn test_untracked_key_is_neutral() {
        let input = InputHandler::new();
        assert_eq!(input.key_state(glfw::Key::F12), ButtonState::Neutral);
    }
}
