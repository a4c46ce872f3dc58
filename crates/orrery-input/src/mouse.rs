//! Per-frame mouse state accumulated from winit events.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Roughly how many pixels of touchpad scrolling make one wheel line.
const PIXELS_PER_LINE: f64 = 40.0;

fn button_index(button: MouseButton) -> Option<usize> {
    match button {
        MouseButton::Left => Some(0),
        MouseButton::Right => Some(1),
        MouseButton::Middle => Some(2),
        _ => None,
    }
}

/// Mouse state for the current frame.
///
/// Forward window events through the `on_*` methods, read the state while
/// updating, then call [`end_frame`](Self::end_frame).
#[derive(Debug, Clone, Default)]
pub struct MouseState {
    position: Option<Vec2>,
    delta: Vec2,
    pressed: [bool; 3],
    scroll: f32,
}

impl MouseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `CursorMoved`. The first sample after entering the window only sets
    /// the position, so re-entry never produces a jump.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let position = Vec2::new(x as f32, y as f32);
        if let Some(previous) = self.position {
            self.delta += position - previous;
        }
        self.position = Some(position);
    }

    pub fn on_cursor_left(&mut self) {
        self.position = None;
    }

    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        if let Some(i) = button_index(button) {
            self.pressed[i] = state == ElementState::Pressed;
        }
    }

    /// `MouseWheel`; positive is away from the user.
    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        self.scroll += match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
        };
    }

    /// Clear the per-frame delta and scroll.
    pub fn end_frame(&mut self) {
        self.delta = Vec2::ZERO;
        self.scroll = 0.0;
    }

    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Cursor movement since the last [`end_frame`](Self::end_frame).
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Wheel lines since the last [`end_frame`](Self::end_frame).
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    pub fn is_pressed(&self, button: MouseButton) -> bool {
        button_index(button).is_some_and(|i| self.pressed[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn test_first_move_sets_position_without_delta() {
        let mut ms = MouseState::new();
        ms.on_cursor_moved(100.0, 200.0);
        assert_eq!(ms.position(), Some(Vec2::new(100.0, 200.0)));
        assert_eq!(ms.delta(), Vec2::ZERO);
    }

    #[test]
    fn test_delta_accumulates_until_end_of_frame() {
        let mut ms = MouseState::new();
        ms.on_cursor_moved(100.0, 200.0);
        ms.on_cursor_moved(110.0, 195.0);
        ms.on_cursor_moved(112.0, 195.0);
        assert_eq!(ms.delta(), Vec2::new(12.0, -5.0));
        ms.end_frame();
        assert_eq!(ms.delta(), Vec2::ZERO);
    }

    #[test]
    fn test_leaving_window_forgets_position() {
        let mut ms = MouseState::new();
        ms.on_cursor_moved(10.0, 10.0);
        ms.on_cursor_left();
        ms.on_cursor_moved(500.0, 500.0);
        assert_eq!(ms.delta(), Vec2::ZERO);
    }

    #[test]
    fn test_button_state() {
        let mut ms = MouseState::new();
        ms.on_button(MouseButton::Left, ElementState::Pressed);
        assert!(ms.is_pressed(MouseButton::Left));
        assert!(!ms.is_pressed(MouseButton::Right));
        ms.on_button(MouseButton::Left, ElementState::Released);
        assert!(!ms.is_pressed(MouseButton::Left));
        assert!(!ms.is_pressed(MouseButton::Back));
    }

    #[test]
    fn test_scroll_lines_and_pixels() {
        let mut ms = MouseState::new();
        ms.on_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        ms.on_scroll(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 20.0)));
        assert!((ms.scroll() - 1.5).abs() < f32::EPSILON);
        ms.end_frame();
        assert_eq!(ms.scroll(), 0.0);
    }
}
