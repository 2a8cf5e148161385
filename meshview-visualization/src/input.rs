//! Discrete input events and their translation from winit

use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

/// Pixels of trackpad scroll counted as one wheel line
const PIXELS_PER_LINE: f32 = 20.0;

/// Keys the viewer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    N,
    P,
    S,
    T,
    L,
    Escape,
}

impl Key {
    fn from_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::KeyN => Some(Key::N),
            KeyCode::KeyP => Some(Key::P),
            KeyCode::KeyS => Some(Key::S),
            KeyCode::KeyT => Some(Key::T),
            KeyCode::KeyL => Some(Key::L),
            KeyCode::Escape => Some(Key::Escape),
            _ => None,
        }
    }
}

/// Viewer input, independent of the windowing system
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer motion in pixels since the previous motion event
    PointerMoved { dx: f32, dy: f32, shift: bool },
    /// Primary button pressed or released
    PointerButton { pressed: bool },
    /// Scroll in wheel lines, positive away from the user
    Scroll { dy: f32 },
    KeyUp { key: Key, shift: bool },
    Resized { width: u32, height: u32 },
}

/// Turns winit window events into [`InputEvent`]s
///
/// winit reports absolute cursor positions and modifier changes as separate
/// events; this keeps the state needed to produce deltas and shift flags.
#[derive(Debug, Default)]
pub struct InputTranslator {
    last_cursor: Option<(f64, f64)>,
    modifiers: ModifiersState,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                let current = (position.x, position.y);
                let previous = self.last_cursor.replace(current)?;
                Some(InputEvent::PointerMoved {
                    dx: (current.0 - previous.0) as f32,
                    dy: (current.1 - previous.1) as f32,
                    shift: self.modifiers.shift_key(),
                })
            }
            // A release outside the window is never delivered, so end any drag here
            WindowEvent::CursorLeft { .. } | WindowEvent::Focused(false) => {
                self.last_cursor = None;
                Some(InputEvent::PointerButton { pressed: false })
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => Some(InputEvent::PointerButton {
                pressed: *state == ElementState::Pressed,
            }),
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
                };
                Some(InputEvent::Scroll { dy })
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Released => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return None;
                };
                Key::from_code(code).map(|key| InputEvent::KeyUp {
                    key,
                    shift: self.modifiers.shift_key(),
                })
            }
            WindowEvent::Resized(size) => Some(InputEvent::Resized {
                width: size.width,
                height: size.height,
            }),
            _ => None,
        }
    }
}
