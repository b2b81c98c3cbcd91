use std::collections::VecDeque;
use std::time::{Duration, Instant};

use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, TouchPhase, WindowEvent};
use winit::keyboard::{Key as LogicalKey, KeyCode, ModifiersState, NamedKey, PhysicalKey};

use crate::event::{Event, MouseButtonEvent};
use crate::input::{Key, Modifiers, MouseButton, Scancode};

const MULTI_CLICK_TIME: Duration = Duration::from_millis(300);
const MULTI_CLICK_DISTANCE: f32 = 5.0;

/// Counts consecutive presses of the same button close in time and space.
#[derive(Debug, Default)]
struct ClickTracker {
    last: Option<(MouseButton, Instant, f32, f32)>,
    count: u8,
}

impl ClickTracker {
    fn press(&mut self, button: MouseButton, at: Instant, x: f32, y: f32) -> u8 {
        let repeated = self.last.is_some_and(|(b, t, lx, ly)| {
            b == button
                && at.saturating_duration_since(t) <= MULTI_CLICK_TIME
                && (x - lx).hypot(y - ly) <= MULTI_CLICK_DISTANCE
        });

        self.count = if repeated { self.count.saturating_add(1) } else { 1 };
        self.last = Some((button, at, x, y));
        self.count
    }

    fn current(&self) -> u8 {
        self.count.max(1)
    }
}

/// Turns winit window events into engine events.
///
/// Keeps the small amount of state winit does not carry on each event: modifiers,
/// the last pointer position and the click counter.
#[derive(Debug, Default)]
pub(super) struct Translator {
    modifiers: Modifiers,
    pointer: Option<(f32, f32)>,
    clicks: ClickTracker,
}

impl Translator {
    pub(super) fn pointer(&self) -> (f32, f32) {
        self.pointer.unwrap_or((0.0, 0.0))
    }

    pub(super) fn translate(
        &mut self,
        scale_factor: f64,
        event: &WindowEvent,
        now: Instant,
        out: &mut VecDeque<Event>,
    ) {
        match event {
            WindowEvent::CloseRequested => out.push_back(Event::Quit),

            WindowEvent::ModifiersChanged(m) => self.modifiers = map_modifiers(m.state()),

            WindowEvent::Focused(f) => out.push_back(Event::Focus(*f)),

            WindowEvent::Resized(size) => out.push_back(Event::Resized {
                width: size.width,
                height: size.height,
            }),

            WindowEvent::DroppedFile(path) => out.push_back(Event::FileDropped(path.clone())),

            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = to_logical(scale_factor, *position);
                out.push_back(self.pointer_moved(x, y, false));
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let button = map_mouse_button(*button);
                let (x, y) = self.pointer();
                out.push_back(self.button(*state, button, x, y, false, now));
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let (x, y) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                    MouseScrollDelta::PixelDelta(p) => to_logical(scale_factor, *p),
                };
                out.push_back(Event::WheelMoved { x, y });
            }

            WindowEvent::Touch(touch) => {
                let (x, y) = to_logical(scale_factor, touch.location);
                match touch.phase {
                    TouchPhase::Started => {
                        self.pointer = Some((x, y));
                        out.push_back(self.button(ElementState::Pressed, MouseButton::Left, x, y, true, now));
                    }
                    TouchPhase::Moved => out.push_back(self.pointer_moved(x, y, true)),
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        out.push_back(self.button(ElementState::Released, MouseButton::Left, x, y, true, now));
                    }
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let (physical, code) = map_physical_key(event.physical_key);
                let key = map_logical_key(&event.logical_key).unwrap_or(physical);
                let scancode = Scancode(code);

                match event.state {
                    ElementState::Pressed => {
                        out.push_back(Event::KeyDown {
                            key,
                            scancode,
                            repeat: event.repeat,
                            modifiers: self.modifiers,
                        });

                        // Shortcuts do not produce text.
                        if let Some(text) = event.text.as_ref().filter(|_| !self.modifiers.command()) {
                            if text.chars().any(|c| !c.is_control()) {
                                out.push_back(Event::TextInput(text.to_string()));
                            }
                        }
                    }
                    ElementState::Released => out.push_back(Event::KeyUp {
                        key,
                        scancode,
                        modifiers: self.modifiers,
                    }),
                }
            }

            WindowEvent::Ime(winit::event::Ime::Commit(text)) if !text.is_empty() => {
                out.push_back(Event::TextInput(text.clone()));
            }

            _ => {}
        }
    }

    /// Relative pointer motion while the cursor is locked.
    pub(super) fn raw_motion(&mut self, dx: f64, dy: f64) -> Event {
        let (x, y) = self.pointer();
        Event::MouseMoved {
            x,
            y,
            dx: dx as f32,
            dy: dy as f32,
            is_touch: false,
        }
    }

    fn pointer_moved(&mut self, x: f32, y: f32, is_touch: bool) -> Event {
        let (px, py) = self.pointer.unwrap_or((x, y));
        self.pointer = Some((x, y));
        Event::MouseMoved { x, y, dx: x - px, dy: y - py, is_touch }
    }

    fn button(
        &mut self,
        state: ElementState,
        button: MouseButton,
        x: f32,
        y: f32,
        is_touch: bool,
        now: Instant,
    ) -> Event {
        let clicks = match state {
            ElementState::Pressed => self.clicks.press(button, now, x, y),
            ElementState::Released => self.clicks.current(),
        };
        let ev = MouseButtonEvent {
            x: x.round() as i32,
            y: y.round() as i32,
            button,
            is_touch,
            clicks,
        };
        match state {
            ElementState::Pressed => Event::MouseButtonDown(ev),
            ElementState::Released => Event::MouseButtonUp(ev),
        }
    }
}

fn to_logical(scale_factor: f64, pos: PhysicalPosition<f64>) -> (f32, f32) {
    let logical = pos.to_logical::<f64>(scale_factor);
    (logical.x as f32, logical.y as f32)
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

/// Layout-aware key symbol for letters, digits and a few named keys.
fn map_logical_key(key: &LogicalKey) -> Option<Key> {
    match key {
        LogicalKey::Named(named) => match named {
            NamedKey::Escape => Some(Key::Escape),
            NamedKey::Enter => Some(Key::Enter),
            NamedKey::Tab => Some(Key::Tab),
            NamedKey::Backspace => Some(Key::Backspace),
            NamedKey::Space => Some(Key::Space),
            _ => None,
        },
        LogicalKey::Character(s) => {
            let mut chars = s.chars();
            let c = chars.next()?.to_ascii_uppercase();
            if chars.next().is_some() {
                return None;
            }
            letter_key(c).or_else(|| digit_key(c))
        }
        _ => None,
    }
}

fn letter_key(c: char) -> Option<Key> {
    const LETTERS: [Key; 26] = [
        Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I,
        Key::J, Key::K, Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R,
        Key::S, Key::T, Key::U, Key::V, Key::W, Key::X, Key::Y, Key::Z,
    ];
    c.is_ascii_uppercase().then(|| LETTERS[(c as u8 - b'A') as usize])
}

fn digit_key(c: char) -> Option<Key> {
    const DIGITS: [Key; 10] = [
        Key::Digit0, Key::Digit1, Key::Digit2, Key::Digit3, Key::Digit4,
        Key::Digit5, Key::Digit6, Key::Digit7, Key::Digit8, Key::Digit9,
    ];
    c.to_digit(10).map(|d| DIGITS[d as usize])
}

fn map_physical_key(pk: PhysicalKey) -> (Key, u32) {
    let code = match pk {
        PhysicalKey::Code(code) => code,
        // No stable numeric code for native keys.
        PhysicalKey::Unidentified(_) => return (Key::Unknown(0), 0),
    };

    let key = match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Space => Key::Space,

        KeyCode::Insert => Key::Insert,
        KeyCode::Delete => Key::Delete,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,

        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,

        KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
        KeyCode::ControlLeft | KeyCode::ControlRight => Key::Control,
        KeyCode::AltLeft | KeyCode::AltRight => Key::Alt,
        KeyCode::SuperLeft | KeyCode::SuperRight => Key::Meta,

        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,

        KeyCode::Digit0 | KeyCode::Numpad0 => Key::Digit0,
        KeyCode::Digit1 | KeyCode::Numpad1 => Key::Digit1,
        KeyCode::Digit2 | KeyCode::Numpad2 => Key::Digit2,
        KeyCode::Digit3 | KeyCode::Numpad3 => Key::Digit3,
        KeyCode::Digit4 | KeyCode::Numpad4 => Key::Digit4,
        KeyCode::Digit5 | KeyCode::Numpad5 => Key::Digit5,
        KeyCode::Digit6 | KeyCode::Numpad6 => Key::Digit6,
        KeyCode::Digit7 | KeyCode::Numpad7 => Key::Digit7,
        KeyCode::Digit8 | KeyCode::Numpad8 => Key::Digit8,
        KeyCode::Digit9 | KeyCode::Numpad9 => Key::Digit9,

        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::F3 => Key::F3,
        KeyCode::F4 => Key::F4,
        KeyCode::F5 => Key::F5,
        KeyCode::F6 => Key::F6,
        KeyCode::F7 => Key::F7,
        KeyCode::F8 => Key::F8,
        KeyCode::F9 => Key::F9,
        KeyCode::F10 => Key::F10,
        KeyCode::F11 => Key::F11,
        KeyCode::F12 => Key::F12,

        other => Key::Unknown(other as u32),
    };

    (key, code as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clicks_count_up_when_close_in_time_and_space() {
        let mut t = ClickTracker::default();
        let t0 = Instant::now();

        assert_eq!(t.press(MouseButton::Left, t0, 10.0, 10.0), 1);
        assert_eq!(t.press(MouseButton::Left, t0 + Duration::from_millis(100), 12.0, 11.0), 2);
        assert_eq!(t.current(), 2);
        assert_eq!(t.press(MouseButton::Left, t0 + Duration::from_millis(150), 40.0, 40.0), 1);
        assert_eq!(t.press(MouseButton::Right, t0 + Duration::from_millis(200), 40.0, 40.0), 1);
        assert_eq!(t.press(MouseButton::Right, t0 + Duration::from_secs(2), 40.0, 40.0), 1);
    }

    #[test]
    fn logical_characters_map_case_insensitively() {
        assert_eq!(map_logical_key(&LogicalKey::Character("q".into())), Some(Key::Q));
        assert_eq!(map_logical_key(&LogicalKey::Character("7".into())), Some(Key::Digit7));
        assert_eq!(map_logical_key(&LogicalKey::Character("é".into())), None);
        assert_eq!(map_logical_key(&LogicalKey::Named(NamedKey::Escape)), Some(Key::Escape));
    }

    #[test]
    fn physical_keys_keep_their_code() {
        let (key, code) = map_physical_key(PhysicalKey::Code(KeyCode::KeyW));
        assert_eq!(key, Key::W);
        assert_eq!(code, KeyCode::KeyW as u32);
    }

    #[test]
    fn pointer_deltas_follow_previous_position() {
        let mut t = Translator::default();
        assert_eq!(
            t.pointer_moved(5.0, 5.0, false),
            Event::MouseMoved { x: 5.0, y: 5.0, dx: 0.0, dy: 0.0, is_touch: false }
        );
        assert_eq!(
            t.pointer_moved(8.0, 1.0, false),
            Event::MouseMoved { x: 8.0, y: 1.0, dx: 3.0, dy: -4.0, is_touch: false }
        );
    }
}
