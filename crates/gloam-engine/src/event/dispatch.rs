use crate::core::{guard, CallSite, Ctx, Fault, Game};

use super::{Event, MouseButtonEvent};

/// Routes one event to the matching optional capability of `game`.
///
/// Events whose capability the game does not expose are dropped. `Quit` has no
/// game-side callback; the pump already closed the surface for it.
pub(crate) fn dispatch_to_game<G>(game: &mut G, ctx: &mut Ctx<'_>, event: Event) -> Result<(), Fault>
where
    G: Game + ?Sized,
{
    match event {
        Event::Quit => Ok(()),

        Event::KeyDown { key, scancode, repeat, .. } => match game.keyboard() {
            Some(h) => guard(CallSite::KeyPressed, || h.key_pressed(ctx, key, scancode, repeat)),
            None => Ok(()),
        },

        Event::KeyUp { key, scancode, .. } => match game.keyboard() {
            Some(h) => guard(CallSite::KeyReleased, || h.key_released(ctx, key, scancode)),
            None => Ok(()),
        },

        Event::TextInput(text) => match game.keyboard() {
            Some(h) => guard(CallSite::TextInput, || h.text_input(ctx, &text)),
            None => Ok(()),
        },

        Event::MouseButtonDown(MouseButtonEvent { x, y, button, is_touch, clicks }) => {
            match game.mouse() {
                Some(h) => guard(CallSite::MousePressed, || {
                    h.mouse_pressed(ctx, x, y, button, is_touch, clicks)
                }),
                None => Ok(()),
            }
        }

        Event::MouseButtonUp(MouseButtonEvent { x, y, button, is_touch, clicks }) => {
            match game.mouse() {
                Some(h) => guard(CallSite::MouseReleased, || {
                    h.mouse_released(ctx, x, y, button, is_touch, clicks)
                }),
                None => Ok(()),
            }
        }

        Event::MouseMoved { x, y, dx, dy, is_touch } => match game.mouse() {
            Some(h) => guard(CallSite::MouseMoved, || h.mouse_moved(ctx, x, y, dx, dy, is_touch)),
            None => Ok(()),
        },

        Event::WheelMoved { x, y } => match game.mouse() {
            Some(h) => guard(CallSite::WheelMoved, || h.wheel_moved(ctx, x, y)),
            None => Ok(()),
        },

        Event::FileDropped(path) => match game.window_events() {
            Some(h) => guard(CallSite::FileDropped, || h.file_dropped(ctx, &path)),
            None => Ok(()),
        },

        Event::Resized { width, height } => match game.window_events() {
            Some(h) => guard(CallSite::Resized, || h.resized(ctx, width, height)),
            None => Ok(()),
        },

        Event::Focus(focused) => match game.window_events() {
            Some(h) => guard(CallSite::Focus, || h.focus(ctx, focused)),
            None => Ok(()),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::core::{FaultKind, GameResult, KeyboardHandler, MouseHandler, WindowHandler};
    use crate::input::{Key, MouseButton, Scancode};
    use crate::platform::HeadlessPlatform;
    use crate::time::TimerStats;

    #[derive(Default)]
    struct Recorder {
        keys: Vec<(Key, bool)>,
        dropped: Vec<PathBuf>,
        clicks: Vec<String>,
        fail_on_release: bool,
        fail_mouse: bool,
    }

    impl Game for Recorder {
        fn load(&mut self, _: &mut Ctx<'_>) -> GameResult { Ok(()) }
        fn update(&mut self, _: &mut Ctx<'_>, _: f64) -> GameResult { Ok(()) }
        fn draw(&mut self, _: &mut Ctx<'_>) -> GameResult { Ok(()) }

        fn keyboard(&mut self) -> Option<&mut dyn KeyboardHandler> {
            Some(self)
        }

        fn mouse(&mut self) -> Option<&mut dyn MouseHandler> {
            Some(self)
        }

        fn window_events(&mut self) -> Option<&mut dyn WindowHandler> {
            Some(self)
        }
    }

    impl KeyboardHandler for Recorder {
        fn key_pressed(&mut self, _: &mut Ctx<'_>, key: Key, _: Scancode, _: bool) -> GameResult {
            self.keys.push((key, true));
            Ok(())
        }

        fn key_released(&mut self, _: &mut Ctx<'_>, key: Key, _: Scancode) -> GameResult {
            anyhow::ensure!(!self.fail_on_release, "release of {key} rejected");
            self.keys.push((key, false));
            Ok(())
        }
    }

    impl MouseHandler for Recorder {
        fn mouse_pressed(
            &mut self,
            _: &mut Ctx<'_>,
            x: i32,
            y: i32,
            button: MouseButton,
            is_touch: bool,
            clicks: u8,
        ) -> GameResult {
            anyhow::ensure!(!self.fail_mouse, "press rejected");
            self.clicks.push(format!("down {x} {y} {button:?} {is_touch} {clicks}"));
            Ok(())
        }

        fn mouse_released(
            &mut self,
            _: &mut Ctx<'_>,
            x: i32,
            y: i32,
            button: MouseButton,
            is_touch: bool,
            clicks: u8,
        ) -> GameResult {
            anyhow::ensure!(!self.fail_mouse, "release rejected");
            self.clicks.push(format!("up {x} {y} {button:?} {is_touch} {clicks}"));
            Ok(())
        }
    }

    fn touch(x: i32, y: i32, clicks: u8) -> MouseButtonEvent {
        MouseButtonEvent { x, y, button: MouseButton::Left, is_touch: true, clicks }
    }

    impl WindowHandler for Recorder {
        fn file_dropped(&mut self, _: &mut Ctx<'_>, path: &Path) -> GameResult {
            self.dropped.push(path.to_path_buf());
            Ok(())
        }
    }

    struct Bare;

    impl Game for Bare {
        fn load(&mut self, _: &mut Ctx<'_>) -> GameResult { Ok(()) }
        fn update(&mut self, _: &mut Ctx<'_>, _: f64) -> GameResult { Ok(()) }
        fn draw(&mut self, _: &mut Ctx<'_>) -> GameResult { Ok(()) }
    }

    #[test]
    fn key_events_reach_keyboard_capability() {
        let mut platform = HeadlessPlatform::new();
        let mut ctx = Ctx::new(&mut platform, TimerStats::default());
        let mut game = Recorder::default();

        dispatch_to_game(&mut game, &mut ctx, Event::key_down(Key::W)).unwrap();
        dispatch_to_game(
            &mut game,
            &mut ctx,
            Event::KeyUp { key: Key::W, scancode: Scancode(26), modifiers: Default::default() },
        )
        .unwrap();

        assert_eq!(game.keys, vec![(Key::W, true), (Key::W, false)]);
    }

    #[test]
    fn file_drop_reaches_window_capability() {
        let mut platform = HeadlessPlatform::new();
        let mut ctx = Ctx::new(&mut platform, TimerStats::default());
        let mut game = Recorder::default();

        dispatch_to_game(&mut game, &mut ctx, Event::FileDropped("level1.map".into())).unwrap();
        assert_eq!(game.dropped, vec![PathBuf::from("level1.map")]);
    }

    #[test]
    fn missing_capability_drops_event() {
        let mut platform = HeadlessPlatform::new();
        let mut ctx = Ctx::new(&mut platform, TimerStats::default());

        assert!(dispatch_to_game(&mut Bare, &mut ctx, Event::key_down(Key::Space)).is_ok());
        assert!(dispatch_to_game(&mut Bare, &mut ctx, Event::WheelMoved { x: 0.0, y: 1.0 }).is_ok());
        assert!(dispatch_to_game(&mut Bare, &mut ctx, Event::MouseButtonDown(touch(1, 2, 1))).is_ok());
        assert!(dispatch_to_game(&mut Bare, &mut ctx, Event::MouseButtonUp(touch(1, 2, 1))).is_ok());
    }

    #[test]
    fn mouse_buttons_reach_mouse_capability_intact() {
        let mut platform = HeadlessPlatform::new();
        let mut ctx = Ctx::new(&mut platform, TimerStats::default());
        let mut game = Recorder::default();

        dispatch_to_game(&mut game, &mut ctx, Event::MouseButtonDown(touch(3, 4, 2))).unwrap();
        let right = MouseButtonEvent { x: -5, y: 7, button: MouseButton::Right, is_touch: false, clicks: 1 };
        dispatch_to_game(&mut game, &mut ctx, Event::MouseButtonUp(right)).unwrap();

        assert_eq!(game.clicks, vec!["down 3 4 Left true 2", "up -5 7 Right false 1"]);
    }

    #[test]
    fn mouse_faults_carry_their_call_site() {
        let mut platform = HeadlessPlatform::new();
        let mut ctx = Ctx::new(&mut platform, TimerStats::default());
        let mut game = Recorder { fail_mouse: true, ..Default::default() };

        let down = dispatch_to_game(&mut game, &mut ctx, Event::MouseButtonDown(touch(0, 0, 1))).unwrap_err();
        let up = dispatch_to_game(&mut game, &mut ctx, Event::MouseButtonUp(touch(0, 0, 1))).unwrap_err();

        assert_eq!(down.site(), CallSite::MousePressed);
        assert_eq!(up.site(), CallSite::MouseReleased);
        assert_eq!(up.message(), "release rejected");
        assert!(game.clicks.is_empty());
    }

    #[test]
    fn handler_error_becomes_fault_with_call_site() {
        let mut platform = HeadlessPlatform::new();
        let mut ctx = Ctx::new(&mut platform, TimerStats::default());
        let mut game = Recorder { fail_on_release: true, ..Default::default() };

        let fault = dispatch_to_game(
            &mut game,
            &mut ctx,
            Event::KeyUp { key: Key::Q, scancode: Scancode(20), modifiers: Default::default() },
        )
        .unwrap_err();

        assert_eq!(fault.site(), CallSite::KeyReleased);
        assert_eq!(fault.kind(), FaultKind::Error);
        assert!(fault.message().contains("release of Q rejected"));
    }
}
