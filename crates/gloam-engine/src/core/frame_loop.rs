use crate::platform::Platform;

/// Verdict returned by a frame body.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopControl {
    Continue,
    Break,
}

/// Bounded frame loop shared by the main loop and the diagnostic screen.
///
/// Runs `frame` while the surface is open, until it returns [`LoopControl::Break`].
/// Returns the number of frames executed.
pub fn run_frames<F>(platform: &mut dyn Platform, mut frame: F) -> u64
where
    F: FnMut(&mut dyn Platform) -> LoopControl,
{
    let mut frames = 0u64;
    while platform.is_open() {
        frames += 1;
        if frame(platform) == LoopControl::Break {
            break;
        }
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{HeadlessPlatform, SubsystemFlags, SurfaceMode};

    #[test]
    fn never_runs_without_a_surface() {
        let mut platform = HeadlessPlatform::new();
        assert_eq!(run_frames(&mut platform, |_| LoopControl::Continue), 0);
    }

    #[test]
    fn stops_when_surface_closes_or_body_breaks() {
        let mut platform = HeadlessPlatform::new();
        platform.init_subsystems(SubsystemFlags::all()).unwrap();
        platform.set_mode(&SurfaceMode::default()).unwrap();

        let mut n = 0;
        let frames = run_frames(&mut platform, |_| {
            n += 1;
            if n == 3 { LoopControl::Break } else { LoopControl::Continue }
        });
        assert_eq!(frames, 3);

        let frames = run_frames(&mut platform, |p| {
            p.close();
            LoopControl::Continue
        });
        assert_eq!(frames, 1);
    }
}
