use crate::platform::Platform;

use super::Event;

/// Sink verdict for the event currently being drained.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Drain {
    Continue,
    /// Leave the remaining events queued and return to the caller.
    Stop,
}

/// Drains the collaborator's event queue once per frame.
///
/// Every loop that pumps events goes through [`EventPump::drain`], so the primary
/// loop and the diagnostic display share the same delivery contract:
/// - all queued events are delivered in arrival order
/// - a quit event closes the surface before the sink sees it
/// - the sink can cut the batch short with [`Drain::Stop`]
#[derive(Debug, Default)]
pub struct EventPump {
    delivered: u64,
}

impl EventPump {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers queued events to `sink` until the queue is empty or the sink stops.
    ///
    /// Returns the number of events delivered in this batch.
    pub fn drain<F>(&mut self, platform: &mut dyn Platform, mut sink: F) -> usize
    where
        F: FnMut(&mut dyn Platform, Event) -> Drain,
    {
        let mut batch = 0usize;

        while let Some(event) = platform.poll_event() {
            batch += 1;
            log::trace!("event {}", event.kind());

            if event == Event::Quit && platform.is_open() {
                log::debug!("quit event received, closing surface");
                platform.close();
            }

            if sink(platform, event) == Drain::Stop {
                break;
            }
        }

        self.delivered += batch as u64;
        batch
    }

    /// Total number of events delivered since creation.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;
    use crate::platform::{HeadlessPlatform, SurfaceMode};

    fn open_platform() -> HeadlessPlatform {
        let mut p = HeadlessPlatform::new();
        p.init_subsystems(crate::platform::SubsystemFlags::all()).unwrap();
        p.set_mode(&SurfaceMode::default()).unwrap();
        p
    }

    #[test]
    fn drains_every_queued_event_in_order() {
        let mut platform = open_platform();
        platform.push_event(Event::key_down(Key::A));
        platform.push_event(Event::key_down(Key::B));
        platform.push_event(Event::Focus(true));

        let mut seen = Vec::new();
        let mut pump = EventPump::new();
        let n = pump.drain(&mut platform, |_, ev| {
            seen.push(ev);
            Drain::Continue
        });

        assert_eq!(n, 3);
        assert_eq!(
            seen,
            vec![
                Event::key_down(Key::A),
                Event::key_down(Key::B),
                Event::Focus(true)
            ]
        );
        assert_eq!(pump.delivered(), 3);
    }

    #[test]
    fn stop_leaves_rest_of_batch_queued() {
        let mut platform = open_platform();
        platform.push_event(Event::key_down(Key::A));
        platform.push_event(Event::key_down(Key::B));

        let mut pump = EventPump::new();
        let n = pump.drain(&mut platform, |_, _| Drain::Stop);
        assert_eq!(n, 1);
        assert_eq!(platform.pending_events(), 1);
    }

    #[test]
    fn quit_closes_surface_without_a_sink_reaction() {
        let mut platform = open_platform();
        platform.push_event(Event::Quit);

        let mut pump = EventPump::new();
        pump.drain(&mut platform, |_, _| Drain::Continue);

        assert!(!platform.is_open());
        assert_eq!(platform.close_count(), 1);
    }

    #[test]
    fn empty_queue_delivers_nothing() {
        let mut platform = open_platform();
        let mut pump = EventPump::new();
        let mut called = false;
        let n = pump.drain(&mut platform, |_, _| {
            called = true;
            Drain::Continue
        });
        assert_eq!(n, 0);
        assert!(!called);
    }
}
