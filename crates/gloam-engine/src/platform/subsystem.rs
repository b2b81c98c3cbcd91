use std::fmt;

use bitflags::bitflags;

use crate::error::EngineError;

use super::Platform;

bitflags! {
    /// Set of native subsystems.
    ///
    /// Declaration order is teardown order: surface/graphics before the event subsystem.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SubsystemFlags: u8 {
        /// Surface creation, graphics and presentation.
        const VIDEO = 1 << 0;
        /// Event queue and input.
        const EVENTS = 1 << 1;
    }
}

impl fmt::Display for SubsystemFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        for (i, (name, _)) in self.iter_names().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

/// Tracks which native subsystems this engine started.
///
/// Initialization is idempotent per flag and shutdown tears down only what was
/// started, in dependency order. Both are safe to call repeatedly.
#[derive(Debug, Default)]
pub struct SubsystemManager {
    active: SubsystemFlags,
}

impl SubsystemManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> SubsystemFlags {
        self.active
    }

    pub fn is_active(&self, flags: SubsystemFlags) -> bool {
        self.active.contains(flags)
    }

    /// Starts every flag in `required` that is not yet active.
    ///
    /// Flags the collaborator reports as started are recorded even when the call
    /// fails overall, so a later shutdown still tears them down.
    pub fn initialize(
        &mut self,
        platform: &mut dyn Platform,
        required: SubsystemFlags,
    ) -> Result<SubsystemFlags, EngineError> {
        let missing = required.difference(self.active);
        if missing.is_empty() {
            return Ok(self.active);
        }

        let started = platform
            .init_subsystems(missing)
            .map_err(EngineError::SubsystemInit)?;
        self.active |= started.intersection(missing);

        let still_missing = required.difference(self.active);
        if !still_missing.is_empty() {
            return Err(EngineError::SubsystemsMissing { missing: still_missing });
        }

        log::debug!("subsystems active: {}", self.active);
        Ok(self.active)
    }

    /// Tears down active subsystems, VIDEO before EVENTS.
    pub fn shutdown(&mut self, platform: &mut dyn Platform) {
        if self.active.is_empty() {
            return;
        }

        let active = self.active;
        for (name, flag) in active.iter_names() {
            log::debug!("shutting down {name}");
            platform.quit_subsystems(flag);
            self.active.remove(flag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::HeadlessPlatform;

    #[test]
    fn flags_display_in_shutdown_order() {
        assert_eq!(SubsystemFlags::all().to_string(), "VIDEO|EVENTS");
        assert_eq!(SubsystemFlags::EVENTS.to_string(), "EVENTS");
        assert_eq!(SubsystemFlags::empty().to_string(), "NONE");
    }

    #[test]
    fn difference_and_contains() {
        let all = SubsystemFlags::all();
        assert!(all.contains(SubsystemFlags::VIDEO));
        assert_eq!(all.difference(SubsystemFlags::VIDEO), SubsystemFlags::EVENTS);
        assert!(!SubsystemFlags::VIDEO.contains(all));
    }

    #[test]
    fn initialize_is_idempotent() {
        let mut platform = HeadlessPlatform::new();
        let mut mgr = SubsystemManager::new();

        mgr.initialize(&mut platform, SubsystemFlags::all()).unwrap();
        mgr.initialize(&mut platform, SubsystemFlags::all()).unwrap();
        mgr.initialize(&mut platform, SubsystemFlags::VIDEO).unwrap();

        assert_eq!(platform.init_calls(), &[SubsystemFlags::all()]);
        assert!(mgr.is_active(SubsystemFlags::all()));
    }

    #[test]
    fn initialize_only_requests_missing_flags() {
        let mut platform = HeadlessPlatform::new();
        let mut mgr = SubsystemManager::new();

        mgr.initialize(&mut platform, SubsystemFlags::EVENTS).unwrap();
        mgr.initialize(&mut platform, SubsystemFlags::all()).unwrap();

        assert_eq!(platform.init_calls(), &[SubsystemFlags::EVENTS, SubsystemFlags::VIDEO]);
    }

    #[test]
    fn native_failure_is_reported_and_nothing_recorded() {
        let mut platform = HeadlessPlatform::new().failing_init();
        let mut mgr = SubsystemManager::new();

        let err = mgr.initialize(&mut platform, SubsystemFlags::all()).unwrap_err();
        assert!(matches!(err, EngineError::SubsystemInit(_)));
        assert!(mgr.active().is_empty());
    }

    #[test]
    fn shutdown_is_ordered_and_idempotent() {
        let mut platform = HeadlessPlatform::new();
        let mut mgr = SubsystemManager::new();
        mgr.initialize(&mut platform, SubsystemFlags::all()).unwrap();

        mgr.shutdown(&mut platform);
        mgr.shutdown(&mut platform);

        assert_eq!(platform.quit_calls(), &[SubsystemFlags::VIDEO, SubsystemFlags::EVENTS]);
        assert!(mgr.active().is_empty());
    }

    #[test]
    fn shutdown_without_initialize_is_a_no_op() {
        let mut platform = HeadlessPlatform::new();
        SubsystemManager::new().shutdown(&mut platform);
        assert!(platform.quit_calls().is_empty());
    }
}
