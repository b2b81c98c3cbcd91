use std::path::PathBuf;

use crate::platform::{PlatformError, SubsystemFlags};

/// Errors that end a run before or outside of user code.
///
/// Failures raised by game callbacks are not `EngineError`s; they are captured as
/// [`Fault`](crate::core::Fault)s and routed through fault recovery.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The collaborator could not start a required subsystem.
    #[error("subsystem initialization failed: {0}")]
    SubsystemInit(PlatformError),

    /// The collaborator reported success but some required subsystems stayed down.
    #[error("required subsystems did not start: {missing}")]
    SubsystemsMissing { missing: SubsystemFlags },

    /// The startup configuration could not be applied (e.g. surface creation failed).
    #[error("invalid startup configuration: {0}")]
    Configuration(PlatformError),

    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// `Engine::run` was called a second time on the same engine.
    #[error("engine has already run; create a new engine for another run")]
    AlreadyRan,
}
