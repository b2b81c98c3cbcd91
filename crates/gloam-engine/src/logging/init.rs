use std::sync::Once;

use log::LevelFilter;

/// Logger configuration.
///
/// `filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "gloam_engine=debug,wgpu=warn").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter: Option<String>,
    /// Level used when neither `filter` nor `RUST_LOG` is set.
    pub default_level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl LoggingConfig {
    /// Configuration with an explicit filter string.
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            default_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Filter precedence: `config.filter`, then `RUST_LOG`, then `config.default_level`.
/// Subsequent calls are ignored. Output goes to stderr, which is where the
/// fault diagnostics end up.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.filter {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => match std::env::var("RUST_LOG") {
                Ok(filter) => {
                    builder.parse_filters(&filter);
                }
                Err(_) => {
                    builder.filter_level(config.default_level);
                    // wgpu is very chatty at info.
                    builder.filter_module("wgpu_core", LevelFilter::Warn);
                    builder.filter_module("wgpu_hal", LevelFilter::Warn);
                }
            },
        }

        builder.write_style(config.write_style);

        // A logger installed by the host wins; keep going without ours.
        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized");
    });
}
