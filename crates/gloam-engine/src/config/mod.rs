//! Startup configuration.
//!
//! Loaded from a TOML file (conventionally `gloam.toml`) before the engine starts and
//! applied once while the engine initializes, before `Game::load` runs. Every key is
//! optional; missing keys take the defaults below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::logging::LoggingConfig;
use crate::platform::{FullscreenType, SurfaceMode};

/// Title used when the configuration does not set one.
pub const DEFAULT_TITLE: &str = "Gloam Game";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub logging: LoggingSection,
    /// File this configuration was read from; `None` for defaults or parsed text.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Reads and parses the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&text).map_err(|source| EngineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    ///
    /// A file that exists but cannot be read or parsed is still an error. Nothing is
    /// logged here since this usually runs before a logger is installed; check
    /// [`source`](Self::source) afterwards.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: Option<String>,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub borderless: bool,
    pub high_dpi: bool,
    pub fullscreen: bool,
    pub fullscreen_type: FullscreenType,
    pub vsync: bool,
    /// Initial position; applied only when both `x` and `y` are set.
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub icon: Option<PathBuf>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: None,
            width: 800,
            height: 600,
            resizable: false,
            borderless: false,
            high_dpi: false,
            fullscreen: false,
            fullscreen_type: FullscreenType::Desktop,
            vsync: true,
            x: None,
            y: None,
            icon: None,
        }
    }
}

impl WindowConfig {
    pub fn surface_mode(&self) -> SurfaceMode {
        SurfaceMode {
            width: self.width,
            height: self.height,
            resizable: self.resizable,
            borderless: self.borderless,
            high_dpi: self.high_dpi,
        }
    }

    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn position(&self) -> Option<(i32, i32)> {
        self.x.zip(self.y)
    }

    /// Icon path with relative paths resolved against the executable's directory.
    pub fn resolved_icon(&self) -> Option<PathBuf> {
        let icon = self.icon.as_ref()?;
        if icon.is_absolute() {
            return Some(icon.clone());
        }

        let base = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));

        Some(match base {
            Some(dir) => dir.join(icon),
            None => icon.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `env_logger` filter string, e.g. `"info,gloam_engine=debug"`.
    pub filter: Option<String>,
}

impl LoggingSection {
    pub fn to_logging_config(&self) -> LoggingConfig {
        match &self.filter {
            Some(f) => LoggingConfig::with_filter(f.clone()),
            None => LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.window.title_or_default(), DEFAULT_TITLE);
        assert!(cfg.window.vsync);
        assert_eq!(cfg.window.surface_mode().width, 800);
    }

    #[test]
    fn parses_every_window_key() {
        let cfg = EngineConfig::from_toml_str(
            r#"
            [window]
            title = "Platformer"
            width = 1024
            height = 768
            resizable = true
            borderless = true
            high_dpi = true
            fullscreen = true
            fullscreen_type = "exclusive"
            vsync = false
            x = 40
            y = 60
            icon = "/opt/game/icon.png"

            [logging]
            filter = "debug"
            "#,
        )
        .unwrap();

        let w = &cfg.window;
        assert_eq!(w.title_or_default(), "Platformer");
        assert_eq!((w.width, w.height), (1024, 768));
        assert!(w.resizable && w.borderless && w.high_dpi && w.fullscreen);
        assert_eq!(w.fullscreen_type, FullscreenType::Exclusive);
        assert!(!w.vsync);
        assert_eq!(w.position(), Some((40, 60)));
        assert_eq!(w.resolved_icon(), Some(PathBuf::from("/opt/game/icon.png")));
        assert_eq!(cfg.logging.filter.as_deref(), Some("debug"));
    }

    #[test]
    fn position_requires_both_coordinates() {
        let cfg = EngineConfig::from_toml_str("[window]\nx = 10\n").unwrap();
        assert_eq!(cfg.window.position(), None);
    }

    #[test]
    fn relative_icon_is_resolved_next_to_executable() {
        let cfg = EngineConfig::from_toml_str("[window]\nicon = \"icon.png\"\n").unwrap();
        let resolved = cfg.window.resolved_icon().unwrap();
        assert!(resolved.ends_with("icon.png"));
        assert!(resolved.is_absolute());
    }

    #[test]
    fn unknown_fullscreen_type_is_rejected() {
        assert!(EngineConfig::from_toml_str("[window]\nfullscreen_type = \"windowed\"\n").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("gloam-config-does-not-exist.toml");
        let cfg = EngineConfig::load_or_default(&path).unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.source, None);
    }

    #[test]
    fn loaded_file_records_its_source() {
        let path = std::env::temp_dir().join(format!("gloam-ok-{}.toml", std::process::id()));
        std::fs::write(&path, "[window]\ntitle = \"Sourced\"\n").unwrap();

        let cfg = EngineConfig::load_or_default(&path);
        let _ = std::fs::remove_file(&path);

        let cfg = cfg.unwrap();
        assert_eq!(cfg.source.as_deref(), Some(path.as_path()));
        assert_eq!(cfg.window.title_or_default(), "Sourced");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let path = std::env::temp_dir().join(format!("gloam-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "[window\nwidth = ").unwrap();

        let err = EngineConfig::load_or_default(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);

        assert!(matches!(err, EngineError::ConfigParse { .. }));
    }

    #[test]
    fn logging_section_maps_to_logger_filter() {
        let section = LoggingSection { filter: Some("warn".into()) };
        assert_eq!(section.to_logging_config().filter.as_deref(), Some("warn"));
        assert!(LoggingSection::default().to_logging_config().filter.is_none());
    }
}
