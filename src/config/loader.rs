use crate::config::schema::{InstallerSettings, ValidationError};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings file looked up at the application root.
pub const SETTINGS_FILE: &str = "component-installer.toml";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

impl ConfigError {
    /// Attach the settings file path to parse and validation errors.
    fn with_path(mut self, file: &Path) -> Self {
        if let ConfigError::Toml { path, .. } | ConfigError::Validation { path, .. } = &mut self {
            path.get_or_insert_with(|| file.to_path_buf());
        }
        self
    }
}

/// ` (path)` suffix for errors that may not know their file.
fn located(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|path| format!(" ({})", path.display()))
        .unwrap_or_default()
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(
                f,
                "failed to read installer settings from {}: {source}",
                path.display()
            ),
            ConfigError::Toml { path, source } => {
                write!(f, "failed to parse installer settings{}: {source}", located(path))
            }
            ConfigError::Validation { path, source } => {
                write!(f, "invalid installer settings{}: {source}", located(path))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml { source, .. } => Some(source),
            ConfigError::Validation { source, .. } => Some(source),
        }
    }
}

pub fn load_from_str(input: &str) -> Result<InstallerSettings, ConfigError> {
    let settings: InstallerSettings = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    settings
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(settings)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<InstallerSettings, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.with_path(path))
}

/// Settings from `<project_root>/component-installer.toml`, defaults when
/// the file does not exist.
pub fn load_or_default(project_root: impl AsRef<Path>) -> Result<InstallerSettings, ConfigError> {
    let path = project_root.as_ref().join(SETTINGS_FILE);
    match load_from_path(&path) {
        Err(ConfigError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file, using defaults");
            Ok(InstallerSettings::default())
        }
        other => other,
    }
}
