//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\voice-prep\
//!   macOS:   ~/Library/Application Support/voice-prep/
//!   Linux:   ~/.config/voice-prep/
//!
//! Data dir (refined audio, reports, generated samples):
//!   Windows: %LOCALAPPDATA%\voice-prep\
//!   macOS:   ~/Library/Application Support/voice-prep/
//!   Linux:   ~/.local/share/voice-prep/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Default output directory for refined reference clips.
    pub refined_dir: PathBuf,
    /// Default output directory for synthesized samples.
    pub samples_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "voice-prep";

    /// Resolves all paths using the `dirs` crate, falling back to the
    /// current directory when the platform provides no standard location.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        Self {
            settings_file: config_dir.join("settings.toml"),
            config_dir,
            refined_dir: data_dir.join("refined"),
            samples_dir: data_dir.join("samples"),
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
