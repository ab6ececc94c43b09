//! TOML configuration for a patch run.
//!
//! The file is optional.  When present it lives at
//! `<project root>/settings-patch.toml` (or wherever `--config` points) and
//! looks like this:
//!
//! ```toml
//! [paths]
//! settings_package = "zenstore"
//! app_package = "store"
//! build_script = "build.sh"
//!
//! [run]
//! mode = "cloud"
//! strict = true
//! ```
//!
//! Every field has a default, so an empty file (or no file at all) describes
//! the standard project layout.  Command-line flags override file values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use settings_patch_core::plan::{Mode, PlanOptions, Target};
use thiserror::Error;

use crate::application::run_plan::PathResolver;

/// File name looked up in the project root when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "settings-patch.toml";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatcherConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub run: RunConfig,
}

/// Where each logical file lives, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    /// Package holding `settings.py`.
    #[serde(default = "default_settings_package")]
    pub settings_package: String,
    /// Package holding `views.py`.
    #[serde(default = "default_app_package")]
    pub app_package: String,
    #[serde(default = "default_build_script")]
    pub build_script: PathBuf,
    #[serde(default = "default_procfile")]
    pub procfile: PathBuf,
    #[serde(default = "default_render_manifest")]
    pub render_manifest: PathBuf,
    #[serde(default = "default_requirements")]
    pub requirements: PathBuf,
}

/// Run behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    /// Mode used when `--mode` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    /// Fail instead of warn when a patch leaves duplicate declarations.
    #[serde(default)]
    pub strict: bool,
    /// Inject the debug `home` view in cloud mode.
    #[serde(default)]
    pub debug_views: bool,
    /// `tracing` level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_settings_package() -> String {
    "zenstore".to_string()
}
fn default_app_package() -> String {
    "store".to_string()
}
fn default_build_script() -> PathBuf {
    PathBuf::from("build.sh")
}
fn default_procfile() -> PathBuf {
    PathBuf::from("Procfile")
}
fn default_render_manifest() -> PathBuf {
    PathBuf::from("render.yaml")
}
fn default_requirements() -> PathBuf {
    PathBuf::from("requirements.txt")
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            settings_package: default_settings_package(),
            app_package: default_app_package(),
            build_script: default_build_script(),
            procfile: default_procfile(),
            render_manifest: default_render_manifest(),
            requirements: default_requirements(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: None,
            strict: false,
            debug_views: false,
            log_level: default_log_level(),
        }
    }
}

impl PathResolver for PathsConfig {
    fn path_for(&self, target: Target) -> PathBuf {
        match target {
            Target::Settings => Path::new(&self.settings_package).join("settings.py"),
            Target::Views => Path::new(&self.app_package).join("views.py"),
            Target::BuildScript => self.build_script.clone(),
            Target::Procfile => self.procfile.clone(),
            Target::RenderManifest => self.render_manifest.clone(),
            Target::Requirements => self.requirements.clone(),
        }
    }
}

impl PatcherConfig {
    /// Inputs for [`settings_patch_core::plan::PatchPlan::for_mode`].
    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            settings_package: self.paths.settings_package.clone(),
            app_package: self.paths.app_package.clone(),
            debug_views: self.run.debug_views,
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Default config location for a project rooted at `root`.
pub fn config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Loads the config at `path`, returning [`PatcherConfig::default`] if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<PatcherConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(PatcherConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
