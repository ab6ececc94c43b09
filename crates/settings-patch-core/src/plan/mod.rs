//! Patch plans: the fixed, ordered file operations for each [`Mode`].
//!
//! A [`PatchPlan`] is data, not behaviour.  It names *logical* files
//! ([`Target`]) and says what to do with each one; the `settings-patch`
//! crate resolves targets to paths and performs the I/O.
//!
//! ```text
//! Mode::Local                          Mode::Cloud
//!  ├─ delete   build.sh                 ├─ replace  build.sh
//!  ├─ delete   Procfile                 ├─ patch    settings.py  (cloud rules)
//!  ├─ delete   render.yaml              └─ patch    views.py     (only with debug_views)
//!  ├─ replace  requirements.txt
//!  └─ replace  settings.py  (baseline)
//! ```

pub mod cloud;
pub mod content;
pub mod local;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::rules::EditRule;

/// Which configuration variant the project should end up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Files served from the local filesystem; deployment files removed.
    Local,
    /// Static and media serving delegated to hosted services.
    Cloud,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Cloud => f.write_str("cloud"),
        }
    }
}

/// Error returned when a string does not name a [`Mode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mode {0:?} (expected \"local\" or \"cloud\")")]
pub struct ParseModeError(pub String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "cloud" => Ok(Self::Cloud),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// A logical file the plans operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Settings,
    Views,
    BuildScript,
    Procfile,
    RenderManifest,
    Requirements,
}

/// One file operation in a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Read the target, run `rules` over it, and write it back.  When `audit`
    /// is set the result is checked for duplicate top-level declarations.
    Patch {
        target: Target,
        rules: Vec<EditRule>,
        audit: bool,
    },
    /// Overwrite (or create) the target with `content`.
    Replace { target: Target, content: String },
    /// Remove the target if it exists.
    Delete { target: Target },
}

impl Step {
    pub fn target(&self) -> Target {
        match self {
            Self::Patch { target, .. } | Self::Replace { target, .. } | Self::Delete { target } => {
                *target
            }
        }
    }
}

/// List-valued settings whose entries must be unique after a patch.
pub const AUDITED_LISTS: &[&str] = &["INSTALLED_APPS", "MIDDLEWARE"];

/// Project-specific inputs to plan construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOptions {
    /// Python package holding `settings.py`, `urls.py`, `wsgi.py`.
    pub settings_package: String,
    /// Python package of the shop app holding `views.py`.
    pub app_package: String,
    /// Inject the debug `home` view (cloud mode only).
    pub debug_views: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            settings_package: "zenstore".to_string(),
            app_package: "store".to_string(),
            debug_views: false,
        }
    }
}

/// An ordered list of steps for one mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchPlan {
    pub mode: Mode,
    pub steps: Vec<Step>,
}

impl PatchPlan {
    /// Builds the plan for `mode`.
    pub fn for_mode(mode: Mode, options: &PlanOptions) -> Self {
        let steps = match mode {
            Mode::Local => local::steps(options),
            Mode::Cloud => cloud::steps(options),
        };
        Self { mode, steps }
    }
}
