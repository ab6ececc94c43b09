//! File Orchestrator: file-system side effects around the Text-Block Editor.
//!
//! [`FileOrchestrator`] implements the three file operations a plan is made
//! of:
//!
//! - [`FileOrchestrator::patch_file`]  – read, edit, audit, write back.
//! - [`FileOrchestrator::replace_file`] – unconditional overwrite.
//! - [`FileOrchestrator::delete_if_exists`] – remove, absence is fine.
//!
//! It talks to the disk only through the [`FileStore`] trait so the whole
//! pipeline can be exercised in memory.
//!
//! # Error taxonomy
//!
//! | Situation            | Handling                                         |
//! |----------------------|--------------------------------------------------|
//! | target file missing  | `PatchResult::Skipped`, logged at `warn`         |
//! | insert anchor absent | `anchors_found = false`, logged at `warn`        |
//! | duplicate keys       | logged at `warn`; an error in strict mode        |
//! | I/O failure          | [`OrchestratorError::Io`], ends the run          |
//!
//! Rules are written against `\n` line endings.  A file that uses `\r\n` is
//! edited in `\n` form and written back with `\r\n`.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use settings_patch_core::domain::editor::{apply_rules, EditError};
use settings_patch_core::domain::rules::{EditRule, RuleReport};
use settings_patch_core::domain::settings::{audit, DeclarationAudit};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Minimal file-system surface needed by the orchestrator.
///
/// Paths are interpreted by the implementation (the disk store resolves them
/// against a project root).  Production code uses
/// `infrastructure::storage::fs_store::FsStore`; tests use
/// `infrastructure::storage::memory::MemoryStore`.
pub trait FileStore {
    fn exists(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    /// Creates or fully overwrites `path`.
    fn write(&mut self, path: &Path, content: &str) -> io::Result<()>;
    fn remove(&mut self, path: &Path) -> io::Result<()>;
}

/// Error type for orchestrator operations.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Reading, writing, or removing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A rule could not be evaluated.
    #[error("cannot patch {path}: {source}")]
    Edit {
        path: PathBuf,
        #[source]
        source: EditError,
    },

    /// Strict mode: the patched text still declares something twice.
    #[error("refusing to write {path}: {}", .audit.summary())]
    DuplicateDeclarations {
        path: PathBuf,
        audit: DeclarationAudit,
    },
}

/// Why a patch step did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    FileNotFound,
}

/// Details of a patch that ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchSummary {
    /// `false` when the rules produced the text that was already on disk.
    pub changed: bool,
    /// `false` when at least one insert or require rule missed its anchor.
    pub anchors_found: bool,
    pub rules: Vec<RuleReport>,
    #[serde(default)]
    pub audit: DeclarationAudit,
}

/// Result of [`FileOrchestrator::patch_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchResult {
    Skipped(SkipReason),
    Patched(PatchSummary),
}

impl PatchResult {
    /// Whether every insert rule found its anchor.  Skipped patches report
    /// `false` because nothing was inserted.
    pub fn anchors_found(&self) -> bool {
        match self {
            Self::Skipped(_) => false,
            Self::Patched(summary) => summary.anchors_found,
        }
    }
}

/// What a replace or delete did to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
    Created,
    Overwritten,
    Deleted,
    Absent,
}

/// Executes file operations against a [`FileStore`].
#[derive(Debug)]
pub struct FileOrchestrator<S> {
    store: S,
    dry_run: bool,
    strict: bool,
}

impl<S: FileStore> FileOrchestrator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            dry_run: false,
            strict: false,
        }
    }

    /// Compute every result but never write or delete.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Treat duplicate declarations after a patch as an error.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Reads `path`, applies `rules`, and writes the result back in full.
    ///
    /// When `audit_lists` is `Some`, the edited text is checked for duplicate
    /// top-level declarations and for repeated entries in the named lists
    /// before it is written.
    ///
    /// # Errors
    ///
    /// [`OrchestratorError::Io`] on read/write failure,
    /// [`OrchestratorError::Edit`] for an invalid rule, and
    /// [`OrchestratorError::DuplicateDeclarations`] in strict mode.  A missing
    /// file is *not* an error.
    pub fn patch_file(
        &mut self,
        path: &Path,
        rules: &[EditRule],
        audit_lists: Option<&[&str]>,
    ) -> Result<PatchResult, OrchestratorError> {
        if !self.store.exists(path) {
            warn!(path = %path.display(), "file not found, skipping patch");
            return Ok(PatchResult::Skipped(SkipReason::FileNotFound));
        }

        let original = self
            .store
            .read_to_string(path)
            .map_err(|source| io_error(path, source))?;

        let crlf = original.contains("\r\n");
        let normalized = if crlf {
            original.replace("\r\n", "\n")
        } else {
            original.clone()
        };

        let outcome = apply_rules(&normalized, rules).map_err(|source| OrchestratorError::Edit {
            path: path.to_path_buf(),
            source,
        })?;

        for label in outcome.missing_anchors() {
            warn!(path = %path.display(), rule = label, "anchor not found, insertion skipped");
        }

        let findings = match audit_lists {
            Some(lists) => audit(&outcome.text, lists),
            None => DeclarationAudit::default(),
        };
        if !findings.is_clean() {
            if self.strict {
                return Err(OrchestratorError::DuplicateDeclarations {
                    path: path.to_path_buf(),
                    audit: findings,
                });
            }
            warn!(path = %path.display(), findings = %findings.summary(), "duplicate declarations remain");
        }

        let anchors_found = outcome.anchors_found();
        let patched = if crlf {
            outcome.text.replace('\n', "\r\n")
        } else {
            outcome.text
        };
        let changed = patched != original;
        if changed {
            self.write(path, &patched)?;
            info!(path = %path.display(), rules = rules.len(), "patched");
        } else {
            debug!(path = %path.display(), "patch produced no changes");
        }

        Ok(PatchResult::Patched(PatchSummary {
            changed,
            anchors_found,
            rules: outcome.reports,
            audit: findings,
        }))
    }

    /// Creates or overwrites `path` with exactly `content`.
    ///
    /// # Errors
    ///
    /// [`OrchestratorError::Io`] if the write fails.
    pub fn replace_file(
        &mut self,
        path: &Path,
        content: &str,
    ) -> Result<FileAction, OrchestratorError> {
        let action = if self.store.exists(path) {
            FileAction::Overwritten
        } else {
            FileAction::Created
        };
        self.write(path, content)?;
        info!(path = %path.display(), ?action, "replaced");
        Ok(action)
    }

    /// Removes `path` if it exists.
    ///
    /// # Errors
    ///
    /// [`OrchestratorError::Io`] if the file exists but cannot be removed.
    pub fn delete_if_exists(&mut self, path: &Path) -> Result<FileAction, OrchestratorError> {
        if !self.store.exists(path) {
            debug!(path = %path.display(), "already absent");
            return Ok(FileAction::Absent);
        }
        if self.dry_run {
            info!(path = %path.display(), "dry run: would delete");
        } else {
            match self.store.remove(path) {
                Ok(()) => {}
                // Removed between the existence check and now.
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(FileAction::Absent),
                Err(source) => return Err(io_error(path, source)),
            }
            info!(path = %path.display(), "deleted");
        }
        Ok(FileAction::Deleted)
    }

    fn write(&mut self, path: &Path, content: &str) -> Result<(), OrchestratorError> {
        if self.dry_run {
            info!(path = %path.display(), bytes = content.len(), "dry run: would write");
            return Ok(());
        }
        self.store
            .write(path, content)
            .map_err(|source| io_error(path, source))
    }
}

fn io_error(path: &Path, source: io::Error) -> OrchestratorError {
    OrchestratorError::Io {
        path: path.to_path_buf(),
        source,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
