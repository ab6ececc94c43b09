//! # settings-patch-core
//!
//! Pure text-editing core of `settings-patch`: typed edit rules, the
//! Text-Block Editor that applies them, a lossless structured view of a
//! settings module for auditing duplicate declarations, and the fixed patch
//! plans that move a project between local and cloud configuration.
//!
//! This crate never touches the file system.  The `settings-patch` crate owns
//! all reads, writes, and deletes.
//!
//! - **`domain`** – rules, editor, settings model.
//! - **`plan`**   – per-mode step lists and the literal contents they write.

pub mod domain;
pub mod plan;

pub use domain::editor::{apply_rules, EditError, EditOutcome};
pub use domain::rules::{EditRule, Occurrence, RuleOutcome, RuleReport};
pub use domain::settings::{audit, DeclarationAudit, SettingsModule};
pub use plan::{Mode, PatchPlan, PlanOptions, Step, Target};
