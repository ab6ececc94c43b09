//! RunPlanUseCase: executes a mode's [`PatchPlan`] step by step.
//!
//! This is the single entry point for both modes.  The caller picks a
//! [`Mode`], builds the plan, and hands it here together with a
//! [`PathResolver`] (where each logical file lives) and a
//! [`FileOrchestrator`] (how files are touched).
//!
//! Steps run in plan order.  Soft misses (missing file, missing anchor) are
//! recorded in the [`RunReport`] and the run continues; hard errors stop the
//! run immediately and leave earlier steps applied.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use settings_patch_core::domain::rules::RuleOutcome;
use settings_patch_core::plan::{Mode, PatchPlan, Step, Target, AUDITED_LISTS};
use tracing::{info, info_span};

use super::orchestrator::{
    FileAction, FileOrchestrator, FileStore, OrchestratorError, PatchResult, PatchSummary,
    SkipReason,
};

/// Maps a logical [`Target`] to the path handed to the [`FileStore`].
pub trait PathResolver {
    fn path_for(&self, target: Target) -> PathBuf;
}

/// What happened to one step's target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepOutcome {
    Patched(PatchSummary),
    Skipped { reason: SkipReason },
    Replaced { result: FileAction },
    Deleted { result: FileAction },
}

/// Report line for one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub target: Target,
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

impl StepReport {
    /// Soft problems worth showing to the user.
    pub fn warnings(&self) -> Vec<String> {
        match &self.outcome {
            StepOutcome::Skipped { reason: SkipReason::FileNotFound } => {
                vec![format!("{} not found, skipped", self.path.display())]
            }
            StepOutcome::Patched(summary) => {
                let mut out: Vec<String> = summary
                    .rules
                    .iter()
                    .filter(|r| r.outcome == RuleOutcome::AnchorMissing)
                    .map(|r| format!("{}: anchor missing for {}", self.path.display(), r.rule))
                    .collect();
                if !summary.audit.is_clean() {
                    out.push(format!(
                        "{}: {}",
                        self.path.display(),
                        summary.audit.summary()
                    ));
                }
                out
            }
            StepOutcome::Replaced { .. } | StepOutcome::Deleted { .. } => Vec::new(),
        }
    }
}

/// Everything a run did, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub mode: Mode,
    pub dry_run: bool,
    pub steps: Vec<StepReport>,
}

impl RunReport {
    pub fn warnings(&self) -> Vec<String> {
        self.steps.iter().flat_map(StepReport::warnings).collect()
    }
}

/// Executes every step of `plan`.
///
/// # Errors
///
/// Returns the first [`OrchestratorError`]; steps before it have already
/// been applied.
pub fn run_plan<S, R>(
    plan: &PatchPlan,
    resolver: &R,
    orchestrator: &mut FileOrchestrator<S>,
) -> Result<RunReport, OrchestratorError>
where
    S: FileStore,
    R: PathResolver + ?Sized,
{
    let span = info_span!("run_plan", mode = %plan.mode, dry_run = orchestrator.is_dry_run());
    let _guard = span.enter();
    info!(steps = plan.steps.len(), "starting");

    let mut steps = Vec::with_capacity(plan.steps.len());
    for step in &plan.steps {
        let target = step.target();
        let path = resolver.path_for(target);

        let outcome = match step {
            Step::Patch { rules, audit, .. } => {
                let lists = audit.then_some(AUDITED_LISTS);
                match orchestrator.patch_file(&path, rules, lists)? {
                    PatchResult::Patched(summary) => StepOutcome::Patched(summary),
                    PatchResult::Skipped(reason) => StepOutcome::Skipped { reason },
                }
            }
            Step::Replace { content, .. } => StepOutcome::Replaced {
                result: orchestrator.replace_file(&path, content)?,
            },
            Step::Delete { .. } => StepOutcome::Deleted {
                result: orchestrator.delete_if_exists(&path)?,
            },
        };

        steps.push(StepReport {
            target,
            path,
            outcome,
        });
    }

    info!("finished");
    Ok(RunReport {
        mode: plan.mode,
        dry_run: orchestrator.is_dry_run(),
        steps,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
