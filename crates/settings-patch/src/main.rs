//! settings-patch: switch a Django project between local and cloud mode.
//!
//! # Usage
//!
//! ```text
//! settings-patch --mode <local|cloud> [OPTIONS]
//!
//! Options:
//!   --mode <MODE>     local or cloud (falls back to [run].mode in the config)
//!   --root <DIR>      project root [default: .]
//!   --config <FILE>   config file [default: <root>/settings-patch.toml]
//!   --debug-views     inject the debug home view (cloud mode)
//!   --strict          fail when duplicate declarations remain
//!   --dry-run         report what would change without touching files
//!   --json            print the run report as JSON
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable              | Description        |
//! |-----------------------|--------------------|
//! | `SETTINGS_PATCH_MODE` | same as `--mode`   |
//! | `SETTINGS_PATCH_ROOT` | same as `--root`   |
//! | `RUST_LOG`            | log filter         |
//!
//! Logs go to stderr; stdout carries only the report.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use settings_patch::application::orchestrator::{FileAction, FileOrchestrator};
use settings_patch::application::run_plan::{run_plan, RunReport, StepOutcome};
use settings_patch::infrastructure::storage::config::{
    config_file_path, load_config, PatcherConfig,
};
use settings_patch::infrastructure::storage::fs_store::FsStore;
use settings_patch_core::plan::{Mode, PatchPlan};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Toggle a Django project's settings between local development and cloud
/// deployment.
#[derive(Debug, Parser)]
#[command(name = "settings-patch", version)]
struct Cli {
    /// Target mode.  Required unless the config file names one.
    #[arg(long, env = "SETTINGS_PATCH_MODE")]
    mode: Option<Mode>,

    /// Project root; every configured path is relative to it.
    #[arg(long, default_value = ".", env = "SETTINGS_PATCH_ROOT")]
    root: PathBuf,

    /// Config file.  Defaults to `settings-patch.toml` in the project root.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replace `home` in views.py with a view that logs media diagnostics.
    #[arg(long)]
    debug_views: bool,

    /// Exit with an error instead of writing a settings file that still
    /// declares something twice.
    #[arg(long)]
    strict: bool,

    /// Compute every change but write and delete nothing.
    #[arg(long)]
    dry_run: bool,

    /// Print the run report as JSON.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| config_file_path(&self.root))
    }

    /// Folds the command-line flags over the file configuration.  Flags can
    /// only switch options on.
    fn apply_to(&self, mut config: PatcherConfig) -> PatcherConfig {
        if self.mode.is_some() {
            config.run.mode = self.mode;
        }
        config.run.strict |= self.strict;
        config.run.debug_views |= self.debug_views;
        config
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config_path();
    let config = load_config(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    let config = cli.apply_to(config);

    // RUST_LOG wins; otherwise the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.run.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mode = config
        .run
        .mode
        .context("no mode given: pass --mode local|cloud or set [run].mode")?;

    info!(%mode, root = %cli.root.display(), dry_run = cli.dry_run, "settings-patch starting");

    let plan = PatchPlan::for_mode(mode, &config.plan_options());
    let mut orchestrator = FileOrchestrator::new(FsStore::new(&cli.root))
        .with_dry_run(cli.dry_run)
        .with_strict(config.run.strict);

    let report = run_plan(&plan, &config.paths, &mut orchestrator)
        .with_context(|| format!("{mode} run aborted"))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        println!("{json}");
    } else {
        print!("{}", render_summary(&report));
    }
    Ok(())
}

/// Human-readable report: one line per step, then any warnings.
fn render_summary(report: &RunReport) -> String {
    let mut out = String::new();
    let prefix = if report.dry_run { "[dry run] " } else { "" };
    out.push_str(&format!("{prefix}{} mode\n", report.mode));

    for step in &report.steps {
        let what = match &step.outcome {
            StepOutcome::Patched(summary) if summary.changed => "patched",
            StepOutcome::Patched(_) => "unchanged",
            StepOutcome::Skipped { .. } => "skipped",
            StepOutcome::Replaced { result } | StepOutcome::Deleted { result } => {
                file_action_label(*result)
            }
        };
        out.push_str(&format!("  {:<10} {}\n", what, step.path.display()));
    }

    for warning in report.warnings() {
        out.push_str(&format!("warning: {warning}\n"));
    }
    out
}

fn file_action_label(action: FileAction) -> &'static str {
    match action {
        FileAction::Created => "created",
        FileAction::Overwritten => "written",
        FileAction::Deleted => "deleted",
        FileAction::Absent => "absent",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
