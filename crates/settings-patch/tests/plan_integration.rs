//! Integration tests: full plans against a real project tree on disk.
//!
//! Each test lays out a small Django-style project in a unique temporary
//! directory, runs one or more plans through [`FsStore`], and inspects the
//! files afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use settings_patch::application::orchestrator::{FileAction, FileOrchestrator, OrchestratorError};
use settings_patch::application::run_plan::{run_plan, RunReport, StepOutcome};
use settings_patch::infrastructure::storage::config::PatcherConfig;
use settings_patch::infrastructure::storage::fs_store::FsStore;
use settings_patch_core::domain::settings::{audit, SettingsModule};
use settings_patch_core::plan::{Mode, PatchPlan, AUDITED_LISTS};
use uuid::Uuid;

const SETTINGS: &str = "zenstore/settings.py";
const VIEWS: &str = "store/views.py";

const CLOUD_READY_SETTINGS: &str = "\
from pathlib import Path
import os

BASE_DIR = Path(__file__).resolve().parent.parent

DEBUG = True

INSTALLED_APPS = [
    'django.contrib.admin',
    'django.contrib.staticfiles',
    'store',
]

MIDDLEWARE = [
    'django.middleware.security.SecurityMiddleware',
    'django.middleware.common.CommonMiddleware',
]

STATIC_URL = '/static/'
MEDIA_URL = '/images/'
MEDIA_ROOT = os.path.join(BASE_DIR, 'static/images')
";

const VIEWS_PY: &str = "\
from django.shortcuts import render
from django.contrib import messages

from .models import *


def home(request):
    data = get_cart_data(request)
    categories = Category.objects.all()
    return render(request, 'store/home.html', {'categories': categories, 'cartItems': data['cartItems']})


def cart(request):
    return render(request, 'store/cart.html', {})
";

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Project {
    root: PathBuf,
}

impl Project {
    fn new() -> Self {
        let root = std::env::temp_dir().join(format!("settings_patch_it_{}", Uuid::new_v4()));
        fs::create_dir_all(&root).expect("create temp project");
        Self { root }
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, content).expect("write fixture");
    }

    fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root.join(rel)).expect("read project file")
    }

    fn exists(&self, rel: &str) -> bool {
        self.root.join(rel).exists()
    }

    fn run(&self, mode: Mode, config: &PatcherConfig, dry_run: bool) -> RunReport {
        self.try_run(mode, config, dry_run, false)
            .expect("run must succeed")
    }

    fn try_run(
        &self,
        mode: Mode,
        config: &PatcherConfig,
        dry_run: bool,
        strict: bool,
    ) -> Result<RunReport, OrchestratorError> {
        let plan = PatchPlan::for_mode(mode, &config.plan_options());
        let mut orch = FileOrchestrator::new(FsStore::new(&self.root))
            .with_dry_run(dry_run)
            .with_strict(strict);
        run_plan(&plan, &config.paths, &mut orch)
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.root).ok();
    }
}

fn deployed_project() -> Project {
    let project = Project::new();
    project.write(SETTINGS, CLOUD_READY_SETTINGS);
    project.write(VIEWS, VIEWS_PY);
    project.write("Procfile", "web: gunicorn zenstore.wsgi\n");
    project.write("render.yaml", "services:\n  - type: web\n");
    project.write("build.sh", "#!/usr/bin/env bash\necho old\n");
    project.write("requirements.txt", "Django\ngunicorn\ncloudinary\n");
    project
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

// ── Local mode ────────────────────────────────────────────────────────────────

#[test]
fn test_local_mode_resets_project_for_development() {
    // Arrange
    let project = deployed_project();

    // Act
    let report = project.run(Mode::Local, &PatcherConfig::default(), false);

    // Assert
    assert!(!project.exists("build.sh"));
    assert!(!project.exists("Procfile"));
    assert!(!project.exists("render.yaml"));
    assert_eq!(project.read("requirements.txt"), "Django\nPillow\n");
    let settings = project.read(SETTINGS);
    assert!(settings.contains("'store',"));
    assert!(!settings.contains("cloudinary"));
    assert!(report.warnings().is_empty());
}

#[test]
fn test_local_mode_twice_is_byte_identical() {
    let project = deployed_project();
    let config = PatcherConfig::default();

    project.run(Mode::Local, &config, false);
    let first = project.read(SETTINGS);
    let second_report = project.run(Mode::Local, &config, false);

    assert_eq!(project.read(SETTINGS), first);
    // The deployment files were already gone on the second run.
    for step in &second_report.steps[..3] {
        assert_eq!(
            step.outcome,
            StepOutcome::Deleted {
                result: FileAction::Absent
            }
        );
    }
}

#[test]
fn test_local_mode_on_empty_directory_creates_files() {
    let project = Project::new();

    project.run(Mode::Local, &PatcherConfig::default(), false);

    assert!(project.exists(SETTINGS));
    assert!(project.exists("requirements.txt"));
}

// ── Cloud mode ────────────────────────────────────────────────────────────────

#[test]
fn test_cloud_mode_prepares_settings_for_deployment() {
    // Arrange
    let project = deployed_project();

    // Act
    let report = project.run(Mode::Cloud, &PatcherConfig::default(), false);

    // Assert
    let settings = project.read(SETTINGS);
    assert!(project.read("build.sh").contains("collectstatic --no-input"));
    assert_eq!(count(&settings, "'cloudinary_storage',"), 1);
    assert_eq!(count(&settings, "'cloudinary',"), 1);
    assert!(settings.contains("CLOUDINARY_STORAGE = {"));
    assert!(settings.contains("if 'RENDER' in os.environ:"));
    // Untouched by cloud mode.
    assert!(project.exists("Procfile"));
    assert_eq!(project.read(VIEWS), VIEWS_PY);
    assert!(report.warnings().is_empty(), "{:?}", report.warnings());
}

#[test]
fn test_cloud_mode_twice_leaves_no_duplicates_and_is_stable() {
    let project = deployed_project();
    let config = PatcherConfig::default();

    project.run(Mode::Cloud, &config, false);
    let first = project.read(SETTINGS);
    project.run(Mode::Cloud, &config, false);
    let second = project.read(SETTINGS);

    assert_eq!(first, second);
    let findings = audit(&second, AUDITED_LISTS);
    assert!(findings.is_clean(), "{}", findings.summary());
    // The stale top-level media lines are gone; only the managed branches remain.
    let module = SettingsModule::parse(&second);
    assert_eq!(module.declarations("MEDIA_URL").count(), 0);
    assert_eq!(count(&second, "CLOUDINARY_STORAGE = {"), 1);
    assert_eq!(count(&second, "MEDIA_URL = '/images/'"), 1);
}

#[test]
fn test_cloud_then_local_then_cloud_round_trip() {
    let project = deployed_project();
    let config = PatcherConfig::default();

    project.run(Mode::Cloud, &config, false);
    project.run(Mode::Local, &config, false);
    project.run(Mode::Cloud, &config, false);

    let settings = project.read(SETTINGS);
    assert!(audit(&settings, AUDITED_LISTS).is_clean());
    assert_eq!(count(&settings, "'cloudinary',"), 1);
    assert!(project.exists("build.sh"));
    // Static files are collected and served by WhiteNoise again.
    assert!(settings.contains("STATIC_ROOT = os.path.join(BASE_DIR, 'staticfiles')"));
    assert_eq!(count(&settings, "'whitenoise.middleware.WhiteNoiseMiddleware',"), 1);
    assert_eq!(
        SettingsModule::parse(&settings).list_entries("MIDDLEWARE")[1],
        "whitenoise.middleware.WhiteNoiseMiddleware"
    );
}

#[test]
fn test_cloud_mode_on_crlf_settings_keeps_line_endings() {
    // Arrange
    let project = deployed_project();
    project.write(SETTINGS, &CLOUD_READY_SETTINGS.replace('\n', "\r\n"));
    let config = PatcherConfig::default();

    // Act
    let report = project.run(Mode::Cloud, &config, false);
    let first = project.read(SETTINGS);
    project.run(Mode::Cloud, &config, false);

    // Assert
    assert!(report.warnings().is_empty(), "{:?}", report.warnings());
    assert_eq!(project.read(SETTINGS), first);
    assert!(!first.contains("\r\r"));
    assert_eq!(count(&first, "\n"), count(&first, "\r\n"));
    assert_eq!(count(&first, "'cloudinary',"), 1);
}

#[test]
fn test_cloud_mode_without_settings_file_soft_skips() {
    let project = Project::new();

    let report = project.run(Mode::Cloud, &PatcherConfig::default(), false);

    assert!(project.exists("build.sh"));
    assert!(!project.exists(SETTINGS));
    assert_eq!(report.warnings().len(), 1);
}

#[test]
fn test_cloud_mode_strict_rejects_hand_written_duplicates() {
    // Arrange: a duplicate the rules do not own.
    let project = deployed_project();
    project.write(SETTINGS, &format!("{CLOUD_READY_SETTINGS}DEBUG = False\n"));

    // Act
    let result = project.try_run(Mode::Cloud, &PatcherConfig::default(), false, true);

    // Assert: error, and the settings file is left as it was.
    assert!(matches!(
        result,
        Err(OrchestratorError::DuplicateDeclarations { .. })
    ));
    assert!(!project.read(SETTINGS).contains("cloudinary"));
}

#[test]
fn test_debug_views_twice_leaves_exactly_one_home() {
    // Arrange
    let project = deployed_project();
    let mut config = PatcherConfig::default();
    config.run.debug_views = true;

    // Act
    project.run(Mode::Cloud, &config, false);
    let first = project.read(VIEWS);
    project.run(Mode::Cloud, &config, false);
    let views = project.read(VIEWS);

    // Assert
    assert_eq!(first, views);
    assert_eq!(count(&views, "def home(request):"), 1);
    assert_eq!(count(&views, "def cart(request):"), 1);
    assert!(views.contains("from django.contrib import messages\n"));
}

// ── Configuration and dry run ─────────────────────────────────────────────────

#[test]
fn test_custom_settings_package_is_honoured() {
    let project = Project::new();
    project.write("shop/settings.py", CLOUD_READY_SETTINGS);
    let config: PatcherConfig =
        toml::from_str("[paths]\nsettings_package = \"shop\"\n").expect("valid config");

    project.run(Mode::Cloud, &config, false);

    assert!(project.read("shop/settings.py").contains("'cloudinary',"));
    assert!(!project.exists(SETTINGS));
}

#[test]
fn test_dry_run_leaves_every_file_untouched() {
    // Arrange
    let project = deployed_project();
    let before: Vec<(String, String)> = [SETTINGS, VIEWS, "Procfile", "build.sh"]
        .iter()
        .map(|p| (p.to_string(), project.read(p)))
        .collect();

    // Act
    let cloud = project.run(Mode::Cloud, &PatcherConfig::default(), true);
    let local = project.run(Mode::Local, &PatcherConfig::default(), true);

    // Assert
    assert!(cloud.dry_run && local.dry_run);
    assert!(matches!(cloud.steps[1].outcome, StepOutcome::Patched(ref s) if s.changed));
    for (path, content) in before {
        assert_eq!(project.read(&path), content, "{path} changed in dry run");
    }
    assert!(project.exists("render.yaml"));
}

#[test]
fn test_delete_of_nonexistent_path_is_not_an_error() {
    let project = Project::new();
    let mut orch = FileOrchestrator::new(FsStore::new(&project.root));

    let action = orch
        .delete_if_exists(Path::new("nested/never/created.txt"))
        .expect("absence is fine");

    assert_eq!(action, FileAction::Absent);
}
