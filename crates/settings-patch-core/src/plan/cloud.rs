//! Cloud-deployment plan and its rule sets.
//!
//! The settings rules are written so that a second run undoes and redoes the
//! first run's edits: stale declarations are deleted, the previously appended
//! media and static-files sections are removed by their markers, and the
//! `INSTALLED_APPS` and `MIDDLEWARE` entries are stripped before being
//! inserted again.

use super::content::{
    debug_home_view, home_view_end, managed_media_section, managed_static_section, BUILD_SCRIPT,
    DEBUG_VIEW_BEGIN, DEBUG_VIEW_END, HOME_VIEW_START, MANAGED_MEDIA_BEGIN, MANAGED_MEDIA_END,
    MANAGED_STATIC_BEGIN, MANAGED_STATIC_END, SECURITY_MIDDLEWARE_ANCHOR, VIEWS_IMPORT_ANCHOR,
};
use super::{PlanOptions, Step, Target};
use crate::domain::rules::EditRule;

/// Anchor for the storage apps that must load before `django.contrib`.
pub const INSTALLED_APPS_ANCHOR: &str = "INSTALLED_APPS = [";

const STORAGE_APPS: &str = "\n    'cloudinary_storage',\n    'cloudinary',";

const WHITENOISE_MIDDLEWARE: &str = "'whitenoise.middleware.WhiteNoiseMiddleware',";

pub fn steps(options: &PlanOptions) -> Vec<Step> {
    let mut steps = vec![
        Step::Replace {
            target: Target::BuildScript,
            content: BUILD_SCRIPT.to_string(),
        },
        Step::Patch {
            target: Target::Settings,
            rules: settings_rules(),
            audit: true,
        },
    ];
    if options.debug_views {
        steps.push(Step::Patch {
            target: Target::Views,
            rules: view_debug_rules(&options.app_package),
            audit: false,
        });
    }
    steps
}

/// Rules that move a settings file to cloud media storage and WhiteNoise
/// static serving.
pub fn settings_rules() -> Vec<EditRule> {
    let whitenoise_line = format!("\n    {WHITENOISE_MIDDLEWARE}");
    vec![
        // Sections appended by an earlier run.
        EditRule::delete_all_blocks(MANAGED_MEDIA_BEGIN, MANAGED_MEDIA_END),
        EditRule::delete_all_blocks(MANAGED_STATIC_BEGIN, MANAGED_STATIC_END),
        // Stale top-level declarations.
        EditRule::delete_line("MEDIA_URL = .*"),
        EditRule::delete_line("MEDIA_ROOT = .*"),
        EditRule::delete_line("DEFAULT_FILE_STORAGE = .*"),
        EditRule::delete_line("STATIC_ROOT = .*"),
        EditRule::delete_line("STATICFILES_STORAGE = .*"),
        EditRule::delete_top_level_blocks("CLOUDINARY_STORAGE = {", "}"),
        // Whole lines first so reinsertion does not leave blank entries behind.
        EditRule::delete_token("\n    'cloudinary_storage',"),
        EditRule::delete_token("\n    'cloudinary',"),
        EditRule::delete_token("'cloudinary_storage',"),
        EditRule::delete_token("'cloudinary',"),
        EditRule::delete_token(whitenoise_line.as_str()),
        EditRule::delete_token(WHITENOISE_MIDDLEWARE),
        EditRule::insert_after(INSTALLED_APPS_ANCHOR, STORAGE_APPS),
        EditRule::insert_after(SECURITY_MIDDLEWARE_ANCHOR, whitenoise_line),
        EditRule::append(managed_media_section()),
        EditRule::append(managed_static_section()),
    ]
}

/// Rules that replace the `home` view with one that prints image URLs.
///
/// Nothing is touched unless the import the new view is inserted after is
/// present, so a missing anchor never leaves the module without `home`.
pub fn view_debug_rules(app_package: &str) -> Vec<EditRule> {
    vec![
        EditRule::require_anchor(VIEWS_IMPORT_ANCHOR),
        EditRule::delete_all_blocks(DEBUG_VIEW_BEGIN, DEBUG_VIEW_END),
        EditRule::delete_block(HOME_VIEW_START, home_view_end(app_package)),
        EditRule::insert_after(VIEWS_IMPORT_ANCHOR, debug_home_view(app_package)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::editor::apply_rules;
    use crate::domain::rules::RuleOutcome;
    use crate::domain::settings::{audit, SettingsModule};
    use crate::plan::AUDITED_LISTS;

    const LEGACY_SETTINGS: &str = "\
import os
BASE_DIR = '/srv'

INSTALLED_APPS = [
    'cloudinary_storage',
    'cloudinary',
    'django.contrib.admin',
    'store',
]

MIDDLEWARE = [
    'django.middleware.security.SecurityMiddleware',
    'django.middleware.common.CommonMiddleware',
]

MEDIA_URL = '/media/'
MEDIA_ROOT = os.path.join(BASE_DIR, 'media')
DEFAULT_FILE_STORAGE = 'cloudinary_storage.storage.MediaCloudinaryStorage'

CLOUDINARY_STORAGE = {
    'CLOUD_NAME': os.environ.get('CLOUDINARY_CLOUD_NAME'),
}

STATIC_URL = '/static/'
STATIC_ROOT = os.path.join(BASE_DIR, 'static')
";

    const STOCK_VIEWS: &str = "\
from django.shortcuts import render
from django.contrib import messages

def get_cart_data(request):
    return {'cartItems': 0}

def home(request):
    data = get_cart_data(request)
    categories = Category.objects.all()
    return render(request, 'store/home.html', {'categories': categories, 'cartItems': data['cartItems']})

def products(request):
    pass
";

    fn patch(text: &str, rules: &[EditRule]) -> String {
        apply_rules(text, rules).expect("rules are valid").text
    }

    #[test]
    fn test_settings_rules_leave_single_declarations() {
        // Act
        let out = patch(LEGACY_SETTINGS, &settings_rules());

        // Assert
        let module = SettingsModule::parse(&out);
        assert!(module.declarations("MEDIA_URL").next().is_none());
        assert!(module.declarations("CLOUDINARY_STORAGE").next().is_none());
        assert_eq!(out.matches("'cloudinary_storage',").count(), 1);
        assert_eq!(out.matches("'cloudinary',").count(), 1);
        assert_eq!(out.matches(MANAGED_MEDIA_END).count(), 1);
        assert!(audit(&out, AUDITED_LISTS).is_clean());
    }

    #[test]
    fn test_settings_rules_remove_every_top_level_storage_dict() {
        // Arrange: one stale dict on the first line plus the one in the fixture.
        let doc = format!("CLOUDINARY_STORAGE = {{\n    'CLOUD_NAME': 'old',\n}}\n{LEGACY_SETTINGS}");

        // Act
        let once = patch(&doc, &settings_rules());
        let twice = patch(&once, &settings_rules());

        // Assert
        assert_eq!(
            SettingsModule::parse(&once).declarations("CLOUDINARY_STORAGE").count(),
            0
        );
        assert!(!once.contains("'old'"));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_settings_rules_configure_static_files_once() {
        // Act
        let once = patch(LEGACY_SETTINGS, &settings_rules());
        let twice = patch(&once, &settings_rules());

        // Assert
        assert_eq!(once, twice);
        let module = SettingsModule::parse(&twice);
        assert_eq!(module.declarations("STATIC_ROOT").count(), 0);
        assert_eq!(twice.matches(MANAGED_STATIC_END).count(), 1);
        assert!(twice.contains("    STATIC_ROOT = os.path.join(BASE_DIR, 'staticfiles')"));
        assert_eq!(twice.matches(WHITENOISE_MIDDLEWARE).count(), 1);
        assert_eq!(
            module.list_entries("MIDDLEWARE"),
            vec![
                "django.middleware.security.SecurityMiddleware",
                "whitenoise.middleware.WhiteNoiseMiddleware",
                "django.middleware.common.CommonMiddleware",
            ]
        );
    }

    #[test]
    fn test_settings_rules_put_storage_apps_first() {
        let out = patch(LEGACY_SETTINGS, &settings_rules());
        let entries = SettingsModule::parse(&out).list_entries("INSTALLED_APPS");
        assert_eq!(
            entries,
            vec!["cloudinary_storage", "cloudinary", "django.contrib.admin", "store"]
        );
    }

    #[test]
    fn test_settings_rules_are_stable_across_runs() {
        let once = patch(LEGACY_SETTINGS, &settings_rules());
        let twice = patch(&once, &settings_rules());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_settings_rules_report_missing_installed_apps_anchor() {
        let outcome = apply_rules("DEBUG = True\n", &settings_rules()).unwrap();
        assert!(!outcome.anchors_found());
        // The media section is still appended.
        assert!(outcome.text.contains(MANAGED_MEDIA_BEGIN));
    }

    #[test]
    fn test_view_debug_rules_replace_home_view() {
        // Act
        let out = patch(STOCK_VIEWS, &view_debug_rules("store"));

        // Assert
        assert_eq!(out.matches(HOME_VIEW_START).count(), 1);
        assert!(out.contains("[DEBUG] Product:"));
        let import_end = out.find(VIEWS_IMPORT_ANCHOR).unwrap() + VIEWS_IMPORT_ANCHOR.len();
        assert!(out[import_end..].starts_with(DEBUG_VIEW_BEGIN));
        assert!(out.contains("def products(request):"));
    }

    #[test]
    fn test_view_debug_rules_are_stable_across_runs() {
        let once = patch(STOCK_VIEWS, &view_debug_rules("store"));
        let twice = patch(&once, &view_debug_rules("store"));
        assert_eq!(once, twice);
        assert_eq!(twice.matches(HOME_VIEW_START).count(), 1);
    }

    #[test]
    fn test_view_debug_rules_keep_home_without_import_anchor() {
        // Arrange
        let views = STOCK_VIEWS.replace(VIEWS_IMPORT_ANCHOR, "");

        // Act
        let outcome = apply_rules(&views, &view_debug_rules("store")).unwrap();

        // Assert
        assert_eq!(outcome.text, views);
        assert_eq!(outcome.reports[0].outcome, RuleOutcome::AnchorMissing);
        assert!(outcome.reports[1..]
            .iter()
            .all(|r| r.outcome == RuleOutcome::NotRun));
    }

    #[test]
    fn test_cloud_steps_write_build_script_before_patching_settings() {
        let steps = steps(&PlanOptions::default());
        assert!(matches!(
            &steps[0],
            Step::Replace { target: Target::BuildScript, .. }
        ));
        assert!(matches!(
            &steps[1],
            Step::Patch { target: Target::Settings, audit: true, .. }
        ));
        assert_eq!(steps.len(), 2);
    }
}
