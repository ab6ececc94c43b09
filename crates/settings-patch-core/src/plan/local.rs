//! Local-restore plan.
//!
//! Every step is a full overwrite or a delete, so running the plan twice
//! produces the same tree as running it once.

use super::content::{local_settings, LOCAL_REQUIREMENTS};
use super::{PlanOptions, Step, Target};

pub fn steps(options: &PlanOptions) -> Vec<Step> {
    vec![
        Step::Delete {
            target: Target::BuildScript,
        },
        Step::Delete {
            target: Target::Procfile,
        },
        Step::Delete {
            target: Target::RenderManifest,
        },
        Step::Replace {
            target: Target::Requirements,
            content: LOCAL_REQUIREMENTS.to_string(),
        },
        Step::Replace {
            target: Target::Settings,
            content: local_settings(&options.settings_package, &options.app_package),
        },
    ]
}
