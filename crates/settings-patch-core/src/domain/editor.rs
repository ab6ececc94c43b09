//! Text-Block Editor: applies an ordered list of [`EditRule`]s to a document.
//!
//! The editor is a pure function over strings.  It never reads or writes
//! files; the orchestrator in the `settings-patch` crate does that around it.
//!
//! Rules run strictly in order and each one sees the output of the previous
//! one.  There is no rollback: if rule 3 of 5 misses its anchor, rules 1 and 2
//! have still been applied and rules 4 and 5 still run.  The one exception is
//! a failed `RequireAnchor`, which stops evaluation; the rules after it are
//! reported as `NotRun`.
//!
//! ```rust
//! use settings_patch_core::domain::editor::apply_rules;
//! use settings_patch_core::domain::rules::EditRule;
//!
//! let doc = "INSTALLED_APPS = [\n    'a',\n]";
//! let out = apply_rules(doc, &[EditRule::insert_after("INSTALLED_APPS = [", "\n    'cloudinary',")])
//!     .unwrap();
//! assert_eq!(out.text, "INSTALLED_APPS = [\n    'cloudinary',\n    'a',\n]");
//! ```

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use super::rules::{EditRule, Occurrence, RuleOutcome, RuleReport};

/// Error type for editor operations.
#[derive(Debug, Error)]
pub enum EditError {
    /// A `DeleteLine` pattern is not a valid regular expression.
    #[error("invalid line pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result of running a rule list over a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// The transformed document.
    pub text: String,
    /// One report per input rule, in the same order.
    pub reports: Vec<RuleReport>,
}

impl EditOutcome {
    /// `false` if any insert rule could not find its anchor.
    pub fn anchors_found(&self) -> bool {
        !self
            .reports
            .iter()
            .any(|r| r.outcome == RuleOutcome::AnchorMissing)
    }

    /// Labels of the insert rules whose anchor was absent.
    pub fn missing_anchors(&self) -> impl Iterator<Item = &str> {
        self.reports
            .iter()
            .filter(|r| r.outcome == RuleOutcome::AnchorMissing)
            .map(|r| r.rule.as_str())
    }
}

/// Applies `rules` to `text` in order.
///
/// # Errors
///
/// Returns [`EditError::InvalidPattern`] if a `DeleteLine` pattern fails to
/// compile.  Rules before the bad one have already been evaluated, but since
/// the editor works on an in-memory copy nothing observable has changed.
pub fn apply_rules(text: &str, rules: &[EditRule]) -> Result<EditOutcome, EditError> {
    let mut current = text.to_string();
    let mut reports = Vec::with_capacity(rules.len());
    let mut halted = false;

    for rule in rules {
        if halted {
            reports.push(RuleReport {
                rule: rule.label(),
                outcome: RuleOutcome::NotRun,
            });
            continue;
        }
        let (next, outcome) = apply_rule(&current, rule)?;
        debug!(rule = %rule.label(), ?outcome, "rule evaluated");
        if matches!(rule, EditRule::RequireAnchor { .. })
            && outcome == RuleOutcome::AnchorMissing
        {
            halted = true;
        }
        current = next;
        reports.push(RuleReport {
            rule: rule.label(),
            outcome,
        });
    }

    Ok(EditOutcome {
        text: current,
        reports,
    })
}

/// Applies one rule, returning the new text and what happened.
///
/// # Errors
///
/// See [`apply_rules`].
pub fn apply_rule(text: &str, rule: &EditRule) -> Result<(String, RuleOutcome), EditError> {
    let result = match rule {
        EditRule::DeleteLine { pattern } => delete_lines(text, pattern)?,
        EditRule::DeleteBlock {
            start,
            end,
            scope,
            line_start,
        } => delete_blocks(text, start, end, *scope, *line_start),
        EditRule::DeleteToken { token } => delete_token(text, token),
        EditRule::InsertAfter { anchor, text: insert } => insert_after(text, anchor, insert),
        EditRule::Append { text: tail } => {
            let mut out = String::with_capacity(text.len() + tail.len());
            out.push_str(text);
            out.push_str(tail);
            (out, RuleOutcome::Applied { matches: 1 })
        }
        EditRule::RequireAnchor { anchor } => {
            let outcome = if text.contains(anchor.as_str()) {
                RuleOutcome::Applied { matches: 1 }
            } else {
                RuleOutcome::AnchorMissing
            };
            (text.to_string(), outcome)
        }
    };
    Ok(result)
}

fn outcome_for(matches: usize) -> RuleOutcome {
    if matches == 0 {
        RuleOutcome::NoMatch
    } else {
        RuleOutcome::Applied { matches }
    }
}

fn delete_lines(text: &str, pattern: &str) -> Result<(String, RuleOutcome), EditError> {
    let re = Regex::new(&format!("(?m)^(?:{pattern})$")).map_err(|source| {
        EditError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }
    })?;

    let matches = re.find_iter(text).count();
    if matches == 0 {
        return Ok((text.to_string(), RuleOutcome::NoMatch));
    }
    Ok((re.replace_all(text, "").into_owned(), outcome_for(matches)))
}

fn delete_blocks(
    text: &str,
    start: &str,
    end: &str,
    scope: Occurrence,
    line_start: bool,
) -> (String, RuleOutcome) {
    if start.is_empty() || end.is_empty() {
        return (text.to_string(), RuleOutcome::NoMatch);
    }

    let mut out = String::with_capacity(text.len());
    // `cursor`: first byte not yet copied.  `search`: where to look for the
    // next start marker; ahead of `cursor` after skipping a mid-line one.
    let mut cursor = 0;
    let mut search = 0;
    let mut matches = 0;

    while let Some(rel_start) = text[search..].find(start) {
        let block_start = search + rel_start;
        let search_from = block_start + start.len();
        if line_start && block_start > 0 && !text[..block_start].ends_with('\n') {
            search = search_from;
            continue;
        }
        let Some(rel_end) = text[search_from..].find(end) else {
            break;
        };
        let block_end = search_from + rel_end + end.len();

        out.push_str(&text[cursor..block_start]);
        cursor = block_end;
        search = block_end;
        matches += 1;

        if scope == Occurrence::First {
            break;
        }
    }

    out.push_str(&text[cursor..]);
    (out, outcome_for(matches))
}

fn delete_token(text: &str, token: &str) -> (String, RuleOutcome) {
    if token.is_empty() {
        return (text.to_string(), RuleOutcome::NoMatch);
    }
    let matches = text.matches(token).count();
    if matches == 0 {
        return (text.to_string(), RuleOutcome::NoMatch);
    }
    (text.replace(token, ""), outcome_for(matches))
}

fn insert_after(text: &str, anchor: &str, insert: &str) -> (String, RuleOutcome) {
    match text.find(anchor) {
        Some(pos) => {
            let at = pos + anchor.len();
            let mut out = String::with_capacity(text.len() + insert.len());
            out.push_str(&text[..at]);
            out.push_str(insert);
            out.push_str(&text[at..]);
            (out, RuleOutcome::Applied { matches: 1 })
        }
        None => (text.to_string(), RuleOutcome::AnchorMissing),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
