//! Typed edit rules and their per-rule outcomes.
//!
//! Each [`EditRule`] is one step of a text transformation.  Rules are plain
//! data so a patch can be written down as a reviewable list, inspected in
//! tests, and printed in run reports before anything touches the disk.
//!
//! # Rule kinds
//!
//! | Variant         | Matches                         | Effect                              |
//! |-----------------|---------------------------------|-------------------------------------|
//! | `DeleteLine`    | regex, anchored to a full line  | line content removed, newline kept  |
//! | `DeleteBlock`   | literal start .. literal end    | shortest span removed               |
//! | `DeleteToken`   | literal substring               | every occurrence removed            |
//! | `InsertAfter`   | first literal anchor            | text inserted after the anchor      |
//! | `Append`        | always                          | text added at end of document       |
//! | `RequireAnchor` | literal anchor                  | none; later rules skipped if absent |

use serde::{Deserialize, Serialize};

/// How many start..end spans a [`EditRule::DeleteBlock`] removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occurrence {
    /// Only the span beginning at the first occurrence of the start marker.
    #[default]
    First,
    /// Every non-overlapping span, scanning left to right.
    All,
}

/// A single text transformation applied by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditRule {
    /// Removes the content of every line fully matching `pattern`.
    ///
    /// The pattern is wrapped as `^(?:pattern)$` and evaluated in multi-line
    /// mode, so it never has to carry its own anchors.
    DeleteLine { pattern: String },

    /// Removes the shortest span from the literal `start` marker through the
    /// next literal `end` delimiter (both inclusive).
    ///
    /// With `line_start` set, a `start` occurrence only counts when it begins
    /// a line (offset 0 or right after `\n`).
    DeleteBlock {
        start: String,
        end: String,
        #[serde(default)]
        scope: Occurrence,
        #[serde(default)]
        line_start: bool,
    },

    /// Removes every occurrence of the literal `token`.
    DeleteToken { token: String },

    /// Inserts `text` right after the first occurrence of `anchor`.
    InsertAfter { anchor: String, text: String },

    /// Appends `text` to the end of the document.
    Append { text: String },

    /// Leaves the document alone.  If `anchor` is absent, every rule after
    /// this one is reported as [`RuleOutcome::NotRun`] instead of applied.
    RequireAnchor { anchor: String },
}

impl EditRule {
    pub fn delete_line(pattern: impl Into<String>) -> Self {
        Self::DeleteLine {
            pattern: pattern.into(),
        }
    }

    pub fn delete_block(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::DeleteBlock {
            start: start.into(),
            end: end.into(),
            scope: Occurrence::First,
            line_start: false,
        }
    }

    pub fn delete_all_blocks(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::DeleteBlock {
            start: start.into(),
            end: end.into(),
            scope: Occurrence::All,
            line_start: false,
        }
    }

    /// Every span whose `start` begins a line, i.e. top-level Python blocks.
    pub fn delete_top_level_blocks(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::DeleteBlock {
            start: start.into(),
            end: end.into(),
            scope: Occurrence::All,
            line_start: true,
        }
    }

    pub fn delete_token(token: impl Into<String>) -> Self {
        Self::DeleteToken {
            token: token.into(),
        }
    }

    pub fn insert_after(anchor: impl Into<String>, text: impl Into<String>) -> Self {
        Self::InsertAfter {
            anchor: anchor.into(),
            text: text.into(),
        }
    }

    pub fn append(text: impl Into<String>) -> Self {
        Self::Append { text: text.into() }
    }

    pub fn require_anchor(anchor: impl Into<String>) -> Self {
        Self::RequireAnchor {
            anchor: anchor.into(),
        }
    }

    /// Short human-readable description used in logs and reports.
    pub fn label(&self) -> String {
        match self {
            Self::DeleteLine { pattern } => format!("delete-line /{pattern}/"),
            Self::DeleteBlock {
                start,
                scope,
                line_start,
                ..
            } => {
                let caret = if *line_start { "^" } else { "" };
                match scope {
                    Occurrence::First => format!("delete-block {caret}{:?}", first_line(start)),
                    Occurrence::All => format!("delete-blocks {caret}{:?}", first_line(start)),
                }
            }
            Self::DeleteToken { token } => format!("delete-token {token:?}"),
            Self::InsertAfter { anchor, .. } => format!("insert-after {:?}", first_line(anchor)),
            Self::Append { text } => format!("append {} bytes", text.len()),
            Self::RequireAnchor { anchor } => format!("require {:?}", first_line(anchor)),
        }
    }
}

fn first_line(s: &str) -> &str {
    s.trim_start_matches('\n').lines().next().unwrap_or("")
}

/// What happened when a single rule ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RuleOutcome {
    /// The rule changed the document at `matches` places.
    Applied { matches: usize },
    /// A delete rule found nothing to remove.
    NoMatch,
    /// An insert or require rule could not find its anchor; the document is
    /// unchanged.
    AnchorMissing,
    /// Not evaluated because an earlier `RequireAnchor` failed.
    NotRun,
}

/// A rule's label paired with its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleReport {
    pub rule: String,
    #[serde(flatten)]
    pub outcome: RuleOutcome,
}
