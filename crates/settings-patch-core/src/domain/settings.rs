//! Structured view of a settings module.
//!
//! [`SettingsModule::parse`] splits a document into an ordered list of
//! [`Item`]s: top-level assignments (`NAME = ...`, including statements that
//! continue over several lines inside brackets) and everything else kept as
//! raw text.  Serialising the items back with [`SettingsModule::to_text`]
//! reproduces the input byte for byte, so the model can be used to inspect a
//! document without any risk of reformatting it.
//!
//! The model only understands *top-level* statements.  Indented assignments
//! inside `if`/`else` branches are part of `Other` items, which matches how
//! the line-delete rules treat them.
//!
//! The main consumer is [`audit`], which reports the duplicate declarations
//! that repeated text patching tends to leave behind.

use serde::{Deserialize, Serialize};

/// One top-level chunk of a settings document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// A top-level `KEY = value` or `KEY += value` statement.
    Assignment(Assignment),
    /// Any other run of lines (imports, comments, blank lines, `if` blocks).
    Other(String),
}

/// A top-level assignment and the exact text it spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub key: String,
    /// `true` for `+=`; augmented assignments extend rather than declare.
    pub augmented: bool,
    /// Full statement text including its trailing newline, if any.
    pub text: String,
}

impl Assignment {
    /// The right-hand side of the statement, without surrounding whitespace.
    pub fn value(&self) -> &str {
        let op = if self.augmented { "+=" } else { "=" };
        self.text
            .split_once(op)
            .map(|(_, rhs)| rhs.trim())
            .unwrap_or("")
    }
}

/// Ordered, lossless representation of a settings document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsModule {
    items: Vec<Item>,
}

impl SettingsModule {
    /// Parses `text` into items.  Never fails; unrecognised lines become
    /// [`Item::Other`].
    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let mut items = Vec::new();
        let mut other = String::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            let Some((key, augmented)) = assignment_head(line) else {
                other.push_str(line);
                i += 1;
                continue;
            };

            if !other.is_empty() {
                items.push(Item::Other(std::mem::take(&mut other)));
            }

            let mut scanner = StatementScanner::default();
            let mut stmt = String::new();
            loop {
                let line = lines[i];
                stmt.push_str(line);
                scanner.feed(line);
                i += 1;
                if scanner.is_complete() || i >= lines.len() {
                    break;
                }
            }

            items.push(Item::Assignment(Assignment {
                key: key.to_string(),
                augmented,
                text: stmt,
            }));
        }

        if !other.is_empty() {
            items.push(Item::Other(other));
        }

        Self { items }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Serialises the items back to text.
    pub fn to_text(&self) -> String {
        self.items
            .iter()
            .map(|item| match item {
                Item::Assignment(a) => a.text.as_str(),
                Item::Other(s) => s.as_str(),
            })
            .collect()
    }

    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.items.iter().filter_map(|item| match item {
            Item::Assignment(a) => Some(a),
            Item::Other(_) => None,
        })
    }

    /// Plain (non-augmented) top-level declarations of `key`, in order.
    pub fn declarations<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Assignment> {
        self.assignments()
            .filter(move |a| a.key == key && !a.augmented)
    }

    /// Keys declared more than once at top level, in first-seen order.
    pub fn duplicate_keys(&self) -> Vec<DuplicateDeclaration> {
        let mut seen: Vec<DuplicateDeclaration> = Vec::new();
        for a in self.assignments().filter(|a| !a.augmented) {
            match seen.iter_mut().find(|d| d.key == a.key) {
                Some(d) => d.count += 1,
                None => seen.push(DuplicateDeclaration {
                    key: a.key.clone(),
                    count: 1,
                }),
            }
        }
        seen.retain(|d| d.count > 1);
        seen
    }

    /// String literal entries of the first top-level list declaration of `key`.
    ///
    /// Returns an empty vector if `key` is not declared or is not a list.
    pub fn list_entries(&self, key: &str) -> Vec<String> {
        self.declarations(key)
            .next()
            .map(|a| a.value())
            .filter(|v| v.starts_with('['))
            .map(string_literals)
            .unwrap_or_default()
    }
}

/// A key declared `count` times at top level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateDeclaration {
    pub key: String,
    pub count: usize,
}

/// A list entry that appears `count` times inside `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateEntry {
    pub list: String,
    pub entry: String,
    pub count: usize,
}

/// Findings from [`audit`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationAudit {
    pub duplicate_keys: Vec<DuplicateDeclaration>,
    pub duplicate_entries: Vec<DuplicateEntry>,
}

impl DeclarationAudit {
    pub fn is_clean(&self) -> bool {
        self.duplicate_keys.is_empty() && self.duplicate_entries.is_empty()
    }

    /// One-line description for logs and error messages.
    pub fn summary(&self) -> String {
        if self.is_clean() {
            return "no duplicate declarations".to_string();
        }
        let keys = self
            .duplicate_keys
            .iter()
            .map(|d| format!("{} declared {} times", d.key, d.count));
        let entries = self
            .duplicate_entries
            .iter()
            .map(|d| format!("'{}' listed {} times in {}", d.entry, d.count, d.list));
        keys.chain(entries).collect::<Vec<_>>().join("; ")
    }
}

/// Checks that every top-level key is declared once and that the entries of
/// each list in `list_keys` are unique.
pub fn audit(text: &str, list_keys: &[&str]) -> DeclarationAudit {
    let module = SettingsModule::parse(text);
    let mut duplicate_entries = Vec::new();

    for &list in list_keys {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for entry in module.list_entries(list) {
            match counts.iter_mut().find(|(e, _)| *e == entry) {
                Some((_, n)) => *n += 1,
                None => counts.push((entry, 1)),
            }
        }
        duplicate_entries.extend(counts.into_iter().filter(|(_, n)| *n > 1).map(
            |(entry, count)| DuplicateEntry {
                list: list.to_string(),
                entry,
                count,
            },
        ));
    }

    DeclarationAudit {
        duplicate_keys: module.duplicate_keys(),
        duplicate_entries,
    }
}

// ── Parsing helpers ───────────────────────────────────────────────────────────

/// Recognises `IDENT =` / `IDENT +=` at column 0.
fn assignment_head(line: &str) -> Option<(&str, bool)> {
    let first = line.chars().next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    let ident_len = line
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(line.len());
    let ident = &line[..ident_len];
    if is_keyword(ident) {
        return None;
    }

    let rest = line[ident_len..].trim_start_matches([' ', '\t']);
    if rest.starts_with("+=") {
        return Some((ident, true));
    }
    let after = rest.strip_prefix('=')?;
    if after.starts_with('=') {
        return None;
    }
    Some((ident, false))
}

fn is_keyword(ident: &str) -> bool {
    matches!(
        ident,
        "if" | "elif" | "else" | "for" | "while" | "def" | "class" | "import" | "from"
            | "return" | "with" | "try" | "except" | "finally" | "print" | "assert"
    )
}

/// Tracks bracket depth and line continuations across a statement.
#[derive(Debug, Default)]
struct StatementScanner {
    depth: i32,
    continued: bool,
}

impl StatementScanner {
    fn feed(&mut self, line: &str) {
        let mut quote: Option<char> = None;
        let mut escaped = false;

        for c in line.chars() {
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '#' => break,
                '\'' | '"' => quote = Some(c),
                '(' | '[' | '{' => self.depth += 1,
                ')' | ']' | '}' => self.depth -= 1,
                _ => {}
            }
        }

        self.continued = line.trim_end_matches(['\n', '\r']).ends_with('\\');
    }

    fn is_complete(&self) -> bool {
        self.depth <= 0 && !self.continued
    }
}

/// Extracts the contents of every single- or double-quoted literal.
fn string_literals(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut chars = s.chars();
    let mut in_comment = false;

    while let Some(c) = chars.next() {
        if in_comment {
            if c == '\n' {
                in_comment = false;
            }
            continue;
        }
        match c {
            '#' => in_comment = true,
            '\'' | '"' => {
                let mut lit = String::new();
                for d in chars.by_ref() {
                    if d == c {
                        break;
                    }
                    lit.push(d);
                }
                out.push(lit);
            }
            _ => {}
        }
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
