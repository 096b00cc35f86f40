//! PII redaction applied to user text before it reaches any model.
//!
//! Redaction is an ordered list of pattern → replacement rules. Each rule is a
//! pure function over text and later rules see the output of earlier ones, so
//! text touched by one rule may be rewritten again by the next.
//!
//! Word boundaries are ASCII-only: a letter outside ASCII next to an email or
//! a digit run does not protect it from redaction.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, NoExpand, Regex};

/// Replacement for PII field names.
pub const FIELD_PLACEHOLDER: &str = "Anonymized";
/// Replacement for email addresses.
pub const EMAIL_PLACEHOLDER: &str = "Anonymized Email";
/// Replacement for numeric identifiers.
pub const ID_PLACEHOLDER: &str = "Anonymized ID";

/// PII field names that are never forwarded, matched case-insensitively as whole words.
pub const PII_FIELD_NAMES: [&str; 9] = [
    "User ID",
    "Email",
    "First Name",
    "Last Name",
    "Job Title",
    "School Name",
    "School Address",
    "School State ID",
    "School US State Location",
];

/// A single pattern → replacement rule.
#[derive(Debug, Clone)]
pub struct RedactionRule {
    name: &'static str,
    pattern: Regex,
    replacement: &'static str,
    /// Matches that begin inside an occurrence of this placeholder are left
    /// as they are.
    keep_inside: Option<&'static str>,
}

impl RedactionRule {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Apply this rule to every match in `text`.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match self.keep_inside {
            None => self.pattern.replace_all(text, NoExpand(self.replacement)),
            Some(placeholder) => self.pattern.replace_all(text, |caps: &Captures<'_>| match caps.get(0) {
                Some(m) if starts_inside(text, m.start(), placeholder) => m.as_str().to_string(),
                _ => self.replacement.to_string(),
            }),
        }
    }
}

/// Whether byte offset `at` falls strictly inside an occurrence of `placeholder`.
fn starts_inside(text: &str, at: usize, placeholder: &str) -> bool {
    (1..placeholder.len()).any(|offset| {
        at.checked_sub(offset)
            .and_then(|start| text.get(start..))
            .is_some_and(|rest| rest.starts_with(placeholder))
    })
}

/// PII field names → `Anonymized`.
///
/// The `Email` half of an `Anonymized Email` placeholder is not a field name
/// and is kept.
pub fn field_name_rule() -> RedactionRule {
    let alternatives = PII_FIELD_NAMES
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");

    RedactionRule {
        name: "field_names",
        pattern: Regex::new(&format!(r"(?i-u)\b(?:{})\b", alternatives))
            .expect("field name pattern is valid"),
        replacement: FIELD_PLACEHOLDER,
        keep_inside: Some(EMAIL_PLACEHOLDER),
    }
}

/// `word@word.word` → `Anonymized Email`.
///
/// A match starting at the `Email` of an earlier placeholder, as left behind
/// by `a@b.c@d.e`, is kept.
pub fn email_rule() -> RedactionRule {
    RedactionRule {
        name: "emails",
        pattern: Regex::new(r"(?-u)\b[A-Za-z0-9_]+@[A-Za-z0-9_]+\.[A-Za-z0-9_]+\b")
            .expect("email pattern is valid"),
        replacement: EMAIL_PLACEHOLDER,
        keep_inside: Some(EMAIL_PLACEHOLDER),
    }
}

/// Whole-word runs of 1 to 12 digits → `Anonymized ID`.
pub fn numeric_id_rule() -> RedactionRule {
    RedactionRule {
        name: "numeric_ids",
        pattern: Regex::new(r"(?-u)\b[0-9]{1,12}\b").expect("numeric id pattern is valid"),
        replacement: ID_PLACEHOLDER,
        keep_inside: None,
    }
}

/// Ordered set of redaction rules.
#[derive(Debug, Clone)]
pub struct Redactor {
    rules: Vec<RedactionRule>,
}

impl Redactor {
    pub fn new(rules: Vec<RedactionRule>) -> Self {
        Self { rules }
    }

    /// The standard rule set: field names, then emails, then numeric ids.
    pub fn standard() -> &'static Redactor {
        static STANDARD: OnceLock<Redactor> = OnceLock::new();
        STANDARD.get_or_init(|| Redactor::new(vec![field_name_rule(), email_rule(), numeric_id_rule()]))
    }

    pub fn rules(&self) -> &[RedactionRule] {
        &self.rules
    }

    /// Apply every rule in order.
    pub fn redact(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |acc, rule| rule.apply(&acc).into_owned())
    }
}

/// Redact `text` with the standard rule set.
pub fn anonymize(text: &str) -> String {
    Redactor::standard().redact(text)
}
