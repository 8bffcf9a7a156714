//! Conversion of display names into DDF concept identifiers.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// The ` -.` range covers space through full stop, i.e. most ASCII punctuation.
const DEFAULT_PATTERN: &str = r#"[/ -.*";]+"#;
const GROUP_PATTERN: &str = r#"[/ -.*";\[\]]+"#;

/// Character-stripping rules used when turning names into identifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlugRule {
    /// Column headers and concept names: punctuation runs become `_`.
    #[default]
    Default,
    /// Group entities: punctuation and brackets become `_`.
    Loose,
    /// Group entities that must not carry separators: punctuation and brackets are removed.
    Strict,
}

impl SlugRule {
    fn pattern(&self) -> &'static Regex {
        static DEFAULT: OnceLock<Regex> = OnceLock::new();
        static GROUP: OnceLock<Regex> = OnceLock::new();
        match self {
            SlugRule::Default => {
                DEFAULT.get_or_init(|| Regex::new(DEFAULT_PATTERN).expect("valid pattern"))
            }
            SlugRule::Loose | SlugRule::Strict => {
                GROUP.get_or_init(|| Regex::new(GROUP_PATTERN).expect("valid pattern"))
            }
        }
    }

    fn separator(&self) -> &'static str {
        match self {
            SlugRule::Default | SlugRule::Loose => "_",
            SlugRule::Strict => "",
        }
    }
}

/// Convert `s` to a concept identifier with the default rule.
pub fn to_concept_id(s: &str) -> String {
    to_concept_id_with(s, SlugRule::Default)
}

/// Convert `s` to a concept identifier: trim, collapse every run of matched characters into the
/// rule's separator, drop newlines and a single trailing separator, then lowercase.
pub fn to_concept_id_with(s: &str, rule: SlugRule) -> String {
    let sep = rule.separator();
    let mut slug = rule
        .pattern()
        .replace_all(s.trim(), sep)
        .replace('\n', "");
    if !sep.is_empty() && slug.ends_with(sep) {
        slug.truncate(slug.len() - sep.len());
    }
    slug.to_lowercase()
}
