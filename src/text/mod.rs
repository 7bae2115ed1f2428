//! Post-recognition text cleanup
//!
//! Each page's raw text goes through seven ordered steps:
//!
//! 1. literal glyph substitutions, in table order
//! 2. hyphenated line-wrap merge
//! 3. allow-list filter (letters, digits, whitespace, configured punctuation)
//! 4. whitespace collapse
//! 5. removal of whitespace before sentence punctuation
//! 6. case-insensitive whole-word dictionary corrections
//! 7. contextual patterns restoring short words after prepositions
//!
//! Steps 3 to 5 are idempotent. The tables behind 1, 6 and 7 are
//! locale-specific heuristics and can be replaced through [`NormalizerConfig`].

pub mod tables;

use crate::error::OcrError;
use regex::{Captures, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// The cleanup steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CleanupStep {
    Glyphs,
    Hyphenation,
    AllowList,
    Whitespace,
    PunctuationSpacing,
    Dictionary,
    Contextual,
}

impl CleanupStep {
    pub const ALL: [CleanupStep; 7] = [
        CleanupStep::Glyphs,
        CleanupStep::Hyphenation,
        CleanupStep::AllowList,
        CleanupStep::Whitespace,
        CleanupStep::PunctuationSpacing,
        CleanupStep::Dictionary,
        CleanupStep::Contextual,
    ];
}

type StepOverride = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A regex applied in step 7
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextualPattern {
    pub pattern: String,
    /// Replacement with `${1}`-style group references
    pub replacement: String,
}

/// Correction tables, loadable from JSON.
///
/// Missing table keys deserialize as empty; a missing `allowed_punctuation`
/// falls back to the built-in set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    #[serde(default)]
    pub glyph_substitutions: Vec<(String, String)>,
    #[serde(default)]
    pub word_corrections: Vec<(String, String)>,
    #[serde(default)]
    pub contextual_patterns: Vec<ContextualPattern>,
    #[serde(default = "default_allowed_punctuation")]
    pub allowed_punctuation: String,
}

fn default_allowed_punctuation() -> String {
    tables::DEFAULT_ALLOWED_PUNCTUATION.to_string()
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        tables::spanish()
    }
}

/// Compiled normalizer, shared read-only across pages and documents.
#[derive(Clone)]
pub struct TextNormalizer {
    glyphs: Vec<(String, String)>,
    hyphen_break: Regex,
    whitespace: Regex,
    space_before_punct: Regex,
    allowed_punctuation: Vec<char>,
    dictionary: Option<(Regex, HashMap<String, String>)>,
    contextual: Vec<(Regex, String)>,
    overrides: HashMap<CleanupStep, StepOverride>,
}

impl std::fmt::Debug for TextNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextNormalizer")
            .field("glyphs", &self.glyphs)
            .field("allowed_punctuation", &self.allowed_punctuation)
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl TextNormalizer {
    pub fn new(config: &NormalizerConfig) -> Result<Self, OcrError> {
        let dictionary = if config.word_corrections.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = config
                .word_corrections
                .iter()
                .map(|(word, _)| regex::escape(word))
                .collect();
            let matcher = RegexBuilder::new(&format!(r"\b(?:{})\b", alternatives.join("|")))
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    OcrError::Configuration(format!("Invalid word correction table: {}", e))
                })?;
            // First entry wins for duplicate keys
            let mut lookup = HashMap::new();
            for (word, replacement) in &config.word_corrections {
                lookup
                    .entry(word.to_lowercase())
                    .or_insert_with(|| replacement.clone());
            }
            Some((matcher, lookup))
        };

        let contextual = config
            .contextual_patterns
            .iter()
            .map(|p| {
                Regex::new(&p.pattern)
                    .map(|re| (re, p.replacement.clone()))
                    .map_err(|e| {
                        OcrError::Configuration(format!(
                            "Invalid contextual pattern '{}': {}",
                            p.pattern, e
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            glyphs: config
                .glyph_substitutions
                .iter()
                .filter(|(from, _)| !from.is_empty())
                .cloned()
                .collect(),
            hyphen_break: fixed_regex(r"-[ \t]*\r?\n[ \t]*")?,
            whitespace: fixed_regex(r"\s+")?,
            space_before_punct: fixed_regex(r"\s+([.,;:!?])")?,
            allowed_punctuation: config.allowed_punctuation.chars().collect(),
            dictionary,
            contextual,
            overrides: HashMap::new(),
        })
    }

    /// Swap the implementation of one cleanup step, keeping its position.
    pub fn replace_step<F>(mut self, step: CleanupStep, apply: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.overrides.insert(step, Arc::new(apply));
        self
    }

    /// Clean one page of recognized text.
    ///
    /// Never fails: if cleanup goes wrong the raw text is returned as is.
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        match catch_unwind(AssertUnwindSafe(|| self.apply_all(text))) {
            Ok(cleaned) => cleaned,
            Err(_) => {
                tracing::warn!(
                    "{}",
                    OcrError::Normalization("text cleanup panicked, keeping raw text".to_string())
                );
                text.to_string()
            }
        }
    }

    fn apply_all(&self, text: &str) -> String {
        CleanupStep::ALL
            .iter()
            .fold(text.to_string(), |acc, &step| self.run_step(step, &acc))
    }

    fn run_step(&self, step: CleanupStep, text: &str) -> String {
        if let Some(apply) = self.overrides.get(&step) {
            return apply(text);
        }
        match step {
            CleanupStep::Glyphs => self.substitute_glyphs(text),
            CleanupStep::Hyphenation => self.merge_hyphenated(text),
            CleanupStep::AllowList => self.filter_allowed(text),
            CleanupStep::Whitespace => self.collapse_whitespace(text),
            CleanupStep::PunctuationSpacing => self.fix_punctuation_spacing(text),
            CleanupStep::Dictionary => self.correct_words(text),
            CleanupStep::Contextual => self.apply_contextual(text),
        }
    }

    /// Step 1
    pub fn substitute_glyphs(&self, text: &str) -> String {
        self.glyphs
            .iter()
            .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
    }

    /// Step 2. Only breaks with word characters on both sides are joined,
    /// and a blank line after the hyphen is a paragraph break, not a wrap.
    pub fn merge_hyphenated(&self, text: &str) -> String {
        let mut merged = String::with_capacity(text.len());
        let mut copied = 0;
        for found in self.hyphen_break.find_iter(text) {
            let before = text[..found.start()].chars().next_back();
            let after = text[found.end()..].chars().next();
            if before.is_some_and(is_word_char) && after.is_some_and(is_word_char) {
                merged.push_str(&text[copied..found.start()]);
                copied = found.end();
            }
        }
        merged.push_str(&text[copied..]);
        merged
    }

    /// Step 3
    pub fn filter_allowed(&self, text: &str) -> String {
        text.chars()
            .filter(|c| {
                c.is_alphanumeric() || c.is_whitespace() || self.allowed_punctuation.contains(c)
            })
            .collect()
    }

    /// Step 4
    pub fn collapse_whitespace(&self, text: &str) -> String {
        self.whitespace.replace_all(text, " ").trim().to_string()
    }

    /// Step 5
    pub fn fix_punctuation_spacing(&self, text: &str) -> String {
        self.space_before_punct.replace_all(text, "${1}").into_owned()
    }

    /// Step 6
    pub fn correct_words(&self, text: &str) -> String {
        let Some((matcher, lookup)) = &self.dictionary else {
            return text.to_string();
        };

        matcher
            .replace_all(text, |caps: &Captures| {
                let found = &caps[0];
                match lookup.get(&found.to_lowercase()) {
                    Some(replacement) => match_leading_case(found, replacement),
                    None => found.to_string(),
                }
            })
            .into_owned()
    }

    /// Step 7
    pub fn apply_contextual(&self, text: &str) -> String {
        self.contextual
            .iter()
            .fold(text.to_string(), |acc, (re, replacement)| {
                re.replace_all(&acc, replacement.as_str()).into_owned()
            })
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn fixed_regex(pattern: &str) -> Result<Regex, OcrError> {
    Regex::new(pattern).map_err(|e| OcrError::Normalization(format!("{}: {}", pattern, e)))
}

/// Capitalize the replacement when the matched word started uppercase
fn match_leading_case(found: &str, replacement: &str) -> String {
    let starts_upper = found.chars().next().is_some_and(char::is_uppercase);
    if !starts_upper {
        return replacement.to_string();
    }
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
