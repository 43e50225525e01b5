//! Selector quality scoring
//!
//! Scores are computed from the selector text alone, starting at
//! [`BASE_SCORE`] and adding one independent adjustment per matching rule.
//! Higher is better; the total never drops below zero.

use serde::Serialize;

/// Score every selector starts from
pub const BASE_SCORE: i32 = 100;

/// Selectors longer than this many UTF-16 code units are penalized
pub const LONG_SELECTOR_CHARS: usize = 100;

/// More combinators than this are penalized
pub const MAX_COMBINATORS: usize = 3;

/// Scoring rule enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreRule {
    /// `[data-testid...]` attribute reference
    TestId,
    /// `[name=...]` attribute reference
    NameAttribute,
    /// Leading `#`
    IdSelector,
    /// Leading `.`
    ClassSelector,
    /// `:has-text(` or `text=` construct
    TextMatch,
    /// Leading `//` or `(//`
    XPath,
    /// Longer than [`LONG_SELECTOR_CHARS`]
    LongSelector,
    /// More than [`MAX_COMBINATORS`] of `>`, `+`, `~`
    ManyCombinators,
}

impl ScoreRule {
    /// Every rule, in evaluation order
    pub const ALL: [ScoreRule; 8] = [
        ScoreRule::TestId,
        ScoreRule::NameAttribute,
        ScoreRule::IdSelector,
        ScoreRule::ClassSelector,
        ScoreRule::XPath,
        ScoreRule::LongSelector,
        ScoreRule::ManyCombinators,
        ScoreRule::TextMatch,
    ];

    pub fn delta(&self) -> i32 {
        match self {
            ScoreRule::TestId => 50,
            ScoreRule::NameAttribute => 30,
            ScoreRule::IdSelector => 20,
            ScoreRule::ClassSelector => 10,
            ScoreRule::TextMatch => 15,
            ScoreRule::XPath => -30,
            ScoreRule::LongSelector => -20,
            ScoreRule::ManyCombinators => -15,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScoreRule::TestId => "test-id attribute",
            ScoreRule::NameAttribute => "name attribute",
            ScoreRule::IdSelector => "id selector",
            ScoreRule::ClassSelector => "class selector",
            ScoreRule::TextMatch => "text match",
            ScoreRule::XPath => "xpath",
            ScoreRule::LongSelector => "long selector",
            ScoreRule::ManyCombinators => "many combinators",
        }
    }

    /// Check if the rule applies to `selector`
    pub fn matches(&self, selector: &str) -> bool {
        match self {
            ScoreRule::TestId => selector.contains("[data-testid"),
            ScoreRule::NameAttribute => selector.contains("[name="),
            ScoreRule::IdSelector => selector.starts_with('#'),
            ScoreRule::ClassSelector => selector.starts_with('.'),
            ScoreRule::TextMatch => selector.contains(":has-text(") || selector.contains("text="),
            ScoreRule::XPath => selector.starts_with("//") || selector.starts_with("(//"),
            ScoreRule::LongSelector => selector.encode_utf16().count() > LONG_SELECTOR_CHARS,
            ScoreRule::ManyCombinators => combinator_count(selector) > MAX_COMBINATORS,
        }
    }
}

/// Per-rule explanation of a score
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub selector: String,
    pub base: i32,
    pub applied: Vec<ScoreRule>,
    pub total: u32,
}

/// Explain how `selector` is scored
pub fn explain_score(selector: &str) -> ScoreBreakdown {
    let applied: Vec<ScoreRule> = ScoreRule::ALL
        .iter()
        .copied()
        .filter(|rule| rule.matches(selector))
        .collect();
    let raw = BASE_SCORE + applied.iter().map(ScoreRule::delta).sum::<i32>();

    ScoreBreakdown {
        selector: selector.to_string(),
        base: BASE_SCORE,
        applied,
        total: raw.max(0) as u32,
    }
}

/// Heuristic quality score of a selector, floored at zero
pub fn score_selector(selector: &str) -> u32 {
    explain_score(selector).total
}

fn combinator_count(selector: &str) -> usize {
    selector
        .chars()
        .filter(|c| matches!(c, '>' | '+' | '~'))
        .count()
}
