//! Keyword heuristics that drive branching and question selection.
//!
//! All functions here are pure predicates over text. A smarter classifier
//! can replace them without touching the state machine.

use pf_protocol::config_models::KeywordConfig;

const MARKET_RESEARCH_TERMS: &[&str] = &[
    "competitor",
    "competition",
    "market",
    "comparison",
    "compare",
    "analysis",
    "竞品",
    "市场",
    "对比",
    "分析",
];

const AI_TERMS: &[&str] = &[
    "AI",
    "intelligent",
    "intelligence",
    "automation",
    "automatic",
    "automate",
    "smart",
    "智能",
    "自动",
];

const COLLABORATION_TERMS: &[&str] = &[
    "team",
    "collaboration",
    "collaborative",
    "collaborate",
    "multi-user",
    "multiplayer",
    "协作",
    "团队",
    "多人",
];

/// Term sets for each heuristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRules {
    pub market_research: Vec<String>,
    pub ai: Vec<String>,
    pub collaboration: Vec<String>,
}

impl Default for KeywordRules {
    fn default() -> Self {
        Self {
            market_research: to_owned_terms(MARKET_RESEARCH_TERMS),
            ai: to_owned_terms(AI_TERMS),
            collaboration: to_owned_terms(COLLABORATION_TERMS),
        }
    }
}

impl KeywordRules {
    /// Built-in terms, with every non-empty configured list replacing its default.
    pub fn from_config(config: &KeywordConfig) -> Self {
        let mut rules = Self::default();
        if !config.market_research.is_empty() {
            rules.market_research = config.market_research.clone();
        }
        if !config.ai.is_empty() {
            rules.ai = config.ai.clone();
        }
        if !config.collaboration.is_empty() {
            rules.collaboration = config.collaboration.clone();
        }
        rules
    }

    pub fn mentions_ai(&self, text: &str) -> bool {
        contains_any(text, &self.ai)
    }

    pub fn mentions_collaboration(&self, text: &str) -> bool {
        contains_any(text, &self.collaboration)
    }

    /// True when the requirement or any answer mentions a market research term.
    pub fn needs_market_research<'a, I>(&self, requirement: &str, answers: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        if contains_any(requirement, &self.market_research) {
            return true;
        }
        answers
            .into_iter()
            .any(|answer| contains_any(answer, &self.market_research))
    }
}

fn to_owned_terms(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| (*t).to_string()).collect()
}

fn contains_any(text: &str, terms: &[String]) -> bool {
    terms.iter().any(|term| contains_term(text, term))
}

/// Match one term against text.
///
/// - Non-ASCII terms: plain substring.
/// - Upper-case ASCII acronyms (`AI`): whole word, case-insensitive.
/// - Other ASCII terms: case-insensitive, anchored at a word start so
///   plurals still match.
pub fn contains_term(text: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    if !term.is_ascii() {
        return text.contains(term);
    }

    let acronym = term.chars().all(|c| c.is_ascii_uppercase());
    // to_ascii_lowercase keeps byte offsets stable
    let haystack = text.to_ascii_lowercase();
    let needle = term.to_ascii_lowercase();
    let bytes = haystack.as_bytes();

    haystack.match_indices(&needle).any(|(start, _)| {
        let end = start + needle.len();
        let starts_word = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
        let ends_word = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
        starts_word && (!acronym || ends_word)
    })
}
