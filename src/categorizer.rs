use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Contains,
    StartsWith,
    Regex,
}

/// One user rule as stored in settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub pattern: String,
    #[serde(default = "default_match_type")]
    pub match_type: MatchType,
    pub category: String,
}

fn default_match_type() -> MatchType {
    MatchType::Contains
}

#[derive(Debug)]
enum Matcher {
    Contains(String),
    StartsWith(String),
    Regex(Regex),
}

impl Matcher {
    fn matches(&self, description: &str) -> bool {
        match self {
            Self::Contains(pat) => description.to_uppercase().contains(pat.as_str()),
            Self::StartsWith(pat) => description.to_uppercase().starts_with(pat.as_str()),
            Self::Regex(re) => re.is_match(description),
        }
    }
}

/// Description rules applied when a statement row carries no category of its own.
/// First matching rule wins.
#[derive(Debug, Default)]
pub struct CategoryRules {
    rules: Vec<(Matcher, String)>,
}

impl CategoryRules {
    pub fn compile(rules: &[CategoryRule]) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let matcher = match rule.match_type {
                MatchType::Contains => Matcher::Contains(rule.pattern.to_uppercase()),
                MatchType::StartsWith => Matcher::StartsWith(rule.pattern.to_uppercase()),
                MatchType::Regex => Matcher::Regex(Regex::new(&rule.pattern).map_err(|e| {
                    ImportError::InvalidLayout(format!("category rule {:?}: {e}", rule.pattern))
                })?),
            };
            compiled.push((matcher, rule.category.clone()));
        }
        Ok(Self { rules: compiled })
    }

    pub fn categorize(&self, description: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|(m, _)| m.matches(description))
            .map(|(_, category)| category.as_str())
    }
}

/// Drops the "Категория:" label some statements put in front of the category value.
pub fn strip_category_label(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let value = ["Категория:", "Category:"]
        .iter()
        .find_map(|label| {
            trimmed
                .get(..label.len())
                .filter(|head| head.to_lowercase() == label.to_lowercase())
                .map(|_| &trimmed[label.len()..])
        })
        .unwrap_or(trimmed)
        .trim();
    (!value.is_empty()).then(|| value.to_string())
}
