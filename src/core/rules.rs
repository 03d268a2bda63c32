//! Include/exclude pattern rules.
//!
//! A rule list is evaluated top to bottom against a subject string; the last
//! matching rule wins. An empty list includes everything, and a subject that
//! matches no rule takes the opposite of the first rule's type, so a list
//! that opens with an exclude acts as an allowlist.

use crate::core::error::PlanError;
use regex::Regex;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    Include,
    Exclude,
}

/// One pattern rule matched against a full subject string.
#[derive(Debug, Clone)]
pub struct Rule {
    rule_type: RuleType,
    pattern: Regex,
}

/// Serde form of a rule; compiled into a [`Rule`] via `TryFrom`.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    pub pattern: String,
}

impl Rule {
    pub fn new(rule_type: RuleType, pattern: &str) -> Result<Self, PlanError> {
        // Anchor so a rule matches whole subjects, not substrings.
        let pattern = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Rule { rule_type, pattern })
    }

    pub fn include(pattern: &str) -> Result<Self, PlanError> {
        Rule::new(RuleType::Include, pattern)
    }

    pub fn exclude(pattern: &str) -> Result<Self, PlanError> {
        Rule::new(RuleType::Exclude, pattern)
    }

    pub fn rule_type(&self) -> RuleType {
        self.rule_type
    }

    pub fn matches(&self, subject: &str) -> bool {
        self.pattern.is_match(subject)
    }
}

impl TryFrom<&RuleConfig> for Rule {
    type Error = PlanError;

    fn try_from(config: &RuleConfig) -> Result<Self, Self::Error> {
        Rule::new(config.rule_type, &config.pattern)
    }
}

pub fn compile_rules(configs: &[RuleConfig]) -> Result<Vec<Rule>, PlanError> {
    configs.iter().map(Rule::try_from).collect()
}

/// Whether the last matching rule (or the default) includes the subject.
pub fn last_match_includes(rules: &[Rule], subject: &str) -> bool {
    let default = match rules.first() {
        // No rules: include everything.
        None => return true,
        // First rule sets the polarity of "no match".
        Some(first) => first.rule_type() == RuleType::Exclude,
    };
    rules
        .iter()
        .rev()
        .find(|rule| rule.matches(subject))
        .map(|rule| rule.rule_type() == RuleType::Include)
        .unwrap_or(default)
}
