//! Rule file loader
//!
//! A rule file is a sequence of named blocks:
//!
//! ```text
//! tier_rule:
//!   case when age >= 30 then 'senior'
//!   else 'junior' end as tier
//! region_rule:
//!   region in ('EU', 'US')
//! ```
//!
//! A line consisting of a word followed by `:` opens a new rule; every
//! following line belongs to that rule until the next key line.

use std::path::Path;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;

static KEY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w+\s*:$").expect("key line pattern is a valid regex"));

/// One named rule body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub key: String,
    pub body: String,
}

/// Rules in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Add a rule; a repeated key replaces the earlier body in place
    pub fn insert(&mut self, key: &str, body: String) {
        match self.rules.iter_mut().find(|r| r.key == key) {
            Some(rule) => rule.body = body,
            None => self.rules.push(Rule {
                key: key.to_string(),
                body,
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| r.key == key)
            .map(|r| r.body.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Split rule file text into named rules
pub fn parse_rules(text: &str) -> RuleSet {
    let mut rules = RuleSet::default();
    let mut current_key: Option<String> = None;
    let mut buffer: Vec<&str> = Vec::new();
    let mut orphan_lines = 0usize;

    for line in text.lines() {
        let stripped = line.trim();
        if KEY_LINE.is_match(stripped) {
            if let Some(key) = current_key.take() {
                flush(&mut rules, &key, &mut buffer);
            }
            current_key = Some(stripped.trim_end_matches(':').trim().to_string());
        } else if current_key.is_some() {
            buffer.push(line.trim_end());
        } else if !stripped.is_empty() {
            orphan_lines += 1;
        }
    }

    if let Some(key) = current_key {
        flush(&mut rules, &key, &mut buffer);
    }

    if orphan_lines > 0 {
        warn!("ignored {} line(s) before the first rule key", orphan_lines);
    }
    debug!("parsed {} rules", rules.len());
    rules
}

/// Read and split a rule file
pub fn load_rules<P: AsRef<Path>>(path: P) -> Result<RuleSet> {
    let path = path.as_ref();
    debug!("loading rules from {}", path.display());
    let text = std::fs::read_to_string(path)?;
    Ok(parse_rules(&text))
}

fn flush(rules: &mut RuleSet, key: &str, buffer: &mut Vec<&str>) {
    let body = buffer.join("\n").trim().to_string();
    buffer.clear();
    if !body.is_empty() {
        rules.insert(key, body);
    }
}
