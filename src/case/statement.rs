//! CASE statement driver
//!
//! Splits `CASE WHEN <cond> THEN <value> ... [ELSE <value>] END [AS alias]`
//! into branches, expands each branch condition and tags every combo with the
//! branch output. An ELSE branch adds one wildcard row.

use std::collections::BTreeSet;
use std::ops::Range;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::case::table::CaseTable;
use crate::condition::{evaluate, parse, Combo, Expression};
use crate::error::{CaseError, Result};

/// Key tagging every combo with its branch output, whatever the alias is
pub const DIRECT_MAPPED_COLUMN: &str = "direct mapped";

/// Output column name used when the statement has no `AS alias`
pub const DEFAULT_OUTPUT_COLUMN: &str = "output";

/// Value meaning "any value" in the ELSE row
pub const WILDCARD: &str = "*";

/// Quoted literals are matched first so keywords inside them are skipped
static KEYWORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)'[^']*'|\b(case|when|then|else|end)\b").expect("keyword pattern is a valid regex")
});

static ALIAS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*as\s+(\w+)").expect("alias pattern is a valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Case,
    When,
    Then,
    Else,
    End,
}

#[derive(Debug, Clone)]
struct KeywordMatch {
    keyword: Keyword,
    span: Range<usize>,
}

/// A WHEN ... THEN pair
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub condition: Expression,
    pub output: String,
}

/// A parsed CASE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CaseStatement {
    pub branches: Vec<Branch>,
    pub else_value: Option<String>,
    pub output_column: String,
}

impl CaseStatement {
    /// Parse a full CASE block
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let keywords = scan_keywords(text);

        match keywords.first() {
            Some(first) if first.keyword == Keyword::Case && first.span.start == 0 => {}
            _ => return Err(CaseError::Precondition("Must start with CASE".to_string())),
        }

        let end = keywords
            .iter()
            .rposition(|m| m.keyword == Keyword::End)
            .ok_or_else(|| CaseError::Precondition("Missing END".to_string()))?;

        let tail = &text[keywords[end].span.end..];
        let output_column = ALIAS_PATTERN
            .captures(tail)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| DEFAULT_OUTPUT_COLUMN.to_string());

        let body_start = keywords[0].span.end;
        let body_end = keywords[end].span.start;
        let body = &keywords[1..end];

        if let Some(nested) = body
            .iter()
            .find(|m| matches!(m.keyword, Keyword::Case | Keyword::End))
        {
            return Err(CaseError::Syntax(format!(
                "nested CASE is not supported (offset {})",
                nested.span.start
            )));
        }

        let leading = match body.first() {
            Some(m) => &text[body_start..m.span.start],
            None => &text[body_start..body_end],
        };
        if !leading.trim().is_empty() {
            return Err(CaseError::Syntax(format!(
                "unexpected text before first WHEN: '{}'",
                leading.trim()
            )));
        }

        let segment_end = |i: usize| body.get(i).map(|m| m.span.start).unwrap_or(body_end);

        let mut branches = Vec::new();
        let mut else_value = None;
        let mut i = 0;
        while i < body.len() {
            match body[i].keyword {
                Keyword::When => {
                    let then = match body.get(i + 1) {
                        Some(m) if m.keyword == Keyword::Then => m,
                        _ => return Err(CaseError::Syntax("WHEN without THEN".to_string())),
                    };
                    let condition_text = &text[body[i].span.end..then.span.start];
                    let output = clean_output_value(&text[then.span.end..segment_end(i + 2)]);
                    let condition = parse(condition_text).map_err(|e| {
                        CaseError::Syntax(format!("in WHEN '{}': {}", condition_text.trim(), e))
                    })?;
                    branches.push(Branch { condition, output });
                    i += 2;
                }
                Keyword::Else => {
                    if i + 1 != body.len() {
                        return Err(CaseError::Syntax("ELSE must be the last branch".to_string()));
                    }
                    else_value = Some(clean_output_value(&text[body[i].span.end..body_end]));
                    i += 1;
                }
                Keyword::Then => return Err(CaseError::Syntax("THEN without WHEN".to_string())),
                Keyword::Case | Keyword::End => {
                    return Err(CaseError::Syntax("nested CASE is not supported".to_string()))
                }
            }
        }

        debug!(
            "parsed CASE with {} branches, else={}, output column '{}'",
            branches.len(),
            else_value.is_some(),
            output_column
        );

        Ok(Self {
            branches,
            else_value,
            output_column,
        })
    }

    /// Expand every branch into tagged combos
    pub fn expand(&self) -> CaseTable {
        let output_column = self.output_column.as_str();
        let mut combos: Vec<Combo> = Vec::new();
        let mut seen: BTreeSet<String> = BTreeSet::new();

        for (index, branch) in self.branches.iter().enumerate() {
            let mut branch_combos = evaluate(&branch.condition);
            for combo in &mut branch_combos {
                combo.insert(DIRECT_MAPPED_COLUMN, &branch.output);
                combo.insert(output_column, &branch.output);
                seen.extend(combo.keys().map(str::to_string));
            }
            debug!(
                "WHEN branch {} -> '{}' expanded into {} combos",
                index + 1,
                branch.output,
                branch_combos.len()
            );
            combos.extend(branch_combos);
        }

        let mut columns: Vec<String> = seen
            .into_iter()
            .filter(|c| c != DIRECT_MAPPED_COLUMN && c != output_column)
            .collect();

        if let Some(else_value) = &self.else_value {
            let mut wildcard = Combo::new();
            for column in &columns {
                wildcard.insert(column, WILDCARD);
            }
            wildcard.insert(DIRECT_MAPPED_COLUMN, else_value);
            wildcard.insert(output_column, else_value);
            combos.push(wildcard);
        }

        columns.push(DIRECT_MAPPED_COLUMN.to_string());
        columns.push(output_column.to_string());

        CaseTable::new(columns, combos, Some(self.output_column.clone()))
    }
}

/// Parse and expand a CASE block in one step
pub fn parse_case_statement(text: &str) -> Result<CaseTable> {
    Ok(CaseStatement::parse(text)?.expand())
}

/// Whether text looks like a CASE block rather than a bare condition
pub fn is_case_statement(text: &str) -> bool {
    scan_keywords(text.trim())
        .first()
        .map(|m| m.keyword == Keyword::Case && m.span.start == 0)
        .unwrap_or(false)
}

fn scan_keywords(text: &str) -> Vec<KeywordMatch> {
    KEYWORD_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let m = caps.get(1)?;
            let keyword = match m.as_str().to_ascii_lowercase().as_str() {
                "case" => Keyword::Case,
                "when" => Keyword::When,
                "then" => Keyword::Then,
                "else" => Keyword::Else,
                _ => Keyword::End,
            };
            Some(KeywordMatch {
                keyword,
                span: m.range(),
            })
        })
        .collect()
}

fn clean_output_value(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combo(pairs: &[(&str, &str)]) -> Combo {
        Combo::from_pairs(pairs)
    }

    #[test]
    fn test_when_else_with_alias() {
        let table = parse_case_statement("CASE WHEN c1 = 'v1' THEN 'a' ELSE 'b' END AS tier").unwrap();
        assert_eq!(
            table.combos(),
            &[
                combo(&[("c1", "v1"), ("direct mapped", "a"), ("tier", "a")]),
                combo(&[("c1", "*"), ("direct mapped", "b"), ("tier", "b")]),
            ]
        );
        assert_eq!(table.columns(), &["c1", "direct mapped", "tier"]);
        assert_eq!(table.output_column(), Some("tier"));
    }

    #[test]
    fn test_letter_case_is_preserved() {
        let table =
            parse_case_statement("Case When Region = 'EU' Then 'Senior' Else 'Junior' End As TierName")
                .unwrap();
        assert_eq!(table.output_column(), Some("TierName"));
        assert_eq!(table.columns(), &["Region", "direct mapped", "TierName"]);
        assert_eq!(table.combos()[0].get("Region"), Some("EU"));
        assert_eq!(table.combos()[0].get("TierName"), Some("Senior"));
        assert_eq!(table.combos()[1].get("direct mapped"), Some("Junior"));
    }

    #[test]
    fn test_default_output_column() {
        let table = parse_case_statement("case when c1 = 'x' then 'y' end").unwrap();
        assert_eq!(table.columns(), &["c1", "direct mapped", "output"]);
        assert_eq!(table.combos().len(), 1);
        assert_eq!(table.combos()[0].get("output"), Some("y"));
    }

    #[test]
    fn test_multiple_branches_and_sorted_columns() {
        let text = "
            case
              when c2 = 'v1' and c1 = 'v2' then 'mapped1'
              when c1 = 'v3' or c3 = 'v4' then 'mapped2'
              else 'default_val'
            end as output_column
        ";
        let table = parse_case_statement(text).unwrap();
        assert_eq!(
            table.columns(),
            &["c1", "c2", "c3", "direct mapped", "output_column"]
        );
        assert_eq!(
            table.combos(),
            &[
                combo(&[("c2", "v1"), ("c1", "v2"), ("direct mapped", "mapped1"), ("output_column", "mapped1")]),
                combo(&[("c1", "v3"), ("direct mapped", "mapped2"), ("output_column", "mapped2")]),
                combo(&[("c3", "v4"), ("direct mapped", "mapped2"), ("output_column", "mapped2")]),
                combo(&[
                    ("c1", "*"),
                    ("c2", "*"),
                    ("c3", "*"),
                    ("direct mapped", "default_val"),
                    ("output_column", "default_val"),
                ]),
            ]
        );
    }

    #[test]
    fn test_tagged_comparisons_in_branches() {
        let text = "
            case
              when age >= 30 and salary < 5000 then 'tier1'
              when age < 30 or salary >= 10000 then 'tier2'
              else 'other'
            end as tier
        ";
        let table = parse_case_statement(text).unwrap();
        let rows: Vec<Option<&str>> = table.combos().iter().map(|c| c.get("age")).collect();
        assert_eq!(rows, vec![Some(">= 30"), Some("< 30"), None, Some("*")]);
    }

    #[test]
    fn test_conflicting_branch_yields_no_rows() {
        let table =
            parse_case_statement("CASE WHEN c1 = 'a' AND c1 = 'b' THEN 'x' ELSE 'y' END").unwrap();
        assert_eq!(table.combos().len(), 1);
        assert_eq!(table.columns(), &["direct mapped", "output"]);
    }

    #[test]
    fn test_keywords_inside_literals_are_ignored() {
        let table =
            parse_case_statement("CASE WHEN c1 = 'when then end' THEN 'else' END AS out").unwrap();
        assert_eq!(table.combos()[0].get("c1"), Some("when then end"));
        assert_eq!(table.combos()[0].get("out"), Some("else"));
    }

    #[test]
    fn test_output_value_case_is_kept() {
        let table = parse_case_statement("CASE WHEN c1 = 'x' THEN \"Mapped\" END AS Out").unwrap();
        assert_eq!(table.combos()[0].get("Out"), Some("Mapped"));
    }

    #[test]
    fn test_missing_case_is_precondition_error() {
        let err = parse_case_statement("WHEN c1 = 'a' THEN 'b' END").unwrap_err();
        assert_eq!(err, CaseError::Precondition("Must start with CASE".to_string()));
    }

    #[test]
    fn test_missing_end_is_precondition_error() {
        let err = parse_case_statement("CASE WHEN c1 = 'a' THEN 'b'").unwrap_err();
        assert_eq!(err, CaseError::Precondition("Missing END".to_string()));
    }

    #[test]
    fn test_when_without_then() {
        let err = parse_case_statement("CASE WHEN c1 = 'a' END").unwrap_err();
        assert!(matches!(err, CaseError::Syntax(_)));
    }

    #[test]
    fn test_else_must_be_last() {
        let err = parse_case_statement("CASE ELSE 'x' WHEN c1 = 'a' THEN 'b' END").unwrap_err();
        assert!(matches!(err, CaseError::Syntax(_)));
    }

    #[test]
    fn test_bad_branch_condition() {
        let err = parse_case_statement("CASE WHEN c1 IN 'a' THEN 'b' END").unwrap_err();
        assert!(err.to_string().contains("in WHEN"));
    }

    #[test]
    fn test_is_case_statement() {
        assert!(is_case_statement("  Case when a = 1 then 2 end"));
        assert!(!is_case_statement("a = 1"));
        assert!(!is_case_statement("cased = 1"));
    }

    #[test]
    fn test_parsed_statement_structure() {
        let stmt = CaseStatement::parse("CASE WHEN a = 1 THEN 'x' WHEN b = 2 THEN 'y' END AS z").unwrap();
        assert_eq!(stmt.branches.len(), 2);
        assert_eq!(stmt.branches[1].output, "y");
        assert_eq!(stmt.else_value, None);
        assert_eq!(stmt.output_column, "z");
    }
}
