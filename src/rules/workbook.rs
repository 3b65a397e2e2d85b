//! Workbook builder - one sheet per rule

use std::path::Path;

use log::{debug, warn};
use serde::Serialize;

use crate::case::{cells, is_case_statement, parse_case_statement, CaseTable};
use crate::condition::get_or_parse;
use crate::error::{CaseError, Result};
use crate::rules::loader::{load_rules, RuleSet};

/// Legacy spreadsheet limit on sheet name length
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// One rule rendered as a grid of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Build a sheet from an expanded table, optionally reindexed against a schema
    pub fn from_table(name: String, table: &CaseTable, schema: Option<&[String]>) -> Self {
        let columns: Vec<String> = match schema {
            Some(schema) => schema.to_vec(),
            None => table.columns().to_vec(),
        };
        let rows = table
            .combos()
            .iter()
            .map(|combo| cells(combo, &columns))
            .collect();
        Self {
            name,
            columns,
            rows,
        }
    }
}

/// Sheets in rule order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Truncate a rule key to a valid sheet name
pub fn sheet_name(key: &str) -> String {
    key.chars().take(MAX_SHEET_NAME_LEN).collect()
}

/// Expand a rule body: CASE blocks through the statement driver, anything
/// else as a bare condition
pub fn expand_rule(body: &str) -> Result<CaseTable> {
    if is_case_statement(body) {
        parse_case_statement(body)
    } else {
        let ast = get_or_parse(body)?;
        Ok(CaseTable::from_condition(&ast))
    }
}

/// Build a workbook from loaded rules
pub fn build_workbook(rules: &RuleSet, schema: Option<&[String]>) -> Result<Workbook> {
    let mut sheets = Vec::with_capacity(rules.len());
    for rule in rules.iter() {
        let table = expand_rule(&rule.body)
            .map_err(|e| CaseError::InvalidRule(format!("{}: {}", rule.key, e)))?;

        let name = sheet_name(&rule.key);
        if name.len() < rule.key.len() {
            warn!("sheet name for rule '{}' truncated to '{}'", rule.key, name);
        }
        debug!("rule '{}' expanded into {} rows", rule.key, table.combos().len());

        sheets.push(Sheet::from_table(name, &table, schema));
    }
    Ok(Workbook { sheets })
}

/// Load a rule file and build its workbook
pub fn build_workbook_from_file<P: AsRef<Path>>(
    path: P,
    schema: Option<&[String]>,
) -> Result<Workbook> {
    let rules = load_rules(path)?;
    build_workbook(&rules, schema)
}
