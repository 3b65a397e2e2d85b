//! Condition evaluator
//!
//! Expands an AST into every combo that satisfies it.

use crate::condition::ast::Expression;
use crate::condition::combo::Combo;
use crate::condition::parser::parse;
use crate::error::Result;

/// Evaluate an AST into its satisfying combos, left-to-right depth-first
pub fn evaluate(expr: &Expression) -> Vec<Combo> {
    match expr {
        Expression::Condition(cond) => cond
            .values
            .iter()
            .map(|value| Combo::single(&cond.column, value))
            .collect(),
        Expression::And(terms) => {
            let mut terms = terms.iter();
            let first = match terms.next() {
                Some(term) => evaluate(term),
                None => return Vec::new(),
            };
            terms.fold(first, |acc, term| {
                if acc.is_empty() {
                    acc
                } else {
                    merge_and(&acc, &evaluate(term))
                }
            })
        }
        Expression::Or(terms) => terms.iter().flat_map(evaluate).collect(),
    }
}

/// Cross product of two combo sets, dropping pairs that disagree on a column
pub fn merge_and(left: &[Combo], right: &[Combo]) -> Vec<Combo> {
    left.iter()
        .flat_map(|l| right.iter().filter_map(move |r| l.merge(r)))
        .collect()
}

/// Parse and evaluate a condition string
pub fn expand(condition: &str) -> Result<Vec<Combo>> {
    let ast = parse(condition)?;
    Ok(evaluate(&ast))
}
