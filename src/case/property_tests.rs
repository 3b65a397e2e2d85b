//! Property tests for CASE statement expansion

use proptest::prelude::*;

use crate::case::statement::{parse_case_statement, DIRECT_MAPPED_COLUMN, WILDCARD};
use crate::condition::expand;

// ═══════════════════════════════════════════════════════════════════════════
// Strategy generators for property tests
// ═══════════════════════════════════════════════════════════════════════════

/// Generate a simple branch condition
fn branch_condition_strategy() -> impl Strategy<Value = String> {
    let column = prop_oneof![Just("zeta"), Just("alpha"), Just("t.mid"), Just("beta")];
    let value = prop_oneof![Just("x"), Just("y"), Just("z")];
    (column.clone(), value.clone(), column, value, any::<bool>()).prop_map(
        |(c1, v1, c2, v2, use_or)| {
            let joiner = if use_or { "or" } else { "and" };
            format!("{} = '{}' {} {} in ('{}', 'w')", c1, v1, joiner, c2, v2)
        },
    )
}

/// Generate WHEN branches with their output values
fn branches_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(
        (branch_condition_strategy(), "[a-z]{1,6}"),
        1..=4,
    )
}

fn build_case(branches: &[(String, String)], else_value: Option<&str>, alias: &str) -> String {
    let mut text = String::from("CASE\n");
    for (cond, output) in branches {
        text.push_str(&format!("  WHEN {} THEN '{}'\n", cond, output));
    }
    if let Some(value) = else_value {
        text.push_str(&format!("  ELSE '{}'\n", value));
    }
    text.push_str(&format!("END AS {}", alias));
    text
}

// ═══════════════════════════════════════════════════════════════════════════
// Property Tests
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    /// Row count is the sum of branch expansions plus one for ELSE
    #[test]
    fn prop_row_count(branches in branches_strategy(), with_else in any::<bool>()) {
        let text = build_case(&branches, with_else.then_some("fallback"), "result");
        let table = parse_case_statement(&text).unwrap();
        let expected: usize = branches.iter().map(|(c, _)| expand(c).unwrap().len()).sum();
        prop_assert_eq!(table.combos().len(), expected + usize::from(with_else));
    }

    /// Every row carries the branch output under both output keys
    #[test]
    fn prop_output_keys_agree(branches in branches_strategy()) {
        let text = build_case(&branches, Some("fallback"), "result");
        let table = parse_case_statement(&text).unwrap();
        for combo in table.combos() {
            let direct = combo.get(DIRECT_MAPPED_COLUMN);
            prop_assert!(direct.is_some());
            prop_assert_eq!(direct, combo.get("result"));
        }
    }

    /// Columns are sorted data columns, then the two output columns
    #[test]
    fn prop_column_order(branches in branches_strategy()) {
        let text = build_case(&branches, None, "result");
        let table = parse_case_statement(&text).unwrap();
        let columns = table.columns();
        let n = columns.len();
        prop_assert!(n >= 2);
        prop_assert_eq!(columns[n - 2].as_str(), DIRECT_MAPPED_COLUMN);
        prop_assert_eq!(columns[n - 1].as_str(), "result");
        let data = &columns[..n - 2];
        prop_assert!(data.windows(2).all(|w| w[0] < w[1]), "{:?}", data);
    }

    /// The wildcard row marks every data column with "*"
    #[test]
    fn prop_else_row_is_wildcard(branches in branches_strategy()) {
        let text = build_case(&branches, Some("fallback"), "result");
        let table = parse_case_statement(&text).unwrap();
        let columns = table.columns();
        let last = table.combos().last().unwrap();
        for column in &columns[..columns.len() - 2] {
            prop_assert_eq!(last.get(column), Some(WILDCARD));
        }
        prop_assert_eq!(last.get("result"), Some("fallback"));
        prop_assert_eq!(last.len(), columns.len());
    }
}
