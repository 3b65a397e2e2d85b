//! Abstract Syntax Tree for condition expressions

use smallvec::SmallVec;

/// Values carried by a single condition; IN lists are usually short
pub type Values = SmallVec<[String; 4]>;

/// AST node for condition expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Single condition like "c1 = 'v1'" or "c1 IN ('a','b')"
    Condition(Condition),
    /// AND of two or more terms, left to right
    And(Vec<Expression>),
    /// OR of two or more terms, left to right
    Or(Vec<Expression>),
}

impl Expression {
    /// Columns referenced by this expression, in first-seen order, without duplicates
    pub fn columns(&self) -> Vec<String> {
        let mut columns = Vec::new();
        self.collect_columns(&mut columns);
        columns
    }

    fn collect_columns(&self, columns: &mut Vec<String>) {
        match self {
            Expression::Condition(cond) => {
                if !columns.iter().any(|c| c == &cond.column) {
                    columns.push(cond.column.clone());
                }
            }
            Expression::And(terms) | Expression::Or(terms) => {
                for term in terms {
                    term.collect_columns(columns);
                }
            }
        }
    }
}

/// Leaf condition: one column and the values that satisfy it
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Column name with any qualifier prefix removed
    pub column: String,
    pub operator: Operator,
    pub values: Values,
}

impl Condition {
    /// Build a condition, normalizing the column name
    pub fn new(column: &str, operator: Operator, values: Values) -> Self {
        Self {
            column: normalize_column_name(column).to_string(),
            operator,
            values,
        }
    }
}

/// How a condition's values were produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `column = value`
    Equal,
    /// `column IN (v1, v2, ...)`
    In,
    /// Any other comparison. The single value is an opaque tag such as
    /// `">= 30"`; ranges are not evaluated.
    Tagged(Comparison),
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Equal (=, ==)
    Equal,
    /// Not equal (!=, <>)
    NotEqual,
    /// Less than (<)
    Less,
    /// Greater than (>)
    Greater,
    /// Less than or equal (<=)
    LessEqual,
    /// Greater than or equal (>=, =>)
    GreaterEqual,
}

impl Comparison {
    /// Canonical symbol
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Equal => "=",
            Comparison::NotEqual => "!=",
            Comparison::Less => "<",
            Comparison::Greater => ">",
            Comparison::LessEqual => "<=",
            Comparison::GreaterEqual => ">=",
        }
    }
}

/// Strip any qualifier prefix (`trd.c2` -> `c2`)
#[inline]
pub fn normalize_column_name(column: &str) -> &str {
    match column.rfind('.') {
        Some(pos) => &column[pos + 1..],
        None => column,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("trd.c2"), "c2");
        assert_eq!(normalize_column_name("db.schema.tbl.col"), "col");
        assert_eq!(normalize_column_name("plain"), "plain");
        assert_eq!(normalize_column_name("@p1"), "@p1");
    }

    #[test]
    fn test_condition_new_normalizes() {
        let cond = Condition::new("t.c1", Operator::Equal, smallvec!["v".to_string()]);
        assert_eq!(cond.column, "c1");
    }

    #[test]
    fn test_columns_first_seen_order() {
        let leaf = |c: &str| {
            Expression::Condition(Condition::new(c, Operator::Equal, smallvec!["x".to_string()]))
        };
        let expr = Expression::Or(vec![
            Expression::And(vec![leaf("b"), leaf("a.a")]),
            leaf("b"),
        ]);
        assert_eq!(expr.columns(), vec!["b", "a"]);
    }
}
