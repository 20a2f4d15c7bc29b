use std::cmp::Ordering;

use crate::table::{Row, Schema, Table};
use crate::value::Value;

/// Comparison operator carried by a condition leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl CmpOp {
    /// Maps the ordering of two same-kind values onto this operator.
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering.is_eq(),
            Self::Ne => ordering.is_ne(),
            Self::Gt => ordering.is_gt(),
            Self::Lt => ordering.is_lt(),
            Self::Ge => ordering.is_ge(),
            Self::Le => ordering.is_le(),
        }
    }
}

/// A WHERE expression: comparisons at the leaves, AND/OR nodes above them.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Cmp {
        column: String,
        op: CmpOp,
        value: Value,
    },
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
}

/// Evaluates a condition against one row of one table.
///
/// No condition at all matches every row. A leaf whose column is unknown,
/// whose stored value is an absent string, or whose stored and literal
/// values differ in kind evaluates to `false` rather than erroring.
pub fn evaluate_single(row: &Row, schema: &Schema, condition: Option<&Condition>) -> bool {
    match condition {
        None => true,
        Some(condition) => eval_single(row, schema, condition),
    }
}

fn eval_single(row: &Row, schema: &Schema, condition: &Condition) -> bool {
    match condition {
        Condition::Cmp { column, op, value } => {
            let Some(index) = schema.position(column) else {
                return false;
            };
            match row.values.get(index) {
                Some(stored) => compare(stored, *op, value),
                None => false,
            }
        }
        Condition::And(left, right) => {
            eval_single(row, schema, left) && eval_single(row, schema, right)
        }
        Condition::Or(left, right) => {
            eval_single(row, schema, left) || eval_single(row, schema, right)
        }
    }
}

/// Evaluates a condition against a row tuple, one row per table in FROM-list
/// order.
///
/// A leaf column resolves against the first table whose schema contains it;
/// later tables holding the same name are never consulted. A name no table
/// knows evaluates to `false`.
pub fn evaluate_multi(rows: &[&Row], tables: &[&Table], condition: Option<&Condition>) -> bool {
    match condition {
        None => true,
        Some(condition) => eval_multi(rows, tables, condition),
    }
}

fn eval_multi(rows: &[&Row], tables: &[&Table], condition: &Condition) -> bool {
    match condition {
        Condition::Cmp { column, op, value } => {
            for (row, table) in rows.iter().zip(tables) {
                if let Some(index) = table.schema.position(column) {
                    return match row.values.get(index) {
                        Some(stored) => compare(stored, *op, value),
                        None => false,
                    };
                }
            }
            false
        }
        Condition::And(left, right) => {
            eval_multi(rows, tables, left) && eval_multi(rows, tables, right)
        }
        Condition::Or(left, right) => {
            eval_multi(rows, tables, left) || eval_multi(rows, tables, right)
        }
    }
}

/// Compares a stored value against a literal.
///
/// Values of different kinds never match, and an absent string on either
/// side never matches, whatever the operator. Integers compare with signed
/// arithmetic; strings compare ASCII-case-insensitively, the same collation
/// identifiers use.
fn compare(stored: &Value, op: CmpOp, literal: &Value) -> bool {
    match (stored, literal) {
        (Value::Int(left), Value::Int(right)) => op.matches(left.cmp(right)),
        (Value::Str(Some(left)), Value::Str(Some(right))) => {
            op.matches(cmp_ignore_ascii_case(left, right))
        }
        _ => false,
    }
}

fn cmp_ignore_ascii_case(left: &str, right: &str) -> Ordering {
    let left = left.bytes().map(|b| b.to_ascii_lowercase());
    let right = right.bytes().map(|b| b.to_ascii_lowercase());
    left.cmp(right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnDef;

    fn schema() -> Schema {
        Schema {
            columns: vec![
                ColumnDef {
                    name: "a".into(),
                    data_type: "INT".into(),
                },
                ColumnDef {
                    name: "b".into(),
                    data_type: "CHAR(10)".into(),
                },
            ],
        }
    }

    fn row(a: i64, b: &str) -> Row {
        Row {
            values: vec![Value::Int(a), Value::string(b)],
        }
    }

    fn leaf(column: &str, op: CmpOp, value: Value) -> Condition {
        Condition::Cmp {
            column: column.into(),
            op,
            value,
        }
    }

    #[test]
    fn test_no_condition_matches_everything() {
        assert!(evaluate_single(&row(1, "x"), &schema(), None));
    }

    #[test]
    fn test_integer_operators() {
        let s = schema();
        let r = row(5, "x");

        assert!(evaluate_single(&r, &s, Some(&leaf("a", CmpOp::Eq, Value::Int(5)))));
        assert!(evaluate_single(&r, &s, Some(&leaf("a", CmpOp::Ne, Value::Int(4)))));
        assert!(evaluate_single(&r, &s, Some(&leaf("a", CmpOp::Gt, Value::Int(4)))));
        assert!(evaluate_single(&r, &s, Some(&leaf("a", CmpOp::Lt, Value::Int(6)))));
        assert!(evaluate_single(&r, &s, Some(&leaf("a", CmpOp::Ge, Value::Int(5)))));
        assert!(evaluate_single(&r, &s, Some(&leaf("a", CmpOp::Le, Value::Int(5)))));
        assert!(!evaluate_single(&r, &s, Some(&leaf("a", CmpOp::Gt, Value::Int(5)))));
    }

    #[test]
    fn test_signed_integer_comparison() {
        let s = schema();
        let r = row(-3, "x");

        assert!(evaluate_single(&r, &s, Some(&leaf("a", CmpOp::Lt, Value::Int(0)))));
        assert!(evaluate_single(&r, &s, Some(&leaf("a", CmpOp::Gt, Value::Int(-10)))));
    }

    #[test]
    fn test_string_comparison_ignores_case() {
        let s = schema();
        let r = row(1, "Apple");

        assert!(evaluate_single(&r, &s, Some(&leaf("b", CmpOp::Eq, Value::string("apple")))));
        assert!(evaluate_single(&r, &s, Some(&leaf("b", CmpOp::Lt, Value::string("BANANA")))));
        assert!(!evaluate_single(&r, &s, Some(&leaf("b", CmpOp::Gt, Value::string("apple")))));
    }

    #[test]
    fn test_kind_mismatch_is_false() {
        let s = schema();
        let r = row(1, "1");

        // Even Ne stays false when the kinds differ.
        assert!(!evaluate_single(&r, &s, Some(&leaf("a", CmpOp::Eq, Value::string("1")))));
        assert!(!evaluate_single(&r, &s, Some(&leaf("a", CmpOp::Ne, Value::string("1")))));
        assert!(!evaluate_single(&r, &s, Some(&leaf("b", CmpOp::Eq, Value::Int(1)))));
    }

    #[test]
    fn test_absent_string_never_matches() {
        let s = schema();
        let r = Row {
            values: vec![Value::Int(1), Value::Str(None)],
        };

        assert!(!evaluate_single(&r, &s, Some(&leaf("b", CmpOp::Eq, Value::string("x")))));
        assert!(!evaluate_single(&r, &s, Some(&leaf("b", CmpOp::Ne, Value::string("x")))));
        assert!(!evaluate_single(&r, &s, Some(&leaf("b", CmpOp::Lt, Value::string("x")))));
    }

    #[test]
    fn test_unknown_column_is_false() {
        let s = schema();
        let r = row(1, "x");

        assert!(!evaluate_single(&r, &s, Some(&leaf("missing", CmpOp::Eq, Value::Int(1)))));
    }

    #[test]
    fn test_and_or_composition() {
        let s = schema();
        let cond = Condition::Or(
            Box::new(Condition::And(
                Box::new(leaf("a", CmpOp::Eq, Value::Int(1))),
                Box::new(leaf("b", CmpOp::Eq, Value::string("x"))),
            )),
            Box::new(leaf("a", CmpOp::Eq, Value::Int(3))),
        );

        assert!(evaluate_single(&row(1, "x"), &s, Some(&cond)));
        assert!(evaluate_single(&row(3, "y"), &s, Some(&cond)));
        assert!(!evaluate_single(&row(1, "y"), &s, Some(&cond)));
        assert!(!evaluate_single(&row(2, "x"), &s, Some(&cond)));
    }

    #[test]
    fn test_multi_table_first_match_wins() {
        let t1 = Table::new(
            "t1".into(),
            Schema {
                columns: vec![ColumnDef {
                    name: "id".into(),
                    data_type: "INT".into(),
                }],
            },
        );
        let t2 = Table::new(
            "t2".into(),
            Schema {
                columns: vec![
                    ColumnDef {
                        name: "id".into(),
                        data_type: "INT".into(),
                    },
                    ColumnDef {
                        name: "price".into(),
                        data_type: "INT".into(),
                    },
                ],
            },
        );
        let r1 = Row {
            values: vec![Value::Int(1)],
        };
        let r2 = Row {
            values: vec![Value::Int(2), Value::Int(100)],
        };
        let rows: Vec<&Row> = vec![&r1, &r2];
        let tables: Vec<&Table> = vec![&t1, &t2];

        // "id" exists in both tables; the first one is consulted.
        assert!(evaluate_multi(
            &rows,
            &tables,
            Some(&leaf("id", CmpOp::Eq, Value::Int(1)))
        ));
        assert!(!evaluate_multi(
            &rows,
            &tables,
            Some(&leaf("id", CmpOp::Eq, Value::Int(2)))
        ));

        // "price" only exists in the second table.
        assert!(evaluate_multi(
            &rows,
            &tables,
            Some(&leaf("price", CmpOp::Eq, Value::Int(100)))
        ));

        // A name no table knows is false.
        assert!(!evaluate_multi(
            &rows,
            &tables,
            Some(&leaf("ghost", CmpOp::Eq, Value::Int(1)))
        ));
    }
}
