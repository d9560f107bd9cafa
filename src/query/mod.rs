//! Where clauses that scope a cursor to a subset of rows.

pub mod adapter;
pub mod ast;
pub mod evaluator;

pub use adapter::WhereClauseParser;
pub use ast::{BinaryOp, Expr};

use crate::core::{ClassSchema, PartCountError, Result, Row, Value};
use evaluator::{EvaluationContext, EvaluatorRegistry};

/// A parsed where clause whose column references have been checked against
/// one feature class schema.
pub struct Predicate {
    expr: Expr,
    registry: EvaluatorRegistry,
}

impl Predicate {
    /// `None` when `sql` is absent or blank: the cursor then visits every row.
    pub fn compile(sql: Option<&str>, schema: &ClassSchema) -> Result<Option<Self>> {
        let Some(sql) = sql.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        let expr = WhereClauseParser::new().parse(sql)?.index_in_lists();
        for column in expr.columns() {
            if schema.find_field_index(column).is_none() {
                return Err(PartCountError::ColumnNotFound(
                    column.to_string(),
                    schema.name().to_string(),
                ));
            }
        }

        Ok(Some(Self {
            expr,
            registry: EvaluatorRegistry::with_default_evaluators(),
        }))
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Only a definite TRUE selects the row; FALSE and NULL both reject it.
    pub fn matches(&self, row: &Row, schema: &ClassSchema) -> Result<bool> {
        let context = EvaluationContext::new(&self.registry);
        match context.evaluate(&self.expr, row, schema)? {
            Value::Boolean(b) => Ok(b),
            Value::Null => Ok(false),
            other => Err(PartCountError::TypeMismatch(format!(
                "Where clause must evaluate to a boolean, got {} {}",
                other.type_name(),
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Field, FieldType, ShapeType};

    fn schema() -> ClassSchema {
        ClassSchema::standard("parcels", ShapeType::Polygon)
            .with_field(Field::new("NAME", FieldType::Text))
            .unwrap()
            .with_field(Field::new("AREA", FieldType::Double))
            .unwrap()
    }

    fn row(oid: i64, name: Option<&str>, area: f64) -> Row {
        vec![
            Value::Integer(oid),
            Value::Null,
            name.map(Value::from).unwrap_or(Value::Null),
            Value::Float(area),
        ]
    }

    fn matches(sql: &str, row: &Row) -> bool {
        Predicate::compile(Some(sql), &schema())
            .unwrap()
            .unwrap()
            .matches(row, &schema())
            .unwrap()
    }

    #[test]
    fn test_blank_query_selects_everything() {
        assert!(Predicate::compile(None, &schema()).unwrap().is_none());
        assert!(Predicate::compile(Some("   "), &schema()).unwrap().is_none());
    }

    #[test]
    fn test_in_list_on_object_id() {
        let r = row(3, Some("lot"), 1.0);
        assert!(matches("OBJECTID IN (2,3)", &r));
        assert!(!matches("OBJECTID IN (1,2)", &r));
        assert!(matches("objectid NOT IN (1,2)", &r));
    }

    #[test]
    fn test_integer_in_list_compiled_to_key_set() {
        let predicate = Predicate::compile(Some("OBJECTID IN (3,1,2)"), &schema())
            .unwrap()
            .unwrap();
        match predicate.expr() {
            Expr::InSet { keys, negated, .. } => {
                assert_eq!(keys.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
                assert!(!negated);
            }
            other => panic!("expected a key set, got {:?}", other),
        }

        let mixed = Predicate::compile(Some("OBJECTID IN (1, NULL)"), &schema())
            .unwrap()
            .unwrap();
        assert!(matches!(mixed.expr(), Expr::In { .. }));
    }

    #[test]
    fn test_large_in_list() {
        let keys: Vec<String> = (1..=50_000i64)
            .filter(|k| k % 2 == 0)
            .map(|k| k.to_string())
            .collect();
        let sql = format!("OBJECTID IN ({})", keys.join(","));
        let predicate = Predicate::compile(Some(&sql), &schema()).unwrap().unwrap();

        let selected = (1..=50_000)
            .filter(|&oid| predicate.matches(&row(oid, None, 0.0), &schema()).unwrap())
            .count();
        assert_eq!(selected, 25_000);

        assert!(matches("AREA IN (5, 6) AND OBJECTID NOT IN (2, 4)", &row(1, None, 5.0)));
        assert!(!matches("AREA IN (5, 6)", &row(1, None, 5.5)));
    }

    #[test]
    fn test_null_semantics() {
        let r = row(1, None, 5.0);
        assert!(!matches("NAME = 'lot'", &r));
        assert!(!matches("NOT NAME = 'lot'", &r));
        assert!(matches("NAME IS NULL", &r));
        assert!(matches("NAME IS NULL OR AREA > 100", &r));
        assert!(!matches("OBJECTID IN (NULL, 7)", &r));
    }

    #[test]
    fn test_mixed_numeric_comparison() {
        let r = row(1, Some("lot"), 5.0);
        assert!(matches("AREA >= 5 AND AREA < 5.5", &r));
        assert!(matches("NAME <> 'x' AND OBJECTID = 1", &r));
    }

    #[test]
    fn test_unknown_column_rejected_at_compile() {
        let result = Predicate::compile(Some("OID@ IN (1)"), &schema());
        assert!(result.is_err());
        let result = Predicate::compile(Some("MISSING = 1"), &schema());
        assert!(matches!(result, Err(PartCountError::ColumnNotFound(_, _))));
    }

    #[test]
    fn test_type_mismatch_surfaces() {
        let predicate = Predicate::compile(Some("NAME = 1"), &schema()).unwrap().unwrap();
        let r = row(1, Some("lot"), 5.0);
        assert!(predicate.matches(&r, &schema()).is_err());
    }
}
