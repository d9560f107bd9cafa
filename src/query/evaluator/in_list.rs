use super::{EvaluationContext, ExpressionEvaluator};
use crate::core::{ClassSchema, PartCountError, Result, Row, Value};
use crate::query::ast::Expr;
use std::cmp::Ordering;

pub struct InListEvaluator;

impl ExpressionEvaluator for InListEvaluator {
    fn name(&self) -> &'static str {
        "IN_LIST"
    }

    fn can_evaluate(&self, expr: &Expr) -> bool {
        matches!(expr, Expr::In { .. } | Expr::InSet { .. })
    }

    fn evaluate(
        &self,
        expr: &Expr,
        row: &Row,
        schema: &ClassSchema,
        context: &EvaluationContext<'_>,
    ) -> Result<Value> {
        let (expr, list, negated) = match expr {
            Expr::In { expr, list, negated } => (expr, list, negated),
            Expr::InSet {
                expr,
                keys,
                negated,
            } => {
                let found = match context.evaluate(expr, row, schema)? {
                    Value::Null => return Ok(Value::Null),
                    Value::Integer(i) => keys.contains(&i),
                    Value::Float(f) => f.fract() == 0.0 && keys.contains(&(f as i64)),
                    other => {
                        return Err(PartCountError::TypeMismatch(format!(
                            "Cannot compare {} with an integer list",
                            other.type_name()
                        )));
                    }
                };
                return Ok(Value::Boolean(found != *negated));
            }
            _ => unreachable!("InListEvaluator called with non-IN expression"),
        };

        let left = context.evaluate(expr, row, schema)?;
        if left.is_null() {
            return Ok(Value::Null);
        }

        let mut saw_null = false;

        for item in list {
            let right = context.evaluate(item, row, schema)?;
            if right.is_null() {
                saw_null = true;
                continue;
            }
            if left.compare(&right)? == Ordering::Equal {
                return Ok(Value::Boolean(!*negated));
            }
        }

        if saw_null {
            return Ok(Value::Null);
        }

        Ok(Value::Boolean(*negated))
    }
}
