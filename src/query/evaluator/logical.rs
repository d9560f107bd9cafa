use super::{EvaluationContext, ExpressionEvaluator};
use crate::core::{ClassSchema, PartCountError, Result, Row, Value};
use crate::query::ast::{BinaryOp, Expr};

/// AND / OR / NOT with SQL three-valued logic.
pub struct LogicalEvaluator;

impl ExpressionEvaluator for LogicalEvaluator {
    fn name(&self) -> &'static str {
        "LOGICAL"
    }

    fn can_evaluate(&self, expr: &Expr) -> bool {
        matches!(
            expr,
            Expr::Not(_)
                | Expr::BinaryOp {
                    op: BinaryOp::And | BinaryOp::Or,
                    ..
                }
        )
    }

    fn evaluate(
        &self,
        expr: &Expr,
        row: &Row,
        schema: &ClassSchema,
        context: &EvaluationContext<'_>,
    ) -> Result<Value> {
        match expr {
            Expr::Not(inner) => {
                let value = truth(context.evaluate(inner, row, schema)?)?;
                Ok(value.map(|b| Value::Boolean(!b)).unwrap_or(Value::Null))
            }
            Expr::BinaryOp { left, op, right } => {
                let left = truth(context.evaluate(left, row, schema)?)?;

                // Short-circuit before touching the right-hand side.
                match (op, left) {
                    (BinaryOp::And, Some(false)) => return Ok(Value::Boolean(false)),
                    (BinaryOp::Or, Some(true)) => return Ok(Value::Boolean(true)),
                    _ => {}
                }

                let right = truth(context.evaluate(right, row, schema)?)?;
                let result = match (op, left, right) {
                    (BinaryOp::And, Some(true), Some(true)) => Some(true),
                    (BinaryOp::And, _, Some(false)) => Some(false),
                    (BinaryOp::Or, _, Some(true)) => Some(true),
                    (BinaryOp::Or, Some(false), Some(false)) => Some(false),
                    _ => None,
                };
                Ok(result.map(Value::Boolean).unwrap_or(Value::Null))
            }
            _ => unreachable!("LogicalEvaluator called with wrong expression"),
        }
    }
}

fn truth(value: Value) -> Result<Option<bool>> {
    match value {
        Value::Boolean(b) => Ok(Some(b)),
        Value::Null => Ok(None),
        other => Err(PartCountError::TypeMismatch(format!(
            "Expected a boolean condition, got {} {}",
            other.type_name(),
            other
        ))),
    }
}
