use super::{EvaluationContext, ExpressionEvaluator};
use crate::core::{ClassSchema, Result, Row, Value};
use crate::query::ast::{BinaryOp, Expr};
use std::cmp::Ordering;

pub struct ComparisonEvaluator;

impl ExpressionEvaluator for ComparisonEvaluator {
    fn name(&self) -> &'static str {
        "COMPARISON"
    }

    fn can_evaluate(&self, expr: &Expr) -> bool {
        if let Expr::BinaryOp { op, .. } = expr {
            matches!(
                op,
                BinaryOp::Eq
                    | BinaryOp::NotEq
                    | BinaryOp::Lt
                    | BinaryOp::LtEq
                    | BinaryOp::Gt
                    | BinaryOp::GtEq
            )
        } else {
            false
        }
    }

    fn evaluate(
        &self,
        expr: &Expr,
        row: &Row,
        schema: &ClassSchema,
        context: &EvaluationContext<'_>,
    ) -> Result<Value> {
        let Expr::BinaryOp { left, op, right } = expr else {
            unreachable!("ComparisonEvaluator called with non-binary expression");
        };

        let left_val = context.evaluate(left, row, schema)?;
        let right_val = context.evaluate(right, row, schema)?;

        if left_val.is_null() || right_val.is_null() {
            return Ok(Value::Null);
        }

        let ordering = left_val.compare(&right_val)?;
        let result = match op {
            BinaryOp::Eq => ordering == Ordering::Equal,
            BinaryOp::NotEq => ordering != Ordering::Equal,
            BinaryOp::Lt => ordering == Ordering::Less,
            BinaryOp::LtEq => ordering != Ordering::Greater,
            BinaryOp::Gt => ordering == Ordering::Greater,
            BinaryOp::GtEq => ordering != Ordering::Less,
            BinaryOp::And | BinaryOp::Or => unreachable!(),
        };
        Ok(Value::Boolean(result))
    }
}
