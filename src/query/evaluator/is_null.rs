use super::{EvaluationContext, ExpressionEvaluator};
use crate::core::{ClassSchema, Result, Row, Value};
use crate::query::ast::Expr;

pub struct IsNullEvaluator;

impl ExpressionEvaluator for IsNullEvaluator {
    fn name(&self) -> &'static str {
        "IS_NULL"
    }

    fn can_evaluate(&self, expr: &Expr) -> bool {
        matches!(expr, Expr::IsNull { .. })
    }

    fn evaluate(
        &self,
        expr: &Expr,
        row: &Row,
        schema: &ClassSchema,
        context: &EvaluationContext<'_>,
    ) -> Result<Value> {
        let Expr::IsNull { expr, negated } = expr else {
            unreachable!("IsNullEvaluator called with wrong expression");
        };

        let value = context.evaluate(expr, row, schema)?;
        Ok(Value::Boolean(value.is_null() != *negated))
    }
}
