pub mod comparison;
pub mod in_list;
pub mod is_null;
pub mod logical;

use crate::core::{ClassSchema, PartCountError, Result, Row, Value};
use crate::query::ast::Expr;

/// Evaluates one family of where-clause expressions against a stored row.
pub trait ExpressionEvaluator: Send + Sync {
    fn name(&self) -> &'static str;

    fn can_evaluate(&self, expr: &Expr) -> bool;

    fn evaluate(
        &self,
        expr: &Expr,
        row: &Row,
        schema: &ClassSchema,
        context: &EvaluationContext<'_>,
    ) -> Result<Value>;
}

pub struct EvaluationContext<'a> {
    registry: &'a EvaluatorRegistry,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(registry: &'a EvaluatorRegistry) -> Self {
        Self { registry }
    }

    pub fn evaluate(&self, expr: &Expr, row: &Row, schema: &ClassSchema) -> Result<Value> {
        match expr {
            Expr::Column(name) => {
                let idx = schema.find_field_index(name).ok_or_else(|| {
                    PartCountError::ColumnNotFound(name.clone(), schema.name().to_string())
                })?;
                return Ok(row[idx].clone());
            }
            Expr::Literal(val) => {
                return Ok(val.clone());
            }
            _ => {}
        }

        if let Some(evaluator) = self.registry.find_evaluator(expr) {
            return evaluator.evaluate(expr, row, schema, self);
        }

        Err(PartCountError::execution(format!(
            "No evaluator found for expression: {}",
            expr
        )))
    }
}

pub struct EvaluatorRegistry {
    evaluators: Vec<Box<dyn ExpressionEvaluator>>,
}

impl EvaluatorRegistry {
    pub fn new() -> Self {
        Self {
            evaluators: Vec::new(),
        }
    }

    pub fn register(&mut self, evaluator: Box<dyn ExpressionEvaluator>) {
        tracing::trace!(evaluator = evaluator.name(), "registered evaluator");
        self.evaluators.push(evaluator);
    }

    pub fn with_default_evaluators() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(logical::LogicalEvaluator));
        registry.register(Box::new(comparison::ComparisonEvaluator));
        registry.register(Box::new(in_list::InListEvaluator));
        registry.register(Box::new(is_null::IsNullEvaluator));
        registry
    }

    fn find_evaluator(&self, expr: &Expr) -> Option<&dyn ExpressionEvaluator> {
        self.evaluators
            .iter()
            .find(|ev| ev.can_evaluate(expr))
            .map(|boxed| &**boxed)
    }
}

impl Default for EvaluatorRegistry {
    fn default() -> Self {
        Self::with_default_evaluators()
    }
}
