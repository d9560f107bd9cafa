use super::ast::{BinaryOp, Expr};
use crate::core::{PartCountError, Result, Value};
use sqlparser::ast as sql_ast;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;

/// Parses where-clause text into [`Expr`] using sqlparser's PostgreSQL dialect.
pub struct WhereClauseParser {
    dialect: PostgreSqlDialect,
}

impl WhereClauseParser {
    pub fn new() -> Self {
        Self {
            dialect: PostgreSqlDialect {},
        }
    }

    pub fn parse(&self, sql: &str) -> Result<Expr> {
        let mut parser = Parser::new(&self.dialect)
            .try_with_sql(sql)
            .map_err(|e| PartCountError::ParseError(e.to_string()))?;

        let expr = parser
            .parse_expr()
            .map_err(|e| PartCountError::ParseError(e.to_string()))?;

        let trailing = parser.peek_token();
        if trailing.token != Token::EOF {
            return Err(PartCountError::ParseError(format!(
                "Unexpected '{}' after where clause '{}'",
                trailing.token, sql
            )));
        }

        self.convert(expr)
    }

    fn convert(&self, expr: sql_ast::Expr) -> Result<Expr> {
        match expr {
            sql_ast::Expr::Identifier(ident) => Ok(Expr::Column(ident.value)),
            sql_ast::Expr::Value(val) => Ok(Expr::Literal(self.convert_value(&val.value)?)),
            sql_ast::Expr::Nested(inner) => self.convert(*inner),
            sql_ast::Expr::BinaryOp { left, op, right } => Ok(Expr::BinaryOp {
                left: Box::new(self.convert(*left)?),
                op: self.convert_binary_op(&op)?,
                right: Box::new(self.convert(*right)?),
            }),
            sql_ast::Expr::UnaryOp { op, expr } => match op {
                sql_ast::UnaryOperator::Not => Ok(Expr::Not(Box::new(self.convert(*expr)?))),
                sql_ast::UnaryOperator::Minus => match self.convert(*expr)? {
                    Expr::Literal(Value::Integer(i)) => Ok(Expr::Literal(Value::Integer(-i))),
                    Expr::Literal(Value::Float(f)) => Ok(Expr::Literal(Value::Float(-f))),
                    other => Err(PartCountError::ParseError(format!(
                        "Unary minus is only supported on numeric literals, got {}",
                        other
                    ))),
                },
                sql_ast::UnaryOperator::Plus => self.convert(*expr),
                other => Err(PartCountError::ParseError(format!(
                    "Unsupported unary operator: {}",
                    other
                ))),
            },
            sql_ast::Expr::InList {
                expr,
                list,
                negated,
            } => {
                let converted_list = list
                    .into_iter()
                    .map(|e| self.convert(e))
                    .collect::<Result<Vec<_>>>()?;

                Ok(Expr::In {
                    expr: Box::new(self.convert(*expr)?),
                    list: converted_list,
                    negated,
                })
            }
            sql_ast::Expr::IsNull(e) => Ok(Expr::IsNull {
                expr: Box::new(self.convert(*e)?),
                negated: false,
            }),
            sql_ast::Expr::IsNotNull(e) => Ok(Expr::IsNull {
                expr: Box::new(self.convert(*e)?),
                negated: true,
            }),
            other => Err(PartCountError::ParseError(format!(
                "Unsupported expression in where clause: {}",
                other
            ))),
        }
    }

    fn convert_value(&self, val: &sql_ast::Value) -> Result<Value> {
        match val {
            sql_ast::Value::Number(n, _) => {
                if let Ok(i) = n.parse::<i64>() {
                    Ok(Value::Integer(i))
                } else if let Ok(f) = n.parse::<f64>() {
                    Ok(Value::Float(f))
                } else {
                    Err(PartCountError::TypeMismatch(format!("Invalid number: {}", n)))
                }
            }
            sql_ast::Value::SingleQuotedString(s) => Ok(Value::Text(s.clone())),
            sql_ast::Value::Boolean(b) => Ok(Value::Boolean(*b)),
            sql_ast::Value::Null => Ok(Value::Null),
            _ => Err(PartCountError::ParseError(format!("Unsupported value: {}", val))),
        }
    }

    fn convert_binary_op(&self, op: &sql_ast::BinaryOperator) -> Result<BinaryOp> {
        use sql_ast::BinaryOperator as SqlOp;

        match op {
            SqlOp::Eq => Ok(BinaryOp::Eq),
            SqlOp::NotEq => Ok(BinaryOp::NotEq),
            SqlOp::Lt => Ok(BinaryOp::Lt),
            SqlOp::LtEq => Ok(BinaryOp::LtEq),
            SqlOp::Gt => Ok(BinaryOp::Gt),
            SqlOp::GtEq => Ok(BinaryOp::GtEq),
            SqlOp::And => Ok(BinaryOp::And),
            SqlOp::Or => Ok(BinaryOp::Or),
            _ => Err(PartCountError::ParseError(format!(
                "Unsupported binary operator: {}",
                op
            ))),
        }
    }
}

impl Default for WhereClauseParser {
    fn default() -> Self {
        Self::new()
    }
}
