use crate::core::Value;
use std::collections::BTreeSet;
use std::fmt;

/// Where-clause expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(String),

    Literal(Value),

    BinaryOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    Not(Box<Expr>),

    /// IN list check
    In {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },

    /// IN over integer literals only, looked up by key
    InSet {
        expr: Box<Expr>,
        keys: BTreeSet<i64>,
        negated: bool,
    },

    /// IS NULL check
    IsNull {
        expr: Box<Expr>,
        negated: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,
}

impl Expr {
    /// Every column name the expression reads.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Column(name) => out.push(name),
            Expr::Literal(_) => {}
            Expr::BinaryOp { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Expr::Not(expr) | Expr::IsNull { expr, .. } | Expr::InSet { expr, .. } => {
                expr.collect_columns(out)
            }
            Expr::In { expr, list, .. } => {
                expr.collect_columns(out);
                for item in list {
                    item.collect_columns(out);
                }
            }
        }
    }

    /// Replace every IN list made only of integer literals with an
    /// [`Expr::InSet`].
    pub fn index_in_lists(self) -> Expr {
        match self {
            Expr::In {
                expr,
                list,
                negated,
            } => {
                let keys: Option<BTreeSet<i64>> = list
                    .iter()
                    .map(|item| match item {
                        Expr::Literal(Value::Integer(i)) => Some(*i),
                        _ => None,
                    })
                    .collect();
                let expr = Box::new(expr.index_in_lists());
                match keys {
                    Some(keys) => Expr::InSet {
                        expr,
                        keys,
                        negated,
                    },
                    None => Expr::In {
                        expr,
                        list: list.into_iter().map(Expr::index_in_lists).collect(),
                        negated,
                    },
                }
            }
            Expr::BinaryOp { left, op, right } => Expr::BinaryOp {
                left: Box::new(left.index_in_lists()),
                op,
                right: Box::new(right.index_in_lists()),
            },
            Expr::Not(expr) => Expr::Not(Box::new(expr.index_in_lists())),
            Expr::IsNull { expr, negated } => Expr::IsNull {
                expr: Box::new(expr.index_in_lists()),
                negated,
            },
            other => other,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(name) => write!(f, "{}", name),
            Expr::Literal(Value::Text(s)) => write!(f, "'{}'", s.replace('\'', "''")),
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::BinaryOp { left, op, right } => write!(f, "({} {} {})", left, op, right),
            Expr::Not(expr) => write!(f, "NOT {}", expr),
            Expr::In { expr, list, negated } => {
                let items: Vec<String> = list.iter().map(|e| e.to_string()).collect();
                write!(
                    f,
                    "{} {}IN ({})",
                    expr,
                    if *negated { "NOT " } else { "" },
                    items.join(",")
                )
            }
            Expr::InSet {
                expr,
                keys,
                negated,
            } => {
                let items: Vec<String> = keys.iter().map(i64::to_string).collect();
                write!(
                    f,
                    "{} {}IN ({})",
                    expr,
                    if *negated { "NOT " } else { "" },
                    items.join(",")
                )
            }
            Expr::IsNull { expr, negated } => {
                write!(f, "{} IS {}NULL", expr, if *negated { "NOT " } else { "" })
            }
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
        };
        f.write_str(symbol)
    }
}
