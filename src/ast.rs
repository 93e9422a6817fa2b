// ABOUTME: Expression AST for blox programs, plus the display forms used in error messages

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Gt,
    Eq,
    And,
    Or,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Gt => ">",
            CmpOp::Eq => "==",
            CmpOp::And => "and",
            CmpOp::Or => "or",
        }
    }
}

/// The four user-visible relations a group constraint can request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Below,
    Above,
    LeftOf,
    RightOf,
}

impl ConstraintKind {
    pub fn phrase(self) -> &'static str {
        match self {
            ConstraintKind::Below => "is below",
            ConstraintKind::Above => "is above",
            ConstraintKind::LeftOf => "is left of",
            ConstraintKind::RightOf => "is right of",
        }
    }
}

/// One `*left is <relation> *right` entry in a group expression
#[derive(Debug, Clone, PartialEq)]
pub struct GroupConstraint {
    pub left: String,
    pub kind: ConstraintKind,
    pub right: String,
}

impl fmt::Display for GroupConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "*{} {} *{}", self.left, self.kind.phrase(), self.right)
    }
}

/// Every expression variant the front end can produce.
///
/// Literal nodes keep the original token so synthesized values can carry it;
/// other nodes derive their literal tag from the display form below.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntLit {
        value: i64,
        literal: String,
    },
    BoolLit {
        value: bool,
        literal: String,
    },
    StrLit {
        value: String,
        literal: String,
    },
    Name(String),
    Assign {
        name: String,
        expr: Box<Expr>,
    },
    Block(Vec<Expr>),
    Arith {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Compare {
        op: CmpOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Concat {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Loop {
        iterator: String,
        start: Box<Expr>,
        stop: Box<Expr>,
        step: Box<Expr>,
        body: Box<Expr>,
    },
    Print(Box<Expr>),
    FnDecl {
        name: String,
        params: Vec<String>,
        body: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
    /// Guard/body clauses in order; the first is the `if`, the rest are `elif`s
    If {
        clauses: Vec<(Expr, Expr)>,
        else_body: Option<Box<Expr>>,
    },
    ListLit(Vec<Expr>),
    ListGet {
        list: Box<Expr>,
        index: Box<Expr>,
    },
    ListDel {
        list: Box<Expr>,
        index: Box<Expr>,
    },
    ListAdd {
        list: Box<Expr>,
        value: Box<Expr>,
    },
    ListLen(Box<Expr>),
    BoxNew {
        id: String,
    },
    GroupNew {
        items: Box<Expr>,
        constraints: Vec<GroupConstraint>,
    },
    Htmlify {
        layout: Box<Expr>,
        stem: String,
    },
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::IntLit { literal, .. }
            | Expr::BoolLit { literal, .. }
            | Expr::StrLit { literal, .. } => write!(f, "{}", literal),
            Expr::Name(name) => write!(f, "{}", name),
            Expr::Assign { name, expr } => write!(f, "{} = {}", name, expr),
            Expr::Block(exprs) => {
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", expr)?;
                }
                Ok(())
            }
            Expr::Arith { op, left, right } => write!(f, "{} {} {}", left, op.symbol(), right),
            Expr::Compare { op, left, right } => write!(f, "{} {} {}", left, op.symbol(), right),
            Expr::Concat { left, right } => write!(f, "{} ++ {}", left, right),
            Expr::Loop {
                iterator,
                start,
                stop,
                step,
                body,
            } => write!(
                f,
                "for {} in ({}, {}, {}) {{ {} }}",
                iterator, start, stop, step, body
            ),
            Expr::Print(expr) => write!(f, "print({})", expr),
            Expr::FnDecl { name, params, body } => {
                write!(f, "function {}({}) {{ {} }}", name, params.join(", "), body)
            }
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::If { clauses, else_body } => {
                for (i, (guard, body)) in clauses.iter().enumerate() {
                    let kw = if i == 0 { "if" } else { " elif" };
                    write!(f, "{} ({}) {{ {} }}", kw, guard, body)?;
                }
                if let Some(body) = else_body {
                    write!(f, " else {{ {} }}", body)?;
                }
                Ok(())
            }
            Expr::ListLit(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Expr::ListGet { list, index } => write!(f, "{}.get({})", list, index),
            Expr::ListDel { list, index } => write!(f, "{}.del({})", list, index),
            Expr::ListAdd { list, value } => write!(f, "{}.add({})", list, value),
            Expr::ListLen(list) => write!(f, "{}.len", list),
            Expr::BoxNew { id } => write!(f, "Box(\"{}\")", id),
            Expr::GroupNew { items, constraints } => {
                write!(f, "Group({} : [", items)?;
                for (i, constraint) in constraints.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", constraint)?;
                }
                write!(f, "])")
            }
            Expr::Htmlify { layout, stem } => write!(f, "{}.htmlify(\"{}\")", layout, stem),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(value: i64) -> Expr {
        Expr::IntLit {
            value,
            literal: value.to_string(),
        }
    }

    #[test]
    fn test_arith_display() {
        let expr = Expr::Arith {
            op: ArithOp::Add,
            left: Box::new(int(5)),
            right: Box::new(int(3)),
        };
        assert_eq!(expr.to_string(), "5 + 3");
    }

    #[test]
    fn test_assign_display() {
        let expr = Expr::Assign {
            name: "x".to_string(),
            expr: Box::new(int(5)),
        };
        assert_eq!(expr.to_string(), "x = 5");
    }

    #[test]
    fn test_loop_display() {
        let expr = Expr::Loop {
            iterator: "i".to_string(),
            start: Box::new(int(0)),
            stop: Box::new(int(5)),
            step: Box::new(int(1)),
            body: Box::new(Expr::Block(vec![])),
        };
        assert_eq!(expr.to_string(), "for i in (0, 5, 1) {  }");
    }

    #[test]
    fn test_list_method_display() {
        let expr = Expr::ListLen(Box::new(Expr::Name("v".to_string())));
        assert_eq!(expr.to_string(), "v.len");

        let expr = Expr::ListGet {
            list: Box::new(Expr::Name("v".to_string())),
            index: Box::new(int(2)),
        };
        assert_eq!(expr.to_string(), "v.get(2)");
    }

    #[test]
    fn test_group_constraint_display() {
        let constraint = GroupConstraint {
            left: "a".to_string(),
            kind: ConstraintKind::Below,
            right: "b".to_string(),
        };
        assert_eq!(constraint.to_string(), "*a is below *b");
    }
}
