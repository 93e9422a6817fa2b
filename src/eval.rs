// ABOUTME: Evaluator executing blox expressions against an environment and a constraint solver

use crate::ast::{ArithOp, CmpOp, ConstraintKind, Expr, GroupConstraint};
use crate::env::Environment;
use crate::error::EvalError;
use crate::layout::{BoxItem, GroupItem, LayoutNode};
use crate::render;
use crate::solver::ConstraintSystem;
use crate::value::Value;

/// Everything an evaluation mutates: the symbol table and the solver.
/// Both are passed explicitly; there is no module-level state.
pub struct Runtime {
    pub env: Environment,
    pub solver: ConstraintSystem,
}

impl Runtime {
    pub fn new() -> Self {
        Runtime {
            env: Environment::new(),
            solver: ConstraintSystem::new(),
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluates one expression. Strictly eager, left-to-right in argument
/// position; errors propagate to the driver uncaught.
pub fn eval(expr: &Expr, rt: &mut Runtime) -> Result<Value, EvalError> {
    match expr {
        Expr::IntLit { value, literal } => Ok(Value::Int {
            value: *value,
            literal: literal.clone(),
        }),
        Expr::BoolLit { value, literal } => Ok(Value::Bool {
            value: *value,
            literal: literal.clone(),
        }),
        Expr::StrLit { value, literal } => Ok(Value::Str {
            value: value.clone(),
            literal: literal.clone(),
        }),

        Expr::Name(name) => rt.env.lookup(name).map(Value::clone),

        Expr::Assign { name, expr } => {
            let value = eval(expr, rt)?;
            rt.env.bind(name.clone(), value);
            Ok(Value::Unit)
        }

        Expr::Block(exprs) => {
            let mut last = Value::Unit;
            for expr in exprs {
                last = eval(expr, rt)?;
            }
            Ok(last)
        }

        Expr::Arith { op, left, right } => eval_arith(expr, *op, left, right, rt),
        Expr::Compare { op, left, right } => eval_compare(*op, left, right, rt),
        Expr::Concat { left, right } => eval_concat(left, right, rt),

        Expr::Loop {
            iterator,
            start,
            stop,
            step,
            body,
        } => eval_loop(iterator, start, stop, step, body, rt),

        Expr::Print(operand) => {
            let value = eval(operand, rt)?;
            println!("{}", value);
            Ok(Value::Unit)
        }

        Expr::FnDecl { name, params, body } => {
            rt.env.bind(
                name.clone(),
                Value::Function {
                    name: name.clone(),
                    params: params.clone(),
                    body: (**body).clone(),
                },
            );
            Ok(Value::Unit)
        }

        Expr::Call { name, args } => eval_call(name, args, rt),

        Expr::If { clauses, else_body } => eval_if(clauses, else_body.as_deref(), rt),

        Expr::ListLit(elements) => {
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                values.push(eval(element, rt)?);
            }
            Ok(Value::List(values))
        }

        Expr::ListGet { list, index } => eval_list_get(list, index, rt),
        Expr::ListDel { list, index } => eval_list_del(list, index, rt),
        Expr::ListAdd { list, value } => eval_list_add(list, value, rt),
        Expr::ListLen(list) => eval_list_len(list, rt),

        Expr::BoxNew { id } => Ok(Value::Box(BoxItem::new(&mut rt.solver, id.clone())?)),
        Expr::GroupNew { items, constraints } => eval_group(items, constraints, rt),
        Expr::Htmlify { layout, stem } => eval_htmlify(layout, stem, rt),
    }
}

// ============================================================================
// Operators
// ============================================================================

fn eval_arith(
    node: &Expr,
    op: ArithOp,
    left: &Expr,
    right: &Expr,
    rt: &mut Runtime,
) -> Result<Value, EvalError> {
    let lhs = expect_int(eval(left, rt)?, op.symbol())?;
    let rhs = expect_int(eval(right, rt)?, op.symbol())?;

    let value = match op {
        ArithOp::Add => lhs.wrapping_add(rhs),
        ArithOp::Sub => lhs.wrapping_sub(rhs),
        ArithOp::Mul => lhs.wrapping_mul(rhs),
        ArithOp::Div => {
            if rhs == 0 {
                return Err(EvalError::value_error("division by zero"));
            }
            // truncates toward zero
            lhs.wrapping_div(rhs)
        }
    };

    // Synthesized integers carry the expression's display form as their literal
    Ok(Value::Int {
        value,
        literal: node.to_string(),
    })
}

fn eval_compare(op: CmpOp, left: &Expr, right: &Expr, rt: &mut Runtime) -> Result<Value, EvalError> {
    let lhs = eval(left, rt)?;
    let rhs = eval(right, rt)?;

    let result = match (&lhs, &rhs) {
        (Value::Int { value: a, .. }, Value::Int { value: b, .. }) => match op {
            CmpOp::Lt => a < b,
            CmpOp::Gt => a > b,
            CmpOp::Eq => a == b,
            CmpOp::And | CmpOp::Or => return Err(EvalError::type_error(op.symbol(), "bool", &lhs)),
        },
        (Value::Str { value: a, .. }, Value::Str { value: b, .. }) => match op {
            CmpOp::Lt => a < b,
            CmpOp::Gt => a > b,
            CmpOp::Eq => a == b,
            CmpOp::And | CmpOp::Or => return Err(EvalError::type_error(op.symbol(), "bool", &lhs)),
        },
        (Value::Bool { value: a, .. }, Value::Bool { value: b, .. }) => match op {
            CmpOp::Eq => a == b,
            CmpOp::And => *a && *b,
            CmpOp::Or => *a || *b,
            CmpOp::Lt | CmpOp::Gt => {
                return Err(EvalError::type_error(op.symbol(), "int or string", &lhs))
            }
        },
        _ => {
            return Err(EvalError::TypeError {
                context: op.symbol().to_string(),
                expected: "operands of one comparable type",
                actual: format!("{} and {}", lhs.type_name(), rhs.type_name()),
            })
        }
    };

    Ok(Value::bool(result))
}

fn eval_concat(left: &Expr, right: &Expr, rt: &mut Runtime) -> Result<Value, EvalError> {
    let lhs = match eval(left, rt)? {
        Value::Str { value, .. } => value,
        other => return Err(EvalError::type_error("++", "string", &other)),
    };
    let rhs = match eval(right, rt)? {
        Value::Str { value, .. } => value,
        other => return Err(EvalError::type_error("++", "string", &other)),
    };

    let value = format!("{}{}", lhs, rhs);
    Ok(Value::Str {
        literal: value.clone(),
        value,
    })
}

// ============================================================================
// Control flow
// ============================================================================

fn eval_loop(
    iterator: &str,
    start: &Expr,
    stop: &Expr,
    step: &Expr,
    body: &Expr,
    rt: &mut Runtime,
) -> Result<Value, EvalError> {
    let start = expect_int(eval(start, rt)?, "for")?;
    let stop = expect_int(eval(stop, rt)?, "for")?;
    let step = expect_int(eval(step, rt)?, "for")?;

    if step == 0 && start != stop {
        return Err(EvalError::value_error(
            "for: step of 0 never reaches the stop bound",
        ));
    }

    let mut i = start;
    if step < 0 {
        while i > stop {
            rt.env.bind(iterator.to_string(), Value::int(i));
            eval(body, rt)?;
            i = i.wrapping_add(step);
        }
    } else {
        while i < stop {
            rt.env.bind(iterator.to_string(), Value::int(i));
            eval(body, rt)?;
            i = i.wrapping_add(step);
        }
    }

    rt.env.remove(iterator);
    Ok(Value::Unit)
}

fn eval_if(
    clauses: &[(Expr, Expr)],
    else_body: Option<&Expr>,
    rt: &mut Runtime,
) -> Result<Value, EvalError> {
    for (guard, body) in clauses {
        let condition = eval(guard, rt)?;
        match condition {
            Value::Bool { value: true, .. } => return eval(body, rt),
            Value::Bool { value: false, .. } => {}
            other => return Err(EvalError::type_error("if", "bool", &other)),
        }
    }

    match else_body {
        Some(body) => eval(body, rt),
        None => Ok(Value::Unit),
    }
}

fn eval_call(name: &str, args: &[Expr], rt: &mut Runtime) -> Result<Value, EvalError> {
    let callee = rt.env.lookup(name)?.clone();
    let (params, body) = match callee {
        Value::Function { params, body, .. } => (params, body),
        other => return Err(EvalError::type_error(name, "function", &other)),
    };

    if params.len() != args.len() {
        return Err(EvalError::ArityError {
            function: name.to_string(),
            expected: params.len(),
            actual: args.len(),
        });
    }

    // Arguments evaluate in the caller's environment
    let mut bindings = Vec::with_capacity(args.len());
    for (param, arg) in params.iter().zip(args) {
        bindings.push((param.clone(), eval(arg, rt)?));
    }

    // A parameterless body runs directly against the caller's environment;
    // with parameters it runs against a sub-scope whose mutations stay local.
    if bindings.is_empty() {
        return eval(&body, rt);
    }

    let frame = rt.env.sub_scope(bindings);
    let saved = std::mem::replace(&mut rt.env, frame);
    let result = eval(&body, rt);
    rt.env = saved;
    result
}

// ============================================================================
// Lists
// ============================================================================

fn eval_list_get(list: &Expr, index: &Expr, rt: &mut Runtime) -> Result<Value, EvalError> {
    let elements = expect_list(eval(list, rt)?, "get")?;
    let index = expect_int(eval(index, rt)?, "get")?;
    let i = element_index(index, elements.len())?;
    Ok(elements[i].clone())
}

fn eval_list_del(list: &Expr, index: &Expr, rt: &mut Runtime) -> Result<Value, EvalError> {
    let mut elements = expect_list(eval(list, rt)?, "del")?;
    let index = expect_int(eval(index, rt)?, "del")?;
    let i = element_index(index, elements.len())?;
    elements.remove(i);

    let updated = Value::List(elements);
    rebind_if_name(list, &updated, rt);
    Ok(updated)
}

fn eval_list_add(list: &Expr, value: &Expr, rt: &mut Runtime) -> Result<Value, EvalError> {
    let mut elements = expect_list(eval(list, rt)?, "add")?;
    elements.push(eval(value, rt)?);

    let updated = Value::List(elements);
    rebind_if_name(list, &updated, rt);
    Ok(updated)
}

fn eval_list_len(list: &Expr, rt: &mut Runtime) -> Result<Value, EvalError> {
    let elements = expect_list(eval(list, rt)?, "len")?;
    Ok(Value::int(elements.len() as i64))
}

/// List operations are functional in their return shape; the statement form
/// `name.add(v)` mutates only by rebinding the name. Any other list expression
/// leaves the environment unchanged.
fn rebind_if_name(list: &Expr, updated: &Value, rt: &mut Runtime) {
    if let Expr::Name(name) = list {
        rt.env.bind(name.clone(), updated.clone());
    }
}

fn element_index(index: i64, len: usize) -> Result<usize, EvalError> {
    if index < 0 || index as usize >= len {
        return Err(EvalError::IndexError { index, len });
    }
    Ok(index as usize)
}

// ============================================================================
// Layout
// ============================================================================

fn eval_group(
    items: &Expr,
    constraints: &[GroupConstraint],
    rt: &mut Runtime,
) -> Result<Value, EvalError> {
    // Relational constraints are submitted before the items are collected
    for constraint in constraints {
        let left = resolve_layout(&constraint.left, rt)?;
        let right = resolve_layout(&constraint.right, rt)?;
        let (lf, rf) = (*left.frame(), *right.frame());

        match constraint.kind {
            ConstraintKind::Below => lf.is_below(&rf, &mut rt.solver)?,
            ConstraintKind::Above => lf.is_above(&rf, &mut rt.solver)?,
            ConstraintKind::LeftOf => lf.is_left_of(&rf, &mut rt.solver)?,
            ConstraintKind::RightOf => lf.is_right_of(&rf, &mut rt.solver)?,
        }
    }

    let elements = match eval(items, rt)? {
        Value::List(elements) => elements,
        other => return Err(EvalError::type_error("Group", "list", &other)),
    };

    let mut children = Vec::with_capacity(elements.len());
    for element in elements {
        children.push(expect_layout(element, "Group")?);
    }

    let group = GroupItem::new(&mut rt.solver, children)?;
    Ok(Value::Group(group))
}

/// Resolves a constraint operand. A name bound to a function acts as a layout
/// factory: its body is invoked to obtain the entity.
fn resolve_layout(name: &str, rt: &mut Runtime) -> Result<LayoutNode, EvalError> {
    let value = rt.env.lookup(name)?.clone();
    let value = match value {
        Value::Function { body, .. } => eval(&body, rt)?,
        other => other,
    };
    expect_layout(value, name)
}

fn eval_htmlify(layout: &Expr, stem: &str, rt: &mut Runtime) -> Result<Value, EvalError> {
    let node = expect_layout(eval(layout, rt)?, "htmlify")?;

    let body = render::render_node(&node, &mut rt.solver);
    let path = format!("{}.html", stem);
    std::fs::write(&path, render::document(&body))
        .map_err(|e| EvalError::io_error(format!("writing {}", path), e))?;

    Ok(Value::Unit)
}

// ============================================================================
// Operand checks
// ============================================================================

fn expect_int(value: Value, context: &str) -> Result<i64, EvalError> {
    match value {
        Value::Int { value, .. } => Ok(value),
        other => Err(EvalError::type_error(context, "int", &other)),
    }
}

fn expect_list(value: Value, context: &str) -> Result<Vec<Value>, EvalError> {
    match value {
        Value::List(elements) => Ok(elements),
        other => Err(EvalError::type_error(context, "list", &other)),
    }
}

fn expect_layout(value: Value, context: &str) -> Result<LayoutNode, EvalError> {
    match value {
        Value::Box(item) => Ok(LayoutNode::Box(item)),
        Value::Group(group) => Ok(LayoutNode::Group(group)),
        other => Err(EvalError::type_error(context, "layout entity", &other)),
    }
}
