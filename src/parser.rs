// ABOUTME: Parser module turning blox source text into AST expressions using nom combinators

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1},
    combinator::opt,
    IResult, Parser,
};

use crate::ast::{ArithOp, CmpOp, ConstraintKind, Expr, GroupConstraint};

/// Words the grammar reserves; none of them can be an identifier
const KEYWORDS: &[&str] = &[
    "if", "elif", "else", "for", "in", "function", "print", "true", "false", "and", "or", "is",
    "below", "above", "left", "right", "of", "Box", "Group",
];

// ============================================================================
// Lexical helpers
// ============================================================================

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn fail(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag))
}

/// Skip whitespace and // line comments
fn ws(input: &str) -> IResult<&str, ()> {
    let mut remaining = input.trim_start();
    while let Some(rest) = remaining.strip_prefix("//") {
        remaining = match rest.find('\n') {
            Some(pos) => rest[pos + 1..].trim_start(),
            None => "",
        };
    }
    Ok((remaining, ()))
}

/// Match a reserved word, refusing to split an identifier
fn keyword<'a>(input: &'a str, kw: &str) -> IResult<&'a str, ()> {
    let (rest, _) = tag(kw)(input)?;
    if rest.chars().next().is_some_and(is_ident_char) {
        return Err(fail(input));
    }
    Ok((rest, ()))
}

fn ident(input: &str) -> IResult<&str, String> {
    let (rest, name) = take_while1(is_ident_char)(input)?;
    if !name.chars().next().is_some_and(is_ident_start) || KEYWORDS.contains(&name) {
        return Err(fail(input));
    }
    Ok((rest, name.to_string()))
}

/// Double-quoted string content, quotes trimmed, no escapes
fn quoted_string(input: &str) -> IResult<&str, &str> {
    let (input, _) = char('"')(input)?;
    let (input, content) = take_while(|c| c != '"')(input)?;
    let (input, _) = char('"')(input)?;
    Ok((input, content))
}

// ============================================================================
// Literals
// ============================================================================

fn int_literal(input: &str) -> IResult<&str, Expr> {
    let (rest, digits) = digit1(input)?;
    let value = digits.parse::<i64>().map_err(|_| fail(input))?;
    Ok((
        rest,
        Expr::IntLit {
            value,
            literal: digits.to_string(),
        },
    ))
}

fn bool_literal(input: &str) -> IResult<&str, Expr> {
    if let Ok((rest, _)) = keyword(input, "true") {
        return Ok((
            rest,
            Expr::BoolLit {
                value: true,
                literal: "true".to_string(),
            },
        ));
    }
    let (rest, _) = keyword(input, "false")?;
    Ok((
        rest,
        Expr::BoolLit {
            value: false,
            literal: "false".to_string(),
        },
    ))
}

fn string_literal(input: &str) -> IResult<&str, Expr> {
    let (rest, content) = quoted_string(input)?;
    Ok((
        rest,
        Expr::StrLit {
            value: content.to_string(),
            literal: format!("\"{}\"", content),
        },
    ))
}

fn list_literal(input: &str) -> IResult<&str, Expr> {
    let (input, _) = char('[')(input)?;
    let (input, elements) = expr_list(input, ']')?;
    Ok((input, Expr::ListLit(elements)))
}

/// Comma-separated expressions up to and including the closing delimiter.
/// A trailing comma is tolerated.
fn expr_list(input: &str, close: char) -> IResult<&str, Vec<Expr>> {
    let mut elements = Vec::new();
    let (mut remaining, _) = ws(input)?;

    loop {
        if let Ok((rest, _)) = char::<_, nom::error::Error<&str>>(close)(remaining) {
            return Ok((rest, elements));
        }

        let (rest, expr) = expression(remaining)?;
        elements.push(expr);

        let (rest, _) = ws(rest)?;
        remaining = match char::<_, nom::error::Error<&str>>(',')(rest) {
            Ok((rest, _)) => {
                let (rest, _) = ws(rest)?;
                rest
            }
            Err(_) => rest,
        };
    }
}

// ============================================================================
// Expressions, loosest binding first: or, and, comparison, ++, additive,
// multiplicative, unary minus, postfix, primary
// ============================================================================

pub(crate) fn expression(input: &str) -> IResult<&str, Expr> {
    or_expr(input)
}

fn or_expr(input: &str) -> IResult<&str, Expr> {
    let (mut input, mut expr) = and_expr(input)?;
    loop {
        let (rest, _) = ws(input)?;
        match keyword(rest, "or") {
            Ok((rest, _)) => {
                let (rest, _) = ws(rest)?;
                let (rest, right) = and_expr(rest)?;
                expr = Expr::Compare {
                    op: CmpOp::Or,
                    left: Box::new(expr),
                    right: Box::new(right),
                };
                input = rest;
            }
            Err(_) => return Ok((input, expr)),
        }
    }
}

fn and_expr(input: &str) -> IResult<&str, Expr> {
    let (mut input, mut expr) = cmp_expr(input)?;
    loop {
        let (rest, _) = ws(input)?;
        match keyword(rest, "and") {
            Ok((rest, _)) => {
                let (rest, _) = ws(rest)?;
                let (rest, right) = cmp_expr(rest)?;
                expr = Expr::Compare {
                    op: CmpOp::And,
                    left: Box::new(expr),
                    right: Box::new(right),
                };
                input = rest;
            }
            Err(_) => return Ok((input, expr)),
        }
    }
}

fn cmp_expr(input: &str) -> IResult<&str, Expr> {
    let (mut input, mut expr) = concat_expr(input)?;
    loop {
        let (rest, _) = ws(input)?;

        let matched = if let Ok((rest, _)) = tag::<_, _, nom::error::Error<&str>>("==")(rest) {
            Some((rest, CmpOp::Eq))
        } else if let Ok((rest, _)) = char::<_, nom::error::Error<&str>>('<')(rest) {
            Some((rest, CmpOp::Lt))
        } else if let Ok((rest, _)) = char::<_, nom::error::Error<&str>>('>')(rest) {
            Some((rest, CmpOp::Gt))
        } else {
            None
        };

        match matched {
            Some((rest, op)) => {
                let (rest, _) = ws(rest)?;
                let (rest, right) = concat_expr(rest)?;
                expr = Expr::Compare {
                    op,
                    left: Box::new(expr),
                    right: Box::new(right),
                };
                input = rest;
            }
            None => return Ok((input, expr)),
        }
    }
}

fn concat_expr(input: &str) -> IResult<&str, Expr> {
    let (mut input, mut expr) = add_expr(input)?;
    loop {
        let (rest, _) = ws(input)?;
        match tag::<_, _, nom::error::Error<&str>>("++")(rest) {
            Ok((rest, _)) => {
                let (rest, _) = ws(rest)?;
                let (rest, right) = add_expr(rest)?;
                expr = Expr::Concat {
                    left: Box::new(expr),
                    right: Box::new(right),
                };
                input = rest;
            }
            Err(_) => return Ok((input, expr)),
        }
    }
}

fn add_expr(input: &str) -> IResult<&str, Expr> {
    let (mut input, mut expr) = mul_expr(input)?;
    loop {
        let (rest, _) = ws(input)?;

        // A lone '+': two in a row is the concat operator
        let matched = if let Ok((rest, _)) = char::<_, nom::error::Error<&str>>('+')(rest) {
            if rest.starts_with('+') {
                None
            } else {
                Some((rest, ArithOp::Add))
            }
        } else if let Ok((rest, _)) = char::<_, nom::error::Error<&str>>('-')(rest) {
            Some((rest, ArithOp::Sub))
        } else {
            None
        };

        match matched {
            Some((rest, op)) => {
                let (rest, _) = ws(rest)?;
                let (rest, right) = mul_expr(rest)?;
                expr = Expr::Arith {
                    op,
                    left: Box::new(expr),
                    right: Box::new(right),
                };
                input = rest;
            }
            None => return Ok((input, expr)),
        }
    }
}

fn mul_expr(input: &str) -> IResult<&str, Expr> {
    let (mut input, mut expr) = unary(input)?;
    loop {
        let (rest, _) = ws(input)?;

        let matched = if let Ok((rest, _)) = char::<_, nom::error::Error<&str>>('*')(rest) {
            Some((rest, ArithOp::Mul))
        } else if let Ok((rest, _)) = char::<_, nom::error::Error<&str>>('/')(rest) {
            Some((rest, ArithOp::Div))
        } else {
            None
        };

        match matched {
            Some((rest, op)) => {
                let (rest, _) = ws(rest)?;
                let (rest, right) = unary(rest)?;
                expr = Expr::Arith {
                    op,
                    left: Box::new(expr),
                    right: Box::new(right),
                };
                input = rest;
            }
            None => return Ok((input, expr)),
        }
    }
}

fn unary(input: &str) -> IResult<&str, Expr> {
    if let Ok((rest, _)) = char::<_, nom::error::Error<&str>>('-')(input) {
        let (rest, _) = ws(rest)?;
        let (rest, operand) = unary(rest)?;

        // Fold negation into integer literals; anything else becomes 0 - expr
        let expr = match operand {
            Expr::IntLit { value, literal } => Expr::IntLit {
                value: value.wrapping_neg(),
                literal: format!("-{}", literal),
            },
            other => Expr::Arith {
                op: ArithOp::Sub,
                left: Box::new(Expr::IntLit {
                    value: 0,
                    literal: "0".to_string(),
                }),
                right: Box::new(other),
            },
        };
        return Ok((rest, expr));
    }

    postfix(input)
}

fn postfix(input: &str) -> IResult<&str, Expr> {
    let (mut input, mut expr) = primary(input)?;
    loop {
        let (rest, _) = ws(input)?;
        let Ok((rest, _)) = char::<_, nom::error::Error<&str>>('.')(rest) else {
            return Ok((input, expr));
        };

        if let Ok((rest, _)) = keyword(rest, "len") {
            expr = Expr::ListLen(Box::new(expr));
            input = rest;
        } else if let Ok((rest, _)) = keyword(rest, "get") {
            let (rest, index) = paren_expr(rest)?;
            expr = Expr::ListGet {
                list: Box::new(expr),
                index: Box::new(index),
            };
            input = rest;
        } else if let Ok((rest, _)) = keyword(rest, "del") {
            let (rest, index) = paren_expr(rest)?;
            expr = Expr::ListDel {
                list: Box::new(expr),
                index: Box::new(index),
            };
            input = rest;
        } else if let Ok((rest, _)) = keyword(rest, "add") {
            let (rest, value) = paren_expr(rest)?;
            expr = Expr::ListAdd {
                list: Box::new(expr),
                value: Box::new(value),
            };
            input = rest;
        } else if let Ok((rest, _)) = keyword(rest, "htmlify") {
            let (rest, _) = ws(rest)?;
            let (rest, _) = char('(')(rest)?;
            let (rest, _) = ws(rest)?;
            let (rest, stem) = quoted_string(rest)?;
            let (rest, _) = ws(rest)?;
            let (rest, _) = char(')')(rest)?;
            expr = Expr::Htmlify {
                layout: Box::new(expr),
                stem: stem.to_string(),
            };
            input = rest;
        } else {
            return Err(fail(rest));
        }
    }
}

/// Parenthesized expression with surrounding whitespace tolerated
fn paren_expr(input: &str) -> IResult<&str, Expr> {
    let (input, _) = ws(input)?;
    let (input, _) = char('(')(input)?;
    let (input, _) = ws(input)?;
    let (input, expr) = expression(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char(')')(input)?;
    Ok((input, expr))
}

fn parenthesized(input: &str) -> IResult<&str, Expr> {
    let (input, _) = char('(')(input)?;
    let (input, _) = ws(input)?;
    let (input, expr) = expression(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char(')')(input)?;
    Ok((input, expr))
}

fn primary(input: &str) -> IResult<&str, Expr> {
    alt((
        int_literal,
        bool_literal,
        string_literal,
        list_literal,
        parenthesized,
        box_expr,
        group_expr,
        print_expr,
        call_or_name,
    ))
    .parse(input)
}

fn box_expr(input: &str) -> IResult<&str, Expr> {
    let (input, _) = keyword(input, "Box")?;
    let (input, _) = ws(input)?;
    let (input, _) = char('(')(input)?;
    let (input, _) = ws(input)?;
    let (input, id) = quoted_string(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char(')')(input)?;
    Ok((input, Expr::BoxNew { id: id.to_string() }))
}

fn group_expr(input: &str) -> IResult<&str, Expr> {
    let (input, _) = keyword(input, "Group")?;
    let (input, _) = ws(input)?;
    let (input, _) = char('(')(input)?;
    let (input, _) = ws(input)?;
    let (input, items) = expression(input)?;
    let (input, _) = ws(input)?;

    let (input, constraints) = match char::<_, nom::error::Error<&str>>(':')(input) {
        Ok((rest, _)) => {
            let (rest, _) = ws(rest)?;
            let (rest, _) = char('[')(rest)?;
            constraint_list(rest)?
        }
        Err(_) => (input, Vec::new()),
    };

    let (input, _) = ws(input)?;
    let (input, _) = char(')')(input)?;
    Ok((
        input,
        Expr::GroupNew {
            items: Box::new(items),
            constraints,
        },
    ))
}

/// Comma-separated constraints up to and including the closing bracket
fn constraint_list(input: &str) -> IResult<&str, Vec<GroupConstraint>> {
    let mut constraints = Vec::new();
    let (mut remaining, _) = ws(input)?;

    loop {
        if let Ok((rest, _)) = char::<_, nom::error::Error<&str>>(']')(remaining) {
            return Ok((rest, constraints));
        }

        let (rest, constraint) = group_constraint(remaining)?;
        constraints.push(constraint);

        let (rest, _) = ws(rest)?;
        remaining = match char::<_, nom::error::Error<&str>>(',')(rest) {
            Ok((rest, _)) => {
                let (rest, _) = ws(rest)?;
                rest
            }
            Err(_) => rest,
        };
    }
}

/// `*a is below *b` — the leading stars are decoration and may be omitted
fn group_constraint(input: &str) -> IResult<&str, GroupConstraint> {
    let (input, _) = opt(char('*')).parse(input)?;
    let (input, left) = ident(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = keyword(input, "is")?;
    let (input, _) = ws(input)?;
    let (input, kind) = constraint_kind(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = opt(char('*')).parse(input)?;
    let (input, right) = ident(input)?;
    Ok((input, GroupConstraint { left, kind, right }))
}

fn constraint_kind(input: &str) -> IResult<&str, ConstraintKind> {
    if let Ok((rest, _)) = keyword(input, "below") {
        return Ok((rest, ConstraintKind::Below));
    }
    if let Ok((rest, _)) = keyword(input, "above") {
        return Ok((rest, ConstraintKind::Above));
    }
    if let Ok((rest, _)) = keyword(input, "left") {
        let (rest, _) = ws(rest)?;
        let (rest, _) = keyword(rest, "of")?;
        return Ok((rest, ConstraintKind::LeftOf));
    }
    let (rest, _) = keyword(input, "right")?;
    let (rest, _) = ws(rest)?;
    let (rest, _) = keyword(rest, "of")?;
    Ok((rest, ConstraintKind::RightOf))
}

fn print_expr(input: &str) -> IResult<&str, Expr> {
    let (input, _) = keyword(input, "print")?;
    let (input, operand) = paren_expr(input)?;
    Ok((input, Expr::Print(Box::new(operand))))
}

/// An identifier, or a call when an argument list follows immediately
fn call_or_name(input: &str) -> IResult<&str, Expr> {
    let (rest, name) = ident(input)?;
    if let Ok((rest, _)) = char::<_, nom::error::Error<&str>>('(')(rest) {
        let (rest, args) = expr_list(rest, ')')?;
        return Ok((rest, Expr::Call { name, args }));
    }
    Ok((rest, Expr::Name(name)))
}

// ============================================================================
// Statements
// ============================================================================

fn statement(input: &str) -> IResult<&str, Expr> {
    alt((function_decl, for_loop, if_stmt, assignment, expression)).parse(input)
}

fn assignment(input: &str) -> IResult<&str, Expr> {
    let (rest, name) = ident(input)?;
    let (rest, _) = ws(rest)?;
    let (rest, _) = char('=')(rest)?;
    if rest.starts_with('=') {
        return Err(fail(input));
    }
    let (rest, _) = ws(rest)?;
    let (rest, expr) = expression(rest)?;
    Ok((
        rest,
        Expr::Assign {
            name,
            expr: Box::new(expr),
        },
    ))
}

fn function_decl(input: &str) -> IResult<&str, Expr> {
    let (input, _) = keyword(input, "function")?;
    let (input, _) = ws(input)?;
    let (input, name) = ident(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char('(')(input)?;
    let (input, params) = param_list(input)?;
    let (input, _) = ws(input)?;
    let (input, body) = block(input)?;
    Ok((
        input,
        Expr::FnDecl {
            name,
            params,
            body: Box::new(body),
        },
    ))
}

/// Comma-separated parameter names up to and including the closing paren
fn param_list(input: &str) -> IResult<&str, Vec<String>> {
    let mut params = Vec::new();
    let (mut remaining, _) = ws(input)?;

    loop {
        if let Ok((rest, _)) = char::<_, nom::error::Error<&str>>(')')(remaining) {
            return Ok((rest, params));
        }

        let (rest, name) = ident(remaining)?;
        params.push(name);

        let (rest, _) = ws(rest)?;
        remaining = match char::<_, nom::error::Error<&str>>(',')(rest) {
            Ok((rest, _)) => {
                let (rest, _) = ws(rest)?;
                rest
            }
            Err(_) => rest,
        };
    }
}

fn for_loop(input: &str) -> IResult<&str, Expr> {
    let (input, _) = keyword(input, "for")?;
    let (input, _) = ws(input)?;
    let (input, iterator) = ident(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = keyword(input, "in")?;
    let (input, _) = ws(input)?;
    let (input, _) = char('(')(input)?;
    let (input, _) = ws(input)?;
    let (input, start) = expression(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char(',')(input)?;
    let (input, _) = ws(input)?;
    let (input, stop) = expression(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char(',')(input)?;
    let (input, _) = ws(input)?;
    let (input, step) = expression(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char(')')(input)?;
    let (input, _) = ws(input)?;
    let (input, body) = block(input)?;
    Ok((
        input,
        Expr::Loop {
            iterator,
            start: Box::new(start),
            stop: Box::new(stop),
            step: Box::new(step),
            body: Box::new(body),
        },
    ))
}

fn if_stmt(input: &str) -> IResult<&str, Expr> {
    let (input, _) = keyword(input, "if")?;
    let (input, guard) = paren_expr(input)?;
    let (input, _) = ws(input)?;
    let (mut input, body) = block(input)?;
    let mut clauses = vec![(guard, body)];

    loop {
        let (rest, _) = ws(input)?;
        match keyword(rest, "elif") {
            Ok((rest, _)) => {
                let (rest, guard) = paren_expr(rest)?;
                let (rest, _) = ws(rest)?;
                let (rest, body) = block(rest)?;
                clauses.push((guard, body));
                input = rest;
            }
            Err(_) => break,
        }
    }

    let (rest, _) = ws(input)?;
    let (input, else_body) = match keyword(rest, "else") {
        Ok((rest, _)) => {
            let (rest, _) = ws(rest)?;
            let (rest, body) = block(rest)?;
            (rest, Some(Box::new(body)))
        }
        Err(_) => (input, None),
    };

    Ok((input, Expr::If { clauses, else_body }))
}

fn block(input: &str) -> IResult<&str, Expr> {
    let (input, _) = char('{')(input)?;
    let (input, statements) = statement_list(input, Some('}'))?;
    let (input, _) = char('}')(input)?;
    Ok((input, Expr::Block(statements)))
}

/// Statements separated by optional semicolons, up to (but not consuming) the
/// closing brace, or to end of input at top level
fn statement_list(input: &str, close: Option<char>) -> IResult<&str, Vec<Expr>> {
    let mut statements = Vec::new();
    let (mut remaining, _) = ws(input)?;

    loop {
        let done = match close {
            Some(c) => remaining.starts_with(c),
            None => remaining.is_empty(),
        };
        if done {
            return Ok((remaining, statements));
        }

        let (rest, stmt) = statement(remaining)?;
        statements.push(stmt);

        let (rest, _) = ws(rest)?;
        remaining = match char::<_, nom::error::Error<&str>>(';')(rest) {
            Ok((rest, _)) => {
                let (rest, _) = ws(rest)?;
                rest
            }
            Err(_) => rest,
        };
    }
}

/// Public entry point: a whole program becomes one Block of statements
pub fn parse(input: &str) -> Result<Expr, String> {
    match statement_list(input, None) {
        Ok((_, statements)) => Ok(Expr::Block(statements)),
        Err(e) => Err(format!("{:?}", e)),
    }
}
