//! Assumption predicates attached to problem symbols.
//!
//! Accepted shapes, possibly joined with `&`:
//!
//! * relations between expressions: `x > 0`, `0 <= t`, `0 < x < 1`, `n != 0`
//! * sympy constructors: `Symbol('x', positive=True, integer=True)`
//! * query form: `Q.positive(x)`
//! * bare flags: `positive`, `real`

use drill_ast::{is_identifier, Context, ExprId, RelOp};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, multispace0},
    combinator::{all_consuming, map, value},
    multi::many0,
    sequence::{delimited, preceded, separated_pair, terminated, tuple},
    IResult,
};

use crate::error::ParseError;
use crate::parser::parse_with_symbols;

/// Flags understood by the assumption resolver.
pub const KNOWN_FLAGS: &[&str] = &[
    "real",
    "positive",
    "negative",
    "nonnegative",
    "nonpositive",
    "nonzero",
    "zero",
    "integer",
    "rational",
    "finite",
    "commutative",
    "complex",
    "even",
    "odd",
    "prime",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Relation {
        lhs: ExprId,
        op: RelOp,
        rhs: ExprId,
    },
    /// Flags set on `symbol`, or on the declaring key when `symbol` is `None`.
    Flags {
        symbol: Option<String>,
        flags: Vec<(String, bool)>,
    },
}

/// Parse one declaration into its conjuncts.
///
/// Names accepted by `declared` are parsed as plain symbols even when they
/// collide with builtin constants.
pub fn parse_predicate<F>(
    input: &str,
    ctx: &mut Context,
    declared: F,
) -> Result<Vec<Predicate>, ParseError>
where
    F: Fn(&str) -> bool + Copy,
{
    let mut out = Vec::new();
    for conjunct in split_top_level(input, '&') {
        let conjunct = conjunct.trim();
        if conjunct.is_empty() {
            return Err(ParseError::InvalidAssumption(input.trim().to_string()));
        }
        parse_conjunct(conjunct, ctx, declared, &mut out)?;
    }
    Ok(out)
}

fn parse_conjunct<F>(
    text: &str,
    ctx: &mut Context,
    declared: F,
    out: &mut Vec<Predicate>,
) -> Result<(), ParseError>
where
    F: Fn(&str) -> bool + Copy,
{
    if let Ok((_, (symbol, flags))) = all_consuming(symbol_constructor)(text) {
        out.push(Predicate::Flags {
            symbol: Some(symbol.to_string()),
            flags: check_flags(flags)?,
        });
        return Ok(());
    }

    if let Ok((_, (flag, symbol))) = all_consuming(query)(text) {
        out.push(Predicate::Flags {
            symbol: Some(symbol.to_string()),
            flags: check_flags(vec![(flag, true)])?,
        });
        return Ok(());
    }

    if is_identifier(text) && KNOWN_FLAGS.contains(&text) {
        out.push(Predicate::Flags {
            symbol: None,
            flags: vec![(text.to_string(), true)],
        });
        return Ok(());
    }

    let (operands, ops) = split_relations(text);
    if ops.is_empty() {
        return Err(ParseError::InvalidAssumption(text.to_string()));
    }
    let mut ids = Vec::with_capacity(operands.len());
    for operand in operands {
        ids.push(parse_with_symbols(operand, ctx, declared)?);
    }
    for (i, op) in ops.into_iter().enumerate() {
        out.push(Predicate::Relation {
            lhs: ids[i],
            op,
            rhs: ids[i + 1],
        });
    }
    Ok(())
}

fn check_flags(flags: Vec<(&str, bool)>) -> Result<Vec<(String, bool)>, ParseError> {
    flags
        .into_iter()
        .map(|(name, on)| {
            if KNOWN_FLAGS.contains(&name) {
                Ok((name.to_string(), on))
            } else {
                Err(ParseError::InvalidAssumption(format!(
                    "unknown assumption flag '{}'",
                    name
                )))
            }
        })
        .collect()
}

fn ws<'a, O>(
    inner: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    delimited(multispace0, inner, multispace0)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    let (rest, name) = take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)?;
    if is_identifier(name) {
        Ok((rest, name))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Alpha,
        )))
    }
}

fn quoted_identifier(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('\''), identifier, char('\'')),
        delimited(char('"'), identifier, char('"')),
    ))(input)
}

fn boolean(input: &str) -> IResult<&str, bool> {
    alt((value(true, tag("True")), value(false, tag("False"))))(input)
}

// Symbol('x', positive=True, integer=True)
fn symbol_constructor(input: &str) -> IResult<&str, (&str, Vec<(&str, bool)>)> {
    let keyword = separated_pair(ws(identifier), char('='), ws(boolean));
    map(
        tuple((
            ws(tag("Symbol")),
            char('('),
            ws(quoted_identifier),
            many0(preceded(char(','), keyword)),
            terminated(char(')'), multispace0),
        )),
        |(_, _, name, flags, _)| (name, flags),
    )(input)
}

// Q.positive(x)
fn query(input: &str) -> IResult<&str, (&str, &str)> {
    map(
        tuple((
            ws(tag("Q.")),
            identifier,
            char('('),
            ws(identifier),
            terminated(char(')'), multispace0),
        )),
        |(_, flag, _, symbol, _)| (flag, symbol),
    )(input)
}

/// Split on `sep` outside of parentheses.
fn split_top_level(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Break `0 < x <= 1` into operands and the operators between them.
fn split_relations(text: &str) -> (Vec<&str>, Vec<RelOp>) {
    let bytes = text.as_bytes();
    let mut operands = Vec::new();
    let mut ops = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let two = bytes.get(i..i + 2);
        let found = match (bytes[i], two) {
            (b'(', _) => {
                depth += 1;
                None
            }
            (b')', _) => {
                depth -= 1;
                None
            }
            _ if depth != 0 => None,
            (_, Some(b"<=")) => Some((RelOp::Leq, 2)),
            (_, Some(b">=")) => Some((RelOp::Geq, 2)),
            (_, Some(b"!=")) => Some((RelOp::Neq, 2)),
            (_, Some(b"==")) => Some((RelOp::Eq, 2)),
            (b'<', _) => Some((RelOp::Lt, 1)),
            (b'>', _) => Some((RelOp::Gt, 1)),
            _ => None,
        };
        match found {
            Some((op, width)) => {
                operands.push(&text[start..i]);
                ops.push(op);
                i += width;
                start = i;
            }
            None => i += 1,
        }
    }
    operands.push(&text[start..]);
    (operands, ops)
}
