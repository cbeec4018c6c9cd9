use drill_ast::{Constant, Context, Expr, ExprId};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{digit1, multispace0, one_of},
    combinator::{map, not, opt},
    multi::{fold_many0, separated_list0},
    sequence::{pair, preceded, terminated},
    IResult,
};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::error::ParseError;

/// Deepest parenthesis nesting accepted before parsing starts.
const MAX_NESTING: usize = 128;

/// Largest decimal exponent accepted in scientific notation (`1e300`).
const MAX_DECIMAL_EXPONENT: i64 = 1000;

/// Highest derivative order accepted in `Derivative(f, (x, n))`.
const MAX_DERIVATIVE_ORDER: u32 = 32;

// Intermediate AST for parsing
#[derive(Debug, Clone)]
enum ParseNode {
    Number(BigRational),
    Ident(String),
    Add(Box<ParseNode>, Box<ParseNode>),
    Sub(Box<ParseNode>, Box<ParseNode>),
    Mul(Box<ParseNode>, Box<ParseNode>),
    Div(Box<ParseNode>, Box<ParseNode>),
    Pow(Box<ParseNode>, Box<ParseNode>),
    Neg(Box<ParseNode>),
    Call(String, Vec<ParseNode>),
    /// `(a, b, ...)`, only meaningful as a calculus operator argument.
    Tuple(Vec<ParseNode>),
}

/// Lowers parse nodes into the arena, resolving names on the way.
struct Lowering<'c, F> {
    ctx: &'c mut Context,
    declared: F,
}

impl<'c, F: Fn(&str) -> bool> Lowering<'c, F> {
    fn lower(&mut self, node: ParseNode) -> Result<ExprId, ParseError> {
        let expr = match node {
            ParseNode::Number(n) => Expr::Number(n),
            ParseNode::Ident(name) => self.resolve_name(name),
            ParseNode::Add(l, r) => {
                let (l, r) = (self.lower(*l)?, self.lower(*r)?);
                Expr::Add(l, r)
            }
            ParseNode::Sub(l, r) => {
                let (l, r) = (self.lower(*l)?, self.lower(*r)?);
                Expr::Sub(l, r)
            }
            ParseNode::Mul(l, r) => {
                let (l, r) = (self.lower(*l)?, self.lower(*r)?);
                Expr::Mul(l, r)
            }
            ParseNode::Div(l, r) => {
                let (l, r) = (self.lower(*l)?, self.lower(*r)?);
                Expr::Div(l, r)
            }
            ParseNode::Pow(b, e) => {
                let (b, e) = (self.lower(*b)?, self.lower(*e)?);
                Expr::Pow(b, e)
            }
            ParseNode::Neg(e) => Expr::Neg(self.lower(*e)?),
            ParseNode::Call(name, args) => return self.lower_call(name, args),
            ParseNode::Tuple(_) => return Err(ParseError::MisplacedTuple),
        };
        Ok(self.ctx.add(expr))
    }

    fn resolve_name(&self, name: String) -> Expr {
        if (self.declared)(name.as_str()) {
            return Expr::Variable(name);
        }
        match name.as_str() {
            "pi" => Expr::Constant(Constant::Pi),
            "E" => Expr::Constant(Constant::E),
            "oo" => Expr::Constant(Constant::Infinity),
            "nan" | "zoo" => Expr::Constant(Constant::Undefined),
            _ => Expr::Variable(name),
        }
    }

    fn lower_call(&mut self, name: String, args: Vec<ParseNode>) -> Result<ExprId, ParseError> {
        match name.as_str() {
            "Derivative" | "diff" => return self.lower_derivative(&name, args),
            "Integral" | "integrate" => return self.lower_integral(&name, args),
            "Rational" => return self.lower_rational(args),
            _ => {}
        }

        let canonical = canonical_function_name(&name);
        if let Some((min, max)) = builtin_arity(canonical) {
            if args.len() < min || args.len() > max {
                return Err(ParseError::args(
                    &name,
                    format!("expected {} argument(s), got {}", arity_text(min, max), args.len()),
                ));
            }
        } else if args.is_empty() {
            return Err(ParseError::args(&name, "undefined function needs arguments"));
        }

        let mut ids = Vec::with_capacity(args.len());
        for arg in args {
            ids.push(self.lower(arg)?);
        }
        Ok(self.ctx.call(canonical, ids))
    }

    fn lower_rational(&mut self, args: Vec<ParseNode>) -> Result<ExprId, ParseError> {
        match args.as_slice() {
            [ParseNode::Number(p), ParseNode::Number(q)] if p.is_integer() && q.is_integer() => {
                if q.is_zero() {
                    return Err(ParseError::args("Rational", "zero denominator"));
                }
                Ok(self.ctx.rational(p / q))
            }
            _ => Err(ParseError::args("Rational", "expected two integer literals")),
        }
    }

    /// `Derivative(f, x)`, `Derivative(f, x, 2)`, `Derivative(f, (x, 2), y)`.
    fn lower_derivative(
        &mut self,
        name: &str,
        args: Vec<ParseNode>,
    ) -> Result<ExprId, ParseError> {
        let mut args = args.into_iter();
        let target = args
            .next()
            .ok_or_else(|| ParseError::args(name, "missing expression"))?;
        let expr = self.lower(target)?;

        let mut wrt: Vec<(String, u32)> = Vec::new();
        for spec in args {
            match spec {
                ParseNode::Ident(var) => wrt.push((self.variable_name(name, var)?, 1)),
                ParseNode::Number(n) => {
                    let order = derivative_order(name, &n)?;
                    match wrt.last_mut() {
                        Some(last) => last.1 = order,
                        None => return Err(ParseError::args(name, "order given before variable")),
                    }
                }
                ParseNode::Tuple(items) => match <[ParseNode; 2]>::try_from(items) {
                    Ok([ParseNode::Ident(var), ParseNode::Number(n)]) => {
                        let var = self.variable_name(name, var)?;
                        wrt.push((var, derivative_order(name, &n)?));
                    }
                    _ => return Err(ParseError::args(name, "expected (variable, order)")),
                },
                _ => return Err(ParseError::args(name, "expected a differentiation variable")),
            }
        }

        if wrt.is_empty() {
            wrt.push((self.single_free_var(name, expr)?, 1));
        }

        Ok(self.ctx.add(Expr::Derivative { expr, wrt }))
    }

    /// `Integral(f, x)`, `Integral(f, (x, a, b))`, nested for several variables.
    fn lower_integral(&mut self, name: &str, args: Vec<ParseNode>) -> Result<ExprId, ParseError> {
        let mut args = args.into_iter();
        let target = args
            .next()
            .ok_or_else(|| ParseError::args(name, "missing integrand"))?;
        let mut result = self.lower(target)?;

        let mut specs = args.peekable();
        if specs.peek().is_none() {
            let var = self.single_free_var(name, result)?;
            return Ok(self.ctx.add(Expr::Integral {
                integrand: result,
                var,
                bounds: None,
            }));
        }

        for spec in specs {
            let (var, bounds) = match spec {
                ParseNode::Ident(var) => (self.variable_name(name, var)?, None),
                ParseNode::Tuple(items) => {
                    let mut items = items.into_iter();
                    let var = match items.next() {
                        Some(ParseNode::Ident(var)) => self.variable_name(name, var)?,
                        _ => return Err(ParseError::args(name, "expected (variable, lower, upper)")),
                    };
                    let rest: Vec<ParseNode> = items.collect();
                    match <[ParseNode; 2]>::try_from(rest) {
                        Ok([lo, hi]) => (var, Some((self.lower(lo)?, self.lower(hi)?))),
                        Err(rest) if rest.is_empty() => (var, None),
                        Err(_) => {
                            return Err(ParseError::args(name, "expected (variable, lower, upper)"))
                        }
                    }
                }
                _ => return Err(ParseError::args(name, "expected an integration variable")),
            };
            result = self.ctx.add(Expr::Integral {
                integrand: result,
                var,
                bounds,
            });
        }
        Ok(result)
    }

    fn variable_name(&self, function: &str, name: String) -> Result<String, ParseError> {
        match self.resolve_name(name) {
            Expr::Variable(v) => Ok(v),
            other => Err(ParseError::args(
                function,
                format!("cannot use {:?} as a variable", other),
            )),
        }
    }

    fn single_free_var(&self, function: &str, expr: ExprId) -> Result<String, ParseError> {
        let mut vars = self.ctx.free_vars(expr);
        if vars.len() == 1 {
            Ok(vars.remove(0))
        } else {
            Err(ParseError::args(
                function,
                "variable must be given when the expression does not have exactly one symbol",
            ))
        }
    }
}

fn derivative_order(function: &str, n: &BigRational) -> Result<u32, ParseError> {
    if !n.is_integer() || n.is_negative() {
        return Err(ParseError::args(function, "order must be a positive integer"));
    }
    match n.to_integer().to_u32() {
        Some(order) if (1..=MAX_DERIVATIVE_ORDER).contains(&order) => Ok(order),
        _ => Err(ParseError::args(
            function,
            format!("order must be between 1 and {}", MAX_DERIVATIVE_ORDER),
        )),
    }
}

/// Spelling variants collapse to one name so equal inputs share one node.
fn canonical_function_name(name: &str) -> &str {
    match name {
        "ln" => "log",
        "abs" => "Abs",
        "arcsin" => "asin",
        "arccos" => "acos",
        "arctan" => "atan",
        "fact" => "factorial",
        other => other,
    }
}

fn builtin_arity(name: &str) -> Option<(usize, usize)> {
    match name {
        "sin" | "cos" | "tan" | "cot" | "sec" | "csc" | "asin" | "acos" | "atan" | "sinh"
        | "cosh" | "tanh" | "exp" | "sqrt" | "Abs" | "factorial" => Some((1, 1)),
        "log" => Some((1, 2)),
        "root" => Some((2, 2)),
        _ => None,
    }
}

fn arity_text(min: usize, max: usize) -> String {
    if min == max {
        min.to_string()
    } else {
        format!("{} to {}", min, max)
    }
}

/// Convert a decimal string to BigRational.
/// Supports: "8.2" → 41/5, ".5" → 1/2, "8." → 8, "123" → 123
/// Algorithm: For "A.B", num = A*10^k + B, den = 10^k (where k = len(B))
fn decimal_to_rational(integer_part: &str, fractional_part: &str) -> BigRational {
    let k = fractional_part.len();
    let denominator = num_traits::pow(BigInt::from(10), k);

    let int_val: BigInt = if integer_part.is_empty() {
        BigInt::zero()
    } else {
        integer_part.parse().unwrap_or_else(|_| BigInt::zero())
    };
    let frac_val: BigInt = if fractional_part.is_empty() {
        BigInt::zero()
    } else {
        fractional_part.parse().unwrap_or_else(|_| BigInt::zero())
    };

    // BigRational::new reduces the fraction (gcd)
    BigRational::new(int_val * &denominator + frac_val, denominator)
}

fn nom_fail<T>(input: &str, kind: nom::error::ErrorKind) -> IResult<&str, T> {
    Err(nom::Err::Error(nom::error::Error::new(input, kind)))
}

// Parser for numeric literals: 123, 8.2, .5, 8., 1e-3, 2.5E4
fn parse_number(input: &str) -> IResult<&str, ParseNode> {
    fn is_digit(c: char) -> bool {
        c.is_ascii_digit()
    }

    let (remaining, (int_str, maybe_frac)) = pair(
        take_while(is_digit),
        opt(pair(tag("."), take_while(is_digit))),
    )(input)?;
    let frac_str = maybe_frac.map(|(_, frac)| frac).unwrap_or("");

    // Must have at least some digits somewhere; "." alone is not a number
    if int_str.is_empty() && frac_str.is_empty() {
        return nom_fail(input, nom::error::ErrorKind::Digit);
    }

    let mut value = decimal_to_rational(int_str, frac_str);

    let (remaining, exponent) = opt(preceded(
        one_of("eE"),
        pair(opt(one_of("+-")), digit1),
    ))(remaining)?;
    if let Some((sign, digits)) = exponent {
        let magnitude: i64 = match digits.parse() {
            Ok(m) if m <= MAX_DECIMAL_EXPONENT => m,
            _ => return nom_fail(input, nom::error::ErrorKind::TooLarge),
        };
        let scale = BigRational::from_integer(num_traits::pow(BigInt::from(10), magnitude as usize));
        if sign == Some('-') {
            value /= scale;
        } else {
            value *= scale;
        }
    }

    Ok((remaining, ParseNode::Number(value)))
}

// Identifiers start with letter or underscore, then allow letters, digits, underscores
// Examples: x, x1, theta3, _tmp, x_1
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    let len = match input.chars().next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            1 + input[1..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .count()
        }
        _ => return nom_fail(input, nom::error::ErrorKind::Alpha),
    };
    Ok((&input[len..], &input[..len]))
}

fn parse_symbol(input: &str) -> IResult<&str, ParseNode> {
    map(parse_identifier, |s: &str| ParseNode::Ident(s.to_string()))(input)
}

fn comma(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, tag(","))(input)
}

fn close_paren(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, tag(")"))(input)
}

// Parser for parentheses and tuples: (a), (a, b), (a,)
fn parse_group(input: &str) -> IResult<&str, ParseNode> {
    let (input, _) = tag("(")(input)?;
    let (input, items) = separated_list0(comma, parse_expr)(input)?;
    let (input, trailing) = opt(comma)(input)?;
    let (input, _) = close_paren(input)?;

    if items.is_empty() {
        return nom_fail(input, nom::error::ErrorKind::SeparatedList);
    }
    let mut items = items;
    if trailing.is_none() && items.len() == 1 {
        if let Some(single) = items.pop() {
            return Ok((input, single));
        }
    }
    Ok((input, ParseNode::Tuple(items)))
}

// Parser for function calls
fn parse_function(input: &str) -> IResult<&str, ParseNode> {
    let (input, name) = parse_identifier(input)?;
    let (input, _) = preceded(multispace0, tag("("))(input)?;
    let (input, args) = separated_list0(comma, parse_expr)(input)?;
    let (input, _) = opt(comma)(input)?;
    let (input, _) = close_paren(input)?;
    Ok((input, ParseNode::Call(name.to_string(), args)))
}

fn parse_abs(input: &str) -> IResult<&str, ParseNode> {
    let (input, _) = tag("|")(input)?;
    let (input, inner) = parse_expr(input)?;
    let (input, _) = preceded(multispace0, tag("|"))(input)?;
    Ok((input, ParseNode::Call("Abs".to_string(), vec![inner])))
}

// Atom
fn parse_atom(input: &str) -> IResult<&str, ParseNode> {
    preceded(
        multispace0,
        alt((
            parse_number,
            parse_function,
            parse_symbol,
            parse_group,
            parse_abs,
        )),
    )(input)
}

// Factorial is postfix and binds tighter than powers: x**n! -> x**(n!)
// "!=" is left alone for relational predicates.
fn parse_factorial(input: &str) -> IResult<&str, ParseNode> {
    let (input, atom) = parse_atom(input)?;
    fold_many0(
        preceded(multispace0, terminated(tag("!"), not(tag("=")))),
        move || atom.clone(),
        |acc, _| ParseNode::Call("factorial".to_string(), vec![acc]),
    )(input)
}

// Power - right associative: 2**3**4 = 2**(3**4), not (2**3)**4
// Also allows signed exponents: x**-2, x**-(a+b)
fn parse_power(input: &str) -> IResult<&str, ParseNode> {
    let (input, base) = parse_factorial(input)?;

    let try_op = preceded::<_, _, _, nom::error::Error<&str>, _, _>(
        multispace0,
        alt((tag("**"), tag("^"))),
    )(input);

    if let Ok((input, _)) = try_op {
        let (input, exp) = parse_power_exponent(input)?;
        Ok((input, ParseNode::Pow(Box::new(base), Box::new(exp))))
    } else {
        Ok((input, base))
    }
}

// Parser for exponents: allows sign prefix (-2, +3) then recurses for chained powers
fn parse_power_exponent(input: &str) -> IResult<&str, ParseNode> {
    preceded(
        multispace0,
        alt((
            map(pair(tag("-"), parse_power_exponent), |(_, expr)| {
                ParseNode::Neg(Box::new(expr))
            }),
            map(pair(tag("+"), parse_power_exponent), |(_, expr)| expr),
            parse_power,
        )),
    )(input)
}

// Unary
fn parse_unary(input: &str) -> IResult<&str, ParseNode> {
    alt((
        map(
            pair(preceded(multispace0, tag("-")), parse_unary),
            |(_, expr)| ParseNode::Neg(Box::new(expr)),
        ),
        map(pair(preceded(multispace0, tag("+")), parse_unary), |(_, expr)| expr),
        parse_power,
    ))(input)
}

// Term - handles explicit * and / operators
// Also handles implicit multiplication: 2x → 2*x, 3(x+y) → 3*(x+y)
fn parse_term(input: &str) -> IResult<&str, ParseNode> {
    let (input, init) = parse_unary(input)?;

    let (input, result) = fold_many0(
        pair(
            preceded(multispace0, alt((tag("*"), tag("/")))),
            parse_unary,
        ),
        move || init.clone(),
        |acc, (op, val)| {
            if op == "/" {
                ParseNode::Div(Box::new(acc), Box::new(val))
            } else {
                ParseNode::Mul(Box::new(acc), Box::new(val))
            }
        },
    )(input)?;

    parse_implicit_mul_chain(input, result)
}

// Parse implicit multiplication chain: 2xy is not split, but 2x(y+1) → 2*x*(y+1)
// Only applies when no whitespace separates the factors.
fn parse_implicit_mul_chain(input: &str, acc: ParseNode) -> IResult<&str, ParseNode> {
    match input.chars().next() {
        Some(c) if (c.is_ascii_alphabetic() || c == '_' || c == '(') && can_implicit_mul(&acc) => {
            match parse_unary(input) {
                Ok((remaining, next_factor)) => {
                    let new_acc = ParseNode::Mul(Box::new(acc), Box::new(next_factor));
                    parse_implicit_mul_chain(remaining, new_acc)
                }
                Err(_) => Ok((input, acc)),
            }
        }
        _ => Ok((input, acc)),
    }
}

// Check if a ParseNode can be followed by implicit multiplication
fn can_implicit_mul(node: &ParseNode) -> bool {
    match node {
        // Numbers can be followed by implicit mul: 2x
        ParseNode::Number(_) => true,
        // Powers can be followed: 2**2x (unusual but unambiguous)
        ParseNode::Pow(_, _) => true,
        // Factorials can be followed: n!x
        ParseNode::Call(name, args) if name == "factorial" && args.len() == 1 => true,
        // Mul/Div: chain continues 2*3x
        ParseNode::Mul(_, right) | ParseNode::Div(_, right) => can_implicit_mul(right),
        _ => false,
    }
}

// Expr
fn parse_expr(input: &str) -> IResult<&str, ParseNode> {
    let (input, init) = parse_term(input)?;
    fold_many0(
        pair(preceded(multispace0, alt((tag("+"), tag("-")))), parse_term),
        move || init.clone(),
        |acc, (op, val)| {
            if op == "+" {
                ParseNode::Add(Box::new(acc), Box::new(val))
            } else {
                ParseNode::Sub(Box::new(acc), Box::new(val))
            }
        },
    )(input)
}

fn check_nesting(input: &str) -> Result<(), ParseError> {
    let mut depth = 0usize;
    for c in input.chars() {
        match c {
            '(' => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(ParseError::NomError(format!(
                        "parentheses nested deeper than {}",
                        MAX_NESTING
                    )));
                }
            }
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

/// Run the expression grammar over all of `input`, returning the raw tree.
fn parse_complete(input: &str) -> Result<ParseNode, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    check_nesting(input)?;

    let (remaining, node) = parse_expr(input).map_err(|e| ParseError::NomError(format!("{}", e)))?;

    let remaining = remaining.trim();
    if !remaining.is_empty() {
        return Err(ParseError::UnconsumedInput(remaining.to_string()));
    }
    Ok(node)
}

/// Parse `input` into `ctx`, keeping the structure exactly as written.
///
/// Builtin constant names (`pi`, `E`, `oo`, `nan`) resolve to constants.
pub fn parse(input: &str, ctx: &mut Context) -> Result<ExprId, ParseError> {
    parse_with_symbols(input, ctx, |_| false)
}

/// Like [`parse`], but names for which `declared` returns true are always
/// plain symbols, even when they collide with a builtin constant.
pub fn parse_with_symbols<F>(input: &str, ctx: &mut Context, declared: F) -> Result<ExprId, ParseError>
where
    F: Fn(&str) -> bool,
{
    let node = parse_complete(input)?;
    Lowering { ctx, declared }.lower(node)
}
