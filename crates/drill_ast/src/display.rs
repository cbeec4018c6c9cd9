//! Display formatting for expressions.
//!
//! Output uses the same sympy-style syntax the parser accepts (`**` for
//! powers, `Derivative(...)`, `Integral(...)`), so displayed results can be
//! pasted back as answers.

use crate::{Context, Expr, ExprId};
use num_rational::BigRational;
use num_traits::{One, Signed};
use std::fmt;

pub struct DisplayExpr<'a> {
    pub context: &'a Context,
    pub id: ExprId,
}

impl<'a> DisplayExpr<'a> {
    pub fn new(context: &'a Context, id: ExprId) -> Self {
        Self { context, id }
    }

    fn child(&self, id: ExprId) -> DisplayExpr<'a> {
        DisplayExpr {
            context: self.context,
            id,
        }
    }

    fn write_operand(&self, f: &mut fmt::Formatter<'_>, id: ExprId, parens: bool) -> fmt::Result {
        if parens {
            write!(f, "({})", self.child(id))
        } else {
            write!(f, "{}", self.child(id))
        }
    }
}

/// Binding strength used to decide where parentheses are required.
fn precedence(ctx: &Context, id: ExprId) -> u8 {
    match ctx.get(id) {
        Expr::Add(_, _) | Expr::Sub(_, _) => 1,
        Expr::Mul(_, _) | Expr::Div(_, _) => 2,
        Expr::Number(n) if n.is_negative() => 3,
        Expr::Number(n) if !n.is_integer() => 2,
        Expr::Neg(_) => 3,
        Expr::Pow(_, _) => 4,
        _ => 5,
    }
}

/// `Some(inner)` when `id` prints with a leading minus that `a + (-b)` can
/// absorb as `a - b`.
fn negated_term(ctx: &Context, id: ExprId) -> Option<NegTerm> {
    match ctx.get(id) {
        Expr::Neg(inner) => Some(NegTerm::Expr(*inner)),
        Expr::Number(n) if n.is_negative() => Some(NegTerm::Number(-n.clone())),
        Expr::Mul(l, r) => match ctx.get(*l) {
            Expr::Number(n) if n.is_negative() => Some(NegTerm::Scaled(-n.clone(), *r)),
            _ => None,
        },
        _ => None,
    }
}

enum NegTerm {
    Expr(ExprId),
    Number(BigRational),
    Scaled(BigRational, ExprId),
}

fn write_number(f: &mut fmt::Formatter<'_>, n: &BigRational) -> fmt::Result {
    if n.is_integer() {
        write!(f, "{}", n.numer())
    } else {
        write!(f, "{}/{}", n.numer(), n.denom())
    }
}

impl<'a> fmt::Display for DisplayExpr<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctx = self.context;
        let my_prec = precedence(ctx, self.id);
        match ctx.get(self.id) {
            Expr::Number(n) => write_number(f, n),
            Expr::Constant(c) => write!(f, "{}", c.name()),
            Expr::Variable(s) => write!(f, "{}", s),
            Expr::Add(l, r) => {
                self.write_operand(f, *l, precedence(ctx, *l) < my_prec)?;
                match negated_term(ctx, *r) {
                    Some(NegTerm::Expr(inner)) => {
                        write!(f, " - ")?;
                        self.write_operand(f, inner, precedence(ctx, inner) <= my_prec)
                    }
                    Some(NegTerm::Number(n)) => {
                        write!(f, " - ")?;
                        write_number(f, &n)
                    }
                    Some(NegTerm::Scaled(n, rest)) => {
                        write!(f, " - ")?;
                        if !n.is_one() {
                            write_number(f, &n)?;
                            write!(f, "*")?;
                        }
                        self.write_operand(f, rest, precedence(ctx, rest) < 2)
                    }
                    None => {
                        write!(f, " + ")?;
                        self.write_operand(f, *r, precedence(ctx, *r) <= my_prec)
                    }
                }
            }
            Expr::Sub(l, r) => {
                self.write_operand(f, *l, precedence(ctx, *l) < my_prec)?;
                write!(f, " - ")?;
                // a - (b - c) keeps its grouping
                self.write_operand(f, *r, precedence(ctx, *r) <= my_prec)
            }
            Expr::Mul(l, r) => {
                self.write_operand(f, *l, precedence(ctx, *l) < my_prec)?;
                write!(f, "*")?;
                let r_prec = precedence(ctx, *r);
                self.write_operand(f, *r, r_prec <= my_prec || r_prec == 3)
            }
            Expr::Div(l, r) => {
                self.write_operand(f, *l, precedence(ctx, *l) < my_prec)?;
                write!(f, "/")?;
                let r_prec = precedence(ctx, *r);
                self.write_operand(f, *r, r_prec <= my_prec || r_prec == 3)
            }
            Expr::Pow(b, e) => {
                self.write_operand(f, *b, precedence(ctx, *b) <= my_prec)?;
                write!(f, "**")?;
                self.write_operand(f, *e, precedence(ctx, *e) < 5)
            }
            Expr::Neg(e) => {
                write!(f, "-")?;
                self.write_operand(f, *e, precedence(ctx, *e) <= my_prec)
            }
            Expr::Function(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", self.child(*arg))?;
                }
                write!(f, ")")
            }
            Expr::Derivative { expr, wrt } => {
                write!(f, "Derivative({}", self.child(*expr))?;
                for (var, order) in wrt {
                    if *order == 1 {
                        write!(f, ", {}", var)?;
                    } else {
                        write!(f, ", ({}, {})", var, order)?;
                    }
                }
                write!(f, ")")
            }
            Expr::Integral {
                integrand,
                var,
                bounds,
            } => match bounds {
                Some((lo, hi)) => write!(
                    f,
                    "Integral({}, ({}, {}, {}))",
                    self.child(*integrand),
                    var,
                    self.child(*lo),
                    self.child(*hi)
                ),
                None => write!(f, "Integral({}, {})", self.child(*integrand), var),
            },
        }
    }
}
