//! Exact integer helpers: trial-division factoring, exponent splitting and
//! factorials.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::budget::{Budget, BudgetExceeded, Metric, Operation};

/// Trial divisors are tried up to this bound.
const TRIAL_LIMIT: u64 = 100_000;

/// Largest argument `factorial` evaluates exactly.
pub(crate) const FACTORIAL_LIMIT: u32 = 1_000;

/// Factor `|n|` by trial division.
///
/// Returns `(prime, multiplicity)` pairs and the part left unfactored
/// (`1` when the factorization is complete).
pub(crate) fn factor_integer(n: &BigInt) -> (Vec<(BigInt, u32)>, BigInt) {
    let mut rest = n.abs();
    let mut factors = Vec::new();
    if rest.is_zero() {
        return (factors, rest);
    }

    let mut p = 2u64;
    while p <= TRIAL_LIMIT {
        let divisor = BigInt::from(p);
        if &divisor * &divisor > rest {
            break;
        }
        let mut count = 0u32;
        loop {
            let (q, r) = rest.div_rem(&divisor);
            if !r.is_zero() {
                break;
            }
            rest = q;
            count += 1;
        }
        if count > 0 {
            factors.push((divisor, count));
        }
        p += if p == 2 { 1 } else { 2 };
    }

    if rest.is_one() {
        return (factors, rest);
    }
    let bound = BigInt::from(p);
    if &bound * &bound > rest {
        // every divisor up to sqrt(rest) was tried
        factors.push((rest, 1));
        return (factors, BigInt::one());
    }
    (factors, rest)
}

/// `e = k + f` with integer `k` and `0 <= f < 1`.
pub(crate) fn split_exponent(e: &BigRational) -> (BigInt, BigRational) {
    let k = e.floor();
    let frac = e - &k;
    (k.to_integer(), frac)
}

/// `n!` for `n <= FACTORIAL_LIMIT`, charged as a numeric power.
pub(crate) fn factorial(n: &BigInt, budget: &mut Budget) -> Result<Option<BigInt>, BudgetExceeded> {
    let Some(n) = n.to_u32().filter(|n| *n <= FACTORIAL_LIMIT) else {
        return Ok(None);
    };
    let bits_per_factor = u64::from(32 - n.leading_zeros());
    budget.charge(
        Operation::NumericPower,
        Metric::NumberBits,
        u64::from(n) * bits_per_factor,
    )?;
    Ok(Some((1..=n).fold(BigInt::one(), |acc, k| acc * k)))
}
