//! Answer verification.
//!
//! `verify` runs, in order:
//!
//! 1. load the problem
//! 2. resolve its assumptions
//! 3. parse the answer, evaluating calculus operators
//! 4. reject an answer that restates the problem
//! 5. evaluate the statement when it is a derivative or an integral
//! 6. compare the answer with the statement
//! 7. compare it with each accepted solution, first match wins
//! 8. otherwise the answer is incorrect
//!
//! Steps 6 to 8 record exactly one attempt. Failures before a verdict record
//! nothing.

use drill_ast::{Context, ExprId};
use drill_engine::{
    doit, parse_expression, resolve_assumptions, AssumptionSet, EngineLimits, Equivalence,
    ParseMode,
};
use drill_parser::ParseError;
use serde::{Deserialize, Serialize};

use crate::error::VerifyError;
use crate::problem::{Problem, ProblemId, UserId};
use crate::store::{NewAttempt, ProblemStore};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub correct: bool,
    /// The problem's display solution, returned whatever the verdict.
    pub display_solution: String,
}

/// Checks answers against the problems of one store.
///
/// Holds no per-call state: every call builds its own expression arena.
#[derive(Debug)]
pub struct Verifier<S> {
    store: S,
    limits: EngineLimits,
}

impl<S: ProblemStore> Verifier<S> {
    pub fn new(store: S) -> Self {
        Self::with_limits(store, EngineLimits::default())
    }

    pub fn with_limits(store: S, limits: EngineLimits) -> Self {
        Self { store, limits }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn limits(&self) -> &EngineLimits {
        &self.limits
    }

    pub fn verify(
        &self,
        problem_id: ProblemId,
        user_id: UserId,
        answer: &str,
    ) -> Result<Verdict, VerifyError> {
        let span = tracing::debug_span!(target: "verify", "verify", problem = %problem_id, user = %user_id);
        let _enter = span.enter();

        let problem = self
            .store
            .load_problem(problem_id)?
            .ok_or(VerifyError::NotFound(problem_id))?;

        let correct = self.decide(&problem, answer)?;
        self.store.record_attempt(NewAttempt {
            user_id,
            problem_id,
            correct,
            response: answer.to_string(),
        })?;
        tracing::info!(target: "verify", correct, "verdict");

        Ok(Verdict {
            correct,
            display_solution: problem.display_solution,
        })
    }

    /// Steps 2 to 8 without the side effect.
    fn decide(&self, problem: &Problem, answer: &str) -> Result<bool, VerifyError> {
        let mut ctx = Context::new();
        let invalid = |field| invalid_data(problem.id, field);

        let assumptions =
            resolve_assumptions(&problem.assumptions, &mut ctx).map_err(invalid("assumption"))?;

        let submitted = parse_expression(answer, &assumptions, ParseMode::Evaluated, &mut ctx)
            .map_err(VerifyError::InvalidAnswerFormat)?;
        let submitted_raw = parse_expression(answer, &assumptions, ParseMode::Unevaluated, &mut ctx)
            .map_err(VerifyError::InvalidAnswerFormat)?;

        let statement =
            parse_expression(&problem.canonical, &assumptions, ParseMode::Unevaluated, &mut ctx)
                .map_err(invalid("canonical statement"))?;
        if statement == submitted || statement == submitted_raw {
            tracing::debug!(target: "verify", "trivial_resubmission");
            return Err(VerifyError::TrivialAnswerRejected);
        }

        let expected = if problem.expression_type.is_calculus() {
            doit(&mut ctx, statement, &assumptions)
        } else {
            statement
        };

        let equivalence = Equivalence::new(&assumptions, self.limits.clone());
        if compare(&equivalence, &mut ctx, expected, submitted, "canonical")? {
            return Ok(true);
        }

        for (index, text) in problem.solutions.iter().enumerate() {
            let solution = parse_expression(text, &assumptions, ParseMode::Evaluated, &mut ctx)
                .map_err(invalid("solution"))?;
            if compare(&equivalence, &mut ctx, solution, submitted, "solution")? {
                tracing::debug!(target: "verify", index, "solution_matched");
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn compare(
    equivalence: &Equivalence<'_>,
    ctx: &mut Context,
    expected: ExprId,
    submitted: ExprId,
    against: &'static str,
) -> Result<bool, VerifyError> {
    equivalence.equal(ctx, expected, submitted).map_err(|e| {
        tracing::warn!(target: "verify", against, error = %e, "complexity_exceeded");
        VerifyError::ComplexityExceeded(e)
    })
}

fn invalid_data(problem: ProblemId, field: &'static str) -> impl FnOnce(ParseError) -> VerifyError {
    move |source| VerifyError::InvalidProblemData {
        problem,
        field,
        source,
    }
}

/// Resolve a problem's assumptions on their own, for validating a bank.
pub fn problem_assumptions(
    problem: &Problem,
    ctx: &mut Context,
) -> Result<AssumptionSet, VerifyError> {
    resolve_assumptions(&problem.assumptions, ctx).map_err(invalid_data(problem.id, "assumption"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::problem::ExpressionType;
    use crate::schedule::ScheduleConfig;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn verifier(problem: Problem) -> Verifier<MemoryStore<FixedClock>> {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let store = MemoryStore::with_clock(ScheduleConfig::default(), clock);
        store.add_problem(problem).unwrap();
        Verifier::new(store)
    }

    fn algebraic(canonical: &str, solutions: &[&str]) -> Problem {
        Problem {
            id: ProblemId(1),
            canonical: canonical.to_string(),
            solutions: solutions.iter().map(|s| s.to_string()).collect(),
            expression_type: ExpressionType::Algebraic,
            display_problem: canonical.to_string(),
            display_solution: "sol".to_string(),
            assumptions: BTreeMap::new(),
        }
    }

    #[test]
    fn test_equivalent_answer_is_correct() {
        let v = verifier(algebraic("x**2", &[]));
        let verdict = v.verify(ProblemId(1), UserId(5), "x*x").unwrap();
        assert!(verdict.correct);
        assert_eq!(verdict.display_solution, "sol");
    }

    #[test]
    fn test_restated_problem_is_rejected() {
        let v = verifier(algebraic("x**2", &[]));
        assert!(matches!(
            v.verify(ProblemId(1), UserId(5), "x**2"),
            Err(VerifyError::TrivialAnswerRejected)
        ));
        assert!(v.store().attempts(UserId(5)).unwrap().is_empty());
    }

    #[test]
    fn test_problem_function_validates_assumptions() {
        let mut problem = algebraic("x", &[]);
        problem.assumptions.insert("x".to_string(), "x >".to_string());
        let mut ctx = Context::new();
        assert!(matches!(
            problem_assumptions(&problem, &mut ctx),
            Err(VerifyError::InvalidProblemData { field: "assumption", .. })
        ));
    }
}
