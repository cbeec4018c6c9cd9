use thiserror::Error;

use crate::budget::BudgetExceeded;

#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error(transparent)]
    Budget(#[from] BudgetExceeded),
    #[error("Simplification did not reach a fixed point after {passes} passes")]
    FixedPointNotReached { passes: usize },
}
