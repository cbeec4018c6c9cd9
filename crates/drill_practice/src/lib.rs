//! Practice layer: problems, the answer verifier and the scheduling store.
//!
//! The web layer hands [`Verifier::verify`] an authenticated user id, a
//! problem id and the raw answer text. The verifier decides correctness with
//! the equivalence engine and records exactly one attempt per verdict through
//! the [`ProblemStore`] it was built with.

pub mod clock;
pub mod config;
pub mod error;
pub mod problem;
pub mod schedule;
pub mod store;
pub mod verifier;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::DrillConfig;
pub use error::{ConfigError, StoreError, VerifyError};
pub use problem::{load_problem_bank, ExpressionType, Problem, ProblemId, UserId};
pub use schedule::{DailyAssignment, IntervalInfo, ScheduleConfig};
pub use store::{
    AttemptRecord, DailyStats, MemoryStore, NewAttempt, ProblemStats, ProblemStore,
};
pub use verifier::{problem_assumptions, Verdict, Verifier};
