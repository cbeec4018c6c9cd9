//! Problem and attempt storage.
//!
//! [`ProblemStore`] is the collaborator the verifier talks to. [`MemoryStore`]
//! implements it together with the scheduling side of the practice loop:
//! attempt log, review intervals, daily assignments and statistics.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::StoreError;
use crate::problem::{Problem, ProblemId, UserId};
use crate::schedule::{add_days, DailyAssignment, IntervalInfo, ScheduleConfig};

/// Storage the verifier needs.
pub trait ProblemStore {
    fn load_problem(&self, id: ProblemId) -> Result<Option<Problem>, StoreError>;

    /// Append one attempt. The store assigns the date.
    fn record_attempt(&self, attempt: NewAttempt) -> Result<(), StoreError>;
}

impl<S: ProblemStore + ?Sized> ProblemStore for &S {
    fn load_problem(&self, id: ProblemId) -> Result<Option<Problem>, StoreError> {
        (**self).load_problem(id)
    }

    fn record_attempt(&self, attempt: NewAttempt) -> Result<(), StoreError> {
        (**self).record_attempt(attempt)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttempt {
    pub user_id: UserId,
    pub problem_id: ProblemId,
    pub correct: bool,
    /// Answer text exactly as submitted.
    pub response: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub id: u64,
    pub user_id: UserId,
    pub problem_id: ProblemId,
    pub correct: bool,
    pub response: String,
    pub date: NaiveDate,
}

/// Attempts of one user on one day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub solved: u32,
    pub attempts: u32,
}

/// Attempts of one user on one problem.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemStats {
    pub solved: u32,
    pub attempts: u32,
    pub most_recent: Option<NaiveDate>,
}

type Pair = (UserId, ProblemId);

#[derive(Debug, Default)]
struct State {
    problems: BTreeMap<ProblemId, Problem>,
    users: BTreeSet<UserId>,
    attempts: Vec<AttemptRecord>,
    next_attempt_id: u64,
    intervals: BTreeMap<Pair, IntervalInfo>,
    assignments: BTreeMap<(UserId, NaiveDate, ProblemId), DailyAssignment>,
    /// Pairs whose streak already advanced on a given day. Only the current
    /// day matters, so older entries are pruned as attempts arrive.
    advanced: BTreeSet<(NaiveDate, UserId, ProblemId)>,
}

impl State {
    fn require_user(&self, user: UserId) -> Result<(), StoreError> {
        if self.users.contains(&user) {
            Ok(())
        } else {
            Err(StoreError::UnknownUser(user))
        }
    }

    fn require_problem(&self, problem: ProblemId) -> Result<(), StoreError> {
        if self.problems.contains_key(&problem) {
            Ok(())
        } else {
            Err(StoreError::UnknownProblem(problem))
        }
    }

    /// Add `user` with every problem due `today`. False when already enrolled.
    fn enroll(&mut self, user: UserId, today: NaiveDate) -> bool {
        if !self.users.insert(user) {
            return false;
        }
        let problems: Vec<ProblemId> = self.problems.keys().copied().collect();
        for problem in problems {
            self.intervals
                .insert((user, problem), Self::fresh_interval(user, problem, today));
        }
        true
    }

    fn fresh_interval(user: UserId, problem: ProblemId, due: NaiveDate) -> IntervalInfo {
        IntervalInfo {
            user_id: user,
            problem_id: problem,
            correct_streak: 0,
            due,
        }
    }
}

/// In-memory store. Every operation takes one lock, so writes are
/// serialized.
#[derive(Debug)]
pub struct MemoryStore<C = SystemClock> {
    clock: C,
    config: ScheduleConfig,
    state: Mutex<State>,
}

impl MemoryStore<SystemClock> {
    pub fn new(config: ScheduleConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for MemoryStore<SystemClock> {
    fn default() -> Self {
        Self::new(ScheduleConfig::default())
    }
}

impl<C: Clock> MemoryStore<C> {
    pub fn with_clock(config: ScheduleConfig, clock: C) -> Self {
        Self {
            clock,
            config,
            state: Mutex::new(State::default()),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Add a problem and schedule it for every enrolled user, due today.
    pub fn add_problem(&self, problem: Problem) -> Result<(), StoreError> {
        let today = self.clock.today();
        let mut state = self.lock()?;
        if state.problems.contains_key(&problem.id) {
            return Err(StoreError::DuplicateProblem(problem.id));
        }
        let id = problem.id;
        state.problems.insert(id, problem);
        let users: Vec<UserId> = state.users.iter().copied().collect();
        for user in users {
            state
                .intervals
                .insert((user, id), State::fresh_interval(user, id, today));
        }
        tracing::debug!(target: "store", problem = %id, "problem_added");
        Ok(())
    }

    /// Enroll a user: every problem becomes due today. Enrolling twice is a
    /// no-op.
    pub fn enroll_user(&self, user: UserId) -> Result<(), StoreError> {
        let today = self.clock.today();
        if self.lock()?.enroll(user, today) {
            tracing::debug!(target: "store", user = %user, "user_enrolled");
        }
        Ok(())
    }

    /// Delete every row that belongs to `user`.
    pub fn remove_user(&self, user: UserId) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.require_user(user)?;
        state.users.remove(&user);
        state.attempts.retain(|a| a.user_id != user);
        state.intervals.retain(|(u, _), _| *u != user);
        state.assignments.retain(|(u, _, _), _| *u != user);
        state.advanced.retain(|(_, u, _)| *u != user);
        tracing::debug!(target: "store", user = %user, "user_removed");
        Ok(())
    }

    /// Erase a user's attempts, restart every interval due today, and drop
    /// assignments from today on.
    pub fn reset_user(&self, user: UserId) -> Result<(), StoreError> {
        let today = self.clock.today();
        let mut state = self.lock()?;
        state.require_user(user)?;
        state.attempts.retain(|a| a.user_id != user);
        for ((u, p), info) in state.intervals.iter_mut() {
            if *u == user {
                *info = State::fresh_interval(*u, *p, today);
            }
        }
        state
            .assignments
            .retain(|(u, date, _), _| *u != user || *date < today);
        state.advanced.retain(|(_, u, _)| *u != user);
        tracing::debug!(target: "store", user = %user, "user_reset");
        Ok(())
    }

    /// Erase a user's attempts on one problem; the problem is next due
    /// tomorrow.
    pub fn reset_problem(&self, user: UserId, problem: ProblemId) -> Result<(), StoreError> {
        let today = self.clock.today();
        let mut state = self.lock()?;
        state.require_user(user)?;
        state.require_problem(problem)?;
        state
            .attempts
            .retain(|a| a.user_id != user || a.problem_id != problem);
        state.intervals.insert(
            (user, problem),
            State::fresh_interval(user, problem, add_days(today, 1)),
        );
        state
            .assignments
            .retain(|(u, date, p), _| *u != user || *p != problem || *date < today);
        state.advanced.retain(|(_, u, p)| *u != user || *p != problem);
        tracing::debug!(target: "store", user = %user, problem = %problem, "problem_reset");
        Ok(())
    }

    /// Assign today every problem that is due, without duplicating existing
    /// assignments. Returns how many were newly assigned.
    pub fn assign_daily_questions(&self, user: UserId) -> Result<usize, StoreError> {
        let today = self.clock.today();
        let mut state = self.lock()?;
        state.require_user(user)?;
        let due: Vec<ProblemId> = state
            .intervals
            .values()
            .filter(|info| info.user_id == user && info.due <= today)
            .map(|info| info.problem_id)
            .collect();

        let mut assigned = 0;
        for problem in due {
            let key = (user, today, problem);
            if state.assignments.contains_key(&key) {
                continue;
            }
            state.assignments.insert(
                key,
                DailyAssignment {
                    user_id: user,
                    problem_id: problem,
                    date: today,
                    solved: false,
                },
            );
            assigned += 1;
        }
        tracing::debug!(target: "store", user = %user, assigned, "daily_assigned");
        Ok(assigned)
    }

    /// Today's unsolved assignments, ordered by problem id.
    pub fn problems_assigned_today(&self, user: UserId) -> Result<Vec<Problem>, StoreError> {
        let today = self.clock.today();
        let state = self.lock()?;
        state.require_user(user)?;
        Ok(state
            .assignments
            .range((user, today, ProblemId(i64::MIN))..=(user, today, ProblemId(i64::MAX)))
            .filter(|(_, a)| !a.solved)
            .filter_map(|((_, _, p), _)| state.problems.get(p).cloned())
            .collect())
    }

    /// All problems, ordered by id.
    pub fn problems(&self) -> Result<Vec<Problem>, StoreError> {
        Ok(self.lock()?.problems.values().cloned().collect())
    }

    /// All problems with the user's review state, ordered by problem id.
    pub fn problems_with_schedule(
        &self,
        user: UserId,
    ) -> Result<Vec<(Problem, IntervalInfo)>, StoreError> {
        let state = self.lock()?;
        state.require_user(user)?;
        Ok(state
            .problems
            .values()
            .filter_map(|p| {
                state
                    .intervals
                    .get(&(user, p.id))
                    .map(|info| (p.clone(), info.clone()))
            })
            .collect())
    }

    pub fn interval(&self, user: UserId, problem: ProblemId) -> Result<Option<IntervalInfo>, StoreError> {
        Ok(self.lock()?.intervals.get(&(user, problem)).cloned())
    }

    /// Attempts per day, oldest first.
    pub fn user_statistics(&self, user: UserId) -> Result<Vec<DailyStats>, StoreError> {
        let state = self.lock()?;
        let mut by_day: BTreeMap<NaiveDate, DailyStats> = BTreeMap::new();
        for attempt in state.attempts.iter().filter(|a| a.user_id == user) {
            let stats = by_day.entry(attempt.date).or_insert(DailyStats {
                date: attempt.date,
                solved: 0,
                attempts: 0,
            });
            stats.attempts += 1;
            if attempt.correct {
                stats.solved += 1;
            }
        }
        Ok(by_day.into_values().collect())
    }

    /// `None` when the problem does not exist.
    pub fn problem_statistics(
        &self,
        user: UserId,
        problem: ProblemId,
    ) -> Result<Option<ProblemStats>, StoreError> {
        let state = self.lock()?;
        if !state.problems.contains_key(&problem) {
            return Ok(None);
        }
        let mut stats = ProblemStats::default();
        for attempt in state
            .attempts
            .iter()
            .filter(|a| a.user_id == user && a.problem_id == problem)
        {
            stats.attempts += 1;
            if attempt.correct {
                stats.solved += 1;
            }
            stats.most_recent = stats.most_recent.max(Some(attempt.date));
        }
        Ok(Some(stats))
    }

    /// The attempt log of one user, in insertion order.
    pub fn attempts(&self, user: UserId) -> Result<Vec<AttemptRecord>, StoreError> {
        Ok(self
            .lock()?
            .attempts
            .iter()
            .filter(|a| a.user_id == user)
            .cloned()
            .collect())
    }

    /// Update the review state after an attempt on `date`.
    fn schedule_next_assignment(&self, state: &mut State, attempt: &NewAttempt, date: NaiveDate) {
        let (user, problem) = (attempt.user_id, attempt.problem_id);
        let info = state
            .intervals
            .entry((user, problem))
            .or_insert_with(|| State::fresh_interval(user, problem, date));

        if attempt.correct {
            // at most one advance per pair and day
            if state.advanced.insert((date, user, problem)) {
                info.correct_streak += 1;
                info.due = self.config.next_due(date, true, info.correct_streak);
            }
            if let Some(assignment) = state.assignments.get_mut(&(user, date, problem)) {
                assignment.solved = true;
            }
        } else {
            info.correct_streak = 0;
            info.due = self.config.next_due(date, false, 0);
        }
        tracing::debug!(
            target: "store",
            user = %user,
            problem = %problem,
            streak = info.correct_streak,
            due = %info.due,
            "next_assignment_scheduled"
        );
    }
}

impl<C: Clock> ProblemStore for MemoryStore<C> {
    fn load_problem(&self, id: ProblemId) -> Result<Option<Problem>, StoreError> {
        Ok(self.lock()?.problems.get(&id).cloned())
    }

    fn record_attempt(&self, attempt: NewAttempt) -> Result<(), StoreError> {
        let date = self.clock.today();
        let mut state = self.lock()?;
        state.require_problem(attempt.problem_id)?;
        if state.enroll(attempt.user_id, date) {
            tracing::debug!(target: "store", user = %attempt.user_id, "user_enrolled");
        }
        state.advanced = state
            .advanced
            .split_off(&(date, UserId(i64::MIN), ProblemId(i64::MIN)));

        let id = state.next_attempt_id;
        state.next_attempt_id += 1;
        state.attempts.push(AttemptRecord {
            id,
            user_id: attempt.user_id,
            problem_id: attempt.problem_id,
            correct: attempt.correct,
            response: attempt.response.clone(),
            date,
        });
        tracing::debug!(
            target: "store",
            user = %attempt.user_id,
            problem = %attempt.problem_id,
            correct = attempt.correct,
            "attempt_logged"
        );
        self.schedule_next_assignment(&mut state, &attempt, date);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::problem::ExpressionType;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn problem(id: i64) -> Problem {
        Problem {
            id: ProblemId(id),
            canonical: "x**2".to_string(),
            solutions: vec!["x*x".to_string()],
            expression_type: ExpressionType::Algebraic,
            display_problem: String::new(),
            display_solution: "x^2".to_string(),
            assumptions: BTreeMap::new(),
        }
    }

    fn attempt(user: i64, problem: i64, correct: bool) -> NewAttempt {
        NewAttempt {
            user_id: UserId(user),
            problem_id: ProblemId(problem),
            correct,
            response: "x*x".to_string(),
        }
    }

    fn store() -> MemoryStore<FixedClock> {
        let store = MemoryStore::with_clock(ScheduleConfig::default(), FixedClock::new(day(1)));
        store.add_problem(problem(1)).unwrap();
        store.add_problem(problem(2)).unwrap();
        store.enroll_user(UserId(10)).unwrap();
        store
    }

    #[test]
    fn test_enrollment_makes_everything_due_today() {
        let store = store();
        let schedule = store.problems_with_schedule(UserId(10)).unwrap();
        assert_eq!(schedule.len(), 2);
        assert!(schedule.iter().all(|(_, info)| info.due == day(1) && info.correct_streak == 0));
    }

    #[test]
    fn test_new_problem_is_scheduled_for_enrolled_users() {
        let store = store();
        store.add_problem(problem(3)).unwrap();
        let info = store.interval(UserId(10), ProblemId(3)).unwrap().unwrap();
        assert_eq!(info.due, day(1));
        assert_eq!(
            store.add_problem(problem(3)),
            Err(StoreError::DuplicateProblem(ProblemId(3)))
        );
    }

    #[test]
    fn test_streak_advances_once_per_day() {
        let store = store();
        store.record_attempt(attempt(10, 1, true)).unwrap();
        store.record_attempt(attempt(10, 1, true)).unwrap();
        let info = store.interval(UserId(10), ProblemId(1)).unwrap().unwrap();
        assert_eq!(info.correct_streak, 1);
        assert_eq!(info.due, day(2));

        store.clock().set(day(2));
        store.record_attempt(attempt(10, 1, true)).unwrap();
        let info = store.interval(UserId(10), ProblemId(1)).unwrap().unwrap();
        assert_eq!(info.correct_streak, 2);
        assert_eq!(info.due, day(4));
    }

    #[test]
    fn test_only_todays_advances_are_kept() {
        let store = store();
        store.record_attempt(attempt(10, 1, true)).unwrap();
        store.record_attempt(attempt(10, 2, true)).unwrap();
        assert_eq!(store.lock().unwrap().advanced.len(), 2);

        store.clock().set(day(3));
        store.record_attempt(attempt(10, 1, true)).unwrap();
        let advanced: Vec<_> = store.lock().unwrap().advanced.iter().copied().collect();
        assert_eq!(advanced, vec![(day(3), UserId(10), ProblemId(1))]);
        let info = store.interval(UserId(10), ProblemId(1)).unwrap().unwrap();
        assert_eq!(info.correct_streak, 2);
    }

    #[test]
    fn test_first_attempt_enrolls_user_in_every_problem() {
        let store = store();
        store.record_attempt(attempt(20, 1, true)).unwrap();
        store.enroll_user(UserId(20)).unwrap();

        let schedule = store.problems_with_schedule(UserId(20)).unwrap();
        assert_eq!(schedule.len(), 2);
        let first = store.interval(UserId(20), ProblemId(1)).unwrap().unwrap();
        assert_eq!((first.correct_streak, first.due), (1, day(2)));
        let second = store.interval(UserId(20), ProblemId(2)).unwrap().unwrap();
        assert_eq!((second.correct_streak, second.due), (0, day(1)));
        assert_eq!(store.assign_daily_questions(UserId(20)).unwrap(), 1);
    }

    #[test]
    fn test_incorrect_resets_streak() {
        let store = store();
        store.record_attempt(attempt(10, 1, true)).unwrap();
        store.clock().set(day(2));
        store.record_attempt(attempt(10, 1, false)).unwrap();
        let info = store.interval(UserId(10), ProblemId(1)).unwrap().unwrap();
        assert_eq!(info.correct_streak, 0);
        assert_eq!(info.due, day(3));
    }

    #[test]
    fn test_daily_assignment_is_idempotent() {
        let store = store();
        assert_eq!(store.assign_daily_questions(UserId(10)).unwrap(), 2);
        assert_eq!(store.assign_daily_questions(UserId(10)).unwrap(), 0);
        let today: Vec<ProblemId> = store
            .problems_assigned_today(UserId(10))
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(today, vec![ProblemId(1), ProblemId(2)]);
    }

    #[test]
    fn test_correct_answer_marks_assignment_solved() {
        let store = store();
        store.assign_daily_questions(UserId(10)).unwrap();
        store.record_attempt(attempt(10, 2, true)).unwrap();
        let today: Vec<ProblemId> = store
            .problems_assigned_today(UserId(10))
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(today, vec![ProblemId(1)]);
    }

    #[test]
    fn test_statistics() {
        let store = store();
        store.record_attempt(attempt(10, 1, false)).unwrap();
        store.record_attempt(attempt(10, 1, true)).unwrap();
        store.clock().set(day(3));
        store.record_attempt(attempt(10, 2, true)).unwrap();

        let daily = store.user_statistics(UserId(10)).unwrap();
        assert_eq!(
            daily,
            vec![
                DailyStats { date: day(1), solved: 1, attempts: 2 },
                DailyStats { date: day(3), solved: 1, attempts: 1 },
            ]
        );

        let stats = store.problem_statistics(UserId(10), ProblemId(1)).unwrap().unwrap();
        assert_eq!(stats.attempts, 2);
        assert_eq!(stats.solved, 1);
        assert_eq!(stats.most_recent, Some(day(1)));
        assert_eq!(store.problem_statistics(UserId(10), ProblemId(99)).unwrap(), None);
    }

    #[test]
    fn test_reset_problem_due_tomorrow() {
        let store = store();
        store.assign_daily_questions(UserId(10)).unwrap();
        store.record_attempt(attempt(10, 1, true)).unwrap();
        store.reset_problem(UserId(10), ProblemId(1)).unwrap();

        let info = store.interval(UserId(10), ProblemId(1)).unwrap().unwrap();
        assert_eq!(info.correct_streak, 0);
        assert_eq!(info.due, day(2));
        assert_eq!(store.problem_statistics(UserId(10), ProblemId(1)).unwrap().unwrap().attempts, 0);
        assert!(store
            .problems_assigned_today(UserId(10))
            .unwrap()
            .iter()
            .all(|p| p.id != ProblemId(1)));
    }

    #[test]
    fn test_reset_and_remove_user() {
        let store = store();
        store.record_attempt(attempt(10, 1, true)).unwrap();
        store.reset_user(UserId(10)).unwrap();
        assert!(store.attempts(UserId(10)).unwrap().is_empty());
        let info = store.interval(UserId(10), ProblemId(1)).unwrap().unwrap();
        assert_eq!(info.correct_streak, 0);

        store.remove_user(UserId(10)).unwrap();
        assert_eq!(store.interval(UserId(10), ProblemId(1)).unwrap(), None);
        assert_eq!(
            store.assign_daily_questions(UserId(10)),
            Err(StoreError::UnknownUser(UserId(10)))
        );
    }

    #[test]
    fn test_attempt_on_unknown_problem_fails() {
        let store = store();
        assert_eq!(
            store.record_attempt(attempt(10, 42, true)),
            Err(StoreError::UnknownProblem(ProblemId(42)))
        );
        assert!(store.attempts(UserId(10)).unwrap().is_empty());
    }
}
