//! A few weeks of practice against the in-memory store.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use drill_practice::{
    DailyStats, ExpressionType, FixedClock, MemoryStore, Problem, ProblemId, ScheduleConfig,
    UserId, Verifier,
};

const USER: UserId = UserId(1);

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, n).unwrap()
}

fn bank() -> Vec<Problem> {
    [("x**2", "x*x"), ("(x + 1)**2", "x**2 + 2*x + 1")]
        .iter()
        .enumerate()
        .map(|(i, (canonical, solution))| Problem {
            id: ProblemId(i as i64 + 1),
            canonical: canonical.to_string(),
            solutions: vec![solution.to_string()],
            expression_type: ExpressionType::Algebraic,
            display_problem: canonical.to_string(),
            display_solution: solution.to_string(),
            assumptions: BTreeMap::new(),
        })
        .collect()
}

fn setup() -> (Arc<FixedClock>, Verifier<MemoryStore<Arc<FixedClock>>>) {
    let clock = Arc::new(FixedClock::new(day(1)));
    let store = MemoryStore::with_clock(ScheduleConfig::default(), Arc::clone(&clock));
    for p in bank() {
        store.add_problem(p).unwrap();
    }
    store.enroll_user(USER).unwrap();
    (clock, Verifier::new(store))
}

fn due_today(v: &Verifier<MemoryStore<Arc<FixedClock>>>) -> Vec<ProblemId> {
    v.store().assign_daily_questions(USER).unwrap();
    v.store()
        .problems_assigned_today(USER)
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect()
}

#[test]
fn test_intervals_grow_with_streak() {
    let (clock, v) = setup();
    assert_eq!(due_today(&v), vec![ProblemId(1), ProblemId(2)]);

    // day 1: both right
    v.verify(ProblemId(1), USER, "x*x").unwrap();
    v.verify(ProblemId(2), USER, "x**2 + 2*x + 1").unwrap();
    assert!(due_today(&v).is_empty());

    // day 2: both due again, problem 2 answered wrong
    clock.set(day(2));
    assert_eq!(due_today(&v), vec![ProblemId(1), ProblemId(2)]);
    v.verify(ProblemId(1), USER, "x*x").unwrap();
    assert!(!v.verify(ProblemId(2), USER, "x**2 + 1").unwrap().correct);
    assert_eq!(due_today(&v), vec![ProblemId(2)]);

    // day 3: only the missed problem comes back
    clock.set(day(3));
    assert_eq!(due_today(&v), vec![ProblemId(2)]);
    v.verify(ProblemId(2), USER, "(x + 1)*(x + 1)").unwrap();

    // day 4: problem 1 reached streak 2, due two days after day 2
    clock.set(day(4));
    assert_eq!(due_today(&v), vec![ProblemId(1), ProblemId(2)]);

    let info = v.store().interval(USER, ProblemId(1)).unwrap().unwrap();
    assert_eq!(info.correct_streak, 2);
    assert_eq!(info.due, day(4));
}

#[test]
fn test_statistics_follow_verdicts() {
    let (clock, v) = setup();
    v.verify(ProblemId(1), USER, "x**3").unwrap();
    v.verify(ProblemId(1), USER, "x*x").unwrap();
    clock.advance_days(2);
    v.verify(ProblemId(2), USER, "x**2 + 2*x + 1").unwrap();

    assert_eq!(
        v.store().user_statistics(USER).unwrap(),
        vec![
            DailyStats {
                date: day(1),
                solved: 1,
                attempts: 2
            },
            DailyStats {
                date: day(3),
                solved: 1,
                attempts: 1
            },
        ]
    );

    let stats = v
        .store()
        .problem_statistics(USER, ProblemId(1))
        .unwrap()
        .unwrap();
    assert_eq!((stats.solved, stats.attempts), (1, 2));
    assert_eq!(stats.most_recent, Some(day(1)));
}

#[test]
fn test_reset_problem_after_practice() {
    let (clock, v) = setup();
    v.verify(ProblemId(1), USER, "x*x").unwrap();
    v.store().reset_problem(USER, ProblemId(1)).unwrap();
    assert_eq!(due_today(&v), vec![ProblemId(2)]);

    clock.set(day(2));
    assert_eq!(due_today(&v), vec![ProblemId(1), ProblemId(2)]);
}
