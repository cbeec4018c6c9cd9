//! Streak-based review intervals.
//!
//! A correct answer lengthens the gap before a problem is due again; an
//! incorrect one brings it back after `retry_after_days`.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::problem::{ProblemId, UserId};

/// Loaded from the `[schedule]` table of the drill configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Days until the next review after the n-th consecutive correct answer.
    /// The last entry repeats for longer streaks.
    pub intervals_days: Vec<u32>,
    /// Days until a problem answered incorrectly is due again.
    pub retry_after_days: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            intervals_days: vec![1, 2, 4, 7, 14, 30, 60],
            retry_after_days: 1,
        }
    }
}

impl ScheduleConfig {
    /// Gap in days after reaching `streak` consecutive correct answers.
    pub fn interval(&self, streak: u32) -> u32 {
        let index = streak.saturating_sub(1) as usize;
        self.intervals_days
            .get(index)
            .or_else(|| self.intervals_days.last())
            .copied()
            .unwrap_or(1)
    }

    /// Due date after an attempt on `date`; `streak` is the updated streak.
    pub fn next_due(&self, date: NaiveDate, correct: bool, streak: u32) -> NaiveDate {
        let gap = if correct {
            self.interval(streak)
        } else {
            self.retry_after_days
        };
        add_days(date, gap)
    }
}

pub(crate) fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

/// Review state of one problem for one user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalInfo {
    pub user_id: UserId,
    pub problem_id: ProblemId,
    pub correct_streak: u32,
    pub due: NaiveDate,
}

/// A problem handed to a user for one day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAssignment {
    pub user_id: UserId,
    pub problem_id: ProblemId,
    pub date: NaiveDate,
    pub solved: bool,
}
