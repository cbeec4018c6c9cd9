//! Anti-explosion budget for one simplification pass.
//!
//! - **`Operation`**: what is being done (expansion, exact powers, ...)
//! - **`Metric`**: what is being measured (terms, bits, nodes)
//! - **`Budget`**: limits and usage, array-indexed for O(1) charge
//!
//! ```ignore
//! let mut budget = Budget::new();
//! budget.set_limit(Operation::Expand, Metric::TermsMaterialized, 1000);
//! budget.charge(Operation::Expand, Metric::TermsMaterialized, 50)?;
//! ```

use std::fmt;

use crate::options::EngineLimits;

/// Operations that consume budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Operation {
    /// Whole simplification pass
    Simplify = 0,
    /// Polynomial products and integer powers of sums
    Expand = 1,
    /// Exact big-number powers (`3**4000`)
    NumericPower = 2,
    /// Exact polynomial division
    PolyOps = 3,
}

impl Operation {
    pub const COUNT: usize = 4;

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simplify => write!(f, "Simplify"),
            Self::Expand => write!(f, "Expand"),
            Self::NumericPower => write!(f, "NumericPower"),
            Self::PolyOps => write!(f, "PolyOps"),
        }
    }
}

/// Metrics being measured for budget tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Metric {
    /// Nodes created in the Context (proxy for memory)
    NodesCreated = 0,
    /// Polynomial terms produced by multiplication
    TermsMaterialized = 1,
    /// Estimated size of an exact integer result
    NumberBits = 2,
    /// Term products performed by division steps
    PolyOps = 3,
}

impl Metric {
    pub const COUNT: usize = 4;

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodesCreated => write!(f, "NodesCreated"),
            Self::TermsMaterialized => write!(f, "TermsMaterialized"),
            Self::NumberBits => write!(f, "NumberBits"),
            Self::PolyOps => write!(f, "PolyOps"),
        }
    }
}

/// Error returned when a budget limit is exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetExceeded {
    /// Which operation exceeded the budget
    pub op: Operation,
    /// Which metric exceeded
    pub metric: Metric,
    /// How much was used
    pub used: u64,
    /// What the limit was
    pub limit: u64,
}

impl fmt::Display for BudgetExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "budget exceeded during {}: {} used {} (limit {})",
            self.op, self.metric, self.used, self.limit
        )
    }
}

impl std::error::Error for BudgetExceeded {}

/// Limits and usage counters per (operation, metric). A limit of 0 means
/// unlimited.
#[derive(Debug, Clone, Default)]
pub struct Budget {
    limits: [[u64; Metric::COUNT]; Operation::COUNT],
    used: [[u64; Metric::COUNT]; Operation::COUNT],
}

impl Budget {
    /// Create a new budget with no limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Budget for a single simplification pass under `limits`.
    pub fn for_pass(limits: &EngineLimits) -> Self {
        let mut b = Self::new();
        b.set_limit(
            Operation::Simplify,
            Metric::NodesCreated,
            limits.max_nodes_per_pass,
        );
        b.set_limit(
            Operation::Expand,
            Metric::TermsMaterialized,
            limits.max_expand_terms,
        );
        b.set_limit(
            Operation::NumericPower,
            Metric::NumberBits,
            limits.max_number_bits,
        );
        b.set_limit(Operation::PolyOps, Metric::PolyOps, limits.max_poly_ops);
        b
    }

    #[inline]
    pub fn set_limit(&mut self, op: Operation, metric: Metric, limit: u64) {
        self.limits[op.index()][metric.index()] = limit;
    }

    #[inline]
    pub fn limit(&self, op: Operation, metric: Metric) -> u64 {
        self.limits[op.index()][metric.index()]
    }

    #[inline]
    pub fn used(&self, op: Operation, metric: Metric) -> u64 {
        self.used[op.index()][metric.index()]
    }

    /// Charge `amount` to an (operation, metric) pair.
    #[inline]
    pub fn charge(
        &mut self,
        op: Operation,
        metric: Metric,
        amount: u64,
    ) -> Result<(), BudgetExceeded> {
        let limit = self.limits[op.index()][metric.index()];
        let used = &mut self.used[op.index()][metric.index()];

        *used = used.saturating_add(amount);

        if limit > 0 && *used > limit {
            return Err(BudgetExceeded {
                op,
                metric,
                used: *used,
                limit,
            });
        }
        Ok(())
    }

    /// Record an absolute reading (e.g. arena size) rather than a delta.
    pub fn observe(
        &mut self,
        op: Operation,
        metric: Metric,
        reading: u64,
    ) -> Result<(), BudgetExceeded> {
        let current = self.used(op, metric);
        self.charge(op, metric, reading.saturating_sub(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_under_limit() {
        let mut budget = Budget::new();
        budget.set_limit(Operation::Expand, Metric::TermsMaterialized, 100);

        assert!(budget
            .charge(Operation::Expand, Metric::TermsMaterialized, 50)
            .is_ok());
        assert_eq!(
            budget.used(Operation::Expand, Metric::TermsMaterialized),
            50
        );
    }

    #[test]
    fn test_charge_exceeds_limit() {
        let mut budget = Budget::new();
        budget.set_limit(Operation::Expand, Metric::TermsMaterialized, 100);

        let err = budget
            .charge(Operation::Expand, Metric::TermsMaterialized, 150)
            .unwrap_err();
        assert_eq!(err.op, Operation::Expand);
        assert_eq!(err.metric, Metric::TermsMaterialized);
        assert_eq!(err.used, 150);
        assert_eq!(err.limit, 100);
    }

    #[test]
    fn test_unlimited_when_zero() {
        let mut budget = Budget::new();
        assert!(budget
            .charge(Operation::Expand, Metric::TermsMaterialized, 1_000_000)
            .is_ok());
    }

    #[test]
    fn test_accumulative_charge() {
        let mut budget = Budget::new();
        budget.set_limit(Operation::NumericPower, Metric::NumberBits, 100);
        for _ in 0..3 {
            budget
                .charge(Operation::NumericPower, Metric::NumberBits, 30)
                .unwrap();
        }
        assert!(budget
            .charge(Operation::NumericPower, Metric::NumberBits, 20)
            .is_err());
    }

    #[test]
    fn test_observe_tracks_absolute_readings() {
        let mut budget = Budget::new();
        budget.set_limit(Operation::Simplify, Metric::NodesCreated, 10);
        budget
            .observe(Operation::Simplify, Metric::NodesCreated, 4)
            .unwrap();
        budget
            .observe(Operation::Simplify, Metric::NodesCreated, 9)
            .unwrap();
        assert_eq!(budget.used(Operation::Simplify, Metric::NodesCreated), 9);
        assert!(budget
            .observe(Operation::Simplify, Metric::NodesCreated, 11)
            .is_err());
    }

    #[test]
    fn test_pass_budget_uses_engine_limits() {
        let limits = EngineLimits::default();
        let budget = Budget::for_pass(&limits);
        assert_eq!(
            budget.limit(Operation::Expand, Metric::TermsMaterialized),
            limits.max_expand_terms
        );
        assert_eq!(
            budget.limit(Operation::PolyOps, Metric::PolyOps),
            limits.max_poly_ops
        );
    }

    #[test]
    fn test_error_display() {
        let err = BudgetExceeded {
            op: Operation::Expand,
            metric: Metric::TermsMaterialized,
            used: 150,
            limit: 100,
        };

        let msg = format!("{}", err);
        assert!(msg.contains("Expand"));
        assert!(msg.contains("TermsMaterialized"));
        assert!(msg.contains("150"));
        assert!(msg.contains("100"));
    }
}
