// Domain value objects representing core scheduling and solver concepts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of decision variable in the constraint model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    /// Bounded integer (x ∈ [lo, hi] ∩ ℤ)
    Integer,
    /// Boolean variable (x ∈ {0, 1})
    Boolean,
}

/// Type of constraint comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintType {
    /// Less than or equal (≤)
    LessThanOrEqual,
    /// Equal (=)
    Equal,
    /// Greater than or equal (≥)
    GreaterThanOrEqual,
}

/// Direction of optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationType {
    /// Minimize the objective function
    Minimize,
    /// Maximize the objective function
    Maximize,
}

/// Status of a solve attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// Found a solution and proved it optimal
    Optimal,
    /// Found a solution that satisfies every constraint, optimality not proven
    Feasible,
    /// Proved that no assignment satisfies the constraints
    Infeasible,
    /// Stopped (usually on the time limit) without a usable answer
    Unknown,
}

impl SolutionStatus {
    pub fn has_solution(&self) -> bool {
        matches!(self, SolutionStatus::Optimal | SolutionStatus::Feasible)
    }
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionStatus::Optimal => write!(f, "Optimal"),
            SolutionStatus::Feasible => write!(f, "Feasible"),
            SolutionStatus::Infeasible => write!(f, "Infeasible"),
            SolutionStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Solver backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    /// Automatically select the best compiled-in solver
    #[default]
    Auto,
    /// COIN-OR CBC solver
    CoinCbc,
    /// HiGHS solver
    Highs,
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverBackend::Auto => write!(f, "Auto"),
            SolverBackend::CoinCbc => write!(f, "COIN-OR CBC"),
            SolverBackend::Highs => write!(f, "HiGHS"),
        }
    }
}

/// Category of a day in the roster horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayCategory {
    Weekday,
    WeekendOrHoliday,
}

impl DayCategory {
    /// Shift types instantiated on a day of this category
    pub fn shift_types(&self) -> &'static [ShiftType] {
        match self {
            DayCategory::Weekday => &[ShiftType::WeekDay],
            DayCategory::WeekendOrHoliday => &[ShiftType::Weekend, ShiftType::WeekendShortcall],
        }
    }
}

/// Kind of duty slot, each carrying a weighted-hour cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShiftType {
    /// Weekday on-call (16 h)
    WeekDay,
    /// Full weekend or holiday on-call (24 h)
    Weekend,
    /// Short weekend or holiday call (6 h)
    WeekendShortcall,
}

impl ShiftType {
    pub const ALL: [ShiftType; 3] = [
        ShiftType::WeekDay,
        ShiftType::Weekend,
        ShiftType::WeekendShortcall,
    ];

    pub fn hours(&self) -> i64 {
        match self {
            ShiftType::WeekDay => 16,
            ShiftType::Weekend => 24,
            ShiftType::WeekendShortcall => 6,
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftType::WeekDay => write!(f, "WEEK_DAY"),
            ShiftType::Weekend => write!(f, "WEEKEND"),
            ShiftType::WeekendShortcall => write!(f, "WEEKEND_SHORTCALL"),
        }
    }
}
