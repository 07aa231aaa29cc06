use super::cp_model::{Literal, VarId};
use super::value_objects::{SolutionStatus, SolverBackend};
use serde::Deserialize;

/// Configuration for the solver
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    /// Wall-clock limit in seconds
    pub time_limit: Option<f64>,
    /// Relative MIP gap at which the search may stop
    pub gap_tolerance: Option<f64>,
    /// Worker threads; falls back to the process-wide default
    pub threads: Option<usize>,
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: SolverBackend::Auto,
            time_limit: None,
            gap_tolerance: None,
            threads: None,
            verbose: false,
        }
    }
}

impl SolverConfig {
    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }
}

/// Statistics about the solve process
#[derive(Debug, Clone, Default)]
pub struct SolverStatistics {
    pub solve_time_ms: f64,
    pub num_variables: u32,
    pub num_constraints: u32,
    pub num_columns: u32,
    pub num_rows: u32,
    pub num_integer_vars: u32,
    pub num_binary_vars: u32,
}

/// Quality metrics for the solution
#[derive(Debug, Clone, Default)]
pub struct SolutionQuality {
    pub max_constraint_violation: f64,
    pub max_integrality_violation: f64,
}

/// Result of solving a sealed model.
///
/// `values` holds one entry per model variable, indexed by `VarId`; it is
/// empty when the status carries no solution.
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: SolutionStatus,
    pub objective_value: Option<f64>,
    pub values: Vec<i64>,
    pub message: String,
    pub statistics: SolverStatistics,
    pub quality: SolutionQuality,
}

impl Solution {
    pub fn new(status: SolutionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            objective_value: None,
            values: Vec::new(),
            message: message.into(),
            statistics: SolverStatistics::default(),
            quality: SolutionQuality::default(),
        }
    }

    pub fn with_values(status: SolutionStatus, value: f64, values: Vec<i64>) -> Self {
        Self {
            status,
            objective_value: Some(value),
            values,
            message: format!("{} solution found", status),
            statistics: SolverStatistics::default(),
            quality: SolutionQuality::default(),
        }
    }

    pub fn with_statistics(mut self, statistics: SolverStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn with_quality(mut self, quality: SolutionQuality) -> Self {
        self.quality = quality;
        self
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    pub fn is_feasible(&self) -> bool {
        self.status.has_solution()
    }

    pub fn view(&self) -> SolutionView<'_> {
        SolutionView {
            status: self.status,
            values: &self.values,
        }
    }
}

/// Read-only access to an assignment, handed to solution callbacks
#[derive(Debug, Clone, Copy)]
pub struct SolutionView<'a> {
    pub status: SolutionStatus,
    values: &'a [i64],
}

impl<'a> SolutionView<'a> {
    pub fn new(status: SolutionStatus, values: &'a [i64]) -> Self {
        Self { status, values }
    }

    pub fn value(&self, var: VarId) -> i64 {
        self.values.get(var.index()).copied().unwrap_or(0)
    }

    pub fn literal(&self, lit: Literal) -> bool {
        lit.holds(self.value(lit.var()))
    }

    pub fn values(&self) -> &'a [i64] {
        self.values
    }
}
