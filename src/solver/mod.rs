// Solver adapters: concrete implementations of SolverService

#[cfg(feature = "coin_cbc")]
pub mod coin_cbc_solver;
pub mod factory;
#[cfg(feature = "highs")]
pub mod highs_solver;
pub mod runtime;

#[cfg(feature = "coin_cbc")]
pub use coin_cbc_solver::CoinCbcSolver;
pub use factory::SolverFactory;
#[cfg(feature = "highs")]
pub use highs_solver::HighsSolver;

#[cfg(any(feature = "highs", feature = "coin_cbc"))]
use crate::domain::{
    LinearProgram, SealedModel, Solution, SolutionQuality, SolutionStatus, SolverStatistics,
};

#[cfg(any(feature = "highs", feature = "coin_cbc"))]
fn statistics(model: &SealedModel, lp: &LinearProgram, solve_time_ms: f64) -> SolverStatistics {
    SolverStatistics {
        solve_time_ms,
        num_variables: model.num_variables() as u32,
        num_constraints: model.num_constraints() as u32,
        num_columns: lp.columns.len() as u32,
        num_rows: lp.rows.len() as u32,
        num_integer_vars: lp.num_integer_columns() as u32,
        num_binary_vars: lp.num_binary_columns() as u32,
    }
}

/// Turn the column values reported by a backend into a domain solution.
///
/// `columns` is `None` when the backend stopped without a primal solution.
/// A claimed assignment is checked against every lowered row; one that does
/// not hold up is downgraded to Unknown.
#[cfg(any(feature = "highs", feature = "coin_cbc"))]
fn incumbent(
    lp: &LinearProgram,
    claimed: SolutionStatus,
    columns: Option<&[f64]>,
    statistics: SolverStatistics,
) -> Solution {
    let columns = match columns {
        Some(columns) if columns.len() == lp.columns.len() => columns,
        _ => {
            log::warn!("no {} incumbent for '{}'", claimed, lp.name);
            return Solution::new(SolutionStatus::Unknown, "solver reported no incumbent")
                .with_statistics(statistics);
        }
    };

    let quality = SolutionQuality {
        max_constraint_violation: lp.max_constraint_violation(columns),
        max_integrality_violation: lp.max_integrality_violation(columns),
    };
    if !lp.is_feasible(columns) {
        log::warn!(
            "discarding {} incumbent of '{}': constraint violation {:.3e}, integrality violation {:.3e}",
            claimed,
            lp.name,
            quality.max_constraint_violation,
            quality.max_integrality_violation
        );
        return Solution::new(
            SolutionStatus::Unknown,
            "solver incumbent violates the model",
        )
        .with_statistics(statistics)
        .with_quality(quality);
    }

    let values = columns[..lp.num_model_columns()]
        .iter()
        .map(|v| v.round() as i64)
        .collect();
    Solution::with_values(claimed, lp.objective_value(columns), values)
        .with_statistics(statistics)
        .with_quality(quality)
}
