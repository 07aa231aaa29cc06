// HiGHS Solver Adapter
// Implements the SolverService interface for HiGHS on the lowered linear program

use super::{incumbent, runtime, statistics};
use crate::domain::{
    models::{Solution, SolverConfig},
    solver_service::{Result, SolverError, SolverService},
    value_objects::{ConstraintType, OptimizationType, SolutionStatus},
    LinearProgram, SealedModel,
};
use highs::{HighsModelStatus, RowProblem, Sense};
use std::time::Instant;

pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for HighsSolver {
    fn solve(&self, model: &SealedModel, config: &SolverConfig) -> Result<Solution> {
        self.validate(model)?;

        let start_time = Instant::now();
        let lp = LinearProgram::lower(model);

        // Columns first, then rows
        let mut pb = RowProblem::default();
        let mut cols = Vec::with_capacity(lp.columns.len());
        // every column is integral; booleans are integers in [0, 1]
        for (column, &obj_coeff) in lp.columns.iter().zip(&lp.objective) {
            let col = pb.add_integer_column(obj_coeff, column.lower_bound..=column.upper_bound);
            cols.push(col);
        }

        for row in &lp.rows {
            let terms: Vec<_> = row.terms.iter().map(|&(i, coeff)| (cols[i], coeff)).collect();
            match row.constraint_type {
                ConstraintType::LessThanOrEqual => pb.add_row(..=row.bound, &terms),
                ConstraintType::Equal => pb.add_row(row.bound..=row.bound, &terms),
                ConstraintType::GreaterThanOrEqual => pb.add_row(row.bound.., &terms),
            }
        }

        let sense = match lp.optimization_type {
            OptimizationType::Maximize => Sense::Maximise,
            OptimizationType::Minimize => Sense::Minimise,
        };

        let mut highs_model = pb.optimise(sense);
        if !config.verbose {
            highs_model.make_quiet();
        }
        highs_model.set_option("threads", runtime::thread_budget(config.threads) as i32);
        if let Some(seconds) = config.time_limit {
            highs_model.set_option("time_limit", seconds);
        }
        if let Some(gap) = config.gap_tolerance {
            highs_model.set_option("mip_rel_gap", gap);
        }

        log::debug!(
            "HiGHS: solving '{}' with {} columns and {} rows",
            lp.name,
            lp.columns.len(),
            lp.rows.len()
        );
        let solved = highs_model.try_solve().map_err(|status| {
            SolverError::ExecutionFailed(format!("HiGHS failed to run: {:?}", status))
        })?;
        let solve_time = start_time.elapsed().as_secs_f64() * 1000.0;
        let statistics = statistics(model, &lp, solve_time);

        let status = solved.status();
        log::info!("HiGHS finished '{}' with {:?} in {:.1} ms", lp.name, status, solve_time);

        match status {
            HighsModelStatus::Optimal => {
                let columns = solved.get_solution().columns().to_vec();
                Ok(incumbent(&lp, SolutionStatus::Optimal, Some(columns.as_slice()), statistics))
            }
            HighsModelStatus::Infeasible | HighsModelStatus::UnboundedOrInfeasible => {
                Ok(Solution::new(
                    SolutionStatus::Infeasible,
                    "Problem is infeasible: no solution satisfies all constraints",
                )
                .with_statistics(statistics))
            }
            status if stopped_early(status) => {
                // the MIP gap stays infinite until a primal solution exists
                let columns = solved
                    .mip_gap()
                    .is_finite()
                    .then(|| solved.get_solution().columns().to_vec());
                Ok(incumbent(
                    &lp,
                    SolutionStatus::Feasible,
                    columns.as_deref(),
                    statistics,
                ))
            }
            status => Err(SolverError::ExecutionFailed(format!(
                "HiGHS solver returned status: {:?}",
                status
            ))),
        }
    }

    fn name(&self) -> &str {
        "HiGHS"
    }

    fn supports_mip(&self) -> bool {
        true
    }
}

/// Statuses of a search that ended without proving optimality or infeasibility
fn stopped_early(status: HighsModelStatus) -> bool {
    matches!(
        status,
        HighsModelStatus::ReachedTimeLimit
            | HighsModelStatus::ReachedIterationLimit
            | HighsModelStatus::ObjectiveBound
            | HighsModelStatus::ObjectiveTarget
            | HighsModelStatus::Unknown
    )
}
