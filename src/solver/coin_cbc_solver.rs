// COIN-OR CBC Solver Adapter
// Implements the SolverService interface for CBC through good_lp

use super::{incumbent, runtime, statistics};
use crate::domain::{
    models::{Solution, SolverConfig},
    solver_service::{Result, SolverError, SolverService},
    value_objects::{ConstraintType, OptimizationType, SolutionStatus},
    LinearProgram, SealedModel,
};
use good_lp::{
    solvers::coin_cbc, variable, variables, Expression, ResolutionError,
    Solution as GoodLpSolutionTrait, SolverModel, Variable as GoodLpVariable,
};
use std::time::Instant;

pub struct CoinCbcSolver;

impl CoinCbcSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CoinCbcSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for CoinCbcSolver {
    fn solve(&self, model: &SealedModel, config: &SolverConfig) -> Result<Solution> {
        self.validate(model)?;

        let start_time = Instant::now();
        let lp = LinearProgram::lower(model);

        let mut vars = variables!();
        let lp_variables: Vec<GoodLpVariable> = lp
            .columns
            .iter()
            .map(|column| {
                vars.add(
                    variable()
                        .integer()
                        .min(column.lower_bound)
                        .max(column.upper_bound),
                )
            })
            .collect();

        let mut obj_expr: Expression = 0.into();
        for (&coeff, &var) in lp.objective.iter().zip(&lp_variables) {
            if coeff != 0.0 {
                obj_expr += coeff * var;
            }
        }

        let unsolved = match lp.optimization_type {
            OptimizationType::Maximize => vars.maximise(obj_expr),
            OptimizationType::Minimize => vars.minimise(obj_expr),
        };
        let mut lp_model = unsolved.using(coin_cbc::coin_cbc);

        for row in &lp.rows {
            let mut lhs: Expression = 0.into();
            for &(i, coeff) in &row.terms {
                lhs += coeff * lp_variables[i];
            }

            lp_model = match row.constraint_type {
                ConstraintType::LessThanOrEqual => lp_model.with(lhs.leq(row.bound)),
                ConstraintType::Equal => lp_model.with(lhs.eq(row.bound)),
                ConstraintType::GreaterThanOrEqual => lp_model.with(lhs.geq(row.bound)),
            };
        }

        lp_model.set_parameter("logLevel", if config.verbose { "1" } else { "0" });
        lp_model.set_parameter(
            "threads",
            &runtime::thread_budget(config.threads).to_string(),
        );
        if let Some(seconds) = config.time_limit {
            lp_model.set_parameter("seconds", &seconds.to_string());
        }
        if let Some(gap) = config.gap_tolerance {
            lp_model.set_parameter("ratioGap", &gap.to_string());
        }

        log::debug!(
            "CBC: solving '{}' with {} columns and {} rows",
            lp.name,
            lp.columns.len(),
            lp.rows.len()
        );
        let solution_result = lp_model.solve();
        let solve_time = start_time.elapsed().as_secs_f64() * 1000.0;
        let statistics = statistics(model, &lp, solve_time);

        match solution_result {
            Ok(sol) => {
                let columns: Vec<f64> = lp_variables.iter().map(|&var| sol.value(var)).collect();
                // a stopped search still hands back its incumbent
                let claimed = if sol.model().is_proven_optimal() {
                    SolutionStatus::Optimal
                } else {
                    SolutionStatus::Feasible
                };
                log::info!("CBC finished '{}' with {} in {:.1} ms", lp.name, claimed, solve_time);
                Ok(incumbent(&lp, claimed, Some(columns.as_slice()), statistics))
            }
            Err(ResolutionError::Infeasible) => {
                log::info!("CBC proved '{}' infeasible in {:.1} ms", lp.name, solve_time);
                Ok(Solution::new(
                    SolutionStatus::Infeasible,
                    "Problem is infeasible: no solution satisfies all constraints",
                )
                .with_statistics(statistics))
            }
            Err(ResolutionError::Other(reason)) if config.time_limit.is_some() => {
                log::warn!("CBC stopped without an incumbent: {}", reason);
                Ok(Solution::new(SolutionStatus::Unknown, reason).with_statistics(statistics))
            }
            Err(e) => Err(SolverError::ExecutionFailed(format!("{:?}", e))),
        }
    }

    fn name(&self) -> &str {
        "COIN-OR CBC"
    }

    fn supports_mip(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CpModel, LinearExpr};

    #[test]
    fn solves_a_small_assignment() {
        let mut model = CpModel::new("small");
        let a = model.new_bool("a");
        let b = model.new_bool("b");
        let c = model.new_bool("c");
        model.add_exactly_one(&[a, b, c]);
        model.add_at_most_one(&[b, c]);
        model.maximize(LinearExpr::weighted_sum([(&a, 4), (&b, 3), (&c, 2)]));

        let solution = CoinCbcSolver::new()
            .solve(&model.seal(), &SolverConfig::default())
            .unwrap();

        assert!(solution.is_optimal());
        assert_eq!(solution.values, vec![1, 0, 0]);
        assert!(solution.quality.max_constraint_violation < 1e-6);
    }

    #[test]
    fn reports_infeasibility() {
        let mut model = CpModel::new("conflict");
        let a = model.new_bool("a");
        let b = model.new_bool("b");
        model.add_exactly_one(&[a, b]);
        model.add_linear_equality(LinearExpr::sum(&[a, b]), 2);

        let solution = CoinCbcSolver::new()
            .solve(&model.seal(), &SolverConfig::default())
            .unwrap();
        assert_eq!(solution.status, SolutionStatus::Infeasible);
    }
}
