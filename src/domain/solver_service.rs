// Domain service interface for solving sealed constraint models
// Defines the contract that any solver backend must follow

use super::cp_model::{ModelConstraint, SealedModel};
use super::models::{Solution, SolutionView, SolverConfig};

/// Error types for the solver service
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    #[error("Solver not available: {0}")]
    SolverNotAvailable(String),

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Domain service interface for constraint solvers
///
/// Backends translate a `SealedModel` into their own API, solve it
/// synchronously and report the assignment of every model variable.
pub trait SolverService: Send + Sync {
    /// Solve a sealed model
    fn solve(&self, model: &SealedModel, config: &SolverConfig) -> Result<Solution>;

    /// Solve and report incumbents to `on_solution` on the solving thread.
    ///
    /// The default reports the final assignment once, which is all the
    /// backends without incumbent callbacks can offer.
    fn solve_with_callback(
        &self,
        model: &SealedModel,
        config: &SolverConfig,
        on_solution: &mut dyn FnMut(&SolutionView<'_>),
    ) -> Result<Solution> {
        let solution = self.solve(model, config)?;
        if solution.is_feasible() {
            on_solution(&solution.view());
        }
        Ok(solution)
    }

    /// Validate a model without solving it
    fn validate(&self, model: &SealedModel) -> Result<()> {
        let mut errors = Vec::new();
        let num_vars = model.num_variables();

        for (i, var) in model.variables().iter().enumerate() {
            if var.lower_bound > var.upper_bound {
                errors.push(format!(
                    "Variable {} '{}' has lower bound ({}) > upper bound ({})",
                    i, var.name, var.lower_bound, var.upper_bound
                ));
            }
        }

        for (i, constraint) in model.constraints().iter().enumerate() {
            match constraint {
                ModelConstraint::ExactlyOne(literals) if literals.is_empty() => {
                    errors.push(format!("Constraint {} requires exactly one of no literals", i));
                }
                ModelConstraint::MinEquality { exprs, .. } if exprs.is_empty() => {
                    errors.push(format!("Constraint {} takes the minimum of no expressions", i));
                }
                ModelConstraint::LinearRange { min, max, .. } if min > max => {
                    errors.push(format!("Constraint {} has empty range [{}, {}]", i, min, max));
                }
                _ => {}
            }
        }

        let referenced = model.constraints().iter().flat_map(referenced_indices);
        let objective = model
            .objective()
            .into_iter()
            .flat_map(|o| o.expr.terms().iter().map(|(var, _)| var.index()));
        if let Some(index) = referenced.chain(objective).find(|&i| i >= num_vars) {
            errors.push(format!(
                "Variable index {} is out of range for a model with {} variables",
                index, num_vars
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SolverError::InvalidProblem(errors.join("; ")))
        }
    }

    /// Get the name of this solver backend
    fn name(&self) -> &str;

    /// Check if this solver supports mixed-integer programming
    fn supports_mip(&self) -> bool;
}

fn referenced_indices(constraint: &ModelConstraint) -> Vec<usize> {
    match constraint {
        ModelConstraint::ExactlyOne(literals) | ModelConstraint::AtMostOne(literals) => {
            literals.iter().map(|l| l.var().index()).collect()
        }
        ModelConstraint::Implication(a, b) => vec![a.var().index(), b.var().index()],
        ModelConstraint::LinearEquality { expr, .. } | ModelConstraint::LinearRange { expr, .. } => {
            expr.terms().iter().map(|(var, _)| var.index()).collect()
        }
        ModelConstraint::MinEquality { target, exprs } => std::iter::once(target.index())
            .chain(
                exprs
                    .iter()
                    .flat_map(|e| e.terms().iter().map(|(var, _)| var.index())),
            )
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cp_model::{CpModel, LinearExpr, Literal};
    use crate::domain::value_objects::SolutionStatus;

    struct FixedSolver {
        values: Vec<i64>,
    }

    impl SolverService for FixedSolver {
        fn solve(&self, _model: &SealedModel, _config: &SolverConfig) -> Result<Solution> {
            Ok(Solution::with_values(SolutionStatus::Optimal, 0.0, self.values.clone()))
        }

        fn name(&self) -> &str {
            "fixed"
        }

        fn supports_mip(&self) -> bool {
            true
        }
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        let mut model = CpModel::new("test");
        model.new_int(3, 1, "bad");
        let solver = FixedSolver { values: vec![] };

        let err = solver.validate(&model.seal()).unwrap_err();
        assert!(err.to_string().contains("'bad'"));
    }

    #[test]
    fn validate_rejects_empty_exactly_one() {
        let mut model = CpModel::new("test");
        let none: [Literal; 0] = [];
        model.add_exactly_one(&none);
        let solver = FixedSolver { values: vec![] };

        assert!(solver.validate(&model.seal()).is_err());
    }

    #[test]
    fn validate_accepts_well_formed_model() {
        let mut model = CpModel::new("test");
        let a = model.new_bool("a");
        let n = model.new_int(0, 1, "n");
        model.add_linear_equality(LinearExpr::from(a) - LinearExpr::from(n), 0);
        let solver = FixedSolver { values: vec![] };

        assert!(solver.validate(&model.seal()).is_ok());
    }

    #[test]
    fn default_callback_reports_final_assignment_once() {
        let mut model = CpModel::new("test");
        let a = model.new_bool("a");
        let sealed = model.seal();
        let solver = FixedSolver { values: vec![1] };

        let mut seen = Vec::new();
        let solution = solver
            .solve_with_callback(&sealed, &SolverConfig::default(), &mut |view| {
                seen.push(view.literal(a))
            })
            .unwrap();

        assert!(solution.is_optimal());
        assert_eq!(seen, vec![true]);
    }
}
