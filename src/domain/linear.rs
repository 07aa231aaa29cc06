// Linear lowering of a sealed constraint model.
// Every primitive becomes one or more rows over integer columns so that any
// MIP backend can consume the model without knowing about literals.

use super::cp_model::{LinearExpr, ModelConstraint, SealedModel, VarId};
use super::value_objects::{ConstraintType, OptimizationType, VariableType};
use std::collections::BTreeMap;

const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Column of the lowered program
#[derive(Debug, Clone)]
pub struct Column {
    pub variable_type: VariableType,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub name: String,
}

/// Sparse linear row `Σ coeff·column (<=|=|>=) bound`
#[derive(Debug, Clone)]
pub struct Row {
    pub constraint_type: ConstraintType,
    pub terms: Vec<(usize, f64)>,
    pub bound: f64,
    pub name: String,
}

impl Row {
    fn activity(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(col, coeff)| coeff * values.get(col).copied().unwrap_or(0.0))
            .sum()
    }

    fn violation(&self, values: &[f64]) -> f64 {
        let activity = self.activity(values);
        match self.constraint_type {
            ConstraintType::LessThanOrEqual => (activity - self.bound).max(0.0),
            ConstraintType::GreaterThanOrEqual => (self.bound - activity).max(0.0),
            ConstraintType::Equal => (activity - self.bound).abs(),
        }
    }
}

/// Mixed-integer linear program equivalent to a sealed model.
///
/// Columns `0..num_model_columns` correspond one-to-one to the model's
/// `VarId`s; auxiliary columns introduced by the lowering follow them.
#[derive(Debug, Clone)]
pub struct LinearProgram {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub optimization_type: OptimizationType,
    pub objective: Vec<f64>,
    pub objective_offset: f64,
    num_model_columns: usize,
}

impl LinearProgram {
    pub fn lower(model: &SealedModel) -> Self {
        let columns = model
            .variables()
            .iter()
            .map(|def| Column {
                variable_type: def.variable_type,
                lower_bound: def.lower_bound as f64,
                upper_bound: def.upper_bound as f64,
                name: def.name.clone(),
            })
            .collect::<Vec<_>>();

        let mut program = Self {
            name: model.name().to_string(),
            num_model_columns: columns.len(),
            columns,
            rows: Vec::new(),
            optimization_type: OptimizationType::Maximize,
            objective: Vec::new(),
            objective_offset: 0.0,
        };

        for (index, constraint) in model.constraints().iter().enumerate() {
            program.lower_constraint(model, index, constraint);
        }

        program.objective = vec![0.0; program.columns.len()];
        if let Some(objective) = model.objective() {
            let (terms, constant) = normalize(&objective.expr);
            for (col, coeff) in terms {
                program.objective[col] = coeff;
            }
            program.objective_offset = constant;
            program.optimization_type = objective.optimization_type;
        }

        log::debug!(
            "lowered '{}' into {} columns and {} rows",
            program.name,
            program.columns.len(),
            program.rows.len()
        );
        program
    }

    fn lower_constraint(&mut self, model: &SealedModel, index: usize, constraint: &ModelConstraint) {
        let name = format!("c{}", index);
        match constraint {
            ModelConstraint::ExactlyOne(literals) => {
                self.push_row(&name, LinearExpr::sum(literals), ConstraintType::Equal, 1);
            }
            ModelConstraint::AtMostOne(literals) => {
                self.push_row(
                    &name,
                    LinearExpr::sum(literals),
                    ConstraintType::LessThanOrEqual,
                    1,
                );
            }
            ModelConstraint::Implication(antecedent, consequent) => {
                let expr = LinearExpr::from(*antecedent) - LinearExpr::from(*consequent);
                self.push_row(&name, expr, ConstraintType::LessThanOrEqual, 0);
            }
            ModelConstraint::LinearEquality { expr, value } => {
                self.push_row(&name, expr.clone(), ConstraintType::Equal, *value);
            }
            ModelConstraint::LinearRange { expr, min, max } => {
                if min == max {
                    self.push_row(&name, expr.clone(), ConstraintType::Equal, *min);
                } else {
                    let lo = format!("{}_lo", name);
                    let hi = format!("{}_hi", name);
                    self.push_row(&lo, expr.clone(), ConstraintType::GreaterThanOrEqual, *min);
                    self.push_row(&hi, expr.clone(), ConstraintType::LessThanOrEqual, *max);
                }
            }
            ModelConstraint::MinEquality { target, exprs } => {
                self.lower_min_equality(model, &name, *target, exprs);
            }
        }
    }

    // target <= e_i for every i, and target >= e_i - M_i (1 - z_i) where
    // exactly one selector z_i is set.
    fn lower_min_equality(
        &mut self,
        model: &SealedModel,
        name: &str,
        target: VarId,
        exprs: &[LinearExpr],
    ) {
        if let [only] = exprs {
            let expr = LinearExpr::from(target) - only.clone();
            self.push_row(name, expr, ConstraintType::Equal, 0);
            return;
        }

        let target_lower = model.variable(target).lower_bound;
        let mut selectors = Vec::with_capacity(exprs.len());

        for (i, expr) in exprs.iter().enumerate() {
            let upper = LinearExpr::from(target) - expr.clone();
            self.push_row(
                &format!("{}_le{}", name, i),
                upper,
                ConstraintType::LessThanOrEqual,
                0,
            );

            let (_, expr_upper) = model.expr_bounds(expr);
            let big_m = (expr_upper - target_lower).max(0) as f64;
            let selector = self.columns.len();
            self.columns.push(Column {
                variable_type: VariableType::Boolean,
                lower_bound: 0.0,
                upper_bound: 1.0,
                name: format!("{}_sel{}", name, i),
            });
            selectors.push(selector);

            // target - e_i - M z_i >= -M
            let (mut terms, constant) = normalize(&(LinearExpr::from(target) - expr.clone()));
            terms.push((selector, -big_m));
            self.rows.push(Row {
                constraint_type: ConstraintType::GreaterThanOrEqual,
                terms,
                bound: -big_m - constant,
                name: format!("{}_ge{}", name, i),
            });
        }

        self.rows.push(Row {
            constraint_type: ConstraintType::Equal,
            terms: selectors.into_iter().map(|col| (col, 1.0)).collect(),
            bound: 1.0,
            name: format!("{}_select", name),
        });
    }

    fn push_row(&mut self, name: &str, expr: LinearExpr, constraint_type: ConstraintType, rhs: i64) {
        let (terms, constant) = normalize(&expr);
        self.rows.push(Row {
            constraint_type,
            terms,
            bound: rhs as f64 - constant,
            name: name.to_string(),
        });
    }

    pub fn num_model_columns(&self) -> usize {
        self.num_model_columns
    }

    pub fn num_integer_columns(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| c.variable_type == VariableType::Integer)
            .count()
    }

    pub fn num_binary_columns(&self) -> usize {
        self.columns.len() - self.num_integer_columns()
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .iter()
            .zip(values)
            .map(|(coeff, value)| coeff * value)
            .sum::<f64>()
            + self.objective_offset
    }

    /// Largest row or bound violation of an assignment over all columns
    pub fn max_constraint_violation(&self, values: &[f64]) -> f64 {
        let bounds = self
            .columns
            .iter()
            .zip(values)
            .map(|(col, &v)| (col.lower_bound - v).max(v - col.upper_bound).max(0.0));
        let rows = self.rows.iter().map(|row| row.violation(values));
        bounds.chain(rows).fold(0.0, f64::max)
    }

    pub fn max_integrality_violation(&self, values: &[f64]) -> f64 {
        values
            .iter()
            .map(|v| (v - v.round()).abs())
            .fold(0.0, f64::max)
    }

    /// Whether an assignment satisfies every row, bound and integrality requirement
    pub fn is_feasible(&self, values: &[f64]) -> bool {
        values.len() == self.columns.len()
            && self.max_constraint_violation(values) <= FEASIBILITY_TOLERANCE
            && self.max_integrality_violation(values) <= FEASIBILITY_TOLERANCE
    }
}

/// Merge duplicate variables and drop zero coefficients
fn normalize(expr: &LinearExpr) -> (Vec<(usize, f64)>, f64) {
    let mut merged: BTreeMap<usize, i64> = BTreeMap::new();
    for &(var, coeff) in expr.terms() {
        *merged.entry(var.index()).or_insert(0) += coeff;
    }
    let terms = merged
        .into_iter()
        .filter(|&(_, coeff)| coeff != 0)
        .map(|(col, coeff)| (col, coeff as f64))
        .collect();
    (terms, expr.constant_term() as f64)
}
