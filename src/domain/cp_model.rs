// Constraint model: variable arena, literals, linear expressions and the
// constraint primitives handed to a solver backend.
//
// A `CpModel` is mutable while it is being built. `seal()` turns it into a
// `SealedModel`, which is the only form a `SolverService` accepts, so no
// constraint can be added once a solve has been requested.

use super::value_objects::{OptimizationType, VariableType};
use std::fmt;
use std::ops::{Add, Mul, Not, Sub};

/// Stable id of a variable in the model arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Reference to a boolean variable with a polarity.
///
/// Negating a literal never allocates a variable: `!lit` refers to the same
/// arena slot with the polarity flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Literal {
    var: VarId,
    negated: bool,
}

impl Literal {
    pub fn positive(var: VarId) -> Self {
        Self {
            var,
            negated: false,
        }
    }

    pub fn var(&self) -> VarId {
        self.var
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Truth value of this literal given the 0/1 value of its variable
    pub fn holds(&self, var_value: i64) -> bool {
        (var_value != 0) != self.negated
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Literal {
        Literal {
            var: self.var,
            negated: !self.negated,
        }
    }
}

/// Integer linear expression `Σ coeff·var + constant`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    terms: Vec<(VarId, i64)>,
    constant: i64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: i64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// Sum of the 0/1 values of the given literals
    pub fn sum<'a>(literals: impl IntoIterator<Item = &'a Literal>) -> Self {
        let mut expr = Self::new();
        for lit in literals {
            expr.add_literal(*lit, 1);
        }
        expr
    }

    /// Weighted sum of literals, one weight per literal
    pub fn weighted_sum<'a>(literals: impl IntoIterator<Item = (&'a Literal, i64)>) -> Self {
        let mut expr = Self::new();
        for (lit, weight) in literals {
            expr.add_literal(*lit, weight);
        }
        expr
    }

    pub fn add_term(&mut self, var: VarId, coeff: i64) -> &mut Self {
        self.terms.push((var, coeff));
        self
    }

    /// Adds `coeff · value(lit)`; a negated literal contributes `coeff · (1 - x)`
    pub fn add_literal(&mut self, lit: Literal, coeff: i64) -> &mut Self {
        if lit.negated {
            self.constant += coeff;
            self.terms.push((lit.var, -coeff));
        } else {
            self.terms.push((lit.var, coeff));
        }
        self
    }

    pub fn add_constant(&mut self, value: i64) -> &mut Self {
        self.constant += value;
        self
    }

    pub fn terms(&self) -> &[(VarId, i64)] {
        &self.terms
    }

    pub fn constant_term(&self) -> i64 {
        self.constant
    }

    pub fn is_constant(&self) -> bool {
        self.terms.iter().all(|&(_, c)| c == 0)
    }

    /// Evaluate against a full assignment indexed by `VarId`
    pub fn evaluate(&self, values: &[i64]) -> i64 {
        self.terms
            .iter()
            .map(|&(var, coeff)| coeff * values.get(var.0).copied().unwrap_or(0))
            .sum::<i64>()
            + self.constant
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        Self {
            terms: vec![(var, 1)],
            constant: 0,
        }
    }
}

impl From<Literal> for LinearExpr {
    fn from(lit: Literal) -> Self {
        let mut expr = Self::new();
        expr.add_literal(lit, 1);
        expr
    }
}

impl Add for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: LinearExpr) -> LinearExpr {
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self
    }
}

impl Sub for LinearExpr {
    type Output = LinearExpr;

    fn sub(self, rhs: LinearExpr) -> LinearExpr {
        self + rhs * -1
    }
}

impl Mul<i64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(mut self, factor: i64) -> LinearExpr {
        for (_, coeff) in self.terms.iter_mut() {
            *coeff *= factor;
        }
        self.constant *= factor;
        self
    }
}

/// Variable declaration held in the arena
#[derive(Debug, Clone)]
pub struct VariableDef {
    pub variable_type: VariableType,
    pub lower_bound: i64,
    pub upper_bound: i64,
    pub name: String,
}

/// Constraint primitives understood by every solver backend
#[derive(Debug, Clone)]
pub enum ModelConstraint {
    /// Exactly one literal is true
    ExactlyOne(Vec<Literal>),
    /// At most one literal is true
    AtMostOne(Vec<Literal>),
    /// `antecedent ⇒ consequent`
    Implication(Literal, Literal),
    /// `expr == value`
    LinearEquality { expr: LinearExpr, value: i64 },
    /// `min <= expr <= max`
    LinearRange {
        expr: LinearExpr,
        min: i64,
        max: i64,
    },
    /// `target == min(exprs)`
    MinEquality { target: VarId, exprs: Vec<LinearExpr> },
}

#[derive(Debug, Clone)]
pub struct Objective {
    pub optimization_type: OptimizationType,
    pub expr: LinearExpr,
}

/// Constraint model in the building phase
#[derive(Debug, Clone, Default)]
pub struct CpModel {
    name: String,
    variables: Vec<VariableDef>,
    constraints: Vec<ModelConstraint>,
    objective: Option<Objective>,
}

impl CpModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn new_bool(&mut self, label: impl Into<String>) -> Literal {
        let var = self.push_variable(VariableType::Boolean, 0, 1, label.into());
        Literal::positive(var)
    }

    pub fn new_int(&mut self, lower: i64, upper: i64, label: impl Into<String>) -> VarId {
        self.push_variable(VariableType::Integer, lower, upper, label.into())
    }

    fn push_variable(
        &mut self,
        variable_type: VariableType,
        lower_bound: i64,
        upper_bound: i64,
        name: String,
    ) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(VariableDef {
            variable_type,
            lower_bound,
            upper_bound,
            name,
        });
        id
    }

    pub fn add_exactly_one<'a>(&mut self, literals: impl IntoIterator<Item = &'a Literal>) {
        let literals = literals.into_iter().copied().collect();
        self.constraints.push(ModelConstraint::ExactlyOne(literals));
    }

    pub fn add_at_most_one<'a>(&mut self, literals: impl IntoIterator<Item = &'a Literal>) {
        let literals = literals.into_iter().copied().collect();
        self.constraints.push(ModelConstraint::AtMostOne(literals));
    }

    pub fn add_implication(&mut self, antecedent: Literal, consequent: Literal) {
        self.constraints
            .push(ModelConstraint::Implication(antecedent, consequent));
    }

    pub fn add_linear_equality(&mut self, expr: LinearExpr, value: i64) {
        self.constraints
            .push(ModelConstraint::LinearEquality { expr, value });
    }

    pub fn add_linear_range(&mut self, expr: LinearExpr, min: i64, max: i64) {
        self.constraints
            .push(ModelConstraint::LinearRange { expr, min, max });
    }

    pub fn add_min_equality(&mut self, target: VarId, exprs: Vec<LinearExpr>) {
        self.constraints
            .push(ModelConstraint::MinEquality { target, exprs });
    }

    /// Sets the objective; replaces any previously set direction
    pub fn maximize(&mut self, expr: LinearExpr) {
        self.set_objective(OptimizationType::Maximize, expr);
    }

    /// Sets the objective; replaces any previously set direction
    pub fn minimize(&mut self, expr: LinearExpr) {
        self.set_objective(OptimizationType::Minimize, expr);
    }

    fn set_objective(&mut self, optimization_type: OptimizationType, expr: LinearExpr) {
        if self.objective.is_some() {
            log::debug!("replacing objective of model '{}'", self.name);
        }
        self.objective = Some(Objective {
            optimization_type,
            expr,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn variable(&self, id: VarId) -> &VariableDef {
        &self.variables[id.0]
    }

    /// Freeze the model; no variable, constraint or objective can be added afterwards
    pub fn seal(self) -> SealedModel {
        log::debug!(
            "sealing model '{}': {} variables, {} constraints",
            self.name,
            self.variables.len(),
            self.constraints.len()
        );
        SealedModel { model: self }
    }
}

/// Immutable constraint model, ready to be solved
#[derive(Debug, Clone)]
pub struct SealedModel {
    model: CpModel,
}

impl SealedModel {
    pub fn name(&self) -> &str {
        &self.model.name
    }

    pub fn variables(&self) -> &[VariableDef] {
        &self.model.variables
    }

    pub fn variable(&self, id: VarId) -> &VariableDef {
        self.model.variable(id)
    }

    pub fn constraints(&self) -> &[ModelConstraint] {
        &self.model.constraints
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.model.objective.as_ref()
    }

    pub fn num_variables(&self) -> usize {
        self.model.num_variables()
    }

    pub fn num_constraints(&self) -> usize {
        self.model.num_constraints()
    }

    pub fn num_booleans(&self) -> usize {
        self.model
            .variables
            .iter()
            .filter(|v| v.variable_type == VariableType::Boolean)
            .count()
    }

    pub fn num_integers(&self) -> usize {
        self.num_variables() - self.num_booleans()
    }

    /// Lower and upper bound of `expr` implied by the variable domains
    pub fn expr_bounds(&self, expr: &LinearExpr) -> (i64, i64) {
        let mut lower = expr.constant;
        let mut upper = expr.constant;
        for &(var, coeff) in &expr.terms {
            let def = self.variable(var);
            if coeff >= 0 {
                lower += coeff * def.lower_bound;
                upper += coeff * def.upper_bound;
            } else {
                lower += coeff * def.upper_bound;
                upper += coeff * def.lower_bound;
            }
        }
        (lower, upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negation_keeps_the_variable() {
        let mut model = CpModel::new("test");
        let x = model.new_bool("x");
        let not_x = !x;

        assert_eq!(x.var(), not_x.var());
        assert!(not_x.is_negated());
        assert_eq!(!not_x, x);
        assert_eq!(model.num_variables(), 1);
    }

    #[test]
    fn negated_literal_contributes_one_minus_x() {
        let mut model = CpModel::new("test");
        let x = model.new_bool("x");
        let expr = LinearExpr::from(!x);

        assert_eq!(expr.evaluate(&[0]), 1);
        assert_eq!(expr.evaluate(&[1]), 0);
    }

    #[test]
    fn expression_arithmetic() {
        let mut model = CpModel::new("test");
        let x = model.new_int(0, 10, "x");
        let y = model.new_int(0, 10, "y");

        let expr = (LinearExpr::from(x) * 3 - LinearExpr::from(y)) + LinearExpr::constant(2);
        assert_eq!(expr.evaluate(&[4, 5]), 9);
    }

    #[test]
    fn expression_bounds_follow_variable_domains() {
        let mut model = CpModel::new("test");
        let x = model.new_int(-2, 5, "x");
        let b = model.new_bool("b");
        let mut expr = LinearExpr::from(x) * -2;
        expr.add_literal(b, 3).add_constant(1);

        let sealed = model.seal();
        assert_eq!(sealed.expr_bounds(&expr), (-9, 8));
    }

    #[test]
    fn second_objective_replaces_the_first() {
        let mut model = CpModel::new("test");
        let x = model.new_int(0, 3, "x");
        model.maximize(LinearExpr::from(x));
        model.minimize(LinearExpr::from(x) * 2);

        let sealed = model.seal();
        let objective = sealed.objective().unwrap();
        assert_eq!(objective.optimization_type, OptimizationType::Minimize);
        assert_eq!(objective.expr.terms(), &[(x, 2)]);
    }

    #[test]
    fn sealed_model_counts_variable_kinds() {
        let mut model = CpModel::new("test");
        let a = model.new_bool("a");
        let b = model.new_bool("b");
        model.new_int(0, 4, "n");
        model.add_at_most_one(&[a, b]);

        let sealed = model.seal();
        assert_eq!(sealed.num_booleans(), 2);
        assert_eq!(sealed.num_integers(), 1);
        assert_eq!(sealed.num_constraints(), 1);
    }
}
