// ABOUTME: Thin adapter giving the evaluator a three-operation contract over the cassowary solver

use crate::error::EvalError;
use cassowary::strength::REQUIRED;
use cassowary::WeightedRelation::{EQ, GE, LE};
use cassowary::{Expression, Solver, Variable};
use std::collections::HashMap;

/// How a linear constraint relates its left-hand side to zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Lte,
    Gte,
}

/// The single solver instance threaded through an evaluation.
///
/// The contract is deliberately small: allocate variables, add constraints of
/// the form `Σ coefficient·variable + constant  rel  0`, and read a variable's
/// current value. No removal, no priorities, no re-solving; the only order of
/// operations is add-then-read.
pub struct ConstraintSystem {
    solver: Solver,
    values: HashMap<Variable, f64>,
}

impl ConstraintSystem {
    pub fn new() -> Self {
        ConstraintSystem {
            solver: Solver::new(),
            values: HashMap::new(),
        }
    }

    /// Allocates a fresh solver variable
    pub fn new_var(&mut self) -> Variable {
        Variable::new()
    }

    /// Adds `Σ coefficient·variable + constant  relation  0` at required strength.
    /// Rejection by the solver (an inconsistent system) is a LayoutError.
    pub fn constrain(
        &mut self,
        relation: Relation,
        constant: f64,
        terms: &[(Variable, f64)],
    ) -> Result<(), EvalError> {
        let mut expr = Expression::from_constant(constant);
        for &(variable, coefficient) in terms {
            expr = expr + variable * coefficient;
        }

        let constraint = match relation {
            Relation::Eq => expr | EQ(REQUIRED) | 0.0,
            Relation::Lte => expr | LE(REQUIRED) | 0.0,
            Relation::Gte => expr | GE(REQUIRED) | 0.0,
        };

        self.solver
            .add_constraint(constraint)
            .map_err(|e| EvalError::LayoutError(format!("{:?}", e)))
    }

    /// Reads a variable's value under the current constraint set.
    /// Variables the solver has never placed in a row evaluate to 0.
    pub fn value(&mut self, variable: Variable) -> f64 {
        for &(changed, value) in self.solver.fetch_changes() {
            self.values.insert(changed, value);
        }
        self.values.get(&variable).copied().unwrap_or(0.0)
    }
}

impl Default for ConstraintSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_constraint_fixes_value() {
        let mut cs = ConstraintSystem::new();
        let v = cs.new_var();

        // v - 50 == 0
        cs.constrain(Relation::Eq, -50.0, &[(v, 1.0)]).unwrap();
        assert_eq!(cs.value(v), 50.0);
    }

    #[test]
    fn test_unconstrained_variable_reads_zero() {
        let mut cs = ConstraintSystem::new();
        let v = cs.new_var();
        assert_eq!(cs.value(v), 0.0);
    }

    #[test]
    fn test_inequality_holds_on_read_back() {
        let mut cs = ConstraintSystem::new();
        let a = cs.new_var();
        let b = cs.new_var();

        // a - b - 10 >= 0, i.e. a >= b + 10
        cs.constrain(Relation::Gte, -10.0, &[(a, 1.0), (b, -1.0)])
            .unwrap();
        assert!(cs.value(a) >= cs.value(b) + 10.0);
    }

    #[test]
    fn test_inconsistent_system_is_layout_error() {
        let mut cs = ConstraintSystem::new();
        let v = cs.new_var();

        // v == 5 and v == 10 cannot both hold at required strength
        cs.constrain(Relation::Eq, -5.0, &[(v, 1.0)]).unwrap();
        let result = cs.constrain(Relation::Eq, -10.0, &[(v, 1.0)]);
        assert!(matches!(result, Err(EvalError::LayoutError(_))));
    }
}
