//! Linear arithmetic formulas (spec.md §3 "Arithmetic formula", §4.5).

use indexmap::IndexMap;

/// The relational operator of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl From<RelOp> for dfa::Relation {
    fn from(op: RelOp) -> Self {
        match op {
            RelOp::Eq => dfa::Relation::Eq,
            RelOp::Ne => dfa::Relation::Ne,
            RelOp::Lt => dfa::Relation::Lt,
            RelOp::Le => dfa::Relation::Le,
            RelOp::Gt => dfa::Relation::Gt,
            RelOp::Ge => dfa::Relation::Ge,
        }
    }
}

/// `Σ cᵢ·xᵢ ⋈ c`: an ordered map from variable name to integer
/// coefficient (the map's key order fixes the BDD track assignment when
/// the formula is turned into an automaton), a constant term and a
/// relational operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArithFormula {
    coefficients: IndexMap<String, i64>,
    pub constant: i64,
    pub relation: RelOp,
}

impl ArithFormula {
    pub fn new(coefficients: IndexMap<String, i64>, constant: i64, relation: RelOp) -> Self {
        Self { coefficients, constant, relation }
    }

    /// A single-variable formula `x ⋈ constant`.
    pub fn single(var: impl Into<String>, relation: RelOp, constant: i64) -> Self {
        let mut map = IndexMap::new();
        map.insert(var.into(), 1);
        Self { coefficients: map, constant, relation }
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.coefficients.keys().map(|s| s.as_str())
    }

    pub fn coefficient(&self, var: &str) -> i64 {
        self.coefficients.get(var).copied().unwrap_or(0)
    }

    pub fn ordering(&self) -> Vec<String> {
        self.coefficients.keys().cloned().collect()
    }

    /// Coefficients in the given track order, zero-filled for variables
    /// this formula does not mention.
    pub fn coefficients_in_order(&self, order: &[String]) -> Vec<i64> {
        order.iter().map(|v| self.coefficient(v)).collect()
    }

    /// A statically unsatisfiable formula has no variables and its
    /// constant relation is false (e.g. the folded form of `0 = 1`).
    pub fn is_statically_unsat(&self) -> bool {
        self.coefficients.is_empty() && !self.relation_holds(0)
    }

    pub fn is_statically_valid(&self) -> bool {
        self.coefficients.is_empty() && self.relation_holds(0)
    }

    fn relation_holds(&self, lhs: i64) -> bool {
        let rhs = self.constant;
        match self.relation {
            RelOp::Eq => lhs == rhs,
            RelOp::Ne => lhs != rhs,
            RelOp::Lt => lhs < rhs,
            RelOp::Le => lhs <= rhs,
            RelOp::Gt => lhs > rhs,
            RelOp::Ge => lhs >= rhs,
        }
    }

    /// Unifies two formulas' variable orderings into one: the stable union
    /// of both key sets (spec.md §4.5 `merge_variables`), missing
    /// coefficients zero-filled.
    pub fn merge_ordering(&self, other: &Self) -> Vec<String> {
        let mut order: Vec<String> = self.coefficients.keys().cloned().collect();
        for v in other.coefficients.keys() {
            if !order.contains(v) {
                order.push(v.clone());
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_ordering_is_stable_union() {
        let a = ArithFormula::single("x", RelOp::Eq, 3);
        let mut coeffs = IndexMap::new();
        coeffs.insert("y".to_string(), 2);
        coeffs.insert("x".to_string(), 1);
        let b = ArithFormula::new(coeffs, 0, RelOp::Le);
        assert_eq!(a.merge_ordering(&b), vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn statically_unsat_detects_zero_eq_one() {
        let f = ArithFormula::new(IndexMap::new(), 1, RelOp::Eq);
        assert!(f.is_statically_unsat());
    }
}
