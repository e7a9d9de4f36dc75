//! Thin facade over the varisat SAT solver.
//!
//! The fraig driver only ever needs fresh variables, AND/XOR Tseitin
//! constraints over phased literals, a single-assumption incremental solve
//! and model lookup after a satisfiable result. Keeping that contract here
//! keeps the rest of the crate independent of the solver crate.

use std::collections::HashSet;

use varisat::{ExtendFormula, Lit, Solver};

use crate::{AigError, Result};

fn phased(lit: Lit, inverted: bool) -> Lit {
    if inverted { !lit } else { lit }
}

/// An incremental SAT session.
///
/// `value` is only meaningful immediately after a [`SatSolver::solve_assuming`]
/// call that returned `true`.
pub struct SatSolver<'a> {
    solver: Solver<'a>,
    model: HashSet<Lit>,
}

impl<'a> SatSolver<'a> {
    pub fn new() -> Self {
        SatSolver {
            solver: Solver::new(),
            model: HashSet::new(),
        }
    }

    /// A fresh variable, returned as its positive literal.
    pub fn new_var(&mut self) -> Lit {
        self.solver.new_lit()
    }

    /// Forces `lit` false.
    pub fn add_false(&mut self, lit: Lit) {
        self.solver.add_clause(&[!lit]);
    }

    /// Adds clauses forcing `out == (a ^ inv_a) AND (b ^ inv_b)`.
    pub fn add_and(&mut self, out: Lit, a: Lit, inv_a: bool, b: Lit, inv_b: bool) {
        let x = phased(a, inv_a);
        let y = phased(b, inv_b);
        self.solver.add_clause(&[!x, !y, out]);
        self.solver.add_clause(&[x, !out]);
        self.solver.add_clause(&[y, !out]);
    }

    /// Adds clauses forcing `out == (a ^ inv_a) XOR (b ^ inv_b)`.
    pub fn add_xor(&mut self, out: Lit, a: Lit, inv_a: bool, b: Lit, inv_b: bool) {
        let x = phased(a, inv_a);
        let y = phased(b, inv_b);
        self.solver.add_clause(&[!x, !y, !out]);
        self.solver.add_clause(&[x, y, !out]);
        self.solver.add_clause(&[x, !y, out]);
        self.solver.add_clause(&[!x, y, out]);
    }

    /// Solves under the single assumption `lit = true`.
    ///
    /// The assumption set is replaced wholesale on every call, so nothing
    /// leaks into the next one. On a satisfiable result the model is kept
    /// for [`SatSolver::value`].
    pub fn solve_assuming(&mut self, lit: Lit) -> Result<bool> {
        self.solver.assume(&[lit]);
        let sat = self
            .solver
            .solve()
            .map_err(|e| AigError::Solver(e.to_string()))?;
        self.model.clear();
        if sat {
            let model = self
                .solver
                .model()
                .ok_or_else(|| AigError::Solver("sat result without a model".to_string()))?;
            self.model.extend(model);
        }
        Ok(sat)
    }

    /// The value of `lit` in the last model.
    pub fn value(&self, lit: Lit) -> bool {
        self.model.contains(&lit)
    }
}

impl Default for SatSolver<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn and_constraint() {
        let mut sat = SatSolver::new();
        let a = sat.new_var();
        let b = sat.new_var();
        let out = sat.new_var();
        sat.add_and(out, a, false, b, false);

        // out can be true, and then both inputs are true.
        assert!(sat.solve_assuming(out).unwrap());
        assert!(sat.value(a));
        assert!(sat.value(b));

        // Force a false: out can no longer be true.
        sat.add_false(a);
        assert!(!sat.solve_assuming(out).unwrap());
        // The assumption does not leak: !out is still satisfiable.
        assert!(sat.solve_assuming(!out).unwrap());
    }

    #[test]
    fn xor_constraint() {
        let mut sat = SatSolver::new();
        let a = sat.new_var();
        let b = sat.new_var();
        let m = sat.new_var();
        // Miter between a and itself: never satisfiable.
        sat.add_xor(m, a, false, a, false);
        assert!(!sat.solve_assuming(m).unwrap());

        let m2 = sat.new_var();
        sat.add_xor(m2, a, false, b, false);
        assert!(sat.solve_assuming(m2).unwrap());
        assert_ne!(sat.value(a), sat.value(b));
    }
}
