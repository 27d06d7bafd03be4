//! The constraint store: variables, propagators, and the trail tying them
//! together, with a fix-point engine and a DFS completion search.

use crate::trail::Trail;
use crate::CoreError;

use super::constraint::{register_watchers, CPConstraint, Constraint, ConstraintId, Worklist};
use super::variable::{VarId, Variable};

/// Decision variables, intermediate variables (both live in `vars`),
/// transversal constraints, and the trail backing them.
#[derive(Debug, Clone)]
pub struct CPModel {
    pub trail: Trail,
    pub vars: Vec<Variable>,
    pub constraints: Vec<Constraint>,
    pub decision_vars: Vec<VarId>,
}

impl CPModel {
    pub fn new(trail: Trail, vars: Vec<Variable>, constraints: Vec<Constraint>, decision_vars: Vec<VarId>) -> Self {
        Self {
            trail,
            vars,
            constraints,
            decision_vars,
        }
    }

    /// Runs the fix-point once, deactivates entailed constraints, and
    /// commits the result as the base trail state (§4.4).
    ///
    /// Constraints are deactivated rather than removed from the arena:
    /// `ConstraintId` is a stable index referenced by every variable's
    /// watcher list, and the fix-point engine already skips inactive
    /// constraints, so deactivation has the same effect as removal
    /// without invalidating those references.
    pub fn init(&mut self) -> Result<(), CoreError> {
        for i in 0..self.constraints.len() {
            let id = ConstraintId(i as u32);
            register_watchers(&mut self.vars, id, &self.constraints[i]);
        }
        let mut worklist = Worklist::new(self.constraints.len());
        worklist.push_all((0..self.constraints.len() as u32).map(ConstraintId));
        if !self.run_fixpoint(&mut worklist) {
            return Err(CoreError::Infeasible);
        }
        self.trail.commit_base();
        Ok(())
    }

    fn run_fixpoint(&mut self, worklist: &mut Worklist) -> bool {
        while let Some(id) = worklist.pop() {
            let idx = id.0 as usize;
            if !self.constraints[idx].is_active(&self.trail) {
                continue;
            }
            if !self.constraints[idx].propagate(&mut self.vars, &mut self.trail, worklist) {
                return false;
            }
        }
        true
    }

    /// Enumerates every feasible assignment of `free` consistent with
    /// `fixed`, via depth-first search with trail checkpoints. Returns
    /// tuples in the order of `free`.
    pub fn eval(&mut self, fixed: &[(VarId, i32)], free: &[VarId]) -> Vec<Vec<i32>> {
        self.trail.checkpoint();

        let mut worklist = Worklist::new(self.constraints.len());
        let mut feasible = true;
        for &(var, value) in fixed {
            if !self.vars[var.0 as usize].domain.assign(&mut self.trail, value) {
                feasible = false;
                break;
            }
            worklist.push_all(self.vars[var.0 as usize].watchers.iter().copied());
        }
        if feasible && !self.run_fixpoint(&mut worklist) {
            feasible = false;
        }

        let mut results = Vec::new();
        if feasible {
            self.dfs_free(free, &mut Vec::with_capacity(free.len()), &mut results);
        }

        self.trail.restore();
        results
    }

    fn dfs_free(&mut self, free: &[VarId], chosen: &mut Vec<i32>, out: &mut Vec<Vec<i32>>) {
        let Some((&var, rest)) = free.split_first() else {
            out.push(chosen.clone());
            return;
        };
        let candidates: Vec<i32> = self.vars[var.0 as usize].domain.iter(&self.trail).collect();
        for value in candidates {
            self.trail.checkpoint();
            let mut worklist = Worklist::new(self.constraints.len());
            let assigned = self.vars[var.0 as usize].domain.assign(&mut self.trail, value);
            if assigned {
                worklist.push_all(self.vars[var.0 as usize].watchers.iter().copied());
                if self.run_fixpoint(&mut worklist) {
                    chosen.push(value);
                    self.dfs_free(rest, chosen, out);
                    chosen.pop();
                }
            }
            self.trail.restore();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::constraint::Constraint;
    use crate::cp::constraints::equal::NotEqual;
    use crate::cp::variable::VarRef;

    #[test]
    fn init_fails_closed_on_contradiction() {
        let mut trail = Trail::new();
        let vars = vec![Variable::new_int(&mut trail, 3, 3), Variable::new_int(&mut trail, 3, 3)];
        let c = NotEqual::new(&mut trail, VarRef::Direct(VarId(0)), VarRef::Direct(VarId(1)), ConstraintId(0));
        let mut model = CPModel::new(trail, vars, vec![Constraint::NotEqual(c)], vec![VarId(0), VarId(1)]);
        assert!(model.init().is_err());
    }

    #[test]
    fn eval_enumerates_feasible_completions() {
        let mut trail = Trail::new();
        let vars = vec![Variable::new_int(&mut trail, 1, 3), Variable::new_int(&mut trail, 1, 3)];
        let c = NotEqual::new(&mut trail, VarRef::Direct(VarId(0)), VarRef::Direct(VarId(1)), ConstraintId(0));
        let mut model = CPModel::new(trail, vars, vec![Constraint::NotEqual(c)], vec![VarId(0), VarId(1)]);
        model.init().unwrap();

        let results = model.eval(&[(VarId(0), 2)], &[VarId(1)]);
        let mut values: Vec<i32> = results.into_iter().map(|t| t[0]).collect();
        values.sort();
        assert_eq!(values, vec![1, 3]);
    }
}
