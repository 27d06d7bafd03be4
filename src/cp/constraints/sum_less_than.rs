use crate::trail::{Trail, Trailed};

use crate::cp::constraint::{CPConstraint, ConstraintId, Worklist};
use crate::cp::variable::{VarRef, Variable};

/// `∑ xᵢ ≤ U`.
///
/// Each call computes `sum_of_min = ∑ min(xᵢ)` over the current domains
/// and fails if it already exceeds `U`; otherwise every free `xᵢ` is
/// pruned to `max(xᵢ) := min(xᵢ) + (U − sum_of_min)`.
#[derive(Debug, Clone)]
pub struct SumLessThan {
    pub xs: Vec<VarRef>,
    pub limit: i32,
    pub id: ConstraintId,
    pub active: Trailed<bool>,
}

impl SumLessThan {
    pub fn new(trail: &mut Trail, xs: Vec<VarRef>, limit: i32, id: ConstraintId) -> Self {
        Self {
            xs,
            limit,
            id,
            active: Trailed::new(trail, true),
        }
    }
}

impl CPConstraint for SumLessThan {
    fn propagate(&mut self, vars: &mut [Variable], trail: &mut Trail, worklist: &mut Worklist) -> bool {
        let mins: Vec<i32> = self.xs.iter().map(|x| x.min(vars, trail)).collect();
        let sum_of_min: i64 = mins.iter().map(|&m| m as i64).sum();
        if sum_of_min > self.limit as i64 {
            return false;
        }

        let slack = self.limit as i64 - sum_of_min;
        let mut any_shrunk = false;
        for (x, &min_x) in self.xs.iter().zip(mins.iter()) {
            let new_max_i64 = min_x as i64 + slack;
            let new_max = new_max_i64.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
            if new_max < x.max(vars, trail) {
                if !x.remove_above(vars, trail, new_max) {
                    return false;
                }
                any_shrunk = true;
                for &w in x.watchers(vars) {
                    if w.0 != self.id.0 {
                        worklist.push(w);
                    }
                }
            }
        }
        let _ = any_shrunk;

        if self.xs.iter().all(|x| x.is_bound(vars, trail)) {
            self.active.set(trail, false);
        }
        true
    }

    fn variables(&self) -> &[VarRef] {
        &self.xs
    }

    fn is_active(&self, trail: &Trail) -> bool {
        self.active.get(trail)
    }
}
