use crate::trail::{Trail, Trailed};

use crate::cp::constraint::{CPConstraint, ConstraintId, Worklist};
use crate::cp::variable::{VarRef, Variable};

/// `b ⇔ ⋁ xᵢ`.
///
/// Tracks how many inputs are still unassigned on the trail; once that
/// count drops to zero with none bound true, `b` is fixed false. If `b`
/// is bound true and exactly one input remains unassigned while the
/// rest are bound false, that last input is forced true.
#[derive(Debug, Clone)]
pub struct Or {
    pub xs: Vec<VarRef>,
    pub b: VarRef,
    pub id: ConstraintId,
    pub active: Trailed<bool>,
    touched: Vec<VarRef>,
}

impl Or {
    pub fn new(trail: &mut Trail, xs: Vec<VarRef>, b: VarRef, id: ConstraintId) -> Self {
        let mut touched = xs.clone();
        touched.push(b);
        Self {
            xs,
            b,
            id,
            active: Trailed::new(trail, true),
            touched,
        }
    }

    fn wake_others(&self, vars: &[Variable], worklist: &mut Worklist, target: &VarRef) {
        for &w in target.watchers(vars) {
            if w.0 != self.id.0 {
                worklist.push(w);
            }
        }
    }
}

impl CPConstraint for Or {
    fn propagate(&mut self, vars: &mut [Variable], trail: &mut Trail, worklist: &mut Worklist) -> bool {
        let mut any_true = false;
        let mut unassigned: Vec<usize> = Vec::new();
        for (i, x) in self.xs.iter().enumerate() {
            match x.bound_value(vars, trail) {
                Some(1) => any_true = true,
                Some(0) => {}
                _ => unassigned.push(i),
            }
        }

        if any_true {
            if self.b.assign(vars, trail, 1) {
                self.wake_others(vars, worklist, &self.b);
            }
            self.active.set(trail, false);
            return true;
        }

        if unassigned.is_empty() {
            if self.b.assign(vars, trail, 0) {
                self.wake_others(vars, worklist, &self.b);
            }
            self.active.set(trail, false);
            return true;
        }

        if self.b.bound_value(vars, trail) == Some(0) {
            for x in &self.xs {
                if x.assign(vars, trail, 0) {
                    self.wake_others(vars, worklist, x);
                }
                if !x.iter(vars, trail).next().is_some() {
                    return false;
                }
            }
            self.active.set(trail, false);
            return true;
        }

        if self.b.bound_value(vars, trail) == Some(1) && unassigned.len() == 1 {
            let x = &self.xs[unassigned[0]];
            if x.assign(vars, trail, 1) {
                self.wake_others(vars, worklist, x);
            }
            if !x.iter(vars, trail).next().is_some() {
                return false;
            }
            self.active.set(trail, false);
        }

        true
    }

    fn variables(&self) -> &[VarRef] {
        &self.touched
    }

    fn is_active(&self, trail: &Trail) -> bool {
        self.active.get(trail)
    }
}
