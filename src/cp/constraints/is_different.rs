use crate::trail::{Trail, Trailed};

use crate::cp::constraint::{CPConstraint, ConstraintId, Worklist};
use crate::cp::variable::{VarRef, Variable};

/// `b ⇔ (x ≠ v)` for a fixed constant `v`.
#[derive(Debug, Clone)]
pub struct IsDifferent {
    pub x: VarRef,
    pub v: i32,
    pub b: VarRef,
    pub id: ConstraintId,
    pub active: Trailed<bool>,
    touched: [VarRef; 2],
}

impl IsDifferent {
    pub fn new(trail: &mut Trail, x: VarRef, v: i32, b: VarRef, id: ConstraintId) -> Self {
        Self {
            x,
            v,
            b,
            id,
            active: Trailed::new(trail, true),
            touched: [x, b],
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

impl CPConstraint for IsDifferent {
    fn propagate(&mut self, vars: &mut [Variable], trail: &mut Trail, worklist: &mut Worklist) -> bool {
        if !self.x.contains(vars, trail, self.v) {
            if self.b.assign(vars, trail, 1) {
                self.wake_others(vars, worklist, &self.b);
            }
            self.active.set(trail, false);
            return true;
        }
        if let Some(bound) = self.x.bound_value(vars, trail) {
            if bound == self.v {
                if self.b.assign(vars, trail, 0) {
                    self.wake_others(vars, worklist, &self.b);
                }
                self.active.set(trail, false);
                return true;
            }
        }
        match self.b.bound_value(vars, trail) {
            Some(1) => {
                if self.x.remove(vars, trail, self.v) {
                    self.wake_others(vars, worklist, &self.x);
                }
                if !self.x.iter(vars, trail).next().is_some() {
                    return false;
                }
                self.active.set(trail, false);
            }
            Some(0) => {
                if self.x.assign(vars, trail, self.v) {
                    self.wake_others(vars, worklist, &self.x);
                }
                self.active.set(trail, false);
            }
            _ => {}
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::variable::VarId;

    #[test]
    fn value_excluded_fixes_b_true() {
        let mut trail = Trail::new();
        let mut vars = vec![Variable::new_int(&mut trail, 0, 3), Variable::new_bool(&mut trail)];
        trail.checkpoint();
        vars[0].domain.remove(&mut trail, 2);
        let mut c = IsDifferent::new(&mut trail, VarRef::Direct(VarId(0)), 2, VarRef::Direct(VarId(1)), ConstraintId(0));
        let mut wl = Worklist::new(1);
        assert!(c.propagate(&mut vars, &mut trail, &mut wl));
        assert_eq!(vars[1].domain.bound_value(&trail), Some(1));
    }

    #[test]
    fn b_false_forces_assignment() {
        let mut trail = Trail::new();
        let mut vars = vec![Variable::new_int(&mut trail, 0, 3), Variable::new_bool(&mut trail)];
        trail.checkpoint();
        vars[1].domain.assign(&mut trail, 0);
        let mut c = IsDifferent::new(&mut trail, VarRef::Direct(VarId(0)), 2, VarRef::Direct(VarId(1)), ConstraintId(0));
        let mut wl = Worklist::new(1);
        assert!(c.propagate(&mut vars, &mut trail, &mut wl));
        assert_eq!(vars[0].domain.bound_value(&trail), Some(2));
    }
}
