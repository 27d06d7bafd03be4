use crate::trail::{Trail, Trailed};

use crate::cp::constraint::{ConstraintId, Worklist};
use crate::cp::variable::{VarRef, Variable};

fn push_other_watchers(vars: &[Variable], trail: &Trail, worklist: &mut Worklist, v: &VarRef, me: ConstraintId) {
    let _ = trail;
    for &w in v.watchers(vars) {
        if w.0 != me.0 {
            worklist.push(w);
        }
    }
}

/// `x = y`: `D(x) := D(x) ∩ D(y)`, symmetrically.
#[derive(Debug, Clone)]
pub struct Equal {
    pub x: VarRef,
    pub y: VarRef,
    pub id: ConstraintId,
    pub active: Trailed<bool>,
    touched: [VarRef; 2],
}

impl Equal {
    pub fn new(trail: &mut Trail, x: VarRef, y: VarRef, id: ConstraintId) -> Self {
        Self {
            x,
            y,
            id,
            active: Trailed::new(trail, true),
            touched: [x, y],
        }
    }
}

impl super::super::constraint::CPConstraint for Equal {
    fn propagate(&mut self, vars: &mut [Variable], trail: &mut Trail, worklist: &mut Worklist) -> bool {
        let y_values: Vec<i32> = self.y.iter(vars, trail).collect();
        let mut x_shrunk = false;
        for v in self.x.iter(vars, trail).collect::<Vec<_>>() {
            if !y_values.contains(&v) {
                self.x.remove(vars, trail, v);
                x_shrunk = true;
            }
        }
        if self.x.is_bound(vars, trail) && self.x.bound_value(vars, trail).is_none() {
            return false;
        }

        let x_values: Vec<i32> = self.x.iter(vars, trail).collect();
        if x_values.is_empty() {
            return false;
        }
        let mut y_shrunk = false;
        for v in self.y.iter(vars, trail).collect::<Vec<_>>() {
            if !x_values.contains(&v) {
                self.y.remove(vars, trail, v);
                y_shrunk = true;
            }
        }
        let y_empty = !self.y.iter(vars, trail).next().is_some();
        if y_empty {
            return false;
        }

        if x_shrunk {
            push_other_watchers(vars, trail, worklist, &self.x, self.id);
        }
        if y_shrunk {
            push_other_watchers(vars, trail, worklist, &self.y, self.id);
        }

        if self.x.is_bound(vars, trail) && self.y.is_bound(vars, trail) {
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

/// `x ≠ y`: if `x` is bound, remove its value from `D(y)`; symmetric.
/// Entailed once either side is bound.
#[derive(Debug, Clone)]
pub struct NotEqual {
    pub x: VarRef,
    pub y: VarRef,
    pub id: ConstraintId,
    pub active: Trailed<bool>,
    touched: [VarRef; 2],
}

impl NotEqual {
    pub fn new(trail: &mut Trail, x: VarRef, y: VarRef, id: ConstraintId) -> Self {
        Self {
            x,
            y,
            id,
            active: Trailed::new(trail, true),
            touched: [x, y],
        }
    }
}

impl super::super::constraint::CPConstraint for NotEqual {
    fn propagate(&mut self, vars: &mut [Variable], trail: &mut Trail, worklist: &mut Worklist) -> bool {
        if let Some(v) = self.x.bound_value(vars, trail) {
            if self.y.remove(vars, trail, v) {
                push_other_watchers(vars, trail, worklist, &self.y, self.id);
            }
            if self.y.iter(vars, trail).next().is_none() {
                return false;
            }
            self.active.set(trail, false);
            return true;
        }
        if let Some(v) = self.y.bound_value(vars, trail) {
            if self.x.remove(vars, trail, v) {
                push_other_watchers(vars, trail, worklist, &self.x, self.id);
            }
            if self.x.iter(vars, trail).next().is_none() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::constraint::CPConstraint;
    use crate::cp::variable::VarId;

    #[test]
    fn equal_intersects_both_domains() {
        let mut trail = Trail::new();
        let mut vars = vec![
            Variable::new_int(&mut trail, 0, 4),
            Variable::new_int(&mut trail, 2, 6),
        ];
        trail.checkpoint();
        let mut c = Equal::new(&mut trail, VarRef::Direct(VarId(0)), VarRef::Direct(VarId(1)), ConstraintId(0));
        let mut wl = Worklist::new(1);
        assert!(c.propagate(&mut vars, &mut trail, &mut wl));
        assert_eq!((vars[0].domain.min(&trail), vars[0].domain.max(&trail)), (2, 4));
        assert_eq!((vars[1].domain.min(&trail), vars[1].domain.max(&trail)), (2, 4));
    }

    #[test]
    fn equal_fails_on_disjoint_domains() {
        let mut trail = Trail::new();
        let mut vars = vec![
            Variable::new_int(&mut trail, 0, 1),
            Variable::new_int(&mut trail, 5, 6),
        ];
        trail.checkpoint();
        let mut c = Equal::new(&mut trail, VarRef::Direct(VarId(0)), VarRef::Direct(VarId(1)), ConstraintId(0));
        let mut wl = Worklist::new(1);
        assert!(!c.propagate(&mut vars, &mut trail, &mut wl));
    }

    #[test]
    fn not_equal_removes_bound_value_from_other() {
        let mut trail = Trail::new();
        let mut vars = vec![Variable::new_int(&mut trail, 3, 3), Variable::new_int(&mut trail, 1, 3)];
        trail.checkpoint();
        let mut c = NotEqual::new(&mut trail, VarRef::Direct(VarId(0)), VarRef::Direct(VarId(1)), ConstraintId(0));
        let mut wl = Worklist::new(1);
        assert!(c.propagate(&mut vars, &mut trail, &mut wl));
        assert!(!vars[1].domain.contains(&trail, 3));
        assert!(c.active.get(&trail) == false);
    }
}
