use crate::trail::{Trail, Trailed};

use crate::cp::constraint::{CPConstraint, ConstraintId, Worklist};
use crate::cp::variable::{VarRef, Variable};

fn wake_others(vars: &[Variable], worklist: &mut Worklist, target: &VarRef, me: ConstraintId) {
    for &w in target.watchers(vars) {
        if w.0 != me.0 {
            worklist.push(w);
        }
    }
}

/// `y = vec[x]`, maintained to bound consistency: `D(x)` is pruned to
/// indices whose table value falls in `[min D(y), max D(y)]`; `D(y)` is
/// pruned to `[vec[low], vec[high]]` where `low`/`high` are the smallest
/// and largest table values reachable from the surviving indices.
///
/// `order` is a static index permutation sorting `vec` ascending,
/// computed once at construction; `low`/`high` are trailed cursors into
/// it bounding the still-reachable range.
#[derive(Debug, Clone)]
pub struct ElementBC {
    pub vec: Vec<i32>,
    pub order: Vec<u32>,
    pub x: VarRef,
    pub y: VarRef,
    pub id: ConstraintId,
    pub low: Trailed<i32>,
    pub high: Trailed<i32>,
    pub active: Trailed<bool>,
    touched: [VarRef; 2],
}

impl ElementBC {
    pub fn new(trail: &mut Trail, vec: Vec<i32>, x: VarRef, y: VarRef, id: ConstraintId) -> Self {
        let mut order: Vec<u32> = (0..vec.len() as u32).collect();
        order.sort_by_key(|&i| vec[i as usize]);
        let high = order.len() as i32 - 1;
        Self {
            vec,
            order,
            x,
            y,
            id,
            low: Trailed::new(trail, 0),
            high: Trailed::new(trail, high),
            active: Trailed::new(trail, true),
            touched: [x, y],
        }
    }
}

impl CPConstraint for ElementBC {
    fn propagate(&mut self, vars: &mut [Variable], trail: &mut Trail, worklist: &mut Worklist) -> bool {
        let mut x_shrunk = false;
        let y_min = self.y.min(vars, trail);
        let y_max = self.y.max(vars, trail);
        for i in self.x.iter(vars, trail).collect::<Vec<_>>() {
            let Some(val) = self.vec.get(i as usize).copied() else {
                continue;
            };
            if val < y_min || val > y_max {
                self.x.remove(vars, trail, i);
                x_shrunk = true;
            }
        }
        if x_shrunk {
            wake_others(vars, worklist, &self.x, self.id);
        }

        let mut reachable_min = i32::MAX;
        let mut reachable_max = i32::MIN;
        for i in self.x.iter(vars, trail) {
            if let Some(&val) = self.vec.get(i as usize) {
                reachable_min = reachable_min.min(val);
                reachable_max = reachable_max.max(val);
            }
        }
        if reachable_min > reachable_max {
            return false;
        }

        if !self.y.remove_below(vars, trail, reachable_min) {
            return false;
        }
        if !self.y.remove_above(vars, trail, reachable_max) {
            return false;
        }
        wake_others(vars, worklist, &self.y, self.id);

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

/// `y = vec[x]`, maintained to full domain consistency: every `i ∈ D(x)`
/// must have `vec[i] ∈ D(y)`, and every `v ∈ D(y)` must have some
/// surviving `i` with `vec[i] = v`.
#[derive(Debug, Clone)]
pub struct ElementDC {
    pub vec: Vec<i32>,
    pub x: VarRef,
    pub y: VarRef,
    pub id: ConstraintId,
    pub active: Trailed<bool>,
    touched: [VarRef; 2],
}

impl ElementDC {
    pub fn new(trail: &mut Trail, vec: Vec<i32>, x: VarRef, y: VarRef, id: ConstraintId) -> Self {
        Self {
            vec,
            x,
            y,
            id,
            active: Trailed::new(trail, true),
            touched: [x, y],
        }
    }
}

impl CPConstraint for ElementDC {
    fn propagate(&mut self, vars: &mut [Variable], trail: &mut Trail, worklist: &mut Worklist) -> bool {
        let mut x_shrunk = false;
        for i in self.x.iter(vars, trail).collect::<Vec<_>>() {
            let supported = self.vec.get(i as usize).is_some_and(|&v| self.y.contains(vars, trail, v));
            if !supported {
                self.x.remove(vars, trail, i);
                x_shrunk = true;
            }
        }
        if x_shrunk {
            wake_others(vars, worklist, &self.x, self.id);
        }
        if !self.x.iter(vars, trail).next().is_some() {
            return false;
        }

        let remaining: Vec<i32> = self.x.iter(vars, trail).collect();
        let mut y_shrunk = false;
        for v in self.y.iter(vars, trail).collect::<Vec<_>>() {
            let supported = remaining.iter().any(|&i| self.vec.get(i as usize) == Some(&v));
            if !supported {
                self.y.remove(vars, trail, v);
                y_shrunk = true;
            }
        }
        if y_shrunk {
            wake_others(vars, worklist, &self.y, self.id);
        }
        if !self.y.iter(vars, trail).next().is_some() {
            return false;
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
