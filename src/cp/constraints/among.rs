use crate::trail::{Trail, Trailed};

use crate::cp::constraint::{CPConstraint, ConstraintId, Worklist};
use crate::cp::variable::{VarRef, Variable};

fn classify(xs: &[VarRef], s: &[i32], vars: &[Variable], trail: &Trail) -> (i32, i32, Vec<usize>) {
    let mut surely_in = 0;
    let mut surely_out = 0;
    let mut overlap = Vec::new();
    for (i, x) in xs.iter().enumerate() {
        let values: Vec<i32> = x.iter(vars, trail).collect();
        let all_in = values.iter().all(|v| s.contains(v));
        let all_out = values.iter().all(|v| !s.contains(v));
        if all_in {
            surely_in += 1;
        } else if all_out {
            surely_out += 1;
        } else {
            overlap.push(i);
        }
    }
    (surely_in, surely_out, overlap)
}

fn wake_others(vars: &[Variable], worklist: &mut Worklist, target: &VarRef, me: ConstraintId) {
    for &w in target.watchers(vars) {
        if w.0 != me.0 {
            worklist.push(w);
        }
    }
}

/// `y = |{i : xᵢ ∈ S}|`.
#[derive(Debug, Clone)]
pub struct Among {
    pub xs: Vec<VarRef>,
    pub s: Vec<i32>,
    pub y: VarRef,
    pub id: ConstraintId,
    pub active: Trailed<bool>,
    touched: Vec<VarRef>,
}

impl Among {
    pub fn new(trail: &mut Trail, xs: Vec<VarRef>, s: Vec<i32>, y: VarRef, id: ConstraintId) -> Self {
        let mut touched = xs.clone();
        touched.push(y);
        Self {
            xs,
            s,
            y,
            id,
            active: Trailed::new(trail, true),
            touched,
        }
    }
}

impl CPConstraint for Among {
    fn propagate(&mut self, vars: &mut [Variable], trail: &mut Trail, worklist: &mut Worklist) -> bool {
        let (low, surely_out, overlap) = classify(&self.xs, &self.s, vars, trail);
        let up = self.xs.len() as i32 - surely_out;

        if !self.y.remove_below(vars, trail, low) {
            return false;
        }
        if !self.y.remove_above(vars, trail, up) {
            return false;
        }
        wake_others(vars, worklist, &self.y, self.id);

        if self.y.bound_value(vars, trail) == Some(up) {
            for &i in &overlap {
                let x = self.xs[i];
                for v in x.iter(vars, trail).collect::<Vec<_>>() {
                    if !self.s.contains(&v) {
                        x.remove(vars, trail, v);
                    }
                }
                if !x.iter(vars, trail).next().is_some() {
                    return false;
                }
                wake_others(vars, worklist, &x, self.id);
            }
        } else if self.y.bound_value(vars, trail) == Some(low) {
            for &i in &overlap {
                let x = self.xs[i];
                for v in x.iter(vars, trail).collect::<Vec<_>>() {
                    if self.s.contains(&v) {
                        x.remove(vars, trail, v);
                    }
                }
                if !x.iter(vars, trail).next().is_some() {
                    return false;
                }
                wake_others(vars, worklist, &x, self.id);
            }
        }

        if overlap.is_empty() {
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

/// `|{i : xᵢ ∈ S}| ≤ C`: once the count of surely-included indices
/// reaches `C`, `S` is removed from every still-undecided variable.
#[derive(Debug, Clone)]
pub struct AmongUp {
    pub xs: Vec<VarRef>,
    pub s: Vec<i32>,
    pub limit: i32,
    pub id: ConstraintId,
    pub active: Trailed<bool>,
}

impl AmongUp {
    pub fn new(trail: &mut Trail, xs: Vec<VarRef>, s: Vec<i32>, limit: i32, id: ConstraintId) -> Self {
        Self {
            xs,
            s,
            limit,
            id,
            active: Trailed::new(trail, true),
        }
    }
}

impl CPConstraint for AmongUp {
    fn propagate(&mut self, vars: &mut [Variable], trail: &mut Trail, worklist: &mut Worklist) -> bool {
        let (low, _surely_out, overlap) = classify(&self.xs, &self.s, vars, trail);
        if low > self.limit {
            return false;
        }
        if low == self.limit {
            for &i in &overlap {
                let x = self.xs[i];
                for v in x.iter(vars, trail).collect::<Vec<_>>() {
                    if self.s.contains(&v) {
                        x.remove(vars, trail, v);
                    }
                }
                if !x.iter(vars, trail).next().is_some() {
                    return false;
                }
                wake_others(vars, worklist, &x, self.id);
            }
            self.active.set(trail, false);
        } else if overlap.is_empty() {
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

/// `|{i : xᵢ = v}| ≤ C`: `AmongUp` specialized to a singleton set.
#[derive(Debug, Clone)]
pub struct AtMost {
    pub xs: Vec<VarRef>,
    pub v: i32,
    pub limit: i32,
    pub id: ConstraintId,
    pub active: Trailed<bool>,
}

impl AtMost {
    pub fn new(trail: &mut Trail, xs: Vec<VarRef>, v: i32, limit: i32, id: ConstraintId) -> Self {
        Self {
            xs,
            v,
            limit,
            id,
            active: Trailed::new(trail, true),
        }
    }
}

impl CPConstraint for AtMost {
    fn propagate(&mut self, vars: &mut [Variable], trail: &mut Trail, worklist: &mut Worklist) -> bool {
        let s = [self.v];
        let (low, _surely_out, overlap) = classify(&self.xs, &s, vars, trail);
        if low > self.limit {
            return false;
        }
        if low == self.limit {
            for &i in &overlap {
                let x = self.xs[i];
                if x.remove(vars, trail, self.v) {
                    wake_others(vars, worklist, &x, self.id);
                }
                if !x.iter(vars, trail).next().is_some() {
                    return false;
                }
            }
            self.active.set(trail, false);
        } else if overlap.is_empty() {
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
