//! CP variables and the views built over them.

use crate::domain::view::ViewKind;
use crate::domain::IntDomain;
use crate::trail::Trail;

use super::constraint::ConstraintId;

/// Index into the CP model's variable arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub u32);

/// A variable owned by the CP model: a domain plus the constraints
/// watching it.
#[derive(Debug, Clone)]
pub struct Variable {
    pub domain: IntDomain,
    pub watchers: Vec<ConstraintId>,
}

impl Variable {
    pub fn new_int(trail: &mut Trail, lo: i32, hi: i32) -> Self {
        Self {
            domain: IntDomain::new(trail, lo, hi),
            watchers: Vec::new(),
        }
    }

    pub fn new_bool(trail: &mut Trail) -> Self {
        Self::new_int(trail, 0, 1)
    }
}

/// A reference to either a variable or a transformed view over one.
///
/// Views never own storage; every operation delegates to the base
/// variable's domain through [`ViewKind`]'s forward/inverse transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarRef {
    Direct(VarId),
    View(VarId, ViewKind),
}

impl From<VarId> for VarRef {
    fn from(id: VarId) -> Self {
        VarRef::Direct(id)
    }
}

impl VarRef {
    pub fn base(&self) -> VarId {
        match self {
            VarRef::Direct(id) => *id,
            VarRef::View(id, _) => *id,
        }
    }

    pub fn offset(base: VarId, c: i32) -> Self {
        VarRef::View(base, ViewKind::Offset(c))
    }

    pub fn scaled(base: VarId, c: i32) -> Self {
        VarRef::View(base, ViewKind::Mul(c))
    }

    pub fn opposite(base: VarId) -> Self {
        VarRef::View(base, ViewKind::Opposite)
    }

    fn domain<'a>(&self, vars: &'a [Variable]) -> &'a IntDomain {
        &vars[self.base().0 as usize].domain
    }

    fn domain_mut<'a>(&self, vars: &'a mut [Variable]) -> &'a mut IntDomain {
        &mut vars[self.base().0 as usize].domain
    }

    pub fn watchers<'a>(&self, vars: &'a [Variable]) -> &'a [ConstraintId] {
        &vars[self.base().0 as usize].watchers
    }

    pub fn min(&self, vars: &[Variable], trail: &Trail) -> i32 {
        let d = self.domain(vars);
        match self {
            VarRef::Direct(_) => d.min(trail),
            VarRef::View(_, kind) => {
                if kind.monotonic_increasing() {
                    kind.forward(d.min(trail))
                } else {
                    kind.forward(d.max(trail))
                }
            }
        }
    }

    pub fn max(&self, vars: &[Variable], trail: &Trail) -> i32 {
        let d = self.domain(vars);
        match self {
            VarRef::Direct(_) => d.max(trail),
            VarRef::View(_, kind) => {
                if kind.monotonic_increasing() {
                    kind.forward(d.max(trail))
                } else {
                    kind.forward(d.min(trail))
                }
            }
        }
    }

    pub fn is_bound(&self, vars: &[Variable], trail: &Trail) -> bool {
        self.domain(vars).is_bound(trail)
    }

    pub fn bound_value(&self, vars: &[Variable], trail: &Trail) -> Option<i32> {
        match self {
            VarRef::Direct(_) => self.domain(vars).bound_value(trail),
            VarRef::View(_, kind) => self.domain(vars).bound_value(trail).map(|v| kind.forward(v)),
        }
    }

    pub fn contains(&self, vars: &[Variable], trail: &Trail, v: i32) -> bool {
        match self {
            VarRef::Direct(_) => self.domain(vars).contains(trail, v),
            VarRef::View(_, kind) => match kind.inverse(v) {
                Some(base_v) => self.domain(vars).contains(trail, base_v),
                None => false,
            },
        }
    }

    /// Removes a single logical value. No-op (returns `false`) if `v` is
    /// not exactly representable in the base domain (e.g. `v` is not a
    /// multiple of a scaling view's factor).
    pub fn remove(&self, vars: &mut [Variable], trail: &mut Trail, v: i32) -> bool {
        match self {
            VarRef::Direct(_) => self.domain_mut(vars).remove(trail, v),
            VarRef::View(_, kind) => match kind.inverse(v) {
                Some(base_v) => self.domain_mut(vars).remove(trail, base_v),
                None => false,
            },
        }
    }

    pub fn assign(&self, vars: &mut [Variable], trail: &mut Trail, v: i32) -> bool {
        match self {
            VarRef::Direct(_) => self.domain_mut(vars).assign(trail, v),
            VarRef::View(_, kind) => match kind.inverse(v) {
                Some(base_v) => self.domain_mut(vars).assign(trail, base_v),
                None => false,
            },
        }
    }

    /// Removes every logical value strictly below `k`.
    pub fn remove_below(&self, vars: &mut [Variable], trail: &mut Trail, k: i32) -> bool {
        match self {
            VarRef::Direct(_) => self.domain_mut(vars).remove_below(trail, k),
            VarRef::View(_, kind) => {
                let bound = kind.base_bound_ge(k);
                if kind.monotonic_increasing() {
                    self.domain_mut(vars).remove_below(trail, bound)
                } else {
                    self.domain_mut(vars).remove_above(trail, bound)
                }
            }
        }
    }

    /// Removes every logical value strictly above `k`.
    pub fn remove_above(&self, vars: &mut [Variable], trail: &mut Trail, k: i32) -> bool {
        match self {
            VarRef::Direct(_) => self.domain_mut(vars).remove_above(trail, k),
            VarRef::View(_, kind) => {
                let bound = kind.base_bound_le(k);
                if kind.monotonic_increasing() {
                    self.domain_mut(vars).remove_above(trail, bound)
                } else {
                    self.domain_mut(vars).remove_below(trail, bound)
                }
            }
        }
    }

    pub fn iter<'a>(&'a self, vars: &'a [Variable], trail: &'a Trail) -> Box<dyn Iterator<Item = i32> + 'a> {
        match self {
            VarRef::Direct(_) => Box::new(self.domain(vars).iter(trail)),
            VarRef::View(_, kind) => Box::new(self.domain(vars).iter(trail).map(move |v| kind.forward(v))),
        }
    }
}
