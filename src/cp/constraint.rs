//! The `CPConstraint` interface and the propagation worklist.

use std::collections::VecDeque;

use enum_dispatch::enum_dispatch;

use crate::trail::Trail;

use super::constraints::among::{Among, AmongUp, AtMost};
use super::constraints::element::{ElementBC, ElementDC};
use super::constraints::equal::{Equal, NotEqual};
use super::constraints::is_different::IsDifferent;
use super::constraints::or::Or;
use super::constraints::sum_less_than::SumLessThan;
use super::variable::{VarRef, Variable};

/// Index into the CP model's constraint arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintId(pub u32);

/// A FIFO worklist of constraint indices with membership dedup, used by
/// the fix-point engine (§4.3).
#[derive(Debug, Default)]
pub struct Worklist {
    queue: VecDeque<ConstraintId>,
    queued: Vec<bool>,
}

impl Worklist {
    pub fn new(n_constraints: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            queued: vec![false; n_constraints],
        }
    }

    pub fn push(&mut self, id: ConstraintId) {
        let slot = &mut self.queued[id.0 as usize];
        if !*slot {
            *slot = true;
            self.queue.push_back(id);
        }
    }

    pub fn push_all(&mut self, ids: impl IntoIterator<Item = ConstraintId>) {
        for id in ids {
            self.push(id);
        }
    }

    pub fn pop(&mut self) -> Option<ConstraintId> {
        let id = self.queue.pop_front()?;
        self.queued[id.0 as usize] = false;
        Some(id)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Common interface every CP propagator implements.
///
/// `propagate` shrinks domains consistent with the constraint's semantics
/// and returns `false` iff a variable becomes empty or the constraint is
/// proven infeasible. Implementations must, for every domain they shrink,
/// push that variable's other watchers back onto the worklist, and must
/// deactivate themselves on the trail once entailed.
#[enum_dispatch]
pub trait CPConstraint {
    fn propagate(&mut self, vars: &mut [Variable], trail: &mut Trail, worklist: &mut Worklist) -> bool;

    /// Every variable (or view) this constraint reads or writes.
    fn variables(&self) -> &[VarRef];

    fn is_active(&self, trail: &Trail) -> bool;
}

/// The closed set of propagators the DAG→CP builder can emit (§4.3).
///
/// A closed enum dispatched statically with `enum_dispatch` rather than a
/// `Box<dyn CPConstraint>`: the propagation loop is the hottest path in
/// the CP layer and the constraint set is fixed by the translation table
/// in §4.7, so there is no need to pay for a vtable indirection.
#[enum_dispatch(CPConstraint)]
#[derive(Debug, Clone)]
pub enum Constraint {
    Equal(Equal),
    NotEqual(NotEqual),
    Or(Or),
    IsDifferent(IsDifferent),
    ElementBC(ElementBC),
    ElementDC(ElementDC),
    SumLessThan(SumLessThan),
    Among(Among),
    AmongUp(AmongUp),
    AtMost(AtMost),
}

/// Registers `constraint_id` as a watcher of every variable `constraint`
/// reads or writes, deduplicating repeated base variables (a view and its
/// base share a watcher list).
pub fn register_watchers(vars: &mut [Variable], constraint_id: ConstraintId, constraint: &Constraint) {
    for v in constraint.variables() {
        let watchers = &mut vars[v.base().0 as usize].watchers;
        if !watchers.contains(&constraint_id) {
            watchers.push(constraint_id);
        }
    }
}
