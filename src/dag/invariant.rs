//! The [`Invariant`] trait every DAG node implements.

use dyn_clone::DynClone;

use super::message::{DAGMessage, InputSlot, InputType};

/// How an invariant's delta evaluation composes with its inputs; purely
/// descriptive (used by the builder and by documentation), evaluation
/// itself always goes through `eval_delta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// No internal state; `commit` is a no-op.
    Stateless,
    /// `eval_delta` is `eval_full(sum(messages))`.
    SummableDelta,
    /// `eval_delta` is `sum(eval_full(m))` over messages.
    SummableEval,
    /// General stateful invariant with bespoke delta semantics.
    Stateful,
}

/// A node in the DAG: a relation between input messages and a single
/// output, maintained incrementally across moves.
///
/// `DynClone` makes `Box<dyn Invariant>` cloneable, so a whole [`super::Dag`]
/// can be forked across worker threads for parallel move evaluation
/// without re-building it from scratch.
pub trait Invariant: DynClone + std::fmt::Debug {
    /// How this invariant's input slot accumulates parent messages.
    fn input_type(&self) -> InputType;

    /// Descriptive evaluation category; informational only.
    fn category(&self) -> Category {
        Category::Stateful
    }

    /// Whether this invariant represents a hard constraint whose
    /// violation the output layer must collect.
    fn is_hard_constraint(&self) -> bool {
        false
    }

    /// Seeds full internal state from the initial assignment and emits a
    /// full message downstream. Called once per touched node during an
    /// `InitRun`.
    fn init(&mut self, slot: &InputSlot) -> DAGMessage;

    /// Recomputes the full output from `slot` without mutating state.
    /// Called during `FullRun`/`OutputRun`.
    fn eval_full(&self, slot: &InputSlot) -> DAGMessage;

    /// Computes the delta output from `slot` without mutating state.
    /// Called during `DeltaRun`.
    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage;

    /// Applies the delta that was just evaluated to internal state. A
    /// no-op for `Stateless` invariants.
    fn commit(&mut self, _slot: &InputSlot) {}
}

dyn_clone::clone_trait_object!(Invariant);
