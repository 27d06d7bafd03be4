//! Output-facing invariants (§4.6: `ComparatorInvariant`,
//! `StaticConstraintInvariant`, `ObjectiveInvariant`, `CompositeInvariant`).
//!
//! The sink itself, `AggregatorInvariant`, lives in [`crate::dag`] as
//! `ResultInvariant` — it is wired in automatically by `Dag::init` rather
//! than being a library invariant the builder ever instantiates directly.

use crate::dag::invariant::{Category, Invariant};
use crate::dag::message::{DAGMessage, InputSlot, InputType, Scalar};

/// y = max(0, Σx − C). Hard constraint; stateful on `current_value = Σx`.
#[derive(Debug, Clone)]
pub struct ComparatorInvariant {
    limit: f64,
    current_value: f64,
}

impl ComparatorInvariant {
    pub fn new(limit: f64, initial_sum: f64) -> Self {
        Self {
            limit,
            current_value: initial_sum,
        }
    }

    fn violation(&self, value: f64) -> f64 {
        (value - self.limit).max(0.0)
    }
}

impl Invariant for ComparatorInvariant {
    fn input_type(&self) -> InputType {
        InputType::Single
    }

    fn category(&self) -> Category {
        Category::SummableDelta
    }

    fn is_hard_constraint(&self) -> bool {
        true
    }

    fn init(&mut self, _slot: &InputSlot) -> DAGMessage {
        DAGMessage::ConstraintFull(Scalar(self.violation(self.current_value)))
    }

    fn eval_full(&self, slot: &InputSlot) -> DAGMessage {
        let value = match &slot.single {
            Some(m) => m.as_scalar().map(|s| s.0).unwrap_or(self.current_value),
            None => self.current_value,
        };
        DAGMessage::ConstraintFull(Scalar(self.violation(value)))
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        let delta = match &slot.single {
            Some(m) => m.as_scalar().map(|s| s.0).unwrap_or(0.0),
            None => 0.0,
        };
        let before = self.violation(self.current_value);
        let after = self.violation(self.current_value + delta);
        DAGMessage::ConstraintDelta(Scalar(after - before))
    }

    fn commit(&mut self, slot: &InputSlot) {
        if let Some(m) = &slot.single {
            self.current_value += m.as_scalar().map(|s| s.0).unwrap_or(0.0);
        }
    }
}

/// y = α·(incoming scalar), retagging a plain float into a constraint
/// contribution. Hard constraint; stateless.
#[derive(Debug, Clone)]
pub struct StaticConstraintInvariant {
    pub alpha: f64,
}

impl Invariant for StaticConstraintInvariant {
    fn input_type(&self) -> InputType {
        InputType::Single
    }

    fn category(&self) -> Category {
        Category::Stateless
    }

    fn is_hard_constraint(&self) -> bool {
        true
    }

    fn init(&mut self, slot: &InputSlot) -> DAGMessage {
        self.eval_full(slot)
    }

    fn eval_full(&self, slot: &InputSlot) -> DAGMessage {
        let v = slot.single.as_ref().and_then(|m| m.as_scalar()).unwrap_or(Scalar::ZERO);
        DAGMessage::ConstraintFull(v * self.alpha)
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        let v = slot.single.as_ref().and_then(|m| m.as_scalar()).unwrap_or(Scalar::ZERO);
        DAGMessage::ConstraintDelta(v * self.alpha)
    }
}

/// Retags a plain scalar as an `ObjectiveDelta`/`ObjectiveFull`. Stateless.
#[derive(Debug, Clone, Default)]
pub struct ObjectiveInvariant;

impl Invariant for ObjectiveInvariant {
    fn input_type(&self) -> InputType {
        InputType::Single
    }

    fn category(&self) -> Category {
        Category::Stateless
    }

    fn init(&mut self, slot: &InputSlot) -> DAGMessage {
        self.eval_full(slot)
    }

    fn eval_full(&self, slot: &InputSlot) -> DAGMessage {
        let v = slot.single.as_ref().and_then(|m| m.as_scalar()).unwrap_or(Scalar::ZERO);
        DAGMessage::ObjectiveFull(v)
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        let v = slot.single.as_ref().and_then(|m| m.as_scalar()).unwrap_or(Scalar::ZERO);
        DAGMessage::ObjectiveDelta(v)
    }
}

/// Pipes `init`/`eval_full`/`eval_delta`/`commit` sequentially through a
/// fixed chain of sub-invariants, presenting them as a single logical node
/// to the outer DAG. Short-circuits on the first sub-result that is
/// `NoMessage`/zero.
#[derive(Debug, Clone)]
pub struct CompositeInvariant {
    stages: Vec<Box<dyn Invariant>>,
}

impl CompositeInvariant {
    pub fn new(stages: Vec<Box<dyn Invariant>>) -> Self {
        assert!(!stages.is_empty(), "composite invariant needs at least one stage");
        Self { stages }
    }
}

impl Invariant for CompositeInvariant {
    fn input_type(&self) -> InputType {
        self.stages[0].input_type()
    }

    fn category(&self) -> Category {
        Category::Stateful
    }

    fn is_hard_constraint(&self) -> bool {
        self.stages.iter().any(|s| s.is_hard_constraint())
    }

    fn init(&mut self, slot: &InputSlot) -> DAGMessage {
        let mut current = self.stages[0].init(slot);
        for stage in &mut self.stages[1..] {
            if current.is_no_message() || current.is_zero() {
                return current;
            }
            current = stage.init(&single_slot(current));
        }
        current
    }

    fn eval_full(&self, slot: &InputSlot) -> DAGMessage {
        let mut current = self.stages[0].eval_full(slot);
        for stage in &self.stages[1..] {
            if current.is_no_message() || current.is_zero() {
                return current;
            }
            current = stage.eval_full(&single_slot(current));
        }
        current
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        let mut current = self.stages[0].eval_delta(slot);
        for stage in &self.stages[1..] {
            if current.is_no_message() || current.is_zero() {
                return current;
            }
            current = stage.eval_delta(&single_slot(current));
        }
        current
    }

    fn commit(&mut self, slot: &InputSlot) {
        let mut current = self.stages[0].eval_delta(slot);
        self.stages[0].commit(slot);
        for stage in &mut self.stages[1..] {
            if current.is_no_message() || current.is_zero() {
                return;
            }
            let s = single_slot(current.clone());
            stage.commit(&s);
            current = stage.eval_delta(&s);
        }
    }
}

fn single_slot(m: DAGMessage) -> InputSlot {
    let mut slot = InputSlot::default();
    slot.single = Some(m);
    slot
}
