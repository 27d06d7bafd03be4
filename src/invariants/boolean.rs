//! Small boolean combinators (§4.6: `AndInvariant`, `OrInvariant`,
//! `NegationInvariant`, `IsEqualInvariant`, `IsDifferentInvariant`).
//!
//! These are DAG-level booleans, distinct from the CP `Or` constraint in
//! [`crate::cp::constraints::or`] — they combine already-evaluated 0/1
//! indicators rather than constrain variable domains.

use crate::dag::invariant::{Category, Invariant};
use crate::dag::message::{DAGMessage, InputSlot, InputType, Scalar, VarMessage};
use crate::invariants::indicator;

fn scalar_of(m: &DAGMessage) -> f64 {
    m.as_scalar().map(|s| s.0).unwrap_or(0.0)
}

/// Sums the signed 0/1 transitions carried by a vector of `FloatDelta`
/// legs — the net change in how many legs are currently true.
fn true_count_delta(slot: &InputSlot) -> i64 {
    slot.vector.iter().map(|m| scalar_of(m) as i64).sum()
}

/// y = AND of its parents' 0/1 indicators. Stateful: tracks how many legs
/// are currently true, so a delta run can tell whether the AND flips from
/// the touched legs' deltas alone, without needing to see the untouched
/// legs again.
#[derive(Debug, Clone)]
pub struct AndInvariant {
    n: usize,
    true_count: u32,
}

impl AndInvariant {
    pub fn new(n: usize, initial_true_count: u32) -> Self {
        Self { n, true_count: initial_true_count }
    }

    fn is_all_true(&self, count: u32) -> bool {
        count as usize == self.n
    }
}

impl Invariant for AndInvariant {
    fn input_type(&self) -> InputType {
        InputType::Vector
    }

    fn category(&self) -> Category {
        Category::Stateful
    }

    fn init(&mut self, slot: &InputSlot) -> DAGMessage {
        self.true_count = slot.vector.iter().filter(|m| scalar_of(m) != 0.0).count() as u32;
        self.eval_full(slot)
    }

    fn eval_full(&self, slot: &InputSlot) -> DAGMessage {
        let all = slot.vector.iter().all(|m| scalar_of(m) != 0.0);
        DAGMessage::FloatFull(Scalar(indicator(all)))
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        let before = indicator(self.is_all_true(self.true_count));
        let new_count = (self.true_count as i64 + true_count_delta(slot)).max(0) as u32;
        let after = indicator(self.is_all_true(new_count));
        DAGMessage::FloatDelta(Scalar(after - before))
    }

    fn commit(&mut self, slot: &InputSlot) {
        self.true_count = (self.true_count as i64 + true_count_delta(slot)).max(0) as u32;
    }
}

/// y = OR of its parents' 0/1 indicators. Stateful for the same reason as
/// `AndInvariant`.
#[derive(Debug, Clone)]
pub struct OrInvariant {
    true_count: u32,
}

impl OrInvariant {
    pub fn new(initial_true_count: u32) -> Self {
        Self { true_count: initial_true_count }
    }
}

impl Invariant for OrInvariant {
    fn input_type(&self) -> InputType {
        InputType::Vector
    }

    fn category(&self) -> Category {
        Category::Stateful
    }

    fn init(&mut self, slot: &InputSlot) -> DAGMessage {
        self.true_count = slot.vector.iter().filter(|m| scalar_of(m) != 0.0).count() as u32;
        self.eval_full(slot)
    }

    fn eval_full(&self, slot: &InputSlot) -> DAGMessage {
        let any = slot.vector.iter().any(|m| scalar_of(m) != 0.0);
        DAGMessage::FloatFull(Scalar(indicator(any)))
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        let before = indicator(self.true_count > 0);
        let new_count = (self.true_count as i64 + true_count_delta(slot)).max(0) as u32;
        let after = indicator(new_count > 0);
        DAGMessage::FloatDelta(Scalar(after - before))
    }

    fn commit(&mut self, slot: &InputSlot) {
        self.true_count = (self.true_count as i64 + true_count_delta(slot)).max(0) as u32;
    }
}

/// y = 1 − x over a single 0/1 parent.
#[derive(Debug, Clone, Default)]
pub struct NegationInvariant;

impl Invariant for NegationInvariant {
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
        let x = slot.single.as_ref().map(scalar_of).unwrap_or(0.0);
        DAGMessage::FloatFull(Scalar(1.0 - x))
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        match &slot.single {
            Some(DAGMessage::FloatDelta(d)) => DAGMessage::FloatDelta(Scalar(-d.0)),
            other => other.as_ref().map(|_| self.eval_full(slot)).unwrap_or(DAGMessage::NoMessage),
        }
    }
}

/// y = I[x == v] over a single integer parent.
#[derive(Debug, Clone)]
pub struct IsEqualInvariant {
    pub v: i64,
}

impl Invariant for IsEqualInvariant {
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
        match &slot.single {
            Some(DAGMessage::SingleVarFull(VarMessage { value, .. })) => {
                DAGMessage::FloatFull(Scalar(indicator(value.as_i64() == self.v)))
            }
            _ => DAGMessage::NoMessage,
        }
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        match &slot.single {
            Some(DAGMessage::MoveDelta { old, new }) => {
                let before = indicator(old.value.as_i64() == self.v);
                let after = indicator(new.value.as_i64() == self.v);
                DAGMessage::FloatDelta(Scalar(after - before))
            }
            _ => DAGMessage::NoMessage,
        }
    }
}

/// y = I[x ≠ v] over a single integer parent.
#[derive(Debug, Clone)]
pub struct IsDifferentInvariant {
    pub v: i64,
}

impl Invariant for IsDifferentInvariant {
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
        match &slot.single {
            Some(DAGMessage::SingleVarFull(VarMessage { value, .. })) => {
                DAGMessage::FloatFull(Scalar(indicator(value.as_i64() != self.v)))
            }
            _ => DAGMessage::NoMessage,
        }
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        match &slot.single {
            Some(DAGMessage::MoveDelta { old, new }) => {
                let before = indicator(old.value.as_i64() != self.v);
                let after = indicator(new.value.as_i64() != self.v);
                DAGMessage::FloatDelta(Scalar(after - before))
            }
            _ => DAGMessage::NoMessage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecisionValue;

    #[test]
    fn is_equal_full_and_delta() {
        let inv = IsEqualInvariant { v: 3 };
        let mut slot = InputSlot::default();
        slot.push(
            InputType::Single,
            DAGMessage::SingleVarFull(VarMessage { index: 0, value: DecisionValue::Int(3) }),
        );
        assert_eq!(inv.eval_full(&slot), DAGMessage::FloatFull(Scalar(1.0)));

        let mut dslot = InputSlot::default();
        dslot.push(
            InputType::Single,
            DAGMessage::MoveDelta {
                old: VarMessage { index: 0, value: DecisionValue::Int(3) },
                new: VarMessage { index: 0, value: DecisionValue::Int(4) },
            },
        );
        assert_eq!(inv.eval_delta(&dslot), DAGMessage::FloatDelta(Scalar(-1.0)));
    }

    #[test]
    fn or_is_true_if_any_leg_set() {
        let inv = OrInvariant::new(0);
        let mut slot = InputSlot::default();
        slot.push(InputType::Vector, DAGMessage::FloatFull(Scalar(0.0)));
        slot.push(InputType::Vector, DAGMessage::FloatFull(Scalar(1.0)));
        assert_eq!(inv.eval_full(&slot), DAGMessage::FloatFull(Scalar(1.0)));
    }

    #[test]
    fn or_delta_flips_only_when_the_last_true_leg_goes_false() {
        let mut inv = OrInvariant::new(2);
        let mut slot = InputSlot::default();
        slot.push(InputType::Vector, DAGMessage::FloatDelta(Scalar(-1.0)));
        // 2 true legs -> 1 true leg: OR stays true, no flip.
        assert_eq!(inv.eval_delta(&slot), DAGMessage::FloatDelta(Scalar(0.0)));
        inv.commit(&slot);
        assert_eq!(inv.true_count, 1);

        let mut slot2 = InputSlot::default();
        slot2.push(InputType::Vector, DAGMessage::FloatDelta(Scalar(-1.0)));
        // 1 true leg -> 0 true legs: OR flips to false.
        assert_eq!(inv.eval_delta(&slot2), DAGMessage::FloatDelta(Scalar(-1.0)));
        inv.commit(&slot2);
        assert_eq!(inv.true_count, 0);
    }

    #[test]
    fn and_delta_flips_only_when_every_leg_is_true() {
        let mut inv = AndInvariant::new(2, 1);
        let mut slot = InputSlot::default();
        slot.push(InputType::Vector, DAGMessage::FloatDelta(Scalar(1.0)));
        // 1/2 true -> 2/2 true: AND flips to true.
        assert_eq!(inv.eval_delta(&slot), DAGMessage::FloatDelta(Scalar(1.0)));
        inv.commit(&slot);
        assert_eq!(inv.true_count, 2);
    }
}
