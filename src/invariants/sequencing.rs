//! Sequencing invariants (§4.6: `ConsecutiveInvariant`, `MinDistanceInvariant`).

use crate::dag::invariant::{Category, Invariant};
use crate::dag::message::{DAGMessage, InputSlot, InputType, Scalar};
use crate::invariants::indicator;

/// y = I[|v1 − v2| == 1] ∨ I[|v1 − v2| == (max − min)]: whether two values
/// are adjacent on a linear or circular range.
#[derive(Debug, Clone)]
pub struct ConsecutiveInvariant {
    min: i64,
    max: i64,
    left_index: u32,
    right_index: u32,
    left: i64,
    right: i64,
}

impl ConsecutiveInvariant {
    pub fn new(min: i64, max: i64, left_index: u32, right_index: u32, left: i64, right: i64) -> Self {
        Self {
            min,
            max,
            left_index,
            right_index,
            left,
            right,
        }
    }

    fn adjacent(&self, a: i64, b: i64) -> bool {
        let d = (a - b).abs();
        d == 1 || d == (self.max - self.min)
    }
}

impl Invariant for ConsecutiveInvariant {
    fn input_type(&self) -> InputType {
        InputType::Vector
    }

    fn category(&self) -> Category {
        Category::Stateful
    }

    fn init(&mut self, _slot: &InputSlot) -> DAGMessage {
        DAGMessage::FloatFull(Scalar(indicator(self.adjacent(self.left, self.right))))
    }

    fn eval_full(&self, slot: &InputSlot) -> DAGMessage {
        let (mut left, mut right) = (self.left, self.right);
        for m in &slot.vector {
            if let DAGMessage::SingleVarFull(v) = m {
                if v.index == self.left_index {
                    left = v.value.as_i64();
                } else if v.index == self.right_index {
                    right = v.value.as_i64();
                }
            }
        }
        DAGMessage::FloatFull(Scalar(indicator(self.adjacent(left, right))))
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        let before = indicator(self.adjacent(self.left, self.right));
        let (mut left, mut right) = (self.left, self.right);
        for m in &slot.vector {
            if let DAGMessage::MoveDelta { new, .. } = m {
                if new.index == self.left_index {
                    left = new.value.as_i64();
                } else if new.index == self.right_index {
                    right = new.value.as_i64();
                }
            }
        }
        let after = indicator(self.adjacent(left, right));
        DAGMessage::FloatDelta(Scalar(after - before))
    }

    fn commit(&mut self, slot: &InputSlot) {
        for m in &slot.vector {
            if let DAGMessage::MoveDelta { new, .. } = m {
                if new.index == self.left_index {
                    self.left = new.value.as_i64();
                } else if new.index == self.right_index {
                    self.right = new.value.as_i64();
                }
            }
        }
    }
}

/// violation = 1000·I[min pairwise distance < d] over a set of real-valued
/// variables. Stateful: the sorted values and the cached break indicator.
#[derive(Debug, Clone)]
pub struct MinDistanceInvariant {
    d: f64,
    values: Vec<f64>,
    is_currently_broken: bool,
}

const VIOLATION_MAGNITUDE: f64 = 1000.0;

impl MinDistanceInvariant {
    pub fn new(d: f64, initial_values: Vec<f64>) -> Self {
        let mut values = initial_values;
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let is_currently_broken = Self::min_gap_below(&values, d);
        Self {
            d,
            values,
            is_currently_broken,
        }
    }

    fn min_gap_below(sorted: &[f64], d: f64) -> bool {
        sorted.windows(2).any(|w| (w[1] - w[0]) < d)
    }
}

impl Invariant for MinDistanceInvariant {
    fn input_type(&self) -> InputType {
        InputType::Vector
    }

    fn category(&self) -> Category {
        Category::Stateful
    }

    fn init(&mut self, _slot: &InputSlot) -> DAGMessage {
        DAGMessage::FloatFull(Scalar(indicator(self.is_currently_broken) * VIOLATION_MAGNITUDE))
    }

    fn eval_full(&self, slot: &InputSlot) -> DAGMessage {
        let values = self.apply(slot);
        DAGMessage::FloatFull(Scalar(indicator(Self::min_gap_below(&values, self.d)) * VIOLATION_MAGNITUDE))
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        let values = self.apply(slot);
        let now_broken = Self::min_gap_below(&values, self.d);
        let delta = indicator(now_broken) - indicator(self.is_currently_broken);
        DAGMessage::FloatDelta(Scalar(delta * VIOLATION_MAGNITUDE))
    }

    fn commit(&mut self, slot: &InputSlot) {
        self.values = self.apply(slot);
        self.is_currently_broken = Self::min_gap_below(&self.values, self.d);
    }
}

impl MinDistanceInvariant {
    /// Applies every delta in `slot` to a scratch copy of `self.values`,
    /// re-sorted, without mutating `self`.
    fn apply(&self, slot: &InputSlot) -> Vec<f64> {
        let mut values = self.values.clone();
        for m in &slot.vector {
            if let DAGMessage::MoveDelta { old, new } = m {
                let old_v = old.value.as_i64() as f64;
                if let Some(pos) = values.iter().position(|&v| v == old_v) {
                    values.remove(pos);
                }
                values.push(new.value.as_i64() as f64);
            }
        }
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecisionValue;
    use crate::dag::message::VarMessage;

    #[test]
    fn consecutive_flags_adjacent_pair() {
        let inv = ConsecutiveInvariant::new(1, 5, 0, 1, 1, 2);
        let mut slot = InputSlot::default();
        slot.push(
            InputType::Vector,
            DAGMessage::SingleVarFull(VarMessage { index: 0, value: DecisionValue::Int(1) }),
        );
        slot.push(
            InputType::Vector,
            DAGMessage::SingleVarFull(VarMessage { index: 1, value: DecisionValue::Int(2) }),
        );
        assert_eq!(inv.eval_full(&slot), DAGMessage::FloatFull(Scalar(1.0)));
    }

    #[test]
    fn min_distance_flags_when_pair_moves_too_close() {
        let mut inv = MinDistanceInvariant::new(2.0, vec![0.0, 5.0]);
        assert!(!inv.is_currently_broken);
        let mut slot = InputSlot::default();
        slot.push(
            InputType::Vector,
            DAGMessage::MoveDelta {
                old: VarMessage { index: 0, value: DecisionValue::Int(0) },
                new: VarMessage { index: 0, value: DecisionValue::Int(4) },
            },
        );
        assert_eq!(inv.eval_delta(&slot), DAGMessage::FloatDelta(Scalar(VIOLATION_MAGNITUDE)));
        inv.commit(&slot);
        assert!(inv.is_currently_broken);
    }
}
