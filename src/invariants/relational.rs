//! `RelationalInvariant` (§4.6): a stateful two-variable comparison whose
//! violation is tracked incrementally rather than recomputed from scratch.

use crate::dag::invariant::{Category, Invariant};
use crate::dag::message::{DAGMessage, InputSlot, InputType, Scalar, VarMessage};
use crate::invariants::indicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Equal,
    NotEqual,
}

impl RelOp {
    fn holds(&self, a: i64, b: i64) -> bool {
        match self {
            RelOp::Equal => a == b,
            RelOp::NotEqual => a != b,
        }
    }
}

/// y = I[¬(x op y)]: 1 exactly when the relation is violated.
#[derive(Debug, Clone)]
pub struct RelationalInvariant {
    op: RelOp,
    left_index: u32,
    right_index: u32,
    left: i64,
    right: i64,
}

impl RelationalInvariant {
    pub fn new(op: RelOp, left_index: u32, right_index: u32, left: i64, right: i64) -> Self {
        Self {
            op,
            left_index,
            right_index,
            left,
            right,
        }
    }

    fn violation(&self, left: i64, right: i64) -> f64 {
        indicator(!self.op.holds(left, right))
    }
}

impl Invariant for RelationalInvariant {
    fn input_type(&self) -> InputType {
        InputType::Vector
    }

    fn category(&self) -> Category {
        Category::Stateful
    }

    fn init(&mut self, slot: &InputSlot) -> DAGMessage {
        for m in &slot.vector {
            if let DAGMessage::SingleVarFull(VarMessage { index, value }) = m {
                if *index == self.left_index {
                    self.left = value.as_i64();
                } else if *index == self.right_index {
                    self.right = value.as_i64();
                }
            }
        }
        DAGMessage::FloatFull(Scalar(self.violation(self.left, self.right)))
    }

    fn eval_full(&self, slot: &InputSlot) -> DAGMessage {
        let mut left = self.left;
        let mut right = self.right;
        for m in &slot.vector {
            if let DAGMessage::SingleVarFull(VarMessage { index, value }) = m {
                if *index == self.left_index {
                    left = value.as_i64();
                } else if *index == self.right_index {
                    right = value.as_i64();
                }
            }
        }
        DAGMessage::FloatFull(Scalar(self.violation(left, right)))
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        let before = self.violation(self.left, self.right);
        let mut left = self.left;
        let mut right = self.right;
        for m in &slot.vector {
            if let DAGMessage::MoveDelta { new, .. } = m {
                if new.index == self.left_index {
                    left = new.value.as_i64();
                } else if new.index == self.right_index {
                    right = new.value.as_i64();
                }
            }
        }
        let after = self.violation(left, right);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecisionValue;

    #[test]
    fn not_equal_relation_flips_on_collision() {
        let mut inv = RelationalInvariant::new(RelOp::NotEqual, 0, 1, 1, 2);
        let mut slot = InputSlot::default();
        slot.push(
            InputType::Vector,
            DAGMessage::MoveDelta {
                old: VarMessage { index: 1, value: DecisionValue::Int(2) },
                new: VarMessage { index: 1, value: DecisionValue::Int(1) },
            },
        );
        assert_eq!(inv.eval_delta(&slot), DAGMessage::FloatDelta(Scalar(1.0)));
        inv.commit(&slot);
        assert_eq!(inv.right, 1);
    }
}
