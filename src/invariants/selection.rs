//! `MaximumInvariant` (§4.6): y = max xᵢ over positive integers bounded by M.

use crate::dag::invariant::{Category, Invariant};
use crate::dag::message::{DAGMessage, InputSlot, InputType, Scalar};

#[derive(Debug, Clone)]
pub struct MaximumInvariant {
    bound: usize,
    count_per_value: Vec<u32>,
    current_max: i64,
}

impl MaximumInvariant {
    pub fn new(bound: usize, initial_values: &[i64]) -> Self {
        let mut count_per_value = vec![0u32; bound + 1];
        for &v in initial_values {
            count_per_value[v as usize] += 1;
        }
        let current_max = (1..=bound as i64).rev().find(|&v| count_per_value[v as usize] > 0).unwrap_or(0);
        Self {
            bound,
            count_per_value,
            current_max,
        }
    }

    fn highest_nonzero(counts: &[u32], from: i64) -> i64 {
        (1..=from).rev().find(|&v| counts[v as usize] > 0).unwrap_or(0)
    }
}

impl Invariant for MaximumInvariant {
    fn input_type(&self) -> InputType {
        InputType::Vector
    }

    fn category(&self) -> Category {
        Category::Stateful
    }

    fn init(&mut self, _slot: &InputSlot) -> DAGMessage {
        DAGMessage::FloatFull(Scalar(self.current_max as f64))
    }

    fn eval_full(&self, slot: &InputSlot) -> DAGMessage {
        let mut counts = vec![0u32; self.bound + 1];
        for m in &slot.vector {
            if let DAGMessage::SingleVarFull(v) = m {
                counts[v.value.as_i64() as usize] += 1;
            }
        }
        let max = Self::highest_nonzero(&counts, self.bound as i64);
        DAGMessage::FloatFull(Scalar(max as f64))
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        let mut counts = self.count_per_value.clone();
        let mut new_max_candidate = self.current_max;
        for m in &slot.vector {
            if let DAGMessage::MoveDelta { old, new } = m {
                let old_v = old.value.as_i64();
                let new_v = new.value.as_i64();
                if counts[old_v as usize] > 0 {
                    counts[old_v as usize] -= 1;
                }
                counts[new_v as usize] += 1;
                if new_v > new_max_candidate {
                    new_max_candidate = new_v;
                }
            }
        }
        let new_max = if new_max_candidate > self.current_max {
            new_max_candidate
        } else {
            Self::highest_nonzero(&counts, self.bound as i64)
        };
        DAGMessage::FloatDelta(Scalar((new_max - self.current_max) as f64))
    }

    fn commit(&mut self, slot: &InputSlot) {
        for m in &slot.vector {
            if let DAGMessage::MoveDelta { old, new } = m {
                let old_v = old.value.as_i64();
                let new_v = new.value.as_i64();
                if self.count_per_value[old_v as usize] > 0 {
                    self.count_per_value[old_v as usize] -= 1;
                }
                self.count_per_value[new_v as usize] += 1;
            }
        }
        self.current_max = Self::highest_nonzero(&self.count_per_value, self.bound as i64);
    }
}
