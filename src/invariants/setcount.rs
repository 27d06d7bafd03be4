//! Set-membership counting invariants (§4.6: `AmongInvariant`,
//! `WeightedAmongInvariant`, `AllDifferentInvariant`).

use std::collections::HashMap;

use crate::dag::invariant::{Category, Invariant};
use crate::dag::message::{DAGMessage, InputSlot, InputType, Scalar};
use crate::invariants::indicator;

/// y = |{i : xᵢ ∈ S}|. Stateless.
#[derive(Debug, Clone)]
pub struct AmongInvariant {
    pub set: Vec<i64>,
}

impl AmongInvariant {
    fn in_set(&self, v: i64) -> bool {
        self.set.contains(&v)
    }
}

impl Invariant for AmongInvariant {
    fn input_type(&self) -> InputType {
        InputType::Vector
    }

    fn category(&self) -> Category {
        Category::Stateless
    }

    fn init(&mut self, slot: &InputSlot) -> DAGMessage {
        self.eval_full(slot)
    }

    fn eval_full(&self, slot: &InputSlot) -> DAGMessage {
        let count = slot
            .vector
            .iter()
            .filter(|m| matches!(m, DAGMessage::SingleVarFull(v) if self.in_set(v.value.as_i64())))
            .count();
        DAGMessage::FloatFull(Scalar(count as f64))
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        let delta: f64 = slot
            .vector
            .iter()
            .filter_map(|m| match m {
                DAGMessage::MoveDelta { old, new } => {
                    Some(indicator(self.in_set(new.value.as_i64())) - indicator(self.in_set(old.value.as_i64())))
                }
                _ => None,
            })
            .sum();
        DAGMessage::FloatDelta(Scalar(delta))
    }
}

/// y = Σ wᵢ·I[xᵢ ∈ S]. Stateless.
#[derive(Debug, Clone)]
pub struct WeightedAmongInvariant {
    pub set: Vec<i64>,
    weights: Vec<(u32, f64)>,
}

impl WeightedAmongInvariant {
    pub fn new(set: Vec<i64>, weights: Vec<(u32, f64)>) -> Self {
        Self { set, weights }
    }

    fn in_set(&self, v: i64) -> bool {
        self.set.contains(&v)
    }

    fn weight_of(&self, index: u32) -> f64 {
        self.weights.iter().find(|(i, _)| *i == index).map(|(_, w)| *w).unwrap_or(0.0)
    }
}

impl Invariant for WeightedAmongInvariant {
    fn input_type(&self) -> InputType {
        InputType::Vector
    }

    fn category(&self) -> Category {
        Category::Stateless
    }

    fn init(&mut self, slot: &InputSlot) -> DAGMessage {
        self.eval_full(slot)
    }

    fn eval_full(&self, slot: &InputSlot) -> DAGMessage {
        let sum = slot
            .vector
            .iter()
            .filter_map(|m| match m {
                DAGMessage::SingleVarFull(v) if self.in_set(v.value.as_i64()) => Some(self.weight_of(v.index)),
                _ => None,
            })
            .sum();
        DAGMessage::FloatFull(Scalar(sum))
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        let delta = slot
            .vector
            .iter()
            .filter_map(|m| match m {
                DAGMessage::MoveDelta { old, new } => {
                    let w = self.weight_of(new.index);
                    Some(w * (indicator(self.in_set(new.value.as_i64())) - indicator(self.in_set(old.value.as_i64()))))
                }
                _ => None,
            })
            .sum();
        DAGMessage::FloatDelta(Scalar(delta))
    }
}

/// violation = Σᵥ max(0, count[v] − 1). Stateful: a per-value occurrence count.
#[derive(Debug, Clone, Default)]
pub struct AllDifferentInvariant {
    count: HashMap<i64, u32>,
}

impl AllDifferentInvariant {
    pub fn new(initial_values: &[i64]) -> Self {
        let mut count = HashMap::new();
        for &v in initial_values {
            *count.entry(v).or_insert(0) += 1;
        }
        Self { count }
    }

    fn surplus(count: u32) -> f64 {
        count.saturating_sub(1) as f64
    }
}

impl Invariant for AllDifferentInvariant {
    fn input_type(&self) -> InputType {
        InputType::Vector
    }

    fn init(&mut self, _slot: &InputSlot) -> DAGMessage {
        let total: f64 = self.count.values().map(|&c| Self::surplus(c)).sum();
        DAGMessage::FloatFull(Scalar(total))
    }

    fn eval_full(&self, slot: &InputSlot) -> DAGMessage {
        let mut scratch = self.count.clone();
        scratch.clear();
        for m in &slot.vector {
            if let DAGMessage::SingleVarFull(v) = m {
                *scratch.entry(v.value.as_i64()).or_insert(0) += 1;
            }
        }
        let total: f64 = scratch.values().map(|&c| Self::surplus(c)).sum();
        DAGMessage::FloatFull(Scalar(total))
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        let mut scratch = self.count.clone();
        let mut delta = 0.0;
        for m in &slot.vector {
            if let DAGMessage::MoveDelta { old, new } = m {
                let old_v = old.value.as_i64();
                let new_v = new.value.as_i64();
                if old_v == new_v {
                    continue;
                }
                let before = Self::surplus(*scratch.get(&old_v).unwrap_or(&0));
                let c = scratch.entry(old_v).or_insert(0);
                *c = c.saturating_sub(1);
                delta += Self::surplus(*scratch.get(&old_v).unwrap_or(&0)) - before;

                let before = Self::surplus(*scratch.get(&new_v).unwrap_or(&0));
                *scratch.entry(new_v).or_insert(0) += 1;
                delta += Self::surplus(*scratch.get(&new_v).unwrap_or(&0)) - before;
            }
        }
        DAGMessage::FloatDelta(Scalar(delta))
    }

    fn commit(&mut self, slot: &InputSlot) {
        for m in &slot.vector {
            if let DAGMessage::MoveDelta { old, new } = m {
                let old_v = old.value.as_i64();
                let new_v = new.value.as_i64();
                if old_v == new_v {
                    continue;
                }
                if let Some(c) = self.count.get_mut(&old_v) {
                    *c = c.saturating_sub(1);
                }
                *self.count.entry(new_v).or_insert(0) += 1;
            }
        }
    }
}
