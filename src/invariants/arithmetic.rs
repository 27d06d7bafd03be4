//! Numeric aggregation invariants (§4.6: `SumInvariant`, `ScaleInvariant`,
//! `MultiplyInvariant`, `ScalarProductInvariant`).

use crate::dag::invariant::{Category, Invariant};
use crate::dag::message::{DAGMessage, InputSlot, InputType, Scalar};

/// y = Σ xᵢ. Stateless: every run recomputes from the slot alone.
#[derive(Debug, Clone, Default)]
pub struct SumInvariant;

impl Invariant for SumInvariant {
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
            .map(|m| match m {
                DAGMessage::SingleVarFull(v) => v.value.as_i64() as f64,
                other => other.as_scalar().map(|s| s.0).unwrap_or(0.0),
            })
            .sum();
        DAGMessage::FloatFull(Scalar(sum))
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        let sum = slot
            .vector
            .iter()
            .map(|m| match m {
                DAGMessage::MoveDelta { old, new } => (new.value.as_i64() - old.value.as_i64()) as f64,
                other => other.as_scalar().map(|s| s.0).unwrap_or(0.0),
            })
            .sum();
        DAGMessage::FloatDelta(Scalar(sum))
    }
}

/// y = α·x over a single parent. Stateless.
#[derive(Debug, Clone)]
pub struct ScaleInvariant {
    pub alpha: f64,
}

impl Invariant for ScaleInvariant {
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
            Some(DAGMessage::SingleVarFull(v)) => DAGMessage::FloatFull(Scalar(self.alpha * v.value.as_i64() as f64)),
            _ => DAGMessage::NoMessage,
        }
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        match &slot.single {
            Some(DAGMessage::MoveDelta { old, new }) => {
                DAGMessage::FloatDelta(Scalar(self.alpha * (new.value.as_i64() - old.value.as_i64()) as f64))
            }
            _ => DAGMessage::NoMessage,
        }
    }
}

/// y = Πxᵢ. Stateful: tracks the nonzero product and the zero count so a
/// delta never has to recompute the full product from scratch.
#[derive(Debug, Clone)]
pub struct MultiplyInvariant {
    var_indices: Vec<u32>,
    values: Vec<i64>,
}

impl MultiplyInvariant {
    pub fn new(var_indices: Vec<u32>, initial: Vec<i64>) -> Self {
        assert_eq!(var_indices.len(), initial.len());
        Self {
            var_indices,
            values: initial,
        }
    }

    fn nonzero_product_and_zeros(values: &[i64]) -> (f64, usize) {
        let mut product = 1.0;
        let mut zeros = 0;
        for &v in values {
            if v == 0 {
                zeros += 1;
            } else {
                product *= v as f64;
            }
        }
        (product, zeros)
    }
}

impl Invariant for MultiplyInvariant {
    fn input_type(&self) -> InputType {
        InputType::Vector
    }

    fn init(&mut self, slot: &InputSlot) -> DAGMessage {
        self.eval_full(slot)
    }

    fn eval_full(&self, slot: &InputSlot) -> DAGMessage {
        let mut values = self.values.clone();
        for m in &slot.vector {
            if let DAGMessage::SingleVarFull(v) = m {
                if let Some(pos) = self.var_indices.iter().position(|&i| i == v.index) {
                    values[pos] = v.value.as_i64();
                }
            }
        }
        let (nonzero_product, zeros) = Self::nonzero_product_and_zeros(&values);
        let y = if zeros > 0 { 0.0 } else { nonzero_product };
        DAGMessage::FloatFull(Scalar(y))
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        let (_, zeros_before) = Self::nonzero_product_and_zeros(&self.values);
        let before = if zeros_before > 0 {
            0.0
        } else {
            Self::nonzero_product_and_zeros(&self.values).0
        };

        let mut values = self.values.clone();
        for m in &slot.vector {
            if let DAGMessage::MoveDelta { new, .. } = m {
                if let Some(pos) = self.var_indices.iter().position(|&i| i == new.index) {
                    values[pos] = new.value.as_i64();
                }
            }
        }
        let (nonzero_product, zeros_after) = Self::nonzero_product_and_zeros(&values);
        let after = if zeros_after > 0 { 0.0 } else { nonzero_product };
        DAGMessage::FloatDelta(Scalar(after - before))
    }

    fn commit(&mut self, slot: &InputSlot) {
        for m in &slot.vector {
            if let DAGMessage::MoveDelta { new, .. } = m {
                if let Some(pos) = self.var_indices.iter().position(|&i| i == new.index) {
                    self.values[pos] = new.value.as_i64();
                }
            }
        }
    }
}

/// y = Σ wᵢ·xᵢ over binary xᵢ.
#[derive(Debug, Clone)]
pub struct ScalarProductInvariant {
    weights: Vec<(u32, f64)>,
}

impl ScalarProductInvariant {
    pub fn new(weights: Vec<(u32, f64)>) -> Self {
        Self { weights }
    }

    fn weight_of(&self, index: u32) -> f64 {
        self.weights.iter().find(|(i, _)| *i == index).map(|(_, w)| *w).unwrap_or(0.0)
    }
}

impl Invariant for ScalarProductInvariant {
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
                DAGMessage::SingleVarFull(v) => Some(self.weight_of(v.index) * v.value.as_i64() as f64),
                _ => None,
            })
            .sum();
        DAGMessage::FloatFull(Scalar(sum))
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        let sum = slot
            .vector
            .iter()
            .filter_map(|m| match m {
                DAGMessage::MoveDelta { old, new } => {
                    Some(self.weight_of(new.index) * (new.value.as_i64() - old.value.as_i64()) as f64)
                }
                _ => None,
            })
            .sum();
        DAGMessage::FloatDelta(Scalar(sum))
    }
}
