//! The message types invariants pass along DAG edges.
//!
//! [`DAGMessage`] is the union described in the design: `NoMessage`, the
//! concrete delta variants produced during a [`crate::dag::RunMode::Delta`]
//! traversal, and the concrete full-value variants produced during
//! [`crate::dag::RunMode::Init`]/[`crate::dag::RunMode::Full`]/
//! [`crate::dag::RunMode::Output`].

use std::ops::{Add, Mul, Sub};

use crate::DecisionValue;

/// A scalar delta or full value. Supports the arithmetic and ordering the
/// engine needs to combine and early-stop on messages without caring which
/// concrete variant carries it.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Scalar(pub f64);

impl Scalar {
    pub const ZERO: Scalar = Scalar(0.0);

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl Add for Scalar {
    type Output = Scalar;
    fn add(self, rhs: Scalar) -> Scalar {
        Scalar(self.0 + rhs.0)
    }
}

impl Sub for Scalar {
    type Output = Scalar;
    fn sub(self, rhs: Scalar) -> Scalar {
        Scalar(self.0 - rhs.0)
    }
}

impl Mul<f64> for Scalar {
    type Output = Scalar;
    fn mul(self, rhs: f64) -> Scalar {
        Scalar(self.0 * rhs)
    }
}

impl PartialEq<f64> for Scalar {
    fn eq(&self, other: &f64) -> bool {
        self.0 == *other
    }
}

impl PartialOrd<f64> for Scalar {
    fn partial_cmp(&self, other: &f64) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

/// A single variable's identity plus the value it carries, used by both
/// the move-delta and full single-variable messages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarMessage {
    pub index: u32,
    pub value: DecisionValue,
}

/// The aggregator's hard-constraint outcome, produced at the sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultDelta {
    pub objective_delta: f64,
    pub constraint_delta: f64,
    pub feasible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultFull {
    pub objective: f64,
    pub constraint: f64,
    pub feasible: bool,
}

/// Emitted by an `OutputRun`: the best-known and the originally-evaluated
/// value for the same invariant, side by side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputFull {
    pub best: f64,
    pub original: f64,
}

/// The union of every message an invariant can send downstream.
#[derive(Debug, Clone, PartialEq)]
pub enum DAGMessage {
    NoMessage,

    FloatDelta(Scalar),
    ObjectiveDelta(Scalar),
    ConstraintDelta(Scalar),
    IndexDelta(i64),
    MoveDelta { old: VarMessage, new: VarMessage },
    ResultDelta(ResultDelta),
    EarlyStopDelta,

    FloatFull(Scalar),
    ObjectiveFull(Scalar),
    ConstraintFull(Scalar),
    SingleVarFull(VarMessage),
    ResultFull(ResultFull),
    OutputFull(OutputFull),
}

impl DAGMessage {
    pub fn is_no_message(&self) -> bool {
        matches!(self, DAGMessage::NoMessage)
    }

    /// True for `NoMessage` and for any scalar message carrying exactly
    /// zero — the traversal's short-circuit condition.
    pub fn is_zero(&self) -> bool {
        match self {
            DAGMessage::NoMessage => true,
            DAGMessage::FloatDelta(s) | DAGMessage::ObjectiveDelta(s) | DAGMessage::ConstraintDelta(s) => s.is_zero(),
            DAGMessage::FloatFull(s) | DAGMessage::ObjectiveFull(s) | DAGMessage::ConstraintFull(s) => s.is_zero(),
            DAGMessage::IndexDelta(i) => *i == 0,
            _ => false,
        }
    }

    /// Extracts the scalar payload for messages that carry one, for
    /// generic combination in `Vector`/`Multi` input slots.
    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            DAGMessage::FloatDelta(s)
            | DAGMessage::ObjectiveDelta(s)
            | DAGMessage::ConstraintDelta(s)
            | DAGMessage::FloatFull(s)
            | DAGMessage::ObjectiveFull(s)
            | DAGMessage::ConstraintFull(s) => Some(*s),
            _ => None,
        }
    }
}

/// How a node's input slot absorbs messages from its parents (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    /// Exactly one parent message is expected; a second overwrites it.
    Single,
    /// A homogeneous vector; the engine enforces a single concrete
    /// message type across all contributions.
    Vector,
    /// A heterogeneous bag keyed by concrete message type, with
    /// per-type sums supported.
    Multi,
}

/// The per-node input accumulator the traversal writes into.
#[derive(Debug, Clone, Default)]
pub struct InputSlot {
    pub single: Option<DAGMessage>,
    pub vector: Vec<DAGMessage>,
    pub multi: Vec<DAGMessage>,
}

impl InputSlot {
    pub fn clear(&mut self) {
        self.single = None;
        self.vector.clear();
        self.multi.clear();
    }

    /// Appends `m` according to `kind`. Panics if a `Vector` slot
    /// receives a message whose discriminant differs from what is
    /// already present — the "homogeneous vector" contract in §4.5.
    pub fn push(&mut self, kind: InputType, m: DAGMessage) {
        match kind {
            InputType::Single => self.single = Some(m),
            InputType::Vector => {
                if let Some(first) = self.vector.first() {
                    assert_eq!(
                        std::mem::discriminant(first),
                        std::mem::discriminant(&m),
                        "Vector input slot received mixed message types"
                    );
                }
                self.vector.push(m);
            }
            InputType::Multi => self.multi.push(m),
        }
    }

    /// Sums the scalar payloads of every message in a `Multi` slot that
    /// shares a discriminant with `like`.
    pub fn multi_sum_like(&self, like: &DAGMessage) -> Scalar {
        self.multi
            .iter()
            .filter(|m| std::mem::discriminant(*m) == std::mem::discriminant(like))
            .filter_map(DAGMessage::as_scalar)
            .fold(Scalar::ZERO, |acc, s| acc + s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_arithmetic_and_ordering() {
        let a = Scalar(3.0);
        let b = Scalar(1.5);
        assert_eq!((a - b).0, 1.5);
        assert_eq!((a + b).0, 4.5);
        assert_eq!((a * 2.0).0, 6.0);
        assert!(a > 2.0);
        assert!(Scalar::ZERO.is_zero());
    }

    #[test]
    #[should_panic(expected = "mixed message types")]
    fn vector_slot_rejects_mixed_types() {
        let mut slot = InputSlot::default();
        slot.push(InputType::Vector, DAGMessage::FloatDelta(Scalar(1.0)));
        slot.push(InputType::Vector, DAGMessage::ConstraintDelta(Scalar(1.0)));
    }

    #[test]
    fn multi_sum_like_filters_by_discriminant() {
        let mut slot = InputSlot::default();
        slot.push(InputType::Multi, DAGMessage::ObjectiveDelta(Scalar(2.0)));
        slot.push(InputType::Multi, DAGMessage::ConstraintDelta(Scalar(5.0)));
        slot.push(InputType::Multi, DAGMessage::ObjectiveDelta(Scalar(3.0)));
        let sum = slot.multi_sum_like(&DAGMessage::ObjectiveDelta(Scalar(0.0)));
        assert_eq!(sum.0, 5.0);
    }
}
