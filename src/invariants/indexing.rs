//! `ElementInvariant` (§4.6): given an integer-valued index message, emit
//! the corresponding element of a fixed table. Stateless.

use crate::dag::invariant::{Category, Invariant};
use crate::dag::message::{DAGMessage, InputSlot, InputType, VarMessage};
use crate::DecisionValue;

#[derive(Debug, Clone)]
pub struct ElementInvariant {
    pub out_index: u32,
    pub elements: Vec<i64>,
}

impl ElementInvariant {
    fn lookup(&self, i: i64) -> i64 {
        self.elements[i as usize]
    }
}

impl Invariant for ElementInvariant {
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
            Some(DAGMessage::SingleVarFull(VarMessage { value, .. })) => DAGMessage::SingleVarFull(VarMessage {
                index: self.out_index,
                value: DecisionValue::Int(self.lookup(value.as_i64())),
            }),
            _ => DAGMessage::NoMessage,
        }
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        match &slot.single {
            Some(DAGMessage::MoveDelta { old, new }) => DAGMessage::MoveDelta {
                old: VarMessage {
                    index: self.out_index,
                    value: DecisionValue::Int(self.lookup(old.value.as_i64())),
                },
                new: VarMessage {
                    index: self.out_index,
                    value: DecisionValue::Int(self.lookup(new.value.as_i64())),
                },
            },
            _ => DAGMessage::NoMessage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_looks_up_the_table() {
        let inv = ElementInvariant {
            out_index: 9,
            elements: vec![10, 20, 30],
        };
        let mut slot = InputSlot::default();
        slot.push(
            InputType::Single,
            DAGMessage::SingleVarFull(VarMessage { index: 0, value: DecisionValue::Int(2) }),
        );
        assert_eq!(
            inv.eval_full(&slot),
            DAGMessage::SingleVarFull(VarMessage { index: 9, value: DecisionValue::Int(30) })
        );
    }
}
