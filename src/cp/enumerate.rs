//! Move enumeration filter (§4.8): given a candidate set of decision
//! variables and the model's current solution, solves the CP restricted
//! to those variables to enumerate every feasible sub-assignment.

use crate::{DecisionValue, Move};

use super::model::CPModel;
use super::variable::VarId;

/// Filters a lazy Cartesian product of candidate moves over `free_vars`
/// down to those consistent with the CP model:
///
/// 1. checkpoints the model via [`CPModel::eval`]'s own snapshot,
/// 2. fixes every decision variable not in `free_vars` to its value in
///    `current_solution` and propagates,
/// 3. depth-first enumerates the restricted Cartesian product,
/// 4. restores the trail before returning.
///
/// The returned list always ends with the no-op move (every free
/// variable left at its current value), preceded by the concrete
/// feasible moves.
pub fn filter_moves(model: &mut CPModel, current_solution: &[(VarId, i32)], free_vars: &[VarId]) -> Vec<Move> {
    let fixed: Vec<(VarId, i32)> = current_solution
        .iter()
        .filter(|(v, _)| !free_vars.contains(v))
        .copied()
        .collect();

    let tuples = model.eval(&fixed, free_vars);

    let current_free_values: Vec<i32> = free_vars
        .iter()
        .map(|v| current_solution.iter().find(|(cv, _)| cv == v).map(|(_, val)| *val).unwrap_or_default())
        .collect();

    let mut moves: Vec<Move> = tuples
        .into_iter()
        .filter(|t| t != &current_free_values)
        .map(|tuple| {
            let assignments = free_vars
                .iter()
                .zip(tuple.into_iter())
                .map(|(v, val)| (v.0, DecisionValue::Int(val as i64)))
                .collect();
            Move::new(assignments)
        })
        .collect();

    moves.push(Move::new(
        free_vars
            .iter()
            .zip(current_free_values.into_iter())
            .map(|(v, val)| (v.0, DecisionValue::Int(val as i64)))
            .collect(),
    ));
    moves
}
