//! The DAG → CP builder (§4.7): walks a finished [`crate::dag::Dag`] in
//! topological order and emits a [`CPModel`] covering every invariant
//! marked with a CP-translatable [`crate::dag::NodeKind`].

use std::collections::HashMap;

use crate::cp::constraint::{Constraint, ConstraintId};
use crate::cp::constraints::among::AmongUp;
use crate::cp::constraints::element::ElementBC;
use crate::cp::constraints::equal::NotEqual;
use crate::cp::constraints::or::Or;
use crate::cp::constraints::sum_less_than::SumLessThan;
use crate::cp::model::CPModel;
use crate::cp::variable::{VarId, VarRef, Variable};
use crate::dag::{Dag, NodeKind};
use crate::trail::Trail;
use crate::CoreError;

/// Builds a fix-pointed [`CPModel`] covering `dag`'s CP-translatable
/// subgraph, per the authoritative table in §4.7.
pub fn build_cp_model(dag: &Dag, n_vars: u32) -> Result<CPModel, CoreError> {
    let mut trail = Trail::new();
    let mut sentinel_vars: HashMap<u32, Variable> = HashMap::new();
    let mut extra_vars: Vec<Variable> = Vec::new();
    let mut var_for: HashMap<u32, VarRef> = HashMap::new();
    let mut constraints: Vec<Constraint> = Vec::new();

    let next_extra_id = |extra_vars: &[Variable]| VarId(n_vars + extra_vars.len() as u32);

    for i in 0..dag.len() as u32 {
        match dag.kind(i) {
            NodeKind::Sentinel { var_index, domain } => {
                let v = Variable::new_int(&mut trail, domain.0 as i32, domain.1 as i32);
                sentinel_vars.insert(*var_index, v);
                var_for.insert(i, VarRef::Direct(VarId(*var_index)));
            }

            NodeKind::Scale { alpha } => {
                if let Some(pv) = dag.parents(i).first().and_then(|p| var_for.get(p)) {
                    var_for.insert(i, VarRef::scaled(pv.base(), *alpha as i32));
                }
            }

            NodeKind::Element { elements } => {
                let Some(&parent) = dag.parents(i).first() else { continue };
                let Some(&pv) = var_for.get(&parent) else { continue };
                let parent_is_bound = matches!(dag.kind(parent), NodeKind::Sentinel { domain, .. } if domain.0 == domain.1);

                if parent_is_bound {
                    let NodeKind::Sentinel { domain, .. } = dag.kind(parent) else { unreachable!() };
                    let value = elements[domain.0 as usize];
                    let id = next_extra_id(&extra_vars);
                    extra_vars.push(Variable::new_int(&mut trail, value as i32, value as i32));
                    var_for.insert(i, VarRef::Direct(id));
                } else {
                    let lo = *elements.iter().min().expect("Element table must not be empty");
                    let hi = *elements.iter().max().expect("Element table must not be empty");
                    let id = next_extra_id(&extra_vars);
                    extra_vars.push(Variable::new_int(&mut trail, lo as i32, hi as i32));
                    let cid = ConstraintId(constraints.len() as u32);
                    let table: Vec<i32> = elements.iter().map(|&v| v as i32).collect();
                    constraints.push(Constraint::ElementBC(ElementBC::new(&mut trail, table, pv, VarRef::Direct(id), cid)));
                    var_for.insert(i, VarRef::Direct(id));
                }
            }

            NodeKind::Or => {
                let parents = dag.parents(i);
                let resolved: Vec<VarRef> = parents.iter().filter_map(|p| var_for.get(p).copied()).collect();
                if resolved.len() == parents.len() && !resolved.is_empty() {
                    let id = next_extra_id(&extra_vars);
                    extra_vars.push(Variable::new_bool(&mut trail));
                    let cid = ConstraintId(constraints.len() as u32);
                    constraints.push(Constraint::Or(Or::new(&mut trail, resolved, VarRef::Direct(id), cid)));
                    var_for.insert(i, VarRef::Direct(id));
                }
            }

            NodeKind::NotEqual => {
                let parents = dag.parents(i);
                if let [a, b] = parents[..] {
                    if let (Some(&x), Some(&y)) = (var_for.get(&a), var_for.get(&b)) {
                        let cid = ConstraintId(constraints.len() as u32);
                        constraints.push(Constraint::NotEqual(NotEqual::new(&mut trail, x, y, cid)));
                    }
                }
            }

            NodeKind::Comparator { limit } => {
                let xs: Vec<VarRef> = dag.parents(i).iter().filter_map(|p| var_for.get(p).copied()).collect();
                if !xs.is_empty() {
                    let cid = ConstraintId(constraints.len() as u32);
                    constraints.push(Constraint::SumLessThan(SumLessThan::new(&mut trail, xs, limit.floor() as i32, cid)));
                }
            }

            NodeKind::AmongUpComposite { set, limit } => {
                let xs: Vec<VarRef> = dag.parents(i).iter().filter_map(|p| var_for.get(p).copied()).collect();
                if (xs.len() as f64) > *limit && !xs.is_empty() {
                    let cid = ConstraintId(constraints.len() as u32);
                    let s: Vec<i32> = set.iter().map(|&v| v as i32).collect();
                    constraints.push(Constraint::AmongUp(AmongUp::new(&mut trail, xs, s, limit.floor() as i32, cid)));
                }
            }

            NodeKind::Other => {}
        }
    }

    let mut vars: Vec<Variable> = (0..n_vars)
        .map(|v| sentinel_vars.remove(&v).expect("every decision variable must have a sentinel node"))
        .collect();
    vars.extend(extra_vars);

    let decision_vars: Vec<VarId> = (0..n_vars).map(VarId).collect();
    let mut model = CPModel::new(trail, vars, constraints, decision_vars);
    model.init()?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecisionValue;

    #[test]
    fn translates_not_equal_into_a_fixpointed_cp_model() {
        let mut dag = Dag::new(&[DecisionValue::Int(1), DecisionValue::Int(1)], &[(0, 3), (0, 3)], 1e9);
        dag.add_invariant(
            "ne",
            Box::new(crate::invariants::relational::RelationalInvariant::new(
                crate::invariants::relational::RelOp::NotEqual,
                0,
                1,
                1,
                1,
            )),
            NodeKind::NotEqual,
            &[0, 1],
        );
        dag.init().unwrap();
        let model = build_cp_model(&dag, 2).unwrap();
        assert_eq!(model.constraints.len(), 1);
    }
}
