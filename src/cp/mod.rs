//! Constraint-programming propagation core: reversible variables, a fixed
//! set of propagators, a fix-point worklist engine, and the model that
//! ties them together for initialization and move-completion enumeration.

pub mod constraint;
pub mod constraints;
pub mod enumerate;
pub mod model;
pub mod variable;
