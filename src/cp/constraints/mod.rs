//! Concrete propagators dispatched through [`super::constraint::Constraint`].

pub mod among;
pub mod element;
pub mod equal;
pub mod is_different;
pub mod or;
pub mod sum_less_than;
