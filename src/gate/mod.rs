pub mod actions;
pub mod evaluator;
