pub mod drill;
pub mod repetition;
