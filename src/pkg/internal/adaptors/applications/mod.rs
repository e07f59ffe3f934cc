pub mod mutators;
pub mod spec;
