pub mod rule;
pub mod serve;
