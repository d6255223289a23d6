pub mod generator;
pub mod resolved;
