pub mod parser;
pub mod step;
pub mod suite;
