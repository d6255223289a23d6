pub mod beam;
pub mod config;
pub mod expander;
pub mod ranker;
pub mod variation;
