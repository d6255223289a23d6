pub mod browser;
pub mod cli;
pub mod error;
pub mod logging;
pub mod page;
pub mod plan;
pub mod report;
pub mod scenario;
pub mod scoring;
pub mod search;
pub mod text;
pub mod trace;

pub use error::MatchError;
