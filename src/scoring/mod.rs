pub mod idf;
pub mod similarity;
pub mod vectors;
