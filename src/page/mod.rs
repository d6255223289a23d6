pub mod element;
pub mod extractor;
pub mod markup;
