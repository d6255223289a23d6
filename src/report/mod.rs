pub mod locators;
pub mod script;
