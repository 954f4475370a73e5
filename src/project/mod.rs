pub mod builder;
pub mod script;
