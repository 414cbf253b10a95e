pub mod facts;
pub mod parser;
pub mod types;
