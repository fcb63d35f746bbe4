pub mod backend;
pub mod parser;
