pub mod environment;
pub mod fetch_context;
pub mod variable;
