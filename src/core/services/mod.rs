pub mod env_resolver;
pub mod vars_loader;
pub mod vars_merger;
