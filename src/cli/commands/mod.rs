pub mod apply;
pub mod init;
pub mod list;
pub mod plan;
pub mod project;
pub mod resolve;
pub mod show;
pub mod terraform_helpers;
pub mod version;
