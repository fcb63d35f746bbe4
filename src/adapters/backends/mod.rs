pub mod local_backend;
pub mod registry;
pub mod s3_backend;
