use serde::Deserialize;

/// Typed configuration of the `s3` backend.
///
/// Parsed and validated so that a misconfigured `tivor.yaml` is reported
/// precisely, even though fetching from S3 is not available yet.
#[derive(Debug, Clone, Deserialize)]
pub struct S3BackendConfig {
    pub bucket: String,
    pub key: Option<String>,
    pub region: Option<String>,
    pub dynamodb_table: Option<String>,
}
