use crate::core::errors::Result;
use crate::core::models::variable::VariableSet;

/// Port for parsing and rendering variable-definition files.
///
/// `TfvarsParser` handles native `.tfvars` syntax; `JsonVarsParser` reads
/// Terraform's JSON variant. Merged output is always rendered as tfvars.
pub trait VarsParser: Send + Sync {
    /// Parse raw file content into an ordered `VariableSet`.
    fn parse(&self, content: &str) -> Result<VariableSet>;

    /// Render a `VariableSet` in this parser's file format, optionally
    /// headed by a comment naming `label`.
    fn serialize(&self, variables: &VariableSet, label: Option<&str>) -> Result<String>;

    /// File extensions this parser handles (e.g. `[".tfvars"]`).
    fn supported_extensions(&self) -> &[&str];
}
