pub mod json_vars_parser;
pub mod tfvars_parser;

use crate::core::traits::parser::VarsParser;
use json_vars_parser::JsonVarsParser;
use tfvars_parser::TfvarsParser;

/// Pick the parser for a variable file by its extension.
///
/// JSON files (`*.tfvars.json`, `*.json`) use `JsonVarsParser`; everything
/// else is read as native tfvars syntax.
pub fn parser_for_path(path: &str) -> Box<dyn VarsParser> {
    let lower = path.to_ascii_lowercase();
    let json = JsonVarsParser;
    if json
        .supported_extensions()
        .iter()
        .any(|ext| lower.ends_with(ext))
    {
        Box::new(json)
    } else {
        Box::new(TfvarsParser)
    }
}
