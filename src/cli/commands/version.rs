use crate::core::errors::Result;

/// Execute the `tivor version` command.
pub fn execute() -> Result<()> {
    println!("tivor version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
