use std::io;

use anyhow::Result;
use vizkit_core::configs::visualization::visualization_config_schema;

pub fn execute() -> Result<()> {
    let schema = visualization_config_schema()?;
    serde_json::to_writer_pretty(io::stdout(), &schema)?;
    println!();
    Ok(())
}
