use std::io;

use anyhow::Result;
use vizkit_core::VisualizationManager;

pub async fn execute(manager: &VisualizationManager) -> Result<()> {
    let form = manager.configuration_form().await;
    serde_json::to_writer_pretty(io::stdout(), &form)?;
    println!();
    Ok(())
}
