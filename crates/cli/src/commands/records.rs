use std::io;

use anyhow::Result;
use colored::*;
use vizkit_core::VisualizationManager;

pub async fn execute(manager: &VisualizationManager, json: bool) -> Result<()> {
    let result = manager.group_records().await;

    if json {
        serde_json::to_writer_pretty(io::stdout(), &result.groups)?;
        println!();
        return Ok(());
    }

    let heading = match &result.split_field {
        Some(field) => format!("Records by {}", field),
        None => "Records".to_string(),
    };
    println!("{}", heading.bold().underline());

    if result.record_count == 0 {
        println!("  {}", "No records found".dimmed());
        return Ok(());
    }

    for (group, records) in &result.groups {
        println!(
            "{} {}",
            group.blue().bold(),
            format!("({} records)", records.len()).dimmed()
        );
        for record in records {
            let cells: Vec<String> = record
                .iter()
                .map(|(field, value)| match value {
                    serde_json::Value::String(s) => format!("{}={}", field, s),
                    other => format!("{}={}", field, other),
                })
                .collect();
            println!("  {}", cells.join("  "));
        }
    }

    Ok(())
}
