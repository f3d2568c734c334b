use anyhow::Result;
use colored::*;
use vizkit_core::VisualizationManager;

pub async fn execute(manager: &VisualizationManager) -> Result<()> {
    let result = manager.list_labels().await;

    let heading = match &manager.config.title {
        Some(title) => format!("Fields ({})", title),
        None => "Fields".to_string(),
    };
    println!("{}", heading.bold().underline());

    if result.labels.is_empty() {
        println!("  {}", "No fields selected".dimmed());
    }

    for field in &result.labels {
        let kind = if field.numeric {
            "numeric".green()
        } else {
            "text".dimmed()
        };
        if field.label == field.id {
            println!("{} {}", field.id.cyan().bold(), kind);
        } else {
            println!("{} {} {}", field.id.cyan().bold(), format!("as \"{}\"", field.label), kind);
        }
        if !field.overrides.is_empty() {
            println!("  {} {}", "overrides:".dimmed(), field.overrides.join(", "));
        }
    }

    println!();
    println!("{}", "Available".bold().underline());
    if result.available.is_empty() {
        println!("  {}", "Source reported no fields".dimmed());
    } else {
        println!("  {}", result.available.join(", "));
    }

    if result.tick_values != result.available {
        println!();
        println!("{}", "X-axis values".bold().underline());
        println!("  {}", result.tick_values.join(", "));
    }

    Ok(())
}
