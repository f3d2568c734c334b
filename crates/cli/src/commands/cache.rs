use anyhow::Result;
use colored::*;
use vizkit_core::cache::FileCacheStore;

use crate::CacheCommands;

pub fn execute(cache: &FileCacheStore, command: CacheCommands) -> Result<()> {
    match command {
        CacheCommands::List => {
            let entries = cache.list_entries()?;
            if entries.is_empty() {
                println!("No cached payloads found in {}.", cache.cache_dir().display());
            } else {
                println!("Cached payloads in {}:", cache.cache_dir().display());
                for entry in entries {
                    let state = if entry.expired {
                        "expired".red()
                    } else {
                        format!("expires at {}", entry.expires_at).green()
                    };
                    println!("  {} {}", entry.key, state);
                }
            }
        }
        CacheCommands::Clear => {
            cache.clear()?;
            println!("Cache cleared successfully.");
        }
    }

    Ok(())
}
