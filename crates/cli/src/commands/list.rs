use std::path::Path;
use std::process;

use checkin_storage::{EntryStore, JsonFileStore};
use time::format_description::well_known::Rfc3339;

use crate::{report_error, OutputFormat};

pub(crate) async fn cmd_list(data_file: &Path, output: OutputFormat, quiet: bool) {
    let store = JsonFileStore::open(data_file).await;
    let entries = match store.list().await {
        Ok(entries) => entries,
        Err(e) => {
            report_error(&format!("error listing entries: {}", e), output, quiet);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => {
            let json = serde_json::json!({ "entries": entries });
            let pretty = serde_json::to_string_pretty(&json)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
        OutputFormat::Text => {
            if entries.is_empty() {
                if !quiet {
                    println!("no entries in {}", data_file.display());
                }
                return;
            }
            for entry in &entries {
                let created = entry
                    .created_at
                    .format(&Rfc3339)
                    .unwrap_or_else(|_| "unknown".to_string());
                let emotion = entry.ai.emotion.as_deref().unwrap_or("-");
                println!(
                    "{:<18} {:<10} {}  {}  {}",
                    entry.id, entry.status, created, emotion, entry.audio.original_name
                );
            }
        }
    }
}
