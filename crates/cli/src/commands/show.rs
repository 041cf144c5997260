use std::path::Path;
use std::process;

use checkin_storage::{EntryStore, JsonFileStore};

use crate::{report_error, OutputFormat};

pub(crate) async fn cmd_show(data_file: &Path, id: &str, output: OutputFormat, quiet: bool) {
    let store = JsonFileStore::open(data_file).await;
    match store.get(id).await {
        Ok(entry) => {
            let pretty = serde_json::to_string_pretty(&entry)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    }
}
