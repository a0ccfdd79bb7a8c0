//! Upload registry commands.

use crate::backend::open_instance;
use crate::cli::StorageArgs;
use crate::output::{OutputFormat, print_json, print_table};

/// Run the `files list` command
///
/// Lists registry records and whether their bytes are present in the upload
/// root, which makes registry/filesystem divergence visible.
pub async fn list(args: &StorageArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let instance = open_instance(args).await?;
    let records = instance.list_files().await?;

    let mut present = Vec::with_capacity(records.len());
    for record in &records {
        present.push(instance.storage().exists(&record.filename).await);
    }

    match format {
        OutputFormat::Human => {
            let rows: Vec<Vec<String>> = records
                .iter()
                .zip(&present)
                .map(|(r, present)| {
                    vec![
                        r.id.to_string(),
                        r.filename.clone(),
                        r.uploader.clone(),
                        if *present { "yes" } else { "missing" }.to_string(),
                    ]
                })
                .collect();
            print_table(
                &["ID", "FILENAME", "UPLOADER", "STORED"],
                &rows,
                "No files uploaded.",
            );
        }
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = records
                .iter()
                .zip(&present)
                .map(|(r, present)| {
                    serde_json::json!({
                        "id": r.id,
                        "filename": r.filename,
                        "uploader": r.uploader,
                        "stored": present,
                    })
                })
                .collect();
            print_json(&entries)?;
        }
    }
    Ok(())
}
