use std::path::Path;

use reword::EditorOptions;
use tracing::debug;

use crate::shared::{open_document, write_file};

pub fn run(
    file: &Path,
    output: Option<&Path>,
    pretty: bool,
    options: EditorOptions,
) -> Result<(), i32> {
    let doc = open_document(file, options)?;
    let (model, warnings) = reword::Extractor::new(&doc).extract_with_warnings();
    for warning in &warnings {
        eprintln!("Warning: {warning}");
    }

    let json = if pretty {
        model.to_json_pretty()
    } else {
        model.to_json()
    }
    .map_err(|e| {
        eprintln!("Error: failed to serialize fragments: {e}");
        1
    })?;

    debug!(
        pages = model.page_count(),
        fragments = model.fragment_count(),
        "extracted"
    );
    match output {
        Some(path) => write_file(path, format!("{json}\n").as_bytes()),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}
