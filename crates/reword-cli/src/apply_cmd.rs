use std::path::{Path, PathBuf};

use reword::{ApplyReport, EditSet, EditWarning, EditorOptions};
use tracing::debug;

use crate::shared::{open_document, read_file, write_file};

pub fn run(
    file: &Path,
    edits: &Path,
    output: Option<&Path>,
    options: EditorOptions,
) -> Result<(), i32> {
    let (edit_set, parse_warnings) = load_edits(edits)?;
    let mut doc = open_document(file, options)?;
    let (bytes, report) = doc.apply_with_report(&edit_set).map_err(|e| {
        eprintln!("Error: failed to write edited PDF: {e}");
        1
    })?;

    let output = output.map_or_else(|| default_output(file), Path::to_path_buf);
    write_file(&output, &bytes)?;
    debug!(path = %output.display(), bytes = bytes.len(), "wrote edited document");

    for warning in parse_warnings.iter().chain(&report.warnings) {
        eprintln!("Warning: {warning}");
    }
    println!(
        "{}",
        summary(&output, edit_set.len(), parse_warnings.len(), &report)
    );
    Ok(())
}

fn load_edits(path: &Path) -> Result<(EditSet, Vec<EditWarning>), i32> {
    let raw = read_file(path)?;
    let value: serde_json::Value = serde_json::from_slice(&raw).map_err(|e| {
        eprintln!("Error: {} is not valid JSON: {e}", path.display());
        1
    })?;
    EditSet::parse_with_warnings(&value).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })
}

/// `edited_<stem>.pdf` next to the input.
fn default_output(file: &Path) -> PathBuf {
    let stem = file
        .file_stem()
        .map_or_else(|| "document".into(), |s| s.to_string_lossy());
    file.with_file_name(format!("edited_{stem}.pdf"))
}

fn summary(output: &Path, requested: usize, dropped: usize, report: &ApplyReport) -> String {
    let skipped = requested.saturating_sub(report.redacted) + dropped;
    format!(
        "Wrote {}: {} of {} edits applied ({} redacted, {} inserted, {} skipped) on {} page(s)",
        output.display(),
        report.redacted,
        requested + dropped,
        report.redacted,
        report.inserted,
        skipped,
        report.pages_touched.len()
    )
}
