use std::path::Path;

use reword::{Document, EditorOptions};
use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set. Otherwise warnings are shown, or everything
/// from the reword crates at debug level with `--verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose {
        "warn,reword=debug,reword_core=debug,reword_parse=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when running under a test harness.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Editor options with the global `--max-size` applied.
pub fn base_options(max_size: Option<usize>) -> EditorOptions {
    let mut options = EditorOptions::default();
    if let Some(limit) = max_size {
        options.max_input_bytes = limit;
    }
    options
}

/// Read a whole file, printing a user-facing message on failure.
pub fn read_file(file: &Path) -> Result<Vec<u8>, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }
    std::fs::read(file).map_err(|e| {
        eprintln!("Error: failed to read {}: {e}", file.display());
        1
    })
}

/// Open a PDF file with user-friendly error messages.
///
/// Returns `Err(1)` with a message printed to stderr if the file is missing,
/// too large, encrypted, or not a PDF.
pub fn open_document(file: &Path, options: EditorOptions) -> Result<Document, i32> {
    let bytes = read_file(file)?;
    Document::open(&bytes, Some(options)).map_err(|e| {
        eprintln!("Error: failed to open PDF: {e}");
        1
    })
}

/// Write `bytes` to `path`, printing a user-facing message on failure.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<(), i32> {
    std::fs::write(path, bytes).map_err(|e| {
        eprintln!("Error: failed to write {}: {e}", path.display());
        1
    })
}
