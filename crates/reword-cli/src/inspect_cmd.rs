use std::path::Path;

use reword::{EditorOptions, TextFragment};

use crate::shared::open_document;

/// Longest text shown per fragment before truncation.
const MAX_TEXT_CHARS: usize = 48;

pub fn run(file: &Path, page: Option<usize>, options: EditorOptions) -> Result<(), i32> {
    let doc = open_document(file, options)?;
    let page_count = doc.page_count();
    let pages: Vec<usize> = match page {
        Some(index) if index >= page_count => {
            eprintln!("Error: page {index} out of range (document has {page_count} pages)");
            return Err(1);
        }
        Some(index) => vec![index],
        None => (0..page_count).collect(),
    };

    for index in pages {
        println!("--- Page {index} ---");
        match doc.page_fragments(index) {
            Ok(fragments) => {
                for (i, fragment) in fragments.iter().enumerate() {
                    println!("{}", format_row(i, fragment));
                }
            }
            // Extraction treats this page as empty, so edits cannot target it.
            Err(e) => eprintln!("Warning: page {index} could not be interpreted: {e}"),
        }
    }
    Ok(())
}

/// One tab-separated line: index, bbox, font, size, color, quoted text.
fn format_row(index: usize, fragment: &TextFragment) -> String {
    let bbox = match fragment.bbox {
        Some(b) => format!("{:.1},{:.1},{:.1},{:.1}", b.x0, b.top, b.x1, b.bottom),
        None => "-".to_string(),
    };
    format!(
        "{index}\t{bbox}\t{}\t{:.1}\t#{:06x}\t{:?}",
        fragment.font,
        fragment.size,
        fragment.color,
        truncate(&fragment.text)
    )
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_TEXT_CHARS {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(MAX_TEXT_CHARS - 1).collect();
        short.push('…');
        short
    }
}
