//! Fragment extraction: page → block → line → span, one fragment per span.

use reword_core::{EditWarning, EditWarningCode, FragmentModel, TextFragment};
use reword_parse::{LopdfBackend, PdfBackend};
use tracing::warn;

use crate::document::Document;

/// Produces the [`FragmentModel`] of a document.
///
/// Extraction has no side effects on the document. A page whose content
/// cannot be interpreted yields an empty fragment list and a
/// [`EditWarningCode::PageInterpretation`] warning, so fragment indices on
/// the other pages are unaffected.
pub struct Extractor<'a, B: PdfBackend = LopdfBackend> {
    doc: &'a Document<B>,
}

impl<'a, B: PdfBackend> Extractor<'a, B> {
    pub fn new(doc: &'a Document<B>) -> Self {
        Self { doc }
    }

    /// Fragments of every page, in physical page order.
    pub fn extract(&self) -> FragmentModel {
        self.extract_with_warnings().0
    }

    /// Like [`Extractor::extract`], also returning a warning for every
    /// page that could not be interpreted.
    pub fn extract_with_warnings(&self) -> (FragmentModel, Vec<EditWarning>) {
        let mut model = FragmentModel::new();
        let mut warnings = Vec::new();
        for index in 0..self.doc.page_count() {
            let fragments = match self.page(index) {
                Ok(fragments) => fragments,
                Err(warning) => {
                    warnings.push(warning);
                    Vec::new()
                }
            };
            model.push_page(fragments);
        }
        (model, warnings)
    }

    /// Fragments of one page. Failure is reported as the warning the
    /// caller should record; it has already been logged.
    pub(crate) fn page(&self, index: usize) -> Result<Vec<TextFragment>, EditWarning> {
        self.doc.page_fragments(index).map_err(|err| {
            warn!(page = index, error = %err, "page content could not be interpreted");
            EditWarning::on_page(EditWarningCode::PageInterpretation, index, err.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_backend::{FakeBackend, fake_pdf};

    #[test]
    fn one_fragment_per_span_in_page_order() {
        let bytes = fake_pdf(&[&["a", "b"], &[], &["c"]]);
        let doc = Document::<FakeBackend>::open_with_backend(&bytes, None).unwrap();
        let model = Extractor::new(&doc).extract();
        assert_eq!(model.page_count(), 3);
        let texts: Vec<Vec<&str>> = model
            .pages()
            .iter()
            .map(|p| p.iter().map(|f| f.text.as_str()).collect())
            .collect();
        assert_eq!(texts, vec![vec!["a", "b"], vec![], vec!["c"]]);
    }

    #[test]
    fn image_blocks_are_skipped() {
        let bytes = fake_pdf(&[&["a", "<image>", "b"]]);
        let doc = Document::<FakeBackend>::open_with_backend(&bytes, None).unwrap();
        let model = Extractor::new(&doc).extract();
        assert_eq!(model.fragment_count(), 2);
    }

    #[test]
    fn broken_page_becomes_empty_with_warning() {
        let bytes = fake_pdf(&[&["a"], &["<broken>"], &["c"]]);
        let doc = Document::<FakeBackend>::open_with_backend(&bytes, None).unwrap();
        let (model, warnings) = Extractor::new(&doc).extract_with_warnings();
        assert_eq!(model.page(1), Some(&[][..]));
        assert_eq!(model.page(2).unwrap()[0].text, "c");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, EditWarningCode::PageInterpretation);
        assert_eq!(warnings[0].page, Some(1));
    }

    #[test]
    fn repeated_extraction_is_identical() {
        let bytes = fake_pdf(&[&["x", "y", "z"]]);
        let doc = Document::<FakeBackend>::open_with_backend(&bytes, None).unwrap();
        assert_eq!(doc.extract(), doc.extract());
    }
}
