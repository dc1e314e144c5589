//! End-to-end extraction: PDF bytes → Document::open → FragmentModel.
//!
//! Test PDFs are created programmatically using lopdf.

mod common;

use common::{pdf_with_pages, texts};
use reword::{Document, EditorOptions, Extractor, FragmentModel, PdfError};

const HELLO: &str = "BT /F1 12 Tf 72 720 Td (Hello) Tj ET";
const IMAGE: &str = "q 50 0 0 50 72 600 cm /Im0 Do Q";

#[test]
fn hello_fragment_fields() {
    let model = reword::extract(&pdf_with_pages(&[HELLO])).unwrap();
    assert_eq!(model.page_count(), 1);
    let fragment = &model.pages()[0][0];
    assert_eq!(fragment.text, "Hello");
    assert_eq!(fragment.font, "Helvetica");
    assert_eq!(fragment.size, 12.0);
    assert_eq!(fragment.color, 0);

    let bbox = fragment.bbox.unwrap();
    assert!((bbox.x0 - 72.0).abs() < 1e-6);
    assert!((bbox.x1 - (72.0 + 2.278 * 12.0)).abs() < 1e-6);
    assert!((bbox.top - (72.0 - 0.718 * 12.0)).abs() < 1e-6);
    assert!((bbox.bottom - (72.0 + 0.207 * 12.0)).abs() < 1e-6);
}

#[test]
fn form_text_is_a_fragment_in_stream_order() {
    let content = format!("/Fm0 Do {HELLO}");
    let model = reword::extract(&pdf_with_pages(&[content.as_str()])).unwrap();
    assert_eq!(texts(&model), vec![vec!["Inside", "Hello"]]);
    let bbox = model.pages()[0][0].bbox.unwrap();
    assert!((bbox.x0 - 72.0).abs() < 1e-6);
    assert!((bbox.bottom - (192.0 + 0.207 * 12.0)).abs() < 1e-6);
}

#[test]
fn json_round_trip() {
    let pdf = pdf_with_pages(&[
        "BT /F1 12 Tf 72 720 Td (Plain ) Tj /F2 14 Tf (Bold) Tj 0 0 1 rg (Blue) Tj ET",
        "",
    ]);
    let model = reword::extract(&pdf).unwrap();
    let json = model.to_json().unwrap();
    assert_eq!(FragmentModel::from_json(&json).unwrap(), model);
    assert_eq!(texts(&model), vec![vec!["Plain ", "Bold", "Blue"], vec![]]);
    assert_eq!(model.pages()[0][2].color, 0x0000FF);
}

#[test]
fn extraction_is_deterministic() {
    let pdf = pdf_with_pages(&[
        "BT /F1 10 Tf 72 720 Td (one) Tj T* (two) Tj ET",
        "BT /F2 9 Tf 10 10 Td [(a) -2000 (b)] TJ ET BT /F1 9 Tf 300 300 Td (c) Tj ET",
    ]);
    let first = reword::extract(&pdf).unwrap();
    let second = reword::extract(&pdf).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn image_only_page_has_no_fragments() {
    let model = reword::extract(&pdf_with_pages(&[IMAGE, HELLO])).unwrap();
    assert_eq!(texts(&model), vec![vec![], vec!["Hello"]]);
}

#[test]
fn images_do_not_take_fragment_indices() {
    let before = "BT /F1 12 Tf 72 720 Td (before) Tj ET";
    let after = "BT /F1 12 Tf 72 500 Td (after) Tj ET";
    let content = format!("{before} {IMAGE} {after}");
    let pdf = pdf_with_pages(&[content.as_str()]);
    let model = reword::extract(&pdf).unwrap();
    assert_eq!(texts(&model), vec![vec!["before", "after"]]);
}

#[test]
fn empty_document_is_not_an_error() {
    let model = reword::extract(&pdf_with_pages(&[])).unwrap();
    assert_eq!(model.page_count(), 0);
    assert_eq!(model.fragment_count(), 0);
}

#[test]
fn corrupt_bytes_fail_to_open() {
    let err = reword::extract(b"%PDF-1.7\nthis is not really a pdf").unwrap_err();
    assert!(matches!(err, PdfError::DocumentOpen(_)));
}

#[test]
fn oversized_input_is_rejected() {
    let pdf = pdf_with_pages(&[HELLO]);
    let options = EditorOptions {
        max_input_bytes: pdf.len() - 1,
        ..EditorOptions::default()
    };
    let err = Document::open(&pdf, Some(options)).unwrap_err();
    assert!(matches!(err, PdfError::ResourceLimitExceeded { .. }));
}

#[test]
fn broken_page_content_yields_empty_page_and_warning() {
    let pdf = pdf_with_pages(&[HELLO, "BT /F1 12 Tf (unterminated Tj ET", HELLO]);
    let doc = Document::open(&pdf, None).unwrap();
    let (model, warnings) = Extractor::new(&doc).extract_with_warnings();
    assert_eq!(texts(&model), vec![vec!["Hello"], vec![], vec!["Hello"]]);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].page, Some(1));
}
