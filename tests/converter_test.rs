//! Integration tests for the conversion orchestrator.

mod common;

use std::io::{Cursor, Read};

use docshift::convert::{
    ConversionRoute, ConvertOptions, Converter, RoutingTable, SourceDocument, SourceKind,
    TargetKind,
};
use docshift::extract::{DocxTextExtractor, PdfTextExtractor, TextExtractor};
use docshift::render::PaginateOptions;
use docshift::{Error, RenderOptions, RetryPolicy};

fn converter() -> Converter {
    Converter::default()
}

#[test]
fn test_pdf_to_text() {
    let source = SourceDocument::new("report.pdf", common::text_pdf(&["Hello", "World"]));
    let artifact = converter().convert(&source, TargetKind::PlainText).unwrap();

    assert_eq!(artifact.name, "report.txt");
    assert_eq!(artifact.mime, "text/plain");
    assert_eq!(artifact.as_text().unwrap(), "Hello \nWorld \n");
}

#[test]
fn test_image_only_pdf_has_no_text() {
    let source = SourceDocument::new("scan.pdf", common::image_only_pdf());
    let result = converter().convert(&source, TargetKind::PlainText);
    assert!(matches!(result, Err(Error::NoExtractableText)));
}

#[test]
fn test_pdf_detected_from_content() {
    let source = SourceDocument::new("upload", common::text_pdf(&["x"]))
        .with_mime("application/octet-stream");
    assert_eq!(source.kind().unwrap(), SourceKind::Pdf);

    let artifact = converter().convert(&source, TargetKind::PlainText).unwrap();
    assert_eq!(artifact.name, "upload.txt");
}

#[test]
fn test_pdf_to_docx_is_refused() {
    let source = SourceDocument::new("report.pdf", common::text_pdf(&["Hello"]));
    match converter().convert(&source, TargetKind::Docx) {
        Err(Error::RouteDisabled { reason, .. }) => {
            assert_eq!(reason, "Client-side PDF to DOCX is not supported.")
        }
        other => panic!("Expected RouteDisabled, got {:?}", other),
    }
}

#[test]
fn test_plain_text_to_plain_text_is_unsupported() {
    let source = SourceDocument::new("notes.txt", b"hello".to_vec());
    let result = converter().convert(&source, TargetKind::PlainText);
    assert!(matches!(result, Err(Error::UnsupportedConversion { .. })));
}

#[test]
fn test_docx_to_text() {
    let bytes = common::docx(
        "<w:p><w:r><w:t>First</w:t></w:r><w:r><w:tab/><w:t>tabbed</w:t></w:r></w:p>\
         <w:p><w:r><w:t>Second</w:t><w:br/><w:t>line</w:t></w:r></w:p>",
    );
    let source = SourceDocument::new("memo.docx", bytes);
    let artifact = converter().convert(&source, TargetKind::PlainText).unwrap();
    assert_eq!(
        artifact.as_text().unwrap(),
        "First\ttabbed\n\nSecond\nline\n\n"
    );
}

#[test]
fn test_empty_docx_to_pdf_fails() {
    let source = SourceDocument::new("blank.docx", common::docx("<w:p/>"));
    let result = converter().convert(&source, TargetKind::Pdf);
    assert!(matches!(result, Err(Error::NoExtractableText)));
}

#[test]
fn test_docx_to_pdf_keeps_text() {
    let source = SourceDocument::new(
        "memo.docx",
        common::docx("<w:p><w:r><w:t>\u{201C}Quoted\u{201D} caf\u{e9}</w:t></w:r></w:p>"),
    );
    let artifact = converter().convert(&source, TargetKind::Pdf).unwrap();
    assert_eq!(artifact.name, "memo.pdf");

    let text = PdfTextExtractor::new().extract(&artifact.bytes).unwrap();
    assert!(text.contains("\"Quoted\" cafe"), "got {:?}", text);
}

#[test]
fn test_notebook_to_html() {
    let source = SourceDocument::new("demo.ipynb", common::NOTEBOOK);
    let artifact = converter().convert(&source, TargetKind::Html).unwrap();
    let html = artifact.as_text().unwrap();

    assert_eq!(artifact.name, "demo.html");
    assert_eq!(html.matches("<h1").count(), 1);
    assert_eq!(html.matches("<pre><code").count(), 1);
    assert_eq!(html.matches("<div class=\"output\">").count(), 1);
    assert!(html.contains("<pre class=\"output_text\">1</pre>"));
    assert!(html.contains("<title>demo.ipynb</title>"));
}

#[test]
fn test_notebook_to_docx_round_trip() {
    let source = SourceDocument::new("demo.ipynb", common::NOTEBOOK);
    let artifact = converter().convert(&source, TargetKind::Docx).unwrap();
    assert_eq!(artifact.name, "demo.docx");

    let text = DocxTextExtractor::new().extract(&artifact.bytes).unwrap();
    // Each cell ends with an empty spacer paragraph.
    assert_eq!(text, "Title\n\nSome notes\n\n\n\nprint(1)\n\n1\n\n\n\n");

    let mut archive = zip::ZipArchive::new(Cursor::new(artifact.bytes.as_slice())).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    assert!(xml.contains("Heading1"));
}

#[test]
fn test_notebook_to_pdf() {
    let source = SourceDocument::new("demo.ipynb", common::NOTEBOOK);
    let artifact = converter().convert(&source, TargetKind::Pdf).unwrap();
    assert!(artifact.bytes.starts_with(b"%PDF-"));

    let text = PdfTextExtractor::new().extract(&artifact.bytes).unwrap();
    for expected in ["Title", "Some notes", "print(1)", "1"] {
        assert!(text.contains(expected), "missing {:?} in {:?}", expected, text);
    }
}

#[test]
fn test_malformed_notebook() {
    let source = SourceDocument::new("broken.ipynb", b"{\"cells\": 3}".to_vec());
    let result = converter().convert(&source, TargetKind::Html);
    assert!(matches!(result, Err(Error::MalformedNotebook(_))));
}

#[test]
fn test_empty_notebook_to_pdf() {
    let source = SourceDocument::new("empty.ipynb", br#"{"cells": []}"#.to_vec());
    let result = converter().convert(&source, TargetKind::Pdf);
    assert!(matches!(result, Err(Error::EmptyRenderedContent)));
}

#[test]
fn test_large_markdown_ready_in_one_check() {
    // Far more blocks than a default wait could cover one batch at a time
    let text: String = (0..7000).map(|i| format!("line {}\n\n", i)).collect();
    let paginate = PaginateOptions::new().with_retry(RetryPolicy::immediate(1));
    let options = ConvertOptions::new()
        .with_render_options(RenderOptions::new().with_paginate(paginate));

    let source = SourceDocument::new("big.md", text.into_bytes());
    let artifact = Converter::new(options).convert(&source, TargetKind::Pdf).unwrap();

    let extracted = PdfTextExtractor::new().extract(&artifact.bytes).unwrap();
    let numbers: Vec<usize> = extracted
        .split_whitespace()
        .filter_map(|w| w.parse().ok())
        .collect();
    assert_eq!(numbers.len(), 7000);
    assert_eq!(numbers.last(), Some(&6999));
}

#[test]
fn test_long_markdown_paginates_in_order() {
    let text: String = (0..150).map(|i| format!("Paragraph number {}\n\n", i)).collect();
    let source = SourceDocument::new("long.md", text.into_bytes());
    let artifact = converter().convert(&source, TargetKind::Pdf).unwrap();

    let doc = lopdf::Document::load_mem(&artifact.bytes).unwrap();
    assert!(doc.get_pages().len() >= 2);

    let extracted = PdfTextExtractor::new().extract(&artifact.bytes).unwrap();
    let numbers: Vec<usize> = extracted
        .split_whitespace()
        .filter_map(|w| w.parse().ok())
        .collect();
    assert_eq!(numbers, (0..150).collect::<Vec<_>>());
}

#[test]
fn test_custom_route() {
    let routes = RoutingTable::new().with_route(
        ConversionRoute::new(SourceKind::Markdown, TargetKind::Docx, "to Word")
            .disabled("Maintenance"),
    );
    let converter = Converter::new(ConvertOptions::new().with_routes(routes));
    let source = SourceDocument::new("a.md", b"# A".to_vec());

    assert_eq!(converter.routes_for(&source).unwrap().len(), 1);
    match converter.convert(&source, TargetKind::Docx) {
        Err(Error::RouteDisabled { label, reason }) => {
            assert_eq!(label, "to Word");
            assert_eq!(reason, "Maintenance");
        }
        other => panic!("Expected RouteDisabled, got {:?}", other),
    }
}

#[test]
fn test_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "Hello from disk").unwrap();

    let source = SourceDocument::from_path(&path).unwrap();
    assert_eq!(source.name, "notes.txt");

    let artifact = docshift::convert_file(&path, TargetKind::Pdf).unwrap();
    assert_eq!(artifact.name, "notes.pdf");
}
