//! Integration tests for Markdown parsing and rendering.

use docshift::model::{Block, InlineSpan, ListKind, MarkdownDocument};
use docshift::render::{
    markdown_to_docx, markdown_to_html_document, markdown_to_html_fragment, markdown_to_text,
};
use docshift::{format_inline, parse_markdown};

#[test]
fn test_inline_bold_then_italic() {
    assert_eq!(
        format_inline("**a** and *b*"),
        vec![
            InlineSpan::Bold("a".to_string()),
            InlineSpan::Text(" and ".to_string()),
            InlineSpan::Italic("b".to_string()),
        ]
    );
}

#[test]
fn test_list_run_then_paragraph() {
    let doc = parse_markdown("- a\n- b\n\nc");

    assert_eq!(doc.blocks.len(), 3);
    assert!(matches!(
        &doc.blocks[0],
        Block::ListItem { kind: ListKind::Bullet, .. }
    ));
    assert!(matches!(
        &doc.blocks[1],
        Block::ListItem { kind: ListKind::Bullet, .. }
    ));
    assert!(matches!(&doc.blocks[2], Block::Paragraph { .. }));
    assert_eq!(doc.list_runs, vec![0..2]);
    assert_eq!(doc.blocks[2].plain_text(), "c");
}

#[test]
fn test_kind_switch_starts_new_run() {
    let doc = parse_markdown("- a\n1. b\n2. c\n* d");
    assert_eq!(doc.list_runs, vec![0..1, 1..3, 3..4]);

    let html = markdown_to_html_fragment(&doc);
    assert_eq!(html.matches("<ul").count(), 2);
    assert_eq!(html.matches("<ol").count(), 1);
}

#[test]
fn test_rendering_is_deterministic() {
    let source = "# Notes\n\n- **bold** item\n- `code` item\n\n1. [link](https://example.com)\n\nText _here_.";
    let first = parse_markdown(source);
    let second = parse_markdown(source);

    assert_eq!(first, second);
    assert_eq!(
        markdown_to_html_document(&first, "notes"),
        markdown_to_html_document(&second, "notes")
    );
}

#[test]
fn test_headings_need_space() {
    let doc = parse_markdown("#Not a heading\n#### Not either\n### Yes");
    assert!(matches!(&doc.blocks[0], Block::Paragraph { .. }));
    assert!(matches!(&doc.blocks[1], Block::Paragraph { .. }));
    assert!(matches!(&doc.blocks[2], Block::Heading { level: 3, .. }));
}

#[test]
fn test_plain_text_rendering() {
    let doc = parse_markdown("## Plan\n1. **Read**\n2. Write");
    assert_eq!(markdown_to_text(&doc), "Plan\n1. Read\n2. Write");
}

#[test]
fn test_bare_markers_render_empty_elements() {
    let doc = parse_markdown("- \n\n1. \n\n# ");
    assert_eq!(doc.list_runs, vec![0..1, 1..2]);

    assert_eq!(
        markdown_to_html_fragment(&doc),
        "<ul class=\"md-list md-bullet\">\n<li></li>\n</ul>\n\
         <ol class=\"md-list md-ordered\">\n<li></li>\n</ol>\n\
         <h1 class=\"md-h1\"></h1>\n"
    );
}

#[test]
fn test_hand_built_runs_out_of_range_render() {
    let doc = MarkdownDocument {
        blocks: vec![Block::ListItem {
            kind: ListKind::Bullet,
            inline: vec![InlineSpan::Text("only".to_string())],
        }],
        list_runs: vec![0..4],
    };

    let html = markdown_to_html_fragment(&doc);
    assert!(html.contains("only"));
    assert!(markdown_to_docx(&doc, "runs").is_ok());
}
