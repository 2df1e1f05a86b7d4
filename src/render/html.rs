//! HTML rendering for Markdown and notebooks.
//!
//! Fragments carry stable `md-*` class hooks and no inline styling, so the
//! host page decides how they look. Full documents embed a small
//! structural stylesheet and are self-contained.

use crate::model::{Block, CellKind, InlineSpan, ListKind, MarkdownDocument, Node, Notebook};
use crate::parser::parse_markdown;

use super::RenderOptions;

const STYLESHEET: &str = r#"body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif; line-height: 1.6; margin: 0; padding: 2em; background: #fff; color: #333; }
.cell { margin-bottom: 1.5em; padding: 1em; border: 1px solid #e1e1e1; border-radius: 8px; }
.markdown-cell { background-color: #fff; border-color: transparent; padding: 1em 0; }
.code-cell { background-color: #f7f7f7; }
pre { background-color: #f0f0f0; padding: 1em; border-radius: 4px; overflow-x: auto; }
code { font-family: "SF Mono", "Menlo", "Monaco", "Consolas", "Liberation Mono", "Courier New", monospace; }
.output { margin-top: 1em; padding: 1em; background-color: #fff; border-top: 1px dashed #ccc; }
.output_text { white-space: pre-wrap; font-size: 0.9em; color: #555; }
h1, h2, h3 { border-bottom: 1px solid #eaecef; padding-bottom: .3em; }
.md-code { background-color: #f0f0f0; border-radius: 3px; padding: 0 .2em; }"#;

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// HTML renderer.
pub struct HtmlRenderer {
    options: RenderOptions,
}

impl HtmlRenderer {
    /// Create a new HTML renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render Markdown as a display fragment.
    pub fn fragment(&self, doc: &MarkdownDocument) -> String {
        let mut out = String::new();
        write_markdown(&mut out, doc);
        out
    }

    /// Render Markdown as a complete document.
    pub fn markdown_document(&self, doc: &MarkdownDocument) -> String {
        let body = self.fragment(doc);
        self.document(self.options.title_or("Document"), &body)
    }

    /// Render a notebook as a complete document.
    pub fn notebook_document(&self, notebook: &Notebook) -> String {
        let mut body = String::new();

        for cell in &notebook.cells {
            match &cell.kind {
                CellKind::Markdown => {
                    body.push_str("<div class=\"cell markdown-cell\">\n");
                    write_markdown(&mut body, &parse_markdown(&cell.source));
                    body.push_str("</div>\n");
                }
                CellKind::Code => {
                    body.push_str("<div class=\"cell code-cell\">\n");
                    body.push_str(&format!(
                        "<pre><code class=\"language-{}\">{}</code></pre>\n",
                        escape_html(&notebook.language),
                        escape_html(&cell.source)
                    ));

                    if cell.has_output_text() {
                        body.push_str("<div class=\"output\">\n");
                        for text in cell.output_texts() {
                            body.push_str(&format!(
                                "<pre class=\"output_text\">{}</pre>\n",
                                escape_html(text.trim_end_matches('\n'))
                            ));
                        }
                        body.push_str("</div>\n");
                    }

                    body.push_str("</div>\n");
                }
                CellKind::Other(name) => {
                    log::debug!("Skipping {} cell", name);
                }
            }
        }

        self.document(self.options.title_or("Notebook"), &body)
    }

    fn document(&self, title: &str, body: &str) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{}</title>\n", escape_html(title)));
        if self.options.embed_styles {
            out.push_str("<style>\n");
            out.push_str(STYLESHEET);
            out.push_str("\n</style>\n");
        }
        out.push_str("</head>\n<body>\n");
        out.push_str(body);
        out.push_str("</body>\n</html>\n");
        out
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

/// Render Markdown as a display fragment.
pub fn markdown_to_html_fragment(doc: &MarkdownDocument) -> String {
    HtmlRenderer::default().fragment(doc)
}

/// Render Markdown as a complete HTML document.
pub fn markdown_to_html_document(doc: &MarkdownDocument, title: &str) -> String {
    HtmlRenderer::new(RenderOptions::new().with_title(title)).markdown_document(doc)
}

/// Render a notebook as a complete HTML document.
pub fn notebook_to_html(notebook: &Notebook, title: &str) -> String {
    HtmlRenderer::new(RenderOptions::new().with_title(title)).notebook_document(notebook)
}

fn write_markdown(out: &mut String, doc: &MarkdownDocument) {
    for node in doc.nodes() {
        match node {
            Node::Block(Block::Heading { level, inline }) => {
                out.push_str(&format!("<h{0} class=\"md-h{0}\">", level));
                write_inline(out, inline);
                out.push_str(&format!("</h{}>\n", level));
            }
            Node::Block(block) => {
                out.push_str("<p class=\"md-paragraph\">");
                write_inline(out, block.inline());
                out.push_str("</p>\n");
            }
            Node::List(run) => {
                let (tag, class) = match run.kind {
                    ListKind::Bullet => ("ul", "md-bullet"),
                    ListKind::Ordered => ("ol", "md-ordered"),
                };
                out.push_str(&format!("<{} class=\"md-list {}\">\n", tag, class));
                for item in run.items {
                    out.push_str("<li>");
                    write_inline(out, item.inline());
                    out.push_str("</li>\n");
                }
                out.push_str(&format!("</{}>\n", tag));
            }
        }
    }
}

fn write_inline(out: &mut String, spans: &[InlineSpan]) {
    for span in spans {
        match span {
            InlineSpan::Text(text) => out.push_str(&escape_html(text)),
            InlineSpan::Bold(text) => {
                out.push_str(&format!("<strong>{}</strong>", escape_html(text)))
            }
            InlineSpan::Italic(text) => out.push_str(&format!("<em>{}</em>", escape_html(text))),
            InlineSpan::Code(text) => out.push_str(&format!(
                "<code class=\"md-code\">{}</code>",
                escape_html(text)
            )),
            InlineSpan::Link { text, href } => out.push_str(&format!(
                "<a class=\"md-link\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
                escape_html(href),
                escape_html(text)
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellOutput, NotebookCell};

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn test_fragment() {
        let doc = parse_markdown("# Title\n- **a**\n- b\n\n1. one\ntext with [link](http://x.y)");
        let html = markdown_to_html_fragment(&doc);
        assert_eq!(
            html,
            "<h1 class=\"md-h1\">Title</h1>\n\
             <ul class=\"md-list md-bullet\">\n<li><strong>a</strong></li>\n<li>b</li>\n</ul>\n\
             <ol class=\"md-list md-ordered\">\n<li>one</li>\n</ol>\n\
             <p class=\"md-paragraph\">text with <a class=\"md-link\" href=\"http://x.y\" target=\"_blank\" rel=\"noopener noreferrer\">link</a></p>\n"
        );
    }

    #[test]
    fn test_fragment_escapes() {
        let doc = parse_markdown("a <script> `<b>`");
        let html = markdown_to_html_fragment(&doc);
        assert!(html.contains("a &lt;script&gt; <code class=\"md-code\">&lt;b&gt;</code>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_fragment_is_deterministic() {
        let doc = parse_markdown("## A\n* x\n* y");
        assert_eq!(
            markdown_to_html_fragment(&doc),
            markdown_to_html_fragment(&doc)
        );
    }

    #[test]
    fn test_notebook_document() {
        let mut nb = Notebook::new("python");
        nb.add_cell(NotebookCell::markdown("# Title"));
        nb.add_cell(NotebookCell::code("print(1)").with_output(CellOutput::stream("1\n")));

        let html = notebook_to_html(&nb, "demo.ipynb");
        assert_eq!(html.matches("<h1").count(), 1);
        assert_eq!(html.matches("<pre><code").count(), 1);
        assert_eq!(html.matches("<div class=\"output\">").count(), 1);
        assert!(html.contains("<pre class=\"output_text\">1</pre>"));
        assert!(html.contains("<title>demo.ipynb</title>"));
        assert!(html.contains("language-python"));
    }

    #[test]
    fn test_no_output_container_without_text() {
        let mut nb = Notebook::new("python");
        nb.add_cell(NotebookCell::code("x").with_output(CellOutput::empty("display_data")));
        let html = notebook_to_html(&nb, "n");
        assert!(!html.contains("class=\"output\""));
    }

    #[test]
    fn test_without_styles() {
        let renderer = HtmlRenderer::new(RenderOptions::new().with_styles(false));
        let html = renderer.markdown_document(&parse_markdown("x"));
        assert!(!html.contains("<style>"));
        assert!(html.contains("<title>Document</title>"));
    }
}
