//! Notebook JSON ingestion.
//!
//! Accepts the nbformat 4 layout: a top-level object with a `cells` array,
//! each cell carrying `cell_type` and `source`. Anything else about the
//! notebook is ignored apart from the kernel language.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{CellKind, CellOutput, Notebook, NotebookCell};

const DEFAULT_LANGUAGE: &str = "python";

/// A string or a list of strings. Notebook line arrays keep their own
/// terminators, so the list form is concatenated as-is.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MultilineText {
    One(String),
    Many(Vec<String>),
}

impl MultilineText {
    fn into_string(self) -> String {
        match self {
            MultilineText::One(s) => s,
            MultilineText::Many(parts) => parts.concat(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawNotebook {
    cells: Vec<RawCell>,
    #[serde(default)]
    metadata: Option<RawMetadata>,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    language_info: Option<RawLanguageInfo>,
}

#[derive(Debug, Deserialize)]
struct RawLanguageInfo {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCell {
    cell_type: String,
    source: MultilineText,
    #[serde(default)]
    outputs: Vec<RawOutput>,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    #[serde(default)]
    output_type: String,
    #[serde(default)]
    text: Option<MultilineText>,
    #[serde(default)]
    data: Option<serde_json::Map<String, Value>>,
}

impl RawOutput {
    /// `text`, else `data["text/plain"]`.
    fn into_output(self) -> CellOutput {
        let text = match self.text {
            Some(text) => Some(text.into_string()),
            None => self
                .data
                .and_then(|mut data| data.remove("text/plain"))
                .and_then(|value| serde_json::from_value::<MultilineText>(value).ok())
                .map(MultilineText::into_string),
        };

        CellOutput {
            output_type: self.output_type,
            text,
        }
    }
}

/// Parse notebook JSON text.
pub fn parse_notebook(json: &str) -> Result<Notebook> {
    let raw: RawNotebook =
        serde_json::from_str(json).map_err(|e| Error::MalformedNotebook(e.to_string()))?;

    let language = raw
        .metadata
        .and_then(|m| m.language_info)
        .and_then(|info| info.name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    let mut notebook = Notebook::new(language);

    for cell in raw.cells {
        let kind = CellKind::from_name(&cell.cell_type);
        let outputs = match kind {
            CellKind::Code => cell.outputs.into_iter().map(RawOutput::into_output).collect(),
            _ => Vec::new(),
        };

        notebook.add_cell(NotebookCell {
            kind,
            source: cell.source.into_string(),
            outputs,
        });
    }

    log::debug!(
        "Parsed notebook: {} cells ({} code)",
        notebook.cell_count(),
        notebook.code_cell_count()
    );

    Ok(notebook)
}

/// Parse notebook JSON from raw bytes. A UTF-8 byte order mark is skipped.
pub fn parse_notebook_bytes(bytes: &[u8]) -> Result<Notebook> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::MalformedNotebook(format!("not valid UTF-8: {}", e)))?;
    parse_notebook(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_forms() {
        let nb = parse_notebook(
            r##"{"cells": [
                {"cell_type": "markdown", "source": "# Title"},
                {"cell_type": "code", "source": ["a = 1\n", "print(a)"], "outputs": []}
            ]}"##,
        )
        .unwrap();

        assert_eq!(nb.cells.len(), 2);
        assert_eq!(nb.cells[0].source, "# Title");
        assert_eq!(nb.cells[1].source, "a = 1\nprint(a)");
        assert_eq!(nb.language, "python");
    }

    #[test]
    fn test_output_text_fallbacks() {
        let nb = parse_notebook(
            r#"{"cells": [{"cell_type": "code", "source": "x", "outputs": [
                {"output_type": "stream", "name": "stdout", "text": ["1\n", "2\n"]},
                {"output_type": "execute_result", "data": {"text/plain": ["42"]}},
                {"output_type": "display_data", "data": {"image/png": "AAAA"}}
            ]}]}"#,
        )
        .unwrap();

        let texts: Vec<_> = nb.cells[0].output_texts().collect();
        assert_eq!(texts, vec!["1\n2\n", "42"]);
        assert_eq!(nb.cells[0].outputs.len(), 3);
    }

    #[test]
    fn test_unknown_cell_kind_kept() {
        let nb = parse_notebook(r#"{"cells": [{"cell_type": "raw", "source": "x"}]}"#).unwrap();
        assert_eq!(nb.cells[0].kind, CellKind::Other("raw".to_string()));
    }

    #[test]
    fn test_language_from_metadata() {
        let nb = parse_notebook(
            r#"{"cells": [], "metadata": {"language_info": {"name": "julia"}}}"#,
        )
        .unwrap();
        assert_eq!(nb.language, "julia");
    }

    #[test]
    fn test_malformed() {
        for input in [
            "not json",
            "[]",
            r#"{"nbformat": 4}"#,
            r#"{"cells": [{"source": "x"}]}"#,
            r#"{"cells": [{"cell_type": "code", "source": 3}]}"#,
        ] {
            assert!(
                matches!(parse_notebook(input), Err(Error::MalformedNotebook(_))),
                "accepted {:?}",
                input
            );
        }
    }

    #[test]
    fn test_bytes_with_bom() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(br#"{"cells": []}"#);
        let nb = parse_notebook_bytes(&bytes).unwrap();
        assert_eq!(nb.cell_count(), 0);
    }
}
