//! Notebook (cell-based) document model.

use serde::{Deserialize, Serialize};

/// A parsed notebook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
    /// Cells in document order
    pub cells: Vec<NotebookCell>,

    /// Kernel language, used as a styling hook for code blocks
    pub language: String,
}

impl Notebook {
    /// Create an empty notebook for the given kernel language.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            cells: Vec::new(),
            language: language.into(),
        }
    }

    /// Add a cell.
    pub fn add_cell(&mut self, cell: NotebookCell) {
        self.cells.push(cell);
    }

    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of code cells.
    pub fn code_cell_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.kind == CellKind::Code)
            .count()
    }
}

/// Kind of a notebook cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    /// Markdown prose
    Markdown,
    /// Executable code
    Code,
    /// Any other cell type (e.g. `raw`), rendered as nothing
    Other(String),
}

impl CellKind {
    /// Map a serialized `cell_type` to a kind.
    pub fn from_name(name: &str) -> Self {
        match name {
            "markdown" => CellKind::Markdown,
            "code" => CellKind::Code,
            other => CellKind::Other(other.to_string()),
        }
    }
}

/// One unit of a notebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookCell {
    /// Cell kind
    pub kind: CellKind,

    /// Source text, already joined into one string
    pub source: String,

    /// Outputs in execution order (code cells only)
    pub outputs: Vec<CellOutput>,
}

impl NotebookCell {
    /// Create a markdown cell.
    pub fn markdown(source: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Markdown,
            source: source.into(),
            outputs: Vec::new(),
        }
    }

    /// Create a code cell without outputs.
    pub fn code(source: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Code,
            source: source.into(),
            outputs: Vec::new(),
        }
    }

    /// Attach an output.
    pub fn with_output(mut self, output: CellOutput) -> Self {
        self.outputs.push(output);
        self
    }

    /// Plain texts of all outputs that have one.
    pub fn output_texts(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().filter_map(CellOutput::plain_text)
    }

    /// Check if at least one output carries text.
    pub fn has_output_text(&self) -> bool {
        self.output_texts().next().is_some()
    }
}

/// A code cell output reduced to its plain-text representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellOutput {
    /// `stream`, `execute_result`, `display_data`, `error`, ...
    pub output_type: String,

    /// Plain text, if the output had one
    pub text: Option<String>,
}

impl CellOutput {
    /// Create a stream output.
    pub fn stream(text: impl Into<String>) -> Self {
        Self {
            output_type: "stream".to_string(),
            text: Some(text.into()),
        }
    }

    /// Create an output of the given type without text.
    pub fn empty(output_type: impl Into<String>) -> Self {
        Self {
            output_type: output_type.into(),
            text: None,
        }
    }

    /// The plain text, or None if the output has nothing to show.
    pub fn plain_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }
}
