//! Conversion targets and the routing table.

use std::fmt;
use std::str::FromStr;

use crate::detect::{SourceKind, DOCX_MIME};
use crate::error::Error;

/// Kind of artifact a conversion produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetKind {
    /// Plain text
    PlainText,
    /// PDF document
    Pdf,
    /// Word document
    Docx,
    /// Self-contained HTML document
    Html,
}

impl TargetKind {
    /// All target kinds.
    pub const ALL: [TargetKind; 4] = [
        TargetKind::PlainText,
        TargetKind::Pdf,
        TargetKind::Docx,
        TargetKind::Html,
    ];

    /// Canonical MIME type.
    pub fn mime(self) -> &'static str {
        match self {
            TargetKind::PlainText => "text/plain",
            TargetKind::Pdf => "application/pdf",
            TargetKind::Docx => DOCX_MIME,
            TargetKind::Html => "text/html",
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            TargetKind::PlainText => "txt",
            TargetKind::Pdf => "pdf",
            TargetKind::Docx => "docx",
            TargetKind::Html => "html",
        }
    }

    /// Match a MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        TargetKind::ALL.into_iter().find(|t| t.mime() == mime)
    }

    /// Match an extension (`txt`, `pdf`, `docx`, `html`; `htm` and `text`
    /// are accepted too).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "txt" | "text" => Some(TargetKind::PlainText),
            "pdf" => Some(TargetKind::Pdf),
            "docx" => Some(TargetKind::Docx),
            "html" | "htm" => Some(TargetKind::Html),
            _ => None,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetKind::PlainText => "plain text",
            TargetKind::Pdf => "PDF",
            TargetKind::Docx => "DOCX",
            TargetKind::Html => "HTML",
        };
        f.write_str(name)
    }
}

impl FromStr for TargetKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TargetKind::from_extension(s)
            .or_else(|| TargetKind::from_mime(s))
            .ok_or_else(|| Error::UnknownFormat(s.to_string()))
    }
}

/// One (source, target) pair offered to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRoute {
    /// Source kind
    pub source: SourceKind,
    /// Target kind
    pub target: TargetKind,
    /// Display label, e.g. "to TXT"
    pub label: String,
    /// Why the route is refused; `None` when enabled
    pub disabled_reason: Option<String>,
}

impl ConversionRoute {
    /// Create an enabled route.
    pub fn new(source: SourceKind, target: TargetKind, label: impl Into<String>) -> Self {
        Self {
            source,
            target,
            label: label.into(),
            disabled_reason: None,
        }
    }

    /// Mark the route as refused.
    pub fn disabled(mut self, reason: impl Into<String>) -> Self {
        self.disabled_reason = Some(reason.into());
        self
    }

    /// Check if the route may be used.
    pub fn is_enabled(&self) -> bool {
        self.disabled_reason.is_none()
    }
}

/// The conversions offered for each source kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingTable {
    routes: Vec<ConversionRoute>,
}

impl RoutingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Add a route, replacing any existing route for the same pair.
    pub fn with_route(mut self, route: ConversionRoute) -> Self {
        self.insert(route);
        self
    }

    /// Add a route, replacing any existing route for the same pair.
    pub fn insert(&mut self, route: ConversionRoute) {
        match self
            .routes
            .iter_mut()
            .find(|r| r.source == route.source && r.target == route.target)
        {
            Some(existing) => *existing = route,
            None => self.routes.push(route),
        }
    }

    /// Find the route for a pair.
    pub fn find(&self, source: SourceKind, target: TargetKind) -> Option<&ConversionRoute> {
        self.routes
            .iter()
            .find(|r| r.source == source && r.target == target)
    }

    /// Routes offered for a source kind, in table order.
    pub fn routes_for(&self, source: SourceKind) -> impl Iterator<Item = &ConversionRoute> {
        self.routes.iter().filter(move |r| r.source == source)
    }

    /// All routes, in table order.
    pub fn routes(&self) -> &[ConversionRoute] {
        &self.routes
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        use SourceKind as S;
        use TargetKind as T;

        Self::new()
            .with_route(ConversionRoute::new(S::Pdf, T::PlainText, "to TXT"))
            .with_route(
                ConversionRoute::new(S::Pdf, T::Docx, "to DOCX")
                    .disabled("Client-side PDF to DOCX is not supported."),
            )
            .with_route(ConversionRoute::new(S::Docx, T::PlainText, "to TXT"))
            .with_route(ConversionRoute::new(S::Docx, T::Pdf, "to PDF"))
            .with_route(ConversionRoute::new(S::Notebook, T::Html, "to HTML"))
            .with_route(ConversionRoute::new(S::Notebook, T::Docx, "to DOCX"))
            .with_route(ConversionRoute::new(S::Notebook, T::Pdf, "to PDF"))
            .with_route(ConversionRoute::new(S::Markdown, T::Html, "to HTML"))
            .with_route(ConversionRoute::new(S::Markdown, T::Docx, "to DOCX"))
            .with_route(ConversionRoute::new(S::Markdown, T::Pdf, "to PDF"))
            .with_route(ConversionRoute::new(S::PlainText, T::Pdf, "to PDF"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = RoutingTable::default();
        assert_eq!(table.routes().len(), 11);

        let pdf_docx = table.find(SourceKind::Pdf, TargetKind::Docx).unwrap();
        assert!(!pdf_docx.is_enabled());
        assert_eq!(
            pdf_docx.disabled_reason.as_deref(),
            Some("Client-side PDF to DOCX is not supported.")
        );

        assert!(table.find(SourceKind::PlainText, TargetKind::PlainText).is_none());

        let labels: Vec<_> = table
            .routes_for(SourceKind::Notebook)
            .map(|r| r.label.as_str())
            .collect();
        assert_eq!(labels, vec!["to HTML", "to DOCX", "to PDF"]);
    }

    #[test]
    fn test_insert_replaces_pair() {
        let mut table = RoutingTable::default();
        table.insert(ConversionRoute::new(SourceKind::Pdf, TargetKind::Docx, "to DOCX"));
        assert_eq!(table.routes().len(), 11);
        assert!(table
            .find(SourceKind::Pdf, TargetKind::Docx)
            .unwrap()
            .is_enabled());
    }

    #[test]
    fn test_target_parsing() {
        assert_eq!("TXT".parse::<TargetKind>().unwrap(), TargetKind::PlainText);
        assert_eq!(".htm".parse::<TargetKind>().unwrap(), TargetKind::Html);
        assert_eq!(
            "application/pdf".parse::<TargetKind>().unwrap(),
            TargetKind::Pdf
        );
        assert!("xlsx".parse::<TargetKind>().is_err());
        assert_eq!(TargetKind::from_mime(DOCX_MIME), Some(TargetKind::Docx));
    }
}
