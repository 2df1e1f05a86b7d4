//! Glyph sanitization for the standard PDF fonts.
//!
//! The layout engine draws with the 14 standard Type1 fonts, which only
//! cover a Latin character set. Text is folded onto printable ASCII before
//! it is measured or drawn.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Options for glyph sanitization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizeOptions {
    /// Decompose accented letters and keep the base letter (é → e)
    pub fold_accents: bool,

    /// Fix ligatures (ﬁ → fi)
    pub fix_ligatures: bool,

    /// Keep tabs instead of dropping them
    pub keep_tabs: bool,
}

impl SanitizeOptions {
    /// Create options with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the punctuation replacements and the ASCII filter.
    pub fn strict() -> Self {
        Self {
            fold_accents: false,
            fix_ligatures: false,
            keep_tabs: true,
        }
    }

    /// Enable or disable accent folding.
    pub fn with_fold_accents(mut self, fold: bool) -> Self {
        self.fold_accents = fold;
        self
    }
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            fold_accents: true,
            fix_ligatures: true,
            keep_tabs: true,
        }
    }
}

/// Typographic punctuation and its ASCII stand-in.
const REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2013}', "-"),
    ('\u{2014}', "--"),
    ('\u{2026}', "..."),
    ('\u{00A0}', " "),
];

const LIGATURES: &[(char, &str)] = &[
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// Folds text onto the glyph set of the standard fonts.
pub struct GlyphSanitizer {
    options: SanitizeOptions,
}

static LINE_ENDING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n?").expect("valid regex"));

impl GlyphSanitizer {
    /// Create a sanitizer.
    pub fn new(options: SanitizeOptions) -> Self {
        Self { options }
    }

    /// Sanitize text.
    pub fn sanitize(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());

        for c in text.chars() {
            if let Some((_, replacement)) = REPLACEMENTS.iter().find(|(from, _)| *from == c) {
                result.push_str(replacement);
            } else if let Some((_, replacement)) = self
                .options
                .fix_ligatures
                .then(|| LIGATURES.iter().find(|(from, _)| *from == c))
                .flatten()
            {
                result.push_str(replacement);
            } else {
                result.push(c);
            }
        }

        if self.options.fold_accents {
            result = result.nfkd().filter(|c| !is_combining_mark(*c)).collect();
        }

        let result: String = result
            .chars()
            .filter(|&c| self.is_allowed(c))
            .collect();

        LINE_ENDING.replace_all(&result, "\n").into_owned()
    }

    fn is_allowed(&self, c: char) -> bool {
        match c {
            '\t' => self.options.keep_tabs,
            '\n' | '\r' => true,
            ' '..='~' => true,
            _ => false,
        }
    }
}

impl Default for GlyphSanitizer {
    fn default() -> Self {
        Self::new(SanitizeOptions::default())
    }
}

/// Sanitize with the default options.
pub fn sanitize_glyphs(text: &str) -> String {
    GlyphSanitizer::default().sanitize(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation() {
        assert_eq!(
            sanitize_glyphs("\u{201C}Hi\u{201D} \u{2014} it\u{2019}s 1\u{2013}2\u{2026}"),
            "\"Hi\" -- it's 1-2..."
        );
    }

    #[test]
    fn test_nbsp_and_line_endings() {
        assert_eq!(sanitize_glyphs("a\u{00A0}b\r\nc\rd"), "a b\nc\nd");
    }

    #[test]
    fn test_accents_folded() {
        assert_eq!(sanitize_glyphs("caf\u{e9} na\u{ef}ve"), "cafe naive");
        assert_eq!(sanitize_glyphs("\u{FB01}ne"), "fine");
    }

    #[test]
    fn test_strict_drops_accents() {
        let sanitizer = GlyphSanitizer::new(SanitizeOptions::strict());
        assert_eq!(sanitizer.sanitize("caf\u{e9}"), "caf");
    }

    #[test]
    fn test_unsupported_removed() {
        assert_eq!(sanitize_glyphs("\u{4F60}\u{597D} ok \u{1F600}"), " ok ");
        assert_eq!(sanitize_glyphs("a\tb"), "a\tb");
    }
}
