use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::model::ids::MarkId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogueError {
    #[error("mark input must look like \"<symbol> - <description>\"")]
    InvalidMarkInput,

    #[error("mark symbol cannot be empty")]
    EmptySymbol,

    #[error("mark \"{0}\" already exists")]
    DuplicateSymbol(String),

    #[error("mark \"{0}\" does not exist")]
    UnknownSymbol(String),

    #[error("the unset mark cannot be removed")]
    UnsetMarkIsFixed,
}

//
// ─── DEFAULTS ──────────────────────────────────────────────────────────────────
//

/// Style applied to the unset mark and to marks stored without a style.
pub const NEUTRAL_STYLE: &str = "color: #000; background-color: #fff";

const BUILTIN_SYMBOLS: [&str; 5] = ["S", "?", "!", "\u{2713}", "\u{2605}"];
const BUILTIN_DESCRIPTIONS: [&str; 5] = ["Choose", "Unclear", "Important", "Learned", "Read"];
const BUILTIN_STYLES: [&str; 5] = [
    NEUTRAL_STYLE,
    "color: #fff; background-color: #2196F3",
    "color: #fff; background-color: #f44336",
    "color: #fff; background-color: #4caf50",
    "color: #ffffff; background-color: #ffc107",
];

static MARK_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s?-\s?(\S.{3,})").expect("mark input pattern should compile")
});

/// Builds a palette entry from a text and a background colour.
#[must_use]
pub fn palette_style(color: &str, background: &str) -> String {
    format!("color: {}; background-color: {}", color.trim(), background.trim())
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// A mark waiting to be added to the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkDraft {
    pub symbol: String,
    pub description: String,
    pub style: String,
}

impl MarkDraft {
    /// Parse the popup's free-text form, e.g. `"★ - Favourite"`.
    ///
    /// The description needs at least four characters and is stored
    /// lower-cased.
    ///
    /// # Errors
    ///
    /// Returns `CatalogueError::InvalidMarkInput` when the text does not split
    /// into a symbol and a description.
    pub fn parse(input: &str, style: impl Into<String>) -> Result<Self, CatalogueError> {
        let caps = MARK_INPUT
            .captures(input.trim())
            .ok_or(CatalogueError::InvalidMarkInput)?;
        let symbol = caps.get(1).map_or("", |m| m.as_str()).trim();
        let description = caps.get(2).map_or("", |m| m.as_str()).trim();
        if symbol.is_empty() {
            return Err(CatalogueError::EmptySymbol);
        }
        Ok(Self {
            symbol: symbol.to_owned(),
            description: description.to_lowercase(),
            style: style.into(),
        })
    }
}

//
// ─── CATALOGUE ─────────────────────────────────────────────────────────────────
//

/// One catalogue entry, borrowed from the three parallel sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkEntry<'a> {
    pub id: MarkId,
    pub symbol: &'a str,
    pub description: &'a str,
    pub style: &'a str,
}

/// Ordered mark symbols with their descriptions and palette styles.
///
/// The three sequences always have the same length; index `i` of one belongs
/// to index `i` of the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkCatalogue {
    symbols: Vec<String>,
    descriptions: Vec<String>,
    styles: Vec<String>,
}

impl MarkCatalogue {
    /// The catalogue a fresh install starts with.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            symbols: BUILTIN_SYMBOLS.iter().map(|s| (*s).to_owned()).collect(),
            descriptions: BUILTIN_DESCRIPTIONS.iter().map(|s| (*s).to_owned()).collect(),
            styles: BUILTIN_STYLES.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    /// Rebuild a catalogue from persisted parallel arrays.
    ///
    /// Symbols are authoritative: missing descriptions become empty, missing
    /// styles fall back to [`NEUTRAL_STYLE`], surplus entries are dropped.
    #[must_use]
    pub fn from_parts(
        symbols: Vec<String>,
        mut descriptions: Vec<String>,
        mut styles: Vec<String>,
    ) -> Self {
        let len = symbols.len();
        descriptions.resize(len, String::new());
        styles.resize(len, NEUTRAL_STYLE.to_owned());
        Self {
            symbols,
            descriptions,
            styles,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: MarkId) -> bool {
        id.value() < self.len()
    }

    #[must_use]
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    #[must_use]
    pub fn descriptions(&self) -> &[String] {
        &self.descriptions
    }

    #[must_use]
    pub fn styles(&self) -> &[String] {
        &self.styles
    }

    #[must_use]
    pub fn entry(&self, id: MarkId) -> Option<MarkEntry<'_>> {
        let i = id.value();
        Some(MarkEntry {
            id,
            symbol: self.symbols.get(i)?,
            description: self.descriptions.get(i)?,
            style: self.styles.get(i)?,
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = MarkEntry<'_>> {
        (0..self.len()).filter_map(|i| self.entry(MarkId::new(i)))
    }

    #[must_use]
    pub fn description(&self, id: MarkId) -> Option<&str> {
        self.descriptions.get(id.value()).map(String::as_str)
    }

    /// Style for `id`, or the neutral style when the id is out of range.
    #[must_use]
    pub fn style_or_neutral(&self, id: MarkId) -> &str {
        self.styles
            .get(id.value())
            .map_or(NEUTRAL_STYLE, String::as_str)
    }

    #[must_use]
    pub fn position(&self, symbol: &str) -> Option<MarkId> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(MarkId::new)
    }

    /// Append a mark to the end of the catalogue.
    ///
    /// # Errors
    ///
    /// Returns `CatalogueError` if the symbol is empty or already present.
    pub fn add_mark(&mut self, draft: MarkDraft) -> Result<MarkId, CatalogueError> {
        let symbol = draft.symbol.trim();
        if symbol.is_empty() {
            return Err(CatalogueError::EmptySymbol);
        }
        if self.position(symbol).is_some() {
            return Err(CatalogueError::DuplicateSymbol(symbol.to_owned()));
        }
        self.symbols.push(symbol.to_owned());
        self.descriptions.push(draft.description);
        self.styles.push(draft.style);
        Ok(MarkId::new(self.len() - 1))
    }

    /// Remove a mark by symbol, returning the index it occupied.
    ///
    /// Later marks shift down by one, so callers must re-validate stored ids.
    ///
    /// # Errors
    ///
    /// Returns `CatalogueError` if the symbol is unknown or names the unset mark.
    pub fn remove_mark(&mut self, symbol: &str) -> Result<MarkId, CatalogueError> {
        let id = self
            .position(symbol)
            .ok_or_else(|| CatalogueError::UnknownSymbol(symbol.to_owned()))?;
        if id.is_unset() {
            return Err(CatalogueError::UnsetMarkIsFixed);
        }
        let i = id.value();
        self.symbols.remove(i);
        self.descriptions.remove(i);
        self.styles.remove(i);
        Ok(id)
    }
}

impl Default for MarkCatalogue {
    fn default() -> Self {
        Self::builtin()
    }
}
