//! The conversion result.

use serde::Serialize;

use crate::piece::{Piece, PieceKind};

/// A converted article: title, metadata lines, tags and content pieces.
///
/// `Article::default()` is the empty article returned when a page could not
/// be fetched; use [`Article::is_empty`] to recognize it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    /// Level-1 heading piece.
    pub title: Piece,

    /// Author, free-text metadata and the publish time (`YYYY-MM-DD HH:MM`,
    /// last when present).
    pub meta: Vec<String>,

    /// Normalized tag text, possibly empty.
    pub tags: String,

    /// Content pieces in document order.
    pub content: Vec<Piece>,
}

impl Default for Article {
    fn default() -> Self {
        Self {
            title: Piece::heading(1, ""),
            meta: Vec::new(),
            tags: String::new(),
            content: Vec::new(),
        }
    }
}

impl Article {
    /// Title text, empty when the page had none.
    #[must_use]
    pub fn title_text(&self) -> &str {
        self.title.as_text().unwrap_or_default()
    }

    /// Whether nothing at all was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title_text().is_empty()
            && self.meta.is_empty()
            && self.tags.is_empty()
            && self.content.is_empty()
    }

    /// Iterate over every piece, descending into list items and quote lines.
    pub fn walk_pieces(&self) -> impl Iterator<Item = &Piece> {
        let mut stack: Vec<&Piece> = self.content.iter().rev().collect();
        std::iter::from_fn(move || {
            let piece = stack.pop()?;
            stack.extend(piece.children().iter().rev());
            Some(piece)
        })
    }

    /// Plain-text pieces anywhere in the content.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.walk_pieces()
            .filter(|p| p.kind() == PieceKind::Text)
            .filter_map(Piece::as_text)
    }
}
