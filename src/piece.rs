//! The typed document model produced by the walker.
//!
//! A [`Piece`] is one fragment of the article: a heading, a run of text, an
//! image, a list item holding nested pieces, and so on. The payload shape is
//! fixed by the kind, which is why pieces are only built through the
//! constructors below.

use std::collections::BTreeMap;

use serde::Serialize;

/// Attribute holding a heading level.
pub const ATTR_LEVEL: &str = "level";
/// Attribute holding a link target.
pub const ATTR_HREF: &str = "href";
/// Attribute holding an image URL.
pub const ATTR_SRC: &str = "src";
/// Attribute holding an image alt text.
pub const ATTR_ALT: &str = "alt";
/// Attribute holding an image title.
pub const ATTR_TITLE: &str = "title";
/// Attribute holding the table rendering mode.
pub const ATTR_TABLE_TYPE: &str = "type";

/// Semantic role of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    Heading,
    Link,
    /// Image kept by reference.
    Image,
    /// Image with its raw bytes attached.
    ImageBytes,
    /// Image with its bytes attached as base64 text.
    ImageBase64,
    OrderedListItem,
    UnorderedListItem,
    CodeBlock,
    BlockQuote,
    Bold,
    Italic,
    Table,
    HorizontalRule,
    LineBreak,
    Text,
}

impl PieceKind {
    /// List item kinds.
    #[must_use]
    pub fn is_list_item(self) -> bool {
        matches!(self, Self::OrderedListItem | Self::UnorderedListItem)
    }

    /// Image kinds, whatever the policy.
    #[must_use]
    pub fn is_image(self) -> bool {
        matches!(self, Self::Image | Self::ImageBytes | Self::ImageBase64)
    }
}

/// Payload of a piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PieceValue {
    /// No payload: rules, breaks, by-reference images, failed downloads.
    None,
    Text(String),
    /// Code block lines.
    Lines(Vec<String>),
    /// List item and quote line contents.
    Pieces(Vec<Piece>),
    Bytes(Vec<u8>),
}

/// How a table piece is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    /// Pipe table text.
    Markdown,
    /// Raw HTML passthrough.
    Native,
}

impl TableMode {
    /// Attribute value for this mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Native => "native",
        }
    }
}

/// One fragment of the article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Piece {
    kind: PieceKind,
    value: PieceValue,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, String>,
}

impl Piece {
    fn new(kind: PieceKind, value: PieceValue) -> Self {
        Self {
            kind,
            value,
            attributes: BTreeMap::new(),
        }
    }

    fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// Heading of the given level (clamped to 1..=6).
    #[must_use]
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        let level = level.clamp(1, 6);
        Self::new(PieceKind::Heading, PieceValue::Text(text.into()))
            .with_attr(ATTR_LEVEL, level.to_string())
    }

    #[must_use]
    pub fn link(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(PieceKind::Link, PieceValue::Text(text.into())).with_attr(ATTR_HREF, href)
    }

    /// Image kept by reference; `attributes` carries src/alt/title.
    #[must_use]
    pub fn image(attributes: BTreeMap<String, String>) -> Self {
        Self {
            kind: PieceKind::Image,
            value: PieceValue::None,
            attributes,
        }
    }

    /// Image with downloaded bytes, `None` when the download failed.
    #[must_use]
    pub fn image_bytes(attributes: BTreeMap<String, String>, bytes: Option<Vec<u8>>) -> Self {
        Self {
            kind: PieceKind::ImageBytes,
            value: bytes.map_or(PieceValue::None, PieceValue::Bytes),
            attributes,
        }
    }

    /// Image with base64 text, `None` when the download failed.
    #[must_use]
    pub fn image_base64(attributes: BTreeMap<String, String>, encoded: Option<String>) -> Self {
        Self {
            kind: PieceKind::ImageBase64,
            value: encoded.map_or(PieceValue::None, PieceValue::Text),
            attributes,
        }
    }

    /// List item of an ordered or unordered list.
    #[must_use]
    pub fn list_item(ordered: bool, children: Vec<Piece>) -> Self {
        let kind = if ordered {
            PieceKind::OrderedListItem
        } else {
            PieceKind::UnorderedListItem
        };
        Self::new(kind, PieceValue::Pieces(children))
    }

    #[must_use]
    pub fn code_block(lines: Vec<String>) -> Self {
        Self::new(PieceKind::CodeBlock, PieceValue::Lines(lines))
    }

    /// One line of a block quote.
    #[must_use]
    pub fn block_quote(children: Vec<Piece>) -> Self {
        Self::new(PieceKind::BlockQuote, PieceValue::Pieces(children))
    }

    #[must_use]
    pub fn bold(text: impl Into<String>) -> Self {
        Self::new(PieceKind::Bold, PieceValue::Text(text.into()))
    }

    #[must_use]
    pub fn italic(text: impl Into<String>) -> Self {
        Self::new(PieceKind::Italic, PieceValue::Text(text.into()))
    }

    #[must_use]
    pub fn table(mode: TableMode, content: impl Into<String>) -> Self {
        Self::new(PieceKind::Table, PieceValue::Text(content.into()))
            .with_attr(ATTR_TABLE_TYPE, mode.as_str())
    }

    #[must_use]
    pub fn horizontal_rule() -> Self {
        Self::new(PieceKind::HorizontalRule, PieceValue::None)
    }

    #[must_use]
    pub fn line_break() -> Self {
        Self::new(PieceKind::LineBreak, PieceValue::None)
    }

    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(PieceKind::Text, PieceValue::Text(text.into()))
    }

    // === Accessors ===

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn value(&self) -> &PieceValue {
        &self.value
    }

    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Text payload, for text-like kinds and base64 images.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            PieceValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Nested pieces of a list item or quote line; empty for other kinds.
    #[must_use]
    pub fn children(&self) -> &[Piece] {
        match &self.value {
            PieceValue::Pieces(children) => children,
            _ => &[],
        }
    }

    /// Code block lines; empty for other kinds.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        match &self.value {
            PieceValue::Lines(lines) => lines,
            _ => &[],
        }
    }

    /// Raw image bytes, when attached.
    #[must_use]
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.value {
            PieceValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Heading level, for heading pieces.
    #[must_use]
    pub fn level(&self) -> Option<u8> {
        self.attr(ATTR_LEVEL).and_then(|l| l.parse().ok())
    }

    /// Rendering mode, for table pieces.
    #[must_use]
    pub fn table_mode(&self) -> Option<TableMode> {
        match self.attr(ATTR_TABLE_TYPE)? {
            "markdown" => Some(TableMode::Markdown),
            "native" => Some(TableMode::Native),
            _ => None,
        }
    }

    /// Whether the piece carries no payload.
    #[must_use]
    pub fn is_payload_empty(&self) -> bool {
        match &self.value {
            PieceValue::None => true,
            PieceValue::Text(text) => text.is_empty(),
            PieceValue::Lines(lines) => lines.is_empty(),
            PieceValue::Pieces(children) => children.is_empty(),
            PieceValue::Bytes(bytes) => bytes.is_empty(),
        }
    }
}
