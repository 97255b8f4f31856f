//! Markdown rendering of articles.
//!
//! [`format_article`] renders an [`Article`] as Markdown text. Images held as
//! raw bytes are written out as separate files: they are referenced by file
//! name in the text and returned alongside it.

use std::collections::BTreeMap;

use crate::article::Article;
use crate::patterns::EXCESS_NEWLINES;
use crate::piece::{Piece, PieceKind, ATTR_ALT, ATTR_HREF, ATTR_SRC, ATTR_TITLE};
use crate::walker::images::declared_format;

/// Characters that have special meaning in Markdown and need escaping.
const MARKDOWN_SPECIAL_CHARS: &[char] = &['\\', '*', '_', '[', ']', '<', '>', '`'];

/// Backslash-escape characters Markdown would otherwise interpret.
///
/// ```
/// use wechatmp2markdown::markdown::escape_markdown;
///
/// assert_eq!(escape_markdown("*not italic*"), r"\*not italic\*");
/// assert_eq!(escape_markdown("wx_fmt"), r"wx\_fmt");
/// ```
#[must_use]
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + text.len() / 4);
    for ch in text.chars() {
        if MARKDOWN_SPECIAL_CHARS.contains(&ch) {
            result.push('\\');
        }
        result.push(ch);
    }
    result
}

/// Rendered article.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownOutput {
    /// Markdown text, ending with a single newline unless empty.
    pub markdown: String,

    /// Image files referenced from `markdown`, by file name.
    ///
    /// Only images held as raw bytes end up here.
    pub images: BTreeMap<String, Vec<u8>>,
}

/// Render an article as Markdown.
///
/// The title becomes a level-1 heading, the byline one line with its
/// entries separated by spaces, then the tags line and the content.
#[must_use]
pub fn format_article(article: &Article) -> MarkdownOutput {
    let mut renderer = Renderer::default();
    let mut out = String::new();

    let title = article.title_text();
    if !title.is_empty() {
        out.push_str(&format!("# {}\n\n", escape_markdown(title)));
    }
    if !article.meta.is_empty() {
        let meta: Vec<String> = article.meta.iter().map(|m| escape_markdown(m)).collect();
        out.push_str(&meta.join(" "));
        out.push_str("\n\n");
    }
    if !article.tags.is_empty() {
        out.push_str(&escape_markdown(&article.tags));
        out.push_str("\n\n");
    }
    out.push_str(&renderer.render(&article.content));

    MarkdownOutput {
        markdown: tidy(&out),
        images: renderer.images,
    }
}

/// Collapse runs of blank lines and trim the document.
fn tidy(markdown: &str) -> String {
    let collapsed = EXCESS_NEWLINES.replace_all(markdown, "\n\n");
    let trimmed = collapsed.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}

/// Whether two inline pieces ending and starting with these characters
/// need a space between them. Only ASCII text is separated; CJK text runs
/// on without spaces.
fn joins_words(prev: char, next: char) -> bool {
    let ends_word = prev.is_ascii_alphanumeric() || ".,;:!?)".contains(prev);
    let starts_word = next.is_ascii_alphanumeric() || next == '(';
    ends_word && starts_word
}

#[derive(Default)]
struct Renderer {
    images: BTreeMap<String, Vec<u8>>,
    saved: usize,
    /// Last character of the previous inline piece, while nothing else has
    /// been written after it.
    trailing: Option<char>,
}

impl Renderer {
    fn render(&mut self, pieces: &[Piece]) -> String {
        self.trailing = None;
        let mut out = String::new();
        for piece in pieces {
            self.render_piece(piece, &mut out);
        }
        out
    }

    /// Write an inline piece whose visible text is `shown`.
    fn push_inline(&mut self, out: &mut String, shown: &str, rendered: &str) {
        if let (Some(prev), Some(next)) = (self.trailing, shown.chars().next()) {
            if joins_words(prev, next) && !out.ends_with(char::is_whitespace) {
                out.push(' ');
            }
        }
        out.push_str(rendered);
        if let Some(last) = shown.chars().last() {
            self.trailing = Some(last);
        }
    }

    fn render_piece(&mut self, piece: &Piece, out: &mut String) {
        let text = piece.as_text().unwrap_or_default();
        let inline = matches!(
            piece.kind(),
            PieceKind::Text | PieceKind::Link | PieceKind::Bold | PieceKind::Italic
        );
        match piece.kind() {
            PieceKind::Text => self.push_inline(out, text, &escape_markdown(text)),
            PieceKind::Heading => {
                let hashes = "#".repeat(usize::from(piece.level().unwrap_or(1)));
                out.push_str(&format!("\n\n{hashes} {}\n\n", escape_markdown(text)));
            }
            PieceKind::Link => {
                let href = piece.attr(ATTR_HREF).unwrap_or_default();
                let label = if text.is_empty() { href } else { text };
                self.push_inline(out, label, &format!("[{}]({href})", escape_markdown(label)));
            }
            PieceKind::Image | PieceKind::ImageBytes | PieceKind::ImageBase64 => {
                let target = self.image_target(piece);
                out.push_str(&image_markdown(piece, &target));
            }
            PieceKind::OrderedListItem | PieceKind::UnorderedListItem => {
                let marker = if piece.kind() == PieceKind::OrderedListItem {
                    "1. "
                } else {
                    "- "
                };
                let body = self.render(piece.children());
                start_line(out);
                out.push_str(&prefix_lines(body.trim(), marker, &" ".repeat(marker.len())));
                out.push('\n');
            }
            PieceKind::BlockQuote => {
                let body = self.render(piece.children());
                start_line(out);
                out.push_str(&prefix_lines(body.trim(), "> ", "> "));
                out.push('\n');
            }
            PieceKind::CodeBlock => {
                out.push_str("\n\n```\n");
                out.push_str(&piece.lines().join("\n"));
                out.push_str("\n```\n\n");
            }
            PieceKind::Table => {
                // Markdown rows and raw HTML are both emitted verbatim.
                out.push_str(&format!("\n\n{text}\n\n"));
            }
            PieceKind::Bold if !text.is_empty() => {
                self.push_inline(out, text, &format!("**{}**", escape_markdown(text)));
            }
            PieceKind::Italic if !text.is_empty() => {
                self.push_inline(out, text, &format!("*{}*", escape_markdown(text)));
            }
            PieceKind::Bold | PieceKind::Italic => {}
            PieceKind::HorizontalRule => out.push_str("\n\n---\n\n"),
            PieceKind::LineBreak => out.push_str("\n\n"),
        }
        if !inline {
            self.trailing = None;
        }
    }

    /// Link target of an image: saved file name, data URL, or the source URL
    /// when no payload is present.
    fn image_target(&mut self, piece: &Piece) -> String {
        let src = piece.attr(ATTR_SRC).unwrap_or_default();
        match piece.kind() {
            PieceKind::ImageBytes => match piece.bytes() {
                Some(bytes) => {
                    self.saved += 1;
                    let extension = declared_format(src).unwrap_or_else(|| "jpg".to_string());
                    let name = format!("image_{}.{extension}", self.saved);
                    self.images.insert(name.clone(), bytes.to_vec());
                    name
                }
                None => src.to_string(),
            },
            PieceKind::ImageBase64 => match piece.as_text() {
                Some(encoded) => {
                    let format = declared_format(src).unwrap_or_else(|| "jpeg".to_string());
                    format!("data:image/{format};base64,{encoded}")
                }
                None => src.to_string(),
            },
            _ => src.to_string(),
        }
    }
}

fn image_markdown(piece: &Piece, target: &str) -> String {
    let alt = escape_markdown(piece.attr(ATTR_ALT).unwrap_or_default());
    match piece.attr(ATTR_TITLE).filter(|t| !t.is_empty()) {
        Some(title) => format!("![{alt}]({target} \"{}\")", title.replace('"', "\\\"")),
        None => format!("![{alt}]({target})"),
    }
}

/// Make sure the next write starts on a fresh line.
fn start_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Prefix the first line with `first` and every other non-empty line with
/// `rest`.
fn prefix_lines(body: &str, first: &str, rest: &str) -> String {
    body.lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                format!("{first}{line}")
            } else if line.is_empty() {
                rest.trim_end().to_string()
            } else {
                format!("{rest}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
