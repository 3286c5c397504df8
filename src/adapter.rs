//! Escaping highlight text for the note-taking application the notes end up in.
//!
//! Obsidian reads `#word` as a tag, so highlights copied from a book that
//! mention `#include` or `C#` would sprout bogus tags. The escape is a
//! one-way transform: running it twice over the same text yields `\\#`.
//! [`adapt`] records the format on the [`Book`] and refuses a second pass.
use crate::model::Book;
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetFormat {
    /// Plain Markdown, nothing is escaped.
    #[default]
    Markdown,
    Obsidian,
}

impl TargetFormat {
    pub fn from_obsidian_flag(obsidian: bool) -> Self {
        if obsidian {
            TargetFormat::Obsidian
        } else {
            TargetFormat::Markdown
        }
    }
}

/// Escape a single highlight. Not idempotent.
pub fn escape_highlight(text: &str, format: TargetFormat) -> Cow<'_, str> {
    match format {
        TargetFormat::Obsidian if text.contains('#') => Cow::Owned(text.replace('#', "\\#")),
        _ => Cow::Borrowed(text),
    }
}

/// Escape every highlight of `book` for `format`.
///
/// Returns false when nothing was done: the format needs no escaping, or
/// the book was already adapted. Only `Note::highlight` is touched.
pub fn adapt(book: &mut Book, format: TargetFormat) -> bool {
    if format == TargetFormat::Markdown || book.adapted_for.is_some() {
        return false;
    }
    for note in book.notes_mut() {
        if let Cow::Owned(escaped) = escape_highlight(&note.highlight, format) {
            note.highlight = escaped;
        }
    }
    book.adapted_for = Some(format);
    true
}
