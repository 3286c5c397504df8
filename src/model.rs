use crate::adapter::TargetFormat;
use crate::importer::HighlightRow;
use indexmap::IndexMap;

/// A single highlight with its optional personal annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub highlight: String,
    pub personal: String,
    pub url: String,
}

impl Note {
    pub fn from_row(row: &HighlightRow) -> Self {
        Self {
            highlight: strip_newlines(&row.highlight),
            personal: strip_newlines(&row.note),
            url: row.highlight_url.clone(),
        }
    }
}

fn strip_newlines(text: &str) -> String {
    text.replace('\n', "")
}

/// Notes sharing a chapter title, in the order they were read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    pub url: String,
    pub notes: Vec<Note>,
}

impl Chapter {
    pub fn from_row(row: &HighlightRow) -> Self {
        Self {
            title: row.chapter.clone(),
            url: row.chapter_url.clone(),
            notes: vec![Note::from_row(row)],
        }
    }
}

/// Every chapter read for one title.
///
/// Title, authors and URL come from the first row seen for the book.
/// Chapters keep first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub title: String,
    pub authors: String,
    pub url: String,
    pub chapters: IndexMap<String, Chapter>,
    pub(crate) adapted_for: Option<TargetFormat>,
}

impl Book {
    pub fn from_row(row: &HighlightRow) -> Self {
        let mut chapters = IndexMap::new();
        chapters.insert(row.chapter.clone(), Chapter::from_row(row));
        Self {
            title: row.title.clone(),
            authors: row.authors.clone(),
            url: row.book_url.clone(),
            chapters,
            adapted_for: None,
        }
    }

    /// Add the row's note to its chapter, opening the chapter if needed.
    /// Book-level fields of later rows are ignored.
    pub fn push_row(&mut self, row: &HighlightRow) {
        match self.chapters.get_mut(&row.chapter) {
            Some(chapter) => chapter.notes.push(Note::from_row(row)),
            None => {
                self.chapters
                    .insert(row.chapter.clone(), Chapter::from_row(row));
            }
        }
    }

    pub fn note_count(&self) -> usize {
        self.chapters.values().map(|c| c.notes.len()).sum()
    }

    /// The format this book's notes were escaped for, if any.
    pub fn adapted_for(&self) -> Option<TargetFormat> {
        self.adapted_for
    }

    pub fn notes_mut(&mut self) -> impl Iterator<Item = &mut Note> {
        self.chapters
            .values_mut()
            .flat_map(|chapter| chapter.notes.iter_mut())
    }
}
