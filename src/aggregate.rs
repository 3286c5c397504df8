use crate::error::ExportError;
use crate::filter::TitleFilter;
use crate::importer::HighlightRow;
use crate::model::Book;
use indexmap::IndexMap;

/// Books whose title passed the filter, keyed by title in first-seen order.
#[derive(Debug, Default, Clone)]
pub struct MatchSet {
    books: IndexMap<String, Book>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the rows accepted by `filter` into a match set.
    /// Stops at the first row error.
    pub fn collect<I>(rows: I, filter: &TitleFilter) -> Result<Self, ExportError>
    where
        I: IntoIterator<Item = Result<HighlightRow, ExportError>>,
    {
        let mut matches = Self::new();
        for row in rows {
            let row = row?;
            if filter.matches(&row.title) {
                matches.insert(&row);
            }
        }
        Ok(matches)
    }

    /// Every call adds exactly one note.
    pub fn insert(&mut self, row: &HighlightRow) {
        match self.books.get_mut(&row.title) {
            Some(book) => book.push_row(row),
            None => {
                self.books.insert(row.title.clone(), Book::from_row(row));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, title: &str) -> Option<&Book> {
        self.books.get(title)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Book> {
        self.books.values()
    }

    pub fn note_count(&self) -> usize {
        self.iter().map(Book::note_count).sum()
    }

    pub fn into_books(self) -> impl Iterator<Item = Book> {
        self.books.into_values()
    }
}
