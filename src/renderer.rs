use crate::model::Book;
use std::io::Write;

/// Write `book` as a Markdown note.
///
/// ```text
/// # <title>
/// - Authors: <authors>
/// - URL: <url>
///
/// ## <chapter>
/// - URL: <chapter url>
///
/// "<highlight>" ([link](<note url>))
/// > <personal note>
/// ```
///
/// Chapters and notes are written in the book's order. The personal note
/// line is omitted when empty.
pub fn render_book<W: Write>(writer: &mut W, book: &Book) -> std::io::Result<()> {
    writeln!(writer, "# {}", book.title)?;
    writeln!(writer, "- Authors: {}", book.authors)?;
    writeln!(writer, "- URL: {}", book.url)?;

    for chapter in book.chapters.values() {
        writeln!(writer)?;
        writeln!(writer, "## {}", chapter.title)?;
        writeln!(writer, "- URL: {}", chapter.url)?;

        for note in &chapter.notes {
            writeln!(writer)?;
            writeln!(writer, "\"{}\" ([link]({}))", note.highlight, note.url)?;
            if !note.personal.is_empty() {
                writeln!(writer, "> {}", note.personal)?;
            }
        }
    }

    Ok(())
}

pub fn render_to_string(book: &Book) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = render_book(&mut buf, book);
    String::from_utf8_lossy(&buf).into_owned()
}
