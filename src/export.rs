use crate::adapter;
use crate::aggregate::MatchSet;
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::filter::TitleFilter;
use crate::importer::HighlightReader;
use crate::model::Book;
use crate::prompt::ConfirmationGate;
use crate::renderer;
use eyre::{Context, Result, eyre};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub matched: usize,
    pub written: usize,
    pub skipped: usize,
}

/// Read the export, group the matching highlights by book and write one
/// note per book.
///
/// Nothing is written unless the whole table parses. Once writing starts
/// the first failure aborts the run and earlier files are left in place.
pub fn execute<R: BufRead, W: Write>(
    config: &ExportConfig,
    gate: &mut ConfirmationGate<R, W>,
) -> Result<ExportSummary> {
    let filter = TitleFilter::new(&config.pattern)?;
    check_output_dir(&config.output_dir)?;

    let mut rows = HighlightReader::from_path(&config.input)?;
    let matches = MatchSet::collect(rows.by_ref(), &filter)?;
    if rows.rows_read() == 0 {
        return Err(ExportError::EmptyTable.into());
    }
    info!(
        rows = rows.rows_read(),
        books = matches.len(),
        notes = matches.note_count(),
        pattern = filter.as_str(),
        "Read highlights"
    );

    let mut summary = ExportSummary {
        matched: matches.len(),
        ..ExportSummary::default()
    };
    if matches.is_empty() {
        return Ok(summary);
    }

    prepare_output_dir(&config.output_dir)?;

    let ask = matches.len() > 1 && !config.allow_multiple;
    let mut registry = HashSet::new();
    for mut book in matches.into_books() {
        if ask && !gate.confirm(&format!("Process book {:?}? ", book.title)) {
            info!("Skipped:  {}", book.title);
            summary.skipped += 1;
            continue;
        }

        if adapter::adapt(&mut book, config.format) {
            debug!(format = ?config.format, "Adapted {}", book.title);
        }

        let path = config
            .output_dir
            .join(allocate_file_name(&book.title, &mut registry));
        write_book(&path, &book)?;
        info!("Wrote:    {}", path.display());
        summary.written += 1;
    }

    Ok(summary)
}

/// Fail early when `dir` exists but is not a directory. A missing `dir` is
/// fine, it is created once there is something to write.
pub fn check_output_dir(dir: &Path) -> Result<()> {
    match fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => Err(eyre!(
            "Output folder {} exists and is not a directory",
            dir.display()
        )),
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
            Err(e).wrap_err_with(|| format!("Failed to verify output folder: {}", dir.display()))
        }
        _ => Ok(()),
    }
}

/// Create `dir` if needed. An existing non-directory is an error.
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(eyre!(
            "Output folder {} exists and is not a directory",
            dir.display()
        )),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => fs::create_dir_all(dir)
            .wrap_err_with(|| format!("Failed to create output directory: {}", dir.display())),
        Err(e) => Err(e)
            .wrap_err_with(|| format!("Failed to verify output folder: {}", dir.display())),
    }
}

/// `<title> - notes.md`, with path separators in the title replaced.
pub fn note_file_name(title: &str) -> String {
    let safe: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '-',
            c => c,
        })
        .collect();
    format!("{} - notes.md", safe)
}

/// Pick a file name no other book of this run has used. Titles that only
/// differ by path separators would otherwise share one file, so later
/// books get a ` (2)`, ` (3)`, ... suffix.
fn allocate_file_name(title: &str, registry: &mut HashSet<String>) -> String {
    let base = note_file_name(title);
    let mut candidate = base.clone();
    let mut n = 2;
    while registry.contains(&candidate) {
        let stem = base.trim_end_matches(".md");
        candidate = format!("{} ({}).md", stem, n);
        n += 1;
    }
    registry.insert(candidate.clone());
    candidate
}

fn write_book(path: &Path, book: &Book) -> Result<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    renderer::render_book(&mut writer, book)
        .wrap_err_with(|| format!("Failed to write notes: {}", path.display()))?;
    writer
        .flush()
        .wrap_err_with(|| format!("Failed to flush notes: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::TargetFormat;
    use tempfile::{TempDir, tempdir};

    const HEADER: &str = "Book Title,Authors,Chapter Title,Date of Highlight,Book URL,Chapter URL,Annotation URL,Highlight,Personal Note\n";

    struct Fixture {
        dir: TempDir,
        config: ExportConfig,
    }

    fn fixture(csv: &str, pattern: &str) -> Fixture {
        let dir = tempdir().unwrap();
        let input = dir.path().join("export.csv");
        fs::write(&input, csv).unwrap();
        let config = ExportConfig {
            input,
            pattern: pattern.to_string(),
            output_dir: dir.path().join("out"),
            allow_multiple: false,
            format: TargetFormat::Markdown,
        };
        Fixture { dir, config }
    }

    fn run(config: &ExportConfig, answers: &str) -> (Result<ExportSummary>, String) {
        let mut prompts = Vec::new();
        let result = execute(
            config,
            &mut ConfirmationGate::new(answers.as_bytes(), &mut prompts),
        );
        (result, String::from_utf8(prompts).unwrap())
    }

    fn written(dir: &Path) -> Vec<String> {
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn two_books() -> String {
        format!(
            "{HEADER}\
Go Programming,Donovan,Intro,d,https://go,https://go/intro,https://go/1,H1,\n\
Learning Go,Bodner,Setup,d,https://lgo,https://lgo/setup,https://lgo/1,H2,\n"
        )
    }

    #[test]
    fn test_single_book_end_to_end() {
        let csv = format!(
            "{HEADER}\
Go Programming,Donovan,Intro,d,https://go,https://go/intro,https://go/1,H1,\n\
Go Programming,Donovan,Intro,d,https://go,https://go/intro,https://go/2,H2,\n"
        );
        let f = fixture(&csv, "go programming");

        let (result, prompts) = run(&f.config, "");

        let summary = result.unwrap();
        assert_eq!(
            summary,
            ExportSummary {
                matched: 1,
                written: 1,
                skipped: 0
            }
        );
        assert!(prompts.is_empty());
        let content =
            fs::read_to_string(f.config.output_dir.join("Go Programming - notes.md")).unwrap();
        assert_eq!(content.matches("## Intro").count(), 1);
        let h1 = content.find("\"H1\" ([link](https://go/1))").unwrap();
        let h2 = content.find("\"H2\" ([link](https://go/2))").unwrap();
        assert!(h1 < h2);
    }

    #[test]
    fn test_empty_table_is_error_without_output() {
        let f = fixture(HEADER, "go");

        let (result, _) = run(&f.config, "");

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExportError>(),
            Some(ExportError::EmptyTable)
        ));
        assert!(!f.config.output_dir.exists());
    }

    #[test]
    fn test_malformed_record_aborts_before_writing() {
        let csv = format!(
            "{HEADER}\
Go Programming,Donovan,Intro,d,https://go,https://go/intro,https://go/1,H1,\n\
Go Programming,Donovan,Intro,d,https://go,https://go/intro,https://go/2,H2\n"
        );
        let f = fixture(&csv, "go");

        let (result, _) = run(&f.config, "");

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExportError>(),
            Some(ExportError::MalformedRecord { line: 3, found: 8 })
        ));
        assert!(written(&f.config.output_dir).is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let f = fixture(&two_books(), "(go");

        let (result, _) = run(&f.config, "");

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExportError>(),
            Some(ExportError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_missing_input_is_error() {
        let mut f = fixture(HEADER, "go");
        f.config.input = f.dir.path().join("missing.csv");

        let (result, _) = run(&f.config, "");

        assert!(result.is_err());
    }

    #[test]
    fn test_zero_matches_succeeds_without_output() {
        let f = fixture(&two_books(), "python");

        let (result, _) = run(&f.config, "");

        assert_eq!(result.unwrap().matched, 0);
        assert!(written(&f.config.output_dir).is_empty());
    }

    #[test]
    fn test_multiple_matches_ask_per_book() {
        let f = fixture(&two_books(), "go");

        let (result, prompts) = run(&f.config, "y\nn\n");

        let summary = result.unwrap();
        assert_eq!(summary.written, 1);
        assert_eq!(summary.skipped, 1);
        assert!(prompts.contains("Process book \"Go Programming\"? (yes/[no]) "));
        assert!(prompts.contains("Process book \"Learning Go\"? (yes/[no]) "));
        assert_eq!(
            written(&f.config.output_dir),
            vec!["Go Programming - notes.md"]
        );
    }

    #[test]
    fn test_closed_prompt_input_skips_books() {
        let f = fixture(&two_books(), "go");

        let (result, _) = run(&f.config, "");

        let summary = result.unwrap();
        assert_eq!(summary.written, 0);
        assert_eq!(summary.skipped, 2);
    }

    #[test]
    fn test_allow_multiple_skips_prompt() {
        let mut f = fixture(&two_books(), "go");
        f.config.allow_multiple = true;

        let (result, prompts) = run(&f.config, "");

        assert_eq!(result.unwrap().written, 2);
        assert!(prompts.is_empty());
        assert_eq!(
            written(&f.config.output_dir),
            vec!["Go Programming - notes.md", "Learning Go - notes.md"]
        );
    }

    #[test]
    fn test_obsidian_mode_escapes_hashes() {
        let csv = format!("{HEADER}C# in Depth,Skeet,Intro,d,b,c,h,use #region,#later\n");
        let mut f = fixture(&csv, "c#");
        f.config.format = TargetFormat::Obsidian;

        let (result, _) = run(&f.config, "");

        result.unwrap();
        let content =
            fs::read_to_string(f.config.output_dir.join("C# in Depth - notes.md")).unwrap();
        assert!(content.contains("\"use \\#region\" ([link](h))"));
        assert!(content.contains("> #later"));
    }

    #[test]
    fn test_output_file_is_error_even_without_matches() {
        let f = fixture(&two_books(), "python");
        fs::write(&f.config.output_dir, "not a dir").unwrap();

        let (result, _) = run(&f.config, "");

        assert!(result.is_err());
    }

    #[test]
    fn test_missing_output_dir_is_not_created_without_matches() {
        let f = fixture(&two_books(), "python");

        let (result, _) = run(&f.config, "");

        result.unwrap();
        assert!(!f.config.output_dir.exists());
    }

    #[test]
    fn test_titles_sharing_a_file_name_keep_both_books() {
        let csv = format!(
            "{HEADER}\
TCP/IP,Stevens,Intro,d,b,c,h1,First book,\n\
TCP-IP,Fall,Intro,d,b,c,h2,Second book,\n"
        );
        let mut f = fixture(&csv, "tcp");
        f.config.allow_multiple = true;

        let (result, _) = run(&f.config, "");

        assert_eq!(result.unwrap().written, 2);
        assert_eq!(
            written(&f.config.output_dir),
            vec!["TCP-IP - notes (2).md", "TCP-IP - notes.md"]
        );
        let first = fs::read_to_string(f.config.output_dir.join("TCP-IP - notes.md")).unwrap();
        let second =
            fs::read_to_string(f.config.output_dir.join("TCP-IP - notes (2).md")).unwrap();
        assert!(first.starts_with("# TCP/IP\n"));
        assert!(first.contains("First book"));
        assert!(second.starts_with("# TCP-IP\n"));
        assert!(second.contains("Second book"));
    }

    #[test]
    fn test_allocate_file_name_suffixes_repeats() {
        let mut registry = HashSet::new();

        assert_eq!(allocate_file_name("A/B", &mut registry), "A-B - notes.md");
        assert_eq!(allocate_file_name("A-B", &mut registry), "A-B - notes (2).md");
        assert_eq!(allocate_file_name("A\\B", &mut registry), "A-B - notes (3).md");
        assert_eq!(allocate_file_name("Other", &mut registry), "Other - notes.md");
    }

    #[test]
    fn test_output_path_that_is_a_file_is_error() {
        let f = fixture(&two_books(), "go");
        fs::write(&f.config.output_dir, "not a dir").unwrap();

        let (result, _) = run(&f.config, "");

        assert!(result.is_err());
    }

    #[test]
    fn test_prepare_output_dir_creates_nested() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b/c");

        prepare_output_dir(&nested).unwrap();
        prepare_output_dir(&nested).unwrap();

        assert!(nested.is_dir());
    }

    #[test]
    fn test_note_file_name() {
        assert_eq!(note_file_name("Go Programming"), "Go Programming - notes.md");
        assert_eq!(note_file_name("TCP/IP Illustrated"), "TCP-IP Illustrated - notes.md");
    }
}
