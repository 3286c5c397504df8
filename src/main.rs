use clap::Parser;
use eyre::{Context, Result};
use highlights_md::config::{Cli, ExportConfig, load_file_config};
use highlights_md::error::ExportError;
use highlights_md::export;
use highlights_md::prompt::ConfirmationGate;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status when the export has a header but no highlights.
const EXIT_EMPTY_TABLE: u8 = 3;

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let quiet = cli.quiet;

    // 1. Load config file (CLI path > default path)
    let file_cfg = load_file_config(cli.config.as_deref())?;

    // 2. Resolve options (CLI > Config > Default)
    let cwd = std::env::current_dir().wrap_err("Failed to get current working directory")?;
    let config = ExportConfig::resolve(cli, file_cfg, cwd);

    // 3. Run the export, prompting on the terminal when needed
    let stdin = std::io::stdin();
    let mut gate = ConfirmationGate::new(stdin.lock(), std::io::stdout());
    let summary = export::execute(&config, &mut gate)?;

    if !quiet {
        if summary.matched == 0 {
            eprintln!("No book title matches {:?}.", config.pattern);
        } else {
            eprintln!(
                "Done. {} written, {} skipped.",
                summary.written, summary.skipped
            );
        }
    }

    Ok(())
}

/// Process exit status for a failed run.
fn exit_status(err: &eyre::Report) -> u8 {
    match err.downcast_ref::<ExportError>() {
        Some(ExportError::EmptyTable) => EXIT_EMPTY_TABLE,
        _ => 1,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(exit_status(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::eyre;
    use highlights_md::adapter::TargetFormat;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_empty_table_exit_status() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("export.csv");
        fs::write(
            &input,
            "Book Title,Authors,Chapter Title,Date of Highlight,Book URL,Chapter URL,Annotation URL,Highlight,Personal Note\n",
        )
        .unwrap();
        let config = ExportConfig {
            input,
            pattern: "go".to_string(),
            output_dir: dir.path().join("out"),
            allow_multiple: false,
            format: TargetFormat::Markdown,
        };

        let err = export::execute(&config, &mut ConfirmationGate::new("".as_bytes(), Vec::new()))
            .unwrap_err();

        assert_eq!(exit_status(&err), EXIT_EMPTY_TABLE);
    }

    #[test]
    fn test_wrapped_empty_table_keeps_exit_status() {
        let err = Err::<(), _>(ExportError::EmptyTable)
            .wrap_err("Export failed")
            .unwrap_err();

        assert_eq!(exit_status(&err), EXIT_EMPTY_TABLE);
    }

    #[test]
    fn test_other_errors_exit_one() {
        assert_eq!(exit_status(&eyre!("Config file not found")), 1);
        assert_eq!(
            exit_status(&ExportError::MalformedRecord { line: 2, found: 8 }.into()),
            1
        );
    }
}
