use crate::adapter::TargetFormat;
use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Turn an O'Reilly highlights CSV export into one Markdown note per book.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// CSV export of your highlights.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Case-insensitive regular expression matched against book titles.
    #[arg(short, long, value_name = "PATTERN", value_parser = NonEmptyStringValueParser::new())]
    pub search: String,

    /// Output directory, created if missing.
    /// Defaults to the current directory if not set in config.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Export every matching book without asking.
    #[arg(short, long)]
    pub force: bool,

    /// Escape highlights for Obsidian.
    #[arg(long = "obs")]
    pub obsidian: bool,

    /// Path to a specific configuration file.
    /// Defaults to $XDG_CONFIG_HOME/highlights-md/config.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print each file written or skipped.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only report errors.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Preferences persisted in `config.toml`.
#[derive(Deserialize, Default, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub output_dir: Option<PathBuf>,
    pub allow_multiple: Option<bool>,
    pub obsidian: Option<bool>,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("highlights-md/config.toml"))
}

/// Load the explicit config file, or the default one when it exists.
pub fn load_file_config(explicit_path: Option<&Path>) -> Result<FileConfig> {
    let path = if let Some(p) = explicit_path {
        if !p.exists() {
            return Err(eyre!("Config file not found: {}", p.display()));
        }
        Some(p.to_path_buf())
    } else {
        default_config_path().filter(|p| p.exists())
    };

    match path {
        None => Ok(FileConfig::default()),
        Some(p) => {
            let content = fs::read_to_string(&p)
                .wrap_err_with(|| format!("Failed to read config: {}", p.display()))?;
            toml::from_str(&content)
                .wrap_err_with(|| format!("Failed to parse config: {}", p.display()))
        }
    }
}

/// Everything an export run needs, independent of where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    pub input: PathBuf,
    pub pattern: String,
    pub output_dir: PathBuf,
    pub allow_multiple: bool,
    pub format: TargetFormat,
}

impl ExportConfig {
    /// CLI > config file > defaults. `cwd` is the fallback output directory.
    pub fn resolve(cli: Cli, file_cfg: FileConfig, cwd: PathBuf) -> Self {
        let output_dir = cli.output.or(file_cfg.output_dir).unwrap_or(cwd);
        let allow_multiple = cli.force || file_cfg.allow_multiple.unwrap_or(false);
        let obsidian = cli.obsidian || file_cfg.obsidian.unwrap_or(false);

        ExportConfig {
            input: cli.input,
            pattern: cli.search,
            output_dir,
            allow_multiple,
            format: TargetFormat::from_obsidian_flag(obsidian),
        }
    }
}
