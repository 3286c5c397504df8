//! # highlights-md
//!
//! A CLI tool that turns the highlights CSV export of the O'Reilly learning
//! platform into one Markdown note per book.
//!
//! ## What it does
//!
//! The export has one row per highlight. This tool keeps the rows whose book
//! title matches a case-insensitive regular expression, groups them by book
//! and chapter in the order they appear, and writes each book as
//! `<Title> - notes.md`:
//!
//! ```markdown
//! # The Go Programming Language
//! - Authors: Alan Donovan, Brian Kernighan
//! - URL: https://learning.oreilly.com/library/view/...
//!
//! ## 1. Tutorial
//! - URL: https://learning.oreilly.com/library/view/.../ch01.html
//!
//! "Go is a compiled language." ([link](https://...))
//! > my own note, if there was one
//! ```
//!
//! When the pattern matches more than one book you are asked about each
//! one, unless `--force` is given.
//!
//! ## Usage
//!
//! ```sh
//! # Export a single book into the current directory
//! highlights-md -s "go programming" highlights.csv
//!
//! # Every book about Rust, into an Obsidian vault, without prompting
//! highlights-md -s rust -o ~/vault/books --obs -f highlights.csv
//! ```
//!
//! Preferences can be persisted in `~/.config/highlights-md/config.toml`.
pub mod adapter;
pub mod aggregate;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod importer;
pub mod model;
pub mod prompt;
pub mod renderer;
