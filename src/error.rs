use thiserror::Error;

/// Errors raised while reading, filtering or aggregating a highlights table.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Malformed record on line {line}: expected {expected} fields, found {found}", expected = crate::importer::FIELD_COUNT)]
    MalformedRecord { line: u64, found: usize },

    #[error("Invalid search pattern")]
    InvalidPattern(#[from] regex::Error),

    #[error("Input table has no data rows")]
    EmptyTable,

    #[error("Failed to read CSV")]
    Csv(#[from] csv::Error),

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ExportError::Io {
            context: context.into(),
            source,
        }
    }
}
