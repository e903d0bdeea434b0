//! Error handling for the extraction pipeline.
//!
//! Only structural violations are errors. A pattern that does not match or an
//! alias that is not found is a normal "not found" outcome, and unparseable
//! cells are recovered as missing values by the stage that reads them.

/// Specialized error type for a pipeline run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input table lacks one or more of the required columns
    #[error("Missing required column(s): {}", .columns.join(", "))]
    MissingRequiredColumn {
        /// Names of the missing columns, in the order they were checked
        columns: Vec<String>,
    },

    /// Fewer than two distinct record types remain after processing
    #[error("At least two distinct record types are required, found {}: [{}]", .found.len(), .found.join(", "))]
    InsufficientRecordTypes {
        /// Record types that were present
        found: Vec<String>,
    },

    /// A lexicon entry lists an empty alias, which would match every text
    #[error("Empty alias for '{name}'")]
    EmptyAlias {
        /// Lexicon entry the alias belongs to
        name: String,
    },

    /// A lexicon entry carries a regular expression that does not compile
    #[error("Invalid pattern for '{name}': {source}")]
    InvalidPattern {
        /// Lexicon entry the pattern belongs to
        name: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },
}

impl PipelineError {
    /// Create a missing column error
    #[must_use]
    pub fn missing_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingRequiredColumn {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an invalid pattern error
    #[must_use]
    pub fn invalid_pattern(name: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            name: name.into(),
            source,
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
