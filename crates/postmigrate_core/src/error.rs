//! Error kinds the batch driver surfaces to callers.

use thiserror::Error;

/// Selection and precondition failures. None of these are retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MigrateError {
    #[error("invalid arguments: {0}")]
    InvalidArgument(String),

    #[error("no posts found with title containing '{query}'")]
    NotFound { query: String },

    #[error("multiple posts found with title containing '{query}':\n{}", format_candidates(.titles))]
    Ambiguous { query: String, titles: Vec<String> },

    #[error("post has no contents: {title}")]
    MissingContent { title: String },
}

fn format_candidates(titles: &[String]) -> String {
    titles
        .iter()
        .map(|title| format!("- {title}"))
        .collect::<Vec<_>>()
        .join("\n")
}
