//! Error types for folio.
//!
//! Nothing here is fatal to the page: every error is scoped to the component
//! that raised it, which logs it and disables itself.

use thiserror::Error;

/// Errors raised while configuring or mounting components.
#[derive(Debug, Error)]
pub enum FolioError {
    /// Elements a component needs are absent from the page.
    #[error("{component}: missing page elements {ids:?}")]
    MissingElements {
        component: &'static str,
        ids: Vec<String>,
    },
    /// A counter element carries a goal that is not a non-negative integer.
    #[error("counter goal {raw:?} is not a non-negative integer")]
    InvalidGoal { raw: String },
    /// Configuration values are inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Configuration could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// The canned-response table is unusable.
    #[error("response table: {0}")]
    Responder(String),
    /// Writing a surface snapshot failed.
    #[error("failed to encode snapshot: {0}")]
    Snapshot(#[from] image::ImageError),
    /// Reading or writing a file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
