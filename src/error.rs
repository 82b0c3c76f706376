//! Error types shared by the storage, validation, and advisory layers.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Request body failed schema validation
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),

    /// The chat model could not produce a reply
    #[error("Language model unavailable: {0}")]
    ModelUnavailable(String),

    /// The image search provider failed; callers degrade to no images
    #[error("Image search failed: {0}")]
    SearchProvider(String),
}

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

/// Every offending field of one record, in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    /// A failure that is about the body as a whole rather than one field.
    pub fn body(reason: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError {
                field: "body".to_string(),
                reason: reason.into(),
            }],
        }
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.field.as_str()).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid fields: ")?;
        for (i, e) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{} ({})", e.field, e.reason)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
