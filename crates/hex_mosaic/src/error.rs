//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid configuration, entity-source failures, image fetch and decode failures, IO,
//! and generic errors.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("entity source error: {0}")]
    Source(String),

    #[error("failed to fetch image '{reference}': {message}")]
    Fetch { reference: String, message: String },

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Builds a [`Error::Fetch`] for the given image reference.
    pub fn fetch(reference: impl Into<String>, message: impl ToString) -> Self {
        Error::Fetch {
            reference: reference.into(),
            message: message.to_string(),
        }
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_render_their_context() {
        let cases: [(Error, &str); 4] = [
            (
                Error::InvalidConfig("cell_radius must be >= 2".into()),
                "invalid configuration: cell_radius must be >= 2",
            ),
            (
                Error::Source("manga list unavailable".into()),
                "entity source error: manga list unavailable",
            ),
            (format!("render worker {} died", 3).into(), "render worker 3 died"),
            ("cell bounds are empty".into(), "cell bounds are empty"),
        ];
        for (err, expected) in cases {
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn io_errors_convert_transparently() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "export.json missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "export.json missing");
    }

    #[test]
    fn fetch_error_names_the_reference() {
        let err = Error::fetch("https://img.example/cover.png", "status code 404");
        assert_eq!(
            err.to_string(),
            "failed to fetch image 'https://img.example/cover.png': status code 404"
        );
    }
}
