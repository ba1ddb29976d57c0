//! Error types for HTML to PPTX conversion.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Message used when a failure carries no message of its own.
pub const FALLBACK_MESSAGE: &str = "An error occurred while converting to PPTX";

/// Errors that can occur while building or writing a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// The input had no serialized content at all.
    #[error("No content to convert: the HTML input is empty")]
    EmptyContent,

    /// The image relay returned a non-success status or could not be reached.
    #[error("Failed to fetch image '{url}': {reason}")]
    ImageFetch { url: String, reason: String },

    /// The image relay answered but carried no usable image payload.
    #[error("No usable image data for '{url}': {reason}")]
    ImageData { url: String, reason: String },

    /// Failed to derive rows or columns from a table.
    #[error("Table processing error: {0}")]
    TableProcessing(String),

    /// A conversion failed; carries the message surfaced to the caller.
    #[error("{message}")]
    ConversionAborted { message: String },

    /// A conversion is already running on this converter.
    #[error("A conversion is already in progress")]
    ConversionInProgress,

    /// Failed to write the output file.
    #[error("Failed to write file: {0}")]
    IoError(#[from] std::io::Error),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML generation or parsing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),
}

impl Error {
    /// Wrap this error into the single message reported to the caller.
    ///
    /// Already-wrapped errors with a message are returned unchanged.
    pub fn into_aborted(self) -> Self {
        let keep = matches!(
            &self,
            Self::ConversionAborted { message } if !message.trim().is_empty()
        );
        if keep {
            return self;
        }

        let message = self.to_string();
        let message = if message.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            message
        };
        Self::ConversionAborted { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_aborted_keeps_message() {
        let err = Error::ImageFetch {
            url: "https://example.com/a.png".to_string(),
            reason: "HTTP 404 Not Found".to_string(),
        }
        .into_aborted();

        match err {
            Error::ConversionAborted { message } => {
                assert!(message.contains("https://example.com/a.png"));
                assert!(message.contains("404"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_into_aborted_falls_back_on_empty_message() {
        let err = Error::ConversionAborted {
            message: "  ".to_string(),
        };
        assert_eq!(err.into_aborted().to_string(), FALLBACK_MESSAGE);

        let err = Error::TableProcessing(String::new()).into_aborted();
        assert_eq!(err.to_string(), "Table processing error: ");
    }

    #[test]
    fn test_into_aborted_is_idempotent() {
        let once = Error::EmptyContent.into_aborted();
        let twice = once.into_aborted();
        assert_eq!(
            twice.to_string(),
            "No content to convert: the HTML input is empty"
        );
    }
}
