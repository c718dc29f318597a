//! Errors produced while building, encoding, and decoding commands.
//!
//! Not-found, tombstone, and unchanged outcomes are not errors. They are reported through the
//! decoded response.

use std::string::FromUtf8Error;

/// Options rejected by a builder. Nothing is sent to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The location has no bucket.
    #[error("bucket is required")]
    BucketRequired,
    /// The location has no key, and the command cannot have one generated.
    #[error("key is required")]
    KeyRequired,
    /// No options were given to a command constructor.
    #[error("options are required")]
    NilOptions,
}

/// Any failure of a command.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The options did not pass validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The reply is not a well-formed message of the shape the command expects.
    #[error("[{command}] could not decode {message}: {source}")]
    Decode {
        /// The command that received the reply.
        command: &'static str,
        /// The message the reply was decoded as.
        message: &'static str,
        /// The underlying decoder error.
        #[source]
        source: prost::DecodeError,
    },
    /// The store answered with a data type other than the one the command works with.
    #[error("[{command}] expected a {expected} data type, got {actual}")]
    DataTypeMismatch {
        /// The command that received the reply.
        command: &'static str,
        /// The data type the command works with.
        expected: &'static str,
        /// The data type in the reply.
        actual: String,
    },
    /// A key or field name in the reply is not valid UTF-8.
    #[error("[{command}] {field} is not valid UTF-8: {source}")]
    InvalidUtf8 {
        /// The command that received the reply.
        command: &'static str,
        /// The field that failed to decode.
        field: &'static str,
        /// The underlying conversion error.
        #[source]
        source: FromUtf8Error,
    },
    /// The reply carried a message code the command does not expect.
    #[error("[{command}] expected response code {expected}, got {actual}")]
    UnexpectedResponse {
        /// The command that received the reply.
        command: &'static str,
        /// The code the command expects.
        expected: u8,
        /// The code that was received.
        actual: u8,
    },
    /// The store rejected the request.
    #[error("store error {code}: {message}")]
    Store {
        /// The store's error code.
        code: u32,
        /// The store's error message.
        message: String,
    },
    /// The executor failed to deliver the request or receive the reply.
    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Whether the error was raised before anything was sent.
    #[inline]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::BucketRequired.to_string(), "bucket is required");
        assert_eq!(ValidationError::KeyRequired.to_string(), "key is required");

        let err = Error::from(ValidationError::KeyRequired);
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "key is required");
    }

    #[test]
    fn test_unexpected_response_names_the_command() {
        let err = Error::UnexpectedResponse {
            command: "FetchValue",
            expected: 10,
            actual: 81,
        };
        assert!(!err.is_validation());
        assert_eq!(
            err.to_string(),
            "[FetchValue] expected response code 10, got 81"
        );
    }
}
