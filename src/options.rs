//! Plumbing shared by every command's options: optional quorum values, timeouts, opaque tokens,
//! and the validators builders compose.

use crate::{Error, Location, ValidationError};
use std::time::Duration;

/// A quorum value as sent on the wire. Zero means "not specified" and is omitted.
#[inline]
pub(crate) const fn quorum(value: u32) -> Option<u32> {
    if value > 0 {
        Some(value)
    } else {
        None
    }
}

/// A timeout in whole milliseconds, truncated. A zero duration is omitted.
#[inline]
pub(crate) fn timeout_millis(timeout: Duration) -> Option<u32> {
    if timeout.is_zero() {
        None
    } else {
        Some(u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX))
    }
}

/// An opaque token (causal context, vclock) as sent on the wire. Empty tokens are omitted.
#[inline]
pub(crate) fn opaque(token: &[u8]) -> Option<Vec<u8>> {
    if token.is_empty() {
        None
    } else {
        Some(token.to_vec())
    }
}

/// A possibly-empty string as an optional wire field.
#[inline]
pub(crate) fn non_empty(value: &str) -> Option<Vec<u8>> {
    opaque(value.as_bytes())
}

/// An opaque token from the wire. An absent token is empty.
#[inline]
pub(crate) fn token(value: Option<Vec<u8>>) -> Vec<u8> {
    value.unwrap_or_default()
}

/// Every command addresses a bucket.
#[inline]
pub(crate) fn require_bucket(location: &Location) -> Result<(), ValidationError> {
    if location.bucket.is_empty() {
        Err(ValidationError::BucketRequired)
    } else {
        Ok(())
    }
}

/// Commands that read or delete an existing value need its key.
#[inline]
pub(crate) fn require_key(location: &Location) -> Result<(), ValidationError> {
    if location.key.is_empty() {
        Err(ValidationError::KeyRequired)
    } else {
        Ok(())
    }
}

/// Options handed to a command constructor. Absent options are rejected.
#[inline]
pub(crate) fn require_options<T>(options: Option<T>) -> Result<T, ValidationError> {
    options.ok_or(ValidationError::NilOptions)
}

/// Text carried as bytes on the wire.
pub(crate) fn utf8(command: &'static str, field: &'static str, bytes: Vec<u8>) -> crate::Result<String> {
    String::from_utf8(bytes).map_err(|source| Error::InvalidUtf8 {
        command,
        field,
        source,
    })
}
