//! Bearer token extraction from request metadata

use packages_core::RequestMetadata;

use crate::{Error, Result};

/// Metadata key carrying the caller's credential
pub const AUTHORIZATION_KEY: &str = "authorization";

/// Extract the bearer token from the `authorization` metadata entry.
///
/// A missing entry yields `Ok(None)`: anonymous callers are valid and get
/// whatever the target cluster grants anonymous users.
///
/// # Errors
///
/// Returns [`Error::MalformedAuthorization`] if the entry is present but is
/// not exactly `Bearer <token>`.
pub fn extract_token(metadata: &RequestMetadata) -> Result<Option<String>> {
    let Some(value) = metadata.get(AUTHORIZATION_KEY) else {
        return Ok(None);
    };

    let token = value
        .strip_prefix("Bearer")
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map(str::trim)
        .filter(|token| !token.is_empty() && !token.contains(char::is_whitespace))
        .ok_or(Error::MalformedAuthorization)?;

    Ok(Some(token.to_string()))
}
