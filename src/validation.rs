use crate::error::{Error, Result};

/// Validates a keyring path before passing it to the key lister.
///
/// Rejected:
/// - Empty paths
/// - Paths starting with `-`, which gpg could read as an option
/// - Paths containing control characters (newlines, NUL, ...)
///
/// Returns the path on success.
pub fn validate_keyring_path(path: &str) -> Result<&str> {
    if path.is_empty() {
        return Err(Error::InvalidKeyringPath {
            path: path.to_string(),
            reason: "keyring path cannot be empty".to_string(),
        });
    }

    if path.starts_with('-') {
        return Err(Error::InvalidKeyringPath {
            path: path.to_string(),
            reason: "keyring path must not start with '-' (use ./ to prefix it)".to_string(),
        });
    }

    if path.chars().any(char::is_control) {
        return Err(Error::InvalidKeyringPath {
            path: path.escape_debug().to_string(),
            reason: "keyring path must not contain control characters".to_string(),
        });
    }

    Ok(path)
}
