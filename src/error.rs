use std::io;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("command execution failed: {0}")]
    Command(#[from] io::Error),

    #[error("key lister exited with status {status}: {stderr}")]
    Gpg { status: i32, stderr: String },

    #[error("invalid keyring path '{path}': {reason}")]
    InvalidKeyringPath { path: String, reason: String },

    #[error("keyring not found: {0}")]
    KeyringNotFound(String),

    #[error("cannot read keyring {path}: {source}")]
    KeyringAccess { path: String, source: io::Error },

    #[error("failed to render roster: {0}")]
    Render(#[from] askama::Error),

    #[error("permission denied reading keyring")]
    PermissionDenied,

    #[error("key lister timed out after {0} seconds")]
    Timeout(u64),
}

pub type Result<T> = std::result::Result<T, Error>;
