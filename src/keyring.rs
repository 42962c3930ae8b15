use std::borrow::Cow;
use std::io;
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};
use crate::parse::parse_keys;
use crate::types::{KeyListing, ListOptions};
use crate::validation::validate_keyring_path;

/// Key lister run when no other program is configured.
pub const DEFAULT_KEY_LISTER: &str = "gpg2";

/// A public keyring file, listed through an external gpg-compatible tool.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> partytable::Result<()> {
/// use partytable::{Keyring, ListOptions};
///
/// let keyring = Keyring::new("party.gpg");
/// let listing = keyring.list_keys(&ListOptions::default()).await?;
/// println!("{} keys on the roster", listing.records.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Keyring {
    path: String,
    program: String,
}

impl Keyring {
    /// Creates a keyring listed with the default `gpg2` binary.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            program: DEFAULT_KEY_LISTER.to_string(),
        }
    }

    /// Uses `program` instead of `gpg2` to list the keyring.
    ///
    /// The program is given the same arguments gpg2 would be, see
    /// [`Keyring::lister_args`].
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the key lister.
    ///
    /// Only the given keyring is read; the user's default keyring and
    /// options file are ignored.
    pub fn lister_args(&self) -> Vec<String> {
        [
            "--fingerprint",
            "--no-default-keyring",
            "--no-options",
            "--with-colons",
            "--keyring",
            &*gpg_keyring_arg(&self.path),
        ]
        .map(str::to_string)
        .to_vec()
    }

    /// Lists every key in the keyring as roster records.
    ///
    /// Blocks until the key lister exits, or until `options.timeout_secs`
    /// elapses if set.
    pub async fn list_keys(&self, options: &ListOptions) -> Result<KeyListing> {
        validate_keyring_path(&self.path)?;
        // gpg creates a missing keyring as an empty keybox and exits 0.
        check_keyring_file(&self.path).await?;

        debug!(program = %self.program, keyring = %self.path, "running key lister");
        let run = self.run_lister();
        let output = match options.timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), run)
                .await
                .map_err(|_| Error::Timeout(secs))??,
            None => run.await?,
        };

        if !output.status.success() {
            return Err(check_gpg_error(&self.path, output.status, &output.stderr));
        }

        debug!(bytes = output.stdout.len(), "key lister finished");
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_keys(&stdout)
    }

    async fn run_lister(&self) -> std::io::Result<Output> {
        Command::new(&self.program)
            .env("LC_ALL", "C")
            .args(self.lister_args())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
    }
}

/// gpg looks a keyring name without a slash up in its home directory, so
/// such paths are anchored to the current directory.
fn gpg_keyring_arg(path: &str) -> Cow<'_, str> {
    if path.contains('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("./{path}"))
    }
}

async fn check_keyring_file(path: &str) -> Result<()> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|err| keyring_access_error(path, err))?;

    if metadata.is_dir() {
        return Err(Error::InvalidKeyringPath {
            path: path.to_string(),
            reason: "keyring path is a directory".to_string(),
        });
    }

    tokio::fs::File::open(path)
        .await
        .map_err(|err| keyring_access_error(path, err))?;

    Ok(())
}

fn keyring_access_error(path: &str, err: io::Error) -> Error {
    match err.kind() {
        io::ErrorKind::NotFound => Error::KeyringNotFound(path.to_string()),
        io::ErrorKind::PermissionDenied => Error::PermissionDenied,
        _ => Error::KeyringAccess {
            path: path.to_string(),
            source: err,
        },
    }
}

fn check_gpg_error(path: &str, status: std::process::ExitStatus, stderr: &[u8]) -> Error {
    let msg = String::from_utf8_lossy(stderr);

    if msg.contains("Permission denied") || msg.contains("permission denied") {
        return Error::PermissionDenied;
    }

    if msg.contains(path) && (msg.contains("No such file or directory") || msg.contains("not found"))
    {
        return Error::KeyringNotFound(path.to_string());
    }

    Error::Gpg {
        status: status.code().unwrap_or(-1),
        stderr: msg.trim_end().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed_status() -> std::process::ExitStatus {
        std::process::Command::new("false").status().unwrap()
    }

    #[test]
    fn test_lister_args() {
        let keyring = Keyring::new("party/pubring.gpg");
        assert_eq!(
            keyring.lister_args(),
            [
                "--fingerprint",
                "--no-default-keyring",
                "--no-options",
                "--with-colons",
                "--keyring",
                "party/pubring.gpg",
            ]
        );
    }

    #[test]
    fn test_lister_args_anchor_bare_file_name() {
        let keyring = Keyring::new("party.gpg");
        assert_eq!(keyring.lister_args()[5], "./party.gpg");

        let keyring = Keyring::new("/srv/party.gpg");
        assert_eq!(keyring.lister_args()[5], "/srv/party.gpg");

        let keyring = Keyring::new("../party.gpg");
        assert_eq!(keyring.lister_args()[5], "../party.gpg");
    }

    #[test]
    fn test_keyring_access_error_mapping() {
        let err = keyring_access_error("party.gpg", io::Error::from(io::ErrorKind::NotFound));
        match err {
            Error::KeyringNotFound(path) => assert_eq!(path, "party.gpg"),
            _ => panic!("expected KeyringNotFound error"),
        }

        let err = keyring_access_error(
            "party.gpg",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, Error::PermissionDenied));

        let err = keyring_access_error("party.gpg", io::Error::other("disk on fire"));
        assert!(matches!(err, Error::KeyringAccess { .. }));
    }

    #[tokio::test]
    async fn test_check_keyring_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("typo.gpg");
        let missing = missing.to_str().unwrap();

        let err = check_keyring_file(missing).await.unwrap_err();
        assert!(matches!(err, Error::KeyringNotFound(_)));
        assert!(!std::path::Path::new(missing).exists());
    }

    #[tokio::test]
    async fn test_check_keyring_file_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_keyring_file(dir.path().to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidKeyringPath { .. }));
    }

    #[test]
    fn test_default_program() {
        let keyring = Keyring::new("party.gpg");
        assert_eq!(keyring.program(), "gpg2");
        assert_eq!(keyring.path(), "party.gpg");

        let keyring = keyring.with_program("/usr/local/bin/gpg");
        assert_eq!(keyring.program(), "/usr/local/bin/gpg");
    }

    #[test]
    fn test_check_error_permission_denied() {
        let stderr = b"gpg: keyblock resource '/root/party.gpg': Permission denied";
        let err = check_gpg_error("/root/party.gpg", failed_status(), stderr);
        assert!(matches!(err, Error::PermissionDenied));
    }

    #[test]
    fn test_check_error_permission_denied_lowercase() {
        let stderr = b"gpg: fatal: permission denied";
        let err = check_gpg_error("party.gpg", failed_status(), stderr);
        assert!(matches!(err, Error::PermissionDenied));
    }

    #[test]
    fn test_check_error_keyring_not_found() {
        let stderr = b"gpg: keyblock resource '/tmp/missing.gpg': No such file or directory";
        let err = check_gpg_error("/tmp/missing.gpg", failed_status(), stderr);
        match err {
            Error::KeyringNotFound(path) => assert_eq!(path, "/tmp/missing.gpg"),
            _ => panic!("expected KeyringNotFound error"),
        }
    }

    #[test]
    fn test_check_error_missing_file_elsewhere_is_generic() {
        let stderr = b"gpg: /home/u/.gnupg/trustdb.gpg: No such file or directory";
        let err = check_gpg_error("party.gpg", failed_status(), stderr);
        assert!(matches!(err, Error::Gpg { .. }));
    }

    #[test]
    fn test_check_error_generic() {
        let stderr = b"gpg: some unknown error\n";
        let err = check_gpg_error("party.gpg", failed_status(), stderr);
        match err {
            Error::Gpg { status, stderr } => {
                assert_eq!(status, 1);
                assert_eq!(stderr, "gpg: some unknown error");
            }
            _ => panic!("expected Gpg error"),
        }
    }
}
