//! Render a GPG public keyring as an HTML roster for a key-signing party.
//!
//! The keyring is listed with `gpg2 --with-colons`, each key's `pub`, `fpr`
//! and first `uid` record are gathered into a [`KeyRecord`], and the records
//! are rendered as rows of a printable table with blank columns for
//! attendees to tick off as they verify each other.
//!
//! # Example
//!
//! ```no_run
//! use partytable::{Keyring, ListOptions, RosterOptions, render_roster};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> partytable::Result<()> {
//!     let keyring = Keyring::new("party.gpg");
//!     let listing = keyring.list_keys(&ListOptions::default()).await?;
//!
//!     let now = chrono::Local::now().naive_local();
//!     let options = RosterOptions::default();
//!     print!("{}", render_roster(&listing.records, now, &options)?);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Requirements
//!
//! - `gpg2` (or another program accepting the same arguments) on `PATH`
//! - Read access to the keyring file. A bare file name such as `party.gpg`
//!   is read from the current directory, not from gpg's home directory.

mod error;
mod keyring;
mod parse;
mod render;
mod types;
mod validation;

pub use error::{Error, Result};
pub use keyring::{DEFAULT_KEY_LISTER, Keyring};
pub use parse::{
    KeyRecords, ParseState, PendingKey, Transition, parse_keys, short_key_id, unescape_field,
};
pub use render::{Roster, pretty_fingerprint, render_roster};
pub use types::{Algorithm, DEFAULT_TITLE, KeyListing, KeyRecord, ListOptions, RosterOptions};
pub use validation::validate_keyring_path;
