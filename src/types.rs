/// Public-key algorithm of a roster entry.
///
/// Values correspond to the algorithm field (field 4) of `pub` records in
/// GPG's `--with-colons` output. Codes are compared as text, so anything
/// that is not one of the known literals is [`Algorithm::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum Algorithm {
    Rsa,
    Dsa,
    ElGamal,
    Ecdsa,
    #[default]
    Unknown,
}

impl Algorithm {
    pub fn from_gpg_code(code: &str) -> Self {
        match code {
            "1" => Self::Rsa,
            "17" => Self::Dsa,
            "20" => Self::ElGamal,
            "22" => Self::Ecdsa,
            _ => Self::Unknown,
        }
    }

    /// The label printed in the roster's "Type" column.
    pub fn name(self) -> &'static str {
        match self {
            Self::Rsa => "RSA",
            Self::Dsa => "DSA",
            Self::ElGamal => "El Gamal",
            Self::Ecdsa => "ECDSA",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the key-signing roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    /// 1-based position in the roster.
    pub sequence: usize,
    /// Short key id: the last 8 characters of the long key id.
    pub key_id: String,
    pub algorithm: Algorithm,
    /// Key length as printed by GPG; not interpreted.
    pub size_bits: String,
    pub fingerprint: String,
    /// First user id of the key, unescaped.
    pub owner: String,
}

/// Result of parsing one key listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyListing {
    pub records: Vec<KeyRecord>,
    /// `pub`, `fpr` or `uid` lines skipped for having too few fields.
    pub malformed_lines: usize,
    /// Keys abandoned because a new `pub` line arrived before they were complete.
    pub discarded_records: usize,
}

/// Options for listing a keyring.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Timeout for the key lister subprocess, in seconds.
    /// If None, the subprocess is awaited indefinitely.
    pub timeout_secs: Option<u64>,
}

/// Options for rendering the roster document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterOptions {
    /// Page heading, also used as the document title.
    pub title: String,
}

impl Default for RosterOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

pub const DEFAULT_TITLE: &str = "Keysigning Party";
