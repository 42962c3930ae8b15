use std::str::Lines;

use tracing::{debug, warn};

use crate::error::Result;
use crate::types::{Algorithm, KeyListing, KeyRecord};

const SHORT_KEY_ID_LEN: usize = 8;

// Minimum field counts for the record types the roster consumes.
const PUB_MIN_FIELDS: usize = 5;
const FPR_MIN_FIELDS: usize = 10;
const UID_MIN_FIELDS: usize = 10;

/// Parses a complete `--with-colons` key listing into roster records.
pub fn parse_keys(output: &str) -> Result<KeyListing> {
    let mut parser = KeyRecords::new(output);
    let records: Vec<KeyRecord> = parser.by_ref().collect();

    Ok(KeyListing {
        records,
        malformed_lines: parser.malformed_lines(),
        discarded_records: parser.discarded_records(),
    })
}

/// Returns the last 8 characters of a long key id, or the whole id if it
/// is shorter than that.
pub fn short_key_id(long_id: &str) -> &str {
    match long_id.char_indices().rev().nth(SHORT_KEY_ID_LEN - 1) {
        Some((start, _)) => &long_id[start..],
        None => long_id,
    }
}

/// Decodes the `\xHH` escapes gpg uses for `:`, `\\` and control bytes in
/// `--with-colons` fields. Anything that is not a complete escape is kept
/// as-is.
pub fn unescape_field(field: &str) -> String {
    if !field.contains("\\x") {
        return field.to_string();
    }

    let bytes = field.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\'
            && bytes.get(i + 1) == Some(&b'x')
            && let Some(byte) = bytes
                .get(i + 2..i + 4)
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
        {
            decoded.push(byte);
            i += 4;
            continue;
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&decoded).into_owned()
}

/// Lazily yields one [`KeyRecord`] per completed `pub`/`fpr`/`uid` triplet.
///
/// Records are numbered from 1 in the order they complete.
pub struct KeyRecords<'a> {
    lines: Lines<'a>,
    state: ParseState,
    next_sequence: usize,
    malformed: usize,
    discarded: usize,
}

impl<'a> KeyRecords<'a> {
    pub fn new(output: &'a str) -> Self {
        Self {
            lines: output.lines(),
            state: ParseState::default(),
            next_sequence: 1,
            malformed: 0,
            discarded: 0,
        }
    }

    /// Number of lines skipped so far for having too few fields.
    pub fn malformed_lines(&self) -> usize {
        self.malformed
    }

    /// Number of incomplete keys abandoned so far.
    pub fn discarded_records(&self) -> usize {
        self.discarded
    }
}

impl Iterator for KeyRecords<'_> {
    type Item = KeyRecord;

    fn next(&mut self) -> Option<KeyRecord> {
        for line in self.lines.by_ref() {
            let fields: Vec<&str> = line.split(':').collect();
            let (state, transition) = std::mem::take(&mut self.state).advance(&fields);
            self.state = state;

            match transition {
                Transition::Advanced | Transition::Ignored => {}
                Transition::Malformed => {
                    self.malformed += 1;
                    debug!(
                        record_type = fields[0],
                        fields = fields.len(),
                        "skipping record line with too few fields"
                    );
                }
                Transition::Discarded => {
                    self.discarded += 1;
                    warn!("new key started before the previous one had a fingerprint and user id; dropping the incomplete key");
                }
                Transition::Completed {
                    key,
                    fingerprint,
                    owner,
                } => {
                    let record = key.into_record(self.next_sequence, fingerprint, owner);
                    self.next_sequence += 1;
                    return Some(record);
                }
            }
        }

        if self.state != ParseState::AwaitingPub {
            debug!("listing ended with an incomplete key");
        }

        None
    }
}

/// The part of a key captured from its `pub` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingKey {
    pub key_id: String,
    pub algorithm: Algorithm,
    pub size_bits: String,
}

impl PendingKey {
    fn from_pub_fields(fields: &[&str]) -> Option<Self> {
        if fields.len() < PUB_MIN_FIELDS {
            return None;
        }

        Some(Self {
            size_bits: fields[2].to_string(),
            algorithm: Algorithm::from_gpg_code(fields[3]),
            key_id: short_key_id(fields[4]).to_string(),
        })
    }

    fn into_record(self, sequence: usize, fingerprint: String, owner: String) -> KeyRecord {
        KeyRecord {
            sequence,
            key_id: self.key_id,
            algorithm: self.algorithm,
            size_bits: self.size_bits,
            fingerprint,
            owner,
        }
    }
}

/// Where the parser is within the `pub` → `fpr` → `uid` sequence of one key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParseState {
    #[default]
    AwaitingPub,
    AwaitingFingerprint(PendingKey),
    AwaitingIdentity {
        key: PendingKey,
        fingerprint: String,
    },
}

/// What a single line did to the parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The line was consumed and moved the key forward.
    Advanced,
    /// The line's record type is not wanted in the current state.
    Ignored,
    /// A consumed record type had too few fields. The state is unchanged.
    Malformed,
    /// A `pub` line replaced a key that was still in progress.
    Discarded,
    Completed {
        key: PendingKey,
        fingerprint: String,
        owner: String,
    },
}

impl ParseState {
    /// Feeds one colon-split line through the state machine.
    ///
    /// Only `pub`, `fpr` and `uid` are consulted. `fpr` and `uid` lines
    /// arriving outside their phase are ignored.
    pub fn advance(self, fields: &[&str]) -> (Self, Transition) {
        let tag = fields.first().copied().unwrap_or_default();

        if tag == "pub" {
            let Some(key) = PendingKey::from_pub_fields(fields) else {
                return (self, Transition::Malformed);
            };
            let transition = match self {
                Self::AwaitingPub => Transition::Advanced,
                _ => Transition::Discarded,
            };
            return (Self::AwaitingFingerprint(key), transition);
        }

        match (self, tag) {
            (Self::AwaitingFingerprint(key), "fpr") => {
                if fields.len() < FPR_MIN_FIELDS {
                    return (Self::AwaitingFingerprint(key), Transition::Malformed);
                }
                let fingerprint = fields[9].to_string();
                (Self::AwaitingIdentity { key, fingerprint }, Transition::Advanced)
            }
            (Self::AwaitingIdentity { key, fingerprint }, "uid") => {
                if fields.len() < UID_MIN_FIELDS {
                    return (
                        Self::AwaitingIdentity { key, fingerprint },
                        Transition::Malformed,
                    );
                }
                let owner = unescape_field(fields[9]);
                (
                    Self::AwaitingPub,
                    Transition::Completed {
                        key,
                        fingerprint,
                        owner,
                    },
                )
            }
            (state, _) => (state, Transition::Ignored),
        }
    }
}
