use askama::Template;
use chrono::NaiveDateTime;

use crate::error::Result;
use crate::types::{Algorithm, KeyRecord, RosterOptions};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const FINGERPRINT_GROUP_LEN: usize = 4;
// Wrap at the 16-character mark, four groups per line. gpg's own output
// splits 40-character fingerprints five and five; the roster does not.
const FINGERPRINT_GROUPS_PER_LINE: usize = 4;

/// The roster document. Every text field is HTML-escaped by the template.
#[derive(Template)]
#[template(path = "roster.html")]
pub struct Roster<'a> {
    title: &'a str,
    generated: String,
    rows: Vec<RosterRow<'a>>,
}

struct RosterRow<'a> {
    sequence: usize,
    key_id: &'a str,
    owner: &'a str,
    fingerprint: String,
    size_bits: &'a str,
    algorithm: Algorithm,
}

impl<'a> RosterRow<'a> {
    fn from_record(record: &'a KeyRecord) -> Self {
        Self {
            sequence: record.sequence,
            key_id: &record.key_id,
            owner: &record.owner,
            fingerprint: pretty_fingerprint(&record.fingerprint),
            size_bits: &record.size_bits,
            algorithm: record.algorithm,
        }
    }
}

impl<'a> Roster<'a> {
    /// `generated` is printed in the footer as `yyyy-MM-dd HH:mm:ss`.
    pub fn new<I>(records: I, generated: NaiveDateTime, options: &'a RosterOptions) -> Self
    where
        I: IntoIterator<Item = &'a KeyRecord>,
    {
        Self {
            title: &options.title,
            generated: generated.format(TIMESTAMP_FORMAT).to_string(),
            rows: records.into_iter().map(RosterRow::from_record).collect(),
        }
    }
}

/// Renders a complete HTML roster document.
pub fn render_roster<'a, I>(
    records: I,
    generated: NaiveDateTime,
    options: &'a RosterOptions,
) -> Result<String>
where
    I: IntoIterator<Item = &'a KeyRecord>,
{
    Ok(Roster::new(records, generated, options).render()?)
}

/// Splits a fingerprint into space-separated groups of four characters,
/// breaking the line after the fourth group.
///
/// Every group, including the last, is followed by a space. A trailing
/// group shorter than four characters is printed as-is.
pub fn pretty_fingerprint(fingerprint: &str) -> String {
    let chars: Vec<char> = fingerprint.chars().collect();
    let mut pretty = String::with_capacity(fingerprint.len() * 5 / 4 + 2);

    for (index, group) in chars.chunks(FINGERPRINT_GROUP_LEN).enumerate() {
        pretty.extend(group);
        pretty.push(' ');
        if index + 1 == FINGERPRINT_GROUPS_PER_LINE {
            pretty.push('\n');
        }
    }

    pretty
}
