use serde::Deserialize;
use vocab_core::normalize::RawEntry;

use crate::error::ImportError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Synonyms {
    Joined(String),
    List(Vec<String>),
}

impl Synonyms {
    fn into_vec(self) -> Vec<String> {
        match self {
            Synonyms::Joined(s) => s.split(',').map(|p| p.trim().to_owned()).collect(),
            Synonyms::List(list) => list,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PlainRecord {
    #[serde(default)]
    word: String,
    #[serde(default)]
    phonetic: Option<String>,
    #[serde(default)]
    meaning: Option<String>,
    #[serde(default)]
    persian: Option<String>,
    #[serde(default)]
    synonyms: Option<Synonyms>,
    #[serde(default)]
    definition: Option<String>,
}

/// Parse a bundled run file: a JSON array of loosely-typed word records.
///
/// # Errors
///
/// Returns `ImportError::Parse` if the text is not a JSON array of objects.
pub fn parse_plain_run(text: &str) -> Result<Vec<RawEntry>, ImportError> {
    let records: Vec<PlainRecord> =
        serde_json::from_str(text).map_err(|e| ImportError::parse("run file", e))?;

    Ok(records
        .into_iter()
        .map(|record| {
            let meaning = record
                .meaning
                .filter(|m| !m.trim().is_empty())
                .or(record.persian)
                .unwrap_or_default();
            RawEntry {
                word: record.word,
                phonetic: record.phonetic.unwrap_or_default(),
                meaning,
                synonyms: record.synonyms.map(Synonyms::into_vec).unwrap_or_default(),
                example_source: record.definition.unwrap_or_default(),
                example_target: String::new(),
            }
        })
        .collect())
}
