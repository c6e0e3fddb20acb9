//! Turns heterogeneous parsed records into session-ready [`Entry`] values.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Entry, Examples};

pub mod roles;

pub use roles::{FieldDef, FieldRole, RoleMap, resolve_record, resolve_roles};

/// Stub note text some collection exports contain instead of real cards.
pub const UPGRADE_PLACEHOLDER: &str = "Please update to the latest Anki version";

static SOUND_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[sound:[^\]]*\]").expect("sound tag pattern"));
static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("markup tag pattern"));
static SPACE_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(?:nbsp|#160|ensp|emsp);").expect("entity pattern"));

/// A record as produced by a source parser, before cleaning and validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub word: String,
    pub phonetic: String,
    pub meaning: String,
    pub synonyms: Vec<String>,
    pub example_source: String,
    pub example_target: String,
}

impl RawEntry {
    #[must_use]
    pub fn new(
        word: impl Into<String>,
        phonetic: impl Into<String>,
        meaning: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into(),
            phonetic: phonetic.into(),
            meaning: meaning.into(),
            ..Self::default()
        }
    }
}

/// Remove audio directives, markup tags and space entities, then trim.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    let text = SOUND_TAG.replace_all(raw, "");
    let text = MARKUP_TAG.replace_all(&text, "");
    let text = SPACE_ENTITY.replace_all(&text, " ");
    text.trim().to_owned()
}

#[must_use]
pub fn is_upgrade_placeholder(text: &str) -> bool {
    text.contains(UPGRADE_PLACEHOLDER)
}

/// Clean every record and keep the usable ones, in input order.
///
/// Records with an empty word or meaning, or carrying the upgrade placeholder,
/// are dropped. Duplicate words are kept as distinct entries.
pub fn normalize<I>(raw: I) -> Vec<Entry>
where
    I: IntoIterator<Item = RawEntry>,
{
    raw.into_iter().filter_map(normalize_one).collect()
}

fn normalize_one(raw: RawEntry) -> Option<Entry> {
    let word = clean_text(&raw.word);
    let meaning = clean_text(&raw.meaning);
    if is_upgrade_placeholder(&word) || is_upgrade_placeholder(&meaning) {
        return None;
    }

    let synonyms = raw
        .synonyms
        .iter()
        .map(|s| clean_text(s))
        .filter(|s| !s.is_empty())
        .collect();
    let examples = Examples::new(
        clean_text(&raw.example_source),
        clean_text(&raw.example_target),
    );

    Entry::new(word, clean_text(&raw.phonetic), meaning)
        .ok()
        .map(|entry| entry.with_synonyms(synonyms).with_examples(examples))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_strips_noise() {
        assert_eq!(
            clean_text(" <b>abandon</b>[sound:abandon.mp3]&nbsp;"),
            "abandon"
        );
        assert_eq!(clean_text("to&nbsp;leave<br/>behind"), "to leavebehind");
        assert_eq!(clean_text("a&#160;b"), "a b");
    }

    #[test]
    fn normalize_drops_unusable_records_and_keeps_order() {
        let raw = vec![
            RawEntry::new("  zeal ", "/ziːl/", " eagerness "),
            RawEntry::new("", "", ""),
            RawEntry::new("orphan", "", "   "),
            RawEntry::new("<i></i>", "", "markup only"),
            RawEntry::new("abate", "", "lessen"),
            RawEntry::new("zeal", "", "duplicate kept"),
        ];

        let entries = normalize(raw);
        let words: Vec<_> = entries.iter().map(Entry::word).collect();
        assert_eq!(words, vec!["zeal", "abate", "zeal"]);
        assert_eq!(entries[0].meaning(), "eagerness");
        assert_eq!(entries[0].phonetic(), "/ziːl/");
    }

    #[test]
    fn normalize_discards_upgrade_placeholder() {
        let raw = vec![
            RawEntry::new(
                "Please update to the latest Anki version, then import again.",
                "",
                "x",
            ),
            RawEntry::new("real", "", UPGRADE_PLACEHOLDER),
            RawEntry::new("kept", "", "yes"),
        ];
        let entries = normalize(raw);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].word(), "kept");
    }

    #[test]
    fn normalize_carries_optional_metadata() {
        let mut raw = RawEntry::new("abate", "", "lessen");
        raw.synonyms = vec![" subside ".into(), String::new(), "wane".into()];
        raw.example_source = "The storm <b>abated</b>.".into();

        let entry = normalize(vec![raw]).remove(0);
        assert_eq!(entry.synonyms(), ["subside".to_owned(), "wane".to_owned()]);
        let examples = entry.examples().unwrap();
        assert_eq!(examples.source, "The storm abated.");
        assert_eq!(examples.target, "");
    }
}
