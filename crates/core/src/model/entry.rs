use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EntryError {
    #[error("entry word must not be empty")]
    EmptyWord,

    #[error("entry meaning must not be empty")]
    EmptyMeaning,
}

//
// ─── EXAMPLES ─────────────────────────────────────────────────────────────────
//

/// Example sentences, one per language side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Examples {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
}

impl Examples {
    /// Returns `None` when both sides are empty.
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Option<Self> {
        let source = source.into();
        let target = target.into();
        if source.is_empty() && target.is_empty() {
            return None;
        }
        Some(Self { source, target })
    }
}

//
// ─── ENTRY ────────────────────────────────────────────────────────────────────
//

/// One vocabulary item: a source-side `word`, a target-side `meaning`, and
/// optional metadata.
///
/// `correct_streak` is only set once the entry has been sent to the drill pile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    word: String,
    #[serde(default)]
    phonetic: String,
    meaning: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    synonyms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    examples: Option<Examples>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    correct_streak: Option<u32>,
}

impl Entry {
    /// Build an entry from already-cleaned text. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns `EntryError` if `word` or `meaning` is blank.
    pub fn new(
        word: impl Into<String>,
        phonetic: impl Into<String>,
        meaning: impl Into<String>,
    ) -> Result<Self, EntryError> {
        let word = word.into().trim().to_owned();
        let meaning = meaning.into().trim().to_owned();
        if word.is_empty() {
            return Err(EntryError::EmptyWord);
        }
        if meaning.is_empty() {
            return Err(EntryError::EmptyMeaning);
        }

        Ok(Self {
            word,
            phonetic: phonetic.into().trim().to_owned(),
            meaning,
            synonyms: Vec::new(),
            examples: None,
            correct_streak: None,
        })
    }

    #[must_use]
    pub fn with_synonyms(mut self, synonyms: Vec<String>) -> Self {
        self.synonyms = synonyms;
        self
    }

    #[must_use]
    pub fn with_examples(mut self, examples: Option<Examples>) -> Self {
        self.examples = examples;
        self
    }

    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    #[must_use]
    pub fn phonetic(&self) -> &str {
        &self.phonetic
    }

    #[must_use]
    pub fn meaning(&self) -> &str {
        &self.meaning
    }

    #[must_use]
    pub fn synonyms(&self) -> &[String] {
        &self.synonyms
    }

    #[must_use]
    pub fn examples(&self) -> Option<&Examples> {
        self.examples.as_ref()
    }

    #[must_use]
    pub fn correct_streak(&self) -> Option<u32> {
        self.correct_streak
    }

    pub(crate) fn with_streak(&self, streak: u32) -> Self {
        Self {
            correct_streak: Some(streak),
            ..self.clone()
        }
    }

    pub(crate) fn without_streak(&self) -> Self {
        Self {
            correct_streak: None,
            ..self.clone()
        }
    }

    /// Checks the constructor invariants; used on rehydrated state.
    pub(crate) fn is_well_formed(&self) -> bool {
        !self.word.trim().is_empty() && !self.meaning.trim().is_empty()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_rejects_blank_sides() {
        assert_eq!(Entry::new("  ", "", "x").unwrap_err(), EntryError::EmptyWord);
        assert_eq!(
            Entry::new("cat", "", "\t").unwrap_err(),
            EntryError::EmptyMeaning
        );
    }

    #[test]
    fn entry_trims_text() {
        let entry = Entry::new(" cat ", " /kæt/ ", " گربه ").unwrap();
        assert_eq!(entry.word(), "cat");
        assert_eq!(entry.phonetic(), "/kæt/");
        assert_eq!(entry.meaning(), "گربه");
        assert_eq!(entry.correct_streak(), None);
    }

    #[test]
    fn streak_is_omitted_from_json_until_set() {
        let entry = Entry::new("cat", "", "feline").unwrap();
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("correctStreak"));

        let json = serde_json::to_string(&entry.with_streak(1)).unwrap();
        assert!(json.contains("\"correctStreak\":1"));
    }

    #[test]
    fn examples_require_one_side() {
        assert!(Examples::new("", "").is_none());
        assert!(Examples::new("A cat sat.", "").is_some());
    }
}
