//! Field-role detection for field-tagged collection records.
//!
//! A collection note is a list of fields plus (usually) a schema naming each
//! field. Roles are assigned by an ordered list of name predicates; the first
//! field in schema order matching a rule wins that role.

use std::collections::HashMap;

use serde::Deserialize;

use super::{RawEntry, clean_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    Word,
    Meaning,
    Synonym,
    Phonetic,
    ExampleSource,
    ExampleTarget,
}

/// One declared field of a note schema.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub ord: usize,
}

impl FieldDef {
    #[must_use]
    pub fn new(name: impl Into<String>, ord: usize) -> Self {
        Self {
            name: name.into(),
            ord,
        }
    }
}

struct RoleRule {
    role: FieldRole,
    matches: fn(&str) -> bool,
}

const WORD_PREFIXES: &[&str] = &["word", "front", "term", "expression", "vocab"];
const MEANING_PREFIXES: &[&str] = &[
    "persian",
    "meaning",
    "definition",
    "back",
    "answer",
    "translation",
    "farsi",
];
const PHONETIC_PREFIXES: &[&str] = &["phonetic", "pronunciation", "ipa", "audio"];
const EXAMPLE_PREFIXES: &[&str] = &["example", "sentence", "context"];
const TARGET_LANGUAGE_MARKERS: &[&str] = &["persian", "farsi"];

fn starts_with_any(name: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| name.starts_with(p))
}

fn contains_any(name: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| name.contains(n))
}

fn is_word_field(name: &str) -> bool {
    starts_with_any(name, WORD_PREFIXES)
}

fn is_meaning_field(name: &str) -> bool {
    starts_with_any(name, MEANING_PREFIXES)
}

fn is_synonym_field(name: &str) -> bool {
    name.contains("synonym")
}

fn is_phonetic_field(name: &str) -> bool {
    starts_with_any(name, PHONETIC_PREFIXES)
}

fn is_example_source(name: &str) -> bool {
    starts_with_any(name, EXAMPLE_PREFIXES) && !contains_any(name, TARGET_LANGUAGE_MARKERS)
}

fn is_example_target(name: &str) -> bool {
    (starts_with_any(name, EXAMPLE_PREFIXES) && contains_any(name, TARGET_LANGUAGE_MARKERS))
        || (starts_with_any(name, TARGET_LANGUAGE_MARKERS)
            && contains_any(name, &["example", "sentence"]))
}

const ROLE_RULES: &[RoleRule] = &[
    RoleRule {
        role: FieldRole::Word,
        matches: is_word_field,
    },
    RoleRule {
        role: FieldRole::Meaning,
        matches: is_meaning_field,
    },
    RoleRule {
        role: FieldRole::Synonym,
        matches: is_synonym_field,
    },
    RoleRule {
        role: FieldRole::Phonetic,
        matches: is_phonetic_field,
    },
    RoleRule {
        role: FieldRole::ExampleSource,
        matches: is_example_source,
    },
    RoleRule {
        role: FieldRole::ExampleTarget,
        matches: is_example_target,
    },
];

/// Role → field ordinal mapping for one schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleMap {
    slots: HashMap<FieldRole, usize>,
}

impl RoleMap {
    #[must_use]
    pub fn get(&self, role: FieldRole) -> Option<usize> {
        self.slots.get(&role).copied()
    }
}

/// Evaluate the ordered role rules against a schema. Field names compare case-insensitively.
#[must_use]
pub fn resolve_roles(schema: &[FieldDef]) -> RoleMap {
    let lowered: Vec<(String, usize)> = schema
        .iter()
        .map(|f| (f.name.trim().to_lowercase(), f.ord))
        .collect();

    let slots = ROLE_RULES
        .iter()
        .filter_map(|rule| {
            lowered
                .iter()
                .find(|(name, _)| (rule.matches)(name))
                .map(|(_, ord)| (rule.role, *ord))
        })
        .collect();

    RoleMap { slots }
}

/// Wrapped in `/…/` or `[…]`, the usual shape of an IPA transcription.
#[must_use]
pub fn is_phonetic_shaped(text: &str) -> bool {
    let starts = text.starts_with('/') || text.starts_with('[');
    let ends = text.ends_with('/') || text.ends_with(']');
    starts && ends && text.chars().count() >= 2
}

/// Map one note's raw fields onto a [`RawEntry`].
///
/// With a non-empty `schema` roles come from [`resolve_roles`] and fall back to
/// positions; without one, fields are taken positionally as word, meaning,
/// phonetic. Either way a phonetic-shaped meaning is shifted into `phonetic`.
#[must_use]
pub fn resolve_record(fields: &[String], schema: Option<&[FieldDef]>) -> RawEntry {
    let field = |idx: usize| fields.get(idx).map(|f| clean_text(f)).unwrap_or_default();

    match schema.filter(|s| !s.is_empty()) {
        Some(schema) => resolve_with_schema(&field, &resolve_roles(schema)),
        None => resolve_positional(fields.len(), &field),
    }
}

fn resolve_with_schema(field: &dyn Fn(usize) -> String, roles: &RoleMap) -> RawEntry {
    let by_role = |role| roles.get(role).map(field).unwrap_or_default();

    let mut word = by_role(FieldRole::Word);
    if word.is_empty() {
        word = field(0);
    }

    let synonym = by_role(FieldRole::Synonym);
    let mut meaning = by_role(FieldRole::Meaning);
    let mut synonyms = Vec::new();
    if meaning.is_empty() {
        meaning = synonym;
    } else if !synonym.is_empty() {
        synonyms = synonym
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if meaning.is_empty() {
        meaning = if is_phonetic_shaped(&field(1)) {
            field(2)
        } else {
            field(1)
        };
    }

    let mut phonetic = by_role(FieldRole::Phonetic);
    if phonetic.is_empty() && is_phonetic_shaped(&meaning) {
        phonetic = meaning;
        meaning = field(2);
    }

    RawEntry {
        word,
        phonetic,
        meaning,
        synonyms,
        example_source: by_role(FieldRole::ExampleSource),
        example_target: by_role(FieldRole::ExampleTarget),
    }
}

fn resolve_positional(len: usize, field: &dyn Fn(usize) -> String) -> RawEntry {
    if len < 2 {
        return RawEntry::default();
    }

    let mut meaning = field(1);
    let mut phonetic = field(2);
    if !phonetic.is_empty() && is_phonetic_shaped(&meaning) {
        std::mem::swap(&mut meaning, &mut phonetic);
    }

    RawEntry::new(field(0), phonetic, meaning)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    #[test]
    fn roles_follow_rule_priority_and_schema_order() {
        let schema = vec![
            FieldDef::new("Front", 0),
            FieldDef::new("IPA", 1),
            FieldDef::new("Persian", 2),
            FieldDef::new("Example", 3),
            FieldDef::new("Example Persian", 4),
            FieldDef::new("Synonyms", 5),
        ];
        let roles = resolve_roles(&schema);
        assert_eq!(roles.get(FieldRole::Word), Some(0));
        assert_eq!(roles.get(FieldRole::Phonetic), Some(1));
        assert_eq!(roles.get(FieldRole::Meaning), Some(2));
        assert_eq!(roles.get(FieldRole::ExampleSource), Some(3));
        assert_eq!(roles.get(FieldRole::ExampleTarget), Some(4));
        assert_eq!(roles.get(FieldRole::Synonym), Some(5));
    }

    #[test]
    fn schema_record_uses_named_fields() {
        let schema = vec![
            FieldDef::new("Word", 0),
            FieldDef::new("Pronunciation", 1),
            FieldDef::new("Meaning", 2),
            FieldDef::new("Synonym", 3),
        ];
        let raw = resolve_record(
            &fields(&["<b>abate</b>", "/əˈbeɪt/", "lessen", "subside, wane"]),
            Some(&schema),
        );
        assert_eq!(raw.word, "abate");
        assert_eq!(raw.phonetic, "/əˈbeɪt/");
        assert_eq!(raw.meaning, "lessen");
        assert_eq!(raw.synonyms, vec!["subside".to_owned(), "wane".to_owned()]);
    }

    #[test]
    fn schema_without_meaning_falls_back_to_synonym_then_position() {
        let schema = vec![FieldDef::new("Word", 0), FieldDef::new("Synonyms", 1)];
        let raw = resolve_record(&fields(&["abate", "lessen"]), Some(&schema));
        assert_eq!(raw.meaning, "lessen");

        let schema = vec![FieldDef::new("Text", 0), FieldDef::new("Extra", 1)];
        let raw = resolve_record(&fields(&["abate", "/əˈbeɪt/", "lessen"]), Some(&schema));
        assert_eq!(raw.word, "abate");
        assert_eq!(raw.meaning, "lessen");
    }

    #[test]
    fn phonetic_shaped_meaning_is_shifted_down() {
        let schema = vec![
            FieldDef::new("Word", 0),
            FieldDef::new("Back", 1),
            FieldDef::new("Notes", 2),
        ];
        let raw = resolve_record(&fields(&["cat", "[kæt]", "feline"]), Some(&schema));
        assert_eq!(raw.phonetic, "[kæt]");
        assert_eq!(raw.meaning, "feline");
    }

    #[test]
    fn positional_fallback_and_swap_correction() {
        let raw = resolve_record(&fields(&["cat", "feline", "/kæt/"]), None);
        assert_eq!(
            (raw.word.as_str(), raw.meaning.as_str(), raw.phonetic.as_str()),
            ("cat", "feline", "/kæt/")
        );

        let raw = resolve_record(&fields(&["cat", "/kæt/", "feline"]), None);
        assert_eq!(raw.meaning, "feline");
        assert_eq!(raw.phonetic, "/kæt/");
    }

    #[test]
    fn positional_needs_two_fields() {
        assert_eq!(resolve_record(&fields(&["lonely"]), None), RawEntry::default());
    }

    #[test]
    fn phonetic_shape_requires_both_ends() {
        assert!(is_phonetic_shaped("/kæt/"));
        assert!(is_phonetic_shaped("[kæt]"));
        assert!(!is_phonetic_shaped("/kæt"));
        assert!(!is_phonetic_shaped("/"));
    }
}
