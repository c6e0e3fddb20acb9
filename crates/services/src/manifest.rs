//! Bundled collection manifest and run lookup.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ManifestError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionFormat {
    /// One JSON run file per run under `<name>/<run>.json`.
    #[default]
    #[serde(alias = "json")]
    Plain,
    /// A single flashcard archive covering every run.
    #[serde(alias = "apkg")]
    Archive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntry {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(rename = "sessions", default, deserialize_with = "run_labels")]
    pub runs: Vec<String>,
    #[serde(default)]
    pub format: CollectionFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// Where the entries of one run live, relative to the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunSource {
    Archive { file_name: String },
    Plain { path: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionManifest {
    #[serde(rename = "books", default)]
    pub collections: Vec<CollectionEntry>,
}

impl CollectionManifest {
    /// # Errors
    ///
    /// Returns `ManifestError::Parse` for malformed JSON.
    pub fn from_json(text: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(text)?)
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&CollectionEntry> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// Resolve a `(collection, run)` pair to its source.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError` for unknown collections or runs, or an archive
    /// collection without a file name.
    pub fn locate(&self, collection: &str, run: &str) -> Result<RunSource, ManifestError> {
        let entry = self
            .find(collection)
            .ok_or_else(|| ManifestError::UnknownCollection(collection.to_owned()))?;
        if !entry.runs.iter().any(|r| r == run) {
            return Err(ManifestError::UnknownRun {
                collection: collection.to_owned(),
                run: run.to_owned(),
            });
        }

        match entry.format {
            CollectionFormat::Archive => entry
                .file_name
                .clone()
                .map(|file_name| RunSource::Archive { file_name })
                .ok_or_else(|| ManifestError::MissingFileName(entry.name.clone())),
            CollectionFormat::Plain => Ok(RunSource::Plain {
                path: format!("{}/{run}.json", entry.name),
            }),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RunLabel {
    Text(String),
    Number(serde_json::Number),
}

/// Run labels may be written as strings or numbers.
fn run_labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let labels = Vec::<RunLabel>::deserialize(deserializer)?;
    Ok(labels
        .into_iter()
        .map(|label| match label {
            RunLabel::Text(s) => s,
            RunLabel::Number(n) => n.to_string(),
        })
        .collect())
}
