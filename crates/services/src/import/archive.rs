//! Flashcard archive import: a zip holding a SQLite collection database.

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};

use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use vocab_core::normalize::{FieldDef, RawEntry, resolve_record};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::ImportError;

/// Collection members in order of preference.
const COLLECTION_MEMBERS: &[&str] = &["collection.anki21", "collection.anki2"];
const FIELD_SEPARATOR: char = '\x1f';

#[derive(Debug, Deserialize)]
struct NoteModel {
    #[serde(default)]
    flds: Vec<FieldDef>,
}

/// Pull the collection database bytes out of an archive.
///
/// # Errors
///
/// Returns `ImportError::Zip` for unreadable archives and
/// `ImportError::MissingCollection` when no known member is present.
pub fn extract_collection(bytes: &[u8]) -> Result<Vec<u8>, ImportError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    for name in COLLECTION_MEMBERS {
        match archive.by_name(name) {
            Ok(mut member) => {
                tracing::debug!(member = name, "reading collection database");
                let mut db = Vec::new();
                member.read_to_end(&mut db)?;
                return Ok(db);
            }
            Err(ZipError::FileNotFound) => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Err(ImportError::MissingCollection)
}

/// Read every note of an archive as a raw record.
///
/// Note schemas come from `col.models`; when that cannot be read every note is
/// resolved positionally.
///
/// # Errors
///
/// Returns `ImportError` if the archive, the database or its `notes` table
/// cannot be read.
pub async fn parse_archive(bytes: &[u8]) -> Result<Vec<RawEntry>, ImportError> {
    let db = extract_collection(bytes)?;

    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(&db)?;
    file.flush()?;

    let options = SqliteConnectOptions::new()
        .filename(file.path())
        .read_only(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    let models = read_models(&pool).await;
    let notes = sqlx::query_as::<_, (String, i64)>("SELECT flds, mid FROM notes")
        .fetch_all(&pool)
        .await
        .map_err(|e| ImportError::parse("archive notes", e));
    pool.close().await;
    let notes = notes?;
    tracing::debug!(notes = notes.len(), models = models.len(), "archive notes read");

    Ok(notes
        .iter()
        .map(|(flds, mid)| {
            let fields: Vec<String> = flds.split(FIELD_SEPARATOR).map(str::to_owned).collect();
            resolve_record(&fields, models.get(mid).map(Vec::as_slice))
        })
        .collect())
}

async fn read_models(pool: &SqlitePool) -> HashMap<i64, Vec<FieldDef>> {
    let raw = match sqlx::query_scalar::<_, String>("SELECT models FROM col")
        .fetch_optional(pool)
        .await
    {
        Ok(Some(raw)) => raw,
        Ok(None) => return HashMap::new(),
        Err(err) => {
            tracing::warn!(error = %err, "could not read note models, using field positions");
            return HashMap::new();
        }
    };

    match serde_json::from_str::<HashMap<String, NoteModel>>(&raw) {
        Ok(models) => models
            .into_iter()
            .filter_map(|(id, model)| {
                let mut fields = model.flds;
                fields.sort_by_key(|f| f.ord);
                id.parse().ok().map(|id| (id, fields))
            })
            .collect(),
        Err(err) => {
            tracing::warn!(error = %err, "note models are not valid JSON, using field positions");
            HashMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip::write::SimpleFileOptions;

    fn zip_with(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in members {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn prefers_newer_collection_member() {
        let bytes = zip_with(&[
            ("collection.anki2", b"old"),
            ("collection.anki21", b"new"),
        ]);
        assert_eq!(extract_collection(&bytes).unwrap(), b"new");

        let bytes = zip_with(&[("collection.anki2", b"old")]);
        assert_eq!(extract_collection(&bytes).unwrap(), b"old");
    }

    #[test]
    fn missing_collection_is_reported() {
        let bytes = zip_with(&[("media", b"{}")]);
        assert!(matches!(
            extract_collection(&bytes),
            Err(ImportError::MissingCollection)
        ));
    }

    #[test]
    fn garbage_is_a_zip_error() {
        assert!(matches!(
            extract_collection(b"not a zip"),
            Err(ImportError::Zip(_))
        ));
    }
}
