// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Blob store for receipts and documents attached to records.

use crate::config::current_user;
use crate::error::CrmError;
use crate::models::Attachment;
use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const ENTITIES: &[&str] = &[
    "company_expense",
    "client_expense",
    "client_income",
    "invoice",
    "project",
    "client",
    "lead",
];

/// Directory-backed bucket. Object paths are relative, slash-separated keys.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        BlobStore { root: root.into() }
    }

    pub fn open_default() -> Result<Self> {
        Ok(BlobStore::new(crate::db::data_dir()?.join("files")))
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let rel = Path::new(key);
        if key.is_empty()
            || rel
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(CrmError::validation(format!("invalid object path '{}'", key)).into());
        }
        Ok(self.root.join(rel))
    }

    /// Copies `file` into the bucket under `key`. Existing objects are not overwritten.
    pub fn upload(&self, key: &str, file: &Path) -> Result<()> {
        let dest = self.resolve(key)?;
        if dest.exists() {
            return Err(CrmError::validation(format!("object '{}' already exists", key)).into());
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Create {}", parent.display()))?;
        }
        fs::copy(file, &dest)
            .with_context(|| format!("Upload {} to {}", file.display(), key))?;
        log::info!("stored {} as {}", file.display(), key);
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;
        fs::remove_file(&path).with_context(|| format!("Remove {}", key))?;
        Ok(())
    }

    /// `file://` URL of an object. Does not check that the object exists.
    pub fn public_url(&self, key: &str) -> Result<String> {
        let path = self.resolve(key)?;
        let abs = if path.is_absolute() {
            path
        } else {
            std::env::current_dir()?.join(path)
        };
        Ok(format!("file://{}", abs.display()))
    }
}

fn object_key(entity: &str, entity_id: i64, file_name: &str) -> String {
    format!("{}/{}/{}", entity, entity_id, file_name)
}

/// Uploads a file and links it to a record. Returns the attachment id.
pub fn attach(
    conn: &Connection,
    store: &BlobStore,
    entity: &str,
    entity_id: i64,
    file: &Path,
) -> Result<i64> {
    if !ENTITIES.contains(&entity) {
        return Err(CrmError::UnknownVariant {
            kind: "attachment entity",
            value: entity.to_string(),
        }
        .into());
    }
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CrmError::validation(format!("'{}' has no file name", file.display())))?
        .to_string();
    let key = object_key(entity, entity_id, &file_name);
    let user = current_user(conn)?;
    store.upload(&key, file)?;
    let inserted = conn.execute(
        "INSERT INTO attachments(entity, entity_id, path, file_name, user_id) VALUES (?1,?2,?3,?4,?5)",
        params![entity, entity_id, key, file_name, user],
    );
    if let Err(err) = inserted {
        // The object must not outlive a failed insert.
        if let Err(cleanup) = store.remove(&key) {
            log::warn!("could not remove orphaned object {}: {:#}", key, cleanup);
        }
        return Err(anyhow::Error::new(err).context(format!("Record attachment {}", key)));
    }
    Ok(conn.last_insert_rowid())
}

pub fn list_attachments(
    conn: &Connection,
    entity: Option<&str>,
    entity_id: Option<i64>,
) -> Result<Vec<Attachment>> {
    let mut stmt = conn.prepare(
        "SELECT id, entity, entity_id, path, file_name FROM attachments \
         WHERE (?1 IS NULL OR entity=?1) AND (?2 IS NULL OR entity_id=?2) ORDER BY id",
    )?;
    let rows = stmt.query_map(params![entity, entity_id], |r| {
        Ok(Attachment {
            id: r.get(0)?,
            entity: r.get(1)?,
            entity_id: r.get(2)?,
            path: r.get(3)?,
            file_name: r.get(4)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn get_attachment(conn: &Connection, id: i64) -> Result<Attachment> {
    list_attachments(conn, None, None)?
        .into_iter()
        .find(|a| a.id == id)
        .ok_or_else(|| CrmError::not_found("Attachment", id).into())
}
