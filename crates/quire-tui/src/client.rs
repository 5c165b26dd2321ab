//! Filesystem stash client.
//!
//! Documents are the `*.md` files of the stash directory, ordered by file
//! name. Ids are assigned when the client opens and stay stable for its
//! lifetime. Notes live in a `notes.json` sidecar keyed by file name.

use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
};

use quire_app::{Document, DocumentClient, DocumentId, PAGE_SIZE, User};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// Name of the notes sidecar inside the stash directory.
pub const NOTES_FILE: &str = "notes.json";

/// Stash client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The notes sidecar could not be read or written.
    #[error("notes file is corrupt: {0}")]
    Notes(#[from] serde_json::Error),

    /// No document with this id.
    #[error("no such document: {0}")]
    UnknownDocument(DocumentId),
}

/// On-disk notes, keyed by file name.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct Notes(BTreeMap<String, String>);

#[derive(Debug, Clone)]
struct Entry {
    id: DocumentId,
    file_name: String,
}

impl Entry {
    fn title(&self) -> &str {
        self.file_name.strip_suffix(".md").unwrap_or(&self.file_name)
    }
}

/// Stash backed by a local directory.
#[derive(Debug)]
pub struct LocalClient {
    dir: PathBuf,
    user: Option<User>,
    catalog: RwLock<Vec<Entry>>,
}

impl LocalClient {
    /// Open the stash in `dir`, creating it if needed.
    pub async fn open(dir: impl Into<PathBuf>, user: Option<User>) -> Result<Self, ClientError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str()
                && name.ends_with(".md")
            {
                names.push(name.to_string());
            }
        }
        names.sort();

        let catalog = (1..)
            .zip(names)
            .map(|(id, file_name)| Entry { id, file_name })
            .collect::<Vec<_>>();
        tracing::debug!(dir = %dir.display(), documents = catalog.len(), "opened stash");

        Ok(Self { dir, user, catalog: RwLock::new(catalog) })
    }

    /// Stash directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn entry(&self, id: DocumentId) -> Result<Entry, ClientError> {
        self.catalog
            .read()
            .await
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(ClientError::UnknownDocument(id))
    }

    async fn read_notes(&self) -> Result<Notes, ClientError> {
        match tokio::fs::read(self.dir.join(NOTES_FILE)).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Notes::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_notes(&self, notes: &Notes) -> Result<(), ClientError> {
        let bytes = serde_json::to_vec_pretty(notes)?;
        tokio::fs::write(self.dir.join(NOTES_FILE), bytes).await?;
        Ok(())
    }
}

impl DocumentClient for LocalClient {
    type Error = ClientError;

    fn endpoint(&self) -> String {
        self.dir.display().to_string()
    }

    fn user(&self) -> Option<User> {
        self.user.clone()
    }

    async fn list(&self, after: Option<DocumentId>) -> Result<Vec<Document>, Self::Error> {
        let notes = self.read_notes().await?;
        let catalog = self.catalog.read().await;

        // Catalog is in id order
        Ok(catalog
            .iter()
            .skip_while(|entry| after.is_some_and(|last| entry.id <= last))
            .take(PAGE_SIZE)
            .map(|entry| Document {
                id: entry.id,
                title: entry.title().to_string(),
                note: notes.0.get(&entry.file_name).cloned().unwrap_or_default(),
            })
            .collect())
    }

    async fn fetch(&self, id: DocumentId) -> Result<String, Self::Error> {
        let entry = self.entry(id).await?;
        Ok(tokio::fs::read_to_string(self.dir.join(&entry.file_name)).await?)
    }

    async fn save_note(&self, id: DocumentId, note: &str) -> Result<(), Self::Error> {
        let entry = self.entry(id).await?;
        // Serialize read-modify-write of the sidecar
        let _catalog = self.catalog.write().await;
        let mut notes = self.read_notes().await?;
        if note.is_empty() {
            notes.0.remove(&entry.file_name);
        } else {
            notes.0.insert(entry.file_name, note.to_string());
        }
        self.write_notes(&notes).await
    }

    async fn delete(&self, id: DocumentId) -> Result<(), Self::Error> {
        let mut catalog = self.catalog.write().await;
        let index =
            catalog.iter().position(|e| e.id == id).ok_or(ClientError::UnknownDocument(id))?;
        let entry = catalog.remove(index);
        tokio::fs::remove_file(self.dir.join(&entry.file_name)).await?;

        let mut notes = self.read_notes().await?;
        if notes.0.remove(&entry.file_name).is_some() {
            self.write_notes(&notes).await?;
        }
        tracing::debug!(id, file = %entry.file_name, "deleted document");
        Ok(())
    }
}
