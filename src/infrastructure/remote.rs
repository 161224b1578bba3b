//! Remote document store and blob storage capabilities
//!
//! The remote backend is consumed through two traits: a document collection
//! keyed by opaque ids, and a blob store that turns uploaded bytes into a
//! resolvable URL. `DirectoryRemote` implements both on top of a directory
//! (a mounted or synced folder); `MemoryRemote` keeps everything in process.

use crate::error::{DiaryError, Result};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use url::Url;
use uuid::Uuid;
use walkdir::WalkDir;

/// Stored fields of a document
pub type Fields = Map<String, Value>;

/// A document together with the id the store assigned to it
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

/// Collection/document CRUD
pub trait DocumentStore {
    /// Capability probe: `true` once the store is initialized and usable
    fn is_ready(&self) -> bool;

    /// Insert a new document, returning its assigned id
    fn insert(&self, collection: &str, fields: Fields) -> Result<String>;

    /// Write a document under a caller-chosen id, replacing any existing one
    fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<()>;

    fn exists(&self, collection: &str, id: &str) -> Result<bool>;

    /// Every document in `collection`
    fn list(&self, collection: &str) -> Result<Vec<Document>>;

    /// Overwrite the given fields of an existing document. A `null` value
    /// removes the field. Returns `false` when the document does not exist.
    fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<bool>;

    /// Delete a document; deleting a missing document is not an error
    fn delete(&self, collection: &str, id: &str) -> Result<()>;
}

/// Binary uploads
pub trait BlobStorage {
    /// Store `bytes` under `name` and return a stable URL that resolves to them
    fn upload(&self, name: &str, bytes: &[u8], mime: &str) -> Result<String>;
}

fn merge_fields(target: &mut Fields, updates: Fields) {
    for (key, value) in updates {
        if value.is_null() {
            target.remove(&key);
        } else {
            target.insert(key, value);
        }
    }
}

fn without_nulls(fields: Fields) -> Fields {
    fields.into_iter().filter(|(_, v)| !v.is_null()).collect()
}

fn check_segment(kind: &str, value: &str) -> Result<()> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(DiaryError::Backend(format!("Invalid {} name: '{}'", kind, value)))
    }
}

/// Remote store backed by a directory:
///
/// ```text
/// <root>/
///   posts/<id>.json        # one document per file
///   blobs/posts/<name>     # uploaded images
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryRemote {
    root: PathBuf,
}

impl DirectoryRemote {
    pub fn new(root: PathBuf) -> Self {
        DirectoryRemote { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: &str) -> Result<PathBuf> {
        check_segment("collection", collection)?;
        Ok(self.root.join(collection))
    }

    fn document_path(&self, collection: &str, id: &str) -> Result<PathBuf> {
        check_segment("document", id)?;
        Ok(self.collection_dir(collection)?.join(format!("{}.json", id)))
    }

    fn read_document(path: &Path) -> Result<Fields> {
        let contents = fs::read_to_string(path)?;
        match serde_json::from_str::<Value>(&contents)? {
            Value::Object(fields) => Ok(fields),
            _ => Err(DiaryError::Backend(format!(
                "Document is not an object: {}",
                path.display()
            ))),
        }
    }

    fn write_document(path: &Path, fields: &Fields) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(fields)?)?;
        Ok(())
    }
}

impl DocumentStore for DirectoryRemote {
    fn is_ready(&self) -> bool {
        self.root.is_dir()
    }

    fn insert(&self, collection: &str, fields: Fields) -> Result<String> {
        let id = Uuid::new_v4().simple().to_string()[..20].to_string();
        let path = self.document_path(collection, &id)?;
        Self::write_document(&path, &without_nulls(fields))?;
        tracing::debug!(collection, id = %id, "Inserted remote document");
        Ok(id)
    }

    fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        let path = self.document_path(collection, id)?;
        Self::write_document(&path, &without_nulls(fields))?;
        tracing::debug!(collection, id, "Wrote remote document");
        Ok(())
    }

    fn exists(&self, collection: &str, id: &str) -> Result<bool> {
        Ok(self.document_path(collection, id)?.is_file())
    }

    fn list(&self, collection: &str) -> Result<Vec<Document>> {
        let dir = self.collection_dir(collection)?;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut documents = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| DiaryError::Backend(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(id) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_suffix(".json"))
            else {
                continue;
            };

            match Self::read_document(path) {
                Ok(fields) => documents.push(Document {
                    id: id.to_string(),
                    fields,
                }),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable document"),
            }
        }

        Ok(documents)
    }

    fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<bool> {
        let path = self.document_path(collection, id)?;
        if !path.is_file() {
            return Ok(false);
        }

        let mut existing = Self::read_document(&path)?;
        merge_fields(&mut existing, fields);
        Self::write_document(&path, &existing)?;
        tracing::debug!(collection, id, "Updated remote document");
        Ok(true)
    }

    fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let path = self.document_path(collection, id)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(collection, id, "Deleted remote document");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DiaryError::Io(e)),
        }
    }
}

impl BlobStorage for DirectoryRemote {
    fn upload(&self, name: &str, bytes: &[u8], _mime: &str) -> Result<String> {
        let relative = Path::new(name);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if name.is_empty() || !safe {
            return Err(DiaryError::Backend(format!("Invalid blob name: '{}'", name)));
        }

        let root = fs::canonicalize(&self.root)?;
        let path = root.join("blobs").join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;

        let url = Url::from_file_path(&path).map_err(|_| {
            DiaryError::Backend(format!("Cannot build a URL for {}", path.display()))
        })?;
        tracing::debug!(name, size = bytes.len(), "Uploaded blob");
        Ok(url.to_string())
    }
}

/// In-process remote store
#[derive(Debug)]
pub struct MemoryRemote {
    ready: bool,
    next_id: Mutex<u64>,
    documents: Mutex<BTreeMap<(String, String), Fields>>,
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemote {
    pub fn new() -> Self {
        MemoryRemote {
            ready: true,
            next_id: Mutex::new(0),
            documents: Mutex::new(BTreeMap::new()),
            blobs: Mutex::new(HashMap::new()),
        }
    }

    /// A store whose readiness probe never succeeds
    pub fn unavailable() -> Self {
        MemoryRemote {
            ready: false,
            ..Self::new()
        }
    }

    /// Bytes uploaded under `name`
    pub fn blob(&self, name: &str) -> Option<Vec<u8>> {
        self.blobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl DocumentStore for MemoryRemote {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn insert(&self, collection: &str, fields: Fields) -> Result<String> {
        let mut next_id = self.next_id.lock().unwrap_or_else(|e| e.into_inner());
        let mut documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());

        // Skip ids already taken by `set`
        let id = loop {
            *next_id += 1;
            let id = format!("doc{}", *next_id);
            if !documents.contains_key(&(collection.to_string(), id.clone())) {
                break id;
            }
        };

        documents.insert((collection.to_string(), id.clone()), without_nulls(fields));
        Ok(id)
    }

    fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        check_segment("document", id)?;
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((collection.to_string(), id.to_string()), without_nulls(fields));
        Ok(())
    }

    fn exists(&self, collection: &str, id: &str) -> Result<bool> {
        Ok(self
            .documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&(collection.to_string(), id.to_string())))
    }

    fn list(&self, collection: &str) -> Result<Vec<Document>> {
        let documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        Ok(documents
            .iter()
            .filter(|((c, _), _)| c == collection)
            .map(|((_, id), fields)| Document {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect())
    }

    fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<bool> {
        let mut documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        match documents.get_mut(&(collection.to_string(), id.to_string())) {
            Some(existing) => {
                merge_fields(existing, fields);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&(collection.to_string(), id.to_string()));
        Ok(())
    }
}

impl BlobStorage for MemoryRemote {
    fn upload(&self, name: &str, bytes: &[u8], _mime: &str) -> Result<String> {
        self.blobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), bytes.to_vec());
        Ok(format!("memory://blobs/{}", name))
    }
}
