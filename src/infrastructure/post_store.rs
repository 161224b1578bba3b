//! Post persistence over the local key-value store or the remote document store

use crate::domain::data_url::DataUrl;
use crate::domain::Post;
use crate::error::Result;
use crate::infrastructure::backend::Backend;
use crate::infrastructure::kv::KeyValueStore;
use crate::infrastructure::remote::{BlobStorage, Document, DocumentStore, Fields};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::collections::HashSet;
use uuid::Uuid;

/// Key holding the JSON-encoded post collection in local mode
pub const POSTS_KEY: &str = "diary_posts";

/// Remote collection holding one document per post
pub const POSTS_COLLECTION: &str = "posts";

/// Outcome of [`PostStore::replace_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceReport {
    pub deleted: usize,
    pub inserted: usize,
    /// Ids of existing posts that could not be removed
    pub failed_deletes: Vec<String>,
    /// Ids (or `#<position>` for id-less posts) that could not be inserted
    pub failed_inserts: Vec<String>,
}

impl ReplaceReport {
    pub fn is_complete(&self) -> bool {
        self.failed_deletes.is_empty() && self.failed_inserts.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<String> {
        self.failed_deletes
            .iter()
            .chain(self.failed_inserts.iter())
            .cloned()
            .collect()
    }
}

/// Uniform CRUD over the active backend
pub trait PostStore {
    /// Which backend this store writes to
    fn backend(&self) -> Backend;

    /// Every post currently held, in storage order
    fn list(&self) -> Result<Vec<Post>>;

    /// Persist a new post, returning its id
    fn create(&self, post: Post) -> Result<String>;

    /// Fully replace the post with `id`. Unknown ids are a no-op.
    fn update(&self, id: &str, post: Post) -> Result<()>;

    /// Remove the post with `id`. Unknown ids are a no-op.
    fn delete(&self, id: &str) -> Result<()>;

    /// Replace the whole collection with `posts`
    fn replace_all(&self, posts: Vec<Post>) -> Result<ReplaceReport>;

    fn get(&self, id: &str) -> Result<Option<Post>> {
        Ok(self.list()?.into_iter().find(|p| p.id_matches(id)))
    }
}

/// What `diary check` reports about the local collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDataReport {
    /// Size of the stored value, `None` when nothing is stored
    pub stored_bytes: Option<usize>,
    /// Number of posts, or the parse error
    pub parsed: std::result::Result<usize, String>,
}

/// Posts stored as one JSON array under [`POSTS_KEY`]
pub struct LocalPostStore<K> {
    kv: K,
}

impl<K: KeyValueStore> LocalPostStore<K> {
    pub fn new(kv: K) -> Self {
        LocalPostStore { kv }
    }

    /// Read the collection. Missing or unparsable data reads as empty.
    fn read_collection(&self) -> Result<Vec<Post>> {
        let Some(raw) = self.kv.get(POSTS_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<Post>>(&raw) {
            Ok(posts) => Ok(posts),
            Err(e) => {
                tracing::warn!(error = %e, "Stored posts are unreadable, treating collection as empty");
                Ok(Vec::new())
            }
        }
    }

    fn write_collection(&self, posts: &[Post]) -> Result<()> {
        self.kv.set(POSTS_KEY, &serde_json::to_string(posts)?)
    }

    /// Inspect the stored collection without falling back to empty
    pub fn inspect(&self) -> Result<LocalDataReport> {
        let raw = self.kv.get(POSTS_KEY)?;
        let parsed = match &raw {
            None => Ok(0),
            Some(raw) => serde_json::from_str::<Vec<Post>>(raw)
                .map(|posts| posts.len())
                .map_err(|e| e.to_string()),
        };
        Ok(LocalDataReport {
            stored_bytes: raw.map(|r| r.len()),
            parsed,
        })
    }

    /// Remove the stored collection entirely
    pub fn clear(&self) -> Result<()> {
        tracing::info!("Clearing local post collection");
        self.kv.remove(POSTS_KEY)
    }
}

/// Timestamp-derived id, bumped until it is unused
fn next_local_id(taken: &HashSet<String>) -> String {
    let mut candidate = Utc::now().timestamp_millis();
    while taken.contains(&candidate.to_string()) {
        candidate += 1;
    }
    candidate.to_string()
}

impl<K: KeyValueStore> PostStore for LocalPostStore<K> {
    fn backend(&self) -> Backend {
        Backend::Local
    }

    fn list(&self) -> Result<Vec<Post>> {
        self.read_collection()
    }

    fn create(&self, mut post: Post) -> Result<String> {
        let mut posts = self.read_collection()?;

        if let Some(id) = post.id.clone() {
            if let Some(existing) = posts.iter_mut().find(|p| p.id_matches(&id)) {
                *existing = post;
                self.write_collection(&posts)?;
                return Ok(id);
            }
        }

        let id = match post.id.clone() {
            Some(id) => id,
            None => {
                let taken: HashSet<String> = posts.iter().filter_map(|p| p.id.clone()).collect();
                next_local_id(&taken)
            }
        };
        post.id = Some(id.clone());
        posts.push(post);
        self.write_collection(&posts)?;

        tracing::debug!(id = %id, "Created local post");
        Ok(id)
    }

    fn update(&self, id: &str, mut post: Post) -> Result<()> {
        let mut posts = self.read_collection()?;

        match posts.iter_mut().find(|p| p.id_matches(id)) {
            Some(existing) => {
                post.id = Some(id.to_string());
                *existing = post;
                self.write_collection(&posts)?;
                tracing::debug!(id, "Updated local post");
            }
            None => tracing::debug!(id, "Update of unknown local post ignored"),
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut posts = self.read_collection()?;
        let before = posts.len();
        posts.retain(|p| !p.id_matches(id));

        if posts.len() != before {
            self.write_collection(&posts)?;
            tracing::debug!(id, "Deleted local post");
        }
        Ok(())
    }

    fn replace_all(&self, posts: Vec<Post>) -> Result<ReplaceReport> {
        let deleted = self.read_collection()?.len();

        // First occurrence of an id keeps it; missing and repeated ids get fresh ones
        let mut taken = HashSet::new();
        let keeps_id: Vec<bool> = posts
            .iter()
            .map(|p| p.id.as_ref().is_some_and(|id| taken.insert(id.clone())))
            .collect();

        let mut normalized = Vec::with_capacity(posts.len());
        for (mut post, keep) in posts.into_iter().zip(keeps_id) {
            if !keep {
                let id = next_local_id(&taken);
                taken.insert(id.clone());
                post.id = Some(id);
            }
            normalized.push(post);
        }

        self.write_collection(&normalized)?;
        tracing::info!(deleted, inserted = normalized.len(), "Replaced local collection");

        Ok(ReplaceReport {
            deleted,
            inserted: normalized.len(),
            ..Default::default()
        })
    }
}

/// Posts stored as documents, images uploaded to blob storage
pub struct RemotePostStore<R> {
    remote: R,
}

impl<R: DocumentStore + BlobStorage> RemotePostStore<R> {
    pub fn new(remote: R) -> Self {
        RemotePostStore { remote }
    }

    /// Upload a pending data-URL image and return the URL to store instead
    fn resolve_image(&self, post: &Post) -> Result<Option<String>> {
        match post.image.as_deref() {
            Some(image) if post.has_pending_image() => {
                let data = DataUrl::parse(image)?;
                let name = format!(
                    "{}/{}_{}.{}",
                    POSTS_COLLECTION,
                    Utc::now().timestamp_millis(),
                    &Uuid::new_v4().simple().to_string()[..9],
                    data.extension()
                );
                let url = self.remote.upload(&name, &data.bytes, &data.mime)?;
                tracing::debug!(name = %name, url = %url, "Uploaded post image");
                Ok(Some(url))
            }
            other => Ok(other.map(str::to_string)),
        }
    }

    fn to_fields(post: &Post, image: Option<String>) -> Fields {
        let mut fields = Fields::new();
        fields.insert("title".into(), Value::String(post.title.clone()));
        fields.insert("content".into(), Value::String(post.content.clone()));
        fields.insert("createdAt".into(), Value::String(post.created_at.clone()));
        fields.insert("image".into(), image.map(Value::String).unwrap_or(Value::Null));
        fields.insert(
            "updatedAt".into(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        fields
    }

    /// Write a restored post, keeping its id when it has one
    fn restore(&self, post: Post) -> Result<String> {
        match post.id.clone() {
            Some(id) => {
                let image = self.resolve_image(&post)?;
                self.remote
                    .set(POSTS_COLLECTION, &id, Self::to_fields(&post, image))?;
                Ok(id)
            }
            None => self.create(post),
        }
    }

    fn from_document(document: Document) -> Option<Post> {
        let Document { id, mut fields } = document;
        fields.remove("id");
        match serde_json::from_value::<Post>(Value::Object(fields)) {
            Ok(post) => Some(post.with_id(id)),
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "Skipping malformed remote post");
                None
            }
        }
    }
}

impl<R: DocumentStore + BlobStorage> PostStore for RemotePostStore<R> {
    fn backend(&self) -> Backend {
        Backend::Remote
    }

    fn list(&self) -> Result<Vec<Post>> {
        Ok(self
            .remote
            .list(POSTS_COLLECTION)?
            .into_iter()
            .filter_map(Self::from_document)
            .collect())
    }

    fn create(&self, post: Post) -> Result<String> {
        let image = self.resolve_image(&post)?;
        let id = self
            .remote
            .insert(POSTS_COLLECTION, Self::to_fields(&post, image))?;
        tracing::debug!(id = %id, "Created remote post");
        Ok(id)
    }

    fn update(&self, id: &str, post: Post) -> Result<()> {
        // Checked before uploading so an unknown id leaves no orphan blob
        if !self.remote.exists(POSTS_COLLECTION, id)? {
            tracing::warn!(id, "Update of unknown remote post ignored");
            return Ok(());
        }

        let image = self.resolve_image(&post)?;
        let found = self
            .remote
            .update(POSTS_COLLECTION, id, Self::to_fields(&post, image))?;
        if found {
            tracing::debug!(id, "Updated remote post");
        } else {
            tracing::warn!(id, "Remote post disappeared during update");
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.remote.delete(POSTS_COLLECTION, id)
    }

    /// Best effort: failures are collected and the remaining work continues.
    fn replace_all(&self, posts: Vec<Post>) -> Result<ReplaceReport> {
        let mut report = ReplaceReport::default();

        for document in self.remote.list(POSTS_COLLECTION)? {
            match self.remote.delete(POSTS_COLLECTION, &document.id) {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    tracing::warn!(id = %document.id, error = %e, "Failed to delete remote post during restore");
                    report.failed_deletes.push(document.id);
                }
            }
        }

        let mut seen = HashSet::new();
        for (index, mut post) in posts.into_iter().enumerate() {
            let label = post
                .id
                .clone()
                .unwrap_or_else(|| format!("#{}", index + 1));
            // A repeated id gets a fresh one instead of overwriting the earlier post
            if let Some(id) = &post.id {
                if !seen.insert(id.clone()) {
                    post.id = None;
                }
            }
            match self.restore(post) {
                Ok(_) => report.inserted += 1,
                Err(e) => {
                    tracing::warn!(post = %label, error = %e, "Failed to insert remote post during restore");
                    report.failed_inserts.push(label);
                }
            }
        }

        tracing::info!(
            deleted = report.deleted,
            inserted = report.inserted,
            failed = report.failed_deletes.len() + report.failed_inserts.len(),
            "Replaced remote collection"
        );
        Ok(report)
    }
}
