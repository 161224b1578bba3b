//! Listing, lookup and deletion of posts

use crate::domain::post::sort_for_display;
use crate::domain::Post;
use crate::error::{DiaryError, Result};
use crate::infrastructure::PostStore;

/// Read-side queries and deletion against the active store
pub struct PostService<'a> {
    store: &'a dyn PostStore,
}

impl<'a> PostService<'a> {
    pub fn new(store: &'a dyn PostStore) -> Self {
        PostService { store }
    }

    /// Every post in display order, re-read from the store
    pub fn list(&self) -> Result<Vec<Post>> {
        let mut posts = self.store.list()?;
        sort_for_display(&mut posts);
        Ok(posts)
    }

    pub fn show(&self, id: &str) -> Result<Post> {
        self.store
            .get(id)?
            .ok_or_else(|| DiaryError::PostNotFound(id.to_string()))
    }

    /// Delete a post, returning it. Deleting an unknown id is a no-op and
    /// returns `None`.
    pub fn delete(&self, id: &str) -> Result<Option<Post>> {
        let Some(post) = self.store.get(id)? else {
            tracing::debug!(id, "Nothing to delete");
            return Ok(None);
        };
        self.store.delete(id)?;
        tracing::info!(id, backend = %self.store.backend(), "Deleted post");
        Ok(Some(post))
    }
}
