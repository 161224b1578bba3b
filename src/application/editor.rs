//! Post editor: the create/edit form and its submission

use crate::domain::data_url::{mime_for_path, DataUrl};
use crate::domain::dates::{post_date_or, DATE_FORMAT};
use crate::domain::sanitize::{sanitize_paste, strip_code_blocks};
use crate::domain::{Format, PastePolicy, Post};
use crate::error::{DiaryError, Result};
use crate::infrastructure::PostStore;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of an open editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostForm {
    /// Set when editing an existing post
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    pub date: NaiveDate,
    /// Image already attached to the post (URL or data-URL)
    pub preview: Option<String>,
    /// Newly chosen file, read at submit time
    pub attachment: Option<PathBuf>,
}

impl PostForm {
    fn empty(today: NaiveDate) -> Self {
        PostForm {
            id: None,
            title: String::new(),
            content: String::new(),
            date: today,
            preview: None,
            attachment: None,
        }
    }

    fn to_post(&self) -> Result<Post> {
        let image = match &self.attachment {
            Some(path) => Some(read_image(path)?),
            None => self.preview.clone(),
        };

        Ok(Post {
            id: self.id.clone(),
            title: self.title.trim().to_string(),
            content: strip_code_blocks(self.content.trim()).trim().to_string(),
            created_at: self.date.format(DATE_FORMAT).to_string(),
            image,
            updated_at: None,
        })
    }
}

fn read_image(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| {
        DiaryError::Editor(format!("Cannot read image '{}': {}", path.display(), e))
    })?;
    Ok(DataUrl::new(mime_for_path(path), bytes).encode())
}

/// Create/edit form over the active store.
///
/// Closed until opened for create or edit; a successful submit closes it, a
/// failed one leaves the form as it was.
pub struct PostEditor<'a> {
    store: &'a dyn PostStore,
    policy: PastePolicy,
    form: Option<PostForm>,
}

impl<'a> PostEditor<'a> {
    pub fn new(store: &'a dyn PostStore, policy: PastePolicy) -> Self {
        PostEditor {
            store,
            policy,
            form: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.form.is_some()
    }

    pub fn form(&self) -> Option<&PostForm> {
        self.form.as_ref()
    }

    pub fn open_for_create(&mut self, today: NaiveDate) {
        self.form = Some(PostForm::empty(today));
    }

    /// Load `post` into the form. Unusable dates fall back to `today`.
    pub fn open_for_edit(&mut self, post: &Post, today: NaiveDate) {
        self.form = Some(PostForm {
            id: post.id.clone(),
            title: post.title.clone(),
            content: post.content.clone(),
            date: post_date_or(&post.created_at, today),
            preview: post.image.clone(),
            attachment: None,
        });
    }

    pub fn close(&mut self) {
        self.form = None;
    }

    fn form_mut(&mut self) -> Result<&mut PostForm> {
        self.form.as_mut().ok_or(DiaryError::EditorClosed)
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        self.form_mut()?.title = title.into();
        Ok(())
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> Result<()> {
        self.form_mut()?.content = content.into();
        Ok(())
    }

    pub fn set_date(&mut self, date: NaiveDate) -> Result<()> {
        self.form_mut()?.date = date;
        Ok(())
    }

    /// Append pasted text, cleaned according to the paste policy
    pub fn paste(&mut self, html: Option<&str>, plain: &str) -> Result<()> {
        let cleaned = sanitize_paste(html, plain, self.policy);
        self.form_mut()?.content.push_str(&cleaned);
        Ok(())
    }

    pub fn attach_image(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        self.form_mut()?.attachment = Some(path.into());
        Ok(())
    }

    pub fn clear_image(&mut self) -> Result<()> {
        let form = self.form_mut()?;
        form.attachment = None;
        form.preview = None;
        Ok(())
    }

    /// Wrap the first occurrence of `selection` in the body. Returns `false`
    /// when the selection is empty or not found.
    pub fn apply_format(&mut self, format: &Format, selection: &str) -> Result<bool> {
        let form = self.form_mut()?;
        if selection.is_empty() {
            return Ok(false);
        }

        match form.content.find(selection) {
            Some(start) => {
                let end = start + selection.len();
                form.content
                    .replace_range(start..end, &format.wrap(selection));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Persist the form. Returns the post id and closes the editor on success.
    pub fn submit(&mut self) -> Result<String> {
        let form = self.form.as_ref().ok_or(DiaryError::EditorClosed)?;
        let post = form.to_post()?;

        let id = match &form.id {
            Some(id) => {
                self.store.update(id, post)?;
                id.clone()
            }
            None => self.store.create(post)?,
        };

        tracing::debug!(id = %id, backend = %self.store.backend(), "Saved post");
        self.close();
        Ok(id)
    }
}
