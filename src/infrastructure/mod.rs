//! Infrastructure layer - External I/O and persistence

pub mod backend;
pub mod config;
pub mod editor;
pub mod kv;
pub mod post_store;
pub mod remote;
pub mod repository;

pub use backend::{open_post_store, Backend, BackendStatus, ReadinessProbe, StoreSettings};
pub use config::Config;
pub use editor::EditorSession;
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use post_store::{LocalPostStore, PostStore, RemotePostStore, ReplaceReport};
pub use remote::{BlobStorage, DirectoryRemote, DocumentStore, MemoryRemote};
pub use repository::{DiaryRepository, FileSystemRepository, DIARY_DIR};
