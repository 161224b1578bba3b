//! Application layer - Use cases and orchestration

pub mod backup;
pub mod editor;
pub mod init;
pub mod maintenance;
pub mod manage_backend;
pub mod manage_config;
pub mod posts;
pub mod session;

pub use backup::{BackupService, ImportOutcome};
pub use editor::{PostEditor, PostForm};
pub use maintenance::MaintenanceService;
pub use manage_backend::BackendService;
pub use manage_config::ConfigService;
pub use posts::PostService;
pub use session::DiarySession;
