//! Domain layer - Posts and the rules applied to their content

pub mod data_url;
pub mod dates;
pub mod format;
pub mod post;
pub mod sanitize;

pub use data_url::DataUrl;
pub use format::Format;
pub use post::Post;
pub use sanitize::PastePolicy;
