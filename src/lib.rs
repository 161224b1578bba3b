//! diary - Local-first journal
//!
//! Posts with a title, a date, a restricted-HTML body and an optional image,
//! stored either in a local key-value directory or in a remote document
//! store with blob storage for images.

pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::DiaryError;
