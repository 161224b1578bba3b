//! CLI layer - Command-line interface

pub mod commands;
pub mod output;
pub mod prompt;

pub use commands::{BackendAction, Cli, Commands, PostFields};
pub use output::{
    format_backend_status, format_data_report, format_post_detail, format_post_list,
    format_replace_report,
};
