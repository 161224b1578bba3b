//! CLI command definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "diary")]
#[command(about = "Local-first journal with an optional remote store", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Log store and backend activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Form fields shared by `new` and `edit`
#[derive(Args, Debug, Default)]
pub struct PostFields {
    /// Post title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Post body as markup, used as given
    #[arg(short, long)]
    pub content: Option<String>,

    /// Markup to paste into the body, cleaned by the paste policy
    #[arg(long, value_name = "HTML")]
    pub paste: Option<String>,

    /// Plain text to paste into the body
    #[arg(long, value_name = "TEXT")]
    pub text: Option<String>,

    /// Post date (YYYY-MM-DD); anything else falls back to today
    #[arg(short, long)]
    pub date: Option<String>,

    /// Image file to attach
    #[arg(short, long, value_name = "FILE")]
    pub image: Option<PathBuf>,
}

impl PostFields {
    /// Whether the body comes from flags rather than the external editor
    pub fn has_body(&self) -> bool {
        self.content.is_some() || self.paste.is_some() || self.text.is_some()
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new diary
    Init {
        /// Directory to initialize (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Directory backing the remote store; the diary starts in remote mode
        #[arg(short, long)]
        remote: Option<PathBuf>,
    },

    /// List posts, most recent first
    List,

    /// Show one post
    Show {
        id: String,
    },

    /// Write a new post (opens $EDITOR when no body is given)
    New {
        #[command(flatten)]
        fields: PostFields,
    },

    /// Edit an existing post (opens $EDITOR when nothing else is changed)
    Edit {
        id: String,

        #[command(flatten)]
        fields: PostFields,

        /// Remove the post's image
        #[arg(long, conflicts_with = "image")]
        remove_image: bool,
    },

    /// Delete a post
    Delete {
        id: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Apply a toolbar format to text in a post
    Format {
        id: String,

        /// Format tag: b, u, s, a, ol, ul, code
        tag: String,

        /// Text in the post body to format (first occurrence)
        selection: String,

        /// Link target for the `a` format
        #[arg(long)]
        href: Option<String>,
    },

    /// Export all posts to a dated JSON backup
    Export {
        /// Directory to write the backup into
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Print the JSON instead of writing a file
        #[arg(long, conflicts_with = "dir")]
        stdout: bool,
    },

    /// Replace all posts with the contents of a JSON backup
    Import {
        file: PathBuf,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show or change the storage backend
    Backend {
        #[command(subcommand)]
        action: Option<BackendAction>,
    },

    /// View or modify configuration
    Config {
        /// Config key to get or set
        key: Option<String>,

        /// Value to set (if provided, sets the key)
        value: Option<String>,

        /// List all configuration
        #[arg(short, long)]
        list: bool,
    },

    /// Check the locally stored posts
    Check,

    /// Remove all locally stored posts
    Clear {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendAction {
    /// Show the preferred and active backend
    Status,
    /// Switch between local and remote
    Toggle,
    /// Prefer the local store
    Local,
    /// Prefer the remote store
    Remote,
}
