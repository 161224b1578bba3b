//! Output formatting utilities

use crate::domain::dates::{display_created_at, normalize_date_tokens};
use crate::domain::Post;
use crate::infrastructure::post_store::LocalDataReport;
use crate::infrastructure::{BackendStatus, ReplaceReport};

fn date_label(post: &Post) -> String {
    let date = display_created_at(&post.created_at);
    if date.is_empty() {
        "(no date)".to_string()
    } else {
        date
    }
}

fn title_label(post: &Post) -> &str {
    if post.title.trim().is_empty() {
        "(untitled)"
    } else {
        &post.title
    }
}

/// Format posts for `diary list`. Posts are expected in display order.
pub fn format_post_list(posts: &[Post]) -> String {
    if posts.is_empty() {
        return "No posts yet".to_string();
    }

    let mut output = format!(
        "{} post{}\n",
        posts.len(),
        if posts.len() == 1 { "" } else { "s" }
    );
    for post in posts {
        output.push_str(&format!(
            "{:<10}  {}  {}{}\n",
            date_label(post),
            post.id.as_deref().unwrap_or("-"),
            title_label(post),
            if post.image.is_some() { "  [image]" } else { "" }
        ));
    }
    output
}

/// Format a single post for `diary show`
pub fn format_post_detail(post: &Post) -> String {
    let mut output = String::new();
    output.push_str(&format!("Title: {}\n", title_label(post)));
    output.push_str(&format!("Date: {}\n", date_label(post)));
    if let Some(id) = &post.id {
        output.push_str(&format!("Id: {}\n", id));
    }
    if let Some(image) = &post.image {
        if image.starts_with("data:") {
            output.push_str("Image: (inline)\n");
        } else {
            output.push_str(&format!("Image: {}\n", image));
        }
    }
    if let Some(updated) = &post.updated_at {
        output.push_str(&format!("Updated: {}\n", updated));
    }
    output.push('\n');
    output.push_str(&normalize_date_tokens(&post.content));
    output.push('\n');
    output
}

pub fn format_backend_status(status: &BackendStatus) -> String {
    format!(
        "Preferred: {}\nActive: {}\n{}\n",
        status.preferred,
        status.effective,
        status.describe()
    )
}

pub fn format_replace_report(report: &ReplaceReport) -> String {
    let mut output = format!(
        "Removed {} post(s), restored {} post(s)\n",
        report.deleted, report.inserted
    );
    if !report.failed_deletes.is_empty() {
        output.push_str(&format!(
            "Could not remove: {}\n",
            report.failed_deletes.join(", ")
        ));
    }
    if !report.failed_inserts.is_empty() {
        output.push_str(&format!(
            "Could not restore: {}\n",
            report.failed_inserts.join(", ")
        ));
    }
    output
}

pub fn format_data_report(report: &LocalDataReport) -> String {
    match (&report.stored_bytes, &report.parsed) {
        (None, _) => "No local data stored\n".to_string(),
        (Some(bytes), Ok(count)) => {
            format!("Local data: {} bytes, {} post(s)\n", bytes, count)
        }
        (Some(bytes), Err(e)) => format!(
            "Local data: {} bytes, unreadable ({})\nRun 'diary clear' to reset it.\n",
            bytes, e
        ),
    }
}
