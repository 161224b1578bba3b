//! Toolbar formatting commands for the post body

/// A formatting action from the editor toolbar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Format {
    Bold,
    Underline,
    Strikethrough,
    Link(String),
    OrderedList,
    UnorderedList,
    InlineCode,
}

impl Format {
    /// Parse a toolbar tag (`b`, `u`, `s`, `a`, `ol`, `ul`, `code`).
    /// A link needs its target.
    pub fn from_tag(tag: &str, href: Option<&str>) -> Result<Self, String> {
        match tag.trim().to_lowercase().as_str() {
            "b" | "bold" => Ok(Format::Bold),
            "u" | "underline" => Ok(Format::Underline),
            "s" | "strike" | "strikethrough" => Ok(Format::Strikethrough),
            "a" | "link" => match href.map(str::trim) {
                Some(url) if !url.is_empty() => Ok(Format::Link(url.to_string())),
                _ => Err("A link needs a target URL (--href)".to_string()),
            },
            "ol" => Ok(Format::OrderedList),
            "ul" => Ok(Format::UnorderedList),
            "code" => Ok(Format::InlineCode),
            other => Err(format!(
                "Unknown format '{}'. Valid formats: b, u, s, a, ol, ul, code",
                other
            )),
        }
    }

    /// Wrap `text` in this format's markup
    pub fn wrap(&self, text: &str) -> String {
        match self {
            Format::Bold => format!("<b>{}</b>", text),
            Format::Underline => format!("<u>{}</u>", text),
            Format::Strikethrough => format!("<s>{}</s>", text),
            Format::Link(url) => format!("<a href=\"{}\">{}</a>", url.replace('"', "&quot;"), text),
            Format::OrderedList => format!("<ol>{}</ol>", list_items(text)),
            Format::UnorderedList => format!("<ul>{}</ul>", list_items(text)),
            // Code holds text, not markup
            Format::InlineCode => format!(
                "<code>{}</code>",
                text.replace('&', "&amp;")
                    .replace('<', "&lt;")
                    .replace('>', "&gt;")
            ),
        }
    }
}

fn list_items(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("<li>{}</li>", line))
        .collect()
}
