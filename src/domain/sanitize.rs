//! Clean-up of pasted rich text and of post bodies before they are saved

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Tags kept by [`PastePolicy::AllowList`]
const ALLOWED_TAGS: &[&str] = &["ol", "ul", "li"];

/// Attributes removed by [`PastePolicy::StripStyles`]
const PRESENTATION_ATTRIBUTES: &[&str] = &[
    "style",
    "class",
    "color",
    "bgcolor",
    "background",
    "font-size",
];

/// How pasted markup is cleaned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PastePolicy {
    /// Keep list structure only, drop every other tag
    #[default]
    AllowList,
    /// Keep all structure, drop presentation attributes, turn `<font>` into `<span>`
    StripStyles,
}

impl FromStr for PastePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "allow-list" | "allowlist" => Ok(PastePolicy::AllowList),
            "strip-styles" | "denylist" | "deny-list" => Ok(PastePolicy::StripStyles),
            _ => Err(format!(
                "Invalid paste policy: '{}'. Valid policies: allow-list, strip-styles",
                s
            )),
        }
    }
}

impl fmt::Display for PastePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PastePolicy::AllowList => write!(f, "allow-list"),
            PastePolicy::StripStyles => write!(f, "strip-styles"),
        }
    }
}

fn tag_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r#"<(/?)\s*([a-zA-Z][a-zA-Z0-9:-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#).unwrap()
    })
}

/// Comments, doctype/processing instructions, and script/style blocks with their bodies
fn non_content_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r"(?is)<!--.*?-->|<(?:script|style)\b[^>]*>.*?</(?:script|style)\s*>|<[!?][^>]*>",
        )
        .unwrap()
    })
}

fn attribute_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r#"([^\s=/>"']+)(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+))?"#).unwrap()
    })
}

fn code_block_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?i)</?(?:pre|code)\b[^>]*>").unwrap())
}

/// Clean clipboard content for insertion into a post body.
///
/// `html` is the clipboard's markup flavour, `plain` its text flavour. When
/// there is no markup the plain text is escaped and its newlines become `<br>`.
pub fn sanitize_paste(html: Option<&str>, plain: &str, policy: PastePolicy) -> String {
    match html {
        Some(markup) if !markup.trim().is_empty() => sanitize_markup(markup, policy),
        _ => plain_to_html(plain),
    }
}

/// Apply `policy` to a fragment of markup
pub fn sanitize_markup(html: &str, policy: PastePolicy) -> String {
    let cleaned = non_content_regex().replace_all(html, "");
    match policy {
        PastePolicy::AllowList => rewrite_tags(&cleaned, |closing, name, _attrs| {
            ALLOWED_TAGS
                .contains(&name)
                .then(|| format!("<{}{}>", if closing { "/" } else { "" }, name))
        }),
        PastePolicy::StripStyles => rewrite_tags(&cleaned, |closing, name, attrs| {
            let slash = if closing { "/" } else { "" };
            if name == "font" {
                return Some(format!("<{}span>", slash));
            }
            Some(format!("<{}{}{}>", slash, name, strip_presentation(attrs)))
        }),
    }
}

/// Remove `<pre>` and `<code>` wrapper tags, keeping their text
pub fn strip_code_blocks(html: &str) -> String {
    code_block_regex().replace_all(html, "").into_owned()
}

/// Escape text for HTML and keep its line breaks
pub fn plain_to_html(text: &str) -> String {
    escape_text(text).replace("\r\n", "\n").replace('\n', "<br>")
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Walk every tag, letting `f` decide its replacement (`None` drops it).
/// Text between tags is kept, with any stray `<` escaped.
fn rewrite_tags<F>(html: &str, mut f: F) -> String
where
    F: FnMut(bool, &str, &str) -> Option<String>,
{
    let mut out = String::with_capacity(html.len());
    let mut last = 0;

    for caps in tag_regex().captures_iter(html) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&html[last..whole.start()].replace('<', "&lt;"));
        last = whole.end();

        let closing = !caps[1].is_empty();
        let name = caps[2].to_ascii_lowercase();
        if let Some(replacement) = f(closing, &name, &caps[3]) {
            out.push_str(&replacement);
        }
    }

    out.push_str(&html[last..].replace('<', "&lt;"));
    out
}

/// Rebuild an attribute list without presentation attributes
fn strip_presentation(attrs: &str) -> String {
    let self_closing = attrs.trim_end().ends_with('/');
    let mut kept = String::new();

    for caps in attribute_regex().captures_iter(attrs) {
        let name = caps[1].to_ascii_lowercase();
        if PRESENTATION_ATTRIBUTES.contains(&name.as_str()) {
            continue;
        }
        kept.push(' ');
        kept.push_str(&caps[0]);
    }

    if self_closing {
        kept.push_str(" /");
    }
    kept
}
