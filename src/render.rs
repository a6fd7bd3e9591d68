//! Markdown rendering for assistant messages
//!
//! [`render`] is a pure function from markdown text and a [`Theme`] to an
//! HTML fragment: same input and theme always yield the same output, and
//! no state is kept between calls. Front ends style the emitted classes;
//! fenced code blocks carry `hljs language-<tag>` hooks for a syntax
//! highlighter, links open in a new context without leaking a referrer,
//! and math is emitted as `math-inline` / `math-display` spans for a math
//! typesetter.

use pulldown_cmark::{html, Options, Parser};
use serde::{Deserialize, Serialize};

/// Display palette for rendered output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light palette
    #[default]
    Light,
    /// Dark palette
    Dark,
}

impl Theme {
    /// CSS class selecting the palette on the wrapper element
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Light => "theme-light",
            Self::Dark => "theme-dark",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

/// Renders assistant markdown to a themed HTML fragment
///
/// Supports headings (six levels), paragraphs, ordered and unordered
/// lists, links, inline and fenced code, block quotes, horizontal rules,
/// tables, strikethrough, and inline/display math. Fenced blocks with a
/// language tag get `hljs language-<tag>` classes; untagged fences are
/// left as plain monospace.
///
/// # Examples
///
/// ```
/// use parley::render::{render, Theme};
///
/// let html = render("# Title", Theme::Dark);
/// assert!(html.contains("<h1>"));
/// assert!(html.contains("theme-dark"));
/// ```
pub fn render(markdown: &str, theme: Theme) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_MATH);

    let parser = Parser::new_ext(markdown, options);
    let mut body = String::new();
    html::push_html(&mut body, parser);

    let body = add_code_highlighting_classes(&body);
    let body = open_links_in_new_context(&body);

    format!("<div class=\"markdown {}\">{}</div>", theme.css_class(), body)
}

/// Adds highlighter hook classes to language-tagged fenced code blocks
///
/// Untagged fences keep the bare `<pre><code>` form so they fall back to
/// unstyled monospace.
fn add_code_highlighting_classes(body: &str) -> String {
    body.replace(
        "<pre><code class=\"language-",
        "<pre><code class=\"hljs language-",
    )
}

/// Rewrites anchors to open in a new context with no referrer leakage
fn open_links_in_new_context(body: &str) -> String {
    body.replace(
        "<a href=",
        "<a target=\"_blank\" rel=\"noopener noreferrer\" href=",
    )
}
