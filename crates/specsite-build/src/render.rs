//! Markdown-to-HTML rendering.
//!
//! The build pipeline only depends on the [`RenderEngine`] trait; the default
//! [`MarkdownEngine`] converts CommonMark (plus tables, footnotes,
//! strikethrough and task lists) with `pulldown-cmark` and wraps the result in
//! a standalone page.
//!
//! Recognized metadata keys:
//!
//! - `title`: page title. Falls back to the first level-one heading, then the
//!   file name.
//! - `head`: raw HTML appended to `<head>`.
//! - `githubSource`: base URL; when set, the footer links to
//!   `<githubSource><file name>`.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use handlebars::Handlebars;
use pulldown_cmark::{html, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::Serialize;
use tokio::fs;

use crate::error::BuildError;
use crate::metadata::Metadata;

const PAGE_TEMPLATE: &str = include_str!("templates/page.hbs");
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// A 1-based position in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Render errors
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{location}: {message}", path.display())]
    Syntax {
        path: PathBuf,
        location: SourceLocation,
        message: String,
    },

    #[error("failed to render {}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: handlebars::RenderError,
    },
}

impl RenderError {
    /// Source position of the problem, when the engine knows it.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Syntax { location, .. } => Some(location),
            _ => None,
        }
    }
}

/// Turns one spec source into a complete HTML document.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Render the file at `source` using `metadata` as options.
    async fn render(&self, source: &Path, metadata: &Metadata) -> Result<String, RenderError>;
}

#[derive(Serialize)]
struct Page<'a> {
    title: &'a str,
    head: Option<&'a str>,
    body: &'a str,
    source_url: Option<String>,
}

/// Default engine backed by `pulldown-cmark`.
pub struct MarkdownEngine {
    handlebars: Handlebars<'static>,
    options: Options,
}

impl MarkdownEngine {
    /// Create an engine with the built-in page template.
    pub fn new() -> Result<Self, BuildError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars
            .register_template_string("page", PAGE_TEMPLATE)
            .map_err(Box::new)?;

        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Ok(Self {
            handlebars,
            options,
        })
    }

    /// Render Markdown text that came from `source`.
    pub fn render_str(
        &self,
        source: &Path,
        markdown: &str,
        metadata: &Metadata,
    ) -> Result<String, RenderError> {
        let mut events: Vec<Event<'_>> = Parser::new_ext(markdown, self.options).collect();
        let first_heading = assign_heading_ids(&mut events);

        let mut body = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut body, events.into_iter());

        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let fallback_title = source
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let title = metadata
            .get_str("title")
            .or(first_heading.as_deref())
            .unwrap_or(&fallback_title);

        let page = Page {
            title,
            head: metadata.get_str("head"),
            body: &body,
            source_url: metadata
                .get_str("githubSource")
                .map(|base| format!("{base}{file_name}")),
        };

        self.handlebars
            .render("page", &page)
            .map_err(|source_err| RenderError::Template {
                path: source.to_path_buf(),
                source: source_err,
            })
    }
}

#[async_trait]
impl RenderEngine for MarkdownEngine {
    async fn render(&self, source: &Path, metadata: &Metadata) -> Result<String, RenderError> {
        let bytes = fs::read(source).await.map_err(|e| RenderError::Read {
            path: source.to_path_buf(),
            source: e,
        })?;

        let text = decode_utf8(source, &bytes)?;
        self.render_str(source, text, metadata)
    }
}

/// Decode `bytes` as UTF-8, dropping a leading byte order mark. Invalid input
/// is reported at the line and column of the first bad byte.
fn decode_utf8<'a>(source: &Path, bytes: &'a [u8]) -> Result<&'a str, RenderError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    std::str::from_utf8(bytes).map_err(|e| {
        let valid = std::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default();
        let line = valid.matches('\n').count() + 1;
        let column = valid.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;

        RenderError::Syntax {
            path: source.to_path_buf(),
            location: SourceLocation { line, column },
            message: "invalid UTF-8".to_string(),
        }
    })
}

/// Give every heading without an explicit `{#id}` a slug id so URL fragments
/// can point at sections. Returns the text of the first level-one heading.
fn assign_heading_ids(events: &mut [Event<'_>]) -> Option<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut first_heading = None;

    for i in 0..events.len() {
        let (level, has_id) = match &events[i] {
            Event::Start(Tag::Heading { level, id, .. }) => (*level, id.is_some()),
            _ => continue,
        };

        let text = heading_text(&events[i + 1..]);
        if level == HeadingLevel::H1 && first_heading.is_none() {
            first_heading = Some(text.clone());
        }

        if has_id {
            continue;
        }

        let base = slug(&text);
        if base.is_empty() {
            continue;
        }

        let count = seen.entry(base.clone()).or_insert(0);
        let unique = if *count == 0 {
            base
        } else {
            format!("{base}-{count}")
        };
        *count += 1;

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(unique));
        }
    }

    first_heading
}

fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text.trim().to_string()
}

fn slug(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn render(markdown: &str, metadata: &Metadata) -> String {
        MarkdownEngine::new()
            .unwrap()
            .render_str(Path::new("/spec/a-v1.md"), markdown, metadata)
            .unwrap()
    }

    #[test]
    fn test_slug_generation() {
        assert_eq!(slug("Hello World Test"), "hello-world-test");
        assert_eq!(slug("  File  Upload: Request!  "), "file-upload-request");
        assert_eq!(slug("???"), "");
    }

    #[test]
    fn test_markdown_features() {
        let html = render(
            "# Spec\n\n**Bold** and ~~gone~~\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n- [x] done\n",
            &Metadata::default(),
        );

        assert!(html.contains("<strong>Bold</strong>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("type=\"checkbox\""));
    }

    #[test]
    fn test_heading_ids() {
        let html = render(
            "# Intro\n\n## Usage\n\n## Usage\n\n## Custom {#custom-id}\n",
            &Metadata::default(),
        );

        assert!(html.contains("<h1 id=\"intro\">Intro</h1>"));
        assert!(html.contains("<h2 id=\"usage\">Usage</h2>"));
        assert!(html.contains("<h2 id=\"usage-1\">Usage</h2>"));
        assert!(html.contains("<h2 id=\"custom-id\">Custom</h2>"));
    }

    #[test]
    fn test_title_resolution() {
        let html = render("# From Heading\n", &Metadata::default());
        assert!(html.contains("<title>From Heading</title>"));

        let html = render("# From Heading\n", &Metadata::from(json!({"title": "From Meta"})));
        assert!(html.contains("<title>From Meta</title>"));

        let html = render("no heading here\n", &Metadata::default());
        assert!(html.contains("<title>a-v1</title>"));
    }

    #[test]
    fn test_head_and_source_link() {
        let metadata = Metadata::from(json!({
            "head": "<link rel=\"icon\" href=\"favicon.ico\">",
            "githubSource": "https://example.com/blob/main/spec/",
        }));
        let html = render("# Spec\n", &metadata);

        assert!(html.contains("<link rel=\"icon\" href=\"favicon.ico\">"));
        assert!(html.contains("View source"));
        assert!(html.contains("https://example.com/blob/main/spec/a-v1.md"));
    }

    #[test]
    fn test_no_footer_without_source() {
        let html = render("# Spec\n", &Metadata::default());
        assert!(!html.contains("<footer>"));
    }

    #[test]
    fn test_title_is_escaped() {
        let html = render("# Spec\n", &Metadata::from(json!({"title": "A & <B>"})));
        assert!(html.contains("<title>A &amp; &lt;B&gt;</title>"));
    }

    #[test]
    fn test_invalid_utf8_reports_location() {
        let err = decode_utf8(Path::new("a-v1.md"), b"# ok\nab\xFFcd").unwrap_err();

        assert_eq!(err.location(), Some(&SourceLocation { line: 2, column: 3 }));
        assert!(err.to_string().contains("a-v1.md:2:3"));
    }

    #[test]
    fn test_bom_is_stripped() {
        let text = decode_utf8(Path::new("a-v1.md"), b"\xEF\xBB\xBF# Title").unwrap();
        assert_eq!(text, "# Title");
    }

    #[tokio::test]
    async fn test_render_is_deterministic() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a-v1.md");
        fs::write(&path, "# Spec\n\nBody text.\n").await.unwrap();

        let engine = MarkdownEngine::new().unwrap();
        let metadata = Metadata::from(json!({"title": "Spec"}));
        let first = engine.render(&path, &metadata).await.unwrap();
        let second = engine.render(&path, &metadata).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_render_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = MarkdownEngine::new()
            .unwrap()
            .render(&temp.path().join("gone-v1.md"), &Metadata::default())
            .await
            .unwrap_err();

        assert!(matches!(err, RenderError::Read { .. }));
        assert!(err.location().is_none());
    }
}
