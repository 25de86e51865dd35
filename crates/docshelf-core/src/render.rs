//! Presentation renderer
//!
//! Turns a document payload into embeddable HTML through a named template.
//! The template is picked by where the markup will be shown
//! ([`RenderContext`]) and the payload's content type:
//!
//! | context   | pdf                 | video                 |
//! |-----------|---------------------|-----------------------|
//! | Container | `pdf_template.html` | `video_template.html` |
//! | Detail    | `pdf_inline.html`   | `video_inline.html`   |
//!
//! Templates are Jinja templates rendered with minijinja. Available
//! variables are `file_data` (base64 content), `mime_type`, `section` and
//! `label`; `page.html` also gets `title`, `stylesheet` and `body`.
//! Output is HTML-escaped unless a value is marked safe, and an undefined
//! variable is an error.
//!
//! Templates come either from a directory (loaded by name through a path
//! loader) or from the built-in defaults. Missing templates and template
//! errors are configuration errors and are never masked.

use std::io;
use std::path::{Path, PathBuf};

use minijinja::value::Value;
use minijinja::{context, path_loader, AutoEscape, Environment, ErrorKind, UndefinedBehavior};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::models::{ContentType, DocumentKey, Payload};

/// Templates every renderer must be able to resolve
pub const REQUIRED_TEMPLATES: [&str; 4] = [
    "pdf_template.html",
    "video_template.html",
    "pdf_inline.html",
    "video_inline.html",
];

/// Standalone page wrapper; a template directory may override it
pub const PAGE_TEMPLATE: &str = "page.html";

const BUILTIN_TEMPLATES: [(&str, &str); 4] = [
    (
        "pdf_template.html",
        include_str!("../templates/pdf_template.html"),
    ),
    (
        "video_template.html",
        include_str!("../templates/video_template.html"),
    ),
    ("pdf_inline.html", include_str!("../templates/pdf_inline.html")),
    (
        "video_inline.html",
        include_str!("../templates/video_inline.html"),
    ),
];

const BUILTIN_PAGE: &str = include_str!("../templates/page.html");

const BUILTIN_STYLESHEET: &str = include_str!("../templates/styles.css");

/// Errors raised while loading or applying templates
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template '{name}' not found")]
    TemplateNotFound { name: String },

    #[error("Template '{name}' failed: {source}")]
    Template {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RenderError {
    fn from_template(name: &str, source: minijinja::Error) -> Self {
        match source.kind() {
            ErrorKind::TemplateNotFound => RenderError::TemplateNotFound {
                name: name.to_string(),
            },
            _ => RenderError::Template {
                name: name.to_string(),
                source,
            },
        }
    }
}

/// Where rendered markup is going to be embedded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderContext {
    /// Full-size view in the main panel
    #[default]
    Container,
    /// Compact inline view with a heading
    Detail,
}

impl RenderContext {
    /// Template used for a content type in this context
    pub fn template_name(self, content_type: ContentType) -> &'static str {
        match (self, content_type) {
            (RenderContext::Container, ContentType::Pdf) => "pdf_template.html",
            (RenderContext::Container, ContentType::Video) => "video_template.html",
            (RenderContext::Detail, ContentType::Pdf) => "pdf_inline.html",
            (RenderContext::Detail, ContentType::Video) => "video_inline.html",
        }
    }
}

/// Renders payloads to HTML fragments and standalone pages
#[derive(Debug, Clone)]
pub struct Renderer {
    env: Environment<'static>,
    stylesheet: String,
}

impl Renderer {
    /// Renderer with the built-in templates and stylesheet
    pub fn builtin() -> Result<Self, RenderError> {
        let mut env = environment();
        for (name, source) in BUILTIN_TEMPLATES {
            env.add_template(name, source)
                .map_err(|e| RenderError::from_template(name, e))?;
        }
        Self::new(env)
    }

    /// Renderer loading templates by name from a directory
    pub fn from_dir(dir: &Path) -> Result<Self, RenderError> {
        let metadata = std::fs::metadata(dir).map_err(|source| RenderError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(RenderError::Io {
                path: dir.to_path_buf(),
                source: io::Error::other("not a directory"),
            });
        }

        let mut env = environment();
        env.set_loader(path_loader(dir));
        debug!(dir = %dir.display(), "Loading templates");
        Self::new(env)
    }

    /// Load templates and stylesheet as configured
    pub fn from_config(config: &Config) -> Result<Self, RenderError> {
        let mut renderer = match &config.template_dir {
            Some(dir) => Self::from_dir(dir)?,
            None => Self::builtin()?,
        };

        if let Some(path) = &config.stylesheet {
            renderer.stylesheet =
                std::fs::read_to_string(path).map_err(|source| RenderError::Io {
                    path: path.clone(),
                    source,
                })?;
        }

        Ok(renderer)
    }

    /// Compile every required template up front so broken ones fail at startup
    fn new(mut env: Environment<'static>) -> Result<Self, RenderError> {
        for name in REQUIRED_TEMPLATES {
            env.get_template(name)
                .map_err(|e| RenderError::from_template(name, e))?;
        }

        let page_missing = match env.get_template(PAGE_TEMPLATE) {
            Ok(_) => false,
            Err(e) if e.kind() == ErrorKind::TemplateNotFound => true,
            Err(e) => return Err(RenderError::from_template(PAGE_TEMPLATE, e)),
        };
        if page_missing {
            env.add_template(PAGE_TEMPLATE, BUILTIN_PAGE)
                .map_err(|e| RenderError::from_template(PAGE_TEMPLATE, e))?;
        }

        Ok(Self {
            env,
            stylesheet: BUILTIN_STYLESHEET.to_string(),
        })
    }

    /// Replace the stylesheet inlined by [`Renderer::page`]
    pub fn with_stylesheet(mut self, css: impl Into<String>) -> Self {
        self.stylesheet = css.into();
        self
    }

    /// Render a payload into an embeddable fragment
    ///
    /// PDF payloads already carry base64 and are passed through; video
    /// bytes are encoded here.
    pub fn render(
        &self,
        key: &DocumentKey,
        payload: &Payload,
        context: RenderContext,
    ) -> Result<String, RenderError> {
        let content_type = payload.content_type();

        // base64 and mime types never need escaping
        self.render_named(
            context.template_name(content_type),
            context! {
                file_data => Value::from_safe_string(payload.to_base64().into_owned()),
                mime_type => Value::from_safe_string(content_type.mime_type().to_string()),
                section => key.section(),
                label => key.label(),
            },
        )
    }

    /// Wrap a fragment in a standalone HTML page with the stylesheet inlined
    pub fn page(&self, title: &str, body: &str) -> Result<String, RenderError> {
        self.render_named(
            PAGE_TEMPLATE,
            context! {
                title => title,
                stylesheet => Value::from_safe_string(self.stylesheet.clone()),
                body => Value::from_safe_string(body.to_string()),
            },
        )
    }

    fn render_named<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, RenderError> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(ctx))
            .map_err(|e| RenderError::from_template(name, e))
    }
}

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.set_keep_trailing_newline(true);
    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key() -> DocumentKey {
        DocumentKey::new("SQL", "Tables").unwrap()
    }

    fn pdf(base64: &str) -> Payload {
        Payload::Pdf {
            base64: base64.to_string(),
        }
    }

    fn write_templates(dir: &Path, names: &[&str]) {
        for name in names {
            std::fs::write(dir.join(name), format!("<{}>{{{{ file_data }}}}", name)).unwrap();
        }
    }

    #[test]
    fn test_builtin_renders_every_template() {
        let renderer = Renderer::builtin().unwrap();
        let video = Payload::Video { bytes: vec![1] };

        for context in [RenderContext::Container, RenderContext::Detail] {
            assert!(renderer.render(&key(), &pdf("AA=="), context).is_ok());
            assert!(renderer.render(&key(), &video, context).is_ok());
        }
    }

    #[test]
    fn test_render_pdf_passes_base64_through() {
        let renderer = Renderer::builtin().unwrap();

        let html = renderer
            .render(&key(), &pdf("JVBERi0xLjQ+/w=="), RenderContext::Container)
            .unwrap();

        assert!(html.contains("data:application/pdf;base64,JVBERi0xLjQ+/w=="));
        assert!(html.contains("<iframe"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_render_video_encodes_bytes() {
        let renderer = Renderer::builtin().unwrap();
        let payload = Payload::Video {
            bytes: vec![0, 1, 2],
        };

        let html = renderer
            .render(&key(), &payload, RenderContext::Container)
            .unwrap();

        assert!(html.contains("data:video/mp4;base64,AAEC"));
        assert!(html.contains("<video"));
    }

    #[test]
    fn test_detail_context_uses_inline_template() {
        let renderer = Renderer::builtin().unwrap();

        let html = renderer
            .render(&key(), &pdf("AA=="), RenderContext::Detail)
            .unwrap();

        assert!(html.contains("<h2>Tables</h2>"));
        assert!(html.contains("<embed"));
    }

    #[test]
    fn test_template_names() {
        assert_eq!(
            RenderContext::Container.template_name(ContentType::Pdf),
            "pdf_template.html"
        );
        assert_eq!(
            RenderContext::Detail.template_name(ContentType::Video),
            "video_inline.html"
        );
    }

    #[test]
    fn test_labels_are_escaped() {
        let renderer = Renderer::builtin().unwrap();
        let key = DocumentKey::new("A&B", "<script>").unwrap();

        let html = renderer
            .render(&key, &pdf("AA=="), RenderContext::Detail)
            .unwrap();

        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("A&amp;B"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_from_dir() {
        let temp_dir = TempDir::new().unwrap();
        write_templates(temp_dir.path(), &REQUIRED_TEMPLATES);
        std::fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let renderer = Renderer::from_dir(temp_dir.path()).unwrap();
        let html = renderer
            .render(&key(), &pdf("QQ=="), RenderContext::Container)
            .unwrap();
        assert_eq!(html, "<pdf_template.html>QQ==");
    }

    #[test]
    fn test_jinja_filters_and_blocks() {
        let temp_dir = TempDir::new().unwrap();
        write_templates(temp_dir.path(), &REQUIRED_TEMPLATES);
        std::fs::write(
            temp_dir.path().join("pdf_inline.html"),
            "{% if section == 'SQL' %}{{ label|upper }}{% else %}other{% endif %}",
        )
        .unwrap();

        let renderer = Renderer::from_dir(temp_dir.path()).unwrap();
        let html = renderer
            .render(&key(), &pdf("AA=="), RenderContext::Detail)
            .unwrap();
        assert_eq!(html, "TABLES");
    }

    #[test]
    fn test_missing_template_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        write_templates(temp_dir.path(), &["pdf_template.html", "pdf_inline.html"]);

        let err = Renderer::from_dir(temp_dir.path()).unwrap_err();
        assert!(matches!(err, RenderError::TemplateNotFound { ref name } if name == "video_template.html"));
    }

    #[test]
    fn test_missing_template_dir() {
        let err = Renderer::from_dir(Path::new("/nonexistent/templates")).unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }

    #[test]
    fn test_syntax_error_fails_at_load() {
        let temp_dir = TempDir::new().unwrap();
        write_templates(temp_dir.path(), &REQUIRED_TEMPLATES);
        std::fs::write(temp_dir.path().join("video_inline.html"), "<p>{{ file_data</p>").unwrap();

        let err = Renderer::from_dir(temp_dir.path()).unwrap_err();
        match err {
            RenderError::Template { name, source } => {
                assert_eq!(name, "video_inline.html");
                assert_eq!(source.kind(), ErrorKind::SyntaxError);
            }
            other => panic!("expected template error, got {:?}", other),
        }
    }

    #[test]
    fn test_undefined_variable() {
        let temp_dir = TempDir::new().unwrap();
        write_templates(temp_dir.path(), &REQUIRED_TEMPLATES);
        std::fs::write(temp_dir.path().join("pdf_template.html"), "{{ author }}").unwrap();

        let renderer = Renderer::from_dir(temp_dir.path()).unwrap();
        let err = renderer
            .render(&key(), &pdf("AA=="), RenderContext::Container)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::Template { ref source, .. } if source.kind() == ErrorKind::UndefinedError
        ));
    }

    #[test]
    fn test_page_inlines_stylesheet() {
        let renderer = Renderer::builtin()
            .unwrap()
            .with_stylesheet("body > p { color: red; }\n");

        let page = renderer.page("SQL & Tables", "<p>hi</p>\n").unwrap();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("body > p { color: red; }"));
        assert!(page.contains("<title>SQL &amp; Tables</title>"));
        assert!(page.contains("<p>hi</p>"));
    }

    #[test]
    fn test_template_dir_can_override_page() {
        let temp_dir = TempDir::new().unwrap();
        write_templates(temp_dir.path(), &REQUIRED_TEMPLATES);
        std::fs::write(temp_dir.path().join("page.html"), "[{{ title }}]{{ body }}").unwrap();

        let renderer = Renderer::from_dir(temp_dir.path()).unwrap();
        assert_eq!(renderer.page("t", "<b>x</b>").unwrap(), "[t]<b>x</b>");
    }

    #[test]
    fn test_from_config_reads_stylesheet() {
        let temp_dir = TempDir::new().unwrap();
        let css = temp_dir.path().join("styles.css");
        std::fs::write(&css, ".x { }").unwrap();

        let config = Config {
            stylesheet: Some(css),
            ..Config::default()
        };
        let renderer = Renderer::from_config(&config).unwrap();
        assert!(renderer.page("t", "").unwrap().contains(".x { }"));

        let config = Config {
            stylesheet: Some(temp_dir.path().join("missing.css")),
            ..Config::default()
        };
        assert!(matches!(
            Renderer::from_config(&config),
            Err(RenderError::Io { .. })
        ));
    }
}
