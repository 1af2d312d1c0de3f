//! Template engine for pages

use std::collections::HashMap;
use std::path::Path;
use pulldown_cmark::{CowStr, Event, Parser, Tag};
use tera::{Context, Tera};
use walkdir::WalkDir;

use super::Page;
use crate::error::Result;

/// Templates compiled into the binary, by name
const BUILTIN: &[(&str, &str)] = &[
    ("layout.html", include_str!("../../templates/layout.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("error.html", include_str!("../../templates/error.html")),
    ("game_list.html", include_str!("../../templates/game_list.html")),
    ("game_detail.html", include_str!("../../templates/game_detail.html")),
    ("game_form.html", include_str!("../../templates/game_form.html")),
    ("game_delete.html", include_str!("../../templates/game_delete.html")),
    ("genre_list.html", include_str!("../../templates/genre_list.html")),
    ("genre_detail.html", include_str!("../../templates/genre_detail.html")),
    ("genre_form.html", include_str!("../../templates/genre_form.html")),
    ("genre_delete.html", include_str!("../../templates/genre_delete.html")),
    ("platform_list.html", include_str!("../../templates/platform_list.html")),
    ("platform_detail.html", include_str!("../../templates/platform_detail.html")),
    ("platform_form.html", include_str!("../../templates/platform_form.html")),
    ("platform_delete.html", include_str!("../../templates/platform_delete.html")),
];

/// Template engine wrapper
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Engine with only the built-in templates
    pub fn builtin() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(BUILTIN.iter().copied())?;
        tera.register_filter("markdown", markdown_filter);

        // Stored text is escaped when it is validated, not when it is shown
        tera.autoescape_on(vec![]);

        Ok(Self { tera })
    }

    /// Built-in templates, with any `.html` file under `dir` replacing the one of the same name
    pub fn with_overrides(dir: &Path) -> Result<Self> {
        let mut engine = Self::builtin()?;

        let mut overrides = Vec::new();
        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.extension().map(|e| e == "html").unwrap_or(false) {
                continue;
            }
            let name = path
                .strip_prefix(dir)
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            let content = std::fs::read_to_string(path)?;
            tracing::debug!("template override: {}", name);
            overrides.push((name, content));
        }

        engine.tera.add_raw_templates(overrides)?;
        Ok(engine)
    }

    /// Render a page to HTML
    pub fn render(&self, page: &Page) -> Result<String> {
        let context = Context::from_value(serde_json::Value::Object(page.context.clone()))?;
        Ok(self.tera.render(page.template, &context)?)
    }
}

/// Link schemes the markdown filter lets through; relative links always pass
const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Tera filter to convert markdown to HTML
///
/// Raw HTML is rendered as text and links with any other scheme point at `#`.
fn markdown_filter(value: &tera::Value, _args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
    let text = value.as_str().unwrap_or("");
    let events = Parser::new(text).map(|event| match event {
        Event::Start(Tag::Link { link_type, dest_url, title, id }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image { link_type, dest_url, title, id }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, events);
    Ok(tera::Value::String(html))
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    // A scheme is whatever precedes the first ':' before any path, query or fragment
    let scheme = url
        .split(['/', '?', '#'])
        .next()
        .and_then(|head| head.split_once(':'))
        .map(|(scheme, _)| scheme.trim().to_ascii_lowercase());

    match scheme {
        Some(scheme) if !SAFE_SCHEMES.contains(&scheme.as_str()) => CowStr::Borrowed("#"),
        _ => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entity, Genre};
    use crate::validation::escape;

    #[test]
    fn test_builtin_templates_parse() {
        let engine = TemplateEngine::builtin().unwrap();
        let html = engine
            .render(
                &Page::new("index.html", "Big Ol' Video Game Store")
                    .with("game_count", 10)
                    .with("genre_count", 5)
                    .with("platform_count", 4),
            )
            .unwrap();

        assert!(html.contains("Big Ol' Video Game Store"));
        assert!(html.contains("10"));
    }

    #[test]
    fn test_values_are_not_escaped_twice() {
        let engine = TemplateEngine::builtin().unwrap();
        let genre = Genre {
            id: "abc".into(),
            name: "Hack &amp; Slash".into(),
            description: "Swing *hard*.".into(),
        };
        let page = Page::new("genre_detail.html", "Genre Detail")
            .with("genre", genre.to_view())
            .with("genre_games", Vec::<serde_json::Value>::new());

        let html = engine.render(&page).unwrap();
        assert!(html.contains("Hack &amp; Slash"));
        assert!(html.contains("<em>hard</em>"));
    }

    fn genre_page(description: &str) -> Page {
        let genre = Genre {
            id: "abc".into(),
            name: "Adventure".into(),
            description: description.into(),
        };
        Page::new("genre_detail.html", "Genre Detail")
            .with("genre", genre.to_view())
            .with("genre_games", Vec::<serde_json::Value>::new())
    }

    #[test]
    fn test_markdown_links_keep_safe_schemes_only() {
        let engine = TemplateEngine::builtin().unwrap();
        let description = escape(
            "[click](javascript:alert(document.cookie)) [pic](JavaScript:void(0)) \
             [site](https://example.com) [games](/inventory/games)",
        );

        let html = engine.render(&genre_page(&description)).unwrap();
        assert!(!html.to_lowercase().contains("javascript:"));
        assert!(html.contains(r##"<a href="#">click</a>"##));
        assert!(html.contains(r#"href="https://example.com""#));
        assert!(html.contains(r#"href="/inventory/games""#));
    }

    #[test]
    fn test_markdown_raw_html_rendered_as_text() {
        let engine = TemplateEngine::builtin().unwrap();

        let html = engine
            .render(&genre_page("<script>alert(1)</script>\n\nfine <b>inline</b>"))
            .unwrap();
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_override_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("error.html"), "custom {{ message }}").unwrap();

        let engine = TemplateEngine::with_overrides(tmp.path()).unwrap();
        let html = engine
            .render(&Page::new("error.html", "Not found").with("message", "gone").with("status", 404))
            .unwrap();
        assert_eq!(html, "custom gone");
    }
}
