//! Views: what controllers hand to the renderer
//!
//! Controllers never produce HTML themselves. They return an [`Outcome`]:
//! either a [`Page`] (template name plus a JSON context) or a redirect. The
//! [`TemplateEngine`] turns pages into HTML.
//!
//! # Templates
//!
//! Built-in templates are compiled into the binary. A directory of `.html`
//! files can override any of them by name, using Tera syntax:
//!
//! ```html
//! {% extends "layout.html" %}
//! {% block content %}
//! <h1>{{ title }}</h1>
//! {% for game in game_list %}<a href="{{ game.url }}">{{ game.title }}</a>{% endfor %}
//! {% endblock content %}
//! ```

mod templates;

pub use templates::TemplateEngine;

use serde::Serialize;
use serde_json::{Map, Value};

/// What a controller decided to do with a request
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Render a page with status 200
    Render(Page),
    /// Redirect the browser to another path
    Redirect(String),
}

impl Outcome {
    pub fn redirect(to: impl Into<String>) -> Self {
        Outcome::Redirect(to.into())
    }

    pub fn page(&self) -> Option<&Page> {
        match self {
            Outcome::Render(page) => Some(page),
            Outcome::Redirect(_) => None,
        }
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Outcome::Redirect(to) => Some(to),
            Outcome::Render(_) => None,
        }
    }
}

impl From<Page> for Outcome {
    fn from(page: Page) -> Self {
        Outcome::Render(page)
    }
}

/// A template plus the data it renders
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub template: &'static str,
    pub context: Map<String, Value>,
}

impl Page {
    pub fn new(template: &'static str, title: impl Into<String>) -> Self {
        let mut context = Map::new();
        context.insert("title".into(), Value::String(title.into()));
        Self { template, context }
    }

    /// Add a context entry
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or_default();
        self.context.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }
}
