//! YAML frontmatter parsing and rendering
//!
//! Documents are markdown files with YAML frontmatter delimited by `---`:
//!
//! ```markdown
//! ---
//! name: Role-Playing Game
//! ---
//!
//! Control a character or party of characters as they do heroic stuff.
//! ```

use super::document::Fields;
use crate::error::{Error, Result};

/// Parse YAML frontmatter from markdown content
pub fn parse(content: &str) -> Result<(Fields, String)> {
    let content = content.trim_start();

    let Some(rest) = content.strip_prefix("---") else {
        // No frontmatter, entire content is body
        return Ok((Fields::new(), content.to_string()));
    };

    let (yaml, body) = rest.split_once("\n---").ok_or_else(|| Error::YamlParseError {
        message: "unclosed frontmatter: missing closing ---".into(),
    })?;

    let yaml = yaml.trim();
    let fields = if yaml.is_empty() {
        Fields::new()
    } else {
        // Anything but a mapping of scalars and lists is rejected here
        serde_yaml::from_str::<Option<Fields>>(yaml)?.unwrap_or_default()
    };

    Ok((fields, body.trim_start_matches('\n').to_string()))
}

/// Render fields and body back to markdown with frontmatter
pub fn render(fields: &Fields, body: &str) -> Result<String> {
    let yaml = serde_yaml::to_string(fields).map_err(|e| Error::YamlSerializeError {
        message: e.to_string(),
    })?;

    Ok(format!("---\n{}---\n\n{}", yaml, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::document::Value;

    #[test]
    fn test_parse_frontmatter() {
        let content = r#"---
title: Elden Ring
price: 49.99
stock: 4
genre:
  - rpg
  - action
---

Explore a massive, mysterious world.
"#;

        let (fields, body) = parse(content).unwrap();

        assert_eq!(fields.get("title"), Some(&Value::String("Elden Ring".into())));
        assert_eq!(fields.get("price"), Some(&Value::Float(49.99)));
        assert_eq!(fields.get("stock"), Some(&Value::Int(4)));
        assert_eq!(fields.get("genre").and_then(Value::as_array).map(Vec::len), Some(2));
        assert!(body.starts_with("Explore"));
    }

    #[test]
    fn test_no_frontmatter() {
        let (fields, body) = parse("Just a description.").unwrap();

        assert!(fields.is_empty());
        assert_eq!(body, "Just a description.");
    }

    #[test]
    fn test_unclosed_frontmatter() {
        assert!(parse("---\nname: PC\n").is_err());
    }

    #[test]
    fn test_unsupported_values_rejected() {
        assert!(parse("---\nname: PC\nretired: true\n---\n").is_err());
        assert!(parse("---\nname: PC\nmaker:\n  name: IBM\n---\n").is_err());
        assert!(parse("---\n- just\n- a list\n---\n").is_err());
    }

    #[test]
    fn test_empty_frontmatter() {
        let (fields, body) = parse("---\n---\n\nOnly a body.").unwrap();

        assert!(fields.is_empty());
        assert_eq!(body, "Only a body.");
    }

    #[test]
    fn test_numeric_looking_strings_stay_strings() {
        let mut fields = Fields::new();
        fields.insert("title".into(), Value::String("1942".into()));
        fields.insert("company".into(), Value::String("true".into()));

        let rendered = render(&fields, "").unwrap();
        let (parsed, body) = parse(&rendered).unwrap();

        assert_eq!(parsed, fields);
        assert!(body.is_empty());
    }

    #[test]
    fn test_fields_render_sorted() {
        let mut fields = Fields::new();
        fields.insert("stock".into(), Value::Int(1));
        fields.insert("price".into(), Value::Float(9.5));

        let rendered = render(&fields, "body").unwrap();
        let price_at = rendered.find("price").unwrap();
        let stock_at = rendered.find("stock").unwrap();
        assert!(price_at < stock_at);
        assert!(rendered.ends_with("\n\nbody"));
    }
}
