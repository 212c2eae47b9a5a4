//! Named HTML templates with `{{ title }}` and `{{ body }}` placeholders.

use anyhow::{Context, Result};
use std::{collections::HashMap, path::Path};
use thiserror::Error;
use tokio::fs;

use super::pages::Page;

pub const INDEX: &str = "index";
pub const LOGIN: &str = "login";
pub const FAILED_LOGIN: &str = "failed-login";
pub const VIEW: &str = "view";
pub const EDIT: &str = "edit";

const NAMES: [&str; 5] = [INDEX, LOGIN, FAILED_LOGIN, VIEW, EDIT];

const BUILTIN: [(&str, &str); 5] = [
    (INDEX, include_str!("../../templates/index.html")),
    (LOGIN, include_str!("../../templates/login.html")),
    (FAILED_LOGIN, include_str!("../../templates/failed-login.html")),
    (VIEW, include_str!("../../templates/view.html")),
    (EDIT, include_str!("../../templates/edit.html")),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("template {0:?} is not defined")]
    UnknownTemplate(String),
    #[error("template {template:?}: unknown field {field:?}")]
    UnknownField { template: String, field: String },
    #[error("template {0:?}: unterminated tag")]
    Unterminated(String),
}

#[derive(Clone, Debug)]
pub struct Templates {
    templates: HashMap<String, String>,
}

impl Default for Templates {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Templates {
    /// Templates compiled into the binary.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            templates: BUILTIN
                .iter()
                .map(|(name, source)| ((*name).to_string(), (*source).to_string()))
                .collect(),
        }
    }

    /// Load every template from `<dir>/<name>.html`.
    ///
    /// # Errors
    /// Returns an error if any template file is missing or unreadable.
    pub async fn load(dir: &Path) -> Result<Self> {
        let mut templates = HashMap::new();
        for name in NAMES {
            let path = dir.join(format!("{name}.html"));
            let source = fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read template: {}", path.display()))?;
            templates.insert(name.to_string(), source);
        }
        Ok(Self { templates })
    }

    /// Register or replace a template.
    #[must_use]
    pub fn with_template(mut self, name: &str, source: &str) -> Self {
        self.templates.insert(name.to_string(), source.to_string());
        self
    }

    /// Render `name` with the fields of `page`, HTML-escaped.
    ///
    /// # Errors
    /// Returns a [`RenderError`] for unknown templates, unknown fields, or an
    /// unterminated `{{` tag.
    pub fn render(&self, name: &str, page: &Page) -> Result<String, RenderError> {
        let source = self
            .templates
            .get(name)
            .ok_or_else(|| RenderError::UnknownTemplate(name.to_string()))?;

        let mut output = String::with_capacity(source.len() + page.body.len());
        let mut rest = source.as_str();
        while let Some(start) = rest.find("{{") {
            output.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after
                .find("}}")
                .ok_or_else(|| RenderError::Unterminated(name.to_string()))?;
            let value = match after[..end].trim() {
                "title" => &page.title,
                "body" => &page.body,
                field => {
                    return Err(RenderError::UnknownField {
                        template: name.to_string(),
                        field: field.to_string(),
                    })
                }
            };
            output.push_str(&escape_html(value));
            rest = &after[end + 2..];
        }
        output.push_str(rest);

        Ok(output)
    }
}

#[must_use]
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::pages::tests::TempDir;

    #[test]
    fn builtin_templates_render() {
        let templates = Templates::builtin();
        let page = Page::new("Front").with_body("hello");
        for name in NAMES {
            let rendered = templates.render(name, &page);
            assert!(rendered.is_ok(), "{name}: {rendered:?}");
        }
    }

    #[test]
    fn login_template_shows_title() {
        let html = Templates::builtin()
            .render(LOGIN, &Page::new("Login to Marketplace"))
            .unwrap_or_default();
        assert!(html.contains("<title>Login to Marketplace</title>"));
        assert!(html.contains(r#"name="password""#));
    }

    #[test]
    fn render_escapes_fields() {
        let templates = Templates::builtin().with_template("t", "<p>{{ title }}|{{body}}</p>");
        let page = Page::new("a&b").with_body("<script>'x'</script>");
        assert_eq!(
            templates.render("t", &page),
            Ok("<p>a&amp;b|&lt;script&gt;&#39;x&#39;&lt;/script&gt;</p>".to_string())
        );
    }

    #[test]
    fn render_unknown_template_fails() {
        assert_eq!(
            Templates::builtin().render("missing", &Page::default()),
            Err(RenderError::UnknownTemplate("missing".to_string()))
        );
    }

    #[test]
    fn render_unknown_field_fails() {
        let templates = Templates::builtin().with_template("t", "{{ author }}");
        assert_eq!(
            templates.render("t", &Page::default()),
            Err(RenderError::UnknownField {
                template: "t".to_string(),
                field: "author".to_string(),
            })
        );
    }

    #[test]
    fn render_unterminated_tag_fails() {
        let templates = Templates::builtin().with_template("t", "<h1>{{ title </h1>");
        assert_eq!(
            templates.render("t", &Page::default()),
            Err(RenderError::Unterminated("t".to_string()))
        );
    }

    #[tokio::test]
    async fn load_reads_every_template() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        for name in NAMES {
            std::fs::write(dir.path().join(format!("{name}.html")), format!("{name}:{{{{ title }}}}"))?;
        }

        let templates = Templates::load(dir.path()).await?;
        assert_eq!(templates.render(VIEW, &Page::new("Front"))?, "view:Front");
        Ok(())
    }

    #[tokio::test]
    async fn load_fails_on_missing_template() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        std::fs::write(dir.path().join("index.html"), "index")?;

        assert!(Templates::load(dir.path()).await.is_err());
        Ok(())
    }
}
