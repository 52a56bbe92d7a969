#![forbid(unsafe_code)]

//! Template-to-markup seam.
//!
//! Markup generation is an external collaborator: anything implementing
//! [`TemplateRenderer`] can produce a row's markup, and the built-in
//! [`RowTemplate`] is one such implementation. Renderers must be pure
//! (identical inputs produce identical markup) because the reconciler
//! renders every row before touching the live fragment and relies on a
//! failed render leaving no trace.

use std::fmt;

use limelight_core::order::DisplayRow;

/// The row template every panel renders with.
pub const ROW_TEMPLATE: &str = "token-participant";

/// Markup generation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateError {
    /// The template that was requested.
    pub template: String,
    /// Renderer-specific description.
    pub message: String,
}

impl TemplateError {
    /// Convenience constructor.
    #[must_use]
    pub fn new(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "template {:?} failed to render: {}", self.template, self.message)
    }
}

impl std::error::Error for TemplateError {}

/// Renders one display row to markup. Pure and side-effect free.
pub trait TemplateRenderer {
    /// Produce markup for `row` using the named template.
    fn render(&self, template: &str, row: &DisplayRow) -> Result<String, TemplateError>;
}

/// The built-in row renderer.
///
/// Produces one `<li>` per row carrying the data attributes the
/// interaction bridge resolves targets from. Only [`ROW_TEMPLATE`] is
/// known; other template names fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowTemplate;

impl TemplateRenderer for RowTemplate {
    fn render(&self, template: &str, row: &DisplayRow) -> Result<String, TemplateError> {
        if template != ROW_TEMPLATE {
            return Err(TemplateError::new(template, "unknown template"));
        }

        let id = escape(row.participant_id.as_str());
        let name = escape(&row.name);

        let mut classes = String::from("token-participant");
        if row.is_current {
            classes.push_str(" current-turn");
        }
        if row.is_requesting {
            classes.push_str(" requesting");
        }

        let mut markup = String::with_capacity(256);
        markup.push_str(&format!(
            "<li class=\"{classes}\" data-participant-id=\"{id}\" data-action=\"select-participant\""
        ));
        if let Some(token) = &row.token {
            markup.push_str(&format!(" data-token-id=\"{}\"", escape(&token.0)));
        }
        markup.push('>');
        markup.push_str(&format!("<span class=\"name\">{name}</span>"));

        if row.is_current {
            markup.push_str(
                "<svg class=\"spotlight-svg\"><defs><linearGradient>\
                 <stop class=\"stop-middle\" offset=\"0%\"/>\
                 </linearGradient></defs></svg>",
            );
        }

        if row.is_requesting {
            markup.push_str(&format!(
                "<div class=\"request-orbit\" data-orbit-id=\"{id}\">\
                 <span class=\"satellite\"></span></div>"
            ));
        }

        if row.viewer_is_privileged {
            markup.push_str(
                "<button class=\"spotlight-anchor\" data-action=\"assign-spotlight\" \
                 type=\"button\"></button>",
            );
        }

        markup.push_str(
            "<button class=\"request-toggle\" data-action=\"request-spotlight\" \
             type=\"button\"></button>",
        );
        markup.push_str("</li>");
        Ok(markup)
    }
}

/// Minimal markup escaping for attribute and text positions.
#[must_use]
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
