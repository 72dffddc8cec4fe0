//! Description templates rendered with Handlebars.
//!
//! Templates see the event as JSON, so `{{check.output}}`,
//! `{{entity.metadata.name}}` or `{{check.status}}` all resolve. Output is
//! not HTML-escaped and unknown fields render as empty strings.

use handlebars::{no_escape, Handlebars, RenderError};

use crate::event::Event;

/// Render `template` against `event`.
pub fn render(template: &str, event: &Event) -> Result<String, RenderError> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(false);
    handlebars.register_escape_fn(no_escape);

    let rendered = handlebars.render_template(template, event)?;
    Ok(expand_newlines(&rendered))
}

/// Turn literal `\n` sequences into real newlines.
///
/// Templates passed through environment variables or annotations can only
/// carry the escaped form.
#[must_use]
pub fn expand_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}
