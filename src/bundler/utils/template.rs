//! Handlebars rendering for generated text files.

use crate::bundler::error::Result;
use handlebars::Handlebars;
use serde::Serialize;

/// Renders `template` with `data`.
///
/// Output is not HTML-escaped (the templates are shell scripts and desktop
/// entries) and a missing field is an error rather than an empty string.
pub fn render<T: Serialize>(template: &str, data: &T) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);
    Ok(handlebars.render_template(template, data)?)
}
