//! # Template Rendering
//!
//! Templates are rendered with `minijinja`, with the parsed document bound as
//! `data`. Existing property templates are written with dot-rooted paths
//! (`{{.value}}`, `{{.a.b}}`, `{{.}}`), so every dot-rooted path inside a tag
//! is rewritten onto `data` before rendering; plain minijinja expressions such
//! as `{{ data.value | round }}` work unchanged.
//!
//! Output follows the JSON spelling of the document: booleans print as `true`
//! and `false`, and a missing field or a JSON `null` prints as empty text.
//! Walking *through* a missing field (`{{.missing.deeper}}`) is a render error.
//!
//! String literals inside tags are left alone, so `{{ "see .x" }}` prints as is.

use minijinja::value::ValueKind;
use minijinja::{context, escape_formatter, Environment, Error, ErrorKind, Output, State, Value};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::fmt::Write as _;
use std::sync::OnceLock;

const ROOT: &str = "data";

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"(?s)(\{\{|\{%)(.*?)(\}\}|%\})").expect("static regex"))
}

/// A quoted literal, or a dot-rooted path with the character in front of it.
fn dot_path_pattern() -> &'static Regex {
    static DOT_PATH: OnceLock<Regex> = OnceLock::new();
    DOT_PATH.get_or_init(|| {
        Regex::new(concat!(
            r#"(?P<literal>"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*')"#,
            r"|(?P<lead>^|[\s(\[,|=!<>+*/%~-])\.(?P<path>[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)?",
        ))
        .expect("static regex")
    })
}

/// Rewrites dot-rooted paths inside `{{ }}` and `{% %}` tags onto the `data` root.
pub(crate) fn rewrite_dot_paths(source: &str) -> Cow<'_, str> {
    tag_pattern().replace_all(source, |tag: &Captures<'_>| {
        let body = dot_path_pattern().replace_all(&tag[2], |token: &Captures<'_>| {
            if let Some(literal) = token.name("literal") {
                return literal.as_str().to_string();
            }
            let lead = token.name("lead").map_or("", |m| m.as_str());
            match token.name("path") {
                Some(fields) => format!("{}{}.{}", lead, ROOT, fields.as_str()),
                None => format!("{}{}", lead, ROOT),
            }
        });
        format!("{}{}{}", &tag[1], body, &tag[3])
    })
}

fn json_formatter(out: &mut Output<'_>, state: &State<'_, '_>, value: &Value) -> Result<(), Error> {
    match value.kind() {
        ValueKind::Undefined | ValueKind::None => Ok(()),
        ValueKind::Bool => out
            .write_str(if value.is_true() { "true" } else { "false" })
            .map_err(|_| Error::new(ErrorKind::WriteFailure, "failed to write template output")),
        _ => escape_formatter(out, state, value),
    }
}

/// Renders `source` against `data`.
pub fn render(source: &str, data: &serde_json::Value) -> Result<String, Error> {
    let mut env = Environment::new();
    env.set_formatter(json_formatter);
    let source = rewrite_dot_paths(source);
    env.render_str(&source, context! { data => Value::from_serialize(data) })
}
