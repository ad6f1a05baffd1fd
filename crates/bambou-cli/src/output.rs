//! Output formatting: JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Structured formats
//! use serde, plain emits one identifier per line.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list in the chosen format; `plain` prints `id_fn` per item.
pub fn render_list<T: Serialize>(
    format: OutputFormat,
    data: &[T],
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single item in the chosen format.
pub fn render_single<T: Serialize>(
    format: OutputFormat,
    data: &T,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// The `ID` attribute of a raw VSD object, or an empty string.
pub fn object_id(value: &Value) -> String {
    value
        .get("ID")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(rendered)
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_yaml::to_string(data)?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn plain_lists_ids() {
        let data = vec![json!({ "ID": "e-1" }), json!({ "ID": "e-2" }), json!({})];
        let out = render_list(OutputFormat::Plain, &data, object_id).unwrap();
        assert_eq!(out, "e-1\ne-2\n");
    }

    #[test]
    fn compact_json_is_one_line() {
        let out = render_single(OutputFormat::JsonCompact, &json!({ "ID": "e-1" }), object_id)
            .unwrap();
        assert_eq!(out, r#"{"ID":"e-1"}"#);
    }

    #[test]
    fn yaml_renders_mapping() {
        let out = render_single(OutputFormat::Yaml, &json!({ "name": "acme" }), object_id).unwrap();
        assert_eq!(out.trim(), "name: acme");
    }
}
