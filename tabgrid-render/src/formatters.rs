//! One pure formatting function per [`ColumnType`].

use chrono::{DateTime, NaiveTime};
use serde_json::Value;
use tabgrid_types::value::{normalize_bool, parse_number, parse_timestamp_millis, scalar_to_string};
use tabgrid_types::{ColumnType, FieldMeta};
use tracing::debug;

use crate::html::escape_html;
use crate::renderer::Renderer;

/// `(renderer, field meta, raw value) -> HTML`.
pub type FormatFn = fn(&Renderer, &FieldMeta, Option<&Value>) -> String;

/// The formatter table.
pub fn formatter_for(column_type: ColumnType) -> FormatFn {
    match column_type {
        ColumnType::Boolean => format_boolean,
        ColumnType::Integer | ColumnType::Number | ColumnType::Money => format_number,
        ColumnType::Date | ColumnType::DateTime | ColumnType::Time => format_temporal,
        ColumnType::File => format_file,
        ColumnType::Image => format_image,
        ColumnType::Value => format_value,
        ColumnType::Textbox => format_textbox,
        ColumnType::Html => format_html,
        ColumnType::Text | ColumnType::Hidden => format_default,
    }
}

/// Null, missing and `""` count as no value.
fn present(value: Option<&Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(v) => Some(v),
    }
}

fn display_string(value: &Value) -> String {
    match value {
        Value::Array(_) | Value::Object(_) => value.to_string(),
        scalar => scalar_to_string(scalar),
    }
}

fn format_default(renderer: &Renderer, _meta: &FieldMeta, value: Option<&Value>) -> String {
    let Some(raw) = present(value) else {
        return renderer.placeholder_html().to_string();
    };
    let text = display_string(raw);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return renderer.placeholder_html().to_string();
    }
    escape_html(trimmed)
}

fn format_number(renderer: &Renderer, meta: &FieldMeta, value: Option<&Value>) -> String {
    let Some(raw) = present(value) else {
        return renderer.placeholder_html().to_string();
    };
    let number = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
            parse_number(&compact)
        }
        _ => None,
    };
    match (number, renderer.number_format(meta)) {
        (Some(n), Some(format)) => escape_html(&format.format(n)),
        _ => escape_html(&display_string(raw)),
    }
}

/// Ten-digit strings are unix seconds, other digit strings milliseconds.
fn timestamp_from_text(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        let n: i64 = trimmed.parse().ok()?;
        return if trimmed.len() == 10 {
            n.checked_mul(1000)
        } else {
            Some(n)
        };
    }
    parse_timestamp_millis(trimmed)
}

fn parse_clock(text: &str) -> Option<NaiveTime> {
    let trimmed = text.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .ok()
}

fn format_temporal(renderer: &Renderer, meta: &FieldMeta, value: Option<&Value>) -> String {
    let Some(raw) = present(value) else {
        return renderer.placeholder_html().to_string();
    };
    let column_type = meta.column_type();
    let format = renderer.date_format(column_type);

    let millis = match raw {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => timestamp_from_text(s),
        _ => None,
    };
    if let Some(moment) = millis.and_then(DateTime::from_timestamp_millis) {
        return escape_html(&format.format(&moment.naive_utc()));
    }

    if column_type == ColumnType::Time {
        if let Some(clock) = raw.as_str().and_then(parse_clock) {
            return escape_html(&format.format_time(&clock));
        }
    } else {
        debug!(field_type = %meta.type_name(), raw = %raw, "unparsable date value");
    }
    escape_html(&display_string(raw))
}

fn format_boolean(renderer: &Renderer, _meta: &FieldMeta, value: Option<&Value>) -> String {
    let Some(raw) = present(value) else {
        return format!(r#"<span class="text-muted">{}</span>"#, renderer.placeholder_html());
    };
    let config = renderer.config();
    let (title, icon) = if normalize_bool(raw) {
        (
            &config.yes_label,
            r#"<span class="badge bg-success" aria-hidden="true">✓</span>"#,
        )
    } else {
        (
            &config.no_label,
            r#"<span class="badge bg-danger" aria-hidden="true">✕</span>"#,
        )
    };
    let title = escape_html(title);
    format!(
        r#"<span class="d-inline-flex align-items-center gap-2" title="{title}" aria-label="{title}">{icon}</span>"#
    )
}

fn first_text(map: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .map(scalar_to_string)
        .find(|text| !text.is_empty())
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn format_file(renderer: &Renderer, _meta: &FieldMeta, value: Option<&Value>) -> String {
    let Some(raw) = present(value) else {
        return renderer.placeholder_html().to_string();
    };
    let (url, title) = match raw {
        Value::Object(map) => {
            let url = first_text(map, &["url", "href", "path", "value"]).unwrap_or_default();
            let title = first_text(map, &["name", "title"]).unwrap_or_else(|| url.clone());
            (url, title)
        }
        other => {
            let url = scalar_to_string(other);
            (url.clone(), url)
        }
    };
    if url.is_empty() {
        return renderer.placeholder_html().to_string();
    }

    let href = escape_html(&renderer.resolve_media_url(&url));
    let label = escape_html(file_name(&title));
    format!(
        r#"<a href="{href}" target="_blank" rel="noopener" class="text-decoration-none">📎 {label}</a>"#
    )
}

fn format_image(renderer: &Renderer, meta: &FieldMeta, value: Option<&Value>) -> String {
    let Some(raw) = present(value) else {
        return renderer.placeholder_html().to_string();
    };
    let src = escape_html(&format!(
        "{}w40-h40/{}",
        renderer.config().resizer_base,
        display_string(raw)
    ));
    let alt = escape_html(meta.title.as_deref().unwrap_or_default());
    format!(r#"<img src="{src}" alt="{alt}" width="40" height="40" class="img-thumbnail rounded" />"#)
}

fn format_value(renderer: &Renderer, _meta: &FieldMeta, value: Option<&Value>) -> String {
    let Some(raw) = present(value) else {
        return renderer.placeholder_html().to_string();
    };
    match raw.get("value") {
        Some(inner) if raw.is_object() => escape_html(&display_string(inner)),
        _ => escape_html(&display_string(raw)),
    }
}

fn format_textbox(renderer: &Renderer, _meta: &FieldMeta, value: Option<&Value>) -> String {
    let Some(raw) = present(value) else {
        return renderer.placeholder_html().to_string();
    };
    let joined = match raw {
        Value::Object(map) => map.values().map(display_string).collect::<Vec<_>>().join(", "),
        Value::Array(items) => items.iter().map(display_string).collect::<Vec<_>>().join(", "),
        scalar => scalar_to_string(scalar),
    };
    escape_html(&joined)
}

/// Server-trusted markup, passed through unescaped.
fn format_html(renderer: &Renderer, _meta: &FieldMeta, value: Option<&Value>) -> String {
    match present(value) {
        Some(raw) => display_string(raw),
        None => renderer.placeholder_html().to_string(),
    }
}
