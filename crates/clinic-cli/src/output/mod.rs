use serde::Serialize;
use serde_json::{Map, Value};

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Columns left out of table views; they stay in json and raw output.
const HIDDEN_COLUMNS: &[&str] = &["clinic_id", "updated_at"];

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(value),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Print long-form text (plans, reports) as-is in table mode; structured otherwise.
pub fn output_text<T: Serialize>(text: &str, value: &T, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Table {
        println!("{text}");
        return Ok(());
    }
    output(value, format)
}

fn table_options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.columns,
        color: prefs.table_color,
    }
}

fn render_table<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let value = serde_json::to_value(value)?;
    match value {
        Value::Array(items) => Ok(render_array_table(&items)),
        Value::Object(map) => Ok(match single_list(&map) {
            Some(items) => render_array_table(items),
            None => render_object_table(map),
        }),
        scalar => {
            let rows = vec![vec![value_to_cell("value", &scalar)]];
            Ok(table::render_entity_table(&["value"], &rows, table_options()))
        }
    }
}

/// `{"patients": [...]}` renders as the list itself.
fn single_list(map: &Map<String, Value>) -> Option<&Vec<Value>> {
    if map.len() != 1 {
        return None;
    }
    map.values().next().and_then(Value::as_array)
}

fn render_object_table(map: Map<String, Value>) -> String {
    let mut entries = map.into_iter().collect::<Vec<_>>();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    let rows = entries
        .into_iter()
        .map(|(key, value)| {
            let cell = value_to_cell(&key, &value);
            vec![display_key(&key).to_string(), cell]
        })
        .collect::<Vec<_>>();
    table::render_entity_table(&["key", "value"], &rows, table_options())
}

fn render_array_table(items: &[Value]) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    if !items.iter().all(Value::is_object) {
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell("value", item)])
            .collect::<Vec<_>>();
        return table::render_entity_table(&["value"], &rows, table_options());
    }

    let mut headers = Vec::<String>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(key) && !HIDDEN_COLUMNS.contains(&key.as_str()) {
                headers.push(key.clone());
            }
        }
    }

    if headers.is_empty() {
        return String::from("(no columns)");
    }

    // `id` first, the rest alphabetical.
    headers.sort_by(|a, b| (a != "id", a).cmp(&(b != "id", b)));

    let header_labels = headers.iter().map(|h| display_key(h)).collect::<Vec<_>>();
    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| {
                    map.get(header)
                        .map_or_else(|| String::from("-"), |value| value_to_cell(header, value))
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    table::render_entity_table(&header_labels, &rows, table_options())
}

/// `amount_cents` is shown as `amount`.
fn display_key(key: &str) -> &str {
    key.strip_suffix("_cents").unwrap_or(key)
}

fn value_to_cell(key: &str, value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Number(n) if key.ends_with("_cents") => n
            .as_i64()
            .map_or_else(|| n.to_string(), format_cents),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

/// `15050` -> `150.50`.
#[must_use]
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::{format_cents, render, table::render_entity_table};
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Entry {
        id: &'static str,
        clinic_id: &'static str,
        amount_cents: i64,
        status: &'static str,
    }

    #[derive(Serialize)]
    struct EntryList {
        entries: Vec<Entry>,
    }

    fn entry(id: &'static str, amount_cents: i64) -> Entry {
        Entry {
            id,
            clinic_id: "cln-1",
            amount_cents,
            status: "pending",
        }
    }

    #[test]
    fn json_render_is_valid_json() {
        let out = render(&entry("led-1", 15_000), OutputFormat::Json).expect("json render");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["id"], "led-1");
        assert_eq!(parsed["amount_cents"], 15_000);
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let out = render(&entry("led-1", 15_000), OutputFormat::Raw).expect("raw render");
        assert!(!out.contains('\n'));
        assert!(out.contains("\"clinic_id\":\"cln-1\""));
    }

    #[test]
    fn table_render_for_object_shows_money() {
        let out = render(&entry("led-1", 15_050), OutputFormat::Table).expect("table render");
        assert!(out.lines().next().is_some_and(|line| line.contains("key")));
        assert!(out.contains("150.50"));
        assert!(out.contains("amount "));
    }

    #[test]
    fn wrapped_list_renders_as_rows_without_hidden_columns() {
        let list = EntryList {
            entries: vec![entry("led-1", 100), entry("led-2", 250_000)],
        };
        let out = render(&list, OutputFormat::Table).expect("table render");
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("id"));
        assert!(!lines[0].contains("clinic_id"));
        assert!(lines[2].contains("1.00"));
        assert!(lines[3].contains("2500.00"));
    }

    #[test]
    fn empty_list_says_so() {
        let list = EntryList { entries: vec![] };
        assert_eq!(render(&list, OutputFormat::Table).expect("render"), "(no rows)");
    }

    #[test]
    fn cents_format() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(-1_250), "-12.50");
    }

    #[test]
    fn table_alignment_handles_mixed_widths() {
        let headers = ["id", "status", "patient"];
        let rows = vec![
            vec!["apt-1".to_string(), "scheduled".to_string(), "pat-1".to_string()],
            vec![
                "apt-200".to_string(),
                "no_show".to_string(),
                "pat-123456".to_string(),
            ],
        ];

        let table = render_entity_table(
            &headers,
            &rows,
            super::table::TableOptions {
                max_width: None,
                color: false,
            },
        );
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("status"));
        assert!(lines[1].chars().all(|c| c == '-'));
    }
}
