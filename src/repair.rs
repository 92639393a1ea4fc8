//! Turns unreliable generator output into a drawable [`ChartSpec`].
//!
//! Every function here is total: whatever the input looks like, the caller
//! gets back a spec whose type tag is one of the seven known shapes, whose
//! title is non-empty, and whose data block is structurally sound. Shape
//! problems are repaired from the result set, never reported as errors.

use crate::extract;
use crate::spec::{
    Annotation, ChartData, ChartOptions, ChartSpec, ChartType, Dataset, Scales, TrendLine,
};
use crate::table::{stringify_cell, ResultSet};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Repair raw generator text into a drawable spec.
///
/// The first fenced code block is tried as JSON; without a fence, the span
/// from the first `{` to the last `}`. A candidate that does not parse to
/// an object is discarded and the spec is synthesized from the table.
pub fn validate_and_repair(raw: &str, table: &ResultSet) -> ChartSpec {
    let candidate = extract::fenced_json(raw).or_else(|| extract::brace_span(raw));

    let parsed = candidate.and_then(|text| serde_json::from_str::<Value>(text.trim()).ok());
    match parsed {
        Some(value) => repair_value(value, table),
        None => {
            warn!("no usable chart JSON in generator output, synthesizing default");
            default_spec(table)
        }
    }
}

/// Repair an already-parsed JSON value. Non-objects fall back to the
/// synthesized default.
pub fn repair_value(value: Value, table: &ResultSet) -> ChartSpec {
    let obj = match value {
        Value::Object(obj) => obj,
        other => {
            warn!("chart JSON is not an object ({other}), synthesizing default");
            return default_spec(table);
        }
    };

    let chart_type = match obj.get("type").and_then(Value::as_str) {
        Some(tag) => ChartType::parse(tag).unwrap_or_else(|| {
            debug!("unknown chart type tag {tag:?}, using bar");
            ChartType::Bar
        }),
        None => ChartType::Bar,
    };

    let title = match obj.get("title").and_then(Value::as_str) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => "Data Chart".to_string(),
    };

    // An empty string counts as present; only absence gets the default.
    let description = obj
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{title} is shown."));

    let data = repair_data(obj.get("data"), table);
    let options = repair_options(obj.get("options"));

    let style = obj
        .get("style")
        .and_then(Value::as_str)
        .map(str::to_string);
    let figsize = obj
        .get("figsize")
        .and_then(|v| serde_json::from_value(v.clone()).ok());

    ChartSpec {
        chart_type,
        title,
        description,
        data,
        options,
        style,
        figsize,
    }
}

fn repair_data(data: Option<&Value>, table: &ResultSet) -> ChartData {
    let empty = Map::new();
    let data = data.and_then(Value::as_object).unwrap_or(&empty);

    let labels = match data.get("labels").and_then(Value::as_array) {
        Some(cells) => cells.iter().map(stringify_cell).collect(),
        None => default_labels(table),
    };

    let mut datasets: Vec<Dataset> = data
        .get("datasets")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .enumerate()
                .filter_map(|(idx, entry)| coerce_dataset(idx, entry))
                .collect()
        })
        .unwrap_or_default();

    if datasets.is_empty() {
        datasets = default_datasets(table);
    }

    ChartData { labels, datasets }
}

/// One value column per non-first table column; empty for thin tables.
fn default_datasets(table: &ResultSet) -> Vec<Dataset> {
    if table.is_empty() || table.column_count() < 2 {
        return Vec::new();
    }
    (1..table.column_count())
        .map(|idx| Dataset::new(table.columns[idx].clone(), table.numeric_column(idx)))
        .collect()
}

fn default_labels(table: &ResultSet) -> Vec<String> {
    if table.is_empty() {
        Vec::new()
    } else {
        table.label_column(0)
    }
}

fn coerce_dataset(idx: usize, entry: &Value) -> Option<Dataset> {
    let obj = entry.as_object()?;

    let label = obj
        .get("label")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Series {}", idx + 1));

    let data = obj
        .get("data")
        .and_then(Value::as_array)
        .map(|cells| cells.iter().map(coerce_cell).collect())
        .unwrap_or_default();

    Some(Dataset { label, data })
}

/// Numbers stay, numeric strings parse, everything else is null.
fn coerce_cell(cell: &Value) -> Option<f64> {
    match cell {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn repair_options(options: Option<&Value>) -> ChartOptions {
    let empty = Map::new();
    let options = options.and_then(Value::as_object).unwrap_or(&empty);

    let scales = options
        .get("scales")
        .and_then(|v| serde_json::from_value::<Scales>(v.clone()).ok())
        .unwrap_or_default();

    let trend_lines = options
        .get("trendLines")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| serde_json::from_value::<TrendLine>(entry.clone()).ok())
                .collect()
        })
        .unwrap_or_default();

    let annotations = options
        .get("annotations")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(coerce_annotation).collect())
        .unwrap_or_default();

    ChartOptions {
        scales,
        trend_lines,
        annotations,
    }
}

/// Annotations with a numeric `x` still need to match string labels, so the
/// anchor is stringified before the typed parse.
fn coerce_annotation(entry: &Value) -> Option<Annotation> {
    let mut entry = entry.clone();
    if let Some(obj) = entry.as_object_mut() {
        if let Some(x) = obj.get("x") {
            if !x.is_string() {
                let anchor = stringify_cell(x);
                obj.insert("x".to_string(), Value::String(anchor));
            }
        }
    }
    serde_json::from_value(entry).ok()
}

/// Spec synthesized entirely from the result set, used when no usable JSON
/// arrived.
pub fn default_spec(table: &ResultSet) -> ChartSpec {
    if table.is_empty() {
        return ChartSpec {
            title: "No Data".to_string(),
            description: "The query returned no rows.".to_string(),
            ..ChartSpec::default()
        };
    }

    if table.column_count() >= 2 {
        let x_column = &table.columns[0];
        let y_columns = table.columns[1..].join(", ");
        return ChartSpec {
            title: format!("{y_columns} by {x_column}"),
            description: format!("Shows how {y_columns} vary by {x_column}."),
            data: ChartData {
                labels: table.label_column(0),
                datasets: default_datasets(table),
            },
            ..ChartSpec::default()
        };
    }

    // Single column: values plotted against their row index.
    let column = &table.columns[0];
    ChartSpec {
        title: format!("{column} Chart"),
        description: format!("Shows the distribution of {column}."),
        data: ChartData {
            labels: (0..table.row_count()).map(|i| i.to_string()).collect(),
            datasets: vec![Dataset::new(column.clone(), table.numeric_column(0))],
        },
        ..ChartSpec::default()
    }
}

/// Caption text for a rendered chart: the spec's own description when it
/// has one, a generated sentence otherwise.
pub fn summarize(spec: &ChartSpec, table: &ResultSet) -> String {
    if !spec.description.is_empty() {
        return spec.description.clone();
    }

    let mut text = format!(
        "{} is shown as a {}.",
        spec.title,
        spec.chart_type.display_name()
    );
    if !table.is_empty() {
        text.push_str(&format!(
            " This chart is based on {} rows of data.",
            table.row_count()
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_table() -> ResultSet {
        ResultSet::new(
            vec![
                "Q".to_string(),
                "revenue".to_string(),
                "profit".to_string(),
            ],
            vec![
                vec![json!("Q1"), json!(100), json!(20)],
                vec![json!("Q2"), json!(120), json!(25)],
                vec![json!("Q3"), json!(90), json!(18)],
            ],
        )
    }

    #[test]
    fn test_empty_object_fills_everything_from_table() {
        let spec = validate_and_repair("{}", &make_table());

        assert_eq!(spec.chart_type, ChartType::Bar);
        assert_eq!(spec.title, "Data Chart");
        assert_eq!(spec.description, "Data Chart is shown.");
        assert_eq!(spec.data.labels, vec!["Q1", "Q2", "Q3"]);
        assert_eq!(spec.data.datasets.len(), 2);
        assert_eq!(spec.data.datasets[0].label, "revenue");
        assert_eq!(spec.data.datasets[1].label, "profit");
        assert_eq!(
            spec.data.datasets[0].data,
            vec![Some(100.0), Some(120.0), Some(90.0)]
        );
    }

    #[test]
    fn test_garbage_text_synthesizes_default() {
        let spec = validate_and_repair("%%% nothing json-like here", &make_table());

        assert_eq!(spec.chart_type, ChartType::Bar);
        assert_eq!(spec.title, "revenue, profit by Q");
        assert_eq!(spec.data.labels, vec!["Q1", "Q2", "Q3"]);
        assert_eq!(spec.data.datasets.len(), 2);
    }

    #[test]
    fn test_fenced_json_is_preferred() {
        let raw = "Sure! Here is the chart:\n```json\n{\"type\": \"pie\", \"title\": \"Split\"}\n```";
        let spec = validate_and_repair(raw, &make_table());

        assert_eq!(spec.chart_type, ChartType::Pie);
        assert_eq!(spec.title, "Split");
    }

    #[test]
    fn test_brace_span_without_fence() {
        let raw = "chart follows {\"type\": \"line\", \"title\": \"Trend\"} hope it helps";
        let spec = validate_and_repair(raw, &make_table());

        assert_eq!(spec.chart_type, ChartType::Line);
        assert_eq!(spec.title, "Trend");
    }

    #[test]
    fn test_unknown_type_becomes_bar() {
        let spec = repair_value(json!({"type": "donut"}), &make_table());
        assert_eq!(spec.chart_type, ChartType::Bar);

        let spec = repair_value(json!({"type": 7}), &make_table());
        assert_eq!(spec.chart_type, ChartType::Bar);
    }

    #[test]
    fn test_empty_title_is_replaced_but_empty_description_kept() {
        let spec = repair_value(
            json!({"title": "", "description": ""}),
            &make_table(),
        );
        assert_eq!(spec.title, "Data Chart");
        assert_eq!(spec.description, "");
    }

    #[test]
    fn test_dataset_coercion() {
        let spec = repair_value(
            json!({
                "data": {
                    "labels": ["a", 2, null],
                    "datasets": [
                        {"label": "s1", "data": [1, "2.5", "x", null, true]},
                        "not a dataset",
                        {"data": [3]}
                    ]
                }
            }),
            &make_table(),
        );

        assert_eq!(spec.data.labels, vec!["a", "2", ""]);
        assert_eq!(spec.data.datasets.len(), 2);
        assert_eq!(
            spec.data.datasets[0].data,
            vec![Some(1.0), Some(2.5), None, None, None]
        );
        // Dropped entries do not shift the numbering of later ones
        assert_eq!(spec.data.datasets[1].label, "Series 3");
    }

    #[test]
    fn test_all_datasets_dropped_falls_back_to_table() {
        let spec = repair_value(
            json!({"data": {"datasets": [42, "junk"]}}),
            &make_table(),
        );
        assert_eq!(spec.data.datasets.len(), 2);
        assert_eq!(spec.data.datasets[0].label, "revenue");
    }

    #[test]
    fn test_options_survive_partial_damage() {
        let spec = repair_value(
            json!({
                "options": {
                    "scales": {"y": {"min": 0, "max": 50}},
                    "trendLines": [{"color": "#ff0000"}, 13],
                    "annotations": [
                        {"x": 2, "y": 1.0, "content": "numeric anchor"},
                        {"y": "broken"}
                    ]
                }
            }),
            &make_table(),
        );

        assert_eq!(spec.y_bounds(), Some((0.0, 50.0)));
        assert_eq!(spec.options.trend_lines.len(), 1);
        assert_eq!(spec.options.annotations.len(), 1);
        assert_eq!(spec.options.annotations[0].x, "2");
    }

    #[test]
    fn test_default_spec_single_column_uses_index_labels() {
        let table = ResultSet::new(
            vec!["count".to_string()],
            vec![vec![json!(4)], vec![json!(7)]],
        );
        let spec = default_spec(&table);

        assert_eq!(spec.title, "count Chart");
        assert_eq!(spec.data.labels, vec!["0", "1"]);
        assert_eq!(spec.data.datasets.len(), 1);
        assert_eq!(spec.data.datasets[0].data, vec![Some(4.0), Some(7.0)]);
    }

    #[test]
    fn test_default_spec_empty_table() {
        let spec = default_spec(&ResultSet::empty());

        assert_eq!(spec.chart_type, ChartType::Bar);
        assert_eq!(spec.title, "No Data");
        assert!(spec.data.labels.is_empty());
        assert!(spec.data.datasets.is_empty());
    }

    #[test]
    fn test_summarize_prefers_existing_description() {
        let table = make_table();
        let mut spec = repair_value(json!({"title": "Revenue"}), &table);
        assert_eq!(summarize(&spec, &table), "Revenue is shown.");

        spec.description.clear();
        assert_eq!(
            summarize(&spec, &table),
            "Revenue is shown as a bar chart. This chart is based on 3 rows of data."
        );
        assert_eq!(
            summarize(&spec, &ResultSet::empty()),
            "Revenue is shown as a bar chart."
        );
    }
}
