use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::io;
use std::path::Path;

/// Tabular query output handed to the repair and render stages.
///
/// Cells keep their JSON values; the accessors below apply the label and
/// numeric coercions the chart strategies expect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// True when there is nothing to plot: no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell values of one column rendered as axis labels.
    pub fn label_column(&self, idx: usize) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.get(idx).map(stringify_cell).unwrap_or_default())
            .collect()
    }

    /// Cell values of one column as numbers; non-numeric cells become None.
    pub fn numeric_column(&self, idx: usize) -> Vec<Option<f64>> {
        self.rows
            .iter()
            .map(|row| row.get(idx).and_then(cell_as_f64))
            .collect()
    }

    /// Read a ResultSet from CSV with a header row. Numeric-looking cells
    /// are stored as numbers, empty cells as null.
    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let columns: Vec<String> = rdr
            .headers()
            .context("Failed to read CSV headers")?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.context("Failed to read CSV record")?;
            rows.push(record.iter().map(parse_csv_cell).collect());
        }

        Ok(Self { columns, rows })
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())
            .with_context(|| format!("Failed to open {}", path.as_ref().display()))?;
        Self::from_csv_reader(file)
    }

    /// Build a ResultSet from a JSON array of objects. Column order comes
    /// from the first object; missing fields become null. An empty array
    /// yields an empty ResultSet.
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        if array.is_empty() {
            return Ok(Self::empty());
        }

        let first_obj = array[0]
            .as_object()
            .ok_or_else(|| anyhow!("Items in array must be objects"))?;
        let columns: Vec<String> = first_obj.keys().cloned().collect();

        let mut rows = Vec::new();
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Items in array must be objects"))?;

            let row = columns
                .iter()
                .map(|column| obj.get(column).cloned().unwrap_or(Value::Null))
                .collect();
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }
}

pub(crate) fn stringify_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn cell_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_csv_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = cell.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = cell.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(cell.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_table() -> ResultSet {
        ResultSet::new(
            vec!["quarter".to_string(), "revenue".to_string()],
            vec![
                vec![json!("Q1"), json!(120)],
                vec![json!("Q2"), json!("135.5")],
                vec![json!("Q3"), json!(null)],
            ],
        )
    }

    #[test]
    fn test_label_column_stringifies_cells() {
        let table = make_table();
        assert_eq!(table.label_column(0), vec!["Q1", "Q2", "Q3"]);
        assert_eq!(table.label_column(1), vec!["120", "135.5", ""]);
    }

    #[test]
    fn test_numeric_column_coerces_strings_and_nulls() {
        let table = make_table();
        assert_eq!(
            table.numeric_column(1),
            vec![Some(120.0), Some(135.5), None]
        );
        // Non-numeric text is null, not an error
        assert_eq!(table.numeric_column(0), vec![None, None, None]);
    }

    #[test]
    fn test_out_of_range_column_is_all_default() {
        let table = make_table();
        assert_eq!(table.label_column(5), vec!["", "", ""]);
        assert_eq!(table.numeric_column(5), vec![None, None, None]);
    }

    #[test]
    fn test_is_empty() {
        assert!(ResultSet::empty().is_empty());
        assert!(ResultSet::new(vec!["a".to_string()], vec![]).is_empty());
        assert!(!make_table().is_empty());
    }

    #[test]
    fn test_from_csv_parses_numbers() {
        let csv = "month,sales\nJan,100\nFeb,110.5\nMar,\n";
        let table = ResultSet::from_csv_reader(csv.as_bytes()).unwrap();

        assert_eq!(table.columns, vec!["month", "sales"]);
        assert_eq!(table.rows[0], vec![json!("Jan"), json!(100)]);
        assert_eq!(table.rows[1][1], json!(110.5));
        assert_eq!(table.rows[2][1], Value::Null);
    }

    #[test]
    fn test_from_json_array_of_objects() {
        let value = json!([
            {"region": "north", "total": 10},
            {"region": "south"}
        ]);
        let table = ResultSet::from_json(&value).unwrap();

        assert_eq!(table.columns, vec!["region", "total"]);
        assert_eq!(table.rows[0], vec![json!("north"), json!(10)]);
        assert_eq!(table.rows[1][1], Value::Null);
    }

    #[test]
    fn test_from_json_empty_array_is_empty_table() {
        let table = ResultSet::from_json(&json!([])).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_from_json_rejects_non_arrays() {
        assert!(ResultSet::from_json(&json!({"a": 1})).is_err());
        assert!(ResultSet::from_json(&json!([1, 2, 3])).is_err());
    }
}
