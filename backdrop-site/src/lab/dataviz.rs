//! Chart data from an uploaded CSV or JSON file.

use crate::error::VizError;
use serde_json::Value;

/// Tallest bar in pixels.
pub const BAR_MAX_HEIGHT: f64 = 120.0;
/// Shortest bar in pixels, so zero values stay visible.
pub const BAR_MIN_HEIGHT: f64 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
}

impl DataPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Placeholder series shown before anything is uploaded.
pub fn default_series() -> Vec<DataPoint> {
    ["Jan", "Feb", "Mar", "Apr", "May", "Jun"]
        .into_iter()
        .map(|m| DataPoint::new(m, 0.0))
        .collect()
}

/// Parse by file extension. Unknown extensions yield the default series.
pub fn parse(content: &str, filename: &str) -> Result<Vec<DataPoint>, VizError> {
    let name = filename.to_lowercase();
    if name.ends_with(".json") {
        parse_json(content)
    } else if name.ends_with(".csv") {
        parse_csv(content)
    } else {
        Ok(default_series())
    }
}

/// Like [`parse`], but a parse error or an empty result keeps the defaults.
pub fn parse_or_default(content: &str, filename: &str) -> Vec<DataPoint> {
    match parse(content, filename) {
        Ok(points) if !points.is_empty() => points,
        _ => default_series(),
    }
}

fn label_of(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn number_of(v: &Value) -> f64 {
    let n = match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_number(s),
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

fn parse_number(s: &str) -> f64 {
    s.trim().parse().ok().filter(|n: &f64| n.is_finite()).unwrap_or(0.0)
}

/// First key present with a non-null value.
fn first<'a>(obj: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k).filter(|v| !v.is_null()))
}

/// `[{label|name|x, value|y}, ...]` or `{labels|x: [...], values|y: [...]}`.
pub fn parse_json(content: &str) -> Result<Vec<DataPoint>, VizError> {
    let parsed: Value = serde_json::from_str(content)?;
    let points = match &parsed {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                let empty = serde_json::Map::new();
                let obj = item.as_object().unwrap_or(&empty);
                DataPoint {
                    label: first(obj, &["label", "name", "x"]).map(label_of).unwrap_or_default(),
                    value: first(obj, &["value", "y"]).map_or(0.0, number_of),
                }
            })
            .collect(),
        Value::Object(obj) => {
            let labels = first(obj, &["labels", "x"]).and_then(Value::as_array);
            let values = first(obj, &["values", "y"]).and_then(Value::as_array);
            labels
                .into_iter()
                .flatten()
                .enumerate()
                .map(|(i, l)| DataPoint {
                    label: label_of(l),
                    value: values.and_then(|v| v.get(i)).map_or(0.0, number_of),
                })
                .collect()
        }
        _ => Vec::new(),
    };
    Ok(points)
}

fn find_header(headers: &[String], needles: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| needles.iter().any(|n| h.contains(n)))
}

/// CSV with a header row. The label column is the first header mentioning
/// label/name/x/category (else the first column); the value column the first
/// mentioning value/y/count/amount (else the second).
pub fn parse_csv(content: &str) -> Result<Vec<DataPoint>, VizError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.trim().as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_lowercase()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(VizError::Empty);
    }
    let label_col = find_header(&headers, &["label", "name", "x", "category"]).unwrap_or(0);
    let value_col = find_header(&headers, &["value", "y", "count", "amount"])
        .or((headers.len() > 1).then_some(1));

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record?;
        points.push(DataPoint {
            label: record.get(label_col).unwrap_or_default().to_string(),
            value: value_col
                .and_then(|i| record.get(i))
                .map_or(0.0, parse_number),
        });
    }
    Ok(points)
}

/// Bar heights in pixels: `max(8, value / max × 120)` with `max ≥ 1`.
pub fn scale(points: &[DataPoint]) -> Vec<f64> {
    let max = points.iter().map(|p| p.value).fold(1.0, f64::max);
    points
        .iter()
        .map(|p| (p.value / max * BAR_MAX_HEIGHT).max(BAR_MIN_HEIGHT))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_array_aliases() {
        let points = parse(
            r#"[{"label":"a","value":3},{"name":"b","y":"4.5"},{"x":7,"value":null},{}]"#,
            "data.JSON",
        )
        .unwrap();
        assert_eq!(
            points,
            vec![
                DataPoint::new("a", 3.0),
                DataPoint::new("b", 4.5),
                DataPoint::new("7", 0.0),
                DataPoint::new("", 0.0),
            ]
        );
    }

    #[test]
    fn test_json_object_columns() {
        let points = parse(r#"{"x":["q1","q2","q3"],"values":[10,"oops"]}"#, "a.json").unwrap();
        assert_eq!(points[0], DataPoint::new("q1", 10.0));
        assert_eq!(points[1].value, 0.0);
        assert_eq!(points[2].value, 0.0);
    }

    #[test]
    fn test_csv_header_detection() {
        let csv = "Month,Revenue Amount\nJan,100\nFeb,n/a\n\nMar,250\n";
        let points = parse(csv, "sales.csv").unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], DataPoint::new("Jan", 100.0));
        assert_eq!(points[1].value, 0.0);
        assert_eq!(points[2], DataPoint::new("Mar", 250.0));
    }

    #[test]
    fn test_other_extension_and_errors() {
        assert_eq!(parse("whatever", "notes.txt").unwrap(), default_series());
        assert!(parse("{not json", "a.json").is_err());
        assert_eq!(parse_or_default("{not json", "a.json"), default_series());
        assert_eq!(parse_or_default("[]", "a.json"), default_series());
        assert!(matches!(parse("", "a.csv"), Err(VizError::Empty)));
    }

    #[test]
    fn test_scale() {
        let heights = scale(&[DataPoint::new("a", 50.0), DataPoint::new("b", 100.0), DataPoint::new("c", 0.0)]);
        assert_eq!(heights, vec![60.0, 120.0, 8.0]);
        assert_eq!(scale(&default_series()), vec![8.0; 6]);
    }
}
