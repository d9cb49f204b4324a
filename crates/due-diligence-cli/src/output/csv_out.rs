use serde_json::Value;
use std::io;

use super::{flatten, result_of};

/// Write output as CSV to stdout.
///
/// A portfolio summary becomes one row per ranked building; a single
/// analysis becomes a two-column field/value listing of its flattened result.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let result = result_of(value);

    if let Some(Value::Array(ranking)) = result.get("ranking") {
        write_rows(&mut wtr, ranking);
    } else {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in flatten(result) {
            if matches!(val, Value::Array(_)) {
                continue;
            }
            let _ = wtr.write_record([key.as_str(), &format_csv_value(&val)]);
        }
    }

    let _ = wtr.flush();
}

fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let _ = wtr.write_record(&headers);

    for row in rows.iter().filter_map(Value::as_object) {
        let record: Vec<String> = headers
            .iter()
            .map(|h| row.get(*h).map(format_csv_value).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&record);
    }
}

/// Null stays empty in CSV so spreadsheets read it as a blank cell.
fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
