use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{flatten, format_value, result_of};

/// Print the result as a Field/Value table followed by action items,
/// warnings and methodology.
pub fn print_table(value: &Value) {
    let result = result_of(value);

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in flatten(result) {
        if is_object_array(&val) {
            continue;
        }
        builder.push_record([key, format_value(&val)]);
    }
    println!("{}", Table::from(builder));

    if let Some(Value::Array(items)) = result.pointer("/recommendation/action_items") {
        print_rows("Action plan", items);
    }
    if let Some(Value::Array(ranking)) = result.get("ranking") {
        print_rows("Ranking", ranking);
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {meth}");
    }
}

fn print_rows(title: &str, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<String> = first.keys().cloned().collect();

    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for row in rows.iter().filter_map(Value::as_object) {
        builder.push_record(
            headers
                .iter()
                .map(|h| row.get(h).map(format_value).unwrap_or_default()),
        );
    }
    println!("\n{title}:\n{}", Table::from(builder));
}

fn is_object_array(value: &Value) -> bool {
    matches!(value, Value::Array(arr) if arr.iter().any(Value::is_object))
}
