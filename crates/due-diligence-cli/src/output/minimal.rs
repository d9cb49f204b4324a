use serde_json::Value;

use super::{format_value, result_of};

/// Print the headline answer only.
///
/// Single analysis: `<recommendation> <overall score>`.
/// Portfolio: average overall score followed by the recommendation counts.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(result_of(value)));
}

fn headline(result: &Value) -> String {
    if let (Some(kind), Some(overall)) = (
        result.pointer("/recommendation/type"),
        result.pointer("/scores/overall"),
    ) {
        return format!("{} {}", format_value(kind), format_value(overall));
    }

    if let Some(avg) = result.get("average_overall_score") {
        let counts = result
            .get("recommendation_counts")
            .and_then(Value::as_object)
            .map(|c| {
                c.iter()
                    .map(|(k, v)| format!("{k}={}", format_value(v)))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        return format!("{} {}", format_value(avg), counts).trim_end().to_string();
    }

    format_value(result)
}
