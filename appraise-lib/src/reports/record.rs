use crate::Result;
use crate::metrics::MetricValue;
use crate::pipeline::AnalyzerOutput;
use core::fmt::Write;
use core::time::Duration;
use serde_json::{Map, Value, json};

/// Flatten an output into a single JSON object.
///
/// Keys are `url`, `category`, `net_score`, `net_score_latency` and
/// `has_applicable_metrics`, plus `code_url` and `dataset_url` for linked artifacts,
/// followed by `<metric>`, `<metric>_latency`,
/// `<metric>_status` and, when there is one, `<metric>_error` for every metric.
/// Latencies are in milliseconds and metrics without a successful value are `null`.
#[expect(unused_results, reason = "Map::insert intentionally overwrites values")]
#[must_use]
pub fn to_record(output: &AnalyzerOutput) -> Map<String, Value> {
    let mut record = Map::new();
    let artifact = output.artifact();

    record.insert("url".to_string(), json!(artifact.source()));
    record.insert("category".to_string(), json!(artifact.category().to_string()));
    record.insert("net_score".to_string(), json!(output.net_score()));
    record.insert("net_score_latency".to_string(), json!(millis(output.total_latency())));
    record.insert("has_applicable_metrics".to_string(), json!(output.has_applicable_metrics()));

    if let Some(code) = output.code() {
        record.insert("code_url".to_string(), json!(code.source()));
    }
    if let Some(dataset) = output.dataset() {
        record.insert("dataset_url".to_string(), json!(dataset.source()));
    }

    for result in output.results() {
        let name = result.name();

        let value = match result.value() {
            Some(value) if result.is_success() => metric_value_to_json(value),
            _ => Value::Null,
        };

        record.insert(name.to_string(), value);
        record.insert(format!("{name}_latency"), json!(millis(result.latency())));
        record.insert(format!("{name}_status"), json!(result.status().to_string()));

        if let Some(error) = result.error() {
            record.insert(format!("{name}_error"), json!(error));
        }
    }

    record
}

/// Write the record for `output` as a single line of JSON, without a trailing newline.
pub fn generate<W: Write>(output: &AnalyzerOutput, writer: &mut W) -> Result<()> {
    write!(writer, "{}", serde_json::to_string(&Value::Object(to_record(output)))?)?;
    Ok(())
}

fn metric_value_to_json(value: &MetricValue) -> Value {
    match value {
        MetricValue::Score(score) => json!(score),
        MetricValue::Breakdown(parts) => Value::Object(parts.iter().map(|(k, v)| (k.clone(), json!(v))).collect()),
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
