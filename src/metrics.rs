//! Metrics registry
//!
//! Counters and millisecond duration series with label sets, exported
//! in a Prometheus-compatible text format. Updates are lock-free map
//! operations; no lock is held across any network or database call.

use dashmap::DashMap;

type MetricKey = (String, Vec<(String, String)>);

fn key(name: &str, labels: &[(&str, &str)]) -> MetricKey {
    let mut labels: Vec<(String, String)> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    labels.sort();
    (name.to_string(), labels)
}

fn render_labels(labels: &[(String, String)]) -> String {
    if labels.is_empty() {
        return String::new();
    }
    let inner: Vec<String> = labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, v))
        .collect();
    format!("{{{}}}", inner.join(","))
}

/// Process-wide observability sink, shared by all concurrent runs.
#[derive(Default)]
pub struct MetricsRegistry {
    counters: DashMap<MetricKey, u64>,
    durations_ms: DashMap<MetricKey, Vec<u64>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self, name: &str, labels: &[(&str, &str)]) {
        *self.counters.entry(key(name, labels)).or_insert(0) += 1;
    }

    pub fn observe_ms(&self, name: &str, value_ms: u64, labels: &[(&str, &str)]) {
        self.durations_ms
            .entry(key(name, labels))
            .or_default()
            .push(value_ms);
    }

    /// Render all series as `name{labels} value` lines; durations get
    /// `_sum`, `_count` and `_p95` series.
    pub fn export_prometheus(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        for entry in self.counters.iter() {
            let (name, labels) = entry.key();
            lines.push(format!(
                "{}{} {}",
                name,
                render_labels(labels),
                entry.value()
            ));
        }

        for entry in self.durations_ms.iter() {
            let (name, labels) = entry.key();
            let series = entry.value();
            if series.is_empty() {
                continue;
            }
            let lbl = render_labels(labels);
            let sum: u64 = series.iter().sum();
            let count = series.len();
            let mut sorted = series.clone();
            sorted.sort_unstable();
            let p95_idx = ((0.95 * count as f64) as usize).saturating_sub(1);
            let p95 = sorted[p95_idx.min(count - 1)];
            lines.push(format!("{}_sum{} {}", name, lbl, sum));
            lines.push(format!("{}_count{} {}", name, lbl, count));
            lines.push(format!("{}_p95{} {}", name, lbl, p95));
        }

        lines.sort();
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}
