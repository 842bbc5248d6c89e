//! Process wide Prometheus metrics for HTTP traffic and model calls.

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all studio metrics
const PREFIX: &str = "aura_studio";

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Model call metrics, one sample per feature invocation
    pub static ref AI_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_ai_requests_total"), "Total feature calls to the model by outcome"),
        &["feature", "outcome"]
    ).expect("Failed to create ai_requests_total metric");

    pub static ref AI_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_ai_request_duration_seconds"),
            "Feature call duration in seconds, model round trip and interpretation"
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 40.0, 60.0]),
        &["feature"]
    ).expect("Failed to create ai_request_duration_seconds metric");

    pub static ref QUOTA_EXHAUSTED: Gauge = Gauge::new(
        format!("{PREFIX}_quota_exhausted"),
        "1 while the model quota is flagged as exhausted"
    ).expect("Failed to create quota_exhausted metric");

    pub static ref PROCESS_MEMORY_BYTES: Gauge = Gauge::new(
        format!("{PREFIX}_process_memory_bytes"),
        "Process memory usage in bytes"
    ).expect("Failed to create process_memory_bytes metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Register all metrics - ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(AI_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(AI_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(QUOTA_EXHAUSTED.clone()));
    let _ = REGISTRY.register(Box::new(PROCESS_MEMORY_BYTES.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

/// Record a feature call to the model. `outcome` is `ok` or an error kind.
pub fn record_ai_request(feature: &str, outcome: &str, duration: Duration) {
    AI_REQUESTS_TOTAL
        .with_label_values(&[feature, outcome])
        .inc();

    AI_REQUEST_DURATION_SECONDS
        .with_label_values(&[feature])
        .observe(duration.as_secs_f64());
}

pub fn set_quota_exhausted(exhausted: bool) {
    QUOTA_EXHAUSTED.set(if exhausted { 1.0 } else { 0.0 });
}

/// Update process memory usage
pub fn update_memory_usage() {
    #[cfg(target_os = "linux")]
    {
        if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
            let rss_kb = status
                .lines()
                .find(|line| line.starts_with("VmRSS:"))
                .and_then(|line| line.split_whitespace().nth(1))
                .and_then(|kb| kb.parse::<f64>().ok());
            if let Some(kb) = rss_kb {
                PROCESS_MEMORY_BYTES.set(kb * 1024.0);
            }
        }
    }
}

/// Text exposition of every registered metric, memory usage refreshed.
pub fn render() -> prometheus::Result<String> {
    update_memory_usage();

    let encoder = TextEncoder::new();
    let mut buffer = vec![];
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_metric(name: &str) -> bool {
        REGISTRY
            .gather()
            .iter()
            .any(|m| m.get_name() == format!("{PREFIX}_{name}"))
    }

    #[test]
    fn test_metrics_initialization() {
        init_metrics();
        assert!(!REGISTRY.gather().is_empty(), "Metrics should be registered");
    }

    #[test]
    fn test_record_http_request() {
        init_metrics();
        record_http_request("POST", "/v1/studio/analysis", 200, Duration::from_millis(50));
        assert!(has_metric("http_requests_total"));
    }

    #[test]
    fn test_record_ai_request() {
        init_metrics();
        record_ai_request("song idea", "ok", Duration::from_secs(2));
        record_ai_request("song idea", "PARSE_ERROR", Duration::from_millis(900));
        assert!(has_metric("ai_requests_total"));
        assert!(has_metric("ai_request_duration_seconds"));
        assert!(
            AI_REQUESTS_TOTAL
                .with_label_values(&["song idea", "PARSE_ERROR"])
                .get()
                >= 1.0
        );
    }

    #[test]
    fn test_quota_gauge() {
        init_metrics();
        set_quota_exhausted(true);
        assert!(has_metric("quota_exhausted"));
    }

    #[test]
    fn test_render_exposes_prefixed_metrics() {
        init_metrics();
        record_ai_request("producers", "ok", Duration::from_millis(10));
        let text = render().unwrap();
        assert!(text.contains("aura_studio_ai_requests_total"));
        assert!(text.contains("feature=\"producers\""));
    }
}
