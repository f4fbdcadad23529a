//! Request metrics
//!
//! Emitted through the `metrics` facade. Without an installed recorder these
//! calls are no-ops, so applications opt in by installing their own exporter.
//!
//! - `identity_sdk_requests_total` (counter): labels `method`, `status`
//! - `identity_sdk_request_duration_seconds` (histogram): label `method`
//! - `identity_sdk_request_errors_total` (counter): label `kind`

/// Record a request that produced an HTTP response, successful or not.
pub fn record_request(method: &str, status: u16, duration_secs: f64) {
    metrics::counter!(
        "identity_sdk_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("identity_sdk_request_duration_seconds", "method" => method.to_string())
        .record(duration_secs);
}

/// Record a request that ended without a response (timeout, cancel, transport).
pub fn record_error(kind: &'static str) {
    metrics::counter!("identity_sdk_request_errors_total", "kind" => kind).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        record_request("GET", 200, 0.05);
        record_request("POST", 503, 1.5);
        record_error("timeout");
    }
}
