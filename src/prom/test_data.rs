//! Canned scrape bodies shared by unit tests and benchmarks.

/// A trimmed node_exporter scrape: 11 series, all well formed.
pub const NODE_EXPORTER: &str = r#"# HELP go_gc_duration_seconds A summary of the pause duration of garbage collection cycles.
# TYPE go_gc_duration_seconds summary
go_gc_duration_seconds{quantile="0"} 2.3816e-05
go_gc_duration_seconds{quantile="0.5"} 4.5701e-05
go_gc_duration_seconds{quantile="1"} 0.000513374
go_gc_duration_seconds_sum 0.011402911
go_gc_duration_seconds_count 194
# HELP node_filesystem_avail_bytes Filesystem space available to non-root users in bytes.
# TYPE node_filesystem_avail_bytes gauge
node_filesystem_avail_bytes{device="/dev/sda1",fstype="ext4",mountpoint="/"} 2.1453152256e+10
node_filesystem_avail_bytes{device="tmpfs",fstype="tmpfs",mountpoint="/run"} 8.29661184e+08
# HELP http_request_duration_seconds Latency of served requests.
# TYPE http_request_duration_seconds histogram
http_request_duration_seconds_bucket{le="0.1"} 812
http_request_duration_seconds_bucket{le="+Inf"} 901
http_request_duration_seconds_sum 53.4
# Collected by the exporter on demand.
node_scrape_collector_success{collector="cpu"} 1 1600000000000
"#;

/// A federation-style body mixing explicit and missing timestamps, special
/// values and one broken line.
pub const FEDERATE_MIXED: &str = "# TYPE up untyped
up{job=\"api\",instance=\"a:9100\"} 1 1600000000000
up{job=\"api\",instance=\"b:9100\"} 0
process_open_fds{job=\"api\"} NaN 1600000005000
process_open_fds{job=\"db\"} 12
node_load1 +Inf
node_load5{job=\"api\" 0.5
node_load15 1.2e-3 1600000010000
";

/// Builds a body of `series` distinct gauge lines for benchmarks.
pub fn synthetic(series: usize) -> String {
    let mut body = String::with_capacity(series * 64);
    body.push_str("# HELP bench_gauge Synthetic gauge.\n# TYPE bench_gauge gauge\n");
    for i in 0..series {
        body.push_str(&format!(
            "bench_gauge{{shard=\"{}\",zone=\"eu-{}\"}} {}e-3 {}\n",
            i,
            i % 7,
            i,
            1_600_000_000_000_i64 + i as i64
        ));
    }
    body
}
