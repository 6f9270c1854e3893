use opentelemetry::{
    global,
    metrics::{Counter, Histogram, MeterProvider},
    KeyValue,
};
use prometheus::Registry;

pub struct Metrics {
    request_counter: Counter<u64>,
    verdict_counter: Counter<u64>,
    pipeline_duration: Histogram<u64>,
    pub registry: Registry,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        // TODO: deprecated crate to be replaced with an OLTP exporter
        let exporter = opentelemetry_prometheus::exporter()
            .with_registry(registry.clone())
            .build()
            .unwrap();

        let provider = opentelemetry_sdk::metrics::SdkMeterProvider::builder()
            .with_reader(exporter)
            .build();

        let meter = provider.meter("verdict_gateway");
        global::set_meter_provider(provider);

        let request_counter = meter
            .u64_counter("requests_total")
            .with_description("Total number of requests")
            .build();

        let verdict_counter = meter
            .u64_counter("verdicts_total")
            .with_description("Total number of classified videos, by verdict")
            .build();

        // Whole-video classification runs in the hundreds of ms to tens
        // of seconds depending on clip length.
        let pipeline_duration = meter
            .u64_histogram("pipeline_duration_ms")
            .with_boundaries(vec![
                100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0, 60000.0,
            ])
            .with_description("Duration of one pipeline invocation in milliseconds")
            .build();

        Metrics {
            request_counter,
            verdict_counter,
            pipeline_duration,
            registry,
        }
    }

    pub fn record_request(&self, route: &str) {
        let attributes = vec![KeyValue::new("route", route.to_string())];
        self.request_counter.add(1, &attributes);
    }

    pub fn record_verdict(&self, verdict: &str) {
        let attributes = vec![KeyValue::new("verdict", verdict.to_string())];
        self.verdict_counter.add(1, &attributes);
    }

    pub fn record_pipeline_duration(&self, duration_ms: u64, route: &str) {
        let attributes = vec![KeyValue::new("route", route.to_string())];
        self.pipeline_duration.record(duration_ms, &attributes);
    }
}
