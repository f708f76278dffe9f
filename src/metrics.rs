use opentelemetry::{
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};

pub struct HandshakeMetrics {
    open: Counter<u64>,
    attempts: Counter<u64>,
    failures: Counter<u64>,
    duration: Histogram<u64>,
    status_served: Counter<u64>,
    ping_served: Counter<u64>,
}

impl HandshakeMetrics {
    pub fn new(meter: &Meter) -> Self {
        Self {
            open: meter.u64_counter("lodestone_socket_open_total").build(),
            attempts: meter.u64_counter("lodestone_handshake_total").build(),
            failures: meter.u64_counter("lodestone_handshake_fail_total").build(),
            duration: meter.u64_histogram("lodestone_handshake_time_ms").build(),
            status_served: meter.u64_counter("lodestone_status_served_total").build(),
            ping_served: meter.u64_counter("lodestone_ping_served_total").build(),
        }
    }

    pub fn record_open(&self) {
        self.open.add(1, &[]);
    }

    pub fn record_attempt(&self, state: &'static str) {
        self.attempts.add(1, &[KeyValue::new("state", state)]);
    }

    pub fn record_failure(&self, state: &'static str) {
        self.failures.add(1, &[KeyValue::new("state", state)]);
    }

    pub fn record_duration(&self, elapsed_ms: u64, state: &'static str) {
        self.duration
            .record(elapsed_ms, &[KeyValue::new("state", state)]);
    }

    pub fn record_status(&self) {
        self.status_served.add(1, &[]);
    }

    pub fn record_ping(&self) {
        self.ping_served.add(1, &[]);
    }
}
