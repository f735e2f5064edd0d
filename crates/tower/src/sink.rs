// Copyright 2025, 2026 The httpmeter Contributors.
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use opentelemetry::{KeyValue, metrics::Histogram};

/// A sink for duration measurements.
///
/// The duration recorder hands each completed measurement to a sink and
/// forgets about it: retention and export are the sink's problem. Submission
/// is infallible by contract, so a misbehaving exporter can never fail the
/// request it was measuring. Sinks must be safe for concurrent submission,
/// since multiple in-flight requests may complete at the same time.
pub trait RecordDuration: Send + Sync {
    /// Record a single duration, in fractional milliseconds.
    fn record_duration(&self, value: f64, attributes: &[KeyValue]);
}

impl RecordDuration for Histogram<f64> {
    fn record_duration(&self, value: f64, attributes: &[KeyValue]) {
        self.record(value, attributes);
    }
}

impl<T: RecordDuration + ?Sized> RecordDuration for Arc<T> {
    fn record_duration(&self, value: f64, attributes: &[KeyValue]) {
        (**self).record_duration(value, attributes);
    }
}
