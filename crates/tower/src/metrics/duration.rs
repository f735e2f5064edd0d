// Copyright 2025, 2026 The httpmeter Contributors.
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    task::{Poll, ready},
    time::Instant,
};

use opentelemetry::KeyValue;
use pin_project_lite::pin_project;
use tower::{Layer, Service};

use crate::{MetricsAttributes, RecordDuration};

/// A [`Layer`] that records how long the inner service took to reply.
///
/// The timer starts when the inner service is called and stops when its
/// future resolves. A measurement is handed to the sink only when the inner
/// service succeeds; a failed call produces no measurement and the error is
/// propagated untouched. The request and the response themselves are never
/// altered.
///
/// # Generic Parameters
///
/// * `Sink`: Where measurements go, see [`RecordDuration`].
/// * `OnRequest`: A type that can extract attributes from a request.
/// * `OnResponse`: A type that can extract attributes from a response.
#[derive(Clone, Debug)]
pub struct DurationRecorderLayer<Sink, OnRequest = (), OnResponse = ()> {
    sink: Sink,
    on_request: OnRequest,
    on_response: OnResponse,
}

impl<Sink> DurationRecorderLayer<Sink> {
    /// Create a new [`DurationRecorderLayer`] recording to the given sink.
    #[must_use]
    pub fn new(sink: Sink) -> Self {
        Self {
            sink,
            on_request: (),
            on_response: (),
        }
    }
}

impl<Sink, OnRequest, OnResponse> DurationRecorderLayer<Sink, OnRequest, OnResponse> {
    /// Set the [`MetricsAttributes`] to extract from requests.
    #[must_use]
    pub fn on_request<NewOnRequest>(
        self,
        on_request: NewOnRequest,
    ) -> DurationRecorderLayer<Sink, NewOnRequest, OnResponse> {
        DurationRecorderLayer {
            sink: self.sink,
            on_request,
            on_response: self.on_response,
        }
    }

    /// Set the [`MetricsAttributes`] to extract from responses.
    #[must_use]
    pub fn on_response<NewOnResponse>(
        self,
        on_response: NewOnResponse,
    ) -> DurationRecorderLayer<Sink, OnRequest, NewOnResponse> {
        DurationRecorderLayer {
            sink: self.sink,
            on_request: self.on_request,
            on_response,
        }
    }
}

impl<S, Sink, OnRequest, OnResponse> Layer<S> for DurationRecorderLayer<Sink, OnRequest, OnResponse>
where
    Sink: Clone,
    OnRequest: Clone,
    OnResponse: Clone,
{
    type Service = DurationRecorderService<S, Sink, OnRequest, OnResponse>;

    fn layer(&self, inner: S) -> Self::Service {
        DurationRecorderService {
            inner,
            sink: self.sink.clone(),
            on_request: self.on_request.clone(),
            on_response: self.on_response.clone(),
        }
    }
}

/// A middleware that records how long the inner service took to reply.
///
/// # Generic Parameters
///
/// * `S`: The type of the inner service.
/// * `Sink`: Where measurements go, see [`RecordDuration`].
/// * `OnRequest`: A type that can extract attributes from a request.
/// * `OnResponse`: A type that can extract attributes from a response.
#[derive(Clone, Debug)]
pub struct DurationRecorderService<S, Sink, OnRequest = (), OnResponse = ()> {
    inner: S,
    sink: Sink,
    on_request: OnRequest,
    on_response: OnResponse,
}

pin_project! {
    /// The future returned by [`DurationRecorderService`].
    pub struct DurationRecorderFuture<F, Sink, OnResponse> {
        #[pin]
        inner: F,

        start: Instant,
        attributes: Vec<KeyValue>,
        sink: Sink,
        on_response: OnResponse,
    }
}

impl<F, R, E, Sink, OnResponse> Future for DurationRecorderFuture<F, Sink, OnResponse>
where
    F: Future<Output = Result<R, E>>,
    Sink: RecordDuration,
    OnResponse: MetricsAttributes<R>,
{
    type Output = F::Output;

    fn poll(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Self::Output> {
        let this = self.project();
        let result = ready!(this.inner.poll(cx));

        if let Ok(response) = &result {
            // Use floating point division for sub-millisecond precision
            let elapsed = this.start.elapsed().as_secs_f64() * 1000.0;

            // Request attributes first, then response attributes. The future
            // resolves at most once, so the request attributes can be moved
            // out in place.
            let mut attributes = std::mem::take(this.attributes);
            attributes.extend(this.on_response.attributes(response));

            this.sink.record_duration(elapsed, &attributes);
        }

        Poll::Ready(result)
    }
}

impl<R, S, Sink, OnRequest, OnResponse> Service<R>
    for DurationRecorderService<S, Sink, OnRequest, OnResponse>
where
    S: Service<R>,
    Sink: RecordDuration + Clone,
    OnRequest: MetricsAttributes<R>,
    OnResponse: MetricsAttributes<S::Response> + Clone,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = DurationRecorderFuture<S::Future, Sink, OnResponse>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: R) -> Self::Future {
        // The timer starts here: request attributes are extracted before
        // handing the request over, since the inner service consumes it.
        let start = Instant::now();
        let attributes = self.on_request.attributes(&request);

        let inner = self.inner.call(request);

        DurationRecorderFuture {
            inner,
            start,
            attributes,
            sink: self.sink.clone(),
            on_response: self.on_response.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use opentelemetry::KeyValue;
    use tower::{Layer, ServiceExt, service_fn};

    use super::DurationRecorderLayer;
    use crate::{RecordDuration, metrics_attributes_fn};

    #[derive(Clone, Default)]
    struct Recorder {
        measurements: Arc<Mutex<Vec<(f64, Vec<KeyValue>)>>>,
    }

    impl RecordDuration for Recorder {
        fn record_duration(&self, value: f64, attributes: &[KeyValue]) {
            self.measurements
                .lock()
                .unwrap()
                .push((value, attributes.to_vec()));
        }
    }

    #[tokio::test]
    async fn test_records_on_success() {
        let recorder = Recorder::default();
        let layer = DurationRecorderLayer::new(recorder.clone())
            .on_request(metrics_attributes_fn(|request: &&str| {
                vec![KeyValue::new("request", (*request).to_owned())]
            }))
            .on_response(metrics_attributes_fn(|response: &&str| {
                vec![KeyValue::new("response", (*response).to_owned())]
            }));

        let svc = layer.layer(service_fn(|_request: &str| async {
            Ok::<_, anyhow::Error>("pong")
        }));

        svc.oneshot("ping").await.unwrap();

        let measurements = recorder.measurements.lock().unwrap();
        assert_eq!(measurements.len(), 1);
        let (value, attributes) = &measurements[0];
        assert!(*value >= 0.0);
        assert_eq!(
            attributes,
            &[
                KeyValue::new("request", "ping"),
                KeyValue::new("response", "pong"),
            ]
        );
    }

    #[tokio::test]
    async fn test_skips_on_error() {
        let recorder = Recorder::default();
        let layer = DurationRecorderLayer::new(recorder.clone());

        let svc = layer.layer(service_fn(|_request: &str| async {
            Err::<(), _>(anyhow::anyhow!("dispatch failed"))
        }));

        let error = svc.oneshot("ping").await.unwrap_err();
        assert_eq!(error.to_string(), "dispatch failed");
        assert!(recorder.measurements.lock().unwrap().is_empty());
    }
}
