// Copyright 2025, 2026 The httpmeter Contributors.
//
// SPDX-License-Identifier: Apache-2.0

use opentelemetry::{KeyValue, metrics::UpDownCounter};
use pin_project_lite::pin_project;
use tower::{Layer, Service};

use crate::MetricsAttributes;

/// A [`Layer`] that records the number of in-flight requests.
///
/// The counter is injected at construction, so the layer can be used without
/// any process-wide meter setup.
///
/// # Generic Parameters
///
/// * `OnRequest`: A type that can extract attributes from a request.
#[derive(Clone, Debug)]
pub struct InFlightCounterLayer<OnRequest = ()> {
    counter: UpDownCounter<i64>,
    on_request: OnRequest,
}

impl InFlightCounterLayer {
    /// Create a new [`InFlightCounterLayer`] counting on the given
    /// instrument.
    #[must_use]
    pub fn new(counter: UpDownCounter<i64>) -> Self {
        Self {
            counter,
            on_request: (),
        }
    }
}

impl<F> InFlightCounterLayer<F> {
    /// Set the [`MetricsAttributes`] to extract from requests.
    #[must_use]
    pub fn on_request<OnRequest>(self, on_request: OnRequest) -> InFlightCounterLayer<OnRequest> {
        InFlightCounterLayer {
            counter: self.counter,
            on_request,
        }
    }
}

impl<S, OnRequest> Layer<S> for InFlightCounterLayer<OnRequest>
where
    OnRequest: Clone,
{
    type Service = InFlightCounterService<S, OnRequest>;

    fn layer(&self, inner: S) -> Self::Service {
        InFlightCounterService {
            inner,
            counter: self.counter.clone(),
            on_request: self.on_request.clone(),
        }
    }
}

/// A middleware that records the number of in-flight requests.
///
/// # Generic Parameters
///
/// * `S`: The type of the inner service.
/// * `OnRequest`: A type that can extract attributes from a request.
#[derive(Clone, Debug)]
pub struct InFlightCounterService<S, OnRequest = ()> {
    inner: S,
    counter: UpDownCounter<i64>,
    on_request: OnRequest,
}

/// A guard that decrements the in-flight request count when dropped.
///
/// Dropping the future before it resolves, e.g. on cancellation, still
/// decrements the count.
struct InFlightGuard {
    counter: UpDownCounter<i64>,
    attributes: Vec<KeyValue>,
}

impl InFlightGuard {
    fn new(counter: UpDownCounter<i64>, attributes: Vec<KeyValue>) -> Self {
        counter.add(1, &attributes);

        Self {
            counter,
            attributes,
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.counter.add(-1, &self.attributes);
    }
}

pin_project! {
    /// The future returned by [`InFlightCounterService`].
    pub struct InFlightFuture<F> {
        guard: InFlightGuard,

        #[pin]
        inner: F,
    }
}

impl<F> Future for InFlightFuture<F>
where
    F: Future,
{
    type Output = F::Output;

    fn poll(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Self::Output> {
        self.project().inner.poll(cx)
    }
}

impl<R, S, OnRequest> Service<R> for InFlightCounterService<S, OnRequest>
where
    S: Service<R>,
    OnRequest: MetricsAttributes<R>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = InFlightFuture<S::Future>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: R) -> Self::Future {
        let attributes = self.on_request.attributes(&req);

        // The guard increments the count now, and decrements it when the
        // future completes or is dropped.
        let guard = InFlightGuard::new(self.counter.clone(), attributes);

        let inner = self.inner.call(req);
        InFlightFuture { guard, inner }
    }
}
