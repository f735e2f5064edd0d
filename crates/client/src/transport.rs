// Copyright 2025, 2026 The httpmeter Contributors.
//
// SPDX-License-Identifier: Apache-2.0

use std::{sync::Arc, task::Poll};

use http::{Request, Response};
use httpmeter_tower::{
    DurationRecorderFuture, DurationRecorderLayer, DurationRecorderService, InFlightCounterLayer,
    InFlightCounterService, InFlightFuture, RecordDuration,
};
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use opentelemetry::{InstrumentationScope, metrics::Meter};
use opentelemetry_semantic_conventions::metric::{
    HTTP_CLIENT_ACTIVE_REQUESTS, HTTP_CLIENT_REQUEST_DURATION,
};
use thiserror::Error;
use tower::{Layer, Service};

use crate::semconv::{ClientRequestAttributes, ClientResponseAttributes};

/// Where duration measurements end up. Defaults to an `f64` histogram on the
/// configured meter, but can be swapped for anything implementing
/// [`RecordDuration`].
type Sink = Arc<dyn RecordDuration>;

type Stack<S> = DurationRecorderService<
    InFlightCounterService<S, ClientRequestAttributes>,
    Sink,
    ClientRequestAttributes,
    ClientResponseAttributes,
>;

/// The dispatch capability used when the caller does not supply one: a plain
/// [`hyper_util`] legacy client over TCP.
pub type DefaultDispatcher<B> = Client<HttpConnector, B>;

/// Build the default dispatch capability.
#[must_use]
pub fn default_dispatcher<B>() -> DefaultDispatcher<B>
where
    B: http_body::Body + Send,
    B::Data: Send,
{
    Client::builder(TokioExecutor::new()).build_http()
}

/// Error returned when a [`Transport`] cannot be built.
///
/// A transport that cannot measure should not silently pretend to, so
/// construction fails instead of handing out a broken transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("instrumentation name must not be empty")]
    EmptyInstrumentationName,
}

/// Builder for a [`Transport`].
pub struct TransportBuilder {
    instrumentation_name: String,
    meter: Option<Meter>,
    sink: Option<Sink>,
}

impl TransportBuilder {
    /// Create a new builder. The instrumentation name scopes the measurement
    /// stream; it must not be empty.
    #[must_use]
    pub fn new(instrumentation_name: impl Into<String>) -> Self {
        Self {
            instrumentation_name: instrumentation_name.into(),
            meter: None,
            sink: None,
        }
    }

    /// Use the given meter to build the instruments, instead of the global
    /// meter provider.
    #[must_use]
    pub fn meter(mut self, meter: Meter) -> Self {
        self.meter = Some(meter);
        self
    }

    /// Send duration measurements to the given sink instead of a histogram.
    #[must_use]
    pub fn sink<R>(mut self, sink: R) -> Self
    where
        R: RecordDuration + 'static,
    {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Wrap the given dispatch capability.
    ///
    /// # Errors
    ///
    /// Returns an error if the instrumentation name is empty.
    pub fn build<S>(self, dispatcher: S) -> Result<Transport<S>, TransportError> {
        if self.instrumentation_name.is_empty() {
            return Err(TransportError::EmptyInstrumentationName);
        }

        let meter = match self.meter {
            Some(meter) => meter,
            None => {
                let scope = InstrumentationScope::builder(self.instrumentation_name).build();
                opentelemetry::global::meter_with_scope(scope)
            }
        };

        let sink = match self.sink {
            Some(sink) => sink,
            None => Arc::new(
                meter
                    .f64_histogram(HTTP_CLIENT_REQUEST_DURATION)
                    .with_unit("ms")
                    .with_description("Duration of outbound HTTP requests")
                    .build(),
            ),
        };

        let in_flight = meter
            .i64_up_down_counter(HTTP_CLIENT_ACTIVE_REQUESTS)
            .with_unit("{request}")
            .with_description("Number of outbound HTTP requests in flight")
            .build();

        let duration_layer = DurationRecorderLayer::new(sink)
            .on_request(ClientRequestAttributes)
            .on_response(ClientResponseAttributes);
        let in_flight_layer = InFlightCounterLayer::new(in_flight).on_request(ClientRequestAttributes);

        Ok(Transport {
            inner: duration_layer.layer(in_flight_layer.layer(dispatcher)),
        })
    }

    /// Wrap the [default dispatcher][`default_dispatcher`].
    ///
    /// # Errors
    ///
    /// Returns an error if the instrumentation name is empty.
    pub fn build_with_default_dispatcher<B>(
        self,
    ) -> Result<Transport<DefaultDispatcher<B>>, TransportError>
    where
        B: http_body::Body + Send,
        B::Data: Send,
    {
        let dispatcher = default_dispatcher();
        self.build(dispatcher)
    }
}

/// A measuring wrapper around a request-dispatch capability.
///
/// Each successful dispatch records one duration measurement, in fractional
/// milliseconds, tagged with the request method, the server address when one
/// can be derived from the request target, and the response status code. A
/// failed dispatch records nothing and surfaces the error unchanged.
///
/// The wrapper holds no per-request state: it is cheap to clone and safe to
/// use from many tasks concurrently. Response bodies are passed through as-is,
/// so upgraded (bidirectional) connections keep working.
#[derive(Clone)]
pub struct Transport<S> {
    inner: Stack<S>,
}

// Not derived: the sink is a trait object without a `Debug` bound
impl<S> std::fmt::Debug for Transport<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport").finish_non_exhaustive()
    }
}

impl<S, B, RB> Service<Request<B>> for Transport<S>
where
    S: Service<Request<B>, Response = Response<RB>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = DurationRecorderFuture<InFlightFuture<S::Future>, Sink, ClientResponseAttributes>;

    fn poll_ready(&mut self, cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        self.inner.call(request)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use bytes::Bytes;
    use http_body_util::Empty;

    use super::{TransportBuilder, TransportError};

    #[tokio::test]
    async fn test_empty_instrumentation_name_is_rejected() {
        let result = TransportBuilder::new("").build_with_default_dispatcher::<Empty<Bytes>>();
        assert_matches!(result, Err(TransportError::EmptyInstrumentationName));
    }

    #[tokio::test]
    async fn test_debug_does_not_expose_internals() {
        let transport = TransportBuilder::new("httpmeter-client")
            .build_with_default_dispatcher::<Empty<Bytes>>()
            .unwrap();

        assert_eq!(format!("{transport:?}"), "Transport { .. }");
    }
}
