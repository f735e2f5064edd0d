// Copyright 2025, 2026 The httpmeter Contributors.
//
// SPDX-License-Identifier: Apache-2.0

//! Timing instrumentation for outbound HTTP requests.
//!
//! [`Transport`] wraps any request-dispatch capability — a
//! [`tower::Service`] taking an [`http::Request`] and returning an
//! [`http::Response`] — and records how long each successful dispatch took,
//! tagged with OpenTelemetry semantic-convention attributes derived from the
//! request and the response. Requests, responses and errors pass through
//! unmodified.

#![deny(rustdoc::missing_crate_level_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod semconv;
mod transport;

pub use self::transport::{
    DefaultDispatcher, Transport, TransportBuilder, TransportError, default_dispatcher,
};
