// Copyright 2025, 2026 The httpmeter Contributors.
//
// SPDX-License-Identifier: Apache-2.0

//! Generic [`tower`] layers to meter requests going through a service.
//!
//! The layers in this crate know nothing about HTTP: they time a generic
//! request/response exchange and hand the measurement to an injected sink,
//! with attributes extracted by [`MetricsAttributes`] implementations.

#![allow(clippy::module_name_repetitions)]

mod metrics;
mod sink;
mod utils;

pub use self::{
    metrics::{
        DurationRecorderFuture, DurationRecorderLayer, DurationRecorderService,
        InFlightCounterLayer, InFlightCounterService, InFlightFuture, MetricsAttributes,
        metrics_attributes_fn,
    },
    sink::RecordDuration,
    utils::FnWrapper,
};
