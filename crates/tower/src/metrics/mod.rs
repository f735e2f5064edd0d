// Copyright 2025, 2026 The httpmeter Contributors.
//
// SPDX-License-Identifier: Apache-2.0

mod duration;
mod in_flight;
mod make_attributes;

pub use self::{
    duration::{DurationRecorderFuture, DurationRecorderLayer, DurationRecorderService},
    in_flight::{InFlightCounterLayer, InFlightCounterService, InFlightFuture},
    make_attributes::{MetricsAttributes, metrics_attributes_fn},
};
