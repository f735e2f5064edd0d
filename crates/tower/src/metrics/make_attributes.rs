// Copyright 2025, 2026 The httpmeter Contributors.
//
// SPDX-License-Identifier: Apache-2.0

use opentelemetry::KeyValue;

use crate::utils::FnWrapper;

/// Extract metrics attributes from a request or a response.
///
/// The attribute set must be fully determined by the value it is extracted
/// from: extracting twice from the same value yields the same attributes, and
/// no key appears twice within one extraction.
pub trait MetricsAttributes<T> {
    fn attributes(&self, t: &T) -> Vec<KeyValue>;
}

/// Make a [`MetricsAttributes`] out of a function.
pub fn metrics_attributes_fn<T, F>(f: F) -> FnWrapper<F>
where
    F: Fn(&T) -> Vec<KeyValue>,
{
    FnWrapper(f)
}

impl<T, F> MetricsAttributes<T> for FnWrapper<F>
where
    F: Fn(&T) -> Vec<KeyValue>,
{
    fn attributes(&self, t: &T) -> Vec<KeyValue> {
        (self.0)(t)
    }
}

/// `()` extracts no attributes, and is the default extractor on the layers.
impl<T> MetricsAttributes<T> for () {
    fn attributes(&self, _t: &T) -> Vec<KeyValue> {
        Vec::new()
    }
}
