// Copyright 2025, 2026 The httpmeter Contributors.
//
// SPDX-License-Identifier: Apache-2.0

/// A wrapper around a function, so that traits like
/// [`crate::MetricsAttributes`] can be implemented for arbitrary closures.
#[derive(Debug, Clone, Copy)]
pub struct FnWrapper<F>(pub(crate) F);
