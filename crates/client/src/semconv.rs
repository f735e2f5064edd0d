// Copyright 2025, 2026 The httpmeter Contributors.
//
// SPDX-License-Identifier: Apache-2.0

//! Metrics attributes for outbound HTTP requests, following the
//! OpenTelemetry semantic conventions.

use http::{Request, Response, header::HOST, uri::Authority};
use httpmeter_tower::MetricsAttributes;
use opentelemetry::KeyValue;
use opentelemetry_semantic_conventions::trace::{
    HTTP_REQUEST_METHOD, HTTP_RESPONSE_STATUS_CODE, SERVER_ADDRESS,
};

/// Extracts metrics attributes from an outbound request.
///
/// Always includes `http.request.method`. Includes `server.address` when the
/// request target yields a non-empty host; an unparsable or absent authority
/// is not an error, the label is simply omitted.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientRequestAttributes;

impl<B> MetricsAttributes<Request<B>> for ClientRequestAttributes {
    fn attributes(&self, request: &Request<B>) -> Vec<KeyValue> {
        let mut attributes = Vec::with_capacity(2);
        attributes.push(KeyValue::new(
            HTTP_REQUEST_METHOD,
            request.method().as_str().to_owned(),
        ));

        if let Some(authority) = request_authority(request) {
            let (host, _port) = split_host_port(authority);
            if !host.is_empty() {
                attributes.push(KeyValue::new(SERVER_ADDRESS, host.to_owned()));
            }
        }

        attributes
    }
}

/// Extracts metrics attributes from a response.
///
/// Includes `http.response.status_code`. The status code lives under its own
/// key so that it can never collide with a request attribute.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientResponseAttributes;

impl<B> MetricsAttributes<Response<B>> for ClientResponseAttributes {
    fn attributes(&self, response: &Response<B>) -> Vec<KeyValue> {
        status_code_attribute(i64::from(response.status().as_u16()))
            .into_iter()
            .collect()
    }
}

/// The status-code label, omitted unless the code is a positive integer.
fn status_code_attribute(status_code: i64) -> Option<KeyValue> {
    (status_code > 0).then(|| KeyValue::new(HTTP_RESPONSE_STATUS_CODE, status_code))
}

/// The authority the request is addressed to: the URI authority for
/// absolute-form targets, falling back to the `Host` header.
fn request_authority<B>(request: &Request<B>) -> Option<&str> {
    request
        .uri()
        .authority()
        .map(Authority::as_str)
        .or_else(|| request.headers().get(HOST)?.to_str().ok())
}

/// Splits a network address of the form `"host"`, `"host%zone"`, `"[host]"`,
/// `"[host%zone]"`, `"host:port"`, `"host%zone:port"`, `"[host]:port"`,
/// `"[host%zone]:port"` or `":port"` into host (zone included) and port.
///
/// An empty host is returned if it is not provided or unparsable. `None` is
/// returned for the port if it is not provided or unparsable. Hostnames and
/// IPv6 literals may legitimately contain colons or bracket-zone syntax, so
/// splitting on the last colon alone would mis-parse them; the cheap checks
/// up front keep the common no-port cases allocation-free.
#[must_use]
pub fn split_host_port(hostport: &str) -> (&str, Option<u16>) {
    if hostport.starts_with('[') {
        // Bracketed IPv6 literal, optionally with a zone suffix
        let Some(addr_end) = hostport.rfind(']') else {
            // Invalid hostport
            return ("", None);
        };

        if !hostport[addr_end..].contains(':') {
            return (&hostport[1..addr_end], None);
        }
    } else if !hostport.contains(':') {
        return (hostport, None);
    }

    // Full parse of "[host]:port", "host:port" and ":port". A malformed
    // trailing port invalidates the whole parse: the host is not worth
    // trusting either at that point.
    match split_trailing_port(hostport) {
        Some((host, port)) => (host, Some(port)),
        None => ("", None),
    }
}

fn split_trailing_port(hostport: &str) -> Option<(&str, u16)> {
    let (host, port) = hostport.rsplit_once(':')?;

    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let port = port.parse::<u16>().ok()?;

    let host = if let Some(stripped) = host.strip_prefix('[') {
        stripped.strip_suffix(']')?
    } else if host.contains(':') {
        // Too many colons for an unbracketed host
        return None;
    } else {
        host
    };

    Some((host, port))
}

#[cfg(test)]
mod tests {
    use http::{Request, Response, StatusCode};
    use httpmeter_tower::MetricsAttributes;
    use opentelemetry::{KeyValue, Value};

    use super::{
        ClientRequestAttributes, ClientResponseAttributes, split_host_port, status_code_attribute,
    };

    #[test]
    fn test_split_host_port() {
        assert_eq!(split_host_port(""), ("", None));
        assert_eq!(split_host_port("example.com"), ("example.com", None));
        assert_eq!(
            split_host_port("example.com:8080"),
            ("example.com", Some(8080))
        );
        assert_eq!(split_host_port("[::1]"), ("::1", None));
        assert_eq!(split_host_port("[::1]:443"), ("::1", Some(443)));
        assert_eq!(split_host_port("[::1%eth0]"), ("::1%eth0", None));
        assert_eq!(split_host_port("[::1%eth0]:443"), ("::1%eth0", Some(443)));
        assert_eq!(split_host_port(":9090"), ("", Some(9090)));

        // Malformed addresses degrade to an empty host and no port
        assert_eq!(split_host_port("[unterminated"), ("", None));
        assert_eq!(split_host_port("host:notaport"), ("", None));
        assert_eq!(split_host_port("host:70000"), ("", None));
        assert_eq!(split_host_port("host:"), ("", None));
        assert_eq!(split_host_port("::1:443"), ("", None));
        assert_eq!(split_host_port("[::1]oops:443"), ("", None));
    }

    #[test]
    fn test_request_attributes() {
        let request = Request::builder()
            .method("GET")
            .uri("http://example.com:8080/hello")
            .body(())
            .unwrap();

        let attributes = ClientRequestAttributes.attributes(&request);
        assert_eq!(
            attributes,
            vec![
                KeyValue::new("http.request.method", "GET"),
                KeyValue::new("server.address", "example.com"),
            ]
        );

        // Extraction is deterministic
        assert_eq!(attributes, ClientRequestAttributes.attributes(&request));
    }

    #[test]
    fn test_request_attributes_ipv6_authority() {
        let request = Request::builder()
            .method("PUT")
            .uri("http://[::1]:443/hello")
            .body(())
            .unwrap();

        let attributes = ClientRequestAttributes.attributes(&request);
        assert_eq!(attributes[1], KeyValue::new("server.address", "::1"));
    }

    #[test]
    fn test_request_attributes_without_host() {
        let request = Request::builder()
            .method("POST")
            .uri("/relative")
            .body(())
            .unwrap();

        let attributes = ClientRequestAttributes.attributes(&request);
        assert_eq!(
            attributes,
            vec![KeyValue::new("http.request.method", "POST")]
        );
    }

    #[test]
    fn test_request_attributes_host_header_fallback() {
        let request = Request::builder()
            .method("GET")
            .uri("/hello")
            .header("host", "fallback.example:9090")
            .body(())
            .unwrap();

        let attributes = ClientRequestAttributes.attributes(&request);
        assert_eq!(
            attributes[1],
            KeyValue::new("server.address", "fallback.example")
        );
    }

    #[test]
    fn test_request_attributes_never_duplicate_keys() {
        let request = Request::builder()
            .method("GET")
            .uri("http://example.com/")
            .body(())
            .unwrap();

        let attributes = ClientRequestAttributes.attributes(&request);
        let mut keys: Vec<_> = attributes.iter().map(|kv| kv.key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), attributes.len());
    }

    #[test]
    fn test_response_attributes() {
        let mut response = Response::new(());
        *response.status_mut() = StatusCode::IM_A_TEAPOT;

        let attributes = ClientResponseAttributes.attributes(&response);
        assert_eq!(
            attributes,
            vec![KeyValue::new("http.response.status_code", 418_i64)]
        );
        assert_eq!(attributes[0].value, Value::I64(418));
    }

    #[test]
    fn test_status_code_attribute_omitted_when_not_positive() {
        assert!(status_code_attribute(0).is_none());
        assert!(status_code_attribute(-1).is_none());
        assert!(status_code_attribute(200).is_some());
    }
}
