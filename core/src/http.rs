//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! crate builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network. Whoever executes the request reports back either a
//! completed exchange or the reason no response arrived, so a network failure
//! never masquerades as an HTTP status.

/// HTTP method for a request. The catalog API is read through signed GETs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `CatalogClient::build_*`. `path` holds the fully qualified,
/// signed URI.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Value of the first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Outcome of one request/response exchange.
#[derive(Debug, Clone)]
pub enum Exchange {
    /// The server answered; any status, body verbatim.
    Completed(HttpResponse),
    /// No server response, with a description of the failure.
    NoResponse(String),
}

impl Exchange {
    /// Converts the outcome into the response, or `ApiError::NoResponse`.
    pub fn into_response(self) -> crate::Result<HttpResponse> {
        match self {
            Exchange::Completed(response) => Ok(response),
            Exchange::NoResponse(reason) => Err(crate::ApiError::NoResponse(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiError;

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            path: "https://example.com".to_string(),
            headers: vec![("User-Agent".to_string(), "test".to_string())],
            body: None,
        };
        assert_eq!(req.header("user-agent"), Some("test"));
        assert_eq!(req.header("accept"), None);
    }

    #[test]
    fn no_response_becomes_dedicated_error() {
        let err = Exchange::NoResponse("connection refused".to_string())
            .into_response()
            .unwrap_err();
        assert!(matches!(err, ApiError::NoResponse(ref msg) if msg == "connection refused"));
    }

    #[test]
    fn completed_exchange_keeps_error_status() {
        let response = Exchange::Completed(HttpResponse {
            status: 503,
            headers: Vec::new(),
            body: "<x/>".to_string(),
        })
        .into_response()
        .unwrap();
        assert_eq!(response.status, 503);
        assert_eq!(response.body, "<x/>");
    }
}
