//! Request dispatcher for the Linkbar API.
//!
//! # Design
//! `LinkbarClient` owns the configuration every call needs — API key, base
//! URL, transport — as an explicit value rather than process-wide state, so
//! tests can inject transports and callers control sharing. It is built for
//! single-threaded use: operations take `&mut` and concurrent
//! reconfiguration requires external synchronization.
//!
//! `dispatch` is the single funnel every operation goes through. It places
//! parameters (query string for GET, JSON body for everything else),
//! attaches the auth and content headers, and maps the outcome to
//! `Ok(Some(json))`, `Ok(None)` for an empty body, or a classified
//! [`ApiError`]. It performs no retries and keeps no response state.

use serde_json::{Map, Value};

use crate::error::{ApiError, HttpError};
use crate::http::{HttpMethod, HttpRequest, Transport, UreqTransport};

/// Production API root. Override with [`LinkbarClient::set_base_url`].
pub const DEFAULT_BASE_URL: &str = "https://api.linkbar.co/";

/// Synchronous client holding the configuration shared by all operations.
pub struct LinkbarClient {
    api_key: Option<String>,
    base_url: String,
    transport: Option<Box<dyn Transport>>,
}

impl LinkbarClient {
    /// Client for the production API with the given key.
    pub fn new(api_key: &str) -> Self {
        let mut client = Self::unconfigured();
        client.set_api_key(api_key);
        client
    }

    /// Client with no API key yet. Every dispatch fails with
    /// [`ApiError::Configuration`] until one is set.
    pub fn unconfigured() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            transport: None,
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn set_api_key(&mut self, api_key: &str) {
        self.api_key = Some(api_key.to_string());
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the API root, normalized to exactly one trailing slash.
    pub fn set_base_url(&mut self, base_url: &str) {
        self.base_url = format!("{}/", base_url.trim_end_matches('/'));
    }

    /// Replace the transport. Tests inject recording stubs here.
    pub fn set_transport(&mut self, transport: Box<dyn Transport>) {
        self.transport = Some(transport);
    }

    fn transport(&mut self) -> &dyn Transport {
        &**self
            .transport
            .get_or_insert_with(|| Box::new(UreqTransport::new()))
    }

    /// Send one request and interpret the response.
    ///
    /// `GET` places `params` in the query string; any other method sends
    /// them as a JSON body — never both. An empty success body yields
    /// `Ok(None)`, which is how 204 delete responses come back.
    pub fn dispatch(
        &mut self,
        method: HttpMethod,
        endpoint: &str,
        params: Option<Map<String, Value>>,
    ) -> Result<Option<Value>, ApiError> {
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| ApiError::Configuration("API key is not set".to_string()))?;

        let url = format!("{}{}", self.base_url, endpoint.trim_start_matches('/'));
        let headers = vec![
            ("Authorization".to_string(), format!("Api-Key {api_key}")),
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ];

        let (query, body) = match (method, params) {
            (HttpMethod::Get, Some(params)) => (query_pairs(params), None),
            (_, Some(params)) => (Vec::new(), Some(Value::Object(params).to_string())),
            (_, None) => (Vec::new(), None),
        };

        let request = HttpRequest {
            method,
            url,
            headers,
            query,
            body,
        };
        let response = match self.transport().send(&request) {
            Ok(response) => response,
            Err(err) => return Err(ApiError::Http(HttpError::transport(err.message))),
        };

        if response.status >= 400 {
            let response_data: Option<Value> = serde_json::from_str(&response.body).ok();
            let message = error_message(response_data.as_ref(), response.status);
            return Err(ApiError::Http(HttpError::from_response(
                response.status,
                message,
                response_data,
            )));
        }

        if response.body.trim().is_empty() {
            return Ok(None);
        }
        let value = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Decode(format!("response body is not valid JSON: {e}")))?;
        Ok(Some(value))
    }
}

/// GET parameters become query pairs: strings verbatim, other scalars via
/// their JSON rendering, nulls skipped.
fn query_pairs(params: Map<String, Value>) -> Vec<(String, String)> {
    params
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect()
}

/// Prefer the server's `message` field, then `error`, then a generic status
/// line.
fn error_message(response_data: Option<&Value>, status: u16) -> String {
    response_data
        .and_then(|data| {
            data.get("message")
                .and_then(Value::as_str)
                .or_else(|| data.get("error").and_then(Value::as_str))
        })
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpErrorKind;
    use crate::http::testing::StubTransport;
    use crate::http::{HttpResponse, TransportError};
    use serde_json::json;

    fn params(value: Value) -> Option<Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            _ => panic!("params must be an object"),
        }
    }

    fn client_with(transport: StubTransport) -> LinkbarClient {
        let mut client = LinkbarClient::new("secret");
        client.set_transport(Box::new(transport));
        client
    }

    #[test]
    fn missing_api_key_fails_without_touching_transport() {
        let (transport, calls) = StubTransport::reply(200, "{}");
        let mut client = LinkbarClient::unconfigured();
        client.set_transport(Box::new(transport));

        let err = client.dispatch(HttpMethod::Get, "links/", None).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
        assert_eq!(calls.lock().unwrap().len(), 0);
    }

    #[test]
    fn url_joins_base_and_endpoint_without_double_slash() {
        let (transport, calls) = StubTransport::reply(200, "{}");
        let mut client = client_with(transport);
        client.set_base_url("http://127.0.0.1:9/v1");

        client.dispatch(HttpMethod::Get, "/links/", None).unwrap();
        assert_eq!(calls.lock().unwrap()[0].url, "http://127.0.0.1:9/v1/links/");
    }

    #[test]
    fn base_url_normalizes_to_one_trailing_slash() {
        let mut client = LinkbarClient::new("secret");
        client.set_base_url("https://example.test");
        assert_eq!(client.base_url(), "https://example.test/");
        client.set_base_url("https://example.test///");
        assert_eq!(client.base_url(), "https://example.test/");
    }

    #[test]
    fn every_request_carries_auth_and_content_headers() {
        let (transport, calls) = StubTransport::reply(200, "{}");
        let mut client = client_with(transport);

        client.dispatch(HttpMethod::Get, "links/", None).unwrap();
        let headers = calls.lock().unwrap()[0].headers.clone();
        assert!(headers.contains(&("Authorization".to_string(), "Api-Key secret".to_string())));
        assert!(headers.contains(&("Content-Type".to_string(), "application/json".to_string())));
        assert!(headers.contains(&("Accept".to_string(), "application/json".to_string())));
    }

    #[test]
    fn get_params_go_to_query_not_body() {
        let (transport, calls) = StubTransport::reply(200, "[]");
        let mut client = client_with(transport);

        client
            .dispatch(
                HttpMethod::Get,
                "domains/",
                params(json!({"q": "example", "is_custom": "true"})),
            )
            .unwrap();

        let request = calls.lock().unwrap()[0].clone();
        assert!(request.body.is_none());
        assert!(request.query.contains(&("q".to_string(), "example".to_string())));
        assert!(request.query.contains(&("is_custom".to_string(), "true".to_string())));
    }

    #[test]
    fn post_params_go_to_body_not_query() {
        let (transport, calls) = StubTransport::reply(201, "{}");
        let mut client = client_with(transport);

        client
            .dispatch(
                HttpMethod::Post,
                "links/",
                params(json!({"long_url": "https://example.com"})),
            )
            .unwrap();

        let request = calls.lock().unwrap()[0].clone();
        assert!(request.query.is_empty());
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"long_url": "https://example.com"}));
    }

    #[test]
    fn empty_success_body_is_none() {
        let (transport, _calls) = StubTransport::reply(204, "");
        let mut client = client_with(transport);
        let result = client.dispatch(HttpMethod::Delete, "links/lk_1/", None).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn malformed_success_body_is_a_decode_error() {
        let (transport, _calls) = StubTransport::reply(200, "not json");
        let mut client = client_with(transport);
        let err = client.dispatch(HttpMethod::Get, "links/", None).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn status_400_classifies_as_bad_request_with_data() {
        let (transport, _calls) = StubTransport::reply(400, r#"{"message":"Invalid data"}"#);
        let mut client = client_with(transport);
        let err = client
            .dispatch(HttpMethod::Post, "links/", params(json!({"long_url": ""})))
            .unwrap_err();
        match err {
            ApiError::Http(http) => {
                assert_eq!(http.kind, HttpErrorKind::BadRequest);
                assert_eq!(http.status, 400);
                assert_eq!(http.message, "Invalid data");
                assert_eq!(http.response_data, Some(json!({"message": "Invalid data"})));
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[test]
    fn status_401_extracts_message() {
        let (transport, _calls) = StubTransport::reply(401, r#"{"message":"Invalid API key"}"#);
        let mut client = client_with(transport);
        let err = client.dispatch(HttpMethod::Get, "links/", None).unwrap_err();
        match err {
            ApiError::Http(http) => {
                assert_eq!(http.kind, HttpErrorKind::Unauthorized);
                assert_eq!(http.message, "Invalid API key");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[test]
    fn status_404_classifies_as_not_found() {
        let (transport, _calls) = StubTransport::reply(404, r#"{"detail":"gone"}"#);
        let mut client = client_with(transport);
        let err = client.dispatch(HttpMethod::Get, "links/lk_404/", None).unwrap_err();
        match err {
            ApiError::Http(http) => {
                assert_eq!(http.kind, HttpErrorKind::NotFound);
                // no message/error field in the body, so the generic line
                assert_eq!(http.message, "HTTP 404");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[test]
    fn error_field_is_the_message_fallback() {
        let (transport, _calls) = StubTransport::reply(500, r#"{"error":"boom"}"#);
        let mut client = client_with(transport);
        let err = client.dispatch(HttpMethod::Get, "links/", None).unwrap_err();
        match err {
            ApiError::Http(http) => {
                assert_eq!(http.kind, HttpErrorKind::Other);
                assert_eq!(http.status, 500);
                assert_eq!(http.message, "boom");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[test]
    fn non_json_error_body_still_yields_a_message() {
        let (transport, _calls) = StubTransport::reply(503, "<html>unavailable</html>");
        let mut client = client_with(transport);
        let err = client.dispatch(HttpMethod::Get, "links/", None).unwrap_err();
        match err {
            ApiError::Http(http) => {
                assert_eq!(http.status, 503);
                assert_eq!(http.message, "HTTP 503");
                assert!(http.response_data.is_none());
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[test]
    fn transport_failure_surfaces_as_status_zero() {
        let (transport, _calls) = StubTransport::replying(vec![Err(TransportError {
            message: "dns error: no such host".to_string(),
        })]);
        let mut client = client_with(transport);
        let err = client.dispatch(HttpMethod::Get, "links/", None).unwrap_err();
        match err {
            ApiError::Http(http) => {
                assert_eq!(http.status, 0);
                assert_eq!(http.message, "dns error: no such host");
                assert!(http.response_data.is_none());
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[test]
    fn failures_surface_exactly_once_per_call() {
        let (transport, calls) = StubTransport::replying(vec![
            Ok(HttpResponse {
                status: 500,
                body: String::new(),
            }),
            Ok(HttpResponse {
                status: 200,
                body: "{}".to_string(),
            }),
        ]);
        let mut client = client_with(transport);

        assert!(client.dispatch(HttpMethod::Get, "links/", None).is_err());
        // no retry happened: the second canned reply is still queued
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert!(client.dispatch(HttpMethod::Get, "links/", None).is_ok());
    }
}
