//! The domain resource: a custom or platform-provided hostname.

use serde_json::{json, Map, Value};

use crate::client::LinkbarClient;
use crate::decode::{self, Reference};
use crate::error::ApiError;
use crate::http::HttpMethod;

const ENDPOINT: &str = "domains/";

fn detail_endpoint(id: &str) -> String {
    format!("domains/{id}/")
}

/// A hostname short links can live under.
///
/// Immutable value, like [`Link`](crate::Link): server round trips return
/// fresh instances. The verbatim response map stays available through
/// [`Domain::raw`].
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    id: Option<String>,
    name: String,
    is_custom: bool,
    status: Option<String>,
    organization: Option<Reference>,
    homepage_redirect_url: Option<String>,
    nonexistent_link_redirect_url: Option<String>,
    raw: Map<String, Value>,
}

impl Domain {
    /// Decode a server response body. Same defaulting rules as
    /// [`Link::decode`](crate::Link::decode); `name` shares the
    /// empty-string leniency of `long_url`.
    pub fn decode(value: Value) -> Result<Domain, ApiError> {
        let raw = decode::expect_object(value)?;
        Ok(Domain {
            id: decode::opt_string(&raw, "id")?,
            name: decode::string_or_empty(&raw, "name")?,
            is_custom: decode::bool_or(&raw, "is_custom", false)?,
            status: decode::opt_string(&raw, "status")?,
            organization: decode::reference(&raw, "organization")?,
            homepage_redirect_url: decode::opt_string(&raw, "homepage_redirect_url")?,
            nonexistent_link_redirect_url: decode::opt_string(
                &raw,
                "nonexistent_link_redirect_url",
            )?,
            raw,
        })
    }

    /// Decode a list response in any of the shapes the server uses.
    pub fn decode_list(value: Value) -> Result<Vec<Domain>, ApiError> {
        decode::object_list(value)?
            .into_iter()
            .map(|raw| Domain::decode(Value::Object(raw)))
            .collect()
    }

    /// Server-assigned identifier; `None` until the domain is persisted.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_custom(&self) -> bool {
        self.is_custom
    }

    /// Connection status as reported by the server — `pending`,
    /// `connected`, `disconnected`, or values a newer server may introduce.
    /// Opaque string, not a closed enum.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// The organization field exactly as the server sent it.
    pub fn organization(&self) -> Option<&Reference> {
        self.organization.as_ref()
    }

    /// Resolved organization name, whichever shape the server sent.
    pub fn organization_name(&self) -> Option<&str> {
        self.organization.as_ref().and_then(Reference::name)
    }

    pub fn homepage_redirect_url(&self) -> Option<&str> {
        self.homepage_redirect_url.as_deref()
    }

    pub fn nonexistent_link_redirect_url(&self) -> Option<&str> {
        self.nonexistent_link_redirect_url.as_deref()
    }

    /// The verbatim decoded response, for forward-compatible field access.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    fn require_id(&self) -> Result<&str, ApiError> {
        self.id
            .as_deref()
            .ok_or_else(|| ApiError::Configuration("domain has no id".to_string()))
    }

    /// `POST domains/`.
    pub fn create(client: &mut LinkbarClient, input: &CreateDomain) -> Result<Domain, ApiError> {
        let value = client.dispatch(HttpMethod::Post, ENDPOINT, Some(input.to_payload()))?;
        Domain::decode(decode::require_body(value)?)
    }

    /// `GET domains/` with optional `q` search term and `is_custom` filter.
    /// `is_custom` goes on the wire as the literal string `"true"`/`"false"`
    /// to match query-string serialization.
    pub fn list(
        client: &mut LinkbarClient,
        search: Option<&str>,
        is_custom: Option<bool>,
    ) -> Result<Vec<Domain>, ApiError> {
        let mut params = Map::new();
        if let Some(q) = search {
            params.insert("q".to_string(), json!(q));
        }
        if let Some(is_custom) = is_custom {
            params.insert("is_custom".to_string(), json!(is_custom.to_string()));
        }
        let params = if params.is_empty() { None } else { Some(params) };
        let value = client.dispatch(HttpMethod::Get, ENDPOINT, params)?;
        Domain::decode_list(decode::require_body(value)?)
    }

    /// `GET domains/{id}/`.
    pub fn get(client: &mut LinkbarClient, id: &str) -> Result<Domain, ApiError> {
        let value = client.dispatch(HttpMethod::Get, &detail_endpoint(id), None)?;
        Domain::decode(decode::require_body(value)?)
    }

    /// `PATCH domains/{id}/` with the subset of fields set on `changes`.
    pub fn update(
        &self,
        client: &mut LinkbarClient,
        changes: &UpdateDomain,
    ) -> Result<Domain, ApiError> {
        let id = self.require_id()?;
        let value =
            client.dispatch(HttpMethod::Patch, &detail_endpoint(id), Some(changes.to_payload()))?;
        Domain::decode(decode::require_body(value)?)
    }

    /// `DELETE domains/{id}/`.
    pub fn delete(&self, client: &mut LinkbarClient) -> Result<(), ApiError> {
        let id = self.require_id()?;
        client.dispatch(HttpMethod::Delete, &detail_endpoint(id), None)?;
        Ok(())
    }

    /// Re-fetch this domain from the server, returning a fresh instance.
    pub fn refresh(&self, client: &mut LinkbarClient) -> Result<Domain, ApiError> {
        let id = self.require_id()?;
        let value = client.dispatch(HttpMethod::Get, &detail_endpoint(id), None)?;
        Domain::decode(decode::require_body(value)?)
    }
}

/// Payload for `POST domains/`. `name` is always sent; the redirect URLs are
/// omitted when unset.
#[derive(Debug, Clone)]
pub struct CreateDomain {
    pub name: String,
    pub homepage_redirect_url: Option<String>,
    pub nonexistent_link_redirect_url: Option<String>,
}

impl CreateDomain {
    pub fn new(name: &str) -> CreateDomain {
        CreateDomain {
            name: name.to_string(),
            homepage_redirect_url: None,
            nonexistent_link_redirect_url: None,
        }
    }

    pub fn to_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("name".to_string(), json!(self.name));
        if let Some(url) = &self.homepage_redirect_url {
            payload.insert("homepage_redirect_url".to_string(), json!(url));
        }
        if let Some(url) = &self.nonexistent_link_redirect_url {
            payload.insert("nonexistent_link_redirect_url".to_string(), json!(url));
        }
        payload
    }
}

/// Payload for `PATCH domains/{id}/`. Any subset of fields; all-unset is a
/// legal empty payload.
#[derive(Debug, Clone, Default)]
pub struct UpdateDomain {
    pub name: Option<String>,
    pub homepage_redirect_url: Option<String>,
    pub nonexistent_link_redirect_url: Option<String>,
}

impl UpdateDomain {
    pub fn to_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        if let Some(name) = &self.name {
            payload.insert("name".to_string(), json!(name));
        }
        if let Some(url) = &self.homepage_redirect_url {
            payload.insert("homepage_redirect_url".to_string(), json!(url));
        }
        if let Some(url) = &self.nonexistent_link_redirect_url {
            payload.insert("nonexistent_link_redirect_url".to_string(), json!(url));
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::StubTransport;

    fn client_with(transport: StubTransport) -> LinkbarClient {
        let mut client = LinkbarClient::new("secret");
        client.set_transport(Box::new(transport));
        client
    }

    #[test]
    fn decode_full_response() {
        let domain = Domain::decode(json!({
            "id": "dm_1",
            "name": "go.example.com",
            "is_custom": true,
            "status": "connected",
            "organization": "Acme Inc",
            "homepage_redirect_url": "https://example.com",
            "nonexistent_link_redirect_url": "https://example.com/404",
        }))
        .unwrap();

        assert_eq!(domain.id(), Some("dm_1"));
        assert_eq!(domain.name(), "go.example.com");
        assert!(domain.is_custom());
        assert_eq!(domain.status(), Some("connected"));
        assert_eq!(domain.organization_name(), Some("Acme Inc"));
        assert_eq!(domain.homepage_redirect_url(), Some("https://example.com"));
        assert_eq!(
            domain.nonexistent_link_redirect_url(),
            Some("https://example.com/404")
        );
    }

    #[test]
    fn decode_defaults_for_absent_fields() {
        let domain = Domain::decode(json!({"name": "go.example.com"})).unwrap();
        assert_eq!(domain.id(), None);
        assert!(!domain.is_custom());
        assert_eq!(domain.status(), None);
        assert!(domain.organization().is_none());
        assert_eq!(domain.homepage_redirect_url(), None);
        assert_eq!(domain.nonexistent_link_redirect_url(), None);
    }

    #[test]
    fn unknown_status_values_pass_through() {
        let domain = Domain::decode(json!({
            "name": "go.example.com",
            "status": "verifying-dns",
        }))
        .unwrap();
        assert_eq!(domain.status(), Some("verifying-dns"));
    }

    #[test]
    fn organization_resolves_both_wire_shapes() {
        let by_name = Domain::decode(json!({
            "name": "go.example.com",
            "organization": "Acme Inc",
        }))
        .unwrap();
        assert!(matches!(by_name.organization(), Some(Reference::Name(_))));
        assert_eq!(by_name.organization_name(), Some("Acme Inc"));

        let embedded = Domain::decode(json!({
            "name": "go.example.com",
            "organization": {"id": "org_1", "name": "Acme Inc"},
        }))
        .unwrap();
        assert!(matches!(embedded.organization(), Some(Reference::Embedded(_))));
        assert_eq!(embedded.organization_name(), Some("Acme Inc"));

        let null = Domain::decode(json!({
            "name": "go.example.com",
            "organization": null,
        }))
        .unwrap();
        assert!(null.organization().is_none());
    }

    #[test]
    fn paginated_listing_decodes_per_element() {
        let domains = Domain::decode_list(json!({
            "results": [
                {"id": "d1", "name": "a.com", "is_custom": true},
                {"id": "d2", "name": "b.com", "is_custom": false},
            ]
        }))
        .unwrap();
        assert_eq!(domains.len(), 2);
        assert!(domains[0].is_custom());
        assert!(!domains[1].is_custom());
    }

    #[test]
    fn create_payload_always_carries_name() {
        let payload = CreateDomain::new("go.example.com").to_payload();
        assert_eq!(Value::Object(payload), json!({"name": "go.example.com"}));

        let full = CreateDomain {
            homepage_redirect_url: Some("https://example.com".to_string()),
            ..CreateDomain::new("go.example.com")
        };
        assert_eq!(
            Value::Object(full.to_payload()),
            json!({
                "name": "go.example.com",
                "homepage_redirect_url": "https://example.com",
            })
        );
    }

    #[test]
    fn list_serializes_is_custom_as_string() {
        let (transport, calls) = StubTransport::reply(200, r#"{"results":[]}"#);
        let mut client = client_with(transport);

        Domain::list(&mut client, Some("example"), Some(false)).unwrap();

        let request = calls.lock().unwrap()[0].clone();
        assert_eq!(request.method, HttpMethod::Get);
        assert!(request.query.contains(&("q".to_string(), "example".to_string())));
        assert!(request.query.contains(&("is_custom".to_string(), "false".to_string())));
        assert!(request.body.is_none());
    }

    #[test]
    fn mutations_on_unpersisted_domain_never_reach_the_network() {
        let domain = Domain::decode(json!({"name": "go.example.com"})).unwrap();
        let (transport, calls) = StubTransport::reply(200, "{}");
        let mut client = client_with(transport);

        assert!(matches!(
            domain.update(&mut client, &UpdateDomain::default()),
            Err(ApiError::Configuration(_))
        ));
        assert!(matches!(domain.delete(&mut client), Err(ApiError::Configuration(_))));
        assert!(matches!(domain.refresh(&mut client), Err(ApiError::Configuration(_))));
        assert_eq!(calls.lock().unwrap().len(), 0);
    }

    #[test]
    fn update_patches_detail_endpoint() {
        let domain = Domain::decode(json!({"id": "dm_1", "name": "go.example.com"})).unwrap();
        let (transport, calls) = StubTransport::reply(
            200,
            r#"{"id":"dm_1","name":"go.example.com","homepage_redirect_url":"https://example.com"}"#,
        );
        let mut client = client_with(transport);

        let changes = UpdateDomain {
            homepage_redirect_url: Some("https://example.com".to_string()),
            ..UpdateDomain::default()
        };
        let updated = domain.update(&mut client, &changes).unwrap();
        assert_eq!(updated.homepage_redirect_url(), Some("https://example.com"));
        assert_eq!(domain.homepage_redirect_url(), None);

        let request = calls.lock().unwrap()[0].clone();
        assert_eq!(request.method, HttpMethod::Patch);
        assert!(request.url.ends_with("/domains/dm_1/"));
    }
}
