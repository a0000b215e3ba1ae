//! The link resource: a shortened URL.

use chrono::{DateTime, FixedOffset};
use serde_json::{json, Map, Value};

use crate::client::LinkbarClient;
use crate::decode::{self, Reference};
use crate::error::ApiError;
use crate::http::HttpMethod;

const ENDPOINT: &str = "links/";

fn detail_endpoint(id: &str) -> String {
    format!("links/{id}/")
}

/// A shortened URL as known by the server.
///
/// Immutable value: `update` and `refresh` return a fresh instance
/// reflecting server state and never touch the value they were called on —
/// rebind the result. The verbatim response map stays available through
/// [`Link::raw`] for fields this type does not model.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    id: Option<String>,
    long_url: String,
    keyword: Option<String>,
    domain: Option<Reference>,
    tags: Vec<String>,
    click_count: u64,
    created_at: Option<DateTime<FixedOffset>>,
    raw: Map<String, Value>,
}

impl Link {
    /// Decode a server response body.
    ///
    /// Absent fields get their documented defaults; present-but-malformed
    /// fields are decode errors. `long_url` deliberately defaults to the
    /// empty string when missing instead of failing.
    pub fn decode(value: Value) -> Result<Link, ApiError> {
        let raw = decode::expect_object(value)?;
        Ok(Link {
            id: decode::opt_string(&raw, "id")?,
            long_url: decode::string_or_empty(&raw, "long_url")?,
            keyword: decode::opt_string(&raw, "keyword")?,
            domain: decode::reference(&raw, "domain")?,
            tags: decode::string_list(&raw, "tags")?,
            click_count: decode::count_or_zero(&raw, "click_count")?,
            created_at: decode::timestamp(&raw, "created_at")?,
            raw,
        })
    }

    /// Decode a list response in any of the shapes the server uses:
    /// paginated envelope, bare array, or a single object.
    pub fn decode_list(value: Value) -> Result<Vec<Link>, ApiError> {
        decode::object_list(value)?
            .into_iter()
            .map(|raw| Link::decode(Value::Object(raw)))
            .collect()
    }

    /// Server-assigned identifier; `None` until the link is persisted.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn long_url(&self) -> &str {
        &self.long_url
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    /// The domain field exactly as the server sent it: a bare name on
    /// creation, an embedded object on fetch.
    pub fn domain(&self) -> Option<&Reference> {
        self.domain.as_ref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Server-computed; never sent by the client.
    pub fn click_count(&self) -> u64 {
        self.click_count
    }

    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        self.created_at
    }

    /// The verbatim decoded response, for forward-compatible field access.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Resolved domain name, whichever shape the server sent.
    pub fn domain_name(&self) -> Option<&str> {
        self.domain.as_ref().and_then(Reference::name)
    }

    /// Full short URL. `None` unless both keyword and domain name are known.
    pub fn short_url(&self) -> Option<String> {
        match (self.domain_name(), self.keyword.as_deref()) {
            (Some(domain), Some(keyword)) => Some(format!("https://{domain}/{keyword}")),
            _ => None,
        }
    }

    /// Short URL without the scheme, for display.
    pub fn pretty_url(&self) -> Option<String> {
        match (self.domain_name(), self.keyword.as_deref()) {
            (Some(domain), Some(keyword)) => Some(format!("{domain}/{keyword}")),
            _ => None,
        }
    }

    fn require_id(&self) -> Result<&str, ApiError> {
        self.id
            .as_deref()
            .ok_or_else(|| ApiError::Configuration("link has no id".to_string()))
    }

    /// `POST links/`.
    pub fn create(client: &mut LinkbarClient, input: &CreateLink) -> Result<Link, ApiError> {
        let value = client.dispatch(HttpMethod::Post, ENDPOINT, Some(input.to_payload()))?;
        Link::decode(decode::require_body(value)?)
    }

    /// `GET links/`, with `q` as the optional search term.
    pub fn list(client: &mut LinkbarClient, search: Option<&str>) -> Result<Vec<Link>, ApiError> {
        let params = search.map(|q| {
            let mut params = Map::new();
            params.insert("q".to_string(), json!(q));
            params
        });
        let value = client.dispatch(HttpMethod::Get, ENDPOINT, params)?;
        Link::decode_list(decode::require_body(value)?)
    }

    /// `GET links/{id}/`.
    pub fn get(client: &mut LinkbarClient, id: &str) -> Result<Link, ApiError> {
        let value = client.dispatch(HttpMethod::Get, &detail_endpoint(id), None)?;
        Link::decode(decode::require_body(value)?)
    }

    /// `PATCH links/{id}/` with the subset of fields set on `changes`.
    /// Returns the new server state as a fresh instance.
    pub fn update(
        &self,
        client: &mut LinkbarClient,
        changes: &UpdateLink,
    ) -> Result<Link, ApiError> {
        let id = self.require_id()?;
        let value =
            client.dispatch(HttpMethod::Patch, &detail_endpoint(id), Some(changes.to_payload()))?;
        Link::decode(decode::require_body(value)?)
    }

    /// `DELETE links/{id}/`.
    pub fn delete(&self, client: &mut LinkbarClient) -> Result<(), ApiError> {
        let id = self.require_id()?;
        client.dispatch(HttpMethod::Delete, &detail_endpoint(id), None)?;
        Ok(())
    }

    /// Re-fetch this link from the server, returning a fresh instance.
    pub fn refresh(&self, client: &mut LinkbarClient) -> Result<Link, ApiError> {
        let id = self.require_id()?;
        let value = client.dispatch(HttpMethod::Get, &detail_endpoint(id), None)?;
        Link::decode(decode::require_body(value)?)
    }
}

/// Payload for `POST links/`.
///
/// Optional fields are omitted from the wire when unset — the API treats a
/// missing key, not a null value, as "unset".
#[derive(Debug, Clone)]
pub struct CreateLink {
    pub long_url: String,
    pub domain: Option<String>,
    pub keyword: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl CreateLink {
    pub fn new(long_url: &str) -> CreateLink {
        CreateLink {
            long_url: long_url.to_string(),
            domain: None,
            keyword: None,
            tags: None,
        }
    }

    pub fn to_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("long_url".to_string(), json!(self.long_url));
        if let Some(domain) = &self.domain {
            payload.insert("domain".to_string(), json!(domain));
        }
        if let Some(keyword) = &self.keyword {
            payload.insert("keyword".to_string(), json!(keyword));
        }
        if let Some(tags) = &self.tags {
            payload.insert("tags".to_string(), json!(tags));
        }
        payload
    }
}

/// Payload for `PATCH links/{id}/`. All fields optional; an all-unset value
/// produces an empty payload, a legal no-op update.
#[derive(Debug, Clone, Default)]
pub struct UpdateLink {
    pub long_url: Option<String>,
    pub domain: Option<String>,
    pub keyword: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl UpdateLink {
    pub fn to_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        if let Some(long_url) = &self.long_url {
            payload.insert("long_url".to_string(), json!(long_url));
        }
        if let Some(domain) = &self.domain {
            payload.insert("domain".to_string(), json!(domain));
        }
        if let Some(keyword) = &self.keyword {
            payload.insert("keyword".to_string(), json!(keyword));
        }
        if let Some(tags) = &self.tags {
            payload.insert("tags".to_string(), json!(tags));
        }
        payload
    }
}
