//! In-memory mock of the Linkbar API surface the client consumes.
//!
//! Matches the real service's conventions: trailing-slash routes, an
//! `Authorization: Api-Key ...` header on every call, paginated
//! `{"count", "results"}` list bodies, and `{"message": ...}` error bodies.
//! Detail responses expand related resources into embedded objects where the
//! list/create shapes inline them as bare strings, so the client's
//! polymorphic field handling gets exercised end to end.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// The API key the mock accepts; anything else gets the same 401 body the
/// real service sends.
pub const API_KEY: &str = "test-key";

/// Shared domain every account starts with.
pub const DEFAULT_DOMAIN: &str = "linkb.ar";

#[derive(Clone, Debug)]
pub struct LinkRecord {
    pub id: String,
    pub long_url: String,
    pub keyword: String,
    pub domain: String,
    pub tags: Vec<String>,
    pub click_count: u64,
    pub created_at: String,
}

impl LinkRecord {
    /// List/create shape: `domain` inlined as a plain name string.
    fn summary(&self) -> Value {
        json!({
            "id": self.id,
            "long_url": self.long_url,
            "keyword": self.keyword,
            "domain": self.domain,
            "tags": self.tags,
            "click_count": self.click_count,
            "created_at": self.created_at,
        })
    }

    /// Detail shape: `domain` expanded into an embedded object.
    fn detail(&self) -> Value {
        let mut value = self.summary();
        value["domain"] = json!({
            "name": self.domain,
            "is_custom": self.domain != DEFAULT_DOMAIN,
        });
        value
    }
}

#[derive(Clone, Debug)]
pub struct DomainRecord {
    pub id: String,
    pub name: String,
    pub is_custom: bool,
    pub status: String,
    pub organization: String,
    pub homepage_redirect_url: Option<String>,
    pub nonexistent_link_redirect_url: Option<String>,
}

impl DomainRecord {
    /// List/create shape: `organization` inlined as a plain name string.
    fn summary(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "is_custom": self.is_custom,
            "status": self.status,
            "organization": self.organization,
            "homepage_redirect_url": self.homepage_redirect_url,
            "nonexistent_link_redirect_url": self.nonexistent_link_redirect_url,
        })
    }

    /// Detail shape: `organization` expanded into an embedded object.
    fn detail(&self) -> Value {
        let mut value = self.summary();
        value["organization"] = json!({"id": "org_1", "name": self.organization});
        value
    }
}

#[derive(Default)]
pub struct Store {
    pub links: HashMap<String, LinkRecord>,
    pub domains: HashMap<String, DomainRecord>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let mut store = Store::default();
    // every account sees the shared platform domain
    store.domains.insert(
        "dm_shared".to_string(),
        DomainRecord {
            id: "dm_shared".to_string(),
            name: DEFAULT_DOMAIN.to_string(),
            is_custom: false,
            status: "connected".to_string(),
            organization: "Linkbar".to_string(),
            homepage_redirect_url: None,
            nonexistent_link_redirect_url: None,
        },
    );
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/links/", get(list_links).post(create_link))
        .route(
            "/links/{id}/",
            get(get_link).patch(update_link).delete(delete_link),
        )
        .route("/domains/", get(list_domains).post(create_domain))
        .route(
            "/domains/{id}/",
            get(get_domain).patch(update_domain).delete(delete_domain),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

type ApiFailure = (StatusCode, Json<Value>);

fn check_api_key(headers: &HeaderMap) -> Result<(), ApiFailure> {
    let expected = format!("Api-Key {API_KEY}");
    let presented = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok());
    if presented == Some(expected.as_str()) {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid API key"})),
        ))
    }
}

fn invalid_data() -> ApiFailure {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"message": "Invalid data"})),
    )
}

fn not_found() -> ApiFailure {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"message": "Not found."})),
    )
}

fn paginated(results: Vec<Value>) -> Json<Value> {
    Json(json!({"count": results.len(), "results": results}))
}

fn new_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

fn generated_keyword() -> String {
    let mut keyword = Uuid::new_v4().simple().to_string();
    keyword.truncate(7);
    keyword
}

#[derive(Deserialize, Default)]
pub struct ListQuery {
    q: Option<String>,
    is_custom: Option<String>,
}

// --- links ---

#[derive(Deserialize)]
struct CreateLinkBody {
    long_url: String,
    domain: Option<String>,
    keyword: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Deserialize, Default)]
struct UpdateLinkBody {
    long_url: Option<String>,
    domain: Option<String>,
    keyword: Option<String>,
    tags: Option<Vec<String>>,
}

async fn list_links(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiFailure> {
    check_api_key(&headers)?;
    let store = db.read().await;
    let mut records: Vec<&LinkRecord> = store
        .links
        .values()
        .filter(|link| {
            query
                .q
                .as_deref()
                .is_none_or(|q| link.keyword.contains(q) || link.long_url.contains(q))
        })
        .collect();
    records.sort_by(|a, b| (&a.created_at, &a.id).cmp(&(&b.created_at, &b.id)));
    Ok(paginated(records.iter().map(|r| r.summary()).collect()))
}

async fn create_link(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(body): Json<CreateLinkBody>,
) -> Result<(StatusCode, Json<Value>), ApiFailure> {
    check_api_key(&headers)?;
    if !(body.long_url.starts_with("http://") || body.long_url.starts_with("https://")) {
        return Err(invalid_data());
    }
    let record = LinkRecord {
        id: new_id("lk"),
        long_url: body.long_url,
        keyword: body.keyword.unwrap_or_else(generated_keyword),
        domain: body.domain.unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
        tags: body.tags,
        click_count: 0,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    let response = record.summary();
    db.write().await.links.insert(record.id.clone(), record);
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_link(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiFailure> {
    check_api_key(&headers)?;
    let store = db.read().await;
    store
        .links
        .get(&id)
        .map(|link| Json(link.detail()))
        .ok_or_else(not_found)
}

async fn update_link(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateLinkBody>,
) -> Result<Json<Value>, ApiFailure> {
    check_api_key(&headers)?;
    let mut store = db.write().await;
    let link = store.links.get_mut(&id).ok_or_else(not_found)?;
    if let Some(long_url) = body.long_url {
        if !(long_url.starts_with("http://") || long_url.starts_with("https://")) {
            return Err(invalid_data());
        }
        link.long_url = long_url;
    }
    if let Some(domain) = body.domain {
        link.domain = domain;
    }
    if let Some(keyword) = body.keyword {
        link.keyword = keyword;
    }
    if let Some(tags) = body.tags {
        link.tags = tags;
    }
    Ok(Json(link.summary()))
}

async fn delete_link(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiFailure> {
    check_api_key(&headers)?;
    let mut store = db.write().await;
    store
        .links
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(not_found)
}

// --- domains ---

#[derive(Deserialize)]
struct CreateDomainBody {
    name: String,
    homepage_redirect_url: Option<String>,
    nonexistent_link_redirect_url: Option<String>,
}

#[derive(Deserialize, Default)]
struct UpdateDomainBody {
    name: Option<String>,
    homepage_redirect_url: Option<String>,
    nonexistent_link_redirect_url: Option<String>,
}

async fn list_domains(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiFailure> {
    check_api_key(&headers)?;
    let store = db.read().await;
    let mut records: Vec<&DomainRecord> = store
        .domains
        .values()
        .filter(|domain| query.q.as_deref().is_none_or(|q| domain.name.contains(q)))
        .filter(|domain| match query.is_custom.as_deref() {
            Some("true") => domain.is_custom,
            Some("false") => !domain.is_custom,
            _ => true,
        })
        .collect();
    records.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(paginated(records.iter().map(|r| r.summary()).collect()))
}

async fn create_domain(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(body): Json<CreateDomainBody>,
) -> Result<(StatusCode, Json<Value>), ApiFailure> {
    check_api_key(&headers)?;
    if body.name.is_empty() || !body.name.contains('.') {
        return Err(invalid_data());
    }
    let record = DomainRecord {
        id: new_id("dm"),
        name: body.name,
        is_custom: true,
        status: "pending".to_string(),
        organization: "Acme Inc".to_string(),
        homepage_redirect_url: body.homepage_redirect_url,
        nonexistent_link_redirect_url: body.nonexistent_link_redirect_url,
    };
    let response = record.summary();
    db.write().await.domains.insert(record.id.clone(), record);
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_domain(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiFailure> {
    check_api_key(&headers)?;
    let store = db.read().await;
    store
        .domains
        .get(&id)
        .map(|domain| Json(domain.detail()))
        .ok_or_else(not_found)
}

async fn update_domain(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateDomainBody>,
) -> Result<Json<Value>, ApiFailure> {
    check_api_key(&headers)?;
    let mut store = db.write().await;
    let domain = store.domains.get_mut(&id).ok_or_else(not_found)?;
    if let Some(name) = body.name {
        if name.is_empty() || !name.contains('.') {
            return Err(invalid_data());
        }
        domain.name = name;
    }
    if let Some(url) = body.homepage_redirect_url {
        domain.homepage_redirect_url = Some(url);
    }
    if let Some(url) = body.nonexistent_link_redirect_url {
        domain.nonexistent_link_redirect_url = Some(url);
    }
    Ok(Json(domain.summary()))
}

async fn delete_domain(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiFailure> {
    check_api_key(&headers)?;
    let mut store = db.write().await;
    store
        .domains
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(not_found)
}
