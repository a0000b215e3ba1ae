//! Synchronous client for the Linkbar short-link API.
//!
//! # Overview
//! Two resources — [`Link`] and [`Domain`] — with create/list/get/update/
//! delete/refresh operations against the JSON REST API at
//! `https://api.linkbar.co/`. Every call goes through
//! [`LinkbarClient::dispatch`], which owns header attachment, parameter
//! placement (query string for GET, JSON body otherwise), and error
//! classification.
//!
//! # Design
//! - [`LinkbarClient`] is an explicit configuration value (API key, base
//!   URL, transport); operations take `&mut` to it. Single-threaded use —
//!   share it across threads only behind external synchronization.
//! - Entities are immutable: every server round trip returns a fresh
//!   instance and callers rebind. Each keeps the verbatim response map for
//!   fields the typed accessors do not model.
//! - The [`Transport`] trait keeps I/O injectable; [`UreqTransport`] is the
//!   lazily-created default. No retries, no caching.
//! - Failures are typed: [`ApiError::Configuration`] never touched the
//!   network, [`ApiError::Decode`] is a response this library cannot read,
//!   [`ApiError::Http`] carries the classified status code and the parsed
//!   error body.
//!
//! # Example
//! ```no_run
//! use linkbar::{CreateLink, Link, LinkbarClient};
//!
//! # fn main() -> Result<(), linkbar::ApiError> {
//! let mut client = LinkbarClient::new("lb_sk_...");
//! let link = Link::create(&mut client, &CreateLink {
//!     keyword: Some("launch".to_string()),
//!     ..CreateLink::new("https://example.com/launch-post")
//! })?;
//! println!("{}", link.short_url().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod decode;
pub mod domains;
pub mod error;
pub mod http;
pub mod links;

pub use client::{LinkbarClient, DEFAULT_BASE_URL};
pub use decode::Reference;
pub use domains::{CreateDomain, Domain, UpdateDomain};
pub use error::{ApiError, HttpError, HttpErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError, UreqTransport};
pub use links::{CreateLink, Link, UpdateLink};
