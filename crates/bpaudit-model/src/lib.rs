//! # bpaudit-model
//!
//! Typed, read-only views over the documents an audit consumes:
//! - the blueprint (endpoints, pages, locators, auth config)
//! - zero or more chunk documents produced by the packaging step
//! - an optional source route scan
//!
//! Parsing is tolerant: absent or `null` optional fields take their
//! documented default. Only a missing or mis-shaped *required* field
//! produces [`DocumentError::Malformed`], carrying the offending JSON path.
//!
//! ## Data model
//!
//! ```text
//! Blueprint
//!   ├── AuthConfig
//!   ├── Endpoint*   (indexed by (method, path))
//!   └── Page*       (indexed by route)
//!         ├── Locator*
//!         └── FormFlow*
//! Chunk*            (refers to endpoints/pages by id)
//! ScannedRoute*     (external source scan)
//! ```

pub mod auth;
pub mod blueprint;
pub mod chunk;
pub mod endpoint;
pub mod error;
mod json;
pub mod page;
pub mod params;
pub mod scan;

pub use auth::{AuthConfig, CredentialsFields, TOKEN_TYPE_BEARER_JWT, TOKEN_TYPE_SESSION_COOKIE};
pub use blueprint::Blueprint;
pub use chunk::{Chunk, ChunkRef};
pub use endpoint::{BodyField, Endpoint, HttpMethod, PathParam, QueryParam, RequestBody};
pub use error::DocumentError;
pub use page::{
    FLAG_BRITTLE, FLAG_DYNAMIC_LIST, FormFlow, FormStep, Locator, LocatorStrategy, Page, RouteParam,
};
pub use params::{has_example, route_tokens};
pub use scan::{ScannedRoute, parse_scan_document, read_scan_document};
