//! Runtime REST clients built from API descriptions.
//!
//! A client is generated from an [`ApiDescription`] as a tree of routes. Each
//! [`Route`] is both navigable, reaching child resources by property name or
//! by invocation with positional path values, and invokable, composing and
//! sending a request with one of its declared methods.
//!
//! ## Core Types
//!
//! - [`ApiClient`] - A generated client: root route, configuration, transport
//! - [`Route`] - A navigable, invokable handle on one route
//! - [`ConfigStore`] - Per-client defaults for query, body, headers and parameters
//! - [`RequestOptions`] - Call-time overrides for one invocation
//! - [`RequestDescriptor`] - A fully resolved request
//! - [`ApiResponse`] - Status, lower-cased headers and an interpreted body
//! - [`Transport`] - The seam to the network, with [`HttpTransport`] as default
//!
//! ## Examples
//!
//! ```rust,ignore
//! use apitree::{create_client, ConfigKey, RequestOptions};
//! use serde_json::json;
//!
//! let client = create_client("example", "api.yaml").await?;
//! client.set(ConfigKey::Query, json!("test=data"))?;
//!
//! let item = client.resource("collection").unwrap().resource("collectionId").unwrap();
//! let response = item.call(&["123"])?.get(Some(json!({ "this": "that" })), &RequestOptions::new()).await?;
//! println!("{} {:?}", response.status(), response.json());
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod media;
pub mod request;
pub mod response;
pub mod template;
pub mod transport;
pub mod tree;

pub use apitree_define::{ApiDescription, RestMethod};
pub use client::{ApiClient, Route, create_client, create_client_with};
pub use config::{ConfigKey, ConfigSnapshot, ConfigStore};
pub use error::{
    ApiError, ComposeError, ConfigError, ParseFailure, ResponseParseError, SpecError,
    TransportError,
};
pub use media::MediaType;
pub use request::{RequestDescriptor, RequestOptions};
pub use response::{ApiResponse, RawResponse, ResponseBody};
pub use transport::{HttpTransport, HttpTransportBuilder, Transport};
pub use tree::{NodeKind, RouteTree};
