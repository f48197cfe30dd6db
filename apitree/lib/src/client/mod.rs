//! Consumer-facing client and route handles.

mod loader;
mod route;

use std::fmt;
use std::sync::Arc;

use apitree_define::ApiDescription;
use serde_json::{Map, Value};
use tracing::{Span, debug, instrument};

use crate::config::{ConfigKey, ConfigStore};
use crate::error::{ApiError, ComposeError, ConfigError, SpecError};
use crate::request::RequestDescriptor;
use crate::response::{ApiResponse, interpret};
use crate::transport::{HttpTransport, Transport};
use crate::tree::{self, RouteTree};

pub use loader::{create_client, create_client_with};
pub use route::Route;

struct ClientInner<T> {
    name: String,
    tree: RouteTree,
    config: ConfigStore,
    transport: T,
}

/// A client generated from an API description.
///
/// Cloning is cheap: clones share the route tree, the configuration and the
/// transport.
///
/// ## Examples
///
/// ```
/// use apitree::{ApiClient, ApiDescription, ConfigKey, HttpTransport};
/// use serde_json::json;
///
/// let description = ApiDescription::from_yaml_str(
///     r#"
/// baseUri: http://example.com
/// resources:
///   - relativeUri: /collection
///     methods:
///       - method: get
///     resources:
///       - relativeUri: /{collectionId}
///         methods:
///           - method: get
/// "#,
/// )
/// .unwrap();
///
/// let client = ApiClient::from_description("example", &description, HttpTransport::new().unwrap())
///     .unwrap();
/// client.set(ConfigKey::Query, json!("test=data")).unwrap();
///
/// let route = client
///     .resource("collection")
///     .and_then(|r| r.resource("collectionId"))
///     .unwrap()
///     .call(&["123"])
///     .unwrap();
/// let request = route.compose(apitree::RestMethod::Get, None, &Default::default()).unwrap();
/// assert_eq!(request.url().as_str(), "http://example.com/collection/123?test=data");
/// ```
pub struct ApiClient<T: Transport = HttpTransport> {
    inner: Arc<ClientInner<T>>,
}

impl<T: Transport> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> fmt::Debug for ApiClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("name", &self.inner.name)
            .field("base_uri", &self.inner.tree.base_uri().as_str())
            .field("nodes", &self.inner.tree.root().count())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> ApiClient<T> {
    /// Builds a client over `transport`.
    ///
    /// ## Errors
    ///
    /// Returns a [`SpecError`] when the description cannot be turned into a
    /// route tree. No client is returned in that case.
    pub fn from_description(
        name: impl Into<String>,
        description: &ApiDescription,
        transport: T,
    ) -> Result<Self, SpecError> {
        let name = name.into();
        let tree = tree::build(description)?;
        debug!(api = %name, base_uri = tree.base_uri().as_str(), "client created");

        Ok(Self {
            inner: Arc::new(ClientInner {
                name,
                tree,
                config: ConfigStore::new(),
                transport,
            }),
        })
    }

    /// The name the client was created under.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn tree(&self) -> &RouteTree {
        &self.inner.tree
    }

    /// The client's configuration defaults.
    pub fn config(&self) -> &ConfigStore {
        &self.inner.config
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// The route for the empty path.
    pub fn root(&self) -> Route<T> {
        Route::root(self.clone())
    }

    /// Shorthand for `root().resource(name)`.
    pub fn resource(&self, name: &str) -> Option<Route<T>> {
        self.root().resource(name)
    }

    /// A route for an ad hoc path below the base URI.
    ///
    /// Placeholders in `template` are resolved at request time from URI
    /// parameters. The route accepts every calling-convention verb.
    ///
    /// ## Errors
    ///
    /// Returns [`ComposeError::InvalidTemplate`] for a malformed template.
    pub fn path(&self, template: &str) -> Result<Route<T>, ComposeError> {
        self.path_with(template, &Map::new())
    }

    /// Like [`path`](Self::path), binding placeholders from `params` now.
    ///
    /// ## Errors
    ///
    /// Returns [`ComposeError::InvalidTemplate`] for a malformed template and
    /// [`ComposeError::InvalidParameter`] for a non-scalar parameter.
    pub fn path_with(
        &self,
        template: &str,
        params: &Map<String, Value>,
    ) -> Result<Route<T>, ComposeError> {
        Route::detached(self.clone(), template, params)
    }

    /// The configured default for `key`, or `None` when unset.
    pub fn get(&self, key: ConfigKey) -> Option<Value> {
        self.inner.config.get(key)
    }

    /// Sets a configuration default, returning the value now stored.
    ///
    /// ## Errors
    ///
    /// Returns a [`ConfigError`] when the value has the wrong shape.
    pub fn set(&self, key: ConfigKey, value: Value) -> Result<Value, ConfigError> {
        self.inner.config.set(key, value)
    }

    /// Sets several configuration defaults from an object keyed by option name.
    ///
    /// ## Errors
    ///
    /// Returns a [`ConfigError`] for a non-object, an unknown key or a
    /// wrongly shaped value; nothing is applied in that case.
    pub fn set_all(&self, values: &Value) -> Result<(), ConfigError> {
        self.inner.config.set_all(values)
    }

    /// Removes a configuration default, returning it.
    pub fn unset(&self, key: ConfigKey) -> Option<Value> {
        self.inner.config.unset(key)
    }

    /// Sends a composed request and interprets the response.
    #[instrument(
        name = "api_request",
        skip(self, request),
        fields(
            api = %self.inner.name,
            http.method = tracing::field::Empty,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
        )
    )]
    pub async fn dispatch(&self, request: RequestDescriptor) -> Result<ApiResponse, ApiError> {
        Span::current().record("http.method", request.method().to_string().as_str());
        Span::current().record("http.url", request.url().as_str());

        let raw = self.inner.transport.send(request).await?;
        Span::current().record("http.status_code", raw.status);
        debug!(status = raw.status, bytes = raw.body.len(), "response received");

        Ok(interpret(raw)?)
    }
}
