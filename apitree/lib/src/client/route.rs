//! Route handles: navigable and invokable views of route tree nodes.

use std::fmt;
use std::sync::Arc;

use apitree_define::RestMethod;
use serde_json::{Map, Value};

use super::ApiClient;
use crate::error::{ApiError, ComposeError};
use crate::request::{Invocation, PathPiece, RequestDescriptor, RequestOptions};
use crate::response::ApiResponse;
use crate::template::{PathTemplate, TemplatePart, render_scalar};
use crate::transport::{HttpTransport, Transport};
use crate::tree::{NodeKind, RouteEntry, RouteNode};

/// Where a route sits relative to the tree.
#[derive(Debug, Clone)]
enum Origin {
    /// The client root; calling it starts an ad hoc path.
    Root,
    /// Reached through a property of a parent node.
    Property {
        entry: RouteEntry,
        parent: Vec<PathPiece>,
    },
    /// Built from an ad hoc template.
    Detached,
}

/// A handle on one route of a client.
///
/// A route is navigable, through [`resource`](Self::resource) and
/// [`call`](Self::call), and invokable, through [`request`](Self::request)
/// and the verb helpers. Handles are cheap to clone and independent of each
/// other.
pub struct Route<T: Transport = HttpTransport> {
    client: ApiClient<T>,
    node: Arc<RouteNode>,
    origin: Origin,
    pieces: Vec<PathPiece>,
}

impl<T: Transport> Clone for Route<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            node: Arc::clone(&self.node),
            origin: self.origin.clone(),
            pieces: self.pieces.clone(),
        }
    }
}

impl<T: Transport> fmt::Debug for Route<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.node.path())
            .field("kind", &self.node.kind())
            .field("pieces", &self.pieces)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Route<T> {
    pub(crate) fn root(client: ApiClient<T>) -> Self {
        let node = Arc::clone(client.tree().root());
        Self {
            client,
            node,
            origin: Origin::Root,
            pieces: Vec::new(),
        }
    }

    pub(crate) fn detached(
        client: ApiClient<T>,
        template: &str,
        params: &Map<String, Value>,
    ) -> Result<Self, ComposeError> {
        let template = PathTemplate::parse(template)?;
        let mut pieces = Vec::with_capacity(template.parts().len());
        for part in template.parts() {
            pieces.push(match part {
                TemplatePart::Literal(text) => PathPiece::Literal(text.clone()),
                TemplatePart::Variable(name) => match params.get(name) {
                    Some(value) => match render_scalar(name, value)? {
                        Some(text) => PathPiece::Bound(text),
                        None => unbound(name, None),
                    },
                    None => unbound(name, None),
                },
            });
        }

        let node = client.tree().detached(template);
        Ok(Self {
            client,
            node,
            origin: Origin::Detached,
            pieces,
        })
    }

    /// Navigates to a child property.
    ///
    /// When a literal and a templated segment share the name, this is the
    /// literal one; use [`call`](Self::call) on the result to reach the other.
    /// Variables of a templated child stay unbound and resolve from URI
    /// parameters at request time.
    pub fn resource(&self, name: &str) -> Option<Route<T>> {
        let entry = self.node.entry(name)?.clone();
        let node = Arc::clone(entry.primary()?);
        let mut pieces = self.pieces.clone();
        pieces.extend(segment_pieces(&node, &[]));

        Some(Self {
            client: self.client.clone(),
            node,
            origin: Origin::Property {
                entry,
                parent: self.pieces.clone(),
            },
            pieces,
        })
    }

    /// Invokes the route with positional values for its variables.
    ///
    /// On a property this selects a templated node for the property name,
    /// preferring the first whose variable count matches `args`, and binds
    /// `args` to its variables in order; missing trailing values
    /// resolve from URI parameters or declared defaults at request time. On
    /// the client root, the single argument is an ad hoc path template.
    ///
    /// ## Errors
    ///
    /// Returns [`ComposeError::NotCallable`] when there is no templated node
    /// to invoke and [`ComposeError::TooManyArguments`] when `args` outnumber
    /// the variables.
    pub fn call(&self, args: &[&str]) -> Result<Route<T>, ComposeError> {
        match &self.origin {
            Origin::Root => match args {
                [template] => self.client.path(template),
                [] => Err(ComposeError::NotCallable {
                    property: String::new(),
                }),
                _ => Err(ComposeError::TooManyArguments {
                    property: String::new(),
                    expected: 1,
                    given: args.len(),
                }),
            },
            Origin::Property { entry, parent } => {
                if entry.variables().is_empty() {
                    return Err(ComposeError::NotCallable {
                        property: entry.property().to_string(),
                    });
                }
                let node = entry.select(args.len()).ok_or_else(|| {
                    ComposeError::TooManyArguments {
                        property: entry.property().to_string(),
                        expected: entry
                            .variables()
                            .iter()
                            .map(|node| node.segment().variables().count())
                            .max()
                            .unwrap_or_default(),
                        given: args.len(),
                    }
                })?;
                Ok(self.enter(entry, parent, node, args))
            }
            Origin::Detached => Err(ComposeError::NotCallable {
                property: self.node.path().to_string(),
            }),
        }
    }

    /// Invokes the templated node declared with `template`, e.g. `{id}.json`.
    ///
    /// Use this to reach one of several templates sharing a property name.
    ///
    /// ## Errors
    ///
    /// Returns [`ComposeError::NotCallable`] when no node of this property
    /// was declared with `template` and [`ComposeError::TooManyArguments`]
    /// when `args` outnumber its variables.
    pub fn call_template(&self, template: &str, args: &[&str]) -> Result<Route<T>, ComposeError> {
        let Origin::Property { entry, parent } = &self.origin else {
            return Err(ComposeError::NotCallable {
                property: self.node.path().to_string(),
            });
        };
        let node = entry
            .variables()
            .iter()
            .find(|node| node.segment().as_str() == template)
            .ok_or_else(|| ComposeError::NotCallable {
                property: format!("{}:{template}", entry.property()),
            })?;
        let expected = node.segment().variables().count();
        if args.len() > expected {
            return Err(ComposeError::TooManyArguments {
                property: entry.property().to_string(),
                expected,
                given: args.len(),
            });
        }
        Ok(self.enter(entry, parent, node, args))
    }

    fn enter(
        &self,
        entry: &RouteEntry,
        parent: &[PathPiece],
        node: &Arc<RouteNode>,
        args: &[&str],
    ) -> Route<T> {
        let mut pieces = parent.to_vec();
        pieces.extend(segment_pieces(node, args));
        Self {
            client: self.client.clone(),
            node: Arc::clone(node),
            origin: Origin::Property {
                entry: entry.clone(),
                parent: parent.to_vec(),
            },
            pieces,
        }
    }

    /// Templates of the nodes [`call`](Self::call) can reach, in declaration order.
    pub fn call_templates(&self) -> Vec<&str> {
        match &self.origin {
            Origin::Property { entry, .. } => entry
                .variables()
                .iter()
                .map(|node| node.segment().as_str())
                .collect(),
            Origin::Root | Origin::Detached => Vec::new(),
        }
    }

    /// Returns `true` when [`call`](Self::call) can succeed.
    pub fn is_callable(&self) -> bool {
        match &self.origin {
            Origin::Root => true,
            Origin::Property { entry, .. } => !entry.variables().is_empty(),
            Origin::Detached => false,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind()
    }

    /// The declared template of this route, e.g. `/collection/{collectionId}`.
    pub fn template(&self) -> &str {
        self.node.path()
    }

    /// Methods this route accepts, in declaration order.
    pub fn methods(&self) -> Vec<RestMethod> {
        self.node.methods().collect()
    }

    /// Child property names, in declaration order.
    pub fn properties(&self) -> Vec<String> {
        self.node.property_names().map(str::to_string).collect()
    }

    /// Property names followed by method names.
    pub fn completions(&self) -> Vec<String> {
        self.node.completions()
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    /// Composes a request without sending it.
    ///
    /// `lead` is the verb's positional argument: a query for `get`/`head`, a
    /// body otherwise. The configuration snapshot is taken here.
    ///
    /// ## Errors
    ///
    /// Returns [`ComposeError::MethodNotAllowed`] for an undeclared method and
    /// any other [`ComposeError`] raised while merging layers.
    pub fn compose(
        &self,
        method: RestMethod,
        lead: Option<Value>,
        options: &RequestOptions,
    ) -> Result<RequestDescriptor, ComposeError> {
        let binding = self
            .node
            .binding(method)
            .ok_or_else(|| ComposeError::MethodNotAllowed {
                method: method.to_string(),
                path: self.node.path().to_string(),
            })?;
        let config = self.client.config().snapshot();

        Invocation {
            tree: self.client.tree(),
            pieces: &self.pieces,
            binding,
            config: &config,
            options,
            lead,
        }
        .compose()
    }

    /// Composes and sends a request.
    ///
    /// Completes exactly once with the interpreted response or the first
    /// error; non-2xx statuses are responses.
    pub async fn request(
        &self,
        method: RestMethod,
        lead: Option<Value>,
        options: &RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        let request = self.compose(method, lead, options)?;
        self.client.dispatch(request).await
    }

    pub async fn get(
        &self,
        query: Option<Value>,
        options: &RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.request(RestMethod::Get, query, options).await
    }

    pub async fn head(
        &self,
        query: Option<Value>,
        options: &RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.request(RestMethod::Head, query, options).await
    }

    pub async fn post(
        &self,
        body: Option<Value>,
        options: &RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.request(RestMethod::Post, body, options).await
    }

    pub async fn put(
        &self,
        body: Option<Value>,
        options: &RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.request(RestMethod::Put, body, options).await
    }

    pub async fn patch(
        &self,
        body: Option<Value>,
        options: &RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.request(RestMethod::Patch, body, options).await
    }

    pub async fn delete(
        &self,
        body: Option<Value>,
        options: &RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.request(RestMethod::Delete, body, options).await
    }
}

fn unbound(name: &str, fallback: Option<&str>) -> PathPiece {
    PathPiece::Unbound {
        name: name.to_string(),
        fallback: fallback.map(str::to_string),
    }
}

/// Pieces for entering `node`, binding `args` to its variables in order.
fn segment_pieces(node: &RouteNode, args: &[&str]) -> Vec<PathPiece> {
    let mut args = args.iter();
    let mut pieces = vec![PathPiece::Literal("/".to_string())];
    for part in node.segment().parts() {
        pieces.push(match part {
            TemplatePart::Literal(text) => PathPiece::Literal(text.clone()),
            TemplatePart::Variable(name) => match args.next() {
                Some(value) => PathPiece::Bound((*value).to_string()),
                None => unbound(name, node.fallback(name)),
            },
        });
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigKey;
    use apitree_define::ApiDescription;
    use serde_json::json;

    const EXAMPLE: &str = r#"
baseUri: http://example.com
resources:
  - relativeUri: /collection
    methods:
      - method: get
      - method: post
    resources:
      - relativeUri: /{collectionId}
        methods:
          - method: get
          - method: post
        resources:
          - relativeUri: /{nestedId}
            methods:
              - method: get
  - relativeUri: /{collection}
    methods:
      - method: get
      - method: post
  - relativeUri: /mixed{a}{b}
    methods:
      - method: get
  - relativeUri: /~{id}
    methods:
      - method: get
  - relativeUri: /{enum}
    uriParameters:
      enum:
        enum: [value]
    methods:
      - method: get
"#;

    fn client() -> ApiClient {
        let description = ApiDescription::from_yaml_str(EXAMPLE).unwrap();
        ApiClient::from_description("example", &description, HttpTransport::new().unwrap())
            .unwrap()
    }

    fn url(route: &Route) -> String {
        route
            .compose(RestMethod::Get, None, &RequestOptions::new())
            .unwrap()
            .url()
            .to_string()
    }

    #[test]
    fn named_and_variable_routes_stay_apart() {
        let client = client();
        let collection = client.resource("collection").unwrap();
        assert_eq!(collection.kind(), NodeKind::Static);
        assert_eq!(url(&collection), "http://example.com/collection");
        assert_eq!(collection.completions(), vec!["collectionId", "get", "post"]);

        let test = collection.call(&["test"]).unwrap();
        assert_eq!(test.kind(), NodeKind::Variable);
        assert_eq!(url(&test), "http://example.com/test");
        assert_eq!(test.methods(), vec![RestMethod::Get, RestMethod::Post]);
        assert!(test.properties().is_empty());
    }

    #[test]
    fn nested_variable_routes() {
        let client = client();
        let nested = client
            .resource("collection")
            .and_then(|r| r.resource("collectionId"))
            .unwrap()
            .call(&["123"])
            .unwrap()
            .resource("nestedId")
            .unwrap()
            .call(&["456"])
            .unwrap();
        assert_eq!(url(&nested), "http://example.com/collection/123/456");
        assert_eq!(nested.completions(), vec!["get"]);
    }

    #[test]
    fn mixed_segments_concatenate() {
        let client = client();
        let mixed = client.resource("mixed").unwrap().call(&["123", "456"]).unwrap();
        assert_eq!(url(&mixed), "http://example.com/mixed123456");

        let err = client
            .resource("mixed")
            .unwrap()
            .call(&["1", "2", "3"])
            .unwrap_err();
        assert!(matches!(
            err,
            ComposeError::TooManyArguments { expected: 2, given: 3, .. }
        ));
    }

    #[test]
    fn non_identifier_properties_are_reachable() {
        let client = client();
        let tilde = client.resource("~").unwrap().call(&["123"]).unwrap();
        assert_eq!(url(&tilde), "http://example.com/~123");
    }

    #[test]
    fn single_value_enum_is_injected() {
        let client = client();
        let route = client.resource("enum").unwrap().call(&[]).unwrap();
        assert_eq!(url(&route), "http://example.com/value");
    }

    #[test]
    fn unbound_variables_use_configured_parameters() {
        let client = client();
        client
            .set(ConfigKey::UriParameters, json!({ "collectionId": 567 }))
            .unwrap();
        let route = client
            .resource("collection")
            .and_then(|r| r.resource("collectionId"))
            .unwrap();
        assert_eq!(url(&route), "http://example.com/collection/567");
        assert_eq!(url(&route.call(&[]).unwrap()), "http://example.com/collection/567");

        client.unset(ConfigKey::UriParameters);
        let err = route
            .compose(RestMethod::Get, None, &RequestOptions::new())
            .unwrap_err();
        assert!(matches!(err, ComposeError::UnresolvedVariable { name } if name == "collectionId"));
    }

    #[test]
    fn static_only_property_is_not_callable() {
        let client = client();
        let nested = client
            .resource("collection")
            .and_then(|r| r.resource("collectionId"))
            .and_then(|r| r.call(&["1"]).ok())
            .unwrap();
        assert!(nested.is_callable());

        let description = ApiDescription::from_yaml_str(
            "baseUri: http://example.com\nresources:\n  - relativeUri: /plain\n",
        )
        .unwrap();
        let client =
            ApiClient::from_description("plain", &description, HttpTransport::new().unwrap())
                .unwrap();
        let plain = client.resource("plain").unwrap();
        assert!(!plain.is_callable());
        assert!(matches!(
            plain.call(&["x"]),
            Err(ComposeError::NotCallable { property }) if property == "plain"
        ));
    }

    #[test]
    fn undeclared_method_is_rejected() {
        let client = client();
        let collection = client.resource("collection").unwrap();
        let err = collection
            .compose(RestMethod::Delete, None, &RequestOptions::new())
            .unwrap_err();
        assert!(matches!(err, ComposeError::MethodNotAllowed { method, path }
            if method == "DELETE" && path == "/collection"));
    }

    #[test]
    fn root_calls_build_detached_routes() {
        let client = client();
        let route = client.root().call(&["/test/route"]).unwrap();
        assert_eq!(route.methods(), RestMethod::CALLABLE.to_vec());
        assert_eq!(url(&route), "http://example.com/test/route");
        assert!(!route.is_callable());

        let params = json!({ "test": "here", "variable": "there" });
        let route = client
            .path_with("/{test}/{variable}/{test}", params.as_object().unwrap())
            .unwrap();
        assert_eq!(url(&route), "http://example.com/here/there/here");

        assert!(matches!(
            client.root().call(&[]),
            Err(ComposeError::NotCallable { .. })
        ));
        assert!(matches!(
            client.path("/{broken"),
            Err(ComposeError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn templates_sharing_a_property_are_all_reachable() {
        let description = ApiDescription::from_yaml_str(
            r#"
baseUri: http://example.com
resources:
  - relativeUri: /{id}
    methods:
      - method: get
  - relativeUri: /{id}.json
    methods:
      - method: get
"#,
        )
        .unwrap();
        let client =
            ApiClient::from_description("ext", &description, HttpTransport::new().unwrap())
                .unwrap();
        let id = client.resource("id").unwrap();
        assert_eq!(id.call_templates(), vec!["{id}", "{id}.json"]);

        assert_eq!(url(&id.call(&["5"]).unwrap()), "http://example.com/5");
        assert_eq!(
            url(&id.call_template("{id}.json", &["5"]).unwrap()),
            "http://example.com/5.json"
        );
        assert!(matches!(
            id.call_template("{id}.xml", &["5"]),
            Err(ComposeError::NotCallable { .. })
        ));
        assert!(matches!(
            id.call_template("{id}.json", &["5", "6"]),
            Err(ComposeError::TooManyArguments { expected: 1, given: 2, .. })
        ));
    }

    #[test]
    fn unknown_property_is_none() {
        let client = client();
        assert!(client.resource("missing").is_none());
        assert_eq!(
            client.root().properties(),
            vec!["collection", "mixed", "~", "enum"]
        );
    }
}
