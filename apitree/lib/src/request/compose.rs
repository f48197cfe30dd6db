//! Merges configuration layers into a [`RequestDescriptor`].

use serde_json::{Map, Value};
use tracing::trace;
use url::Url;

use super::body;
use super::query::QueryPairs;
use super::{RequestDescriptor, RequestOptions};
use crate::config::{ConfigKey, ConfigSnapshot};
use crate::error::ComposeError;
use crate::media::MediaType;
use crate::template::{encode_segment, render_scalar};
use crate::tree::{MethodBinding, RouteTree};

const ACCEPT: &str = "Accept";
const CONTENT_TYPE: &str = "Content-Type";

/// One piece of a route's path, accumulated while navigating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PathPiece {
    /// Text copied verbatim, separators included.
    Literal(String),
    /// A positional argument, encoded on expansion.
    Bound(String),
    /// A variable resolved from parameters at request time.
    Unbound {
        name: String,
        fallback: Option<String>,
    },
}

/// Everything a single invocation composes from.
pub(crate) struct Invocation<'a> {
    pub tree: &'a RouteTree,
    pub pieces: &'a [PathPiece],
    pub binding: &'a MethodBinding,
    pub config: &'a ConfigSnapshot,
    pub options: &'a RequestOptions,
    /// Query for `get`/`head`, body for the other verbs. `null` counts as absent.
    pub lead: Option<Value>,
}

impl Invocation<'_> {
    /// Resolves the invocation into a descriptor.
    ///
    /// ## Errors
    ///
    /// Returns a [`ComposeError`] for an unresolved variable, a malformed
    /// query or parameter, an unserializable body or an invalid final URL.
    pub(crate) fn compose(self) -> Result<RequestDescriptor, ComposeError> {
        let method = self.binding.method();
        let lead = self.lead.clone().filter(|value| !value.is_null());

        let mut query = QueryPairs::from_defaults(self.binding.query_defaults())?;
        if let Some(layer) = self.config.get(ConfigKey::Query) {
            query.overlay(QueryPairs::from_value(layer)?);
        }
        if let Some(layer) = &self.options.query {
            query.overlay(QueryPairs::from_value(layer)?);
        }
        if !method.accepts_body() {
            if let Some(layer) = &lead {
                query.overlay(QueryPairs::from_value(layer)?);
            }
        }

        let mut headers = self.headers()?;

        let body = if method.accepts_body() {
            lead.or_else(|| self.options.body.clone())
                .or_else(|| self.config.get(ConfigKey::Body).cloned())
                .filter(|value| !value.is_null())
        } else {
            None
        };

        let body = match body {
            Some(value) => {
                if headers.get(CONTENT_TYPE).is_none() {
                    if let Some(media) = self.binding.request_media() {
                        headers.set(CONTENT_TYPE, media.as_str().to_string());
                    }
                }
                let negotiated = headers.get(CONTENT_TYPE).map(MediaType::parse);
                let (text, untyped_json) = body::serialize(&value, negotiated.as_ref())?;
                if untyped_json {
                    headers.set(CONTENT_TYPE, MediaType::JSON.to_string());
                }
                Some(text)
            }
            None => None,
        };

        let url = self.url(&query)?;
        trace!(method = %method, url = %url, body = body.is_some(), "composed request");

        Ok(RequestDescriptor::new(method, url, headers.0, body))
    }

    fn headers(&self) -> Result<HeaderList, ComposeError> {
        let mut headers = HeaderList::default();
        if !self.binding.accept().is_empty() {
            headers.set(ACCEPT, self.binding.accept().join(", "));
        }
        for (name, value) in self.binding.header_defaults() {
            if let Some(text) = render_scalar(name, value)? {
                headers.set(name, text);
            }
        }

        let layers = [
            self.config.object(ConfigKey::Headers),
            self.options.headers.as_ref(),
        ];
        for layer in layers.into_iter().flatten() {
            for (name, value) in layer {
                match render_scalar(name, value)? {
                    Some(text) => headers.set(name, text),
                    None => headers.remove(name),
                }
            }
        }
        Ok(headers)
    }

    fn url(&self, query: &QueryPairs) -> Result<Url, ComposeError> {
        let base = self.expand_base()?;
        let path = self.expand_path()?;

        let mut text = base.trim_end_matches('/').to_string();
        if !path.is_empty() {
            if !path.starts_with('/') {
                text.push('/');
            }
            text.push_str(&path);
        }

        let mut url = Url::parse(&text).map_err(|source| ComposeError::InvalidUrl {
            url: text.clone(),
            source,
        })?;
        if !query.is_empty() {
            let encoded = query.encode();
            let combined = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
                _ => encoded,
            };
            url.set_query(Some(&combined));
        }
        Ok(url)
    }

    fn expand_base(&self) -> Result<String, ComposeError> {
        let layers = [
            self.options.base_uri_parameters.as_ref(),
            self.options.uri_parameters.as_ref(),
            self.config.object(ConfigKey::BaseUriParameters),
            self.config.object(ConfigKey::UriParameters),
        ];

        let template = self.tree.base_uri();
        let mut resolved = Vec::new();
        for name in template.variables() {
            let value = match lookup(name, &layers)? {
                Some(value) => Some(value),
                None => match self.tree.base_defaults().iter().find(|(n, _)| n == name) {
                    Some((_, declared)) => render_scalar(name, declared)?,
                    None => None,
                },
            };
            if let Some(value) = value {
                resolved.push((name.to_string(), value));
            }
        }

        template.expand(|name| {
            resolved
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, value)| value.clone())
        })
    }

    fn expand_path(&self) -> Result<String, ComposeError> {
        let layers = [
            self.options.uri_parameters.as_ref(),
            self.config.object(ConfigKey::UriParameters),
        ];

        let mut path = String::new();
        for piece in self.pieces {
            match piece {
                PathPiece::Literal(text) => path.push_str(text),
                PathPiece::Bound(value) => path.push_str(&encode_segment(value)),
                PathPiece::Unbound { name, fallback } => {
                    let value = lookup(name, &layers)?
                        .or_else(|| fallback.clone())
                        .ok_or_else(|| ComposeError::UnresolvedVariable { name: name.clone() })?;
                    path.push_str(&encode_segment(&value));
                }
            }
        }
        Ok(path)
    }
}

/// First non-null value for `name`, searching `layers` highest first.
fn lookup(
    name: &str,
    layers: &[Option<&Map<String, Value>>],
) -> Result<Option<String>, ComposeError> {
    for layer in layers.iter().flatten() {
        if let Some(value) = layer.get(name) {
            if let Some(text) = render_scalar(name, value)? {
                return Ok(Some(text));
            }
        }
    }
    Ok(None)
}

/// Headers with case-insensitive replacement.
#[derive(Debug, Default)]
struct HeaderList(Vec<(String, String)>);

impl HeaderList {
    fn set(&mut self, name: &str, value: String) {
        self.remove(name);
        self.0.push((name.to_string(), value));
    }

    fn remove(&mut self, name: &str) {
        self.0.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigStore;
    use crate::tree::{RouteTree, build};
    use apitree_define::{ApiDescription, RestMethod};
    use serde_json::json;

    const API: &str = r#"
baseUri: http://{zone}.example.com/{version}/
version: v2
baseUriParameters:
  zone:
    default: emea
resources:
  - relativeUri: /things
    methods:
      - method: get
        responses: [application/json]
        queryParameters:
          limit:
            default: 10
      - method: post
        body: [application/x-www-form-urlencoded]
        headers:
          X-Client:
            default: apitree
"#;

    fn tree() -> RouteTree {
        build(&ApiDescription::from_yaml_str(API).unwrap()).unwrap()
    }

    fn things() -> Vec<PathPiece> {
        vec![PathPiece::Literal("/things".to_string())]
    }

    fn compose(
        tree: &RouteTree,
        pieces: &[PathPiece],
        method: RestMethod,
        config: &ConfigStore,
        options: &RequestOptions,
        lead: Option<Value>,
    ) -> Result<RequestDescriptor, ComposeError> {
        let node = tree.root().entry("things").unwrap().named().unwrap();
        Invocation {
            tree,
            pieces,
            binding: node.binding(method).unwrap(),
            config: &config.snapshot(),
            options,
            lead,
        }
        .compose()
    }

    #[test]
    fn declared_defaults_apply_lowest() {
        let tree = tree();
        let config = ConfigStore::new();
        let request = compose(
            &tree,
            &things(),
            RestMethod::Get,
            &config,
            &RequestOptions::new(),
            None,
        )
        .unwrap();

        assert_eq!(
            request.url().as_str(),
            "http://emea.example.com/v2/things?limit=10"
        );
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.body(), None);
    }

    #[test]
    fn query_layers_merge_by_key() {
        let tree = tree();
        let config = ConfigStore::new();
        config.set(ConfigKey::Query, json!("test=data&limit=5")).unwrap();
        let options = RequestOptions::new().query(json!({ "limit": 20 }));

        let request = compose(
            &tree,
            &things(),
            RestMethod::Get,
            &config,
            &options,
            Some(json!({ "this": "that" })),
        )
        .unwrap();
        assert_eq!(request.url().query(), Some("test=data&limit=20&this=that"));
    }

    #[test]
    fn form_body_and_declared_content_type() {
        let tree = tree();
        let config = ConfigStore::new();
        let request = compose(
            &tree,
            &things(),
            RestMethod::Post,
            &config,
            &RequestOptions::new(),
            Some(json!({ "bool": true, "number": 123, "string": "test" })),
        )
        .unwrap();

        assert_eq!(request.body(), Some("bool=true&number=123&string=test"));
        assert_eq!(
            request.header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(request.header("x-client"), Some("apitree"));
    }

    #[test]
    fn body_precedence() {
        let tree = tree();
        let config = ConfigStore::new();
        config.set(ConfigKey::Body, json!("test body")).unwrap();

        let post = |options: RequestOptions, lead: Option<Value>| {
            compose(&tree, &things(), RestMethod::Post, &config, &options, lead).unwrap()
        };

        assert_eq!(post(RequestOptions::new(), None).body(), Some("test body"));
        assert_eq!(
            post(RequestOptions::new().body("from options"), None).body(),
            Some("from options")
        );
        assert_eq!(
            post(RequestOptions::new().body("from options"), Some(json!("lead"))).body(),
            Some("lead")
        );
        assert_eq!(
            post(RequestOptions::new().body(Value::Null), None).body(),
            None
        );
        assert_eq!(
            post(RequestOptions::new().body(""), None).body(),
            Some("")
        );
    }

    #[test]
    fn get_never_sends_a_body() {
        let tree = tree();
        let config = ConfigStore::new();
        config.set(ConfigKey::Body, json!("test body")).unwrap();
        let request = compose(
            &tree,
            &things(),
            RestMethod::Get,
            &config,
            &RequestOptions::new(),
            None,
        )
        .unwrap();
        assert_eq!(request.body(), None);
        assert_eq!(request.header("content-type"), None);
    }

    #[test]
    fn structured_body_needs_a_structured_content_type() {
        let tree = tree();
        let options = RequestOptions::new().header("Content-Type", "text/html");
        let err = compose(
            &tree,
            &things(),
            RestMethod::Post,
            &ConfigStore::new(),
            &options,
            Some(json!({ "a": 1 })),
        )
        .unwrap_err();
        assert!(matches!(err, ComposeError::UnsupportedBody { media_type } if media_type == "text/html"));
    }

    #[test]
    fn headers_override_case_insensitively() {
        let tree = tree();
        let config = ConfigStore::new();
        config
            .set(
                ConfigKey::Headers,
                json!({ "X-Test-Header": "Test Header", "X-Other": "kept" }),
            )
            .unwrap();
        let options = RequestOptions::new()
            .header("x-test-header", "Test")
            .header("Content-Type", "text/html");

        let request = compose(
            &tree,
            &things(),
            RestMethod::Post,
            &config,
            &options,
            Some(json!("<p>hi</p>")),
        )
        .unwrap();

        assert_eq!(request.header("X-Test-Header"), Some("Test"));
        assert_eq!(request.header("x-other"), Some("kept"));
        assert_eq!(request.header("content-type"), Some("text/html"));
        assert_eq!(
            request
                .headers()
                .iter()
                .filter(|(n, _)| n.eq_ignore_ascii_case("x-test-header"))
                .count(),
            1
        );
    }

    #[test]
    fn null_header_removes_lower_layer() {
        let tree = tree();
        let config = ConfigStore::new();
        config.set(ConfigKey::Headers, json!({ "X-Drop": "me" })).unwrap();
        let options = RequestOptions::new().header("X-Drop", Value::Null);
        let request = compose(&tree, &things(), RestMethod::Get, &config, &options, None).unwrap();
        assert_eq!(request.header("x-drop"), None);
    }

    #[test]
    fn base_parameter_precedence() {
        let tree = tree();
        let config = ConfigStore::new();
        let url = |config: &ConfigStore, options: RequestOptions| {
            compose(&tree, &things(), RestMethod::Get, config, &options, None)
                .unwrap()
                .url()
                .host_str()
                .unwrap_or_default()
                .to_string()
        };

        assert_eq!(url(&config, RequestOptions::new()), "emea.example.com");

        config
            .set(ConfigKey::UriParameters, json!({ "zone": "us" }))
            .unwrap();
        assert_eq!(url(&config, RequestOptions::new()), "us.example.com");

        config
            .set(ConfigKey::BaseUriParameters, json!({ "zone": "apac" }))
            .unwrap();
        assert_eq!(url(&config, RequestOptions::new()), "apac.example.com");

        assert_eq!(
            url(&config, RequestOptions::new().uri_parameter("zone", "eu")),
            "eu.example.com"
        );
        assert_eq!(
            url(
                &config,
                RequestOptions::new()
                    .uri_parameter("zone", "eu")
                    .base_uri_parameter("zone", "latam")
            ),
            "latam.example.com"
        );
    }

    #[test]
    fn path_variables_resolve_by_layer() {
        let tree = tree();
        let config = ConfigStore::new();
        let pieces = vec![
            PathPiece::Literal("/things/".to_string()),
            PathPiece::Unbound {
                name: "id".to_string(),
                fallback: Some("fallback".to_string()),
            },
            PathPiece::Literal("/".to_string()),
            PathPiece::Bound("a b".to_string()),
        ];
        let path = |config: &ConfigStore, options: RequestOptions| {
            compose(&tree, &pieces, RestMethod::Get, config, &options, None)
                .unwrap()
                .url()
                .path()
                .to_string()
        };

        assert_eq!(path(&config, RequestOptions::new()), "/v2/things/fallback/a%20b");

        config
            .set(ConfigKey::UriParameters, json!({ "id": 567 }))
            .unwrap();
        assert_eq!(path(&config, RequestOptions::new()), "/v2/things/567/a%20b");
        assert_eq!(
            path(&config, RequestOptions::new().uri_parameter("id", "x")),
            "/v2/things/x/a%20b"
        );
    }

    #[test]
    fn unresolved_variable_fails() {
        let tree = tree();
        let config = ConfigStore::new();
        let pieces = vec![PathPiece::Unbound {
            name: "id".to_string(),
            fallback: None,
        }];
        let err = compose(
            &tree,
            &pieces,
            RestMethod::Get,
            &config,
            &RequestOptions::new(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ComposeError::UnresolvedVariable { name } if name == "id"));
    }

    #[test]
    fn root_slash_keeps_trailing_separator() {
        let tree = tree();
        let config = ConfigStore::new();
        let pieces = vec![PathPiece::Literal("/".to_string())];
        let request = compose(
            &tree,
            &pieces,
            RestMethod::Get,
            &config,
            &RequestOptions::new(),
            None,
        )
        .unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://emea.example.com/v2/?limit=10"
        );
    }

    #[test]
    fn untyped_structured_body_is_sent_as_json() {
        let description = ApiDescription::from_yaml_str(
            "baseUri: http://example.com\nresources:\n  - relativeUri: /things\n    methods:\n      - method: post\n",
        )
        .unwrap();
        let tree = build(&description).unwrap();
        let config = ConfigStore::new();
        let request = compose(
            &tree,
            &things(),
            RestMethod::Post,
            &config,
            &RequestOptions::new(),
            Some(json!({ "a": [1, 2] })),
        )
        .unwrap();
        assert_eq!(request.body(), Some(r#"{"a":[1,2]}"#));
        assert_eq!(request.header("content-type"), Some("application/json"));
    }
}
