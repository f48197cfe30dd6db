//! Immutable route tree nodes.

use std::sync::Arc;

use apitree_define::RestMethod;
use serde_json::Value;

use crate::media::MediaType;
use crate::template::PathTemplate;

/// Whether a node's segment is plain text or contains placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Reached by property name alone.
    Static,
    /// Reached by invoking the property with positional values.
    Variable,
}

/// A declared method together with its media-type defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodBinding {
    method: RestMethod,
    request_media: Option<MediaType>,
    accept: Vec<String>,
    query_defaults: Vec<(String, Value)>,
    header_defaults: Vec<(String, Value)>,
}

impl MethodBinding {
    /// A binding with no declared defaults.
    pub fn new(method: RestMethod) -> Self {
        Self {
            method,
            request_media: None,
            accept: Vec::new(),
            query_defaults: Vec::new(),
            header_defaults: Vec::new(),
        }
    }

    /// Sets the request body media type.
    pub fn with_request_media(mut self, media: Option<MediaType>) -> Self {
        self.request_media = media;
        self
    }

    /// Sets the response media types sent as `Accept`.
    pub fn with_accept(mut self, accept: Vec<String>) -> Self {
        self.accept = accept;
        self
    }

    /// Sets declared query parameter defaults.
    pub fn with_query_defaults(mut self, defaults: Vec<(String, Value)>) -> Self {
        self.query_defaults = defaults;
        self
    }

    /// Sets declared header defaults.
    pub fn with_header_defaults(mut self, defaults: Vec<(String, Value)>) -> Self {
        self.header_defaults = defaults;
        self
    }

    pub fn method(&self) -> RestMethod {
        self.method
    }

    pub fn request_media(&self) -> Option<&MediaType> {
        self.request_media.as_ref()
    }

    pub fn accept(&self) -> &[String] {
        &self.accept
    }

    pub fn query_defaults(&self) -> &[(String, Value)] {
        &self.query_defaults
    }

    pub fn header_defaults(&self) -> &[(String, Value)] {
        &self.header_defaults
    }
}

/// One property exposed by a node.
///
/// A property may lead to a static node, templated nodes, or both when a
/// literal segment and templated segments share a name. Several templates may
/// share a property, as `{id}` and `{id}.json` do. Nodes are never merged:
/// each keeps its own methods and children.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub(crate) property: String,
    pub(crate) named: Option<Arc<RouteNode>>,
    pub(crate) variables: Vec<Arc<RouteNode>>,
}

impl RouteEntry {
    /// The property name, which need not be a valid identifier.
    pub fn property(&self) -> &str {
        &self.property
    }

    /// The node reached by property access.
    pub fn named(&self) -> Option<&Arc<RouteNode>> {
        self.named.as_ref()
    }

    /// The first declared templated node.
    pub fn variable(&self) -> Option<&Arc<RouteNode>> {
        self.variables.first()
    }

    /// Every templated node for this property, in declaration order.
    pub fn variables(&self) -> &[Arc<RouteNode>] {
        &self.variables
    }

    /// The templated node an invocation with `given` arguments selects.
    ///
    /// The first node taking exactly `given` values wins, then the first
    /// taking more, whose trailing variables resolve at request time.
    pub fn select(&self, given: usize) -> Option<&Arc<RouteNode>> {
        let arity = |node: &&Arc<RouteNode>| node.segment().variables().count();
        self.variables
            .iter()
            .find(|node| arity(node) == given)
            .or_else(|| self.variables.iter().find(|node| arity(node) > given))
    }

    /// The node property access lands on: the static node when there is one.
    pub fn primary(&self) -> Option<&Arc<RouteNode>> {
        self.named.as_ref().or(self.variables.first())
    }
}

/// A node in the route tree.
#[derive(Debug)]
pub struct RouteNode {
    pub(crate) kind: NodeKind,
    pub(crate) segment: PathTemplate,
    pub(crate) path: String,
    pub(crate) fallbacks: Vec<(String, String)>,
    pub(crate) methods: Vec<MethodBinding>,
    pub(crate) children: Vec<RouteEntry>,
}

impl RouteNode {
    /// A childless node accepting `methods`, used for root invocations.
    pub(crate) fn detached(segment: PathTemplate, methods: Vec<MethodBinding>) -> Self {
        Self {
            kind: if segment.is_literal() {
                NodeKind::Static
            } else {
                NodeKind::Variable
            },
            path: segment.as_str().to_string(),
            segment,
            fallbacks: Vec::new(),
            methods,
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// This node's own segment, without a leading `/`.
    pub fn segment(&self) -> &PathTemplate {
        &self.segment
    }

    /// The declared path from the root, e.g. `/collection/{collectionId}`.
    pub fn path(&self) -> &str {
        if self.path.is_empty() { "/" } else { &self.path }
    }

    /// Declared fallback for a segment variable.
    pub fn fallback(&self, variable: &str) -> Option<&str> {
        self.fallbacks
            .iter()
            .find(|(name, _)| name == variable)
            .map(|(_, value)| value.as_str())
    }

    /// Declared methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = RestMethod> + '_ {
        self.methods.iter().map(MethodBinding::method)
    }

    /// The binding for `method`, if declared here.
    pub fn binding(&self, method: RestMethod) -> Option<&MethodBinding> {
        self.methods.iter().find(|binding| binding.method == method)
    }

    /// Child properties in declaration order.
    pub fn entries(&self) -> &[RouteEntry] {
        &self.children
    }

    /// Looks up a child property by exact name.
    pub fn entry(&self, property: &str) -> Option<&RouteEntry> {
        self.children.iter().find(|entry| entry.property == property)
    }

    /// Child property names in declaration order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|entry| entry.property.as_str())
    }

    /// Property names followed by method names, for completion tooling.
    pub fn completions(&self) -> Vec<String> {
        self.property_names()
            .map(str::to_string)
            .chain(self.methods().map(|m| m.call_name().to_string()))
            .collect()
    }

    /// Number of nodes in this subtree, this one included.
    pub fn count(&self) -> usize {
        1 + self
            .children
            .iter()
            .flat_map(|entry| entry.named.iter().chain(entry.variables.iter()))
            .map(|node| node.count())
            .sum::<usize>()
    }
}
