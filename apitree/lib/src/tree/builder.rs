//! Builds a [`RouteTree`] from an [`ApiDescription`].
//!
//! Construction happens on mutable drafts which are frozen into shared,
//! immutable nodes once every resource has been placed.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use apitree_define::{ApiDescription, MethodDef, ParameterDef, Resource, RestMethod};
use serde_json::Value;
use tracing::debug;

use super::RouteTree;
use super::node::{MethodBinding, NodeKind, RouteEntry, RouteNode};
use crate::error::SpecError;
use crate::media::MediaType;
use crate::template::{PathTemplate, render_scalar};

type Params = BTreeMap<String, ParameterDef>;

struct NodeDraft {
    kind: NodeKind,
    segment: PathTemplate,
    path: String,
    fallbacks: Vec<(String, String)>,
    methods: Vec<MethodBinding>,
    children: Vec<EntryDraft>,
}

struct EntryDraft {
    property: String,
    named: Option<NodeDraft>,
    variables: Vec<NodeDraft>,
}

impl NodeDraft {
    fn root() -> Self {
        Self {
            kind: NodeKind::Static,
            segment: PathTemplate::default(),
            path: String::new(),
            fallbacks: Vec::new(),
            methods: Vec::new(),
            children: Vec::new(),
        }
    }

    fn display_path(&self) -> &str {
        if self.path.is_empty() { "/" } else { &self.path }
    }

    /// Finds or creates the child for one raw path segment.
    fn child_mut(&mut self, raw: &str, params: &Params) -> Result<&mut NodeDraft, SpecError> {
        let segment = PathTemplate::parse(raw).map_err(|source| SpecError::InvalidTemplate {
            template: raw.to_string(),
            source,
        })?;
        let property = segment.property_name().to_string();
        let kind = if segment.is_literal() {
            NodeKind::Static
        } else {
            NodeKind::Variable
        };
        let path = format!("{}/{}", self.path, raw);

        let index = match self.children.iter().position(|e| e.property == property) {
            Some(index) => index,
            None => {
                self.children.push(EntryDraft {
                    property,
                    named: None,
                    variables: Vec::new(),
                });
                self.children.len() - 1
            }
        };
        let entry = &mut self.children[index];

        let draft = || {
            let fallbacks = segment
                .variables()
                .filter_map(|name| {
                    let value = params.get(name)?.implicit_value()?;
                    let text = render_scalar(name, value).ok().flatten()?;
                    Some((name.to_string(), text))
                })
                .collect();
            NodeDraft {
                kind,
                segment: segment.clone(),
                path,
                fallbacks,
                methods: Vec::new(),
                children: Vec::new(),
            }
        };

        Ok(match kind {
            NodeKind::Static => entry.named.get_or_insert_with(draft),
            NodeKind::Variable => {
                match entry.variables.iter().position(|node| node.segment == segment) {
                    Some(existing) => &mut entry.variables[existing],
                    None => {
                        entry.variables.push(draft());
                        let last = entry.variables.len() - 1;
                        &mut entry.variables[last]
                    }
                }
            }
        })
    }

    fn add_method(&mut self, binding: MethodBinding) -> Result<(), SpecError> {
        if self.methods.iter().any(|m| m.method() == binding.method()) {
            return Err(SpecError::DuplicateMethod {
                path: self.display_path().to_string(),
                method: binding.method().call_name().to_string(),
            });
        }
        self.methods.push(binding);
        Ok(())
    }

    fn freeze(self) -> Arc<RouteNode> {
        Arc::new(RouteNode {
            kind: self.kind,
            segment: self.segment,
            path: self.path,
            fallbacks: self.fallbacks,
            methods: self.methods,
            children: self.children.into_iter().map(EntryDraft::freeze).collect(),
        })
    }
}

impl EntryDraft {
    fn freeze(self) -> RouteEntry {
        RouteEntry {
            property: self.property,
            named: self.named.map(NodeDraft::freeze),
            variables: self.variables.into_iter().map(NodeDraft::freeze).collect(),
        }
    }
}

struct TreeBuilder {
    default_media: Option<MediaType>,
}

impl TreeBuilder {
    fn insert(
        &self,
        parent: &mut NodeDraft,
        resource: &Resource,
        inherited: &Params,
    ) -> Result<(), SpecError> {
        let relative = resource
            .relative_uri
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .ok_or_else(|| SpecError::MissingPath {
                parent: parent.display_path().to_string(),
            })?;

        let mut params = inherited.clone();
        params.extend(
            resource
                .uri_parameters
                .iter()
                .map(|(name, def)| (name.clone(), def.clone())),
        );

        let mut node = parent;
        for raw in relative.split('/').filter(|raw| !raw.is_empty()) {
            node = node.child_mut(raw, &params)?;
        }

        for def in &resource.methods {
            let binding = self.bind(node.display_path(), def)?;
            node.add_method(binding)?;
        }
        for child in &resource.resources {
            self.insert(node, child, &params)?;
        }
        Ok(())
    }

    fn bind(&self, path: &str, def: &MethodDef) -> Result<MethodBinding, SpecError> {
        let verb = def
            .method
            .as_deref()
            .map(str::trim)
            .filter(|verb| !verb.is_empty())
            .ok_or_else(|| SpecError::MissingMethod {
                path: path.to_string(),
            })?;
        let method = RestMethod::from_str(verb).map_err(|_| SpecError::InvalidMethod {
            path: path.to_string(),
            verb: verb.to_string(),
        })?;

        let request_media = match def.body.first() {
            Some(declared) => Some(MediaType::parse(declared)),
            None if method.accepts_body() => self.default_media.clone(),
            None => None,
        };

        Ok(MethodBinding::new(method)
            .with_request_media(request_media)
            .with_accept(def.responses.clone())
            .with_query_defaults(implicit_values(&def.query_parameters))
            .with_header_defaults(implicit_values(&def.headers)))
    }
}

fn implicit_values(params: &Params) -> Vec<(String, Value)> {
    params
        .iter()
        .filter_map(|(name, def)| Some((name.clone(), def.implicit_value()?.clone())))
        .collect()
}

/// Builds the immutable route tree for `description`.
///
/// The `{version}` placeholder of the base URI is substituted here, once.
/// Every other base URI placeholder is left for the request composer.
///
/// ## Errors
///
/// Returns a [`SpecError`] for a resource without a path, a method with a
/// missing, unknown or repeated verb, or a malformed template.
pub fn build(description: &ApiDescription) -> Result<RouteTree, SpecError> {
    let base_text = description.base_uri.clone().unwrap_or_default();
    let base_text = match description.version.as_deref() {
        Some(version) => base_text.replace("{version}", version),
        None => base_text,
    };
    let base_uri = PathTemplate::parse(&base_text).map_err(|source| SpecError::InvalidTemplate {
        template: base_text.clone(),
        source,
    })?;

    let builder = TreeBuilder {
        default_media: description.media_type.as_deref().map(MediaType::parse),
    };
    let mut root = NodeDraft::root();
    for resource in &description.resources {
        builder.insert(&mut root, resource, &Params::new())?;
    }
    let root = root.freeze();

    debug!(
        title = description.title.as_deref().unwrap_or_default(),
        nodes = root.count(),
        "built route tree"
    );

    Ok(RouteTree {
        base_uri,
        base_defaults: implicit_values(&description.base_uri_parameters),
        default_media: builder.default_media,
        root,
    })
}
