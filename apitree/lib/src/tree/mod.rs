//! The route tree.
//!
//! Built once per client by [`build`] and shared read-only by every route
//! handle and every in-flight request.

mod builder;
mod node;

use std::sync::Arc;

use apitree_define::RestMethod;
use serde_json::Value;

use crate::media::MediaType;
use crate::template::PathTemplate;

pub use builder::build;
pub use node::{MethodBinding, NodeKind, RouteEntry, RouteNode};

/// A built route tree plus the API-wide settings requests need.
#[derive(Debug)]
pub struct RouteTree {
    base_uri: PathTemplate,
    base_defaults: Vec<(String, Value)>,
    default_media: Option<MediaType>,
    root: Arc<RouteNode>,
}

impl RouteTree {
    /// The base URI template with `{version}` already substituted.
    pub fn base_uri(&self) -> &PathTemplate {
        &self.base_uri
    }

    /// Declared defaults for base URI parameters.
    pub fn base_defaults(&self) -> &[(String, Value)] {
        &self.base_defaults
    }

    /// The API-wide request media type, if declared.
    pub fn default_media(&self) -> Option<&MediaType> {
        self.default_media.as_ref()
    }

    /// The node for the empty path.
    pub fn root(&self) -> &Arc<RouteNode> {
        &self.root
    }

    /// A node for an ad hoc path below the root, accepting every callable verb.
    pub(crate) fn detached(&self, segment: PathTemplate) -> Arc<RouteNode> {
        let methods = RestMethod::CALLABLE
            .into_iter()
            .map(|method| {
                let media = if method.accepts_body() {
                    self.default_media.clone()
                } else {
                    None
                };
                MethodBinding::new(method).with_request_media(media)
            })
            .collect();
        Arc::new(RouteNode::detached(segment, methods))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apitree_define::ApiDescription;

    #[test]
    fn detached_nodes_accept_every_callable_verb() {
        let description =
            ApiDescription::from_yaml_str("mediaType: application/json\nresources: []\n").unwrap();
        let tree = build(&description).unwrap();
        let node = tree.detached(PathTemplate::parse("/test/{id}").unwrap());

        assert_eq!(node.methods().count(), RestMethod::CALLABLE.len());
        assert!(node.binding(RestMethod::Options).is_none());
        assert_eq!(
            node.binding(RestMethod::Put).unwrap().request_media(),
            Some(&MediaType::Json)
        );
        assert_eq!(node.binding(RestMethod::Get).unwrap().request_media(), None);
        assert_eq!(node.kind(), NodeKind::Variable);
        assert!(node.entries().is_empty());
    }
}
