//! Service and RPC definitions.

use serde::{Deserialize, Serialize};
use span::Span;

use crate::instance::TypeInstance;

/// One RPC within a service: a name, an HTTP-style path, and a
/// request/response pair.
///
/// Request and response types are each paired with a `bool` marking whether
/// the declaration used the `stream` modifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcDefinition {
    /// The RPC's name.
    pub name: String,
    /// The RPC's path, as declared (e.g. `"/users.get"`).
    pub path: String,
    /// `(is_streaming, type)` for the request.
    pub request: (bool, TypeInstance),
    /// `(is_streaming, type)` for the response.
    pub response: (bool, TypeInstance),
    /// Where this RPC was declared.
    pub span: Span,
}

/// A `service` definition: a named, ordered set of RPCs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// The service's name.
    pub name: String,
    /// Package this service is defined in.
    pub package_id: String,
    /// The RPCs, in declaration order.
    pub rpcs: Vec<RpcDefinition>,
    /// Where this service was declared.
    pub span: Span,
}

impl ServiceDefinition {
    /// Find an RPC by name.
    pub fn rpc(&self, name: &str) -> Option<&RpcDefinition> {
        self.rpcs.iter().find(|r| r.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::TypeKey;

    fn dummy_span() -> Span {
        let mut map = span::SourceMap::new();
        let id = map.insert("p.eproto", "");
        Span::point(id, span::Position::default())
    }

    #[test]
    fn rpc_lookup_by_name() {
        let svc = ServiceDefinition {
            name: "Users".into(),
            package_id: "p".into(),
            rpcs: vec![RpcDefinition {
                name: "get".into(),
                path: "/users.get".into(),
                request: (false, TypeInstance::real(TypeKey::new("p", "GetRequest"))),
                response: (false, TypeInstance::real(TypeKey::new("p", "GetResponse"))),
                span: dummy_span(),
            }],
            span: dummy_span(),
        };
        assert!(svc.rpc("get").is_some());
        assert!(svc.rpc("missing").is_none());
    }
}
