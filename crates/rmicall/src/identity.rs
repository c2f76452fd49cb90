//! # Identities
//!
//! Keys that name a remote object and correlate a reply with its call.

use std::sync::Arc;

/// Names one exported implementation: an interface and, optionally, an instance.
///
/// Without an instance id the identity is a *global* registration, addressable
/// by interface name alone. Immutable once built; cheap to clone.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct RemoteObjectIdentity {
    interface_name: Arc<str>,
    instance_id: Option<Arc<str>>,
}

impl RemoteObjectIdentity {
    /// The global identity for an interface.
    pub fn global(interface_name: impl Into<Arc<str>>) -> Self {
        Self {
            interface_name: interface_name.into(),
            instance_id: None,
        }
    }

    /// The identity of one exported instance of an interface.
    pub fn instance(interface_name: impl Into<Arc<str>>, instance_id: impl Into<Arc<str>>) -> Self {
        Self {
            interface_name: interface_name.into(),
            instance_id: Some(instance_id.into()),
        }
    }

    pub fn interface_name(&self) -> &str {
        &self.interface_name
    }

    pub fn instance_id(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }

    pub fn is_global(&self) -> bool {
        self.instance_id.is_none()
    }
}

impl std::fmt::Display for RemoteObjectIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.instance_id {
            Some(id) => write!(f, "{}#{}", self.interface_name, id),
            None => write!(f, "{}", self.interface_name),
        }
    }
}

/// Caller-supplied correlation token, copied verbatim into the reply.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub struct CallId(pub u64);

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "call-{}", self.0)
    }
}
