//! # Type Universe
//!
//! The set of type names a method reference may mention. Primitive tokens are
//! always known; a named token resolves only if the runtime has heard of it,
//! either as a built-in, through a described class, or by declaration.

use std::sync::Arc;

use dashmap::DashSet;
use rmicall::ParamType;
use rmicall::Primitive;
use rmicall::types::BUILTIN_NAMES;

use crate::class::SignatureKey;

/// Concurrent set of known fully qualified type names.
#[derive(Debug)]
pub struct TypeUniverse {
    names: DashSet<Arc<str>>,
}

impl TypeUniverse {
    /// A universe holding only the built-in named types.
    pub fn new() -> Self {
        let names = DashSet::new();
        for name in BUILTIN_NAMES {
            names.insert(Arc::from(name));
        }
        Self { names }
    }

    pub fn insert(&self, name: &str) {
        if !self.names.contains(name) {
            self.names.insert(Arc::from(name));
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Maps a parameter token to its type. Exact match only.
    pub fn resolve(&self, token: &str) -> Option<ParamType> {
        if let Some(p) = Primitive::from_token(token) {
            return Some(ParamType::Primitive(p));
        }
        self.names
            .get(token)
            .map(|name| ParamType::Named(Arc::clone(name.key())))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for TypeUniverse {
    fn default() -> Self {
        Self::new()
    }
}

/// A declared remote interface.
///
/// Signatures are optional. When present, an implementation registered under
/// this interface must provide every one of them.
#[derive(Clone, Debug)]
pub struct Interface {
    name: Arc<str>,
    methods: Vec<SignatureKey>,
}

impl Interface {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    pub fn method<P: Into<ParamType>>(mut self, name: &str, params: impl IntoIterator<Item = P>) -> Self {
        self.methods.push(SignatureKey::new(name, params.into_iter().map(Into::into).collect()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &[SignatureKey] {
        &self.methods
    }
}
