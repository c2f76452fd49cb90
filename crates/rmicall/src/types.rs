//! # Parameter Types
//!
//! The vocabulary of a method signature. A parameter is either one of the nine
//! primitive keywords or a fully qualified type name.

use std::sync::Arc;

/// Fully qualified name of the type carried by `Value::Str`.
pub const STRING: &str = "std::string::String";
/// Fully qualified name of the type carried by `Value::List`.
pub const LIST: &str = "std::vec::Vec";
/// Fully qualified name of the type carried by `Value::Remote`.
pub const REMOTE: &str = "rmicall::RemoteObjectIdentity";

/// Named types every runtime knows without being told.
pub const BUILTIN_NAMES: [&str; 3] = [STRING, LIST, REMOTE];

/// The fixed primitive types, each spelled by exactly one keyword token.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum Primitive {
    Int,
    Long,
    Double,
    Float,
    Bool,
    Char,
    Byte,
    Short,
    Void,
}

impl Primitive {
    pub const ALL: [Primitive; 9] = [
        Self::Int,
        Self::Long,
        Self::Double,
        Self::Float,
        Self::Bool,
        Self::Char,
        Self::Byte,
        Self::Short,
        Self::Void,
    ];

    /// Maps a keyword token to its primitive. Matching is exact.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "int" => Some(Self::Int),
            "long" => Some(Self::Long),
            "double" => Some(Self::Double),
            "float" => Some(Self::Float),
            "bool" => Some(Self::Bool),
            "char" => Some(Self::Char),
            "byte" => Some(Self::Byte),
            "short" => Some(Self::Short),
            "void" => Some(Self::Void),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Long => "long",
            Self::Double => "double",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Char => "char",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Void => "void",
        }
    }
}

impl std::fmt::Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// The type of one method parameter.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum ParamType {
    Primitive(Primitive),
    Named(Arc<str>),
}

impl ParamType {
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self::Named(name.into())
    }

    pub fn string() -> Self {
        Self::named(STRING)
    }

    pub fn list() -> Self {
        Self::named(LIST)
    }

    pub fn remote() -> Self {
        Self::named(REMOTE)
    }

    /// The token that spells this type inside a method reference.
    pub fn token(&self) -> &str {
        match self {
            Self::Primitive(p) => p.token(),
            Self::Named(name) => name,
        }
    }
}

impl From<Primitive> for ParamType {
    fn from(p: Primitive) -> Self {
        Self::Primitive(p)
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_primitive_token_maps_back() {
        for p in Primitive::ALL {
            assert_eq!(Primitive::from_token(p.token()), Some(p));
        }
    }

    #[test]
    fn test_primitive_tokens_are_exact() {
        assert_eq!(Primitive::from_token("Int"), None);
        assert_eq!(Primitive::from_token(" int"), None);
        assert_eq!(Primitive::from_token("boolean"), None);
    }

    #[test]
    fn test_named_token_is_the_name() {
        let ty = ParamType::named("demo.Account");
        assert_eq!(ty.token(), "demo.Account");
        assert_eq!(ParamType::string().to_string(), STRING);
    }
}
