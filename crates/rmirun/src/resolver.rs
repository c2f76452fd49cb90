//! # Method Resolver
//!
//! Turns method reference text into a method of a concrete class.
//!
//! Matching is exact: the name and every parameter type must equal a described
//! signature. There is no widening, boxing, varargs or overload ranking, so at
//! most one method can match. The declaring type in the text is ignored; the
//! class that actually implements the target is what gets searched.

use std::sync::Arc;

use rmicall::MethodRef;

use crate::class::Class;
use crate::class::Method;
use crate::class::SignatureKey;
use crate::universe::TypeUniverse;

/// Why a method reference did not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    Malformed(rmicall::Error),
    UnknownType(String),
    NotFound { class: &'static str, signature: String },
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(e) => write!(f, "{}", e),
            Self::UnknownType(token) => write!(f, "Unknown parameter type '{}'", token),
            Self::NotFound { class, signature } => write!(f, "{} has no method {}", class, signature),
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<rmicall::Error> for ResolveError {
    fn from(e: rmicall::Error) -> Self {
        Self::Malformed(e)
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Resolves `method_ref` against `class`.
///
/// Successful resolutions of canonically spelled references are remembered on
/// the class, so a repeated call skips parsing and type lookup.
pub fn resolve(class: &Class, universe: &TypeUniverse, method_ref: &str) -> Result<Arc<Method>> {
    let signature = signature_text(method_ref);
    if let Some(method) = class.resolved.get(signature) {
        return Ok(Arc::clone(method.value()));
    }

    let parsed = MethodRef::parse(method_ref)?;
    let params = parsed
        .params()
        .iter()
        .map(|token| universe.resolve(token).ok_or_else(|| ResolveError::UnknownType(token.clone())))
        .collect::<Result<Vec<_>>>()?;

    let key = SignatureKey::new(parsed.name(), params);
    let method = class.method(&key).cloned().ok_or_else(|| ResolveError::NotFound {
        class: class.name(),
        signature: key.to_string(),
    })?;

    // Only canonical spellings are cached, which bounds the cache by the method count.
    if key.to_string() == signature {
        class.resolved.insert(signature.into(), Arc::clone(&method));
    }
    Ok(method)
}

/// The `name(params)` tail of a reference, without the declaring type.
fn signature_text(method_ref: &str) -> &str {
    let head_end = method_ref.find('(').unwrap_or(method_ref.len());
    match method_ref[..head_end].rfind('.') {
        Some(dot) => &method_ref[dot + 1..],
        None => method_ref,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_text_drops_declaring_type() {
        assert_eq!(signature_text("a.b.Calc.add(int,int)"), "add(int,int)");
        assert_eq!(signature_text("add(int,int)"), "add(int,int)");
        assert_eq!(signature_text("f(a.B)"), "f(a.B)");
        assert_eq!(signature_text("no.parens"), "parens");
    }

    #[test]
    fn test_grammar_error_converts_to_malformed() {
        let err = MethodRef::parse("Calc.add").unwrap_err();
        assert_eq!(ResolveError::from(err.clone()), ResolveError::Malformed(err));
    }
}
