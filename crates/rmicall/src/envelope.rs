//! # Envelopes
//!
//! The decoded request and response around a single invocation.

use std::any::Any;

use crate::identity::CallId;
use crate::identity::RemoteObjectIdentity;
use crate::value::Value;

/// A decoded remote call.
#[derive(Clone, Debug, PartialEq)]
pub struct CallEnvelope {
    pub target: RemoteObjectIdentity,
    /// `<declaringType>.<method>(<param>,...)`; see `MethodRef`.
    pub method_ref: String,
    pub args: Vec<Value>,
    pub call_id: CallId,
}

impl CallEnvelope {
    pub fn new(
        target: RemoteObjectIdentity,
        method_ref: impl Into<String>,
        args: Vec<Value>,
        call_id: CallId,
    ) -> Self {
        Self {
            target,
            method_ref: method_ref.into(),
            args,
            call_id,
        }
    }
}

/// An error raised by application code during an invocation.
///
/// This is a legitimate result of a call, to be re-raised on the caller's side,
/// not a failure to dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    /// Fully qualified name of the error type, or `panic`.
    pub kind: String,
    pub message: String,
}

impl Failure {
    pub const PANIC: &'static str = "panic";

    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Captures any error type by its type name and display text.
    pub fn from_error<E: std::error::Error>(error: &E) -> Self {
        Self::new(std::any::type_name::<E>(), error.to_string())
    }

    /// Captures the payload of a caught panic.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::new(Self::PANIC, message)
    }

    pub fn is_panic(&self) -> bool {
        self.kind == Self::PANIC
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Failure {}

/// What an invocation produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Returned(Value),
    Raised(Failure),
}

/// A decoded reply, correlated to its call by `call_id`.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultEnvelope {
    pub call_id: CallId,
    pub outcome: Outcome,
}

impl ResultEnvelope {
    pub fn returned(call_id: CallId, value: Value) -> Self {
        Self {
            call_id,
            outcome: Outcome::Returned(value),
        }
    }

    pub fn raised(call_id: CallId, failure: Failure) -> Self {
        Self {
            call_id,
            outcome: Outcome::Raised(failure),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Raised(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Returned(v) => Some(v),
            Outcome::Raised(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match &self.outcome {
            Outcome::Returned(_) => None,
            Outcome::Raised(f) => Some(f),
        }
    }

    /// Unwraps the outcome the way a client stub re-raises it.
    pub fn into_result(self) -> std::result::Result<Value, Failure> {
        match self.outcome {
            Outcome::Returned(v) => Ok(v),
            Outcome::Raised(f) => Err(f),
        }
    }
}
