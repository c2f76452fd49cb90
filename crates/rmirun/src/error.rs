//! # Error Definitions
//!
//! Failures of registration and of dispatch. Failures raised by the invoked
//! method itself are not errors; they travel inside the `ResultEnvelope`.

use rmicall::RemoteObjectIdentity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The implementation does not satisfy the interface it is registered under.
    TypeMismatch {
        interface: String,
        class: String,
        /// A signature the interface declares but the class lacks, if that is the cause.
        missing: Option<String>,
    },
    /// The identity is already registered.
    RegistrationConflict(RemoteObjectIdentity),
    /// A class described two methods with the same signature.
    DuplicateMethod { class: String, signature: String },
    /// Nothing live is registered under the call target.
    NoImplementation(RemoteObjectIdentity),
    /// The method reference did not resolve to a method of the implementation.
    NoSuchMethod(String),
    /// The arguments do not fit the resolved parameter types.
    ArgumentMismatch { method: String, detail: String },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeMismatch { interface, class, missing: None } => {
                write!(f, "Type mismatch: {} does not implement {}", class, interface)
            }
            Self::TypeMismatch { interface, class, missing: Some(sig) } => {
                write!(f, "Type mismatch: {} does not implement {} (missing {})", class, interface, sig)
            }
            Self::RegistrationConflict(id) => write!(f, "Registration conflict: {} is already registered", id),
            Self::DuplicateMethod { class, signature } => {
                write!(f, "Duplicate method: {} describes {} twice", class, signature)
            }
            Self::NoImplementation(id) => write!(f, "No implementation registered for {}", id),
            Self::NoSuchMethod(method_ref) => write!(f, "No such method: {}", method_ref),
            Self::ArgumentMismatch { method, detail } => {
                write!(f, "Argument mismatch calling {}: {}", method, detail)
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
