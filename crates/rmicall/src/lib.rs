//! # rmicall
//!
//! The decoded shapes that cross the dispatch boundary: which remote object a
//! call targets, which method it names, the argument values, and the outcome
//! that goes back.
//!
//! ## Philosophy
//!
//! - **No bytes**: Everything here is already decoded. Encoding belongs to
//!   whoever owns the transport.
//! - **Exact signatures**: A method is named by text that carries the exact
//!   parameter types. Nothing here widens, boxes or guesses.

pub mod envelope;
pub mod error;
pub mod identity;
pub mod method_ref;
pub mod types;
pub mod value;

pub use envelope::CallEnvelope;
pub use envelope::Failure;
pub use envelope::Outcome;
pub use envelope::ResultEnvelope;
pub use error::Error;
pub use error::Result;
pub use identity::CallId;
pub use identity::RemoteObjectIdentity;
pub use method_ref::MethodRef;
pub use types::ParamType;
pub use types::Primitive;
pub use value::FromValue;
pub use value::ObjectRef;
pub use value::Value;
