//! # rmirun
//!
//! The live side of remote invocation: which local objects are exported under
//! which identities, and how a decoded call reaches one of their methods.
//!
//! ## Philosophy
//!
//! - **Tables, not reflection**: Each implementing type describes its methods
//!   once. Dispatch is a keyed lookup on an exact signature.
//! - **Two kinds of failure**: A call that cannot be dispatched is an `Error`.
//!   A call whose method raised is a successful dispatch that carries a
//!   `Failure` back to the caller.
//! - **No lock across user code**: The registry is consulted before and after
//!   an invocation, never during it.

pub mod class;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod universe;

pub use class::Args;
pub use class::Class;
pub use class::ClassBuilder;
pub use class::Method;
pub use class::Remote;
pub use class::SignatureKey;
pub use dispatch::Dispatcher;
pub use dispatch::DispatcherConfig;
pub use error::Error;
pub use error::Result;
pub use registry::Registry;
pub use registry::RegistryBuilder;
pub use universe::Interface;
pub use universe::TypeUniverse;
