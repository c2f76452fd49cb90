//! # Dispatcher
//!
//! Delivers a decoded call to the registered implementation and packages what
//! happened.
//!
//! A call passes through four steps: look up the target, resolve the method,
//! check the arguments, invoke. The first three can fail with an `Error`, which
//! aborts the request. Whatever the invoked method does, including panicking,
//! is captured into the returned `ResultEnvelope`.

use std::any::Any;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use rmicall::CallEnvelope;
use rmicall::Failure;
use rmicall::Outcome;
use rmicall::ResultEnvelope;
use rmicall::Value;
use tracing::debug;

use crate::class::Method;
use crate::error::Error;
use crate::error::Result;
use crate::registry::Registry;
use crate::resolver;

/// Dispatcher behaviour switches.
#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    /// Deliver panics in method bodies as failures instead of unwinding.
    pub catch_panics: bool,
    /// Replace returned exported objects with their identities.
    pub return_by_reference: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            catch_panics: true,
            return_by_reference: true,
        }
    }
}

/// Routes calls into a shared registry.
///
/// Holds no per-call state, so one dispatcher can serve any number of threads.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_config(registry, DispatcherConfig::default())
    }

    pub fn with_config(registry: Arc<Registry>, config: DispatcherConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Performs one call synchronously and returns its outcome.
    ///
    /// # Errors
    ///
    /// - `NoImplementation` if nothing live is registered under `call.target`.
    /// - `NoSuchMethod` if `call.method_ref` names no method of the implementation.
    /// - `ArgumentMismatch` if `call.args` do not fit the resolved signature.
    pub fn delegate_call(&self, call: &CallEnvelope) -> Result<ResultEnvelope> {
        let target = self.registry.lookup(&call.target)?;

        let method = resolver::resolve(&target.class, self.registry.universe(), &call.method_ref)
            .map_err(|e| {
                debug!(call = %call.call_id, target = %call.target, reason = %e, "method did not resolve");
                Error::NoSuchMethod(call.method_ref.clone())
            })?;

        self.check_args(&method, &call.args)?;

        debug!(call = %call.call_id, target = %call.target, method = %method.key(), "invoking");
        let outcome = match self.invoke(&method, &*target.object, &call.args) {
            Ok(value) => Outcome::Returned(self.by_reference(value)),
            Err(failure) => {
                debug!(call = %call.call_id, failure = %failure, "method raised");
                Outcome::Raised(failure)
            }
        };

        Ok(ResultEnvelope {
            call_id: call.call_id,
            outcome,
        })
    }

    fn check_args(&self, method: &Method, args: &[Value]) -> Result<()> {
        let mismatch = |detail| Error::ArgumentMismatch {
            method: method.key().to_string(),
            detail,
        };

        let params = method.params();
        if params.len() != args.len() {
            return Err(mismatch(format!("expected {} arguments, got {}", params.len(), args.len())));
        }
        for (index, (param, arg)) in params.iter().zip(args).enumerate() {
            if !self.registry.accepts(param, arg) {
                return Err(mismatch(format!("argument {} is {}, expected {}", index, arg.describe(), param)));
            }
        }
        Ok(())
    }

    fn invoke(
        &self,
        method: &Method,
        receiver: &(dyn Any + Send + Sync),
        args: &[Value],
    ) -> std::result::Result<Value, Failure> {
        if !self.config.catch_panics {
            return method.invoke(receiver, args);
        }
        panic::catch_unwind(AssertUnwindSafe(|| method.invoke(receiver, args)))
            .unwrap_or_else(|payload| Err(Failure::from_panic(payload)))
    }

    /// An exported object leaves as its identity, never as itself.
    fn by_reference(&self, value: Value) -> Value {
        if !self.config.return_by_reference {
            return value;
        }
        let identity = match &value {
            Value::Object(obj) => self.registry.remote_reference(obj),
            _ => None,
        };
        identity.map_or(value, Value::Remote)
    }
}
