//! # Object Registry
//!
//! Maps remote object identities to live implementations.
//!
//! Uses DashMap for every table so dispatching threads read concurrently while
//! registrations, which are rare, take only the shard they touch. Lookups hand
//! out cloned handles and release the shard before any user code runs.
//!
//! The registry does not own implementations. It keeps `Weak` handles; once
//! the registering party drops its last `Arc`, the identity stops resolving.

use std::any::Any;
use std::any::TypeId;
use std::sync::Arc;
use std::sync::Weak;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rmicall::ObjectRef;
use rmicall::ParamType;
use rmicall::RemoteObjectIdentity;
use rmicall::Value;
use tracing::debug;
use tracing::warn;

use crate::class::Class;
use crate::class::Remote;
use crate::error::Error;
use crate::error::Result;
use crate::universe::Interface;
use crate::universe::TypeUniverse;

/// A registered implementation.
struct Export {
    object: Weak<dyn Any + Send + Sync>,
    address: usize,
    class: Arc<Class>,
}

/// A live dispatch target, detached from the registry's locks.
pub(crate) struct Target {
    pub(crate) object: Arc<dyn Any + Send + Sync>,
    pub(crate) class: Arc<Class>,
}

/// The set of exported objects, keyed by identity.
pub struct Registry {
    universe: TypeUniverse,
    interfaces: DashMap<Arc<str>, Interface>,
    classes: DashMap<TypeId, Arc<Class>>,
    exports: DashMap<RemoteObjectIdentity, Export>,
    /// Allocation address to every identity registered for it, oldest first.
    reverse: DashMap<usize, Vec<RemoteObjectIdentity>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            universe: TypeUniverse::new(),
            interfaces: DashMap::new(),
            classes: DashMap::new(),
            exports: DashMap::new(),
            reverse: DashMap::new(),
        }
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn universe(&self) -> &TypeUniverse {
        &self.universe
    }

    /// Declares an interface, making its name and signatures known.
    ///
    /// Implementations registered afterwards under this name must provide every
    /// declared signature.
    pub fn declare(&self, interface: Interface) {
        self.universe.insert(interface.name());
        for sig in interface.methods() {
            for param in sig.params() {
                if let ParamType::Named(name) = param {
                    self.universe.insert(name);
                }
            }
        }
        self.interfaces.insert(Arc::from(interface.name()), interface);
    }

    /// Registers `implementation` as the global object for `interface`.
    pub fn register_global<T: Remote>(&self, interface: &str, implementation: &Arc<T>) -> Result<()> {
        self.export(interface, implementation, None).map(|_| ())
    }

    /// Registers `implementation` under a fresh instance id and returns the id.
    ///
    /// Exporting the same object twice yields two ids.
    pub fn export_object<T: Remote>(&self, interface: &str, implementation: &Arc<T>) -> Result<String> {
        loop {
            let instance_id = new_instance_id();
            match self.export(interface, implementation, Some(instance_id.clone())) {
                Ok(_) => return Ok(instance_id),
                Err(Error::RegistrationConflict(id)) => {
                    warn!(identity = %id, "instance id collision, regenerating");
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn export<T: Remote>(
        &self,
        interface: &str,
        implementation: &Arc<T>,
        instance_id: Option<String>,
    ) -> Result<RemoteObjectIdentity> {
        let class = self.class_of::<T>()?;
        self.check_assignable(interface, &class)?;
        self.universe.insert(interface);

        let identity = match instance_id {
            Some(id) => RemoteObjectIdentity::instance(interface, id),
            None => RemoteObjectIdentity::global(interface),
        };
        let object = ObjectRef::new(T::CLASS, Arc::clone(implementation));
        let address = object.address();
        let export = Export {
            object: object.downgrade(),
            address,
            class,
        };

        match self.exports.entry(identity.clone()) {
            Entry::Occupied(mut slot) => {
                if slot.get().object.strong_count() > 0 {
                    return Err(Error::RegistrationConflict(identity));
                }
                // The previous implementation is gone; its slot is free.
                let stale = slot.insert(export);
                drop(slot);
                self.forget(stale.address, &identity);
                debug!(identity = %identity, "replaced dropped implementation");
            }
            Entry::Vacant(slot) => {
                slot.insert(export);
            }
        }
        self.reverse.entry(address).or_default().push(identity.clone());

        debug!(identity = %identity, class = T::CLASS, "exported");
        Ok(identity)
    }

    /// Removes a registration. Returns whether one existed.
    pub fn unexport(&self, identity: &RemoteObjectIdentity) -> bool {
        let Some((_, export)) = self.exports.remove(identity) else {
            return false;
        };
        self.forget(export.address, identity);
        debug!(identity = %identity, "unexported");
        true
    }

    /// Removes `identity` from the reverse index entry for `address`.
    fn forget(&self, address: usize, identity: &RemoteObjectIdentity) {
        if let Entry::Occupied(mut slot) = self.reverse.entry(address) {
            slot.get_mut().retain(|id| id != identity);
            if slot.get().is_empty() {
                slot.remove();
            }
        }
    }

    /// Drops every registration whose implementation is gone. Returns how many.
    pub fn prune(&self) -> usize {
        let dead: Vec<RemoteObjectIdentity> = self
            .exports
            .iter()
            .filter(|e| e.value().object.strong_count() == 0)
            .map(|e| e.key().clone())
            .collect();
        dead.iter().filter(|id| self.unexport(id)).count()
    }

    /// Finds the identity an object is registered under, comparing by reference.
    ///
    /// An object registered several times reports its earliest live registration.
    /// An identity only counts if it is still registered to this very object.
    pub fn remote_reference(&self, object: &ObjectRef) -> Option<RemoteObjectIdentity> {
        let address = object.address();
        let candidates = self.reverse.get(&address)?.value().clone();
        candidates
            .into_iter()
            .find(|id| self.exports.get(id).is_some_and(|export| export.address == address))
    }

    pub fn contains(&self, identity: &RemoteObjectIdentity) -> bool {
        self.exports.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }

    /// Looks up a live target for a call.
    pub(crate) fn lookup(&self, identity: &RemoteObjectIdentity) -> Result<Target> {
        let (object, class) = {
            let export = self
                .exports
                .get(identity)
                .ok_or_else(|| Error::NoImplementation(identity.clone()))?;
            (export.object.upgrade(), Arc::clone(&export.class))
        };

        let Some(object) = object else {
            warn!(identity = %identity, "implementation dropped while still registered");
            return Err(Error::NoImplementation(identity.clone()));
        };
        Ok(Target { object, class })
    }

    /// Whether `value` may be passed where `param` is expected.
    ///
    /// Primitives must match exactly. A named type accepts `Null`, the built-in
    /// value of that name, or an object whose class is or implements the name.
    pub fn accepts(&self, param: &ParamType, value: &Value) -> bool {
        match (param, value) {
            (ParamType::Primitive(_), v) => v.param_type().as_ref() == Some(param),
            (ParamType::Named(_), Value::Null) => true,
            (ParamType::Named(name), Value::Object(obj)) => {
                obj.implements(name)
                    || self
                        .classes
                        .get(&obj.concrete_type_id())
                        .is_some_and(|class| class.implements(name))
            }
            (ParamType::Named(name), v) => v.param_type().is_some_and(|t| t.token() == &**name),
        }
    }

    /// The dispatch table for `T`, built on first use.
    fn class_of<T: Remote>(&self) -> Result<Arc<Class>> {
        let type_id = TypeId::of::<T>();
        if let Some(class) = self.classes.get(&type_id) {
            return Ok(Arc::clone(class.value()));
        }

        let class = Arc::new(Class::of::<T>()?);
        for name in class.type_names() {
            self.universe.insert(name);
        }
        debug!(class = T::CLASS, methods = class.methods().count(), "described class");
        Ok(Arc::clone(self.classes.entry(type_id).or_insert(class).value()))
    }

    fn check_assignable(&self, interface: &str, class: &Class) -> Result<()> {
        let mismatch = |missing| Error::TypeMismatch {
            interface: interface.to_string(),
            class: class.name().to_string(),
            missing,
        };

        if !class.implements(interface) {
            return Err(mismatch(None));
        }
        if let Some(declared) = self.interfaces.get(interface) {
            if let Some(sig) = declared.methods().iter().find(|sig| class.method(sig).is_none()) {
                return Err(mismatch(Some(sig.to_string())));
            }
        }
        Ok(())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent setup for a registry.
pub struct RegistryBuilder {
    interfaces: Vec<Interface>,
    types: Vec<String>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            interfaces: Vec::new(),
            types: Vec::new(),
        }
    }

    pub fn declare(mut self, interface: Interface) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Makes a type name resolvable in method references.
    pub fn known_type(mut self, name: impl Into<String>) -> Self {
        self.types.push(name.into());
        self
    }

    pub fn build(self) -> Registry {
        let registry = Registry::new();
        for name in &self.types {
            registry.universe.insert(name);
        }
        for interface in self.interfaces {
            registry.declare(interface);
        }
        registry
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 128 random bits, formatted as a version 4 UUID.
fn new_instance_id() -> String {
    let mut bits: u128 = rand::random();
    bits = (bits & !(0xF_u128 << 76)) | (0x4_u128 << 76);
    bits = (bits & !(0x3_u128 << 62)) | (0x2_u128 << 62);
    format!(
        "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
        bits >> 96,
        (bits >> 80) & 0xFFFF,
        (bits >> 64) & 0xFFFF,
        (bits >> 48) & 0xFFFF,
        bits & 0xFFFF_FFFF_FFFF,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_id_is_v4_uuid() {
        let id = new_instance_id();
        let groups: Vec<&str> = id.split('-').collect();
        assert_eq!(groups.iter().map(|g| g.len()).collect::<Vec<_>>(), [8, 4, 4, 4, 12]);
        assert!(groups[2].starts_with('4'));
        assert!(matches!(groups[3].chars().next(), Some('8' | '9' | 'a' | 'b')));
    }

    #[test]
    fn test_instance_ids_differ() {
        assert_ne!(new_instance_id(), new_instance_id());
    }

    struct Cell;

    impl Remote for Cell {
        const CLASS: &'static str = "demo.Cell";

        fn describe(_: &mut crate::class::ClassBuilder<Self>) {}
    }

    #[test]
    fn test_reverse_lookup_ignores_identity_owned_by_another_object() {
        let registry = Registry::new();
        let owner = Arc::new(Cell);
        let other = Arc::new(Cell);
        registry.register_global(Cell::CLASS, &owner).unwrap();

        let identity = RemoteObjectIdentity::global(Cell::CLASS);
        let other_ref = ObjectRef::new(Cell::CLASS, Arc::clone(&other));
        registry.reverse.entry(other_ref.address()).or_default().push(identity.clone());

        assert_eq!(registry.remote_reference(&other_ref), None);
        let owner_ref = ObjectRef::new(Cell::CLASS, Arc::clone(&owner));
        assert_eq!(registry.remote_reference(&owner_ref), Some(identity));
    }

    #[test]
    fn test_replacing_dropped_global_clears_old_reverse_entry() {
        let registry = Registry::new();
        let first = Arc::new(Cell);
        registry.register_global(Cell::CLASS, &first).unwrap();
        let stale_address = ObjectRef::new(Cell::CLASS, Arc::clone(&first)).address();
        drop(first);

        registry.register_global(Cell::CLASS, &Arc::new(Cell)).unwrap();
        assert!(!registry.reverse.contains_key(&stale_address));
    }
}
