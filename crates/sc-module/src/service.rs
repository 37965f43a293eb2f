//! Per-run service registry.
//!
//! Services are resolved by namespace.  The first request for a namespace
//! constructs its single implementation and caches it; later requests get
//! the same instance.  Modules hold typed `Rc<RefCell<T>>` handles, the
//! registry keeps a type-erased handle to the same allocation for
//! [`reset_signed_in_services`](ServiceRegistry::reset_signed_in_services).

use std::any::{Any, type_name};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

use sc_core::RunParameters;

use crate::{ConfigError, Context, Service, SimResult};

type ServiceCtor = Rc<dyn Fn(&RunParameters) -> SimResult<SignedIn>>;

struct SignedIn {
    service: Rc<RefCell<dyn Service>>,
    any:     Rc<dyn Any>,
}

/// Catalog of service constructors plus the instances signed in so far.
#[derive(Default)]
pub struct ServiceRegistry {
    catalog:   BTreeMap<String, Vec<(String, ServiceCtor)>>,
    signed_in: BTreeMap<String, SignedIn>,
}

impl Clone for ServiceRegistry {
    /// Clones the catalog only; the copy starts with no signed-in services.
    fn clone(&self) -> Self {
        Self { catalog: self.catalog.clone(), signed_in: BTreeMap::new() }
    }
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an implementation `id` to `namespace`.
    pub fn register<T, F>(&mut self, namespace: &str, id: &str, ctor: F) -> &mut Self
    where
        T: Service,
        F: Fn(&RunParameters) -> SimResult<T> + 'static,
    {
        let ctor: ServiceCtor = Rc::new(move |params: &RunParameters| {
            let svc = Rc::new(RefCell::new(ctor(params)?));
            Ok(SignedIn { service: svc.clone(), any: svc })
        });
        self.catalog
            .entry(namespace.to_owned())
            .or_default()
            .push((id.to_owned(), ctor));
        self
    }

    /// Implementation ids registered under `namespace`.
    pub fn implementations(&self, namespace: &str) -> Vec<&str> {
        self.catalog
            .get(namespace)
            .map(|v| v.iter().map(|(id, _)| id.as_str()).collect())
            .unwrap_or_default()
    }

    /// Namespaces with an instance already constructed.
    pub fn signed_in(&self) -> impl Iterator<Item = &str> + '_ {
        self.signed_in.keys().map(String::as_str)
    }

    /// Get the service for `namespace`, constructing it on first use.
    ///
    /// # Errors
    /// * [`ConfigError::ServiceResolution`] if the namespace does not hold
    ///   exactly one implementation.
    /// * [`ConfigError::ServiceType`] if the cached instance is not a `T`.
    pub fn load<T: Service>(
        &mut self,
        namespace: &str,
        params:    &RunParameters,
    ) -> SimResult<Rc<RefCell<T>>> {
        if !self.signed_in.contains_key(namespace) {
            let ctor = match self.catalog.get(namespace).map(Vec::as_slice) {
                Some([(id, ctor)]) => {
                    debug!(namespace, implementation = %id, "signing in service");
                    ctor.clone()
                }
                other => {
                    return Err(ConfigError::ServiceResolution {
                        namespace: namespace.to_owned(),
                        found:     other.map_or(0, <[_]>::len),
                    }
                    .into());
                }
            };
            let entry = (*ctor)(params)?;
            self.signed_in.insert(namespace.to_owned(), entry);
        }

        let entry = &self.signed_in[namespace];
        entry.any.clone().downcast::<RefCell<T>>().map_err(|_| {
            ConfigError::ServiceType {
                namespace: namespace.to_owned(),
                expected:  type_name::<T>(),
            }
            .into()
        })
    }

    /// Reset every signed-in service with the new episode's context.
    pub fn reset_signed_in_services(&self, ctx: &Context) -> SimResult<()> {
        for (namespace, entry) in &self.signed_in {
            debug!(namespace = %namespace, "resetting service");
            entry.service.borrow_mut().reset(ctx)?;
        }
        Ok(())
    }
}
