//! The manager registry: scoped construction, wiring, and caching.

mod builder;

pub use builder::ManagerRegistryBuilder;

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{RegResult, RegistryError};
use crate::host::{AnyShared, HostInstance, HostPlugin};
use crate::lifecycle::Managed;
use crate::scanner::{AnyBox, ManagedClass};
use crate::scope::ManagerScope;

/// Scope-aware instance registry for a single plugin.
///
/// The registry owns a class graph of marker-bearing types (fed by a
/// [`ClassScanner`](crate::ClassScanner) or explicit builder calls) and an
/// instance cache. Singleton resolutions construct once and share through
/// `Arc`; prototype resolutions construct fresh every time and are never
/// cached. Every resolution runs the full three-phase lifecycle
/// (construct, wire, activate) before the instance is visible to anyone.
///
/// The cache is seeded at build time with the host pair, so a plugin type
/// that participates in the lifecycle resolves to the live host instance
/// rather than a second construction, and the generic
/// [`HostPlugin`] base is available through [`get_shared`](Self::get_shared).
///
/// Registries are single-plugin, startup-time objects. Resolution state
/// lives in [`RefCell`]s, which keeps the registry `!Sync`: it is built,
/// used, and dropped on the host's startup thread.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use plugin_bootstrap::{
///     ClassIndex, HostInstance, Managed, Manager, ManagerRegistry, RegResult,
/// };
/// # use plugin_bootstrap::{CommandMap, EventBus, HostPlugin, Listener};
/// # struct Bus;
/// # impl EventBus for Bus {
/// #     fn register(&self, _l: Arc<dyn Listener>) {}
/// # }
/// # struct MyPlugin { bus: Bus }
/// # impl HostPlugin for MyPlugin {
/// #     fn name(&self) -> &str { "MyPlugin" }
/// #     fn command_map(&self) -> Option<&dyn CommandMap> { None }
/// #     fn event_bus(&self) -> &dyn EventBus { &self.bus }
/// # }
///
/// struct ScoreManager {
///     high: u32,
/// }
///
/// impl Managed for ScoreManager {
///     fn construct(_host: &HostInstance) -> RegResult<Self> {
///         Ok(ScoreManager { high: 0 })
///     }
///
///     fn activate(&mut self) -> RegResult<()> {
///         self.high = 100;
///         Ok(())
///     }
/// }
///
/// impl Manager for ScoreManager {}
///
/// let mut index = ClassIndex::new();
/// index.manager::<ScoreManager>();
///
/// let host = HostInstance::new(Arc::new(MyPlugin { bus: Bus }));
/// let registry = ManagerRegistry::builder(host).scanner(&index).build();
///
/// let scores = registry.get_or_create::<ScoreManager>().unwrap();
/// assert_eq!(scores.high, 100);
///
/// // Singletons are cached: same instance on every resolution.
/// let again = registry.get_or_create::<ScoreManager>().unwrap();
/// assert!(Arc::ptr_eq(&scores, &again));
/// ```
pub struct ManagerRegistry {
    host: HostInstance,
    graph: HashMap<TypeId, ManagedClass>,
    instances: RefCell<HashMap<TypeId, AnyShared>>,
    shared: RefCell<HashMap<TypeId, AnyShared>>,
    resolving: RefCell<Vec<&'static str>>,
    require_marker: bool,
}

impl ManagerRegistry {
    /// Starts a registry builder for the given host pair.
    pub fn builder(host: HostInstance) -> ManagerRegistryBuilder {
        ManagerRegistryBuilder::new(host)
    }

    pub(crate) fn from_parts(
        host: HostInstance,
        graph: HashMap<TypeId, ManagedClass>,
        require_marker: bool,
    ) -> Self {
        let mut instances = HashMap::new();
        // Seed the cache with the live host so a host type in the graph
        // never gets a second construction.
        instances.insert(host.concrete_type_id(), host.concrete_any());

        let mut shared: HashMap<TypeId, AnyShared> = HashMap::new();
        let base: Arc<Arc<dyn HostPlugin>> = Arc::new(host.shared());
        shared.insert(TypeId::of::<dyn HostPlugin>(), base);

        Self {
            host,
            graph,
            instances: RefCell::new(instances),
            shared: RefCell::new(shared),
            resolving: RefCell::new(Vec::new()),
            require_marker,
        }
    }

    /// The seeded host pair.
    pub fn host(&self) -> &HostInstance {
        &self.host
    }

    /// The host under its concrete plugin type.
    pub fn host_plugin<P: HostPlugin>(&self) -> RegResult<Arc<P>> {
        self.host.concrete::<P>()
    }

    /// Resolves an instance of `T`, constructing it if needed.
    ///
    /// Singletons come from the cache after first construction; prototypes
    /// are built fresh on every call. An unknown type resolves with
    /// default options unless the registry was built with
    /// [`require_marker`](ManagerRegistryBuilder::require_marker), in
    /// which case it fails with [`RegistryError::MarkerRequired`].
    ///
    /// Wiring that loops back to a type currently under construction
    /// fails with [`RegistryError::Circular`] carrying the full
    /// resolution path.
    pub fn get_or_create<T: Managed>(&self) -> RegResult<Arc<T>> {
        let entry = match self.graph.get(&TypeId::of::<T>()) {
            Some(entry) => *entry,
            None if self.require_marker => {
                return Err(RegistryError::MarkerRequired(type_name::<T>()))
            }
            None => ManagedClass::of_unmarked::<T>(),
        };
        let erased = self.resolve_erased(&entry)?;
        erased
            .downcast::<T>()
            .map_err(|_| RegistryError::TypeMismatch(type_name::<T>()))
    }

    /// Constructs every singleton whose marker requests eager loading.
    ///
    /// Lazy singletons and prototypes are untouched. Eager managers
    /// initialize in no particular order; code that needs ordering must
    /// express it as a wiring dependency.
    pub fn initialize_eager_managers(&self) -> RegResult<()> {
        for entry in self.graph.values() {
            if entry.options.eagerly_load && entry.options.scope == ManagerScope::Singleton {
                debug!(manager = entry.type_name, "eagerly initializing manager");
                self.resolve_erased(entry)?;
            }
        }
        Ok(())
    }

    /// Runs the wire and activate phases on an externally constructed
    /// instance.
    ///
    /// The registrars use this for command and completer instances that
    /// live in the host's dispatch table rather than the cache.
    pub fn inject<T: Managed>(&self, instance: &mut T) -> RegResult<()> {
        instance.wire(self)?;
        instance.activate()
    }

    /// Wires, activates, and caches an externally constructed singleton.
    ///
    /// Later [`get_or_create`](Self::get_or_create) calls for `T` return
    /// this instance. The marker policy applies the same as on
    /// resolution: with
    /// [`require_marker`](ManagerRegistryBuilder::require_marker) set, a
    /// type outside the class graph is rejected with
    /// [`RegistryError::MarkerRequired`].
    pub fn register_instance<T: Managed>(&self, mut instance: T) -> RegResult<Arc<T>> {
        if self.require_marker && !self.graph.contains_key(&TypeId::of::<T>()) {
            return Err(RegistryError::MarkerRequired(type_name::<T>()));
        }
        self.inject(&mut instance)?;
        let shared = Arc::new(instance);
        self.instances
            .borrow_mut()
            .insert(TypeId::of::<T>(), shared.clone() as AnyShared);
        Ok(shared)
    }

    /// Stores a shared value under its own type, including trait-object
    /// types.
    ///
    /// This is the supertype channel: a manager registered under
    /// `dyn SomeService` is resolvable by consumers that only know the
    /// trait. The [`HostPlugin`] base entry is seeded through this
    /// channel at build time.
    pub fn register_shared<S>(&self, value: Arc<S>)
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.shared
            .borrow_mut()
            .insert(TypeId::of::<S>(), Arc::new(value) as AnyShared);
    }

    /// Fetches a value stored through [`register_shared`](Self::register_shared).
    pub fn get_shared<S>(&self) -> Option<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let shared = self.shared.borrow();
        let entry = shared.get(&TypeId::of::<S>())?;
        let inner: &Arc<S> = entry.downcast_ref::<Arc<S>>()?;
        Some(inner.clone())
    }

    /// Whether a singleton of this type is already cached.
    pub fn contains<T: Managed>(&self) -> bool {
        self.instances.borrow().contains_key(&TypeId::of::<T>())
    }

    pub(crate) fn resolve_erased(&self, entry: &ManagedClass) -> RegResult<AnyShared> {
        if entry.options.scope == ManagerScope::Prototype {
            let boxed = self.run_lifecycle(entry)?;
            return Ok(AnyShared::from(boxed));
        }

        if let Some(cached) = self.instances.borrow().get(&entry.type_id()) {
            return Ok(cached.clone());
        }

        let boxed = self.run_lifecycle(entry)?;
        let shared: AnyShared = Arc::from(boxed);
        self.instances
            .borrow_mut()
            .insert(entry.type_id(), shared.clone());
        Ok(shared)
    }

    // Full lifecycle under the cycle guard. The instance is only visible
    // to callers after all three phases succeed.
    fn run_lifecycle(&self, entry: &ManagedClass) -> RegResult<AnyBox> {
        {
            let mut resolving = self.resolving.borrow_mut();
            if resolving.contains(&entry.type_name) {
                let mut path = resolving.clone();
                path.push(entry.type_name);
                return Err(RegistryError::Circular(path));
            }
            resolving.push(entry.type_name);
        }

        let result = self.construct_wire_activate(entry);
        self.resolving.borrow_mut().pop();
        result
    }

    fn construct_wire_activate(&self, entry: &ManagedClass) -> RegResult<AnyBox> {
        trace!(manager = entry.type_name, "constructing");
        let mut boxed = (entry.construct)(&self.host)?;
        (entry.wire)(&mut *boxed, self)?;
        (entry.activate)(&mut *boxed)?;
        Ok(boxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CommandMap, EventBus, Listener};
    use crate::markers::{Manager, ManagerOptions};
    use crate::scanner::ClassIndex;

    struct Bus;

    impl EventBus for Bus {
        fn register(&self, _listener: Arc<dyn Listener>) {}
    }

    struct TestPlugin {
        bus: Bus,
    }

    impl HostPlugin for TestPlugin {
        fn name(&self) -> &str {
            "TestPlugin"
        }

        fn command_map(&self) -> Option<&dyn CommandMap> {
            None
        }

        fn event_bus(&self) -> &dyn EventBus {
            &self.bus
        }
    }

    fn host() -> HostInstance {
        HostInstance::new(Arc::new(TestPlugin { bus: Bus }))
    }

    #[derive(Debug)]
    struct Plain;

    impl Managed for Plain {
        fn construct(_host: &HostInstance) -> RegResult<Self> {
            Ok(Plain)
        }
    }

    struct Fresh;

    impl Managed for Fresh {
        fn construct(_host: &HostInstance) -> RegResult<Self> {
            Ok(Fresh)
        }
    }

    impl Manager for Fresh {
        const OPTIONS: ManagerOptions = ManagerOptions::DEFAULT.prototype();
    }

    #[test]
    fn unmarked_type_resolves_with_default_options() {
        let registry = ManagerRegistry::builder(host()).build();

        let first = registry.get_or_create::<Plain>().unwrap();
        let second = registry.get_or_create::<Plain>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn unmarked_type_rejected_when_marker_required() {
        let registry = ManagerRegistry::builder(host()).require_marker(true).build();

        let err = registry.get_or_create::<Plain>().unwrap_err();
        assert!(matches!(err, RegistryError::MarkerRequired(_)));
    }

    #[test]
    fn prebuilt_instance_rejected_when_marker_required() {
        let registry = ManagerRegistry::builder(host()).require_marker(true).build();

        let err = registry.register_instance(Plain).unwrap_err();
        assert!(matches!(err, RegistryError::MarkerRequired(_)));
        assert!(!registry.contains::<Plain>());
    }

    #[test]
    fn prebuilt_instance_accepted_when_in_the_graph() {
        struct Marked;

        impl Managed for Marked {
            fn construct(_host: &HostInstance) -> RegResult<Self> {
                Ok(Marked)
            }
        }

        impl Manager for Marked {}

        let mut index = ClassIndex::new();
        index.manager::<Marked>();
        let registry = ManagerRegistry::builder(host())
            .scanner(&index)
            .require_marker(true)
            .build();

        let stored = registry.register_instance(Marked).unwrap();
        let resolved = registry.get_or_create::<Marked>().unwrap();
        assert!(Arc::ptr_eq(&stored, &resolved));
    }

    #[test]
    fn prototype_scope_is_never_cached() {
        let mut index = ClassIndex::new();
        index.manager::<Fresh>();
        let registry = ManagerRegistry::builder(host()).scanner(&index).build();

        let first = registry.get_or_create::<Fresh>().unwrap();
        let second = registry.get_or_create::<Fresh>().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(!registry.contains::<Fresh>());
    }

    #[test]
    fn shared_channel_serves_the_host_base() {
        let registry = ManagerRegistry::builder(host()).build();

        let base = registry.get_shared::<dyn HostPlugin>().unwrap();
        assert_eq!(base.name(), "TestPlugin");
    }
}
