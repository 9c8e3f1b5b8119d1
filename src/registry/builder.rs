//! Builder for [`ManagerRegistry`].

use std::any::TypeId;
use std::collections::HashMap;

use tracing::debug;

use crate::host::HostInstance;
use crate::markers::Manager;
use crate::registry::ManagerRegistry;
use crate::scanner::{ClassScanner, ManagedClass};

/// Assembles a [`ManagerRegistry`] from a host pair plus a class graph.
///
/// The graph comes from a scanner, explicit [`manager`](Self::manager)
/// calls, or both. Later registrations of the same type replace earlier
/// ones.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use plugin_bootstrap::{ClassIndex, HostInstance, ManagerRegistry};
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
/// let index = ClassIndex::new();
/// let host = HostInstance::new(Arc::new(MyPlugin { bus: Bus }));
/// let registry = ManagerRegistry::builder(host)
///     .scanner(&index)
///     .require_marker(true)
///     .build();
/// registry.initialize_eager_managers().unwrap();
/// ```
pub struct ManagerRegistryBuilder {
    host: HostInstance,
    graph: HashMap<TypeId, ManagedClass>,
    require_marker: bool,
}

impl ManagerRegistryBuilder {
    pub(crate) fn new(host: HostInstance) -> Self {
        Self {
            host,
            graph: HashMap::new(),
            require_marker: false,
        }
    }

    /// Adds every service-marker entry the scanner yields.
    pub fn scanner(mut self, scanner: &dyn ClassScanner) -> Self {
        for entry in scanner.managers() {
            debug!(manager = entry.type_name, "registering manager class");
            self.graph.insert(entry.type_id(), entry);
        }
        self
    }

    /// Adds one service-marker entry directly, bypassing scanning.
    pub fn manager<T: Manager>(mut self) -> Self {
        let entry = ManagedClass::of::<T>();
        self.graph.insert(entry.type_id(), entry);
        self
    }

    /// Rejects resolution of types outside the class graph.
    ///
    /// By default an unknown type resolves with default options (lazy
    /// singleton). With this policy on, such a resolution fails with
    /// [`MarkerRequired`](crate::RegistryError::MarkerRequired) instead.
    pub fn require_marker(mut self, require: bool) -> Self {
        self.require_marker = require;
        self
    }

    /// Builds the registry, seeding the cache with the host pair.
    pub fn build(self) -> ManagerRegistry {
        ManagerRegistry::from_parts(self.host, self.graph, self.require_marker)
    }
}
