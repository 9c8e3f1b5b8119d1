//! The three-phase instance lifecycle: construct, wire, activate.

use std::any::Any;

use crate::error::RegResult;
use crate::host::HostInstance;
use crate::registry::ManagerRegistry;

/// Lifecycle of any class the framework constructs on the plugin's behalf.
///
/// The phases run strictly in order and each is independently testable:
///
/// 1. **construct**: pure allocation. Receives the seeded host pair, the
///    only constructor argument the registry supplies; a type that needs
///    nothing ignores it. A type the registry cannot build this way (extra
///    constructor arguments) returns a
///    [`ConstructionFailed`](crate::RegistryError::ConstructionFailed) and
///    must go through a manual registration path instead.
/// 2. **wire**: fills each injected dependency slot by resolving through
///    the registry. Runs strictly after construction. The default wires
///    nothing.
/// 3. **activate**: the zero-argument post-construct hook, run exactly
///    once, after every slot on the instance has been wired. The default
///    does nothing.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use plugin_bootstrap::{HostInstance, Managed, ManagerRegistry, RegResult};
///
/// # struct Bus;
/// # impl plugin_bootstrap::EventBus for Bus {
/// #     fn register(&self, _l: Arc<dyn plugin_bootstrap::Listener>) {}
/// # }
/// # struct Host { bus: Bus }
/// # impl plugin_bootstrap::HostPlugin for Host {
/// #     fn name(&self) -> &str { "Host" }
/// #     fn command_map(&self) -> Option<&dyn plugin_bootstrap::CommandMap> { None }
/// #     fn event_bus(&self) -> &dyn plugin_bootstrap::EventBus { &self.bus }
/// # }
/// struct GreetingManager {
///     greeting: String,
/// }
///
/// impl Managed for GreetingManager {
///     fn construct(_host: &HostInstance) -> RegResult<Self> {
///         Ok(GreetingManager { greeting: String::new() })
///     }
///
///     fn activate(&mut self) -> RegResult<()> {
///         self.greeting = "hello".to_string();
///         Ok(())
///     }
/// }
///
/// let host = HostInstance::new(Arc::new(Host { bus: Bus }));
/// let registry = ManagerRegistry::builder(host).build();
/// let greeter = registry.get_or_create::<GreetingManager>().unwrap();
/// assert_eq!(greeter.greeting, "hello");
/// ```
pub trait Managed: Any + Send + Sync {
    /// Construct phase: pure allocation from the host pair.
    fn construct(host: &HostInstance) -> RegResult<Self>
    where
        Self: Sized;

    /// Wire phase: fill injected dependency slots through the registry.
    fn wire(&mut self, registry: &ManagerRegistry) -> RegResult<()> {
        let _ = registry;
        Ok(())
    }

    /// Activate phase: the post-construct hook.
    fn activate(&mut self) -> RegResult<()> {
        Ok(())
    }
}
