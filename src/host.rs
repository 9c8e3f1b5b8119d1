//! Host collaborator boundary.
//!
//! Everything the bootstrap core needs from the surrounding game server is
//! expressed here as traits: the plugin entry point, the command dispatch
//! table, the event bus, and the command/completion/listener capabilities
//! that plugin classes implement. The core consumes these boundaries; it
//! never implements them.

use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

use crate::error::{RegResult, RegistryError};

/// Type-erased shared instance, as stored in the registry cache.
pub(crate) type AnyShared = Arc<dyn Any + Send + Sync>;

/// The host plugin entry point.
///
/// The host owns the command dispatch table and the event bus for the
/// lifetime of the plugin; the auto-registrars hand constructed instances
/// over to it and keep no reference of their own.
pub trait HostPlugin: Send + Sync + 'static {
    /// The plugin's display name. Also the default command namespace,
    /// lowercased.
    fn name(&self) -> &str;

    /// The host's command dispatch table, when it can be located.
    ///
    /// Returning `None` aborts the command scan for this host: the
    /// registrar reports one error and registers nothing. Listener
    /// registration is unaffected.
    fn command_map(&self) -> Option<&dyn CommandMap>;

    /// The host's event bus.
    fn event_bus(&self) -> &dyn EventBus;
}

/// The seeded host pair: the concrete plugin instance under its erased
/// type, plus the same instance behind the `HostPlugin` base trait.
///
/// A [`ManagerRegistry`](crate::ManagerRegistry) seeds its cache with both
/// entries at construction, so host-injection targets can ask for either
/// the concrete plugin type or the generic base.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use plugin_bootstrap::{HostInstance, HostPlugin, CommandMap, EventBus};
///
/// struct MyPlugin { bus: NoopBus }
/// struct NoopBus;
/// impl EventBus for NoopBus {
///     fn register(&self, _listener: Arc<dyn plugin_bootstrap::Listener>) {}
/// }
/// impl HostPlugin for MyPlugin {
///     fn name(&self) -> &str { "MyPlugin" }
///     fn command_map(&self) -> Option<&dyn CommandMap> { None }
///     fn event_bus(&self) -> &dyn EventBus { &self.bus }
/// }
///
/// let host = HostInstance::new(Arc::new(MyPlugin { bus: NoopBus }));
/// let concrete: Arc<MyPlugin> = host.concrete().unwrap();
/// assert_eq!(concrete.name(), "MyPlugin");
/// ```
#[derive(Clone)]
pub struct HostInstance {
    concrete: AnyShared,
    concrete_name: &'static str,
    shared: Arc<dyn HostPlugin>,
}

impl HostInstance {
    /// Wraps the concrete host plugin instance.
    pub fn new<P: HostPlugin>(host: Arc<P>) -> Self {
        let concrete: AnyShared = host.clone();
        Self {
            concrete,
            concrete_name: type_name::<P>(),
            shared: host,
        }
    }

    /// The host under its concrete type.
    ///
    /// Fails with [`RegistryError::HostTypeMismatch`] when the requested
    /// type is not the one the registry was seeded with, which means an
    /// injection target declared against the wrong plugin type.
    pub fn concrete<P: HostPlugin>(&self) -> RegResult<Arc<P>> {
        self.concrete
            .clone()
            .downcast::<P>()
            .map_err(|_| RegistryError::HostTypeMismatch {
                expected: type_name::<P>(),
                actual: self.concrete_name,
            })
    }

    /// The host behind the generic base trait.
    pub fn shared(&self) -> Arc<dyn HostPlugin> {
        self.shared.clone()
    }

    /// The concrete host type's name, for diagnostics.
    pub fn concrete_name(&self) -> &'static str {
        self.concrete_name
    }

    pub(crate) fn concrete_type_id(&self) -> TypeId {
        (*self.concrete).type_id()
    }

    pub(crate) fn concrete_any(&self) -> AnyShared {
        self.concrete.clone()
    }
}

/// Whoever issued a command: a player or the console.
pub trait CommandSender {
    /// The sender's display name.
    fn name(&self) -> &str;

    /// Sends a message back to the sender.
    fn send_message(&mut self, message: &str);

    /// Permission check. Hosts without a permission system allow
    /// everything.
    fn has_permission(&self, node: &str) -> bool {
        let _ = node;
        true
    }
}

/// Command execution capability.
///
/// Implemented by every class the command auto-registrar can bind into the
/// dispatch table.
pub trait CommandExecutor: Send + Sync + 'static {
    /// Runs the command. Returns `false` when usage should be shown.
    fn execute(&self, sender: &mut dyn CommandSender, label: &str, args: &[String]) -> bool;

    /// A command that also completes itself overrides this with
    /// `Some(self)`. The self-completer takes precedence over any
    /// separately registered completer class for the same name.
    fn self_completer(self: Arc<Self>) -> Option<Arc<dyn TabCompleter>>
    where
        Self: Sized,
    {
        None
    }
}

/// Tab completion capability.
pub trait TabCompleter: Send + Sync + 'static {
    /// Completion options for the argument currently being typed.
    fn complete(&self, sender: &dyn CommandSender, label: &str, args: &[String]) -> Vec<String>;
}

/// Event listener capability.
///
/// How the host dispatches events into a listener is the host's business;
/// the bootstrap core only constructs, wires, and hands over instances.
pub trait Listener: Any + Send + Sync {}

/// A fully resolved command binding, handed to the host dispatch table.
///
/// `None` attribute values mean "leave whatever the static declaration
/// already carries"; `Some` values have the `%command%` template token
/// already substituted.
#[derive(Clone)]
pub struct CommandBinding {
    /// The executor to dispatch to.
    pub executor: Arc<dyn CommandExecutor>,
    /// The completer to dispatch tab requests to, if any.
    pub tab_completer: Option<Arc<dyn TabCompleter>>,
    /// Alias names. Empty leaves declared aliases untouched.
    pub aliases: Vec<String>,
    /// Human-readable description override.
    pub description: Option<String>,
    /// Usage string override.
    pub usage: Option<String>,
    /// Permission node override.
    pub permission: Option<String>,
}

/// The host's command dispatch table.
///
/// Two operations, per the boundary contract: look up a statically
/// declared command and attach a binding to it, or insert a synthesized
/// command into the live table under a namespace.
pub trait CommandMap: Send + Sync {
    /// Whether the host statically declares a command with this name.
    fn is_declared(&self, name: &str) -> bool;

    /// Attaches a binding to a statically declared command.
    ///
    /// Returns `false` when no declaration with this name exists.
    fn attach(&self, name: &str, binding: CommandBinding) -> bool;

    /// Inserts a synthesized command into the live dispatch table under
    /// the given namespace. Returns `false` when the insertion fails.
    fn insert(&self, namespace: &str, name: &str, binding: CommandBinding) -> bool;
}

/// The host's event bus.
///
/// Registration is for the lifetime of the plugin; there is no
/// unregister operation on this boundary.
pub trait EventBus: Send + Sync {
    /// Registers a listener instance.
    fn register(&self, listener: Arc<dyn Listener>);
}
