//! Class-graph scanning: discovery of marker-bearing types.
//!
//! The core never walks a classpath; it consumes the [`ClassScanner`]
//! boundary, which yields type-erased entries for every marker-bearing
//! type. Two implementations are provided:
//!
//! - [`ClassIndex`], an explicit index the plugin populates at startup.
//! - [`LinkedClasses`], a link-time registry fed by the `submit_*!`
//!   macros through `linkme` distributed slices, with an optional
//!   module-path prefix filter (the package-prefix analog).
//!
//! Each entry carries the marker metadata plus monomorphized thunks for
//! the construct/wire/activate phases, so the registry and registrars can
//! drive any discovered type without knowing it.

use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

use linkme::distributed_slice;

use crate::error::{RegResult, RegistryError};
use crate::host::{CommandExecutor, HostInstance, Listener, TabCompleter};
use crate::lifecycle::Managed;
use crate::markers::{
    AutoCommand, AutoListener, AutoTabCompleter, CommandMarker, ListenerMarker, Manager,
    ManagerOptions, TabCompleterMarker,
};
use crate::registry::ManagerRegistry;

pub(crate) type AnyBox = Box<dyn Any + Send + Sync>;

type ConstructFn = fn(&HostInstance) -> RegResult<AnyBox>;
type WireFn = fn(&mut (dyn Any + Send + Sync), &ManagerRegistry) -> RegResult<()>;
type ActivateFn = fn(&mut (dyn Any + Send + Sync)) -> RegResult<()>;

/// A discovered service-marker type, erased for storage in the registry's
/// class graph.
#[derive(Clone, Copy)]
pub struct ManagedClass {
    type_id: TypeId,
    /// The full type name, used for diagnostics and prefix filtering.
    pub type_name: &'static str,
    /// The marker options this entry was registered with.
    pub options: ManagerOptions,
    pub(crate) construct: ConstructFn,
    pub(crate) wire: WireFn,
    pub(crate) activate: ActivateFn,
}

impl ManagedClass {
    /// Entry for a [`Manager`]-marked type, carrying its marker options.
    pub fn of<T: Manager>() -> Self {
        Self::with_options::<T>(T::OPTIONS)
    }

    /// Entry for an unmarked type, resolved with default options.
    pub(crate) fn of_unmarked<T: Managed>() -> Self {
        Self::with_options::<T>(ManagerOptions::DEFAULT)
    }

    fn with_options<T: Managed>(options: ManagerOptions) -> Self {
        ManagedClass {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            options,
            construct: |host| {
                let instance = T::construct(host)?;
                Ok(Box::new(instance) as AnyBox)
            },
            wire: |obj, registry| match obj.downcast_mut::<T>() {
                Some(instance) => instance.wire(registry),
                None => Err(RegistryError::TypeMismatch(type_name::<T>())),
            },
            activate: |obj| match obj.downcast_mut::<T>() {
                Some(instance) => instance.activate(),
                None => Err(RegistryError::TypeMismatch(type_name::<T>())),
            },
        }
    }

    /// The erased type's identity.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

/// A constructed command pack: the executor plus its own completer when
/// the command type also implements tab completion.
pub struct BuiltCommand {
    /// The executor instance, ready for the dispatch table.
    pub executor: Arc<dyn CommandExecutor>,
    /// `Some` when the command completes itself.
    pub self_completer: Option<Arc<dyn TabCompleter>>,
}

/// A discovered command-marker type.
#[derive(Clone, Copy)]
pub struct CommandClass {
    /// The full type name, for diagnostics and prefix filtering.
    pub type_name: &'static str,
    /// The command marker metadata.
    pub marker: CommandMarker,
    pub(crate) build: fn(&HostInstance, Option<&ManagerRegistry>) -> RegResult<BuiltCommand>,
}

impl CommandClass {
    /// Entry for an [`AutoCommand`]-marked type.
    pub fn of<T: AutoCommand>() -> Self {
        CommandClass {
            type_name: type_name::<T>(),
            marker: T::MARKER,
            build: |host, registry| {
                let mut instance = T::construct(host)?;
                if let Some(registry) = registry {
                    registry.inject(&mut instance)?;
                }
                let executor = Arc::new(instance);
                let self_completer = executor.clone().self_completer();
                Ok(BuiltCommand { executor, self_completer })
            },
        }
    }
}

/// A discovered tab-completer-marker type.
#[derive(Clone, Copy)]
pub struct CompleterClass {
    /// The full type name, for diagnostics and prefix filtering.
    pub type_name: &'static str,
    /// The completer marker metadata.
    pub marker: TabCompleterMarker,
    pub(crate) build:
        fn(&HostInstance, Option<&ManagerRegistry>) -> RegResult<Arc<dyn TabCompleter>>,
}

impl CompleterClass {
    /// Entry for an [`AutoTabCompleter`]-marked type.
    pub fn of<T: AutoTabCompleter>() -> Self {
        CompleterClass {
            type_name: type_name::<T>(),
            marker: T::MARKER,
            build: |host, registry| {
                let mut instance = T::construct(host)?;
                if let Some(registry) = registry {
                    registry.inject(&mut instance)?;
                }
                Ok(Arc::new(instance))
            },
        }
    }
}

/// A discovered listener-marker type.
#[derive(Clone, Copy)]
pub struct ListenerClass {
    /// The full type name, for diagnostics and prefix filtering.
    pub type_name: &'static str,
    /// The listener marker metadata.
    pub marker: ListenerMarker,
    pub(crate) build: fn(&HostInstance, Option<&ManagerRegistry>) -> RegResult<Arc<dyn Listener>>,
}

impl ListenerClass {
    /// Entry for an [`AutoListener`]-marked type.
    pub fn of<T: AutoListener>() -> Self {
        ListenerClass {
            type_name: type_name::<T>(),
            marker: T::MARKER,
            build: |host, registry| {
                let mut instance = T::construct(host)?;
                if let Some(registry) = registry {
                    registry.inject(&mut instance)?;
                }
                Ok(Arc::new(instance))
            },
        }
    }

    /// The name reported for this listener: the marker's name, else the
    /// type's simple name.
    pub fn display_name(&self) -> &'static str {
        if self.marker.name.is_empty() {
            simple_name(self.type_name)
        } else {
            self.marker.name
        }
    }
}

pub(crate) fn simple_name(full: &'static str) -> &'static str {
    full.rsplit("::").next().unwrap_or(full)
}

/// The class-graph scanning boundary.
///
/// Supplied to the registry builder and to the auto-registrars. How
/// entries get discovered (explicit index, link-time registry, code
/// generation) is the implementation's business.
pub trait ClassScanner: Send + Sync {
    /// All service-marker entries.
    fn managers(&self) -> Vec<ManagedClass>;
    /// All command-marker entries.
    fn commands(&self) -> Vec<CommandClass>;
    /// All tab-completer-marker entries.
    fn tab_completers(&self) -> Vec<CompleterClass>;
    /// All listener-marker entries.
    fn listeners(&self) -> Vec<ListenerClass>;
}

/// Explicitly populated class index.
///
/// The plugin registers each marker-bearing type once at startup and
/// hands the index to the registry builder and the registrars.
///
/// # Examples
///
/// ```rust
/// use plugin_bootstrap::{ClassIndex, ClassScanner};
/// # use plugin_bootstrap::{HostInstance, Managed, Manager, RegResult};
/// # struct CountManager;
/// # impl Managed for CountManager {
/// #     fn construct(_h: &HostInstance) -> RegResult<Self> { Ok(CountManager) }
/// # }
/// # impl Manager for CountManager {}
///
/// let mut index = ClassIndex::new();
/// index.manager::<CountManager>();
/// assert_eq!(index.managers().len(), 1);
/// ```
#[derive(Default)]
pub struct ClassIndex {
    managers: Vec<ManagedClass>,
    commands: Vec<CommandClass>,
    completers: Vec<CompleterClass>,
    listeners: Vec<ListenerClass>,
}

impl ClassIndex {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service-marker type.
    pub fn manager<T: Manager>(&mut self) -> &mut Self {
        self.managers.push(ManagedClass::of::<T>());
        self
    }

    /// Registers a command-marker type.
    pub fn command<T: AutoCommand>(&mut self) -> &mut Self {
        self.commands.push(CommandClass::of::<T>());
        self
    }

    /// Registers a tab-completer-marker type.
    pub fn tab_completer<T: AutoTabCompleter>(&mut self) -> &mut Self {
        self.completers.push(CompleterClass::of::<T>());
        self
    }

    /// Registers a listener-marker type.
    pub fn listener<T: AutoListener>(&mut self) -> &mut Self {
        self.listeners.push(ListenerClass::of::<T>());
        self
    }
}

impl ClassScanner for ClassIndex {
    fn managers(&self) -> Vec<ManagedClass> {
        self.managers.clone()
    }

    fn commands(&self) -> Vec<CommandClass> {
        self.commands.clone()
    }

    fn tab_completers(&self) -> Vec<CompleterClass> {
        self.completers.clone()
    }

    fn listeners(&self) -> Vec<ListenerClass> {
        self.listeners.clone()
    }
}

// Link-time registries. Each `submit_*!` invocation contributes one entry
// factory; the factories run at scan time so marker consts are read after
// monomorphization.

/// Registry of service-marker entry factories.
#[distributed_slice]
pub static MANAGER_CLASSES: [fn() -> ManagedClass];

/// Registry of command-marker entry factories.
#[distributed_slice]
pub static COMMAND_CLASSES: [fn() -> CommandClass];

/// Registry of tab-completer-marker entry factories.
#[distributed_slice]
pub static TAB_COMPLETER_CLASSES: [fn() -> CompleterClass];

/// Registry of listener-marker entry factories.
#[distributed_slice]
pub static LISTENER_CLASSES: [fn() -> ListenerClass];

/// Scanner over the link-time registries, optionally restricted to types
/// whose module path starts with a prefix.
///
/// The prefix plays the role of the package prefix: a host that links
/// several plugins scans each one's types separately by filtering on its
/// crate/module path.
#[derive(Default)]
pub struct LinkedClasses {
    prefix: String,
}

impl LinkedClasses {
    /// Scans every submitted entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans only entries whose type path starts with `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    fn keep(&self, type_name: &str) -> bool {
        type_name.starts_with(&self.prefix)
    }
}

impl ClassScanner for LinkedClasses {
    fn managers(&self) -> Vec<ManagedClass> {
        MANAGER_CLASSES
            .iter()
            .map(|factory| factory())
            .filter(|entry| self.keep(entry.type_name))
            .collect()
    }

    fn commands(&self) -> Vec<CommandClass> {
        COMMAND_CLASSES
            .iter()
            .map(|factory| factory())
            .filter(|entry| self.keep(entry.type_name))
            .collect()
    }

    fn tab_completers(&self) -> Vec<CompleterClass> {
        TAB_COMPLETER_CLASSES
            .iter()
            .map(|factory| factory())
            .filter(|entry| self.keep(entry.type_name))
            .collect()
    }

    fn listeners(&self) -> Vec<ListenerClass> {
        LISTENER_CLASSES
            .iter()
            .map(|factory| factory())
            .filter(|entry| self.keep(entry.type_name))
            .collect()
    }
}

/// Submits a [`Manager`]-marked type to the link-time class registry.
#[macro_export]
macro_rules! submit_manager {
    ($ty:ty) => {
        const _: () = {
            #[$crate::linkme::distributed_slice($crate::scanner::MANAGER_CLASSES)]
            #[linkme(crate = $crate::linkme)]
            static ENTRY: fn() -> $crate::scanner::ManagedClass =
                $crate::scanner::ManagedClass::of::<$ty>;
        };
    };
}

/// Submits an [`AutoCommand`]-marked type to the link-time class registry.
#[macro_export]
macro_rules! submit_command {
    ($ty:ty) => {
        const _: () = {
            #[$crate::linkme::distributed_slice($crate::scanner::COMMAND_CLASSES)]
            #[linkme(crate = $crate::linkme)]
            static ENTRY: fn() -> $crate::scanner::CommandClass =
                $crate::scanner::CommandClass::of::<$ty>;
        };
    };
}

/// Submits an [`AutoTabCompleter`]-marked type to the link-time class
/// registry.
#[macro_export]
macro_rules! submit_tab_completer {
    ($ty:ty) => {
        const _: () = {
            #[$crate::linkme::distributed_slice($crate::scanner::TAB_COMPLETER_CLASSES)]
            #[linkme(crate = $crate::linkme)]
            static ENTRY: fn() -> $crate::scanner::CompleterClass =
                $crate::scanner::CompleterClass::of::<$ty>;
        };
    };
}

/// Submits an [`AutoListener`]-marked type to the link-time class registry.
#[macro_export]
macro_rules! submit_listener {
    ($ty:ty) => {
        const _: () = {
            #[$crate::linkme::distributed_slice($crate::scanner::LISTENER_CLASSES)]
            #[linkme(crate = $crate::linkme)]
            static ENTRY: fn() -> $crate::scanner::ListenerClass =
                $crate::scanner::ListenerClass::of::<$ty>;
        };
    };
}
