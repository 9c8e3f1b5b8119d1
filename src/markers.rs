//! Marker descriptors: the declarative metadata that drives registration.
//!
//! A marker is an `impl` of one of the marker traits below. The impl block
//! plays the role an annotation plays elsewhere: it tags the type and
//! carries the registration metadata as an associated const. The marker
//! data types themselves are pure data with const builders, so entries can
//! live in link-time registries.

use crate::host::{CommandExecutor, Listener, TabCompleter};
use crate::lifecycle::Managed;
use crate::scope::ManagerScope;

/// Options carried by the service marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerOptions {
    /// Construct this singleton during
    /// [`initialize_eager_managers`](crate::ManagerRegistry::initialize_eager_managers)
    /// instead of on first use. Ignored for prototypes.
    pub eagerly_load: bool,
    /// Shared singleton or per-resolution prototype.
    pub scope: ManagerScope,
}

impl ManagerOptions {
    /// Lazy singleton, the default a marker-less type also resolves with.
    pub const DEFAULT: Self = Self {
        eagerly_load: false,
        scope: ManagerScope::Singleton,
    };

    /// Requests construction at eager-initialization time.
    pub const fn eager(self) -> Self {
        Self { eagerly_load: true, ..self }
    }

    /// Requests a fresh instance per resolution.
    pub const fn prototype(self) -> Self {
        Self { scope: ManagerScope::Prototype, ..self }
    }
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Service marker: this type is managed by the registry.
///
/// `OPTIONS` reaches the registry through the scanned class graph: the
/// type must be submitted to a scanner or added to a
/// [`ClassIndex`](crate::ClassIndex). A type resolved without a graph
/// entry falls back to [`ManagerOptions::DEFAULT`] (lazy singleton) no
/// matter what its impl declares.
///
/// ```rust
/// use plugin_bootstrap::{HostInstance, Managed, Manager, ManagerOptions, RegResult};
///
/// struct CountManager { counts: Vec<u32> }
///
/// impl Managed for CountManager {
///     fn construct(_host: &HostInstance) -> RegResult<Self> {
///         Ok(CountManager { counts: Vec::new() })
///     }
/// }
///
/// impl Manager for CountManager {
///     const OPTIONS: ManagerOptions = ManagerOptions::DEFAULT.eager();
/// }
/// ```
pub trait Manager: Managed {
    /// Marker metadata. Defaults to a lazy singleton.
    const OPTIONS: ManagerOptions = ManagerOptions::DEFAULT;
}

/// Command marker data.
///
/// Keeps both the legacy singular `command` field and the current plural
/// `commands` field; [`names`](CommandMarker::names) is the one place that
/// normalizes the two shapes. Attribute fields support a `%command%`
/// template token, substituted with the concrete name at registration;
/// `None` leaves the host's statically declared value untouched.
#[derive(Debug, Clone, Copy)]
pub struct CommandMarker {
    /// Legacy single-name shape. Superseded by `commands`.
    pub command: &'static str,
    /// Current multi-name shape. Preferred when both are declared.
    pub commands: &'static [&'static str],
    /// Alias names for every registered command.
    pub aliases: &'static [&'static str],
    /// Command description.
    pub description: Option<&'static str>,
    /// Usage string.
    pub usage: Option<&'static str>,
    /// Permission node.
    pub permission: Option<&'static str>,
}

impl CommandMarker {
    /// A marker with no names and no attributes.
    pub const EMPTY: Self = Self {
        command: "",
        commands: &[],
        aliases: &[],
        description: None,
        usage: None,
        permission: None,
    };

    /// Marker for one command name.
    pub const fn named(name: &'static str) -> Self {
        Self { commands: &[], command: name, ..Self::EMPTY }
    }

    /// Marker for a list of command names.
    pub const fn of(names: &'static [&'static str]) -> Self {
        Self { commands: names, ..Self::EMPTY }
    }

    /// Adds aliases.
    pub const fn with_aliases(self, aliases: &'static [&'static str]) -> Self {
        Self { aliases, ..self }
    }

    /// Adds a description.
    pub const fn with_description(self, description: &'static str) -> Self {
        Self { description: Some(description), ..self }
    }

    /// Adds a usage string.
    pub const fn with_usage(self, usage: &'static str) -> Self {
        Self { usage: Some(usage), ..self }
    }

    /// Adds a permission node.
    pub const fn with_permission(self, permission: &'static str) -> Self {
        Self { permission: Some(permission), ..self }
    }

    /// The canonical name list.
    ///
    /// The plural shape wins when both are declared; blank names are
    /// dropped. The rest of the system only ever sees this normalized
    /// form.
    pub fn names(&self) -> Vec<&'static str> {
        normalize_names(self.command, self.commands)
    }
}

/// Tab-completer marker data, with the same singular/plural name duality
/// as [`CommandMarker`].
#[derive(Debug, Clone, Copy)]
pub struct TabCompleterMarker {
    /// Legacy single-name shape.
    pub command: &'static str,
    /// Current multi-name shape. Preferred when both are declared.
    pub commands: &'static [&'static str],
}

impl TabCompleterMarker {
    /// A marker attached to no command names.
    pub const EMPTY: Self = Self { command: "", commands: &[] };

    /// Completer for one command name.
    pub const fn named(name: &'static str) -> Self {
        Self { command: name, commands: &[] }
    }

    /// Completer for a list of command names.
    pub const fn of(names: &'static [&'static str]) -> Self {
        Self { command: "", commands: names }
    }

    /// The canonical name list. Same normalization as
    /// [`CommandMarker::names`].
    pub fn names(&self) -> Vec<&'static str> {
        normalize_names(self.command, self.commands)
    }
}

/// Listener marker data.
#[derive(Debug, Clone, Copy)]
pub struct ListenerMarker {
    /// Display name for the registration report. Blank uses the type's
    /// simple name.
    pub name: &'static str,
}

impl ListenerMarker {
    /// Unnamed marker: report the type's simple name.
    pub const DEFAULT: Self = Self { name: "" };

    /// Marker with an explicit display name.
    pub const fn named(name: &'static str) -> Self {
        Self { name }
    }
}

/// Auto-registered command marker.
pub trait AutoCommand: CommandExecutor + Managed {
    /// The command marker metadata.
    const MARKER: CommandMarker;
}

/// Auto-registered tab-completer marker.
pub trait AutoTabCompleter: TabCompleter + Managed {
    /// The completer marker metadata.
    const MARKER: TabCompleterMarker;
}

/// Auto-registered listener marker.
pub trait AutoListener: Listener + Managed {
    /// The listener marker metadata.
    const MARKER: ListenerMarker = ListenerMarker::DEFAULT;
}

fn normalize_names(
    singular: &'static str,
    plural: &'static [&'static str],
) -> Vec<&'static str> {
    if !plural.is_empty() {
        plural.iter().copied().filter(|n| !n.is_empty()).collect()
    } else if !singular.is_empty() {
        vec![singular]
    } else {
        Vec::new()
    }
}
