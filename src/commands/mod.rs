//! Command auto-registration.

mod registerable;

pub use registerable::RegisterableCommand;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::host::{CommandBinding, CommandExecutor, CommandMap, HostInstance, TabCompleter};
use crate::lifecycle::Managed;
use crate::registry::ManagerRegistry;
use crate::scanner::ClassScanner;

/// Scans command and tab-completer marker classes and binds them into the
/// host's dispatch table.
///
/// The scan runs in two passes. First every completer-marker class is
/// constructed and mapped to the command names its marker declares. Then
/// every command-marker class is constructed, wired through the registry
/// when one is supplied, and bound under each of its names, pairing each
/// name with the command's own completer when it completes itself, else
/// with the mapped completer class for that name.
///
/// Per-class failures are contained: a class with no usable names or a
/// failing construction is reported through the log and skipped, and the
/// scan keeps going. The returned name list covers only successful
/// bindings, sorted for stable startup reports.
pub struct AutoCommandRegistrar<'r> {
    host: HostInstance,
    scanner: Arc<dyn ClassScanner>,
    registry: Option<&'r ManagerRegistry>,
    namespace: String,
}

impl<'r> AutoCommandRegistrar<'r> {
    /// Creates a registrar for the host, scanning through `scanner`.
    ///
    /// The namespace for synthesized commands defaults to the host's
    /// name, lowercased.
    pub fn new(host: HostInstance, scanner: Arc<dyn ClassScanner>) -> Self {
        let namespace = host.shared().name().to_lowercase();
        Self {
            host,
            scanner,
            registry: None,
            namespace,
        }
    }

    /// Wires constructed command and completer instances through this
    /// registry before binding them.
    pub fn with_registry(mut self, registry: &'r ManagerRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Overrides the namespace synthesized commands are inserted under.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Scans and binds every command-marker class.
    ///
    /// Returns the sorted list of names that were bound.
    pub fn register_all_commands(&self) -> Vec<String> {
        self.register_commands_matching(|_| true)
    }

    /// Scans and binds only the command names the filter accepts.
    ///
    /// The filter applies name by name: a multi-name marker can have some
    /// of its names registered and others skipped. Completer mappings are
    /// filtered the same way.
    pub fn register_commands_matching(&self, filter: impl Fn(&str) -> bool) -> Vec<String> {
        let plugin = self.host.shared();
        let map = match plugin.command_map() {
            Some(map) => map,
            None => {
                error!(host = plugin.name(), "host exposes no command map; skipping command scan");
                return Vec::new();
            }
        };

        let completers = self.build_completer_map(&filter);
        let mut registered = Vec::new();

        for class in self.scanner.commands() {
            let names = class.marker.names();
            if names.is_empty() {
                warn!(class = class.type_name, "command marker declares no names; skipping");
                continue;
            }
            let names: Vec<&str> = names.into_iter().filter(|name| filter(name)).collect();
            if names.is_empty() {
                continue;
            }

            let built = match (class.build)(&self.host, self.registry) {
                Ok(built) => built,
                Err(err) => {
                    error!(class = class.type_name, %err, "failed to construct command");
                    continue;
                }
            };

            let command = RegisterableCommand::new(built.executor, class.marker);
            for name in names {
                // A self-completing command wins over a separately
                // registered completer class for the same name.
                let completer = built
                    .self_completer
                    .clone()
                    .or_else(|| completers.get(name).cloned());
                if command.register(map, &self.namespace, name, completer) {
                    registered.push(name.to_string());
                }
            }
        }

        registered.sort();
        registered
    }

    /// Binds one externally constructed executor to a declared command,
    /// wiring it through the registry when one is attached.
    ///
    /// The manual path never synthesizes: an undeclared name is reported
    /// and left alone.
    pub fn register_command<E: CommandExecutor + Managed>(
        &self,
        name: &str,
        mut executor: E,
        tab_completer: Option<Arc<dyn TabCompleter>>,
    ) -> bool {
        let plugin = self.host.shared();
        let map = match plugin.command_map() {
            Some(map) => map,
            None => {
                error!(host = plugin.name(), "host exposes no command map");
                return false;
            }
        };

        if !map.is_declared(name) {
            warn!(command = name, "command is not declared by the host; not registering");
            return false;
        }

        if let Some(registry) = self.registry {
            if let Err(err) = registry.inject(&mut executor) {
                error!(command = name, %err, "failed to wire command executor");
                return false;
            }
        }

        let binding = CommandBinding {
            executor: Arc::new(executor),
            tab_completer,
            aliases: Vec::new(),
            description: None,
            usage: None,
            permission: None,
        };
        let bound = map.attach(name, binding);
        if !bound {
            error!(command = name, "failed to attach to declared command");
        }
        bound
    }

    // One completer instance per class, shared across every name its
    // marker declares. Later classes win name collisions.
    fn build_completer_map(
        &self,
        filter: &impl Fn(&str) -> bool,
    ) -> HashMap<&'static str, Arc<dyn TabCompleter>> {
        let mut completers: HashMap<&'static str, Arc<dyn TabCompleter>> = HashMap::new();

        for class in self.scanner.tab_completers() {
            let names = class.marker.names();
            if names.is_empty() {
                warn!(class = class.type_name, "completer marker declares no names; skipping");
                continue;
            }
            let names: Vec<&'static str> =
                names.into_iter().filter(|name| filter(name)).collect();
            if names.is_empty() {
                continue;
            }

            let completer = match (class.build)(&self.host, self.registry) {
                Ok(completer) => completer,
                Err(err) => {
                    warn!(class = class.type_name, %err, "failed to construct tab completer");
                    continue;
                }
            };

            for name in names {
                debug!(class = class.type_name, command = name, "mapped tab completer");
                completers.insert(name, completer.clone());
            }
        }

        completers
    }
}
