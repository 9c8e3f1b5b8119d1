//! One executor bound to the host dispatch table under one or more names.

use std::sync::Arc;

use tracing::{debug, error};

use crate::host::{CommandBinding, CommandExecutor, CommandMap, TabCompleter};
use crate::markers::CommandMarker;

/// A constructed executor plus its marker metadata, ready to bind into
/// the dispatch table name by name.
///
/// Registration prefers the host's static declaration: a declared name
/// gets the binding attached to it, an undeclared name gets a synthesized
/// command inserted into the live table. Marker attributes carry the
/// `%command%` template token, substituted with the concrete name at
/// bind time so one marker can serve several names.
pub struct RegisterableCommand {
    executor: Arc<dyn CommandExecutor>,
    marker: CommandMarker,
}

impl RegisterableCommand {
    /// Pairs an executor with its marker metadata.
    pub fn new(executor: Arc<dyn CommandExecutor>, marker: CommandMarker) -> Self {
        Self { executor, marker }
    }

    /// Binds the executor into the dispatch table under `name`.
    ///
    /// Returns whether the binding took; failures are also reported
    /// through the log so a scan over many names can keep going.
    pub fn register(
        &self,
        map: &dyn CommandMap,
        namespace: &str,
        name: &str,
        tab_completer: Option<Arc<dyn TabCompleter>>,
    ) -> bool {
        let binding = self.binding(name, tab_completer);

        if map.is_declared(name) {
            let bound = map.attach(name, binding);
            if !bound {
                error!(command = name, "failed to attach to declared command");
            }
            bound
        } else {
            let bound = map.insert(namespace, name, binding);
            if bound {
                debug!(command = name, namespace, "synthesized undeclared command");
            } else {
                error!(command = name, namespace, "failed to insert synthesized command");
            }
            bound
        }
    }

    fn binding(&self, name: &str, tab_completer: Option<Arc<dyn TabCompleter>>) -> CommandBinding {
        let expand = |template: &&'static str| template.replace("%command%", name);
        CommandBinding {
            executor: self.executor.clone(),
            tab_completer,
            aliases: self.marker.aliases.iter().map(expand).collect(),
            description: self.marker.description.as_ref().map(expand),
            usage: self.marker.usage.as_ref().map(expand),
            permission: self.marker.permission.as_ref().map(expand),
        }
    }
}
